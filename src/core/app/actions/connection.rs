use super::{App, AppAction, AppActionContext, AppCommand};

pub(super) fn handle_connection_action(
    app: &mut App,
    action: AppAction,
    _ctx: AppActionContext,
) -> Option<AppCommand> {
    match action {
        AppAction::ConnectionReady { conn_id } => {
            if app.is_current_connection(conn_id) {
                app.on_connection_ready();
            }
        }
        AppAction::InboundMessage { raw, conn_id } => {
            if app.is_current_connection(conn_id) {
                app.on_inbound(raw);
            }
        }
        AppAction::ConnectionRetrying {
            attempt,
            delay,
            conn_id,
        } => {
            if app.is_current_connection(conn_id) {
                app.on_connection_retrying(attempt, delay);
            }
        }
        AppAction::ConnectionErrored { info, conn_id } => {
            if app.is_current_connection(conn_id) {
                app.on_connection_error(info);
            }
        }
        AppAction::ConnectionClosed { conn_id } => {
            if app.is_current_connection(conn_id) {
                app.on_connection_closed();
            }
        }
        AppAction::DeliveryFailed { message_id, reason } => {
            app.mark_undelivered(message_id, reason);
        }
        _ => unreachable!("non-connection action routed to connection handler"),
    }
    None
}
