//! Event polling, dispatching, and UI rendering loop.
//!
//! Terminal input and connection events are both turned into [`AppAction`]s
//! and applied in one place, so every state transition runs on this loop in
//! the order it was drained. Commands returned by the app are executed here
//! against the [`ConnectionManager`].

use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use ratatui::layout::Size;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::core::app::{
    apply_actions, App, AppAction, AppActionContext, AppActionDispatcher, AppActionEnvelope,
    AppCommand, AppInitConfig,
};
use crate::core::connection::{
    ConnectionEvent, ConnectionId, ConnectionManager, RetryPolicy, SendOutcome,
};
use crate::core::personality::Personality;
use crate::core::protocol::InboundFormat;
use crate::ui::renderer::ui;
use crate::ui::theme::Theme;
use crate::utils::color::detect_color_depth;

use super::keybindings::{map_key, KeyContext};
use super::lifecycle::{restore_terminal, setup_terminal, SharedTerminal};
use super::AppHandle;

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

/// Everything a chat session needs, resolved from flags, env and config.
pub struct ChatOptions {
    pub endpoint: String,
    pub retry: RetryPolicy,
    pub personality: &'static Personality,
    pub inbound_format: InboundFormat,
    pub log_file: Option<String>,
}

async fn is_exit_requested(app: &AppHandle) -> bool {
    app.read(|app| app.ui.exit_requested).await
}

async fn current_terminal_size(terminal: &SharedTerminal) -> Size {
    let terminal_guard = terminal.lock().await;
    terminal_guard.size().unwrap_or_default()
}

async fn try_draw_frame(
    app: &AppHandle,
    terminal: &SharedTerminal,
    theme: &Theme,
    request_redraw: &mut bool,
    last_draw: &mut Instant,
    frame_duration: Duration,
) -> io::Result<()> {
    if !*request_redraw {
        return Ok(());
    }

    let now = Instant::now();
    if now.duration_since(*last_draw) < frame_duration {
        return Ok(());
    }

    let mut terminal_guard = terminal.lock().await;
    app.update(|app| terminal_guard.draw(|f| ui(f, app, theme)).map(|_| ()))
        .await?;
    *last_draw = now;
    *request_redraw = false;
    Ok(())
}

pub(crate) fn sanitize_pasted_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\t', "    ")
        .chars()
        .filter(|&c| c == '\n' || !c.is_control())
        .collect()
}

fn page_size(term_size: Size) -> u16 {
    (term_size.height.saturating_sub(6) / 2).max(1)
}

/// Drains terminal events into actions. Returns whether anything arrived.
async fn process_ui_events(
    app: &AppHandle,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    dispatcher: &AppActionDispatcher,
    term_size: Size,
) -> bool {
    let ctx = AppActionContext {
        term_width: term_size.width,
        term_height: term_size.height,
    };
    let mut events_processed = false;

    while let Ok(ev) = event_rx.try_recv() {
        events_processed = true;
        match ev {
            UiEvent::Crossterm(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                let (context, input) = app
                    .read(|app| {
                        let context = if app.is_chat() {
                            KeyContext::Chat
                        } else {
                            KeyContext::Onboarding
                        };
                        (context, app.ui.input.clone())
                    })
                    .await;
                let actions = map_key(key, context, &input, page_size(term_size));
                dispatcher.dispatch_many(actions, ctx);
            }
            UiEvent::Crossterm(Event::Paste(text)) => {
                let text = sanitize_pasted_text(&text);
                if !text.is_empty() {
                    dispatcher.dispatch_many([AppAction::InsertIntoInput { text }], ctx);
                }
            }
            UiEvent::Crossterm(_) => {}
        }
    }
    events_processed
}

/// Turns connection events into actions, skipping any that belong to a
/// connection other than `current`.
fn process_connection_events(
    dispatcher: &AppActionDispatcher,
    rx: &mut mpsc::UnboundedReceiver<(ConnectionEvent, ConnectionId)>,
    term_size: Size,
    current: Option<ConnectionId>,
) -> bool {
    let mut actions = Vec::new();
    while let Ok((event, conn_id)) = rx.try_recv() {
        if Some(conn_id) != current {
            debug!(conn_id, "dropping event from stale connection");
            continue;
        }
        actions.push(match event {
            ConnectionEvent::Ready => AppAction::ConnectionReady { conn_id },
            ConnectionEvent::Message(raw) => AppAction::InboundMessage { raw, conn_id },
            ConnectionEvent::Retrying { attempt, delay } => AppAction::ConnectionRetrying {
                attempt,
                delay,
                conn_id,
            },
            ConnectionEvent::Error(info) => AppAction::ConnectionErrored { info, conn_id },
            ConnectionEvent::Closed => AppAction::ConnectionClosed { conn_id },
        });
    }

    if actions.is_empty() {
        return false;
    }
    dispatcher.dispatch_many(
        actions,
        AppActionContext {
            term_width: term_size.width,
            term_height: term_size.height,
        },
    );
    true
}

async fn drain_action_queue(
    app: &AppHandle,
    dispatcher: &AppActionDispatcher,
    connection: &mut ConnectionManager,
    action_rx: &mut mpsc::UnboundedReceiver<AppActionEnvelope>,
) -> bool {
    let mut pending = Vec::new();
    while let Ok(envelope) = action_rx.try_recv() {
        pending.push(envelope);
    }

    if pending.is_empty() {
        return false;
    }

    let commands = app.update(|app| apply_actions(app, pending)).await;
    for cmd in commands {
        execute_command(app, dispatcher, connection, cmd).await;
    }
    true
}

async fn execute_command(
    app: &AppHandle,
    dispatcher: &AppActionDispatcher,
    connection: &mut ConnectionManager,
    cmd: AppCommand,
) {
    match cmd {
        AppCommand::OpenConnection => {
            let id = connection.open();
            app.update(|app| app.connection_opened(id)).await;
        }
        AppCommand::CloseConnection => connection.close(),
        AppCommand::SendFrame {
            message_id,
            payload,
        } => {
            let reason = match connection.send(payload) {
                SendOutcome::Sent => return,
                SendOutcome::DroppedNotReady => "conexão não está pronta".to_string(),
                SendOutcome::Failed(reason) => reason,
            };
            dispatcher.dispatch_many(
                [AppAction::DeliveryFailed { message_id, reason }],
                AppActionContext::default(),
            );
        }
    }
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

pub async fn run_chat(options: ChatOptions) -> Result<(), Box<dyn Error>> {
    let ChatOptions {
        endpoint,
        retry,
        personality,
        inbound_format,
        log_file,
    } = options;

    let app = AppHandle::new(App::new(AppInitConfig {
        personality,
        inbound_format,
        log_file,
    })?);
    info!(%endpoint, personality = personality.id, "starting chat session");

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<AppActionEnvelope>();
    let action_dispatcher = AppActionDispatcher::new(action_tx);
    let (mut connection, mut connection_rx) = ConnectionManager::new(endpoint, retry);

    let color_depth = detect_color_depth();
    let mut accent_rx = app.read(|app| app.accent.subscribe()).await;
    let mut theme = Theme::from_accent(*accent_rx.borrow_and_update(), color_depth);

    let terminal = setup_terminal()?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    const MAX_FPS: u64 = 60;
    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut last_draw = Instant::now() - frame_duration;
    let mut request_redraw = true;

    let result: Result<(), Box<dyn Error>> = 'main_loop: loop {
        if is_exit_requested(&app).await {
            break 'main_loop Ok(());
        }

        if accent_rx.has_changed().unwrap_or(false) {
            theme = Theme::from_accent(*accent_rx.borrow_and_update(), color_depth);
            request_redraw = true;
        }

        if let Err(err) = try_draw_frame(
            &app,
            &terminal,
            &theme,
            &mut request_redraw,
            &mut last_draw,
            frame_duration,
        )
        .await
        {
            break 'main_loop Err(err.into());
        }

        let term_size = current_terminal_size(&terminal).await;
        app.update(|app| {
            app.ui.last_term_size = term_size;
        })
        .await;

        let events_processed =
            process_ui_events(&app, &mut event_rx, &action_dispatcher, term_size).await;

        let current_connection = app.read(|app| app.connection.id).await;
        let received_any = process_connection_events(
            &action_dispatcher,
            &mut connection_rx,
            term_size,
            current_connection,
        );

        let actions_applied = drain_action_queue(
            &app,
            &action_dispatcher,
            &mut connection,
            &mut action_rx,
        )
        .await;

        let status_expired = app.update(|app| app.ui.expire_status(Instant::now())).await;

        if events_processed || received_any || actions_applied || status_expired {
            request_redraw = true;
        }

        if !events_processed && !received_any && !actions_applied {
            tokio::time::sleep(Duration::from_millis(16)).await;
        }
    };

    event_reader_handle.abort();
    connection.shutdown().await;
    restore_terminal(&terminal).await?;
    info!("chat session ended");

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::app::AppCommand;
    use crate::utils::test_utils::create_chat_app;

    fn new_dispatcher() -> (
        AppActionDispatcher,
        mpsc::UnboundedReceiver<AppActionEnvelope>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        (AppActionDispatcher::new(tx), rx)
    }

    #[test]
    fn sanitize_paste_text_removes_control_characters() {
        assert_eq!(sanitize_pasted_text("oi\r\ntudo\tbem\u{7}"), "oi\ntudo    bem");
    }

    #[test]
    fn stale_connection_events_are_not_dispatched() {
        let (dispatcher, mut action_rx) = new_dispatcher();
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send((ConnectionEvent::Message("velha".into()), 1)).unwrap();
        tx.send((ConnectionEvent::Ready, 2)).unwrap();
        tx.send((ConnectionEvent::Message("nova".into()), 2)).unwrap();

        assert!(process_connection_events(
            &dispatcher,
            &mut rx,
            Size::new(80, 24),
            Some(2)
        ));

        let actions: Vec<AppAction> = std::iter::from_fn(|| action_rx.try_recv().ok())
            .map(|envelope| envelope.action)
            .collect();
        assert_eq!(actions.len(), 2);
        assert!(matches!(actions[0], AppAction::ConnectionReady { conn_id: 2 }));
        assert!(matches!(
            &actions[1],
            AppAction::InboundMessage { raw, conn_id: 2 } if raw == "nova"
        ));
    }

    #[test]
    fn no_current_connection_drops_everything() {
        let (dispatcher, mut action_rx) = new_dispatcher();
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send((ConnectionEvent::Closed, 1)).unwrap();
        assert!(!process_connection_events(
            &dispatcher,
            &mut rx,
            Size::new(80, 24),
            None
        ));
        assert!(action_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn undeliverable_frames_are_reported_back() {
        let app = AppHandle::new(create_chat_app());
        let (dispatcher, mut action_rx) = new_dispatcher();
        let (mut connection, _events) =
            ConnectionManager::new("ws://127.0.0.1:1/ws", RetryPolicy::none());

        let message_id = app
            .update(|app| app.append_message(crate::core::message::Message::user("oi")))
            .await;
        execute_command(
            &app,
            &dispatcher,
            &mut connection,
            AppCommand::SendFrame {
                message_id,
                payload: "{}".into(),
            },
        )
        .await;

        let envelope = action_rx.try_recv().expect("delivery failure");
        assert!(matches!(
            envelope.action,
            AppAction::DeliveryFailed { message_id: id, .. } if id == message_id
        ));
    }

    #[tokio::test]
    async fn open_command_records_the_connection_id() {
        let app = AppHandle::new(create_chat_app());
        let (dispatcher, _action_rx) = new_dispatcher();
        let (mut connection, _events) =
            ConnectionManager::new("ws://127.0.0.1:1/ws", RetryPolicy::none());

        execute_command(&app, &dispatcher, &mut connection, AppCommand::OpenConnection).await;
        let recorded = app.read(|app| app.connection.id).await;
        assert_eq!(recorded, connection.current_id());
        connection.close();
    }
}
