use super::{App, AppAction, AppActionContext, AppCommand};
use crate::commands::{process_input, CommandResult};
use crate::core::personality::{next_personality, previous_personality, resolve_personality};

pub(super) fn handle_chat_action(
    app: &mut App,
    action: AppAction,
    _ctx: AppActionContext,
) -> Option<AppCommand> {
    match action {
        AppAction::SubmitInput => {
            if !app.is_chat() {
                return None;
            }
            let input = app.ui.take_input();
            handle_process_command(app, input)
        }
        AppAction::SubmitMessage { message } => app.send_user_message(&message),
        AppAction::ProcessCommand { input } => handle_process_command(app, input),
        AppAction::SwitchPersonality { id } => {
            match resolve_personality(&id) {
                Ok(target) => app.switch_personality(target),
                Err(err) => app.ui.set_status(err),
            }
            None
        }
        AppAction::CyclePersonality { forward } => {
            if app.is_chat() {
                let target = if forward {
                    next_personality(app.personality)
                } else {
                    previous_personality(app.personality)
                };
                app.switch_personality(target);
            }
            None
        }
        AppAction::ResetConversation => {
            app.reset_conversation();
            None
        }
        AppAction::Reconnect => app.reconnect(),
        _ => unreachable!("non-chat action routed to chat handler"),
    }
}

fn handle_process_command(app: &mut App, input: String) -> Option<AppCommand> {
    if input.trim().is_empty() {
        return None;
    }

    match process_input(app, &input) {
        CommandResult::Continue => None,
        CommandResult::ProcessAsMessage(message) => app.send_user_message(&message),
        CommandResult::Reconnect => app.reconnect(),
        CommandResult::Quit => app.request_exit(),
    }
}
