mod chat;
mod connection;
mod input;
mod onboarding;

use std::time::Duration;

use tokio::sync::mpsc;

use super::App;
use crate::core::connection::ConnectionId;
use crate::core::message::MessageId;

pub enum AppAction {
    InsertIntoInput {
        text: String,
    },
    Backspace,
    CursorLeft,
    CursorRight,
    ClearInput,
    SetStatus {
        message: String,
    },
    ClearStatus,
    /// Enter in the onboarding screen: advance, add the pending interest,
    /// or finish when the interest field is empty.
    OnboardingSubmit,
    OnboardingBack,
    AddInterest {
        tag: Option<String>,
    },
    RemoveInterest {
        tag: String,
    },
    CompleteOnboarding,
    /// Enter in the chat screen; slash commands are routed to the registry.
    SubmitInput,
    SubmitMessage {
        message: String,
    },
    ProcessCommand {
        input: String,
    },
    SwitchPersonality {
        id: String,
    },
    CyclePersonality {
        forward: bool,
    },
    ResetConversation,
    Reconnect,
    ScrollUp {
        lines: u16,
    },
    ScrollDown {
        lines: u16,
    },
    ScrollToBottom,
    Quit,
    ConnectionReady {
        conn_id: ConnectionId,
    },
    InboundMessage {
        raw: String,
        conn_id: ConnectionId,
    },
    ConnectionRetrying {
        attempt: u32,
        delay: Duration,
        conn_id: ConnectionId,
    },
    ConnectionErrored {
        info: String,
        conn_id: ConnectionId,
    },
    ConnectionClosed {
        conn_id: ConnectionId,
    },
    DeliveryFailed {
        message_id: MessageId,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AppActionContext {
    pub term_width: u16,
    pub term_height: u16,
}

pub struct AppActionEnvelope {
    pub action: AppAction,
    pub context: AppActionContext,
}

#[derive(Clone)]
pub struct AppActionDispatcher {
    tx: mpsc::UnboundedSender<AppActionEnvelope>,
}

impl AppActionDispatcher {
    pub fn new(tx: mpsc::UnboundedSender<AppActionEnvelope>) -> Self {
        Self { tx }
    }

    pub fn dispatch_many<I>(&self, actions: I, ctx: AppActionContext)
    where
        I: IntoIterator<Item = AppAction>,
    {
        for action in actions.into_iter() {
            let _ = self.tx.send(AppActionEnvelope {
                action,
                context: ctx,
            });
        }
    }
}

/// Side effects the event loop performs on the app's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Close any live connection and open a new one.
    OpenConnection,
    CloseConnection,
    SendFrame {
        message_id: MessageId,
        payload: String,
    },
}

pub fn apply_actions(
    app: &mut App,
    envelopes: impl IntoIterator<Item = AppActionEnvelope>,
) -> Vec<AppCommand> {
    let mut commands = Vec::new();
    for envelope in envelopes {
        if let Some(cmd) = apply_action(app, envelope.action, envelope.context) {
            commands.push(cmd);
        }
    }
    commands
}

pub fn apply_action(app: &mut App, action: AppAction, ctx: AppActionContext) -> Option<AppCommand> {
    match action {
        AppAction::InsertIntoInput { .. }
        | AppAction::Backspace
        | AppAction::CursorLeft
        | AppAction::CursorRight
        | AppAction::ClearInput
        | AppAction::SetStatus { .. }
        | AppAction::ClearStatus
        | AppAction::ScrollUp { .. }
        | AppAction::ScrollDown { .. }
        | AppAction::ScrollToBottom
        | AppAction::Quit => input::handle_input_action(app, action, ctx),

        AppAction::OnboardingSubmit
        | AppAction::OnboardingBack
        | AppAction::AddInterest { .. }
        | AppAction::RemoveInterest { .. }
        | AppAction::CompleteOnboarding => onboarding::handle_onboarding_action(app, action, ctx),

        AppAction::SubmitInput
        | AppAction::SubmitMessage { .. }
        | AppAction::ProcessCommand { .. }
        | AppAction::SwitchPersonality { .. }
        | AppAction::CyclePersonality { .. }
        | AppAction::ResetConversation
        | AppAction::Reconnect => chat::handle_chat_action(app, action, ctx),

        AppAction::ConnectionReady { .. }
        | AppAction::InboundMessage { .. }
        | AppAction::ConnectionRetrying { .. }
        | AppAction::ConnectionErrored { .. }
        | AppAction::ConnectionClosed { .. }
        | AppAction::DeliveryFailed { .. } => {
            connection::handle_connection_action(app, action, ctx)
        }
    }
}
