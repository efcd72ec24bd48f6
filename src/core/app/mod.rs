//! Session controller state.
//!
//! [`App`] owns everything a session knows: the phase (onboarding or chat),
//! the active personality, the transcript, the mirrored connection status and
//! presentation state. It never touches the network. Mutations that need I/O
//! return an [`AppCommand`] for the event loop to execute.

use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, info};

use crate::core::connection::{ConnectionId, ConnectionState};
use crate::core::message::{Message, MessageId};
use crate::core::onboarding::Onboarding;
use crate::core::personality::{AccentChannel, Personality};
use crate::core::profile::Profile;
use crate::core::protocol::{InboundFormat, InboundFrame, OutboundFrame};
use crate::core::transcript::Transcript;
use crate::utils::logging::TranscriptLog;

pub mod actions;
pub mod ui_state;

pub use actions::{
    apply_actions, AppAction, AppActionContext, AppActionDispatcher, AppActionEnvelope, AppCommand,
};
pub use ui_state::UiState;

#[derive(Debug)]
pub enum Phase {
    Onboarding(Onboarding),
    Chat { profile: Profile },
}

/// The app's view of the connection, driven by connection events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub id: Option<ConnectionId>,
    pub retry_attempt: u32,
    pub last_error: Option<String>,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self {
            state: ConnectionState::Closed,
            id: None,
            retry_attempt: 0,
            last_error: None,
        }
    }
}

impl ConnectionStatus {
    pub fn is_ready(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn label(&self) -> String {
        match self.state {
            ConnectionState::Connecting if self.retry_attempt > 0 => {
                format!("connecting (retry {})", self.retry_attempt)
            }
            state => state.label().to_string(),
        }
    }
}

pub struct AppInitConfig {
    pub personality: &'static Personality,
    pub inbound_format: InboundFormat,
    pub log_file: Option<String>,
}

pub struct App {
    pub phase: Phase,
    pub personality: &'static Personality,
    pub transcript: Transcript,
    pub accent: AccentChannel,
    pub connection: ConnectionStatus,
    /// Local user messages that never reached the connection.
    pub undelivered: HashSet<MessageId>,
    pub inbound_format: InboundFormat,
    pub ui: UiState,
    pub logging: TranscriptLog,
}

pub fn completion_welcome(name: &str, personality: &Personality) -> String {
    format!(
        "Oi {}! 😊 Que bom te conhecer! Sou a {}. Como você está hoje?",
        name, personality.display_name
    )
}

pub fn reset_welcome(name: &str, personality: &Personality) -> String {
    format!(
        "Oi {}! 😊 Vamos começar uma nova conversa! Sou a {}.",
        name, personality.display_name
    )
}

pub fn switch_announcement(personality: &Personality) -> String {
    format!(
        "Oi! Agora você está conversando com a {}! 😊",
        personality.display_name
    )
}

impl App {
    pub fn new(init: AppInitConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let logging = TranscriptLog::new(init.log_file)?;
        Ok(Self {
            phase: Phase::Onboarding(Onboarding::new()),
            personality: init.personality,
            transcript: Transcript::new(),
            accent: AccentChannel::new(init.personality.accent),
            connection: ConnectionStatus::default(),
            undelivered: HashSet::new(),
            inbound_format: init.inbound_format,
            ui: UiState::default(),
            logging,
        })
    }

    pub fn is_chat(&self) -> bool {
        matches!(self.phase, Phase::Chat { .. })
    }

    pub fn profile(&self) -> Option<&Profile> {
        match &self.phase {
            Phase::Chat { profile } => Some(profile),
            Phase::Onboarding(_) => None,
        }
    }

    pub fn onboarding(&self) -> Option<&Onboarding> {
        match &self.phase {
            Phase::Onboarding(onboarding) => Some(onboarding),
            Phase::Chat { .. } => None,
        }
    }

    pub fn onboarding_mut(&mut self) -> Option<&mut Onboarding> {
        match &mut self.phase {
            Phase::Onboarding(onboarding) => Some(onboarding),
            Phase::Chat { .. } => None,
        }
    }

    pub fn is_undelivered(&self, id: MessageId) -> bool {
        self.undelivered.contains(&id)
    }

    /// Appends to the transcript, mirrors the line to the transcript log and
    /// asks the view to follow the newest message.
    pub fn append_message(&mut self, message: Message) -> MessageId {
        self.log_to_file(&message);
        self.ui.request_scroll_to_latest();
        self.transcript.push(message)
    }

    fn log_to_file(&mut self, message: &Message) {
        let user_name = self.profile().map(|p| p.name().to_string()).unwrap_or_default();
        if let Err(err) =
            self.logging
                .log_message(message, &user_name, self.personality.display_name)
        {
            self.ui.set_status(format!("Log error: {}", err));
        }
    }

    /// Commits the onboarding profile, greets the user and switches to chat.
    /// Returns the command that opens the connection; `None` when the
    /// profile is incomplete or chat is already active.
    pub fn complete_onboarding(&mut self) -> Option<AppCommand> {
        let profile = self.onboarding_mut()?.complete()?;
        info!(personality = self.personality.id, "onboarding complete");

        let welcome = completion_welcome(profile.name(), self.personality);
        self.phase = Phase::Chat { profile };
        self.ui.input.clear();
        self.ui.input_cursor = 0;
        self.append_message(Message::agent(welcome));

        self.connection = ConnectionStatus {
            state: ConnectionState::Connecting,
            ..ConnectionStatus::default()
        };
        Some(AppCommand::OpenConnection)
    }

    /// Echoes `text` locally and returns the frame to send when the
    /// connection is ready. Blank input is ignored entirely.
    pub fn send_user_message(&mut self, text: &str) -> Option<AppCommand> {
        if text.trim().is_empty() {
            return None;
        }
        let frame = {
            let profile = self.profile()?;
            OutboundFrame::new(text, self.personality.id, profile)
        };
        let message_id = self.append_message(Message::user(text));

        if !self.connection.is_ready() {
            debug!(%message_id, "connection not ready, message kept local");
            self.undelivered.insert(message_id);
            self.ui.set_status("Sem conexão: mensagem não enviada");
            return None;
        }

        match frame.to_json() {
            Ok(payload) => Some(AppCommand::SendFrame {
                message_id,
                payload,
            }),
            Err(err) => {
                self.mark_undelivered(message_id, err.to_string());
                None
            }
        }
    }

    pub fn mark_undelivered(&mut self, message_id: MessageId, reason: String) {
        debug!(%message_id, %reason, "message not delivered");
        self.undelivered.insert(message_id);
        self.ui.set_status(format!("Mensagem não enviada: {}", reason));
    }

    /// Changes the active personality, publishes its accent and announces the
    /// change. The connection is left alone.
    pub fn switch_personality(&mut self, target: &'static Personality) {
        info!(from = self.personality.id, to = target.id, "switching personality");
        self.personality = target;
        self.accent.publish(target.accent);
        self.append_message(Message::agent(switch_announcement(target)));
    }

    /// Replaces the transcript with a fresh welcome. No-op outside chat.
    pub fn reset_conversation(&mut self) -> bool {
        let Some(profile) = self.profile() else {
            return false;
        };
        let welcome = Message::agent(reset_welcome(profile.name(), self.personality));
        self.undelivered.clear();
        if let Err(err) = self.logging.log_marker("Nova conversa") {
            self.ui.set_status(format!("Log error: {}", err));
        }
        self.log_to_file(&welcome);
        self.transcript.reset(welcome);
        self.ui.scroll_to_bottom();
        true
    }

    /// Requests a fresh connection; only meaningful in chat.
    pub fn reconnect(&mut self) -> Option<AppCommand> {
        if !self.is_chat() {
            return None;
        }
        self.connection = ConnectionStatus {
            state: ConnectionState::Connecting,
            ..ConnectionStatus::default()
        };
        self.ui.set_status("Reconectando...");
        Some(AppCommand::OpenConnection)
    }

    /// Records the id the connection manager assigned to the newest
    /// connection; events from any other id are ignored from now on.
    pub fn connection_opened(&mut self, id: ConnectionId) {
        self.connection.id = Some(id);
        self.connection.state = ConnectionState::Connecting;
    }

    pub fn is_current_connection(&self, id: ConnectionId) -> bool {
        self.connection.id == Some(id)
    }

    pub fn on_connection_ready(&mut self) {
        self.connection.state = ConnectionState::Open;
        self.connection.retry_attempt = 0;
        self.connection.last_error = None;
        self.ui.set_status("Conectado");
    }

    pub fn on_inbound(&mut self, raw: String) {
        let frame = InboundFrame::decode(&raw, self.inbound_format);
        self.append_message(Message::new(frame.sender, frame.text));
    }

    pub fn on_connection_retrying(&mut self, attempt: u32, delay: Duration) {
        self.connection.state = ConnectionState::Connecting;
        self.connection.retry_attempt = attempt;
        self.ui.set_status(format!(
            "Falha ao conectar, nova tentativa {} em {} ms",
            attempt,
            delay.as_millis()
        ));
    }

    pub fn on_connection_error(&mut self, info: String) {
        self.ui.set_status(format!("Erro de conexão: {}", info));
        self.connection.last_error = Some(info);
    }

    pub fn on_connection_closed(&mut self) {
        self.connection.state = ConnectionState::Closed;
        self.connection.id = None;
        if self.connection.last_error.is_none() {
            self.ui.set_status("Conexão encerrada. Use /reconnect para tentar de novo");
        }
    }

    /// Marks the session for exit; the event loop closes the connection.
    pub fn request_exit(&mut self) -> Option<AppCommand> {
        self.ui.exit_requested = true;
        self.connection.state = ConnectionState::Closed;
        self.connection.id = None;
        Some(AppCommand::CloseConnection)
    }
}
