use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Marker the backend uses for the relationship-coach responder.
pub const DIRECTED_AGENT_MARKER: &str = "hitch";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Sender {
    User,
    Agent,
    DirectedAgent,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Agent => "agent",
            Sender::DirectedAgent => "directed-agent",
        }
    }

    pub fn is_user(self) -> bool {
        self == Sender::User
    }

    /// Both agent flavours are rendered on the remote side of the transcript.
    pub fn is_remote(self) -> bool {
        matches!(self, Sender::Agent | Sender::DirectedAgent)
    }
}

impl AsRef<str> for Sender {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for Sender {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Sender::User),
            "agent" => Ok(Sender::Agent),
            "directed-agent" => Ok(Sender::DirectedAgent),
            _ => Err(format!("invalid message sender: {value}")),
        }
    }
}

impl TryFrom<String> for Sender {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Sender> for String {
    fn from(value: Sender) -> Self {
        value.as_str().to_string()
    }
}

/// Sniffs the sender of an untagged inbound payload.
///
/// Any payload containing [`DIRECTED_AGENT_MARKER`] is attributed to the
/// directed agent, including ordinary agent text that merely mentions it.
pub fn classify_inbound(raw: &str) -> Sender {
    if raw.contains(DIRECTED_AGENT_MARKER) {
        Sender::DirectedAgent
    } else {
        Sender::Agent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            text: text.into(),
            sender,
            timestamp: Local::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(Sender::Agent, text)
    }

    pub fn inbound(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let sender = classify_inbound(&raw);
        Self::new(sender, raw)
    }

    pub fn is_user(&self) -> bool {
        self.sender.is_user()
    }

    /// Clock time shown next to the bubble, e.g. `14:05`.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_a_case_sensitive_substring_match() {
        assert_eq!(classify_inbound("@hitch disse: oi"), Sender::DirectedAgent);
        assert_eq!(classify_inbound("the hitchhiker"), Sender::DirectedAgent);
        assert_eq!(classify_inbound("Hitch said hi"), Sender::Agent);
        assert_eq!(classify_inbound("HITCH"), Sender::Agent);
        assert_eq!(classify_inbound(""), Sender::Agent);
        assert_eq!(classify_inbound("hitc h"), Sender::Agent);
    }

    #[test]
    fn inbound_messages_are_classified() {
        assert_eq!(Message::inbound("oi").sender, Sender::Agent);
        assert_eq!(
            Message::inbound("@hitch disse: calma").sender,
            Sender::DirectedAgent
        );
    }

    #[test]
    fn message_ids_are_unique() {
        let a = Message::user("same");
        let b = Message::user("same");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn sender_strings_round_trip() {
        for sender in [Sender::User, Sender::Agent, Sender::DirectedAgent] {
            assert_eq!(Sender::try_from(sender.as_str()), Ok(sender));
        }
        assert!(Sender::try_from("ai").is_err());
    }
}
