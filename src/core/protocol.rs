use serde::{Deserialize, Serialize};

use super::message::{classify_inbound, Sender};
use super::profile::Profile;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    pub message: String,
    pub personality: String,
    #[serde(rename = "userProfile")]
    pub user_profile: ProfilePayload,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProfilePayload {
    pub name: String,
    pub age: String,
    pub interests: Vec<String>,
}

impl From<&Profile> for ProfilePayload {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.name().to_string(),
            age: profile.age().to_string(),
            interests: profile.interests().to_vec(),
        }
    }
}

impl OutboundFrame {
    pub fn new(message: impl Into<String>, personality_id: &str, profile: &Profile) -> Self {
        Self {
            message: message.into(),
            personality: personality_id.to_string(),
            user_profile: ProfilePayload::from(profile),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// How inbound payloads are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InboundFormat {
    /// Plain text; the sender is sniffed from the content.
    #[default]
    Raw,
    /// JSON `{"sender": ..., "text": ...}` when present, raw text otherwise.
    Tagged,
}

impl InboundFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            InboundFormat::Raw => "raw",
            InboundFormat::Tagged => "tagged",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "raw" => Some(InboundFormat::Raw),
            "tagged" => Some(InboundFormat::Tagged),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct TaggedFrame {
    sender: Sender,
    text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundFrame {
    pub sender: Sender,
    pub text: String,
}

impl InboundFrame {
    pub fn decode(raw: &str, format: InboundFormat) -> Self {
        if format == InboundFormat::Tagged {
            if let Ok(tagged) = serde_json::from_str::<TaggedFrame>(raw) {
                if tagged.sender.is_remote() {
                    return Self {
                        sender: tagged.sender,
                        text: tagged.text,
                    };
                }
            }
        }
        Self {
            sender: classify_inbound(raw),
            text: raw.to_string(),
        }
    }
}
