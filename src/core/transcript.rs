use super::message::{Message, MessageId};

/// Ordered, append-only record of the conversation.
///
/// Entries are never edited or removed individually. [`Transcript::reset`]
/// swaps the whole sequence for a single welcome message, so the transcript
/// is never left empty by a reset.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) -> MessageId {
        let id = message.id;
        self.messages.push(message);
        id
    }

    pub fn reset(&mut self, welcome: Message) {
        self.messages = vec![welcome];
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Sender;

    #[test]
    fn reset_leaves_exactly_the_welcome() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("oi"));
        transcript.push(Message::inbound("olá"));
        transcript.reset(Message::agent("bem-vindo"));
        assert_eq!(transcript.len(), 1);
        let only = transcript.last().expect("welcome");
        assert_eq!(only.sender, Sender::Agent);
        assert_eq!(only.text, "bem-vindo");
    }

    #[test]
    fn push_preserves_arrival_order() {
        let mut transcript = Transcript::new();
        let first = transcript.push(Message::user("1"));
        let second = transcript.push(Message::inbound("2"));
        let ids: Vec<_> = transcript.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![first, second]);
        assert_eq!(transcript.get(second).map(|m| m.text.as_str()), Some("2"));
    }
}
