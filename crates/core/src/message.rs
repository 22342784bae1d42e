//! The chat transcript message model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Model,
    System,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Model => write!(f, "model"),
            Sender::System => write!(f, "system"),
        }
    }
}

/// One committed entry in the conversation transcript.
///
/// Messages are immutable once created: they are appended to the history in
/// insertion order and never edited or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn new(id: u64, sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id,
            sender,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Sender::Model).unwrap(), "\"model\"");
        assert_eq!(
            serde_json::to_string(&Sender::System).unwrap(),
            "\"system\""
        );
    }

    #[test]
    fn sender_display_matches_wire_form() {
        assert_eq!(Sender::User.to_string(), "user");
        assert_eq!(Sender::Model.to_string(), "model");
        assert_eq!(Sender::System.to_string(), "system");
    }

    #[test]
    fn message_round_trips_through_json() {
        let msg = Message::new(7, Sender::Model, "Try a longer pause there.");
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn unknown_sender_is_rejected() {
        let result: Result<Sender, _> = serde_json::from_str("\"assistant\"");
        assert!(result.is_err());
    }
}
