//! The turn-based conversation accumulator.
//!
//! Partial speech-to-text fragments stream in for both sides of the call and
//! are buffered here until the remote service signals a turn boundary, at
//! which point the non-empty accumulators are committed to the history as
//! discrete messages.

use crate::message::{Message, Sender};

/// Conversation state for one live session.
///
/// `history` holds committed messages in strict append order. The two
/// accumulators collect transcription fragments for the in-flight turn and
/// are flushed together by [`Conversation::commit_turn`]. The session
/// orchestration owns this value exclusively; it is rebuilt on every session
/// start and dropped on stop.
#[derive(Debug, Default)]
pub struct Conversation {
    history: Vec<Message>,
    current_input: String,
    current_output: String,
    next_id: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a conversation seeded with initial messages (e.g. the system
    /// greeting shown when a practice session starts).
    pub fn with_history(initial: Vec<Message>) -> Self {
        let next_id = initial.iter().map(|m| m.id + 1).max().unwrap_or(0);
        Self {
            history: initial,
            current_input: String::new(),
            current_output: String::new(),
            next_id,
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// The user-side transcription fragment for the turn in progress.
    pub fn current_input(&self) -> &str {
        &self.current_input
    }

    /// The model-side transcription fragment for the turn in progress.
    pub fn current_output(&self) -> &str {
        &self.current_output
    }

    /// Appends a fragment of the user's speech transcription.
    pub fn append_input(&mut self, fragment: &str) {
        self.current_input.push_str(fragment);
    }

    /// Appends a fragment of the model's speech transcription.
    pub fn append_output(&mut self, fragment: &str) {
        self.current_output.push_str(fragment);
    }

    /// Flushes the accumulators into the history at a turn boundary.
    ///
    /// Within a turn the user message (if any) always precedes the model
    /// message (if any); blank accumulators commit nothing. Both
    /// accumulators are empty afterwards. Returns the newly committed
    /// messages so callers can surface them to the UI.
    pub fn commit_turn(&mut self) -> Vec<Message> {
        let mut committed = Vec::new();
        let input = self.current_input.trim();
        if !input.is_empty() {
            committed.push(self.push(Sender::User, input.to_string()));
        }
        let output = self.current_output.trim();
        if !output.is_empty() {
            committed.push(self.push(Sender::Model, output.to_string()));
        }
        self.current_input.clear();
        self.current_output.clear();
        committed
    }

    fn push(&mut self, sender: Sender, text: String) -> Message {
        let msg = Message::new(self.next_id, sender, text);
        self.next_id += 1;
        self.history.push(msg.clone());
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_with_input_only_creates_one_user_message() {
        let mut conv = Conversation::new();
        conv.append_input("hello ");
        conv.append_input("there");
        let committed = conv.commit_turn();

        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].sender, Sender::User);
        assert_eq!(committed[0].text, "hello there");
        assert_eq!(conv.history().len(), 1);
        assert!(conv.current_input().is_empty());
        assert!(conv.current_output().is_empty());
    }

    #[test]
    fn user_message_precedes_model_message_within_a_turn() {
        let mut conv = Conversation::new();
        conv.append_input("how do I pause?");
        conv.append_output("Leave a beat after the key word.");
        let committed = conv.commit_turn();

        assert_eq!(committed.len(), 2);
        assert_eq!(committed[0].sender, Sender::User);
        assert_eq!(committed[1].sender, Sender::Model);
        assert!(committed[0].id < committed[1].id);
    }

    #[test]
    fn history_grows_monotonically_across_turns() {
        let mut conv = Conversation::new();
        for turn in 0..4 {
            conv.append_input(&format!("turn {turn}"));
            conv.append_output("noted");
            let before = conv.history().len();
            conv.commit_turn();
            assert_eq!(conv.history().len(), before + 2);
            assert!(conv.current_input().is_empty());
            assert!(conv.current_output().is_empty());
        }
        // Strict append order: ids are strictly increasing.
        let ids: Vec<u64> = conv.history().iter().map(|m| m.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn blank_accumulators_commit_nothing() {
        let mut conv = Conversation::new();
        conv.append_input("   ");
        let committed = conv.commit_turn();
        assert!(committed.is_empty());
        assert!(conv.history().is_empty());
    }

    #[test]
    fn whitespace_is_trimmed_on_commit() {
        let mut conv = Conversation::new();
        conv.append_output("  steady pacing.  ");
        let committed = conv.commit_turn();
        assert_eq!(committed[0].text, "steady pacing.");
    }

    #[test]
    fn seeded_history_keeps_ids_unique() {
        let seed = vec![Message::new(0, Sender::System, "Session started.")];
        let mut conv = Conversation::with_history(seed);
        conv.append_input("hi");
        let committed = conv.commit_turn();
        assert_eq!(committed[0].id, 1);
        assert_eq!(conv.history().len(), 2);
    }
}
