//! Cadence Coach Core
//!
//! Domain logic shared by the coach application: the chat transcript model,
//! the turn-based conversation accumulator, and the static lesson/drill
//! curriculum. Everything in this crate is I/O-free and independent of the
//! audio and wire layers in the sibling crates.

pub mod conversation;
pub mod drill;
pub mod lesson;
pub mod message;

pub use conversation::Conversation;
pub use message::{Message, Sender};
