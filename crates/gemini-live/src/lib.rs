//! Client for Google's Gemini speech APIs.
//!
//! Two collaborators live here, both treated as opaque services behind small
//! adapters:
//!
//! - `session`: the `BidiGenerateContent` realtime WebSocket session used for
//!   live voice conversations (audio in, audio out, transcription both ways).
//! - `tts`: the one-shot `generateContent` call that renders a fixed text to
//!   a single synthesized audio payload.
//!
//! The wire protocol itself is confined to `wire`; consumers only see the
//! [`LiveEvent`] stream and the digested payload types.

pub mod session;
pub mod tts;
pub mod wire;

pub use session::{LiveConfig, LiveError, LiveSession};
pub use tts::{GeminiTts, SpeechSynthesizer, SynthesisError, TtsConfig};

/// Sample rate of microphone audio sent into a live session, in Hz (mono).
pub const LIVE_INPUT_SAMPLE_RATE: u32 = 16_000;

/// Sample rate of all synthesized audio received from the service, in Hz
/// (mono). Applies to both live-session chunks and TTS clips.
pub const LIVE_OUTPUT_SAMPLE_RATE: u32 = 24_000;

/// Events emitted by an open live session, in arrival order.
///
/// This is the explicit form of the four callbacks the service exposes
/// (open/message/error/close); the consumer dispatches them on a single
/// task, so no event handling ever races another.
#[derive(Debug)]
pub enum LiveEvent {
    /// The session handshake completed; the service is ready for audio.
    Opened,
    /// A content message: audio chunks, transcription fragments, an
    /// interruption signal, or a turn boundary.
    Message(wire::ServerContent),
    /// The transport or the service reported an error. The session is dead.
    Error(String),
    /// The server closed the connection.
    Closed,
}
