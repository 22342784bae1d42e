//! Serde types for the `BidiGenerateContent` WebSocket protocol.
//!
//! Only the slice of the protocol this application speaks is modeled:
//! session setup, realtime audio input, and the server content messages
//! carrying synthesized audio, transcriptions, interruption and turn
//! boundary signals. Everything else the service may send is ignored at the
//! parse layer.

use serde::{Deserialize, Serialize};

// --- Client -> server ---

/// Top-level client message envelope.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub enum ClientMessage {
    Setup(Setup),
    RealtimeInput(RealtimeInput),
}

/// The first message on a new connection: selects the model and configures
/// the session for audio responses with transcription on both directions.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Setup {
    pub model: String,
    pub generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_audio_transcription: Option<TranscriptionConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_audio_transcription: Option<TranscriptionConfig>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<ResponseModality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseModality {
    Text,
    Audio,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

/// Enables transcription for one direction. The service takes an empty
/// object; presence is what switches the feature on.
#[derive(Serialize, Debug, Default)]
pub struct TranscriptionConfig {}

#[derive(Serialize, Debug)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

impl Content {
    /// A system-instruction content block holding one text part.
    pub fn system_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("system".to_string()),
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Serialize, Debug)]
pub struct Part {
    pub text: String,
}

/// One microphone frame, already in the wire format (base64 PCM16).
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeInput {
    pub audio: Blob,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

// --- Server -> client ---

/// Top-level server message envelope.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ServerMessage {
    pub setup_complete: Option<serde_json::Value>,
    pub server_content: Option<ServerContent>,
}

/// The content payload of one server message.
///
/// Any combination of fields may be present; absent fields mean "no signal".
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerContent {
    pub model_turn: Option<ModelTurn>,
    pub input_transcription: Option<Transcription>,
    pub output_transcription: Option<Transcription>,
    /// Barge-in: previously delivered audio should be discarded.
    pub interrupted: Option<bool>,
    /// One user utterance + model reply exchange is complete.
    pub turn_complete: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct ModelTurn {
    pub parts: Vec<ServerPart>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ServerPart {
    pub text: Option<String>,
    pub inline_data: Option<ServerBlob>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ServerBlob {
    pub mime_type: Option<String>,
    pub data: String,
}

#[derive(Deserialize, Debug)]
pub struct Transcription {
    pub text: String,
}

impl ServerContent {
    /// Base64 audio payloads of the model turn, in part order.
    pub fn audio_payloads(&self) -> impl Iterator<Item = &str> {
        self.model_turn
            .iter()
            .flat_map(|turn| turn.parts.iter())
            .filter_map(|part| part.inline_data.as_ref().map(|blob| blob.data.as_str()))
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted == Some(true)
    }

    pub fn is_turn_complete(&self) -> bool {
        self.turn_complete == Some(true)
    }
}
