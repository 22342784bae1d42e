//! One-shot text-to-speech synthesis.
//!
//! A clip is rendered with a single `generateContent` call requesting an
//! audio response. The service returns one complete base64 payload; there is
//! no streaming and no retry, a failed call is surfaced to the caller and
//! retried only when the user asks again.

use crate::wire;
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

const GENERATE_CONTENT_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Configuration for the synthesis collaborator.
#[derive(Debug, Clone)]
pub struct TtsConfig {
    pub api_key: String,
    /// Model identifier, e.g. `gemini-2.5-flash-preview-tts`.
    pub model: String,
    /// Prebuilt voice used for clip rendering.
    pub voice: String,
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("synthesis request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("no audio data received")]
    NoAudio,
    #[error("audio payload was not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// The contract for anything that can render text to one audio payload.
///
/// Abstracted so the clip player can be exercised in tests with a fake that
/// counts calls instead of hitting the network.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Renders `text` to one complete payload of raw PCM16 bytes at
    /// 24 kHz mono, little-endian.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError>;
}

/// The real synthesizer, backed by the Gemini TTS model.
pub struct GeminiTts {
    http: reqwest::Client,
    cfg: TtsConfig,
}

impl GeminiTts {
    pub fn new(cfg: TtsConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            cfg,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for GeminiTts {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let url = format!(
            "{GENERATE_CONTENT_BASE}/{}:generateContent?key={}",
            self.cfg.model, self.cfg.api_key
        );
        let request = GenerateContentRequest {
            contents: vec![wire::Content {
                role: None,
                parts: vec![wire::Part {
                    text: text.to_string(),
                }],
            }],
            generation_config: wire::GenerationConfig {
                response_modalities: vec![wire::ResponseModality::Audio],
                speech_config: Some(wire::SpeechConfig {
                    voice_config: wire::VoiceConfig {
                        prebuilt_voice_config: wire::PrebuiltVoiceConfig {
                            voice_name: self.cfg.voice.clone(),
                        },
                    },
                }),
            },
        };

        let response: GenerateContentResponse = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let payload = response
            .first_audio_payload()
            .ok_or(SynthesisError::NoAudio)?;
        let pcm = base64::engine::general_purpose::STANDARD.decode(payload)?;
        info!(chars = text.len(), bytes = pcm.len(), "synthesized clip");
        Ok(pcm)
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<wire::Content>,
    generation_config: wire::GenerationConfig,
}

#[derive(Deserialize, Debug, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CandidatePart {
    inline_data: Option<wire::ServerBlob>,
}

impl GenerateContentResponse {
    /// The first inline audio payload, if the service returned one.
    fn first_audio_payload(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .inline_data
            .as_ref()
            .map(|blob| blob.data.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_asks_for_audio_with_the_configured_voice() {
        let request = GenerateContentRequest {
            contents: vec![wire::Content {
                role: None,
                parts: vec![wire::Part {
                    text: "This is a huuuuge opportunity.".to_string(),
                }],
            }],
            generation_config: wire::GenerationConfig {
                response_modalities: vec![wire::ResponseModality::Audio],
                speech_config: Some(wire::SpeechConfig {
                    voice_config: wire::VoiceConfig {
                        prebuilt_voice_config: wire::PrebuiltVoiceConfig {
                            voice_name: "Kore".to_string(),
                        },
                    },
                }),
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["generationConfig"]["responseModalities"][0], "AUDIO");
        assert_eq!(
            value["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]
                ["voiceName"],
            "Kore"
        );
        assert_eq!(
            value["contents"][0]["parts"][0]["text"],
            "This is a huuuuge opportunity."
        );
    }

    #[test]
    fn first_audio_payload_walks_the_candidate_tree() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"parts": [{"inlineData": {"data": "cGNtIGJ5dGVz"}}]}
            }]
        }))
        .unwrap();
        assert_eq!(response.first_audio_payload(), Some("cGNtIGJ5dGVz"));
    }

    #[test]
    fn missing_audio_payload_is_none() {
        // Text-only candidate.
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "sorry"}]}}]
        }))
        .unwrap();
        assert!(response.first_audio_payload().is_none());

        // Empty response.
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.first_audio_payload().is_none());
    }
}
