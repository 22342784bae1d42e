//! The realtime voice session: connection, setup handshake, event pump.
//!
//! One [`LiveSession`] wraps one WebSocket connection. Outbound microphone
//! frames and the close request go through an mpsc channel into a background
//! pump task; everything the server sends comes back as [`LiveEvent`]s on a
//! second channel, so the consumer handles all four callback kinds in
//! arrival order on a single task.

use crate::{LIVE_INPUT_SAMPLE_RATE, LiveEvent, wire};
use base64::Engine;
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message as WsMessage,
};
use tracing::{error, info, warn};

const LIVE_ENDPOINT: &str = "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

/// Everything needed to open one live session.
#[derive(Debug, Clone)]
pub struct LiveConfig {
    pub api_key: String,
    /// Model resource name, e.g. `models/gemini-2.5-flash-native-audio-preview-09-2025`.
    pub model: String,
    /// Prebuilt voice for the synthesized replies.
    pub voice: String,
    /// Free-text system instruction establishing the coach persona.
    pub system_instruction: String,
}

#[derive(Debug, Error)]
pub enum LiveError {
    #[error("could not reach the live session endpoint: {0}")]
    Connect(#[source] tokio_tungstenite::tungstenite::Error),
    #[error("could not send the session setup message: {0}")]
    Setup(#[source] tokio_tungstenite::tungstenite::Error),
    #[error("failed to encode a protocol message: {0}")]
    Encode(#[from] serde_json::Error),
}

enum Outbound {
    Audio(Vec<i16>),
    Close,
}

/// Handle to an open session. Dropping it alone does not stop the pump;
/// callers close and then abort, which is what the lifecycle manager's
/// teardown does.
pub struct LiveSession {
    outbound: mpsc::Sender<Outbound>,
    pump: JoinHandle<()>,
}

impl LiveSession {
    /// Connects, sends the setup message and spawns the event pump.
    ///
    /// Returns the session handle and the event receiver. The handshake is
    /// not awaited here: [`LiveEvent::Opened`] arrives on the receiver once
    /// the server acknowledges the setup, mirroring the service's async
    /// "opened" callback.
    pub async fn connect(
        cfg: LiveConfig,
    ) -> Result<(Self, mpsc::Receiver<LiveEvent>), LiveError> {
        let url = format!("{LIVE_ENDPOINT}?key={}", cfg.api_key);
        let (mut ws, _) = connect_async(url).await.map_err(LiveError::Connect)?;
        info!(model = %cfg.model, "connected to live session endpoint");

        let setup = wire::ClientMessage::Setup(wire::Setup {
            model: cfg.model,
            generation_config: wire::GenerationConfig {
                response_modalities: vec![wire::ResponseModality::Audio],
                speech_config: Some(wire::SpeechConfig {
                    voice_config: wire::VoiceConfig {
                        prebuilt_voice_config: wire::PrebuiltVoiceConfig {
                            voice_name: cfg.voice,
                        },
                    },
                }),
            },
            system_instruction: Some(wire::Content::system_text(cfg.system_instruction)),
            input_audio_transcription: Some(wire::TranscriptionConfig::default()),
            output_audio_transcription: Some(wire::TranscriptionConfig::default()),
        });
        let payload = serde_json::to_string(&setup)?;
        ws.send(WsMessage::Text(payload.into()))
            .await
            .map_err(LiveError::Setup)?;

        let (outbound_tx, outbound_rx) = mpsc::channel(128);
        let (event_tx, event_rx) = mpsc::channel(256);
        let pump = tokio::spawn(run(ws, outbound_rx, event_tx));

        Ok((
            Self {
                outbound: outbound_tx,
                pump,
            },
            event_rx,
        ))
    }

    /// Sends one microphone frame (16 kHz mono PCM16). Frames are forwarded
    /// immediately; backpressure is whatever the transport provides.
    pub async fn send_audio(&self, frame: Vec<i16>) {
        if self.outbound.send(Outbound::Audio(frame)).await.is_err() {
            warn!("dropping microphone frame: session pump has exited");
        }
    }

    /// Requests a graceful close. Best-effort: if the pump already exited
    /// there is nothing left to close.
    pub async fn close(&self) {
        let _ = self.outbound.send(Outbound::Close).await;
    }

    /// Hard-stops the pump task. Used by teardown after `close` so a stuck
    /// transport can never outlive the session that owned it.
    pub fn abort(&self) {
        self.pump.abort();
    }
}

/// The session event pump: forwards outbound frames, translates inbound
/// frames into [`LiveEvent`]s, and exits on close or transport error.
async fn run(
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    mut outbound: mpsc::Receiver<Outbound>,
    events: mpsc::Sender<LiveEvent>,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();
    let mut is_ready = false;

    loop {
        tokio::select! {
            Some(cmd) = outbound.recv() => match cmd {
                Outbound::Audio(frame) => {
                    if !is_ready {
                        warn!("dropping audio frame sent before setup completed");
                        continue;
                    }
                    let msg = encode_audio_frame(&frame);
                    let payload = match serde_json::to_string(&msg) {
                        Ok(payload) => payload,
                        Err(e) => {
                            error!(error = %e, "failed to encode audio frame");
                            continue;
                        }
                    };
                    if let Err(e) = ws_tx.send(WsMessage::Text(payload.into())).await {
                        error!(error = %e, "failed to send audio frame");
                        let _ = events.send(LiveEvent::Error(e.to_string())).await;
                        break;
                    }
                }
                Outbound::Close => {
                    let _ = ws_tx.close().await;
                    break;
                }
            },
            Some(msg_result) = ws_rx.next() => match msg_result {
                Ok(WsMessage::Text(text)) => match serde_json::from_str::<wire::ServerMessage>(&text) {
                    Ok(server_msg) => {
                        if server_msg.setup_complete.is_some() && !is_ready {
                            is_ready = true;
                            info!("live session setup complete");
                            if events.send(LiveEvent::Opened).await.is_err() {
                                break;
                            }
                        }
                        if let Some(content) = server_msg.server_content {
                            if events.send(LiveEvent::Message(content)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "ignoring unparseable server message");
                    }
                },
                Ok(WsMessage::Close(frame)) => {
                    info!(?frame, "live session closed by server");
                    let _ = events.send(LiveEvent::Closed).await;
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "error reading from live session socket");
                    let _ = events.send(LiveEvent::Error(e.to_string())).await;
                    break;
                }
            },
            else => {
                let _ = events.send(LiveEvent::Closed).await;
                break;
            }
        }
    }
}

/// Packs one PCM16 frame into the realtime-input wire message.
fn encode_audio_frame(frame: &[i16]) -> wire::ClientMessage {
    let mut bytes = Vec::with_capacity(frame.len() * 2);
    for sample in frame {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    wire::ClientMessage::RealtimeInput(wire::RealtimeInput {
        audio: wire::Blob {
            mime_type: format!("audio/pcm;rate={LIVE_INPUT_SAMPLE_RATE}"),
            data: base64::engine::general_purpose::STANDARD.encode(&bytes),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_frame_encodes_as_little_endian_base64() {
        let msg = encode_audio_frame(&[0x0102, -2]);
        let value = serde_json::to_value(&msg).unwrap();
        let data = value["realtimeInput"]["audio"]["data"].as_str().unwrap();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data)
            .unwrap();
        assert_eq!(bytes, vec![0x02, 0x01, 0xFE, 0xFF]);
    }

    #[test]
    fn audio_frame_declares_the_capture_rate() {
        let msg = encode_audio_frame(&[]);
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value["realtimeInput"]["audio"]["mimeType"],
            "audio/pcm;rate=16000"
        );
    }
}
