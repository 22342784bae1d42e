//! The live practice session lifecycle.
//!
//! One [`SessionManager`] owns at most one live session at a time: the
//! microphone capture feeding it, the playback timeline draining it, the
//! conversation transcript, and the pump task that dispatches session events
//! in arrival order. Starting a session always tears the previous one down
//! first; teardown is idempotent and safe to run with nothing active.

use crate::audio::capture::MicCapture;
use crate::audio::playback::{AudioOutput, Timeline};
use crate::audio_utils;
use cadence_core::{Conversation, Message};
use gemini_live::wire::ServerContent;
use gemini_live::{LIVE_INPUT_SAMPLE_RATE, LIVE_OUTPUT_SAMPLE_RATE, LiveConfig, LiveEvent, LiveSession};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Which kind of session is running. The main coaching conversation and a
/// lesson practice session share the one-live-session invariant; the UI
/// renders them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Coaching,
    LessonPractice,
}

/// Connection status observable by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Inactive,
    Connecting,
    Active(SessionKind),
}

/// Updates pushed to the front-end, in event arrival order.
#[derive(Debug)]
pub enum UiEvent {
    Status(SessionStatus),
    /// Snapshot of the in-flight user transcription.
    PartialInput(String),
    /// Snapshot of the in-flight model transcription.
    PartialOutput(String),
    /// Messages committed to the transcript at a turn boundary (or seeded
    /// at session start).
    Committed(Vec<Message>),
    /// A mid-session failure. The front-end answers by calling
    /// [`SessionManager::stop`].
    SessionError(String),
    /// The remote side closed the session. Same teardown path as an error.
    SessionClosed,
}

/// Credentials and model selection for opening live sessions. Absent when
/// initialization failed; every `start` then fails fast.
#[derive(Debug, Clone)]
pub struct LiveSettings {
    pub api_key: String,
    pub model: String,
    pub voice: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("AI is not initialized. Please check the API key.")]
    NotInitialized,
    #[error("Failed to start session. Please check microphone permissions.")]
    Microphone(#[source] anyhow::Error),
    #[error("Failed to start session. Please check your audio output device.")]
    AudioOutput(#[source] anyhow::Error),
    #[error("Failed to start session. Please try again.")]
    Connect(#[source] gemini_live::LiveError),
}

/// Resources owned by one live session, created by `start` and dropped as a
/// unit by `stop`.
struct ActiveSession {
    session: Arc<LiveSession>,
    pump: JoinHandle<()>,
    mic_pump: JoinHandle<()>,
    mic: MicCapture,
    output: AudioOutput,
}

pub struct SessionManager {
    settings: Option<LiveSettings>,
    conversation: Arc<Mutex<Conversation>>,
    status: Arc<watch::Sender<SessionStatus>>,
    ui_tx: mpsc::Sender<UiEvent>,
    active: Option<ActiveSession>,
}

impl SessionManager {
    /// `settings: None` models a failed client initialization: the manager
    /// still exists, but every `start` fails fast.
    pub fn new(settings: Option<LiveSettings>, ui_tx: mpsc::Sender<UiEvent>) -> Self {
        let (status, _) = watch::channel(SessionStatus::Inactive);
        Self {
            settings,
            conversation: Arc::new(Mutex::new(Conversation::new())),
            status: Arc::new(status),
            ui_tx,
            active: None,
        }
    }

    /// Current status, for renders outside the event stream.
    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    /// Snapshot of the committed transcript.
    pub fn history(&self) -> Vec<Message> {
        self.conversation
            .lock()
            .map(|conv| conv.history().to_vec())
            .unwrap_or_default()
    }

    /// Opens a new live session.
    ///
    /// Any existing session is stopped first, the conversation is reset to
    /// the seed messages, the microphone and output device are acquired and
    /// the streaming session is opened with transcription enabled on both
    /// directions. On failure every acquired resource is released and the
    /// manager is back in the inactive state.
    pub async fn start(
        &mut self,
        kind: SessionKind,
        system_instruction: &str,
        initial_messages: Vec<Message>,
    ) -> Result<(), StartError> {
        if self.settings.is_none() {
            return Err(StartError::NotInitialized);
        }

        self.stop().await;
        self.publish_status(SessionStatus::Connecting).await;
        self.reset_conversation(initial_messages.clone());
        if !initial_messages.is_empty() {
            let _ = self.ui_tx.send(UiEvent::Committed(initial_messages)).await;
        }

        match self.open_session(kind, system_instruction).await {
            Ok(active) => {
                self.active = Some(active);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "session start failed");
                self.reset_conversation(Vec::new());
                self.publish_status(SessionStatus::Inactive).await;
                Err(e)
            }
        }
    }

    async fn open_session(
        &mut self,
        kind: SessionKind,
        system_instruction: &str,
    ) -> Result<ActiveSession, StartError> {
        let settings = self
            .settings
            .clone()
            .ok_or(StartError::NotInitialized)?;

        let output =
            AudioOutput::open(LIVE_OUTPUT_SAMPLE_RATE).map_err(StartError::AudioOutput)?;

        let (frames_tx, mut frames_rx) = mpsc::channel::<Vec<f32>>(64);
        let mic =
            MicCapture::open(frames_tx, LIVE_INPUT_SAMPLE_RATE).map_err(StartError::Microphone)?;

        let (session, events) = LiveSession::connect(LiveConfig {
            api_key: settings.api_key,
            model: settings.model,
            voice: settings.voice,
            system_instruction: system_instruction.to_string(),
        })
        .await
        .map_err(StartError::Connect)?;
        let session = Arc::new(session);

        // Microphone frames go out the moment they arrive.
        let mic_session = session.clone();
        let mic_pump = tokio::spawn(async move {
            while let Some(frame) = frames_rx.recv().await {
                let pcm = audio_utils::f32_to_pcm16(&frame);
                mic_session.send_audio(pcm).await;
            }
        });

        let pump = tokio::spawn(run_event_loop(
            events,
            kind,
            self.conversation.clone(),
            output.timeline(),
            self.status.clone(),
            self.ui_tx.clone(),
        ));

        info!(?kind, "live session starting");
        Ok(ActiveSession {
            session,
            pump,
            mic_pump,
            mic,
            output,
        })
    }

    /// Tears down the active session, if any.
    ///
    /// Closes the remote session best-effort, releases the microphone,
    /// stops and clears all scheduled playback, rewinds the playback clock
    /// and clears the status flags and conversation state. A no-op when
    /// nothing is active, and always safe to call again.
    pub async fn stop(&mut self) {
        let Some(active) = self.active.take() else {
            // Nothing to tear down; leave observable state untouched.
            return;
        };

        active.session.close().await;
        active.session.abort();
        active.pump.abort();
        active.mic_pump.abort();
        active.mic.close();
        if let Ok(mut timeline) = active.output.timeline().lock() {
            timeline.reset();
        }
        active.output.close();

        self.reset_conversation(Vec::new());
        self.publish_status(SessionStatus::Inactive).await;
        info!("live session stopped");
    }

    fn reset_conversation(&self, initial: Vec<Message>) {
        if let Ok(mut conv) = self.conversation.lock() {
            *conv = Conversation::with_history(initial);
        }
    }

    async fn publish_status(&self, status: SessionStatus) {
        self.status.send_replace(status);
        let _ = self.ui_tx.send(UiEvent::Status(status)).await;
    }
}

/// Dispatches live session events in arrival order.
///
/// Runs until the session errors, closes, or the pump is aborted by
/// teardown. The front-end completes the teardown by calling
/// [`SessionManager::stop`] when it sees `SessionError`/`SessionClosed`;
/// both are safe even if a new session has already replaced this one.
async fn run_event_loop(
    mut events: mpsc::Receiver<LiveEvent>,
    kind: SessionKind,
    conversation: Arc<Mutex<Conversation>>,
    timeline: Arc<Mutex<Timeline>>,
    status: Arc<watch::Sender<SessionStatus>>,
    ui_tx: mpsc::Sender<UiEvent>,
) {
    while let Some(event) = events.recv().await {
        match event {
            LiveEvent::Opened => {
                status.send_replace(SessionStatus::Active(kind));
                let _ = ui_tx
                    .send(UiEvent::Status(SessionStatus::Active(kind)))
                    .await;
            }
            LiveEvent::Message(content) => {
                handle_server_content(content, &conversation, &timeline, &ui_tx).await;
            }
            LiveEvent::Error(reason) => {
                error!(%reason, "live session error");
                let _ = ui_tx
                    .send(UiEvent::SessionError(
                        "An error occurred. Please try again.".to_string(),
                    ))
                    .await;
                break;
            }
            LiveEvent::Closed => {
                info!("live session closed by remote side");
                let _ = ui_tx.send(UiEvent::SessionClosed).await;
                break;
            }
        }
    }
}

/// Applies one content message: schedules audio, honors barge-in, extends
/// the transcript accumulators and commits them at turn boundaries.
async fn handle_server_content(
    content: ServerContent,
    conversation: &Arc<Mutex<Conversation>>,
    timeline: &Arc<Mutex<Timeline>>,
    ui_tx: &mpsc::Sender<UiEvent>,
) {
    for payload in content.audio_payloads() {
        let samples = audio_utils::decode_base64_pcm16(payload);
        if samples.is_empty() {
            continue;
        }
        if let Ok(mut timeline) = timeline.lock() {
            timeline.schedule(samples);
        }
    }

    if content.is_interrupted() {
        if let Ok(mut timeline) = timeline.lock() {
            timeline.interrupt();
        }
    }

    let mut partial_input = None;
    let mut partial_output = None;
    let mut committed = Vec::new();
    let mut turn_complete = false;
    if let Ok(mut conv) = conversation.lock() {
        if let Some(transcription) = &content.input_transcription {
            conv.append_input(&transcription.text);
            partial_input = Some(conv.current_input().to_string());
        }
        if let Some(transcription) = &content.output_transcription {
            conv.append_output(&transcription.text);
            partial_output = Some(conv.current_output().to_string());
        }
        if content.is_turn_complete() {
            committed = conv.commit_turn();
            turn_complete = true;
        }
    }

    if let Some(text) = partial_input {
        let _ = ui_tx.send(UiEvent::PartialInput(text)).await;
    }
    if let Some(text) = partial_output {
        let _ = ui_tx.send(UiEvent::PartialOutput(text)).await;
    }
    if turn_complete {
        if !committed.is_empty() {
            let _ = ui_tx.send(UiEvent::Committed(committed)).await;
        }
        let _ = ui_tx.send(UiEvent::PartialInput(String::new())).await;
        let _ = ui_tx.send(UiEvent::PartialOutput(String::new())).await;
    }
}
