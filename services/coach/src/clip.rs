//! On-demand playback of synthesized lesson samples.
//!
//! A clip is one rendering of a fixed text. The first play request
//! synthesizes and caches the decoded buffer; later requests replay the
//! cache with no second synthesis call. There is no pause/resume: stopping a
//! clip discards the in-flight playback and resets progress to zero.

use crate::audio::playback::{AudioOutput, Timeline};
use crate::audio_utils;
use gemini_live::{LIVE_OUTPUT_SAMPLE_RATE, SpeechSynthesizer, SynthesisError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

/// How often playback progress is derived and published.
const PROGRESS_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Clip player state machine: `Idle → Loading → Ready → Playing → Idle`,
/// with `Loading → Idle` on synthesis failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipState {
    Idle,
    Loading,
    Ready,
    Playing,
}

/// Events published while a clip plays.
#[derive(Debug)]
pub enum ClipEvent {
    /// Progress percentage in [0, 100], derived from elapsed time and only
    /// published while it is still within range.
    Progress(f32),
    /// The clip reached its natural end.
    Finished,
}

#[derive(Debug, thiserror::Error)]
pub enum ClipError {
    #[error("AI is not initialized. Please check the API key.")]
    NotInitialized,
    #[error("Could not generate audio.")]
    Synthesis(#[source] SynthesisError),
    #[error("Could not open the audio output device.")]
    Audio(#[source] anyhow::Error),
}

struct PlayingClip {
    output: AudioOutput,
    poll: JoinHandle<()>,
}

/// Plays one clip at a time, caching every buffer it has synthesized.
pub struct ClipPlayer {
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    cache: HashMap<String, Arc<Vec<f32>>>,
    state: ClipState,
    current: Option<PlayingClip>,
    events: mpsc::Sender<ClipEvent>,
}

impl ClipPlayer {
    /// `synthesizer: None` models a failed client initialization; every
    /// play request then fails fast.
    pub fn new(
        synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
        events: mpsc::Sender<ClipEvent>,
    ) -> Self {
        Self {
            synthesizer,
            cache: HashMap::new(),
            state: ClipState::Idle,
            current: None,
            events,
        }
    }

    pub fn state(&self) -> ClipState {
        self.state
    }

    /// Plays the clip for `text`, synthesizing it first if it is not cached.
    ///
    /// Any clip already playing is stopped and discarded first (one active
    /// clip playback at a time). On synthesis failure the player returns to
    /// idle and the error carries the user-visible message.
    pub async fn play(&mut self, text: &str) -> Result<(), ClipError> {
        if self.state == ClipState::Loading {
            // A synthesis request is already in flight for this player.
            return Ok(());
        }
        let buffer = self.ensure_buffer(text).await?;
        self.start_playback(buffer)
    }

    /// Unconditional stop-and-reset. Resuming from a saved offset is not
    /// supported; progress goes back to zero.
    pub fn stop(&mut self) {
        self.discard_playback();
        self.state = ClipState::Idle;
    }

    /// Forces idle and zero progress from any state.
    pub fn reset(&mut self) {
        self.stop();
    }

    /// Called by the front-end when it receives [`ClipEvent::Finished`],
    /// completing the natural end-of-clip transition back to idle.
    pub fn on_finished(&mut self) {
        if self.state == ClipState::Playing {
            self.discard_playback();
            self.state = ClipState::Idle;
        }
    }

    /// Returns the cached buffer for `text`, synthesizing and caching it on
    /// first use.
    async fn ensure_buffer(&mut self, text: &str) -> Result<Arc<Vec<f32>>, ClipError> {
        if let Some(buffer) = self.cache.get(text) {
            return Ok(buffer.clone());
        }
        let synthesizer = self
            .synthesizer
            .clone()
            .ok_or(ClipError::NotInitialized)?;

        self.state = ClipState::Loading;
        match synthesizer.synthesize(text).await {
            Ok(pcm) => {
                let buffer = Arc::new(audio_utils::pcm16_bytes_to_f32(&pcm));
                self.cache.insert(text.to_string(), buffer.clone());
                self.state = ClipState::Ready;
                Ok(buffer)
            }
            Err(e) => {
                warn!(error = %e, "clip synthesis failed");
                self.state = ClipState::Idle;
                Err(ClipError::Synthesis(e))
            }
        }
    }

    fn start_playback(&mut self, buffer: Arc<Vec<f32>>) -> Result<(), ClipError> {
        self.discard_playback();

        let output = AudioOutput::open(LIVE_OUTPUT_SAMPLE_RATE).map_err(ClipError::Audio)?;
        let timeline = output.timeline();
        let duration = buffer.len() as u64;
        let start = match timeline.lock() {
            Ok(mut timeline) => timeline.schedule(buffer.as_ref().clone()).1,
            Err(_) => 0,
        };

        let poll = tokio::spawn(poll_progress(timeline, start, duration, self.events.clone()));
        self.current = Some(PlayingClip { output, poll });
        self.state = ClipState::Playing;
        Ok(())
    }

    fn discard_playback(&mut self) {
        if let Some(current) = self.current.take() {
            current.poll.abort();
            if let Ok(mut timeline) = current.output.timeline().lock() {
                timeline.reset();
            }
            current.output.close();
        }
    }
}

/// Derives progress at a fixed interval instead of tracking it as state.
///
/// Progress is `elapsed / duration` where elapsed comes from the playback
/// clock; it is published only while it is at most 100%. When no chunk is
/// left in flight the clip ended naturally.
async fn poll_progress(
    timeline: Arc<Mutex<Timeline>>,
    start: u64,
    duration: u64,
    events: mpsc::Sender<ClipEvent>,
) {
    if duration == 0 {
        let _ = events.send(ClipEvent::Finished).await;
        return;
    }
    let mut ticker = tokio::time::interval(PROGRESS_POLL_INTERVAL);
    loop {
        ticker.tick().await;
        let (cursor, active) = match timeline.lock() {
            Ok(timeline) => (timeline.cursor(), timeline.active_count()),
            Err(_) => break,
        };
        if active == 0 && cursor >= start + duration {
            let _ = events.send(ClipEvent::Finished).await;
            break;
        }
        let elapsed = cursor.saturating_sub(start);
        let percent = elapsed as f32 / duration as f32 * 100.0;
        if percent <= 100.0 {
            let _ = events.send(ClipEvent::Progress(percent)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts synthesis calls and returns a fixed three-sample payload.
    struct CountingSynth {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSynth {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for CountingSynth {
        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, SynthesisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(SynthesisError::NoAudio)
            } else {
                // Three PCM16 samples.
                Ok(vec![0x00, 0x40, 0x00, 0x20, 0x00, 0x10])
            }
        }
    }

    fn player(synth: Arc<CountingSynth>) -> ClipPlayer {
        let (events, _rx) = mpsc::channel(8);
        ClipPlayer::new(Some(synth), events)
    }

    #[tokio::test]
    async fn second_request_reuses_the_cached_buffer() {
        let synth = CountingSynth::new(false);
        let mut player = player(synth.clone());

        let first = player.ensure_buffer("Deep Breathing").await.unwrap();
        let second = player.ensure_buffer("Deep Breathing").await.unwrap();

        assert_eq!(synth.calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 3);
    }

    #[tokio::test]
    async fn distinct_texts_are_cached_separately() {
        let synth = CountingSynth::new(false);
        let mut player = player(synth.clone());

        player.ensure_buffer("first sample").await.unwrap();
        player.ensure_buffer("second sample").await.unwrap();

        assert_eq!(synth.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn synthesis_failure_returns_the_player_to_idle() {
        let synth = CountingSynth::new(true);
        let mut player = player(synth);

        let result = player.ensure_buffer("anything").await;
        assert!(matches!(result, Err(ClipError::Synthesis(_))));
        assert_eq!(player.state(), ClipState::Idle);
    }

    #[tokio::test]
    async fn successful_load_passes_through_ready() {
        let synth = CountingSynth::new(false);
        let mut player = player(synth);

        player.ensure_buffer("sample").await.unwrap();
        assert_eq!(player.state(), ClipState::Ready);
    }

    #[tokio::test]
    async fn play_without_a_synthesizer_fails_fast() {
        let (events, _rx) = mpsc::channel(8);
        let mut player = ClipPlayer::new(None, events);

        let result = player.play("anything").await;
        assert!(matches!(result, Err(ClipError::NotInitialized)));
        assert_eq!(player.state(), ClipState::Idle);
    }

    #[tokio::test]
    async fn reset_from_idle_is_a_no_op() {
        let synth = CountingSynth::new(false);
        let mut player = player(synth);
        player.reset();
        assert_eq!(player.state(), ClipState::Idle);
    }

    #[tokio::test]
    async fn empty_clip_finishes_immediately() {
        let timeline = Arc::new(Mutex::new(Timeline::new()));
        let (events, mut rx) = mpsc::channel(8);
        poll_progress(timeline, 0, 0, events).await;
        assert!(matches!(rx.recv().await, Some(ClipEvent::Finished)));
    }
}
