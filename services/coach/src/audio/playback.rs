//! Gap-free scheduled playback.
//!
//! [`Timeline`] is the pure scheduling core: a frame-counted clock, an
//! ordered list of scheduled chunks and a "next start" watermark. Chunks are
//! always scheduled at `max(now, previous_scheduled_end)`, so successive
//! chunks play back-to-back without gaps or overlap. [`AudioOutput`] is the
//! thin cpal adapter that drains a shared timeline from the device callback.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

/// Identifies one scheduled chunk while it is in flight.
pub type ChunkId = u64;

#[derive(Debug)]
struct Scheduled {
    id: ChunkId,
    start: u64,
    samples: Vec<f32>,
}

/// The playback schedule for one output stream.
///
/// All positions are in frames (mono samples) since the timeline was
/// created. `cursor` is "now": the number of frames already handed to the
/// device. Invariants: chunks are sorted by start and never overlap, and a
/// chunk is removed the moment the cursor passes its end.
#[derive(Debug, Default)]
pub struct Timeline {
    cursor: u64,
    next_start: u64,
    chunks: VecDeque<Scheduled>,
    next_id: ChunkId,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a chunk at `max(now, previous_scheduled_end)` and returns
    /// its id and start position.
    pub fn schedule(&mut self, samples: Vec<f32>) -> (ChunkId, u64) {
        let start = self.cursor.max(self.next_start);
        self.next_start = start + samples.len() as u64;
        let id = self.next_id;
        self.next_id += 1;
        self.chunks.push_back(Scheduled { id, start, samples });
        (id, start)
    }

    /// Fills `out` with the next frames of the schedule (silence where no
    /// chunk covers the range), advances the clock, and returns the ids of
    /// chunks that finished inside this render.
    pub fn render(&mut self, out: &mut [f32]) -> Vec<ChunkId> {
        out.fill(0.0);
        let begin = self.cursor;
        let end = begin + out.len() as u64;

        for chunk in &self.chunks {
            let chunk_end = chunk.start + chunk.samples.len() as u64;
            let from = chunk.start.max(begin);
            let to = chunk_end.min(end);
            for t in from..to {
                out[(t - begin) as usize] = chunk.samples[(t - chunk.start) as usize];
            }
        }
        self.cursor = end;

        let mut finished = Vec::new();
        while self
            .chunks
            .front()
            .is_some_and(|c| c.start + c.samples.len() as u64 <= self.cursor)
        {
            if let Some(done) = self.chunks.pop_front() {
                finished.push(done.id);
            }
        }
        finished
    }

    /// Barge-in: discards every scheduled chunk immediately and resets the
    /// scheduling watermark to zero, so the next chunk starts at "now".
    pub fn interrupt(&mut self) {
        self.chunks.clear();
        self.next_start = 0;
    }

    /// Full reset: discard everything and rewind the clock itself.
    pub fn reset(&mut self) {
        self.chunks.clear();
        self.next_start = 0;
        self.cursor = 0;
    }

    /// Number of chunks scheduled or playing.
    pub fn active_count(&self) -> usize {
        self.chunks.len()
    }

    /// Frames handed to the device so far.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// The scheduling watermark (end of the last scheduled chunk).
    pub fn next_start(&self) -> u64 {
        self.next_start
    }
}

/// A mono output stream draining a shared [`Timeline`].
///
/// The cpal stream lives on its own thread for its whole lifetime; `close`
/// (or drop) signals that thread to stop and joins it.
pub struct AudioOutput {
    timeline: Arc<Mutex<Timeline>>,
    shutdown: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl AudioOutput {
    /// Opens the default output device at the given sample rate and starts
    /// draining a fresh timeline.
    pub fn open(sample_rate: u32) -> anyhow::Result<Self> {
        let timeline = Arc::new(Mutex::new(Timeline::new()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<anyhow::Result<()>>();
        let cb_timeline = timeline.clone();
        let thread_shutdown = shutdown.clone();

        let thread = thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || {
                let stream = match build_output_stream(sample_rate, cb_timeline) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                if let Err(e) = stream.play() {
                    let _ = ready_tx.send(Err(e.into()));
                    return;
                }
                let _ = ready_tx.send(Ok(()));
                while !thread_shutdown.load(Ordering::Relaxed) {
                    thread::sleep(Duration::from_millis(50));
                }
                drop(stream);
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                info!(sample_rate, "audio output stream started");
                Ok(Self {
                    timeline,
                    shutdown,
                    thread: Some(thread),
                })
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(anyhow::anyhow!("audio output thread exited during startup"))
            }
        }
    }

    /// The shared schedule this stream drains.
    pub fn timeline(&self) -> Arc<Mutex<Timeline>> {
        self.timeline.clone()
    }

    /// Stops the stream and joins its thread.
    pub fn close(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("audio output thread panicked during shutdown");
            }
        }
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}

fn build_output_stream(
    sample_rate: u32,
    timeline: Arc<Mutex<Timeline>>,
) -> anyhow::Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("no audio output device available"))?;

    let config = cpal::StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _| {
            if let Ok(mut timeline) = timeline.lock() {
                timeline.render(data);
            } else {
                data.fill(0.0);
            }
        },
        |e| error!(error = %e, "audio output stream error"),
        None,
    )?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_schedule_back_to_back_without_overlap() {
        let mut timeline = Timeline::new();
        let (_, s1) = timeline.schedule(vec![0.1; 100]);
        let (_, s2) = timeline.schedule(vec![0.2; 50]);
        let (_, s3) = timeline.schedule(vec![0.3; 25]);

        assert_eq!(s1, 0);
        assert_eq!(s2, s1 + 100);
        assert_eq!(s3, s2 + 50);
        assert_eq!(timeline.next_start(), 175);
    }

    #[test]
    fn starts_are_non_decreasing_for_chunks_arriving_mid_playback() {
        let mut timeline = Timeline::new();
        let mut out = vec![0.0; 64];
        let mut last_end = 0u64;

        for len in [100usize, 30, 200, 10] {
            let (_, start) = timeline.schedule(vec![0.5; len]);
            assert!(start >= last_end, "chunk overlaps its predecessor");
            last_end = start + len as u64;
            timeline.render(&mut out);
        }
    }

    #[test]
    fn a_chunk_arriving_after_silence_starts_at_now() {
        let mut timeline = Timeline::new();
        timeline.schedule(vec![0.1; 10]);
        let mut out = vec![0.0; 100];
        timeline.render(&mut out);

        // The schedule drained 90 frames ago; the next chunk must not be
        // scheduled in the past.
        let (_, start) = timeline.schedule(vec![0.2; 10]);
        assert_eq!(start, 100);
    }

    #[test]
    fn render_plays_samples_and_reports_finished_chunks() {
        let mut timeline = Timeline::new();
        let (id, _) = timeline.schedule(vec![0.5; 8]);

        let mut out = vec![0.0; 4];
        assert!(timeline.render(&mut out).is_empty());
        assert_eq!(out, vec![0.5; 4]);
        assert_eq!(timeline.active_count(), 1);

        let finished = timeline.render(&mut out);
        assert_eq!(finished, vec![id]);
        assert_eq!(timeline.active_count(), 0);

        // Past the schedule: silence.
        timeline.render(&mut out);
        assert_eq!(out, vec![0.0; 4]);
    }

    #[test]
    fn interruption_discards_everything_and_resets_the_clock() {
        let mut timeline = Timeline::new();
        timeline.schedule(vec![0.1; 500]);
        timeline.schedule(vec![0.2; 500]);
        timeline.schedule(vec![0.3; 500]);
        let mut out = vec![0.0; 100];
        timeline.render(&mut out);

        timeline.interrupt();
        assert_eq!(timeline.active_count(), 0);
        assert_eq!(timeline.next_start(), 0);

        // Playback after the barge-in resumes at "now", not at the old
        // watermark.
        let (_, start) = timeline.schedule(vec![0.4; 10]);
        assert_eq!(start, timeline.cursor());
    }

    #[test]
    fn reset_rewinds_the_clock_to_zero() {
        let mut timeline = Timeline::new();
        timeline.schedule(vec![0.1; 64]);
        let mut out = vec![0.0; 32];
        timeline.render(&mut out);

        timeline.reset();
        assert_eq!(timeline.cursor(), 0);
        assert_eq!(timeline.next_start(), 0);
        assert_eq!(timeline.active_count(), 0);
    }

    #[test]
    fn render_straddles_a_gap_between_chunks() {
        let mut timeline = Timeline::new();
        timeline.schedule(vec![1.0; 2]);
        let mut out = vec![0.0; 6];
        timeline.render(&mut out);
        assert_eq!(out, vec![1.0, 1.0, 0.0, 0.0, 0.0, 0.0]);

        // Next chunk starts at now (frame 6), not at the old end (frame 2).
        let (_, start) = timeline.schedule(vec![1.0; 2]);
        assert_eq!(start, 6);
    }
}
