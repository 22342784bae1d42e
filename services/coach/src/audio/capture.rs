//! Microphone capture, resampled to the 16 kHz wire rate.
//!
//! The cpal input callback does the minimum possible work: downmix to mono
//! and push into a lock-free ring buffer. A worker loop on the stream's own
//! thread drains the ring, resamples to 16 kHz and forwards one resampler
//! frame at a time to the session. There is no other buffering, so
//! backpressure is whatever the forwarding channel provides.

use crate::audio_utils;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::HeapRb;
use ringbuf::traits::{Consumer, Producer, Split};
use rubato::Resampler;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Number of input frames fed to the resampler at a time.
const RESAMPLER_CHUNK: usize = 512;

/// An open microphone stream. Closing (or dropping) releases the device.
pub struct MicCapture {
    shutdown: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl MicCapture {
    /// Acquires the default input device and starts forwarding 16 kHz mono
    /// frames to `frames`. Fails if there is no usable input device, which
    /// is also how a denied microphone permission surfaces.
    pub fn open(frames: mpsc::Sender<Vec<f32>>, wire_rate: u32) -> anyhow::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = shutdown.clone();
        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<anyhow::Result<()>>();

        let thread = thread::Builder::new()
            .name("mic-capture".to_string())
            .spawn(move || run_capture(frames, wire_rate, thread_shutdown, ready_tx))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                shutdown,
                thread: Some(thread),
            }),
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(anyhow::anyhow!("microphone thread exited during startup"))
            }
        }
    }

    /// Stops the stream and releases the device.
    pub fn close(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("microphone thread panicked during shutdown");
            }
        }
    }
}

impl Drop for MicCapture {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}

/// Owns the input stream for its whole lifetime and runs the resample loop.
fn run_capture(
    frames: mpsc::Sender<Vec<f32>>,
    wire_rate: u32,
    shutdown: Arc<AtomicBool>,
    ready_tx: std::sync::mpsc::Sender<anyhow::Result<()>>,
) {
    let setup = || -> anyhow::Result<(cpal::Stream, u32, ringbuf::HeapCons<f32>)> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or_else(|| {
            anyhow::anyhow!("no audio input device available (microphone denied or missing)")
        })?;
        let supported = device.default_input_config()?;
        let device_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        info!(device_rate, channels, "opening microphone stream");

        // One second of headroom between the realtime callback and the
        // resample loop.
        let ring = HeapRb::<f32>::new(device_rate as usize);
        let (mut producer, consumer) = ring.split();

        let config = supported.config();
        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _| push_mono(&mut producer, data, channels),
                |e| error!(error = %e, "microphone stream error"),
                None,
            )?,
            cpal::SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _| {
                    let as_f32: Vec<f32> =
                        data.iter().map(|&s| s as f32 / 32768.0).collect();
                    push_mono(&mut producer, &as_f32, channels);
                },
                |e| error!(error = %e, "microphone stream error"),
                None,
            )?,
            other => anyhow::bail!("unsupported microphone sample format: {other}"),
        };
        stream.play()?;
        Ok((stream, device_rate, consumer))
    };

    let (stream, device_rate, mut consumer) = match setup() {
        Ok(parts) => parts,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    let mut resampler =
        match audio_utils::create_resampler(device_rate as f64, wire_rate as f64, RESAMPLER_CHUNK)
        {
            Ok(resampler) => resampler,
            Err(e) => {
                let _ = ready_tx.send(Err(e));
                return;
            }
        };
    let _ = ready_tx.send(Ok(()));

    let mut pending: Vec<f32> = Vec::with_capacity(RESAMPLER_CHUNK * 2);
    while !shutdown.load(Ordering::Relaxed) {
        pending.extend(consumer.pop_iter());

        while pending.len() >= resampler.input_frames_next() {
            let take = resampler.input_frames_next();
            let chunk: Vec<f32> = pending.drain(..take).collect();
            match resampler.process(&[chunk], None) {
                Ok(mut resampled) => {
                    let frame = resampled.swap_remove(0);
                    if frames.blocking_send(frame).is_err() {
                        // Session side went away; stop capturing.
                        return;
                    }
                }
                Err(e) => warn!(error = %e, "resampler error; dropping frame"),
            }
        }
        thread::sleep(Duration::from_millis(10));
    }
    drop(stream);
}

/// Downmixes interleaved samples to mono and pushes them into the ring.
/// Overflow drops samples; a late consumer is preferable to blocking the
/// realtime callback.
fn push_mono(producer: &mut ringbuf::HeapProd<f32>, data: &[f32], channels: usize) {
    if channels <= 1 {
        for &sample in data {
            let _ = producer.try_push(sample);
        }
    } else {
        for frame in data.chunks_exact(channels) {
            let sum: f32 = frame.iter().sum();
            let _ = producer.try_push(sum / channels as f32);
        }
    }
}
