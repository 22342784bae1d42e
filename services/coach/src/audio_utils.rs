//! PCM conversion helpers shared by the capture and playback paths.
//!
//! The wire contract is fixed: microphone audio leaves as 16 kHz mono PCM16
//! and all synthesized audio arrives as 24 kHz mono PCM16, base64-encoded
//! where it crosses the JSON protocol. Internally everything is f32 in
//! [-1.0, 1.0].

use base64::Engine;
use rubato::{FastFixedIn, PolynomialDegree};

/// Creates a mono resampler between two sample rates.
///
/// Used on the capture path to bring the device rate down to the 16 kHz the
/// session expects.
pub fn create_resampler(
    in_rate: f64,
    out_rate: f64,
    chunk_size: usize,
) -> anyhow::Result<FastFixedIn<f32>> {
    let resampler = FastFixedIn::<f32>::new(
        out_rate / in_rate,
        1.0,
        PolynomialDegree::Cubic,
        chunk_size,
        1,
    )?;
    Ok(resampler)
}

/// Decodes a base64 PCM16 payload into normalized f32 samples.
///
/// A malformed payload yields an empty buffer; the caller treats that as
/// "nothing to play" rather than an error, matching how a lost audio chunk
/// should degrade.
pub fn decode_base64_pcm16(payload: &str) -> Vec<f32> {
    match base64::engine::general_purpose::STANDARD.decode(payload) {
        Ok(bytes) => pcm16_bytes_to_f32(&bytes),
        Err(e) => {
            tracing::error!(error = %e, "failed to decode base64 audio payload");
            Vec::new()
        }
    }
}

/// Interprets raw little-endian PCM16 bytes as normalized f32 samples.
/// A trailing odd byte is dropped.
pub fn pcm16_bytes_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| {
            let v = i16::from_le_bytes([pair[0], pair[1]]);
            (v as f32 / 32768.0).clamp(-1.0, 1.0)
        })
        .collect()
}

/// Converts normalized f32 samples to PCM16, clamping out-of-range values.
pub fn f32_to_pcm16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s * 32768.0).clamp(i16::MIN as f32, i16::MAX as f32) as i16)
        .collect()
}
