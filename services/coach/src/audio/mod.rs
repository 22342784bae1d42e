//! Audio device adapters.
//!
//! The host audio subsystem runs capture and playback callbacks on its own
//! realtime threads; the rest of the application only ever observes them
//! through channels and the shared playback timeline. Both adapters park
//! their `cpal` stream on a dedicated thread because streams are not `Send`.
//!
//! - `capture`: microphone input, resampled to the 16 kHz wire rate.
//! - `playback`: the scheduled-playback timeline and its output stream.

pub mod capture;
pub mod playback;
