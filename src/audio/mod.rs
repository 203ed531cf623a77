//! Push-to-talk audio capture.
//!
//! Microphone samples arrive as fixed-size 16-bit mono chunks through a
//! [`ChunkSource`]. The capture state machine records while the trigger key is
//! held, keeps a short tail after release, and materializes the result as a
//! WAV file for the speech-to-text backend.

/// Default sample rate expected by downstream STT backends.
pub const DEFAULT_RATE: u32 = 16_000;

/// Default samples per capture chunk.
pub const DEFAULT_CHUNK_SAMPLES: usize = 1024;

mod capture;
mod meter;
mod source;
#[cfg(test)]
mod tests;
mod wav;

pub use capture::{
    run, CaptureConfig, CaptureMetrics, CaptureOutcome, CapturePhase, StopReason,
};
pub use meter::{peak_level, LiveLevel};
pub use source::{open_input, list_input_devices, ChunkError, ChunkSource, MicSource};
pub use wav::RecordedAudio;
