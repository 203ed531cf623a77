//! Push-to-talk dictation core.
//!
//! One key press runs the whole pipeline: bounded microphone capture,
//! speech-to-text over an opaque backend, hallucination filtering, and
//! dictation-aware text normalization. Each stage reports a sum-typed
//! outcome; see [`dictation::DictationMessage`].

pub mod audio;
pub mod config;
pub mod dictation;
mod logging;
pub mod stt;
mod telemetry;
pub mod text;
pub mod transcript;

pub use dictation::{start_job, Dictation, DictationJob, DictationMessage};
pub use logging::{init_logging, log_debug, log_debug_content, log_file_path};
pub use telemetry::init_tracing;
