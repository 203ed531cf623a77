//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use clap::{ArgAction, Parser};

use crate::audio::CaptureConfig;
use crate::text::NormalizeFlags;

pub use defaults::{
    DEFAULT_CHANNELS, DEFAULT_CHUNK_SAMPLES, DEFAULT_MAX_CAPTURE_MS, DEFAULT_MIN_RECORD_MS,
    DEFAULT_MIN_USEFUL_MS, DEFAULT_SAMPLE_RATE, DEFAULT_TAIL_MS,
};

/// CLI options for the dictation pipeline. Validated values keep downstream
/// subprocesses safe.
#[derive(Debug, Parser, Clone)]
#[command(about = "Push-to-talk dictation", author, version)]
pub struct AppConfig {
    /// Path to the speech-to-text executable
    #[arg(long, default_value = "whisper")]
    pub stt_cmd: String,

    /// Speech-to-text model name
    #[arg(long, default_value = "base")]
    pub stt_model: String,

    /// Extra arguments to pass to the STT executable (repeatable)
    #[arg(long = "stt-arg", action = ArgAction::Append, value_name = "ARG")]
    pub stt_args: Vec<String>,

    /// Language passed to the STT backend
    #[arg(long, default_value = "en")]
    pub lang: String,

    /// Preferred audio input device name
    #[arg(long)]
    pub input_device: Option<String>,

    /// Print detected audio input devices and exit
    #[arg(long = "list-input-devices", default_value_t = false)]
    pub list_input_devices: bool,

    /// Capture sample rate (Hz)
    #[arg(long = "sample-rate", default_value_t = DEFAULT_SAMPLE_RATE)]
    pub sample_rate: u32,

    /// Capture channel count
    #[arg(long, default_value_t = DEFAULT_CHANNELS)]
    pub channels: u16,

    /// Samples per capture chunk
    #[arg(long = "chunk-samples", default_value_t = DEFAULT_CHUNK_SAMPLES)]
    pub chunk_samples: usize,

    /// Minimum recording time before key release can stop capture (milliseconds)
    #[arg(long = "ptt-min-record-ms", default_value_t = DEFAULT_MIN_RECORD_MS)]
    pub ptt_min_record_ms: u64,

    /// Audio kept after key release so trailing words survive (milliseconds)
    #[arg(long = "ptt-tail-ms", default_value_t = DEFAULT_TAIL_MS)]
    pub ptt_tail_ms: u64,

    /// Maximum capture duration before a hard stop (milliseconds)
    #[arg(long = "ptt-max-capture-ms", default_value_t = DEFAULT_MAX_CAPTURE_MS)]
    pub ptt_max_capture_ms: u64,

    /// Captures shorter than this are discarded as no-audio (milliseconds)
    #[arg(long = "ptt-min-useful-ms", default_value_t = DEFAULT_MIN_USEFUL_MS)]
    pub ptt_min_useful_ms: u64,

    /// Disable spoken command substitution ("period" -> ".")
    #[arg(long = "no-dictation-commands", default_value_t = false)]
    pub no_dictation_commands: bool,

    /// Disable automatic capitalization
    #[arg(long = "no-auto-capitalize", default_value_t = false)]
    pub no_auto_capitalize: bool,

    /// Disable automatic terminal punctuation
    #[arg(long = "no-smart-punctuation", default_value_t = false)]
    pub no_smart_punctuation: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "VOXKEY_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "VOXKEY_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging transcript snippets (debug log only)
    #[arg(
        long = "log-content",
        env = "VOXKEY_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,

    /// Enable verbose timing logs
    #[arg(long)]
    pub log_timings: bool,
}

impl AppConfig {
    /// Convert the millisecond-denominated CLI knobs into chunk counts for
    /// the capture loop.
    pub fn capture_config(&self) -> CaptureConfig {
        let chunk_ms =
            (self.chunk_samples as u64 * 1000 / u64::from(self.sample_rate.max(1))).max(1);
        let to_chunks = |ms: u64| (ms / chunk_ms).max(1);
        CaptureConfig {
            sample_rate: self.sample_rate,
            channels: self.channels,
            chunk_samples: self.chunk_samples,
            min_record_chunks: to_chunks(self.ptt_min_record_ms),
            tail_chunks: to_chunks(self.ptt_tail_ms),
            max_chunks: to_chunks(self.ptt_max_capture_ms),
            min_useful_chunks: to_chunks(self.ptt_min_useful_ms),
        }
    }

    /// Snapshot the text pipeline toggles.
    pub fn normalize_flags(&self) -> NormalizeFlags {
        NormalizeFlags {
            commands: !self.no_dictation_commands,
            capitalize: !self.no_auto_capitalize,
            punctuation: !self.no_smart_punctuation,
        }
    }
}
