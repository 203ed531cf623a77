pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;
pub const DEFAULT_CHANNELS: u16 = 1;
pub const DEFAULT_CHUNK_SAMPLES: usize = 1024;
pub const DEFAULT_MIN_RECORD_MS: u64 = 500;
pub const DEFAULT_TAIL_MS: u64 = 300;
pub const DEFAULT_MAX_CAPTURE_MS: u64 = 120_000;
pub const DEFAULT_MIN_USEFUL_MS: u64 = 300;

pub(super) const MAX_CAPTURE_HARD_LIMIT_MS: u64 = 600_000;
pub(super) const MAX_STT_ARGS: usize = 64;
pub(super) const MAX_STT_ARG_BYTES: usize = 8 * 1024;

pub(super) const ISO_639_1_CODES: &[&str] = &[
    "af", "am", "ar", "az", "be", "bg", "bn", "bs", "ca", "cs", "cy", "da", "de", "el", "en", "es",
    "et", "eu", "fa", "fi", "fil", "fr", "ga", "gl", "gu", "he", "hi", "hr", "hu", "hy", "id",
    "is", "it", "ja", "jv", "ka", "kk", "km", "kn", "ko", "lo", "lt", "lv", "mk", "ml", "mn", "mr",
    "ms", "my", "ne", "nl", "no", "pa", "pl", "pt", "ro", "ru", "si", "sk", "sl", "sq", "sr", "sv",
    "sw", "ta", "te", "th", "tr", "uk", "ur", "vi", "zh",
];
