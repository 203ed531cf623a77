use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Cross-thread handle for the most recent chunk's peak amplitude.
///
/// The capture loop stores once per chunk; a UI shell polls at its own pace.
/// Neither side blocks.
#[derive(Clone, Debug)]
pub struct LiveLevel {
    peak: Arc<AtomicU32>,
}

impl LiveLevel {
    pub fn new() -> Self {
        Self {
            peak: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn set_peak(&self, peak: i16) {
        self.peak.store(peak.unsigned_abs() as u32, Ordering::Relaxed);
    }

    pub fn peak(&self) -> u16 {
        self.peak.load(Ordering::Relaxed) as u16
    }
}

impl Default for LiveLevel {
    fn default() -> Self {
        Self::new()
    }
}

/// Peak absolute amplitude of a PCM chunk.
pub fn peak_level(samples: &[i16]) -> i16 {
    samples
        .iter()
        .map(|s| s.saturating_abs())
        .max()
        .unwrap_or(0)
}
