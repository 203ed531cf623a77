//! Push-to-talk capture state machine.
//!
//! Drives a microphone chunk stream into a single bounded recording: an
//! unconditional minimum before the release key is even consulted, a short
//! tail after release so trailing words survive, and a hard duration cap.

use super::meter::peak_level;
use super::source::{ChunkError, ChunkSource};
use super::wav::RecordedAudio;
use super::LiveLevel;
use crate::log_debug;
use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Capture thresholds expressed as chunk counts, derived from the ms-valued
/// config at startup.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub chunk_samples: usize,
    /// Hard floor: release is ignored until this many chunks are buffered.
    pub min_record_chunks: u64,
    /// Chunks kept after the release signal is first observed.
    pub tail_chunks: u64,
    /// Hard ceiling regardless of release.
    pub max_chunks: u64,
    /// Captures shorter than this are discarded as accidental taps.
    pub min_useful_chunks: u64,
}

impl CaptureConfig {
    pub fn chunk_ms(&self) -> u64 {
        (self.chunk_samples as u64 * 1000) / u64::from(self.sample_rate.max(1))
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        // 0.5 s floor / 0.3 s tail / 120 s cap / 0.3 s useful floor at
        // 16 kHz mono with 1024-sample chunks.
        Self {
            sample_rate: super::DEFAULT_RATE,
            channels: 1,
            chunk_samples: super::DEFAULT_CHUNK_SAMPLES,
            min_record_chunks: 7,
            tail_chunks: 4,
            max_chunks: 1875,
            min_useful_chunks: 4,
        }
    }
}

/// Why the capture loop stopped reading chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Release observed and the tail countdown ran out.
    TailComplete,
    /// Hard cap hit before (or regardless of) release.
    MaxChunks,
}

impl StopReason {
    pub fn label(&self) -> &'static str {
        match self {
            StopReason::TailComplete => "tail_complete",
            StopReason::MaxChunks => "max_chunks",
        }
    }
}

/// Per-session counters for diagnostics and metric lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureMetrics {
    pub total_chunks: u64,
    pub capture_ms: u64,
    pub peak: i16,
    pub stop_reason: StopReason,
}

impl Default for CaptureMetrics {
    fn default() -> Self {
        Self {
            total_chunks: 0,
            capture_ms: 0,
            peak: 0,
            stop_reason: StopReason::MaxChunks,
        }
    }
}

/// Caller-facing result of a capture session.
///
/// A too-short capture is the normal outcome of an accidental tap, not an
/// error, so it gets its own variant instead of an `Err`.
#[derive(Debug)]
pub enum CaptureOutcome {
    Captured(RecordedAudio, CaptureMetrics),
    NoAudio(CaptureMetrics),
}

/// Explicit capture phase. `Draining` carries the tail countdown armed when
/// the release signal was first observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    Recording,
    Draining { tail_remaining: u64 },
}

/// Transition function of the capture state machine, separated from real
/// audio hardware so the min/tail/max interaction is testable on its own.
pub(super) struct CaptureState<'a> {
    cfg: &'a CaptureConfig,
    phase: CapturePhase,
    total_chunks: u64,
}

impl<'a> CaptureState<'a> {
    pub(super) fn new(cfg: &'a CaptureConfig) -> Self {
        Self {
            cfg,
            phase: CapturePhase::Recording,
            total_chunks: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn for_testing(cfg: &'a CaptureConfig) -> Self {
        Self::new(cfg)
    }

    /// Account for one buffered chunk and decide whether to stop.
    ///
    /// Ordering matters:
    /// 1. The hard cap wins over everything, including an armed tail.
    /// 2. Below the record floor the release signal is not consulted at all.
    /// 3. The chunk on which release is first observed already counts against
    ///    the tail, so `tail_chunks == 1` stops on that same chunk.
    pub(super) fn on_chunk(&mut self, released: bool) -> Option<StopReason> {
        self.total_chunks += 1;

        if self.total_chunks >= self.cfg.max_chunks {
            return Some(StopReason::MaxChunks);
        }
        if self.total_chunks < self.cfg.min_record_chunks {
            return None;
        }

        if released && matches!(self.phase, CapturePhase::Recording) {
            self.phase = CapturePhase::Draining {
                tail_remaining: self.cfg.tail_chunks,
            };
        }

        if let CapturePhase::Draining { tail_remaining } = self.phase {
            let remaining = tail_remaining.saturating_sub(1);
            if remaining == 0 {
                return Some(StopReason::TailComplete);
            }
            self.phase = CapturePhase::Draining {
                tail_remaining: remaining,
            };
        }
        None
    }

    pub(super) fn phase(&self) -> CapturePhase {
        self.phase
    }

    pub(super) fn total_chunks(&self) -> u64 {
        self.total_chunks
    }
}

/// Drive `source` until the state machine stops, then either materialize the
/// buffered audio or discard it as too short.
///
/// Transient read failures (driver overflow) skip the chunk and retry; a
/// closed source aborts the session with an error. The release flag is set by
/// the hotkey thread and only observed here.
pub fn run(
    source: &mut dyn ChunkSource,
    cfg: &CaptureConfig,
    release: Arc<AtomicBool>,
    level: Option<LiveLevel>,
) -> Result<CaptureOutcome> {
    let mut state = CaptureState::new(cfg);
    let mut samples: Vec<i16> =
        Vec::with_capacity(cfg.chunk_samples.saturating_mul(cfg.min_record_chunks as usize));
    let mut metrics = CaptureMetrics::default();
    let mut skipped = 0u64;

    let stop_reason = loop {
        let chunk = match source.read_chunk() {
            Ok(chunk) => chunk,
            Err(ChunkError::Transient) => {
                skipped += 1;
                continue;
            }
            Err(ChunkError::Closed) => {
                return Err(anyhow!("audio source closed mid-capture"));
            }
        };

        let peak = peak_level(&chunk);
        metrics.peak = metrics.peak.max(peak);
        if let Some(ref level) = level {
            level.set_peak(peak);
        }
        samples.extend_from_slice(&chunk);

        if let Some(reason) = state.on_chunk(release.load(Ordering::Relaxed)) {
            break reason;
        }
    };

    if let Some(ref level) = level {
        level.set_peak(0);
    }

    metrics.total_chunks = state.total_chunks();
    metrics.capture_ms = state.total_chunks() * cfg.chunk_ms();
    metrics.stop_reason = stop_reason;
    if skipped > 0 {
        log_debug(&format!("capture: skipped {skipped} transient chunk reads"));
    }

    if metrics.total_chunks < cfg.min_useful_chunks {
        return Ok(CaptureOutcome::NoAudio(metrics));
    }

    let audio = RecordedAudio::new(samples, cfg.sample_rate, cfg.channels);
    Ok(CaptureOutcome::Captured(audio, metrics))
}
