//! Push-to-talk session orchestration.
//!
//! One press runs capture -> STT -> filter -> normalize on a worker thread
//! and reports a single [`DictationMessage`]. Every non-crash outcome is a
//! message variant, so callers match instead of catching.

use crate::audio::{self, CaptureMetrics, CaptureOutcome, ChunkSource, LiveLevel};
use crate::config::AppConfig;
use crate::stt::{CommandBackend, SttBackend};
use crate::text::{self, ControlCommand, Normalized};
use crate::transcript::{self, RejectReason, Verdict};
use crate::{log_debug, log_debug_content};
use anyhow::{bail, Result};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use tracing::{debug, info};

/// Terminal state of one push-to-talk session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictationMessage {
    /// Normalized text ready for insertion.
    Text {
        text: String,
        metrics: CaptureMetrics,
    },
    /// The utterance was a control phrase; the caller acts on it.
    Command {
        command: ControlCommand,
        metrics: CaptureMetrics,
    },
    /// Capture too short to bother transcribing.
    NoAudio { metrics: CaptureMetrics },
    /// The backend heard nothing, or normalization emptied the text.
    NoTranscript { metrics: CaptureMetrics },
    /// The transcript was an STT artifact.
    Rejected {
        reason: RejectReason,
        metrics: CaptureMetrics,
    },
    /// The session itself failed (device, backend, or I/O).
    Error(String),
}

impl DictationMessage {
    pub fn label(&self) -> &'static str {
        match self {
            DictationMessage::Text { .. } => "text",
            DictationMessage::Command { .. } => "command",
            DictationMessage::NoAudio { .. } => "no_audio",
            DictationMessage::NoTranscript { .. } => "no_transcript",
            DictationMessage::Rejected { .. } => "rejected",
            DictationMessage::Error(_) => "error",
        }
    }
}

/// Run one full session on the calling thread.
///
/// Infallible by signature: pipeline failures become
/// [`DictationMessage::Error`].
pub fn run(
    source: &mut dyn ChunkSource,
    backend: &dyn SttBackend,
    config: &AppConfig,
    release: Arc<AtomicBool>,
    level: Option<LiveLevel>,
) -> DictationMessage {
    let message = match run_inner(source, backend, config, release, level) {
        Ok(message) => message,
        Err(err) => {
            log_debug(&format!("dictation_error: {err:#}"));
            DictationMessage::Error(format!("{err:#}"))
        }
    };
    if let Some(metrics) = message_metrics(&message) {
        log_debug(&format!(
            "dictation_metrics|outcome={}|chunks={}|capture_ms={}|peak={}|stop={}",
            message.label(),
            metrics.total_chunks,
            metrics.capture_ms,
            metrics.peak,
            metrics.stop_reason.label()
        ));
        debug!(
            chunks = metrics.total_chunks,
            capture_ms = metrics.capture_ms,
            stop = metrics.stop_reason.label(),
            "capture timings"
        );
    }
    info!(outcome = message.label(), "dictation session finished");
    message
}

fn message_metrics(message: &DictationMessage) -> Option<&CaptureMetrics> {
    match message {
        DictationMessage::Text { metrics, .. }
        | DictationMessage::Command { metrics, .. }
        | DictationMessage::NoAudio { metrics }
        | DictationMessage::NoTranscript { metrics }
        | DictationMessage::Rejected { metrics, .. } => Some(metrics),
        DictationMessage::Error(_) => None,
    }
}

fn run_inner(
    source: &mut dyn ChunkSource,
    backend: &dyn SttBackend,
    config: &AppConfig,
    release: Arc<AtomicBool>,
    level: Option<LiveLevel>,
) -> Result<DictationMessage> {
    let capture_cfg = config.capture_config();
    let (audio, metrics) = match audio::run(source, &capture_cfg, release, level)? {
        CaptureOutcome::NoAudio(metrics) => {
            return Ok(DictationMessage::NoAudio { metrics });
        }
        CaptureOutcome::Captured(audio, metrics) => (audio, metrics),
    };

    let wav_path = audio.into_temp_wav()?;
    let transcribed = backend.transcribe(&wav_path, Some(&config.lang));
    // The WAV is scratch space; remove it whether or not STT succeeded.
    let _ = fs::remove_file(&wav_path);

    let raw = match transcribed? {
        Some(text) => text,
        None => return Ok(DictationMessage::NoTranscript { metrics }),
    };
    log_debug_content(&format!("transcript_raw: {raw}"));

    if let Verdict::Reject(reason) = transcript::classify(&raw) {
        log_debug(&format!("transcript_rejected|rule={}", reason.label()));
        return Ok(DictationMessage::Rejected { reason, metrics });
    }

    match text::normalize(&raw, config.normalize_flags()) {
        Normalized::Command(command) => Ok(DictationMessage::Command { command, metrics }),
        Normalized::Text(text) if text.is_empty() => {
            Ok(DictationMessage::NoTranscript { metrics })
        }
        Normalized::Text(text) => {
            log_debug_content(&format!("transcript_final: {text}"));
            Ok(DictationMessage::Text { text, metrics })
        }
    }
}

/// Handle to a session running on a worker thread.
pub struct DictationJob {
    receiver: mpsc::Receiver<DictationMessage>,
    release: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl DictationJob {
    /// Signal that the push-to-talk key was released. The capture loop keeps
    /// its tail before stopping; safe to call more than once.
    pub fn signal_release(&self) {
        self.release.store(true, Ordering::Relaxed);
    }

    /// Non-blocking poll for the session result.
    pub fn try_message(&self) -> Option<DictationMessage> {
        self.receiver.try_recv().ok()
    }

    /// Block until the session finishes.
    pub fn wait(mut self) -> DictationMessage {
        let message = self
            .receiver
            .recv()
            .unwrap_or_else(|_| DictationMessage::Error("dictation worker disconnected".into()));
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        message
    }
}

/// Spawn a one-shot session against the configured microphone and STT
/// command.
pub fn start_job(config: AppConfig) -> DictationJob {
    spawn_job(config, None, None)
}

// Clears the controller's active flag on every worker exit path.
struct ActiveGuard(Option<Arc<AtomicBool>>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        if let Some(flag) = &self.0 {
            flag.store(false, Ordering::Relaxed);
        }
    }
}

fn spawn_job(
    config: AppConfig,
    level: Option<LiveLevel>,
    active: Option<Arc<AtomicBool>>,
) -> DictationJob {
    let release = Arc::new(AtomicBool::new(false));
    let worker_release = release.clone();
    // Capacity 1: the worker produces exactly one message and must not block
    // on a caller that polls late.
    let (sender, receiver) = mpsc::sync_channel(1);

    let handle = thread::spawn(move || {
        let _guard = ActiveGuard(active);
        let message =
            match audio::open_input(config.input_device.as_deref(), &config.capture_config()) {
                Ok(mut source) => {
                    let backend = CommandBackend::from_config(&config);
                    run(&mut source, &backend, &config, worker_release, level)
                }
                Err(err) => DictationMessage::Error(format!("{err:#}")),
            };
        let _ = sender.send(message);
    });

    DictationJob {
        receiver,
        release,
        handle: Some(handle),
    }
}

/// Push-to-talk controller: one active session at a time, with a shared
/// level meter for UI feedback.
pub struct Dictation {
    config: AppConfig,
    level: LiveLevel,
    active: Arc<AtomicBool>,
}

impl Dictation {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            level: LiveLevel::new(),
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn level(&self) -> &LiveLevel {
        &self.level
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// Start a session on key press. Fails if one is already running; presses
    /// during an active session are the caller's to debounce or reject.
    pub fn press(&self) -> Result<DictationJob> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            bail!("a dictation session is already active");
        }
        Ok(spawn_job(
            self.config.clone(),
            Some(self.level.clone()),
            Some(self.active.clone()),
        ))
    }
}
