//! End-to-end pipeline tests with a scripted audio source and a fake STT
//! backend, covering every terminal message variant.

use anyhow::{bail, Result};
use clap::Parser;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use voxkey::audio::{ChunkError, ChunkSource, StopReason};
use voxkey::config::AppConfig;
use voxkey::dictation::{run, DictationMessage};
use voxkey::stt::SttBackend;
use voxkey::text::ControlCommand;
use voxkey::transcript::RejectReason;

const CHUNK_SAMPLES: usize = 80;

/// 8 kHz with 80-sample chunks: 10 ms per chunk, floor 3 / tail 1 / cap 100
/// chunks, useful floor 1.
fn test_config() -> AppConfig {
    let mut cfg = AppConfig::parse_from(["voxkey-test"]);
    cfg.sample_rate = 8_000;
    cfg.chunk_samples = CHUNK_SAMPLES;
    cfg.ptt_min_record_ms = 30;
    cfg.ptt_tail_ms = 10;
    cfg.ptt_max_capture_ms = 1_000;
    cfg.ptt_min_useful_ms = 10;
    cfg
}

struct ScriptedSource {
    events: VecDeque<Result<Vec<i16>, ChunkError>>,
}

impl ScriptedSource {
    fn chunks(count: usize) -> Self {
        let events = (0..count).map(|_| Ok(vec![200i16; CHUNK_SAMPLES])).collect();
        Self { events }
    }
}

impl ChunkSource for ScriptedSource {
    fn read_chunk(&mut self) -> Result<Vec<i16>, ChunkError> {
        self.events.pop_front().unwrap_or(Err(ChunkError::Closed))
    }
}

/// Backend that replays a canned reply and remembers the WAV it was given.
struct FakeBackend {
    reply: Result<Option<String>, String>,
    seen_wav: Arc<Mutex<Option<PathBuf>>>,
    called: Arc<AtomicBool>,
}

impl FakeBackend {
    fn with_reply(reply: &str) -> Self {
        Self {
            reply: Ok(Some(reply.to_string())),
            seen_wav: Arc::new(Mutex::new(None)),
            called: Arc::new(AtomicBool::new(false)),
        }
    }

    fn silent() -> Self {
        Self {
            reply: Ok(None),
            seen_wav: Arc::new(Mutex::new(None)),
            called: Arc::new(AtomicBool::new(false)),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            seen_wav: Arc::new(Mutex::new(None)),
            called: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl SttBackend for FakeBackend {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn transcribe(&self, audio: &Path, _lang: Option<&str>) -> Result<Option<String>> {
        self.called.store(true, Ordering::Relaxed);
        *self.seen_wav.lock().unwrap() = Some(audio.to_path_buf());

        // The backend boundary is a real readable WAV.
        let reader = hound::WavReader::open(audio).expect("backend received unreadable wav");
        assert_eq!(reader.spec().sample_rate, 8_000);
        assert_eq!(reader.spec().bits_per_sample, 16);

        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(message) => bail!("{message}"),
        }
    }
}

fn released() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(true))
}

#[test]
fn spoken_words_come_back_normalized() {
    let config = test_config();
    let mut source = ScriptedSource::chunks(50);
    let backend = FakeBackend::with_reply("um i think its uh ready");

    let message = run(&mut source, &backend, &config, released(), None);
    match message {
        DictationMessage::Text { text, metrics } => {
            assert_eq!(text, "I think it's ready.");
            assert_eq!(metrics.stop_reason, StopReason::TailComplete);
            assert_eq!(metrics.total_chunks, 3);
        }
        other => panic!("expected text, got {other:?}"),
    }
}

#[test]
fn control_phrases_surface_as_commands() {
    let config = test_config();
    let mut source = ScriptedSource::chunks(50);
    let backend = FakeBackend::with_reply("scratch that");

    match run(&mut source, &backend, &config, released(), None) {
        DictationMessage::Command { command, .. } => {
            assert_eq!(command, ControlCommand::Scratch);
        }
        other => panic!("expected command, got {other:?}"),
    }
}

#[test]
fn hallucinated_transcripts_are_rejected() {
    let config = test_config();
    let mut source = ScriptedSource::chunks(50);
    let backend = FakeBackend::with_reply("1.5%");

    match run(&mut source, &backend, &config, released(), None) {
        DictationMessage::Rejected { reason, .. } => {
            assert_eq!(reason, RejectReason::NumericNoise);
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn silent_backend_yields_no_transcript() {
    let config = test_config();
    let mut source = ScriptedSource::chunks(50);
    let backend = FakeBackend::silent();

    match run(&mut source, &backend, &config, released(), None) {
        DictationMessage::NoTranscript { .. } => {}
        other => panic!("expected no-transcript, got {other:?}"),
    }
}

#[test]
fn short_tap_skips_the_backend_entirely() {
    let mut config = test_config();
    config.ptt_min_useful_ms = 1_000; // 100 chunks, far above what we record
    let mut source = ScriptedSource::chunks(50);
    let backend = FakeBackend::silent();
    let called = backend.called.clone();

    match run(&mut source, &backend, &config, released(), None) {
        DictationMessage::NoAudio { .. } => {}
        other => panic!("expected no-audio, got {other:?}"),
    }
    assert!(!called.load(Ordering::Relaxed));
}

#[test]
fn hard_cap_applies_when_release_never_comes() {
    let config = test_config();
    let mut source = ScriptedSource::chunks(200);
    let backend = FakeBackend::with_reply("keep talking forever");
    let release = Arc::new(AtomicBool::new(false));

    match run(&mut source, &backend, &config, release, None) {
        DictationMessage::Text { metrics, .. } => {
            assert_eq!(metrics.stop_reason, StopReason::MaxChunks);
            assert_eq!(metrics.total_chunks, 100);
        }
        other => panic!("expected text, got {other:?}"),
    }
}

#[test]
fn backend_failure_becomes_an_error_message() {
    let config = test_config();
    let mut source = ScriptedSource::chunks(50);
    let backend = FakeBackend::failing("model exploded");

    match run(&mut source, &backend, &config, released(), None) {
        DictationMessage::Error(message) => {
            assert!(message.contains("model exploded"), "got: {message}");
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[test]
fn scratch_wav_is_removed_after_the_session() {
    let config = test_config();
    let mut source = ScriptedSource::chunks(50);
    let backend = FakeBackend::with_reply("clean up after yourself");
    let seen_wav = backend.seen_wav.clone();

    let _ = run(&mut source, &backend, &config, released(), None);
    let path = seen_wav.lock().unwrap().clone().expect("backend saw a wav");
    assert!(!path.exists(), "wav left behind at {}", path.display());
}

#[test]
fn closed_microphone_reports_an_error() {
    let config = test_config();
    let mut source = ScriptedSource::chunks(1); // closes after one chunk
    let backend = FakeBackend::silent();
    let release = Arc::new(AtomicBool::new(false));

    match run(&mut source, &backend, &config, release, None) {
        DictationMessage::Error(message) => {
            assert!(message.contains("closed"), "got: {message}");
        }
        other => panic!("expected error, got {other:?}"),
    }
}
