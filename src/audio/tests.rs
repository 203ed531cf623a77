use super::capture::CaptureState;
use super::{
    run, CaptureConfig, CaptureOutcome, CapturePhase, ChunkError, ChunkSource, LiveLevel,
    StopReason,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn test_config() -> CaptureConfig {
    CaptureConfig {
        sample_rate: 1_000,
        channels: 1,
        chunk_samples: 10,
        min_record_chunks: 5,
        tail_chunks: 2,
        max_chunks: 100,
        min_useful_chunks: 3,
    }
}

/// Source that replays a script of reads, optionally setting the release
/// flag after a given number of successful chunks.
struct ScriptedSource {
    events: VecDeque<Result<Vec<i16>, ChunkError>>,
    delivered: u64,
    release_after: Option<u64>,
    release: Arc<AtomicBool>,
}

impl ScriptedSource {
    fn chunks(count: usize, release: Arc<AtomicBool>, release_after: Option<u64>) -> Self {
        let events = (0..count)
            .map(|i| Ok(vec![(i as i16 + 1) * 10; 10]))
            .collect();
        Self {
            events,
            delivered: 0,
            release_after,
            release,
        }
    }

    fn from_events(
        events: Vec<Result<Vec<i16>, ChunkError>>,
        release: Arc<AtomicBool>,
    ) -> Self {
        Self {
            events: events.into(),
            delivered: 0,
            release_after: None,
            release,
        }
    }
}

impl ChunkSource for ScriptedSource {
    fn read_chunk(&mut self) -> Result<Vec<i16>, ChunkError> {
        let event = self.events.pop_front().unwrap_or(Err(ChunkError::Closed));
        if event.is_ok() {
            self.delivered += 1;
            if let Some(after) = self.release_after {
                if self.delivered >= after {
                    self.release.store(true, Ordering::Relaxed);
                }
            }
        }
        event
    }
}

#[test]
fn release_before_floor_does_not_end_capture_early() {
    let cfg = test_config();
    let release = Arc::new(AtomicBool::new(true)); // released before capture even starts
    let mut source = ScriptedSource::chunks(50, release.clone(), None);

    let outcome = run(&mut source, &cfg, release, None).expect("capture should succeed");
    match outcome {
        CaptureOutcome::Captured(audio, metrics) => {
            // Floor of 5, tail of 2; the chunk where release is observed
            // counts against the tail.
            assert_eq!(metrics.total_chunks, 6);
            assert_eq!(metrics.stop_reason, StopReason::TailComplete);
            assert_eq!(audio.samples().len(), 60);
        }
        other => panic!("expected captured audio, got {other:?}"),
    }
}

#[test]
fn hard_cap_stops_capture_without_release() {
    let cfg = CaptureConfig {
        max_chunks: 10,
        ..test_config()
    };
    let release = Arc::new(AtomicBool::new(false));
    let mut source = ScriptedSource::chunks(50, release.clone(), None);

    let outcome = run(&mut source, &cfg, release, None).expect("capture should succeed");
    match outcome {
        CaptureOutcome::Captured(_, metrics) => {
            assert_eq!(metrics.total_chunks, 10);
            assert!(metrics.total_chunks <= cfg.max_chunks);
            assert_eq!(metrics.stop_reason, StopReason::MaxChunks);
        }
        other => panic!("expected captured audio, got {other:?}"),
    }
}

#[test]
fn too_short_capture_is_discarded_as_no_audio() {
    let cfg = CaptureConfig {
        min_record_chunks: 1,
        tail_chunks: 1,
        min_useful_chunks: 10,
        ..test_config()
    };
    let release = Arc::new(AtomicBool::new(true));
    let mut source = ScriptedSource::chunks(50, release.clone(), None);

    let outcome = run(&mut source, &cfg, release, None).expect("capture should succeed");
    match outcome {
        CaptureOutcome::NoAudio(metrics) => {
            assert_eq!(metrics.total_chunks, 1);
        }
        other => panic!("expected no-audio outcome, got {other:?}"),
    }
}

#[test]
fn transient_read_failures_are_skipped() {
    let cfg = CaptureConfig {
        min_record_chunks: 2,
        tail_chunks: 1,
        min_useful_chunks: 1,
        ..test_config()
    };
    let release = Arc::new(AtomicBool::new(true));
    let events = vec![
        Ok(vec![5; 10]),
        Err(ChunkError::Transient),
        Err(ChunkError::Transient),
        Ok(vec![7; 10]),
    ];
    let mut source = ScriptedSource::from_events(events, release.clone());

    let outcome = run(&mut source, &cfg, release, None).expect("capture should succeed");
    match outcome {
        CaptureOutcome::Captured(audio, metrics) => {
            assert_eq!(metrics.total_chunks, 2);
            let mut expected = vec![5i16; 10];
            expected.extend_from_slice(&[7; 10]);
            assert_eq!(audio.samples(), expected.as_slice());
        }
        other => panic!("expected captured audio, got {other:?}"),
    }
}

#[test]
fn closed_source_aborts_the_session() {
    let cfg = test_config();
    let release = Arc::new(AtomicBool::new(false));
    let mut source = ScriptedSource::from_events(vec![Ok(vec![1; 10])], release.clone());

    let err = run(&mut source, &cfg, release, None).expect_err("closed source should error");
    assert!(err.to_string().contains("closed"));
}

#[test]
fn release_mid_capture_keeps_the_tail() {
    let cfg = CaptureConfig {
        tail_chunks: 3,
        ..test_config()
    };
    let release = Arc::new(AtomicBool::new(false));
    let mut source = ScriptedSource::chunks(50, release.clone(), Some(10));

    let outcome = run(&mut source, &cfg, release, None).expect("capture should succeed");
    match outcome {
        CaptureOutcome::Captured(_, metrics) => {
            // Release observed on chunk 10, which already consumes one tail
            // chunk, plus two more.
            assert_eq!(metrics.total_chunks, 12);
            assert_eq!(metrics.stop_reason, StopReason::TailComplete);
        }
        other => panic!("expected captured audio, got {other:?}"),
    }
}

#[test]
fn level_handle_sees_chunk_peaks_and_resets() {
    let cfg = CaptureConfig {
        min_record_chunks: 1,
        tail_chunks: 1,
        min_useful_chunks: 1,
        ..test_config()
    };
    let release = Arc::new(AtomicBool::new(true));
    let level = LiveLevel::new();
    let mut source = ScriptedSource::chunks(5, release.clone(), None);

    let outcome =
        run(&mut source, &cfg, release, Some(level.clone())).expect("capture should succeed");
    match outcome {
        CaptureOutcome::Captured(_, metrics) => {
            assert_eq!(metrics.peak, 10);
        }
        other => panic!("expected captured audio, got {other:?}"),
    }
    // Reset to silence once the session ends.
    assert_eq!(level.peak(), 0);
}

#[test]
fn state_ignores_release_below_record_floor() {
    let cfg = test_config();
    let mut state = CaptureState::for_testing(&cfg);
    for _ in 0..4 {
        assert!(state.on_chunk(true).is_none());
        assert_eq!(state.phase(), CapturePhase::Recording);
    }
}

#[test]
fn state_arms_tail_on_first_release_observation() {
    let cfg = test_config();
    let mut state = CaptureState::for_testing(&cfg);
    for _ in 0..4 {
        assert!(state.on_chunk(false).is_none());
    }
    assert!(state.on_chunk(true).is_none());
    assert_eq!(state.phase(), CapturePhase::Draining { tail_remaining: 1 });
    assert_eq!(state.on_chunk(true), Some(StopReason::TailComplete));
}

#[test]
fn state_tail_of_one_stops_on_release_chunk() {
    let cfg = CaptureConfig {
        tail_chunks: 1,
        ..test_config()
    };
    let mut state = CaptureState::for_testing(&cfg);
    for _ in 0..4 {
        assert!(state.on_chunk(false).is_none());
    }
    assert_eq!(state.on_chunk(true), Some(StopReason::TailComplete));
}

#[test]
fn state_max_cap_wins_over_armed_tail() {
    let cfg = CaptureConfig {
        min_record_chunks: 1,
        tail_chunks: 50,
        max_chunks: 3,
        ..test_config()
    };
    let mut state = CaptureState::for_testing(&cfg);
    assert!(state.on_chunk(true).is_none());
    assert!(state.on_chunk(true).is_none());
    assert_eq!(state.on_chunk(true), Some(StopReason::MaxChunks));
    assert_eq!(state.total_chunks(), 3);
}

#[test]
fn state_release_flap_does_not_rearm_tail() {
    // Once draining, a flag that reads false again must not restart recording.
    let cfg = CaptureConfig {
        tail_chunks: 3,
        ..test_config()
    };
    let mut state = CaptureState::for_testing(&cfg);
    for _ in 0..4 {
        assert!(state.on_chunk(false).is_none());
    }
    assert!(state.on_chunk(true).is_none());
    assert!(state.on_chunk(false).is_none());
    assert_eq!(state.on_chunk(false), Some(StopReason::TailComplete));
}

#[test]
fn stop_reason_labels_are_stable() {
    assert_eq!(StopReason::TailComplete.label(), "tail_complete");
    assert_eq!(StopReason::MaxChunks.label(), "max_chunks");
}

#[test]
fn default_config_matches_reference_thresholds() {
    let cfg = CaptureConfig::default();
    assert_eq!(cfg.chunk_ms(), 64);
    assert_eq!(cfg.max_chunks, 1875); // 120 s at 16 kHz / 1024-sample chunks
    assert!(cfg.min_useful_chunks <= cfg.min_record_chunks);
}
