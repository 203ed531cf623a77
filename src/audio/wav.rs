//! Captured PCM and its WAV materialization.
//!
//! The STT boundary is a file path, so a finished capture becomes a 16-bit
//! PCM WAV in the temp directory.

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::env;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// A finished capture: signed 16-bit samples plus the format metadata the
/// WAV header needs.
#[derive(Debug, Clone)]
pub struct RecordedAudio {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl RecordedAudio {
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn duration_ms(&self) -> u64 {
        let frames = self.samples.len() as u64 / u64::from(self.channels.max(1));
        frames * 1000 / u64::from(self.sample_rate.max(1))
    }

    /// Write a 16-bit PCM WAV at `path`.
    pub fn write_wav(&self, path: &Path) -> Result<()> {
        let spec = WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec)
            .with_context(|| format!("failed to create wav at {}", path.display()))?;
        for sample in &self.samples {
            writer.write_sample(*sample)?;
        }
        writer.finalize().context("failed to finalize wav")?;
        Ok(())
    }

    /// Materialize in the temp directory and return the path. The caller
    /// removes the file once the backend is done with it.
    pub fn into_temp_wav(self) -> Result<PathBuf> {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let path = env::temp_dir().join(format!("voxkey_capture_{stamp}.wav"));
        self.write_wav(&path)?;
        Ok(path)
    }
}
