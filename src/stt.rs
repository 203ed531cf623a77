//! Speech-to-text boundary.
//!
//! The pipeline hands a WAV path to a backend and gets text (or nothing)
//! back. The trait keeps the dictation loop testable without a real engine;
//! the production implementation shells out to a whisper-style CLI that
//! prints the transcript on stdout.

use crate::config::AppConfig;
use crate::log_debug;
use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Command;
use std::time::Instant;

/// A transcription engine. `Ok(None)` means the backend ran fine but heard
/// nothing; errors are reserved for the backend itself failing.
pub trait SttBackend: Send {
    fn name(&self) -> &'static str;
    fn transcribe(&self, audio: &Path, lang: Option<&str>) -> Result<Option<String>>;
}

/// Backend that runs the configured STT executable as a subprocess.
pub struct CommandBackend {
    cmd: String,
    model: String,
    extra_args: Vec<String>,
}

impl CommandBackend {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            cmd: config.stt_cmd.clone(),
            model: config.stt_model.clone(),
            extra_args: config.stt_args.clone(),
        }
    }
}

impl SttBackend for CommandBackend {
    fn name(&self) -> &'static str {
        "command"
    }

    fn transcribe(&self, audio: &Path, lang: Option<&str>) -> Result<Option<String>> {
        let started = Instant::now();
        let mut command = Command::new(&self.cmd);
        command
            .arg(audio)
            .arg("--model")
            .arg(&self.model)
            .arg("--output_format")
            .arg("txt")
            .arg("--output_dir")
            .arg(std::env::temp_dir());
        if let Some(lang) = lang {
            if !lang.eq_ignore_ascii_case("auto") {
                command.arg("--language").arg(lang);
            }
        }
        for arg in &self.extra_args {
            command.arg(arg);
        }

        let output = command
            .output()
            .with_context(|| format!("failed to run stt command '{}'", self.cmd))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "stt command '{}' exited with {}: {}",
                self.cmd,
                output.status,
                stderr.trim()
            );
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        log_debug(&format!(
            "stt_metrics|backend={}|elapsed_ms={}|chars={}",
            self.name(),
            started.elapsed().as_millis(),
            text.chars().count()
        ));
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(text))
    }
}
