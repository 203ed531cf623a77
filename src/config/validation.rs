use super::defaults::{
    ISO_639_1_CODES, MAX_CAPTURE_HARD_LIMIT_MS, MAX_STT_ARGS, MAX_STT_ARG_BYTES,
};
use super::AppConfig;
use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::{fs, path::Path};

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize paths.
    pub fn validate(&mut self) -> Result<()> {
        if !(8_000..=96_000).contains(&self.sample_rate) {
            bail!(
                "--sample-rate must be between 8000 and 96000 Hz, got {}",
                self.sample_rate
            );
        }
        if !(1..=2).contains(&self.channels) {
            bail!("--channels must be 1 or 2, got {}", self.channels);
        }
        if !(64..=65_536).contains(&self.chunk_samples) {
            bail!(
                "--chunk-samples must be between 64 and 65536, got {}",
                self.chunk_samples
            );
        }
        if self.ptt_max_capture_ms == 0 || self.ptt_max_capture_ms > MAX_CAPTURE_HARD_LIMIT_MS {
            bail!(
                "--ptt-max-capture-ms must be between 1 and {MAX_CAPTURE_HARD_LIMIT_MS} ms, got {}",
                self.ptt_max_capture_ms
            );
        }
        if self.ptt_min_record_ms == 0 || self.ptt_min_record_ms > self.ptt_max_capture_ms {
            bail!(
                "--ptt-min-record-ms must be between 1 and --ptt-max-capture-ms ({})",
                self.ptt_max_capture_ms
            );
        }
        if self.ptt_tail_ms > self.ptt_max_capture_ms {
            bail!(
                "--ptt-tail-ms ({}) cannot exceed --ptt-max-capture-ms ({})",
                self.ptt_tail_ms,
                self.ptt_max_capture_ms
            );
        }
        if self.ptt_min_useful_ms > self.ptt_min_record_ms {
            bail!(
                "--ptt-min-useful-ms ({}) cannot exceed --ptt-min-record-ms ({})",
                self.ptt_min_useful_ms,
                self.ptt_min_record_ms
            );
        }

        self.stt_cmd = sanitize_binary(
            &self.stt_cmd,
            "--stt-cmd",
            &["whisper", "whisper-cli", "whisper.cpp"],
        )?;

        if self.stt_model.trim().is_empty() {
            bail!("--stt-model must not be empty");
        }
        if !self
            .stt_model
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
        {
            bail!("--stt-model must contain only alphanumerics, '-', '_' or '.'");
        }

        if self.lang.trim().is_empty() {
            bail!("--lang must not be empty");
        }
        if !self.lang.eq_ignore_ascii_case("auto") {
            if !self
                .lang
                .chars()
                .all(|ch| ch.is_ascii_alphabetic() || ch == '-' || ch == '_')
            {
                bail!("--lang must contain only alphabetic characters or '-'/'_' separators");
            }
            // Allow locale-style values but only check the leading ISO-639-1 code.
            let lang_primary = self
                .lang
                .split(['-', '_'])
                .next()
                .unwrap_or("")
                .to_ascii_lowercase();
            if !ISO_639_1_CODES.contains(&lang_primary.as_str()) {
                bail!(
                    "--lang must start with a valid ISO-639-1 code or be 'auto', got '{}'",
                    self.lang
                );
            }
        }

        // Avoid huge argument lists when forwarding to the STT subprocess.
        if self.stt_args.len() > MAX_STT_ARGS {
            bail!(
                "--stt-arg repeated too many times (max {MAX_STT_ARGS}, got {})",
                self.stt_args.len()
            );
        }
        let total_arg_bytes: usize = self.stt_args.iter().map(|arg| arg.len()).sum();
        if total_arg_bytes > MAX_STT_ARG_BYTES {
            bail!("combined --stt-arg length exceeds {MAX_STT_ARG_BYTES} bytes");
        }

        Ok(())
    }
}

/// Allow either a known binary name or an existing binary path.
pub(super) fn sanitize_binary(value: &str, flag: &str, allowlist: &[&str]) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{flag} cannot be empty");
    }
    if let Some(allowed) = allowlist
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(trimmed))
    {
        return Ok((*allowed).to_string());
    }

    let path = Path::new(trimmed);
    if path.is_absolute() || trimmed.contains(std::path::MAIN_SEPARATOR) {
        let canonical = path
            .canonicalize()
            .with_context(|| format!("failed to canonicalize {flag} '{trimmed}'"))?;
        let metadata = fs::metadata(&canonical)
            .with_context(|| format!("failed to inspect {flag} '{}'", canonical.display()))?;
        if !metadata.is_file() {
            bail!("{flag} '{}' is not a file", canonical.display());
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = metadata.permissions().mode();
            if mode & 0o111 == 0 {
                bail!(
                    "{flag} '{}' exists but is not executable (mode {:o})",
                    canonical.display(),
                    mode
                );
            }
        }
        return canonical
            .to_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("{flag} must be valid UTF-8"));
    }

    bail!("{flag} must be one of {allowlist:?} or an existing binary path");
}
