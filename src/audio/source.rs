//! Microphone chunk source via CPAL.
//!
//! The CPAL callback thread converts whatever sample format the device
//! delivers into 16-bit PCM and hands fixed-size chunks to the capture loop
//! over a bounded channel. The capture loop owns the stream for the session
//! and closes it on every exit path when the source is dropped.

use crate::log_debug;
use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, StreamConfig};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::fmt;
use std::time::Duration;

use super::CaptureConfig;

/// Chunk reads fail in two ways: a transient hiccup (driver overflow, slow
/// callback) worth retrying, or a closed stream that ends the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkError {
    Transient,
    Closed,
}

impl fmt::Display for ChunkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkError::Transient => write!(f, "transient chunk read failure"),
            ChunkError::Closed => write!(f, "audio source closed"),
        }
    }
}

impl std::error::Error for ChunkError {}

/// A readable source of fixed-size 16-bit PCM chunks.
///
/// The capture state machine only sees this trait, so tests drive it with
/// scripted sources instead of hardware.
pub trait ChunkSource {
    fn read_chunk(&mut self) -> Result<Vec<i16>, ChunkError>;
}

/// Microphone names for a device selector in the shell application.
pub fn list_input_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host.input_devices().context("no input devices available")?;
    let mut names = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            names.push(name);
        }
    }
    Ok(names)
}

/// Live microphone source feeding the capture loop.
pub struct MicSource {
    // Held for the session; dropping it stops and closes the stream.
    _stream: cpal::Stream,
    receiver: Receiver<Vec<i16>>,
    pending: Vec<i16>,
    chunk_samples: usize,
    wait: Duration,
    consecutive_timeouts: u32,
}

// A stalled driver produces no data and no error; give up after this many
// empty waits rather than spinning forever.
const MAX_CONSECUTIVE_TIMEOUTS: u32 = 50;

/// Open a microphone stream matching the capture config.
///
/// Open failure is fatal to the session (the caller reports an error state);
/// per-chunk failures after open are transient.
pub fn open_input(preferred_device: Option<&str>, cfg: &CaptureConfig) -> Result<MicSource> {
    let host = cpal::default_host();
    let device = match preferred_device {
        Some(name) => {
            let mut devices = host.input_devices().context("no input devices available")?;
            devices
                .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                .ok_or_else(|| anyhow!("input device '{name}' not found"))?
        }
        None => host
            .default_input_device()
            .context("no default input device available")?,
    };
    let device_name = device
        .name()
        .unwrap_or_else(|_| "unknown input device".to_string());

    // Keep the device's native channel layout; many inputs are stereo-only
    // and reject a mono stream request. The callback downmixes to the
    // capture layout instead.
    let default_config = device
        .default_input_config()
        .context("failed to query input format")?;
    let format = default_config.sample_format();
    let native_channels = usize::from(default_config.channels().max(1));
    let out_channels = usize::from(cfg.channels.max(1));
    let stream_config = StreamConfig {
        channels: default_config.channels().max(1),
        sample_rate: cpal::SampleRate(cfg.sample_rate),
        buffer_size: BufferSize::Default,
    };
    log_debug(&format!(
        "mic open: device={device_name} format={format:?} rate={} native_channels={native_channels} out_channels={out_channels}",
        cfg.sample_rate
    ));

    // Bound the channel so a stuck capture loop drops audio instead of
    // growing without limit.
    let (sender, receiver) = bounded::<Vec<i16>>(64);

    let err_fn = |err| log_debug(&format!("audio_stream_error: {err}"));
    let stream = match format {
        SampleFormat::F32 => {
            let sender = sender.clone();
            device.build_input_stream(
                &stream_config,
                move |data: &[f32], _| {
                    forward(&sender, data, native_channels, out_channels, |sample| {
                        (sample.clamp(-1.0, 1.0) * 32_767.0) as i16
                    });
                },
                err_fn,
                None,
            )?
        }
        SampleFormat::I16 => {
            let sender = sender.clone();
            device.build_input_stream(
                &stream_config,
                move |data: &[i16], _| {
                    forward(&sender, data, native_channels, out_channels, |sample| sample);
                },
                err_fn,
                None,
            )?
        }
        SampleFormat::U16 => {
            let sender = sender.clone();
            device.build_input_stream(
                &stream_config,
                move |data: &[u16], _| {
                    forward(&sender, data, native_channels, out_channels, |sample| {
                        (i32::from(sample) - 32_768) as i16
                    });
                },
                err_fn,
                None,
            )?
        }
        other => return Err(anyhow!("unsupported sample format: {other:?}")),
    };

    stream
        .play()
        .with_context(|| format!("failed to start input stream on '{device_name}'"))?;

    let chunk_ms = cfg.chunk_ms().max(1);
    Ok(MicSource {
        _stream: stream,
        receiver,
        pending: Vec::with_capacity(cfg.chunk_samples * 2),
        chunk_samples: cfg.chunk_samples,
        wait: Duration::from_millis(chunk_ms * 4),
        consecutive_timeouts: 0,
    })
}

fn forward<T, F>(
    sender: &Sender<Vec<i16>>,
    data: &[T],
    in_channels: usize,
    out_channels: usize,
    convert: F,
) where
    T: Copy,
    F: FnMut(T) -> i16,
{
    let mut batch = Vec::with_capacity(
        data.len() / in_channels.max(1) * out_channels + out_channels,
    );
    downmix(&mut batch, data, in_channels, out_channels, convert);
    if let Err(TrySendError::Full(_)) = sender.try_send(batch) {
        // Counted by the receiver as a transient gap; nothing to do here.
    }
}

/// Remap interleaved frames from the device's channel layout to the capture
/// layout while converting to i16. Multi-channel frames average to mono; a
/// mono input duplicates into a wider layout.
fn downmix<T, F>(
    out: &mut Vec<i16>,
    data: &[T],
    in_channels: usize,
    out_channels: usize,
    mut convert: F,
) where
    T: Copy,
    F: FnMut(T) -> i16,
{
    let in_channels = in_channels.max(1);
    let out_channels = out_channels.max(1);
    if in_channels == out_channels {
        out.extend(data.iter().copied().map(&mut convert));
        return;
    }

    let emit = |out: &mut Vec<i16>, acc: i32, count: usize| {
        let mono = (acc / count.max(1) as i32) as i16;
        for _ in 0..out_channels {
            out.push(mono);
        }
    };

    let mut acc = 0i32;
    let mut count = 0usize;
    for sample in data.iter().copied() {
        acc += i32::from(convert(sample));
        count += 1;
        if count == in_channels {
            emit(out, acc, count);
            acc = 0;
            count = 0;
        }
    }
    // Truncated trailing frame from a ragged callback buffer.
    if count > 0 {
        emit(out, acc, count);
    }
}

impl ChunkSource for MicSource {
    fn read_chunk(&mut self) -> Result<Vec<i16>, ChunkError> {
        while self.pending.len() < self.chunk_samples {
            match self.receiver.recv_timeout(self.wait) {
                Ok(batch) => {
                    self.consecutive_timeouts = 0;
                    self.pending.extend_from_slice(&batch);
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.consecutive_timeouts += 1;
                    if self.consecutive_timeouts >= MAX_CONSECUTIVE_TIMEOUTS {
                        return Err(ChunkError::Closed);
                    }
                    return Err(ChunkError::Transient);
                }
                Err(RecvTimeoutError::Disconnected) => return Err(ChunkError::Closed),
            }
        }
        Ok(self.pending.drain(..self.chunk_samples).collect())
    }
}
