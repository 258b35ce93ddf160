use crate::error::{AudioError, AudioResult};
use std::time::Duration;

/// Channels in the decoded output stream, regardless of the source layout
pub const OUTPUT_CHANNELS: usize = 2;

/// Bytes in one interleaved output sample (16-bit stereo)
pub const BYTES_PER_SAMPLE: usize = OUTPUT_CHANNELS * 2;

/// Channel configuration of the compressed source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    /// Mono (1 channel)
    Mono = 1,
    /// Stereo (2 channels)
    Stereo = 2,
}

impl Channels {
    /// Create Channels from channel count
    pub fn from_count(count: u32) -> AudioResult<Self> {
        match count {
            1 => Ok(Channels::Mono),
            2 => Ok(Channels::Stereo),
            n => Err(AudioError::InvalidChannels {
                expected: 2,
                got: n,
            }),
        }
    }

    /// Get the number of channels
    pub fn count(&self) -> u32 {
        *self as u32
    }

    /// Get channel layout name
    pub fn name(&self) -> &'static str {
        match self {
            Channels::Mono => "Mono",
            Channels::Stereo => "Stereo",
        }
    }
}

/// Scale one sample by `volume`, saturating at the i16 range
fn scale_sample(sample: i16, volume: f32) -> i16 {
    (sample as f32 * volume)
        .round()
        .clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Pack interleaved samples into 16-bit little-endian stereo bytes.
///
/// Mono input is duplicated onto both output channels.
pub fn pack_pcm(samples: &[i16], channels: Channels, volume: f32) -> Vec<u8> {
    let frames = samples.len() / channels.count() as usize;
    let mut out = Vec::with_capacity(frames * BYTES_PER_SAMPLE);
    match channels {
        Channels::Mono => {
            for &s in samples {
                let bytes = scale_sample(s, volume).to_le_bytes();
                out.extend_from_slice(&bytes);
                out.extend_from_slice(&bytes);
            }
        }
        Channels::Stereo => {
            for &s in &samples[..frames * 2] {
                out.extend_from_slice(&scale_sample(s, volume).to_le_bytes());
            }
        }
    }
    out
}

/// Playback time covered by `bytes` of decoded output at `sample_rate`
pub fn bytes_to_duration(bytes: u64, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::ZERO;
    }
    let samples = bytes / BYTES_PER_SAMPLE as u64;
    Duration::from_secs_f64(samples as f64 / sample_rate as f64)
}

/// Stream information known after opening a decoder
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    /// Sample rate in Hz, taken from the first frame
    pub sample_rate: u32,
    /// Channel layout of the source (output is always stereo)
    pub channels: Channels,
    /// Decoded bytes produced by each frame
    pub bytes_per_frame: u64,
    /// Number of frames, if the source could be indexed
    pub frame_count: Option<usize>,
    /// Total decoded bytes, if the source could be indexed
    pub length: Option<u64>,
}

impl StreamInfo {
    /// Total playback duration if known
    pub fn duration(&self) -> Option<Duration> {
        self.length.map(|l| bytes_to_duration(l, self.sample_rate))
    }

    /// Get duration in seconds
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration().map(|d| d.as_secs_f64())
    }

    /// Whether the stream supports seeking
    pub fn is_seekable(&self) -> bool {
        self.length.is_some()
    }
}
