use crate::core::OUTPUT_CHANNELS;
use crate::error::{AudioError, AudioResult};
use hound::{WavSpec, WavWriter};
use std::path::Path;

/// WAV encoder for the decoder's 16-bit stereo output
pub struct WavEncoder {
    writer: Option<WavWriter<std::io::BufWriter<std::fs::File>>>,
    sample_rate: u32,
    /// Low byte of a sample split across two writes
    carry: Option<u8>,
}

impl WavEncoder {
    /// Create a new WAV encoder to file
    pub fn new<P: AsRef<Path>>(path: P, sample_rate: u32) -> AudioResult<Self> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidSampleRate { rate: sample_rate });
        }

        let spec = WavSpec {
            channels: OUTPUT_CHANNELS as u16,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let writer = WavWriter::create(path, spec)?;

        Ok(WavEncoder {
            writer: Some(writer),
            sample_rate,
            carry: None,
        })
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the number of samples written, counting each channel
    pub fn samples_written(&self) -> u32 {
        self.writer.as_ref().map(|w| w.len()).unwrap_or(0)
    }
}

impl super::Encoder for WavEncoder {
    fn write_pcm(&mut self, pcm: &[u8]) -> AudioResult<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| AudioError::EncodeError("Encoder already finalized".to_string()))?;

        let mut bytes = pcm;
        if let Some(low) = self.carry.take() {
            match bytes.split_first() {
                Some((&high, rest)) => {
                    writer.write_sample(i16::from_le_bytes([low, high]))?;
                    bytes = rest;
                }
                None => {
                    self.carry = Some(low);
                    return Ok(());
                }
            }
        }

        let mut samples = bytes.chunks_exact(2);
        for pair in &mut samples {
            writer.write_sample(i16::from_le_bytes([pair[0], pair[1]]))?;
        }
        self.carry = samples.remainder().first().copied();
        Ok(())
    }

    fn finalize(&mut self) -> AudioResult<()> {
        if self.carry.is_some() {
            log::warn!("Dropping trailing half sample at end of WAV output");
        }
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Encoder;
    use tempfile::NamedTempFile;

    #[test]
    fn test_wav_encoder_creation() {
        let temp_file = NamedTempFile::new().unwrap();
        let encoder = WavEncoder::new(temp_file.path(), 44100);
        assert!(encoder.is_ok());
    }

    #[test]
    fn test_wav_encoder_invalid_sample_rate() {
        let temp_file = NamedTempFile::new().unwrap();
        let result = WavEncoder::new(temp_file.path(), 0);
        assert!(matches!(result, Err(AudioError::InvalidSampleRate { rate: 0 })));
    }

    #[test]
    fn test_wav_encoder_split_samples() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut encoder = WavEncoder::new(temp_file.path(), 8000).unwrap();

        // 1000, -2, 7, 0 written across uneven chunks
        let pcm: Vec<u8> = [1000i16, -2, 7, 0]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        encoder.write_pcm(&pcm[..3]).unwrap();
        encoder.write_pcm(&pcm[3..3]).unwrap();
        encoder.write_pcm(&pcm[3..]).unwrap();
        assert_eq!(encoder.samples_written(), 4);
        encoder.finalize().unwrap();

        let mut reader = hound::WavReader::open(temp_file.path()).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().bits_per_sample, 16);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![1000, -2, 7, 0]);
    }

    #[test]
    fn test_write_after_finalize() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut encoder = WavEncoder::new(temp_file.path(), 8000).unwrap();
        encoder.finalize().unwrap();
        assert!(matches!(
            encoder.write_pcm(&[0, 0]),
            Err(AudioError::EncodeError(_))
        ));
    }
}
