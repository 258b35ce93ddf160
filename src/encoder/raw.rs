use crate::error::AudioResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes decoded bytes unchanged
pub struct RawEncoder<W: Write> {
    writer: W,
    bytes_written: u64,
}

impl RawEncoder<BufWriter<File>> {
    /// Create a raw PCM file
    pub fn create<P: AsRef<Path>>(path: P) -> AudioResult<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> RawEncoder<W> {
    /// Wrap any writer
    pub fn new(writer: W) -> Self {
        RawEncoder {
            writer,
            bytes_written: 0,
        }
    }

    /// Bytes written so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Return the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> super::Encoder for RawEncoder<W> {
    fn write_pcm(&mut self, pcm: &[u8]) -> AudioResult<()> {
        self.writer.write_all(pcm)?;
        self.bytes_written += pcm.len() as u64;
        Ok(())
    }

    fn finalize(&mut self) -> AudioResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Encoder;
    use tempfile::NamedTempFile;

    #[test]
    fn test_raw_passthrough() {
        let mut encoder = RawEncoder::new(Vec::new());
        encoder.write_pcm(&[1, 2, 3]).unwrap();
        encoder.write_pcm(&[4]).unwrap();
        encoder.finalize().unwrap();
        assert_eq!(encoder.bytes_written(), 4);
        assert_eq!(encoder.into_inner(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_raw_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut encoder = RawEncoder::create(temp_file.path()).unwrap();
        encoder.write_pcm(&[9; 16]).unwrap();
        encoder.finalize().unwrap();
        drop(encoder);

        let data = std::fs::read(temp_file.path()).unwrap();
        assert_eq!(data, vec![9; 16]);
    }
}
