//! Sinks for decoded PCM

pub mod raw;
pub mod wav;

pub use raw::RawEncoder;
pub use wav::WavEncoder;

use crate::error::AudioResult;

/// Trait for consumers of decoded 16-bit little-endian stereo bytes
pub trait Encoder {
    /// Write a chunk of decoded bytes; chunks need not align to samples
    fn write_pcm(&mut self, pcm: &[u8]) -> AudioResult<()>;

    /// Finalize encoding (flush any remaining data)
    fn finalize(&mut self) -> AudioResult<()> {
        Ok(())
    }
}
