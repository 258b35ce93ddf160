//! Decoded PCM waiting to be handed to the caller.

/// Byte queue with a consumed-up-to cursor
#[derive(Debug, Default)]
pub struct PcmBuffer {
    /// Decoded bytes, including the consumed prefix
    bytes: Vec<u8>,
    /// Current read position
    pos: usize,
}

impl PcmBuffer {
    pub fn new() -> Self {
        PcmBuffer::default()
    }

    /// Append decoded bytes
    pub fn extend(&mut self, pcm: &[u8]) {
        if self.is_empty() {
            self.clear();
        }
        self.bytes.extend_from_slice(pcm);
    }

    /// Copy as much as fits into `out`, returning the byte count
    pub fn read_into(&mut self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.remaining());
        out[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
        self.pos += n;
        n
    }

    /// Drop up to `count` bytes from the front
    pub fn consume(&mut self, count: usize) {
        self.pos += count.min(self.remaining());
    }

    /// Discard everything
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.pos = 0;
    }

    /// Whether all bytes have been handed out
    pub fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Number of bytes not yet handed out
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }
}
