//! Frame-level seams of the decoder.
//!
//! The decoder never looks inside a frame itself. It relies on a
//! [`FrameHeaderParser`] to learn how long a frame is and what it decodes to,
//! and on a [`FrameDecoder`] to turn the frame bytes into PCM. Anything that
//! one frame's decode leaves behind for the next (the bit reservoir, for
//! MPEG audio) lives in the decoder's [`FrameDecoder::Context`] so that seeks
//! can rebuild it by decoding earlier frames.

pub mod header;

pub use header::MpegHeaderParser;

use crate::core::{BYTES_PER_SAMPLE, Channels};
use crate::error::AudioResult;

/// Size of a frame header in bytes
pub const HEADER_LEN: usize = 4;

/// MPEG audio version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    /// MPEG-1
    Mpeg1,
    /// MPEG-2 (LSF)
    Mpeg2,
    /// MPEG-2.5
    Mpeg25,
}

/// MPEG audio layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Layer I
    Layer1,
    /// Layer II
    Layer2,
    /// Layer III
    Layer3,
}

/// Everything known about a frame without decoding its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// MPEG version
    pub version: MpegVersion,
    /// Layer
    pub layer: Layer,
    /// Sampling frequency in Hz
    pub sample_rate: u32,
    /// Channel layout of the encoded frame
    pub channels: Channels,
    /// Size of the whole frame in bytes, header included
    pub frame_size: usize,
    /// Samples per channel the frame decodes to
    pub samples_per_frame: usize,
}

impl FrameHeader {
    /// Decoded output bytes for this frame (16-bit stereo)
    pub fn bytes_per_frame(&self) -> usize {
        self.samples_per_frame * BYTES_PER_SAMPLE
    }
}

/// One frame as read from the source
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Byte offset of the frame header in the source
    pub offset: u64,
    /// Parsed header
    pub header: FrameHeader,
    /// Whole frame, header included
    pub data: Vec<u8>,
}

/// Parses a frame header without touching the payload
pub trait FrameHeaderParser {
    /// Parse the first four bytes of a frame
    fn parse_header(&self, raw: [u8; HEADER_LEN]) -> AudioResult<FrameHeader>;
}

/// Decodes whole frames into 16-bit little-endian stereo PCM
pub trait FrameDecoder {
    /// State carried from one decoded frame to the next
    type Context: Send;

    /// Fresh state for decoding a stream starting at a frame like `header`
    fn new_context(&self, header: &FrameHeader) -> AudioResult<Self::Context>;

    /// Decode `frame` scaled by `volume`, updating `context`
    fn decode_frame(
        &self,
        context: &mut Self::Context,
        frame: &RawFrame,
        volume: f32,
    ) -> AudioResult<Vec<u8>>;
}

/// A header parser and frame decoder for the same format
pub trait FrameCodec: FrameHeaderParser + FrameDecoder + Send {}

impl<T> FrameCodec for T where T: FrameHeaderParser + FrameDecoder + Send {}
