//! Synthetic frame format for decoder tests.
//!
//! A frame is `[0xFF, 0xEE, ordinal, 2, 0xAB, 0xCD]`. Decoding it yields
//! `bytes_per_frame` copies of the ordinal, but only when the carried context
//! says the previous frame was decoded first (or the frame is frame 0).
//! Otherwise every byte is [`ARTIFACT`], which is what an under-primed
//! decode looks like here.

use crate::core::Channels;
use crate::error::{AudioError, AudioResult};
use crate::frame::{
    FrameDecoder, FrameHeader, FrameHeaderParser, HEADER_LEN, Layer, MpegVersion, RawFrame,
};
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use symphonia::core::io::MediaSource;

pub const TEST_SAMPLE_RATE: u32 = 8000;
pub const ARTIFACT: u8 = 0xEE;
/// Fifth frame byte that makes the test codec fail to decode the frame
pub const CORRUPT: u8 = 0xBD;

pub fn test_frame(ordinal: u8) -> Vec<u8> {
    vec![0xFF, 0xEE, ordinal, 2, 0xAB, 0xCD]
}

pub fn test_stream(frames: usize) -> Vec<u8> {
    (0..frames).flat_map(|i| test_frame(i as u8)).collect()
}

#[derive(Debug, Clone, Default)]
pub struct Counters {
    headers: Arc<AtomicUsize>,
    decodes: Arc<AtomicUsize>,
}

impl Counters {
    pub fn headers(&self) -> usize {
        self.headers.load(Ordering::SeqCst)
    }

    pub fn decodes(&self) -> usize {
        self.decodes.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct TestCodec {
    samples_per_frame: usize,
    pub counters: Counters,
}

impl TestCodec {
    pub fn new(samples_per_frame: usize) -> Self {
        TestCodec {
            samples_per_frame,
            counters: Counters::default(),
        }
    }
}

impl FrameHeaderParser for TestCodec {
    fn parse_header(&self, raw: [u8; HEADER_LEN]) -> AudioResult<FrameHeader> {
        self.counters.headers.fetch_add(1, Ordering::SeqCst);
        if raw[..2] != [0xFF, 0xEE] {
            return Err(AudioError::MalformedFrame(format!("bad sync {:02X?}", raw)));
        }
        Ok(FrameHeader {
            version: MpegVersion::Mpeg1,
            layer: Layer::Layer3,
            sample_rate: TEST_SAMPLE_RATE,
            channels: Channels::Stereo,
            frame_size: HEADER_LEN + raw[3] as usize,
            samples_per_frame: self.samples_per_frame,
        })
    }
}

impl FrameDecoder for TestCodec {
    /// Ordinal of the last frame decoded
    type Context = Option<u8>;

    fn new_context(&self, _header: &FrameHeader) -> AudioResult<Self::Context> {
        Ok(None)
    }

    fn decode_frame(
        &self,
        context: &mut Self::Context,
        frame: &RawFrame,
        volume: f32,
    ) -> AudioResult<Vec<u8>> {
        self.counters.decodes.fetch_add(1, Ordering::SeqCst);
        if frame.data[4] == CORRUPT {
            return Err(AudioError::DecodeError(format!(
                "corrupt frame at offset {}",
                frame.offset
            )));
        }
        let ordinal = frame.data[2];
        let primed = match *context {
            None => ordinal == 0,
            Some(prev) => prev.wrapping_add(1) == ordinal,
        };
        *context = Some(ordinal);
        let value = if primed { ordinal } else { ARTIFACT };
        let value = (value as f32 * volume).round() as u8;
        Ok(vec![value; frame.header.bytes_per_frame()])
    }
}

/// In-memory source whose reads fail while the shared switch is on.
/// Seeks keep working.
pub struct FailingSource {
    inner: Cursor<Vec<u8>>,
    failing: Arc<AtomicBool>,
}

impl FailingSource {
    pub fn new(data: Vec<u8>) -> (Self, Arc<AtomicBool>) {
        let failing = Arc::new(AtomicBool::new(false));
        let source = FailingSource {
            inner: Cursor::new(data),
            failing: failing.clone(),
        };
        (source, failing)
    }
}

impl Read for FailingSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(io::Error::other("read failed"));
        }
        self.inner.read(buf)
    }
}

impl Seek for FailingSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl MediaSource for FailingSource {
    fn is_seekable(&self) -> bool {
        true
    }

    fn byte_len(&self) -> Option<u64> {
        Some(self.inner.get_ref().len() as u64)
    }
}
