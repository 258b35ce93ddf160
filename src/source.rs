//! Byte source wrapper.
//!
//! `ByteSource` sits between the decoder and a caller-supplied
//! [`MediaSource`]. It tracks the absolute read position, can push bytes back
//! (so tag detection works on sources that cannot seek), skips leading
//! metadata tags, and reads whole frames with header resynchronisation.

use crate::error::{AudioError, AudioResult};
use crate::frame::{FrameHeader, FrameHeaderParser, HEADER_LEN, RawFrame};
use log::{debug, warn};
use std::io::{self, Read, SeekFrom};
use symphonia::core::io::MediaSource;

const ID3V2_HEADER_LEN: usize = 10;
const ID3V1_LEN: u64 = 128;

/// Positioned reader over a media source
pub struct ByteSource<S> {
    inner: S,
    /// Absolute offset of the next byte handed out
    pos: u64,
    /// Bytes pushed back, handed out before `inner` is read again
    pending: Vec<u8>,
}

impl<S: MediaSource> ByteSource<S> {
    /// Wrap a media source positioned at its start
    pub fn new(inner: S) -> Self {
        ByteSource {
            inner,
            pos: 0,
            pending: Vec::new(),
        }
    }

    /// Whether the underlying source supports random access
    pub fn is_seekable(&self) -> bool {
        self.inner.is_seekable()
    }

    /// Absolute offset of the next byte to be read
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Give up the wrapper and return the source as is
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Reposition to an absolute offset
    pub fn seek_to(&mut self, offset: u64) -> AudioResult<()> {
        if !self.is_seekable() {
            return Err(AudioError::NotSeekable);
        }
        self.inner.seek(SeekFrom::Start(offset))?;
        self.pending.clear();
        self.pos = offset;
        Ok(())
    }

    /// Reposition to the start of the source
    pub fn rewind(&mut self) -> AudioResult<()> {
        self.seek_to(0)
    }

    /// Push `bytes` back so the next read returns them first
    fn unread(&mut self, bytes: &[u8]) {
        let mut pending = bytes.to_vec();
        pending.append(&mut self.pending);
        self.pending = pending;
        self.pos -= bytes.len() as u64;
    }

    /// Fill `buf` as far as the source allows, returning the bytes read.
    ///
    /// A short count means the source hit end-of-stream.
    pub fn read_full(&mut self, buf: &mut [u8]) -> AudioResult<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    /// Read and drop up to `count` bytes, returning how many were skipped
    pub fn skip(&mut self, count: u64) -> AudioResult<u64> {
        let skipped = io::copy(&mut self.by_ref().take(count), &mut io::sink())?;
        Ok(skipped)
    }

    /// Skip ID3v2 and ID3v1 tags at the current position.
    ///
    /// Bytes that turn out not to be a tag are pushed back.
    pub fn skip_tags(&mut self) -> AudioResult<()> {
        loop {
            let start = self.pos;
            let mut magic = [0u8; 3];
            let n = self.read_full(&mut magic)?;
            match &magic[..n] {
                b"ID3" => {
                    let mut rest = [0u8; ID3V2_HEADER_LEN - 3];
                    let n = self.read_full(&mut rest)?;
                    if n < rest.len() {
                        // Truncated tag header: nothing left worth decoding.
                        return Ok(());
                    }
                    let flags = rest[2];
                    let mut size = rest[3..7]
                        .iter()
                        .fold(0u64, |acc, &b| (acc << 7) | (b & 0x7F) as u64);
                    if flags & 0x10 != 0 {
                        size += ID3V2_HEADER_LEN as u64;
                    }
                    let skipped = self.skip(size)?;
                    debug!("Skipped ID3v2 tag of {} bytes at offset {}", skipped, start);
                }
                b"TAG" => {
                    let skipped = self.skip(ID3V1_LEN - 3)?;
                    debug!("Skipped ID3v1 tag of {} bytes at offset {}", skipped + 3, start);
                }
                other => {
                    self.unread(other);
                    return Ok(());
                }
            }
        }
    }

    /// Read the next frame header, resynchronising over up to
    /// `resync_limit` bytes of garbage.
    ///
    /// Returns the header's offset and the parsed header, or `None` at
    /// end-of-stream.
    pub fn read_header<P: FrameHeaderParser + ?Sized>(
        &mut self,
        parser: &P,
        resync_limit: usize,
    ) -> AudioResult<Option<(u64, FrameHeader, [u8; HEADER_LEN])>> {
        let mut raw = [0u8; HEADER_LEN];
        if self.read_full(&mut raw)? < HEADER_LEN {
            return Ok(None);
        }
        let mut offset = self.pos - HEADER_LEN as u64;
        let mut skipped = 0;
        loop {
            match parser.parse_header(raw) {
                Ok(header) => {
                    if skipped > 0 {
                        debug!("Resynchronised after {} bytes at offset {}", skipped, offset);
                    }
                    return Ok(Some((offset, header, raw)));
                }
                Err(AudioError::MalformedFrame(_) | AudioError::UnsupportedFormat(_))
                    if skipped < resync_limit =>
                {
                    let mut next = [0u8; 1];
                    if self.read_full(&mut next)? == 0 {
                        return Ok(None);
                    }
                    raw.copy_within(1.., 0);
                    raw[HEADER_LEN - 1] = next[0];
                    offset += 1;
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Read the next whole frame.
    ///
    /// Returns `None` at end-of-stream, including when the last frame is cut
    /// short.
    pub fn read_frame<P: FrameHeaderParser + ?Sized>(
        &mut self,
        parser: &P,
        resync_limit: usize,
    ) -> AudioResult<Option<RawFrame>> {
        let Some((offset, header, raw)) = self.read_header(parser, resync_limit)? else {
            return Ok(None);
        };
        let mut data = vec![0u8; header.frame_size];
        data[..HEADER_LEN].copy_from_slice(&raw);
        let n = self.read_full(&mut data[HEADER_LEN..])?;
        if n < header.frame_size - HEADER_LEN {
            warn!(
                "Truncated frame at offset {} ({} of {} bytes), treating as end of stream",
                offset,
                n + HEADER_LEN,
                header.frame_size
            );
            return Ok(None);
        }
        Ok(Some(RawFrame {
            offset,
            header,
            data,
        }))
    }
}

impl<S: MediaSource> Read for ByteSource<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = if !self.pending.is_empty() {
            let n = buf.len().min(self.pending.len());
            buf[..n].copy_from_slice(&self.pending[..n]);
            self.pending.drain(..n);
            n
        } else {
            self.inner.read(buf)?
        };
        self.pos += n as u64;
        Ok(n)
    }
}
