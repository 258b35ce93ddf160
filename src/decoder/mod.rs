//! Streaming decoder front-end.
//!
//! [`Decoder`] turns a byte source of MPEG audio frames into a continuous
//! stream of 16-bit little-endian stereo PCM. It decodes one frame at a time
//! on demand, and when the source can seek it indexes every frame up front so
//! that byte-offset and percentage seeks can jump straight to a frame.
//!
//! Frames are not independent: a frame's decode may need data left behind by
//! the previous one. Seeks therefore decode and discard one or more frames
//! before the landing point to rebuild that state.

mod buffer;
pub mod index;
pub mod symphonia;
#[cfg(test)]
pub(crate) mod testing;

pub use self::symphonia::Mp3Codec;
pub use index::FrameIndex;

use crate::core::{Channels, StreamInfo, bytes_to_duration};
use crate::error::{AudioError, AudioResult};
use crate::frame::{FrameCodec, FrameDecoder, FrameHeader};
use crate::settings::DecoderSettings;
use crate::source::ByteSource;
use buffer::PcmBuffer;
use log::{debug, trace, warn};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use ::symphonia::core::io::MediaSource;

/// Reference point for a byte-offset seek
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOrigin {
    /// Start of the decoded stream
    Start,
    /// Current read position
    Current,
    /// End of the decoded stream (requires a known length)
    End,
}

impl TryFrom<i32> for SeekOrigin {
    type Error = AudioError;

    /// Map a whence value (0, 1, 2) to an origin
    fn try_from(whence: i32) -> AudioResult<Self> {
        match whence {
            0 => Ok(SeekOrigin::Start),
            1 => Ok(SeekOrigin::Current),
            2 => Ok(SeekOrigin::End),
            other => Err(AudioError::InvalidSeekOrigin(other)),
        }
    }
}

/// Everything that moves when the stream is read or repositioned
struct StreamState<S, C: FrameDecoder> {
    source: ByteSource<S>,
    codec: C,
    /// State carried from the last decoded frame; `None` after a reset
    context: Option<C::Context>,
    buf: PcmBuffer,
    /// Caller-visible offset into the decoded stream
    pos: u64,
}

impl<S: MediaSource, C: FrameCodec> StreamState<S, C> {
    /// Decode the next frame into the output buffer.
    ///
    /// Returns `None` at end-of-stream.
    fn decode_next(&mut self, volume: f32, resync_limit: usize) -> AudioResult<Option<FrameHeader>> {
        let Some(frame) = self.source.read_frame(&self.codec, resync_limit)? else {
            return Ok(None);
        };
        let context = match self.context.take() {
            Some(context) => context,
            None => self.codec.new_context(&frame.header)?,
        };
        let context = self.context.insert(context);
        let pcm = self.codec.decode_frame(context, &frame, volume)?;
        trace!("Decoded frame at offset {} into {} bytes", frame.offset, pcm.len());
        self.buf.extend(&pcm);
        Ok(Some(frame.header))
    }

    /// Drop buffered output and carried decode state
    fn reset(&mut self) {
        self.buf.clear();
        self.context = None;
    }

    /// Move to `offset` with a fresh context and run `decode` there.
    ///
    /// On failure the buffer, context and source offset are put back as they
    /// were, so `pos` still describes what the next read returns.
    fn reposition<F>(&mut self, offset: u64, decode: F) -> AudioResult<()>
    where
        F: FnOnce(&mut Self) -> AudioResult<()>,
    {
        let saved_buf = std::mem::take(&mut self.buf);
        let saved_context = self.context.take();
        let saved_offset = self.source.position();

        let result = self
            .source
            .seek_to(offset)
            .and_then(|()| decode(&mut *self));
        if let Err(err) = result {
            match self.source.seek_to(saved_offset) {
                Ok(()) => {
                    self.buf = saved_buf;
                    self.context = saved_context;
                }
                Err(restore) => {
                    warn!("Could not restore stream after failed seek: {}", restore);
                    self.reset();
                }
            }
            return Err(err);
        }
        Ok(())
    }
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// Decoded PCM stream over a source of compressed frames.
///
/// Output is always interleaved 16-bit little-endian stereo, so one sample
/// is 4 bytes. All reads and seeks are serialised by one lock, which makes a
/// `Decoder` safe to share between threads; volume changes do not take it.
pub struct Decoder<S, C = Mp3Codec>
where
    C: FrameDecoder,
{
    state: Mutex<StreamState<S, C>>,
    /// Present only when the source is seekable
    index: Option<FrameIndex>,
    sample_rate: u32,
    channels: Channels,
    bytes_per_frame: u64,
    /// f32 bits
    volume: AtomicU32,
    settings: DecoderSettings,
}

impl<S: MediaSource> Decoder<S, Mp3Codec> {
    /// Open an MPEG audio stream with default settings
    pub fn new(source: S) -> AudioResult<Self> {
        Self::with_settings(source, DecoderSettings::default())
    }

    /// Open an MPEG audio stream
    pub fn with_settings(source: S, settings: DecoderSettings) -> AudioResult<Self> {
        Self::with_codec(source, Mp3Codec::new(), settings)
    }
}

impl Decoder<File, Mp3Codec> {
    /// Open an MPEG audio file
    pub fn open<P: AsRef<Path>>(path: P) -> AudioResult<Self> {
        let file = File::open(path.as_ref())?;
        Self::new(file)
    }
}

impl<S: MediaSource, C: FrameCodec> Decoder<S, C> {
    /// Open a stream with an explicit frame codec.
    ///
    /// Skips leading tags, decodes the first frame (its output is the first
    /// thing read) and, if the source can seek, indexes every frame.
    pub fn with_codec(source: S, codec: C, settings: DecoderSettings) -> AudioResult<Self> {
        settings.validate()?;
        let volume = clamp_volume(settings.initial_volume);

        let mut state = StreamState {
            source: ByteSource::new(source),
            codec,
            context: None,
            buf: PcmBuffer::new(),
            pos: 0,
        };
        state.source.skip_tags()?;
        let first = state
            .decode_next(volume, settings.resync_limit)?
            .ok_or(AudioError::EmptyStream)?;

        let mut bytes_per_frame = first.bytes_per_frame() as u64;
        let index = if state.source.is_seekable() {
            let index = FrameIndex::build(&mut state.source, &state.codec, settings.resync_limit)?;
            if let Some(indexed) = index.bytes_per_frame() {
                bytes_per_frame = indexed;
            }
            Some(index)
        } else {
            debug!("Source is not seekable, stream length unknown");
            None
        };
        if bytes_per_frame == 0 {
            return Err(AudioError::MalformedFrame(
                "frame decodes to no samples".to_string(),
            ));
        }

        debug!(
            "Opened stream: {} Hz, {}, {} bytes per frame",
            first.sample_rate,
            first.channels.name(),
            bytes_per_frame
        );

        Ok(Decoder {
            state: Mutex::new(state),
            index,
            sample_rate: first.sample_rate,
            channels: first.channels,
            bytes_per_frame,
            volume: AtomicU32::new(volume.to_bits()),
            settings,
        })
    }

    fn lock(&self) -> AudioResult<MutexGuard<'_, StreamState<S, C>>> {
        self.state.lock().map_err(|_| AudioError::LockPoisoned)
    }

    /// Read decoded bytes into `buf`.
    ///
    /// Returns the number of bytes written; `Ok(0)` for a non-empty `buf`
    /// means end of stream. A truncated last frame counts as end of stream.
    pub fn read(&self, buf: &mut [u8]) -> AudioResult<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut state = self.lock()?;
        while state.buf.is_empty() {
            if state
                .decode_next(self.volume(), self.settings.resync_limit)?
                .is_none()
            {
                return Ok(0);
            }
        }
        let n = state.buf.read_into(buf);
        state.pos += n as u64;
        Ok(n)
    }

    /// Seek to a byte offset in the decoded stream.
    ///
    /// `seek(0, SeekOrigin::Current)` only reports the position. Any other
    /// seek needs the frame index, so it fails with
    /// [`AudioError::NotSeekable`] on sources that cannot seek. The target
    /// may be anywhere in `0..=length`.
    pub fn seek(&self, offset: i64, origin: SeekOrigin) -> AudioResult<u64> {
        let mut state = self.lock()?;
        if offset == 0 && origin == SeekOrigin::Current {
            return Ok(state.pos);
        }

        let index = self.index.as_ref().ok_or(AudioError::NotSeekable)?;
        let length = index.length();
        let base = match origin {
            SeekOrigin::Start => 0,
            SeekOrigin::Current => state.pos as i128,
            SeekOrigin::End => length as i128,
        };
        let target = base + offset as i128;
        if target < 0 || target > length as i128 {
            return Err(AudioError::SeekOutOfRange(format!(
                "byte offset {} outside 0..={}",
                target, length
            )));
        }
        let target = target as u64;

        self.seek_locked(&mut state, index, target)?;
        Ok(target)
    }

    /// Reposition to `target`, rebuilding the decode context from the frame
    /// before the one containing it
    fn seek_locked(
        &self,
        state: &mut StreamState<S, C>,
        index: &FrameIndex,
        target: u64,
    ) -> AudioResult<()> {
        let frame = (target / self.bytes_per_frame) as usize;
        let within = (target % self.bytes_per_frame) as usize;
        let resync = self.settings.resync_limit;
        let first = frame.saturating_sub(1);
        let offset = index.offset_of(first).ok_or_else(|| {
            AudioError::SeekOutOfRange(format!("frame {} not in index", first))
        })?;

        let volume = self.volume();
        state.reposition(offset, |state| {
            if frame > 0 {
                // The previous frame may carry data the target frame needs.
                state.decode_next(volume, resync)?;
                state.buf.clear();
            }
            if frame < index.frame_count() {
                state.decode_next(volume, resync)?;
                state.buf.consume(within);
            }
            Ok(())
        })?;
        state.pos = target;

        debug!(
            "Seeked to byte {} (frame {}, {} bytes in)",
            target, frame, within
        );
        Ok(())
    }

    /// Seek to a fraction of the stream, in `[0, 1]`.
    ///
    /// Lands on a frame boundary. Up to `lookback_frames` frames before the
    /// landing point are decoded and discarded first so the decode context is
    /// primed; fewer are used near the start. Returns the new position.
    pub fn seek_percent(&self, fraction: f64) -> AudioResult<u64> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(AudioError::SeekOutOfRange(format!(
                "fraction {} outside [0, 1]",
                fraction
            )));
        }
        let index = self.index.as_ref().ok_or(AudioError::NotSeekable)?;

        let mut state = self.lock()?;
        let count = index.frame_count();
        let target = ((count as f64 * fraction).floor() as usize).min(count);
        let margin = self.settings.lookback_frames.min(target);
        let first = target - margin;
        let offset = index.offset_of(first).ok_or_else(|| {
            AudioError::SeekOutOfRange(format!("frame {} not in index", first))
        })?;

        let volume = self.volume();
        let resync = self.settings.resync_limit;
        state.reposition(offset, |state| {
            for _ in 0..margin {
                if state.decode_next(volume, resync)?.is_none() {
                    break;
                }
                state.buf.clear();
            }
            Ok(())
        })?;
        state.pos = target as u64 * self.bytes_per_frame;

        debug!(
            "Seeked to {:.3} of stream: frame {} after {} lookback frames",
            fraction, target, margin
        );
        Ok(state.pos)
    }

    /// Seek with a standard library position
    pub fn seek_from(&self, pos: SeekFrom) -> AudioResult<u64> {
        match pos {
            SeekFrom::Start(offset) => {
                let offset = i64::try_from(offset).map_err(|_| {
                    AudioError::SeekOutOfRange(format!("byte offset {} too large", offset))
                })?;
                self.seek(offset, SeekOrigin::Start)
            }
            SeekFrom::Current(offset) => self.seek(offset, SeekOrigin::Current),
            SeekFrom::End(offset) => self.seek(offset, SeekOrigin::End),
        }
    }

    /// Current byte offset in the decoded stream
    pub fn position(&self) -> AudioResult<u64> {
        Ok(self.lock()?.pos)
    }

    /// Sample rate of the first frame, in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel layout of the source (output is always stereo)
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Decoded bytes produced per frame
    pub fn bytes_per_frame(&self) -> u64 {
        self.bytes_per_frame
    }

    /// Total decoded length in bytes, `None` when the source cannot seek
    pub fn length(&self) -> Option<u64> {
        self.index.as_ref().map(FrameIndex::length)
    }

    /// Number of frames, `None` when the source cannot seek
    pub fn frame_count(&self) -> Option<usize> {
        self.index.as_ref().map(FrameIndex::frame_count)
    }

    /// The frame index, if one was built
    pub fn frame_index(&self) -> Option<&FrameIndex> {
        self.index.as_ref()
    }

    /// Total playback duration, `None` when the source cannot seek
    pub fn duration(&self) -> Option<Duration> {
        self.length().map(|l| bytes_to_duration(l, self.sample_rate))
    }

    /// Snapshot of the stream properties
    pub fn info(&self) -> StreamInfo {
        StreamInfo {
            sample_rate: self.sample_rate,
            channels: self.channels,
            bytes_per_frame: self.bytes_per_frame,
            frame_count: self.frame_count(),
            length: self.length(),
        }
    }

    /// Current volume scale, in `[0, 1]`
    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    /// Set the volume scale, clamped into `[0, 1]`.
    ///
    /// Applies to frames decoded after the call; bytes already buffered keep
    /// the volume they were decoded with.
    pub fn set_volume(&self, volume: f32) {
        self.volume
            .store(clamp_volume(volume).to_bits(), Ordering::Relaxed);
    }

    /// Settings the decoder was built with
    pub fn settings(&self) -> &DecoderSettings {
        &self.settings
    }

    /// Release the decoder, returning the source without closing it
    pub fn into_source(self) -> S {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .source
            .into_inner()
    }
}

impl<S: MediaSource, C: FrameCodec> Read for Decoder<S, C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Decoder::read(self, buf).map_err(Into::into)
    }
}

impl<S: MediaSource, C: FrameCodec> Read for &Decoder<S, C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Decoder::read(*self, buf).map_err(Into::into)
    }
}

impl<S: MediaSource, C: FrameCodec> Seek for Decoder<S, C> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.seek_from(pos).map_err(Into::into)
    }
}

impl<S: MediaSource, C: FrameCodec> Seek for &Decoder<S, C> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.seek_from(pos).map_err(Into::into)
    }
}
