//! Frame-start index built by a header-only forward scan.

use crate::error::AudioResult;
use crate::frame::{FrameHeaderParser, HEADER_LEN};
use crate::source::ByteSource;
use log::{debug, warn};
use symphonia::core::io::MediaSource;

/// Byte offset of every complete frame in a seekable source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameIndex {
    /// Source offset of each frame header, strictly increasing
    starts: Vec<u64>,
    /// Source offset just past the last complete frame
    end_offset: u64,
    /// Decoded bytes per frame, from the last header scanned
    bytes_per_frame: u64,
    /// Total decoded bytes
    length: u64,
}

impl FrameIndex {
    /// Scan `source` from its start, then restore its position.
    ///
    /// Only headers are parsed; payloads are skipped. A truncated final frame
    /// ends the scan without being counted.
    pub fn build<S, P>(
        source: &mut ByteSource<S>,
        parser: &P,
        resync_limit: usize,
    ) -> AudioResult<Self>
    where
        S: MediaSource,
        P: FrameHeaderParser + ?Sized,
    {
        let resume = source.position();
        source.rewind()?;
        source.skip_tags()?;

        let mut starts = Vec::new();
        let mut bytes_per_frame = 0;
        let mut length = 0;
        let mut end_offset = source.position();

        while let Some((offset, header, _)) = source.read_header(parser, resync_limit)? {
            let body = (header.frame_size - HEADER_LEN) as u64;
            if source.skip(body)? < body {
                warn!("Truncated frame at offset {} ignored by index", offset);
                break;
            }
            starts.push(offset);
            bytes_per_frame = header.bytes_per_frame() as u64;
            length += bytes_per_frame;
            end_offset = source.position();
        }

        source.seek_to(resume)?;
        debug!(
            "Indexed {} frames, {} decoded bytes, frames end at offset {}",
            starts.len(),
            length,
            end_offset
        );

        Ok(FrameIndex {
            starts,
            end_offset,
            bytes_per_frame,
            length,
        })
    }

    /// Number of complete frames
    pub fn frame_count(&self) -> usize {
        self.starts.len()
    }

    /// Total decoded byte length
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Decoded bytes per frame, if any frame was found
    pub fn bytes_per_frame(&self) -> Option<u64> {
        (!self.starts.is_empty()).then_some(self.bytes_per_frame)
    }

    /// Frame header offsets in stream order
    pub fn frame_starts(&self) -> &[u64] {
        &self.starts
    }

    /// Source offset of frame `ordinal`; one past the last frame maps to the
    /// end of the frame data
    pub fn offset_of(&self, ordinal: usize) -> Option<u64> {
        if ordinal == self.starts.len() {
            Some(self.end_offset)
        } else {
            self.starts.get(ordinal).copied()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::testing::{TestCodec, test_frame, test_stream};
    use crate::error::AudioError;
    use std::io::Cursor;

    #[test]
    fn test_scan_counts_frames() {
        let codec = TestCodec::new(1);
        let mut source = ByteSource::new(Cursor::new(test_stream(10)));

        let index = FrameIndex::build(&mut source, &codec, 0).unwrap();
        assert_eq!(index.frame_count(), 10);
        assert_eq!(index.length(), 40);
        assert_eq!(index.bytes_per_frame(), Some(4));
        assert_eq!(index.frame_starts()[..3], [0, 6, 12]);
        assert_eq!(index.offset_of(10), Some(60));
        assert_eq!(index.offset_of(11), None);
        assert!(index.frame_starts().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_scan_restores_position() {
        let codec = TestCodec::new(1);
        let mut source = ByteSource::new(Cursor::new(test_stream(4)));
        source.skip(9).unwrap();

        FrameIndex::build(&mut source, &codec, 0).unwrap();
        assert_eq!(source.position(), 9);
    }

    #[test]
    fn test_scan_skips_tag_and_garbage() {
        let mut data = b"ID3\x03\x00\x00\x00\x00\x00\x02xx".to_vec();
        data.extend(test_frame(0));
        data.extend([0x00, 0x01]);
        data.extend(test_frame(1));
        let codec = TestCodec::new(1);
        let mut source = ByteSource::new(Cursor::new(data));

        let index = FrameIndex::build(&mut source, &codec, 16).unwrap();
        assert_eq!(index.frame_starts(), &[12, 20]);
        assert_eq!(index.length(), 8);
    }

    #[test]
    fn test_truncated_tail_not_counted() {
        let mut data = test_stream(3);
        data.extend(&test_frame(3)[..5]);
        let codec = TestCodec::new(2);
        let mut source = ByteSource::new(Cursor::new(data));

        let index = FrameIndex::build(&mut source, &codec, 0).unwrap();
        assert_eq!(index.frame_count(), 3);
        assert_eq!(index.length(), 24);
        assert_eq!(index.offset_of(3), Some(18));
    }

    #[test]
    fn test_malformed_header_aborts_scan() {
        let mut data = test_stream(2);
        data.extend([0x12, 0x34, 0x56, 0x78]);
        data.extend(test_stream(2));
        let codec = TestCodec::new(1);
        let mut source = ByteSource::new(Cursor::new(data));

        let result = FrameIndex::build(&mut source, &codec, 0);
        assert!(matches!(result, Err(AudioError::MalformedFrame(_))));
    }
}
