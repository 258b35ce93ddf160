use super::{FrameHeader, FrameHeaderParser, HEADER_LEN, Layer, MpegVersion};
use crate::core::Channels;
use crate::error::{AudioError, AudioResult};

/// Bitrates in kbps, indexed by the 4-bit bitrate field. Index 0 is free format.
const BITRATES_V1_L1: [u32; 15] = [0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448];
const BITRATES_V1_L2: [u32; 15] = [0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384];
const BITRATES_V1_L3: [u32; 15] = [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320];
const BITRATES_V2_L1: [u32; 15] = [0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256];
const BITRATES_V2_L23: [u32; 15] = [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160];

/// MPEG-1/2/2.5 audio frame header parser
#[derive(Debug, Clone, Copy, Default)]
pub struct MpegHeaderParser;

impl MpegHeaderParser {
    /// Create a parser
    pub fn new() -> Self {
        MpegHeaderParser
    }
}

fn malformed(reason: &str, raw: &[u8; HEADER_LEN]) -> AudioError {
    AudioError::MalformedFrame(format!("{} (header {:02X?})", reason, raw))
}

/// Parse a 4-byte MPEG audio frame header
pub fn parse(raw: [u8; HEADER_LEN]) -> AudioResult<FrameHeader> {
    if raw[0] != 0xFF || raw[1] & 0xE0 != 0xE0 {
        return Err(malformed("missing sync word", &raw));
    }

    let version = match (raw[1] >> 3) & 0x03 {
        0 => MpegVersion::Mpeg25,
        2 => MpegVersion::Mpeg2,
        3 => MpegVersion::Mpeg1,
        _ => return Err(malformed("reserved version", &raw)),
    };
    let layer = match (raw[1] >> 1) & 0x03 {
        1 => Layer::Layer3,
        2 => Layer::Layer2,
        3 => Layer::Layer1,
        _ => return Err(malformed("reserved layer", &raw)),
    };

    let bitrate_index = (raw[2] >> 4) as usize;
    if bitrate_index == 0x0F {
        return Err(malformed("bad bitrate index", &raw));
    }
    if bitrate_index == 0 {
        return Err(AudioError::UnsupportedFormat(
            "free-format bitrate".to_string(),
        ));
    }
    let table = match (version, layer) {
        (MpegVersion::Mpeg1, Layer::Layer1) => &BITRATES_V1_L1,
        (MpegVersion::Mpeg1, Layer::Layer2) => &BITRATES_V1_L2,
        (MpegVersion::Mpeg1, Layer::Layer3) => &BITRATES_V1_L3,
        (_, Layer::Layer1) => &BITRATES_V2_L1,
        (_, _) => &BITRATES_V2_L23,
    };
    let bitrate = table[bitrate_index] * 1000;

    let base_rate = match (raw[2] >> 2) & 0x03 {
        0 => 44100,
        1 => 48000,
        2 => 32000,
        _ => return Err(malformed("reserved sampling frequency", &raw)),
    };
    let sample_rate = match version {
        MpegVersion::Mpeg1 => base_rate,
        MpegVersion::Mpeg2 => base_rate / 2,
        MpegVersion::Mpeg25 => base_rate / 4,
    };

    let padding = ((raw[2] >> 1) & 0x01) as usize;
    let channels = if raw[3] >> 6 == 0x03 {
        Channels::Mono
    } else {
        Channels::Stereo
    };

    let samples_per_frame = match (version, layer) {
        (_, Layer::Layer1) => 384,
        (_, Layer::Layer2) | (MpegVersion::Mpeg1, Layer::Layer3) => 1152,
        (_, Layer::Layer3) => 576,
    };

    let frame_size = match layer {
        Layer::Layer1 => (12 * bitrate as usize / sample_rate as usize + padding) * 4,
        _ => (samples_per_frame / 8) * bitrate as usize / sample_rate as usize + padding,
    };
    if frame_size <= HEADER_LEN {
        return Err(malformed("frame shorter than its header", &raw));
    }

    Ok(FrameHeader {
        version,
        layer,
        sample_rate,
        channels,
        frame_size,
        samples_per_frame,
    })
}

impl FrameHeaderParser for MpegHeaderParser {
    fn parse_header(&self, raw: [u8; HEADER_LEN]) -> AudioResult<FrameHeader> {
        parse(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mpeg1_layer3() {
        // 128 kbps, 44.1 kHz, joint stereo
        let header = parse([0xFF, 0xFB, 0x90, 0x64]).unwrap();
        assert_eq!(header.version, MpegVersion::Mpeg1);
        assert_eq!(header.layer, Layer::Layer3);
        assert_eq!(header.sample_rate, 44100);
        assert_eq!(header.channels, Channels::Stereo);
        assert_eq!(header.frame_size, 417);
        assert_eq!(header.samples_per_frame, 1152);
        assert_eq!(header.bytes_per_frame(), 4608);
    }

    #[test]
    fn test_padding_and_mono() {
        let header = parse([0xFF, 0xFB, 0x92, 0xC4]).unwrap();
        assert_eq!(header.frame_size, 418);
        assert_eq!(header.channels, Channels::Mono);
        // Output is stereo regardless of the source layout
        assert_eq!(header.bytes_per_frame(), 4608);
    }

    #[test]
    fn test_mpeg2_layer3() {
        // 64 kbps, 22.05 kHz
        let header = parse([0xFF, 0xF3, 0x80, 0x00]).unwrap();
        assert_eq!(header.version, MpegVersion::Mpeg2);
        assert_eq!(header.sample_rate, 22050);
        assert_eq!(header.samples_per_frame, 576);
        assert_eq!(header.frame_size, 208);
    }

    #[test]
    fn test_mpeg25_sample_rate() {
        let header = parse([0xFF, 0xE3, 0x84, 0x00]).unwrap();
        assert_eq!(header.version, MpegVersion::Mpeg25);
        assert_eq!(header.sample_rate, 12000);
    }

    #[test]
    fn test_mpeg1_layer1() {
        // 288 kbps, 44.1 kHz
        let header = parse([0xFF, 0xFF, 0x90, 0x00]).unwrap();
        assert_eq!(header.layer, Layer::Layer1);
        assert_eq!(header.samples_per_frame, 384);
        assert_eq!(header.frame_size, 312);
    }

    #[test]
    fn test_invalid_headers() {
        assert!(matches!(
            parse([0x00, 0xFB, 0x90, 0x64]),
            Err(AudioError::MalformedFrame(_))
        ));
        // Bitrate index 15
        assert!(matches!(
            parse([0xFF, 0xFB, 0xF0, 0x64]),
            Err(AudioError::MalformedFrame(_))
        ));
        // Reserved sampling frequency
        assert!(matches!(
            parse([0xFF, 0xFB, 0x9C, 0x64]),
            Err(AudioError::MalformedFrame(_))
        ));
        // Reserved layer
        assert!(matches!(
            parse([0xFF, 0xF9, 0x90, 0x64]),
            Err(AudioError::MalformedFrame(_))
        ));
        // Reserved version
        assert!(matches!(
            parse([0xFF, 0xEB, 0x90, 0x64]),
            Err(AudioError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_free_format_unsupported() {
        assert!(matches!(
            parse([0xFF, 0xFB, 0x00, 0x64]),
            Err(AudioError::UnsupportedFormat(_))
        ));
    }
}
