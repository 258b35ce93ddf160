use crate::core::{Channels, pack_pcm};
use crate::error::{AudioError, AudioResult};
use crate::frame::{FrameDecoder, FrameHeader, FrameHeaderParser, HEADER_LEN, Layer, MpegHeaderParser, RawFrame};
use log::trace;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{
    CODEC_TYPE_MP1, CODEC_TYPE_MP2, CODEC_TYPE_MP3, CodecParameters, CodecType, DecoderOptions,
};
use symphonia::core::formats::Packet;

/// MPEG audio frame codec backed by Symphonia's MP1/MP2/MP3 decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct Mp3Codec {
    parser: MpegHeaderParser,
}

/// Decode state carried between frames
pub struct Mp3Context {
    /// Symphonia decoder; owns the bit reservoir
    decoder: Box<dyn symphonia::core::codecs::Decoder>,
    /// Frames decoded since the context was created
    frames_decoded: u64,
}

impl Mp3Context {
    /// Frames decoded since the context was created
    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }
}

impl Mp3Codec {
    /// Create a codec
    pub fn new() -> Self {
        Mp3Codec {
            parser: MpegHeaderParser::new(),
        }
    }
}

fn codec_type(layer: Layer) -> CodecType {
    match layer {
        Layer::Layer1 => CODEC_TYPE_MP1,
        Layer::Layer2 => CODEC_TYPE_MP2,
        Layer::Layer3 => CODEC_TYPE_MP3,
    }
}

impl FrameHeaderParser for Mp3Codec {
    fn parse_header(&self, raw: [u8; HEADER_LEN]) -> AudioResult<FrameHeader> {
        self.parser.parse_header(raw)
    }
}

impl FrameDecoder for Mp3Codec {
    type Context = Mp3Context;

    fn new_context(&self, header: &FrameHeader) -> AudioResult<Mp3Context> {
        let mut params = CodecParameters::new();
        params
            .for_codec(codec_type(header.layer))
            .with_sample_rate(header.sample_rate);

        let decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|e| AudioError::DecodeError(e.to_string()))?;

        Ok(Mp3Context {
            decoder,
            frames_decoded: 0,
        })
    }

    fn decode_frame(
        &self,
        context: &mut Mp3Context,
        frame: &RawFrame,
        volume: f32,
    ) -> AudioResult<Vec<u8>> {
        let samples_per_frame = frame.header.samples_per_frame as u64;
        let packet = Packet::new_from_slice(
            0,
            context.frames_decoded * samples_per_frame,
            samples_per_frame,
            &frame.data,
        );

        let decoded = context.decoder.decode(&packet)?;
        let spec = *decoded.spec();
        let mut samples = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
        samples.copy_interleaved_ref(decoded);
        let channels = Channels::from_count(spec.channels.count() as u32)?;
        let mut pcm = pack_pcm(samples.samples(), channels, volume);

        let expected = frame.header.bytes_per_frame();
        if pcm.len() != expected {
            trace!(
                "Frame at offset {} decoded to {} bytes, fitting to {}",
                frame.offset,
                pcm.len(),
                expected
            );
            pcm.resize(expected, 0);
        }
        context.frames_decoded += 1;
        Ok(pcm)
    }
}
