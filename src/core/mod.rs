//! Core audio types and structures

/// Channel layout, output format and stream information types
pub mod audio;

pub use audio::{Channels, StreamInfo, BYTES_PER_SAMPLE, OUTPUT_CHANNELS, bytes_to_duration, pack_pcm};
