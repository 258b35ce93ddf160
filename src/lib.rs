#![warn(missing_docs)]

//! # mpa-rs: Streaming MPEG Audio Decoder Front-End
//!
//! Turns a byte source of MPEG-1/2/2.5 audio frames into a continuous stream
//! of interleaved 16-bit little-endian stereo PCM, with random access.
//!
//! ## Features
//!
//! - **Read** - Pull-based decoding, one frame at a time
//! - **Seek** - Byte-offset seeks that rebuild the bit reservoir from the previous frame
//! - **Seek by fraction** - Frame-aligned seeks with a pre-roll to avoid artifacts
//! - **Length** - Total decoded size from a header-only scan of seekable sources
//! - **Volume** - Output scaling, safe to change from any thread
//! - **CLI** - `mpadec` probes streams and decodes them to WAV or raw PCM
//!
//! ## Quick Start
//!
//! ```ignore
//! use mpa_rs::Decoder;
//!
//! let decoder = Decoder::open("song.mp3")?;
//! println!("{} Hz, {:?} bytes", decoder.sample_rate(), decoder.length());
//!
//! decoder.seek_percent(0.5)?;
//! let mut pcm = vec![0u8; 4096];
//! let n = decoder.read(&mut pcm)?;
//! ```

// Declare modules
/// Core audio types and structures
pub mod core;
/// Error types for decoder operations
pub mod error;
/// Streaming decoder, frame index and Symphonia frame codec
pub mod decoder;
/// Output sinks for decoded PCM
pub mod encoder;
/// Frame header parsing and frame codec traits
pub mod frame;
/// Decoder settings
pub mod settings;
/// Byte source wrapper with tag skipping
pub mod source;

// Export public types
pub use crate::core::{Channels, StreamInfo};
pub use decoder::{Decoder, FrameIndex, Mp3Codec, SeekOrigin};
pub use error::{AudioError, AudioResult};
pub use settings::DecoderSettings;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
