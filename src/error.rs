use std::io;
use thiserror::Error;

/// Result type for stream operations
pub type AudioResult<T> = Result<T, AudioError>;

/// Error types surfaced by the decoder front-end
///
/// End of stream is not represented here: reads report it as `Ok(0)`.
#[derive(Error, Debug)]
pub enum AudioError {
    /// IO error (source read or reposition failure)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A frame header could not be parsed
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// Valid header describing a stream this front-end cannot handle
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// Frame payload decoding failed
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// The source contained no decodable frame
    #[error("Stream contains no audio frames")]
    EmptyStream,

    /// Seek or length-dependent operation on a source without a frame index
    #[error("Source is not seekable")]
    NotSeekable,

    /// Seek target outside the stream
    #[error("Seek out of range: {0}")]
    SeekOutOfRange(String),

    /// Whence value that is not start, current or end
    #[error("Invalid seek origin: {0}")]
    InvalidSeekOrigin(i32),

    /// Invalid channel configuration
    #[error("Invalid channel configuration: expected {expected}, got {got}")]
    InvalidChannels {
        /// Expected number of channels
        expected: u32,
        /// Got number of channels
        got: u32,
    },

    /// Invalid sample rate
    #[error("Invalid sample rate: {rate}")]
    InvalidSampleRate {
        /// The invalid sample rate
        rate: u32,
    },

    /// Writing decoded output failed
    #[error("Encode error: {0}")]
    EncodeError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A thread panicked while holding the decoder lock
    #[error("Decoder lock poisoned")]
    LockPoisoned,
}

impl AudioError {
    /// Whether the error reports a missing capability rather than bad data
    pub fn is_capability_mismatch(&self) -> bool {
        matches!(self, AudioError::NotSeekable)
    }

    /// Whether the error was caused by an invalid argument
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            AudioError::SeekOutOfRange(_) | AudioError::InvalidSeekOrigin(_)
        )
    }
}

impl From<symphonia::core::errors::Error> for AudioError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        match err {
            symphonia::core::errors::Error::IoError(e) => AudioError::Io(e),
            e => AudioError::DecodeError(e.to_string()),
        }
    }
}

impl From<hound::Error> for AudioError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => AudioError::Io(e),
            e => AudioError::EncodeError(e.to_string()),
        }
    }
}

impl From<AudioError> for io::Error {
    fn from(err: AudioError) -> Self {
        if let AudioError::Io(e) = err {
            return e;
        }
        let kind = match &err {
            AudioError::NotSeekable => io::ErrorKind::Unsupported,
            AudioError::SeekOutOfRange(_)
            | AudioError::InvalidSeekOrigin(_)
            | AudioError::ConfigError(_) => io::ErrorKind::InvalidInput,
            AudioError::MalformedFrame(_)
            | AudioError::UnsupportedFormat(_)
            | AudioError::DecodeError(_)
            | AudioError::EmptyStream
            | AudioError::InvalidChannels { .. }
            | AudioError::InvalidSampleRate { .. } => io::ErrorKind::InvalidData,
            AudioError::Io(_) | AudioError::EncodeError(_) | AudioError::LockPoisoned => {
                io::ErrorKind::Other
            }
        };
        io::Error::new(kind, err)
    }
}
