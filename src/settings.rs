//! Settings for the streaming decoder.
//!
//! `DecoderSettings` controls how far percentage seeks pre-roll, how much
//! garbage the header reader tolerates between frames, and the volume the
//! decoder starts with.

use crate::error::{AudioError, AudioResult};

/// Frames decoded and discarded ahead of a percentage-seek landing point.
pub const DEFAULT_LOOKBACK_FRAMES: usize = 4;

/// Garbage bytes skipped while searching for the next frame header.
pub const DEFAULT_RESYNC_LIMIT: usize = 64 * 1024;

/// Settings for decoder construction.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderSettings {
    /// Pre-roll margin for `seek_percent`, in frames.
    /// Reduced automatically near the start of the stream.
    /// Default: 4.
    pub lookback_frames: usize,

    /// Maximum number of bytes skipped one at a time when a header fails to
    /// parse. 0 makes every bad header an error.
    /// Default: 64 KiB.
    pub resync_limit: usize,

    /// Volume applied to decoded frames until changed. Clamped into [0, 1].
    /// Default: 1.0.
    pub initial_volume: f32,
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self {
            lookback_frames: DEFAULT_LOOKBACK_FRAMES,
            resync_limit: DEFAULT_RESYNC_LIMIT,
            initial_volume: 1.0,
        }
    }
}

impl DecoderSettings {
    /// Set the percentage-seek pre-roll margin
    pub fn with_lookback_frames(mut self, frames: usize) -> Self {
        self.lookback_frames = frames;
        self
    }

    /// Set the resynchronisation window
    pub fn with_resync_limit(mut self, bytes: usize) -> Self {
        self.resync_limit = bytes;
        self
    }

    /// Set the starting volume
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.initial_volume = volume;
        self
    }

    /// Check the settings before a decoder is built from them
    pub fn validate(&self) -> AudioResult<()> {
        if !self.initial_volume.is_finite() {
            return Err(AudioError::ConfigError(format!(
                "Initial volume must be a finite number, got {}",
                self.initial_volume
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = DecoderSettings::default();
        assert_eq!(settings.lookback_frames, 4);
        assert_eq!(settings.resync_limit, 64 * 1024);
        assert_eq!(settings.initial_volume, 1.0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let settings = DecoderSettings::default()
            .with_lookback_frames(2)
            .with_resync_limit(0)
            .with_volume(0.25);
        assert_eq!(settings.lookback_frames, 2);
        assert_eq!(settings.resync_limit, 0);
        assert_eq!(settings.initial_volume, 0.25);
    }

    #[test]
    fn test_non_finite_volume_rejected() {
        let settings = DecoderSettings::default().with_volume(f32::NAN);
        assert!(matches!(settings.validate(), Err(AudioError::ConfigError(_))));
    }
}
