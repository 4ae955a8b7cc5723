//! Error types for the bandsplit crate.
//!
//! The real-time processing path never fails: out-of-range parameters are
//! clamped and topology changes reset filter state. Errors exist only at the
//! edges — construction, WAV parsing, and file I/O.

use std::fmt;

/// Errors that can occur outside the real-time signal path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitterError {
    /// Invalid audio format or malformed file.
    InvalidFormat(String),
    /// Unsupported channel count (only mono and stereo are handled).
    InvalidChannels(u16),
    /// Sample rate of zero or otherwise unusable.
    InvalidSampleRate(u32),
    /// I/O error.
    IoError(String),
}

impl fmt::Display for SplitterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitterError::InvalidFormat(msg) => write!(f, "invalid format: {}", msg),
            SplitterError::InvalidChannels(n) => {
                write!(f, "unsupported channel count: {}", n)
            }
            SplitterError::InvalidSampleRate(sr) => {
                write!(f, "invalid sample rate: {}", sr)
            }
            SplitterError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for SplitterError {}

impl From<std::io::Error> for SplitterError {
    fn from(err: std::io::Error) -> Self {
        SplitterError::IoError(err.to_string())
    }
}
