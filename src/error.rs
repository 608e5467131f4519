//! Error types for `hourglass`.

use std::path::PathBuf;

/// Result type for segment lifecycle operations.
pub type HourglassResult<T> = Result<T, HourglassError>;

/// Errors returned by the `hourglass` crate.
#[derive(thiserror::Error, Debug)]
pub enum HourglassError {
    /// I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error attributed to a specific path.
    #[error("i/o error at {path:?}: {source}")]
    IoAt {
        /// Path the failing operation touched.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A directory entry is not a segment name.
    #[error("invalid segment name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A segment has no signature file.
    #[error("signature missing in {0:?}")]
    SignatureMissing(PathBuf),

    /// A segment's signature file exists but cannot be decoded.
    #[error("signature corrupt in {path:?}: {reason}")]
    SignatureCorrupt {
        /// Signature file path.
        path: PathBuf,
        /// Decoder diagnostic.
        reason: String,
    },

    /// CRC mismatch (data corruption detected).
    #[error("crc mismatch (expected {expected:#010x}, got {actual:#010x})")]
    CrcMismatch {
        /// CRC stored in the header.
        expected: u32,
        /// CRC computed from the bytes that were read.
        actual: u32,
    },

    /// Format error (bad magic, unsupported version, oversized payload).
    #[error("format error: {0}")]
    Format(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    Encode(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl HourglassError {
    pub(crate) fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoAt {
            path: path.into(),
            source,
        }
    }

    /// Whether this error describes on-disk corruption (as opposed to a resource failure).
    ///
    /// Corruption-class errors are absorbed by archive scans; resource-class errors are not.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::InvalidName { .. }
                | Self::SignatureMissing(_)
                | Self::SignatureCorrupt { .. }
                | Self::CrcMismatch { .. }
                | Self::Format(_)
                | Self::Decode(_)
        )
    }
}
