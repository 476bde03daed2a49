use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the sea-route library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while locating, fetching, or decoding the water grid.
///
/// Every variant is a grid-load failure: routing outcomes such as "no water
/// found" or "no route" are ordinary values and never surface here.
#[derive(Debug, Error)]
pub enum Error {
    /// Mask file could not be located at the resolved path.
    #[error("water mask not found at {path}")]
    MaskNotFound { path: PathBuf },

    /// Remote mask source answered with a non-success status.
    #[error("failed to fetch water mask from {url}: HTTP {status}")]
    MaskFetch { url: String, status: u16 },

    /// Mask bytes could not be decoded (bad JSON, bad base64, bad body).
    #[error("failed to decode water mask: {message}")]
    MaskDecode { message: String },

    /// Mask decoded but its metadata or cell data is inconsistent.
    #[error("invalid water mask: {message}")]
    InvalidMask { message: String },

    /// Stored checksum does not match the compressed body.
    #[error("water mask checksum mismatch - file may be corrupted")]
    MaskChecksum,

    /// Binary mask was written by an unknown format version.
    #[error("unsupported water mask version {found} (expected {expected})")]
    UnsupportedMaskVersion { found: u8, expected: u8 },

    /// Failed to serialize a mask for writing.
    #[error("failed to encode water mask: {message}")]
    MaskEncode { message: String },

    /// No platform data directory could be resolved for the default mask path.
    #[error("failed to resolve project directories for the water mask")]
    ProjectDirsUnavailable,

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for JSON errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidMask {
            message: message.into(),
        }
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Error::MaskDecode {
            message: message.into(),
        }
    }
}
