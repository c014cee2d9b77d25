//! Error types for pixtwin-core operations.
//!
//! Every fallible operation on a [`DualImage`](crate::DualImage) reports its
//! outcome through [`Result`]. Failures are local: no error leaves an image in
//! an undocumented state. What happened to the buffer and the view on failure
//! is part of each operation's contract (left untouched, authoritative side
//! kept, or both cleared).
//!
//! # Usage
//!
//! ```rust
//! use pixtwin_core::{BufferFormat, DualImage, Error, RebindPolicy};
//!
//! let mut img = DualImage::new();
//! match img.rebind_view(RebindPolicy::ClearBoth) {
//!     Err(Error::DivergenceUnrecoverable { .. }) => assert!(img.is_empty()),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - For derive macro error implementation
//!
//! # Used By
//!
//! - [`crate::dual::DualImage`] - copy and rebind operations
//! - [`crate::color`] - red/blue swap
//! - [`crate::stream`] - serialization

use crate::rebind::{RebindDirection, RebindPolicy};
use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while keeping a buffer and its view in sync.
///
/// # Categories
///
/// - **Format errors**: [`FormatInvalid`](Error::FormatInvalid)
/// - **Geometry errors**: [`SizeMismatch`](Error::SizeMismatch)
/// - **Binding errors**: [`DivergenceUnrecoverable`](Error::DivergenceUnrecoverable)
/// - **Stream errors**: [`InvalidStream`](Error::InvalidStream), [`Io`](Error::Io)
#[derive(Debug, Error)]
pub enum Error {
    /// A buffer format or view type has no counterpart in the registry.
    #[error("format has no buffer/view mapping: {format}")]
    FormatInvalid {
        /// Format or type description
        format: String,
    },

    /// Source and destination geometry differ for an in-place copy.
    #[error("size mismatch: expected {}x{}, got {}x{}", expected.0, expected.1, actual.0, actual.1)]
    SizeMismatch {
        /// Destination (cols, rows)
        expected: (u32, u32),
        /// Source (cols, rows)
        actual: (u32, u32),
    },

    /// A rebind could not restore the binding.
    ///
    /// The side effects of the policy have already been applied when this is
    /// returned.
    #[error("cannot rebind {direction}: incompatible format, applied {policy:?}")]
    DivergenceUnrecoverable {
        /// Which side was being rebuilt
        direction: RebindDirection,
        /// Policy that decided what was cleared
        policy: RebindPolicy,
    },

    /// Serialized data is malformed.
    #[error("invalid stream: {0}")]
    InvalidStream(String),

    /// I/O error while reading or writing a stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates an [`Error::FormatInvalid`] error.
    #[inline]
    pub fn format_invalid(format: impl std::fmt::Debug) -> Self {
        Self::FormatInvalid {
            format: format!("{format:?}"),
        }
    }

    /// Creates an [`Error::SizeMismatch`] error.
    #[inline]
    pub fn size_mismatch(expected: (u32, u32), actual: (u32, u32)) -> Self {
        Self::SizeMismatch { expected, actual }
    }

    /// Creates an [`Error::DivergenceUnrecoverable`] error.
    #[inline]
    pub fn divergence(direction: RebindDirection, policy: RebindPolicy) -> Self {
        Self::DivergenceUnrecoverable { direction, policy }
    }

    /// Creates an [`Error::InvalidStream`] error.
    #[inline]
    pub fn invalid_stream(msg: impl Into<String>) -> Self {
        Self::InvalidStream(msg.into())
    }

    /// Integer status for callers that work with `0`/`-1` codes.
    ///
    /// Every error maps to `-1`; success is `0`, see [`status_code`].
    #[inline]
    pub fn code(&self) -> i32 {
        -1
    }

    /// Returns `true` if this is a format-related error.
    #[inline]
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::FormatInvalid { .. })
    }

    /// Returns `true` if this is a stream or I/O error.
    #[inline]
    pub fn is_stream_error(&self) -> bool {
        matches!(self, Self::InvalidStream(_) | Self::Io(_))
    }
}

/// Collapses a [`Result`] into the `0`/`-1` status convention.
#[inline]
pub fn status_code<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) => e.code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch_message() {
        let err = Error::size_mismatch((4, 7), (8, 2));
        let msg = err.to_string();
        assert!(msg.contains("4x7"));
        assert!(msg.contains("8x2"));
        assert!(!err.is_format_error());
    }

    #[test]
    fn test_divergence_message() {
        let err = Error::divergence(RebindDirection::ViewFromBuffer, RebindPolicy::KeepAuthoritative);
        assert!(err.to_string().contains("view from buffer"));
        assert!(err.to_string().contains("KeepAuthoritative"));
    }

    #[test]
    fn test_status_code() {
        let ok: Result<()> = Ok(());
        let bad: Result<()> = Err(Error::format_invalid("Mono"));
        assert_eq!(status_code(&ok), 0);
        assert_eq!(status_code(&bad), -1);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        let err: Error = io_err.into();
        assert!(err.is_stream_error());
    }
}
