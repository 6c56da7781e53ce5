//! Error types for dynimg operations.
//!
//! # Overview
//!
//! [`Error`] carries context (which codec, what went wrong) and is what every
//! fallible function in the workspace returns. [`ErrorKind`] is the closed tag
//! set that callers match on, or that crosses the C boundary:
//!
//! ```rust
//! use dynimg_core::{Error, ErrorKind, ImageFormat};
//!
//! let err = Error::decoding(Some(ImageFormat::Png), "bad IHDR chunk");
//! assert_eq!(err.kind(), ErrorKind::Decoding);
//! assert!(err.to_string().contains("IHDR"));
//! ```
//!
//! # Categories
//!
//! - **Codec**: [`Decoding`](Error::Decoding), [`Encoding`](Error::Encoding)
//! - **Caller input**: [`Parameter`](Error::Parameter)
//! - **Resource caps**: [`Limits`](Error::Limits)
//! - **Capability**: [`UnsupportedColor`](Error::UnsupportedColor),
//!   [`UnsupportedFormat`](Error::UnsupportedFormat), [`Unsupported`](Error::Unsupported)
//! - **I/O**: [`Io`](Error::Io)

use std::io;

use thiserror::Error;

use crate::color::ExtendedColorType;
use crate::format::ImageFormat;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Reason a caller-supplied parameter was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Dimensions disagree with the data supplied.
    DimensionMismatch,
    /// The stream already failed on an earlier call.
    FailedAlready,
    /// A value is out of its allowed shape or range.
    Malformed,
    /// The end of the data was reached.
    NoMoreData,
}

/// Which resource limit was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitKind {
    /// Allocation would exceed `max_alloc`.
    InsufficientMemory,
    /// The codec cannot honor the requested strict limits.
    Unsupported,
    /// Width or height exceeds the configured maximum.
    Dimensions,
}

/// Errors returned by dynimg.
#[derive(Debug, Error)]
pub enum Error {
    /// Input bytes could not be decoded.
    ///
    /// `format` is `None` when the container could not be identified.
    #[error("{}decoding error: {message}", fmt_format(.format))]
    Decoding {
        /// Format being decoded, if known
        format: Option<ImageFormat>,
        /// Decoder message
        message: String,
    },

    /// Pixels could not be encoded.
    #[error("{}encoding error: {message}", fmt_format(.format))]
    Encoding {
        /// Target format, if known
        format: Option<ImageFormat>,
        /// Encoder message
        message: String,
    },

    /// A parameter was rejected.
    #[error("parameter error ({kind:?}): {message}")]
    Parameter {
        /// Why it was rejected
        kind: ParameterKind,
        /// Human-readable detail
        message: String,
    },

    /// A resource limit was hit.
    #[error("limit error ({kind:?}): {message}")]
    Limits {
        /// Which limit
        kind: LimitKind,
        /// Human-readable detail
        message: String,
    },

    /// The codec does not support this color layout.
    #[error("{}unsupported color type {color:?}", fmt_format(.format))]
    UnsupportedColor {
        /// Codec involved, if known
        format: Option<ImageFormat>,
        /// Offending layout
        color: ExtendedColorType,
    },

    /// The container is recognized but no codec for it is built in.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Some other feature is not supported.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Anything that fits no other category.
    #[error("{0}")]
    Unknown(String),
}

fn fmt_format(format: &Option<ImageFormat>) -> String {
    match format {
        Some(f) => format!("{f} "),
        None => String::new(),
    }
}

impl Error {
    /// Creates an [`Error::Decoding`] error.
    #[inline]
    pub fn decoding(format: Option<ImageFormat>, message: impl Into<String>) -> Self {
        Self::Decoding {
            format,
            message: message.into(),
        }
    }

    /// Creates an [`Error::Encoding`] error.
    #[inline]
    pub fn encoding(format: Option<ImageFormat>, message: impl Into<String>) -> Self {
        Self::Encoding {
            format,
            message: message.into(),
        }
    }

    /// Creates an [`Error::Parameter`] error.
    #[inline]
    pub fn parameter(kind: ParameterKind, message: impl Into<String>) -> Self {
        Self::Parameter {
            kind,
            message: message.into(),
        }
    }

    /// Creates a [`ParameterKind::Malformed`] error.
    #[inline]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::parameter(ParameterKind::Malformed, message)
    }

    /// Creates a [`ParameterKind::DimensionMismatch`] error.
    #[inline]
    pub fn dimension_mismatch(message: impl Into<String>) -> Self {
        Self::parameter(ParameterKind::DimensionMismatch, message)
    }

    /// Creates an [`Error::Limits`] error.
    #[inline]
    pub fn limits(kind: LimitKind, message: impl Into<String>) -> Self {
        Self::Limits {
            kind,
            message: message.into(),
        }
    }

    /// Creates an [`Error::UnsupportedColor`] error.
    #[inline]
    pub fn unsupported_color(format: Option<ImageFormat>, color: impl Into<ExtendedColorType>) -> Self {
        Self::UnsupportedColor {
            format,
            color: color.into(),
        }
    }

    /// Creates an [`Error::UnsupportedFormat`] error.
    #[inline]
    pub fn unsupported_format(what: impl Into<String>) -> Self {
        Self::UnsupportedFormat(what.into())
    }

    /// Projects this error onto the closed tag set.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decoding { .. } => ErrorKind::Decoding,
            Self::Encoding { .. } => ErrorKind::Encoding,
            Self::Parameter { kind, .. } => match kind {
                ParameterKind::DimensionMismatch => ErrorKind::ParameterDimensionMismatch,
                ParameterKind::FailedAlready => ErrorKind::ParameterFailedAlready,
                ParameterKind::Malformed => ErrorKind::ParameterMalformed,
                ParameterKind::NoMoreData => ErrorKind::ParameterNoMoreData,
            },
            Self::Limits { kind, .. } => match kind {
                LimitKind::InsufficientMemory => ErrorKind::InsufficientMemory,
                LimitKind::Unsupported => ErrorKind::LimitsUnsupported,
                LimitKind::Dimensions => ErrorKind::DimensionError,
            },
            Self::UnsupportedColor { .. } => ErrorKind::UnsupportedColor,
            Self::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Self::Unsupported(_) => ErrorKind::UnsupportedOther,
            Self::Io(err) => match IoKind::from_std(err.kind()) {
                Some(kind) => ErrorKind::Io(kind),
                None => ErrorKind::Unknown,
            },
            Self::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Returns `true` for codec failures (decode or encode).
    #[inline]
    pub fn is_codec_error(&self) -> bool {
        matches!(self, Self::Decoding { .. } | Self::Encoding { .. })
    }

    /// Returns `true` if a resource limit was hit.
    #[inline]
    pub fn is_limit_error(&self) -> bool {
        matches!(self, Self::Limits { .. })
    }

    /// Returns `true` if this is an I/O error.
    #[inline]
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// Closed set of failure tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input could not be decoded.
    Decoding,
    /// Output could not be encoded.
    Encoding,
    /// Dimensions disagree with data.
    ParameterDimensionMismatch,
    /// A previous call already failed.
    ParameterFailedAlready,
    /// A parameter is malformed.
    ParameterMalformed,
    /// No more data.
    ParameterNoMoreData,
    /// Allocation limit exceeded.
    InsufficientMemory,
    /// Requested limits are not supported by the operation.
    LimitsUnsupported,
    /// Image dimensions exceed the limit.
    DimensionError,
    /// Color layout not supported by the codec.
    UnsupportedColor,
    /// Format not supported.
    UnsupportedFormat,
    /// Some other capability is missing.
    UnsupportedOther,
    /// I/O failure of the given kind.
    Io(IoKind),
    /// Unclassified.
    Unknown,
}

impl ErrorKind {
    /// Canonical message for this tag.
    pub fn description(self) -> &'static str {
        match self {
            Self::Decoding => "Decoding error",
            Self::Encoding => "Encoding error",
            Self::ParameterDimensionMismatch => {
                "The Image's dimensions are either too small or too large"
            }
            Self::ParameterFailedAlready => {
                "The end the image stream has been reached due to a previous error"
            }
            Self::ParameterMalformed => "A parameter is malformed",
            Self::ParameterNoMoreData => "The end of the image has been reached",
            Self::InsufficientMemory => "Memory limit exceeded",
            Self::LimitsUnsupported => {
                "Some strict limits are specified but not supported by the operation"
            }
            Self::DimensionError => "Image size exceeds limit",
            Self::UnsupportedColor => {
                "The encoder or decoder for this image does not support the provided color type"
            }
            Self::UnsupportedFormat => "The image format is not supported",
            Self::UnsupportedOther => "The operation is not supported",
            Self::Io(kind) => kind.description(),
            Self::Unknown => "Unknown error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// I/O failure kinds that survive classification.
///
/// Mirrors the stable subset of [`std::io::ErrorKind`]. Kinds outside this
/// set classify as [`ErrorKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum IoKind {
    NotFound,
    PermissionDenied,
    ConnectionRefused,
    ConnectionReset,
    ConnectionAborted,
    NotConnected,
    AddrInUse,
    AddrNotAvailable,
    BrokenPipe,
    AlreadyExists,
    WouldBlock,
    InvalidInput,
    InvalidData,
    TimedOut,
    WriteZero,
    Interrupted,
    Unsupported,
    UnexpectedEof,
    OutOfMemory,
    Other,
}

impl IoKind {
    /// Maps a std kind, or `None` when it has no counterpart.
    pub fn from_std(kind: io::ErrorKind) -> Option<Self> {
        use io::ErrorKind as K;
        Some(match kind {
            K::NotFound => Self::NotFound,
            K::PermissionDenied => Self::PermissionDenied,
            K::ConnectionRefused => Self::ConnectionRefused,
            K::ConnectionReset => Self::ConnectionReset,
            K::ConnectionAborted => Self::ConnectionAborted,
            K::NotConnected => Self::NotConnected,
            K::AddrInUse => Self::AddrInUse,
            K::AddrNotAvailable => Self::AddrNotAvailable,
            K::BrokenPipe => Self::BrokenPipe,
            K::AlreadyExists => Self::AlreadyExists,
            K::WouldBlock => Self::WouldBlock,
            K::InvalidInput => Self::InvalidInput,
            K::InvalidData => Self::InvalidData,
            K::TimedOut => Self::TimedOut,
            K::WriteZero => Self::WriteZero,
            K::Interrupted => Self::Interrupted,
            K::Unsupported => Self::Unsupported,
            K::UnexpectedEof => Self::UnexpectedEof,
            K::OutOfMemory => Self::OutOfMemory,
            K::Other => Self::Other,
            _ => return None,
        })
    }

    /// The matching std kind.
    pub fn to_std(self) -> io::ErrorKind {
        use io::ErrorKind as K;
        match self {
            Self::NotFound => K::NotFound,
            Self::PermissionDenied => K::PermissionDenied,
            Self::ConnectionRefused => K::ConnectionRefused,
            Self::ConnectionReset => K::ConnectionReset,
            Self::ConnectionAborted => K::ConnectionAborted,
            Self::NotConnected => K::NotConnected,
            Self::AddrInUse => K::AddrInUse,
            Self::AddrNotAvailable => K::AddrNotAvailable,
            Self::BrokenPipe => K::BrokenPipe,
            Self::AlreadyExists => K::AlreadyExists,
            Self::WouldBlock => K::WouldBlock,
            Self::InvalidInput => K::InvalidInput,
            Self::InvalidData => K::InvalidData,
            Self::TimedOut => K::TimedOut,
            Self::WriteZero => K::WriteZero,
            Self::Interrupted => K::Interrupted,
            Self::Unsupported => K::Unsupported,
            Self::UnexpectedEof => K::UnexpectedEof,
            Self::OutOfMemory => K::OutOfMemory,
            Self::Other => K::Other,
        }
    }

    /// Canonical message for this kind.
    pub fn description(self) -> &'static str {
        match self {
            Self::NotFound => "entity not found",
            Self::PermissionDenied => "permission denied",
            Self::ConnectionRefused => "connection refused",
            Self::ConnectionReset => "connection reset",
            Self::ConnectionAborted => "connection aborted",
            Self::NotConnected => "not connected",
            Self::AddrInUse => "address in use",
            Self::AddrNotAvailable => "address not available",
            Self::BrokenPipe => "broken pipe",
            Self::AlreadyExists => "entity already exists",
            Self::WouldBlock => "operation would block",
            Self::InvalidInput => "invalid input parameter",
            Self::InvalidData => "invalid data",
            Self::TimedOut => "timed out",
            Self::WriteZero => "write zero",
            Self::Interrupted => "operation interrupted",
            Self::Unsupported => "unsupported",
            Self::UnexpectedEof => "unexpected end of file",
            Self::OutOfMemory => "out of memory",
            Self::Other => "other error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoding_kind() {
        let err = Error::decoding(None, "unrecognized");
        assert_eq!(err.kind(), ErrorKind::Decoding);
        assert!(err.is_codec_error());
        assert_eq!(err.to_string(), "decoding error: unrecognized");
    }

    #[test]
    fn test_decoding_with_format_message() {
        let err = Error::decoding(Some(ImageFormat::Png), "truncated");
        assert!(err.to_string().starts_with("PNG decoding error"));
    }

    #[test]
    fn test_parameter_kinds() {
        assert_eq!(Error::malformed("k").kind(), ErrorKind::ParameterMalformed);
        assert_eq!(
            Error::dimension_mismatch("d").kind(),
            ErrorKind::ParameterDimensionMismatch
        );
        assert_eq!(
            Error::parameter(ParameterKind::NoMoreData, "eof").kind(),
            ErrorKind::ParameterNoMoreData
        );
    }

    #[test]
    fn test_limit_kinds() {
        let err = Error::limits(LimitKind::Dimensions, "too wide");
        assert_eq!(err.kind(), ErrorKind::DimensionError);
        assert!(err.is_limit_error());
        assert_eq!(
            Error::limits(LimitKind::InsufficientMemory, "x").kind(),
            ErrorKind::InsufficientMemory
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.is_io_error());
        assert_eq!(err.kind(), ErrorKind::Io(IoKind::NotFound));
    }

    #[test]
    fn test_io_unlisted_kind_is_unknown() {
        let err: Error = io::Error::from(io::ErrorKind::IsADirectory).into();
        assert_eq!(err.kind(), ErrorKind::Unknown);
    }

    #[test]
    fn test_io_kind_roundtrip() {
        for kind in [IoKind::BrokenPipe, IoKind::UnexpectedEof, IoKind::Other] {
            assert_eq!(IoKind::from_std(kind.to_std()), Some(kind));
        }
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(ErrorKind::DimensionError.description(), "Image size exceeds limit");
        assert_eq!(ErrorKind::InsufficientMemory.to_string(), "Memory limit exceeded");
        assert_eq!(ErrorKind::Io(IoKind::InvalidInput).description(), "invalid input parameter");
    }

    #[test]
    fn test_unsupported_color() {
        let err = Error::unsupported_color(Some(ImageFormat::Jpeg), crate::ColorModel::La16);
        assert_eq!(err.kind(), ErrorKind::UnsupportedColor);
        assert!(err.to_string().contains("La16"));
    }
}
