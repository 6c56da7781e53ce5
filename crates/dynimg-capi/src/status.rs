//! Status codes and message buffers.

use std::ffi::c_char;

use dynimg::{Error, ErrorKind, IoKind, Result};

/// Outcome of a C call.
///
/// `None` means success; every other value is one tag of the closed error
/// taxonomy, with I/O failures flattened to one code per kind.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DynimgStatus {
    /// Success.
    None = 0,
    /// Input could not be decoded.
    Decoding,
    /// Output could not be encoded.
    Encoding,
    /// Dimensions disagree with data.
    ParameterDimensionMismatch,
    /// A previous call already failed.
    ParameterFailedAlready,
    /// A parameter is malformed, or a required pointer is null.
    ParameterMalformed,
    /// No more data.
    ParameterNoMoreData,
    /// Allocation limit exceeded.
    InsufficientMemory,
    /// Requested limits are not supported.
    LimitsUnsupported,
    /// Image dimensions exceed the limit.
    DimensionError,
    /// Color layout not supported by the codec.
    UnsupportedColor,
    /// Format not supported.
    UnsupportedFormat,
    /// Some other capability is missing.
    UnsupportedOther,
    #[allow(missing_docs)]
    IoNotFound,
    #[allow(missing_docs)]
    IoPermissionDenied,
    #[allow(missing_docs)]
    IoConnectionRefused,
    #[allow(missing_docs)]
    IoConnectionReset,
    #[allow(missing_docs)]
    IoConnectionAborted,
    #[allow(missing_docs)]
    IoNotConnected,
    #[allow(missing_docs)]
    IoAddrInUse,
    #[allow(missing_docs)]
    IoAddrNotAvailable,
    #[allow(missing_docs)]
    IoBrokenPipe,
    #[allow(missing_docs)]
    IoAlreadyExists,
    #[allow(missing_docs)]
    IoWouldBlock,
    #[allow(missing_docs)]
    IoInvalidInput,
    #[allow(missing_docs)]
    IoInvalidData,
    #[allow(missing_docs)]
    IoTimedOut,
    #[allow(missing_docs)]
    IoWriteZero,
    #[allow(missing_docs)]
    IoInterrupted,
    #[allow(missing_docs)]
    IoUnsupported,
    #[allow(missing_docs)]
    IoUnexpectedEof,
    #[allow(missing_docs)]
    IoOutOfMemory,
    #[allow(missing_docs)]
    IoOther,
    /// Unclassified.
    Unknown,
}

impl From<IoKind> for DynimgStatus {
    fn from(kind: IoKind) -> Self {
        match kind {
            IoKind::NotFound => Self::IoNotFound,
            IoKind::PermissionDenied => Self::IoPermissionDenied,
            IoKind::ConnectionRefused => Self::IoConnectionRefused,
            IoKind::ConnectionReset => Self::IoConnectionReset,
            IoKind::ConnectionAborted => Self::IoConnectionAborted,
            IoKind::NotConnected => Self::IoNotConnected,
            IoKind::AddrInUse => Self::IoAddrInUse,
            IoKind::AddrNotAvailable => Self::IoAddrNotAvailable,
            IoKind::BrokenPipe => Self::IoBrokenPipe,
            IoKind::AlreadyExists => Self::IoAlreadyExists,
            IoKind::WouldBlock => Self::IoWouldBlock,
            IoKind::InvalidInput => Self::IoInvalidInput,
            IoKind::InvalidData => Self::IoInvalidData,
            IoKind::TimedOut => Self::IoTimedOut,
            IoKind::WriteZero => Self::IoWriteZero,
            IoKind::Interrupted => Self::IoInterrupted,
            IoKind::Unsupported => Self::IoUnsupported,
            IoKind::UnexpectedEof => Self::IoUnexpectedEof,
            IoKind::OutOfMemory => Self::IoOutOfMemory,
            IoKind::Other => Self::IoOther,
        }
    }
}

impl From<ErrorKind> for DynimgStatus {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Decoding => Self::Decoding,
            ErrorKind::Encoding => Self::Encoding,
            ErrorKind::ParameterDimensionMismatch => Self::ParameterDimensionMismatch,
            ErrorKind::ParameterFailedAlready => Self::ParameterFailedAlready,
            ErrorKind::ParameterMalformed => Self::ParameterMalformed,
            ErrorKind::ParameterNoMoreData => Self::ParameterNoMoreData,
            ErrorKind::InsufficientMemory => Self::InsufficientMemory,
            ErrorKind::LimitsUnsupported => Self::LimitsUnsupported,
            ErrorKind::DimensionError => Self::DimensionError,
            ErrorKind::UnsupportedColor => Self::UnsupportedColor,
            ErrorKind::UnsupportedFormat => Self::UnsupportedFormat,
            ErrorKind::UnsupportedOther => Self::UnsupportedOther,
            ErrorKind::Io(io) => io.into(),
            ErrorKind::Unknown => Self::Unknown,
        }
    }
}

impl From<&Error> for DynimgStatus {
    fn from(err: &Error) -> Self {
        err.kind().into()
    }
}

impl DynimgStatus {
    /// The error tag behind this status; `None` for success.
    pub fn kind(self) -> Option<ErrorKind> {
        let io = |k| Some(ErrorKind::Io(k));
        match self {
            Self::None => None,
            Self::Decoding => Some(ErrorKind::Decoding),
            Self::Encoding => Some(ErrorKind::Encoding),
            Self::ParameterDimensionMismatch => Some(ErrorKind::ParameterDimensionMismatch),
            Self::ParameterFailedAlready => Some(ErrorKind::ParameterFailedAlready),
            Self::ParameterMalformed => Some(ErrorKind::ParameterMalformed),
            Self::ParameterNoMoreData => Some(ErrorKind::ParameterNoMoreData),
            Self::InsufficientMemory => Some(ErrorKind::InsufficientMemory),
            Self::LimitsUnsupported => Some(ErrorKind::LimitsUnsupported),
            Self::DimensionError => Some(ErrorKind::DimensionError),
            Self::UnsupportedColor => Some(ErrorKind::UnsupportedColor),
            Self::UnsupportedFormat => Some(ErrorKind::UnsupportedFormat),
            Self::UnsupportedOther => Some(ErrorKind::UnsupportedOther),
            Self::IoNotFound => io(IoKind::NotFound),
            Self::IoPermissionDenied => io(IoKind::PermissionDenied),
            Self::IoConnectionRefused => io(IoKind::ConnectionRefused),
            Self::IoConnectionReset => io(IoKind::ConnectionReset),
            Self::IoConnectionAborted => io(IoKind::ConnectionAborted),
            Self::IoNotConnected => io(IoKind::NotConnected),
            Self::IoAddrInUse => io(IoKind::AddrInUse),
            Self::IoAddrNotAvailable => io(IoKind::AddrNotAvailable),
            Self::IoBrokenPipe => io(IoKind::BrokenPipe),
            Self::IoAlreadyExists => io(IoKind::AlreadyExists),
            Self::IoWouldBlock => io(IoKind::WouldBlock),
            Self::IoInvalidInput => io(IoKind::InvalidInput),
            Self::IoInvalidData => io(IoKind::InvalidData),
            Self::IoTimedOut => io(IoKind::TimedOut),
            Self::IoWriteZero => io(IoKind::WriteZero),
            Self::IoInterrupted => io(IoKind::Interrupted),
            Self::IoUnsupported => io(IoKind::Unsupported),
            Self::IoUnexpectedEof => io(IoKind::UnexpectedEof),
            Self::IoOutOfMemory => io(IoKind::OutOfMemory),
            Self::IoOther => io(IoKind::Other),
            Self::Unknown => Some(ErrorKind::Unknown),
        }
    }

    /// Canonical message for this status.
    pub fn description(self) -> &'static str {
        self.kind().map_or("No error", ErrorKind::description)
    }
}

/// Collapses a result to a status, logging failures.
pub(crate) fn status_of<T>(result: &Result<T>) -> DynimgStatus {
    match result {
        Ok(_) => DynimgStatus::None,
        Err(err) => {
            tracing::debug!(error = %err, "c call failed");
            err.into()
        }
    }
}

/// Copies `message` into a caller buffer of `len` bytes, truncating on a
/// UTF-8 boundary and always NUL-terminating. Returns the bytes written,
/// terminator excluded.
///
/// # Safety
///
/// `buf` must be null or valid for `len` byte writes.
pub(crate) unsafe fn write_message(buf: *mut c_char, len: usize, message: &str) -> usize {
    if buf.is_null() || len == 0 {
        return 0;
    }
    let mut n = message.len().min(len - 1);
    while !message.is_char_boundary(n) {
        n -= 1;
    }
    // SAFETY: the caller guarantees `len` writable bytes and `n < len`.
    unsafe {
        std::ptr::copy_nonoverlapping(message.as_ptr().cast::<c_char>(), buf, n);
        *buf.add(n) = 0;
    }
    n
}

/// Writes the canonical message of `status` into `buf` (at most `len` bytes
/// including the terminator). Returns the message length written.
///
/// # Safety
///
/// `buf` must be null or valid for `len` byte writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynimg_status_message(status: DynimgStatus, buf: *mut c_char, len: usize) -> usize {
    // SAFETY: forwarded caller contract.
    unsafe { write_message(buf, len, status.description()) }
}
