//! Callback-backed sinks.
//!
//! [`DynimgWriter`] turns a set of C callbacks into a `Write + Seek` sink,
//! and [`DynimgEncoder`] turns one callback into a
//! [`CustomEncoder`](dynimg::CustomEncoder). The `user_data` pointer is
//! passed back untouched on every call.

use std::ffi::c_void;
use std::io::{self, Seek, SeekFrom, Write};

use dynimg::{CustomEncoder, Error, ExtendedColorType, Result};

use crate::types::DynimgColorModel;

/// Origin of a seek.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynimgWhence {
    /// From byte 0; the offset is never negative.
    Start = 0,
    /// From the end of the stream.
    End,
    /// From the current position.
    Current,
}

/// `Write + Seek` sink driven by C callbacks.
///
/// - `write_fn` returns the bytes accepted, or a negative value on failure
/// - `flush_fn` returns 0 on success; it may be null
/// - `seek_fn` returns the new absolute position, or a negative value on
///   failure (including a seek before byte 0)
#[repr(C)]
pub struct DynimgWriter {
    /// Opaque caller state.
    pub user_data: *mut c_void,
    /// Writes `len` bytes from `buf`.
    pub write_fn: extern "C" fn(user_data: *mut c_void, buf: *const u8, len: usize) -> isize,
    /// Flushes buffered output.
    pub flush_fn: Option<extern "C" fn(user_data: *mut c_void) -> i32>,
    /// Moves the stream position.
    pub seek_fn: extern "C" fn(user_data: *mut c_void, whence: DynimgWhence, offset: i64) -> i64,
}

impl Write for DynimgWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = (self.write_fn)(self.user_data, buf.as_ptr(), buf.len());
        usize::try_from(n).map_err(|_| io::Error::other(format!("write callback returned {n}")))
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.flush_fn {
            Some(flush) => match flush(self.user_data) {
                0 => Ok(()),
                code => Err(io::Error::other(format!("flush callback returned {code}"))),
            },
            None => Ok(()),
        }
    }
}

impl Seek for DynimgWriter {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (whence, offset) = match pos {
            SeekFrom::Start(s) => {
                let s = i64::try_from(s)
                    .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "seek offset overflows i64"))?;
                (DynimgWhence::Start, s)
            }
            SeekFrom::End(e) => (DynimgWhence::End, e),
            SeekFrom::Current(c) => (DynimgWhence::Current, c),
        };
        let result = (self.seek_fn)(self.user_data, whence, offset);
        u64::try_from(result).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("seek callback returned {result}"))
        })
    }
}

/// Custom encoder driven by one C callback.
///
/// `write_fn` receives the native-endian sample bytes, the dimensions and
/// the layout, and returns 0 on success.
#[repr(C)]
pub struct DynimgEncoder {
    /// Opaque caller state.
    pub user_data: *mut c_void,
    /// Receives the image.
    pub write_fn: extern "C" fn(
        user_data: *mut c_void,
        buf: *const u8,
        len: usize,
        width: u32,
        height: u32,
        color: DynimgColorModel,
    ) -> i32,
}

impl CustomEncoder for DynimgEncoder {
    fn write_image(&mut self, bytes: &[u8], width: u32, height: u32, color: ExtendedColorType) -> Result<()> {
        let model = DynimgColorModel::try_from(color).map_err(|c| Error::unsupported_color(None, c))?;
        match (self.write_fn)(self.user_data, bytes.as_ptr(), bytes.len(), width, height, model) {
            0 => Ok(()),
            code => Err(Error::encoding(None, format!("encoder callback returned {code}"))),
        }
    }
}
