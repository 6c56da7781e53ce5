//! In-memory `Write + Seek` sink.

use std::io::{self, Seek, SeekFrom, Write};

/// Growable byte sink with a cursor.
///
/// Seeking before offset 0 fails with `InvalidInput`. Seeking past the end
/// is allowed; the next write fills the gap with zeros.
///
/// ```
/// use std::io::{Seek, SeekFrom, Write};
/// use dynimg_io::MemorySink;
///
/// let mut sink = MemorySink::new();
/// sink.write_all(b"ab").unwrap();
/// sink.seek(SeekFrom::Current(2)).unwrap();
/// sink.write_all(b"c").unwrap();
/// assert_eq!(sink.get_ref(), b"ab\0\0c");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySink {
    data: Vec<u8>,
    pos: u64,
}

impl MemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty sink with preallocated storage.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            pos: 0,
        }
    }

    /// Current cursor position.
    #[inline]
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Bytes written so far.
    #[inline]
    pub fn get_ref(&self) -> &[u8] {
        &self.data
    }

    /// Length of the written data (not the cursor).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the sink and returns its bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let start = usize::try_from(self.pos)
            .map_err(|_| io::Error::new(io::ErrorKind::OutOfMemory, "sink position exceeds address space"))?;
        let end = start
            .checked_add(buf.len())
            .ok_or_else(|| io::Error::new(io::ErrorKind::OutOfMemory, "sink length overflow"))?;
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(buf);
        self.pos = end as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemorySink {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::End(delta) => (self.data.len() as u64).checked_add_signed(delta),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
        };
        match target {
            Some(p) => {
                self.pos = p;
                Ok(p)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_in_place() {
        let mut sink = MemorySink::new();
        sink.write_all(b"hello").unwrap();
        sink.seek(SeekFrom::Start(1)).unwrap();
        sink.write_all(b"EL").unwrap();
        assert_eq!(sink.get_ref(), b"hELlo");
        assert_eq!(sink.position(), 3);
        assert_eq!(sink.len(), 5);
    }

    #[test]
    fn test_seek_from_end() {
        let mut sink = MemorySink::new();
        sink.write_all(b"abcd").unwrap();
        assert_eq!(sink.seek(SeekFrom::End(-1)).unwrap(), 3);
        sink.write_all(b"XY").unwrap();
        assert_eq!(sink.into_inner(), b"abcXY");
    }

    #[test]
    fn test_seek_before_start_fails() {
        let mut sink = MemorySink::new();
        sink.write_all(b"ab").unwrap();
        let err = sink.seek(SeekFrom::Current(-3)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        let err = sink.seek(SeekFrom::End(-3)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        // Cursor is unchanged after a failed seek.
        assert_eq!(sink.position(), 2);
    }

    #[test]
    fn test_seek_past_end_zero_extends() {
        let mut sink = MemorySink::new();
        sink.seek(SeekFrom::Start(3)).unwrap();
        assert!(sink.is_empty());
        sink.write_all(&[7]).unwrap();
        assert_eq!(sink.get_ref(), &[0, 0, 0, 7]);
    }
}
