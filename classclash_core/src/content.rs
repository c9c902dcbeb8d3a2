use classclash_common::{ClashError, ComparableUnit, LibraryArchive, DEFAULT_BUFFER_SIZE};
use std::io::{self, ErrorKind, Read};
use tracing::trace;

/// Byte-exact stream comparison with bounded memory
pub struct ContentComparator {
    buffer_size: usize,
}

impl Default for ContentComparator {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }
}

impl ContentComparator {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Compare two streams chunk by chunk.
    ///
    /// `right` ending before `left` is inequality, not an error. Every other
    /// I/O failure is returned. Both readers are consumed and dropped on return.
    pub fn streams_equal<L: Read, R: Read>(&self, mut left: L, mut right: R) -> io::Result<bool> {
        let mut left_buf = vec![0u8; self.buffer_size];
        let mut right_buf = vec![0u8; self.buffer_size];

        loop {
            let n = match left.read(&mut left_buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            match right.read_exact(&mut right_buf[..n]) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(false),
                Err(e) => return Err(e),
            }

            if left_buf[..n] != right_buf[..n] {
                return Ok(false);
            }
        }

        // left is exhausted, right must be too
        loop {
            match right.read(&mut right_buf[..1]) {
                Ok(0) => return Ok(true),
                Ok(_) => return Ok(false),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Compare the content of two units, opening a fresh stream for each
    pub fn units_equal(
        &self,
        left: &dyn ComparableUnit,
        right: &dyn ComparableUnit,
    ) -> Result<bool, ClashError> {
        trace!("Comparing unit content of {}", left.canonical_name());
        let left_stream = left.open_stream()?;
        let right_stream = right.open_stream()?;
        Ok(self.streams_equal(left_stream, right_stream)?)
    }

    /// Compare the raw bytes of two library archives
    pub fn archives_equal(
        &self,
        left: &dyn LibraryArchive,
        right: &dyn LibraryArchive,
    ) -> Result<bool, ClashError> {
        trace!("Comparing archive bytes of {} and {}", left.name(), right.name());
        let left_stream = left.open_stream()?;
        let right_stream = right.open_stream()?;
        Ok(self.streams_equal(left_stream, right_stream)?)
    }
}
