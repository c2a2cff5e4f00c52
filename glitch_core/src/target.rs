use crate::fault::Fault;
use std::io::{Read, Seek, SeekFrom, Write};
use thiserror::Error;

/// Errors raised while reading or rewriting bytes of a corruption target.
#[derive(Error, Debug)]
pub enum TargetError {
    /// The fault names a byte the target does not have. The engine never
    /// clamps or wraps an offset, since hitting a different byte than the
    /// one asked for would defeat precise fault injection.
    #[error("fault offset {offset} is out of range for target of {len} bytes")]
    OutOfRange { offset: usize, len: usize },

    /// An I/O error from the underlying stream of a file-backed target.
    #[error("target I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Byte storage an [`Injector`](crate::engine::Injector) can corrupt.
///
/// The engine needs nothing from a target beyond a length query and the
/// ability to XOR a pattern into one addressed byte. In-memory buffers
/// (`[u8]`, `Vec<u8>`) satisfy this directly; [`FileTarget`] adapts any
/// seekable stream. Targets are borrowed for the duration of a single
/// engine call and never retained.
pub trait Target {
    /// Returns the number of addressable bytes.
    ///
    /// Takes `&mut self` because file-backed targets have to seek to answer.
    fn len(&mut self) -> Result<usize, TargetError>;

    /// XORs `fault.pattern` into the byte at `fault.offset`.
    ///
    /// # Returns
    /// The rewritten byte value, or `TargetError::OutOfRange` when the
    /// offset is at or beyond the current length. A failed flip leaves the
    /// target untouched.
    fn flip(&mut self, fault: &Fault) -> Result<u8, TargetError>;
}

impl Target for [u8] {
    fn len(&mut self) -> Result<usize, TargetError> {
        Ok(<[u8]>::len(self))
    }

    fn flip(&mut self, fault: &Fault) -> Result<u8, TargetError> {
        let len = <[u8]>::len(self);
        let byte = self.get_mut(fault.offset).ok_or(TargetError::OutOfRange {
            offset: fault.offset,
            len,
        })?;
        *byte ^= fault.pattern;
        Ok(*byte)
    }
}

impl Target for Vec<u8> {
    fn len(&mut self) -> Result<usize, TargetError> {
        Ok(Vec::len(self))
    }

    fn flip(&mut self, fault: &Fault) -> Result<u8, TargetError> {
        self.as_mut_slice().flip(fault)
    }
}

/// Adapter that lets the engine corrupt a seekable byte stream in place,
/// typically an open [`std::fs::File`].
///
/// Each flip seeks to the fault's offset, reads the byte, rewrites it, and
/// writes it back. A read past end-of-stream returns zero bytes, which is
/// reported as `OutOfRange` rather than silently extending the stream.
#[derive(Debug)]
pub struct FileTarget<T> {
    stream: T,
}

impl<T> FileTarget<T>
where
    T: Read + Write + Seek,
{
    pub fn new(stream: T) -> Self {
        Self { stream }
    }

    /// Consumes the adapter and hands the stream back to the caller.
    pub fn into_inner(self) -> T {
        self.stream
    }
}

impl<T> Target for FileTarget<T>
where
    T: Read + Write + Seek,
{
    fn len(&mut self) -> Result<usize, TargetError> {
        let end = self.stream.seek(SeekFrom::End(0))?;
        Ok(end as usize)
    }

    fn flip(&mut self, fault: &Fault) -> Result<u8, TargetError> {
        let mut byte = [0u8];
        self.stream.seek(SeekFrom::Start(fault.offset as u64))?;
        let read = self.stream.read(&mut byte)?;
        if read == 0 {
            let len = self.len()?;
            return Err(TargetError::OutOfRange {
                offset: fault.offset,
                len,
            });
        }
        byte[0] ^= fault.pattern;
        self.stream.seek(SeekFrom::Start(fault.offset as u64))?;
        self.stream.write_all(&byte)?;
        Ok(byte[0])
    }
}
