/*!
Byte cursors the codec reads records from and writes records to

Both sides are strictly sequential: no seeking, no peeking. A sink knows how
much room it has left and a source knows how many bytes it still holds, so
the codec can fail cleanly instead of writing or reading half a record.

# Examples

```
use fpc::io::{ByteSink, ByteSource, SliceSink, SliceSource};

let mut buf = [0; 4];
let mut sink = SliceSink::new(&mut buf);
sink.put(&[1, 2, 3]).unwrap();
assert!(sink.put(&[4, 5]).is_err()); // nothing is written on failure
assert_eq!(sink.position(), 3);

let mut source = SliceSource::new(&buf);
assert_eq!(source.get(2).unwrap(), &[1, 2]);
assert_eq!(source.remaining(), 2);
```
*/

use crate::error::{Error, Result};

/// Sequential, capacity-bounded byte sink
pub trait ByteSink {
    /// Number of bytes that can still be written
    fn remaining(&self) -> usize;
    /// Writes all of `bytes` or, if they don't fit, none of them
    fn put(&mut self, bytes: &[u8]) -> Result<()>;
}

/// Sequential, length-bounded byte source
pub trait ByteSource {
    /// Number of bytes left to read
    fn remaining(&self) -> usize;
    /// Reads exactly `n` bytes or, if fewer are left, consumes nothing
    fn get(&mut self, n: usize) -> Result<&[u8]>;
}

/// Sink over a caller-provided, fixed-size buffer
#[derive(Debug)]
pub struct SliceSink<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceSink<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes written so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The written prefix of the buffer
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }
}

impl ByteSink for SliceSink<'_> {
    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        let remaining = self.remaining();
        if bytes.len() > remaining {
            return Err(Error::CapacityExhausted { needed: bytes.len(), remaining });
        }
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }
}

// Growable, so only bounded by what a Vec may hold
impl ByteSink for Vec<u8> {
    fn remaining(&self) -> usize {
        isize::MAX as usize - self.len()
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        let remaining = ByteSink::remaining(self);
        if bytes.len() > remaining {
            return Err(Error::CapacityExhausted { needed: bytes.len(), remaining });
        }
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// Source over a borrowed byte slice
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl ByteSource for SliceSource<'_> {
    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn get(&mut self, n: usize) -> Result<&[u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(Error::Underflow { needed: n, remaining });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }
}
