use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};

use crate::error::{Error, Result};
use crate::io::ByteSink;

/// Byte offset of the first difference between two files, `None` if equal
pub fn cmp(file1: &Path, file2: &Path) -> io::Result<Option<u64>> {
    let r1 = BufReader::new(File::open(file1)?);
    let r2 = BufReader::new(File::open(file2)?);

    let mut bytes1 = r1.bytes();
    let mut bytes2 = r2.bytes();
    let mut pos = 0;
    loop {
        match (bytes1.next().transpose()?, bytes2.next().transpose()?) {
            (None, None) => return Ok(None),
            (Some(b1), Some(b2)) if b1 == b2 => pos += 1,
            _ => return Ok(Some(pos)),
        }
    }
}

/// Raw little endian words to values. `None` if the length isn't a multiple of 8.
pub fn f64s_from_le_bytes(buf: &[u8]) -> Option<Vec<f64>> {
    let chunks = buf.chunks_exact(8);
    if !chunks.remainder().is_empty() {
        return None;
    }
    Some(chunks.map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]])).collect())
}

pub fn f64s_to_le_bytes(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// A sink that keeps nothing, only counts, for measuring compressed size
#[derive(Debug, Default)]
pub struct ByteCounter {
    count: usize,
}

impl ByteCounter {
    pub fn new() -> Self {
        Self { count: 0 }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Compressed size over raw size of `values` doubles
    pub fn ratio(&self, values: usize) -> f64 {
        ratio(self.count, values)
    }
}

impl ByteSink for ByteCounter {
    fn remaining(&self) -> usize {
        usize::MAX - self.count
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.count = self.count.checked_add(bytes.len()).ok_or(Error::CapacityExhausted {
            needed: bytes.len(),
            remaining: self.remaining(),
        })?;
        Ok(())
    }
}

pub fn ratio(compressed: usize, values: usize) -> f64 {
    if values == 0 {
        return 0.0;
    }
    compressed as f64 / (values * 8) as f64
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{cmp, f64s_from_le_bytes, f64s_to_le_bytes, ratio, ByteCounter};
    use crate::codec::FpcCodec;
    use crate::error::Error;
    use crate::io::ByteSink;

    #[test]
    fn counter_matches_real_output() {
        let input: Vec<f64> = (0..101).map(|i| f64::from(i).sqrt()).collect();
        let mut counter = ByteCounter::new();
        let counted = FpcCodec::new(10).unwrap().encode(&input, &mut counter).unwrap();
        let real = crate::codec::compress(&input, 10).unwrap();
        assert_eq!(counter.count(), real.len());
        assert_eq!(counted, real.len());
        assert!(counter.ratio(input.len()) < 1.0);
    }

    #[test]
    fn raw_words() {
        let values = [1.0, -0.0, f64::INFINITY];
        let raw = f64s_to_le_bytes(&values);
        assert_eq!(raw.len(), 24);
        assert_eq!(raw[..8], [0, 0, 0, 0, 0, 0, 0xf0, 0x3f]);
        let back = f64s_from_le_bytes(&raw).unwrap();
        assert_eq!(back.iter().map(|v| v.to_bits()).collect::<Vec<_>>(), values.map(f64::to_bits));
        assert!(f64s_from_le_bytes(&raw[..23]).is_none());
        assert_eq!(f64s_from_le_bytes(&[]), Some(vec![]));
    }

    #[test]
    fn ratios() {
        assert_eq!(ratio(8, 2), 0.5);
        assert_eq!(ratio(0, 0), 0.0);
    }

    #[test]
    fn compare_files() {
        let dir = std::env::temp_dir().join(format!("fpc_helpers_cmp_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let a = dir.join("a.bin");
        let b = dir.join("b.bin");
        let c = dir.join("c.bin");
        fs::write(&a, b"\x01\x02\x03").unwrap();
        fs::write(&b, b"\x01\x02\x03").unwrap();
        fs::write(&c, b"\x01\x09").unwrap();

        assert_eq!(cmp(&a, &b).unwrap(), None);
        assert_eq!(cmp(&a, &c).unwrap(), Some(1));
        fs::write(&c, b"\x01\x02").unwrap();
        // a shorter file differs where it ends
        assert_eq!(cmp(&a, &c).unwrap(), Some(2));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn counter_refuses_to_wrap() {
        let mut counter = ByteCounter { count: usize::MAX - 2 };
        assert_eq!(counter.remaining(), 2);
        counter.put(&[0; 2]).unwrap();
        assert_eq!(
            counter.put(&[0]),
            Err(Error::CapacityExhausted { needed: 1, remaining: 0 })
        );
        assert_eq!(counter.count(), usize::MAX);
    }
}
