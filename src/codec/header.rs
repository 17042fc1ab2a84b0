//! Record header layout and partial-word serialization.
//!
//! ```text
//! bit 7     selector of value 1 (0 = FCM, 1 = DFCM)
//! bits 6-4  code of value 1
//! bit 3     selector of value 2
//! bits 2-0  code of value 2
//! ```
//!
//! A code names how many high-order zero bytes of the residual are elided.
//! Nine counts share eight codes: 3 and 4 both map to code 3, so a residual
//! with exactly 4 zero bytes is sent with 5 payload bytes, the top one zero.

use crate::predictors::Selector;

/// Leading zero byte count (0..=8) to code
pub const LZB_TO_CODE: [u8; 9] = [0, 1, 2, 3, 3, 4, 5, 6, 7];
/// Code to the leading zero byte count the decoder assumes
pub const CODE_TO_LZB: [u8; 8] = [0, 1, 2, 3, 5, 6, 7, 8];

/// Code of a residual that costs no payload bytes
pub const FULL_MATCH: u8 = 7;

pub fn leading_zero_bytes(residual: u64) -> u8 {
    (residual.leading_zeros() / u8::BITS) as u8
}

pub fn code_for(residual: u64) -> u8 {
    LZB_TO_CODE[usize::from(leading_zero_bytes(residual))]
}

/// Payload length is always derived from the code, on both sides
pub fn payload_len(code: u8) -> usize {
    8 - usize::from(CODE_TO_LZB[usize::from(code & 7)])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Half {
    pub selector: Selector,
    pub code: u8,
}

impl Half {
    pub fn new(selector: Selector, code: u8) -> Self {
        debug_assert!(code <= FULL_MATCH);
        Self { selector, code }
    }

    fn nibble(self) -> u8 {
        (self.selector.bit() << 3) | (self.code & 7)
    }

    fn from_nibble(nib: u8) -> Self {
        Self { selector: Selector::from_bit(nib >> 3), code: nib & 7 }
    }
}

pub fn pack(first: Half, second: Half) -> u8 {
    (first.nibble() << 4) | second.nibble()
}

pub fn unpack(header: u8) -> (Half, Half) {
    (Half::from_nibble(header >> 4), Half::from_nibble(header & 15))
}

/// Little endian, least significant byte first
pub fn low_bytes(word: u64, len: usize) -> impl Iterator<Item = u8> {
    word.to_le_bytes().into_iter().take(len)
}

/// Inverse of `low_bytes`, zero extends to 64 bits
pub fn word_from_low_bytes(bytes: &[u8]) -> u64 {
    debug_assert!(bytes.len() <= 8);
    let mut buf = [0; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(u64::MAX, 0 ; "no zero bytes")]
    #[test_case(0x00ff_ffff_ffff_ffff, 1 ; "one")]
    #[test_case(0x0000_0000_ff00_0000, 4 ; "four")]
    #[test_case(0x0000_0000_00ff_ffff, 5 ; "five")]
    #[test_case(1, 7 ; "seven")]
    #[test_case(0, 8 ; "exact match")]
    fn counts_leading_zero_bytes(residual: u64, lzb: u8) {
        assert_eq!(leading_zero_bytes(residual), lzb);
    }

    #[test_case(0, 0, 8)]
    #[test_case(1, 1, 7)]
    #[test_case(2, 2, 6)]
    #[test_case(3, 3, 5)]
    #[test_case(4, 3, 5 ; "collapsed onto 3")]
    #[test_case(5, 4, 3)]
    #[test_case(6, 5, 2)]
    #[test_case(7, 6, 1)]
    #[test_case(8, 7, 0 ; "full match")]
    fn code_table(lzb: usize, code: u8, len: usize) {
        assert_eq!(LZB_TO_CODE[lzb], code);
        assert_eq!(payload_len(code), len);
        // never fewer bytes than the residual needs
        assert!(len >= 8 - lzb);
    }

    #[test]
    fn codes_invert() {
        for code in 0..8u8 {
            assert_eq!(LZB_TO_CODE[usize::from(CODE_TO_LZB[usize::from(code)])], code);
        }
    }

    #[test]
    fn header_layout() {
        let first = Half::new(Selector::Dfcm, 5);
        let second = Half::new(Selector::Fcm, 2);
        assert_eq!(pack(first, second), 0b1_101_0_010);
        assert_eq!(unpack(0b1_101_0_010), (first, second));
        assert_eq!(unpack(0x07), (Half::new(Selector::Fcm, 0), Half::new(Selector::Fcm, FULL_MATCH)));
    }

    #[test]
    fn selector_only_touches_its_bit() {
        for code1 in 0..8 {
            for nib in 0..16u8 {
                let second = Half::from_nibble(nib);
                let fcm = pack(Half::new(Selector::Fcm, code1), second);
                let dfcm = pack(Half::new(Selector::Dfcm, code1), second);
                assert_eq!(fcm ^ dfcm, 0x80);
            }
        }
    }

    #[test]
    fn partial_words() {
        let word = 0x0000_00ab_cdef_0123;
        let bytes: Vec<u8> = low_bytes(word, 5).collect();
        assert_eq!(bytes, [0x23, 0x01, 0xef, 0xcd, 0xab]);
        assert_eq!(word_from_low_bytes(&bytes), word);
        assert_eq!(low_bytes(word, 0).count(), 0);
        assert_eq!(word_from_low_bytes(&[]), 0);
        assert_eq!(word_from_low_bytes(&u64::MAX.to_le_bytes()), u64::MAX);
    }
}
