pub mod dfcm;
pub mod fcm;

pub use self::{dfcm::*, fcm::*};

use crate::codec::MAX_LOG_TABLE_SIZE;
use crate::error::ConfigError;

/// A model over a stream of 64-bit words.
///
/// State after `k` updates is a pure function of the first `k` words and the
/// table size, so an encoder and a decoder fed the same words stay in sync.
pub trait Predictor {
    /// Best guess for the next word, no mutation
    fn predict(&self) -> u64;
    /// Feed the true word, exactly once per value
    fn update(&mut self, actual: u64);

    /// Enough state to undo one `update`
    type Checkpoint: Copy;
    fn checkpoint(&self) -> Self::Checkpoint;
    /// Undoes the `update` made since `checkpoint` was taken.
    /// Several checkpoints must be rolled back newest first.
    fn rollback(&mut self, checkpoint: Self::Checkpoint);

    /// XOR distance between the guess and the truth
    fn residual(&self, actual: u64) -> u64 {
        self.predict() ^ actual
    }
}

/// Context hash step: `((ctx << shift) ^ (word >> tail)) & mask`
///
/// The constants only move the compression ratio, both sides just need the same ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashMix {
    pub shift: u32,
    pub tail: u32,
}

impl HashMix {
    pub const FCM: Self = Self { shift: 6, tail: 48 };
    pub const DFCM: Self = Self { shift: 2, tail: 40 };

    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.shift >= u64::BITS || self.tail >= u64::BITS {
            return Err(ConfigError::HashMix { shift: self.shift, tail: self.tail });
        }
        Ok(self)
    }

    #[inline(always)]
    pub fn next(self, ctx: u64, word: u64, mask: u64) -> u64 {
        ((ctx << self.shift) ^ (word >> self.tail)) & mask
    }
}

/// Allocates a zeroed table of `2^log_size` slots without aborting on OOM
pub(crate) fn alloc_table(log_size: u32) -> Result<Vec<u64>, ConfigError> {
    if log_size == 0 || log_size > MAX_LOG_TABLE_SIZE {
        return Err(ConfigError::LogTableSize(log_size));
    }
    let alloc_err = ConfigError::Allocation { log_table_size: log_size };
    let len = 1usize.checked_shl(log_size).ok_or(alloc_err)?;

    let mut table = Vec::new();
    table.try_reserve_exact(len).map_err(|_| alloc_err)?;
    table.resize(len, 0);
    Ok(table)
}

/// Which predictor a residual came from, one header bit on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Fcm = 0,
    Dfcm = 1,
}

impl Selector {
    pub fn bit(self) -> u8 {
        self as u8
    }

    pub fn from_bit(bit: u8) -> Self {
        match bit & 1 {
            0 => Self::Fcm,
            _ => Self::Dfcm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub selector: Selector,
    pub residual: u64,
}

/// Two predictors driven in lockstep. Both see every word, whichever one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestOfTwo<T = Fcm, U = Dfcm>
where
    T: Predictor,
    U: Predictor,
{
    m1: T,
    m2: U,
}

impl<T, U> BestOfTwo<T, U>
where
    T: Predictor,
    U: Predictor,
{
    pub fn new(m1: T, m2: U) -> Self {
        Self { m1, m2 }
    }

    /// Encoder step: both residuals are taken before either model moves.
    /// The second model only wins with a strictly smaller residual.
    pub fn observe(&mut self, actual: u64) -> Choice {
        let r1 = self.m1.residual(actual);
        let r2 = self.m2.residual(actual);
        self.update(actual);

        if r2 < r1 {
            Choice { selector: Selector::Dfcm, residual: r2 }
        } else {
            Choice { selector: Selector::Fcm, residual: r1 }
        }
    }

    pub fn predict(&self, selector: Selector) -> u64 {
        match selector {
            Selector::Fcm => self.m1.predict(),
            Selector::Dfcm => self.m2.predict(),
        }
    }

    pub fn update(&mut self, actual: u64) {
        self.m1.update(actual);
        self.m2.update(actual);
    }

    pub fn checkpoint(&self) -> (T::Checkpoint, U::Checkpoint) {
        (self.m1.checkpoint(), self.m2.checkpoint())
    }

    pub fn rollback(&mut self, (c1, c2): (T::Checkpoint, U::Checkpoint)) {
        self.m1.rollback(c1);
        self.m2.rollback(c2);
    }
}
