use std::fmt;

use super::{alloc_table, HashMix, Predictor};
use crate::error::ConfigError;

/// Differential FCM: the table holds strides keyed by a hash of recent strides,
/// the guess is the last word plus the stride. Good at smooth series.
///
/// All arithmetic wraps, words are bit patterns and not numbers.
#[derive(Clone, PartialEq, Eq)]
pub struct Dfcm {
    table: Vec<u64>,
    ctx: u64,
    last: u64,
    mask: u64,
    mix: HashMix,
}

impl Dfcm {
    pub fn new(log_size: u32) -> Result<Self, ConfigError> {
        Self::with_mix(log_size, HashMix::DFCM)
    }

    pub fn with_mix(log_size: u32, mix: HashMix) -> Result<Self, ConfigError> {
        let mix = mix.validate()?;
        let table = alloc_table(log_size)?;
        Ok(Self { mask: table.len() as u64 - 1, table, ctx: 0, last: 0, mix })
    }

    pub fn context(&self) -> u64 {
        self.ctx
    }

    pub fn last(&self) -> u64 {
        self.last
    }
}

impl Predictor for Dfcm {
    fn predict(&self) -> u64 {
        self.last.wrapping_add(self.table[self.ctx as usize])
    }

    fn update(&mut self, actual: u64) {
        let delta = actual.wrapping_sub(self.last);
        self.table[self.ctx as usize] = delta;
        self.ctx = self.mix.next(self.ctx, delta, self.mask);
        self.last = actual;
    }

    /// (context, slot it points at, last word)
    type Checkpoint = (u64, u64, u64);

    fn checkpoint(&self) -> Self::Checkpoint {
        (self.ctx, self.table[self.ctx as usize], self.last)
    }

    fn rollback(&mut self, (ctx, slot, last): Self::Checkpoint) {
        self.table[ctx as usize] = slot;
        self.ctx = ctx;
        self.last = last;
    }
}

impl fmt::Debug for Dfcm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dfcm")
            .field("slots", &self.table.len())
            .field("ctx", &self.ctx)
            .field("last", &self.last)
            .field("mix", &self.mix)
            .finish()
    }
}
