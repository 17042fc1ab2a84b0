use std::fmt;

use super::{alloc_table, HashMix, Predictor};
use crate::error::ConfigError;

/// Finite context method: the table maps a hash of recent words to the word that followed it.
/// Good at repeating bit patterns.
#[derive(Clone, PartialEq, Eq)]
pub struct Fcm {
    table: Vec<u64>,
    ctx: u64,
    mask: u64,
    mix: HashMix,
}

impl Fcm {
    pub fn new(log_size: u32) -> Result<Self, ConfigError> {
        Self::with_mix(log_size, HashMix::FCM)
    }

    pub fn with_mix(log_size: u32, mix: HashMix) -> Result<Self, ConfigError> {
        let mix = mix.validate()?;
        let table = alloc_table(log_size)?;
        Ok(Self { mask: table.len() as u64 - 1, table, ctx: 0, mix })
    }

    pub fn context(&self) -> u64 {
        self.ctx
    }
}

impl Predictor for Fcm {
    fn predict(&self) -> u64 {
        self.table[self.ctx as usize]
    }

    fn update(&mut self, actual: u64) {
        self.table[self.ctx as usize] = actual;
        self.ctx = self.mix.next(self.ctx, actual, self.mask);
    }

    /// (context, slot it points at)
    type Checkpoint = (u64, u64);

    fn checkpoint(&self) -> Self::Checkpoint {
        (self.ctx, self.table[self.ctx as usize])
    }

    fn rollback(&mut self, (ctx, slot): Self::Checkpoint) {
        self.table[ctx as usize] = slot;
        self.ctx = ctx;
    }
}

impl fmt::Debug for Fcm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fcm")
            .field("slots", &self.table.len())
            .field("ctx", &self.ctx)
            .field("mix", &self.mix)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Fcm, HashMix, Predictor};

    #[test]
    fn fresh_table_predicts_zero() {
        let fcm = Fcm::new(8).unwrap();
        assert_eq!(fcm.predict(), 0);
        assert_eq!(fcm.context(), 0);
    }

    #[test]
    fn learns_a_period() {
        let mut fcm = Fcm::new(10).unwrap();
        let period = [1.5f64, -2.25, 1e300].map(f64::to_bits);
        for word in period.iter().cycle().take(3 * period.len()) {
            fcm.update(*word);
        }
        // every context of the cycle has been seen, the next word is known
        for &word in period.iter().cycle().take(2 * period.len()) {
            assert_eq!(fcm.predict(), word);
            fcm.update(word);
        }
    }

    #[test]
    fn context_follows_mix() {
        let mut fcm = Fcm::new(16).unwrap();
        let one = 1.0f64.to_bits();
        fcm.update(one);
        assert_eq!(fcm.context(), 0x3ff0);
        fcm.update(0);
        assert_eq!(fcm.context(), 0xfc00);
    }

    #[test]
    fn rollback_restores_slot_and_context() {
        let mut fcm = Fcm::new(16).unwrap();
        fcm.update(1.0f64.to_bits());
        let checkpoint = fcm.checkpoint();
        fcm.update(2.0f64.to_bits());
        fcm.rollback(checkpoint);
        assert_eq!(fcm.context(), 0x3ff0);
        assert_eq!(fcm.predict(), 0);
    }

    #[test]
    fn custom_mix() {
        let mix = HashMix { shift: 1, tail: 60 };
        let mut fcm = Fcm::with_mix(4, mix).unwrap();
        fcm.update(0xf << 60);
        assert_eq!(fcm.context(), 0xf);
        fcm.update(0);
        assert_eq!(fcm.context(), 0xe);
        assert!(Fcm::with_mix(4, HashMix { shift: 70, tail: 0 }).is_err());
    }
}
