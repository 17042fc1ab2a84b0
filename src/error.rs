//! Error taxonomy shared by the predictors, the codec and the byte cursors.

use crate::codec::MAX_LOG_TABLE_SIZE;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing a codec or moving its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The codec was configured with values it cannot run with.
    /// Raised before any table is allocated or any byte is moved.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    /// The sink can't take a whole record. Records written before it stay valid.
    #[error("sink exhausted: record needs {needed} bytes, {remaining} remaining")]
    CapacityExhausted { needed: usize, remaining: usize },

    /// The source ran out of bytes in the middle of a record.
    #[error("source underflow: record needs {needed} bytes, {remaining} remaining")]
    Underflow { needed: usize, remaining: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("log table size {0} is outside 1..={max}", max = MAX_LOG_TABLE_SIZE)]
    LogTableSize(u32),

    #[error("context hash shifts must be below 64 (shift: {shift}, tail: {tail})")]
    HashMix { shift: u32, tail: u32 },

    #[error("could not allocate a predictor table of 2^{log_table_size} words")]
    Allocation { log_table_size: u32 },
}
