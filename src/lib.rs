//! Lossless FPC compression of `f64` sequences.
//!
//! Every value is guessed by two context-hash predictors (FCM and DFCM); the
//! closer guess is XORed with the truth and only the non-zero low bytes of that
//! residual are stored, behind a shared header byte per pair of values.
//!
//! ```
//! let values = [1.0, 0.0, 0.5];
//! let bytes = fpc::compress(&values, 16).unwrap();
//! let back = fpc::decompress(&bytes, values.len(), 16).unwrap();
//! assert_eq!(back, values);
//! ```

pub mod codec;
pub mod error;
pub mod helpers;
pub mod io;
pub mod logging;
pub mod predictors;

pub use codec::{compress, decompress, encoded_len_bound, CodecConfig, FpcCodec, DEFAULT_LOG_TABLE_SIZE};
pub use error::{ConfigError, Error, Result};
