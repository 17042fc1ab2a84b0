pub mod header;


use tracing::debug;

use self::header::{code_for, pack, payload_len, unpack, word_from_low_bytes, Half, FULL_MATCH};
use crate::error::{ConfigError, Result};
use crate::io::{ByteSink, ByteSource, SliceSource};
use crate::predictors::{BestOfTwo, Dfcm, Fcm, HashMix, Selector};

pub const DEFAULT_LOG_TABLE_SIZE: u32 = 16;
/// 2^30 slots of 8 bytes, per predictor
pub const MAX_LOG_TABLE_SIZE: u32 = 30;

/// Header + two full payloads
const MAX_RECORD_LEN: usize = 1 + 8 + 8;
/// Closes the padding record of an odd-length stream
const TERMINATOR: u8 = 0x00;

/// Largest number of bytes `encode` writes for `count` values
pub fn encoded_len_bound(count: usize) -> usize {
    count.div_ceil(2) * MAX_RECORD_LEN
}

/// Everything both ends of a stream must agree on. Nothing of it is on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    pub log_table_size: u32,
    pub fcm_mix: HashMix,
    pub dfcm_mix: HashMix,
}

impl CodecConfig {
    pub fn new(log_table_size: u32) -> Self {
        Self { log_table_size, ..Self::default() }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.log_table_size == 0 || self.log_table_size > MAX_LOG_TABLE_SIZE {
            return Err(ConfigError::LogTableSize(self.log_table_size));
        }
        self.fcm_mix.validate()?;
        self.dfcm_mix.validate()?;
        Ok(())
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            log_table_size: DEFAULT_LOG_TABLE_SIZE,
            fcm_mix: HashMix::FCM,
            dfcm_mix: HashMix::DFCM,
        }
    }
}

/// Fixed size scratch a record is assembled in before it reaches the sink
struct Record {
    buf: [u8; MAX_RECORD_LEN],
    len: usize,
}

impl Record {
    fn new(header: u8) -> Self {
        let mut buf = [0; MAX_RECORD_LEN];
        buf[0] = header;
        Self { buf, len: 1 }
    }

    fn push(&mut self, byte: u8) {
        self.buf[self.len] = byte;
        self.len += 1;
    }

    fn push_residual(&mut self, residual: u64, code: u8) {
        header::low_bytes(residual, payload_len(code)).for_each(|b| self.push(b));
    }

    fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// FPC encoder/decoder.
///
/// One instance is one direction of one stream: its predictors carry the
/// history of every value seen so far. Decode with a fresh instance built
/// from the same `CodecConfig` that encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FpcCodec {
    predictors: BestOfTwo<Fcm, Dfcm>,
    config: CodecConfig,
}

impl FpcCodec {
    pub fn new(log_table_size: u32) -> Result<Self> {
        Self::with_config(CodecConfig::new(log_table_size))
    }

    pub fn with_config(config: CodecConfig) -> Result<Self> {
        config.validate()?;
        let fcm = Fcm::with_mix(config.log_table_size, config.fcm_mix)?;
        let dfcm = Dfcm::with_mix(config.log_table_size, config.dfcm_mix)?;
        debug!(
            log_table_size = config.log_table_size,
            table_bytes = 16u64 << config.log_table_size,
            "codec ready"
        );
        Ok(Self { predictors: BestOfTwo::new(fcm, dfcm), config })
    }

    pub fn config(&self) -> CodecConfig {
        self.config
    }

    /// Writes one record per pair of values (the last one padded if the
    /// count is odd) and returns the number of bytes written.
    ///
    /// Each record reaches the sink in a single `put`, so on
    /// `CapacityExhausted` the sink holds whole records only and the codec
    /// is back where it was after the last of them. Encoding the values that
    /// didn't fit again, into a drained sink, continues the same stream.
    pub fn encode<S: ByteSink>(&mut self, values: &[f64], sink: &mut S) -> Result<usize> {
        let mut written = 0;
        let mut pairs = values.chunks_exact(2);
        for pair in &mut pairs {
            written += self.encode_record(pair[0], Some(pair[1]), sink)?;
        }
        if let [last] = pairs.remainder() {
            written += self.encode_record(*last, None, sink)?;
        }
        Ok(written)
    }

    fn encode_record<S: ByteSink>(&mut self, first: f64, second: Option<f64>, sink: &mut S) -> Result<usize> {
        let before_first = self.predictors.checkpoint();
        let a = self.predictors.observe(first.to_bits());
        let code_a = code_for(a.residual);
        let mut before_second = None;

        let record = match second {
            Some(value) => {
                before_second = Some(self.predictors.checkpoint());
                let b = self.predictors.observe(value.to_bits());
                let code_b = code_for(b.residual);
                let mut record = Record::new(pack(Half::new(a.selector, code_a), Half::new(b.selector, code_b)));
                record.push_residual(a.residual, code_a);
                record.push_residual(b.residual, code_b);
                record
            }
            // padding slot: empty payload, never observed by the predictors
            None => {
                let mut record = Record::new(pack(Half::new(a.selector, code_a), Half::new(Selector::Fcm, FULL_MATCH)));
                record.push_residual(a.residual, code_a);
                record.push(TERMINATOR);
                record
            }
        };

        if let Err(err) = sink.put(record.as_bytes()) {
            // the sink never saw these values, so neither did the predictors
            if let Some(checkpoint) = before_second {
                self.predictors.rollback(checkpoint);
            }
            self.predictors.rollback(before_first);
            return Err(err);
        }
        Ok(record.len)
    }

    /// Decodes `count` values, consuming exactly the bytes `encode` wrote for them
    pub fn decode<R: ByteSource>(&mut self, source: &mut R, count: usize) -> Result<Vec<f64>> {
        let mut dest = vec![0.0; count];
        self.decode_into(source, &mut dest)?;
        Ok(dest)
    }

    /// Fills `dest` completely. On error, values past the last whole record are unspecified.
    pub fn decode_into<R: ByteSource>(&mut self, source: &mut R, dest: &mut [f64]) -> Result<()> {
        let mut pairs = dest.chunks_exact_mut(2);
        for pair in &mut pairs {
            let (first, second) = unpack(source.get(1)?[0]);
            pair[0] = self.decode_value(source, first)?;
            pair[1] = self.decode_value(source, second)?;
        }
        if let [last] = pairs.into_remainder() {
            let (first, padding) = unpack(source.get(1)?[0]);
            *last = self.decode_value(source, first)?;
            source.get(payload_len(padding.code) + 1)?;
        }
        Ok(())
    }

    fn decode_value<R: ByteSource>(&mut self, source: &mut R, half: Half) -> Result<f64> {
        let residual = word_from_low_bytes(source.get(payload_len(half.code))?);
        let actual = self.predictors.predict(half.selector) ^ residual;
        self.predictors.update(actual);
        Ok(f64::from_bits(actual))
    }
}

/// Encodes `values` into a fresh buffer with a fresh codec
pub fn compress(values: &[f64], log_table_size: u32) -> Result<Vec<u8>> {
    let mut codec = FpcCodec::new(log_table_size)?;
    let mut out = Vec::with_capacity(encoded_len_bound(values.len()));
    codec.encode(values, &mut out)?;
    Ok(out)
}

/// Decodes `count` values from the start of `bytes` with a fresh codec
pub fn decompress(bytes: &[u8], count: usize, log_table_size: u32) -> Result<Vec<f64>> {
    let mut codec = FpcCodec::new(log_table_size)?;
    codec.decode(&mut SliceSource::new(bytes), count)
}
