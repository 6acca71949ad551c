//! A tabled Asymmetric Numeral Systems (tANS) finite-state entropy codec.
//!
//! Implémentation de final-state-rs, tenter d'implémenter FSE en Rust.
//! Author: Adrien Zinger, avec l'inspiration du travail de Jarek Duda,
//!         Yann Collet, Charles Bloom et bien d'autres.
//!
//! The encoder walks a block in reverse, shrinking a single integer state
//! through a per-symbol transform table and buffering one bit-token per
//! byte; the decoder reads the terminal state back as a prefix and walks
//! the tokens forward through a mirrored state table. See `tans.rs` for the
//! core loop, `header.rs` for the self-describing framing, and `DESIGN.md`
//! for how each module is grounded.
pub mod bitstream;
pub mod config;
pub mod count;
pub mod error;
pub mod header;
pub mod normalization;
pub mod spreads;
pub mod tans;

use crate::config::CoderConfig;
use crate::error::{FscError, FscResult};
use crate::tans::DecodeEntry;

/// Alphabet size: the codec is byte-oriented.
pub const MAX_SYMBOLS: usize = 256;
/// Internal precision ceiling: `log_tab_size` never exceeds this.
pub const LOG_TAB_SIZE: usize = 14;
/// Upper bound reserved for a future word-oriented mode; unused by the
/// byte-oriented path implemented here.
pub const MAX_LOG_TAB_SIZE: usize = 16;
/// Precision of the sub-encoder used to compress the large-alphabet header.
pub const TAB_HDR_BITS: usize = 6;
/// Alphabet-size threshold selecting the small- vs. large-alphabet header
/// scheme.
pub const HDR_SYMBOL_LIMIT: usize = 20;
/// Block granularity for the main encode/decode loop.
pub const BLOCK_SIZE: usize = 8192;

/// Compress `input` under `config`, producing a self-contained byte stream.
///
/// Counts are taken over the whole input once; the resulting table is
/// reused across every `BLOCK_SIZE`-sized chunk.
pub fn encode(input: &[u8], config: &CoderConfig) -> FscResult<Vec<u8>> {
    let mut raw_counts = [0usize; MAX_SYMBOLS];
    let max_symbol = count::simple_count_u8_inplace(input, &mut raw_counts);
    if max_symbol == 0 {
        return Err(FscError::InvalidParameter("empty alphabet"));
    }
    log::debug!(
        "encoding {} bytes, alphabet size {}, L={}",
        input.len(),
        max_symbol,
        config.log_tab_size()
    );

    let (norm_counts, max_symbol) = match normalization::normalize_counts(
        &raw_counts[..max_symbol],
        max_symbol,
        config.log_tab_size(),
    ) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("normalization failed: {e}");
            return Err(e);
        }
    };
    let spread = match config.build_spread_table(&norm_counts) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("spread table construction failed: {e}");
            return Err(e);
        }
    };
    let (transforms, states) =
        tans::build_encode_table(&norm_counts, max_symbol, config.log_tab_size(), &spread)?;

    let mut writer = bitstream::BitWriter::new();
    header::write_precision(&mut writer, config.log_tab_size());
    header::write_length(&mut writer, input.len());
    header::write_histogram(&mut writer, &norm_counts, max_symbol, config.log_tab_size())?;

    for (i, chunk) in input.chunks(BLOCK_SIZE).enumerate() {
        log::trace!("encoding block {i} ({} bytes)", chunk.len());
        tans::encode_block(&mut writer, chunk, &transforms, &states, config.log_tab_size())?;
    }

    writer.finish()
}

/// Decompress a stream produced by [`encode`], equivalent to building a
/// [`Decoder`] and calling [`Decoder::decompress`] once.
pub fn decode(input: &[u8]) -> FscResult<Vec<u8>> {
    Decoder::new(input)?.decompress()
}

/// A streaming-flavored decoder: parses the header eagerly, then drives the
/// block loop on demand. Supplemented from `original_source/`'s
/// `FSCInit`/`FSCIsOk`/`FSCDecompress`/`FSCDelete` quartet; `Drop` stands in
/// for the explicit C free.
pub struct Decoder<'a> {
    reader: bitstream::BitReader<'a>,
    log_tab_size: usize,
    total_len: usize,
    decode_tab: Vec<DecodeEntry>,
    ok: bool,
}

impl<'a> Decoder<'a> {
    /// Parse the header and build the decode table. Mirrors `FSCInit`.
    pub fn new(input: &'a [u8]) -> FscResult<Self> {
        let mut reader = bitstream::BitReader::new(input);
        let log_tab_size = header::read_precision(&mut reader)?;
        let total_len = header::read_length(&mut reader)?;
        let (counts, _max_symbol) = header::read_histogram(&mut reader, log_tab_size)?;

        let cfg = CoderConfig::new(log_tab_size)?;
        let spread = cfg.build_spread_table(&counts)?;
        let decode_tab = tans::build_decode_table(&counts, &spread, log_tab_size);

        log::debug!("decoder ready: L={log_tab_size}, output length {total_len}");
        Ok(Decoder {
            reader,
            log_tab_size,
            total_len,
            decode_tab,
            ok: true,
        })
    }

    /// Mirrors `FSCIsOk`: false once a decode error has been observed.
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Drive the block loop to completion. Mirrors `FSCDecompress`.
    pub fn decompress(&mut self) -> FscResult<Vec<u8>> {
        let mut out = Vec::with_capacity(self.total_len);
        let mut remaining = self.total_len;
        while remaining > 0 {
            let chunk_len = remaining.min(BLOCK_SIZE);
            match tans::decode_block(&mut self.reader, &self.decode_tab, self.log_tab_size, chunk_len) {
                Ok(chunk) => {
                    out.extend_from_slice(&chunk);
                    remaining -= chunk_len;
                }
                Err(e) => {
                    self.ok = false;
                    log::warn!("block decode failed: {e}");
                    return Err(e);
                }
            }
        }
        if !self.reader.eof() {
            log::trace!("trailing bits after the last block were ignored");
        }
        Ok(out)
    }
}

impl Drop for Decoder<'_> {
    /// Stands in for `FSCDelete`'s explicit table free; ordinary `Vec`/slice
    /// drops already release the memory, so this exists to mirror the
    /// original API's lifecycle rather than to do extra work.
    fn drop(&mut self) {
        log::trace!("dropping decoder (L={})", self.log_tab_size);
    }
}
