//! The tANS engine proper: encoder/decoder table construction and the
//! reverse-scan/forward-emit block codec.
//!
//! Implémentation de final-state-rs, tenter d'implémenter FSE en Rust.
//! Author: Adrien Zinger, avec l'inspiration du travail de Jarek Duda,
//!         Yann Collet, Charles Bloom et bien d'autres.
//!
//! This module replaces the crate's original `t_ans.rs`: that file built its
//! tables with a forward-encode/reverse-decode construction that does not
//! match the state-machine this crate targets (reverse-scan encode into a
//! token buffer, forward state walk on decode). The table-building and
//! function-naming conventions are kept; the control flow is rebuilt from
//! scratch to match.

use crate::bitstream::{BitReader, BitWriter};
use crate::error::{FscError, FscResult};

/// Bit position of the highest set bit of `x` (`x >= 1`).
pub fn log2_floor(x: u64) -> u32 {
    debug_assert!(x >= 1, "log2_floor is undefined at 0");
    63 - x.leading_zeros()
}

/// `ceil(log2(x))` (`x >= 1`).
pub fn log2_ceil(x: u64) -> u32 {
    debug_assert!(x >= 1, "log2_ceil is undefined at 0");
    if x.is_power_of_two() {
        log2_floor(x)
    } else {
        log2_floor(x) + 1
    }
}

/// Per-symbol encoder transform, built once per stream/sub-stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transform {
    pub nb_bits: u8,
    pub wrap: u32,
    pub offset: i64,
}

/// Per-slot decoder entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeEntry {
    pub symbol: u8,
    pub len: u8,
    pub next: i64,
}

/// Build the per-symbol transforms and the forward `states[]` table used by
/// [`encode_block`]. `counts` must already be normalized to sum to
/// `2^log_tab_size`, and `spread` must be a valid spread map over the same
/// counts (see `spreads.rs`).
pub fn build_encode_table(
    counts: &[usize],
    max_symbol: usize,
    log_tab_size: usize,
    spread: &[u8],
) -> FscResult<(Vec<Transform>, Vec<u32>)> {
    let t = 1usize << log_tab_size;
    let mut transforms = vec![Transform::default(); max_symbol];
    let mut state_start = vec![0usize; max_symbol];
    let mut pos = 0usize;
    for s in 0..max_symbol {
        let c = counts[s];
        if c == 0 {
            continue;
        }
        state_start[s] = pos;
        let nb_bits = log_tab_size as u32 - log2_ceil(c as u64);
        let wrap = (c as u64) << (nb_bits + 1);
        transforms[s] = Transform {
            nb_bits: nb_bits as u8,
            wrap: wrap as u32,
            offset: pos as i64 - c as i64,
        };
        pos += c;
    }
    if pos != t {
        return Err(FscError::NormalizationError(
            "counts do not sum to the table size",
        ));
    }

    let mut states = vec![0u32; t];
    let mut cursor = state_start;
    for (slot, &s) in spread.iter().enumerate() {
        let si = s as usize;
        states[cursor[si]] = (slot + t) as u32;
        cursor[si] += 1;
    }
    Ok((transforms, states))
}

/// Build the decoder's `(symbol, len, next)` table from the same normalized
/// counts and spread map used by [`build_encode_table`].
pub fn build_decode_table(counts: &[usize], spread: &[u8], log_tab_size: usize) -> Vec<DecodeEntry> {
    let t = 1usize << log_tab_size;
    let mut next_state: Vec<usize> = counts.to_vec();
    let mut tab = vec![DecodeEntry::default(); t];
    for (pos, &s) in spread.iter().enumerate() {
        let si = s as usize;
        let c = next_state[si];
        next_state[si] += 1;
        let nb_bits = log_tab_size as u32 - log2_floor(c as u64);
        let new_state = ((c as i64) << nb_bits) - t as i64;
        tab[pos] = DecodeEntry {
            symbol: s,
            len: nb_bits as u8,
            next: new_state - pos as i64,
        };
    }
    tab
}

/// Encode one block (at most `BLOCK_SIZE` bytes) in reverse, buffering one
/// token per byte, then emit the terminal state as an `L`-bit prefix
/// followed by every token but the last in forward order.
pub fn encode_block(
    writer: &mut BitWriter,
    data: &[u8],
    transforms: &[Transform],
    states: &[u32],
    log_tab_size: usize,
) -> FscResult<()> {
    let t = 1u32 << log_tab_size;
    let mut state: u32 = t;
    let mut tokens: Vec<(u8, u32)> = vec![(0, 0); data.len()];

    for k in (0..data.len()).rev() {
        let sym = data[k] as usize;
        let tr = transforms
            .get(sym)
            .ok_or(FscError::InvalidParameter("symbol not present in table"))?;
        let extra = if state >= tr.wrap { 1 } else { 0 };
        let bits = tr.nb_bits as u32 + extra;
        let val = state & ((1u32 << bits) - 1);
        tokens[k] = (bits as u8, val);
        let idx = ((state >> bits) as i64 + tr.offset) as usize;
        state = *states
            .get(idx)
            .ok_or(FscError::NormalizationError("state transition out of range"))?;
    }

    writer.write_bits(log_tab_size as u32, state & (t - 1));
    if data.len() > 1 {
        for &(bits, val) in &tokens[..data.len() - 1] {
            writer.write_bits(bits as u32, val);
        }
    }
    Ok(())
}

/// Decode `count` symbols, walking the decode table forward from the
/// `L`-bit prefix written by [`encode_block`].
pub fn decode_block(
    reader: &mut BitReader,
    tab: &[DecodeEntry],
    log_tab_size: usize,
    count: usize,
) -> FscResult<Vec<u8>> {
    let t = tab.len() as i64;
    let mut out = Vec::with_capacity(count);
    let mut pos: i64 = 0;
    let mut next_bits = log_tab_size as u32;
    for _ in 0..count {
        let r = reader.read_bits(next_bits)? as i64;
        pos += r;
        if pos < 0 || pos >= t {
            return Err(FscError::HeaderError("decoder state left the table bounds"));
        }
        let entry = &tab[pos as usize];
        out.push(entry.symbol);
        next_bits = entry.len as u32;
        pos += entry.next;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalization::normalize_counts;
    use crate::spreads::build_spread_table_bucket;

    fn roundtrip(data: &[u8], log_tab_size: usize) {
        let mut counts = [0usize; 256];
        for &b in data {
            counts[b as usize] += 1;
        }
        let max_symbol = counts.iter().rposition(|&c| c > 0).map(|i| i + 1).unwrap();
        let (norm, max_symbol) = normalize_counts(&counts[..max_symbol], max_symbol, log_tab_size).unwrap();
        let spread = build_spread_table_bucket(&norm, log_tab_size).unwrap();
        let (transforms, states) = build_encode_table(&norm, max_symbol, log_tab_size, &spread).unwrap();
        let decode_tab = build_decode_table(&norm, &spread, log_tab_size);

        let mut writer = BitWriter::new();
        encode_block(&mut writer, data, &transforms, &states, log_tab_size).unwrap();
        let bytes = writer.finish().unwrap();

        let mut reader = BitReader::new(&bytes);
        let decoded = decode_block(&mut reader, &decode_tab, log_tab_size, data.len()).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn roundtrip_skewed_distribution() {
        let data: Vec<u8> = (0..2000)
            .map(|i| if i % 5 == 0 { b'A' } else { b'B' })
            .collect();
        roundtrip(&data, 8);
    }

    #[test]
    fn roundtrip_uniform_alphabet() {
        let data: Vec<u8> = (0..4096).map(|i| (i % 17) as u8).collect();
        roundtrip(&data, 6);
    }

    #[test]
    fn roundtrip_single_byte() {
        roundtrip(&[42u8], 4);
    }

    #[test]
    fn log2_helpers_agree_on_powers_of_two() {
        for shift in 0..20u32 {
            let v = 1u64 << shift;
            assert_eq!(log2_floor(v), shift);
            assert_eq!(log2_ceil(v), shift);
        }
        assert_eq!(log2_floor(6), 2);
        assert_eq!(log2_ceil(6), 3);
    }
}
