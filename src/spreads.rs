//! Ce fichier contient l'implémentation de multiple fonction de diffusion
//! utilisées pour la création d'une table de translation dans la version
//! de l'algorithme tANS, poussée par Yann Collet et Jarek Duda.
//!
//! Implémentation de final-state-rs, tenter d'implémenter FSE en Rust.
//! Author: Adrien Zinger, avec l'inspiration du travail de Jarek Duda,
//!         Yann Collet, Charles Bloom et bien d'autres.
//!
//! Three spread policies live here, selected by [`crate::config::SpreadPolicy`]:
//! bucket (the default), modulo-step, and bit-reverse. `counts` is taken as
//! `&[usize]` throughout, not `&[u8]`: a normalized count can reach `T`
//! itself, which for any reasonably sized table already overflows a byte.

use crate::error::{FscError, FscResult};
use std::collections::VecDeque;

/// Default spread: every symbol `s` with `count[s] > 0` is given a stride
/// `T / count[s]` and a floating due-key starting at half that stride. Keys
/// are floored into one of `T` buckets, each a FIFO of symbols due there.
/// Scanning buckets in order, each pop emits the symbol and reschedules it
/// at `key += stride`. Because every stride is `>= 1` (no symbol's count
/// exceeds `T`), a symbol's rescheduled key always lands at or past the
/// bucket it was just popped from, so no collision-retry loop is ever
/// needed (`MAX_INSERT_ITERATION` is effectively 0). Floating-point
/// truncation can leave the last few slots unfilled; those are patched by
/// repeating the last emitted symbol.
pub fn build_spread_table_bucket(counts: &[usize], table_log: usize) -> FscResult<Vec<u8>> {
    let t = 1usize << table_log;
    let total: usize = counts.iter().sum();
    if total != t {
        return Err(FscError::InvalidParameter(
            "spread table input must already be normalized to sum to T",
        ));
    }

    let mut stride = vec![0f64; counts.len()];
    let mut key = vec![0f64; counts.len()];
    let mut buckets: Vec<VecDeque<u8>> = vec![VecDeque::new(); t];
    for (s, &c) in counts.iter().enumerate() {
        if c == 0 {
            continue;
        }
        let step = t as f64 / c as f64;
        stride[s] = step;
        key[s] = 0.5 * step;
        let bucket = (key[s] as usize).min(t - 1);
        buckets[bucket].push_back(s as u8);
    }

    let mut out = Vec::with_capacity(t);
    for bucket_idx in 0..t {
        while let Some(s) = buckets[bucket_idx].pop_front() {
            out.push(s);
            let si = s as usize;
            key[si] += stride[si];
            let mut next_bucket = key[si] as usize;
            if next_bucket <= bucket_idx {
                next_bucket = bucket_idx + 1;
            }
            if next_bucket < t {
                buckets[next_bucket].push_back(s);
            }
        }
    }
    while out.len() < t {
        let last = *out.last().ok_or(FscError::NormalizationError(
            "spread table received no symbols",
        ))?;
        out.push(last);
    }
    Ok(out)
}

/// Implémentation original dans fse.c par Yann Collet: walk the table with
/// a fixed step of `T/2 + T/8 + 1`, wrapping modulo `T`. `crypto_key`, when
/// set, XORs every emitted position with the key before storing the symbol,
/// turning the table layout into a shared secret between encoder and
/// decoder rather than a publicly fixed permutation.
pub fn fse_spread(hist: &[usize], table_log: usize, crypto_key: Option<u32>) -> Vec<u8> {
    let m = 1 << table_log;
    let mut ret = vec![0u8; m];
    let mut pos = 0;
    let step = (1 << (table_log - 1)) + (1 << (table_log - 3)) + 1;
    let mask = (m - 1) as u32;
    let key = crypto_key.unwrap_or(0) & mask;
    for (i, &count) in hist.iter().enumerate().filter(|(_, count)| **count > 0) {
        for _ in 0..count {
            ret[(pos as u32 ^ key) as usize] = i as u8;
            pos = (pos + step) % m;
        }
    }
    ret
}

/// Proposition lu dans le blog de Charles Bloom à propos de tANS.
pub fn bit_reverse_spread(hist: &[usize], table_log: usize) -> Vec<u8> {
    let mut s = 0u32;
    let mut ret = vec![0u8; 1 << table_log];
    let t = u32::BITS - table_log as u32;
    for (i, &count) in hist.iter().enumerate().filter(|(_, count)| **count > 0) {
        for _ in 0..count {
            ret[(s.reverse_bits() >> t) as usize] = i as u8;
            s += 1;
        }
    }
    ret
}

// ****************************************************************************
// ****************************************************************************
// ****************************************************************************
// * Basic tests section

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fse_spread_test() {
        let mut hist = [0usize; 256];
        hist['A' as usize] = 7;
        hist['B' as usize] = 6;
        hist['C' as usize] = 3;
        let res = fse_spread(&hist, 4, None)
            .iter()
            .map(|c| char::from(*c))
            .collect::<Vec<char>>();
        let expect = vec![
            'A', 'A', 'A', 'B', 'B', 'C', 'A', 'A', 'B', 'B', 'C', 'A', 'A', 'B', 'B', 'C',
        ];
        assert_eq!(expect, res)
    }

    #[test]
    fn bitreverse_spread_test() {
        let mut hist = [0usize; 256];
        hist['A' as usize] = 7;
        hist['B' as usize] = 6;
        hist['C' as usize] = 3;
        let res = bit_reverse_spread(&hist, 4)
            .iter()
            .map(|c| char::from(*c))
            .collect::<Vec<char>>();
        let expect = vec![
            'A', 'B', 'A', 'B', 'A', 'B', 'A', 'C', 'A', 'B', 'A', 'C', 'A', 'B', 'B', 'C',
        ];
        assert_eq!(expect, res)
    }

    #[test]
    fn bucket_spread_places_every_symbol_exactly_count_times() {
        let mut hist = [0usize; 256];
        hist['A' as usize] = 7;
        hist['B' as usize] = 6;
        hist['C' as usize] = 3;
        let table = build_spread_table_bucket(&hist, 4).unwrap();
        assert_eq!(table.len(), 16);
        assert_eq!(table.iter().filter(|&&s| s == b'A').count(), 7);
        assert_eq!(table.iter().filter(|&&s| s == b'B').count(), 6);
        assert_eq!(table.iter().filter(|&&s| s == b'C').count(), 3);
    }

    #[test]
    fn bucket_spread_rejects_unnormalized_input() {
        let hist = [1usize, 1, 1];
        assert!(build_spread_table_bucket(&hist, 4).is_err());
    }

    #[test]
    fn crypto_key_changes_layout_but_not_multiset() {
        let mut hist = [0usize; 256];
        hist['A' as usize] = 7;
        hist['B' as usize] = 6;
        hist['C' as usize] = 3;
        let plain = fse_spread(&hist, 4, None);
        let keyed = fse_spread(&hist, 4, Some(0b1011));
        assert_ne!(plain, keyed);
        let mut a = plain.clone();
        let mut b = keyed.clone();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }
}
