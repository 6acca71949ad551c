//! Runtime configuration threaded through encoder/decoder construction.
//!
//! Implémentation de final-state-rs, tenter d'implémenter FSE en Rust.
//! Author: Adrien Zinger, avec l'inspiration du travail de Jarek Duda,
//!         Yann Collet, Charles Bloom et bien d'autres.
//!
//! The original C library selects its spread-table builder through a
//! process-global function pointer (`BuildSpreadTable_ptr`). This crate
//! replaces that with an explicit value carried by `CoderConfig`, built
//! once per call and never mutated mid-call — see `DESIGN.md` for the
//! rationale.

use crate::error::{FscError, FscResult};
use crate::spreads;
use crate::LOG_TAB_SIZE;

/// Which of the three interchangeable table-slot assignment strategies to
/// use. Encoder and decoder of the same stream must agree on this out of
/// band; nothing in the wire format records which policy produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadPolicy {
    /// Stride-scheduling bucket construction. The interoperable default.
    Bucket,
    /// Bit-reversal of a running per-symbol position counter.
    BitReverse,
    /// Fixed-stride walk of `T/2 + T/8 + 1`, optionally XORed with a key.
    Modulo { crypto_key: Option<u32> },
}

impl Default for SpreadPolicy {
    fn default() -> Self {
        SpreadPolicy::Bucket
    }
}

/// Per-call configuration: the table precision and the spread policy.
/// Built once per `encode`/`decode` invocation; nothing here is mutated
/// after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoderConfig {
    log_tab_size: usize,
    spread_policy: SpreadPolicy,
}

impl Default for CoderConfig {
    fn default() -> Self {
        CoderConfig {
            log_tab_size: 12,
            spread_policy: SpreadPolicy::Bucket,
        }
    }
}

impl CoderConfig {
    pub fn new(log_tab_size: usize) -> FscResult<Self> {
        if log_tab_size < 1 || log_tab_size > LOG_TAB_SIZE {
            return Err(FscError::InvalidParameter("log_tab_size out of range"));
        }
        Ok(CoderConfig {
            log_tab_size,
            spread_policy: SpreadPolicy::Bucket,
        })
    }

    pub fn with_spread_policy(mut self, policy: SpreadPolicy) -> Self {
        self.spread_policy = policy;
        self
    }

    pub fn log_tab_size(&self) -> usize {
        self.log_tab_size
    }

    pub fn spread_policy(&self) -> SpreadPolicy {
        self.spread_policy
    }

    /// Build the spread table for `counts` (already normalized to sum to
    /// `T = 2^log_tab_size`) according to the configured policy.
    pub(crate) fn build_spread_table(&self, counts: &[usize]) -> FscResult<Vec<u8>> {
        match self.spread_policy {
            SpreadPolicy::Bucket => {
                spreads::build_spread_table_bucket(counts, self.log_tab_size)
            }
            SpreadPolicy::BitReverse => {
                Ok(spreads::bit_reverse_spread(counts, self.log_tab_size))
            }
            SpreadPolicy::Modulo { crypto_key } => {
                Ok(spreads::fse_spread(counts, self.log_tab_size, crypto_key))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_bucket_policy() {
        let cfg = CoderConfig::default();
        assert_eq!(cfg.spread_policy(), SpreadPolicy::Bucket);
    }

    #[test]
    fn new_rejects_out_of_range_log_tab_size() {
        assert!(CoderConfig::new(0).is_err());
        assert!(CoderConfig::new(LOG_TAB_SIZE + 1).is_err());
        assert!(CoderConfig::new(LOG_TAB_SIZE).is_ok());
    }

    #[test]
    fn with_spread_policy_overrides_default() {
        let cfg = CoderConfig::new(8).unwrap().with_spread_policy(SpreadPolicy::BitReverse);
        assert_eq!(cfg.spread_policy(), SpreadPolicy::BitReverse);
    }
}
