//! Error type shared by every fallible operation in this crate.
//!
//! Implémentation de final-state-rs, tenter d'implémenter FSE en Rust.
//! Author: Adrien Zinger, avec l'inspiration du travail de Jarek Duda,
//!         Yann Collet, Charles Bloom et bien d'autres.

use thiserror::Error;

/// Every variant here is fatal to the call that produced it: there are no
/// partial results, and no retry or fallback is attempted between variants.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum FscError {
    #[error("failed to grow an internal buffer")]
    AllocationFailure,

    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("normalization error: {0}")]
    NormalizationError(&'static str),

    #[error("malformed header: {0}")]
    HeaderError(&'static str),

    #[error("bit reader ran past the end of the stream")]
    UnexpectedEof,

    #[error("encoder output buffer could not grow further")]
    OutputTooSmall,
}

pub type FscResult<T> = Result<T, FscError>;
