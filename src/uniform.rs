//! Filepath: src/uniform.rs
//!
//! Hash-derived uniform values and unbiased bounded picks.
//!
//! Seeds are hashed with Keccak-256 and read as big-endian 256-bit integers.
//! Integer seeds are first encoded as a 32-byte big-endian word, so
//! [`derive`] of an integer agrees with hashing its ABI-style encoding.
//!
//! [`pick`] removes modulo bias by rejecting candidates in the top
//! `2^256 mod max` values. Every retry hashes `seed ‖ attempt`, so a rejected
//! candidate is never re-drawn. [`pick_compatible`] keeps the single-hash
//! behavior of re-deriving from the bare seed; since that retry can never
//! produce a different candidate, it reports [`UniformError::BiasedTail`]
//! instead of looping.
//!
//! These values are deterministic. They are a uniform source for testing and
//! simulation, not an entropy source.

use std::fmt as StdFmt;

use primitive_types::U256;
use sha3::{Digest, Keccak256};

/// Errors from bounded picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformError {
    /// `max` was zero, so `[0, max)` is empty.
    ZeroBound,

    /// The single candidate fell in the rejected tail (`pick_compatible` only).
    BiasedTail,
}

impl StdFmt::Display for UniformError {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        match self {
            Self::ZeroBound => write!(f, "cannot pick from an empty range"),
            Self::BiasedTail => write!(f, "candidate landed in the biased tail"),
        }
    }
}

impl std::error::Error for UniformError {}

/// 32-byte big-endian encoding of a 256-bit word.
#[must_use]
pub fn encode_word(word: U256) -> [u8; 32] {
    let mut out = [0u8; 32];
    word.to_big_endian(&mut out);
    out
}

/// Keccak-256 of `seed`, as a big-endian integer.
#[must_use]
pub fn derive_bytes(seed: &[u8]) -> U256 {
    U256::from_big_endian(&Keccak256::digest(seed))
}

/// Keccak-256 of the 32-byte encoding of `seed`.
///
/// ```rust
/// use sortition::U256;
/// use sortition::uniform::derive;
///
/// assert_eq!(derive(U256::from(7u64)), derive(U256::from(7u64)));
/// assert_ne!(derive(U256::from(7u64)), derive(U256::from(8u64)));
/// ```
#[must_use]
pub fn derive(seed: U256) -> U256 {
    derive_bytes(&encode_word(seed))
}

/// Candidate for retry number `attempt`. Attempt 0 is [`derive`] itself.
fn candidate(seed: U256, attempt: u64) -> U256 {
    if attempt == 0 {
        return derive(seed);
    }

    let mut input = [0u8; 64];
    input[..32].copy_from_slice(&encode_word(seed));
    input[32..].copy_from_slice(&encode_word(U256::from(attempt)));
    derive_bytes(&input)
}

/// Largest exclusive bound below which candidates are accepted.
fn ceiling(max: U256) -> U256 {
    U256::MAX - (U256::MAX % max)
}

/// Unbiased integer in `[0, max)` derived from `seed`.
///
/// # Errors
///
/// [`UniformError::ZeroBound`] if `max` is zero.
///
/// ```rust
/// use sortition::U256;
/// use sortition::uniform::pick;
///
/// let max = U256::from(60u64);
/// let value = pick(U256::from(42u64), max).unwrap();
/// assert!(value < max);
/// ```
pub fn pick(seed: U256, max: U256) -> Result<U256, UniformError> {
    if max.is_zero() {
        return Err(UniformError::ZeroBound);
    }

    let ceiling = ceiling(max);
    let mut attempt: u64 = 0;
    loop {
        let value = candidate(seed, attempt);
        if value < ceiling {
            return Ok(value % max);
        }
        attempt = attempt.wrapping_add(1);
    }
}

/// Single-hash variant of [`pick`].
///
/// Agrees with [`pick`] whenever the first candidate is accepted, which is
/// all but roughly a `(2^256 mod max) / 2^256` fraction of seeds.
///
/// # Errors
///
/// [`UniformError::ZeroBound`] if `max` is zero, [`UniformError::BiasedTail`]
/// if the only candidate is rejected.
pub fn pick_compatible(seed: U256, max: U256) -> Result<U256, UniformError> {
    if max.is_zero() {
        return Err(UniformError::ZeroBound);
    }

    let value = derive(seed);
    if value < ceiling(max) {
        Ok(value % max)
    } else {
        Err(UniformError::BiasedTail)
    }
}
