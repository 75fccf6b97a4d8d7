//! Filepath: src/key.rs
//!
//! External identifiers for entries in a [`SortitionTree`].
//!
//! A [`Key`] is a fixed-width 32-byte opaque value. The tree never interprets
//! it beyond equality and hashing. The all-zero key is reserved to mean
//! "no entry" and is rejected by [`SortitionTree::set`].
//!
//! [`SortitionTree`]: crate::SortitionTree
//! [`SortitionTree::set`]: crate::SortitionTree::set

use std::fmt as StdFmt;

/// Width of a [`Key`] in bytes.
pub const KEY_SIZE: usize = 32;

/// A 32-byte opaque entry identifier.
///
/// # Example
///
/// ```rust
/// use sortition::Key;
///
/// let key = Key::from(7u64);
/// assert_eq!(key.as_bytes()[31], 7);
/// assert!(!key.is_zero());
/// assert!(Key::ZERO.is_zero());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Key([u8; KEY_SIZE]);

impl Key {
    /// The reserved "no entry" identifier.
    pub const ZERO: Self = Self([0; KEY_SIZE]);

    /// Wrap raw bytes.
    #[must_use]
    #[inline]
    pub const fn new(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build a key from a short byte string, left-aligned and zero padded.
    ///
    /// Returns `None` if `bytes` is longer than [`KEY_SIZE`].
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() > KEY_SIZE {
            return None;
        }

        let mut out = [0u8; KEY_SIZE];
        out[..bytes.len()].copy_from_slice(bytes);
        Some(Self(out))
    }

    /// Raw bytes of the key.
    #[must_use]
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// `true` for the reserved all-zero key.
    #[must_use]
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl From<[u8; KEY_SIZE]> for Key {
    #[inline]
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }
}

/// Big-endian into the trailing 8 bytes, matching a `uint` widened to 32 bytes.
impl From<u64> for Key {
    fn from(value: u64) -> Self {
        let mut out = [0u8; KEY_SIZE];
        out[KEY_SIZE - 8..].copy_from_slice(&value.to_be_bytes());
        Self(out)
    }
}

impl StdFmt::LowerHex for Key {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }

        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }

        Ok(())
    }
}

impl StdFmt::Display for Key {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        write!(f, "{self:#x}")
    }
}

impl StdFmt::Debug for Key {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        write!(f, "Key({self:#x})")
    }
}
