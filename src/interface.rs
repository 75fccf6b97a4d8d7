//! The narrow surface orchestration layers consume.
//!
//! A raffle or juror-selection layer only ever needs to upsert weights, read
//! them back and draw. [`Sortition`] captures exactly that, so such a layer can
//! run against a bare [`SortitionTree`] in a single-threaded host or a
//! [`SharedTree`] when several threads feed it.
//!
//! [`SharedTree`]: crate::SharedTree

use primitive_types::U256;

use crate::key::Key;
use crate::tree::{SortitionError, SortitionTree};
use crate::uniform;

/// Weighted set with draws proportional to weight.
pub trait Sortition {
    /// Upsert `key` with `value`; zero removes.
    ///
    /// # Errors
    ///
    /// See [`SortitionTree::set`].
    fn set(&mut self, key: Key, value: U256) -> Result<(), SortitionError>;

    /// Key owning `selector` in `[0, total_weight())`.
    ///
    /// # Errors
    ///
    /// See [`SortitionTree::draw`].
    fn draw(&self, selector: U256) -> Result<Key, SortitionError>;

    /// Current weight of `key`, zero if absent.
    fn stake_of(&self, key: &Key) -> U256;

    /// Sum of all weights.
    fn total_weight(&self) -> U256;

    /// Draw with a selector derived from `seed` by [`uniform::pick`].
    ///
    /// [`SortitionTree::draw_seeded`] forwards here.
    ///
    /// # Errors
    ///
    /// [`SortitionError::EmptyTree`] if nothing has weight.
    fn draw_seeded(&self, seed: U256) -> Result<Key, SortitionError> {
        let total = self.total_weight();
        if total.is_zero() {
            return Err(SortitionError::EmptyTree);
        }
        self.draw(uniform::pick(seed, total)?)
    }
}

impl Sortition for SortitionTree {
    #[inline]
    fn set(&mut self, key: Key, value: U256) -> Result<(), SortitionError> {
        Self::set(self, key, value)
    }

    #[inline]
    fn draw(&self, selector: U256) -> Result<Key, SortitionError> {
        Self::draw(self, selector)
    }

    #[inline]
    fn stake_of(&self, key: &Key) -> U256 {
        Self::stake_of(self, key)
    }

    #[inline]
    fn total_weight(&self) -> U256 {
        Self::total_weight(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Draw `rounds` winners without replacement through the trait only.
    fn draw_winners<S: Sortition>(set: &mut S, rounds: u64) -> Vec<Key> {
        let mut winners = Vec::new();
        for seed in 0..rounds {
            let Ok(winner) = set.draw_seeded(U256::from(seed)) else {
                break;
            };
            set.set(winner, U256::zero()).unwrap();
            winners.push(winner);
        }
        winners
    }

    #[test]
    fn test_generic_consumer() {
        let mut tree = SortitionTree::with_branching(2).unwrap();
        for i in 1..=5u64 {
            Sortition::set(&mut tree, Key::from(i), U256::from(i)).unwrap();
        }
        assert_eq!(Sortition::total_weight(&tree), U256::from(15u64));

        let mut winners = draw_winners(&mut tree, 10);
        assert_eq!(winners.len(), 5);
        winners.sort();
        winners.dedup();
        assert_eq!(winners.len(), 5);
        assert_eq!(Sortition::total_weight(&tree), U256::zero());
    }

    #[test]
    fn test_seeded_draw_paths_agree() {
        let mut tree = SortitionTree::with_branching(3).unwrap();
        assert_eq!(
            Sortition::draw_seeded(&tree, U256::one()),
            Err(SortitionError::EmptyTree)
        );

        for i in 1..=12u64 {
            tree.set(Key::from(i), U256::from(i * i)).unwrap();
        }
        let total = tree.total_weight();
        for seed in 0..50u64 {
            let seed = U256::from(seed);
            let expected = tree.draw(uniform::pick(seed, total).unwrap()).unwrap();
            assert_eq!(tree.draw_seeded(seed).unwrap(), expected);
            assert_eq!(Sortition::draw_seeded(&tree, seed).unwrap(), expected);
        }
    }
}
