//! Injectable randomness.
//!
//! Every probability draw and shuffle in the engine goes through
//! [`RandomSource`], so tests can substitute a scripted source without
//! touching the behavior code.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

pub trait RandomSource {
    /// Uniform draw in `[0, 1)`
    fn chance(&mut self) -> f64;

    /// Uniform index in `0..n`. `n` must be non-zero.
    fn below(&mut self, n: usize) -> usize;

    /// True with probability `p`
    fn roll(&mut self, p: f64) -> bool {
        self.chance() < p
    }

    /// Fisher-Yates shuffle driven by `below`
    fn shuffle<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        shuffle_with(self, items);
    }
}

/// Shuffle usable through a `dyn RandomSource`. `SliceRandom::shuffle`
/// needs a concrete `rand::Rng`, which `FixedRandom` and trait objects are not.
pub fn shuffle_with<R: RandomSource + ?Sized, T>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.below(i + 1);
        items.swap(i, j);
    }
}

impl RandomSource for ChaCha8Rng {
    fn chance(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn below(&mut self, n: usize) -> usize {
        self.gen_range(0..n)
    }
}

/// Scripted source: every draw returns the same value and every index is 0.
///
/// `FixedRandom(1.0)` never passes a probability check.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn chance(&mut self) -> f64 {
        self.0
    }

    fn below(&mut self, _n: usize) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_fixed_random_never_rolls_at_one() {
        let mut rng = FixedRandom(1.0);
        assert!(!rng.roll(0.99));
        assert!(!rng.roll(1.0));

        let mut rng = FixedRandom(0.0);
        assert!(rng.roll(0.01));
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut items = vec![1, 2, 3, 4, 5, 6];
        rng.shuffle(&mut items);

        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_chacha_draws_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..1000 {
            let c = rng.chance();
            assert!((0.0..1.0).contains(&c));
            assert!(rng.below(4) < 4);
        }
    }
}
