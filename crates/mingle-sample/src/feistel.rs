//! Keyed Feistel permutation over an arbitrary index space
//!
//! A balanced Feistel network over the smallest even-bit domain covering
//! `[0, n)`, with a SHA-256 round function keyed by the seed and round
//! number. Outputs that land outside `[0, n)` are walked through the
//! network again (cycle-walking), which keeps the restriction to `[0, n)`
//! a bijection for any `n` and any seed. The image of an index is computed
//! directly; no shuffled array is ever materialized.

use sha2::{Digest, Sha256};

/// Feistel rounds per pass
pub const FEISTEL_ROUNDS: u32 = 4;

/// Keyed bijection on `[0, n)`
#[derive(Clone, Debug)]
pub struct FeistelPermutation {
    seed: [u8; 32],
    n: u64,
    half_bits: u32,
    half_mask: u64,
}

impl FeistelPermutation {
    /// Build a permutation of `[0, n)` keyed by `seed`
    pub fn new(seed: [u8; 32], n: u64) -> Self {
        // Smallest balanced domain 4^b >= n
        let bits = match n {
            0 | 1 => 1,
            _ => 64 - (n - 1).leading_zeros(),
        };
        let half_bits = bits.div_ceil(2).max(1);
        FeistelPermutation {
            seed,
            n,
            half_bits,
            half_mask: (1u64 << half_bits) - 1,
        }
    }

    /// Domain size of this permutation
    #[inline]
    pub fn len(&self) -> u64 {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Image of `i` under the permutation; `i` must be below `n`
    pub fn permute(&self, i: u64) -> u64 {
        debug_assert!(i < self.n, "index {i} outside domain {}", self.n);
        let mut x = self.pass(i);
        // Cycle-walk back into range; terminates because the pass is a
        // bijection on the covering domain, so every cycle through an
        // out-of-range value re-enters [0, n)
        while x >= self.n {
            x = self.pass(x);
        }
        x
    }

    /// One full Feistel pass over the covering domain
    fn pass(&self, i: u64) -> u64 {
        let mut left = i >> self.half_bits;
        let mut right = i & self.half_mask;
        for round in 0..FEISTEL_ROUNDS {
            let mixed = left ^ self.round_key(round, right);
            left = right;
            right = mixed;
        }
        (left << self.half_bits) | right
    }

    /// Keyed round function, truncated to the half width
    fn round_key(&self, round: u32, half: u64) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(self.seed);
        hasher.update(round.to_le_bytes());
        hasher.update(half.to_le_bytes());
        let digest = hasher.finalize();
        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(word) & self.half_mask
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn seed(tag: u8) -> [u8; 32] {
        let mut s = [0u8; 32];
        s[0] = tag;
        s
    }

    fn image(perm: &FeistelPermutation) -> Vec<u64> {
        (0..perm.len()).map(|i| perm.permute(i)).collect()
    }

    #[test]
    fn test_bijection_small_domains() {
        for n in 1..=64u64 {
            let perm = FeistelPermutation::new(seed(1), n);
            let mut out = image(&perm);
            out.sort_unstable();
            let expected: Vec<u64> = (0..n).collect();
            assert_eq!(out, expected, "not a bijection for n={n}");
        }
    }

    #[test]
    fn test_bijection_non_power_of_two() {
        for n in [3u64, 5, 7, 100, 1000, 4097] {
            let perm = FeistelPermutation::new(seed(9), n);
            let mut out = image(&perm);
            out.sort_unstable();
            assert_eq!(out, (0..n).collect::<Vec<u64>>());
        }
    }

    #[test]
    fn test_deterministic() {
        let a = FeistelPermutation::new(seed(3), 1000);
        let b = FeistelPermutation::new(seed(3), 1000);
        assert_eq!(image(&a), image(&b));
    }

    #[test]
    fn test_seed_changes_permutation() {
        let a = FeistelPermutation::new(seed(1), 1000);
        let b = FeistelPermutation::new(seed(2), 1000);
        assert_ne!(image(&a), image(&b));
    }

    #[test]
    fn test_identity_domain() {
        let perm = FeistelPermutation::new(seed(4), 1);
        assert_eq!(perm.permute(0), 0);
    }

    proptest! {
        #[test]
        fn prop_bijective(n in 1u64..2048, tag in 0u8..255) {
            let perm = FeistelPermutation::new(seed(tag), n);
            let mut out: Vec<u64> = (0..n).map(|i| perm.permute(i)).collect();
            out.sort_unstable();
            prop_assert_eq!(out, (0..n).collect::<Vec<u64>>());
        }

        #[test]
        fn prop_in_range(n in 1u64..10_000, i in 0u64..10_000, tag in 0u8..255) {
            prop_assume!(i < n);
            let perm = FeistelPermutation::new(seed(tag), n);
            prop_assert!(perm.permute(i) < n);
        }
    }
}
