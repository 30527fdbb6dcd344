//! Bounded deterministic sampling
//!
//! Walking the keyed permutation from index 0 visits pool positions in a
//! pseudorandom, duplicate-free order; the first `min(k, n)` positions are
//! the sample. Cost scales with `k`, not with the population size.

use mingle_core::{MingleError, MingleResult, MAX_RECEIVE_RATE};

use crate::FeistelPermutation;

/// First `min(k, n)` positions of the permutation walk over `[0, n)`
pub fn sample_indices(seed: [u8; 32], n: u64, k: usize) -> Vec<u64> {
    if n == 0 || k == 0 {
        return Vec::new();
    }
    let take = (k as u64).min(n);
    let perm = FeistelPermutation::new(seed, n);
    (0..take).map(|i| perm.permute(i)).collect()
}

/// Enforce the per-call receive-rate bound before any sampling happens
pub fn check_receive_rate(k: usize) -> MingleResult<()> {
    if k > MAX_RECEIVE_RATE {
        return Err(MingleError::SampleSizeExceeded {
            requested: k,
            max: MAX_RECEIVE_RATE,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(tag: u8) -> [u8; 32] {
        let mut s = [0u8; 32];
        s[0] = tag;
        s
    }

    #[test]
    fn test_zero_k_and_zero_n() {
        assert!(sample_indices(seed(1), 100, 0).is_empty());
        assert!(sample_indices(seed(1), 0, 10).is_empty());
    }

    #[test]
    fn test_sample_size_is_min_k_n() {
        for k in [1usize, 3, 5, 10, 50] {
            let out = sample_indices(seed(2), 5, k);
            assert_eq!(out.len(), k.min(5));
        }
    }

    #[test]
    fn test_sample_is_distinct_and_in_range() {
        let out = sample_indices(seed(3), 1000, 16);
        let mut dedup = out.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), out.len());
        assert!(out.iter().all(|&i| i < 1000));
    }

    #[test]
    fn test_k_at_least_n_is_exhaustive() {
        let mut out = sample_indices(seed(4), 5, 10);
        out.sort_unstable();
        assert_eq!(out, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_determinism() {
        assert_eq!(sample_indices(seed(5), 500, 8), sample_indices(seed(5), 500, 8));
    }

    #[test]
    fn test_seed_variation() {
        assert_ne!(sample_indices(seed(6), 500, 8), sample_indices(seed(7), 500, 8));
    }

    #[test]
    fn test_receive_rate_bound() {
        let err = check_receive_rate(MAX_RECEIVE_RATE + 1).unwrap_err();
        assert_eq!(
            err,
            MingleError::SampleSizeExceeded {
                requested: MAX_RECEIVE_RATE + 1,
                max: MAX_RECEIVE_RATE,
            }
        );
        assert!(check_receive_rate(MAX_RECEIVE_RATE).is_ok());
        assert!(check_receive_rate(0).is_ok());
    }

    #[test]
    fn test_prefix_property() {
        // A larger sample from the same seed extends the smaller one
        let small = sample_indices(seed(9), 100, 4);
        let large = sample_indices(seed(9), 100, 8);
        assert_eq!(&large[..4], &small[..]);
    }
}
