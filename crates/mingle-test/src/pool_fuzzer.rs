//! Pool fuzzer - randomized add/remove interleavings
//!
//! Drives a [`MemberPool`] with seeded random operations and checks it
//! against a plain `HashSet` reference model after every step: membership,
//! size, and dense indexability must always agree.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mingle_core::TokenNumber;
use mingle_state::MemberPool;

/// Fuzzer configuration
#[derive(Clone, Debug)]
pub struct PoolFuzzerConfig {
    /// Distinct token numbers drawn from
    pub member_range: u32,
    /// Operations to run
    pub op_count: usize,
    /// Probability of an add (vs. remove)
    pub add_prob: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for PoolFuzzerConfig {
    fn default() -> Self {
        PoolFuzzerConfig {
            member_range: 64,
            op_count: 2_000,
            add_prob: 0.55,
            seed: 42,
        }
    }
}

impl PoolFuzzerConfig {
    /// Quick run for unit tests
    pub fn light() -> Self {
        PoolFuzzerConfig {
            member_range: 16,
            op_count: 200,
            ..PoolFuzzerConfig::default()
        }
    }

    /// Thorough run
    pub fn heavy() -> Self {
        PoolFuzzerConfig {
            member_range: 512,
            op_count: 50_000,
            ..PoolFuzzerConfig::default()
        }
    }
}

/// Outcome counters for one fuzz run
#[derive(Debug, Default)]
pub struct PoolFuzzReport {
    pub adds: u64,
    pub removes: u64,
    pub noop_adds: u64,
    pub noop_removes: u64,
}

/// Run the fuzzer; panics on the first divergence from the model
pub fn fuzz_pool(config: PoolFuzzerConfig) -> PoolFuzzReport {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut pool = MemberPool::new();
    let mut model: HashSet<TokenNumber> = HashSet::new();
    let mut report = PoolFuzzReport::default();

    for step in 0..config.op_count {
        let token = TokenNumber::new(rng.gen_range(0..config.member_range));
        if rng.gen_bool(config.add_prob) {
            if model.insert(token) {
                report.adds += 1;
            } else {
                report.noop_adds += 1;
            }
            pool.add(token);
        } else {
            if model.remove(&token) {
                report.removes += 1;
            } else {
                report.noop_removes += 1;
            }
            pool.remove(token);
        }

        assert_eq!(pool.len(), model.len(), "size drift at step {step}");
        assert_eq!(
            pool.contains(token),
            model.contains(&token),
            "membership drift at step {step}"
        );

        // The packed list must stay dense and cover exactly the model
        let listed: HashSet<TokenNumber> = pool.iter().collect();
        assert_eq!(listed, model, "content drift at step {step}");
        for i in 0..pool.len() {
            assert!(pool.get(i).is_some(), "gap at index {i}, step {step}");
        }
        assert!(pool.get(pool.len()).is_none());
    }

    report
}
