//! MINGLE Test Harness - Scenario suite and randomized validation
//!
//! This crate provides:
//! - A wired-up world (engine + archive + authority + names) for
//!   end-to-end scenarios
//! - Randomized pool fuzzing against a reference model
//! - Criterion benchmarks for the permutation walk and pool mutation

pub mod harness;
pub mod pool_fuzzer;

mod scenarios;

pub use harness::*;
pub use pool_fuzzer::*;
