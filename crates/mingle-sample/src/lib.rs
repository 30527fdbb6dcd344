//! MINGLE Sample - Deterministic pseudorandom sampling
//!
//! Read-time queries sample counterparties without materializing the
//! population. This crate provides:
//! - A keyed Feistel permutation over `[0, n)` (storage-free, bijective)
//! - Seed derivation from finalized ledger checkpoints
//! - A block archive enforcing the retention window
//! - Bounded sampling entry points

pub mod archive;
pub mod feistel;
pub mod sample;
pub mod seed;

pub use archive::*;
pub use feistel::*;
pub use sample::*;
pub use seed::*;
