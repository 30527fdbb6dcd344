//! MINGLE Core - Fundamental types and primitives
//!
//! This crate defines the core types used throughout the MINGLE engine:
//! - Identifiers (ProjectId, TokenNumber, TokenId, Address, BlockNumber)
//! - Participation states and records
//! - Change notices emitted by the state machine
//! - Authority trait and delegation registry
//! - Engine constants and error taxonomy

pub mod authority;
pub mod error;
pub mod id;
pub mod notice;
pub mod participation;
pub mod update;

pub use authority::*;
pub use error::*;
pub use id::*;
pub use notice::*;
pub use participation::*;
pub use update::*;

/// Upper bound on per-project token numbers; all mutating entry points
/// reject numbers at or above this before touching state.
pub const TOKEN_NUMBER_BOUND: u32 = 1 << 16;

/// Stride between projects in the global token id space.
pub const TOKEN_SPACE: u64 = 1_000_000;

/// Metadata slots per token.
pub const SLOT_COUNT: usize = 5;

/// Maximum entries in a SendTo target list.
pub const MAX_SEND_TARGETS: usize = 32;

/// Maximum entries in a ReceiveFrom source list.
pub const MAX_RECEIVE_SOURCES: usize = 32;

/// Maximum counterparties a single query may request per result list.
pub const MAX_RECEIVE_RATE: usize = 16;

/// Finalized block hashes retained for seed derivation.
pub const BLOCK_RETENTION: u64 = 256;
