//! Error types for the MINGLE engine

use thiserror::Error;

use crate::{Address, BlockNumber, TokenNumber};

/// Engine errors - every rejection leaves state untouched
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MingleError {
    // Input validation
    #[error("Token number out of range: {0}")]
    TokenOutOfRange(u32),

    #[error("Slot index out of range: {0}")]
    SlotOutOfRange(usize),

    #[error("Sample size {requested} exceeds receive rate {max}")]
    SampleSizeExceeded { requested: usize, max: usize },

    // Authorization
    #[error("Caller {caller} is not owner or delegate of token {token}")]
    Unauthorized { token: TokenNumber, caller: Address },

    // Preconditions
    #[error("Token {0} has no image at its active slot")]
    MissingActiveImage(TokenNumber),

    #[error("Active slot {0} has no image and none was supplied")]
    ActiveSlotNeedsImage(usize),

    #[error("No updates requested")]
    NoUpdatesRequested,

    // List shape
    #[error("SendTo requires a non-empty target list")]
    EmptyTargets,

    #[error("Target list length {count} exceeds maximum {max}")]
    TooManyTargets { count: usize, max: usize },

    #[error("Target list must be empty outside SendTo")]
    TargetsNotAllowed,

    #[error("ReceiveFrom requires a non-empty source list")]
    EmptySources,

    #[error("Source list length {count} exceeds maximum {max}")]
    TooManySources { count: usize, max: usize },

    #[error("Source list must be empty outside ReceiveFrom")]
    SourcesNotAllowed,

    // Historical-data unavailability
    #[error("Block {requested} is not finalized (latest: {latest})")]
    FutureBlock {
        requested: BlockNumber,
        latest: BlockNumber,
    },

    #[error("Block {requested} is outside the retention window (oldest: {oldest})")]
    BlockOutOfWindow {
        requested: BlockNumber,
        oldest: BlockNumber,
    },
}

/// Result type for MINGLE operations
pub type MingleResult<T> = Result<T, MingleError>;
