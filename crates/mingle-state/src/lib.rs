//! MINGLE State - Participation engine and membership indexes
//!
//! This crate holds the mutable half of the engine:
//! - Swap-delete member pools (send-general and receive-general)
//! - Directed target registry (who sends to me directly)
//! - Versioned metadata slot store
//! - The participation state machine tying them together

pub mod engine;
pub mod pool;
pub mod registry;
pub mod slots;

pub use engine::*;
pub use pool::*;
pub use registry::*;
pub use slots::*;
