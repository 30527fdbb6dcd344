//! MINGLE View - Read-time composition root
//!
//! Pure, side-effect-free read queries over the participation engine:
//! - Live-view aggregation (sampled counterparties per receive state)
//! - Best-effort name resolution for owner addresses
//! - Hook dispatch for the generic parameter-registry host

pub mod hooks;
pub mod names;
pub mod view;

pub use hooks::*;
pub use names::*;
pub use view::*;
