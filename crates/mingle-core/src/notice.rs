//! Change notices emitted by the participation state machine
//!
//! One notice per logical change. A single configure call may emit several,
//! but never one for a dimension that did not change.

use crate::{ReceiveState, SendState, TokenNumber};

/// A discrete, observable state change
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeNotice {
    /// Image payload written (including clears); carries the new version
    ImageUpdated {
        token: TokenNumber,
        slot: usize,
        version: u64,
    },
    /// Sound payload written (including clears); carries the new version
    SoundUpdated {
        token: TokenNumber,
        slot: usize,
        version: u64,
    },
    /// Active slot switched
    ActiveSlotChanged { token: TokenNumber, slot: usize },
    /// Send state transition with its resolved target list
    SendStateChanged {
        token: TokenNumber,
        state: SendState,
        targets: Vec<TokenNumber>,
    },
    /// Receive state transition with its resolved source list
    ReceiveStateChanged {
        token: TokenNumber,
        state: ReceiveState,
        sources: Vec<TokenNumber>,
    },
}

impl ChangeNotice {
    /// Token this notice concerns
    pub fn token(&self) -> TokenNumber {
        match self {
            ChangeNotice::ImageUpdated { token, .. }
            | ChangeNotice::SoundUpdated { token, .. }
            | ChangeNotice::ActiveSlotChanged { token, .. }
            | ChangeNotice::SendStateChanged { token, .. }
            | ChangeNotice::ReceiveStateChanged { token, .. } => *token,
        }
    }
}
