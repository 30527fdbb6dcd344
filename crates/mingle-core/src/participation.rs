//! Participation states and per-token records
//!
//! A token declares how it broadcasts (send state) and how it accepts
//! (receive state). Target and source lists are only meaningful in the
//! states that use them and are cleared atomically with any transition
//! away from those states.

use crate::TokenNumber;

/// How a token broadcasts to counterparties
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum SendState {
    /// Not broadcasting
    #[default]
    Neutral = 0x00,
    /// Broadcasting to anyone in the general pool
    SendGeneral = 0x01,
    /// Broadcasting to an explicit target list
    SendTo = 0x02,
}

impl SendState {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x00 => Some(SendState::Neutral),
            0x01 => Some(SendState::SendGeneral),
            0x02 => Some(SendState::SendTo),
            _ => None,
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// String form exposed through the augmentation hook
    pub fn as_str(self) -> &'static str {
        match self {
            SendState::Neutral => "neutral",
            SendState::SendGeneral => "sendGeneral",
            SendState::SendTo => "sendTo",
        }
    }

    /// Does this state carry a target list?
    #[inline]
    pub fn carries_targets(self) -> bool {
        self == SendState::SendTo
    }
}

impl std::fmt::Display for SendState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a token accepts counterparties
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ReceiveState {
    /// Not accepting
    #[default]
    Neutral = 0x00,
    /// Accepting anyone from the general pool
    ReceiveGeneral = 0x01,
    /// Accepting only an explicit source list
    ReceiveFrom = 0x02,
    /// Accepting whoever targets this token directly
    ReceiveTo = 0x03,
}

impl ReceiveState {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x00 => Some(ReceiveState::Neutral),
            0x01 => Some(ReceiveState::ReceiveGeneral),
            0x02 => Some(ReceiveState::ReceiveFrom),
            0x03 => Some(ReceiveState::ReceiveTo),
            _ => None,
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// String form exposed through the augmentation hook
    pub fn as_str(self) -> &'static str {
        match self {
            ReceiveState::Neutral => "neutral",
            ReceiveState::ReceiveGeneral => "receiveGeneral",
            ReceiveState::ReceiveFrom => "receiveFrom",
            ReceiveState::ReceiveTo => "receiveTo",
        }
    }

    /// Does this state carry a source list?
    #[inline]
    pub fn carries_sources(self) -> bool {
        self == ReceiveState::ReceiveFrom
    }
}

impl std::fmt::Display for ReceiveState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-token participation record
///
/// Invariants: `send_targets` is empty unless `send_state == SendTo`;
/// `receive_sources` is empty unless `receive_state == ReceiveFrom`.
/// The record keeps duplicate target entries exactly as supplied; the
/// directed registry de-duplicates membership on its own.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParticipationRecord {
    pub send_state: SendState,
    pub receive_state: ReceiveState,
    pub send_targets: Vec<TokenNumber>,
    pub receive_sources: Vec<TokenNumber>,
}

impl ParticipationRecord {
    pub fn new() -> Self {
        ParticipationRecord::default()
    }

    /// Is this token participating in any non-Neutral capacity?
    #[inline]
    pub fn is_participating(&self) -> bool {
        self.send_state != SendState::Neutral || self.receive_state != ReceiveState::Neutral
    }
}
