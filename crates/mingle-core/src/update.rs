//! Update call shapes accepted by the participation state machine
//!
//! A single configure call carries up to three optional update categories;
//! a call with none is rejected as "no updates requested".

use bytes::Bytes;

use crate::{ReceiveState, SendState, TokenNumber};

/// Send-state update: new state plus target list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendUpdate {
    pub state: SendState,
    /// Required non-empty for SendTo, required empty otherwise
    pub targets: Vec<TokenNumber>,
}

impl SendUpdate {
    pub fn neutral() -> Self {
        SendUpdate {
            state: SendState::Neutral,
            targets: Vec::new(),
        }
    }

    pub fn general() -> Self {
        SendUpdate {
            state: SendState::SendGeneral,
            targets: Vec::new(),
        }
    }

    pub fn to(targets: Vec<TokenNumber>) -> Self {
        SendUpdate {
            state: SendState::SendTo,
            targets,
        }
    }
}

/// Receive-state update: new state plus source list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiveUpdate {
    pub state: ReceiveState,
    /// Required non-empty for ReceiveFrom, required empty otherwise
    pub sources: Vec<TokenNumber>,
}

impl ReceiveUpdate {
    pub fn neutral() -> Self {
        ReceiveUpdate {
            state: ReceiveState::Neutral,
            sources: Vec::new(),
        }
    }

    pub fn general() -> Self {
        ReceiveUpdate {
            state: ReceiveState::ReceiveGeneral,
            sources: Vec::new(),
        }
    }

    pub fn from(sources: Vec<TokenNumber>) -> Self {
        ReceiveUpdate {
            state: ReceiveState::ReceiveFrom,
            sources,
        }
    }

    pub fn direct() -> Self {
        ReceiveUpdate {
            state: ReceiveState::ReceiveTo,
            sources: Vec::new(),
        }
    }
}

/// Metadata slot update
///
/// Writing `Some(Bytes::new())` clears a payload and still bumps its
/// version. An update that writes nothing and does not switch the active
/// slot is treated as no update at all.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataUpdate {
    pub slot: usize,
    pub image: Option<Bytes>,
    pub sound: Option<Bytes>,
    /// Switch the active slot to `slot` after writing
    pub make_active: bool,
}

impl MetadataUpdate {
    /// Does this update actually do anything?
    pub fn is_effective(&self) -> bool {
        self.image.is_some() || self.sound.is_some() || self.make_active
    }
}

/// One configure call: at least one category must be present
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenUpdate {
    pub send: Option<SendUpdate>,
    pub receive: Option<ReceiveUpdate>,
    pub metadata: Option<MetadataUpdate>,
}

impl TokenUpdate {
    pub fn new() -> Self {
        TokenUpdate::default()
    }

    pub fn with_send(mut self, send: SendUpdate) -> Self {
        self.send = Some(send);
        self
    }

    pub fn with_receive(mut self, receive: ReceiveUpdate) -> Self {
        self.receive = Some(receive);
        self
    }

    pub fn with_metadata(mut self, metadata: MetadataUpdate) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Does the call request any effective change?
    pub fn is_empty(&self) -> bool {
        self.send.is_none()
            && self.receive.is_none()
            && !self.metadata.as_ref().is_some_and(|m| m.is_effective())
    }
}
