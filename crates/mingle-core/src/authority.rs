//! Ownership and delegation
//!
//! The state machine never decides authorization itself; it consults a
//! [`TokenAuthority`] collaborator before any mutation. The in-memory
//! [`DelegationRegistry`] is the reference implementation: per-token owners,
//! per-token and per-project delegation grants scoped by rights, and
//! revocation that takes effect immediately.

use std::collections::{HashMap, HashSet};

use crate::{Address, TokenNumber};

/// Authorization collaborator consulted before every mutating call
pub trait TokenAuthority {
    /// Is the caller the owner, or a currently valid delegate whose grant
    /// covers the requested scope?
    fn is_authorized(&self, token: TokenNumber, caller: Address, requested: DelegationRights) -> bool;

    /// Current owner of the token, if any
    fn owner_of(&self, token: TokenNumber) -> Option<Address>;
}

/// What a delegation grant covers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DelegationRights {
    /// Everything the owner can do
    Full,
    /// Send/receive state changes only
    Participation,
    /// Metadata slot writes only
    Metadata,
}

impl DelegationRights {
    /// Does a grant with these rights cover a requested operation?
    pub fn covers(self, requested: DelegationRights) -> bool {
        self == DelegationRights::Full || self == requested
    }
}

/// In-memory ownership and delegation registry
#[derive(Debug, Default)]
pub struct DelegationRegistry {
    owners: HashMap<TokenNumber, Address>,
    /// Grants scoped to a single token
    token_grants: HashMap<(TokenNumber, Address), DelegationRights>,
    /// Grants covering every token in the collection
    collection_grants: HashMap<Address, DelegationRights>,
    /// Revocations defeat both grant kinds until re-granted
    revoked: HashSet<Address>,
}

impl DelegationRegistry {
    pub fn new() -> Self {
        DelegationRegistry::default()
    }

    /// Set or replace a token's owner
    pub fn set_owner(&mut self, token: TokenNumber, owner: Address) {
        self.owners.insert(token, owner);
    }

    /// Grant delegation for a single token
    pub fn grant_token(&mut self, token: TokenNumber, delegate: Address, rights: DelegationRights) {
        self.token_grants.insert((token, delegate), rights);
        self.revoked.remove(&delegate);
    }

    /// Grant delegation across the whole collection
    pub fn grant_collection(&mut self, delegate: Address, rights: DelegationRights) {
        self.collection_grants.insert(delegate, rights);
        self.revoked.remove(&delegate);
    }

    /// Revoke a delegate everywhere, effective immediately
    pub fn revoke(&mut self, delegate: Address) {
        self.revoked.insert(delegate);
    }

    /// Check authorization for a specific operation scope
    pub fn is_authorized_for(
        &self,
        token: TokenNumber,
        caller: Address,
        requested: DelegationRights,
    ) -> bool {
        if self.owners.get(&token) == Some(&caller) {
            return true;
        }
        if self.revoked.contains(&caller) {
            return false;
        }
        if let Some(rights) = self.token_grants.get(&(token, caller)) {
            if rights.covers(requested) {
                return true;
            }
        }
        if let Some(rights) = self.collection_grants.get(&caller) {
            return rights.covers(requested);
        }
        false
    }
}

impl TokenAuthority for DelegationRegistry {
    fn is_authorized(&self, token: TokenNumber, caller: Address, requested: DelegationRights) -> bool {
        self.is_authorized_for(token, caller, requested)
    }

    fn owner_of(&self, token: TokenNumber) -> Option<Address> {
        self.owners.get(&token).copied()
    }
}
