//! Directed target registry
//!
//! Reverse index from a target token to the de-duplicated set of tokens
//! currently naming it in their SendTo lists. The state machine keeps a
//! sender's own list and this registry in lockstep; the registry itself
//! only de-duplicates and never inspects sender records.

use std::collections::HashMap;

use mingle_core::TokenNumber;

use crate::MemberPool;

/// Target → senders reverse index
#[derive(Clone, Debug, Default)]
pub struct TargetRegistry {
    senders: HashMap<TokenNumber, MemberPool>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        TargetRegistry::default()
    }

    /// Record that `source` targets `target`; no-op if already recorded
    pub fn add_edge(&mut self, target: TokenNumber, source: TokenNumber) {
        self.senders.entry(target).or_default().add(source);
    }

    /// Forget that `source` targets `target`; no-op if not recorded
    pub fn remove_edge(&mut self, target: TokenNumber, source: TokenNumber) {
        if let Some(pool) = self.senders.get_mut(&target) {
            pool.remove(source);
        }
    }

    /// Does the registry record `source` → `target`?
    pub fn has_edge(&self, target: TokenNumber, source: TokenNumber) -> bool {
        self.senders
            .get(&target)
            .is_some_and(|pool| pool.contains(source))
    }

    /// Senders currently targeting `target`, in packing order
    pub fn sources(&self, target: TokenNumber) -> &[TokenNumber] {
        self.senders
            .get(&target)
            .map(|pool| pool.as_slice())
            .unwrap_or(&[])
    }

    /// Number of distinct senders targeting `target`
    pub fn count(&self, target: TokenNumber) -> usize {
        self.senders.get(&target).map_or(0, |pool| pool.len())
    }

    /// Sender at a packing position within a target's entry
    pub fn get(&self, target: TokenNumber, index: usize) -> Option<TokenNumber> {
        self.senders.get(&target).and_then(|pool| pool.get(index))
    }
}
