//! Packed membership pool with O(1) add and remove
//!
//! A dense member list plus a side map from member to its current list
//! index. Removal swaps the victim with the last entry and truncates, so
//! the list never has gaps. Ordering is not semantically meaningful and is
//! not stable across removals.

use std::collections::HashMap;

use mingle_core::TokenNumber;

/// Order-irrelevant membership pool
#[derive(Clone, Debug, Default)]
pub struct MemberPool {
    members: Vec<TokenNumber>,
    positions: HashMap<TokenNumber, usize>,
}

impl MemberPool {
    pub fn new() -> Self {
        MemberPool::default()
    }

    /// Add a member; no-op if already present
    pub fn add(&mut self, token: TokenNumber) {
        if self.positions.contains_key(&token) {
            return;
        }
        self.positions.insert(token, self.members.len());
        self.members.push(token);
    }

    /// Remove a member by swapping with the last entry; no-op if absent
    pub fn remove(&mut self, token: TokenNumber) {
        let Some(pos) = self.positions.remove(&token) else {
            return;
        };
        let last = self.members.len() - 1;
        self.members.swap_remove(pos);
        if pos != last {
            // The former tail now lives at `pos`
            self.positions.insert(self.members[pos], pos);
        }
    }

    #[inline]
    pub fn contains(&self, token: TokenNumber) -> bool {
        self.positions.contains_key(&token)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member at a pool position, if in range
    #[inline]
    pub fn get(&self, index: usize) -> Option<TokenNumber> {
        self.members.get(index).copied()
    }

    /// Current members in packing order
    #[inline]
    pub fn as_slice(&self) -> &[TokenNumber] {
        &self.members
    }

    pub fn iter(&self) -> impl Iterator<Item = TokenNumber> + '_ {
        self.members.iter().copied()
    }

    /// Internal consistency: every recorded position indexes its member
    #[cfg(test)]
    fn positions_consistent(&self) -> bool {
        self.positions.len() == self.members.len()
            && self
                .positions
                .iter()
                .all(|(token, &pos)| self.members.get(pos) == Some(token))
    }
}
