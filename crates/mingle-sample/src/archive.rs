//! Finalized block archive
//!
//! Seed material for read queries comes from finalized block hashes only,
//! and only within a fixed retention window. The archive is a ring of the
//! last [`BLOCK_RETENTION`] hashes; anything newer than the latest
//! finalized block or older than the window is unavailable and rejected.

use mingle_core::{BlockHash, BlockNumber, MingleError, MingleResult, BLOCK_RETENTION};

/// Ring of recently finalized block hashes
#[derive(Clone, Debug)]
pub struct BlockArchive {
    /// Latest finalized block number; 0 before any block finalizes
    latest: u64,
    ring: Vec<BlockHash>,
}

impl Default for BlockArchive {
    fn default() -> Self {
        BlockArchive {
            latest: 0,
            ring: vec![BlockHash::ZERO; BLOCK_RETENTION as usize],
        }
    }
}

impl BlockArchive {
    pub fn new() -> Self {
        BlockArchive::default()
    }

    /// Record the next finalized block hash, returning its number
    pub fn push(&mut self, hash: BlockHash) -> BlockNumber {
        self.latest += 1;
        let slot = (self.latest % BLOCK_RETENTION) as usize;
        self.ring[slot] = hash;
        BlockNumber(self.latest)
    }

    /// Latest finalized block number
    #[inline]
    pub fn latest(&self) -> BlockNumber {
        BlockNumber(self.latest)
    }

    /// Oldest block number still inside the retention window
    #[inline]
    pub fn oldest(&self) -> BlockNumber {
        BlockNumber(self.latest.saturating_sub(BLOCK_RETENTION - 1).max(1))
    }

    /// Hash of a finalized block inside the window
    pub fn hash_at(&self, block: BlockNumber) -> MingleResult<BlockHash> {
        if block.0 > self.latest {
            return Err(MingleError::FutureBlock {
                requested: block,
                latest: self.latest(),
            });
        }
        if block.0 < self.oldest().0 {
            return Err(MingleError::BlockOutOfWindow {
                requested: block,
                oldest: self.oldest(),
            });
        }
        Ok(self.ring[(block.0 % BLOCK_RETENTION) as usize])
    }
}
