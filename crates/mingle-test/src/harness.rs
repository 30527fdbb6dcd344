//! End-to-end test world
//!
//! Wires a participation engine, block archive, delegation registry, and
//! name directory together and exposes the shortcuts scenarios need:
//! minting image payloads, driving tokens into states, and running live
//! views against the latest checkpoint.

use bytes::Bytes;

use mingle_core::{
    Address, BlockHash, BlockNumber, ChangeNotice, DelegationRegistry, MetadataUpdate,
    MingleResult, ProjectId, ReceiveUpdate, SendUpdate, TokenAuthority, TokenNumber, TokenUpdate,
};
use mingle_sample::BlockArchive;
use mingle_state::MatchEngine;
use mingle_view::{live_view, LiveView, NameDirectory, ViewQuery};

/// A fully wired engine world for scenarios
pub struct TestWorld {
    pub engine: MatchEngine,
    pub archive: BlockArchive,
    pub authority: DelegationRegistry,
    pub names: NameDirectory,
}

impl TestWorld {
    /// World with one finalized block and owners assigned for the first
    /// `token_count` tokens (owner address = 1000 + token number)
    pub fn new(token_count: u32) -> Self {
        let mut archive = BlockArchive::new();
        archive.push(TestWorld::block_hash(1));

        let mut authority = DelegationRegistry::new();
        for n in 0..token_count {
            authority.set_owner(TokenNumber::new(n), Address::new(1000 + n as u64));
        }

        TestWorld {
            engine: MatchEngine::new(ProjectId::new(1)),
            archive,
            authority,
            names: NameDirectory::new(),
        }
    }

    /// Deterministic block hash for test checkpoints
    pub fn block_hash(tag: u8) -> BlockHash {
        let mut h = [0u8; 32];
        h[0] = tag;
        BlockHash(h)
    }

    /// Finalize another block and return its number
    pub fn advance_block(&mut self, tag: u8) -> BlockNumber {
        self.archive.push(TestWorld::block_hash(tag))
    }

    pub fn owner(&self, token: TokenNumber) -> Address {
        self.authority
            .owner_of(token)
            .unwrap_or(Address::ZERO)
    }

    /// Write a minimal image payload into slot 0
    pub fn mint_image(&mut self, token: TokenNumber) {
        self.configure(
            token,
            TokenUpdate::new().with_metadata(MetadataUpdate {
                slot: 0,
                image: Some(Bytes::from_static(b"img")),
                sound: None,
                make_active: false,
            }),
        )
        .expect("image mint");
    }

    /// Configure as the token's owner
    pub fn configure(
        &mut self,
        token: TokenNumber,
        update: TokenUpdate,
    ) -> MingleResult<Vec<ChangeNotice>> {
        let caller = self.owner(token);
        self.engine.configure(token, caller, update, &self.authority)
    }

    /// Image mint plus a send-state transition in one shortcut
    pub fn broadcast_general(&mut self, token: TokenNumber) {
        self.mint_image(token);
        self.configure(token, TokenUpdate::new().with_send(SendUpdate::general()))
            .expect("send general");
    }

    /// Image mint plus SendTo targets
    pub fn broadcast_to(&mut self, token: TokenNumber, targets: Vec<TokenNumber>) {
        self.mint_image(token);
        self.configure(token, TokenUpdate::new().with_send(SendUpdate::to(targets)))
            .expect("send to");
    }

    /// Image mint plus a receive-state transition
    pub fn accept(&mut self, token: TokenNumber, receive: ReceiveUpdate) {
        self.mint_image(token);
        self.configure(token, TokenUpdate::new().with_receive(receive))
            .expect("receive update");
    }

    /// Live view anchored at the latest finalized block
    pub fn query(&self, token: TokenNumber, max_receive: usize) -> MingleResult<LiveView> {
        self.query_at(token, self.archive.latest(), max_receive)
    }

    /// Live view anchored at a specific block
    pub fn query_at(
        &self,
        token: TokenNumber,
        block: BlockNumber,
        max_receive: usize,
    ) -> MingleResult<LiveView> {
        live_view(
            &self.engine,
            &self.archive,
            &self.authority,
            &self.names,
            token,
            ViewQuery { block, max_receive },
        )
    }
}
