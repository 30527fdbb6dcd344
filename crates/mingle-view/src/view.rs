//! Live-view aggregation
//!
//! The top-level read query: given a querying token and a finalized block,
//! assemble its current participation state, up to two independently
//! capped lists of sampled counterparties, and aggregate pool counts.
//! The query is pure; evaluating it mutates nothing.

use bytes::Bytes;

use mingle_core::{
    Address, BlockNumber, MingleError, MingleResult, ReceiveState, SendState, TokenAuthority,
    TokenId, TokenNumber,
};
use mingle_sample::{check_receive_rate, derive_seed, sample_indices, BlockArchive, SampleDomain};
use mingle_state::MatchEngine;

use crate::NameResolver;

/// Read-query parameters
#[derive(Clone, Copy, Debug)]
pub struct ViewQuery {
    /// Finalized block anchoring the sample seeds
    pub block: BlockNumber,
    /// Per-list counterparty cap, at most [`mingle_core::MAX_RECEIVE_RATE`]
    pub max_receive: usize,
}

/// One matched counterparty with its exposed metadata
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Counterparty {
    pub token: TokenId,
    pub owner: Address,
    /// Best-effort resolved name; empty when resolution fails
    pub owner_name: String,
    pub image: Bytes,
    pub image_version: u64,
    pub sound: Bytes,
    pub sound_version: u64,
}

/// Aggregated live view for a querying token
#[derive(Clone, Debug)]
pub struct LiveView {
    pub token: TokenId,
    pub send_state: SendState,
    pub receive_state: ReceiveState,
    /// Sampled general-pool matches (empty outside ReceiveGeneral and
    /// the ReceiveFrom general branch)
    pub general_matches: Vec<Counterparty>,
    /// Matches sourced from the directed registry or the filtered source
    /// list, independently capped; the two lists may together exceed the
    /// per-list cap by design
    pub direct_matches: Vec<Counterparty>,
    pub send_general_count: usize,
    pub receive_general_count: usize,
    pub direct_sender_count: usize,
}

/// Assemble the live view for `token` anchored at `query.block`
pub fn live_view(
    engine: &MatchEngine,
    archive: &BlockArchive,
    authority: &dyn TokenAuthority,
    names: &dyn NameResolver,
    token: TokenNumber,
    query: ViewQuery,
) -> MingleResult<LiveView> {
    if !token.in_bounds() {
        return Err(MingleError::TokenOutOfRange(token.0));
    }
    check_receive_rate(query.max_receive)?;
    let block_hash = archive.hash_at(query.block)?;
    let token_id = TokenId::from_parts(engine.project(), token);
    let receive_state = engine.receive_state(token);

    let mut general = Vec::new();
    let mut direct = Vec::new();

    match receive_state {
        ReceiveState::Neutral => {}
        ReceiveState::ReceiveGeneral => {
            general = sample_pool(engine, authority, names, token_id, &block_hash, query.max_receive);
            direct = sample_direct(
                engine,
                authority,
                names,
                token,
                token_id,
                &block_hash,
                query.max_receive,
            );
        }
        ReceiveState::ReceiveTo => {
            // The general pool is ignored entirely, even when non-empty
            direct = sample_direct(
                engine,
                authority,
                names,
                token,
                token_id,
                &block_hash,
                query.max_receive,
            );
        }
        ReceiveState::ReceiveFrom => {
            let sources = engine
                .record(token)
                .map(|r| r.receive_sources.clone())
                .unwrap_or_default();

            // Sources broadcasting generally: sampled over the filtered list
            let broadcasting: Vec<TokenNumber> = dedup_in_order(&sources)
                .into_iter()
                .filter(|s| engine.send_state(*s) == SendState::SendGeneral)
                .filter(|s| engine.slots().has_active_image(*s))
                .collect();
            let seed = derive_seed(&block_hash, token_id, SampleDomain::ReceiveSources);
            general = sample_indices(seed, broadcasting.len() as u64, query.max_receive)
                .into_iter()
                .map(|i| broadcasting[i as usize])
                .map(|s| counterparty(engine, authority, names, s))
                .collect();

            // Sources targeting this token directly: list order, capped
            direct = dedup_in_order(&sources)
                .into_iter()
                .filter(|s| engine.targets().has_edge(token, *s))
                .filter(|s| engine.slots().has_active_image(*s))
                .take(query.max_receive)
                .map(|s| counterparty(engine, authority, names, s))
                .collect();
        }
    }

    Ok(LiveView {
        token: token_id,
        send_state: engine.send_state(token),
        receive_state,
        general_matches: general,
        direct_matches: direct,
        send_general_count: engine.send_general().len(),
        receive_general_count: engine.receive_general().len(),
        direct_sender_count: engine.targets().count(token),
    })
}

/// Sample the send-general pool
fn sample_pool(
    engine: &MatchEngine,
    authority: &dyn TokenAuthority,
    names: &dyn NameResolver,
    querying: TokenId,
    block_hash: &mingle_core::BlockHash,
    max: usize,
) -> Vec<Counterparty> {
    let pool = engine.send_general();
    let seed = derive_seed(block_hash, querying, SampleDomain::GeneralPool);
    sample_indices(seed, pool.len() as u64, max)
        .into_iter()
        .filter_map(|i| pool.get(i as usize))
        .map(|member| counterparty(engine, authority, names, member))
        .collect()
}

/// Sample the directed registry entry for the querying token
#[allow(clippy::too_many_arguments)]
fn sample_direct(
    engine: &MatchEngine,
    authority: &dyn TokenAuthority,
    names: &dyn NameResolver,
    token: TokenNumber,
    querying: TokenId,
    block_hash: &mingle_core::BlockHash,
    max: usize,
) -> Vec<Counterparty> {
    let seed = derive_seed(block_hash, querying, SampleDomain::DirectSenders);
    sample_indices(seed, engine.targets().count(token) as u64, max)
        .into_iter()
        .filter_map(|i| engine.targets().get(token, i as usize))
        .map(|member| counterparty(engine, authority, names, member))
        .collect()
}

/// First occurrence of each entry, preserving list order
fn dedup_in_order(list: &[TokenNumber]) -> Vec<TokenNumber> {
    let mut seen = std::collections::HashSet::new();
    list.iter().copied().filter(|t| seen.insert(*t)).collect()
}

fn counterparty(
    engine: &MatchEngine,
    authority: &dyn TokenAuthority,
    names: &dyn NameResolver,
    member: TokenNumber,
) -> Counterparty {
    let owner = authority.owner_of(member).unwrap_or(Address::ZERO);
    let (image, image_version) = engine.slots().active_image(member);
    let (sound, sound_version) = engine.slots().active_sound(member);
    Counterparty {
        token: TokenId::from_parts(engine.project(), member),
        owner,
        owner_name: names.resolve(owner),
        image,
        image_version,
        sound,
        sound_version,
    }
}
