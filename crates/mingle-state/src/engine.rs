//! Participation state machine
//!
//! One entry point, [`MatchEngine::configure`], accepts optional send,
//! receive, and metadata updates for a token. Every check runs before any
//! mutation, so a rejected call leaves no partial state. Applied changes
//! are reported as discrete [`ChangeNotice`]s, one per dimension that
//! actually changed.

use std::collections::HashMap;

use mingle_core::{
    Address, ChangeNotice, DelegationRights, MingleError, MingleResult, ParticipationRecord,
    ProjectId, ReceiveState, SendState, TokenAuthority, TokenNumber, TokenUpdate,
    MAX_RECEIVE_SOURCES, MAX_SEND_TARGETS, SLOT_COUNT,
};

use crate::{MemberPool, SlotStore, TargetRegistry};

/// Per-project participation engine
///
/// Owns the participation records, both general pools, the directed target
/// registry, and the metadata slot store. Mutations are serialized by the
/// host ledger; the engine itself is single-threaded and synchronous.
#[derive(Debug, Default)]
pub struct MatchEngine {
    project: ProjectId,
    records: HashMap<TokenNumber, ParticipationRecord>,
    send_general: MemberPool,
    receive_general: MemberPool,
    targets: TargetRegistry,
    slots: SlotStore,
}

impl MatchEngine {
    pub fn new(project: ProjectId) -> Self {
        MatchEngine {
            project,
            ..MatchEngine::default()
        }
    }

    #[inline]
    pub fn project(&self) -> ProjectId {
        self.project
    }

    /// Participation record for a token, if it was ever configured
    pub fn record(&self, token: TokenNumber) -> Option<&ParticipationRecord> {
        self.records.get(&token)
    }

    /// Current send state (Neutral for never-configured tokens)
    pub fn send_state(&self, token: TokenNumber) -> SendState {
        self.records.get(&token).map_or(SendState::Neutral, |r| r.send_state)
    }

    /// Current receive state (Neutral for never-configured tokens)
    pub fn receive_state(&self, token: TokenNumber) -> ReceiveState {
        self.records
            .get(&token)
            .map_or(ReceiveState::Neutral, |r| r.receive_state)
    }

    #[inline]
    pub fn send_general(&self) -> &MemberPool {
        &self.send_general
    }

    #[inline]
    pub fn receive_general(&self) -> &MemberPool {
        &self.receive_general
    }

    #[inline]
    pub fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    #[inline]
    pub fn slots(&self) -> &SlotStore {
        &self.slots
    }

    /// Apply a configure call for a token
    ///
    /// Validation order: token bound, "no updates", authorization, metadata
    /// slot rules, list shapes, participation precondition. Only after every
    /// check passes does any state move.
    pub fn configure(
        &mut self,
        token: TokenNumber,
        caller: Address,
        update: TokenUpdate,
        authority: &dyn TokenAuthority,
    ) -> MingleResult<Vec<ChangeNotice>> {
        if !token.in_bounds() {
            return Err(MingleError::TokenOutOfRange(token.0));
        }
        if update.is_empty() {
            return Err(MingleError::NoUpdatesRequested);
        }

        // Each update category demands the matching delegation scope; a
        // mixed call needs both. Owners and Full grants cover either.
        let wants_participation = update.send.is_some() || update.receive.is_some();
        let wants_metadata = update.metadata.as_ref().is_some_and(|m| m.is_effective());
        if wants_participation
            && !authority.is_authorized(token, caller, DelegationRights::Participation)
        {
            return Err(MingleError::Unauthorized { token, caller });
        }
        if wants_metadata && !authority.is_authorized(token, caller, DelegationRights::Metadata) {
            return Err(MingleError::Unauthorized { token, caller });
        }

        let active_has_image_after = self.validate_metadata(token, &update)?;
        self.validate_lists(&update)?;
        self.validate_precondition(token, &update, active_has_image_after)?;

        let mut notices = Vec::new();
        self.apply_metadata(token, &update, &mut notices);
        self.apply_send(token, &update, &mut notices);
        self.apply_receive(token, &update, &mut notices);

        tracing::debug!(%token, changes = notices.len(), "configure applied");
        Ok(notices)
    }

    /// Check slot bounds and the active-switch rule; returns whether the
    /// active slot will hold image data once the metadata update lands.
    fn validate_metadata(&self, token: TokenNumber, update: &TokenUpdate) -> MingleResult<bool> {
        let Some(md) = update.metadata.as_ref().filter(|m| m.is_effective()) else {
            return Ok(self.slots.has_active_image(token));
        };
        if md.slot >= SLOT_COUNT {
            return Err(MingleError::SlotOutOfRange(md.slot));
        }

        // Image at a slot as it will be after this call
        let image_after = |slot: usize| -> bool {
            if slot == md.slot {
                if let Some(image) = &md.image {
                    return !image.is_empty();
                }
            }
            !self.slots.image_at(token, slot).0.is_empty()
        };

        if md.make_active && !image_after(md.slot) {
            return Err(MingleError::ActiveSlotNeedsImage(md.slot));
        }

        let active_after = if md.make_active {
            md.slot
        } else {
            self.slots.active_slot(token)
        };
        Ok(image_after(active_after))
    }

    /// Enforce the list/state coupling rules for both dimensions
    fn validate_lists(&self, update: &TokenUpdate) -> MingleResult<()> {
        if let Some(send) = &update.send {
            if send.state == SendState::SendTo {
                if send.targets.is_empty() {
                    return Err(MingleError::EmptyTargets);
                }
                if send.targets.len() > MAX_SEND_TARGETS {
                    return Err(MingleError::TooManyTargets {
                        count: send.targets.len(),
                        max: MAX_SEND_TARGETS,
                    });
                }
                if let Some(bad) = send.targets.iter().find(|t| !t.in_bounds()) {
                    return Err(MingleError::TokenOutOfRange(bad.0));
                }
            } else if !send.targets.is_empty() {
                return Err(MingleError::TargetsNotAllowed);
            }
        }

        if let Some(receive) = &update.receive {
            if receive.state == ReceiveState::ReceiveFrom {
                if receive.sources.is_empty() {
                    return Err(MingleError::EmptySources);
                }
                if receive.sources.len() > MAX_RECEIVE_SOURCES {
                    return Err(MingleError::TooManySources {
                        count: receive.sources.len(),
                        max: MAX_RECEIVE_SOURCES,
                    });
                }
                if let Some(bad) = receive.sources.iter().find(|s| !s.in_bounds()) {
                    return Err(MingleError::TokenOutOfRange(bad.0));
                }
            } else if !receive.sources.is_empty() {
                return Err(MingleError::SourcesNotAllowed);
            }
        }

        Ok(())
    }

    /// Entering any non-Neutral state requires image data at the active
    /// slot as of this call. Checked only for the dimensions this call
    /// updates; existing participation is never re-checked retroactively.
    fn validate_precondition(
        &self,
        token: TokenNumber,
        update: &TokenUpdate,
        active_has_image_after: bool,
    ) -> MingleResult<()> {
        let entering_send = update
            .send
            .as_ref()
            .is_some_and(|s| s.state != SendState::Neutral);
        let entering_receive = update
            .receive
            .as_ref()
            .is_some_and(|r| r.state != ReceiveState::Neutral);

        if (entering_send || entering_receive) && !active_has_image_after {
            return Err(MingleError::MissingActiveImage(token));
        }
        Ok(())
    }

    fn apply_metadata(&mut self, token: TokenNumber, update: &TokenUpdate, notices: &mut Vec<ChangeNotice>) {
        let Some(md) = update.metadata.as_ref().filter(|m| m.is_effective()) else {
            return;
        };

        if let Some(image) = &md.image {
            // Validated above; the store cannot reject here
            let version = self
                .slots
                .write_image(token, md.slot, image.clone())
                .unwrap_or_default();
            notices.push(ChangeNotice::ImageUpdated {
                token,
                slot: md.slot,
                version,
            });
        }
        if let Some(sound) = &md.sound {
            let version = self
                .slots
                .write_sound(token, md.slot, sound.clone())
                .unwrap_or_default();
            notices.push(ChangeNotice::SoundUpdated {
                token,
                slot: md.slot,
                version,
            });
        }
        if md.make_active && self.slots.active_slot(token) != md.slot {
            let _ = self.slots.set_active(token, md.slot);
            notices.push(ChangeNotice::ActiveSlotChanged {
                token,
                slot: md.slot,
            });
        }
    }

    fn apply_send(&mut self, token: TokenNumber, update: &TokenUpdate, notices: &mut Vec<ChangeNotice>) {
        let Some(send) = &update.send else {
            return;
        };
        let record = self.records.entry(token).or_default();
        let old_state = record.send_state;
        if old_state == send.state && record.send_targets == send.targets {
            return;
        }
        let old_targets = std::mem::take(&mut record.send_targets);
        record.send_state = send.state;
        record.send_targets = send.targets.clone();

        // General pool membership flips exactly once per enter/leave
        if old_state == SendState::SendGeneral && send.state != SendState::SendGeneral {
            self.send_general.remove(token);
        } else if send.state == SendState::SendGeneral && old_state != SendState::SendGeneral {
            self.send_general.add(token);
        }

        // Directed registry follows the target list; stale edges never
        // outlive the state that justified them
        for old in &old_targets {
            self.targets.remove_edge(*old, token);
        }
        if send.state == SendState::SendTo {
            for target in &send.targets {
                self.targets.add_edge(*target, token);
            }
        }

        notices.push(ChangeNotice::SendStateChanged {
            token,
            state: send.state,
            targets: send.targets.clone(),
        });
    }

    fn apply_receive(&mut self, token: TokenNumber, update: &TokenUpdate, notices: &mut Vec<ChangeNotice>) {
        let Some(receive) = &update.receive else {
            return;
        };
        let record = self.records.entry(token).or_default();
        if record.receive_state == receive.state && record.receive_sources == receive.sources {
            return;
        }
        let old_state = record.receive_state;
        record.receive_state = receive.state;
        record.receive_sources = receive.sources.clone();

        if old_state == ReceiveState::ReceiveGeneral && receive.state != ReceiveState::ReceiveGeneral {
            self.receive_general.remove(token);
        } else if receive.state == ReceiveState::ReceiveGeneral && old_state != ReceiveState::ReceiveGeneral
        {
            self.receive_general.add(token);
        }

        notices.push(ChangeNotice::ReceiveStateChanged {
            token,
            state: receive.state,
            sources: receive.sources.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use mingle_core::{DelegationRegistry, MetadataUpdate, ReceiveUpdate, SendUpdate};

    use super::*;

    fn t(n: u32) -> TokenNumber {
        TokenNumber::new(n)
    }

    fn owner() -> Address {
        Address::new(0xAA)
    }

    /// Engine plus a registry where `owner()` owns every token used here
    fn world() -> (MatchEngine, DelegationRegistry) {
        let engine = MatchEngine::new(ProjectId::new(1));
        let mut auth = DelegationRegistry::new();
        for n in 0..64 {
            auth.set_owner(t(n), owner());
        }
        (engine, auth)
    }

    fn give_image(engine: &mut MatchEngine, auth: &DelegationRegistry, token: TokenNumber) {
        engine
            .configure(
                token,
                owner(),
                TokenUpdate::new().with_metadata(MetadataUpdate {
                    slot: 0,
                    image: Some(Bytes::from_static(b"img")),
                    sound: None,
                    make_active: false,
                }),
                auth,
            )
            .unwrap();
    }

    #[test]
    fn test_out_of_bounds_token_rejected() {
        let (mut engine, auth) = world();
        let err = engine
            .configure(
                TokenNumber::new(1 << 16),
                owner(),
                TokenUpdate::new().with_send(SendUpdate::general()),
                &auth,
            )
            .unwrap_err();
        assert_eq!(err, MingleError::TokenOutOfRange(1 << 16));
    }

    #[test]
    fn test_empty_call_rejected() {
        let (mut engine, auth) = world();
        let err = engine
            .configure(t(1), owner(), TokenUpdate::new(), &auth)
            .unwrap_err();
        assert_eq!(err, MingleError::NoUpdatesRequested);

        // A metadata update that writes nothing counts as empty too
        let err = engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new().with_metadata(MetadataUpdate::default()),
                &auth,
            )
            .unwrap_err();
        assert_eq!(err, MingleError::NoUpdatesRequested);
    }

    #[test]
    fn test_unauthorized_caller_rejected() {
        let (mut engine, auth) = world();
        let stranger = Address::new(0xBB);
        let err = engine
            .configure(
                t(1),
                stranger,
                TokenUpdate::new().with_send(SendUpdate::general()),
                &auth,
            )
            .unwrap_err();
        assert_eq!(
            err,
            MingleError::Unauthorized {
                token: t(1),
                caller: stranger
            }
        );
    }

    #[test]
    fn test_participation_requires_active_image() {
        let (mut engine, auth) = world();
        let err = engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new().with_send(SendUpdate::general()),
                &auth,
            )
            .unwrap_err();
        assert_eq!(err, MingleError::MissingActiveImage(t(1)));
        // Rejection left no trace
        assert_eq!(engine.send_general().len(), 0);
        assert!(engine.record(t(1)).is_none());
    }

    #[test]
    fn test_image_supplied_in_same_call_satisfies_precondition() {
        let (mut engine, auth) = world();
        let notices = engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new()
                    .with_metadata(MetadataUpdate {
                        slot: 0,
                        image: Some(Bytes::from_static(b"img")),
                        sound: None,
                        make_active: false,
                    })
                    .with_send(SendUpdate::general()),
                &auth,
            )
            .unwrap();

        assert_eq!(notices.len(), 2);
        assert!(engine.send_general().contains(t(1)));
        assert_eq!(engine.send_state(t(1)), SendState::SendGeneral);
    }

    #[test]
    fn test_send_to_requires_targets() {
        let (mut engine, auth) = world();
        give_image(&mut engine, &auth, t(1));

        let err = engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new().with_send(SendUpdate::to(vec![])),
                &auth,
            )
            .unwrap_err();
        assert_eq!(err, MingleError::EmptyTargets);

        let err = engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new().with_send(SendUpdate {
                    state: SendState::SendGeneral,
                    targets: vec![t(2)],
                }),
                &auth,
            )
            .unwrap_err();
        assert_eq!(err, MingleError::TargetsNotAllowed);

        let err = engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new().with_send(SendUpdate::to(vec![t(3); MAX_SEND_TARGETS + 1])),
                &auth,
            )
            .unwrap_err();
        assert_eq!(
            err,
            MingleError::TooManyTargets {
                count: MAX_SEND_TARGETS + 1,
                max: MAX_SEND_TARGETS
            }
        );
    }

    #[test]
    fn test_listed_targets_are_bound_checked() {
        let (mut engine, auth) = world();
        give_image(&mut engine, &auth, t(1));
        let err = engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new().with_send(SendUpdate::to(vec![TokenNumber::new(1 << 20)])),
                &auth,
            )
            .unwrap_err();
        assert_eq!(err, MingleError::TokenOutOfRange(1 << 20));
    }

    #[test]
    fn test_receive_from_list_rules() {
        let (mut engine, auth) = world();
        give_image(&mut engine, &auth, t(1));

        let err = engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new().with_receive(ReceiveUpdate::from(vec![])),
                &auth,
            )
            .unwrap_err();
        assert_eq!(err, MingleError::EmptySources);

        let err = engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new().with_receive(ReceiveUpdate {
                    state: ReceiveState::ReceiveTo,
                    sources: vec![t(2)],
                }),
                &auth,
            )
            .unwrap_err();
        assert_eq!(err, MingleError::SourcesNotAllowed);
    }

    #[test]
    fn test_send_to_populates_registry_deduplicated() {
        let (mut engine, auth) = world();
        give_image(&mut engine, &auth, t(1));

        engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new().with_send(SendUpdate::to(vec![t(2), t(2), t(2)])),
                &auth,
            )
            .unwrap();

        // Record keeps duplicates as given, registry stores the sender once
        assert_eq!(engine.record(t(1)).unwrap().send_targets, vec![t(2); 3]);
        assert_eq!(engine.targets().count(t(2)), 1);
        assert_eq!(engine.targets().sources(t(2)), &[t(1)]);
    }

    #[test]
    fn test_retarget_moves_registry_edges() {
        let (mut engine, auth) = world();
        give_image(&mut engine, &auth, t(1));

        engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new().with_send(SendUpdate::to(vec![t(2)])),
                &auth,
            )
            .unwrap();
        assert_eq!(engine.targets().sources(t(2)), &[t(1)]);

        engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new().with_send(SendUpdate::to(vec![t(3)])),
                &auth,
            )
            .unwrap();
        assert_eq!(engine.targets().sources(t(2)), &[] as &[TokenNumber]);
        assert_eq!(engine.targets().sources(t(3)), &[t(1)]);
    }

    #[test]
    fn test_leaving_send_to_clears_list_and_edges() {
        let (mut engine, auth) = world();
        give_image(&mut engine, &auth, t(1));

        engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new().with_send(SendUpdate::to(vec![t(2), t(3)])),
                &auth,
            )
            .unwrap();
        engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new().with_send(SendUpdate::general()),
                &auth,
            )
            .unwrap();

        assert!(engine.record(t(1)).unwrap().send_targets.is_empty());
        assert_eq!(engine.targets().count(t(2)), 0);
        assert_eq!(engine.targets().count(t(3)), 0);
        assert!(engine.send_general().contains(t(1)));
    }

    #[test]
    fn test_pool_membership_tracks_state() {
        let (mut engine, auth) = world();
        for n in 1..=3 {
            give_image(&mut engine, &auth, t(n));
            engine
                .configure(
                    t(n),
                    owner(),
                    TokenUpdate::new()
                        .with_send(SendUpdate::general())
                        .with_receive(ReceiveUpdate::general()),
                    &auth,
                )
                .unwrap();
        }
        assert_eq!(engine.send_general().len(), 3);
        assert_eq!(engine.receive_general().len(), 3);

        engine
            .configure(
                t(2),
                owner(),
                TokenUpdate::new()
                    .with_send(SendUpdate::neutral())
                    .with_receive(ReceiveUpdate::direct()),
                &auth,
            )
            .unwrap();
        assert_eq!(engine.send_general().len(), 2);
        assert_eq!(engine.receive_general().len(), 2);
        assert!(!engine.send_general().contains(t(2)));
        assert_eq!(engine.receive_state(t(2)), ReceiveState::ReceiveTo);
    }

    #[test]
    fn test_no_notice_for_unchanged_dimension() {
        let (mut engine, auth) = world();
        give_image(&mut engine, &auth, t(1));
        engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new().with_send(SendUpdate::general()),
                &auth,
            )
            .unwrap();

        // Same state again: accepted, but no send notice
        let notices = engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new()
                    .with_send(SendUpdate::general())
                    .with_receive(ReceiveUpdate::general()),
                &auth,
            )
            .unwrap();
        assert_eq!(notices.len(), 1);
        assert!(matches!(
            notices[0],
            ChangeNotice::ReceiveStateChanged { state: ReceiveState::ReceiveGeneral, .. }
        ));
    }

    #[test]
    fn test_active_slot_switch_needs_image_or_supplied_image() {
        let (mut engine, auth) = world();
        give_image(&mut engine, &auth, t(1));

        let err = engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new().with_metadata(MetadataUpdate {
                    slot: 2,
                    image: None,
                    sound: None,
                    make_active: true,
                }),
                &auth,
            )
            .unwrap_err();
        assert_eq!(err, MingleError::ActiveSlotNeedsImage(2));

        let notices = engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new().with_metadata(MetadataUpdate {
                    slot: 2,
                    image: Some(Bytes::from_static(b"alt")),
                    sound: None,
                    make_active: true,
                }),
                &auth,
            )
            .unwrap();
        assert_eq!(notices.len(), 2);
        assert_eq!(engine.slots().active_slot(t(1)), 2);
        assert_eq!(engine.slots().active_image(t(1)).0.as_ref(), b"alt");
    }

    #[test]
    fn test_delegate_scope_limits_update_categories() {
        let (mut engine, mut auth) = world();
        give_image(&mut engine, &auth, t(1));

        let curator = Address::new(0xD1);
        let agent = Address::new(0xD2);
        auth.grant_token(t(1), curator, DelegationRights::Metadata);
        auth.grant_token(t(1), agent, DelegationRights::Participation);

        // Metadata-scoped delegate writes payloads but cannot flip states
        engine
            .configure(
                t(1),
                curator,
                TokenUpdate::new().with_metadata(MetadataUpdate {
                    slot: 1,
                    image: Some(Bytes::from_static(b"alt")),
                    sound: None,
                    make_active: false,
                }),
                &auth,
            )
            .unwrap();
        let err = engine
            .configure(
                t(1),
                curator,
                TokenUpdate::new().with_send(SendUpdate::general()),
                &auth,
            )
            .unwrap_err();
        assert_eq!(err, MingleError::Unauthorized { token: t(1), caller: curator });

        // Participation-scoped delegate: the reverse
        engine
            .configure(
                t(1),
                agent,
                TokenUpdate::new().with_send(SendUpdate::general()),
                &auth,
            )
            .unwrap();
        let err = engine
            .configure(
                t(1),
                agent,
                TokenUpdate::new().with_metadata(MetadataUpdate {
                    slot: 0,
                    image: Some(Bytes::from_static(b"nope")),
                    sound: None,
                    make_active: false,
                }),
                &auth,
            )
            .unwrap_err();
        assert_eq!(err, MingleError::Unauthorized { token: t(1), caller: agent });
    }

    #[test]
    fn test_mixed_update_requires_both_scopes() {
        let (mut engine, mut auth) = world();
        let curator = Address::new(0xD3);
        auth.grant_token(t(1), curator, DelegationRights::Metadata);

        // Supplies the image and the state change together, but only holds
        // the metadata half; the whole call is rejected with no trace
        let mixed = TokenUpdate::new()
            .with_metadata(MetadataUpdate {
                slot: 0,
                image: Some(Bytes::from_static(b"img")),
                sound: None,
                make_active: false,
            })
            .with_send(SendUpdate::general());
        let err = engine.configure(t(1), curator, mixed.clone(), &auth).unwrap_err();
        assert_eq!(err, MingleError::Unauthorized { token: t(1), caller: curator });
        assert!(!engine.slots().has_active_image(t(1)));

        // A Full grant covers both halves of the same call
        auth.grant_token(t(1), curator, DelegationRights::Full);
        engine.configure(t(1), curator, mixed, &auth).unwrap();
        assert!(engine.send_general().contains(t(1)));
    }

    #[test]
    fn test_clearing_image_is_not_retroactive() {
        let (mut engine, auth) = world();
        give_image(&mut engine, &auth, t(1));
        engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new().with_send(SendUpdate::general()),
                &auth,
            )
            .unwrap();

        // Clearing the active image leaves existing participation alone
        engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new().with_metadata(MetadataUpdate {
                    slot: 0,
                    image: Some(Bytes::new()),
                    sound: None,
                    make_active: false,
                }),
                &auth,
            )
            .unwrap();
        assert_eq!(engine.send_state(t(1)), SendState::SendGeneral);
        assert!(engine.send_general().contains(t(1)));

        // But a fresh transition now fails the precondition
        let err = engine
            .configure(
                t(1),
                owner(),
                TokenUpdate::new().with_receive(ReceiveUpdate::general()),
                &auth,
            )
            .unwrap_err();
        assert_eq!(err, MingleError::MissingActiveImage(t(1)));
    }
}
