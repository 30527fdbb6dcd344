//! Parameter-registry host integration
//!
//! The engine plugs into a generic key/value parameter system in two
//! modes: a write-time post-configuration hook and a read-time
//! augmentation hook. The call shapes form a small closed set, so
//! dispatch is a tagged enum rather than open dynamic dispatch.

use bytes::Bytes;
use parking_lot::RwLock;

use mingle_core::{
    Address, ChangeNotice, MetadataUpdate, MingleResult, TokenAuthority, TokenNumber, TokenUpdate,
};
use mingle_state::MatchEngine;

/// Value carried by a generic parameter
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Blob(Bytes),
}

/// One hook invocation from the parameter host
#[derive(Clone, Debug)]
pub enum HookCall {
    /// Fired after a counterparty configured a keyed parameter on a token
    PostConfig {
        token: TokenNumber,
        caller: Address,
        key: String,
        value: ParamValue,
    },
    /// Fired while listing a token's parameters
    Augment { token: TokenNumber },
}

/// A derived parameter appended by the augmentation hook
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AugmentedParam {
    pub key: &'static str,
    pub value: ParamValue,
}

/// Outcome of a dispatched hook call
#[derive(Clone, Debug)]
pub enum HookOutcome {
    /// Post-configuration: state changes applied, if any
    Applied(Vec<ChangeNotice>),
    /// Augmentation: derived parameters in their fixed key order
    Params(Vec<AugmentedParam>),
}

/// Derived keys appended to a token's parameter listing, in order
pub const AUGMENT_KEYS: [&str; 4] = [
    "social.image",
    "social.sound",
    "social.sendState",
    "social.receiveState",
];

/// Hook dispatcher owned by the parameter host
///
/// Holds the engine behind a lock because the host drives both hook modes
/// through one handle; the host ledger still serializes actual execution.
pub struct HookRouter<A: TokenAuthority> {
    engine: RwLock<MatchEngine>,
    authority: A,
}

impl<A: TokenAuthority> HookRouter<A> {
    pub fn new(engine: MatchEngine, authority: A) -> Self {
        HookRouter {
            engine: RwLock::new(engine),
            authority,
        }
    }

    /// Authorization collaborator this router consults
    #[inline]
    pub fn authority(&self) -> &A {
        &self.authority
    }

    /// Run a closure over the engine read-only (for live-view queries)
    pub fn with_engine<R>(&self, f: impl FnOnce(&MatchEngine) -> R) -> R {
        f(&self.engine.read())
    }

    /// Dispatch one hook call
    pub fn dispatch(&self, call: HookCall) -> MingleResult<HookOutcome> {
        match call {
            HookCall::PostConfig {
                token,
                caller,
                key,
                value,
            } => self.post_config(token, caller, &key, value).map(HookOutcome::Applied),
            HookCall::Augment { token } => Ok(HookOutcome::Params(self.augment(token))),
        }
    }

    /// Map a recognized parameter write onto a configure call; unknown or
    /// ill-typed keys are a successful no-op (the host registry is generic)
    fn post_config(
        &self,
        token: TokenNumber,
        caller: Address,
        key: &str,
        value: ParamValue,
    ) -> MingleResult<Vec<ChangeNotice>> {
        let update = {
            let engine = self.engine.read();
            let active = engine.slots().active_slot(token);
            match (key, value) {
                ("social.image", ParamValue::Blob(bytes)) => {
                    Some(TokenUpdate::new().with_metadata(MetadataUpdate {
                        slot: active,
                        image: Some(bytes),
                        sound: None,
                        make_active: false,
                    }))
                }
                ("social.sound", ParamValue::Blob(bytes)) => {
                    Some(TokenUpdate::new().with_metadata(MetadataUpdate {
                        slot: active,
                        image: None,
                        sound: Some(bytes),
                        make_active: false,
                    }))
                }
                ("social.activeSlot", ParamValue::Text(text)) => {
                    text.parse::<usize>().ok().map(|slot| {
                        TokenUpdate::new().with_metadata(MetadataUpdate {
                            slot,
                            image: None,
                            sound: None,
                            make_active: true,
                        })
                    })
                }
                _ => None,
            }
        };

        match update {
            Some(update) => self
                .engine
                .write()
                .configure(token, caller, update, &self.authority),
            None => {
                tracing::debug!(%token, key, "ignoring unrecognized hook parameter");
                Ok(Vec::new())
            }
        }
    }

    /// Derived parameters appended when the host lists a token's
    /// parameters, in fixed, caller-visible key order
    fn augment(&self, token: TokenNumber) -> Vec<AugmentedParam> {
        let engine = self.engine.read();
        let (image, _) = engine.slots().active_image(token);
        let (sound, _) = engine.slots().active_sound(token);
        vec![
            AugmentedParam {
                key: AUGMENT_KEYS[0],
                value: ParamValue::Blob(image),
            },
            AugmentedParam {
                key: AUGMENT_KEYS[1],
                value: ParamValue::Blob(sound),
            },
            AugmentedParam {
                key: AUGMENT_KEYS[2],
                value: ParamValue::Text(engine.send_state(token).to_string()),
            },
            AugmentedParam {
                key: AUGMENT_KEYS[3],
                value: ParamValue::Text(engine.receive_state(token).to_string()),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use mingle_core::{DelegationRegistry, MingleError, ProjectId, SendUpdate};

    use super::*;

    fn t(n: u32) -> TokenNumber {
        TokenNumber::new(n)
    }

    fn router() -> HookRouter<DelegationRegistry> {
        let mut auth = DelegationRegistry::new();
        auth.set_owner(t(1), Address::new(0xAA));
        HookRouter::new(MatchEngine::new(ProjectId::new(1)), auth)
    }

    #[test]
    fn test_post_config_image_writes_active_slot() {
        let router = router();
        let outcome = router
            .dispatch(HookCall::PostConfig {
                token: t(1),
                caller: Address::new(0xAA),
                key: "social.image".into(),
                value: ParamValue::Blob(Bytes::from_static(b"png")),
            })
            .unwrap();

        let HookOutcome::Applied(notices) = outcome else {
            panic!("expected Applied");
        };
        assert_eq!(notices.len(), 1);
        router.with_engine(|engine| {
            assert_eq!(engine.slots().active_image(t(1)).0.as_ref(), b"png");
        });
    }

    #[test]
    fn test_post_config_is_authorized() {
        let router = router();
        let err = router
            .dispatch(HookCall::PostConfig {
                token: t(1),
                caller: Address::new(0xBB),
                key: "social.image".into(),
                value: ParamValue::Blob(Bytes::from_static(b"png")),
            })
            .unwrap_err();
        assert_eq!(
            err,
            MingleError::Unauthorized {
                token: t(1),
                caller: Address::new(0xBB),
            }
        );
    }

    #[test]
    fn test_unknown_key_is_noop() {
        let router = router();
        let outcome = router
            .dispatch(HookCall::PostConfig {
                token: t(1),
                caller: Address::new(0xAA),
                key: "royalties.split".into(),
                value: ParamValue::Text("50".into()),
            })
            .unwrap();
        assert!(matches!(outcome, HookOutcome::Applied(n) if n.is_empty()));
    }

    #[test]
    fn test_augment_fixed_key_order() {
        let router = router();
        router
            .dispatch(HookCall::PostConfig {
                token: t(1),
                caller: Address::new(0xAA),
                key: "social.image".into(),
                value: ParamValue::Blob(Bytes::from_static(b"png")),
            })
            .unwrap();

        let HookOutcome::Params(params) = router.dispatch(HookCall::Augment { token: t(1) }).unwrap()
        else {
            panic!("expected Params");
        };
        let keys: Vec<&str> = params.iter().map(|p| p.key).collect();
        assert_eq!(keys, AUGMENT_KEYS.to_vec());
        assert_eq!(params[0].value, ParamValue::Blob(Bytes::from_static(b"png")));
        assert_eq!(params[2].value, ParamValue::Text("neutral".into()));
        assert_eq!(params[3].value, ParamValue::Text("neutral".into()));
    }

    #[test]
    fn test_augment_reflects_state_strings() {
        let router = router();
        router
            .dispatch(HookCall::PostConfig {
                token: t(1),
                caller: Address::new(0xAA),
                key: "social.image".into(),
                value: ParamValue::Blob(Bytes::from_static(b"png")),
            })
            .unwrap();
        // Drive a send-state change through the engine behind the router
        router
            .engine
            .write()
            .configure(
                t(1),
                Address::new(0xAA),
                TokenUpdate::new().with_send(SendUpdate::general()),
                &router.authority,
            )
            .unwrap();

        let HookOutcome::Params(params) = router.dispatch(HookCall::Augment { token: t(1) }).unwrap()
        else {
            panic!("expected Params");
        };
        assert_eq!(params[2].value, ParamValue::Text("sendGeneral".into()));
    }
}
