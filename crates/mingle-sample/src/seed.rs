//! Seed derivation for sampling
//!
//! Seeds are a pure function of ledger history: a finalized block hash,
//! the querying token's global id, and a domain discriminator telling
//! apart which pool or list is being sampled. Identical inputs always
//! yield identical samples.

use hkdf::Hkdf;
use sha2::Sha256;

use mingle_core::{BlockHash, TokenId};

/// Which population a sample is drawn from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SampleDomain {
    /// The send-general pool
    GeneralPool = 0x00,
    /// Directed-registry senders targeting the querying token
    DirectSenders = 0x01,
    /// The querying token's own filtered source list
    ReceiveSources = 0x02,
}

impl SampleDomain {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x00 => Some(SampleDomain::GeneralPool),
            0x01 => Some(SampleDomain::DirectSenders),
            0x02 => Some(SampleDomain::ReceiveSources),
            _ => None,
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Derive a sampling seed from a finalized checkpoint
pub fn derive_seed(block: &BlockHash, token: TokenId, domain: SampleDomain) -> [u8; 32] {
    let hkdf = Hkdf::<Sha256>::new(Some(&token.to_bytes()), block.as_bytes());
    let mut seed = [0u8; 32];
    let info = [b"MINGLE_SEED_v0" as &[u8], &[domain.to_byte()]].concat();
    hkdf.expand(&info, &mut seed).expect("HKDF expand failed");
    seed
}
