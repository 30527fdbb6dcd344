//! Identity types for the MINGLE engine
//!
//! Token numbers are compact per-project indices; the global token id is
//! derived as `project * TOKEN_SPACE + number` so cross-project references
//! stay unambiguous on the wire.

use std::fmt;

use crate::{TOKEN_NUMBER_BOUND, TOKEN_SPACE};

/// Project (collection) identity
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ProjectId(pub u32);

impl ProjectId {
    pub const ZERO: ProjectId = ProjectId(0);

    #[inline]
    pub fn new(id: u32) -> Self {
        ProjectId(id)
    }
}

impl fmt::Debug for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Project({})", self.0)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-project token number, valid below [`TOKEN_NUMBER_BOUND`]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct TokenNumber(pub u32);

impl TokenNumber {
    #[inline]
    pub fn new(n: u32) -> Self {
        TokenNumber(n)
    }

    /// Check the token-number bound without touching any state
    #[inline]
    pub fn in_bounds(self) -> bool {
        self.0 < TOKEN_NUMBER_BOUND
    }
}

impl fmt::Debug for TokenNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(#{})", self.0)
    }
}

impl fmt::Display for TokenNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Global token identity across projects
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct TokenId(pub u64);

impl TokenId {
    #[inline]
    pub fn from_parts(project: ProjectId, number: TokenNumber) -> Self {
        TokenId(project.0 as u64 * TOKEN_SPACE + number.0 as u64)
    }

    #[inline]
    pub fn project(self) -> ProjectId {
        ProjectId((self.0 / TOKEN_SPACE) as u32)
    }

    #[inline]
    pub fn number(self) -> TokenNumber {
        TokenNumber((self.0 % TOKEN_SPACE) as u32)
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        TokenId(u64::from_le_bytes(bytes))
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({}/{})", self.project().0, self.number().0)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project().0, self.number().0)
    }
}

/// Account address - owner or caller identity
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Address(pub u64);

impl Address {
    pub const ZERO: Address = Address(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        Address(id)
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Address(u64::from_le_bytes(bytes))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Addr({:016x})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Finalized block number, used to anchor read queries in ledger history
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BlockNumber(pub u64);

impl BlockNumber {
    #[inline]
    pub fn new(n: u64) -> Self {
        BlockNumber(n)
    }
}

impl fmt::Debug for BlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({})", self.0)
    }
}

impl fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Finalized block hash - seed material for deterministic sampling
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHash(pub [u8; 32]);

impl BlockHash {
    pub const ZERO: BlockHash = BlockHash([0u8; 32]);

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({:02x}{:02x}{:02x}{:02x}..)", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}
