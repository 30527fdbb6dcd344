//! Best-effort name resolution
//!
//! Consulted only when assembling live views. Resolution failure is never
//! fatal; it degrades to an empty string.

use std::collections::HashMap;

use mingle_core::Address;

/// Human-readable name lookup for addresses
pub trait NameResolver {
    /// Name for an address, or an empty string when none resolves
    fn resolve(&self, address: Address) -> String;
}

/// In-memory name directory
#[derive(Clone, Debug, Default)]
pub struct NameDirectory {
    names: HashMap<Address, String>,
}

impl NameDirectory {
    pub fn new() -> Self {
        NameDirectory::default()
    }

    pub fn register(&mut self, address: Address, name: impl Into<String>) {
        self.names.insert(address, name.into());
    }
}

impl NameResolver for NameDirectory {
    fn resolve(&self, address: Address) -> String {
        self.names.get(&address).cloned().unwrap_or_default()
    }
}
