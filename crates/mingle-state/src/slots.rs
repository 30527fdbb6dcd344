//! Versioned metadata slot store
//!
//! Each token owns a fixed number of slots holding image and sound
//! payloads. One slot is active; only its payloads are exposed to readers.
//! Versions increment on every overwrite (clears included) and never
//! decrement. Slots are created implicitly and persist for the life of
//! the token.

use std::collections::HashMap;

use bytes::Bytes;

use mingle_core::{MingleError, MingleResult, TokenNumber, SLOT_COUNT};

/// A single payload with its monotonically increasing version
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PayloadCell {
    bytes: Bytes,
    version: u64,
}

impl PayloadCell {
    /// Overwrite the payload, bumping the version
    pub fn write(&mut self, bytes: Bytes) -> u64 {
        self.bytes = bytes;
        self.version += 1;
        self.version
    }

    #[inline]
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One metadata slot: image plus sound
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataSlot {
    pub image: PayloadCell,
    pub sound: PayloadCell,
}

/// All slots for one token, with the active-slot index
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenSlots {
    slots: [MetadataSlot; SLOT_COUNT],
    active: usize,
}

impl Default for TokenSlots {
    fn default() -> Self {
        TokenSlots {
            slots: Default::default(),
            active: 0,
        }
    }
}

impl TokenSlots {
    #[inline]
    pub fn active(&self) -> usize {
        self.active
    }

    #[inline]
    pub fn slot(&self, index: usize) -> Option<&MetadataSlot> {
        self.slots.get(index)
    }
}

/// Slot store for every token in a collection
#[derive(Clone, Debug, Default)]
pub struct SlotStore {
    tokens: HashMap<TokenNumber, TokenSlots>,
}

impl SlotStore {
    pub fn new() -> Self {
        SlotStore::default()
    }

    /// Write an image payload; creates the token's slots on first use
    pub fn write_image(&mut self, token: TokenNumber, slot: usize, bytes: Bytes) -> MingleResult<u64> {
        let cell = self.cell_mut(token, slot)?;
        Ok(cell.image.write(bytes))
    }

    /// Write a sound payload; creates the token's slots on first use
    pub fn write_sound(&mut self, token: TokenNumber, slot: usize, bytes: Bytes) -> MingleResult<u64> {
        let cell = self.cell_mut(token, slot)?;
        Ok(cell.sound.write(bytes))
    }

    /// Switch the active slot; the target slot must already hold image data
    pub fn set_active(&mut self, token: TokenNumber, slot: usize) -> MingleResult<()> {
        if slot >= SLOT_COUNT {
            return Err(MingleError::SlotOutOfRange(slot));
        }
        let slots = self.tokens.entry(token).or_default();
        if slots.slots[slot].image.is_empty() {
            return Err(MingleError::ActiveSlotNeedsImage(slot));
        }
        slots.active = slot;
        Ok(())
    }

    /// Active slot index (0 for a token never written)
    pub fn active_slot(&self, token: TokenNumber) -> usize {
        self.tokens.get(&token).map_or(0, |s| s.active)
    }

    /// Active-slot image payload and version
    pub fn active_image(&self, token: TokenNumber) -> (Bytes, u64) {
        self.active_cell(token, |slot| &slot.image)
    }

    /// Active-slot sound payload and version
    pub fn active_sound(&self, token: TokenNumber) -> (Bytes, u64) {
        self.active_cell(token, |slot| &slot.sound)
    }

    /// Does the token have image data at its active slot?
    pub fn has_active_image(&self, token: TokenNumber) -> bool {
        !self.active_image(token).0.is_empty()
    }

    /// Image payload and version at a specific slot
    pub fn image_at(&self, token: TokenNumber, slot: usize) -> (Bytes, u64) {
        self.cell_at(token, slot, |s| &s.image)
    }

    /// Sound payload and version at a specific slot
    pub fn sound_at(&self, token: TokenNumber, slot: usize) -> (Bytes, u64) {
        self.cell_at(token, slot, |s| &s.sound)
    }

    fn cell_mut(&mut self, token: TokenNumber, slot: usize) -> MingleResult<&mut MetadataSlot> {
        if slot >= SLOT_COUNT {
            return Err(MingleError::SlotOutOfRange(slot));
        }
        Ok(&mut self.tokens.entry(token).or_default().slots[slot])
    }

    fn active_cell(&self, token: TokenNumber, f: impl Fn(&MetadataSlot) -> &PayloadCell) -> (Bytes, u64) {
        match self.tokens.get(&token) {
            Some(slots) => {
                let cell = f(&slots.slots[slots.active]);
                (cell.bytes().clone(), cell.version())
            }
            None => (Bytes::new(), 0),
        }
    }

    fn cell_at(&self, token: TokenNumber, slot: usize, f: impl Fn(&MetadataSlot) -> &PayloadCell) -> (Bytes, u64) {
        match self.tokens.get(&token).and_then(|s| s.slot(slot)) {
            Some(meta) => {
                let cell = f(meta);
                (cell.bytes().clone(), cell.version())
            }
            None => (Bytes::new(), 0),
        }
    }
}
