//! Form slots per part of speech.
//!
//! A [`TypeFormPair`] lists the morphological slots a part of speech carries
//! (singular, plural, infinitive, ...), ordered by declared position. The slot
//! with the smallest position is the base (citation) slot. A [`TypeFormMap`]
//! holds the resolved pairs for every part of speech a run needs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{InitError, InitResult};

/// A part of speech as known to the reference stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosDescriptor {
    pub id: i64,
    pub tag: String,
}

/// A form type descriptor: the persistent identity of a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormType {
    pub id: i64,
    /// Slot name, e.g. `singular` or `participle`.
    pub name: String,
    pub position: u32,
}

/// Ordered slot set of one part of speech.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeFormPair {
    pos: PosDescriptor,
    slots: Vec<FormType>,
}

impl TypeFormPair {
    /// Build a pair; slots are ordered by position. An empty slot list is a
    /// configuration error.
    pub fn new(pos: PosDescriptor, mut slots: Vec<FormType>) -> InitResult<Self> {
        if slots.is_empty() {
            return Err(InitError::NoFormSlots(pos.tag));
        }
        slots.sort_by_key(|s| s.position);
        Ok(Self { pos, slots })
    }

    pub fn pos(&self) -> &PosDescriptor {
        &self.pos
    }

    /// The base slot (smallest position).
    pub fn base(&self) -> &FormType {
        &self.slots[0]
    }

    pub fn slots(&self) -> &[FormType] {
        &self.slots
    }

    pub fn slot(&self, name: &str) -> Option<&FormType> {
        self.slots.iter().find(|s| s.name == name)
    }

    /// Slot by name, or a [`InitError::MissingSlot`].
    pub fn require(&self, name: &str) -> InitResult<&FormType> {
        self.slot(name).ok_or_else(|| InitError::MissingSlot {
            pos: self.pos.tag.clone(),
            slot: name.to_string(),
        })
    }
}

/// Resolved slot sets keyed by part-of-speech tag.
#[derive(Debug, Clone, Default)]
pub struct TypeFormMap {
    pairs: HashMap<String, TypeFormPair>,
}

impl TypeFormMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pair: TypeFormPair) {
        self.pairs.insert(pair.pos.tag.clone(), pair);
    }

    pub fn get(&self, pos: &str) -> Option<&TypeFormPair> {
        self.pairs.get(pos)
    }

    /// Pair for `pos`, or [`InitError::NoFormSlots`].
    pub fn require(&self, pos: &str) -> InitResult<&TypeFormPair> {
        self.get(pos)
            .ok_or_else(|| InitError::NoFormSlots(pos.to_string()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
