//! Reference data seam: where form slots and languages come from.
//!
//! The persistence stage owns the real reference tables. The driver only sees
//! [`ReferenceData`]; [`StaticReferenceData`] serves it from the config.

use std::collections::HashMap;

use crate::config::{PosConfig, ReferenceConfig};
use crate::models::Language;
use crate::slots::{PosDescriptor, TypeFormPair};

/// Lookup of form slots and languages.
pub trait ReferenceData {
    /// Ordered form slots of a part of speech. `None` when the tag is unknown
    /// or has no slots.
    fn form_slots(&self, pos: &str) -> Option<TypeFormPair>;

    /// Language by code.
    fn language(&self, code: &str) -> Option<Language>;
}

/// Reference data held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticReferenceData {
    parts_of_speech: HashMap<String, PosConfig>,
    languages: HashMap<String, Language>,
}

impl StaticReferenceData {
    pub fn from_config(config: &ReferenceConfig) -> Self {
        Self {
            parts_of_speech: config
                .parts_of_speech
                .iter()
                .map(|pos| (pos.tag.clone(), pos.clone()))
                .collect(),
            languages: config
                .languages
                .iter()
                .map(|lang| (lang.code.clone(), lang.clone()))
                .collect(),
        }
    }
}

impl ReferenceData for StaticReferenceData {
    fn form_slots(&self, pos: &str) -> Option<TypeFormPair> {
        let config = self.parts_of_speech.get(pos)?;
        let descriptor = PosDescriptor {
            id: config.id,
            tag: config.tag.clone(),
        };
        TypeFormPair::new(descriptor, config.slots.clone()).ok()
    }

    fn language(&self, code: &str) -> Option<Language> {
        self.languages.get(code).cloned()
    }
}
