//! Verb grammar: `infinitive, 3sg present, 3sg preterite, participle`.
//!
//! A `|` in the infinitive marks a separable prefix (`acht|geaven`): the
//! divided spelling is kept as its own form and the joined infinitive is
//! generated from it. The auxiliary is given either as a leading marker on the
//! participle (`het achtgeaven`) or as a trailing list (`... (het, is)`).

use std::collections::BTreeSet;

use super::metadata::{extract_auxiliary_list, strip_leading_auxiliary};
use super::utils::{alternative, max_alternatives, split_parts};
use super::{initialised, CreateContext, VariantCreator};
use crate::error::{CreateResult, InitError, InitResult};
use crate::models::{FormState, Properties, RowData, Variant, PROP_AUXILIARIES};
use crate::slots::{FormType, TypeFormPair};

pub const INFINITIVE_SLOT: &str = "infinitive";
pub const DIVIDED_INFINITIVE_SLOT: &str = "infinitive_divided";
pub const PRESENT_SLOT: &str = "present_3sg";
pub const PRETERITE_SLOT: &str = "preterite_3sg";
pub const PARTICIPLE_SLOT: &str = "participle";

/// Number of structural parts in a full verb cell.
const VERB_PARTS: usize = 4;

/// Separable prefix marker.
const PREFIX_MARKER: char = '|';

#[derive(Debug, Clone)]
struct VerbSlots {
    infinitive: FormType,
    divided: FormType,
    present: FormType,
    preterite: FormType,
    participle: FormType,
}

/// Creator for verbs.
#[derive(Debug, Clone)]
pub struct VerbCreator {
    pos: String,
    column: usize,
    slots: Option<VerbSlots>,
}

impl VerbCreator {
    pub fn new(pos: impl Into<String>, column: usize) -> Self {
        Self {
            pos: pos.into(),
            column,
            slots: None,
        }
    }
}

impl VariantCreator for VerbCreator {
    fn pos(&self) -> &str {
        &self.pos
    }

    fn column(&self) -> usize {
        self.column
    }

    fn initialise(&mut self, forms: &TypeFormPair) -> InitResult<()> {
        if self.slots.is_some() {
            return Err(InitError::AlreadyInitialised(self.pos.clone()));
        }
        self.slots = Some(VerbSlots {
            infinitive: forms.require(INFINITIVE_SLOT)?.clone(),
            divided: forms.require(DIVIDED_INFINITIVE_SLOT)?.clone(),
            present: forms.require(PRESENT_SLOT)?.clone(),
            preterite: forms.require(PRETERITE_SLOT)?.clone(),
            participle: forms.require(PARTICIPLE_SLOT)?.clone(),
        });
        Ok(())
    }

    fn create(&self, ctx: &mut CreateContext<'_>, row: &RowData) -> CreateResult<Vec<Variant>> {
        let slots = initialised(&self.slots, &self.pos);
        let cell = row.column(self.column).trim();
        if cell.is_empty() {
            return Ok(Vec::new());
        }

        let mut parts = split_parts(cell, VERB_PARTS)?;
        let mut listed = BTreeSet::new();
        if let Some(last) = parts.last_mut() {
            let (text, found) = extract_auxiliary_list(last)?;
            *last = text;
            listed = found;
        }

        let count = max_alternatives(&parts);
        let mut variants = Vec::with_capacity(count);
        for index in 0..count {
            let mut forms = Vec::with_capacity(VERB_PARTS + 1);
            let mut auxiliaries = listed.clone();

            let infinitive = alternative(&parts[0], index)?;
            if infinitive.contains(PREFIX_MARKER) {
                let joined = infinitive.replace(PREFIX_MARKER, "");
                forms.push(ctx.make_form(
                    row,
                    self.column,
                    &slots.infinitive,
                    &joined,
                    FormState::Generated,
                )?);
                forms.push(ctx.make_form(
                    row,
                    self.column,
                    &slots.divided,
                    &infinitive,
                    FormState::Typed,
                )?);
            } else {
                forms.push(ctx.make_form(
                    row,
                    self.column,
                    &slots.infinitive,
                    &infinitive,
                    FormState::Typed,
                )?);
            }

            if parts.len() == VERB_PARTS {
                let present = alternative(&parts[1], index)?;
                forms.push(ctx.make_form(row, self.column, &slots.present, &present, FormState::Typed)?);

                let preterite = alternative(&parts[2], index)?;
                forms.push(ctx.make_form(
                    row,
                    self.column,
                    &slots.preterite,
                    &preterite,
                    FormState::Typed,
                )?);

                let (participle, marker) = strip_leading_auxiliary(&alternative(&parts[3], index)?);
                auxiliaries.extend(marker.map(str::to_string));
                forms.push(ctx.make_form(
                    row,
                    self.column,
                    &slots.participle,
                    &participle,
                    FormState::Typed,
                )?);
            }

            let mut properties = Properties::new();
            if !auxiliaries.is_empty() {
                properties.insert(PROP_AUXILIARIES.to_string(), auxiliaries);
            }
            variants.push(ctx.make_variant(index, forms, properties));
        }
        Ok(variants)
    }
}
