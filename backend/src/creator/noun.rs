//! Noun grammar: `singular, plural` with genus metadata.
//!
//! Two notations exist, chosen per orthography:
//!
//! - [`NounNotation::GenusSuffix`]: genus follows the last part,
//!   `deev, deve ~ deven m` or `byspil (n)`.
//! - [`NounNotation::ArticlePrefix`]: an article precedes the singular and the
//!   plural may elide the stem with `-`, `de deern, -s`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::metadata::{extract_genus, strip_article, NOUN_GENERA};
use super::utils::{alternative, max_alternatives, split_parts};
use super::{initialised, CreateContext, VariantCreator};
use crate::error::{CreateError, CreateResult, InitError, InitResult};
use crate::models::{FormState, Properties, RowData, Variant, PROP_GENERA};
use crate::slots::{FormType, TypeFormPair};

/// Slot filled by the first part.
pub const SINGULAR_SLOT: &str = "singular";

/// Slot filled by the second part.
pub const PLURAL_SLOT: &str = "plural";

/// Marker standing in for the singular stem in article notation.
const ELISION: char = '-';

/// How genus is written in a noun cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NounNotation {
    #[default]
    GenusSuffix,
    ArticlePrefix,
}

#[derive(Debug, Clone)]
struct NounSlots {
    singular: FormType,
    plural: FormType,
}

/// Creator for nouns.
#[derive(Debug, Clone)]
pub struct NounCreator {
    pos: String,
    column: usize,
    notation: NounNotation,
    slots: Option<NounSlots>,
}

impl NounCreator {
    pub fn new(pos: impl Into<String>, column: usize, notation: NounNotation) -> Self {
        Self {
            pos: pos.into(),
            column,
            notation,
            slots: None,
        }
    }

    fn genus_suffix(
        &self,
        ctx: &mut CreateContext<'_>,
        row: &RowData,
        mut parts: Vec<String>,
    ) -> CreateResult<Vec<Variant>> {
        let slots = initialised(&self.slots, &self.pos);

        let mut genera = BTreeSet::new();
        if let Some(last) = parts.last_mut() {
            let (text, found) = extract_genus(last, NOUN_GENERA)?;
            *last = text;
            genera = found;
        }

        let count = max_alternatives(&parts);
        let mut variants = Vec::with_capacity(count);
        for index in 0..count {
            let singular = alternative(&parts[0], index)?;
            let mut forms = vec![ctx.make_form(
                row,
                self.column,
                &slots.singular,
                &singular,
                FormState::Typed,
            )?];
            if let Some(plural_part) = parts.get(1) {
                let plural = alternative(plural_part, index)?;
                forms.push(ctx.make_form(
                    row,
                    self.column,
                    &slots.plural,
                    &plural,
                    FormState::Typed,
                )?);
            }
            variants.push(ctx.make_variant(index, forms, genus_properties(genera.clone())));
        }
        Ok(variants)
    }

    fn article_prefix(
        &self,
        ctx: &mut CreateContext<'_>,
        row: &RowData,
        parts: Vec<String>,
    ) -> CreateResult<Vec<Variant>> {
        let slots = initialised(&self.slots, &self.pos);

        let count = max_alternatives(&parts);
        let mut variants = Vec::with_capacity(count);
        for index in 0..count {
            let (singular, genus) = strip_article(&alternative(&parts[0], index)?)?;
            let mut forms = vec![ctx.make_form(
                row,
                self.column,
                &slots.singular,
                &singular,
                FormState::Typed,
            )?];
            if let Some(plural_part) = parts.get(1) {
                let (plural, state) = expand_plural(&alternative(plural_part, index)?, &singular)?;
                forms.push(ctx.make_form(row, self.column, &slots.plural, &plural, state)?);
            }
            let genera = BTreeSet::from([genus.to_string()]);
            variants.push(ctx.make_variant(index, forms, genus_properties(genera)));
        }
        Ok(variants)
    }
}

/// Replace a single elision dash with the singular stem.
fn expand_plural(raw: &str, singular: &str) -> CreateResult<(String, FormState)> {
    match raw.matches(ELISION).count() {
        0 => Ok((raw.to_string(), FormState::Typed)),
        1 => Ok((raw.replacen(ELISION, singular, 1), FormState::Generated)),
        _ => Err(CreateError::MultipleElisions(raw.to_string())),
    }
}

fn genus_properties(genera: BTreeSet<String>) -> Properties {
    let mut properties = Properties::new();
    if !genera.is_empty() {
        properties.insert(PROP_GENERA.to_string(), genera);
    }
    properties
}

impl VariantCreator for NounCreator {
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
        self.slots = Some(NounSlots {
            singular: forms.require(SINGULAR_SLOT)?.clone(),
            plural: forms.require(PLURAL_SLOT)?.clone(),
        });
        Ok(())
    }

    fn create(&self, ctx: &mut CreateContext<'_>, row: &RowData) -> CreateResult<Vec<Variant>> {
        initialised(&self.slots, &self.pos);
        let cell = row.column(self.column).trim();
        if cell.is_empty() {
            return Ok(Vec::new());
        }

        let parts = split_parts(cell, 2)?;
        match self.notation {
            NounNotation::GenusSuffix => self.genus_suffix(ctx, row, parts),
            NounNotation::ArticlePrefix => self.article_prefix(ctx, row, parts),
        }
    }
}
