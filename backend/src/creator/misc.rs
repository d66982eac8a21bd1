//! Default grammar: the whole cell is the base form, `~` separates spellings.
//!
//! Used for every part of speech without a dedicated grammar (adjectives,
//! adverbs, particles, ...). Commas are literal here.

use super::utils::{alternative, alternative_count};
use super::{initialised, CreateContext, VariantCreator};
use crate::error::{CreateResult, InitError, InitResult};
use crate::models::{FormState, Properties, RowData, Variant};
use crate::slots::{FormType, TypeFormPair};

/// Creator filling only the base slot.
#[derive(Debug, Clone)]
pub struct MiscCreator {
    pos: String,
    column: usize,
    base: Option<FormType>,
}

impl MiscCreator {
    pub fn new(pos: impl Into<String>, column: usize) -> Self {
        Self {
            pos: pos.into(),
            column,
            base: None,
        }
    }
}

impl VariantCreator for MiscCreator {
    fn pos(&self) -> &str {
        &self.pos
    }

    fn column(&self) -> usize {
        self.column
    }

    fn initialise(&mut self, forms: &TypeFormPair) -> InitResult<()> {
        if self.base.is_some() {
            return Err(InitError::AlreadyInitialised(self.pos.clone()));
        }
        self.base = Some(forms.base().clone());
        Ok(())
    }

    fn create(&self, ctx: &mut CreateContext<'_>, row: &RowData) -> CreateResult<Vec<Variant>> {
        let base = initialised(&self.base, &self.pos);
        let cell = row.column(self.column).trim();
        if cell.is_empty() {
            return Ok(Vec::new());
        }

        (0..alternative_count(cell))
            .map(|index| {
                let text = alternative(cell, index)?;
                let form = ctx.make_form(row, self.column, base, &text, FormState::Typed)?;
                Ok(ctx.make_variant(index, vec![form], Properties::new()))
            })
            .collect()
    }
}
