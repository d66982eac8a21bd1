//! Multi-lexeme cells: several lexemes of one part of speech in one column.
//!
//! The cell is split on the lexeme separator (`;` by default) and every part
//! is parsed on its own, yielding one variant group per lexeme. Parts that look
//! like they were not split correctly only produce warnings.

use super::utils::{alternative, alternative_count, ALTERNATIVE_SEPARATOR};
use super::{initialised, CreateContext, VariantCreator};
use crate::error::{CreateResult, InitError, InitResult};
use crate::models::{FormState, Properties, RowData, Variant};
use crate::slots::{FormType, TypeFormPair};

/// Default separator between lexemes in one cell.
pub const DEFAULT_LEXEME_SEPARATOR: char = ';';

/// Creator for columns holding several lexemes.
#[derive(Debug, Clone)]
pub struct MultiCreator {
    pos: String,
    column: usize,
    separator: char,
    allow_multi_word: bool,
    base: Option<FormType>,
}

impl MultiCreator {
    pub fn new(pos: impl Into<String>, column: usize) -> Self {
        Self {
            pos: pos.into(),
            column,
            separator: DEFAULT_LEXEME_SEPARATOR,
            allow_multi_word: false,
            base: None,
        }
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Accept entries made of several words without warning.
    pub fn with_multi_word(mut self, allow: bool) -> Self {
        self.allow_multi_word = allow;
        self
    }

    /// Lexeme parts of the bound cell, trimmed, blanks dropped.
    pub fn lexeme_parts<'r>(&self, row: &'r RowData) -> Vec<&'r str> {
        row.column(self.column)
            .split(self.separator)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect()
    }

    /// Parse one lexeme part taken from the bound cell.
    ///
    /// Unescaped parentheses and, unless multi-word entries are allowed,
    /// inner spaces are reported as warnings; the part is still parsed.
    pub fn create_part(
        &self,
        ctx: &mut CreateContext<'_>,
        row: &RowData,
        part: &str,
    ) -> CreateResult<Vec<Variant>> {
        let base = initialised(&self.base, &self.pos);
        let part = part.trim();
        if part.is_empty() {
            return Ok(Vec::new());
        }

        if has_unescaped_parenthesis(part) {
            ctx.warn(
                row,
                self.column,
                format!("'{part}' contains parentheses; was the cell split correctly?"),
            );
        }
        if !self.allow_multi_word
            && part
                .split(ALTERNATIVE_SEPARATOR)
                .any(|alt| alt.trim().contains(char::is_whitespace))
        {
            ctx.warn(
                row,
                self.column,
                format!("'{part}' contains spaces but '{}' entries are single words", self.pos),
            );
        }

        (0..alternative_count(part))
            .map(|index| {
                let text = unescape(&alternative(part, index)?);
                let form = ctx.make_form(row, self.column, base, &text, FormState::Typed)?;
                Ok(ctx.make_variant(index, vec![form], Properties::new()))
            })
            .collect()
    }
}

fn has_unescaped_parenthesis(text: &str) -> bool {
    let mut escaped = false;
    for c in text.chars() {
        match c {
            '\\' => escaped = !escaped,
            '(' | ')' if !escaped => return true,
            _ => escaped = false,
        }
    }
    false
}

fn unescape(text: &str) -> String {
    text.replace("\\(", "(").replace("\\)", ")")
}

impl VariantCreator for MultiCreator {
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

    /// The whole cell taken as a single lexeme part.
    fn create(&self, ctx: &mut CreateContext<'_>, row: &RowData) -> CreateResult<Vec<Variant>> {
        self.create_part(ctx, row, row.column(self.column))
    }

    fn create_lexemes(
        &self,
        ctx: &mut CreateContext<'_>,
        row: &RowData,
    ) -> CreateResult<Vec<Vec<Variant>>> {
        let mut lexemes = Vec::new();
        for part in self.lexeme_parts(row) {
            let variants = self.create_part(ctx, row, part)?;
            if !variants.is_empty() {
                lexemes.push(variants);
            }
        }
        Ok(lexemes)
    }
}
