//! Variant creators: one parsing strategy per part-of-speech grammar.
//!
//! A creator is bound to a part-of-speech tag and a source column. After the
//! driver resolved the form slots it calls [`VariantCreator::initialise`] once;
//! from then on [`VariantCreator::create`] turns the bound cell of a row into
//! zero or more [`Variant`]s.
//!
//! ```text
//! cell ──▶ split parts ──▶ strip metadata ──▶ alternative i of every part ──▶ Variant i
//! ```
//!
//! Creators are looked up by tag in a flat table; there is no hierarchy.

pub mod metadata;
pub mod misc;
pub mod multi;
pub mod noun;
pub mod utils;
pub mod verb;

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{CreateError, CreateResult, InitResult};
use crate::models::{FormState, LexemeForm, Properties, RowData, Variant};
use crate::slots::{FormType, TypeFormPair};

pub use misc::MiscCreator;
pub use multi::MultiCreator;
pub use noun::{NounCreator, NounNotation};
pub use verb::VerbCreator;

/// Hard limit for form text, in characters.
pub const MAX_FORM_LENGTH: usize = 100;

/// Form text longer than this is accepted with a warning.
pub const WARN_FORM_LENGTH: usize = 50;

// =============================================================================
// Temporary ids
// =============================================================================

/// Source of temporary variant ids: strictly decreasing negative numbers.
///
/// Shared by reference; safe to draw from several threads.
#[derive(Debug)]
pub struct TempIdSequence {
    next: AtomicI64,
}

impl TempIdSequence {
    /// Sequence starting at `-1`.
    pub fn new() -> Self {
        Self::starting_at(-1)
    }

    /// Sequence whose first id is `first` (must be negative).
    pub fn starting_at(first: i64) -> Self {
        debug_assert!(first < 0, "temporary ids are negative");
        Self {
            next: AtomicI64::new(first),
        }
    }

    /// Draw the next id.
    pub fn next_id(&self) -> i64 {
        self.next.fetch_sub(1, Ordering::SeqCst)
    }

    /// The id the next call will return.
    pub fn peek(&self) -> i64 {
        self.next.load(Ordering::SeqCst)
    }
}

impl Default for TempIdSequence {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Creation context
// =============================================================================

/// Everything a creator needs besides the row: the id sequence, the
/// diagnostics sink, the orthography and a context label for messages.
pub struct CreateContext<'a> {
    label: String,
    orthography_id: i64,
    ids: &'a TempIdSequence,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> CreateContext<'a> {
    pub fn new(
        label: impl Into<String>,
        orthography_id: i64,
        ids: &'a TempIdSequence,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            label: label.into(),
            orthography_id,
            ids,
            diagnostics,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn orthography_id(&self) -> i64 {
        self.orthography_id
    }

    /// Record a warning for `row` at `column`.
    pub fn warn(&mut self, row: &RowData, column: usize, message: impl Into<String>) {
        self.diagnostics.push(
            Diagnostic::warning(self.label.as_str(), row.line_number(), message)
                .with_column(column),
        );
    }

    /// Build a form, enforcing the length policy.
    ///
    /// Text above [`MAX_FORM_LENGTH`] characters fails; above
    /// [`WARN_FORM_LENGTH`] it is kept and a warning recorded.
    pub fn make_form(
        &mut self,
        row: &RowData,
        column: usize,
        slot: &FormType,
        text: &str,
        state: FormState,
    ) -> CreateResult<LexemeForm> {
        let length = text.chars().count();
        if length > MAX_FORM_LENGTH {
            return Err(CreateError::FormTooLong {
                text: text.to_string(),
                length,
                max: MAX_FORM_LENGTH,
            });
        }
        if length > WARN_FORM_LENGTH {
            self.warn(
                row,
                column,
                format!(
                    "form '{}' for slot '{}' is {} characters long",
                    text, slot.name, length
                ),
            );
        }
        Ok(LexemeForm::new(slot.id, text, state))
    }

    /// Build the variant for alternative `index`; index 0 is the main one.
    pub fn make_variant(
        &self,
        index: usize,
        forms: Vec<LexemeForm>,
        properties: Properties,
    ) -> Variant {
        Variant::new(
            self.ids.next_id(),
            self.orthography_id,
            index == 0,
            forms,
            properties,
        )
    }
}

// =============================================================================
// Strategy interface
// =============================================================================

/// A parsing strategy for one part-of-speech grammar.
pub trait VariantCreator: fmt::Debug + Send + Sync {
    /// Part-of-speech tag this creator is bound to.
    fn pos(&self) -> &str;

    /// Source column holding the text.
    fn column(&self) -> usize;

    /// Resolve the form slots this grammar fills. Must run exactly once,
    /// before any `create` call.
    fn initialise(&mut self, forms: &TypeFormPair) -> InitResult<()>;

    /// Parse the bound cell of `row`. A blank cell yields no variants.
    ///
    /// # Panics
    ///
    /// When called before [`VariantCreator::initialise`].
    fn create(&self, ctx: &mut CreateContext<'_>, row: &RowData) -> CreateResult<Vec<Variant>>;

    /// Variants grouped per lexeme. Only multi-lexeme creators return more
    /// than one group.
    fn create_lexemes(
        &self,
        ctx: &mut CreateContext<'_>,
        row: &RowData,
    ) -> CreateResult<Vec<Vec<Variant>>> {
        let variants = self.create(ctx, row)?;
        if variants.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![variants])
        }
    }
}

/// Unwrap resolved slots, failing fast on the initialise contract.
pub(crate) fn initialised<'s, T>(slots: &'s Option<T>, pos: &str) -> &'s T {
    match slots {
        Some(slots) => slots,
        None => panic!("creator for '{pos}' used before initialise"),
    }
}
