//! Domain models for the Lexload import pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`RowData`] - One physical source line split into cells
//! - [`Variant`] - One spelling variant of a lexeme, with its forms
//! - [`LexemeForm`] - One word form at a morphological slot
//! - [`LexemeBundle`] - A lexeme root with its variants, ready for persistence
//! - [`Language`] - Reference data for a provider's language

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Property key holding the genus tags of a variant.
pub const PROP_GENERA: &str = "genera";

/// Property key holding the canonical auxiliary verbs of a variant.
pub const PROP_AUXILIARIES: &str = "auxiliaries";

// =============================================================================
// Rows
// =============================================================================

/// One source line split into cells.
///
/// Short rows are padded with empty cells up to the configured width; longer
/// rows keep every cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowData {
    line_number: usize,
    columns: Vec<String>,
}

impl RowData {
    /// Build a row, right-padding `cells` with empty strings to `width`.
    pub fn new(line_number: usize, cells: Vec<String>, width: usize) -> Self {
        let mut columns = cells;
        if columns.len() < width {
            columns.resize(width, String::new());
        }
        Self {
            line_number,
            columns,
        }
    }

    /// 1-based line number in the source file.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Cell at `index`, or `""` past the end of the row.
    pub fn column(&self, index: usize) -> &str {
        self.columns.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// =============================================================================
// Variants and forms
// =============================================================================

/// How a form's text came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormState {
    /// Written literally in the source cell.
    Typed,
    /// Derived from another form (joined infinitive, expanded plural).
    Generated,
}

/// Action the persistence stage should take for an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingAction {
    #[default]
    Insert,
}

/// One inflected or derived word form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexemeForm {
    /// Temporary id of the owning variant, set once the variant exists.
    pub variant_id: Option<i64>,
    /// Form type of the slot this form fills.
    pub form_type_id: i64,
    pub text: String,
    pub state: FormState,
}

impl LexemeForm {
    pub fn new(form_type_id: i64, text: impl Into<String>, state: FormState) -> Self {
        Self {
            variant_id: None,
            form_type_id,
            text: text.into(),
            state,
        }
    }
}

/// Free-form variant properties, e.g. `genera` or `auxiliaries`.
pub type Properties = BTreeMap<String, BTreeSet<String>>;

/// One spelling variant of a lexeme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    /// Temporary negative id, replaced by the persistence stage.
    pub id: i64,
    pub orthography_id: i64,
    pub main: bool,
    /// `None` until dialect distribution ran.
    pub dialect_ids: Option<BTreeSet<i64>>,
    pub lexeme_forms: Vec<LexemeForm>,
    #[serde(default)]
    pub properties: Properties,
    pub active: bool,
    pub action: PendingAction,
}

impl Variant {
    /// Build a variant and attach the back-reference of every form to it.
    pub fn new(
        id: i64,
        orthography_id: i64,
        main: bool,
        forms: Vec<LexemeForm>,
        properties: Properties,
    ) -> Self {
        let lexeme_forms = forms
            .into_iter()
            .map(|mut form| {
                form.variant_id = Some(id);
                form
            })
            .collect();
        Self {
            id,
            orthography_id,
            main,
            dialect_ids: None,
            lexeme_forms,
            properties,
            active: true,
            action: PendingAction::Insert,
        }
    }

    /// Form filling the given form type, if any.
    pub fn form(&self, form_type_id: i64) -> Option<&LexemeForm> {
        self.lexeme_forms
            .iter()
            .find(|f| f.form_type_id == form_type_id)
    }

    /// Property values under `key`, empty when unset.
    pub fn property(&self, key: &str) -> Vec<&str> {
        self.properties
            .get(key)
            .map(|values| values.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

// =============================================================================
// Bundles
// =============================================================================

/// A language known to the reference stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: i64,
    pub code: String,
    #[serde(default)]
    pub name: String,
}

/// A lexeme root with all variants parsed from one cell (or one lexeme part of
/// a multi-lexeme cell), tagged for insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexemeBundle {
    pub language_id: i64,
    pub language: String,
    pub pos: String,
    pub line_number: usize,
    pub action: PendingAction,
    pub variants: Vec<Variant>,
}

impl LexemeBundle {
    /// The main variant. Every non-empty bundle has exactly one.
    pub fn main_variant(&self) -> Option<&Variant> {
        self.variants.iter().find(|v| v.main)
    }
}
