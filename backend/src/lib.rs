//! # Lexload - variant parsing and bulk import of dictionary source files
//!
//! Lexload reads delimited dictionary source files (one lexeme per row) and
//! turns every row into lexeme bundles: spelling variants with their word
//! forms, grammatical properties and dialect restrictions, ready for a
//! persistence stage to insert.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Source file │────▶│   Parser    │────▶│  Creators   │────▶│  Bundles +  │
//! │  (ISO/UTF8) │     │ (rows, enc) │     │ + dialects  │     │ diagnostics │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lexload::{ImportConfig, Importer};
//! use std::path::Path;
//!
//! let config = ImportConfig::load(Path::new("import.json"))?;
//! let mut importer = Importer::new(config);
//! importer.run(Path::new("words.tsv"))?;
//! let report = importer.into_report();
//! println!("{} bundles, {} errors", report.bundles.len(), report.error_count());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Rows, variants, forms, bundles
//! - [`slots`] - Form slots per part of speech
//! - [`parser`] - Source decoding and row splitting
//! - [`creator`] - Per-part-of-speech cell grammars
//! - [`dialect`] - Dialect distribution over variants
//! - [`import`] - Import driver and reference data seam
//! - [`config`] - JSON import configuration
//! - [`diagnostics`] - Collected row diagnostics
//! - [`validation`] - Bundle schema validation
//! - [`logging`] - Tracing subscriber setup

// Core modules
pub mod error;
pub mod models;
pub mod slots;

// Parsing
pub mod creator;
pub mod dialect;
pub mod parser;

// Import
pub mod config;
pub mod diagnostics;
pub mod import;

// Validation
pub mod validation;

// Logging
pub mod logging;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, CreateError, ImportError, InitError, ParseError, RowError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    FormState, Language, LexemeBundle, LexemeForm, PendingAction, Properties, RowData, Variant,
};

pub use slots::{FormType, PosDescriptor, TypeFormMap, TypeFormPair};

// =============================================================================
// Re-exports - Creators
// =============================================================================

pub use creator::{
    CreateContext, MiscCreator, MultiCreator, NounCreator, NounNotation, TempIdSequence,
    VariantCreator, VerbCreator,
};

pub use dialect::DialectDistributor;

// =============================================================================
// Re-exports - Import
// =============================================================================

pub use config::{CreatorConfig, CreatorKind, ImportConfig, ProviderConfig};

pub use diagnostics::{Diagnostic, Diagnostics, Severity};

pub use import::{
    ImportReport, ImportState, ImportStats, Importer, ReferenceData, StaticReferenceData,
};

pub use parser::{decode_content, detect_encoding, read_source, RowLayout, SourceText};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid, is_valid_bundle, validate, validate_bundle, validate_bundles};
