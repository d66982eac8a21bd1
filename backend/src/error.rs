//! Error types for the Lexload import pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`ParseError`] - Input file reading and decoding errors (run-aborting)
//! - [`RowError`] - Row-level rejections before parsing
//! - [`ConfigError`] - Configuration loading errors
//! - [`InitError`] - Misconfiguration detected while initialising creators
//! - [`CreateError`] - Cell parsing errors (row-rejecting)
//! - [`ImportError`] - Top-level driver errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Input Parsing Errors
// =============================================================================

/// Errors while reading the delimited source file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// File could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content could not be decoded.
    #[error("failed to decode input as {encoding}")]
    Encoding { encoding: String },
}

// =============================================================================
// Row Errors
// =============================================================================

/// Reasons a row is rejected before any creator runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    /// Fewer cells than the configured minimum.
    #[error("row has {found} columns, at least {min} required")]
    TooShort { found: usize, min: usize },

    /// Part-of-speech cell names no configured creator.
    #[error("no creator configured for part of speech '{0}'")]
    UnknownPos(String),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading an import configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration path was given and `LEXLOAD_CONFIG` is unset.
    #[error("no configuration given (use --config or LEXLOAD_CONFIG)")]
    Missing,

    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config JSON is malformed.
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Config is well-formed but inconsistent.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// =============================================================================
// Initialisation Errors
// =============================================================================

/// Misconfiguration found while resolving reference data or initialising
/// creators. Always fatal for the run.
#[derive(Debug, Error)]
pub enum InitError {
    /// A configured part of speech has no form slots.
    #[error("no form slots configured for part of speech '{0}'")]
    NoFormSlots(String),

    /// A creator needs a slot its part of speech does not define.
    #[error("part of speech '{pos}' has no form slot '{slot}'")]
    MissingSlot { pos: String, slot: String },

    /// Provider references an unknown language.
    #[error("unknown language '{0}'")]
    UnknownLanguage(String),

    /// `initialise` was called twice on the same creator.
    #[error("creator for '{0}' is already initialised")]
    AlreadyInitialised(String),
}

// =============================================================================
// Cell Parsing Errors
// =============================================================================

/// Errors raised while parsing one cell into variants.
///
/// These reject the row they occur in; the run continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateError {
    /// Multi-part cell with the wrong number of parts.
    #[error("expected {expected} comma-separated parts, found {found}")]
    PartCount { expected: usize, found: usize },

    /// Part has fewer `~` alternatives than the cell needs.
    #[error("part '{part}' has {available} alternatives, alternative {index} requested")]
    AlternativeOutOfRange {
        part: String,
        index: usize,
        available: usize,
    },

    /// An alternative is blank after trimming.
    #[error("empty alternative in '{0}'")]
    EmptyAlternative(String),

    /// Genus tag outside the allow-list.
    #[error("unknown genus '{0}'")]
    UnknownGenus(String),

    /// Auxiliary tag outside the allow-list.
    #[error("unknown auxiliary '{0}'")]
    UnknownAuxiliary(String),

    /// Singular form without one of the expected articles.
    #[error("missing article in '{0}'")]
    MissingArticle(String),

    /// Plural part with more than one elision dash.
    #[error("more than one '-' in plural '{0}'")]
    MultipleElisions(String),

    /// Dialect name without a mapping.
    #[error("unknown dialect '{0}'")]
    UnknownDialect(String),

    /// `~` in a dialect cell for a single variant.
    #[error("dialect cell '{0}' contains '~' but only one variant was produced")]
    TildeInSingleVariantDialects(String),

    /// Dialect groups do not line up with the variants.
    #[error("{groups} dialect groups for {variants} variants")]
    DialectGroupMismatch { groups: usize, variants: usize },

    /// Form text above the hard maximum length.
    #[error("form '{text}' is {length} characters long (maximum {max})")]
    FormTooLong {
        text: String,
        length: usize,
        max: usize,
    },
}

// =============================================================================
// Import Errors (top-level)
// =============================================================================

/// Top-level import driver errors.
///
/// Any of these moves the driver to `Aborted`; per-row problems never surface
/// here, they become diagnostics.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Input file error.
    #[error("input error: {0}")]
    Parse(#[from] ParseError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Initialisation error.
    #[error("initialisation error: {0}")]
    Init(#[from] InitError),

    /// A driver step was called in the wrong state.
    #[error("cannot {step} in state {actual} (expected {expected})")]
    InvalidState {
        step: &'static str,
        expected: &'static str,
        actual: &'static str,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for input parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for creator initialisation.
pub type InitResult<T> = Result<T, InitError>;

/// Result type for cell parsing.
pub type CreateResult<T> = Result<T, CreateError>;

/// Result type for import runs.
pub type ImportResult<T> = Result<T, ImportError>;
