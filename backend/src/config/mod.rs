//! Import configuration.
//!
//! A run is described by one JSON document: the row layout, the reference
//! data (languages, parts of speech and their form slots) and one provider per
//! language with the creators bound to its columns.
//!
//! ```json
//! {
//!   "separator": "\t",
//!   "columnCount": 6,
//!   "minColumnCount": 2,
//!   "skipLines": [1],
//!   "posColumn": 0,
//!   "reference": { "languages": [...], "partsOfSpeech": [...] },
//!   "providers": [{
//!     "language": "nds",
//!     "orthographyId": 1,
//!     "defaultDialects": [7],
//!     "dialects": { "nds-wf": 2 },
//!     "creators": [{ "pos": "noun", "kind": "noun", "column": 1, "dialectColumn": 2 }]
//!   }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::creator::multi::DEFAULT_LEXEME_SEPARATOR;
use crate::creator::{MiscCreator, MultiCreator, NounCreator, NounNotation, VariantCreator, VerbCreator};
use crate::error::{ConfigError, ConfigResult};
use crate::models::Language;
use crate::parser::RowLayout;
use crate::slots::FormType;

/// Environment variable naming the config file when none is given.
pub const CONFIG_ENV: &str = "LEXLOAD_CONFIG";

fn default_separator() -> char {
    '\t'
}

fn default_lexeme_separator() -> char {
    DEFAULT_LEXEME_SEPARATOR
}

/// Complete configuration of an import run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportConfig {
    #[serde(default = "default_separator")]
    pub separator: char,
    pub column_count: usize,
    #[serde(default)]
    pub min_column_count: usize,
    /// 1-based line numbers to skip (headers, comments).
    #[serde(default)]
    pub skip_lines: BTreeSet<usize>,
    pub pos_column: usize,
    pub reference: ReferenceConfig,
    pub providers: Vec<ProviderConfig>,
}

/// Reference data the creators are resolved against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceConfig {
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub parts_of_speech: Vec<PosConfig>,
}

/// A part of speech with its form slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosConfig {
    pub id: i64,
    pub tag: String,
    #[serde(default)]
    pub slots: Vec<FormType>,
}

/// One language/provider: dialects and creators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub language: String,
    pub orthography_id: i64,
    #[serde(default)]
    pub default_dialects: BTreeSet<i64>,
    #[serde(default)]
    pub dialects: HashMap<String, i64>,
    pub creators: Vec<CreatorConfig>,
}

/// A creator bound to a part of speech and its columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorConfig {
    pub pos: String,
    #[serde(flatten)]
    pub kind: CreatorKind,
    pub column: usize,
    #[serde(default)]
    pub dialect_column: Option<usize>,
}

/// Which grammar a creator applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreatorKind {
    Noun {
        #[serde(default)]
        notation: NounNotation,
    },
    Verb,
    Misc,
    Multi {
        #[serde(default = "default_lexeme_separator")]
        separator: char,
        #[serde(default, rename = "allowMultiWord")]
        allow_multi_word: bool,
    },
}

impl CreatorConfig {
    /// Build the (uninitialised) creator.
    pub fn build(&self) -> Box<dyn VariantCreator> {
        match &self.kind {
            CreatorKind::Noun { notation } => {
                Box::new(NounCreator::new(&self.pos, self.column, *notation))
            }
            CreatorKind::Verb => Box::new(VerbCreator::new(&self.pos, self.column)),
            CreatorKind::Misc => Box::new(MiscCreator::new(&self.pos, self.column)),
            CreatorKind::Multi {
                separator,
                allow_multi_word,
            } => Box::new(
                MultiCreator::new(&self.pos, self.column)
                    .with_separator(*separator)
                    .with_multi_word(*allow_multi_word),
            ),
        }
    }
}

impl ImportConfig {
    /// Parse and check a config from JSON text.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    /// Load and check a config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Config path from the CLI, falling back to `LEXLOAD_CONFIG`.
    pub fn resolve_path(explicit: Option<&Path>) -> ConfigResult<PathBuf> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => std::env::var_os(CONFIG_ENV)
                .map(PathBuf::from)
                .ok_or(ConfigError::Missing),
        }
    }

    pub fn layout(&self) -> RowLayout {
        RowLayout {
            separator: self.separator,
            column_count: self.column_count,
            min_column_count: self.min_column_count,
        }
    }

    /// Every part-of-speech tag some provider has a creator for.
    pub fn configured_pos(&self) -> BTreeSet<&str> {
        self.providers
            .iter()
            .flat_map(|p| p.creators.iter().map(|c| c.pos.as_str()))
            .collect()
    }

    /// Structural consistency: widths, column indices, duplicate creators.
    pub fn check(&self) -> ConfigResult<()> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.column_count == 0 {
            return invalid("columnCount must be at least 1".into());
        }
        if self.min_column_count > self.column_count {
            return invalid(format!(
                "minColumnCount {} exceeds columnCount {}",
                self.min_column_count, self.column_count
            ));
        }
        if self.pos_column >= self.column_count {
            return invalid(format!("posColumn {} is outside the row", self.pos_column));
        }
        if self.skip_lines.contains(&0) {
            return invalid("skipLines are 1-based".into());
        }
        if self.providers.is_empty() {
            return invalid("at least one provider is required".into());
        }

        for provider in &self.providers {
            if provider.creators.is_empty() {
                return invalid(format!("provider '{}' has no creators", provider.language));
            }
            let mut seen = HashSet::new();
            for creator in &provider.creators {
                if !seen.insert(creator.pos.as_str()) {
                    return invalid(format!(
                        "provider '{}' has two creators for '{}'",
                        provider.language, creator.pos
                    ));
                }
                let columns = std::iter::once(creator.column).chain(creator.dialect_column);
                for column in columns {
                    if column >= self.column_count {
                        return invalid(format!(
                            "creator '{}' of '{}' uses column {} outside the row",
                            creator.pos, provider.language, column
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}
