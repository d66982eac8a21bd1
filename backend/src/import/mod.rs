//! Import driver: source rows to lexeme bundles.
//!
//! The driver is a small state machine:
//!
//! ```text
//! Uninitialized ──initialise──▶ Initialised ──read──▶ Reading ──build──▶ Building ──▶ Done
//!        └──────────────┴───────────── fatal error ───────────┴──────────────────▶ Aborted
//! ```
//!
//! Only run-level faults (unreadable input, misconfiguration) abort. Anything
//! wrong with a single row becomes a diagnostic for that row and the run
//! carries on with the next one.

pub mod reference;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::ImportConfig;
use crate::creator::{CreateContext, TempIdSequence, VariantCreator};
use crate::diagnostics::{Diagnostic, Diagnostics, Severity};
use crate::dialect::DialectDistributor;
use crate::error::{CreateError, ImportError, ImportResult, InitError, RowError};
use crate::models::{Language, LexemeBundle, PendingAction, RowData, Variant};
use crate::parser::{decode_source, read_source, SourceText};
use crate::slots::TypeFormMap;

pub use reference::{ReferenceData, StaticReferenceData};

/// Context label for diagnostics raised before any creator runs.
pub const READER_CONTEXT: &str = "reader";

/// Predicate deciding whether an accepted row is built. Rejected rows are
/// dropped without a diagnostic.
pub type RowFilter = Box<dyn Fn(&RowData) -> bool + Send + Sync>;

// =============================================================================
// State and report
// =============================================================================

/// Lifecycle of an import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportState {
    Uninitialized,
    Initialised,
    Reading,
    Building,
    Done,
    Aborted,
}

impl ImportState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportState::Uninitialized => "Uninitialized",
            ImportState::Initialised => "Initialised",
            ImportState::Reading => "Reading",
            ImportState::Building => "Building",
            ImportState::Done => "Done",
            ImportState::Aborted => "Aborted",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, ImportState::Done | ImportState::Aborted)
    }
}

impl fmt::Display for ImportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    /// Non-blank, non-skipped lines.
    pub lines_read: usize,
    pub blank_lines: usize,
    pub skipped_lines: usize,
    pub rows_accepted: usize,
    /// Rows refused while reading (too short, unknown part of speech).
    pub rows_rejected: usize,
    pub rows_filtered: usize,
    /// Accepted rows that failed to build.
    pub rows_failed: usize,
    pub bundles: usize,
    pub variants: usize,
}

/// Everything a run produced, ready to hand to persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub source: Option<String>,
    pub encoding: Option<String>,
    pub state: ImportState,
    pub stats: ImportStats,
    pub bundles: Vec<LexemeBundle>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ImportReport {
    pub fn is_success(&self) -> bool {
        self.state == ImportState::Done
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }
}

// =============================================================================
// Providers
// =============================================================================

#[derive(Debug)]
struct BoundCreator {
    creator: Box<dyn VariantCreator>,
    dialect_column: Option<usize>,
}

/// One language with its initialised creators, keyed by part of speech.
#[derive(Debug)]
struct Provider {
    language: Language,
    orthography_id: i64,
    distributor: DialectDistributor,
    creators: HashMap<String, BoundCreator>,
}

impl Provider {
    /// Run the creator and distribute dialects. Errors carry the column they
    /// belong to.
    fn create(
        &self,
        bound: &BoundCreator,
        label: &str,
        ids: &TempIdSequence,
        diagnostics: &mut Diagnostics,
        row: &RowData,
    ) -> Result<Vec<Vec<Variant>>, (usize, CreateError)> {
        let column = bound.creator.column();
        let mut ctx = CreateContext::new(label, self.orthography_id, ids, diagnostics);
        let mut lexemes = bound
            .creator
            .create_lexemes(&mut ctx, row)
            .map_err(|e| (column, e))?;

        let dialect_column = bound.dialect_column.unwrap_or(column);
        for variants in &mut lexemes {
            self.distributor
                .distribute(variants, row, bound.dialect_column)
                .map_err(|e| (dialect_column, e))?;
        }
        Ok(lexemes)
    }
}

/// Build all bundles of one row. A failing creator records an error and the
/// row contributes nothing.
fn build_row(
    providers: &[Provider],
    ids: &TempIdSequence,
    diagnostics: &mut Diagnostics,
    pos_column: usize,
    row: &RowData,
) -> Option<Vec<LexemeBundle>> {
    let pos = row.column(pos_column);
    let mut bundles = Vec::new();

    for provider in providers {
        let Some(bound) = provider.creators.get(pos) else {
            continue;
        };
        let label = format!("{}/{}", provider.language.code, pos);

        match provider.create(bound, &label, ids, diagnostics, row) {
            Ok(lexemes) => bundles.extend(lexemes.into_iter().map(|variants| LexemeBundle {
                language_id: provider.language.id,
                language: provider.language.code.clone(),
                pos: pos.to_string(),
                line_number: row.line_number(),
                action: PendingAction::Insert,
                variants,
            })),
            Err((column, err)) => {
                diagnostics.push(
                    Diagnostic::error(label, row.line_number(), err.to_string())
                        .with_column(column),
                );
                return None;
            }
        }
    }
    Some(bundles)
}

// =============================================================================
// Driver
// =============================================================================

/// Drives one import run through its states.
pub struct Importer {
    config: ImportConfig,
    reference: Box<dyn ReferenceData>,
    state: ImportState,
    providers: Vec<Provider>,
    ids: TempIdSequence,
    encoding: Option<String>,
    row_filter: Option<RowFilter>,
    rows: Vec<RowData>,
    bundles: Vec<LexemeBundle>,
    diagnostics: Diagnostics,
    stats: ImportStats,
    run_id: Uuid,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    source: Option<String>,
    source_encoding: Option<String>,
}

impl Importer {
    /// Importer serving reference data from the config itself.
    pub fn new(config: ImportConfig) -> Self {
        let reference = StaticReferenceData::from_config(&config.reference);
        Self {
            config,
            reference: Box::new(reference),
            state: ImportState::Uninitialized,
            providers: Vec::new(),
            ids: TempIdSequence::new(),
            encoding: None,
            row_filter: None,
            rows: Vec::new(),
            bundles: Vec::new(),
            diagnostics: Diagnostics::new(),
            stats: ImportStats::default(),
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            source: None,
            source_encoding: None,
        }
    }

    /// Replace the reference data source.
    pub fn with_reference(mut self, reference: impl ReferenceData + 'static) -> Self {
        self.reference = Box::new(reference);
        self
    }

    /// Force an input encoding instead of detecting it.
    pub fn with_encoding(mut self, encoding: Option<String>) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_id_sequence(mut self, ids: TempIdSequence) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_row_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&RowData) -> bool + Send + Sync + 'static,
    {
        self.row_filter = Some(Box::new(filter));
        self
    }

    pub fn state(&self) -> ImportState {
        self.state
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn stats(&self) -> &ImportStats {
        &self.stats
    }

    pub fn bundles(&self) -> &[LexemeBundle] {
        &self.bundles
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Rows accepted by `read` and not built yet.
    pub fn pending_rows(&self) -> &[RowData] {
        &self.rows
    }

    // -------------------------------------------------------------------------
    // Steps
    // -------------------------------------------------------------------------

    /// Resolve form slots and languages, then initialise every creator.
    pub fn initialise(&mut self) -> ImportResult<()> {
        self.expect_state("initialise", ImportState::Uninitialized)?;

        match self.resolve_providers() {
            Ok(providers) => {
                info!(
                    run_id = %self.run_id,
                    providers = providers.len(),
                    creators = providers.iter().map(|p| p.creators.len()).sum::<usize>(),
                    "import initialised"
                );
                self.providers = providers;
                self.state = ImportState::Initialised;
                Ok(())
            }
            Err(err) => Err(self.abort(err)),
        }
    }

    /// Read and split the source file.
    pub fn read(&mut self, path: &Path) -> ImportResult<()> {
        self.expect_state("read", ImportState::Initialised)?;
        self.state = ImportState::Reading;
        self.source = Some(path.display().to_string());
        info!(run_id = %self.run_id, path = %path.display(), "reading source");

        match read_source(path, self.encoding.as_deref()) {
            Ok(source) => {
                self.accept_source(&source);
                Ok(())
            }
            Err(err) => Err(self.abort(err)),
        }
    }

    /// Read source content already in memory.
    pub fn read_bytes(&mut self, bytes: &[u8]) -> ImportResult<()> {
        self.expect_state("read", ImportState::Initialised)?;
        self.state = ImportState::Reading;

        match decode_source(bytes, self.encoding.as_deref()) {
            Ok(source) => {
                self.accept_source(&source);
                Ok(())
            }
            Err(err) => Err(self.abort(err)),
        }
    }

    /// Run the creators over every accepted row.
    pub fn build(&mut self) -> ImportResult<()> {
        self.expect_state("build", ImportState::Reading)?;
        self.state = ImportState::Building;

        let rows = std::mem::take(&mut self.rows);
        debug!(run_id = %self.run_id, rows = rows.len(), "building rows");

        for row in &rows {
            let built = build_row(
                &self.providers,
                &self.ids,
                &mut self.diagnostics,
                self.config.pos_column,
                row,
            );
            match built {
                Some(bundles) => {
                    self.stats.bundles += bundles.len();
                    self.stats.variants += bundles.iter().map(|b| b.variants.len()).sum::<usize>();
                    self.bundles.extend(bundles);
                }
                None => self.stats.rows_failed += 1,
            }
        }

        self.state = ImportState::Done;
        self.finished_at = Some(Utc::now());
        info!(
            run_id = %self.run_id,
            rows = self.stats.rows_accepted,
            failed = self.stats.rows_failed,
            bundles = self.stats.bundles,
            variants = self.stats.variants,
            errors = self.diagnostics.count(Severity::Error),
            warnings = self.diagnostics.count(Severity::Warning),
            "import finished"
        );
        Ok(())
    }

    /// `initialise`, `read` and `build` in one go.
    pub fn run(&mut self, path: &Path) -> ImportResult<()> {
        self.initialise()?;
        self.read(path)?;
        self.build()
    }

    pub fn into_report(self) -> ImportReport {
        ImportReport {
            run_id: self.run_id,
            started_at: self.started_at,
            finished_at: self.finished_at,
            source: self.source,
            encoding: self.source_encoding,
            state: self.state,
            stats: self.stats,
            bundles: self.bundles,
            diagnostics: self.diagnostics.entries().to_vec(),
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn expect_state(&self, step: &'static str, expected: ImportState) -> ImportResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ImportError::InvalidState {
                step,
                expected: expected.as_str(),
                actual: self.state.as_str(),
            })
        }
    }

    fn abort(&mut self, err: impl Into<ImportError>) -> ImportError {
        let err = err.into();
        error!(run_id = %self.run_id, state = %self.state, "import aborted: {err}");
        self.state = ImportState::Aborted;
        self.finished_at = Some(Utc::now());
        err
    }

    fn resolve_providers(&self) -> Result<Vec<Provider>, InitError> {
        let mut forms = TypeFormMap::new();
        for pos in self.config.configured_pos() {
            let pair = self
                .reference
                .form_slots(pos)
                .ok_or_else(|| InitError::NoFormSlots(pos.to_string()))?;
            forms.insert(pair);
        }

        let mut providers = Vec::with_capacity(self.config.providers.len());
        for provider in &self.config.providers {
            let language = self
                .reference
                .language(&provider.language)
                .ok_or_else(|| InitError::UnknownLanguage(provider.language.clone()))?;

            let mut creators = HashMap::new();
            for creator_config in &provider.creators {
                let mut creator = creator_config.build();
                creator.initialise(forms.require(&creator_config.pos)?)?;
                debug!(
                    language = %language.code,
                    pos = %creator_config.pos,
                    column = creator_config.column,
                    "creator initialised"
                );
                creators.insert(
                    creator_config.pos.clone(),
                    BoundCreator {
                        creator,
                        dialect_column: creator_config.dialect_column,
                    },
                );
            }

            providers.push(Provider {
                language,
                orthography_id: provider.orthography_id,
                distributor: DialectDistributor::new(
                    provider.dialects.clone(),
                    provider.default_dialects.clone(),
                ),
                creators,
            });
        }
        Ok(providers)
    }

    fn accept_source(&mut self, source: &SourceText) {
        self.source_encoding = Some(source.encoding.clone());
        let layout = self.config.layout();
        let pos_column = self.config.pos_column;
        let known: BTreeSet<String> = self
            .config
            .configured_pos()
            .into_iter()
            .map(str::to_string)
            .collect();

        for (line_number, line) in source.numbered_lines() {
            if self.config.skip_lines.contains(&line_number) {
                self.stats.skipped_lines += 1;
                continue;
            }
            if layout.is_blank(line) {
                self.stats.blank_lines += 1;
                continue;
            }
            self.stats.lines_read += 1;

            let row = match layout.split(line_number, line) {
                Ok(row) => row,
                Err(err) => {
                    self.reject(line_number, None, err);
                    continue;
                }
            };

            let pos = row.column(pos_column);
            if !known.contains(pos) {
                let err = RowError::UnknownPos(pos.to_string());
                self.reject(line_number, Some(pos_column), err);
                continue;
            }

            if let Some(filter) = &self.row_filter {
                if !filter(&row) {
                    self.stats.rows_filtered += 1;
                    continue;
                }
            }

            self.stats.rows_accepted += 1;
            self.rows.push(row);
        }

        info!(
            run_id = %self.run_id,
            encoding = %source.encoding,
            lines = self.stats.lines_read,
            accepted = self.stats.rows_accepted,
            rejected = self.stats.rows_rejected,
            "source read"
        );
    }

    fn reject(&mut self, line: usize, column: Option<usize>, err: RowError) {
        self.stats.rows_rejected += 1;
        match column {
            Some(column) => self.diagnostics.push(
                Diagnostic::error(READER_CONTEXT, line, err.to_string()).with_column(column),
            ),
            None => self.diagnostics.error(READER_CONTEXT, line, err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::SAMPLE;
    use crate::error::ParseError;
    use crate::models::PROP_GENERA;
    use crate::slots::TypeFormPair;

    const SOURCE: &str = "pos\ttext\tdialects\n\
        noun\tbyspil (n)\t\n\
        \n\
        pronoun\tik\t\n\
        noun\tdeev, deve ~ deven m\tnds-wf~nds-nns\n\
        noun\thuus, huser\tnds-xx\n\
        adj\tgoot ~ good\t\n\
        x\n\
        interj\tmoin; tschüss\t\n";

    fn config() -> ImportConfig {
        ImportConfig::from_json(SAMPLE).unwrap()
    }

    fn imported() -> Importer {
        let mut importer = Importer::new(config());
        importer.initialise().unwrap();
        importer.read_bytes(SOURCE.as_bytes()).unwrap();
        importer.build().unwrap();
        importer
    }

    #[test]
    fn test_full_run_counters() {
        let importer = imported();
        assert_eq!(importer.state(), ImportState::Done);

        let stats = importer.stats();
        assert_eq!(stats.skipped_lines, 1);
        assert_eq!(stats.blank_lines, 1);
        assert_eq!(stats.lines_read, 7);
        assert_eq!(stats.rows_accepted, 5);
        assert_eq!(stats.rows_rejected, 2);
        assert_eq!(stats.rows_failed, 1);
        assert_eq!(stats.bundles, 5);
        assert_eq!(stats.variants, 7);
    }

    #[test]
    fn test_bad_rows_do_not_stop_the_run() {
        let importer = imported();
        let diagnostics = importer.diagnostics();

        let unknown_pos = diagnostics.for_line(4);
        assert_eq!(unknown_pos.len(), 1);
        assert_eq!(unknown_pos[0].context, READER_CONTEXT);
        assert_eq!(unknown_pos[0].column, Some(0));

        let dialect = diagnostics.for_line(6);
        assert_eq!(dialect.len(), 1);
        assert_eq!(dialect[0].context, "nds/noun");
        assert_eq!(dialect[0].column, Some(2));
        assert!(dialect[0].message.contains("nds-xx"));

        assert_eq!(diagnostics.for_line(8).len(), 1);

        let lines: Vec<_> = importer.bundles().iter().map(|b| b.line_number).collect();
        assert_eq!(lines, vec![2, 5, 7, 9, 9]);
    }

    #[test]
    fn test_bundles_carry_language_and_dialects() {
        let importer = imported();
        let bundles = importer.bundles();

        let byspil = &bundles[0];
        assert_eq!(byspil.language, "nds");
        assert_eq!(byspil.language_id, 1);
        assert_eq!(byspil.pos, "noun");
        assert_eq!(byspil.variants.len(), 1);
        assert_eq!(byspil.variants[0].dialect_ids, Some(BTreeSet::from([7])));
        assert_eq!(byspil.variants[0].property(PROP_GENERA), vec!["n"]);

        let deev = &bundles[1];
        assert_eq!(deev.variants[0].dialect_ids, Some(BTreeSet::from([2])));
        assert_eq!(deev.variants[1].dialect_ids, Some(BTreeSet::from([4])));
        assert!(deev.main_variant().unwrap().main);
    }

    #[test]
    fn test_variant_ids_unique_across_run() {
        let importer = imported();
        let mut ids: Vec<i64> = importer
            .bundles()
            .iter()
            .flat_map(|b| b.variants.iter().map(|v| v.id))
            .collect();
        assert!(ids.iter().all(|id| *id < 0));
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 7);
    }

    #[test]
    fn test_row_filter_drops_silently() {
        let mut importer = Importer::new(config()).with_row_filter(|row| row.column(0) != "adj");
        importer.initialise().unwrap();
        importer.read_bytes(SOURCE.as_bytes()).unwrap();

        assert_eq!(importer.stats().rows_filtered, 1);
        assert_eq!(importer.pending_rows().len(), 4);
        assert_eq!(importer.diagnostics().len(), 2);
    }

    #[test]
    fn test_steps_out_of_order() {
        let mut importer = Importer::new(config());
        let err = importer.build().unwrap_err();
        assert!(matches!(
            err,
            ImportError::InvalidState {
                step: "build",
                expected: "Reading",
                actual: "Uninitialized"
            }
        ));
        assert_eq!(importer.state(), ImportState::Uninitialized);

        importer.initialise().unwrap();
        assert!(importer.initialise().is_err());
        assert_eq!(importer.state(), ImportState::Initialised);
    }

    #[test]
    fn test_missing_form_slots_abort() {
        let mut config = config();
        config.reference.parts_of_speech.retain(|p| p.tag != "verb");
        let mut importer = Importer::new(config);

        let err = importer.initialise().unwrap_err();
        assert!(matches!(err, ImportError::Init(InitError::NoFormSlots(ref pos)) if pos == "verb"));
        assert_eq!(importer.state(), ImportState::Aborted);
    }

    #[test]
    fn test_unknown_language_aborts() {
        let mut config = config();
        config.reference.languages.clear();
        let mut importer = Importer::new(config);

        assert!(matches!(
            importer.initialise(),
            Err(ImportError::Init(InitError::UnknownLanguage(_)))
        ));
        assert_eq!(importer.state(), ImportState::Aborted);
    }

    #[test]
    fn test_unreadable_source_aborts() {
        let mut importer = Importer::new(config());
        importer.initialise().unwrap();

        let err = importer.read(Path::new("/nonexistent/words.tsv")).unwrap_err();
        assert!(matches!(err, ImportError::Parse(ParseError::Io { .. })));
        assert_eq!(importer.state(), ImportState::Aborted);
        assert!(importer.state().is_finished());

        let report = importer.into_report();
        assert!(!report.is_success());
        assert!(report.finished_at.is_some());
    }

    #[test]
    fn test_report_serialises() {
        let report = imported().into_report();
        assert!(report.is_success());
        assert_eq!(report.error_count(), 3);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["state"], "done");
        assert_eq!(json["stats"]["rowsAccepted"], 5);
        assert_eq!(json["bundles"][0]["action"], "insert");
    }

    #[test]
    fn test_seeded_id_sequence() {
        let mut importer =
            Importer::new(config()).with_id_sequence(TempIdSequence::starting_at(-1000));
        importer.initialise().unwrap();
        importer.read_bytes(b"pos\ttext\nnoun\tbyspil (n)\n").unwrap();
        importer.build().unwrap();
        assert_eq!(importer.bundles()[0].variants[0].id, -1000);
    }

    /// Serves the config's slots but language ids from another table.
    struct RenumberedLanguages(StaticReferenceData);

    impl ReferenceData for RenumberedLanguages {
        fn form_slots(&self, pos: &str) -> Option<TypeFormPair> {
            self.0.form_slots(pos)
        }

        fn language(&self, code: &str) -> Option<Language> {
            self.0.language(code).map(|language| Language { id: 42, ..language })
        }
    }

    #[test]
    fn test_custom_reference_data() {
        let config = config();
        let reference = RenumberedLanguages(StaticReferenceData::from_config(&config.reference));
        let mut importer = Importer::new(config).with_reference(reference);
        importer.initialise().unwrap();
        importer.read_bytes(b"pos\ttext\nnoun\tbyspil (n)\n").unwrap();
        assert!(!importer.state().is_finished());
        importer.build().unwrap();

        assert!(importer.state().is_finished());
        assert_eq!(importer.bundles()[0].language_id, 42);
        assert_eq!(importer.bundles()[0].language, "nds");
    }
}
