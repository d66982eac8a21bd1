//! Lexload CLI - import dictionary source files as lexeme bundles
//!
//! # Main Commands
//!
//! ```bash
//! lexload import words.tsv --config import.json -o report.json   # Full import run
//! lexload check-config --config import.json                      # Load + initialise only
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! lexload parse-cell --pos noun "deev, deve ~ deven m"   # Parse one cell
//! lexload validate report.json                          # Validate bundles against schema
//! ```
//!
//! The config path falls back to `LEXLOAD_CONFIG`; a `.env` file is honoured.

use clap::{Parser, Subcommand, ValueEnum};
use lexload::logging::{init_logging, LogConfig, LogFormat};
use lexload::validation::validate_bundle_values;
use lexload::{
    validate_bundles, CreateContext, CreatorKind, DialectDistributor, Diagnostics, ImportConfig,
    Importer, InitError, NounNotation, ReferenceData, RowData, StaticReferenceData,
    TempIdSequence,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "lexload")]
#[command(about = "Parse dictionary source files into lexeme variants", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a source file: read, parse and build lexeme bundles
    Import {
        /// Input source file
        input: PathBuf,

        /// Import config (default: $LEXLOAD_CONFIG)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file for the JSON report (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write diagnostics as CSV
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Input encoding (auto-detect if not specified)
        #[arg(short, long)]
        encoding: Option<String>,

        /// Skip schema validation of the bundles
        #[arg(long)]
        no_validate: bool,
    },

    /// Parse a single cell with the configured creator and print the variants
    ParseCell {
        /// Part-of-speech tag selecting the creator
        #[arg(short, long)]
        pos: String,

        /// Override the noun notation
        #[arg(short, long, value_enum)]
        notation: Option<NotationArg>,

        /// Dialect cell to distribute over the variants
        #[arg(short, long)]
        dialects: Option<String>,

        /// Import config (default: $LEXLOAD_CONFIG)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Cell text
        cell: String,
    },

    /// Load the config and initialise every creator without reading input
    CheckConfig {
        /// Import config (default: $LEXLOAD_CONFIG)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate bundles (a report or an array of bundles) against the schema
    Validate {
        /// Input JSON file
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum NotationArg {
    GenusSuffix,
    ArticlePrefix,
}

impl From<NotationArg> for NounNotation {
    fn from(arg: NotationArg) -> Self {
        match arg {
            NotationArg::GenusSuffix => NounNotation::GenusSuffix,
            NotationArg::ArticlePrefix => NounNotation::ArticlePrefix,
        }
    }
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose).with_format(cli.log_format);
    if let Err(e) = init_logging(&log_config) {
        eprintln!("⚠️  Logging disabled: {}", e);
    }

    let result = match cli.command {
        Commands::Import {
            input,
            config,
            output,
            report,
            encoding,
            no_validate,
        } => cmd_import(
            &input,
            config.as_deref(),
            output.as_deref(),
            report.as_deref(),
            encoding,
            no_validate,
        ),

        Commands::ParseCell {
            pos,
            notation,
            dialects,
            config,
            cell,
        } => cmd_parse_cell(config.as_deref(), &pos, notation, dialects.as_deref(), &cell),

        Commands::CheckConfig { config } => cmd_check_config(config.as_deref()),

        Commands::Validate { input } => cmd_validate(&input),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<ImportConfig, Box<dyn std::error::Error>> {
    let path = ImportConfig::resolve_path(path)?;
    eprintln!("⚙️  Config: {}", path.display());
    Ok(ImportConfig::load(&path)?)
}

fn cmd_import(
    input: &Path,
    config_path: Option<&Path>,
    output: Option<&Path>,
    report_path: Option<&Path>,
    encoding: Option<String>,
    no_validate: bool,
) -> CliResult {
    eprintln!("📄 Importing: {}", input.display());

    let config = load_config(config_path)?;
    let mut importer = Importer::new(config).with_encoding(encoding);
    let outcome = importer.run(input);

    if let Some(path) = report_path {
        importer.diagnostics().write_csv(fs::File::create(path)?)?;
        eprintln!("   💾 Diagnostics written to: {}", path.display());
    }

    let report = importer.into_report();
    outcome?;

    let stats = &report.stats;
    eprintln!("   Run: {}", report.run_id);
    eprintln!("   Encoding: {}", report.encoding.as_deref().unwrap_or("-"));
    eprintln!(
        "   Lines: {} read, {} skipped, {} blank",
        stats.lines_read, stats.skipped_lines, stats.blank_lines
    );
    eprintln!(
        "   Rows: {} accepted, {} rejected, {} filtered, {} failed",
        stats.rows_accepted, stats.rows_rejected, stats.rows_filtered, stats.rows_failed
    );
    eprintln!(
        "\n⚙️  Built: {} bundles, {} variants",
        stats.bundles, stats.variants
    );

    if !report.diagnostics.is_empty() {
        eprintln!("\n📋 Diagnostics ({}):", report.diagnostics.len());
        for diagnostic in report.diagnostics.iter().take(10) {
            eprintln!("   {}", diagnostic);
        }
        if report.diagnostics.len() > 10 {
            eprintln!("   ... {} more", report.diagnostics.len() - 10);
        }
    }

    if !no_validate {
        let failures = validate_bundles(&report.bundles).map_err(|e| e.join("; "))?;
        eprintln!("\n✔️  Validation:");
        if failures.is_empty() {
            eprintln!("   ✅ All {} bundles valid!", report.bundles.len());
        } else {
            eprintln!("   ❌ Invalid: {}", failures.len());
            for (i, errors) in failures.iter().take(5) {
                eprintln!("\n   Bundle {} (line {}):", i, report.bundles[*i].line_number);
                for err in errors.iter().take(3) {
                    eprintln!("     - {}", err);
                }
            }
        }
    }

    let json = serde_json::to_string_pretty(&report)?;
    write_output(&json, output)?;

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_parse_cell(
    config_path: Option<&Path>,
    pos: &str,
    notation: Option<NotationArg>,
    dialects: Option<&str>,
    cell: &str,
) -> CliResult {
    let config = load_config(config_path)?;

    let (provider, creator_config) = config
        .providers
        .iter()
        .find_map(|p| p.creators.iter().find(|c| c.pos == pos).map(|c| (p, c)))
        .ok_or_else(|| format!("no creator configured for part of speech '{pos}'"))?;

    let mut creator_config = creator_config.clone();
    if let (Some(arg), CreatorKind::Noun { notation }) = (notation, &mut creator_config.kind) {
        *notation = arg.into();
    }

    let reference = StaticReferenceData::from_config(&config.reference);
    let slots = reference
        .form_slots(pos)
        .ok_or_else(|| InitError::NoFormSlots(pos.to_string()))?;
    let mut creator = creator_config.build();
    creator.initialise(&slots)?;

    let mut cells = vec![String::new(); config.column_count];
    cells[config.pos_column] = pos.to_string();
    cells[creator_config.column] = cell.to_string();
    if let (Some(text), Some(column)) = (dialects, creator_config.dialect_column) {
        cells[column] = text.to_string();
    }
    let row = RowData::new(1, cells, config.column_count);

    let ids = TempIdSequence::new();
    let mut diagnostics = Diagnostics::new();
    let label = format!("{}/{}", provider.language, pos);
    let mut lexemes = {
        let mut ctx = CreateContext::new(label, provider.orthography_id, &ids, &mut diagnostics);
        creator.create_lexemes(&mut ctx, &row)?
    };

    let distributor =
        DialectDistributor::new(provider.dialects.clone(), provider.default_dialects.clone());
    for variants in &mut lexemes {
        distributor.distribute(variants, &row, creator_config.dialect_column)?;
    }

    for diagnostic in diagnostics.entries() {
        eprintln!("   {}", diagnostic);
    }
    println!("{}", serde_json::to_string_pretty(&lexemes)?);
    Ok(())
}

fn cmd_check_config(config_path: Option<&Path>) -> CliResult {
    let config = load_config(config_path)?;
    let pos_count = config.configured_pos().len();
    let providers: Vec<(String, usize)> = config
        .providers
        .iter()
        .map(|p| (p.language.clone(), p.creators.len()))
        .collect();

    let mut importer = Importer::new(config);
    importer.initialise()?;

    for (language, creators) in providers {
        eprintln!("   {}: {} creators", language, creators);
    }
    eprintln!("✅ Config valid: {} parts of speech", pos_count);
    Ok(())
}

fn cmd_validate(input: &Path) -> CliResult {
    eprintln!("✔️  Validating: {}", input.display());

    let content = fs::read_to_string(input)?;
    let values = match serde_json::from_str::<Value>(&content)? {
        Value::Array(values) => values,
        Value::Object(mut report) => match report.remove("bundles") {
            Some(Value::Array(values)) => values,
            _ => return Err("object has no 'bundles' array".into()),
        },
        _ => return Err("expected a report or an array of bundles".into()),
    };

    let failures = validate_bundle_values(&values).map_err(|e| e.join("; "))?;
    for (i, errors) in failures.iter().take(5) {
        eprintln!("\n❌ Bundle {} invalid:", i);
        for err in errors.iter().take(3) {
            eprintln!("   - {}", err);
        }
    }

    eprintln!(
        "\n📊 Results: {} valid, {} invalid",
        values.len() - failures.len(),
        failures.len()
    );

    if !failures.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> CliResult {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
