//! End-to-end import runs over temporary source files.

use lexload::models::{PROP_AUXILIARIES, PROP_GENERA};
use lexload::{
    validate_bundles, FormState, ImportConfig, ImportError, ImportReport, ImportState, Importer,
    LexemeBundle, ParseError, Severity, Variant,
};
use std::collections::BTreeSet;
use std::io::Write;
use tempfile::NamedTempFile;

const CONFIG: &str = r#"{
    "separator": "\t",
    "columnCount": 3,
    "minColumnCount": 2,
    "skipLines": [1],
    "posColumn": 0,
    "reference": {
        "languages": [{ "id": 1, "code": "nds", "name": "Low Saxon" }],
        "partsOfSpeech": [
            { "id": 1, "tag": "noun", "slots": [
                { "id": 10, "name": "singular", "position": 1 },
                { "id": 11, "name": "plural", "position": 2 }
            ]},
            { "id": 2, "tag": "verb", "slots": [
                { "id": 20, "name": "infinitive", "position": 1 },
                { "id": 21, "name": "infinitive_divided", "position": 2 },
                { "id": 22, "name": "present_3sg", "position": 3 },
                { "id": 23, "name": "preterite_3sg", "position": 4 },
                { "id": 24, "name": "participle", "position": 5 }
            ]},
            { "id": 3, "tag": "interj", "slots": [
                { "id": 30, "name": "base", "position": 1 }
            ]}
        ]
    },
    "providers": [{
        "language": "nds",
        "orthographyId": 4,
        "defaultDialects": [7],
        "dialects": { "nds-wf": 2, "nds-nns": 4 },
        "creators": [
            { "pos": "noun", "kind": "noun", "column": 1, "dialectColumn": 2 },
            { "pos": "verb", "kind": "verb", "column": 1, "dialectColumn": 2 },
            { "pos": "interj", "kind": "multi", "column": 1 }
        ]
    }]
}"#;

const SINGULAR: i64 = 10;
const PLURAL: i64 = 11;

fn source_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

fn import(lines: &[&str]) -> ImportReport {
    let file = source_file(lines);
    let mut importer = Importer::new(ImportConfig::from_json(CONFIG).unwrap());
    importer.run(file.path()).unwrap();
    importer.into_report()
}

/// Import a single data row below the header.
fn import_row(row: &str) -> ImportReport {
    import(&["pos\ttext\tdialects", row])
}

fn only_bundle(report: &ImportReport) -> &LexemeBundle {
    assert_eq!(report.bundles.len(), 1, "diagnostics: {:?}", report.diagnostics);
    &report.bundles[0]
}

fn text(variant: &Variant, form_type: i64) -> Option<&str> {
    variant.form(form_type).map(|f| f.text.as_str())
}

#[test]
fn example_a_noun_with_parenthesised_genus() {
    let report = import_row("noun\tbyspil (n)\t");
    let bundle = only_bundle(&report);

    assert_eq!(bundle.variants.len(), 1);
    let variant = &bundle.variants[0];
    assert!(variant.main);
    assert_eq!(variant.property(PROP_GENERA), vec!["n"]);
    assert_eq!(variant.lexeme_forms.len(), 1);
    assert_eq!(text(variant, SINGULAR), Some("byspil"));
    assert_eq!(variant.orthography_id, 4);
}

#[test]
fn example_b_shared_singular_across_plural_alternatives() {
    let report = import_row("noun\tdeev, deve ~ deven m\t");
    let bundle = only_bundle(&report);

    assert_eq!(bundle.variants.len(), 2);
    let plurals: Vec<_> = bundle.variants.iter().map(|v| text(v, PLURAL)).collect();
    assert_eq!(plurals, vec![Some("deve"), Some("deven")]);
    for variant in &bundle.variants {
        assert_eq!(text(variant, SINGULAR), Some("deev"));
        assert_eq!(variant.property(PROP_GENERA), vec!["m"]);
    }
    assert_eq!(bundle.variants.iter().filter(|v| v.main).count(), 1);
    assert!(bundle.variants[0].main);
}

#[test]
fn example_c_blank_dialect_cell_uses_default_set() {
    let report = import_row("noun\tdeev, deve ~ deven m\t");
    for variant in &only_bundle(&report).variants {
        assert_eq!(variant.dialect_ids, Some(BTreeSet::from([7])));
    }
}

#[test]
fn example_d_dialect_groups_assigned_positionally() {
    let report = import_row("noun\tdeev, deve ~ deven m\tnds-wf~nds-nns");
    let variants = &only_bundle(&report).variants;

    assert_eq!(variants[0].dialect_ids, Some(BTreeSet::from([2])));
    assert_eq!(variants[1].dialect_ids, Some(BTreeSet::from([4])));
}

#[test]
fn example_e_separable_verb_with_auxiliary_marker() {
    let report = import_row("verb\tacht|geaven, givt acht, gaev acht, het achtgeaven\t");
    let bundle = only_bundle(&report);

    assert_eq!(bundle.variants.len(), 1);
    let verb = &bundle.variants[0];
    assert_eq!(text(verb, 20), Some("achtgeaven"));
    assert_eq!(text(verb, 21), Some("acht|geaven"));
    assert_eq!(text(verb, 22), Some("givt acht"));
    assert_eq!(text(verb, 23), Some("gaev acht"));
    assert_eq!(text(verb, 24), Some("achtgeaven"));
    assert_eq!(verb.property(PROP_AUXILIARIES), vec!["hevven"]);
    assert_eq!(verb.form(20).unwrap().state, FormState::Generated);
    assert_eq!(verb.form(21).unwrap().state, FormState::Typed);
}

#[test]
fn unknown_pos_rejects_only_that_row() {
    let good = import(&["pos\ttext\tdialects", "noun\thuus, huser\t"]);
    let mixed = import(&["pos\ttext\tdialects", "pronoun\tik\t", "noun\thuus, huser\t"]);

    let errors: Vec<_> = mixed
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line, 2);
    assert!(errors[0].message.contains("pronoun"));

    assert_eq!(mixed.bundles.len(), 1);
    assert_eq!(mixed.bundles[0].line_number, 3);
    assert_eq!(mixed.bundles[0].variants[0].lexeme_forms, good.bundles[0].variants[0].lexeme_forms);
}

#[test]
fn malformed_rows_become_diagnostics() {
    let report = import(&[
        "pos\ttext\tdialects",
        "noun\thuus, huser, husen\t",
        "noun\tdeev, deve ~ deven m\tnds-wf",
        "noun\tbook (x)\t",
        "verb\tgaan, geiht\t",
        "noun\tbyspil (n)\t",
    ]);

    assert_eq!(report.state, ImportState::Done);
    assert_eq!(report.error_count(), 4);
    assert_eq!(report.stats.rows_failed, 4);
    assert_eq!(report.bundles.len(), 1);
    assert_eq!(report.bundles[0].line_number, 6);

    let lines: Vec<_> = report.diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![2, 3, 4, 5]);
    assert_eq!(report.diagnostics[1].column, Some(2));
}

#[test]
fn skipped_blank_and_short_lines() {
    let report = import(&[
        "pos\ttext\tdialects",
        "",
        "noun",
        "   ",
        "noun\tbyspil (n)",
    ]);

    assert_eq!(report.stats.skipped_lines, 1);
    assert_eq!(report.stats.blank_lines, 2);
    assert_eq!(report.stats.rows_rejected, 1);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].line, 3);
    assert!(report.diagnostics[0].message.contains("at least 2"));

    let bundle = only_bundle(&report);
    assert_eq!(bundle.variants[0].dialect_ids, Some(BTreeSet::from([7])));
}

#[test]
fn multi_lexeme_cell_yields_one_bundle_per_part() {
    let report = import_row("interj\tmoin; tschüss ~ tschüüs; goden dag");

    assert_eq!(report.bundles.len(), 3);
    assert_eq!(report.bundles[1].variants.len(), 2);
    assert!(report.bundles.iter().all(|b| b.main_variant().is_some()));
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].severity, Severity::Warning);
}

#[test]
fn missing_input_aborts_the_run() {
    let mut importer = Importer::new(ImportConfig::from_json(CONFIG).unwrap());
    let err = importer
        .run(std::path::Path::new("/nonexistent/lexload/words.tsv"))
        .unwrap_err();

    assert!(matches!(err, ImportError::Parse(ParseError::Io { .. })));
    assert_eq!(importer.state(), ImportState::Aborted);
    assert!(importer.into_report().bundles.is_empty());
}

#[test]
fn latin1_source_with_explicit_encoding() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"pos\ttext\n").unwrap();
    file.write_all(b"noun\tpl\xF6\xF6g, pl\xF6\xF6ge (m)\n").unwrap();

    let mut importer = Importer::new(ImportConfig::from_json(CONFIG).unwrap())
        .with_encoding(Some("latin1".to_string()));
    importer.run(file.path()).unwrap();
    let report = importer.into_report();

    let variant = &only_bundle(&report).variants[0];
    assert_eq!(text(variant, SINGULAR), Some("plöög"));
    assert_eq!(text(variant, PLURAL), Some("plööge"));
    assert_eq!(variant.property(PROP_GENERA), vec!["m"]);
}

#[test]
fn latin1_source_detected_without_encoding() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"pos\ttext\n").unwrap();
    file.write_all(b"noun\tpl\xF6\xF6g, pl\xF6\xF6ge (m)\n").unwrap();

    let mut importer = Importer::new(ImportConfig::from_json(CONFIG).unwrap());
    importer.run(file.path()).unwrap();
    let report = importer.into_report();

    let encoding = report.encoding.as_deref().unwrap();
    assert!(encoding == "iso-8859-1" || encoding == "windows-1252", "detected {encoding}");
    let variant = &only_bundle(&report).variants[0];
    assert_eq!(text(variant, SINGULAR), Some("plöög"));
    assert_eq!(text(variant, PLURAL), Some("plööge"));
}

#[test]
fn separator_only_lines_count_as_blank() {
    let config = CONFIG.replace(r#""separator": "\t""#, r#""separator": ";""#);
    let file = source_file(&[
        "pos;text;dialects",
        "noun;huus, huser;",
        ";;",
        " ; ; ",
        "noun;byspil (n);",
    ]);
    let mut importer = Importer::new(ImportConfig::from_json(&config).unwrap());
    importer.run(file.path()).unwrap();
    let report = importer.into_report();

    assert_eq!(report.stats.blank_lines, 2);
    assert_eq!(report.stats.rows_rejected, 0);
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    let lines: Vec<_> = report.bundles.iter().map(|b| b.line_number).collect();
    assert_eq!(lines, vec![2, 5]);
}

#[test]
fn config_loaded_from_file() {
    let mut config_file = NamedTempFile::new().unwrap();
    config_file.write_all(CONFIG.as_bytes()).unwrap();

    let config = ImportConfig::load(config_file.path()).unwrap();
    assert_eq!(config.providers[0].creators.len(), 3);
}

#[test]
fn bundles_pass_schema_and_diagnostics_export() {
    let file = source_file(&[
        "pos\ttext\tdialects",
        "noun\tdeev, deve ~ deven m\tnds-wf~nds-nns",
        "noun\thuus, huser\tnds-xx",
        "verb\tlopen, löppt, leep, lopen (het, is)\t",
    ]);
    let mut importer = Importer::new(ImportConfig::from_json(CONFIG).unwrap());
    importer.run(file.path()).unwrap();

    let mut csv = Vec::new();
    importer.diagnostics().write_csv(&mut csv).unwrap();
    let csv = String::from_utf8(csv).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("severity,line,column,context,message"));
    assert!(lines.next().unwrap().starts_with("error,3,2,nds/noun,"));

    let report = importer.into_report();
    assert_eq!(report.bundles.len(), 2);
    assert!(validate_bundles(&report.bundles).unwrap().is_empty());

    let json = serde_json::to_string(&report).unwrap();
    let back: ImportReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back.run_id, report.run_id);
    assert_eq!(back.bundles, report.bundles);
}
