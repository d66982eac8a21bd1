//! JSON Schema validation of lexeme bundles.
//!
//! Bundles are checked against the embedded `schemas/lexeme-bundle.json`
//! (JSON Schema Draft 7) before they are handed to persistence. The schema
//! pins down what the creators guarantee: negative temporary ids, at least one
//! main variant, distributed dialects, non-empty forms within the length limit.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use lexload::validation::validate;
//!
//! let schema = json!({
//!     "type": "object",
//!     "required": ["name"],
//!     "properties": { "name": { "type": "string" } }
//! });
//!
//! assert!(validate(&schema, &json!({ "name": "test" })).is_ok());
//! assert!(validate(&schema, &json!({ "age": 42 })).is_err());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::models::LexemeBundle;

static BUNDLE_SCHEMA: Lazy<Result<Value, String>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/lexeme-bundle.json"))
        .map_err(|e| format!("invalid embedded schema: {e}"))
});

/// Per-bundle validation errors: (bundle index, messages).
pub type BundleErrors = Vec<(usize, Vec<String>)>;

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` when valid
/// * `Err(Vec<String>)` with every error otherwise
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator =
        jsonschema::draft7::new(schema).map_err(|e| vec![format!("invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Just true/false.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// The embedded bundle schema.
pub fn bundle_schema() -> Result<&'static Value, Vec<String>> {
    BUNDLE_SCHEMA.as_ref().map_err(|e| vec![e.clone()])
}

/// Validate one serialised bundle.
pub fn validate_bundle(data: &Value) -> Result<(), Vec<String>> {
    validate(bundle_schema()?, data)
}

/// Quick check of one serialised bundle.
pub fn is_valid_bundle(data: &Value) -> bool {
    bundle_schema().is_ok_and(|schema| is_valid(schema, data))
}

/// Validate serialised bundles, compiling the schema once. Only failing
/// bundles are listed. `Err` means the schema itself is broken.
pub fn validate_bundle_values(values: &[Value]) -> Result<BundleErrors, Vec<String>> {
    let validator = jsonschema::draft7::new(bundle_schema()?)
        .map_err(|e| vec![format!("invalid schema: {}", e)])?;

    Ok(values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let errors: Vec<String> = validator.iter_errors(value).map(|e| e.to_string()).collect();
            (!errors.is_empty()).then_some((index, errors))
        })
        .collect())
}

/// Validate bundles produced by an import run.
pub fn validate_bundles(bundles: &[LexemeBundle]) -> Result<BundleErrors, Vec<String>> {
    let mut values = Vec::with_capacity(bundles.len());
    let mut failures = Vec::new();
    for (index, bundle) in bundles.iter().enumerate() {
        match serde_json::to_value(bundle) {
            Ok(value) => values.push((index, value)),
            Err(e) => failures.push((index, vec![e.to_string()])),
        }
    }

    let (indices, values): (Vec<usize>, Vec<Value>) = values.into_iter().unzip();
    let checked = validate_bundle_values(&values)?;
    failures.extend(checked.into_iter().map(|(i, errors)| (indices[i], errors)));
    failures.sort_by_key(|(index, _)| *index);
    Ok(failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FormState, LexemeForm, PendingAction, Properties, Variant};
    use serde_json::json;
    use std::collections::BTreeSet;

    fn bundle(text: &str) -> LexemeBundle {
        let mut variant = Variant::new(
            -1,
            1,
            true,
            vec![LexemeForm::new(10, text, FormState::Typed)],
            Properties::new(),
        );
        variant.dialect_ids = Some(BTreeSet::from([7]));
        LexemeBundle {
            language_id: 1,
            language: "nds".into(),
            pos: "noun".into(),
            line_number: 2,
            action: PendingAction::Insert,
            variants: vec![variant],
        }
    }

    #[test]
    fn test_embedded_schema_loads() {
        assert!(bundle_schema().is_ok());
    }

    #[test]
    fn test_generic_validate() {
        let schema = json!({
            "type": "object",
            "required": ["name"],
            "properties": { "name": { "type": "string" } }
        });
        assert!(validate(&schema, &json!({ "name": "test" })).is_ok());
        assert!(!is_valid(&schema, &json!({ "age": 42 })));
    }

    #[test]
    fn test_valid_bundle() {
        let value = serde_json::to_value(bundle("byspil")).unwrap();
        assert!(is_valid_bundle(&value));
        assert!(validate_bundle(&value).is_ok());
    }

    #[test]
    fn test_undistributed_dialects_rejected() {
        let mut b = bundle("byspil");
        b.variants[0].dialect_ids = None;
        let value = serde_json::to_value(b).unwrap();
        assert!(!is_valid_bundle(&value));
    }

    #[test]
    fn test_bundle_without_main_rejected() {
        let mut b = bundle("byspil");
        b.variants[0].main = false;
        let errors = validate_bundle(&serde_json::to_value(b).unwrap()).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_positive_id_rejected() {
        let value = json!({
            "languageId": 1,
            "language": "nds",
            "pos": "noun",
            "lineNumber": 1,
            "action": "insert",
            "variants": [{
                "id": 5,
                "orthographyId": 1,
                "main": true,
                "dialectIds": [],
                "lexemeForms": [{ "variantId": 5, "formTypeId": 1, "text": "x", "state": "typed" }],
                "properties": {},
                "active": true,
                "action": "insert"
            }]
        });
        assert!(!is_valid_bundle(&value));
    }

    #[test]
    fn test_validate_bundles_lists_failures() {
        let bundles = vec![bundle("huus"), bundle(&"a".repeat(101)), bundle("deev")];
        let failures = validate_bundles(&bundles).unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, 1);
    }
}
