//! Inline grammatical metadata embedded in cells.
//!
//! - genus: trailing ` f` / ` m` / ` n`, a trailing `(f, m)` list, or an article
//! - auxiliary verb: leading `het ` / `is `, or a trailing `(het, is)` list

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

use super::utils::{split_names, split_trailing_parenthetical};
use crate::error::{CreateError, CreateResult};

/// Genus tags accepted on nouns.
pub const NOUN_GENERA: &[&str] = &["f", "m", "n"];

/// Finite auxiliary forms recognised as a leading participle marker.
const LEADING_AUXILIARIES: &[&str] = &["het", "hett", "is", "sünd"];

/// Auxiliary spellings mapped to their canonical verb.
static AUXILIARIES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("het", "hevven"),
        ("hett", "hevven"),
        ("hebben", "hevven"),
        ("hevven", "hevven"),
        ("is", "wesen"),
        ("sünd", "wesen"),
        ("wesen", "wesen"),
        ("ween", "wesen"),
    ])
});

static ARTICLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<article>de\(n\)|dat|de)\s+(?P<text>\S.*)$").expect("valid article pattern")
});

/// Strip genus metadata from the end of `text`.
///
/// Tags in a trailing parenthetical must all be in `allowed`; a trailing
/// single token is only taken as genus when it is in `allowed`.
pub fn extract_genus(text: &str, allowed: &[&str]) -> CreateResult<(String, BTreeSet<String>)> {
    if let Some((head, inner)) = split_trailing_parenthetical(text) {
        let mut genera = BTreeSet::new();
        for tag in split_names(inner) {
            if !allowed.contains(&tag) {
                return Err(CreateError::UnknownGenus(tag.to_string()));
            }
            genera.insert(tag.to_string());
        }
        return Ok((head.to_string(), genera));
    }

    let trimmed = text.trim();
    if let Some((head, last)) = trimmed.rsplit_once(char::is_whitespace) {
        if allowed.contains(&last) && !head.trim().is_empty() {
            return Ok((head.trim_end().to_string(), BTreeSet::from([last.to_string()])));
        }
    }
    Ok((trimmed.to_string(), BTreeSet::new()))
}

/// Strip a leading article and return the genus it implies.
///
/// `de(n)` marks masculine, `dat` neuter and a bare `de` feminine nouns.
pub fn strip_article(text: &str) -> CreateResult<(String, &'static str)> {
    let caps = ARTICLE
        .captures(text.trim())
        .ok_or_else(|| CreateError::MissingArticle(text.trim().to_string()))?;
    let genus = match &caps["article"] {
        "de(n)" => "m",
        "dat" => "n",
        _ => "f",
    };
    Ok((caps["text"].trim().to_string(), genus))
}

/// Canonical auxiliary for a tag.
pub fn canonical_auxiliary(tag: &str) -> CreateResult<&'static str> {
    AUXILIARIES
        .get(tag)
        .copied()
        .ok_or_else(|| CreateError::UnknownAuxiliary(tag.to_string()))
}

/// Strip a leading auxiliary marker (`het achtgeaven`).
pub fn strip_leading_auxiliary(text: &str) -> (String, Option<&'static str>) {
    let text = text.trim();
    match text.split_once(' ') {
        Some((first, rest)) if LEADING_AUXILIARIES.contains(&first) && !rest.trim().is_empty() => {
            (rest.trim().to_string(), AUXILIARIES.get(first).copied())
        }
        _ => (text.to_string(), None),
    }
}

/// Strip a trailing auxiliary list (`... (het, is)`). Every tag must map.
pub fn extract_auxiliary_list(text: &str) -> CreateResult<(String, BTreeSet<String>)> {
    match split_trailing_parenthetical(text) {
        Some((head, inner)) => {
            let auxiliaries = split_names(inner)
                .into_iter()
                .map(|tag| canonical_auxiliary(tag).map(str::to_string))
                .collect::<CreateResult<BTreeSet<_>>>()?;
            Ok((head.to_string(), auxiliaries))
        }
        None => Ok((text.trim().to_string(), BTreeSet::new())),
    }
}
