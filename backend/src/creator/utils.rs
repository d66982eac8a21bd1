//! Shared string primitives for the variant grammar.
//!
//! - structural part splitting on top-level commas
//! - positional `~` alternative extraction
//! - dialect group splitting and name mapping

use std::collections::{BTreeSet, HashMap};

use crate::error::{CreateError, CreateResult};

/// Separator between structural parts of a cell.
pub const PART_SEPARATOR: char = ',';

/// Separator between alternative spellings (and dialect groups).
pub const ALTERNATIVE_SEPARATOR: char = '~';

/// Split off a trailing parenthesized block: `"byspil (f, n)"` gives
/// `("byspil", "f, n")`. `None` when the text does not end with one.
pub fn split_trailing_parenthetical(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_end();
    if !text.ends_with(')') {
        return None;
    }
    let open = text.rfind(" (")?;
    Some((text[..open].trim_end(), &text[open + 2..text.len() - 1]))
}

/// Split a cell into its structural parts.
///
/// A cell with no top-level comma is a single part. Commas inside a trailing
/// parenthesized block do not count; the block stays attached to the last
/// part. A genuinely multi-part cell must have exactly `expected` parts.
pub fn split_parts(cell: &str, expected: usize) -> CreateResult<Vec<String>> {
    let cell = cell.trim();
    let (head, tail) = match cell.rfind(" (") {
        Some(open) if cell.ends_with(')') => cell.split_at(open),
        _ => (cell, ""),
    };

    if !head.contains(PART_SEPARATOR) {
        return Ok(vec![cell.to_string()]);
    }

    let mut parts: Vec<String> = head
        .split(PART_SEPARATOR)
        .map(|p| p.trim().to_string())
        .collect();
    if parts.len() != expected {
        return Err(CreateError::PartCount {
            expected,
            found: parts.len(),
        });
    }
    if let Some(last) = parts.last_mut() {
        last.push_str(tail);
    }
    Ok(parts)
}

/// Number of `~` alternatives in a part.
pub fn alternative_count(part: &str) -> usize {
    part.split(ALTERNATIVE_SEPARATOR).count()
}

/// Largest alternative count over all parts; this is the number of variants
/// a cell yields.
pub fn max_alternatives<S: AsRef<str>>(parts: &[S]) -> usize {
    parts
        .iter()
        .map(|p| alternative_count(p.as_ref()))
        .max()
        .unwrap_or(0)
}

/// The `index`-th alternative of a part, trimmed.
///
/// A part without `~` is shared by every alternative index. A part with
/// alternatives must have one at `index`.
pub fn alternative(part: &str, index: usize) -> CreateResult<String> {
    let alternatives: Vec<&str> = part.split(ALTERNATIVE_SEPARATOR).collect();
    let chosen = if alternatives.len() == 1 {
        alternatives[0]
    } else {
        alternatives
            .get(index)
            .copied()
            .ok_or_else(|| CreateError::AlternativeOutOfRange {
                part: part.to_string(),
                index,
                available: alternatives.len(),
            })?
    };

    let chosen = chosen.trim();
    if chosen.is_empty() {
        return Err(CreateError::EmptyAlternative(part.to_string()));
    }
    Ok(chosen.to_string())
}

/// Split a dialect cell into `~` groups (untrimmed).
pub fn split_dialect_groups(cell: &str) -> Vec<&str> {
    cell.split(ALTERNATIVE_SEPARATOR).collect()
}

/// Comma-separated names of a group, trimmed, blanks dropped.
pub fn split_names(group: &str) -> Vec<&str> {
    group
        .split(PART_SEPARATOR)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Map every dialect name of a group to its id. One unknown name fails the
/// whole group.
pub fn map_dialects(group: &str, lookup: &HashMap<String, i64>) -> CreateResult<BTreeSet<i64>> {
    split_names(group)
        .into_iter()
        .map(|name| {
            lookup
                .get(name)
                .copied()
                .ok_or_else(|| CreateError::UnknownDialect(name.to_string()))
        })
        .collect()
}
