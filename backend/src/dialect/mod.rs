//! Dialect distribution over the variants of one cell.
//!
//! | dialect cell | variants | result                                          |
//! |--------------|----------|-------------------------------------------------|
//! | blank        | any      | default set on every variant                    |
//! | `a, b`       | 1        | mapped set; `~` is an error                     |
//! | `a ~ b, c`   | n > 1    | exactly n groups, group i on variant i          |
//!
//! A blank group falls back to the default set for its variant. An unmapped
//! name fails the whole cell, so a variant never ends up with a partial set.

use std::collections::{BTreeSet, HashMap};

use crate::creator::utils::{map_dialects, split_dialect_groups, ALTERNATIVE_SEPARATOR};
use crate::error::{CreateError, CreateResult};
use crate::models::{RowData, Variant};

/// Dialect lookup and defaults for one provider.
#[derive(Debug, Clone, Default)]
pub struct DialectDistributor {
    lookup: HashMap<String, i64>,
    default_ids: BTreeSet<i64>,
}

impl DialectDistributor {
    pub fn new(lookup: HashMap<String, i64>, default_ids: BTreeSet<i64>) -> Self {
        Self {
            lookup,
            default_ids,
        }
    }

    /// Assign dialect ids to `variants` from `column` of `row`. With no
    /// dialect column every variant gets the default set.
    ///
    /// Nothing is assigned unless the whole cell maps.
    pub fn distribute(
        &self,
        variants: &mut [Variant],
        row: &RowData,
        column: Option<usize>,
    ) -> CreateResult<()> {
        let cell = column.map(|c| row.column(c).trim()).unwrap_or("");
        let sets = self.resolve(cell, variants.len())?;
        for (variant, ids) in variants.iter_mut().zip(sets) {
            variant.dialect_ids = Some(ids);
        }
        Ok(())
    }

    /// One dialect set per variant for a dialect cell.
    pub fn resolve(&self, cell: &str, variants: usize) -> CreateResult<Vec<BTreeSet<i64>>> {
        if cell.trim().is_empty() {
            return Ok(vec![self.default_ids.clone(); variants]);
        }

        if variants == 1 {
            if cell.contains(ALTERNATIVE_SEPARATOR) {
                return Err(CreateError::TildeInSingleVariantDialects(cell.to_string()));
            }
            return Ok(vec![self.resolve_group(cell)?]);
        }

        let groups = split_dialect_groups(cell);
        if groups.len() != variants {
            return Err(CreateError::DialectGroupMismatch {
                groups: groups.len(),
                variants,
            });
        }
        groups
            .into_iter()
            .map(|group| self.resolve_group(group))
            .collect()
    }

    fn resolve_group(&self, group: &str) -> CreateResult<BTreeSet<i64>> {
        let ids = map_dialects(group, &self.lookup)?;
        if ids.is_empty() {
            Ok(self.default_ids.clone())
        } else {
            Ok(ids)
        }
    }
}
