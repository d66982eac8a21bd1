//! Diagnostics collected during an import run.
//!
//! Every stage writes into one [`Diagnostics`] collector: context-keyed,
//! severity-tagged records in the order they were raised. Each record is also
//! emitted as a `tracing` event so a run can be followed live.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A single diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Context label, e.g. `nds/noun` or `reader`.
    pub context: String,
    pub line: usize,
    #[serde(default)]
    pub column: Option<usize>,
}

impl Diagnostic {
    pub fn warning(context: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, context, line, message)
    }

    pub fn error(context: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, context, line, message)
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    fn new(
        severity: Severity,
        context: impl Into<String>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            context: context.into(),
            line,
            column: None,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.column {
            Some(col) => write!(
                f,
                "[{}] {} line {}, column {}: {}",
                self.severity.as_str(),
                self.context,
                self.line,
                col,
                self.message
            ),
            None => write!(
                f,
                "[{}] {} line {}: {}",
                self.severity.as_str(),
                self.context,
                self.line,
                self.message
            ),
        }
    }
}

/// Ordered diagnostics sink.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and mirror it to `tracing`.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        let Diagnostic {
            severity,
            message,
            context,
            line,
            column,
        } = &diagnostic;
        match severity {
            Severity::Info => {
                tracing::info!(context = %context, line, column = ?column, "{message}")
            }
            Severity::Warning => {
                tracing::warn!(context = %context, line, column = ?column, "{message}")
            }
            Severity::Error => {
                tracing::error!(context = %context, line, column = ?column, "{message}")
            }
        }
        self.entries.push(diagnostic);
    }

    pub fn warning(&mut self, context: &str, line: usize, message: impl Into<String>) {
        self.push(Diagnostic::warning(context, line, message));
    }

    pub fn error(&mut self, context: &str, line: usize, message: impl Into<String>) {
        self.push(Diagnostic::error(context, line, message));
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// Diagnostics raised for one source line.
    pub fn for_line(&self, line: usize) -> Vec<&Diagnostic> {
        self.entries.iter().filter(|d| d.line == line).collect()
    }

    /// Diagnostics grouped by context label, each group in raise order.
    pub fn by_context(&self) -> BTreeMap<&str, Vec<&Diagnostic>> {
        let mut grouped: BTreeMap<&str, Vec<&Diagnostic>> = BTreeMap::new();
        for diagnostic in &self.entries {
            grouped
                .entry(diagnostic.context.as_str())
                .or_default()
                .push(diagnostic);
        }
        grouped
    }

    /// Append everything from `other`, keeping order. Entries were already
    /// traced when first pushed.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// Write all records as CSV: severity, line, column, context, message.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(["severity", "line", "column", "context", "message"])?;
        for d in &self.entries {
            let column = d.column.map(|c| c.to_string()).unwrap_or_default();
            out.write_record([
                d.severity.as_str(),
                &d.line.to_string(),
                &column,
                &d.context,
                &d.message,
            ])?;
        }
        out.flush()?;
        Ok(())
    }
}
