//! Violations, fixes, and the aggregate result of a run.

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

/// How seriously a violation is reported. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Reported, never fails the run.
    Info,
    /// Should be addressed, but does not fail the run.
    Warning,
    /// Makes the CLI exit non-zero.
    Error,
}

impl Severity {
    /// Lowercase name, as used in config files and output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a violation points: a 1-based line/column for humans plus a byte
/// span for fixes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Path relative to the analyzed root.
    pub file: PathBuf,
    /// 1-based line.
    pub line: usize,
    /// 1-based column, in bytes.
    pub column: usize,
    /// Start of the span in bytes.
    pub offset: usize,
    /// Span length in bytes. Zero for a point location.
    pub length: usize,
}

impl Location {
    /// A point location with an empty span.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            offset: 0,
            length: 0,
        }
    }

    /// Attaches the byte span `offset..offset + length`.
    #[must_use]
    pub fn with_span(self, offset: usize, length: usize) -> Self {
        Self {
            offset,
            length,
            ..self
        }
    }

    /// The span as a range into the file's bytes.
    #[must_use]
    pub fn byte_range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// Advice attached to a violation, optionally with a machine-applicable edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Text shown as help.
    pub message: String,
    /// Edit applied by `--fix`.
    pub replacement: Option<Replacement>,
}

impl Suggestion {
    /// Help text only.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            replacement: None,
        }
    }

    /// Help text plus an edit.
    #[must_use]
    pub fn with_fix(message: impl Into<String>, replacement: Replacement) -> Self {
        Self {
            replacement: Some(replacement),
            ..Self::new(message)
        }
    }
}

/// Replace the bytes covered by `location` with `new_text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replacement {
    /// Span being replaced.
    pub location: Location,
    /// Text written in its place.
    pub new_text: String,
}

impl Replacement {
    /// Creates a replacement over `location`'s span.
    #[must_use]
    pub fn new(location: Location, new_text: impl Into<String>) -> Self {
        Self {
            location,
            new_text: new_text.into(),
        }
    }

    /// The range of original bytes this edit removes.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.location.byte_range()
    }
}

/// One finding of one rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Short rule code, e.g. `TCI001`.
    pub code: String,
    /// Rule name, e.g. `no-trigger-core-import`.
    pub rule: String,
    /// Severity after config overrides.
    pub severity: Severity,
    /// The offending statement.
    pub location: Location,
    /// Rendered message.
    pub message: String,
    /// Stable id of the message template, for tooling that matches on it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Help text and an optional fix.
    pub suggestion: Option<Suggestion>,
}

impl Violation {
    /// A violation with no message id and no suggestion.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            severity,
            location,
            message: message.into(),
            message_id: None,
            suggestion: None,
        }
    }

    /// Sets [`Violation::message_id`].
    #[must_use]
    pub fn with_message_id(self, id: impl Into<String>) -> Self {
        Self {
            message_id: Some(id.into()),
            ..self
        }
    }

    /// Sets [`Violation::suggestion`].
    #[must_use]
    pub fn with_suggestion(self, suggestion: Suggestion) -> Self {
        Self {
            suggestion: Some(suggestion),
            ..self
        }
    }

    /// The edit `--fix` would apply, if any.
    #[must_use]
    pub fn fix(&self) -> Option<&Replacement> {
        self.suggestion.as_ref()?.replacement.as_ref()
    }
}

/// `file:line:col: severity [CODE] message`, with a `(fixable)` marker.
impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Location {
            file, line, column, ..
        } = &self.location;
        write!(
            f,
            "{}:{line}:{column}: {} [{}] {}",
            file.display(),
            self.severity,
            self.code,
            self.message
        )?;
        if self.fix().is_some() {
            f.write_str(" (fixable)")?;
        }
        Ok(())
    }
}

/// A [`Violation`] bound to its file's text so miette can draw the snippet.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("[{code}] {message}")]
pub struct ViolationDiagnostic {
    code: String,
    message: String,
    #[help]
    help: Option<String>,
    #[source_code]
    src: NamedSource<String>,
    #[label("{rule}")]
    span: SourceSpan,
    rule: String,
}

impl ViolationDiagnostic {
    /// `source` is the full text of the violation's file. The help block shows
    /// the proposed replacement under the suggestion text.
    #[must_use]
    pub fn new(violation: &Violation, source: String) -> Self {
        let help = violation
            .suggestion
            .as_ref()
            .map(|s| match &s.replacement {
                Some(r) => format!("{}\n\n{}", s.message, r.new_text),
                None => s.message.clone(),
            });
        let Location { offset, length, .. } = violation.location;
        Self {
            code: violation.code.clone(),
            message: violation.message.clone(),
            help,
            src: NamedSource::new(violation.location.file.display().to_string(), source),
            span: SourceSpan::from((offset, length)),
            rule: violation.rule.clone(),
        }
    }
}

/// A file that could not be parsed, reported once at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkippedFile {
    /// The file, relative to the analyzed root when possible.
    pub path: PathBuf,
    /// Parser message.
    pub reason: String,
}

impl SkippedFile {
    /// Records `path` as skipped for `reason`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Violation totals per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    /// [`Severity::Error`] violations.
    pub errors: usize,
    /// [`Severity::Warning`] violations.
    pub warnings: usize,
    /// [`Severity::Info`] violations.
    pub infos: usize,
}

/// Everything one analyzer run produced.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// Sorted by file, then line, then column.
    pub violations: Vec<Violation>,
    /// Files handed to the rules.
    pub files_checked: usize,
    /// Linted files or resolution dependencies that failed to parse.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedFile>,
}

impl LintResult {
    /// An empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when at least one violation is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == Severity::Error)
    }

    /// Tallies violations by severity.
    #[must_use]
    pub fn counts(&self) -> SeverityCounts {
        self.violations
            .iter()
            .fold(SeverityCounts::default(), |mut acc, v| {
                match v.severity {
                    Severity::Error => acc.errors += 1,
                    Severity::Warning => acc.warnings += 1,
                    Severity::Info => acc.infos += 1,
                }
                acc
            })
    }

    /// Violations `--fix` can resolve.
    #[must_use]
    pub fn fixable_count(&self) -> usize {
        self.violations.iter().filter(|v| v.fix().is_some()).count()
    }

    /// Folds another partial result into this one.
    pub fn extend(&mut self, other: Self) {
        self.violations.extend(other.violations);
        self.skipped.extend(other.skipped);
        self.files_checked += other.files_checked;
    }
}
