//! The [`Rule`] trait and what a rule returns.

use crate::context::FileContext;
use crate::types::{Severity, SkippedFile, Violation};

/// What a [`Rule`] produced for one file.
#[derive(Debug, Default)]
pub struct RuleOutput {
    /// Violations found in the file.
    pub violations: Vec<Violation>,
    /// Files that could not be parsed while checking this one.
    ///
    /// This may include the checked file itself or any file the rule
    /// visited on its behalf.
    pub skipped: Vec<SkippedFile>,
}

impl RuleOutput {
    /// Creates an empty output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Output consisting of a single skipped file.
    #[must_use]
    pub fn skipped(file: SkippedFile) -> Self {
        Self {
            violations: Vec::new(),
            skipped: vec![file],
        }
    }
}

impl From<Vec<Violation>> for RuleOutput {
    fn from(violations: Vec<Violation>) -> Self {
        Self {
            violations,
            skipped: Vec::new(),
        }
    }
}

/// A per-file lint rule.
///
/// Rules receive the source text of one file and may parse it with whatever
/// grammar they need. Rule state is built once per run and shared read-only
/// across files.
///
/// # Example
///
/// ```ignore
/// use import_lint_core::{FileContext, Rule, RuleOutput};
///
/// pub struct NoDefaultExport;
///
/// impl Rule for NoDefaultExport {
///     fn name(&self) -> &'static str { "no-default-export" }
///     fn code(&self) -> &'static str { "NDE001" }
///
///     fn check(&self, ctx: &FileContext) -> RuleOutput {
///         find_default_exports(ctx).into()
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Kebab-case name. Also the key of the rule's `[rules.<name>]` table.
    fn name(&self) -> &'static str;

    /// Short code shown next to each violation.
    fn code(&self) -> &'static str;

    /// One line for `list-rules`.
    fn description(&self) -> &'static str {
        ""
    }

    /// Severity used when the config sets none.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// True if the rule attaches [`Replacement`](crate::Replacement)s.
    fn fixable(&self) -> bool {
        false
    }

    /// Lints one file. Failures to parse are reported in
    /// [`RuleOutput::skipped`], never as panics or errors.
    fn check(&self, ctx: &FileContext) -> RuleOutput;
}

/// How the analyzer stores rules.
pub type RuleBox = Box<dyn Rule>;
