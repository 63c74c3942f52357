//! File discovery and the per-file rule loop.

use crate::config::Config;
use crate::context::FileContext;
use crate::rule::{Rule, RuleBox};
use crate::types::{LintResult, SkippedFile, Violation};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a run could not complete. Per-file parse failures are not errors;
/// they end up in [`LintResult::skipped`].
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// A discovered file could not be read, or the working directory is gone.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error walking the source tree.
    #[error("Failed to walk {root}: {source}")]
    Walk {
        /// Root directory being walked.
        root: PathBuf,
        /// Underlying walker error.
        source: ignore::Error,
    },

    /// An exclude pattern is not a valid glob.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),
}

/// Collects the root, rules, and excludes for an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
}

impl AnalyzerBuilder {
    /// No root, no rules, default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory to walk. Defaults to `[analyzer] root`.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Registers a rule.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Registers an already boxed rule.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds an exclude glob on top of `[analyzer] exclude`.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Config used for discovery, enablement, and severity overrides.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Resolves the root against the working directory and compiles excludes.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined or an
    /// exclude pattern is not a valid glob.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let root = match self.root {
            Some(root) => root,
            None => config.analyzer.root.clone(),
        };
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(root)
        };

        let exclude = self
            .exclude_patterns
            .iter()
            .chain(&config.analyzer.exclude)
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Analyzer {
            root,
            rules: self.rules,
            exclude,
            config,
        })
    }
}

/// Runs a fixed set of rules over every lintable file under a root.
///
/// Built with [`Analyzer::builder()`]. A run never mutates files, so the
/// same analyzer can re-check after fixes are written.
pub struct Analyzer {
    root: PathBuf,
    rules: Vec<RuleBox>,
    exclude: Vec<glob::Pattern>,
    config: Config,
}

impl Analyzer {
    /// Shorthand for [`AnalyzerBuilder::new`].
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Absolute root. Violation paths are relative to it.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Registered rules, enabled or not.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Lints every discovered file. Violations come back sorted by location,
    /// skipped files de-duplicated by path.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails or a file cannot be read.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        let files = self.discover_files()?;
        info!("Analyzing {} file(s) under {}", files.len(), self.root.display());

        let mut result = LintResult::new();
        let mut skipped: BTreeMap<PathBuf, String> = BTreeMap::new();

        for path in &files {
            let (violations, file_skipped) = self.analyze_file(path)?;
            result.violations.extend(violations);
            result.files_checked += 1;
            for s in file_skipped {
                skipped.entry(s.path).or_insert(s.reason);
            }
        }

        result.skipped = skipped
            .into_iter()
            .map(|(path, reason)| SkippedFile { path, reason })
            .collect();

        result.violations.sort_by(|a, b| position(a).cmp(&position(b)));

        info!(
            "{} violation(s), {} skipped file(s)",
            result.violations.len(),
            result.skipped.len()
        );

        Ok(result)
    }

    /// Runs every enabled rule on a single file.
    fn analyze_file(
        &self,
        path: &Path,
    ) -> Result<(Vec<Violation>, Vec<SkippedFile>), AnalyzerError> {
        debug!("Checking {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let ctx = FileContext::new(path, &content, &self.root);

        let mut violations = Vec::new();
        let mut skipped = Vec::new();

        for rule in self
            .rules
            .iter()
            .filter(|rule| self.config.is_rule_enabled(rule.name()))
        {
            let output = rule.check(&ctx);
            for s in &output.skipped {
                warn!("{}: skipped {} ({})", rule.name(), s.path.display(), s.reason);
            }

            let severity = self.config.rule_severity(rule.name());
            violations.extend(output.violations.into_iter().map(|mut v| {
                if let Some(severity) = severity {
                    v.severity = severity;
                }
                v
            }));
            skipped.extend(output.skipped);
        }

        Ok((violations, skipped))
    }

    /// Discovers all source files with a configured extension.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(self.config.analyzer.respect_gitignore)
            .require_git(false);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry.map_err(|source| AnalyzerError::Walk {
                root: self.root.clone(),
                source,
            })?;
            let path = entry.path();

            if !path.is_file() || !self.has_lintable_extension(path) {
                continue;
            }

            if self.should_exclude(path) {
                debug!("Excluded {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    fn has_lintable_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        // Declaration files carry no imports worth rewriting.
        if path.to_string_lossy().ends_with(".d.ts") {
            return false;
        }
        self.config
            .analyzer
            .extensions
            .iter()
            .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }

    /// Matches excludes against the root-relative and the absolute form.
    fn should_exclude(&self, path: &Path) -> bool {
        let rel_str = path.strip_prefix(&self.root).unwrap_or(path).to_string_lossy();
        let path_str = path.to_string_lossy();

        for pattern in &self.exclude {
            if pattern.matches(&rel_str) || pattern.matches(&path_str) {
                return true;
            }

            // `**/node_modules/**` also excludes a root that sits inside one.
            let normalized = pattern.as_str().replace("**", "");
            if !normalized.trim_matches('/').is_empty() && path_str.contains(&normalized) {
                return true;
            }
        }

        false
    }
}

fn position(v: &Violation) -> (&Path, usize, usize) {
    (&v.location.file, v.location.line, v.location.column)
}
