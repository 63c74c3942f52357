//! Check command implementation.

use anyhow::{Context, Result};
use import_lint_core::fix::apply_replacements;
use import_lint_core::{Analyzer, Config, LintResult, Replacement, RuleBox};
use import_lint_ts::no_core_import::{self, NoTriggerCoreImport};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Arguments of `import-lint check`.
#[derive(Debug, Clone, clap::Args)]
pub struct CheckArgs {
    /// Project root to analyze
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Rewrite fixable imports in place, then re-check
    #[arg(long)]
    pub fix: bool,

    /// Only run these rules (comma-separated names or codes)
    #[arg(long)]
    pub rules: Option<String>,

    /// Extra exclude globs, on top of the config's (repeatable)
    #[arg(short, long)]
    pub exclude: Vec<String>,
}

/// Totals of one `--fix` pass.
#[derive(Debug, Default, PartialEq, Eq)]
struct FixSummary {
    files: usize,
    applied: usize,
    rejected: usize,
}

/// Runs the check command.
pub fn run(args: &CheckArgs, source: &ConfigSource) -> Result<()> {
    let path = args.path.as_path();
    let config = source.load().with_context(|| match source.path() {
        Some(p) => format!("Failed to load config: {}", p.display()),
        None => "Failed to load default config".to_string(),
    })?;

    let project_root = project_root(path, source);
    let rules = build_rules(args.rules.as_deref(), &config, &project_root)?;

    let mut builder = Analyzer::builder().root(path).config(config);
    for pattern in &args.exclude {
        builder = builder.exclude(pattern.clone());
    }
    for rule in rules {
        builder = builder.rule_box(rule);
    }

    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!("Analyzing {:?} with {} rules", path, analyzer.rule_count());

    let mut result = analyzer.analyze().context("Analysis failed")?;

    if args.fix && result.fixable_count() > 0 {
        let summary = apply_fixes(analyzer.root(), &result)?;
        tracing::info!(
            "Applied {} fix(es) in {} file(s), {} conflicting fix(es) left for a later run",
            summary.applied,
            summary.files,
            summary.rejected
        );
        if summary.applied > 0 {
            result = analyzer.analyze().context("Analysis after fixing failed")?;
        }
    }

    super::output::print(&result, args.format, analyzer.root())?;

    if result.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

/// Directory that rule option paths are relative to: the directory of a
/// project config found in an ancestor, otherwise the checked path.
fn project_root(path: &Path, source: &ConfigSource) -> PathBuf {
    match source {
        ConfigSource::Project(p) => p
            .parent()
            .map_or_else(|| path.to_path_buf(), Path::to_path_buf),
        _ => path.to_path_buf(),
    }
}

fn build_rules(filter: Option<&str>, config: &Config, root: &Path) -> Result<Vec<RuleBox>> {
    let selected: Vec<&str> = match filter {
        Some(filter) => filter.split(',').map(str::trim).filter(|s| !s.is_empty()).collect(),
        None => vec![no_core_import::NAME],
    };

    let mut rules: Vec<RuleBox> = Vec::new();
    for name in selected {
        match name {
            no_core_import::NAME | no_core_import::CODE => {
                if !config.is_rule_enabled(no_core_import::NAME) {
                    tracing::debug!("Skipping disabled rule: {}", no_core_import::NAME);
                    continue;
                }
                if rules.iter().any(|r| r.name() == no_core_import::NAME) {
                    continue;
                }
                let rule = NoTriggerCoreImport::from_config(config, root)
                    .with_context(|| format!("Failed to set up {}", no_core_import::NAME))?;
                rules.push(Box::new(rule));
            }
            _ => tracing::warn!("Unknown rule: {}", name),
        }
    }

    Ok(rules)
}

/// Writes every fixable violation's replacement back to its file.
fn apply_fixes(root: &Path, result: &LintResult) -> Result<FixSummary> {
    let mut by_file: BTreeMap<&Path, Vec<&Replacement>> = BTreeMap::new();
    for violation in &result.violations {
        if let Some(fix) = violation.fix() {
            by_file
                .entry(violation.location.file.as_path())
                .or_default()
                .push(fix);
        }
    }

    let mut summary = FixSummary::default();
    for (file, replacements) in by_file {
        let path = root.join(file);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let outcome = apply_replacements(&content, replacements);
        summary.rejected += outcome.rejected;
        if outcome.applied == 0 {
            continue;
        }

        std::fs::write(&path, outcome.content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!("Fixed {} ({} replacement(s))", path.display(), outcome.applied);
        summary.files += 1;
        summary.applied += outcome.applied;
    }

    Ok(summary)
}
