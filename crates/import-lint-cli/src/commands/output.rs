//! Rendering of a [`LintResult`] in each `--format`.

use anyhow::{Context, Result};
use import_lint_core::{LintResult, Severity, SeverityCounts, Violation, ViolationDiagnostic};
use miette::GraphicalReportHandler;
use std::path::Path;

use crate::OutputFormat;

const RESET: &str = "\x1b[0m";

fn color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\x1b[31m",
        Severity::Warning => "\x1b[33m",
        Severity::Info => "\x1b[34m",
    }
}

/// Writes `result` to stdout. Paths in violations are relative to `root`,
/// which `pretty` also reads sources from.
///
/// JSON output already carries the skipped files, so only the human formats
/// append the skipped-file summary.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?);
            return Ok(());
        }
        OutputFormat::Compact => result.violations.iter().for_each(|v| println!("{v}")),
        OutputFormat::Text => {
            result.violations.iter().for_each(print_block);
            print_summary(result);
        }
        OutputFormat::Pretty => {
            print_pretty(result, root)?;
            print_summary(result);
        }
    }
    print_skipped(result);
    Ok(())
}

/// Header line, message, help, and the proposed replacement indented under
/// a gutter.
fn print_block(violation: &Violation) {
    let location = &violation.location;
    println!(
        "{} {} at {}:{}:{}",
        violation.code,
        violation.rule,
        location.file.display(),
        location.line,
        location.column,
    );
    println!(
        "  {}{}{RESET}: {}",
        color(violation.severity),
        violation.severity,
        violation.message
    );
    if let Some(suggestion) = &violation.suggestion {
        println!("  = help: {}", suggestion.message);
    }
    if let Some(fix) = violation.fix() {
        fix.new_text.lines().for_each(|line| println!("  | {line}"));
    }
    println!();
}

fn print_pretty(result: &LintResult, root: &Path) -> Result<()> {
    let handler = GraphicalReportHandler::new();

    for violation in &result.violations {
        let path = root.join(&violation.location.file);
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let mut rendered = String::new();
        handler
            .render_report(&mut rendered, &ViolationDiagnostic::new(violation, source))
            .context("Failed to render diagnostic")?;
        println!("{rendered}");
    }
    Ok(())
}

fn print_summary(result: &LintResult) {
    let SeverityCounts {
        errors,
        warnings,
        infos,
    } = result.counts();

    let tint = match (errors, warnings) {
        (0, 0) => "\x1b[32m",
        (0, _) => color(Severity::Warning),
        _ => color(Severity::Error),
    };

    println!(
        "{tint}Found {errors} error(s), {warnings} warning(s), {infos} info(s) in {} file(s), {} fixable with --fix{RESET}",
        result.files_checked,
        result.fixable_count()
    );
}

fn print_skipped(result: &LintResult) {
    if result.skipped.is_empty() {
        return;
    }

    println!(
        "\nSkipped {} file(s) that could not be parsed:",
        result.skipped.len()
    );
    for skipped in &result.skipped {
        println!("  {}: {}", skipped.path.display(), skipped.reason);
    }
}
