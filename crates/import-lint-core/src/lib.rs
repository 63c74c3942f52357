//! # import-lint-core
//!
//! Core framework for import linting.
//!
//! This crate provides the language-agnostic pieces shared by rules:
//!
//! - [`Rule`] trait for per-file rules and [`RuleOutput`] for their results
//! - [`Analyzer`] for discovering files and orchestrating rule execution
//! - [`Violation`], [`Suggestion`] and [`Replacement`] for lint findings and fixes
//! - [`fix::apply_replacements`] for writing fixes back into source text
//!
//! ## Example
//!
//! ```ignore
//! use import_lint_core::{Analyzer, Config};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./apps/webapp")
//!     .config(Config::default())
//!     .rule(MyRule::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
mod rule;
mod types;

pub mod fix;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig};
pub use context::FileContext;
pub use rule::{Rule, RuleBox, RuleOutput};
pub use types::{
    LintResult, Location, Replacement, Severity, SeverityCounts, SkippedFile, Suggestion,
    Violation, ViolationDiagnostic,
};
