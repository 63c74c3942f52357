//! # import-lint-ts
//!
//! Tree-sitter based TypeScript import resolution for import-lint.
//!
//! This crate implements the `no-trigger-core-import` rule on top of
//! `import-lint-core` and the pieces it is built from:
//!
//! - [`ModuleSource`] for parsing a file's imports and export surface
//! - [`PathMapping`] for `tsconfig.json` `baseUrl`/`paths` resolution
//! - [`try_resolve_source_path`] for relative re-export specifiers
//! - [`ExportWalker`] for following re-export chains to a symbol's definition
//! - [`AllowedBarrels`] and [`PackageLayout`] for the package's public entry
//!   points and import strings
//! - [`NoTriggerCoreImport`], the rule itself

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod barrel;
pub mod config;
pub mod no_core_import;
pub mod source;
pub mod specifier;
pub mod tsconfig;
pub mod walker;

pub use barrel::{AllowedBarrels, PackageLayout};
pub use config::{ConfigError, CoreImportOptions};
pub use no_core_import::{MessageId, NoTriggerCoreImport};
pub use source::{Dialect, ModuleSource, ParseError};
pub use specifier::try_resolve_source_path;
pub use tsconfig::PathMapping;
pub use walker::{ExportWalker, Resolution, WalkReport};
