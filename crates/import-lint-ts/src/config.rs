//! Options for the `no-trigger-core-import` rule.
//!
//! Read from the rule's table in `import-lint.toml`:
//!
//! ```toml
//! [rules.no-trigger-core-import]
//! package_alias = "@trigger.dev/core"
//! manifest = "packages/core/package.json"
//! source_root = "packages/core/src"
//! tsconfig = "tsconfig.json"
//! blocked = ["@trigger.dev/core", "@trigger.dev/core/v3"]
//! prefer_barrel = true
//! ```

use import_lint_core::RuleConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Errors when loading the rule's inputs. All of them abort the run.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read an input file.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// IO error.
        source: std::io::Error,
    },
    /// `tsconfig.json` is not valid JSONC or its `extends` chain is broken.
    #[error("invalid tsconfig {path}: {message}")]
    TsConfig {
        /// Offending file.
        path: PathBuf,
        /// Parse error detail.
        message: String,
    },
    /// No file in the tsconfig chain sets `compilerOptions.baseUrl`.
    #[error("{path}: compilerOptions.baseUrl is required for path mapping")]
    MissingBaseUrl {
        /// The tsconfig that was loaded.
        path: PathBuf,
    },
    /// No file in the tsconfig chain sets `compilerOptions.paths`.
    #[error("{path}: compilerOptions.paths is required for path mapping")]
    MissingPaths {
        /// The tsconfig that was loaded.
        path: PathBuf,
    },
    /// The package manifest is not valid JSON.
    #[error("invalid package manifest {path}: {message}")]
    Manifest {
        /// Manifest path.
        path: PathBuf,
        /// Parse error detail.
        message: String,
    },
    /// Rule options are malformed.
    #[error("invalid options for no-trigger-core-import: {0}")]
    Options(String),
}

/// Options of the `no-trigger-core-import` rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreImportOptions {
    /// Import alias of the package root (e.g. `@trigger.dev/core`).
    pub package_alias: String,
    /// The package's `package.json`.
    pub manifest: PathBuf,
    /// Directory that import paths under the alias map onto.
    pub source_root: PathBuf,
    /// The project's `tsconfig.json`.
    pub tsconfig: PathBuf,
    /// Import sources that must not be used directly.
    pub blocked: Vec<String>,
    /// Prefer importing from a public barrel on the re-export chain over the
    /// defining file.
    pub prefer_barrel: bool,
}

impl Default for CoreImportOptions {
    fn default() -> Self {
        Self {
            package_alias: "@trigger.dev/core".to_string(),
            manifest: PathBuf::from("packages/core/package.json"),
            source_root: PathBuf::from("packages/core/src"),
            tsconfig: PathBuf::from("tsconfig.json"),
            blocked: vec![
                "@trigger.dev/core".to_string(),
                "@trigger.dev/core/v3".to_string(),
            ],
            prefer_barrel: true,
        }
    }
}

impl CoreImportOptions {
    /// Reads options from the rule's config table, defaulting every field.
    ///
    /// The generic `enabled` and `severity` keys are handled by the analyzer
    /// and never reach this table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Options`] on unknown keys or wrongly typed values.
    pub fn from_rule_config(rule: Option<&RuleConfig>) -> Result<Self, ConfigError> {
        match rule {
            Some(rule) => rule
                .options_as()
                .map_err(|e| ConfigError::Options(e.to_string())),
            None => Ok(Self::default()),
        }
    }

    /// Returns these options with every relative path joined onto `root`.
    #[must_use]
    pub fn resolved(mut self, root: &Path) -> Self {
        for p in [&mut self.manifest, &mut self.source_root, &mut self.tsconfig] {
            if p.is_relative() {
                *p = root.join(&*p);
            }
        }
        self
    }

    /// Validates option values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Options`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.package_alias.trim().is_empty() {
            return Err(ConfigError::Options("package_alias must not be empty".into()));
        }
        if self.package_alias.ends_with('/') {
            return Err(ConfigError::Options(
                "package_alias must not end with '/'".into(),
            ));
        }
        if self.blocked.is_empty() {
            return Err(ConfigError::Options(
                "blocked must list at least one source".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use import_lint_core::Config;

    #[test]
    fn defaults_without_rule_table() {
        let opts = CoreImportOptions::from_rule_config(None).expect("defaults");
        assert_eq!(opts, CoreImportOptions::default());
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn partial_table_keeps_other_defaults() {
        let config = Config::parse(
            r#"
[rules.no-trigger-core-import]
severity = "warning"
package_alias = "@acme/core"
blocked = ["@acme/core"]
prefer_barrel = false
"#,
        )
        .expect("parse failed");
        let opts =
            CoreImportOptions::from_rule_config(config.rules.get("no-trigger-core-import"))
                .expect("options should load");
        assert_eq!(opts.package_alias, "@acme/core");
        assert_eq!(opts.blocked, vec!["@acme/core"]);
        assert!(!opts.prefer_barrel);
        assert_eq!(opts.tsconfig, PathBuf::from("tsconfig.json"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let config = Config::parse("[rules.no-trigger-core-import]\npackage = \"x\"\n")
            .expect("parse failed");
        let err = CoreImportOptions::from_rule_config(config.rules.get("no-trigger-core-import"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Options(_)));
    }

    #[test]
    fn resolved_joins_relative_paths_only() {
        let opts = CoreImportOptions {
            tsconfig: PathBuf::from("/abs/tsconfig.json"),
            ..CoreImportOptions::default()
        }
        .resolved(Path::new("/repo"));
        assert_eq!(opts.manifest, PathBuf::from("/repo/packages/core/package.json"));
        assert_eq!(opts.source_root, PathBuf::from("/repo/packages/core/src"));
        assert_eq!(opts.tsconfig, PathBuf::from("/abs/tsconfig.json"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let empty_alias = CoreImportOptions {
            package_alias: " ".into(),
            ..CoreImportOptions::default()
        };
        assert!(empty_alias.validate().is_err());

        let no_blocked = CoreImportOptions {
            blocked: vec![],
            ..CoreImportOptions::default()
        };
        assert!(no_blocked.validate().is_err());
    }
}
