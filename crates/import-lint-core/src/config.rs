//! `import-lint.toml`.
//!
//! ```toml
//! [analyzer]
//! exclude = ["**/generated/**"]
//!
//! [rules.no-trigger-core-import]
//! severity = "warning"
//! prefer_barrel = false      # any other key is a rule option
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::Severity;

/// The parsed config file. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// `[analyzer]`: which files are walked.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// `[rules.<name>]` tables, keyed by rule name.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Reads and parses `path`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file is unreadable, [`ConfigError::Parse`]
    /// if it is not valid config TOML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parses config TOML.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on syntax errors or mistyped known keys.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Rules are on unless their table says `enabled = false`.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .and_then(|rule| rule.enabled)
            .unwrap_or(true)
    }

    /// The `severity` set in a rule's table, if any.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.rules.get(rule_name)?.severity
    }
}

/// File discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Directory walked when the CLI is given none.
    pub root: PathBuf,

    /// Globs matched against root-relative paths. Matching files are not
    /// linted.
    pub exclude: Vec<String>,

    /// Extensions to lint, without the dot. `.d.ts` files are never linted.
    pub extensions: Vec<String>,

    /// Skip files ignored by `.gitignore` and friends.
    pub respect_gitignore: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            exclude: ["**/node_modules/**", "**/dist/**"]
                .map(String::from)
                .to_vec(),
            extensions: ["ts", "tsx", "mts", "cts", "js", "jsx"]
                .map(String::from)
                .to_vec(),
            respect_gitignore: true,
        }
    }
}

/// One `[rules.<name>]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// `enabled = false` turns the rule off.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Replaces the rule's default severity.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Remaining keys, left for the rule to interpret.
    #[serde(flatten)]
    pub options: toml::Table,
}

impl RuleConfig {
    /// Deserializes the rule-specific keys into the rule's options type.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Validation`] if a key has the wrong type, or is unknown
    /// to a `deny_unknown_fields` target.
    pub fn options_as<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        toml::Value::Table(self.options.clone())
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Validation(e.message().to_string()))
    }
}

/// Why a config could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// The config file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The TOML is malformed, or a known key has the wrong type.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Rule options do not fit the rule.
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULE: &str = "no-trigger-core-import";

    #[test]
    fn empty_file_is_the_default() {
        let config = Config::parse("").unwrap();
        assert!(config.rules.is_empty());
        assert!(config.analyzer.respect_gitignore);
        assert!(config.analyzer.extensions.iter().any(|e| e == "tsx"));
        assert!(config.is_rule_enabled(RULE));
        assert_eq!(config.rule_severity(RULE), None);
    }

    #[test]
    fn partial_analyzer_table_keeps_other_defaults() {
        let config = Config::parse("[analyzer]\nextensions = [\"ts\"]\n").unwrap();
        assert_eq!(config.analyzer.extensions, vec!["ts"]);
        assert_eq!(config.analyzer.root, PathBuf::from("."));
        assert!(config.analyzer.exclude.iter().any(|e| e == "**/node_modules/**"));
    }

    #[test]
    fn rule_table_splits_settings_from_options() {
        let config = Config::parse(
            r#"
[rules.no-trigger-core-import]
enabled = true
severity = "warning"
package_alias = "@acme/core"
"#,
        )
        .unwrap();

        assert!(config.is_rule_enabled(RULE));
        assert_eq!(config.rule_severity(RULE), Some(Severity::Warning));

        let options = &config.rules[RULE].options;
        assert_eq!(options.len(), 1);
        assert_eq!(
            options.get("package_alias").and_then(toml::Value::as_str),
            Some("@acme/core")
        );
    }

    #[test]
    fn disabled_rule_does_not_affect_others() {
        let config = Config::parse("[rules.no-trigger-core-import]\nenabled = false\n").unwrap();
        assert!(!config.is_rule_enabled(RULE));
        assert!(config.is_rule_enabled("some-other-rule"));
    }

    #[test]
    fn bad_severity_is_a_parse_error() {
        let err = Config::parse("[rules.r]\nseverity = \"fatal\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[derive(Debug, Deserialize)]
    struct Opts {
        blocked: Vec<String>,
        #[serde(default)]
        prefer_barrel: Option<bool>,
    }

    #[test]
    fn options_deserialize_into_rule_type() {
        let config =
            Config::parse("[rules.r]\nenabled = true\nblocked = [\"@a/core\", \"@a/core/v3\"]\n")
                .unwrap();
        let opts: Opts = config.rules["r"].options_as().unwrap();
        assert_eq!(opts.blocked, vec!["@a/core", "@a/core/v3"]);
        assert!(opts.prefer_barrel.is_none());
    }

    #[test]
    fn mistyped_option_is_a_validation_error() {
        let config = Config::parse("[rules.r]\nblocked = 3\n").unwrap();
        let err = config.rules["r"].options_as::<Opts>().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
