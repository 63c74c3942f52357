//! Locating `import-lint.toml`.
//!
//! First match wins:
//!
//! 1. `--config` flag (explicit path)
//! 2. `import-lint.toml` or `.import-lint.toml` in the project directory or
//!    the nearest ancestor, stopping at the repository root (the first
//!    directory holding `.git`)
//! 3. `$IMPORT_LINT_CONFIG_DIR/config.toml` or `~/.import-lint/config.toml`
//! 4. No config found → defaults

use import_lint_core::{Config, ConfigError};
use std::path::{Path, PathBuf};

/// The config file chosen for a run, tagged by how it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` or `IMPORT_LINT_CONFIG`. Not checked for existence.
    Explicit(PathBuf),
    /// The checked directory or an ancestor inside the same repository.
    Project(PathBuf),
    /// The per-user config.
    Global(PathBuf),
    /// Nothing found. Built-in defaults apply.
    Default,
}

impl ConfigSource {
    /// The file, unless defaults apply.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Reads the configuration, or returns defaults for [`ConfigSource::Default`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Config, ConfigError> {
        match self {
            Self::Default => Ok(Config::default()),
            Self::Global(p) => {
                tracing::info!("Using global config: {}", p.display());
                Config::from_file(p)
            }
            Self::Explicit(p) | Self::Project(p) => {
                tracing::debug!("Using config: {}", p.display());
                Config::from_file(p)
            }
        }
    }
}

/// Project-level config file names, checked in order within each directory.
const PROJECT_CONFIG_NAMES: &[&str] = &["import-lint.toml", ".import-lint.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Picks the config for checking `project_dir`, in module-doc order.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(project_dir, explicit, global_config_dir())
}

/// Takes `global_dir` as a parameter so tests need not touch the environment.
fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = find_project_config(project_dir) {
        tracing::debug!("Found project config: {}", found.display());
        return ConfigSource::Project(found);
    }

    if let Some(dir) = global_dir {
        let candidate = dir.join(GLOBAL_CONFIG_NAME);
        if candidate.is_file() {
            tracing::debug!("Found global config: {}", candidate.display());
            return ConfigSource::Global(candidate);
        }
    }

    ConfigSource::Default
}

fn find_project_config(project_dir: &Path) -> Option<PathBuf> {
    let start = std::fs::canonicalize(project_dir).unwrap_or_else(|_| project_dir.to_path_buf());

    for dir in start.ancestors() {
        if let Some(found) = PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
        {
            return Some(found);
        }
        if dir.join(".git").exists() {
            break;
        }
    }

    None
}

/// `$IMPORT_LINT_CONFIG_DIR`, else `~/.import-lint`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("IMPORT_LINT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".import-lint"))
}
