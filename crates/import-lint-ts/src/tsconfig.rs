//! `tsconfig.json` path mapping.
//!
//! Resolves aliased module specifiers (`@trigger.dev/core/v3`) to files using
//! `compilerOptions.baseUrl` and `compilerOptions.paths`, the way the
//! TypeScript compiler does.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::config::ConfigError;
use crate::specifier::{append_extension, SOURCE_EXTENSIONS};

/// Maximum length of an `extends` chain.
const MAX_EXTENDS_DEPTH: usize = 16;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTsConfig {
    #[serde(default)]
    extends: Option<Extends>,
    #[serde(default)]
    compiler_options: RawCompilerOptions,
}

/// `extends` is a single path, or a list where later entries win.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Extends {
    One(String),
    Many(Vec<String>),
}

impl Extends {
    // TODO: merge every entry of a list instead of following only the last one.
    fn into_last(self) -> Option<String> {
        match self {
            Self::One(s) => Some(s),
            Self::Many(v) => v.into_iter().last(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompilerOptions {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    paths: Option<HashMap<String, Vec<String>>>,
}

/// Alias-to-path mapping loaded from a `tsconfig.json`.
#[derive(Debug, Clone)]
pub struct PathMapping {
    /// Directory of the tsconfig the mapping was loaded from.
    config_dir: PathBuf,
    /// Absolute `baseUrl`.
    base_url: PathBuf,
    /// `(pattern, targets)` pairs.
    paths: Vec<(String, Vec<String>)>,
}

impl PathMapping {
    /// Creates a mapping from already-resolved parts.
    #[must_use]
    pub fn new(
        config_dir: impl Into<PathBuf>,
        base_url: impl Into<PathBuf>,
        paths: Vec<(String, Vec<String>)>,
    ) -> Self {
        Self {
            config_dir: config_dir.into(),
            base_url: base_url.into(),
            paths,
        }
    }

    /// Loads the mapping from a `tsconfig.json`, following relative `extends`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a file in the chain is missing or not valid
    /// JSONC, if the chain is too deep, or if no file in the chain declares
    /// `baseUrl` or `paths`.
    pub fn from_tsconfig(path: &Path) -> Result<Self, ConfigError> {
        let config_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        let mut base_url: Option<PathBuf> = None;
        let mut paths: Option<HashMap<String, Vec<String>>> = None;
        let mut current = Some(path.to_path_buf());
        let mut depth = 0;

        while let Some(file) = current.take() {
            depth += 1;
            if depth > MAX_EXTENDS_DEPTH {
                return Err(ConfigError::TsConfig {
                    path: path.to_path_buf(),
                    message: format!("extends chain deeper than {MAX_EXTENDS_DEPTH}"),
                });
            }

            let raw = read_tsconfig(&file)?;
            let dir = file.parent().unwrap_or(Path::new(".")).to_path_buf();

            // Nearer files override farther ones, option by option.
            if base_url.is_none() {
                base_url = raw.compiler_options.base_url.map(|b| clean(&dir.join(b)));
            }
            if paths.is_none() {
                paths = raw.compiler_options.paths;
            }

            current = match raw.extends.and_then(Extends::into_last) {
                Some(ext) if ext.starts_with('.') || Path::new(&ext).is_absolute() => {
                    let parent = clean(&dir.join(&ext));
                    Some(if ext.ends_with(".json") {
                        parent
                    } else {
                        append_extension(&parent, ".json")
                    })
                }
                Some(ext) => {
                    debug!("Ignoring package tsconfig extends: {ext}");
                    None
                }
                None => None,
            };
        }

        let base_url = base_url.ok_or_else(|| ConfigError::MissingBaseUrl {
            path: path.to_path_buf(),
        })?;
        let paths = paths.ok_or_else(|| ConfigError::MissingPaths {
            path: path.to_path_buf(),
        })?;

        let mut paths: Vec<(String, Vec<String>)> = paths.into_iter().collect();
        paths.sort_by(|a, b| a.0.cmp(&b.0));

        debug!(
            "Loaded {} path mapping(s) from {} (baseUrl {})",
            paths.len(),
            path.display(),
            base_url.display()
        );

        Ok(Self::new(config_dir, base_url, paths))
    }

    /// Resolves a bare or aliased specifier to an absolute path.
    ///
    /// Picks the best matching pattern (an exact pattern, otherwise the
    /// wildcard pattern with the longest prefix) and tries each of its
    /// targets: as a file, with [`SOURCE_EXTENSIONS`] appended, then as a
    /// directory (returning its `index.ts` when present). Without a usable
    /// match, the specifier is resolved literally against the tsconfig's
    /// directory.
    #[must_use]
    pub fn resolve_module_path(&self, specifier: &str) -> PathBuf {
        if let Some((targets, captured)) = self.best_match(specifier) {
            for target in targets {
                let substituted = target.replacen('*', captured, 1);
                if let Some(found) = probe(&self.base_url.join(substituted)) {
                    debug!("Resolved {specifier} -> {}", found.display());
                    return found;
                }
            }
            debug!("No target of the mapping for {specifier} exists");
        }

        self.config_dir.join(specifier)
    }

    fn best_match<'a>(&'a self, specifier: &'a str) -> Option<(&'a [String], &'a str)> {
        if let Some((_, targets)) = self
            .paths
            .iter()
            .find(|(pattern, _)| !pattern.contains('*') && pattern == specifier)
        {
            return Some((targets.as_slice(), ""));
        }

        let mut best: Option<(usize, &[String], &str)> = None;
        for (pattern, targets) in &self.paths {
            let Some((prefix, suffix)) = pattern.split_once('*') else {
                continue;
            };
            if specifier.len() < prefix.len() + suffix.len()
                || !specifier.starts_with(prefix)
                || !specifier.ends_with(suffix)
            {
                continue;
            }
            if best.map_or(true, |(len, _, _)| prefix.len() > len) {
                let captured = &specifier[prefix.len()..specifier.len() - suffix.len()];
                best = Some((prefix.len(), targets.as_slice(), captured));
            }
        }

        best.map(|(_, targets, captured)| (targets, captured))
    }
}

fn read_tsconfig(path: &Path) -> Result<RawTsConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    json5::from_str(&content).map_err(|e| ConfigError::TsConfig {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Drops `.` and folds `..` without touching the filesystem.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn probe(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    for ext in SOURCE_EXTENSIONS {
        let with_ext = append_extension(path, ext);
        if with_ext.is_file() {
            return Some(with_ext);
        }
    }
    if path.is_dir() {
        let index = path.join("index.ts");
        return Some(if index.is_file() { index } else { path.to_path_buf() });
    }
    None
}
