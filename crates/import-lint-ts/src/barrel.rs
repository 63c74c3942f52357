//! Package layout and the barrel allow-list.
//!
//! [`PackageLayout`] maps files under the package's source root back to
//! package-relative import strings. [`AllowedBarrels`] is the set of public
//! entry points declared by the package manifest's `exports` map.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

use crate::config::ConfigError;

/// Maps source files of one package to import strings under its alias.
#[derive(Debug, Clone)]
pub struct PackageLayout {
    alias: String,
    source_root: PathBuf,
}

impl PackageLayout {
    /// Creates a layout. The source root is canonicalized when it exists so
    /// that it compares equal to canonicalized file paths.
    #[must_use]
    pub fn new(alias: impl Into<String>, source_root: impl Into<PathBuf>) -> Self {
        let source_root = source_root.into();
        let source_root = std::fs::canonicalize(&source_root).unwrap_or(source_root);
        Self {
            alias: alias.into(),
            source_root,
        }
    }

    /// The package's root import alias.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Import string for `file`, or `None` if it lies outside the source root.
    ///
    /// `src/v3/foo.ts` -> `alias/v3/foo`; a trailing `index` segment is
    /// dropped, so `src/v3/index.ts` -> `alias/v3` and `src/index.ts` -> `alias`.
    #[must_use]
    pub fn import_path(&self, file: &Path) -> Option<String> {
        let rel = file.strip_prefix(&self.source_root).ok()?;

        let mut segments: Vec<String> = Vec::new();
        for component in rel.components() {
            match component {
                Component::Normal(s) => segments.push(s.to_str()?.to_owned()),
                Component::CurDir => {}
                _ => return None,
            }
        }

        let last = segments.pop()?;
        let stem = strip_source_extension(&last);
        if stem != "index" {
            segments.push(stem.to_owned());
        }

        if segments.is_empty() {
            Some(self.alias.clone())
        } else {
            Some(format!("{}/{}", self.alias, segments.join("/")))
        }
    }
}

/// `foo.ts` -> `foo`, `foo.d.ts` -> `foo`, `foo.types.ts` -> `foo.types`.
fn strip_source_extension(name: &str) -> &str {
    const EXTENSIONS: &[&str] = &[
        ".d.ts", ".d.mts", ".d.cts", ".ts", ".tsx", ".mts", ".cts", ".js", ".jsx", ".mjs", ".cjs",
    ];
    EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name)
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    exports: Option<Value>,
}

/// Package-relative import strings declared as public entry points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedBarrels {
    entries: BTreeSet<String>,
}

impl AllowedBarrels {
    /// Builds the set from explicit entries.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Reads the `exports` map of the manifest at `path`.
    ///
    /// `"."` maps to `alias`, `"./x"` to `alias/x`. A string or array
    /// `exports`, or an object holding only condition keys, declares just `"."`.
    /// Keys containing `*` are skipped, and entries equal to a blocked source
    /// are excluded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the manifest is missing or not valid JSON.
    pub fn from_manifest(path: &Path, alias: &str, blocked: &[String]) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let manifest: Manifest =
            serde_json::from_str(&content).map_err(|e| ConfigError::Manifest {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let Some(exports) = manifest.exports else {
            warn!("{} declares no exports map; no barrels are allowed", path.display());
            return Ok(Self::default());
        };

        let barrels = Self::from_exports(&exports, alias, blocked);
        debug!(
            "Allowed barrels from {}: {:?}",
            path.display(),
            barrels.entries
        );
        Ok(barrels)
    }

    /// Builds the set from an already-parsed `exports` value.
    #[must_use]
    pub fn from_exports(exports: &Value, alias: &str, blocked: &[String]) -> Self {
        let keys: Vec<&str> = match exports {
            Value::Object(map) if map.keys().any(|k| k.starts_with('.')) => {
                map.keys().map(String::as_str).collect()
            }
            Value::Object(_) | Value::String(_) | Value::Array(_) => vec!["."],
            _ => Vec::new(),
        };

        let entries = keys
            .into_iter()
            .filter(|k| k.starts_with('.') && !k.contains('*'))
            .map(|k| subpath_import(alias, k))
            .filter(|entry| !blocked.iter().any(|b| b == entry))
            .collect();

        Self { entries }
    }

    /// Whether `import_path` is itself an allowed entry point.
    #[must_use]
    pub fn contains(&self, import_path: &str) -> bool {
        self.entries.contains(import_path)
    }

    /// Iterates entries in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn subpath_import(alias: &str, key: &str) -> String {
    let sub = key.strip_prefix("./").unwrap_or(key).trim_end_matches('/');
    if sub.is_empty() || sub == "." {
        alias.to_string()
    } else {
        format!("{alias}/{sub}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn blocked(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn root_entry_excluded_when_blocked() {
        let exports = json!({ ".": "./index.ts", "./v3": "./v3/index.ts" });
        let b = AllowedBarrels::from_exports(&exports, "@alias", &blocked(&["@alias"]));
        assert_eq!(b, AllowedBarrels::new(["@alias/v3"]));
    }

    #[test]
    fn conditional_and_wildcard_entries() {
        let exports = json!({
            ".": { "import": "./dist/esm/index.js", "require": "./dist/commonjs/index.js" },
            "./v3": { "import": "./dist/esm/v3/index.js" },
            "./v3/otel": "./dist/esm/v3/otel/index.js",
            "./v3/*": "./dist/esm/v3/*.js",
            "./package.json": "./package.json"
        });
        let b = AllowedBarrels::from_exports(
            &exports,
            "@trigger.dev/core",
            &blocked(&["@trigger.dev/core", "@trigger.dev/core/v3"]),
        );
        let entries: Vec<&str> = b.iter().collect();
        assert_eq!(
            entries,
            vec!["@trigger.dev/core/package.json", "@trigger.dev/core/v3/otel"]
        );
    }

    #[test]
    fn string_or_condition_only_exports_mean_root() {
        let b = AllowedBarrels::from_exports(&json!("./index.js"), "@a", &[]);
        assert_eq!(b, AllowedBarrels::new(["@a"]));

        let b = AllowedBarrels::from_exports(&json!({ "import": "./x.js" }), "@a", &[]);
        assert_eq!(b, AllowedBarrels::new(["@a"]));
    }

    #[test]
    fn contains_is_exact_membership() {
        let b = AllowedBarrels::new(["@a/v3", "@a/v3/schemas"]);
        assert!(b.contains("@a/v3/schemas"));
        assert!(!b.contains("@a/v3/foo"));
        assert!(!b.contains("@a/v3beta"));
    }

    #[test]
    fn manifest_file_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("package.json");
        assert!(matches!(
            AllowedBarrels::from_manifest(&path, "@a", &[]),
            Err(ConfigError::Io { .. })
        ));

        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(
            AllowedBarrels::from_manifest(&path, "@a", &[]),
            Err(ConfigError::Manifest { .. })
        ));

        fs::write(&path, r#"{ "name": "@a" }"#).unwrap();
        let b = AllowedBarrels::from_manifest(&path, "@a", &[]).unwrap();
        assert!(b.is_empty());
    }

    #[test]
    fn import_path_mapping() {
        let layout = PackageLayout::new("@trigger.dev/core", "/repo/packages/core/src");
        let p = |s: &str| layout.import_path(Path::new(s));
        assert_eq!(
            p("/repo/packages/core/src/v3/foo.ts").as_deref(),
            Some("@trigger.dev/core/v3/foo")
        );
        assert_eq!(
            p("/repo/packages/core/src/v3/index.ts").as_deref(),
            Some("@trigger.dev/core/v3")
        );
        assert_eq!(
            p("/repo/packages/core/src/index.ts").as_deref(),
            Some("@trigger.dev/core")
        );
        assert_eq!(
            p("/repo/packages/core/src/v3/api.types.tsx").as_deref(),
            Some("@trigger.dev/core/v3/api.types")
        );
        assert_eq!(p("/repo/packages/other/src/a.ts"), None);
    }
}
