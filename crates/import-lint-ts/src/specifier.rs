//! Resolution of re-export specifiers relative to the file that contains them.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Extensions appended to an extension-less specifier, in probe order.
pub const SOURCE_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx"];

/// Index file names probed inside a directory, in order.
pub const INDEX_FILES: &[&str] = &["index.ts", "index.tsx", "index.js", "index.jsx"];

/// Emitted-JS extensions and the TypeScript source extension they stand for.
const JS_TO_TS: &[(&str, &str)] = &[
    ("js", "ts"),
    ("jsx", "tsx"),
    ("mjs", "mts"),
    ("cjs", "cts"),
];

/// Resolves `specifier` against `base_dir` to an existing source file.
///
/// Probes, in order: the specifier as written; the specifier with each of
/// [`SOURCE_EXTENSIONS`] appended; for a `.js`-style specifier, the same path
/// with its TypeScript extension; then, if the specifier names a directory,
/// each of [`INDEX_FILES`] inside it.
///
/// Returns `None` when nothing exists. Callers treat that as the end of a
/// branch rather than an error.
#[must_use]
pub fn try_resolve_source_path(base_dir: &Path, specifier: &str) -> Option<PathBuf> {
    let candidate = base_dir.join(specifier);

    if candidate.is_file() {
        return Some(candidate);
    }

    for ext in SOURCE_EXTENSIONS {
        let with_ext = append_extension(&candidate, ext);
        if with_ext.is_file() {
            return Some(with_ext);
        }
    }

    if let Some(ts) = typescript_counterpart(&candidate) {
        if ts.is_file() {
            return Some(ts);
        }
    }

    if candidate.is_dir() {
        return INDEX_FILES
            .iter()
            .map(|index| candidate.join(index))
            .find(|p| p.is_file());
    }

    None
}

/// `foo` + `.ts` -> `foo.ts`, keeping any dots already in the file name.
pub(crate) fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(ext);
    PathBuf::from(s)
}

/// `foo.js` -> `foo.ts`, `foo.mjs` -> `foo.mts`, and so on.
fn typescript_counterpart(path: &Path) -> Option<PathBuf> {
    let ext = path.extension()?.to_str()?;
    JS_TO_TS
        .iter()
        .find(|(js, _)| js.eq_ignore_ascii_case(ext))
        .map(|(_, ts)| path.with_extension(ts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree(files: &[&str]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for f in files {
            let p = tmp.path().join(f);
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(p, "").unwrap();
        }
        tmp
    }

    #[test]
    fn exact_file_wins() {
        let tmp = tree(&["a/foo", "a/foo.ts"]);
        let got = try_resolve_source_path(&tmp.path().join("a"), "./foo");
        assert_eq!(got, Some(tmp.path().join("a/foo")));
    }

    #[test]
    fn extensions_probed_in_order() {
        let tmp = tree(&["foo.tsx", "foo.js"]);
        let got = try_resolve_source_path(tmp.path(), "./foo");
        assert_eq!(got, Some(tmp.path().join("foo.tsx")));
    }

    #[test]
    fn dotted_names_keep_their_dots() {
        let tmp = tree(&["schemas/api.types.ts"]);
        let got = try_resolve_source_path(&tmp.path().join("schemas"), "./api.types");
        assert_eq!(got, Some(tmp.path().join("schemas/api.types.ts")));
    }

    #[test]
    fn js_specifier_maps_to_ts_source() {
        let tmp = tree(&["v3/foo.ts", "v3/bar.mts"]);
        let dir = tmp.path().join("v3");
        assert_eq!(try_resolve_source_path(&dir, "./foo.js"), Some(dir.join("foo.ts")));
        assert_eq!(try_resolve_source_path(&dir, "./bar.mjs"), Some(dir.join("bar.mts")));
    }

    #[test]
    fn directory_index_probed_in_order() {
        let tmp = tree(&["utils/index.tsx", "utils/index.js"]);
        let got = try_resolve_source_path(tmp.path(), "./utils");
        assert_eq!(got, Some(tmp.path().join("utils/index.tsx")));
    }

    #[test]
    fn file_with_extension_beats_directory() {
        let tmp = tree(&["schemas.ts", "schemas/index.ts"]);
        let got = try_resolve_source_path(tmp.path(), "./schemas");
        assert_eq!(got, Some(tmp.path().join("schemas.ts")));
    }

    #[test]
    fn nothing_found_is_none() {
        let tmp = tree(&["empty/README.md"]);
        assert_eq!(try_resolve_source_path(tmp.path(), "./missing"), None);
        assert_eq!(try_resolve_source_path(tmp.path(), "./empty"), None);
        assert_eq!(try_resolve_source_path(tmp.path(), "zod"), None);
    }
}
