//! What a rule sees of one file.

use std::path::{Path, PathBuf};

/// A file handed to [`Rule::check`](crate::Rule::check).
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Absolute path, as discovered by the analyzer.
    pub path: &'a Path,
    /// Full UTF-8 text.
    pub content: &'a str,
    /// `path` relative to the analyzed root, or `path` itself when it lies
    /// outside the root. Violations report this form.
    pub relative_path: PathBuf,
}

impl<'a> FileContext<'a> {
    /// Wraps `path` and its `content` for a run rooted at `root`.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, root: &Path) -> Self {
        let relative_path = match path.strip_prefix(root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => path.to_path_buf(),
        };
        Self {
            path,
            content,
            relative_path,
        }
    }

    /// Cheap textual prefilter. Rules use it to skip parsing files that
    /// cannot contain what they look for.
    #[must_use]
    pub fn mentions_any<S: AsRef<str>>(&self, needles: &[S]) -> bool {
        needles
            .iter()
            .any(|needle| self.content.contains(needle.as_ref()))
    }
}
