//! Export graph traversal.
//!
//! Finds the file that really defines a symbol by following a module's
//! re-exports. Each query carries its own visited set, so cyclic re-export
//! chains end as not-found.

use import_lint_core::SkippedFile;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::barrel::{AllowedBarrels, PackageLayout};
use crate::source::ModuleSource;
use crate::specifier::try_resolve_source_path;

/// Where a symbol was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Canonical path of the file that declares or last renames the symbol.
    pub defined_in: PathBuf,
    /// Package import string of `defined_in`, if it lies under the source root.
    pub import_path: Option<String>,
    /// Outermost allowed barrel on the re-export chain that led to the symbol.
    pub barrel: Option<String>,
}

impl Resolution {
    /// Import string a fix should use: the barrel when preferred and present,
    /// otherwise the defining file's path.
    #[must_use]
    pub fn replacement_path(&self, prefer_barrel: bool) -> Option<&str> {
        if prefer_barrel {
            if let Some(barrel) = &self.barrel {
                return Some(barrel);
            }
        }
        self.import_path.as_deref()
    }
}

/// Outcome of one [`ExportWalker::resolve_export`] query.
#[derive(Debug, Clone, Default)]
pub struct WalkReport {
    /// The match, or `None` when the symbol is not reachable.
    pub resolution: Option<Resolution>,
    /// Files that could not be read or parsed along the way.
    pub parse_failures: Vec<SkippedFile>,
}

enum Visit {
    Found(Resolution),
    NotFound,
}

struct WalkState<'s> {
    symbol: &'s str,
    visited: HashSet<PathBuf>,
    failures: Vec<SkippedFile>,
}

/// Resolves symbols through a package's export graph.
#[derive(Debug, Clone, Copy)]
pub struct ExportWalker<'a> {
    layout: &'a PackageLayout,
    barrels: &'a AllowedBarrels,
}

impl<'a> ExportWalker<'a> {
    /// Creates a walker over `layout` that records candidates from `barrels`.
    #[must_use]
    pub fn new(layout: &'a PackageLayout, barrels: &'a AllowedBarrels) -> Self {
        Self { layout, barrels }
    }

    /// Finds the file defining `symbol`, starting at `path`.
    ///
    /// `path` may be a file or a directory; a directory stands for its
    /// `index.ts`. Search order within a file is: exported declarations and
    /// local export lists, then named re-exports, then wildcard re-exports,
    /// each in textual order. The first hit wins.
    #[must_use]
    pub fn resolve_export(&self, path: &Path, symbol: &str) -> WalkReport {
        let mut state = WalkState {
            symbol,
            visited: HashSet::new(),
            failures: Vec::new(),
        };

        let resolution = match self.visit(path, &mut state) {
            Visit::Found(r) => {
                debug!("{symbol} is defined in {}", r.defined_in.display());
                Some(r)
            }
            Visit::NotFound => {
                debug!("{symbol} not found from {}", path.display());
                None
            }
        };

        WalkReport {
            resolution,
            parse_failures: state.failures,
        }
    }

    fn visit(&self, path: &Path, state: &mut WalkState<'_>) -> Visit {
        let file = if path.is_dir() {
            let index = path.join("index.ts");
            if !index.is_file() {
                return Visit::NotFound;
            }
            index
        } else {
            path.to_path_buf()
        };

        let Ok(file) = std::fs::canonicalize(&file) else {
            return Visit::NotFound;
        };
        if !state.visited.insert(file.clone()) {
            debug!("Already visited {}", file.display());
            return Visit::NotFound;
        }

        let module = match read_module(&file) {
            Ok(module) => module,
            Err(reason) => {
                warn!("Skipping {}: {reason}", file.display());
                state.failures.push(SkippedFile::new(&file, reason));
                return Visit::NotFound;
            }
        };

        let import_path = self.layout.import_path(&file);
        debug!(
            "Visiting {} ({}) for {}",
            file.display(),
            import_path.as_deref().unwrap_or("outside source root"),
            state.symbol
        );

        let found = self.search(&file, &module, state);

        match found {
            Visit::Found(mut resolution) => {
                if let Some(p) = import_path.filter(|p| self.is_entry_point(p)) {
                    resolution.barrel = Some(p);
                }
                Visit::Found(resolution)
            }
            Visit::NotFound => Visit::NotFound,
        }
    }

    fn search(&self, file: &Path, module: &ModuleSource, state: &mut WalkState<'_>) -> Visit {
        let symbol = state.symbol;

        let declared = module.declarations.iter().any(|d| d.name == symbol)
            || module.local_exports.iter().any(|name| name == symbol);
        if declared {
            return self.found_here(file);
        }

        let dir = file.parent().unwrap_or(file);

        for reexport in module.named_reexports.iter().filter(|r| r.exported == symbol) {
            if reexport.is_renamed() {
                return self.found_here(file);
            }
            let Some(next) = try_resolve_source_path(dir, &reexport.source) else {
                debug!("Cannot resolve {} from {}", reexport.source, file.display());
                continue;
            };
            if let found @ Visit::Found(_) = self.visit(&next, state) {
                return found;
            }
        }

        for wildcard in &module.wildcard_reexports {
            let Some(next) = try_resolve_source_path(dir, &wildcard.source) else {
                debug!("Cannot resolve {} from {}", wildcard.source, file.display());
                continue;
            };
            if let found @ Visit::Found(_) = self.visit(&next, state) {
                return found;
            }
        }

        Visit::NotFound
    }

    fn found_here(&self, file: &Path) -> Visit {
        Visit::Found(Resolution {
            defined_in: file.to_path_buf(),
            import_path: self.layout.import_path(file),
            barrel: None,
        })
    }

    fn is_entry_point(&self, import_path: &str) -> bool {
        self.barrels.contains(import_path)
    }
}

fn read_module(file: &Path) -> Result<ModuleSource, String> {
    let content = std::fs::read_to_string(file).map_err(|e| format!("failed to read: {e}"))?;
    ModuleSource::parse_file(file, &content).map_err(|e| format!("parse error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        tmp: TempDir,
        layout: PackageLayout,
    }

    impl Fixture {
        fn new(files: &[(&str, &str)]) -> Self {
            let tmp = TempDir::new().unwrap();
            for (path, content) in files {
                let p = tmp.path().join(path);
                fs::create_dir_all(p.parent().unwrap()).unwrap();
                fs::write(p, content).unwrap();
            }
            let layout = PackageLayout::new("@pkg", tmp.path());
            Self { tmp, layout }
        }

        fn path(&self, rel: &str) -> PathBuf {
            fs::canonicalize(self.tmp.path().join(rel)).unwrap()
        }

        fn resolve(&self, start: &str, symbol: &str) -> WalkReport {
            self.resolve_with(&AllowedBarrels::default(), start, symbol)
        }

        fn resolve_with(&self, barrels: &AllowedBarrels, start: &str, symbol: &str) -> WalkReport {
            ExportWalker::new(&self.layout, barrels)
                .resolve_export(&self.tmp.path().join(start), symbol)
        }

        fn defined_in(&self, start: &str, symbol: &str) -> Option<PathBuf> {
            self.resolve(start, symbol).resolution.map(|r| r.defined_in)
        }
    }

    #[test]
    fn direct_declarations_resolve_to_own_file() {
        let fx = Fixture::new(&[(
            "a.ts",
            "export const v = 1;\nexport function f(): void {}\nexport class C {}\n",
        )]);
        for symbol in ["v", "f", "C"] {
            assert_eq!(fx.defined_in("a.ts", symbol), Some(fx.path("a.ts")), "{symbol}");
        }
    }

    #[test]
    fn named_reexport_chain_is_transitive() {
        let fx = Fixture::new(&[
            ("a.ts", "export { X } from './b';\n"),
            ("b.ts", "export { X } from './c';\n"),
            ("c.ts", "export const X = 1;\n"),
        ]);
        let report = fx.resolve("a.ts", "X");
        let r = report.resolution.expect("X should resolve");
        assert_eq!(r.defined_in, fx.path("c.ts"));
        assert_eq!(r.import_path.as_deref(), Some("@pkg/c"));
    }

    #[test]
    fn wildcard_reexport_is_followed() {
        let fx = Fixture::new(&[
            ("a.ts", "export * from './b';\n"),
            ("b.ts", "export class Y {}\n"),
        ]);
        assert_eq!(fx.defined_in("a.ts", "Y"), Some(fx.path("b.ts")));
    }

    #[test]
    fn type_only_wildcard_reexport_is_followed() {
        let fx = Fixture::new(&[
            ("index.ts", "export type * from './types';\nexport * from './values';\n"),
            ("types.ts", "export interface Opts { retries: number }\n"),
            ("values.ts", "export const DEFAULTS = {};\n"),
        ]);
        let report = fx.resolve("index.ts", "Opts");
        assert!(report.parse_failures.is_empty());
        assert_eq!(
            report.resolution.map(|r| r.defined_in),
            Some(fx.path("types.ts"))
        );
        assert_eq!(fx.defined_in("index.ts", "DEFAULTS"), Some(fx.path("values.ts")));
    }

    #[test]
    fn absent_symbol_is_not_found() {
        let fx = Fixture::new(&[
            ("a.ts", "export * from './b';\nexport { Z } from './missing';\n"),
            ("b.ts", "export const Y = 1;\n"),
        ]);
        let report = fx.resolve("a.ts", "Nope");
        assert!(report.resolution.is_none());
        assert!(report.parse_failures.is_empty());
    }

    #[test]
    fn cyclic_wildcards_terminate() {
        let fx = Fixture::new(&[
            ("a.ts", "export * from './b';\n"),
            ("b.ts", "export * from './a';\n"),
        ]);
        assert!(fx.resolve("a.ts", "X").resolution.is_none());
    }

    #[test]
    fn cycle_does_not_hide_later_branches() {
        let fx = Fixture::new(&[
            ("a.ts", "export * from './b';\nexport * from './c';\n"),
            ("b.ts", "export * from './a';\n"),
            ("c.ts", "export const X = 1;\n"),
        ]);
        assert_eq!(fx.defined_in("a.ts", "X"), Some(fx.path("c.ts")));
    }

    #[test]
    fn declarations_beat_reexports() {
        let fx = Fixture::new(&[
            ("a.ts", "export * from './b';\nexport const X = 1;\n"),
            ("b.ts", "export const X = 2;\n"),
        ]);
        assert_eq!(fx.defined_in("a.ts", "X"), Some(fx.path("a.ts")));
    }

    #[test]
    fn named_reexports_beat_wildcards() {
        let fx = Fixture::new(&[
            ("a.ts", "export * from './b';\nexport { X } from './c';\n"),
            ("b.ts", "export const X = 2;\n"),
            ("c.ts", "export const X = 3;\n"),
        ]);
        assert_eq!(fx.defined_in("a.ts", "X"), Some(fx.path("c.ts")));
    }

    #[test]
    fn renaming_reexport_resolves_to_renaming_file() {
        let fx = Fixture::new(&[
            ("a.ts", "export { Inner as Outer } from './b';\n"),
            ("b.ts", "export const Inner = 1;\n"),
        ]);
        assert_eq!(fx.defined_in("a.ts", "Outer"), Some(fx.path("a.ts")));
    }

    #[test]
    fn local_export_list_counts_as_definition() {
        let fx = Fixture::new(&[("a.ts", "const hidden = 1;\nexport { hidden as shown };\n")]);
        assert_eq!(fx.defined_in("a.ts", "shown"), Some(fx.path("a.ts")));
        assert_eq!(fx.defined_in("a.ts", "hidden"), None);
    }

    #[test]
    fn directory_redirects_to_index() {
        let fx = Fixture::new(&[
            ("v3/index.ts", "export * from './foo.js';\n"),
            ("v3/foo.ts", "export interface Foo { id: string }\n"),
        ]);
        let r = fx.resolve("v3", "Foo").resolution.expect("Foo should resolve");
        assert_eq!(r.defined_in, fx.path("v3/foo.ts"));
        assert_eq!(r.import_path.as_deref(), Some("@pkg/v3/foo"));
    }

    #[test]
    fn directory_without_index_is_not_found() {
        let fx = Fixture::new(&[("lib/other.ts", "export const X = 1;\n")]);
        assert!(fx.resolve("lib", "X").resolution.is_none());
    }

    #[test]
    fn parse_failure_is_reported_and_skipped() {
        let fx = Fixture::new(&[
            ("a.ts", "export * from './broken';\nexport * from './ok';\n"),
            ("broken.ts", "export const = ;\n"),
            ("ok.ts", "export const X = 1;\n"),
        ]);
        let report = fx.resolve("a.ts", "X");
        assert_eq!(report.resolution.map(|r| r.defined_in), Some(fx.path("ok.ts")));
        assert_eq!(report.parse_failures.len(), 1);
        assert_eq!(report.parse_failures[0].path, fx.path("broken.ts"));
        assert!(report.parse_failures[0].reason.starts_with("parse error"));
    }

    #[test]
    fn outermost_allowed_barrel_on_chain_is_recorded() {
        let fx = Fixture::new(&[
            ("v3/index.ts", "export * from './schemas/index.js';\n"),
            ("v3/schemas/index.ts", "export * from './api.js';\n"),
            ("v3/schemas/api.ts", "export const Api = 1;\n"),
            ("v3/schemas/other.ts", "export const Other = 1;\n"),
        ]);
        let barrels = AllowedBarrels::new(["@pkg/v3/schemas"]);

        let r = fx
            .resolve_with(&barrels, "v3", "Api")
            .resolution
            .expect("Api should resolve");
        assert_eq!(r.barrel.as_deref(), Some("@pkg/v3/schemas"));
        assert_eq!(r.replacement_path(true), Some("@pkg/v3/schemas"));
        assert_eq!(r.replacement_path(false), Some("@pkg/v3/schemas/api"));

        let both = AllowedBarrels::new(["@pkg/v3", "@pkg/v3/schemas"]);
        let r = fx
            .resolve_with(&both, "v3", "Api")
            .resolution
            .expect("Api should resolve");
        assert_eq!(r.barrel.as_deref(), Some("@pkg/v3"));
    }

    #[test]
    fn barrel_off_the_chain_is_not_recorded() {
        let fx = Fixture::new(&[
            ("v3/index.ts", "export * from './foo.js';\nexport * from './utils/index.js';\n"),
            ("v3/foo.ts", "export const Foo = 1;\n"),
            ("v3/utils/index.ts", "export const Util = 1;\n"),
        ]);
        let barrels = AllowedBarrels::new(["@pkg/v3/utils"]);
        let r = fx
            .resolve_with(&barrels, "v3", "Foo")
            .resolution
            .expect("Foo should resolve");
        assert_eq!(r.barrel, None);
    }
}
