//! The `no-trigger-core-import` rule.
//!
//! Flags imports from the core package's blocked barrels and rewrites each
//! one into imports from the sub-paths that actually define the symbols:
//!
//! ```text
//! import { Foo, type Bar } from "@trigger.dev/core/v3";
//! // becomes
//! import { Foo } from '@trigger.dev/core/v3/foo';
//! import { type Bar } from '@trigger.dev/core/v3/schemas';
//! ```

use import_lint_core::{
    Config, FileContext, Location, Replacement, Rule, RuleOutput, SkippedFile, Suggestion,
    Violation,
};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::barrel::{AllowedBarrels, PackageLayout};
use crate::config::{ConfigError, CoreImportOptions};
use crate::source::{ImportStatement, ModuleSource};
use crate::tsconfig::PathMapping;
use crate::walker::ExportWalker;

/// Rule name.
pub const NAME: &str = "no-trigger-core-import";
/// Rule code.
pub const CODE: &str = "TCI001";
/// One-line description.
pub const DESCRIPTION: &str =
    "Disallow imports from @trigger.dev/core barrels; use specific sub-path imports";

/// Message templates reported by the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageId {
    /// At least one specifier has a specific import path; carries a fix.
    Fixable,
    /// No specifier could be resolved.
    Unfixable,
}

impl MessageId {
    /// Template identifier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fixable => "noTriggerCoreImportFixable",
            Self::Unfixable => "noTriggerCoreImport",
        }
    }
}

/// Rewrites blocked core imports into specific sub-path imports.
#[derive(Debug)]
pub struct NoTriggerCoreImport {
    options: CoreImportOptions,
    mapping: PathMapping,
    barrels: AllowedBarrels,
    layout: PackageLayout,
    root: PathBuf,
}

impl NoTriggerCoreImport {
    /// Builds the rule for the project at `root`, loading its tsconfig and the
    /// core package's manifest once.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the options are invalid, or the tsconfig or
    /// manifest cannot be loaded.
    pub fn new(options: CoreImportOptions, root: &Path) -> Result<Self, ConfigError> {
        options.validate()?;
        let options = options.resolved(root);

        let mapping = PathMapping::from_tsconfig(&options.tsconfig)?;
        let barrels =
            AllowedBarrels::from_manifest(&options.manifest, &options.package_alias, &options.blocked)?;
        let layout = PackageLayout::new(options.package_alias.clone(), options.source_root.clone());

        debug!(
            "{NAME}: {} allowed barrels, source root {}",
            barrels.len(),
            options.source_root.display()
        );

        Ok(Self::from_parts(options, mapping, barrels, layout, root))
    }

    /// Builds the rule from the `[rules.no-trigger-core-import]` table of
    /// `config`.
    ///
    /// # Errors
    ///
    /// See [`NoTriggerCoreImport::new`].
    pub fn from_config(config: &Config, root: &Path) -> Result<Self, ConfigError> {
        let options = CoreImportOptions::from_rule_config(config.rules.get(NAME))?;
        Self::new(options, root)
    }

    /// Assembles the rule from already-loaded parts.
    #[must_use]
    pub fn from_parts(
        options: CoreImportOptions,
        mapping: PathMapping,
        barrels: AllowedBarrels,
        layout: PackageLayout,
        root: &Path,
    ) -> Self {
        let root = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        Self {
            options,
            mapping,
            barrels,
            layout,
            root,
        }
    }

    /// The allowed barrel set in use.
    #[must_use]
    pub fn barrels(&self) -> &AllowedBarrels {
        &self.barrels
    }

    fn is_blocked(&self, source: &str) -> bool {
        self.options.blocked.iter().any(|b| b == source)
    }

    fn check_import(
        &self,
        ctx: &FileContext,
        import: &ImportStatement,
        skipped: &mut Vec<SkippedFile>,
    ) -> Violation {
        let walker = ExportWalker::new(&self.layout, &self.barrels);
        let start = self.mapping.resolve_module_path(&import.source);

        let mut groups: Vec<(String, Vec<&str>)> = Vec::new();
        let mut unresolved: Vec<&str> = Vec::new();

        for spec in &import.named {
            let report = walker.resolve_export(&start, &spec.imported);
            skipped.extend(report.parse_failures.into_iter().map(|s| self.relative(s)));

            let target = report
                .resolution
                .as_ref()
                .and_then(|r| r.replacement_path(self.options.prefer_barrel))
                .filter(|p| !self.is_blocked(p));

            match target {
                Some(path) => match groups.iter_mut().find(|(p, _)| p == path) {
                    Some((_, texts)) => texts.push(spec.text.as_str()),
                    None => groups.push((path.to_owned(), vec![spec.text.as_str()])),
                },
                None => unresolved.push(spec.text.as_str()),
            }
        }

        let location = Location::new(ctx.relative_path.clone(), import.line, import.column)
            .with_span(import.start_byte, import.end_byte - import.start_byte);

        if groups.is_empty() {
            return Violation::new(
                CODE,
                NAME,
                self.default_severity(),
                location,
                format!(
                    "Cannot import from \"{}\": no specific import available",
                    import.source
                ),
            )
            .with_message_id(MessageId::Unfixable.as_str())
            .with_suggestion(Suggestion::new(
                "Import from a specific sub-path that exports these symbols",
            ));
        }

        let paths: Vec<&str> = groups.iter().map(|(p, _)| p.as_str()).collect();
        let message = format!(
            "Use specific import from {} instead of \"{}\"",
            paths.join(", "),
            import.source
        );
        let fix = synthesize(import, &groups, &unresolved);

        Violation::new(CODE, NAME, self.default_severity(), location.clone(), message)
            .with_message_id(MessageId::Fixable.as_str())
            .with_suggestion(Suggestion::with_fix(
                "Replace with specific sub-path imports",
                Replacement::new(location, fix),
            ))
    }

    fn relative(&self, skipped: SkippedFile) -> SkippedFile {
        match skipped.path.strip_prefix(&self.root) {
            Ok(rel) => SkippedFile::new(rel, skipped.reason),
            Err(_) => skipped,
        }
    }
}

/// Replacement text: one statement per group, then a residual import from the
/// original source for whatever could not be moved.
fn synthesize(import: &ImportStatement, groups: &[(String, Vec<&str>)], unresolved: &[&str]) -> String {
    let keyword = if import.type_only { "import type" } else { "import" };

    let mut statements: Vec<String> = groups
        .iter()
        .map(|(path, texts)| format!("{keyword} {{ {} }} from '{path}';", texts.join(", ")))
        .collect();

    let mut residual: Vec<String> = Vec::new();
    if let Some(default) = &import.default {
        residual.push(default.clone());
    }
    if let Some(namespace) = &import.namespace {
        residual.push(namespace.clone());
    }
    if !unresolved.is_empty() {
        residual.push(format!("{{ {} }}", unresolved.join(", ")));
    }
    if !residual.is_empty() {
        statements.push(format!(
            "{keyword} {} from '{}';",
            residual.join(", "),
            import.source
        ));
    }

    statements.join("\n")
}

impl Rule for NoTriggerCoreImport {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn fixable(&self) -> bool {
        true
    }

    fn check(&self, ctx: &FileContext) -> RuleOutput {
        if !ctx.mentions_any(&self.options.blocked) {
            return RuleOutput::new();
        }

        let module = match ModuleSource::parse_file(ctx.path, ctx.content) {
            Ok(module) => module,
            Err(e) => {
                return RuleOutput::skipped(SkippedFile::new(
                    ctx.relative_path.clone(),
                    format!("parse error: {e}"),
                ));
            }
        };

        let mut output = RuleOutput::new();
        for import in module.imports.iter().filter(|i| self.is_blocked(&i.source)) {
            let violation = self.check_import(ctx, import, &mut output.skipped);
            output.violations.push(violation);
        }
        output
    }
}
