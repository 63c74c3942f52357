//! TypeScript source parsing with Tree-sitter.
//!
//! Parses a file once and extracts the parts the resolver cares about: its
//! import statements and its export surface (declarations, local export
//! lists, named re-exports and wildcard re-exports), in textual order.
//!
//! Syntax errors only fail a file when they touch a top-level statement or
//! sit inside an import or export. Errors in other statements (a function
//! body using syntax the grammar predates) leave the module surface intact.

use std::borrow::Cow;
use std::path::Path;
use tracing::debug;
use tree_sitter::{Language, Node, Parser};

/// Which Tree-sitter grammar to parse a file with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Plain TypeScript (`.ts`, `.mts`, `.cts`). Angle-bracket casts parse.
    TypeScript,
    /// TypeScript with JSX (`.tsx`, and every JavaScript extension).
    Tsx,
}

impl Dialect {
    /// Picks the grammar for a file based on its extension. JavaScript files
    /// may contain JSX whatever their extension, so they get the TSX grammar.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("tsx" | "jsx" | "js" | "mjs" | "cjs") => Self::Tsx,
            _ => Self::TypeScript,
        }
    }

    fn language(self) -> Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// A file could not be turned into a usable syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The grammar could not be loaded into the parser.
    #[error("failed to load grammar: {0}")]
    Language(String),
    /// The parser produced no tree.
    #[error("parser produced no syntax tree")]
    NoTree,
    /// An import, an export, or a whole top-level statement is unreadable.
    #[error("syntax error at {line}:{column}")]
    Syntax {
        /// Line number (1-indexed).
        line: usize,
        /// Column (1-indexed).
        column: usize,
    },
}

/// Kind of an exported declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    /// `const`, `let` or `var` binding.
    Variable,
    /// `function f()` (including generators and overload signatures).
    Function,
    /// `class C` or `abstract class C`.
    Class,
    /// `interface I`.
    Interface,
    /// `type T = ...`.
    TypeAlias,
    /// `enum E`.
    Enum,
    /// `namespace N` or `module N`.
    Namespace,
}

/// A declaration exported directly from the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDecl {
    /// Declared name.
    pub name: String,
    /// Kind of declaration.
    pub kind: DeclKind,
    /// Line number (1-indexed).
    pub line: usize,
}

/// `export { local as exported } from "source"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedReExport {
    /// Name the symbol is exported under from this file.
    pub exported: String,
    /// Name of the symbol in `source`.
    pub local: String,
    /// Module specifier as written.
    pub source: String,
    /// Line number (1-indexed).
    pub line: usize,
}

impl NamedReExport {
    /// Whether the re-export renames the symbol.
    #[must_use]
    pub fn is_renamed(&self) -> bool {
        self.exported != self.local
    }
}

/// `export * from "source"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardReExport {
    /// Module specifier as written.
    pub source: String,
    /// Line number (1-indexed).
    pub line: usize,
}

/// One named binding in an import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpecifier {
    /// The name imported from the source module (not the local alias).
    pub imported: String,
    /// The specifier's source text, verbatim (e.g. `Foo as Bar`, `type Baz`).
    pub text: String,
}

/// A top-level `import ... from "source"` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    /// Module specifier as written.
    pub source: String,
    /// `import type { ... }`.
    pub type_only: bool,
    /// Default binding text, if any.
    pub default: Option<String>,
    /// Namespace binding text (`* as ns`), if any.
    pub namespace: Option<String>,
    /// Named bindings in textual order.
    pub named: Vec<ImportSpecifier>,
    /// Byte offset of the statement start.
    pub start_byte: usize,
    /// Byte offset just past the statement end.
    pub end_byte: usize,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column (1-indexed).
    pub column: usize,
}

/// Imports and export surface of one parsed file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSource {
    /// Top-level import statements.
    pub imports: Vec<ImportStatement>,
    /// Declarations exported in place (`export const x`, `export class C`).
    pub declarations: Vec<ExportedDecl>,
    /// Names exported by a source-less export list (`export { a, b as c }`)
    /// or a namespace re-export (`export * as ns from "..."`).
    pub local_exports: Vec<String>,
    /// Named re-exports in textual order.
    pub named_reexports: Vec<NamedReExport>,
    /// Wildcard re-exports in textual order.
    pub wildcard_reexports: Vec<WildcardReExport>,
}

impl ModuleSource {
    /// Parses `source` with the given grammar.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the grammar cannot be loaded, or a syntax
    /// error sits in an import or export statement or between top-level
    /// statements.
    pub fn parse(source: &str, dialect: Dialect) -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&dialect.language())
            .map_err(|e| ParseError::Language(e.to_string()))?;

        let masked = mask_type_only_wildcards(source);
        let src = masked.as_bytes();
        let tree = parser.parse(src, None).ok_or(ParseError::NoTree)?;
        let root = tree.root_node();

        let mut result = Self::default();
        let mut tolerated = 0usize;
        let mut cursor = root.walk();
        for node in root.children(&mut cursor) {
            if node.has_error() {
                if node.is_error()
                    || matches!(node.kind(), "import_statement" | "export_statement")
                {
                    let at = first_error(node).unwrap_or(node).start_position();
                    return Err(ParseError::Syntax {
                        line: at.row + 1,
                        column: at.column + 1,
                    });
                }
                tolerated += 1;
                continue;
            }
            match node.kind() {
                "import_statement" => {
                    if let Some(import) = extract_import(node, src) {
                        result.imports.push(import);
                    }
                }
                "export_statement" => result.collect_export(node, src),
                _ => {}
            }
        }

        if tolerated > 0 {
            debug!("Ignored syntax errors in {tolerated} non-module statement(s)");
        }
        Ok(result)
    }

    /// Parses the file at `path`, picking the grammar from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the source does not parse.
    pub fn parse_file(path: &Path, source: &str) -> Result<Self, ParseError> {
        Self::parse(source, Dialect::for_path(path))
    }

    fn collect_export(&mut self, node: Node<'_>, src: &[u8]) {
        let line = node.start_position().row + 1;

        let mut cursor = node.walk();
        let mut is_default = false;
        let mut wildcard = false;
        let mut clause = None;
        let mut namespace = None;
        for child in node.children(&mut cursor) {
            match child.kind() {
                "default" => is_default = true,
                "*" => wildcard = true,
                "export_clause" => clause = Some(child),
                "namespace_export" => namespace = Some(child),
                _ => {}
            }
        }

        if is_default {
            return;
        }

        if let Some(decl) = node.child_by_field_name("declaration") {
            self.collect_declaration(decl, src);
            return;
        }

        let source = node
            .child_by_field_name("source")
            .map(|s| string_value(s, src));

        if let Some(ns) = namespace {
            if let Some(name) = last_named_child(ns) {
                self.local_exports.push(module_export_name(name, src));
            }
            return;
        }

        if wildcard {
            if let Some(source) = source {
                self.wildcard_reexports.push(WildcardReExport { source, line });
            }
            return;
        }

        let Some(clause) = clause else {
            return;
        };

        let mut cursor = clause.walk();
        for spec in clause.children(&mut cursor) {
            if spec.kind() != "export_specifier" {
                continue;
            }
            let Some(name) = spec.child_by_field_name("name") else {
                continue;
            };
            let local = module_export_name(name, src);
            let exported = spec
                .child_by_field_name("alias")
                .map_or_else(|| local.clone(), |a| module_export_name(a, src));

            match &source {
                Some(source) => self.named_reexports.push(NamedReExport {
                    exported,
                    local,
                    source: source.clone(),
                    line: spec.start_position().row + 1,
                }),
                None => self.local_exports.push(exported),
            }
        }
    }

    fn collect_declaration(&mut self, decl: Node<'_>, src: &[u8]) {
        let line = decl.start_position().row + 1;
        let kind = match decl.kind() {
            "lexical_declaration" | "variable_declaration" => {
                let mut cursor = decl.walk();
                for declarator in decl.children(&mut cursor) {
                    if declarator.kind() != "variable_declarator" {
                        continue;
                    }
                    if let Some(name) = declarator.child_by_field_name("name") {
                        if name.kind() == "identifier" {
                            self.declarations.push(ExportedDecl {
                                name: text(name, src).to_owned(),
                                kind: DeclKind::Variable,
                                line,
                            });
                        }
                    }
                }
                return;
            }
            "ambient_declaration" => {
                let mut cursor = decl.walk();
                let inner: Vec<Node<'_>> = decl.named_children(&mut cursor).collect();
                for child in inner {
                    self.collect_declaration(child, src);
                }
                return;
            }
            "function_declaration" | "generator_function_declaration" | "function_signature" => {
                DeclKind::Function
            }
            "class_declaration" | "abstract_class_declaration" => DeclKind::Class,
            "interface_declaration" => DeclKind::Interface,
            "type_alias_declaration" => DeclKind::TypeAlias,
            "enum_declaration" => DeclKind::Enum,
            "internal_module" | "module" => DeclKind::Namespace,
            _ => return,
        };

        if let Some(name) = decl.child_by_field_name("name") {
            self.declarations.push(ExportedDecl {
                name: text(name, src).to_owned(),
                kind,
                line,
            });
        }
    }
}

fn extract_import(node: Node<'_>, src: &[u8]) -> Option<ImportStatement> {
    let source = string_value(node.child_by_field_name("source")?, src);
    let start = node.start_position();

    let mut import = ImportStatement {
        source,
        type_only: false,
        default: None,
        namespace: None,
        named: Vec::new(),
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
        line: start.row + 1,
        column: start.column + 1,
    };

    let mut cursor = node.walk();
    let mut clause = None;
    for child in node.children(&mut cursor) {
        match child.kind() {
            "type" if !child.is_named() => import.type_only = true,
            "import_clause" => clause = Some(child),
            _ => {}
        }
    }

    let Some(clause) = clause else {
        return Some(import);
    };

    let mut cursor = clause.walk();
    for child in clause.children(&mut cursor) {
        match child.kind() {
            "identifier" => import.default = Some(text(child, src).to_owned()),
            "namespace_import" => import.namespace = Some(text(child, src).to_owned()),
            "named_imports" => {
                let mut spec_cursor = child.walk();
                for spec in child.children(&mut spec_cursor) {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    if let Some(name) = spec.child_by_field_name("name") {
                        import.named.push(ImportSpecifier {
                            imported: module_export_name(name, src),
                            text: text(spec, src).to_owned(),
                        });
                    }
                }
            }
            _ => {}
        }
    }

    Some(import)
}

fn text<'a>(node: Node<'_>, src: &'a [u8]) -> &'a str {
    node.utf8_text(src).unwrap_or("")
}

/// Contents of a string literal node, without its quotes.
fn string_value(node: Node<'_>, src: &[u8]) -> String {
    let raw = text(node, src);
    raw.strip_prefix(['"', '\''])
        .and_then(|s| s.strip_suffix(['"', '\'']))
        .unwrap_or(raw)
        .to_owned()
}

/// An identifier, or a string literal used as an export name (`export { "a-b" }`).
fn module_export_name(node: Node<'_>, src: &[u8]) -> String {
    if node.kind() == "string" {
        string_value(node, src)
    } else {
        text(node, src).to_owned()
    }
}

fn last_named_child(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let last = node.named_children(&mut cursor).last();
    last
}

/// The grammar predates `export type * from` and `export type * as ns from`.
/// Blanking the `type` keyword turns them into the wildcard and namespace
/// re-exports they are for resolution, and keeps every byte offset.
fn mask_type_only_wildcards(source: &str) -> Cow<'_, str> {
    let mut masked: Option<String> = None;
    let mut line_start = 0;

    for line in source.split_inclusive('\n') {
        if let Some(at) = type_keyword_of_wildcard(line) {
            let at = line_start + at;
            masked
                .get_or_insert_with(|| source.to_owned())
                .replace_range(at..at + "type".len(), "    ");
        }
        line_start += line.len();
    }

    masked.map_or(Cow::Borrowed(source), Cow::Owned)
}

/// Offset of `type` in a line that starts with `export type *`.
fn type_keyword_of_wildcard(line: &str) -> Option<usize> {
    let body = line.trim_start();
    let rest = body.strip_prefix("export")?;
    let after_export = rest.trim_start();
    if after_export.len() == rest.len() {
        return None;
    }
    let after_type = after_export.strip_prefix("type")?;
    if !after_type.trim_start().starts_with('*') {
        return None;
    }
    Some(line.len() - after_export.len())
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }
    None
}
