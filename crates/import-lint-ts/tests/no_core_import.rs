//! End-to-end tests of `no-trigger-core-import` over a fixture monorepo.

use import_lint_core::fix::apply_replacements;
use import_lint_core::{Analyzer, Config, FileContext, Rule, RuleOutput, Severity};
use import_lint_ts::{CoreImportOptions, NoTriggerCoreImport};
use std::path::{Path, PathBuf};

fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/monorepo")
}

fn rule() -> NoTriggerCoreImport {
    NoTriggerCoreImport::new(CoreImportOptions::default(), &fixture_root())
        .expect("fixture config should load")
}

fn check(rule: &NoTriggerCoreImport, source: &str) -> RuleOutput {
    let root = fixture_root();
    let path = root.join("apps/web/src/inline.ts");
    let ctx = FileContext::new(&path, source, &root);
    rule.check(&ctx)
}

#[test]
fn fixes_v3_import_to_defining_file() {
    let source = "import { Foo } from \"@trigger.dev/core/v3\";\n";
    let out = check(&rule(), source);

    assert_eq!(out.violations.len(), 1);
    let v = &out.violations[0];
    assert_eq!(v.code, "TCI001");
    assert_eq!(v.message_id.as_deref(), Some("noTriggerCoreImportFixable"));
    assert_eq!(
        v.message,
        "Use specific import from @trigger.dev/core/v3/foo instead of \"@trigger.dev/core/v3\""
    );

    let fix = v.fix().expect("violation should carry a fix");
    insta::assert_snapshot!(fix.new_text, @"import { Foo } from '@trigger.dev/core/v3/foo';");
    assert_eq!(&source[fix.location.byte_range()], source.trim_end());
}

#[test]
fn missing_symbol_is_reported_without_fix() {
    let out = check(&rule(), "import { Bar } from \"@trigger.dev/core\";\n");

    assert_eq!(out.violations.len(), 1);
    let v = &out.violations[0];
    assert_eq!(v.message_id.as_deref(), Some("noTriggerCoreImport"));
    assert_eq!(
        v.message,
        "Cannot import from \"@trigger.dev/core\": no specific import available"
    );
    assert!(v.fix().is_none());
}

#[test]
fn broken_dependency_is_listed_as_skipped() {
    let out = check(&rule(), "import { Bar } from \"@trigger.dev/core\";\n");

    assert_eq!(out.skipped.len(), 1);
    assert_eq!(
        out.skipped[0].path,
        PathBuf::from("packages/core/src/v3/broken.ts")
    );
}

#[test]
fn groups_specifiers_by_target_and_prefers_public_barrels() {
    let source = "import { Foo, ApiSchema, createFoo as make, type ApiType } from \"@trigger.dev/core/v3\";";
    let out = check(&rule(), source);

    let fix = out.violations[0].fix().expect("fixable");
    assert_eq!(
        fix.new_text,
        "import { Foo, createFoo as make } from '@trigger.dev/core/v3/foo';\n\
         import { ApiSchema, type ApiType } from '@trigger.dev/core/v3/schemas';"
    );
}

#[test]
fn deep_paths_when_barrels_are_not_preferred() {
    let options = CoreImportOptions {
        prefer_barrel: false,
        ..CoreImportOptions::default()
    };
    let rule = NoTriggerCoreImport::new(options, &fixture_root()).expect("config should load");
    let out = check(&rule, "import { ApiSchema } from \"@trigger.dev/core/v3\";");

    let fix = out.violations[0].fix().expect("fixable");
    insta::assert_snapshot!(
        fix.new_text,
        @"import { ApiSchema } from '@trigger.dev/core/v3/schemas/api';"
    );
}

#[test]
fn unresolved_specifiers_stay_on_original_source() {
    let source = "import type { Foo, Bar, Alias, VERSION } from \"@trigger.dev/core\";";
    let out = check(&rule(), source);

    let fix = out.violations[0].fix().expect("fixable");
    assert_eq!(
        fix.new_text,
        "import type { Foo } from '@trigger.dev/core/v3/foo';\n\
         import type { Bar, Alias, VERSION } from '@trigger.dev/core';"
    );
}

#[test]
fn unblocked_sources_and_unrelated_files_are_ignored() {
    let rule = rule();
    let out = check(&rule, "import { Foo } from \"@trigger.dev/core/v3/foo\";\n");
    assert!(out.violations.is_empty());

    let out = check(&rule, "export const = ;\n");
    assert!(out.violations.is_empty());
    assert!(out.skipped.is_empty());
}

#[test]
fn unparsable_linted_file_is_skipped() {
    let out = check(&rule(), "import { Foo } from \"@trigger.dev/core/v3\";\nexport const = ;\n");
    assert!(out.violations.is_empty());
    assert_eq!(out.skipped.len(), 1);
    assert_eq!(out.skipped[0].path, PathBuf::from("apps/web/src/inline.ts"));
}

#[test]
fn type_only_wildcard_in_linted_file_does_not_skip_it() {
    let source = "export type * from './types';\nimport { Foo } from \"@trigger.dev/core/v3\";\n";
    let out = check(&rule(), source);

    assert!(out.skipped.is_empty());
    assert_eq!(out.violations.len(), 1);
    let fix = out.violations[0].fix().expect("violation should carry a fix");
    assert_eq!(&source[fix.location.byte_range()], "import { Foo } from \"@trigger.dev/core/v3\";");
}

#[test]
fn missing_manifest_is_a_config_error() {
    let options = CoreImportOptions {
        manifest: PathBuf::from("packages/nope/package.json"),
        ..CoreImportOptions::default()
    };
    assert!(NoTriggerCoreImport::new(options, &fixture_root()).is_err());
}

#[test]
fn allowed_barrels_exclude_blocked_sources() {
    let barrels: Vec<String> = rule().barrels().iter().map(str::to_string).collect();
    assert_eq!(barrels, vec!["@trigger.dev/core/v3/schemas"]);
}

#[test]
fn analyzer_run_and_fix() {
    let root = fixture_root();
    let config = Config::parse(
        r#"
[rules.no-trigger-core-import]
severity = "warning"
"#,
    )
    .expect("config should parse");
    let rule = NoTriggerCoreImport::from_config(&config, &root).expect("rule should load");

    let result = Analyzer::builder()
        .root(&root)
        .rule(rule)
        .config(config)
        .build()
        .expect("analyzer should build")
        .analyze()
        .expect("analysis should succeed");

    let files: Vec<&Path> = result
        .violations
        .iter()
        .map(|v| v.location.file.as_path())
        .collect();
    assert_eq!(
        files,
        vec![
            Path::new("apps/web/src/missing.ts"),
            Path::new("apps/web/src/task.ts"),
            Path::new("apps/web/src/task.ts"),
        ]
    );
    assert!(result.violations.iter().all(|v| v.severity == Severity::Warning));
    assert_eq!(result.fixable_count(), 2);
    assert_eq!(result.skipped.len(), 1);

    let task = std::fs::read_to_string(root.join("apps/web/src/task.ts")).expect("fixture");
    let fixes = result
        .violations
        .iter()
        .filter(|v| v.location.file == Path::new("apps/web/src/task.ts"))
        .filter_map(|v| v.fix());
    let outcome = apply_replacements(&task, fixes);
    assert_eq!(outcome.applied, 2);
    insta::assert_snapshot!(outcome.content, @r#"
    import { Foo, createFoo as make } from '@trigger.dev/core/v3/foo';
    import { ApiSchema } from '@trigger.dev/core/v3/schemas';

    export const foo: Foo = make("a");
    export const schema = ApiSchema;
    "#);
}
