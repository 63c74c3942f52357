//! List rules command implementation.

use import_lint_ts::no_core_import;

/// Name, code, fixability and description of every available rule.
const RULES: &[(&str, &str, bool, &str)] = &[(
    no_core_import::NAME,
    no_core_import::CODE,
    true,
    no_core_import::DESCRIPTION,
)];

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<10} {:<25} {:<8} Description", "Code", "Name", "Fix");
    println!("{}", "-".repeat(80));

    for (name, code, fixable, description) in RULES {
        let fix = if *fixable { "yes" } else { "" };
        println!("{code:<10} {name:<25} {fix:<8} {description}");
    }

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  import-lint check --rules {}", no_core_import::NAME);
    println!("  import-lint check --rules {} --fix", no_core_import::CODE);
}
