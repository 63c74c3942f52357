//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# import-lint configuration

[analyzer]
# Root directory to analyze (default: the path given to `import-lint check`)
# root = "."

# Glob patterns to exclude from analysis
exclude = [
    "**/node_modules/**",
    "**/dist/**",
]

# File extensions to lint
extensions = ["ts", "tsx", "mts", "cts", "js", "jsx"]

# Respect .gitignore files
respect_gitignore = true

# Rewrites barrel imports from the core package into specific sub-path imports.
# Paths are relative to the directory holding this file.
[rules.no-trigger-core-import]
enabled = true
# severity = "warning"  # Override default severity
package_alias = "@trigger.dev/core"
manifest = "packages/core/package.json"
source_root = "packages/core/src"
tsconfig = "tsconfig.json"
blocked = ["@trigger.dev/core", "@trigger.dev/core/v3"]
# Import from a public entry point on the re-export chain when there is one
prefer_barrel = true
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("import-lint.toml");
    write_config(config_path, force)?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Point the rule at your core package in import-lint.toml");
    println!("  2. Run: import-lint check");
    println!("  3. Apply fixes: import-lint check --fix");

    Ok(())
}

fn write_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))
}
