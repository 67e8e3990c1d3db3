//! `vcenv snapshot`: registry snapshot validation and templates.

use std::path::Path;

use anyhow::{bail, Context, Result};
use vcenv_core::snapshot::{generate_template, load_snapshot_toml, validate_snapshot};

/// Validate a snapshot file and report issues.
pub fn validate(path: &Path) -> Result<()> {
    let snapshot = load_snapshot_toml(path)
        .with_context(|| format!("loading {}", path.display()))?;
    match validate_snapshot(&snapshot) {
        Ok(()) => {
            println!("{}: OK ({} keys)", path.display(), snapshot.keys.len());
            Ok(())
        }
        Err(issues) => {
            let mut errors = 0;
            for issue in &issues {
                println!("  {}: {}", issue.severity, issue.message);
                if issue.severity == "error" {
                    errors += 1;
                }
            }
            if errors > 0 {
                bail!("{}: {errors} error(s)", path.display());
            }
            println!("{}: OK with {} warning(s)", path.display(), issues.len());
            Ok(())
        }
    }
}

/// Print a template snapshot.
pub fn template() -> Result<()> {
    print!("{}", generate_template()?);
    Ok(())
}
