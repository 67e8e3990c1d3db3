//! `vcenv env`: print the resolved build environment.

use anyhow::{bail, Result};
use vcenv_core::{EnvMap, VcVersion};

use super::Session;

/// Resolve and print the environment in `format` (`shell` or `json`).
pub fn run(
    session: &Session,
    arch: Option<&str>,
    vcver: Option<VcVersion>,
    vcvermin: Option<VcVersion>,
    format: &str,
) -> Result<()> {
    let map = session.environment(arch, vcver, vcvermin)?.return_env()?;
    print!("{}", render(&map, format)?);
    Ok(())
}

/// Render an environment as `NAME=value` lines or a JSON object.
pub fn render(map: &EnvMap, format: &str) -> Result<String> {
    match format {
        "shell" => {
            let mut out = String::new();
            for (name, value) in map.vars() {
                out.push_str(&format!("{name}={value}\n"));
            }
            if let Some(redist) = &map.py_vcruntime_redist {
                out.push_str(&format!("PY_VCRUNTIME_REDIST={}\n", redist.display()));
            }
            Ok(out)
        }
        "json" => {
            let mut json = serde_json::to_string_pretty(map)?;
            json.push('\n');
            Ok(json)
        }
        other => bail!("unknown format '{other}' (expected 'shell' or 'json')"),
    }
}
