//! `vcenv describe`: per-component breakdown of a resolution.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use vcenv_core::{EnvironmentInfo, VcVersion};

use super::Session;

/// Print the selected toolchain and every component's candidate directories.
pub fn run(session: &Session, arch: Option<&str>, vcver: Option<VcVersion>) -> Result<()> {
    let env = session.environment(arch, vcver, None)?;
    print!("{}", report(&env));
    Ok(())
}

/// Build the description text.
pub fn report(env: &EnvironmentInfo) -> String {
    let si = env.system();
    let pi = si.platform();
    let mut out = String::new();

    let _ = writeln!(out, "=== Visual C++ {} ===", env.vcver());
    let _ = writeln!(out, "Host CPU:   {}", pi.current_cpu());
    let _ = writeln!(out, "Target CPU: {}", pi.target_cpu());
    let installed: Vec<String> = si
        .find_availables_vcver()
        .iter()
        .map(|v| v.to_string())
        .collect();
    let _ = writeln!(out, "Installed:  {}", installed.join(", "));
    out.push('\n');

    let _ = writeln!(out, "--- Directories ---");
    let _ = writeln!(out, "  Visual Studio: {}", si.vs_install_dir().display());
    match si.vc_install_dir() {
        Ok(dir) => {
            let _ = writeln!(out, "  Visual C++:    {}", dir.display());
        }
        Err(e) => {
            let _ = writeln!(out, "  Visual C++:    ({e})");
        }
    }
    match si.windows_sdk_dir() {
        Ok(dir) => {
            let _ = writeln!(out, "  Windows SDK:   {}", dir.display());
        }
        Err(e) => {
            let _ = writeln!(out, "  Windows SDK:   ({e})");
        }
    }
    let optional = [
        ("Universal CRT", si.universal_crt_sdk_dir()),
        (".NET SDK", si.netfx_sdk_dir()),
        ("F#", si.fsharp_install_dir()),
    ];
    for (label, dir) in optional {
        if let Some(dir) = dir {
            let _ = writeln!(out, "  {:<14} {}", format!("{label}:"), dir.display());
        }
    }
    out.push('\n');

    let facets: Vec<(&str, vcenv_core::Result<Vec<PathBuf>>)> = vec![
        ("VC tools", env.vc_tools()),
        ("VC includes", env.vc_includes()),
        ("VC libraries", env.vc_libraries()),
        ("VC store references", env.vc_store_refs()),
        ("VS tools", Ok(env.vs_tools())),
        ("VS team database", Ok(env.vs_tdb())),
        ("OS includes", env.os_includes()),
        ("OS libraries", env.os_libraries()),
        ("OS libpath", env.os_libpath()),
        ("SDK tools", env.sdk_tools()),
        ("SDK setup", env.sdk_setup()),
        (".NET tools", Ok(env.fx_tools())),
        (".NET SDK includes", Ok(env.netfx_sdk_includes())),
        (".NET SDK libraries", Ok(env.netfx_sdk_libraries())),
        ("MSBuild", Ok(env.msbuild())),
        ("HTML Help Workshop", Ok(env.html_help_workshop())),
        ("UCRT includes", Ok(env.ucrt_includes())),
        ("UCRT libraries", Ok(env.ucrt_libraries())),
        ("F#", Ok(env.fsharp())),
    ];

    let _ = writeln!(out, "--- Components ---");
    for (label, paths) in facets {
        match paths {
            Ok(paths) if paths.is_empty() => {
                let _ = writeln!(out, "  {label}: (none)");
            }
            Ok(paths) => {
                let _ = writeln!(out, "  {label}:");
                for path in paths {
                    let mark = if path.is_dir() { "+" } else { "-" };
                    let _ = writeln!(out, "    {mark} {}", path.display());
                }
            }
            Err(e) => {
                let _ = writeln!(out, "  {label}: ({e})");
            }
        }
    }
    out
}
