//! `vcenv versions`: list registered Visual C++ toolchains.

use anyhow::Result;
use vcenv_core::system::available_versions;
use vcenv_core::{PlatformInfo, RegistryInfo, VcVersion};

use super::Session;

/// Print every registered version, newest last.
pub fn run(session: &Session) -> Result<()> {
    let versions = list(session)?;
    if versions.is_empty() {
        println!("No Microsoft Visual C++ toolchains registered.");
        return Ok(());
    }
    println!("Registered Visual C++ versions:");
    for version in versions {
        println!("  {version}");
    }
    Ok(())
}

/// Registered versions, ascending.
pub fn list(session: &Session) -> Result<Vec<VcVersion>> {
    let host_cpu = session.host.processor_architecture();
    let platform = PlatformInfo::new(host_cpu, host_cpu);
    let registry = RegistryInfo::new(platform, session.backend()?);
    Ok(available_versions(&registry))
}
