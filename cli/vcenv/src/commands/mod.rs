//! CLI command implementations.

pub mod describe;
pub mod env;
pub mod snapshot;
pub mod vcvarsall;
pub mod versions;

use std::path::PathBuf;

use anyhow::{Context, Result};
use vcenv_core::{default_backend, load_registry, EnvironmentInfo, HostEnv, RegistryBackend, VcVersion};

use crate::config::ToolchainConfig;

/// Everything a command needs to resolve against: the host, the registry
/// source and configured defaults.
#[derive(Debug, Clone)]
pub struct Session {
    pub host: HostEnv,
    pub snapshot: Option<PathBuf>,
    pub defaults: ToolchainConfig,
}

impl Session {
    /// Open the registry: the snapshot when one is configured, else the host's.
    pub fn backend(&self) -> Result<Box<dyn RegistryBackend>> {
        match &self.snapshot {
            Some(path) => {
                let registry = load_registry(path)
                    .with_context(|| format!("loading registry snapshot {}", path.display()))?;
                Ok(Box::new(registry))
            }
            None => Ok(default_backend()),
        }
    }

    /// Architecture spec: explicit, configured, or the host CPU.
    pub fn arch(&self, arch: Option<&str>) -> String {
        arch.or(self.defaults.arch.as_deref())
            .unwrap_or(self.host.processor_architecture())
            .to_string()
    }

    /// Resolve an environment, with flags taking precedence over `vcenv.toml`.
    pub fn environment(
        &self,
        arch: Option<&str>,
        vcver: Option<VcVersion>,
        vcvermin: Option<VcVersion>,
    ) -> Result<EnvironmentInfo> {
        let arch = self.arch(arch);
        let env = EnvironmentInfo::new(
            &arch,
            vcver.or(self.defaults.version),
            vcvermin.or(self.defaults.min_version),
            self.host.clone(),
            self.backend()?,
        )?;
        Ok(env)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arch_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = fixtures::vc_for_python(dir.path());
        assert_eq!(session.arch(None), "amd64");
        session.defaults.arch = Some("x86".into());
        assert_eq!(session.arch(None), "x86");
        assert_eq!(session.arch(Some("x86_amd64")), "x86_amd64");
    }

    #[test]
    fn environment_from_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let session = fixtures::vc_for_python(dir.path());
        let env = session.environment(None, None, None).unwrap();
        assert_eq!(env.vcver(), VcVersion::VC9);
    }

    #[test]
    fn configured_minimum_applies() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = fixtures::vc_for_python(dir.path());
        session.defaults.min_version = Some(VcVersion::VC14);
        let err = session.environment(None, None, None).unwrap_err();
        assert_eq!(err.to_string(), "No suitable Microsoft Visual C++ version found");
        assert!(session.environment(None, None, Some(VcVersion::VC9)).is_ok());
    }

    #[test]
    fn missing_snapshot_has_context() {
        let session = Session {
            host: HostEnv::new("x86", "W", "P"),
            snapshot: Some(PathBuf::from("does-not-exist.toml")),
            defaults: ToolchainConfig::default(),
        };
        let err = session.backend().unwrap_err();
        assert!(format!("{err:#}").contains("snapshot file not found"));
    }
}
