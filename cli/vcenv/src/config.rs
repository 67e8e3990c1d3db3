//! `vcenv.toml` parsing and discovery.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use vcenv_core::{HostEnv, VcVersion};

/// The top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VcenvConfig {
    /// Default toolchain selection.
    #[serde(default)]
    pub toolchain: ToolchainConfig,
    /// Registry source.
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Host environment overrides.
    #[serde(default)]
    pub host: HostConfig,
}

/// Toolchain section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ToolchainConfig {
    /// Architecture spec (e.g., "amd64", "x86_amd64").
    #[serde(default)]
    pub arch: Option<String>,
    /// Pinned Visual C++ version.
    #[serde(default)]
    pub version: Option<VcVersion>,
    /// Minimum acceptable Visual C++ version.
    #[serde(default)]
    pub min_version: Option<VcVersion>,
}

/// Registry section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Snapshot file, relative to the configuration directory.
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
}

/// Host section. Each entry replaces the matching process variable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HostConfig {
    #[serde(default)]
    pub processor_architecture: Option<String>,
    #[serde(default)]
    pub windir: Option<PathBuf>,
    #[serde(default)]
    pub program_files: Option<PathBuf>,
    #[serde(default)]
    pub program_files_x86: Option<PathBuf>,
}

impl VcenvConfig {
    /// Search upward from `start_dir` for a `vcenv.toml` file, parse and return it
    /// along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join("vcenv.toml");
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let config: VcenvConfig = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((config, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a configuration from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing vcenv.toml")
    }

    /// Apply `[host]` overrides.
    pub fn apply_host(&self, mut host: HostEnv) -> HostEnv {
        let h = &self.host;
        if let Some(arch) = &h.processor_architecture {
            host = host.with_processor_architecture(arch);
        }
        if let Some(windir) = &h.windir {
            host = host.with_windir(windir);
        }
        if let Some(pf) = &h.program_files {
            host = host.with_program_files(pf);
        }
        if let Some(pf86) = &h.program_files_x86 {
            host = host.with_program_files_x86(pf86);
        }
        host
    }

    /// Snapshot path resolved against the directory holding the file.
    pub fn snapshot_path(&self, config_dir: &Path) -> Option<PathBuf> {
        self.registry.snapshot.as_ref().map(|p| config_dir.join(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[toolchain]
arch = "x86_amd64"
version = 14.0
min-version = 9

[registry]
snapshot = "registry.toml"

[host]
processor-architecture = "AMD64"
windir = 'D:\Windows'
program-files = 'D:\Program Files'
program-files-x86 = 'D:\Program Files (x86)'
"#;
        let config = VcenvConfig::from_str(toml_str).unwrap();
        assert_eq!(config.toolchain.arch.as_deref(), Some("x86_amd64"));
        assert_eq!(config.toolchain.version, Some(VcVersion::VC14));
        assert_eq!(config.toolchain.min_version, Some(VcVersion::VC9));

        let host = config.apply_host(HostEnv::new("x86", "C:/Windows", "C:/Program Files"));
        assert_eq!(host.processor_architecture(), "amd64");
        assert_eq!(host.windir(), Path::new(r"D:\Windows"));
        assert_eq!(host.program_files_x86(), Path::new(r"D:\Program Files (x86)"));

        assert_eq!(
            config.snapshot_path(Path::new("/work")),
            Some(Path::new("/work").join("registry.toml"))
        );
    }

    #[test]
    fn parse_empty_config() {
        let config = VcenvConfig::from_str("").unwrap();
        assert!(config.toolchain.arch.is_none());
        assert!(config.snapshot_path(Path::new(".")).is_none());

        let host = HostEnv::new("x86", "W", "P");
        assert_eq!(config.apply_host(host.clone()), host);
    }

    #[test]
    fn reject_non_numeric_version() {
        assert!(VcenvConfig::from_str("[toolchain]\nversion = \"fourteen\"\n").is_err());
    }

    #[test]
    fn find_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("vcenv.toml"), "[toolchain]\narch = \"amd64\"\n").unwrap();

        let (config, found) = VcenvConfig::find_and_load(&nested).unwrap().unwrap();
        assert_eq!(found, dir.path());
        assert_eq!(config.toolchain.arch.as_deref(), Some("amd64"));
    }

    #[test]
    fn find_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vcenv.toml"), "[toolchain\n").unwrap();
        let err = VcenvConfig::find_and_load(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
    }
}
