//! Host facts consumed by resolution.
//!
//! Everything the resolver reads from the process environment goes through
//! [`HostEnv`], so tests can describe a Windows host from any platform.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Snapshot of the host environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnv {
    processor_architecture: String,
    windir: PathBuf,
    program_files: PathBuf,
    program_files_x86: PathBuf,
    vars: HashMap<String, String>,
}

impl HostEnv {
    /// Describe a host explicitly.
    ///
    /// `ProgramFiles(x86)` defaults to `ProgramFiles`, as on 32-bit Windows.
    pub fn new(
        processor_architecture: impl Into<String>,
        windir: impl Into<PathBuf>,
        program_files: impl Into<PathBuf>,
    ) -> Self {
        let program_files = program_files.into();
        Self {
            processor_architecture: processor_architecture.into().to_lowercase(),
            windir: windir.into(),
            program_files_x86: program_files.clone(),
            program_files,
            vars: HashMap::new(),
        }
    }

    /// Set `ProgramFiles(x86)`.
    pub fn with_program_files_x86(mut self, path: impl Into<PathBuf>) -> Self {
        self.program_files_x86 = path.into();
        self
    }

    /// Set an environment variable visible to path building.
    ///
    /// Names are case-insensitive, as on Windows.
    pub fn with_var(mut self, name: &str, value: impl Into<String>) -> Self {
        self.vars.insert(name.to_uppercase(), value.into());
        self
    }

    /// Override the host CPU.
    pub fn with_processor_architecture(mut self, arch: &str) -> Self {
        self.processor_architecture = arch.to_lowercase();
        self
    }

    /// Override `WinDir`.
    pub fn with_windir(mut self, path: impl Into<PathBuf>) -> Self {
        self.windir = path.into();
        self
    }

    /// Override `ProgramFiles`.
    pub fn with_program_files(mut self, path: impl Into<PathBuf>) -> Self {
        self.program_files = path.into();
        self
    }

    /// Read the host from the current process environment.
    pub fn from_process() -> Self {
        let vars: HashMap<String, String> = std::env::vars()
            .map(|(k, v)| (k.to_uppercase(), v))
            .collect();

        let processor_architecture = vars
            .get("PROCESSOR_ARCHITECTURE")
            .map(|a| a.to_lowercase())
            .unwrap_or_else(|| native_cpu().to_string());
        let windir = vars
            .get("WINDIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\Windows"));
        let program_files = vars
            .get("PROGRAMFILES")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\Program Files"));
        let program_files_x86 = vars
            .get("PROGRAMFILES(X86)")
            .map(PathBuf::from)
            .unwrap_or_else(|| program_files.clone());

        Self {
            processor_architecture,
            windir,
            program_files,
            program_files_x86,
            vars,
        }
    }

    /// Lowercased host CPU name (`x86`, `amd64`, `arm64`, ...).
    pub fn processor_architecture(&self) -> &str {
        &self.processor_architecture
    }

    /// The Windows directory.
    pub fn windir(&self) -> &Path {
        &self.windir
    }

    /// `ProgramFiles`.
    pub fn program_files(&self) -> &Path {
        &self.program_files
    }

    /// `ProgramFiles(x86)`.
    pub fn program_files_x86(&self) -> &Path {
        &self.program_files_x86
    }

    /// Look up an environment variable by case-insensitive name.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(&name.to_uppercase()).map(String::as_str)
    }
}

/// Windows CPU name of the architecture this binary was compiled for.
fn native_cpu() -> &'static str {
    match std::env::consts::ARCH {
        "x86" => "x86",
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "arm" => "arm",
        other => other,
    }
}
