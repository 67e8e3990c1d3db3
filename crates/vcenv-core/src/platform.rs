//! Current and target CPU architectures.
//!
//! Visual C++ installs keep per-architecture binaries and libraries in
//! subfolders (`Lib\amd64`, `Bin\x86_arm`, `um\x64`, ...). [`PlatformInfo`]
//! produces those subfolder fragments from an architecture spec such as
//! `"amd64"` or `"x86_amd64"`.

use std::path::MAIN_SEPARATOR;

/// Host and target architecture pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    arch: String,
    current_cpu: String,
}

impl PlatformInfo {
    /// Build from an architecture spec and the host CPU name.
    pub fn new(arch: &str, current_cpu: &str) -> Self {
        Self {
            arch: arch.to_lowercase(),
            current_cpu: current_cpu.to_lowercase(),
        }
    }

    /// The normalized architecture spec.
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// The host CPU.
    pub fn current_cpu(&self) -> &str {
        &self.current_cpu
    }

    /// The target CPU: the part of the spec after the last underscore.
    pub fn target_cpu(&self) -> &str {
        match self.arch.rsplit_once('_') {
            Some((_, target)) => target,
            None => &self.arch,
        }
    }

    pub fn target_is_x86(&self) -> bool {
        self.target_cpu() == "x86"
    }

    pub fn current_is_x86(&self) -> bool {
        self.current_cpu == "x86"
    }

    /// Host subfolder fragment, e.g. `\amd64`.
    ///
    /// `hidex86` yields `""` for x86; `x64` yields `\x64` instead of `\amd64`.
    pub fn current_dir(&self, hidex86: bool, x64: bool) -> String {
        arch_dir(&self.current_cpu, hidex86, x64)
    }

    /// Target subfolder fragment, with the same substitutions as
    /// [`current_dir`](Self::current_dir).
    pub fn target_dir(&self, hidex86: bool, x64: bool) -> String {
        arch_dir(self.target_cpu(), hidex86, x64)
    }

    /// Cross-compiler subfolder fragment, e.g. `\x86_amd64`.
    ///
    /// Empty when the target is the real host CPU. Otherwise `forcex86`
    /// names the host `x86` whatever it really is, as older toolchains only
    /// ship x86-hosted cross compilers; an x86 target then needs no cross
    /// folder either.
    pub fn cross_dir(&self, forcex86: bool) -> String {
        let target = self.target_cpu();
        if target == self.current_cpu {
            return String::new();
        }
        let current = if forcex86 { "x86" } else { &self.current_cpu };
        if target == current {
            String::new()
        } else {
            format!("{MAIN_SEPARATOR}{current}_{target}")
        }
    }
}

fn arch_dir(cpu: &str, hidex86: bool, x64: bool) -> String {
    if cpu == "x86" && hidex86 {
        String::new()
    } else if cpu == "amd64" && x64 {
        format!("{MAIN_SEPARATOR}x64")
    } else {
        format!("{MAIN_SEPARATOR}{cpu}")
    }
}
