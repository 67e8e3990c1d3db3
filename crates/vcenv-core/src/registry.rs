//! Registry access and Visual Studio registry key layout.
//!
//! The [`RegistryBackend`] trait abstracts over the native Windows registry
//! and in-memory registries used for snapshots and tests. [`RegistryInfo`]
//! knows where Microsoft tools register themselves and probes the four hive
//! roots in a fixed order.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::platform::PlatformInfo;

/// A registry hive root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Hive {
    /// `HKEY_USERS`.
    Users,
    /// `HKEY_CURRENT_USER`.
    CurrentUser,
    /// `HKEY_LOCAL_MACHINE`.
    LocalMachine,
    /// `HKEY_CLASSES_ROOT`.
    ClassesRoot,
}

impl Hive {
    /// Probe order used by every lookup: first match wins.
    pub const PROBE_ORDER: [Hive; 4] = [
        Hive::Users,
        Hive::CurrentUser,
        Hive::LocalMachine,
        Hive::ClassesRoot,
    ];
}

impl fmt::Display for Hive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Hive::Users => "HKEY_USERS",
            Hive::CurrentUser => "HKEY_CURRENT_USER",
            Hive::LocalMachine => "HKEY_LOCAL_MACHINE",
            Hive::ClassesRoot => "HKEY_CLASSES_ROOT",
        };
        f.write_str(name)
    }
}

/// Names found directly under a registry key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyListing {
    /// Names of the key's values.
    pub values: Vec<String>,
    /// Names of the key's direct subkeys.
    pub subkeys: Vec<String>,
}

/// Abstract read-only registry.
///
/// Missing keys and values are `None`, never errors.
pub trait RegistryBackend: fmt::Debug {
    /// Read a string value from `key` under `hive`.
    fn value(&self, hive: Hive, key: &str, name: &str) -> Option<String>;

    /// List value and subkey names of `key` under `hive`.
    fn listing(&self, hive: Hive, key: &str) -> Option<KeyListing>;
}

/// The registry of the running host.
///
/// On Windows this is the native registry; elsewhere an empty in-memory
/// registry, so resolution fails with "no version found".
pub fn default_backend() -> Box<dyn RegistryBackend> {
    #[cfg(windows)]
    {
        Box::new(crate::winreg_backend::WindowsRegistry)
    }
    #[cfg(not(windows))]
    {
        Box::new(crate::memory::MemoryRegistry::new())
    }
}

/// Probe every hive in [`Hive::PROBE_ORDER`] and return the first value found.
pub fn lookup(backend: &dyn RegistryBackend, key: &str, name: &str) -> Option<String> {
    for hive in Hive::PROBE_ORDER {
        if let Some(value) = backend.value(hive, key, name) {
            trace!(%hive, key, name, value = %value, "registry hit");
            return Some(value);
        }
    }
    trace!(key, name, "registry miss");
    None
}

/// Join registry key components with backslashes, skipping empty ones.
pub fn key_join<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.trim_matches('\\'))
        .collect::<Vec<_>>()
        .join("\\")
}

/// Microsoft Visual Studio related registry locations.
#[derive(Debug)]
pub struct RegistryInfo {
    platform: PlatformInfo,
    backend: Box<dyn RegistryBackend>,
}

impl RegistryInfo {
    pub fn new(platform: PlatformInfo, backend: Box<dyn RegistryBackend>) -> Self {
        Self { platform, backend }
    }

    pub fn platform(&self) -> &PlatformInfo {
        &self.platform
    }

    pub fn backend(&self) -> &dyn RegistryBackend {
        self.backend.as_ref()
    }

    /// `Software\Microsoft`, redirected through `Wow6432Node` on 64-bit hosts.
    pub fn microsoft(&self) -> String {
        let node = if self.platform.current_is_x86() {
            ""
        } else {
            "Wow6432Node"
        };
        key_join(["Software", node, "Microsoft"])
    }

    pub fn visualstudio(&self) -> String {
        key_join([self.microsoft().as_str(), "VisualStudio"])
    }

    pub fn sxs(&self) -> String {
        key_join([self.visualstudio().as_str(), "SxS"])
    }

    /// Visual C++ install directories, one value per version.
    pub fn vc(&self) -> String {
        key_join([self.sxs().as_str(), "VC7"])
    }

    /// Visual Studio install directories, one value per version.
    pub fn vs(&self) -> String {
        key_join([self.sxs().as_str(), "VS7"])
    }

    /// Visual C++ Compiler for Python, one subkey per version.
    pub fn vc_for_python(&self) -> String {
        key_join([self.microsoft().as_str(), r"DevDiv\VCForPython"])
    }

    pub fn microsoft_sdk(&self) -> String {
        key_join([self.microsoft().as_str(), "Microsoft SDKs"])
    }

    /// Windows / Platform SDKs.
    pub fn windows_sdk(&self) -> String {
        key_join([self.microsoft_sdk().as_str(), "Windows"])
    }

    /// .NET Framework SDKs.
    pub fn netfx_sdk(&self) -> String {
        key_join([self.microsoft_sdk().as_str(), "NETFXSDK"])
    }

    pub fn windows_kits_roots(&self) -> String {
        key_join([self.microsoft().as_str(), r"Windows Kits\Installed Roots"])
    }

    /// Look up `name` under `key`, first hive wins.
    pub fn lookup(&self, key: &str, name: &str) -> Option<String> {
        lookup(self.backend.as_ref(), key, name)
    }

    /// Like [`lookup`](Self::lookup), treating empty values as absent.
    pub fn lookup_path(&self, key: &str, name: &str) -> Option<PathBuf> {
        self.lookup(key, name)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }
}
