//! Installed Visual Studio, Windows SDK and .NET Framework locations.
//!
//! Every directory is resolved the same way: compute the conventional
//! default for the toolchain version, let a registry value override it, and
//! for some properties walk an ordered candidate list until one exists.

use std::iter;
use std::path::{PathBuf, MAIN_SEPARATOR};

use tracing::debug;

use crate::error::{Result, VcEnvError};
use crate::host::HostEnv;
use crate::paths::{first_existing_dir, join_rel};
use crate::platform::PlatformInfo;
use crate::registry::{key_join, Hive, RegistryInfo};
use crate::version::VcVersion;

/// Windows SDK versions to try for a toolchain, most preferred first.
pub fn windows_sdk_versions(vcver: VcVersion) -> &'static [&'static str] {
    if vcver >= VcVersion::VC14 {
        &["10.0", "8.1"]
    } else if vcver >= VcVersion::VC12 {
        &["8.1", "8.1a"]
    } else if vcver >= VcVersion::VC11 {
        &["8.0", "8.0a"]
    } else if vcver >= VcVersion::VC10 {
        &["7.1", "7.0a"]
    } else {
        &["7.0", "6.1", "6.0a"]
    }
}

/// .NET Framework SDK versions to try for a toolchain.
pub fn netfx_sdk_versions(vcver: VcVersion) -> &'static [&'static str] {
    if vcver >= VcVersion::VC14 {
        &["4.6.1", "4.6"]
    } else {
        &[]
    }
}

/// System information for one toolchain version.
#[derive(Debug)]
pub struct SystemInfo {
    registry: RegistryInfo,
    host: HostEnv,
    vcver: VcVersion,
}

impl SystemInfo {
    /// Bind to `vcver`, or to the newest installed version when `None`.
    pub fn new(registry: RegistryInfo, host: HostEnv, vcver: Option<VcVersion>) -> Result<Self> {
        let vcver = match vcver {
            Some(v) => v,
            None => match available_versions(&registry).last() {
                Some(v) => *v,
                None => {
                    return Err(VcEnvError::platform(
                        "No Microsoft Visual C++ version found",
                    ))
                }
            },
        };
        debug!(%vcver, "selected Visual C++ version");
        Ok(Self {
            registry,
            host,
            vcver,
        })
    }

    pub fn vcver(&self) -> VcVersion {
        self.vcver
    }

    pub fn registry(&self) -> &RegistryInfo {
        &self.registry
    }

    pub fn platform(&self) -> &PlatformInfo {
        self.registry.platform()
    }

    pub fn host(&self) -> &HostEnv {
        &self.host
    }

    /// All Visual C++ versions registered on this machine, ascending.
    pub fn find_availables_vcver(&self) -> Vec<VcVersion> {
        available_versions(&self.registry)
    }

    fn version_name(&self) -> String {
        self.vcver.to_string()
    }

    /// Install directory of the Visual C++ Compiler for Python, if registered.
    pub fn vc_for_python_dir(&self) -> Option<PathBuf> {
        let key = key_join([
            self.registry.vc_for_python().as_str(),
            self.version_name().as_str(),
        ]);
        self.registry.lookup_path(&key, "installdir")
    }

    /// Microsoft Visual Studio directory.
    pub fn vs_install_dir(&self) -> PathBuf {
        self.registry
            .lookup_path(&self.registry.vs(), &self.version_name())
            .unwrap_or_else(|| {
                self.host
                    .program_files_x86()
                    .join(format!("Microsoft Visual Studio {}", self.vcver))
            })
    }

    /// Microsoft Visual C++ directory. Must exist.
    pub fn vc_install_dir(&self) -> Result<PathBuf> {
        let default = match self.vc_for_python_dir() {
            Some(dir) => dir.join("VC"),
            None => self
                .host
                .program_files_x86()
                .join(format!("Microsoft Visual Studio {}", self.vcver))
                .join("VC"),
        };
        let dir = self
            .registry
            .lookup_path(&self.registry.vc(), &self.version_name())
            .unwrap_or(default);

        if !dir.is_dir() {
            return Err(VcEnvError::platform(
                "Microsoft Visual C++ directory not found",
            ));
        }
        Ok(dir)
    }

    /// Windows SDK versions matching this toolchain, most preferred first.
    pub fn windows_sdk_version(&self) -> &'static [&'static str] {
        windows_sdk_versions(self.vcver)
    }

    /// Microsoft Windows SDK directory.
    pub fn windows_sdk_dir(&self) -> Result<PathBuf> {
        let versions = self.windows_sdk_version();
        let windows_sdk = self.registry.windows_sdk();
        let program_files = self.host.program_files();

        let from_registry = versions.iter().filter_map(|ver| {
            let key = key_join([windows_sdk.as_str(), format!("v{ver}").as_str()]);
            self.registry.lookup_path(&key, "installationfolder")
        });
        let from_vc_for_python =
            iter::once_with(|| self.vc_for_python_dir().map(|d| d.join("WinSDK"))).flatten();
        let new_layout = versions.iter().map(|ver| {
            let major = ver.rsplit_once('.').map_or(*ver, |(major, _)| major);
            join_rel(
                program_files,
                &format!(r"Microsoft SDKs\Windows Kits\{major}"),
            )
        });
        let old_layout = versions
            .iter()
            .map(|ver| join_rel(program_files, &format!(r"Microsoft SDKs\Windows\v{ver}")));

        let found = first_existing_dir(
            from_registry
                .chain(from_vc_for_python)
                .chain(new_layout)
                .chain(old_layout),
        );
        match found {
            Some(dir) => Ok(dir),
            None => Ok(self.vc_install_dir()?.join("PlatformSDK")),
        }
    }

    /// Microsoft Windows SDK .NET tools directory.
    pub fn windows_sdk_executable_path(&self) -> Option<PathBuf> {
        let fx = if self.vcver <= VcVersion::VC11 {
            "WinSDK-NetFx35Tools".to_string()
        } else {
            let hidex86 = self.vcver <= VcVersion::VC12;
            let arch = self.platform().current_dir(hidex86, true);
            format!("WinSDK-NetFx40Tools{}", arch.replace(MAIN_SEPARATOR, "-"))
        };

        let mut keys = Vec::new();
        if self.vcver >= VcVersion::VC14 {
            let netfx_sdk = self.registry.netfx_sdk();
            for ver in self.netfx_sdk_version() {
                keys.push(key_join([netfx_sdk.as_str(), *ver, fx.as_str()]));
            }
        }
        let windows_sdk = self.registry.windows_sdk();
        for ver in self.windows_sdk_version() {
            keys.push(key_join([
                windows_sdk.as_str(),
                format!("v{ver}A").as_str(),
                fx.as_str(),
            ]));
        }

        first_existing_dir(
            keys.iter()
                .filter_map(|key| self.registry.lookup_path(key, "installationfolder")),
        )
    }

    /// Microsoft Visual F# directory.
    pub fn fsharp_install_dir(&self) -> Option<PathBuf> {
        let key = key_join([
            self.registry.visualstudio().as_str(),
            self.version_name().as_str(),
            r"Setup\F#",
        ]);
        self.registry.lookup_path(&key, "productdir")
    }

    /// Microsoft Universal CRT SDK directory (toolchains 14.0 and later).
    pub fn universal_crt_sdk_dir(&self) -> Option<PathBuf> {
        if self.vcver < VcVersion::VC14 {
            return None;
        }
        let roots = self.registry.windows_kits_roots();
        let from_registry = ["10", "81"]
            .into_iter()
            .filter_map(|ver| self.registry.lookup_path(&roots, &format!("kitsroot{ver}")));
        let conventional = ["10", "8.1"]
            .into_iter()
            .map(|ver| join_rel(self.host.program_files_x86(), &format!(r"Windows Kits\{ver}")));
        first_existing_dir(from_registry.chain(conventional))
    }

    /// .NET Framework SDK versions matching this toolchain.
    pub fn netfx_sdk_version(&self) -> &'static [&'static str] {
        netfx_sdk_versions(self.vcver)
    }

    /// Microsoft .NET Framework SDK directory.
    pub fn netfx_sdk_dir(&self) -> Option<PathBuf> {
        let netfx_sdk = self.registry.netfx_sdk();
        first_existing_dir(self.netfx_sdk_version().iter().filter_map(|ver| {
            let key = key_join([netfx_sdk.as_str(), *ver]);
            self.registry.lookup_path(&key, "kitsinstallationfolder")
        }))
    }

    /// Microsoft .NET Framework 32-bit directory.
    pub fn framework_dir32(&self) -> PathBuf {
        self.registry
            .lookup_path(&self.registry.vc(), "frameworkdir32")
            .unwrap_or_else(|| join_rel(self.host.windir(), r"Microsoft.NET\Framework"))
    }

    /// Microsoft .NET Framework 64-bit directory.
    pub fn framework_dir64(&self) -> PathBuf {
        self.registry
            .lookup_path(&self.registry.vc(), "frameworkdir64")
            .unwrap_or_else(|| join_rel(self.host.windir(), r"Microsoft.NET\Framework64"))
    }

    /// Microsoft .NET Framework 32-bit versions.
    pub fn framework_version32(&self) -> [String; 2] {
        self.find_dot_net_versions(32)
    }

    /// Microsoft .NET Framework 64-bit versions.
    pub fn framework_version64(&self) -> [String; 2] {
        self.find_dot_net_versions(64)
    }

    /// Pair of .NET Framework version folders for `bits` (32 or 64).
    ///
    /// A registered `v4.x` version is used as the first entry for
    /// toolchains 10.0 and later; otherwise a fixed pair per band.
    pub fn find_dot_net_versions(&self, bits: u32) -> [String; 2] {
        let registered = self
            .registry
            .lookup(&self.registry.vc(), &format!("frameworkver{bits}"))
            .unwrap_or_default();
        let modern = if registered.to_lowercase().starts_with("v4") {
            registered
        } else {
            "v4.0.30319".to_string()
        };

        if self.vcver >= VcVersion::VC12 {
            [modern, "v4.0".into()]
        } else if self.vcver >= VcVersion::VC10 {
            [modern, "v3.5".into()]
        } else if self.vcver >= VcVersion::VC9 {
            ["v3.5".into(), "v2.0.50727".into()]
        } else {
            ["v3.0".into(), "v2.0.50727".into()]
        }
    }
}

/// Enumerate the versions registered under the VC7 and VC-for-Python keys
/// of every hive, ascending and without duplicates.
///
/// Value names and subkey names both count; names that are not numbers are
/// ignored.
pub fn available_versions(registry: &RegistryInfo) -> Vec<VcVersion> {
    let keys = [registry.vc(), registry.vc_for_python()];
    let mut versions: Vec<VcVersion> = Vec::new();
    for hive in Hive::PROBE_ORDER {
        for key in &keys {
            let Some(listing) = registry.backend().listing(hive, key) else {
                continue;
            };
            for name in listing.values.iter().chain(listing.subkeys.iter()) {
                if let Some(ver) = VcVersion::parse(name) {
                    if !versions.contains(&ver) {
                        versions.push(ver);
                    }
                }
            }
        }
    }
    versions.sort();
    versions
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::memory::MemoryRegistry;

    const VC_FOR_PYTHON: &str = r"Software\Wow6432Node\Microsoft\DevDiv\VCForPython";
    const VC7: &str = r"Software\Wow6432Node\Microsoft\VisualStudio\SxS\VC7";

    fn host(root: &Path) -> HostEnv {
        HostEnv::new("amd64", root.join("Windows"), root.join("Program Files"))
            .with_program_files_x86(root.join("Program Files (x86)"))
    }

    fn system(
        root: &Path,
        registry: MemoryRegistry,
        vcver: Option<VcVersion>,
    ) -> Result<SystemInfo> {
        let ri = RegistryInfo::new(PlatformInfo::new("amd64", "amd64"), Box::new(registry));
        SystemInfo::new(ri, host(root), vcver)
    }

    fn path_str(p: &Path) -> String {
        p.to_string_lossy().into_owned()
    }

    #[test]
    fn available_versions_sorted_unique() {
        let mut reg = MemoryRegistry::new();
        reg.set_value(Hive::LocalMachine, VC7, "14.0", "x");
        reg.set_value(Hive::LocalMachine, VC7, "12.0", "y");
        reg.set_value(Hive::LocalMachine, VC7, "frameworkdir32", "z");
        reg.set_value(Hive::CurrentUser, VC7, "14.0", "x");
        reg.create_key(Hive::CurrentUser, &format!(r"{VC_FOR_PYTHON}\9.0"));
        reg.create_key(Hive::CurrentUser, &format!(r"{VC_FOR_PYTHON}\Setup"));

        let dir = tempfile::tempdir().unwrap();
        let si = system(dir.path(), reg, None).unwrap();
        assert_eq!(
            si.find_availables_vcver(),
            vec![VcVersion::VC9, VcVersion::VC12, VcVersion::VC14]
        );
        assert_eq!(si.vcver(), VcVersion::VC14);
    }

    #[test]
    fn no_version_is_platform_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = system(dir.path(), MemoryRegistry::new(), None).unwrap_err();
        assert_eq!(err.to_string(), "No Microsoft Visual C++ version found");
    }

    #[test]
    fn explicit_version_skips_discovery() {
        let dir = tempfile::tempdir().unwrap();
        let si = system(dir.path(), MemoryRegistry::new(), Some(VcVersion::VC10)).unwrap();
        assert_eq!(si.vcver(), VcVersion::VC10);
    }

    #[test]
    fn vc_install_dir_from_vc_for_python() {
        let dir = tempfile::tempdir().unwrap();
        let install = dir.path().join("VCForPython9");
        std::fs::create_dir_all(install.join("VC").join("Include")).unwrap();

        let mut reg = MemoryRegistry::new();
        reg.set_value(
            Hive::CurrentUser,
            &format!(r"{VC_FOR_PYTHON}\9.0"),
            "installdir",
            path_str(&install),
        );
        let si = system(dir.path(), reg, None).unwrap();
        assert_eq!(si.vcver(), VcVersion::VC9);
        assert_eq!(si.vc_install_dir().unwrap(), install.join("VC"));
    }

    #[test]
    fn vc_install_dir_registry_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        let vc = dir.path().join("custom-vc");
        std::fs::create_dir_all(&vc).unwrap();
        let mut reg = MemoryRegistry::new();
        reg.set_value(Hive::LocalMachine, VC7, "14.0", path_str(&vc));

        let si = system(dir.path(), reg, None).unwrap();
        assert_eq!(si.vc_install_dir().unwrap(), vc);
    }

    #[test]
    fn vc_install_dir_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let si = system(dir.path(), MemoryRegistry::new(), Some(VcVersion::VC14)).unwrap();
        let err = si.vc_install_dir().unwrap_err();
        assert_eq!(err.to_string(), "Microsoft Visual C++ directory not found");
    }

    #[test]
    fn vs_install_dir_default() {
        let dir = tempfile::tempdir().unwrap();
        let si = system(dir.path(), MemoryRegistry::new(), Some(VcVersion::VC14)).unwrap();
        assert_eq!(
            si.vs_install_dir(),
            dir.path()
                .join("Program Files (x86)")
                .join("Microsoft Visual Studio 14.0")
        );
    }

    #[test]
    fn sdk_version_bands() {
        assert_eq!(windows_sdk_versions(VcVersion::VC9), &["7.0", "6.1", "6.0a"]);
        assert_eq!(windows_sdk_versions(VcVersion::new(8.0)), &["7.0", "6.1", "6.0a"]);
        assert_eq!(windows_sdk_versions(VcVersion::VC10), &["7.1", "7.0a"]);
        assert_eq!(windows_sdk_versions(VcVersion::VC11), &["8.0", "8.0a"]);
        assert_eq!(windows_sdk_versions(VcVersion::VC12), &["8.1", "8.1a"]);
        assert_eq!(windows_sdk_versions(VcVersion::VC14), &["10.0", "8.1"]);
        assert_eq!(windows_sdk_versions(VcVersion::new(15.0)), &["10.0", "8.1"]);
        assert!(netfx_sdk_versions(VcVersion::VC12).is_empty());
    }

    #[test]
    fn windows_sdk_dir_prefers_registry() {
        let dir = tempfile::tempdir().unwrap();
        let sdk = dir.path().join("sdk81");
        std::fs::create_dir_all(&sdk).unwrap();
        // The conventional location exists too, but loses to the registry.
        std::fs::create_dir_all(
            dir.path()
                .join("Program Files")
                .join("Microsoft SDKs")
                .join("Windows Kits")
                .join("10"),
        )
        .unwrap();

        let mut reg = MemoryRegistry::new();
        reg.set_value(
            Hive::LocalMachine,
            r"Software\Wow6432Node\Microsoft\Microsoft SDKs\Windows\v8.1",
            "installationfolder",
            path_str(&sdk),
        );
        let si = system(dir.path(), reg, Some(VcVersion::VC14)).unwrap();
        assert_eq!(si.windows_sdk_dir().unwrap(), sdk);
    }

    #[test]
    fn windows_sdk_dir_conventional_layouts() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir
            .path()
            .join("Program Files")
            .join("Microsoft SDKs")
            .join("Windows")
            .join("v7.1");
        std::fs::create_dir_all(&old).unwrap();
        let si = system(dir.path(), MemoryRegistry::new(), Some(VcVersion::VC10)).unwrap();
        assert_eq!(si.windows_sdk_dir().unwrap(), old);
    }

    #[test]
    fn windows_kits_layout_beats_older_sdk_layout() {
        let dir = tempfile::tempdir().unwrap();
        let sdks = dir.path().join("Program Files").join("Microsoft SDKs");
        let old = sdks.join("Windows").join("v10.0");
        let kits = sdks.join("Windows Kits").join("10");
        for d in [&old, &sdks.join("Windows").join("v8.1"), &kits] {
            std::fs::create_dir_all(d).unwrap();
        }

        let si = system(dir.path(), MemoryRegistry::new(), Some(VcVersion::VC14)).unwrap();
        assert_eq!(si.windows_sdk_dir().unwrap(), kits);

        std::fs::remove_dir(&kits).unwrap();
        assert_eq!(si.windows_sdk_dir().unwrap(), old);
    }

    #[test]
    fn windows_sdk_dir_falls_back_to_platform_sdk() {
        let dir = tempfile::tempdir().unwrap();
        let install = dir.path().join("py");
        std::fs::create_dir_all(install.join("VC")).unwrap();
        let mut reg = MemoryRegistry::new();
        reg.set_value(
            Hive::CurrentUser,
            &format!(r"{VC_FOR_PYTHON}\9.0"),
            "installdir",
            path_str(&install),
        );
        let si = system(dir.path(), reg, None).unwrap();
        assert_eq!(
            si.windows_sdk_dir().unwrap(),
            install.join("VC").join("PlatformSDK")
        );

        std::fs::create_dir_all(install.join("WinSDK")).unwrap();
        assert_eq!(si.windows_sdk_dir().unwrap(), install.join("WinSDK"));
    }

    #[test]
    fn executable_path_uses_netfx_key_for_14() {
        let dir = tempfile::tempdir().unwrap();
        let tools = dir.path().join("netfx-tools");
        std::fs::create_dir_all(&tools).unwrap();
        let mut reg = MemoryRegistry::new();
        reg.set_value(
            Hive::LocalMachine,
            r"Software\Wow6432Node\Microsoft\Microsoft SDKs\NETFXSDK\4.6\WinSDK-NetFx40Tools-x64",
            "installationfolder",
            path_str(&tools),
        );
        let si = system(dir.path(), reg, Some(VcVersion::VC14)).unwrap();
        assert_eq!(si.windows_sdk_executable_path(), Some(tools));
    }

    #[test]
    fn executable_path_missing_dir_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut reg = MemoryRegistry::new();
        reg.set_value(
            Hive::LocalMachine,
            r"Software\Wow6432Node\Microsoft\Microsoft SDKs\Windows\v7.0A\WinSDK-NetFx35Tools",
            "installationfolder",
            path_str(&dir.path().join("gone")),
        );
        let si = system(dir.path(), reg, Some(VcVersion::VC9)).unwrap();
        assert_eq!(si.windows_sdk_executable_path(), None);
    }

    #[test]
    fn ucrt_only_for_14() {
        let dir = tempfile::tempdir().unwrap();
        let kits = dir.path().join("Program Files (x86)").join("Windows Kits").join("10");
        std::fs::create_dir_all(&kits).unwrap();

        let si = system(dir.path(), MemoryRegistry::new(), Some(VcVersion::VC12)).unwrap();
        assert_eq!(si.universal_crt_sdk_dir(), None);

        let si = system(dir.path(), MemoryRegistry::new(), Some(VcVersion::VC14)).unwrap();
        assert_eq!(si.universal_crt_sdk_dir(), Some(kits));
    }

    #[test]
    fn netfx_sdk_dir_from_registry() {
        let dir = tempfile::tempdir().unwrap();
        let netfx = dir.path().join("NETFXSDK").join("4.6.1");
        std::fs::create_dir_all(&netfx).unwrap();
        let mut reg = MemoryRegistry::new();
        reg.set_value(
            Hive::LocalMachine,
            r"Software\Wow6432Node\Microsoft\Microsoft SDKs\NETFXSDK\4.6.1",
            "kitsinstallationfolder",
            path_str(&netfx),
        );
        let si = system(dir.path(), reg, Some(VcVersion::VC14)).unwrap();
        assert_eq!(si.netfx_sdk_dir(), Some(netfx));
    }

    #[test]
    fn framework_dirs_default_under_windir() {
        let dir = tempfile::tempdir().unwrap();
        let si = system(dir.path(), MemoryRegistry::new(), Some(VcVersion::VC14)).unwrap();
        assert_eq!(
            si.framework_dir64(),
            dir.path().join("Windows").join("Microsoft.NET").join("Framework64")
        );
        assert_eq!(
            si.framework_dir32(),
            dir.path().join("Windows").join("Microsoft.NET").join("Framework")
        );
    }

    #[test]
    fn dot_net_versions_by_band() {
        let dir = tempfile::tempdir().unwrap();
        let mut reg = MemoryRegistry::new();
        reg.set_value(Hive::LocalMachine, VC7, "frameworkver32", "v4.0.30319");
        reg.set_value(Hive::LocalMachine, VC7, "frameworkver64", "v2.0");

        let si = system(dir.path(), reg.clone(), Some(VcVersion::VC14)).unwrap();
        assert_eq!(si.framework_version32(), ["v4.0.30319", "v4.0"]);
        assert_eq!(si.framework_version64(), ["v4.0.30319", "v4.0"]);

        let si = system(dir.path(), reg.clone(), Some(VcVersion::VC10)).unwrap();
        assert_eq!(si.framework_version32(), ["v4.0.30319", "v3.5"]);

        let si = system(dir.path(), reg.clone(), Some(VcVersion::VC9)).unwrap();
        assert_eq!(si.framework_version32(), ["v3.5", "v2.0.50727"]);

        let si = system(dir.path(), reg, Some(VcVersion::new(8.0))).unwrap();
        assert_eq!(si.framework_version64(), ["v3.0", "v2.0.50727"]);
    }

    #[test]
    fn fsharp_dir_from_registry() {
        let dir = tempfile::tempdir().unwrap();
        let mut reg = MemoryRegistry::new();
        reg.set_value(
            Hive::LocalMachine,
            r"Software\Wow6432Node\Microsoft\VisualStudio\12.0\Setup\F#",
            "productdir",
            "fsharp",
        );
        let si = system(dir.path(), reg.clone(), Some(VcVersion::VC12)).unwrap();
        assert_eq!(si.fsharp_install_dir(), Some(PathBuf::from("fsharp")));
        let si = system(dir.path(), reg, Some(VcVersion::VC14)).unwrap();
        assert_eq!(si.fsharp_install_dir(), None);
    }
}
