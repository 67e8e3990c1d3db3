//! Build environment assembly.
//!
//! [`EnvironmentInfo`] reproduces what `vcvarsall.bat` and the Windows SDK
//! `SetEnv.cmd` scripts would put in `INCLUDE`, `LIB`, `LIBPATH` and `PATH`
//! for Visual C++ 9.0 through 14.0. Each facet lists candidate directories
//! for one component; [`return_env`](EnvironmentInfo::return_env) merges them
//! in a fixed precedence order.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, VcEnvError};
use crate::host::HostEnv;
use crate::paths::{build_paths, content_dirname, join_rel};
use crate::platform::PlatformInfo;
use crate::registry::{default_backend, RegistryBackend, RegistryInfo};
use crate::system::SystemInfo;
use crate::version::VcVersion;

/// The resolved build environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvMap {
    /// Header search path.
    pub include: String,
    /// Library search path.
    pub lib: String,
    /// Assembly / metadata search path.
    pub libpath: String,
    /// Tool search path.
    pub path: String,
    /// Visual C++ runtime DLL to ship next to built extensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub py_vcruntime_redist: Option<PathBuf>,
}

impl EnvMap {
    /// Variables to set on a compiler subprocess, upper-cased.
    pub fn vars(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("INCLUDE", self.include.as_str()),
            ("LIB", self.lib.as_str()),
            ("LIBPATH", self.libpath.as_str()),
            ("PATH", self.path.as_str()),
        ]
    }

    /// Look up a category by its lowercase name.
    pub fn get(&self, name: &str) -> Option<&str> {
        match name {
            "include" => Some(&self.include),
            "lib" => Some(&self.lib),
            "libpath" => Some(&self.libpath),
            "path" => Some(&self.path),
            _ => None,
        }
    }
}

/// Environment variables for one Visual C++ version and architecture.
#[derive(Debug)]
pub struct EnvironmentInfo {
    si: SystemInfo,
}

impl EnvironmentInfo {
    /// Resolve against an explicit host and registry.
    ///
    /// `vcver` pins a version (newest installed when `None`); `vcvermin`
    /// rejects anything older.
    pub fn new(
        arch: &str,
        vcver: Option<VcVersion>,
        vcvermin: Option<VcVersion>,
        host: HostEnv,
        backend: Box<dyn RegistryBackend>,
    ) -> Result<Self> {
        let pi = PlatformInfo::new(arch, host.processor_architecture());
        let ri = RegistryInfo::new(pi, backend);
        let si = SystemInfo::new(ri, host, vcver)?;

        if let Some(min) = vcvermin {
            if si.vcver() < min {
                return Err(VcEnvError::platform(
                    "No suitable Microsoft Visual C++ version found",
                ));
            }
        }
        Ok(Self { si })
    }

    /// Resolve against the running host and its registry.
    pub fn detect(
        arch: &str,
        vcver: Option<VcVersion>,
        vcvermin: Option<VcVersion>,
    ) -> Result<Self> {
        Self::new(arch, vcver, vcvermin, HostEnv::from_process(), default_backend())
    }

    pub fn vcver(&self) -> VcVersion {
        self.si.vcver()
    }

    pub fn system(&self) -> &SystemInfo {
        &self.si
    }

    fn pi(&self) -> &PlatformInfo {
        self.si.platform()
    }

    fn host(&self) -> &HostEnv {
        self.si.host()
    }

    /// Microsoft Visual Studio tools.
    pub fn vs_tools(&self) -> Vec<PathBuf> {
        let mut paths = vec![r"Common7\IDE".to_string(), r"Common7\Tools".to_string()];

        if self.vcver() >= VcVersion::VC14 {
            let arch_subdir = self.pi().current_dir(true, true);
            paths.push(r"Common7\IDE\CommonExtensions\Microsoft\TestWindow".into());
            paths.push(r"Team Tools\Performance Tools".into());
            paths.push(format!(r"Team Tools\Performance Tools{arch_subdir}"));
        }

        let vs = self.si.vs_install_dir();
        paths.iter().map(|p| join_rel(&vs, p)).collect()
    }

    /// Microsoft Visual C++ and MFC includes.
    pub fn vc_includes(&self) -> Result<Vec<PathBuf>> {
        let vc = self.si.vc_install_dir()?;
        Ok(vec![join_rel(&vc, "Include"), join_rel(&vc, r"ATLMFC\Include")])
    }

    /// Microsoft Visual C++ and MFC libraries.
    pub fn vc_libraries(&self) -> Result<Vec<PathBuf>> {
        let arch_subdir = self.pi().target_dir(true, false);
        let mut paths = vec![
            format!("Lib{arch_subdir}"),
            format!(r"ATLMFC\Lib{arch_subdir}"),
        ];
        if self.vcver() >= VcVersion::VC14 {
            paths.push(format!(r"Lib\store{arch_subdir}"));
        }

        let vc = self.si.vc_install_dir()?;
        Ok(paths.iter().map(|p| join_rel(&vc, p)).collect())
    }

    /// Microsoft Visual C++ store reference libraries (14.0 and later).
    pub fn vc_store_refs(&self) -> Result<Vec<PathBuf>> {
        if self.vcver() < VcVersion::VC14 {
            return Ok(Vec::new());
        }
        let vc = self.si.vc_install_dir()?;
        Ok(vec![join_rel(&vc, r"Lib\store\references")])
    }

    /// Microsoft Visual C++ tools.
    pub fn vc_tools(&self) -> Result<Vec<PathBuf>> {
        let vc = self.si.vc_install_dir()?;
        let mut tools = vec![join_rel(&vc, "VCPackages")];

        let forcex86 = self.vcver() <= VcVersion::VC10;
        let cross = self.pi().cross_dir(forcex86);
        if !cross.is_empty() {
            tools.push(join_rel(&vc, &format!("Bin{cross}")));
        }

        if self.vcver() >= VcVersion::VC14 {
            let host_subdir = self.pi().current_dir(true, false);
            tools.push(join_rel(&vc, &format!("Bin{host_subdir}")));
        } else {
            tools.push(join_rel(&vc, "Bin"));
        }
        Ok(tools)
    }

    /// Microsoft Windows SDK libraries.
    pub fn os_libraries(&self) -> Result<Vec<PathBuf>> {
        let sdk = self.si.windows_sdk_dir()?;
        if self.vcver() <= VcVersion::VC10 {
            let arch_subdir = self.pi().target_dir(true, true);
            return Ok(vec![join_rel(&sdk, &format!("Lib{arch_subdir}"))]);
        }

        let arch_subdir = self.pi().target_dir(false, true);
        let lib = join_rel(&sdk, "lib");
        let libver = content_dirname(&lib);
        Ok(vec![join_rel(&lib, &format!("{libver}um{arch_subdir}"))])
    }

    /// Microsoft Windows SDK includes.
    pub fn os_includes(&self) -> Result<Vec<PathBuf>> {
        let include = join_rel(&self.si.windows_sdk_dir()?, "include");
        if self.vcver() <= VcVersion::VC10 {
            return Ok(vec![include.clone(), join_rel(&include, "gl")]);
        }

        let sdkver = if self.vcver() >= VcVersion::VC14 {
            content_dirname(&include)
        } else {
            String::new()
        };
        Ok(["shared", "um", "winrt"]
            .iter()
            .map(|sub| join_rel(&include, &format!("{sdkver}{sub}")))
            .collect())
    }

    /// Microsoft Windows SDK reference assemblies.
    pub fn os_libpath(&self) -> Result<Vec<PathBuf>> {
        let sdk = self.si.windows_sdk_dir()?;
        let references = join_rel(&sdk, "References");
        let mut libpath = vec![join_rel(&references, r"CommonConfiguration\Neutral")];

        if self.vcver() >= VcVersion::VC14 {
            libpath.push(references.clone());
            libpath.push(join_rel(&sdk, "UnionMetadata"));
            for contract in [
                "Windows.Foundation.UniversalApiContract",
                "Windows.Foundation.FoundationContract",
                "Windows.Networking.Connectivity.WwanContract",
            ] {
                libpath.push(join_rel(&references, &format!(r"{contract}\1.0.0.0")));
            }
            libpath.push(join_rel(
                &sdk,
                &format!(
                    r"ExtensionSDKs\Microsoft.VCLibs\{}\References\CommonConfiguration\neutral",
                    self.vcver()
                ),
            ));
        }
        Ok(libpath)
    }

    /// Microsoft Windows SDK tools.
    pub fn sdk_tools(&self) -> Result<Vec<PathBuf>> {
        let sdk = self.si.windows_sdk_dir()?;
        let bin = if self.vcver() <= VcVersion::VC11 {
            "Bin"
        } else {
            r"Bin\x86"
        };
        let mut tools = vec![join_rel(&sdk, bin)];

        if !self.pi().current_is_x86() {
            let arch_subdir = self.pi().current_dir(false, true);
            tools.push(join_rel(&sdk, &format!("Bin{arch_subdir}")));
        }

        if self.vcver() == VcVersion::VC10 || self.vcver() == VcVersion::VC11 {
            let arch_subdir = if self.pi().target_is_x86() {
                String::new()
            } else {
                self.pi().current_dir(true, true)
            };
            tools.push(join_rel(&sdk, &format!(r"Bin\NETFX 4.0 Tools{arch_subdir}")));
        }

        if let Some(path) = self.si.windows_sdk_executable_path() {
            tools.push(path);
        }
        Ok(tools)
    }

    /// Microsoft Windows SDK setup.
    pub fn sdk_setup(&self) -> Result<Vec<PathBuf>> {
        Ok(vec![join_rel(&self.si.windows_sdk_dir()?, "Setup")])
    }

    /// Microsoft .NET Framework tools.
    pub fn fx_tools(&self) -> Vec<PathBuf> {
        let pi = self.pi();
        let (include32, include64) = if self.vcver() <= VcVersion::VC10 {
            (true, !pi.target_is_x86() && !pi.current_is_x86())
        } else {
            (
                pi.target_is_x86() || pi.current_is_x86(),
                pi.current_cpu() == "amd64" || pi.target_cpu() == "amd64",
            )
        };

        let mut tools = Vec::new();
        if include32 {
            let dir = self.si.framework_dir32();
            tools.extend(self.si.framework_version32().iter().map(|v| dir.join(v)));
        }
        if include64 {
            let dir = self.si.framework_dir64();
            tools.extend(self.si.framework_version64().iter().map(|v| dir.join(v)));
        }
        tools
    }

    /// Microsoft .NET Framework SDK libraries (14.0 and later).
    pub fn netfx_sdk_libraries(&self) -> Vec<PathBuf> {
        if self.vcver() < VcVersion::VC14 {
            return Vec::new();
        }
        let Some(netfx) = self.si.netfx_sdk_dir() else {
            return Vec::new();
        };
        let arch_subdir = self.pi().target_dir(false, true);
        vec![join_rel(&netfx, &format!(r"lib\um{arch_subdir}"))]
    }

    /// Microsoft .NET Framework SDK includes (14.0 and later).
    pub fn netfx_sdk_includes(&self) -> Vec<PathBuf> {
        if self.vcver() < VcVersion::VC14 {
            return Vec::new();
        }
        match self.si.netfx_sdk_dir() {
            Some(netfx) => vec![join_rel(&netfx, r"include\um")],
            None => Vec::new(),
        }
    }

    /// Microsoft Visual Studio Team System Database.
    pub fn vs_tdb(&self) -> Vec<PathBuf> {
        vec![join_rel(&self.si.vs_install_dir(), r"VSTSDB\Deploy")]
    }

    /// Microsoft Build Engine (12.0 and later).
    pub fn msbuild(&self) -> Vec<PathBuf> {
        if self.vcver() < VcVersion::VC12 {
            return Vec::new();
        }
        let arch_subdir = self.pi().current_dir(true, false);
        let path = format!(r"MSBuild\{}\bin{arch_subdir}", self.vcver());
        vec![
            join_rel(self.host().program_files_x86(), &path),
            join_rel(self.host().program_files(), &path),
        ]
    }

    /// Microsoft HTML Help Workshop (11.0 and later).
    pub fn html_help_workshop(&self) -> Vec<PathBuf> {
        if self.vcver() < VcVersion::VC11 {
            return Vec::new();
        }
        vec![
            self.host().program_files_x86().join("HTML Help Workshop"),
            self.host().program_files().join("HTML Help Workshop"),
        ]
    }

    /// Microsoft Universal CRT libraries (14.0 and later).
    pub fn ucrt_libraries(&self) -> Vec<PathBuf> {
        if self.vcver() < VcVersion::VC14 {
            return Vec::new();
        }
        let Some(ucrt) = self.si.universal_crt_sdk_dir() else {
            return Vec::new();
        };
        let arch_subdir = self.pi().target_dir(false, true);
        let lib = join_rel(&ucrt, "lib");
        let ucrtver = content_dirname(&lib);
        vec![join_rel(&lib, &format!("{ucrtver}ucrt{arch_subdir}"))]
    }

    /// Microsoft Universal CRT includes (14.0 and later).
    pub fn ucrt_includes(&self) -> Vec<PathBuf> {
        if self.vcver() < VcVersion::VC14 {
            return Vec::new();
        }
        let Some(ucrt) = self.si.universal_crt_sdk_dir() else {
            return Vec::new();
        };
        let include = join_rel(&ucrt, "include");
        let ucrtver = content_dirname(&include);
        vec![join_rel(&include, &format!("{ucrtver}ucrt"))]
    }

    /// Microsoft Visual F# (11.0 and later).
    pub fn fsharp(&self) -> Vec<PathBuf> {
        if self.vcver() < VcVersion::VC11 {
            return Vec::new();
        }
        self.si.fsharp_install_dir().into_iter().collect()
    }

    /// Microsoft Visual C++ runtime redistributable DLL.
    pub fn vc_runtime_redist(&self) -> Result<PathBuf> {
        let arch_subdir = self.pi().target_dir(false, true);
        let major = self.vcver().major();
        let vc = self.si.vc_install_dir()?;
        Ok(join_rel(
            &vc,
            &format!(r"redist{arch_subdir}\Microsoft.VC{major}0.CRT\vcruntime{major}0.dll"),
        ))
    }

    /// Assemble the environment.
    pub fn return_env(&self) -> Result<EnvMap> {
        let include = self.build("include", vec![
            self.vc_includes()?,
            self.os_includes()?,
            self.ucrt_includes(),
            self.netfx_sdk_includes(),
        ])?;
        let lib = self.build("lib", vec![
            self.vc_libraries()?,
            self.os_libraries()?,
            self.fx_tools(),
            self.ucrt_libraries(),
            self.netfx_sdk_libraries(),
        ])?;
        let libpath = self.build("libpath", vec![
            self.vc_libraries()?,
            self.fx_tools(),
            self.vc_store_refs()?,
            self.os_libpath()?,
        ])?;
        let path = self.build("path", vec![
            self.vc_tools()?,
            self.vs_tools(),
            self.vs_tdb(),
            self.sdk_tools()?,
            self.sdk_setup()?,
            self.fx_tools(),
            self.msbuild(),
            self.html_help_workshop(),
            self.fsharp(),
        ])?;

        let mut py_vcruntime_redist = None;
        if self.vcver() >= VcVersion::VC14 {
            let redist = self.vc_runtime_redist()?;
            if redist.is_file() {
                py_vcruntime_redist = Some(redist);
            }
        }

        debug!(vcver = %self.vcver(), arch = self.pi().arch(), "resolved build environment");
        Ok(EnvMap {
            include,
            lib,
            libpath,
            path,
            py_vcruntime_redist,
        })
    }

    fn build(&self, name: &str, lists: Vec<Vec<PathBuf>>) -> Result<String> {
        build_paths(name, &lists, self.host().var(name))
    }
}
