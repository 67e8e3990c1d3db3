//! Fallback from `vcvarsall.bat` to direct resolution.
//!
//! Build drivers normally ask `vcvarsall.bat` for the compiler environment.
//! Standalone toolchains (VC++ for Python, the Windows SDK 7.x compilers,
//! Build Tools 2015) either lack that script or ship one that leaves the
//! environment incomplete. Once [`install`] has been called, the query
//! wrappers here retry failed queries through [`EnvironmentInfo`].

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::environment::{EnvMap, EnvironmentInfo};
use crate::error::{Result, VcEnvError};
use crate::host::HostEnv;
use crate::registry::{lookup, RegistryBackend};
use crate::version::VcVersion;

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Decides which `vcvarsall.bat` errors are retried through direct resolution.
type RetryOn = fn(&VcEnvError) -> bool;

/// Activate the fallback for this process.
///
/// Returns `true` if this call performed the activation, `false` if it was
/// already active.
pub fn install() -> bool {
    !INSTALLED.swap(true, Ordering::SeqCst)
}

/// Whether [`install`] has been called.
pub fn is_installed() -> bool {
    INSTALLED.load(Ordering::SeqCst)
}

/// Parameters for a direct resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveRequest {
    pub arch: String,
    pub vcver: Option<VcVersion>,
    pub vcvermin: Option<VcVersion>,
}

impl ResolveRequest {
    pub fn new(arch: impl Into<String>) -> Self {
        Self {
            arch: arch.into(),
            vcver: None,
            vcvermin: None,
        }
    }

    pub fn with_version(mut self, vcver: VcVersion) -> Self {
        self.vcver = Some(vcver);
        self
    }

    pub fn with_min_version(mut self, vcvermin: VcVersion) -> Self {
        self.vcvermin = Some(vcvermin);
        self
    }

    /// Resolve against an explicit host and registry.
    pub fn resolve_with(&self, host: HostEnv, backend: Box<dyn RegistryBackend>) -> Result<EnvMap> {
        EnvironmentInfo::new(&self.arch, self.vcver, self.vcvermin, host, backend)?.return_env()
    }

    /// Resolve against the running host.
    pub fn detect(&self) -> Result<EnvMap> {
        EnvironmentInfo::detect(&self.arch, self.vcver, self.vcvermin)?.return_env()
    }
}

/// Locate `vcvarsall.bat` of the Visual C++ Compiler for Python.
///
/// Per-user installs register under `Software\Microsoft`, all-user installs
/// on 64-bit hosts under `Software\Wow6432Node\Microsoft`.
pub fn find_vcvarsall(backend: &dyn RegistryBackend, version: VcVersion) -> Option<PathBuf> {
    let product_dir = ["", r"Wow6432Node\"]
        .iter()
        .map(|wow| format!(r"Software\{wow}Microsoft\DevDiv\VCForPython\{version}"))
        .find_map(|key| lookup(backend, &key, "installdir"))
        .filter(|dir| !dir.is_empty())?;

    let vcvarsall = PathBuf::from(product_dir).join("vcvarsall.bat");
    debug!(path = %vcvarsall.display(), "found VC++ for Python vcvarsall.bat");
    vcvarsall.is_file().then_some(vcvarsall)
}

/// Query the environment of `version` for `arch`.
///
/// `primary` is the caller's `vcvarsall.bat` query. When it fails with a
/// platform or incomplete-environment error and the fallback is installed,
/// `resolve` is called with the requested version instead.
pub fn query_vcvarsall<P, R>(version: VcVersion, arch: &str, primary: P, resolve: R) -> Result<EnvMap>
where
    P: FnOnce() -> Result<EnvMap>,
    R: FnOnce(&ResolveRequest) -> Result<EnvMap>,
{
    let request = ResolveRequest::new(arch).with_version(version);
    let fallback = is_installed().then_some(VcEnvError::is_fallback_trigger as RetryOn);
    with_fallback(fallback, &request, version, primary, resolve)
}

/// Query the environment of the newest toolchain, 14.0 or later, for
/// `plat_spec`.
///
/// Only platform errors are retried; an incomplete environment reported by
/// a 14.0 `vcvarsall.bat` is returned as is.
pub fn get_vc_env<P, R>(plat_spec: &str, primary: P, resolve: R) -> Result<EnvMap>
where
    P: FnOnce() -> Result<EnvMap>,
    R: FnOnce(&ResolveRequest) -> Result<EnvMap>,
{
    let request = ResolveRequest::new(plat_spec).with_min_version(VcVersion::VC14);
    let fallback = is_installed().then_some(is_platform_error as RetryOn);
    with_fallback(fallback, &request, VcVersion::VC14, primary, resolve)
}

fn is_platform_error(e: &VcEnvError) -> bool {
    matches!(e, VcEnvError::Platform { .. })
}

/// Run `primary`; when `retry_on` is set and accepts its error, run
/// `resolve` instead.
fn with_fallback<P, R>(
    retry_on: Option<RetryOn>,
    request: &ResolveRequest,
    version: VcVersion,
    primary: P,
    resolve: R,
) -> Result<EnvMap>
where
    P: FnOnce() -> Result<EnvMap>,
    R: FnOnce(&ResolveRequest) -> Result<EnvMap>,
{
    match primary() {
        Ok(env) => return Ok(env),
        Err(e) if retry_on.is_some_and(|retry| retry(&e)) => {
            warn!(error = %e, %version, arch = %request.arch, "vcvarsall failed, resolving directly");
        }
        Err(e) => return Err(e),
    }
    resolve(request).map_err(|e| e.augment(version, &request.arch))
}

/// Rewrite a missing-compiler message with remediation for `version`.
///
/// Messages that do not mention `vcvarsall` or Visual C++ are returned
/// unchanged.
pub fn augment_message(message: &str, version: VcVersion, arch: &str) -> String {
    let lower = message.to_lowercase();
    if !lower.contains("vcvarsall") && !lower.contains("visual c") {
        return message.to_string();
    }

    let mut augmented = format!("Microsoft Visual C++ {version} is required ({message}).");
    let msdownload = |id: u32| format!("www.microsoft.com/download/details.aspx?id={id}");
    if version == VcVersion::VC9 {
        if arch.to_lowercase().contains("ia64") {
            augmented.push_str(" Get it with \"Microsoft Windows SDK 7.0\": ");
            augmented.push_str(&msdownload(3138));
        } else {
            augmented.push_str(" Get it from http://aka.ms/vcpython27");
        }
    } else if version == VcVersion::VC10 {
        augmented.push_str(" Get it with \"Microsoft Windows SDK 7.1\": ");
        augmented.push_str(&msdownload(8279));
    }
    augmented
}
