//! Build-environment reconstruction for standalone Microsoft Visual C++
//! toolchains.
//!
//! Computes the `INCLUDE`, `LIB`, `LIBPATH` and `PATH` values that
//! `vcvarsall.bat` would produce for Visual C++ 9.0 through 14.0, from the
//! registry and the filesystem alone. Covers toolchains that ship without a
//! working `vcvarsall.bat`:
//! - **VC++ 9.0**: Compiler for Python 2.7, Windows SDK 6.1 / 7.0
//! - **VC++ 10.0**: Windows SDK 7.1
//! - **VC++ 14.0**: Build Tools 2015
//!
//! # Architecture
//!
//! Resolution is layered leaf-first: [`PlatformInfo`] (host and target CPU)
//! → [`RegistryInfo`] (key layout over a [`RegistryBackend`]) →
//! [`SystemInfo`] (install directories) → [`EnvironmentInfo`] (per-component
//! directory lists and the final [`EnvMap`]).
//!
//! Host facts come from [`HostEnv`] and the registry from a pluggable
//! backend, so resolution can run against snapshots on any platform.

pub mod environment;
pub mod error;
pub mod fallback;
pub mod host;
pub mod memory;
pub mod paths;
pub mod platform;
pub mod registry;
pub mod snapshot;
pub mod system;
pub mod version;
#[cfg(windows)]
pub mod winreg_backend;

// Re-exports for convenience.
pub use environment::{EnvMap, EnvironmentInfo};
pub use error::{Result, VcEnvError};
pub use fallback::ResolveRequest;
pub use host::HostEnv;
pub use memory::MemoryRegistry;
pub use platform::PlatformInfo;
pub use registry::{default_backend, Hive, RegistryBackend, RegistryInfo};
pub use snapshot::{load_registry, RegistrySnapshot};
pub use system::SystemInfo;
pub use version::VcVersion;
#[cfg(windows)]
pub use winreg_backend::WindowsRegistry;
