//! TOML registry snapshots.
//!
//! A snapshot records the registry keys that resolution reads, so an
//! environment can be reproduced on another machine or resolved on a host
//! without a Windows registry. This module provides functions to load,
//! validate, serialize, and template snapshot files.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VcEnvError};
use crate::memory::MemoryRegistry;
use crate::registry::Hive;

/// A set of registry keys with their values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default)]
    pub keys: Vec<SnapshotKey>,
}

/// One registry key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SnapshotKey {
    pub hive: Hive,
    /// Backslash-separated path below the hive.
    pub path: String,
    /// Child keys that carry no values of their own.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subkeys: Vec<String>,
    /// String values by name.
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

/// A validation issue found in a snapshot.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity: "error" or "warning".
    pub severity: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl RegistrySnapshot {
    /// Materialize the snapshot as an in-memory registry.
    pub fn to_registry(&self) -> MemoryRegistry {
        let mut registry = MemoryRegistry::new();
        for key in &self.keys {
            registry.create_key(key.hive, &key.path);
            for subkey in &key.subkeys {
                registry.create_key(key.hive, &format!(r"{}\{subkey}", key.path));
            }
            for (name, value) in &key.values {
                registry.set_value(key.hive, &key.path, name, value.as_str());
            }
        }
        registry
    }
}

/// Load a snapshot from a TOML file.
pub fn load_snapshot_toml(path: &Path) -> Result<RegistrySnapshot> {
    if !path.exists() {
        return Err(VcEnvError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_snapshot_toml(&content)
}

/// Parse a snapshot from a TOML string.
pub fn parse_snapshot_toml(toml_str: &str) -> Result<RegistrySnapshot> {
    let snapshot: RegistrySnapshot = toml::from_str(toml_str)?;
    Ok(snapshot)
}

/// Serialize a snapshot to pretty TOML.
pub fn snapshot_to_toml(snapshot: &RegistrySnapshot) -> Result<String> {
    let toml_str = toml::to_string_pretty(snapshot)?;
    Ok(toml_str)
}

/// Load and validate a snapshot file, returning the registry it describes.
///
/// Warnings are ignored; the first error becomes [`VcEnvError::Validation`].
pub fn load_registry(path: &Path) -> Result<MemoryRegistry> {
    let snapshot = load_snapshot_toml(path)?;
    if let Err(issues) = validate_snapshot(&snapshot) {
        if let Some(issue) = issues.iter().find(|i| i.severity == "error") {
            return Err(VcEnvError::Validation {
                detail: issue.message.clone(),
            });
        }
    }
    Ok(snapshot.to_registry())
}

/// Validate a snapshot for structural correctness.
///
/// Returns `Ok(())` if valid, or `Err(issues)` with a list of problems.
pub fn validate_snapshot(snapshot: &RegistrySnapshot) -> std::result::Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    let mut seen: Vec<(Hive, String)> = Vec::new();

    for (i, key) in snapshot.keys.iter().enumerate() {
        let trimmed = key.path.trim_matches('\\');
        if trimmed.is_empty() {
            issues.push(ValidationIssue {
                severity: "error",
                message: format!("key #{} under {} has an empty path", i + 1, key.hive),
            });
            continue;
        }

        if key.path.contains('/') {
            issues.push(ValidationIssue {
                severity: "error",
                message: format!(
                    "key path '{}' uses '/'; registry paths are separated by '\\'",
                    key.path
                ),
            });
        }

        let id = (key.hive, trimmed.to_lowercase());
        if seen.contains(&id) {
            issues.push(ValidationIssue {
                severity: "error",
                message: format!("duplicate key {}\\{}", key.hive, trimmed),
            });
        } else {
            seen.push(id);
        }

        for subkey in &key.subkeys {
            if subkey.is_empty() || subkey.contains(['\\', '/']) {
                issues.push(ValidationIssue {
                    severity: "warning",
                    message: format!(
                        "subkey '{}' of '{}' should be a single non-empty name",
                        subkey, key.path
                    ),
                });
            }
        }

        if key.values.is_empty() && key.subkeys.is_empty() {
            issues.push(ValidationIssue {
                severity: "warning",
                message: format!("key '{}' has no values and no subkeys", key.path),
            });
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Generate a template snapshot.
///
/// Seeds a per-machine VC++ for Python 9.0 install on a 64-bit host.
pub fn generate_template() -> Result<String> {
    let install = r"C:\Program Files (x86)\Common Files\Microsoft\Visual C++ for Python\9.0";
    let snapshot = RegistrySnapshot {
        keys: vec![
            SnapshotKey {
                hive: Hive::LocalMachine,
                path: r"Software\Wow6432Node\Microsoft\DevDiv\VCForPython\9.0".into(),
                subkeys: Vec::new(),
                values: BTreeMap::from([("installdir".to_string(), install.to_string())]),
            },
            SnapshotKey {
                hive: Hive::LocalMachine,
                path: r"Software\Wow6432Node\Microsoft\VisualStudio\SxS\VC7".into(),
                subkeys: Vec::new(),
                values: BTreeMap::from([("9.0".to_string(), format!(r"{install}\VC"))]),
            },
        ],
    };
    snapshot_to_toml(&snapshot)
}
