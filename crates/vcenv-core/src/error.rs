//! Error types for build-environment resolution.

use std::path::PathBuf;

use crate::version::VcVersion;

/// Errors that can occur while resolving a Visual C++ environment.
#[derive(Debug, thiserror::Error)]
pub enum VcEnvError {
    /// Fatal resolution failure: no usable toolchain, a missing
    /// installation directory, or an empty path category.
    #[error("{message}")]
    Platform {
        /// Human-readable description, possibly augmented with remediation.
        message: String,
    },

    /// An upstream `vcvarsall.bat` query returned without a required variable.
    #[error("environment not set after executing vcvarsall: missing {missing}")]
    IncompleteEnvironment {
        /// Name of the missing variable.
        missing: String,
    },

    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// I/O error reading a snapshot file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot file not found.
    #[error("snapshot file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Validation error in a registry snapshot.
    #[error("validation error: {detail}")]
    Validation {
        /// Description of the validation failure.
        detail: String,
    },
}

impl VcEnvError {
    /// Construct a [`VcEnvError::Platform`] from a message.
    pub fn platform(message: impl Into<String>) -> Self {
        VcEnvError::Platform {
            message: message.into(),
        }
    }

    /// Whether this error should make a caller fall back from `vcvarsall.bat`
    /// to direct resolution.
    pub fn is_fallback_trigger(&self) -> bool {
        matches!(
            self,
            VcEnvError::Platform { .. } | VcEnvError::IncompleteEnvironment { .. }
        )
    }

    /// Add version-specific remediation text to a platform error.
    ///
    /// Other variants are returned unchanged.
    pub fn augment(self, version: VcVersion, arch: &str) -> Self {
        match self {
            VcEnvError::Platform { message } => VcEnvError::Platform {
                message: crate::fallback::augment_message(&message, version, arch),
            },
            other => other,
        }
    }
}

/// Result type for resolution operations.
pub type Result<T> = std::result::Result<T, VcEnvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_message_is_display() {
        let err = VcEnvError::platform("LIB environment variable is empty");
        assert_eq!(err.to_string(), "LIB environment variable is empty");
        assert!(err.is_fallback_trigger());
    }

    #[test]
    fn io_is_not_a_fallback_trigger() {
        let err = VcEnvError::from(std::io::Error::other("boom"));
        assert!(!err.is_fallback_trigger());
    }

    #[test]
    fn augment_leaves_other_variants() {
        let err = VcEnvError::Validation {
            detail: "visual c".into(),
        }
        .augment(VcVersion::new(9.0), "x86");
        assert!(matches!(err, VcEnvError::Validation { .. }));
    }
}
