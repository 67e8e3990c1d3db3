//! Visual C++ toolchain versions.
//!
//! Toolchain releases are identified by a floating-point major version
//! (`9.0`, `10.0`, `14.0`, ...). Registry keys name them in `"%0.1f"` form.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A Visual C++ major version such as `14.0`.
///
/// Always finite, so it is totally ordered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct VcVersion(f64);

impl VcVersion {
    /// Visual C++ 9.0 (Visual Studio 2008, VC++ for Python 2.7).
    pub const VC9: VcVersion = VcVersion(9.0);
    /// Visual C++ 10.0 (Visual Studio 2010, Windows SDK 7.1).
    pub const VC10: VcVersion = VcVersion(10.0);
    /// Visual C++ 11.0 (Visual Studio 2012).
    pub const VC11: VcVersion = VcVersion(11.0);
    /// Visual C++ 12.0 (Visual Studio 2013).
    pub const VC12: VcVersion = VcVersion(12.0);
    /// Visual C++ 14.0 (Visual Studio 2015, Build Tools 2015).
    pub const VC14: VcVersion = VcVersion(14.0);

    /// Wrap a version number. Non-finite values are clamped to `0.0`.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            VcVersion(value)
        } else {
            VcVersion(0.0)
        }
    }

    /// Parse a registry value or key name as a version.
    ///
    /// Returns `None` for anything that is not a finite number.
    pub fn parse(name: &str) -> Option<Self> {
        let value = f64::from_str(name.trim()).ok()?;
        value.is_finite().then_some(VcVersion(value))
    }

    /// The numeric value.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Integral major version (`14` for `14.0`).
    pub fn major(self) -> u32 {
        self.0.trunc() as u32
    }
}

impl fmt::Display for VcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

impl PartialEq for VcVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VcVersion {}

impl PartialOrd for VcVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VcVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl TryFrom<f64> for VcVersion {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value.is_finite() {
            Ok(VcVersion(value))
        } else {
            Err(format!("invalid Visual C++ version: {value}"))
        }
    }
}

impl From<VcVersion> for f64 {
    fn from(version: VcVersion) -> f64 {
        version.0
    }
}

impl FromStr for VcVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VcVersion::parse(s).ok_or_else(|| format!("invalid Visual C++ version: '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_registry_names() {
        assert_eq!(VcVersion::parse("14.0"), Some(VcVersion::VC14));
        assert_eq!(VcVersion::parse(" 9.0 "), Some(VcVersion::VC9));
        assert_eq!(VcVersion::parse("9"), Some(VcVersion::VC9));
        assert_eq!(VcVersion::parse("VC7"), None);
        assert_eq!(VcVersion::parse(""), None);
        assert_eq!(VcVersion::parse("nan"), None);
        assert_eq!(VcVersion::parse("inf"), None);
    }

    #[test]
    fn display_has_one_decimal() {
        assert_eq!(VcVersion::VC14.to_string(), "14.0");
        assert_eq!(VcVersion::new(9.5).to_string(), "9.5");
        assert_eq!(VcVersion::VC14.major(), 14);
    }

    #[test]
    fn ordering_is_total() {
        let mut versions = vec![VcVersion::VC14, VcVersion::VC9, VcVersion::VC11];
        versions.sort();
        assert_eq!(
            versions,
            vec![VcVersion::VC9, VcVersion::VC11, VcVersion::VC14]
        );
        assert!(VcVersion::VC10 < VcVersion::VC12);
    }

    #[test]
    fn from_str_rejects_garbage() {
        assert!("12.0".parse::<VcVersion>().is_ok());
        assert!("twelve".parse::<VcVersion>().is_err());
    }
}
