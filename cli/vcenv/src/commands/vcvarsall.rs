//! `vcvarsall`: locate the VC++ for Python `vcvarsall.bat`.

use anyhow::{bail, Result};
use vcenv_core::fallback::find_vcvarsall;
use vcenv_core::VcVersion;

use super::Session;

/// Print the path of `vcvarsall.bat` for `version`.
pub fn run(session: &Session, version: VcVersion) -> Result<()> {
    let backend = session.backend()?;
    match find_vcvarsall(backend.as_ref(), version) {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => bail!("Unable to find vcvarsall.bat for Microsoft Visual C++ {version}"),
    }
}
