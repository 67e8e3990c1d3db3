//! Path helpers shared by the resolvers.

use std::collections::HashSet;
use std::hash::Hash;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use tracing::debug;

use crate::error::{Result, VcEnvError};

/// Delimiter of path-list environment variables (`PATH`, `INCLUDE`, ...).
pub const PATH_LIST_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

/// Join a Windows-style relative path (`Common7\IDE`) onto `base`.
///
/// Both `\` and `/` separate components, so fragments produced by
/// [`PlatformInfo`](crate::platform::PlatformInfo) work on any host.
pub fn join_rel(base: &Path, rel: &str) -> PathBuf {
    rel.split(['\\', '/'])
        .filter(|c| !c.is_empty())
        .fold(base.to_path_buf(), |acc, c| acc.join(c))
}

/// Return the first candidate that is an existing directory.
///
/// Candidates are consumed lazily, so later (more expensive) strategies are
/// only evaluated when earlier ones miss.
pub fn first_existing_dir<I>(candidates: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    candidates.into_iter().find(|p| p.is_dir())
}

/// Name of the first subdirectory of `path` followed by a separator, or `""`.
///
/// SDK layouts nest headers and libraries under a version folder
/// (`Include\10.0.10240.0\ucrt`); this picks that folder.
pub fn content_dirname(path: &Path) -> String {
    let Ok(entries) = std::fs::read_dir(path) else {
        return String::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .collect();
    names.sort();
    match names.first() {
        Some(name) => format!("{name}{MAIN_SEPARATOR}"),
        None => String::new(),
    }
}

/// Unique elements in first-seen order.
pub fn unique_everseen<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Build the value of a path-list variable.
///
/// Candidate lists are flattened in order, followed by the entries already in
/// `env_value`. Only existing directories are kept, duplicates are dropped
/// keeping the first occurrence, and the result is joined with
/// [`PATH_LIST_SEPARATOR`]. An empty result is a platform error naming the
/// variable.
pub fn build_paths(name: &str, lists: &[Vec<PathBuf>], env_value: Option<&str>) -> Result<String> {
    let spec_paths = lists.iter().flatten().cloned();
    let env_paths = env_value
        .unwrap_or_default()
        .split(PATH_LIST_SEPARATOR)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);

    let extant: Vec<PathBuf> = spec_paths.chain(env_paths).filter(|p| p.is_dir()).collect();
    if extant.is_empty() {
        return Err(VcEnvError::platform(format!(
            "{} environment variable is empty",
            name.to_uppercase()
        )));
    }

    let unique = unique_everseen(extant);
    debug!(name, count = unique.len(), "built path list");
    Ok(unique
        .iter()
        .map(|p| p.to_string_lossy())
        .collect::<Vec<_>>()
        .join(PATH_LIST_SEPARATOR.to_string().as_str()))
}
