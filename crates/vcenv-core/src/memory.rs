//! In-memory registry backend.
//!
//! Key paths and value names are case-insensitive, as in the Windows
//! registry. Creating a key implicitly creates its ancestors, so listings of
//! parent keys report their children.

use std::collections::BTreeMap;

use crate::registry::{Hive, KeyListing, RegistryBackend};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct MemoryKey {
    /// Values in insertion order, names as written.
    values: Vec<(String, String)>,
    /// Direct children, names as written.
    subkeys: Vec<String>,
}

/// A registry held entirely in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryRegistry {
    keys: BTreeMap<(Hive, String), MemoryKey>,
}

fn normalize(path: &str) -> String {
    path.split('\\')
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join("\\")
        .to_lowercase()
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `path` (and its ancestors) under `hive` if missing.
    pub fn create_key(&mut self, hive: Hive, path: &str) {
        self.ensure_key(hive, path);
    }

    /// Set a string value, creating the key as needed.
    pub fn set_value(&mut self, hive: Hive, path: &str, name: &str, value: impl Into<String>) {
        let value = value.into();
        let key = self.ensure_key(hive, path);
        match key
            .values
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value,
            None => key.values.push((name.to_string(), value)),
        }
    }

    /// Number of keys held, ancestors included.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn ensure_key(&mut self, hive: Hive, path: &str) -> &mut MemoryKey {
        let mut full = String::new();
        let mut parent: Option<String> = None;
        for component in path.split('\\').filter(|c| !c.is_empty()) {
            if !full.is_empty() {
                full.push('\\');
            }
            full.push_str(component);
            let lower = full.to_lowercase();
            if let Some(parent) = parent.take() {
                let parent_key = self.keys.entry((hive, parent)).or_default();
                if !parent_key
                    .subkeys
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(component))
                {
                    parent_key.subkeys.push(component.to_string());
                }
            }
            self.keys.entry((hive, lower.clone())).or_default();
            parent = Some(lower);
        }
        self.keys.entry((hive, normalize(path))).or_default()
    }

    fn key(&self, hive: Hive, path: &str) -> Option<&MemoryKey> {
        self.keys.get(&(hive, normalize(path)))
    }
}

impl RegistryBackend for MemoryRegistry {
    fn value(&self, hive: Hive, key: &str, name: &str) -> Option<String> {
        self.key(hive, key)?
            .values
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    fn listing(&self, hive: Hive, key: &str) -> Option<KeyListing> {
        let key = self.key(hive, key)?;
        Some(KeyListing {
            values: key.values.iter().map(|(n, _)| n.clone()).collect(),
            subkeys: key.subkeys.clone(),
        })
    }
}
