//! Native Windows registry backend.

use winreg::enums::{
    HKEY_CLASSES_ROOT, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, HKEY_USERS, KEY_READ,
};
use winreg::RegKey;

use crate::registry::{Hive, KeyListing, RegistryBackend};

/// Reads the live registry through `winreg`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsRegistry;

impl WindowsRegistry {
    fn open(hive: Hive, key: &str) -> Option<RegKey> {
        let root = match hive {
            Hive::Users => HKEY_USERS,
            Hive::CurrentUser => HKEY_CURRENT_USER,
            Hive::LocalMachine => HKEY_LOCAL_MACHINE,
            Hive::ClassesRoot => HKEY_CLASSES_ROOT,
        };
        RegKey::predef(root)
            .open_subkey_with_flags(key, KEY_READ)
            .ok()
    }
}

impl RegistryBackend for WindowsRegistry {
    fn value(&self, hive: Hive, key: &str, name: &str) -> Option<String> {
        Self::open(hive, key)?.get_value::<String, _>(name).ok()
    }

    fn listing(&self, hive: Hive, key: &str) -> Option<KeyListing> {
        let key = Self::open(hive, key)?;
        Some(KeyListing {
            values: key
                .enum_values()
                .filter_map(|v| v.ok().map(|(name, _)| name))
                .collect(),
            subkeys: key.enum_keys().filter_map(|k| k.ok()).collect(),
        })
    }
}
