//! Configuration store abstraction.
//!
//! The handler reads browser launch commands from, and writes its own
//! registration into, a hierarchical key/value store. On Windows that store
//! is the registry under `HKEY_LOCAL_MACHINE`; tests use [`MemoryStore`].
//!
//! Keys are backslash-separated paths. A value name of `""` addresses the
//! key's default (unnamed) value.

mod memory;
mod registry;

pub use memory::MemoryStore;
pub use registry::RegistryStore;

use crate::error::Result;

/// Trait for reading and writing the hierarchical configuration store.
pub trait ConfigStore {
    /// Read a string value. Fails with `NotFound` if the key or value is missing.
    fn get_string(&self, key: &str, name: &str) -> Result<String>;

    /// Check whether a key exists.
    fn key_exists(&self, key: &str) -> Result<bool>;

    /// Create a key and any missing parents. Existing keys are left as-is.
    fn create_key(&mut self, key: &str) -> Result<()>;

    /// Write a string value, creating the key if necessary.
    fn set_string(&mut self, key: &str, name: &str, value: &str) -> Result<()>;

    /// Remove a single value from a key.
    fn delete_value(&mut self, key: &str, name: &str) -> Result<()>;

    /// Remove a key. The key must not have subkeys.
    fn delete_key(&mut self, key: &str) -> Result<()>;

    /// Check whether a string value exists.
    fn value_exists(&self, key: &str, name: &str) -> Result<bool> {
        match self.get_string(key, name) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Join a key path and a value name for diagnostics.
pub(crate) fn describe_value(key: &str, name: &str) -> String {
    if name.is_empty() {
        format!(r"{key}\(Default)")
    } else {
        format!(r"{key}\{name}")
    }
}
