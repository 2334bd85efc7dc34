//! In-memory configuration store for testing.
//!
//! Mirrors the registry semantics the handler depends on: case-insensitive
//! key paths, implicit parent creation and non-recursive key deletion.

use std::collections::BTreeMap;

use super::{ConfigStore, describe_value};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
struct KeyEntry {
    /// Values keyed by lower-cased name.
    values: BTreeMap<String, String>,
}

/// In-memory [`ConfigStore`] implementation.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    keys: BTreeMap<String, KeyEntry>,
    denied: Vec<String>,
    mutations: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a string value without counting it as a mutation.
    pub fn with_value(mut self, key: &str, name: &str, value: &str) -> Self {
        self.insert_key(key)
            .values
            .insert(name.to_lowercase(), value.to_string());
        self
    }

    /// Seed a standard Chrome and IE installation.
    pub fn with_browsers(self, chrome_command: &str, ie_command: &str) -> Self {
        self.with_value(crate::config::CHROME_OPEN_COMMAND_KEY, "", chrome_command)
            .with_value(crate::config::IE_OPEN_COMMAND_KEY, "", ie_command)
    }

    /// Reject writes and deletions at or beneath `prefix` with `AccessDenied`.
    pub fn deny_writes_under(mut self, prefix: &str) -> Self {
        self.denied.push(normalize(prefix));
        self
    }

    /// Number of mutating calls made through the [`ConfigStore`] trait.
    pub fn mutations(&self) -> usize {
        self.mutations
    }

    /// Flattened view of the store: lower-cased key path to its values.
    pub fn snapshot(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        self.keys
            .iter()
            .map(|(path, entry)| (path.clone(), entry.values.clone()))
            .collect()
    }

    fn insert_key(&mut self, key: &str) -> &mut KeyEntry {
        let path = normalize(key);
        let mut prefix = String::new();
        for segment in path.split('\\') {
            if !prefix.is_empty() {
                prefix.push('\\');
            }
            prefix.push_str(segment);
            self.keys.entry(prefix.clone()).or_default();
        }
        self.keys.entry(path).or_default()
    }

    fn check_writable(&self, key: &str) -> Result<()> {
        let path = normalize(key);
        let denied = self
            .denied
            .iter()
            .any(|prefix| path == *prefix || path.starts_with(&format!("{prefix}\\")));
        if denied {
            return Err(Error::AccessDenied(key.to_string()));
        }
        Ok(())
    }
}

impl ConfigStore for MemoryStore {
    fn get_string(&self, key: &str, name: &str) -> Result<String> {
        self.keys
            .get(&normalize(key))
            .ok_or_else(|| Error::NotFound(key.to_string()))?
            .values
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| Error::NotFound(describe_value(key, name)))
    }

    fn key_exists(&self, key: &str) -> Result<bool> {
        Ok(self.keys.contains_key(&normalize(key)))
    }

    fn create_key(&mut self, key: &str) -> Result<()> {
        self.mutations += 1;
        self.check_writable(key)?;
        self.insert_key(key);
        Ok(())
    }

    fn set_string(&mut self, key: &str, name: &str, value: &str) -> Result<()> {
        self.mutations += 1;
        self.check_writable(key)?;
        self.insert_key(key)
            .values
            .insert(name.to_lowercase(), value.to_string());
        Ok(())
    }

    fn delete_value(&mut self, key: &str, name: &str) -> Result<()> {
        self.mutations += 1;
        self.check_writable(key)?;
        let entry = self
            .keys
            .get_mut(&normalize(key))
            .ok_or_else(|| Error::NotFound(key.to_string()))?;
        entry
            .values
            .remove(&name.to_lowercase())
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(describe_value(key, name)))
    }

    fn delete_key(&mut self, key: &str) -> Result<()> {
        self.mutations += 1;
        self.check_writable(key)?;
        let path = normalize(key);
        if !self.keys.contains_key(&path) {
            return Err(Error::NotFound(key.to_string()));
        }
        let child_prefix = format!("{path}\\");
        if self.keys.keys().any(|k| k.starts_with(&child_prefix)) {
            return Err(Error::Registry {
                path: key.to_string(),
                message: "key has subkeys".to_string(),
            });
        }
        self.keys.remove(&path);
        Ok(())
    }
}

fn normalize(key: &str) -> String {
    key.trim_matches('\\').to_lowercase()
}
