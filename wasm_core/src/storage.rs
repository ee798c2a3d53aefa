//! Typed JSON access to browser key-value storage.
//!
//! [`BrowserStorage`] talks to `window.localStorage`; [`MemoryStorage`] backs
//! native tests and hosts without storage (private browsing, disabled
//! cookies). Entries that fail to parse are treated as missing so a corrupt
//! value never breaks a tool page.
use std::collections::BTreeMap;

use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, ToolError};

pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&mut self, key: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.items.keys().cloned().collect())
    }
}

/// `window.localStorage`. Only usable inside a browser; on other targets
/// [`BrowserStorage::new`] fails with [`ToolError::Storage`].
pub struct BrowserStorage {
    inner: web_sys::Storage,
}

impl BrowserStorage {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Result<Self> {
        Err(ToolError::Storage(
            "localStorage is only available in the browser".into(),
        ))
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| ToolError::Storage("no window".into()))?;
        let inner = window
            .local_storage()
            .map_err(js_storage_error)?
            .ok_or_else(|| ToolError::Storage("localStorage unavailable".into()))?;
        Ok(Self { inner })
    }
}

fn js_storage_error(err: wasm_bindgen::JsValue) -> ToolError {
    ToolError::Storage(
        err.as_string()
            .unwrap_or_else(|| "localStorage access failed".into()),
    )
}

impl Storage for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_item(key).map_err(js_storage_error)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.inner.set_item(key, value).map_err(js_storage_error)
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.inner.remove_item(key).map_err(js_storage_error)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let len = self.inner.length().map_err(js_storage_error)?;
        let mut keys = Vec::with_capacity(len as usize);
        for idx in 0..len {
            if let Some(key) = self.inner.key(idx).map_err(js_storage_error)? {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

/// Namespaced JSON view over a [`Storage`]; every key is stored as
/// `<prefix>:<key>`.
pub struct LocalStore<S> {
    storage: S,
    prefix: String,
}

impl<S: Storage> LocalStore<S> {
    pub fn new(storage: S, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    /// Reads and parses an entry. A value that is not valid JSON for `T` is an
    /// error; callers wanting the forgiving behaviour use [`Self::get_or_default`].
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.storage.get_item(&self.full_key(key))? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn get_or_default<T: DeserializeOwned>(&mut self, key: &str, default: T) -> T {
        match self.get(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(err) => {
                warn!("dropping unreadable storage entry {}: {}", key, err);
                if let Err(err) = self.remove(key) {
                    warn!("failed to remove {}: {}", key, err);
                }
                default
            }
        }
    }

    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        let full = self.full_key(key);
        self.storage.set_item(&full, &raw)
    }

    pub fn remove(&mut self, key: &str) -> Result<()> {
        let full = self.full_key(key);
        self.storage.remove_item(&full)
    }

    /// Keys inside this namespace, prefix stripped, sorted.
    pub fn keys(&self) -> Result<Vec<String>> {
        let marker = format!("{}:", self.prefix);
        let mut keys: Vec<String> = self
            .storage
            .keys()?
            .into_iter()
            .filter_map(|key| key.strip_prefix(&marker).map(str::to_string))
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Removes every key in this namespace and returns how many were dropped.
    pub fn clear(&mut self) -> Result<usize> {
        let keys = self.keys()?;
        for key in &keys {
            self.remove(key)?;
        }
        Ok(keys.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq, Default)]
    struct Prefs {
        theme: String,
        favorites: Vec<String>,
    }

    #[test]
    fn set_and_get_round_trip_under_prefix() {
        let mut store = LocalStore::new(MemoryStorage::new(), "toolbox");
        let prefs = Prefs {
            theme: "dark".into(),
            favorites: vec!["jwt-decoder".into()],
        };
        store.set("prefs", &prefs).unwrap();
        assert_eq!(store.get::<Prefs>("prefs").unwrap(), Some(prefs));
        assert!(
            store
                .storage()
                .get_item("toolbox:prefs")
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn corrupt_entry_falls_back_to_default_and_is_removed() {
        let mut raw = MemoryStorage::new();
        raw.set_item("toolbox:prefs", "{not json").unwrap();
        let mut store = LocalStore::new(raw, "toolbox");
        assert!(store.get::<Prefs>("prefs").is_err());
        let prefs = store.get_or_default("prefs", Prefs::default());
        assert_eq!(prefs, Prefs::default());
        assert!(store.storage().is_empty());
    }

    #[test]
    fn missing_entry_returns_default() {
        let mut store = LocalStore::new(MemoryStorage::new(), "toolbox");
        assert_eq!(store.get_or_default("count", 7u32), 7);
    }

    #[test]
    fn keys_and_clear_only_touch_namespace() {
        let mut raw = MemoryStorage::new();
        raw.set_item("other:key", "1").unwrap();
        let mut store = LocalStore::new(raw, "toolbox");
        store.set("b", &2).unwrap();
        store.set("a", &1).unwrap();
        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.clear().unwrap(), 2);
        assert_eq!(store.storage().len(), 1);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn browser_storage_is_unavailable_natively() {
        assert!(matches!(BrowserStorage::new(), Err(ToolError::Storage(_))));
    }
}
