use miniroom_core::{KeyValueStorage, StorageError};
use wasm_bindgen::JsValue;
use web_sys as web;

pub(crate) fn js_error(context: &str, e: JsValue) -> StorageError {
    StorageError::Backend(format!("{context}: {e:?}"))
}

/// `window.localStorage`, looked up on every call so a missing or blocked
/// storage degrades to [`StorageError::Unavailable`] instead of failing init.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Result<web::Storage, StorageError> {
        web::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or_else(|| StorageError::Unavailable("localStorage".into()))
    }
}

impl KeyValueStorage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| js_error("localStorage.getItem", e))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| js_error("localStorage.setItem", e))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| js_error("localStorage.removeItem", e))
    }
}
