use std::cell::RefCell;

use js_sys::{Array, Promise, Uint8Array};
use miniroom_core::constants::{ASSET_BLOB_STORE, ASSET_DB_NAME, ASSET_DB_VERSION};
use miniroom_core::{BlobStore, StorageError};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

use crate::storage::js_error;

// Resolves with `request.result` on success, rejects with the request error.
fn request_promise(request: &web::IdbRequest) -> Promise {
    let request = request.clone();
    Promise::new(&mut |resolve, reject| {
        let req = request.clone();
        let on_success = Closure::once_into_js(move |_ev: web::Event| {
            let value = req.result().unwrap_or(JsValue::UNDEFINED);
            _ = resolve.call1(&JsValue::NULL, &value);
        });
        let req = request.clone();
        let on_error = Closure::once_into_js(move |_ev: web::Event| {
            let err = req
                .error()
                .ok()
                .flatten()
                .map(JsValue::from)
                .unwrap_or_else(|| JsValue::from_str("request failed"));
            _ = reject.call1(&JsValue::NULL, &err);
        });
        request.set_onsuccess(Some(on_success.unchecked_ref()));
        request.set_onerror(Some(on_error.unchecked_ref()));
    })
}

// Resolves once the transaction commits; rejects on error or abort.
fn transaction_promise(tx: &web::IdbTransaction) -> Promise {
    let tx = tx.clone();
    Promise::new(&mut |resolve, reject| {
        let on_complete = Closure::once_into_js(move |_ev: web::Event| {
            _ = resolve.call0(&JsValue::NULL);
        });
        let t = tx.clone();
        let reject_abort = reject.clone();
        let on_error = Closure::once_into_js(move |_ev: web::Event| {
            let err = t
                .error()
                .map(JsValue::from)
                .unwrap_or_else(|| JsValue::from_str("transaction failed"));
            _ = reject.call1(&JsValue::NULL, &err);
        });
        let on_abort = Closure::once_into_js(move |_ev: web::Event| {
            _ = reject_abort.call1(&JsValue::NULL, &JsValue::from_str("transaction aborted"));
        });
        tx.set_oncomplete(Some(on_complete.unchecked_ref()));
        tx.set_onerror(Some(on_error.unchecked_ref()));
        tx.set_onabort(Some(on_abort.unchecked_ref()));
    })
}

/// IndexedDB-backed [`BlobStore`]. Values are stored as `Blob`s in the
/// `blobs` object store; the database handle is opened lazily and reused.
#[derive(Default)]
pub struct IdbBlobStore {
    db: RefCell<Option<web::IdbDatabase>>,
}

impl IdbBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn database(&self) -> Result<web::IdbDatabase, StorageError> {
        if let Some(db) = self.db.borrow().as_ref() {
            return Ok(db.clone());
        }
        let factory = web::window()
            .and_then(|w| w.indexed_db().ok().flatten())
            .ok_or_else(|| StorageError::Unavailable("IndexedDB".into()))?;
        let open = factory
            .open_with_u32(ASSET_DB_NAME, ASSET_DB_VERSION)
            .map_err(|e| js_error("indexedDB.open", e))?;

        let req = open.clone();
        let on_upgrade = Closure::once_into_js(move |_ev: web::IdbVersionChangeEvent| {
            let Ok(result) = req.result() else { return };
            let db: web::IdbDatabase = result.unchecked_into();
            if !db.object_store_names().contains(ASSET_BLOB_STORE) {
                if let Err(e) = db.create_object_store(ASSET_BLOB_STORE) {
                    log::warn!("[idb] create store failed: {:?}", e);
                }
            }
        });
        open.set_onupgradeneeded(Some(on_upgrade.unchecked_ref()));

        let result = JsFuture::from(request_promise(&open))
            .await
            .map_err(|e| js_error("indexedDB.open", e))?;
        let db: web::IdbDatabase = result
            .dyn_into()
            .map_err(|e| js_error("indexedDB.open result", e))?;
        log::info!("[idb] opened {} v{}", ASSET_DB_NAME, ASSET_DB_VERSION);
        *self.db.borrow_mut() = Some(db.clone());
        Ok(db)
    }

    async fn store(
        &self,
        mode: web::IdbTransactionMode,
    ) -> Result<(web::IdbTransaction, web::IdbObjectStore), StorageError> {
        let db = self.database().await?;
        let tx = db
            .transaction_with_str_and_mode(ASSET_BLOB_STORE, mode)
            .map_err(|e| js_error("transaction", e))?;
        let store = tx
            .object_store(ASSET_BLOB_STORE)
            .map_err(|e| js_error("objectStore", e))?;
        Ok((tx, store))
    }
}

async fn bytes_of(value: JsValue) -> Result<Vec<u8>, StorageError> {
    if let Some(blob) = value.dyn_ref::<web::Blob>() {
        let buf = JsFuture::from(blob.array_buffer())
            .await
            .map_err(|e| js_error("Blob.arrayBuffer", e))?;
        return Ok(Uint8Array::new(&buf).to_vec());
    }
    if value.is_instance_of::<js_sys::ArrayBuffer>() || value.is_instance_of::<Uint8Array>() {
        return Ok(Uint8Array::new(&value).to_vec());
    }
    Err(StorageError::Backend("stored value is not binary".into()))
}

pub(crate) fn blob_from_bytes(bytes: &[u8], mime: Option<&str>) -> Result<web::Blob, JsValue> {
    let parts = Array::of1(&Uint8Array::from(bytes));
    match mime {
        Some(mime) => {
            let opts = web::BlobPropertyBag::new();
            opts.set_type(mime);
            web::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
        }
        None => web::Blob::new_with_u8_array_sequence(&parts),
    }
}

impl BlobStore for IdbBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let (_tx, store) = self.store(web::IdbTransactionMode::Readonly).await?;
        let req = store
            .get(&JsValue::from_str(key))
            .map_err(|e| js_error("store.get", e))?;
        let value = JsFuture::from(request_promise(&req))
            .await
            .map_err(|e| js_error("store.get", e))?;
        if value.is_undefined() || value.is_null() {
            return Ok(None);
        }
        bytes_of(value).await.map(Some)
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let blob = blob_from_bytes(bytes, None).map_err(|e| js_error("Blob", e))?;
        let (tx, store) = self.store(web::IdbTransactionMode::Readwrite).await?;
        let done = transaction_promise(&tx);
        store
            .put_with_key(&blob, &JsValue::from_str(key))
            .map_err(|e| js_error("store.put", e))?;
        JsFuture::from(done)
            .await
            .map_err(|e| js_error("store.put", e))?;
        log::debug!("[idb] put {} ({} bytes)", key, bytes.len());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let (tx, store) = self.store(web::IdbTransactionMode::Readwrite).await?;
        let done = transaction_promise(&tx);
        store
            .delete(&JsValue::from_str(key))
            .map_err(|e| js_error("store.delete", e))?;
        JsFuture::from(done)
            .await
            .map_err(|e| js_error("store.delete", e))?;
        Ok(())
    }
}
