//! Binary model/thumbnail overrides for built-in furniture.
//!
//! Blobs live in a [`BlobStore`] under `override-model:<id>` and
//! `override-thumb:<id>`. Displaying them goes through [`ObjectUrls`], which
//! mints temporary urls the caller is responsible for revoking.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use fnv::FnvHashMap;
use serde::Serialize;

use crate::error::StorageError;
use crate::storage::BlobStore;

pub const MODEL_MIME: &str = "model/gltf-binary";
pub const THUMB_MIME: &str = "image/png";

pub fn model_key(id: &str) -> String {
    format!("override-model:{id}")
}

pub fn thumb_key(id: &str) -> String {
    format!("override-thumb:{id}")
}

/// Mints displayable urls for raw bytes.
pub trait ObjectUrls {
    fn create(&self, bytes: &[u8], mime: &str) -> Result<String, StorageError>;
    fn revoke(&self, url: &str);
}

/// Host-side [`ObjectUrls`] handing out `blob:miniroom/<n>` urls.
#[derive(Debug, Default)]
pub struct MemoryObjectUrls {
    next: Cell<u64>,
    live: RefCell<FnvHashMap<String, (String, Vec<u8>)>>,
}

impl MemoryObjectUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes behind a live url.
    pub fn resolve(&self, url: &str) -> Option<Vec<u8>> {
        self.live.borrow().get(url).map(|(_, b)| b.clone())
    }

    pub fn mime_of(&self, url: &str) -> Option<String> {
        self.live.borrow().get(url).map(|(m, _)| m.clone())
    }

    pub fn live_count(&self) -> usize {
        self.live.borrow().len()
    }
}

impl ObjectUrls for MemoryObjectUrls {
    fn create(&self, bytes: &[u8], mime: &str) -> Result<String, StorageError> {
        let n = self.next.get() + 1;
        self.next.set(n);
        let url = format!("blob:miniroom/{n}");
        self.live
            .borrow_mut()
            .insert(url.clone(), (mime.to_owned(), bytes.to_vec()));
        Ok(url)
    }

    fn revoke(&self, url: &str) {
        self.live.borrow_mut().remove(url);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideUrls {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb_url: Option<String>,
}

impl OverrideUrls {
    pub fn is_empty(&self) -> bool {
        self.model_url.is_none() && self.thumb_url.is_none()
    }
}

pub struct AssetOverrides<B> {
    store: B,
}

impl<B: BlobStore> AssetOverrides<B> {
    pub fn new(store: B) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &B {
        &self.store
    }

    pub async fn set_model_override(&self, id: &str, bytes: &[u8]) -> Result<(), StorageError> {
        log::debug!("[assets] model override for {} ({} bytes)", id, bytes.len());
        self.store.put(&model_key(id), bytes).await
    }

    pub async fn set_thumbnail_override(&self, id: &str, bytes: &[u8]) -> Result<(), StorageError> {
        log::debug!("[assets] thumbnail override for {} ({} bytes)", id, bytes.len());
        self.store.put(&thumb_key(id), bytes).await
    }

    pub async fn clear_model_override(&self, id: &str) -> Result<(), StorageError> {
        self.store.delete(&model_key(id)).await
    }

    pub async fn clear_thumbnail_override(&self, id: &str) -> Result<(), StorageError> {
        self.store.delete(&thumb_key(id)).await
    }

    /// Fresh urls for every id that has at least one override blob.
    ///
    /// Ids are visited sequentially. A store failure aborts the whole call;
    /// urls minted before the failure are revoked first.
    pub async fn override_urls<U: ObjectUrls>(
        &self,
        ids: &[String],
        urls: &U,
    ) -> Result<BTreeMap<String, OverrideUrls>, StorageError> {
        let mut out = BTreeMap::new();
        match self.collect_urls(ids, urls, &mut out).await {
            Ok(()) => Ok(out),
            Err(e) => {
                for entry in out.values() {
                    for url in entry.model_url.iter().chain(entry.thumb_url.iter()) {
                        urls.revoke(url);
                    }
                }
                log::warn!("[assets] override lookup failed: {}", e);
                Err(e)
            }
        }
    }

    async fn collect_urls<U: ObjectUrls>(
        &self,
        ids: &[String],
        urls: &U,
        out: &mut BTreeMap<String, OverrideUrls>,
    ) -> Result<(), StorageError> {
        for id in ids {
            let model = self.store.get(&model_key(id)).await?;
            let thumb = self.store.get(&thumb_key(id)).await?;
            let mut entry = OverrideUrls::default();
            if let Some(bytes) = model {
                entry.model_url = Some(urls.create(&bytes, MODEL_MIME)?);
            }
            if let Some(bytes) = thumb {
                let url = match urls.create(&bytes, THUMB_MIME) {
                    Ok(url) => url,
                    Err(e) => {
                        if let Some(m) = &entry.model_url {
                            urls.revoke(m);
                        }
                        return Err(e);
                    }
                };
                entry.thumb_url = Some(url);
            }
            if !entry.is_empty() {
                out.insert(id.clone(), entry);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStore;
    use pollster::block_on;

    struct FailingStore;

    impl BlobStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Err(StorageError::Backend("boom".into()))
        }
        async fn put(&self, _key: &str, _bytes: &[u8]) -> Result<(), StorageError> {
            Err(StorageError::Backend("boom".into()))
        }
        async fn delete(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Backend("boom".into()))
        }
    }

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(model_key("chair"), "override-model:chair");
        assert_eq!(thumb_key("chair"), "override-thumb:chair");
    }

    #[test]
    fn urls_only_for_ids_with_blobs() {
        let assets = AssetOverrides::new(MemoryBlobStore::new());
        let urls = MemoryObjectUrls::new();
        block_on(async {
            assets.set_model_override("chair", b"glb").await.unwrap();
            assets.set_thumbnail_override("lamp", b"png").await.unwrap();
            let map = assets
                .override_urls(&ids(&["chair", "lamp", "desk"]), &urls)
                .await
                .unwrap();
            assert_eq!(map.len(), 2);
            assert!(!map.contains_key("desk"));
            let chair = &map["chair"];
            assert!(chair.thumb_url.is_none());
            let model_url = chair.model_url.as_deref().unwrap();
            assert_eq!(urls.resolve(model_url), Some(b"glb".to_vec()));
            assert_eq!(urls.mime_of(model_url).as_deref(), Some(MODEL_MIME));
            assert!(map["lamp"].model_url.is_none());
        });
    }

    #[test]
    fn clear_removes_only_that_kind() {
        let assets = AssetOverrides::new(MemoryBlobStore::new());
        let urls = MemoryObjectUrls::new();
        block_on(async {
            assets.set_model_override("chair", b"glb").await.unwrap();
            assets.set_thumbnail_override("chair", b"png").await.unwrap();
            assets.clear_model_override("chair").await.unwrap();
            let map = assets.override_urls(&ids(&["chair"]), &urls).await.unwrap();
            assert!(map["chair"].model_url.is_none());
            assert!(map["chair"].thumb_url.is_some());
            assets.clear_thumbnail_override("chair").await.unwrap();
            let map = assets.override_urls(&ids(&["chair"]), &urls).await.unwrap();
            assert!(map.is_empty());
        });
        assert!(assets.store().is_empty());
    }

    #[test]
    fn each_call_mints_fresh_urls() {
        let assets = AssetOverrides::new(MemoryBlobStore::new());
        let urls = MemoryObjectUrls::new();
        block_on(async {
            assets.set_model_override("chair", b"glb").await.unwrap();
            let a = assets.override_urls(&ids(&["chair"]), &urls).await.unwrap();
            let b = assets.override_urls(&ids(&["chair"]), &urls).await.unwrap();
            assert_ne!(a["chair"].model_url, b["chair"].model_url);
        });
        assert_eq!(urls.live_count(), 2);
    }

    #[test]
    fn store_failure_rejects() {
        let assets = AssetOverrides::new(FailingStore);
        let urls = MemoryObjectUrls::new();
        block_on(async {
            assert!(assets.set_model_override("x", b"1").await.is_err());
            let err = assets.override_urls(&ids(&["x"]), &urls).await.unwrap_err();
            assert_eq!(err, StorageError::Backend("boom".into()));
        });
        assert_eq!(urls.live_count(), 0);
    }

    #[test]
    fn serializes_without_absent_urls() {
        let entry = OverrideUrls {
            model_url: Some("blob:x".into()),
            thumb_url: None,
        };
        assert_eq!(serde_json::to_string(&entry).unwrap(), r#"{"modelUrl":"blob:x"}"#);
    }
}
