use miniroom_core::{ObjectUrls, StorageError};
use web_sys as web;

use crate::idb::blob_from_bytes;
use crate::storage::js_error;

/// `URL.createObjectURL` / `URL.revokeObjectURL`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserObjectUrls;

impl ObjectUrls for BrowserObjectUrls {
    fn create(&self, bytes: &[u8], mime: &str) -> Result<String, StorageError> {
        let blob = blob_from_bytes(bytes, Some(mime)).map_err(|e| js_error("Blob", e))?;
        web::Url::create_object_url_with_blob(&blob).map_err(|e| js_error("URL.createObjectURL", e))
    }

    fn revoke(&self, url: &str) {
        _ = web::Url::revoke_object_url(url);
    }
}
