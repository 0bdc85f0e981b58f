use std::cell::{Cell, RefCell};
use std::future::Future;

use fnv::FnvHashMap;

use crate::error::StorageError;

/// Synchronous string key-value storage (browser `localStorage` semantics).
///
/// Methods take `&self`; implementations use interior mutability. Writes are
/// last-write-wins with no conflict detection.
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Asynchronous binary storage (IndexedDB semantics).
///
/// Each call settles exactly once; there is no retry, timeout or cancellation.
pub trait BlobStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, StorageError>>;
    fn put(&self, key: &str, bytes: &[u8]) -> impl Future<Output = Result<(), StorageError>>;
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), StorageError>>;
}

/// In-memory [`KeyValueStorage`]. Can be switched off to behave like an
/// environment without storage.
#[derive(Debug)]
pub struct MemoryStorage {
    data: RefCell<FnvHashMap<String, String>>,
    available: Cell<bool>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self {
            data: RefCell::new(FnvHashMap::default()),
            available: Cell::new(true),
        }
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A storage that reports [`StorageError::Unavailable`] for every call.
    pub fn unavailable() -> Self {
        let s = Self::default();
        s.available.set(false);
        s
    }

    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.available.get() {
            Ok(())
        } else {
            Err(StorageError::Unavailable("memory storage disabled".into()))
        }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.data.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.data.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.data.borrow_mut().remove(key);
        Ok(())
    }
}

/// In-memory [`BlobStore`].
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    data: RefCell<FnvHashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.data.borrow().get(key).cloned())
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.data.borrow_mut().insert(key.to_owned(), bytes.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }
}
