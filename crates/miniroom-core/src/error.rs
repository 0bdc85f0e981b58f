//! Error types for the fallible edges of the core.
//!
//! Most of the core is pure math and never fails. Storage and camera adapters
//! report through these enums; callers decide whether to degrade or surface.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// No storage engine in this environment (no window, private mode, ...).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// The engine accepted the call but the operation failed.
    #[error("storage operation failed: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("camera controls lack internal field `{0}`")]
    MissingInternals(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("item `{0}` already exists")]
    DuplicateId(String),
    #[error("item `{0}` not found")]
    NotFound(String),
    #[error("item `{0}` is locked")]
    ItemLocked(String),
}
