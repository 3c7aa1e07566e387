use super::domain::{ApplicationId, CandidateApplication, NewApplication};

/// Remote data store for applications. Records are insert-only.
pub trait ApplicationStore: Send + Sync {
    /// Persist a submission, assigning its `id` and `created_at`.
    fn insert(&self, application: NewApplication) -> Result<CandidateApplication, RepositoryError>;
    /// Every record, newest first.
    fn list_recent(&self) -> Result<Vec<CandidateApplication>, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<CandidateApplication>, RepositoryError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Object storage for uploaded resumes.
pub trait ResumeStorage: Send + Sync {
    /// Store the object and return a publicly retrievable URL for it.
    fn upload(&self, object_name: &str, content_type: &str, bytes: &[u8]) -> Result<String, StorageError>;
    fn open(&self, object_name: &str) -> Result<Option<StoredObject>, StorageError>;
    /// Delete the object. Removing a missing object is not an error.
    fn remove(&self, object_name: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("object already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid object name: {0}")]
    InvalidName(String),
    #[error("object storage unavailable: {0}")]
    Unavailable(String),
}
