//! Narrow interfaces to systems owned by the surrounding application: account
//! profiles, recruiting listings and image storage. Each comes with an
//! in-memory implementation used by tests and offline runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use allyflow_core::{AccountId, DateRange, ErrorKind, ListingId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

impl DirectoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DirectoryError::NotFound { .. } => ErrorKind::NotFound,
            DirectoryError::Unavailable(_) => ErrorKind::Collaborator,
        }
    }
}

/// Resolves display names, snapshotted onto records at creation.
#[async_trait::async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn display_name(&self, account: AccountId) -> Result<String, DirectoryError>;
}

/// Copy of a recruiting listing as it reads right now.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSnapshot {
    pub title: String,
    pub target: String,
    pub benefit: String,
    pub condition: String,
    pub body: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ListingSnapshot {
    /// Both dates, in either order.
    pub fn range(&self) -> Option<DateRange> {
        Some(DateRange::ordered(self.start?, self.end?))
    }

    /// `start ~ end` for prompts and the date resolver.
    pub fn range_text(&self) -> Option<String> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(format!("{start} ~ {end}")),
            _ => None,
        }
    }
}

#[async_trait::async_trait]
pub trait ListingDirectory: Send + Sync {
    async fn find(&self, listing: ListingId) -> Result<ListingSnapshot, DirectoryError>;
}

/// Image bytes attached to a promotion edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FileStoreError {
    #[error("image upload failed: {0}")]
    Upload(String),

    #[error("image delete failed for {url}: {reason}")]
    Delete { url: String, reason: String },
}

impl FileStoreError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Collaborator
    }
}

#[async_trait::async_trait]
pub trait FileStore: Send + Sync {
    async fn upload(&self, image: &ImageUpload) -> Result<String, FileStoreError>;
    async fn delete(&self, url: &str) -> Result<(), FileStoreError>;
}

#[async_trait::async_trait]
impl<T: AccountDirectory + ?Sized> AccountDirectory for Arc<T> {
    async fn display_name(&self, account: AccountId) -> Result<String, DirectoryError> {
        (**self).display_name(account).await
    }
}

#[async_trait::async_trait]
impl<T: ListingDirectory + ?Sized> ListingDirectory for Arc<T> {
    async fn find(&self, listing: ListingId) -> Result<ListingSnapshot, DirectoryError> {
        (**self).find(listing).await
    }
}

#[async_trait::async_trait]
impl<T: FileStore + ?Sized> FileStore for Arc<T> {
    async fn upload(&self, image: &ImageUpload) -> Result<String, FileStoreError> {
        (**self).upload(image).await
    }

    async fn delete(&self, url: &str) -> Result<(), FileStoreError> {
        (**self).delete(url).await
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAccountDirectory {
    names: RwLock<HashMap<AccountId, String>>,
}

impl InMemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, account: AccountId, name: impl Into<String>) {
        if let Ok(mut names) = self.names.write() {
            names.insert(account, name.into());
        }
    }
}

#[async_trait::async_trait]
impl AccountDirectory for InMemoryAccountDirectory {
    async fn display_name(&self, account: AccountId) -> Result<String, DirectoryError> {
        let names = self
            .names
            .read()
            .map_err(|_| DirectoryError::Unavailable("lock poisoned".to_string()))?;
        names.get(&account).cloned().ok_or(DirectoryError::NotFound {
            entity: "account",
            id: account.to_string(),
        })
    }
}

#[derive(Debug, Default)]
pub struct InMemoryListingDirectory {
    listings: RwLock<HashMap<ListingId, ListingSnapshot>>,
}

impl InMemoryListingDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, listing: ListingId, snapshot: ListingSnapshot) {
        if let Ok(mut listings) = self.listings.write() {
            listings.insert(listing, snapshot);
        }
    }
}

#[async_trait::async_trait]
impl ListingDirectory for InMemoryListingDirectory {
    async fn find(&self, listing: ListingId) -> Result<ListingSnapshot, DirectoryError> {
        let listings = self
            .listings
            .read()
            .map_err(|_| DirectoryError::Unavailable("lock poisoned".to_string()))?;
        listings.get(&listing).cloned().ok_or(DirectoryError::NotFound {
            entity: "listing",
            id: listing.to_string(),
        })
    }
}

/// Keeps uploaded images in memory under `memory://images/<n>/<file_name>`.
#[derive(Debug, Default)]
pub struct InMemoryFileStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    next: AtomicU64,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, url: &str) -> bool {
        self.files.lock().map(|f| f.contains_key(url)).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.files.lock().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl FileStore for InMemoryFileStore {
    async fn upload(&self, image: &ImageUpload) -> Result<String, FileStoreError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(FileStoreError::Upload("storage rejected the upload".to_string()));
        }
        if image.is_empty() {
            return Err(FileStoreError::Upload("image is empty".to_string()));
        }
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        let url = format!("memory://images/{n}/{}", image.file_name);
        self.files
            .lock()
            .map_err(|_| FileStoreError::Upload("lock poisoned".to_string()))?
            .insert(url.clone(), image.bytes.clone());
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), FileStoreError> {
        let failed = |reason: &str| FileStoreError::Delete {
            url: url.to_string(),
            reason: reason.to_string(),
        };
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(failed("storage rejected the delete"));
        }
        let mut files = self.files.lock().map_err(|_| failed("lock poisoned"))?;
        files.remove(url).map(|_| ()).ok_or_else(|| failed("no such image"))
    }
}
