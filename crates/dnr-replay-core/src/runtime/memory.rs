// crates/dnr-replay-core/src/runtime/memory.rs
// ============================================================================
// Module: In-Memory Object Store
// Description: Bucket-shaped object store held in process memory.
// Purpose: Drive the replay pipeline in tests and offline dry runs.
// Dependencies: crate::interfaces, time
// ============================================================================

//! ## Overview
//! [`InMemoryObjectStore`] keeps objects in a sorted map, so listings come
//! back in lexicographic key order like S3. Listings are paged internally
//! with a configurable page size to exercise pagination in callers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;

use time::OffsetDateTime;

use crate::interfaces::KeyListing;
use crate::interfaces::ObjectStore;
use crate::interfaces::PutObject;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Default listing page size (matches S3's `MaxKeys` default).
const DEFAULT_PAGE_SIZE: usize = 1000;

/// Stored object and metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object body.
    pub bytes: Vec<u8>,
    /// Last-modified timestamp.
    pub last_modified: OffsetDateTime,
    /// `Content-Type`, when set.
    pub content_type: Option<String>,
    /// `Content-Encoding`, when set.
    pub content_encoding: Option<String>,
}

/// Mutable store state.
#[derive(Debug, Default)]
struct MemoryState {
    /// Objects by key.
    objects: BTreeMap<String, StoredObject>,
    /// Number of `put` calls served.
    puts: usize,
}

/// In-memory object store bound to a bucket name.
#[derive(Debug)]
pub struct InMemoryObjectStore {
    /// Bucket name.
    bucket: String,
    /// Keys returned per internal listing page.
    page_size: usize,
    /// Store state.
    state: Mutex<MemoryState>,
}

impl InMemoryObjectStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            page_size: DEFAULT_PAGE_SIZE,
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Sets the listing page size (minimum 1).
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Inserts an object with an explicit last-modified timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] if the store lock is poisoned.
    pub fn insert(
        &self,
        key: impl Into<String>,
        bytes: Vec<u8>,
        last_modified: OffsetDateTime,
    ) -> Result<(), StoreError> {
        self.lock()?.objects.insert(
            key.into(),
            StoredObject {
                bytes,
                last_modified,
                content_type: None,
                content_encoding: None,
            },
        );
        Ok(())
    }

    /// Returns a copy of a stored object.
    #[must_use]
    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.lock().ok().and_then(|state| state.objects.get(key).cloned())
    }

    /// Returns the number of `put` calls served.
    #[must_use]
    pub fn put_count(&self) -> usize {
        self.lock().map(|state| state.puts).unwrap_or_default()
    }

    /// Locks the store state.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Invalid("object store lock poisoned".to_string()))
    }

    /// Returns one page of keys strictly after `after`.
    fn page(&self, prefix: &str, after: Option<&str>) -> Result<Vec<String>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .filter(|key| after.is_none_or(|after| key.as_str() > after))
            .take(self.page_size)
            .cloned()
            .collect())
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn head_timestamp(&self, key: &str) -> Result<Option<OffsetDateTime>, StoreError> {
        Ok(self.lock()?.objects.get(key).map(|object| object.last_modified))
    }

    fn list_by_prefix<'a>(&'a self, prefix: &str) -> KeyListing<'a> {
        Box::new(MemoryListing {
            store: self,
            prefix: prefix.to_string(),
            cursor: None,
            page: Vec::new().into_iter(),
            done: false,
        })
    }

    fn get(&self, key: &str, max_bytes: usize) -> Result<Vec<u8>, StoreError> {
        let state = self.lock()?;
        let object = state.objects.get(key).ok_or_else(|| StoreError::NotFound {
            bucket: self.bucket.clone(),
            key: key.to_string(),
        })?;
        if object.bytes.len() > max_bytes {
            return Err(StoreError::TooLarge {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                max_bytes,
                actual_bytes: object.bytes.len(),
            });
        }
        Ok(object.bytes.clone())
    }

    fn put(&self, key: &str, object: PutObject) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.puts += 1;
        state.objects.insert(
            key.to_string(),
            StoredObject {
                bytes: object.bytes,
                last_modified: OffsetDateTime::now_utc(),
                content_type: object.content_type,
                content_encoding: object.content_encoding,
            },
        );
        Ok(())
    }
}

// ============================================================================
// SECTION: Listing
// ============================================================================

/// Paged key iterator over an [`InMemoryObjectStore`].
struct MemoryListing<'a> {
    /// Store being listed.
    store: &'a InMemoryObjectStore,
    /// Listing prefix.
    prefix: String,
    /// Last key returned (continuation marker).
    cursor: Option<String>,
    /// Keys of the current page.
    page: std::vec::IntoIter<String>,
    /// True once the final page was fetched.
    done: bool,
}

impl Iterator for MemoryListing<'_> {
    type Item = Result<String, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(key) = self.page.next() {
                self.cursor = Some(key.clone());
                return Some(Ok(key));
            }
            if self.done {
                return None;
            }
            match self.store.page(&self.prefix, self.cursor.as_deref()) {
                Ok(keys) => {
                    self.done = keys.len() < self.store.page_size;
                    self.page = keys.into_iter();
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}
