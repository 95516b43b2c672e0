// crates/dnr-replay-store-s3/src/store.rs
// ============================================================================
// Module: S3 Object Store
// Description: S3-backed object store gateway for DNR replay.
// Purpose: Probe, list, fetch, and write objects in one S3 bucket.
// Dependencies: dnr-replay-core, dnr-replay-config, aws-sdk-s3, tokio
// ============================================================================

//! ## Overview
//! [`S3ObjectStore`] binds one bucket and one credential set at construction
//! and exposes the synchronous [`ObjectStore`] interface. SDK calls run on a
//! private Tokio runtime. Absent objects are reported as negative probe
//! results; every other backend failure carries bucket and key context.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::primitives::DateTime;
use dnr_replay_config::BucketConfig;
use dnr_replay_core::KeyListing;
use dnr_replay_core::ObjectStore;
use dnr_replay_core::PutObject;
use dnr_replay_core::StoreError;
use time::OffsetDateTime;
use tokio::io::AsyncReadExt;
use tokio::runtime::Handle;
use tokio::runtime::Runtime;
use tokio::runtime::RuntimeFlavor;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Provider name attached to static credentials.
const STATIC_CREDENTIALS_PROVIDER: &str = "dnr-replay-config";
/// Read buffer size for object bodies.
const READ_CHUNK_BYTES: usize = 8192;

// ============================================================================
// SECTION: Runtime Helpers
// ============================================================================

/// Blocks on an object-store future using a compatible runtime.
fn block_on_with_runtime<F, T>(runtime: &Runtime, future: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>> + Send + 'static,
    T: Send + 'static,
{
    if let Ok(handle) = Handle::try_current() {
        if matches!(handle.runtime_flavor(), RuntimeFlavor::MultiThread) {
            return tokio::task::block_in_place(|| handle.block_on(future));
        }
        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        std::thread::spawn(move || {
            let result = Runtime::new()
                .map_err(|err| StoreError::Invalid(err.to_string()))
                .and_then(|runtime| runtime.block_on(future));
            let _ = tx.send(result);
        });
        return rx.recv().unwrap_or_else(|_| {
            Err(StoreError::Invalid("object store thread join failed".to_string()))
        });
    }

    runtime.block_on(future)
}

/// Converts an SDK timestamp to UTC.
fn to_offset_date_time(value: &DateTime) -> Option<OffsetDateTime> {
    let nanos = i128::from(value.secs())
        .checked_mul(1_000_000_000)?
        .checked_add(i128::from(value.subsec_nanos()))?;
    OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Object store backed by a single S3 bucket.
pub struct S3ObjectStore {
    /// Underlying S3 client.
    client: Client,
    /// Bucket name.
    bucket: String,
    /// Tokio runtime for blocking S3 operations.
    runtime: Option<Arc<Runtime>>,
}

impl Drop for S3ObjectStore {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            let _ = std::thread::spawn(move || drop(runtime));
        }
    }
}

impl S3ObjectStore {
    /// Builds a store from bucket configuration.
    ///
    /// Static credentials are read from the environment variables the config
    /// names; without them the default AWS credential chain applies.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when configuration, credentials, or
    /// runtime initialization fails.
    pub fn new(config: &BucketConfig) -> Result<Self, StoreError> {
        config.validate("bucket").map_err(|err| StoreError::Invalid(err.to_string()))?;
        let credentials = match &config.credentials {
            Some(names) => {
                let (access_key_id, secret_access_key) =
                    names.resolve().map_err(|err| StoreError::Invalid(err.to_string()))?;
                Some(Credentials::new(
                    access_key_id,
                    secret_access_key,
                    None,
                    None,
                    STATIC_CREDENTIALS_PROVIDER,
                ))
            }
            None => None,
        };
        let runtime = Runtime::new().map_err(|err| StoreError::Invalid(err.to_string()))?;
        let region = config.region.clone();
        let endpoint = config.endpoint.clone();
        let shared_config = block_on_with_runtime(&runtime, async move {
            let mut loader = aws_config::defaults(BehaviorVersion::latest());
            if let Some(region) = region {
                loader = loader.region(Region::new(region));
            }
            if let Some(endpoint) = endpoint {
                loader = loader.endpoint_url(endpoint);
            }
            if let Some(credentials) = credentials {
                loader = loader.credentials_provider(credentials);
            }
            Ok(loader.load().await)
        })?;
        let mut s3_builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if config.force_path_style {
            s3_builder = s3_builder.force_path_style(true);
        }
        Ok(Self {
            client: Client::from_conf(s3_builder.build()),
            bucket: config.bucket.clone(),
            runtime: Some(Arc::new(runtime)),
        })
    }

    /// Returns the runtime or an error if shutdown.
    fn runtime(&self) -> Result<&Runtime, StoreError> {
        self.runtime
            .as_ref()
            .map(AsRef::as_ref)
            .ok_or_else(|| StoreError::Invalid("object store runtime closed".to_string()))
    }

    /// Builds a transport error for a key or prefix.
    fn transport(&self, key: &str, message: impl Into<String>) -> StoreError {
        StoreError::Transport {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// Heads an object: `None` when absent, else its optional timestamp.
    fn head(&self, key: &str) -> Result<Option<Option<OffsetDateTime>>, StoreError> {
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let owned_key = key.to_string();
        let outcome = block_on_with_runtime(self.runtime()?, async move {
            match client.head_object().bucket(bucket).key(owned_key).send().await {
                Ok(output) => Ok(Ok(Some(output.last_modified().and_then(to_offset_date_time)))),
                Err(err) if err.as_service_error().is_some_and(|service| service.is_not_found()) => {
                    Ok(Ok(None))
                }
                Err(err) => Ok(Err(DisplayErrorContext(&err).to_string())),
            }
        })?;
        outcome.map_err(|message| self.transport(key, message))
    }

    /// Fetches one listing page after an optional continuation token.
    fn list_page(&self, prefix: &str, token: Option<String>) -> Result<ListPage, StoreError> {
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let owned_prefix = prefix.to_string();
        let outcome = block_on_with_runtime(self.runtime()?, async move {
            let mut request = client.list_objects_v2().bucket(bucket).set_continuation_token(token);
            if !owned_prefix.is_empty() {
                request = request.prefix(owned_prefix);
            }
            match request.send().await {
                Ok(output) => Ok(Ok(ListPage {
                    keys: output
                        .contents()
                        .iter()
                        .filter_map(|object| object.key().map(str::to_string))
                        .collect(),
                    next_token: output
                        .is_truncated()
                        .unwrap_or(false)
                        .then(|| output.next_continuation_token().map(str::to_string))
                        .flatten(),
                })),
                Err(err) => Ok(Err(DisplayErrorContext(&err).to_string())),
            }
        })?;
        outcome.map_err(|message| self.transport(prefix, message))
    }
}

impl ObjectStore for S3ObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn head_timestamp(&self, key: &str) -> Result<Option<OffsetDateTime>, StoreError> {
        match self.head(key)? {
            None => Ok(None),
            Some(Some(last_modified)) => Ok(Some(last_modified)),
            Some(None) => {
                Err(self.transport(key, "object exists but has no last-modified timestamp"))
            }
        }
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.head(key)?.is_some())
    }

    fn list_by_prefix<'a>(&'a self, prefix: &str) -> KeyListing<'a> {
        Box::new(S3Listing {
            store: self,
            prefix: prefix.to_string(),
            next_token: None,
            page: Vec::new().into_iter(),
            done: false,
        })
    }

    fn get(&self, key: &str, max_bytes: usize) -> Result<Vec<u8>, StoreError> {
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let owned_key = key.to_string();
        let outcome = block_on_with_runtime(self.runtime()?, async move {
            let output = match client.get_object().bucket(bucket).key(owned_key).send().await {
                Ok(output) => output,
                Err(err) => {
                    let failure = if err.as_service_error().is_some_and(|service| service.is_no_such_key()) {
                        GetFailure::NotFound
                    } else {
                        GetFailure::Transport(DisplayErrorContext(&err).to_string())
                    };
                    return Ok(Err(failure));
                }
            };
            if let Some(length) = output.content_length() {
                let actual_bytes = usize::try_from(length).unwrap_or(usize::MAX);
                if actual_bytes > max_bytes {
                    return Ok(Err(GetFailure::TooLarge(actual_bytes)));
                }
            }
            let mut reader = output.body.into_async_read();
            let mut buffer = Vec::new();
            let mut chunk = [0u8; READ_CHUNK_BYTES];
            loop {
                let read = match reader.read(&mut chunk).await {
                    Ok(read) => read,
                    Err(err) => return Ok(Err(GetFailure::Transport(err.to_string()))),
                };
                if read == 0 {
                    break;
                }
                let total_bytes = buffer.len().saturating_add(read);
                if total_bytes > max_bytes {
                    return Ok(Err(GetFailure::TooLarge(total_bytes)));
                }
                buffer.extend_from_slice(&chunk[.. read]);
            }
            Ok(Ok(buffer))
        })?;
        outcome.map_err(|failure| match failure {
            GetFailure::NotFound => StoreError::NotFound {
                bucket: self.bucket.clone(),
                key: key.to_string(),
            },
            GetFailure::TooLarge(actual_bytes) => StoreError::TooLarge {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                max_bytes,
                actual_bytes,
            },
            GetFailure::Transport(message) => self.transport(key, message),
        })
    }

    fn put(&self, key: &str, object: PutObject) -> Result<(), StoreError> {
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let owned_key = key.to_string();
        let outcome = block_on_with_runtime(self.runtime()?, async move {
            let request = client
                .put_object()
                .bucket(bucket)
                .key(owned_key)
                .body(ByteStream::from(object.bytes))
                .set_content_type(object.content_type)
                .set_content_encoding(object.content_encoding);
            Ok(request.send().await.map(|_| ()).map_err(|err| DisplayErrorContext(&err).to_string()))
        })?;
        outcome.map_err(|message| self.transport(key, message))
    }
}

// ============================================================================
// SECTION: Listing
// ============================================================================

/// One page of a bucket listing.
struct ListPage {
    /// Keys in the page.
    keys: Vec<String>,
    /// Continuation token when more pages follow.
    next_token: Option<String>,
}

/// Reasons a fetch can fail inside the runtime.
enum GetFailure {
    /// No such key.
    NotFound,
    /// Body exceeds the cap (observed size).
    TooLarge(usize),
    /// Backend failure message.
    Transport(String),
}

/// Paged key iterator over an [`S3ObjectStore`].
struct S3Listing<'a> {
    /// Store being listed.
    store: &'a S3ObjectStore,
    /// Listing prefix.
    prefix: String,
    /// Continuation token for the next page.
    next_token: Option<String>,
    /// Keys of the current page.
    page: std::vec::IntoIter<String>,
    /// True once the final page was fetched.
    done: bool,
}

impl Iterator for S3Listing<'_> {
    type Item = Result<String, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(key) = self.page.next() {
                return Some(Ok(key));
            }
            if self.done {
                return None;
            }
            match self.store.list_page(&self.prefix, self.next_token.take()) {
                Ok(page) => {
                    self.done = page.next_token.is_none();
                    self.next_token = page.next_token;
                    self.page = page.keys.into_iter();
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
