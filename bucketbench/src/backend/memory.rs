use super::{validate_name, Backend, Connector, Listing};
use bucketbench_core::{BackendError, ResourceKind};
use futures_util::{stream, StreamExt};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

type Objects = BTreeMap<String, Vec<u8>>;

#[derive(Debug, Default)]
struct StoreState {
    buckets: BTreeMap<String, Objects>,
    open_sessions: usize,
    total_sessions: usize,
}

/// In-process object store. Sessions handed out by [`MemoryStore::connect`] share the same
/// state, so a store can be inspected after the sessions using it are closed.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket_names(&self) -> Vec<String> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.buckets.keys().cloned().collect()
    }

    /// Sessions connected but not yet closed.
    pub fn open_sessions(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.open_sessions
    }

    pub fn total_sessions(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.total_sessions
    }
}

impl Connector for MemoryStore {
    type Backend = MemoryBackend;

    fn name(&self) -> &str {
        "memory"
    }

    async fn connect(&self) -> Result<MemoryBackend, BackendError> {
        let mut state = self.state.lock()?;
        state.open_sessions += 1;
        state.total_sessions += 1;
        trace!("Memory session opened ({} open)", state.open_sessions);

        Ok(MemoryBackend {
            state: self.state.clone(),
        })
    }
}

/// A session on a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryBackend {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryBackend {
    fn with_bucket<R>(
        &self,
        bucket: &str,
        f: impl FnOnce(&mut Objects) -> Result<R, BackendError>,
    ) -> Result<R, BackendError> {
        let mut state = self.state.lock()?;
        let objects = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| BackendError::bucket_not_found(bucket))?;
        f(objects)
    }
}

impl Backend for MemoryBackend {
    async fn create_bucket(&self, name: &str) -> Result<(), BackendError> {
        validate_name(name)?;
        let mut state = self.state.lock()?;
        if state.buckets.contains_key(name) {
            return Err(BackendError::AlreadyExists {
                kind: ResourceKind::Bucket,
                name: name.to_string(),
            });
        }
        state.buckets.insert(name.to_string(), Objects::new());
        Ok(())
    }

    async fn delete_bucket(&self, name: &str, force: bool) -> Result<(), BackendError> {
        let mut state = self.state.lock()?;
        let objects = state
            .buckets
            .get(name)
            .ok_or_else(|| BackendError::bucket_not_found(name))?;

        if !force && !objects.is_empty() {
            return Err(BackendError::BucketNotEmpty(name.to_string()));
        }
        state.buckets.remove(name);
        Ok(())
    }

    async fn put_object(&self, bucket: &str, key: &str, data: &[u8]) -> Result<(), BackendError> {
        validate_name(key)?;
        self.with_bucket(bucket, |objects| {
            objects.insert(key.to_string(), data.to_vec());
            Ok(())
        })
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        chunk_size: usize,
    ) -> Result<(), BackendError> {
        validate_name(key)?;
        // Parts are assembled outside the lock and only committed once complete.
        self.with_bucket(bucket, |_| Ok(()))?;

        let mut assembled = Vec::with_capacity(data.len());
        for (part, chunk) in data.chunks(chunk_size.max(1)).enumerate() {
            assembled.extend_from_slice(chunk);
            trace!("Uploaded part {} ({} bytes)", part + 1, chunk.len());
        }

        self.with_bucket(bucket, |objects| {
            objects.insert(key.to_string(), assembled);
            Ok(())
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, BackendError> {
        self.with_bucket(bucket, |objects| {
            objects
                .get(key)
                .cloned()
                .ok_or_else(|| BackendError::object_not_found(bucket, key))
        })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), BackendError> {
        self.with_bucket(bucket, |objects| {
            objects
                .remove(key)
                .map(|_| ())
                .ok_or_else(|| BackendError::object_not_found(bucket, key))
        })
    }

    async fn list_buckets(&self) -> Result<Listing, BackendError> {
        let names: Vec<String> = self.state.lock()?.buckets.keys().cloned().collect();
        Ok(stream::iter(names.into_iter().map(Ok)).boxed())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Listing, BackendError> {
        let keys: Vec<String> =
            self.with_bucket(bucket, |objects| Ok(objects.keys().cloned().collect()))?;
        Ok(stream::iter(keys.into_iter().map(Ok)).boxed())
    }

    async fn close(self) -> Result<(), BackendError> {
        let mut state = self.state.lock()?;
        state.open_sessions = state.open_sessions.saturating_sub(1);
        trace!("Memory session closed ({} open)", state.open_sessions);
        Ok(())
    }
}
