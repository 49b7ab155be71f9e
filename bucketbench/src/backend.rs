//! Storage backend contract
//!
//! Every provider exposes the same operation set through [`Backend`]. A [`Connector`] hands out
//! one live [`Backend`] session per scenario; the session is released with [`Backend::close`].
use bucketbench_core::BackendError;
use futures_util::stream::BoxStream;
use std::future::Future;

mod fs;
mod memory;

pub use fs::{FsBackend, FsConnector};
pub use memory::{MemoryBackend, MemoryStore};

/// A finite, lazy sequence of bucket names or object keys.
///
/// Consumed once per list call; list again to restart.
pub type Listing = BoxStream<'static, Result<String, BackendError>>;

#[trait_variant::make(Backend: Send)]
pub trait LocalBackend {
    async fn create_bucket(&self, name: &str) -> Result<(), BackendError>;

    /// Delete a bucket. With `force` any objects left in it are removed first, otherwise a
    /// non-empty bucket is an error.
    async fn delete_bucket(&self, name: &str, force: bool) -> Result<(), BackendError>;

    async fn put_object(&self, bucket: &str, key: &str, data: &[u8]) -> Result<(), BackendError>;

    /// Chunked transfer of a single object. The object only becomes visible once every chunk
    /// has been transferred; a failed upload leaves nothing behind.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        chunk_size: usize,
    ) -> Result<(), BackendError>;

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, BackendError>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), BackendError>;

    async fn list_buckets(&self) -> Result<Listing, BackendError>;

    async fn list_objects(&self, bucket: &str) -> Result<Listing, BackendError>;

    /// Release the underlying session.
    async fn close(self) -> Result<(), BackendError>;
}

/// Factory for backend sessions, selected by configuration.
pub trait Connector {
    type Backend: Backend;

    /// Provider name used in logs and reports.
    fn name(&self) -> &str;

    fn connect(&self) -> impl Future<Output = Result<Self::Backend, BackendError>> + Send;
}

/// Bucket names and object keys must be usable as a single path component.
pub(crate) fn validate_name(name: &str) -> Result<(), BackendError> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name
            .chars()
            .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_control());

    if invalid {
        Err(BackendError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}
