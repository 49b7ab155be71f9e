use super::{validate_name, Backend, Connector, Listing};
use bucketbench_core::{BackendError, ResourceKind};
use futures_util::{stream, StreamExt};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Object store on the local filesystem. Buckets are directories directly below `root` and
/// objects are files inside them.
#[derive(Debug, Clone)]
pub struct FsConnector {
    root: PathBuf,
}

impl FsConnector {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Connector for FsConnector {
    type Backend = FsBackend;

    fn name(&self) -> &str {
        "filesystem"
    }

    async fn connect(&self) -> Result<FsBackend, BackendError> {
        fs::create_dir_all(&self.root).await?;
        debug!("Filesystem session opened at {}", self.root.display());
        Ok(FsBackend {
            root: self.root.clone(),
        })
    }
}

#[derive(Debug)]
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    fn bucket_path(&self, bucket: &str) -> Result<PathBuf, BackendError> {
        validate_name(bucket)?;
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, BackendError> {
        validate_name(key)?;
        Ok(self.bucket_path(bucket)?.join(key))
    }

    /// In-flight writes are staged under a hidden name and renamed into place when complete.
    fn staging_path(&self, bucket: &str) -> Result<PathBuf, BackendError> {
        let name = format!(".upload-{}", uuid::Uuid::new_v4().simple());
        Ok(self.bucket_path(bucket)?.join(name))
    }

    async fn ensure_bucket(&self, bucket: &str) -> Result<PathBuf, BackendError> {
        let path = self.bucket_path(bucket)?;
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => Ok(path),
            Ok(_) => Err(BackendError::bucket_not_found(bucket)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(BackendError::bucket_not_found(bucket))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn commit(&self, staging: &Path, target: &Path) -> Result<(), BackendError> {
        if let Err(err) = fs::rename(staging, target).await {
            discard(staging).await;
            return Err(err.into());
        }
        Ok(())
    }
}

impl Backend for FsBackend {
    async fn create_bucket(&self, name: &str) -> Result<(), BackendError> {
        let path = self.bucket_path(name)?;
        fs::create_dir(&path).await.map_err(|err| match err.kind() {
            ErrorKind::AlreadyExists => BackendError::AlreadyExists {
                kind: ResourceKind::Bucket,
                name: name.to_string(),
            },
            _ => err.into(),
        })
    }

    async fn delete_bucket(&self, name: &str, force: bool) -> Result<(), BackendError> {
        let path = self.ensure_bucket(name).await?;
        if force {
            fs::remove_dir_all(&path).await?;
            return Ok(());
        }

        let mut entries = fs::read_dir(&path).await?;
        if entries.next_entry().await?.is_some() {
            return Err(BackendError::BucketNotEmpty(name.to_string()));
        }
        fs::remove_dir(&path).await?;
        Ok(())
    }

    async fn put_object(&self, bucket: &str, key: &str, data: &[u8]) -> Result<(), BackendError> {
        let target = self.object_path(bucket, key)?;
        self.ensure_bucket(bucket).await?;

        let staging = self.staging_path(bucket)?;
        if let Err(err) = fs::write(&staging, data).await {
            discard(&staging).await;
            return Err(err.into());
        }
        self.commit(&staging, &target).await
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        chunk_size: usize,
    ) -> Result<(), BackendError> {
        let target = self.object_path(bucket, key)?;
        self.ensure_bucket(bucket).await?;

        let staging = self.staging_path(bucket)?;
        if let Err(err) = write_chunks(&staging, data, chunk_size.max(1)).await {
            // Abort: nothing of a partial upload may stay behind.
            discard(&staging).await;
            return Err(err);
        }
        self.commit(&staging, &target).await
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, BackendError> {
        let path = self.object_path(bucket, key)?;
        fs::read(&path).await.map_err(|err| match err.kind() {
            ErrorKind::NotFound => BackendError::object_not_found(bucket, key),
            _ => err.into(),
        })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), BackendError> {
        let path = self.object_path(bucket, key)?;
        fs::remove_file(&path).await.map_err(|err| match err.kind() {
            ErrorKind::NotFound => BackendError::object_not_found(bucket, key),
            _ => err.into(),
        })
    }

    async fn list_buckets(&self) -> Result<Listing, BackendError> {
        let entries = fs::read_dir(&self.root).await?;
        Ok(entry_names(entries, true))
    }

    async fn list_objects(&self, bucket: &str) -> Result<Listing, BackendError> {
        let path = self.ensure_bucket(bucket).await?;
        let entries = fs::read_dir(&path).await?;
        Ok(entry_names(entries, false))
    }

    async fn close(self) -> Result<(), BackendError> {
        debug!("Filesystem session at {} closed", self.root.display());
        Ok(())
    }
}

async fn write_chunks(path: &Path, data: &[u8], chunk_size: usize) -> Result<(), BackendError> {
    let mut file = fs::File::create(path).await?;
    for (part, chunk) in data.chunks(chunk_size).enumerate() {
        file.write_all(chunk).await?;
        trace!("Uploaded part {} ({} bytes)", part + 1, chunk.len());
    }
    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}

async fn discard(path: &Path) {
    if let Err(err) = fs::remove_file(path).await {
        if err.kind() != ErrorKind::NotFound {
            warn!("Unable to remove staging file {}: {err}", path.display());
        }
    }
}

/// Lazily stream the visible entry names of a directory, keeping only directories (buckets)
/// or only files (objects). Hidden entries are staging files and never listed.
fn entry_names(entries: fs::ReadDir, dirs: bool) -> Listing {
    stream::unfold(Some(entries), move |entries| async move {
        let mut entries = entries?;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => return None,
                Err(err) => return Some((Err(err.into()), None)),
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }

            match entry.file_type().await {
                Ok(kind) if kind.is_dir() == dirs => return Some((Ok(name), Some(entries))),
                Ok(_) => continue,
                Err(err) => return Some((Err(err.into()), None)),
            }
        }
    })
    .boxed()
}
