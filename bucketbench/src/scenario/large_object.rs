use super::{random_payload, Workload};
use crate::backend::Backend;
use crate::session::Session;
use bucketbench_core::{DataIntegrityError, Integrity, LargeObjectConfig, ScenarioError};
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

pub const UPLOAD: &str = "Large Object Upload (Multipart)";
pub const DOWNLOAD: &str = "Large Object Download";
pub const DELETION: &str = "Large Object Deletion";

const KEY: &str = "large-object";

/// Upload one large random object in chunks, read it back, delete it, then compare what was
/// read against what was written.
#[derive(Debug)]
pub struct LargeObject {
    config: LargeObjectConfig,
    bucket: Option<String>,
    payload: Vec<u8>,
    uploaded: bool,
    downloaded: Option<Vec<u8>>,
}

impl LargeObject {
    pub fn new(config: LargeObjectConfig) -> Self {
        Self {
            config,
            bucket: None,
            payload: vec![],
            uploaded: false,
            downloaded: None,
        }
    }

    fn bucket(&self) -> Result<&str, ScenarioError> {
        self.bucket.as_deref().ok_or_else(|| ScenarioError::Setup {
            operation: "Bucket Creation".to_string(),
            reason: "no bucket was created".to_string(),
        })
    }
}

impl Workload for LargeObject {
    fn name(&self) -> &str {
        "large-object"
    }

    async fn setup<B: Backend>(&mut self, session: &mut Session<B>) -> Result<(), ScenarioError> {
        let bucket = session.unique_name("large-object-test");
        session.setup_bucket(&bucket).await?;
        self.bucket = Some(bucket);

        info!("Generating {} byte payload", self.config.object_size);
        self.payload = random_payload(self.config.object_size)?;
        Ok(())
    }

    async fn run<B: Backend>(&mut self, session: &mut Session<B>) -> Result<(), ScenarioError> {
        let bucket = self.bucket()?.to_string();
        let chunk_size = usize::try_from(self.config.chunk_size).unwrap_or(usize::MAX);

        info!("Uploading large object ({} bytes)", self.payload.len());
        let res = session
            .upload(UPLOAD, &bucket, KEY, &self.payload, chunk_size)
            .await;
        self.uploaded = session.tolerate(UPLOAD, res).is_some();

        info!("Downloading large object");
        let res = session.get_object(DOWNLOAD, &bucket, KEY).await;
        self.downloaded = session.tolerate(DOWNLOAD, res);

        info!("Deleting large object");
        let res = session.delete_object(DELETION, &bucket, KEY).await;
        session.tolerate(DELETION, res);

        Ok(())
    }

    async fn verify<B: Backend>(&mut self, _session: &mut Session<B>) -> Integrity {
        if !self.uploaded {
            return Integrity::NotChecked;
        }

        let payload = std::mem::take(&mut self.payload);
        let result = match self.downloaded.take() {
            Some(downloaded) => DataIntegrityError::check(KEY, &payload, &downloaded),
            None => Err(DataIntegrityError::Missing {
                key: KEY.to_string(),
            }),
        };

        match result {
            Ok(()) => Integrity::Verified { objects: 1 },
            Err(err) => Integrity::Mismatch { errors: vec![err] },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;
    use crate::scenario::ScenarioRunner;

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(10_000)]
    async fn uploads_downloads_and_verifies() {
        let store = MemoryStore::new();
        let config = LargeObjectConfig::new(1_000_000, 64 * 1024);

        let result = ScenarioRunner::new(&store).run(LargeObject::new(config)).await;

        assert!(result.is_success(), "{result}");
        assert_eq!(result.integrity, Integrity::Verified { objects: 1 });
        for op in [UPLOAD, DOWNLOAD, DELETION] {
            let metrics = result.report(op).and_then(|r| r.metrics()).unwrap();
            assert_eq!(metrics.samples, 1);
        }
        let upload = result.report(UPLOAD).and_then(|r| r.metrics()).unwrap();
        assert!(upload.bytes_per_sec.is_some());
        assert!(store.bucket_names().is_empty());
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(10_000)]
    async fn empty_object_is_still_verified() {
        let store = MemoryStore::new();
        let config = LargeObjectConfig::new(0, 1024);

        let result = ScenarioRunner::new(&store).run(LargeObject::new(config)).await;

        assert!(result.is_success());
        let upload = result.report(UPLOAD).and_then(|r| r.metrics()).unwrap();
        assert_eq!(upload.bytes_per_sec, None);
    }
}
