use super::Workload;
use crate::backend::Backend;
use crate::session::Session;
use bucketbench_core::{BulkListingConfig, ScenarioError};
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

pub const BUCKET_CREATION: &str = "Bucket Creation";
pub const BUCKET_LISTING: &str = "Bucket Listing";
pub const BUCKET_DELETION: &str = "Bucket Deletion";
pub const OBJECT_CREATION: &str = "Object Creation";
pub const OBJECT_LISTING: &str = "Object Listing";
pub const OBJECT_DELETION: &str = "Object Deletion";

/// Create many buckets, list them repeatedly and delete them again; then do the same with many
/// small objects inside a single bucket.
#[derive(Debug)]
pub struct BulkListing {
    config: BulkListingConfig,
    object_bucket: Option<String>,
}

impl BulkListing {
    pub fn new(config: BulkListingConfig) -> Self {
        Self {
            config,
            object_bucket: None,
        }
    }

    async fn buckets<B: Backend>(&self, session: &mut Session<B>) {
        let prefix = session.unique_name("list-test");
        let names: Vec<String> = (0..self.config.bucket_count)
            .map(|i| format!("{prefix}-{i}"))
            .collect();

        info!("Creating {} buckets", names.len());
        for name in &names {
            let res = session.create_bucket(BUCKET_CREATION, name).await;
            session.tolerate(BUCKET_CREATION, res);
        }

        info!("Listing buckets {} times", self.config.list_repetitions);
        for _ in 0..self.config.list_repetitions {
            let res = session.list_buckets(BUCKET_LISTING).await;
            if let Some(count) = session.tolerate(BUCKET_LISTING, res) {
                trace!("Listed {count} buckets");
            }
        }

        info!("Deleting {} buckets", names.len());
        for name in &names {
            let res = session.delete_bucket(BUCKET_DELETION, name).await;
            session.tolerate(BUCKET_DELETION, res);
        }
    }

    async fn objects<B: Backend>(
        &self,
        session: &mut Session<B>,
        bucket: &str,
    ) -> Result<(), ScenarioError> {
        let size = usize::try_from(self.config.object_size).map_err(|_| ScenarioError::Setup {
            operation: "Payload Generation".to_string(),
            reason: format!("{} bytes does not fit in memory", self.config.object_size),
        })?;
        let payload = vec![b'0'; size];
        let keys: Vec<String> = (0..self.config.object_count)
            .map(|i| format!("small-object-{i}"))
            .collect();

        info!("Creating {} objects in {bucket}", keys.len());
        for key in &keys {
            let res = session
                .put_object(OBJECT_CREATION, bucket, key, &payload)
                .await;
            session.tolerate(OBJECT_CREATION, res);
        }

        info!("Listing objects {} times", self.config.list_repetitions);
        for _ in 0..self.config.list_repetitions {
            let res = session.list_objects(OBJECT_LISTING, bucket).await;
            if let Some(count) = session.tolerate(OBJECT_LISTING, res) {
                trace!("Listed {count} objects");
            }
        }

        info!("Deleting {} objects", keys.len());
        for key in &keys {
            let res = session.delete_object(OBJECT_DELETION, bucket, key).await;
            session.tolerate(OBJECT_DELETION, res);
        }

        Ok(())
    }
}

impl Workload for BulkListing {
    fn name(&self) -> &str {
        "bulk-listing"
    }

    async fn setup<B: Backend>(&mut self, session: &mut Session<B>) -> Result<(), ScenarioError> {
        let bucket = session.unique_name("object-list-test");
        session.setup_bucket(&bucket).await?;
        self.object_bucket = Some(bucket);
        Ok(())
    }

    async fn run<B: Backend>(&mut self, session: &mut Session<B>) -> Result<(), ScenarioError> {
        let bucket = self.object_bucket.clone().ok_or_else(|| ScenarioError::Setup {
            operation: "Bucket Creation".to_string(),
            reason: "no object bucket was created".to_string(),
        })?;

        self.buckets(session).await;
        self.objects(session, &bucket).await
    }
}
