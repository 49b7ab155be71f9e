use super::{random_payload, Workload};
use crate::backend::Backend;
use crate::session::Session;
use bucketbench_core::{DataIntegrityError, Integrity, ScenarioError, SizeSweepConfig};
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

pub fn write_operation(size: u64) -> String {
    format!("Write (Size: {size} bytes)")
}

pub fn read_operation(size: u64) -> String {
    format!("Read (Size: {size} bytes)")
}

pub fn delete_operation(size: u64) -> String {
    format!("Delete (Size: {size} bytes)")
}

/// For each configured size: write a batch of objects, read each back, then delete them.
/// Every read is compared against the written payload.
#[derive(Debug)]
pub struct SizeSweep {
    config: SizeSweepConfig,
    bucket: Option<String>,
    checked: usize,
    mismatches: Vec<DataIntegrityError>,
}

impl SizeSweep {
    pub fn new(config: SizeSweepConfig) -> Self {
        Self {
            config,
            bucket: None,
            checked: 0,
            mismatches: vec![],
        }
    }

    async fn sweep<B: Backend>(
        &mut self,
        session: &mut Session<B>,
        bucket: &str,
        size: u64,
    ) -> Result<(), ScenarioError> {
        let payload = random_payload(size)?;
        let keys: Vec<String> = (0..self.config.objects_per_size)
            .map(|i| format!("key_{i}_size_{size}"))
            .collect();

        let write = write_operation(size);
        let read = read_operation(size);
        let delete = delete_operation(size);

        info!("Writing {} objects of {size} bytes", keys.len());
        let mut written = vec![];
        for key in &keys {
            let res = session.put_object(&write, bucket, key, &payload).await;
            if session.tolerate(&write, res).is_some() {
                written.push(key);
            }
        }

        info!("Reading {} objects of {size} bytes", written.len());
        for key in &written {
            let res = session.get_object(&read, bucket, key).await;
            self.checked += 1;
            let check = match session.tolerate(&read, res) {
                Some(data) => DataIntegrityError::check(key, &payload, &data),
                None => Err(DataIntegrityError::Missing {
                    key: key.to_string(),
                }),
            };
            if let Err(err) = check {
                self.mismatches.push(err);
            }
        }

        info!("Deleting {} objects of {size} bytes", keys.len());
        for key in &keys {
            let res = session.delete_object(&delete, bucket, key).await;
            session.tolerate(&delete, res);
        }

        Ok(())
    }
}

impl Workload for SizeSweep {
    fn name(&self) -> &str {
        "size-sweep"
    }

    async fn setup<B: Backend>(&mut self, session: &mut Session<B>) -> Result<(), ScenarioError> {
        let bucket = session.unique_name("size-sweep-test");
        session.setup_bucket(&bucket).await?;
        self.bucket = Some(bucket);
        Ok(())
    }

    async fn run<B: Backend>(&mut self, session: &mut Session<B>) -> Result<(), ScenarioError> {
        let bucket = self.bucket.clone().ok_or_else(|| ScenarioError::Setup {
            operation: "Bucket Creation".to_string(),
            reason: "no bucket was created".to_string(),
        })?;

        for size in self.config.sizes.clone() {
            self.sweep(session, &bucket, size).await?;
        }
        Ok(())
    }

    async fn verify<B: Backend>(&mut self, _session: &mut Session<B>) -> Integrity {
        if self.checked == 0 {
            return Integrity::NotChecked;
        }
        Integrity::from_errors(self.checked, std::mem::take(&mut self.mismatches))
    }
}
