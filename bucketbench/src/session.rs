use crate::backend::Backend;
use crate::recorder::LatencyRecorder;
use crate::scenario::panic_message;
use bucketbench_core::{BackendError, SampleSet, ScenarioError};
use futures_util::{FutureExt, TryStreamExt};
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::panic::AssertUnwindSafe;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Per-scenario context: owns the backend session, the latency recorder and a ledger of every
/// bucket and object created through it.
///
/// All timed operations go through the session so that whatever is still in the ledger when
/// the scenario ends can be torn down.
pub struct Session<B> {
    backend: B,
    recorder: LatencyRecorder,
    ledger: Ledger,
    failures: Vec<ScenarioError>,
    run_id: String,
}

#[derive(Debug, Default)]
struct Ledger {
    buckets: BTreeSet<String>,
    objects: BTreeSet<(String, String)>,
}

impl<B: Backend> Session<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            recorder: LatencyRecorder::new(),
            ledger: Ledger::default(),
            failures: vec![],
            run_id: uuid::Uuid::new_v4().simple().to_string(),
        }
    }

    /// A name unique to this session.
    pub fn unique_name(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.run_id)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn samples(&self) -> &SampleSet {
        self.recorder.samples()
    }

    pub fn failures(&self) -> &[ScenarioError] {
        &self.failures
    }

    pub fn owned_buckets(&self) -> impl Iterator<Item = &str> {
        self.ledger.buckets.iter().map(String::as_str)
    }

    pub fn owned_objects(&self) -> impl Iterator<Item = (&str, &str)> {
        self.ledger
            .objects
            .iter()
            .map(|(bucket, key)| (bucket.as_str(), key.as_str()))
    }

    /// Untimed bucket creation for scenario setup. Failure is scenario-fatal.
    pub async fn setup_bucket(&mut self, name: &str) -> Result<(), ScenarioError> {
        debug!("Creating bucket: {name}");
        self.backend
            .create_bucket(name)
            .await
            .map_err(|err| ScenarioError::setup("Bucket Creation", &err))?;
        self.ledger.buckets.insert(name.to_string());
        Ok(())
    }

    pub async fn create_bucket(&mut self, operation: &str, name: &str) -> Result<(), BackendError> {
        let backend = &self.backend;
        self.recorder
            .record(operation, 0, backend.create_bucket(name))
            .await?;
        self.ledger.buckets.insert(name.to_string());
        Ok(())
    }

    pub async fn delete_bucket(&mut self, operation: &str, name: &str) -> Result<(), BackendError> {
        let backend = &self.backend;
        let res = self
            .recorder
            .record(operation, 0, backend.delete_bucket(name, false))
            .await;
        if res.is_ok() || res.as_ref().is_err_and(BackendError::is_not_found) {
            self.ledger.buckets.remove(name);
        }
        res
    }

    pub async fn put_object(
        &mut self,
        operation: &str,
        bucket: &str,
        key: &str,
        data: &[u8],
    ) -> Result<(), BackendError> {
        let backend = &self.backend;
        self.recorder
            .record(
                operation,
                data.len() as u64,
                backend.put_object(bucket, key, data),
            )
            .await?;
        self.ledger
            .objects
            .insert((bucket.to_string(), key.to_string()));
        Ok(())
    }

    /// Chunked upload, recorded as a single sample for the whole transfer.
    pub async fn upload(
        &mut self,
        operation: &str,
        bucket: &str,
        key: &str,
        data: &[u8],
        chunk_size: usize,
    ) -> Result<(), BackendError> {
        let backend = &self.backend;
        self.recorder
            .record(
                operation,
                data.len() as u64,
                backend.upload(bucket, key, data, chunk_size),
            )
            .await?;
        self.ledger
            .objects
            .insert((bucket.to_string(), key.to_string()));
        Ok(())
    }

    pub async fn get_object(
        &mut self,
        operation: &str,
        bucket: &str,
        key: &str,
    ) -> Result<Vec<u8>, BackendError> {
        let backend = &self.backend;
        self.recorder
            .record_sized(operation, backend.get_object(bucket, key), |data| {
                data.len() as u64
            })
            .await
    }

    pub async fn delete_object(
        &mut self,
        operation: &str,
        bucket: &str,
        key: &str,
    ) -> Result<(), BackendError> {
        let backend = &self.backend;
        let res = self
            .recorder
            .record(operation, 0, backend.delete_object(bucket, key))
            .await;
        if res.is_ok() || res.as_ref().is_err_and(BackendError::is_not_found) {
            self.ledger
                .objects
                .remove(&(bucket.to_string(), key.to_string()));
        }
        res
    }

    /// List every bucket, draining the listing inside the timed call. Returns the count seen.
    pub async fn list_buckets(&mut self, operation: &str) -> Result<usize, BackendError> {
        let backend = &self.backend;
        self.recorder
            .record(operation, 0, async move {
                let listing = backend.list_buckets().await?;
                listing.try_fold(0, |n, _| async move { Ok(n + 1) }).await
            })
            .await
    }

    pub async fn list_objects(&mut self, operation: &str, bucket: &str) -> Result<usize, BackendError> {
        let backend = &self.backend;
        self.recorder
            .record(operation, 0, async move {
                let listing = backend.list_objects(bucket).await?;
                listing.try_fold(0, |n, _| async move { Ok(n + 1) }).await
            })
            .await
    }

    /// Convert a failed workload operation into the error taxonomy and keep going.
    pub fn tolerate<T>(&mut self, operation: &str, res: Result<T, BackendError>) -> Option<T> {
        match res {
            Ok(value) => Some(value),
            Err(err) => {
                let failure = ScenarioError::from_backend(operation, &err);
                match &failure {
                    ScenarioError::NotFound { .. } => warn!("{failure}"),
                    _ => error!("{failure}"),
                }
                self.failures.push(failure);
                None
            }
        }
    }

    /// Delete everything still in the ledger: objects first, then buckets (forcefully). Missing
    /// resources are not an error. Returns the failures that may have left resources behind.
    ///
    /// A backend call that panics counts as a failed deletion; the rest of the ledger is still
    /// attempted.
    pub async fn teardown(&mut self) -> Vec<ScenarioError> {
        let mut object_errors: BTreeMap<String, Vec<ScenarioError>> = BTreeMap::new();
        for (bucket, key) in std::mem::take(&mut self.ledger.objects) {
            match contained(self.backend.delete_object(&bucket, &key)).await {
                Ok(()) => trace!("Removed {bucket}/{key}"),
                Err(err) if err.is_not_found() => debug!("{bucket}/{key} already gone"),
                Err(err) => {
                    warn!("Unable to remove {bucket}/{key}: {err}");
                    let failure = ScenarioError::teardown(&format!("object {bucket}/{key}"), &err);
                    object_errors.entry(bucket).or_default().push(failure);
                }
            }
        }

        let mut errors = vec![];
        for bucket in std::mem::take(&mut self.ledger.buckets) {
            info!("Cleaning up bucket: {bucket}");
            match contained(self.backend.delete_bucket(&bucket, true)).await {
                Ok(()) => {
                    // Forced deletion also took care of any objects that failed above.
                    object_errors.remove(&bucket);
                }
                Err(err) if err.is_not_found() => {
                    debug!("Bucket {bucket} already gone");
                    object_errors.remove(&bucket);
                }
                Err(err) => {
                    error!("Failed to delete bucket {bucket}: {err}");
                    errors.push(ScenarioError::teardown(&format!("bucket {bucket}"), &err));
                }
            }
        }

        errors.extend(object_errors.into_values().flatten());
        errors
    }

    /// Release the backend session. Must be called exactly once, after [`Session::teardown`].
    /// The samples and failures are handed back even when closing fails or panics.
    pub async fn close(self) -> Closed {
        if !self.ledger.buckets.is_empty() || !self.ledger.objects.is_empty() {
            warn!("Closing session with resources still in the ledger");
        }

        let closed = contained(self.backend.close()).await;
        if let Err(err) = &closed {
            error!("Failed to close backend session: {err}");
        }

        Closed {
            samples: self.recorder.into_samples(),
            failures: self.failures,
            closed,
        }
    }
}

/// Await a cleanup call, turning a panic inside the backend into an error.
async fn contained<T, F>(fut: F) -> Result<T, BackendError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    AssertUnwindSafe(fut).catch_unwind().await.unwrap_or_else(|panic| {
        Err(BackendError::Request(format!(
            "panicked: {}",
            panic_message(panic.as_ref())
        )))
    })
}

/// What is left of a [`Session`] once its backend has been released.
pub struct Closed {
    pub samples: SampleSet,
    pub failures: Vec<ScenarioError>,
    pub closed: Result<(), BackendError>,
}
