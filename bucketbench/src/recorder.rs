use bucketbench_core::{BackendError, LatencySample, SampleSet};
use std::future::Future;
#[cfg(feature = "metrics")]
use std::sync::Once;
use std::time::Instant;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Wraps single backend calls and records how long they took.
///
/// Successful calls append a [`LatencySample`] under the operation name. Failed calls are
/// handed back to the caller untouched and leave no sample; the operation is still registered
/// so its report shows up as "no data".
#[derive(Debug, Default)]
pub struct LatencyRecorder {
    samples: SampleSet,
}

#[cfg(feature = "metrics")]
static DESCRIBE_METRICS: Once = Once::new();

#[cfg(feature = "metrics")]
fn describe_metrics() {
    DESCRIBE_METRICS.call_once(|| {
        metrics::describe_histogram!(
            "bucketbench_latency",
            metrics::Unit::Seconds,
            "Latency of backend operations"
        );
        metrics::describe_counter!("bucketbench_success", "Successful backend operations");
        metrics::describe_counter!("bucketbench_error", "Failed backend operations");
    });
}

impl LatencyRecorder {
    pub fn new() -> Self {
        #[cfg(feature = "metrics")]
        describe_metrics();

        Self::default()
    }

    /// Time `fut`, recording `bytes` as the payload size on success.
    pub async fn record<F, R>(&mut self, operation: &str, bytes: u64, fut: F) -> Result<R, BackendError>
    where
        F: Future<Output = Result<R, BackendError>>,
    {
        self.record_sized(operation, fut, |_| bytes).await
    }

    /// Time `fut`, deriving the payload size from the successful result.
    pub async fn record_sized<F, R, S>(
        &mut self,
        operation: &str,
        fut: F,
        size: S,
    ) -> Result<R, BackendError>
    where
        F: Future<Output = Result<R, BackendError>>,
        S: FnOnce(&R) -> u64,
    {
        self.samples.register(operation);

        let start = Instant::now();
        let res = fut.await;
        let elapsed = start.elapsed();

        #[cfg(feature = "metrics")]
        metrics::histogram!("bucketbench_latency", "operation" => operation.to_string())
            .record(elapsed.as_secs_f64());

        match res {
            Ok(value) => {
                let bytes = size(&value);
                trace!("{operation} took {elapsed:?} ({bytes} bytes)");
                self.samples
                    .push(operation, LatencySample::new(elapsed, bytes));

                #[cfg(feature = "metrics")]
                metrics::counter!("bucketbench_success", "operation" => operation.to_string())
                    .increment(1);

                Ok(value)
            }
            Err(err) => {
                trace!("{operation} failed after {elapsed:?}: {err}");

                #[cfg(feature = "metrics")]
                metrics::counter!("bucketbench_error", "operation" => operation.to_string())
                    .increment(1);

                Err(err)
            }
        }
    }

    pub fn samples(&self) -> &SampleSet {
        &self.samples
    }

    pub fn into_samples(self) -> SampleSet {
        self.samples
    }
}
