//! Scenario lifecycle
//!
//! A scenario is a [`Workload`] driven by a [`ScenarioRunner`] through
//! `Setup -> Workload -> Verify -> Teardown -> Done`. A failure (or panic) in any of the first
//! three phases jumps straight to `Teardown`, which always runs, and the backend session is
//! released exactly once afterwards. Panics while connecting, tearing down or closing are
//! reported as setup and cleanup errors and never unwind out of the runner.
use crate::backend::{Backend, Connector};
use crate::session::{Closed, Session};
use bucketbench_core::{BackendError, Cleanup, Integrity, ScenarioError, ScenarioResult};
use futures_util::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn, Instrument};

mod bulk_listing;
mod large_object;
mod size_sweep;

pub use bulk_listing::BulkListing;
pub use large_object::LargeObject;
pub use size_sweep::SizeSweep;

/// The phases of a single benchmark scenario.
///
/// Scenarios implement this once against the [`Backend`] contract; which provider they run
/// against is decided by the [`Connector`] handed to the runner.
#[allow(async_fn_in_trait)]
pub trait Workload {
    fn name(&self) -> &str;

    /// Create whatever the workload needs. An error here skips straight to teardown.
    async fn setup<B: Backend>(&mut self, session: &mut Session<B>) -> Result<(), ScenarioError>;

    /// The timed operation loop. Per-operation failures are tolerated through
    /// [`Session::tolerate`]; an error returned here skips straight to teardown.
    async fn run<B: Backend>(&mut self, session: &mut Session<B>) -> Result<(), ScenarioError>;

    /// Compare read-back data against what was written.
    async fn verify<B: Backend>(&mut self, _session: &mut Session<B>) -> Integrity {
        Integrity::NotChecked
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Workload,
    Verify,
    Teardown,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Setup => "Setup",
            Phase::Workload => "Workload",
            Phase::Verify => "Verify",
            Phase::Teardown => "Teardown",
            Phase::Done => "Done",
        };
        write!(f, "{name}")
    }
}

/// Runs workloads against backend sessions obtained from a [`Connector`].
pub struct ScenarioRunner<'a, C> {
    connector: &'a C,
}

impl<'a, C: Connector> ScenarioRunner<'a, C> {
    pub fn new(connector: &'a C) -> Self {
        Self { connector }
    }

    #[instrument(name = "scenario", skip_all, fields(name = workload.name()))]
    pub async fn run<W: Workload>(&self, mut workload: W) -> ScenarioResult {
        let start = Instant::now();
        let mut result = ScenarioResult::new(workload.name());
        info!(
            "Running {} against the {} backend",
            workload.name(),
            self.connector.name()
        );

        let connected = AssertUnwindSafe(self.connector.connect())
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(BackendError::Request(format!(
                    "panicked: {}",
                    panic_message(panic.as_ref())
                )))
            });
        let backend = match connected {
            Ok(backend) => backend,
            Err(err) => {
                // Nothing was acquired, so there is nothing to tear down either.
                error!("Unable to connect to the {} backend: {err}", self.connector.name());
                result.fatal = Some(ScenarioError::setup("Connect", &err));
                result.elapsed = start.elapsed();
                return result;
            }
        };

        let mut session = Session::new(backend);
        let mut teardown_errors = vec![];
        let mut phase = Phase::Setup;

        loop {
            trace!("Entering {phase} phase");
            phase = match phase {
                Phase::Setup => match guarded(phase, workload.setup(&mut session)).await {
                    Ok(()) => Phase::Workload,
                    Err(err) => {
                        error!("{err}");
                        result.fatal = Some(err);
                        Phase::Teardown
                    }
                },
                Phase::Workload => match guarded(phase, workload.run(&mut session)).await {
                    Ok(()) => Phase::Verify,
                    Err(err) => {
                        error!("{err}");
                        result.fatal = Some(err);
                        Phase::Teardown
                    }
                },
                Phase::Verify => {
                    let verify = async { Ok(workload.verify(&mut session).await) };
                    match guarded(phase, verify).await {
                        Ok(integrity) => {
                            if let Integrity::Mismatch { errors } = &integrity {
                                for err in errors {
                                    error!("Data integrity check failed: {err}");
                                }
                            }
                            result.integrity = integrity;
                        }
                        Err(err) => {
                            error!("{err}");
                            result.fatal = Some(err);
                        }
                    }
                    Phase::Teardown
                }
                Phase::Teardown => {
                    teardown_errors = session.teardown().await;
                    Phase::Done
                }
                Phase::Done => break,
            };
        }

        let Closed {
            samples,
            failures,
            closed,
        } = session.close().await;

        if let Err(err) = closed {
            teardown_errors.push(ScenarioError::teardown("backend session", &err));
        }

        result.reports = samples.reports();
        result.failures = failures;
        result.cleanup = Cleanup::from_errors(teardown_errors);
        result.elapsed = start.elapsed();

        info!(
            "Scenario complete in {}",
            humantime::format_duration(round_to_millis(result.elapsed))
        );
        result
    }
}

/// Run one phase, converting a panic into an aborted phase so teardown still happens.
async fn guarded<F, T>(phase: Phase, fut: F) -> Result<T, ScenarioError>
where
    F: Future<Output = Result<T, ScenarioError>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(res) => res,
        Err(panic) => Err(ScenarioError::Aborted {
            phase: phase.to_string(),
            reason: panic_message(panic.as_ref()),
        }),
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn round_to_millis(dur: Duration) -> Duration {
    Duration::from_millis(dur.as_millis() as u64)
}

/// Random payload of `size` bytes.
pub(crate) fn random_payload(size: u64) -> Result<Vec<u8>, ScenarioError> {
    use rand::RngCore;

    let len = usize::try_from(size).map_err(|_| ScenarioError::Setup {
        operation: "Payload Generation".to_string(),
        reason: format!("{size} bytes does not fit in memory on this platform"),
    })?;

    let mut data = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut data);
    Ok(data)
}
