use crate::backend::Connector;
use crate::scenario::{BulkListing, LargeObject, ScenarioRunner, SizeSweep};
use bucketbench_core::{
    BulkListingConfig, LargeObjectConfig, ScenarioConfig, ScenarioResult, SizeSweepConfig,
    SuiteReport,
};
#[allow(unused)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Runs a sequence of scenarios against a single backend.
///
/// A failing scenario never stops the suite: every configured scenario is attempted, torn
/// down, and reported in order.
///
/// ```no_run
/// use bucketbench::prelude::*;
///
/// # async fn run() {
/// let report = BenchmarkSuite::new(MemoryStore::new())
///     .large_object(LargeObjectConfig::new(64 * MIB, 8 * MIB))
///     .bulk_listing(BulkListingConfig::default())
///     .run()
///     .await;
///
/// println!("{report}");
/// # }
/// ```
pub struct BenchmarkSuite<C> {
    connector: C,
    scenarios: Vec<ScenarioConfig>,
}

impl<C: Connector> BenchmarkSuite<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            scenarios: vec![],
        }
    }

    pub fn scenario(mut self, config: ScenarioConfig) -> Self {
        self.scenarios.push(config);
        self
    }

    pub fn large_object(self, config: LargeObjectConfig) -> Self {
        self.scenario(ScenarioConfig::LargeObject(config))
    }

    pub fn bulk_listing(self, config: BulkListingConfig) -> Self {
        self.scenario(ScenarioConfig::BulkListing(config))
    }

    pub fn size_sweep(self, config: SizeSweepConfig) -> Self {
        self.scenario(ScenarioConfig::SizeSweep(config))
    }

    #[instrument(name = "suite", skip_all, fields(backend = self.connector.name()))]
    pub async fn run(&self) -> SuiteReport {
        let mut report = SuiteReport::new(self.connector.name());
        if self.scenarios.is_empty() {
            warn!("No scenarios configured");
        }

        for config in &self.scenarios {
            debug!("Starting {}", config.name());
            let result = self.run_scenario(config).await;
            if result.is_success() {
                info!("{} completed successfully", result.name);
            } else {
                warn!("{} completed with errors", result.name);
            }
            report.results.push(result);
        }

        report
    }

    async fn run_scenario(&self, config: &ScenarioConfig) -> ScenarioResult {
        let runner = ScenarioRunner::new(&self.connector);
        match config {
            ScenarioConfig::LargeObject(config) => {
                runner.run(LargeObject::new(config.clone())).await
            }
            ScenarioConfig::BulkListing(config) => {
                runner.run(BulkListing::new(config.clone())).await
            }
            ScenarioConfig::SizeSweep(config) => runner.run(SizeSweep::new(config.clone())).await,
        }
    }
}
