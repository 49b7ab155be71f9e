//! Default bucketbench runtime
//!
//! Builds a [`BenchmarkSuite`] from command line arguments, runs it against the selected
//! backend, prints the report and optionally stores it as JSON.
use crate::cli::{BackendKind, BenchCli, ScenarioKind};
use crate::error::RuntimeError;
use bucketbench::{BenchmarkSuite, Connector, FsConnector, MemoryStore};
use bucketbench_core::{
    BulkListingConfig, LargeObjectConfig, ScenarioConfig, SizeSweepConfig, SuiteReport, GIB,
};
use clap::Parser;
use std::path::{Path, PathBuf};
#[allow(unused)]
use tracing::{debug, error, info, instrument, warn};

/// Large objects above this size get a RAM warning when run on the memory backend.
pub const MEMORY_WARNING_SIZE: u64 = 2 * GIB;

/// Copies of the large object alive at once on the memory backend.
const MEMORY_COPIES: u64 = 3;

/// Default bucketbench runtime. (requires `rt` feature)
///
/// # Example
///
/// ```no_run
/// use bucketbench_runtime::BenchRuntime;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let report = BenchRuntime::new()
///         .with_args()
///         .run()
///         .await
///         .unwrap();
///     assert!(report.is_success());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BenchRuntime {
    backend: BackendKind,
    root: Option<PathBuf>,
    scenarios: Vec<ScenarioConfig>,
    json: Option<PathBuf>,
    quiet: bool,
}

impl Default for BenchRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchRuntime {
    /// Memory backend running the large-object and bulk-listing scenarios with reference sizes.
    pub fn new() -> Self {
        BenchRuntime {
            backend: BackendKind::Memory,
            root: None,
            scenarios: vec![
                ScenarioConfig::LargeObject(LargeObjectConfig::default()),
                ScenarioConfig::BulkListing(BulkListingConfig::default()),
            ],
            json: None,
            quiet: false,
        }
    }

    /// Use the default CLI arguments.
    ///
    /// `-b`, `--backend` to choose `memory` or `fs` (with `--root <dir>`)
    ///
    /// `-s`, `--scenario` (repeatable) to choose `large-object`, `bulk-listing`, `size-sweep`
    ///
    /// `--json <path>` to also write the results file.
    ///
    /// # Example
    /// ```ignore
    /// $ ./bucketbench --backend fs --root /mnt/bench -s large-object --object-size 1GiB
    /// $ ./bucketbench -s bulk-listing --buckets 10 --objects 100 --json results.json
    /// ```
    pub fn with_args(self) -> Self {
        self.with_cli(BenchCli::parse())
    }

    pub(crate) fn with_cli(mut self, cli: BenchCli) -> Self {
        self.backend = cli.backend;
        self.root = cli.root;
        self.json = cli.json;

        let kinds = if cli.scenarios.is_empty() {
            vec![ScenarioKind::LargeObject, ScenarioKind::BulkListing]
        } else {
            cli.scenarios
        };

        self.scenarios = kinds
            .into_iter()
            .map(|kind| match kind {
                ScenarioKind::LargeObject => {
                    ScenarioConfig::LargeObject(LargeObjectConfig::new(cli.object_size, cli.chunk_size))
                }
                ScenarioKind::BulkListing => ScenarioConfig::BulkListing(BulkListingConfig {
                    bucket_count: cli.buckets,
                    object_count: cli.objects,
                    object_size: cli.small_object_size,
                    list_repetitions: cli.list_repetitions,
                }),
                ScenarioKind::SizeSweep => {
                    let mut config = SizeSweepConfig {
                        objects_per_size: cli.sweep_count,
                        ..Default::default()
                    };
                    if !cli.sweep_sizes.is_empty() {
                        config.sizes = cli.sweep_sizes.clone();
                    }
                    ScenarioConfig::SizeSweep(config)
                }
            })
            .collect();
        self
    }

    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn scenarios(mut self, scenarios: &[ScenarioConfig]) -> Self {
        self.scenarios = scenarios.to_vec();
        self
    }

    pub fn json(mut self, path: impl Into<PathBuf>) -> Self {
        self.json = Some(path.into());
        self
    }

    /// Do not print the report to stdout.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    #[instrument(name = "bucketbench", skip_all, fields(backend = ?self.backend))]
    pub async fn run(self) -> Result<SuiteReport, RuntimeError> {
        self.validate()?;
        self.check_memory();

        let report = match self.backend {
            BackendKind::Memory => run_suite(MemoryStore::new(), &self.scenarios).await,
            BackendKind::Fs => {
                let root = self
                    .root
                    .clone()
                    .unwrap_or_else(|| std::env::temp_dir().join("bucketbench"));
                info!("Using filesystem backend at {}", root.display());
                run_suite(FsConnector::new(root), &self.scenarios).await
            }
        };

        if !self.quiet {
            println!("{report}");
        }

        if let Some(path) = &self.json {
            write_json(path, &report).await?;
            info!("Results written to {}", path.display());
        }

        Ok(report)
    }

    fn validate(&self) -> Result<(), RuntimeError> {
        for scenario in &self.scenarios {
            match scenario {
                ScenarioConfig::LargeObject(config) if config.chunk_size == 0 => {
                    return Err(RuntimeError::InvalidArgument(
                        "chunk size must be greater than zero".to_string(),
                    ));
                }
                ScenarioConfig::SizeSweep(config) if config.sizes.is_empty() => {
                    return Err(RuntimeError::InvalidArgument(
                        "size sweep needs at least one object size".to_string(),
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Estimated peak RAM of the large-object scenario on the memory backend, when it exceeds
    /// [`MEMORY_WARNING_SIZE`] per copy. Logged as a warning.
    fn check_memory(&self) -> Option<u64> {
        if self.backend != BackendKind::Memory {
            return None;
        }

        let largest = self
            .scenarios
            .iter()
            .filter_map(|scenario| match scenario {
                ScenarioConfig::LargeObject(config) => Some(config.object_size),
                _ => None,
            })
            .max()
            .filter(|size| *size > MEMORY_WARNING_SIZE)?;

        let footprint = largest.saturating_mul(MEMORY_COPIES);
        warn!(
            "The memory backend keeps the large object in RAM: about {:.1} GiB needed. \
             Use --object-size or the fs backend on smaller machines",
            footprint as f64 / GIB as f64
        );
        Some(footprint)
    }
}

async fn run_suite<C: Connector>(connector: C, scenarios: &[ScenarioConfig]) -> SuiteReport {
    scenarios
        .iter()
        .cloned()
        .fold(BenchmarkSuite::new(connector), BenchmarkSuite::scenario)
        .run()
        .await
}

async fn write_json(path: &Path, report: &SuiteReport) -> Result<(), RuntimeError> {
    let encoded = serde_json::to_vec_pretty(report)?;
    tokio::fs::write(path, encoded).await?;
    Ok(())
}
