#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod backend;
pub mod recorder;
pub mod scenario;
pub mod session;
pub mod suite;

pub use backend::{Backend, Connector, FsConnector, Listing, LocalBackend, MemoryStore};
pub use scenario::{ScenarioRunner, Workload};
pub use session::Session;
pub use suite::BenchmarkSuite;

pub mod prelude {
    pub use crate::backend::{Backend, Connector, FsConnector, MemoryStore};
    pub use crate::scenario::{BulkListing, LargeObject, ScenarioRunner, SizeSweep, Workload};
    pub use crate::session::Session;
    pub use crate::suite::BenchmarkSuite;

    pub use bucketbench_core::{
        BulkListingConfig, LargeObjectConfig, Report, ScenarioConfig, ScenarioError,
        ScenarioResult, SizeSweepConfig, SuiteReport, GIB, KIB, MIB,
    };
}
