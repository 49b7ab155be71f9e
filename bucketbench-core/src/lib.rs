#![cfg_attr(docsrs, feature(doc_cfg))]
//! Core data types for `bucketbench`.
//!
//! Everything in this crate is synchronous and free of I/O: latency samples, the statistics
//! calculated from them, scenario configuration and the error taxonomy shared by the harness
//! and the backends it drives.
mod config;
mod constants;
mod data;
mod error;
mod metrics;
mod stats;

pub use config::*;
pub use constants::*;
pub use data::*;
pub use error::*;
pub use metrics::*;
pub use stats::*;
