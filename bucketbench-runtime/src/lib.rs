//! Command line front-end for `bucketbench`.
pub mod runtime;

mod cli;
mod error;

pub use crate::cli::{parse_size, BackendKind, ScenarioKind};
pub use crate::error::RuntimeError;
pub use crate::runtime::BenchRuntime;
