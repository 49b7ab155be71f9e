use crate::{
    DEFAULT_BUCKET_COUNT, DEFAULT_CHUNK_SIZE, DEFAULT_LARGE_OBJECT_SIZE, DEFAULT_LIST_REPETITIONS,
    DEFAULT_OBJECT_COUNT, DEFAULT_SMALL_OBJECT_SIZE, DEFAULT_SWEEP_COUNT, DEFAULT_SWEEP_SIZES,
};
#[cfg(feature = "rt")]
use serde::{Deserialize, Serialize};

/// Configuration for the large-object lifecycle scenario.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "rt", derive(Serialize, Deserialize))]
pub struct LargeObjectConfig {
    /// Size of the single random payload in bytes.
    pub object_size: u64,
    /// Size of each part of the chunked upload in bytes.
    pub chunk_size: u64,
}

impl Default for LargeObjectConfig {
    fn default() -> Self {
        Self {
            object_size: DEFAULT_LARGE_OBJECT_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl LargeObjectConfig {
    pub fn new(object_size: u64, chunk_size: u64) -> Self {
        Self {
            object_size,
            chunk_size,
        }
    }
}

/// Configuration for the bulk bucket/object listing scenario.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "rt", derive(Serialize, Deserialize))]
pub struct BulkListingConfig {
    pub bucket_count: usize,
    pub object_count: usize,
    pub object_size: u64,
    /// How many times each listing operation is repeated.
    pub list_repetitions: usize,
}

impl Default for BulkListingConfig {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
            object_count: DEFAULT_OBJECT_COUNT,
            object_size: DEFAULT_SMALL_OBJECT_SIZE,
            list_repetitions: DEFAULT_LIST_REPETITIONS,
        }
    }
}

/// Configuration for the object size sweep scenario.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "rt", derive(Serialize, Deserialize))]
pub struct SizeSweepConfig {
    pub sizes: Vec<u64>,
    /// Objects written, read and deleted per size.
    pub objects_per_size: usize,
}

impl Default for SizeSweepConfig {
    fn default() -> Self {
        Self {
            sizes: DEFAULT_SWEEP_SIZES.to_vec(),
            objects_per_size: DEFAULT_SWEEP_COUNT,
        }
    }
}

/// A single scenario to run as part of a suite.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "rt", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "rt", serde(tag = "kind", rename_all = "snake_case"))]
pub enum ScenarioConfig {
    LargeObject(LargeObjectConfig),
    BulkListing(BulkListingConfig),
    SizeSweep(SizeSweepConfig),
}

impl ScenarioConfig {
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioConfig::LargeObject(_) => "large-object",
            ScenarioConfig::BulkListing(_) => "bulk-listing",
            ScenarioConfig::SizeSweep(_) => "size-sweep",
        }
    }
}
