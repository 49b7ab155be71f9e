pub const KIB: u64 = 1024;
pub const MIB: u64 = 1024 * KIB;
pub const GIB: u64 = 1024 * MIB;

/// Size of the payload used by the large-object lifecycle scenario.
pub const DEFAULT_LARGE_OBJECT_SIZE: u64 = 10 * GIB;

/// Chunk size used when uploading the large object.
pub const DEFAULT_CHUNK_SIZE: u64 = 100 * MIB;

pub const DEFAULT_BUCKET_COUNT: usize = 100;
pub const DEFAULT_OBJECT_COUNT: usize = 1000;
pub const DEFAULT_SMALL_OBJECT_SIZE: u64 = 1;
pub const DEFAULT_LIST_REPETITIONS: usize = 10;

/// Object sizes exercised by the size sweep scenario (1KiB, 1MiB, 10MiB).
pub const DEFAULT_SWEEP_SIZES: [u64; 3] = [KIB, MIB, 10 * MIB];
pub const DEFAULT_SWEEP_COUNT: usize = 50;

/// Quantiles reported for every operation.
pub const REPORTED_QUANTILES: [f64; 3] = [0.90, 0.95, 0.99];
