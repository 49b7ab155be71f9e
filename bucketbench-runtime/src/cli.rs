use bucketbench_core::{
    DEFAULT_BUCKET_COUNT, DEFAULT_CHUNK_SIZE, DEFAULT_LARGE_OBJECT_SIZE, DEFAULT_LIST_REPETITIONS,
    DEFAULT_OBJECT_COUNT, DEFAULT_SMALL_OBJECT_SIZE, DEFAULT_SWEEP_COUNT, GIB, KIB, MIB,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// In-process store, discarded on exit. Every object is held in RAM
    Memory,
    /// Directories and files below `--root`
    Fs,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScenarioKind {
    LargeObject,
    BulkListing,
    SizeSweep,
}

#[derive(Parser, Debug)]
#[command(name = "bucketbench", version, about = "Object-storage latency and throughput benchmarks")]
pub(crate) struct BenchCli {
    #[arg(short, long, value_enum, default_value_t = BackendKind::Memory)]
    pub backend: BackendKind,

    /// Storage location for the filesystem backend
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Scenarios to run, in order (default: large-object then bulk-listing)
    #[arg(short, long = "scenario", value_enum)]
    pub scenarios: Vec<ScenarioKind>,

    /// Size of the large object, e.g. `10GiB`. The memory backend needs about three times
    /// this much RAM (payload, stored copy and downloaded copy)
    #[arg(long, value_parser = parse_size, default_value_t = DEFAULT_LARGE_OBJECT_SIZE)]
    pub object_size: u64,

    /// Part size for the chunked upload, e.g. `100MiB`
    #[arg(long, value_parser = parse_size, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: u64,

    #[arg(long, default_value_t = DEFAULT_BUCKET_COUNT)]
    pub buckets: usize,

    #[arg(long, default_value_t = DEFAULT_OBJECT_COUNT)]
    pub objects: usize,

    /// Size of each object in the bulk listing scenario
    #[arg(long, value_parser = parse_size, default_value_t = DEFAULT_SMALL_OBJECT_SIZE)]
    pub small_object_size: u64,

    #[arg(long, default_value_t = DEFAULT_LIST_REPETITIONS)]
    pub list_repetitions: usize,

    /// Object sizes for the size sweep, comma separated
    #[arg(long, value_parser = parse_size, value_delimiter = ',')]
    pub sweep_sizes: Vec<u64>,

    #[arg(long, default_value_t = DEFAULT_SWEEP_COUNT)]
    pub sweep_count: usize,

    /// Also write the results as JSON to this path
    #[arg(long)]
    pub json: Option<PathBuf>,
}

/// Parse a byte count with an optional binary suffix: `512`, `64KiB`, `100MiB`, `10GiB`.
///
/// `K`/`M`/`G` and `KB`/`MB`/`GB` are accepted as aliases of the binary units.
pub fn parse_size(input: &str) -> Result<u64, String> {
    let input = input.trim();
    let split = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (digits, unit) = input.split_at(split);

    let value: u64 = digits
        .parse()
        .map_err(|_| format!("{input:?} does not start with a number"))?;

    let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => KIB,
        "m" | "mb" | "mib" => MIB,
        "g" | "gb" | "gib" => GIB,
        other => return Err(format!("unknown size unit {other:?}")),
    };

    value
        .checked_mul(multiplier)
        .ok_or_else(|| format!("{input:?} is too large"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_size("1"), Ok(1));
        assert_eq!(parse_size("1KiB"), Ok(1024));
        assert_eq!(parse_size("100MiB"), Ok(100 * MIB));
        assert_eq!(parse_size("10GiB"), Ok(10 * GIB));
        assert_eq!(parse_size("10 gb"), Ok(10 * GIB));
        assert_eq!(parse_size("4k"), Ok(4 * KIB));
        assert!(parse_size("MiB").is_err());
        assert!(parse_size("10TiB").is_err());
        assert!(parse_size("99999999999999999999GiB").is_err());
    }

    #[test]
    fn defaults_match_reference_workload() {
        let cli = BenchCli::parse_from(["bucketbench"]);
        assert_eq!(cli.backend, BackendKind::Memory);
        assert_eq!(cli.object_size, 10 * GIB);
        assert_eq!(cli.chunk_size, 100 * MIB);
        assert_eq!(cli.buckets, 100);
        assert_eq!(cli.objects, 1000);
        assert_eq!(cli.list_repetitions, 10);
        assert!(cli.scenarios.is_empty());
        assert!(cli.json.is_none());
    }

    #[test]
    fn parses_repeated_scenarios_and_sizes() {
        let cli = BenchCli::parse_from([
            "bucketbench",
            "--backend",
            "fs",
            "--root",
            "/tmp/bench",
            "-s",
            "bulk-listing",
            "--scenario",
            "size-sweep",
            "--sweep-sizes",
            "1KiB,1MiB",
            "--object-size",
            "64MiB",
        ]);
        assert_eq!(cli.backend, BackendKind::Fs);
        assert_eq!(
            cli.scenarios,
            vec![ScenarioKind::BulkListing, ScenarioKind::SizeSweep]
        );
        assert_eq!(cli.sweep_sizes, vec![KIB, MIB]);
        assert_eq!(cli.object_size, 64 * MIB);
    }
}
