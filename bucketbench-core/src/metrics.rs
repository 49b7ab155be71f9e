use crate::{GIB, REPORTED_QUANTILES};
#[cfg(feature = "rt")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Summary statistics for one operation over one measurement window.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "rt", derive(Serialize, Deserialize))]
pub struct MetricsReport {
    pub operation: String,
    pub samples: usize,
    pub min_ms: f64,
    pub avg_ms: f64,
    pub p90_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub ops_per_sec: f64,
    /// Only present when the operation moved a fixed, non-zero payload.
    pub bytes_per_sec: Option<f64>,
}

/// Outcome of reducing a sample set. Empty sample sets never produce numbers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "rt", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "rt", serde(tag = "status", rename_all = "snake_case"))]
pub enum Report {
    Metrics(MetricsReport),
    NoData { operation: String },
}

impl Report {
    pub fn operation(&self) -> &str {
        match self {
            Report::Metrics(m) => &m.operation,
            Report::NoData { operation } => operation,
        }
    }

    pub fn metrics(&self) -> Option<&MetricsReport> {
        match self {
            Report::Metrics(m) => Some(m),
            Report::NoData { .. } => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Report::NoData { .. })
    }
}

/// Calculate the report for a set of latencies of a single operation.
///
/// `payload_size` is the fixed number of bytes each invocation moved, or 0 when sizes vary or
/// do not apply; byte throughput is only reported when it is non-zero.
pub fn calculate(operation: &str, durations: &[Duration], payload_size: u64) -> Report {
    if durations.is_empty() {
        return Report::NoData {
            operation: operation.to_string(),
        };
    }

    let mut sorted: Vec<f64> = durations.iter().map(Duration::as_secs_f64).collect();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len() as f64;
    let total: f64 = sorted.iter().sum();
    let avg = total / n;

    let ops_per_sec = if total > 0. { n / total } else { 0. };
    let bytes_per_sec = (payload_size > 0).then(|| {
        if total > 0. {
            payload_size as f64 * n / total
        } else {
            0.
        }
    });

    let [p90, p95, p99] = REPORTED_QUANTILES.map(|q| percentile(&sorted, q));

    Report::Metrics(MetricsReport {
        operation: operation.to_string(),
        samples: sorted.len(),
        min_ms: sorted[0] * 1e3,
        avg_ms: avg * 1e3,
        p90_ms: p90 * 1e3,
        p95_ms: p95 * 1e3,
        p99_ms: p99 * 1e3,
        ops_per_sec,
        bytes_per_sec,
    })
}

/// Linear interpolation between the order statistics of an ascending, non-empty slice.
///
/// Returns `NaN` for an empty slice.
pub fn percentile(sorted: &[f64], quantile: f64) -> f64 {
    let Some(last) = sorted.len().checked_sub(1) else {
        return f64::NAN;
    };

    let k = last as f64 * quantile.clamp(0., 1.);
    let f = k.floor() as usize;
    let c = if f < last { f + 1 } else { f };

    if f == c {
        return sorted[f];
    }

    sorted[f] * (c as f64 - k) + sorted[c] * (k - f as f64)
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Metrics ({} samples):", self.operation, self.samples)?;
        writeln!(f, "  Min Latency: {:.2} ms", self.min_ms)?;
        writeln!(f, "  Average Latency: {:.2} ms", self.avg_ms)?;
        writeln!(f, "  P90 Latency: {:.2} ms", self.p90_ms)?;
        writeln!(f, "  P95 Latency: {:.2} ms", self.p95_ms)?;
        writeln!(f, "  P99 Latency: {:.2} ms", self.p99_ms)?;
        write!(f, "  Throughput: {:.2} ops/sec", self.ops_per_sec)?;
        if let Some(bps) = self.bytes_per_sec {
            write!(
                f,
                "\n  Throughput: {:.0} bytes/sec ({:.6} GB/sec)",
                bps,
                bps / GIB as f64
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Metrics(m) => fmt::Display::fmt(m, f),
            Report::NoData { operation } => write!(f, "No valid latencies for {operation}"),
        }
    }
}
