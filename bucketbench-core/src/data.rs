use crate::metrics::{calculate, Report};
use std::time::Duration;

/// One measured invocation of a backend operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySample {
    duration: Duration,
    bytes: u64,
}

impl LatencySample {
    pub fn new(duration: Duration, bytes: u64) -> Self {
        Self { duration, bytes }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Payload size moved by the operation, 0 when not applicable.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

/// Samples for a single logical operation, e.g. "Bucket Creation".
#[derive(Debug, Clone)]
pub struct OperationSamples {
    operation: String,
    samples: Vec<LatencySample>,
}

impl OperationSamples {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            samples: vec![],
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn push(&mut self, sample: LatencySample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn durations(&self) -> Vec<Duration> {
        self.samples.iter().map(LatencySample::duration).collect()
    }

    /// The payload size shared by every sample, or 0 if sizes vary.
    pub fn payload_size(&self) -> u64 {
        let mut sizes = self.samples.iter().map(LatencySample::bytes);
        match sizes.next() {
            Some(first) if sizes.all(|s| s == first) => first,
            _ => 0,
        }
    }

    pub fn report(&self) -> Report {
        calculate(&self.operation, &self.durations(), self.payload_size())
    }
}

/// Samples grouped per operation, kept in the order operations were first attempted.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    operations: Vec<OperationSamples>,
}

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation without recording a sample. Operations which never succeed still
    /// show up in the reports as "no data".
    pub fn register(&mut self, operation: &str) -> &mut OperationSamples {
        let idx = match self
            .operations
            .iter()
            .position(|o| o.operation == operation)
        {
            Some(idx) => idx,
            None => {
                self.operations.push(OperationSamples::new(operation));
                self.operations.len() - 1
            }
        };
        &mut self.operations[idx]
    }

    pub fn push(&mut self, operation: &str, sample: LatencySample) {
        self.register(operation).push(sample);
    }

    pub fn get(&self, operation: &str) -> Option<&OperationSamples> {
        self.operations.iter().find(|o| o.operation == operation)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OperationSamples> {
        self.operations.iter()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.operations.iter().map(OperationSamples::report).collect()
    }
}
