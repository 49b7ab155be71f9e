//! Fault injection for `bucketbench` backends.
//!
//! [`FaultyConnector`] wraps any other [`Connector`] and hands out sessions that add latency,
//! fail, throttle, panic or corrupt reads on demand. Used to exercise the error paths of the
//! scenario runner without a real object store.
use bucketbench::{Backend, Connector, Listing};
use bucketbench_core::BackendError;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Connect,
    CreateBucket,
    DeleteBucket,
    PutObject,
    Upload,
    GetObject,
    DeleteObject,
    ListBuckets,
    ListObjects,
    Close,
}

#[derive(Debug, Clone, Copy)]
enum Failure {
    Always,
    First(usize),
}

#[derive(Debug, Default)]
struct FaultState {
    calls: HashMap<Op, usize>,
}

/// Wraps a connector and injects faults into every session it hands out.
pub struct FaultyConnector<C> {
    inner: C,
    latency: Option<Normal<f64>>,
    error_rate: f64,
    failures: HashMap<Op, Failure>,
    panics: Vec<Op>,
    corrupt_reads: bool,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
    state: Arc<Mutex<FaultState>>,
}

impl<C> FaultyConnector<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            latency: None,
            error_rate: 0.0,
            failures: HashMap::new(),
            panics: vec![],
            corrupt_reads: false,
            limiter: None,
            state: Arc::new(Mutex::new(FaultState::default())),
        }
    }

    /// Delay every call by a normally distributed amount of time.
    pub fn latency(mut self, mean: Duration, std_dev: Duration) -> Self {
        self.latency = Normal::new(mean.as_secs_f64(), std_dev.as_secs_f64()).ok();
        self
    }

    /// Fail this fraction of calls (0.0 to 1.0) at random.
    pub fn error_rate(mut self, rate: f64) -> Self {
        self.error_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Fail every call of `op`.
    pub fn fail(mut self, op: Op) -> Self {
        self.failures.insert(op, Failure::Always);
        self
    }

    /// Fail only the first `count` calls of `op`.
    pub fn fail_first(mut self, op: Op, count: usize) -> Self {
        self.failures.insert(op, Failure::First(count));
        self
    }

    pub fn panic_on(mut self, op: Op) -> Self {
        self.panics.push(op);
        self
    }

    /// Flip the first byte of every object read back.
    pub fn corrupt_reads(mut self) -> Self {
        self.corrupt_reads = true;
        self
    }

    /// Reject calls beyond `per_second` with a throttling error. Connecting and closing are
    /// not counted.
    pub fn max_ops_per_sec(mut self, per_second: NonZeroU32) -> Self {
        self.limiter = Some(Arc::new(RateLimiter::direct(Quota::per_second(per_second))));
        self
    }

    /// How many times `op` has been attempted across all sessions.
    pub fn calls(&self, op: Op) -> usize {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.calls.get(&op).copied().unwrap_or(0)
    }

    fn faults(&self) -> Faults {
        Faults {
            latency: self.latency,
            error_rate: self.error_rate,
            failures: self.failures.clone(),
            panics: self.panics.clone(),
            limiter: self.limiter.clone(),
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
struct Faults {
    latency: Option<Normal<f64>>,
    error_rate: f64,
    failures: HashMap<Op, Failure>,
    panics: Vec<Op>,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
    state: Arc<Mutex<FaultState>>,
}

impl Faults {
    /// Runs before every wrapped call; an error here replaces the call.
    async fn inject(&self, op: Op) -> Result<(), BackendError> {
        let attempt = {
            let mut state = self.state.lock()?;
            let calls = state.calls.entry(op).or_default();
            *calls += 1;
            *calls
        };

        if let Some(latency) = &self.latency {
            let secs = latency.sample(&mut rand::thread_rng()).max(0.0);
            tokio::time::sleep(Duration::from_secs_f64(secs)).await;
        }

        if self.panics.contains(&op) {
            panic!("injected panic in {op:?}");
        }

        let fail = match self.failures.get(&op) {
            Some(Failure::Always) => true,
            Some(Failure::First(count)) => attempt <= *count,
            None => false,
        };
        if fail {
            debug!("Injecting failure into {op:?}");
            return Err(BackendError::Request(format!("injected failure in {op:?}")));
        }

        let throttled = !matches!(op, Op::Connect | Op::Close);
        if let Some(limiter) = self.limiter.as_ref().filter(|_| throttled) {
            if limiter.check().is_err() {
                return Err(BackendError::Request(format!("{op:?} throttled")));
            }
        }

        if self.error_rate > 0.0 && rand::thread_rng().gen_bool(self.error_rate) {
            return Err(BackendError::Request(format!("random failure in {op:?}")));
        }

        Ok(())
    }
}

impl<C> Connector for FaultyConnector<C>
where
    C: Connector + Sync,
    C::Backend: Sync,
{
    type Backend = FaultyBackend<C::Backend>;

    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn connect(&self) -> Result<Self::Backend, BackendError> {
        let faults = self.faults();
        faults.inject(Op::Connect).await?;
        let inner = self.inner.connect().await?;
        Ok(FaultyBackend {
            inner,
            faults,
            corrupt_reads: self.corrupt_reads,
        })
    }
}

/// A session handed out by [`FaultyConnector`].
pub struct FaultyBackend<B> {
    inner: B,
    faults: Faults,
    corrupt_reads: bool,
}

impl<B: Backend + Sync> Backend for FaultyBackend<B> {
    async fn create_bucket(&self, name: &str) -> Result<(), BackendError> {
        self.faults.inject(Op::CreateBucket).await?;
        self.inner.create_bucket(name).await
    }

    async fn delete_bucket(&self, name: &str, force: bool) -> Result<(), BackendError> {
        self.faults.inject(Op::DeleteBucket).await?;
        self.inner.delete_bucket(name, force).await
    }

    async fn put_object(&self, bucket: &str, key: &str, data: &[u8]) -> Result<(), BackendError> {
        self.faults.inject(Op::PutObject).await?;
        self.inner.put_object(bucket, key, data).await
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        chunk_size: usize,
    ) -> Result<(), BackendError> {
        self.faults.inject(Op::Upload).await?;
        self.inner.upload(bucket, key, data, chunk_size).await
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, BackendError> {
        self.faults.inject(Op::GetObject).await?;
        let mut data = self.inner.get_object(bucket, key).await?;
        if self.corrupt_reads {
            match data.first_mut() {
                Some(byte) => *byte ^= 0xff,
                None => data.push(0),
            }
        }
        Ok(data)
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), BackendError> {
        self.faults.inject(Op::DeleteObject).await?;
        self.inner.delete_object(bucket, key).await
    }

    async fn list_buckets(&self) -> Result<Listing, BackendError> {
        self.faults.inject(Op::ListBuckets).await?;
        self.inner.list_buckets().await
    }

    async fn list_objects(&self, bucket: &str) -> Result<Listing, BackendError> {
        self.faults.inject(Op::ListObjects).await?;
        self.inner.list_objects(bucket).await
    }

    async fn close(self) -> Result<(), BackendError> {
        // The inner session is released before any injected failure or panic.
        let closed = self.inner.close().await;
        self.faults.inject(Op::Close).await?;
        closed
    }
}
