use bucketbench_core::ScenarioResult;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_subscriber::FmtSubscriber;

/// Log setup for test binaries that do not capture logs with `traced_test`.
#[allow(unused)]
pub fn init() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();

    ONCE_LOCK.get_or_init(|| {
        let _ = FmtSubscriber::builder()
            .with_env_filter("bucketbench=debug,bucketbench_runtime=debug,mock_backend=debug")
            .with_test_writer()
            .try_init();
    });
}

/// Successful samples recorded for `operation`, zero when it has no data.
#[allow(unused)]
pub fn samples(result: &ScenarioResult, operation: &str) -> usize {
    result
        .report(operation)
        .and_then(|r| r.metrics())
        .map(|m| m.samples)
        .unwrap_or(0)
}

#[allow(unused)]
pub fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("bucketbench-{name}-{}", uuid::Uuid::new_v4().simple()))
}
