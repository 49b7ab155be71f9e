use bucketbench_runtime::BenchRuntime;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bucketbench=info,bucketbench_runtime=info"));
    FmtSubscriber::builder().with_env_filter(filter).init();

    match BenchRuntime::new().with_args().run().await {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(report) => {
            let failed: Vec<&str> = report.failed().map(|r| r.name.as_str()).collect();
            tracing::warn!("Scenarios with errors: {}", failed.join(", "));
            ExitCode::from(2)
        }
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
