mod utils;
#[allow(unused)]
use utils::*;

mod tests {
    use super::*;

    use bucketbench_core::{
        BulkListingConfig, LargeObjectConfig, ScenarioConfig, SizeSweepConfig, SuiteReport, KIB,
    };
    use bucketbench_runtime::{BackendKind, BenchRuntime};

    fn scenarios() -> Vec<ScenarioConfig> {
        vec![
            ScenarioConfig::LargeObject(LargeObjectConfig::new(64 * KIB, 16 * KIB)),
            ScenarioConfig::BulkListing(BulkListingConfig {
                bucket_count: 3,
                object_count: 3,
                object_size: 1,
                list_repetitions: 2,
            }),
            ScenarioConfig::SizeSweep(SizeSweepConfig {
                sizes: vec![1, KIB],
                objects_per_size: 2,
            }),
        ]
    }

    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn memory_runtime_reports_every_scenario() {
        init();

        let report = BenchRuntime::new()
            .scenarios(&scenarios())
            .quiet()
            .run()
            .await
            .unwrap();

        assert!(report.is_success(), "{report}");
        assert_eq!(report.backend, "memory");
        let names: Vec<&str> = report.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["large-object", "bulk-listing", "size-sweep"]);
    }

    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn filesystem_runtime_round_trips_json() {
        init();
        let dir = scratch_dir("runtime");
        let json = dir.join("results.json");
        tokio::fs::create_dir_all(&dir).await.unwrap();

        let report = BenchRuntime::new()
            .backend(BackendKind::Fs)
            .root(dir.join("store"))
            .scenarios(&scenarios())
            .json(&json)
            .quiet()
            .run()
            .await
            .unwrap();
        assert!(report.is_success(), "{report}");

        let text = tokio::fs::read_to_string(&json).await.unwrap();
        let decoded: SuiteReport = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded.backend, "filesystem");
        assert_eq!(decoded.results.len(), 3);
        let operations = |r: &SuiteReport| -> Vec<(String, Option<usize>)> {
            r.results[1]
                .reports
                .iter()
                .map(|rep| (rep.operation().to_string(), rep.metrics().map(|m| m.samples)))
                .collect()
        };
        assert_eq!(operations(&decoded), operations(&report));
        assert_eq!(decoded.results[2].integrity, report.results[2].integrity);

        // Every bucket the run created is gone again.
        let mut entries = tokio::fs::read_dir(dir.join("store")).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
