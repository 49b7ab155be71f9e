mod utils;
#[allow(unused)]
use utils::*;

mod tests {
    use super::*;

    use bucketbench::prelude::*;
    use bucketbench_core::Integrity;
    use futures_util::TryStreamExt;

    fn listing(buckets: usize, objects: usize, repetitions: usize) -> BulkListingConfig {
        BulkListingConfig {
            bucket_count: buckets,
            object_count: objects,
            object_size: 1,
            list_repetitions: repetitions,
        }
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(20_000)]
    async fn bulk_listing_three_buckets() {
        let store = MemoryStore::new();
        let result = ScenarioRunner::new(&store)
            .run(BulkListing::new(listing(3, 10, 4)))
            .await;

        assert!(result.is_success(), "{result}");
        assert_eq!(samples(&result, "Bucket Creation"), 3);
        assert!(samples(&result, "Bucket Listing") >= 4);
        assert_eq!(samples(&result, "Bucket Deletion"), 3);
        assert_eq!(samples(&result, "Object Creation"), 10);
        assert_eq!(samples(&result, "Object Listing"), 4);
        assert_eq!(samples(&result, "Object Deletion"), 10);
        assert!(store.bucket_names().is_empty());
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn full_suite_on_memory() {
        let store = MemoryStore::new();
        let report = BenchmarkSuite::new(store.clone())
            .large_object(LargeObjectConfig::new(2 * MIB, 256 * KIB))
            .bulk_listing(listing(5, 20, 2))
            .size_sweep(SizeSweepConfig {
                sizes: vec![KIB, 64 * KIB],
                objects_per_size: 5,
            })
            .run()
            .await;

        assert!(report.is_success(), "{report}");
        assert_eq!(report.results.len(), 3);
        assert_eq!(
            report.results[0].integrity,
            Integrity::Verified { objects: 1 }
        );
        assert_eq!(
            report.results[2].integrity,
            Integrity::Verified { objects: 10 }
        );

        let text = report.to_string();
        assert!(text.contains("Large Object Upload (Multipart) Metrics (1 samples):"));
        assert!(text.contains("Write (Size: 1024 bytes) Metrics (5 samples):"));
        assert!(!text.contains("WARNING"));

        assert_eq!(store.total_sessions(), 3);
        assert_eq!(store.open_sessions(), 0);
        assert!(store.bucket_names().is_empty());
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn full_suite_on_filesystem() {
        let root = scratch_dir("suite");
        let connector = FsConnector::new(&root);
        let report = BenchmarkSuite::new(connector)
            .large_object(LargeObjectConfig::new(MIB, 100 * KIB))
            .bulk_listing(listing(3, 5, 2))
            .size_sweep(SizeSweepConfig {
                sizes: vec![1, KIB],
                objects_per_size: 3,
            })
            .run()
            .await;

        assert!(report.is_success(), "{report}");
        assert_eq!(report.backend, "filesystem");

        // Nothing a scenario created may still be listed afterwards.
        let backend = FsConnector::new(&root).connect().await.unwrap();
        let left: Vec<String> = backend
            .list_buckets()
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert!(left.is_empty(), "{left:?}");
        backend.close().await.unwrap();

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(20_000)]
    async fn scenarios_do_not_share_buckets() {
        let store = MemoryStore::new();
        let report = BenchmarkSuite::new(store.clone())
            .bulk_listing(listing(2, 2, 1))
            .bulk_listing(listing(2, 2, 1))
            .run()
            .await;

        assert!(report.is_success(), "{report}");
        assert!(report.results.iter().all(|r| r.failures.is_empty()));
        assert!(store.bucket_names().is_empty());
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(10_000)]
    async fn logs_scenario_progress() {
        let store = MemoryStore::new();
        ScenarioRunner::new(&store)
            .run(BulkListing::new(listing(1, 1, 1)))
            .await;

        assert!(logs_contain("Running bulk-listing against the memory backend"));
        assert!(logs_contain("Cleaning up bucket: object-list-test-"));
        assert!(logs_contain("Scenario complete in"));
    }
}
