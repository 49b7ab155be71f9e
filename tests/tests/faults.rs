mod utils;
#[allow(unused)]
use utils::*;

mod tests {
    use super::*;

    use bucketbench::prelude::*;
    use bucketbench_core::{Cleanup, DataIntegrityError, Integrity};
    use mock_backend::{FaultyConnector, Op};
    use std::time::Duration;

    fn listing(buckets: usize, objects: usize) -> BulkListingConfig {
        BulkListingConfig {
            bucket_count: buckets,
            object_count: objects,
            object_size: 1,
            list_repetitions: 2,
        }
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(10_000)]
    async fn failed_connect_skips_everything() {
        let store = MemoryStore::new();
        let connector = FaultyConnector::new(store.clone()).fail(Op::Connect);

        let result = ScenarioRunner::new(&connector)
            .run(BulkListing::new(listing(3, 3)))
            .await;

        match &result.fatal {
            Some(ScenarioError::Setup { operation, .. }) => assert_eq!(operation, "Connect"),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(result.reports.is_empty());
        assert_eq!(store.total_sessions(), 0);
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(10_000)]
    async fn setup_failure_leaves_nothing_behind() {
        let store = MemoryStore::new();
        let connector = FaultyConnector::new(store.clone()).fail(Op::CreateBucket);

        let result = ScenarioRunner::new(&connector)
            .run(LargeObject::new(LargeObjectConfig::new(1024, 512)))
            .await;

        assert!(matches!(result.fatal, Some(ScenarioError::Setup { .. })));
        assert!(result.reports.is_empty());
        assert_eq!(connector.calls(Op::Upload), 0);
        assert!(result.cleanup.is_clean());
        assert!(store.bucket_names().is_empty());
        assert_eq!(store.open_sessions(), 0);
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(10_000)]
    async fn panic_mid_workload_still_cleans_up() {
        let store = MemoryStore::new();
        let connector = FaultyConnector::new(store.clone()).panic_on(Op::ListObjects);

        let result = ScenarioRunner::new(&connector)
            .run(BulkListing::new(listing(2, 4)))
            .await;

        match &result.fatal {
            Some(ScenarioError::Aborted { phase, reason }) => {
                assert_eq!(phase, "Workload");
                assert!(reason.contains("ListObjects"), "{reason}");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        // The objects created before the panic were removed by teardown.
        assert_eq!(samples(&result, "Object Creation"), 4);
        assert_eq!(samples(&result, "Object Deletion"), 0);
        assert!(result.cleanup.is_clean());
        assert!(store.bucket_names().is_empty());
        assert_eq!(store.open_sessions(), 0);
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(10_000)]
    async fn transient_errors_drop_samples_and_continue() {
        let store = MemoryStore::new();
        let connector = FaultyConnector::new(store.clone()).fail_first(Op::PutObject, 2);

        let result = ScenarioRunner::new(&connector)
            .run(BulkListing::new(listing(1, 5)))
            .await;

        assert!(result.fatal.is_none());
        assert_eq!(samples(&result, "Object Creation"), 3);
        assert_eq!(samples(&result, "Object Deletion"), 3);

        let transient = result
            .failures
            .iter()
            .filter(|f| matches!(f, ScenarioError::Transient { .. }))
            .count();
        let not_found = result
            .failures
            .iter()
            .filter(|f| matches!(f, ScenarioError::NotFound { .. }))
            .count();
        assert_eq!(transient, 2);
        // Deleting the two objects that were never written.
        assert_eq!(not_found, 2);
        assert!(result.is_success());
        assert!(store.bucket_names().is_empty());
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(10_000)]
    async fn suite_continues_after_a_failed_scenario() {
        let store = MemoryStore::new();
        let connector = FaultyConnector::new(store.clone()).fail_first(Op::CreateBucket, 1);

        let report = BenchmarkSuite::new(connector)
            .bulk_listing(listing(2, 2))
            .bulk_listing(listing(2, 2))
            .run()
            .await;

        assert_eq!(report.results.len(), 2);
        assert!(matches!(
            report.results[0].fatal,
            Some(ScenarioError::Setup { .. })
        ));
        assert!(report.results[1].is_success(), "{}", report.results[1]);
        assert!(report
            .to_string()
            .contains("Scenarios with errors: bulk-listing"));
        assert!(store.bucket_names().is_empty());
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(10_000)]
    async fn failed_listings_show_as_no_data() {
        let store = MemoryStore::new();
        let connector = FaultyConnector::new(store.clone()).fail(Op::ListBuckets);

        let result = ScenarioRunner::new(&connector)
            .run(BulkListing::new(listing(2, 2)))
            .await;

        let report = result.report("Bucket Listing").unwrap();
        assert!(report.is_no_data());
        assert!(result
            .to_string()
            .contains("No valid latencies for Bucket Listing"));
        assert_eq!(samples(&result, "Bucket Deletion"), 2);
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(10_000)]
    async fn corrupt_reads_fail_integrity() {
        let store = MemoryStore::new();
        let connector = FaultyConnector::new(store.clone()).corrupt_reads();

        let report = BenchmarkSuite::new(connector)
            .large_object(LargeObjectConfig::new(4096, 1024))
            .size_sweep(SizeSweepConfig {
                sizes: vec![16],
                objects_per_size: 3,
            })
            .run()
            .await;

        match &report.results[0].integrity {
            Integrity::Mismatch { errors } => assert_eq!(
                errors,
                &vec![DataIntegrityError::Content {
                    key: "large-object".to_string(),
                    offset: 0
                }]
            ),
            other => panic!("unexpected integrity {other:?}"),
        }
        match &report.results[1].integrity {
            Integrity::Mismatch { errors } => assert_eq!(errors.len(), 3),
            other => panic!("unexpected integrity {other:?}"),
        }
        assert!(!report.is_success());
        assert!(report.to_string().contains("Data integrity FAILED"));
        assert!(store.bucket_names().is_empty());
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(10_000)]
    async fn failed_teardown_is_reported() {
        let store = MemoryStore::new();
        let connector = FaultyConnector::new(store.clone()).fail(Op::DeleteBucket);

        let result = ScenarioRunner::new(&connector)
            .run(LargeObject::new(LargeObjectConfig::new(1024, 1024)))
            .await;

        assert!(result.fatal.is_none());
        match &result.cleanup {
            Cleanup::Failed { errors } => {
                assert_eq!(errors.len(), 1);
                assert!(matches!(errors[0], ScenarioError::Teardown { .. }));
            }
            Cleanup::Clean => panic!("teardown should have failed"),
        }
        assert!(result.to_string().contains("WARNING: cleanup incomplete"));
        assert_eq!(store.bucket_names().len(), 1);
        assert_eq!(store.open_sessions(), 0);
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(10_000)]
    async fn failed_close_is_a_cleanup_error() {
        let store = MemoryStore::new();
        let connector = FaultyConnector::new(store.clone()).fail(Op::Close);

        let result = ScenarioRunner::new(&connector)
            .run(BulkListing::new(listing(1, 1)))
            .await;

        assert!(!result.cleanup.is_clean());
        assert!(result.to_string().contains("backend session"));
        assert_eq!(store.open_sessions(), 0);
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(10_000)]
    async fn panic_during_teardown_is_a_cleanup_error() {
        let store = MemoryStore::new();
        let connector = FaultyConnector::new(store.clone()).panic_on(Op::DeleteBucket);

        let report = BenchmarkSuite::new(connector)
            .large_object(LargeObjectConfig::new(1024, 512))
            .bulk_listing(listing(2, 2))
            .run()
            .await;

        assert_eq!(report.results.len(), 2);
        assert!(report.results[0].fatal.is_none());
        match &report.results[1].fatal {
            Some(ScenarioError::Aborted { phase, .. }) => assert_eq!(phase, "Workload"),
            other => panic!("unexpected outcome {other:?}"),
        }
        for result in &report.results {
            match &result.cleanup {
                Cleanup::Failed { errors } => assert!(errors.iter().all(|err| matches!(
                    err,
                    ScenarioError::Teardown { reason, .. } if reason.contains("DeleteBucket")
                ))),
                Cleanup::Clean => panic!("{} should have failed teardown", result.name),
            }
        }
        // The object bucket plus both listing buckets could not be removed.
        assert_eq!(store.bucket_names().len(), 4);
        assert_eq!(store.open_sessions(), 0);
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(10_000)]
    async fn panic_during_close_is_a_cleanup_error() {
        let store = MemoryStore::new();
        let connector = FaultyConnector::new(store.clone()).panic_on(Op::Close);

        let report = BenchmarkSuite::new(connector)
            .bulk_listing(listing(2, 2))
            .bulk_listing(listing(2, 2))
            .run()
            .await;

        assert_eq!(report.results.len(), 2);
        for result in &report.results {
            assert!(result.fatal.is_none());
            assert_eq!(samples(result, "Object Creation"), 2);
            match &result.cleanup {
                Cleanup::Failed { errors } => match errors.as_slice() {
                    [ScenarioError::Teardown { resource, reason }] => {
                        assert_eq!(resource, "backend session");
                        assert!(reason.contains("injected panic in Close"), "{reason}");
                    }
                    other => panic!("unexpected cleanup errors {other:?}"),
                },
                Cleanup::Clean => panic!("closing should have failed"),
            }
        }
        assert!(store.bucket_names().is_empty());
        assert_eq!(store.open_sessions(), 0);
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(10_000)]
    async fn panic_during_connect_is_a_setup_error() {
        let store = MemoryStore::new();
        let connector = FaultyConnector::new(store.clone()).panic_on(Op::Connect);

        let report = BenchmarkSuite::new(connector)
            .large_object(LargeObjectConfig::new(1024, 512))
            .bulk_listing(listing(2, 2))
            .run()
            .await;

        assert_eq!(report.results.len(), 2);
        for result in &report.results {
            match &result.fatal {
                Some(ScenarioError::Setup { operation, reason }) => {
                    assert_eq!(operation, "Connect");
                    assert!(reason.contains("injected panic in Connect"), "{reason}");
                }
                other => panic!("unexpected outcome {other:?}"),
            }
            assert!(result.reports.is_empty());
        }
        assert!(report
            .to_string()
            .contains("Scenarios with errors: large-object, bulk-listing"));
        assert_eq!(store.total_sessions(), 0);
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(10_000)]
    async fn latency_is_measured() {
        let connector = FaultyConnector::new(MemoryStore::new())
            .latency(Duration::from_millis(5), Duration::ZERO);

        let result = ScenarioRunner::new(&connector)
            .run(BulkListing::new(listing(2, 2)))
            .await;

        let creation = result
            .report("Bucket Creation")
            .and_then(|r| r.metrics())
            .unwrap();
        assert!(creation.min_ms >= 5.0, "{creation}");
        assert!(creation.ops_per_sec <= 200.0, "{creation}");
    }
}
