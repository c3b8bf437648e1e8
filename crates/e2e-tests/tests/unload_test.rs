//! Unload E2E tests.

use pretty_assertions::assert_eq;

use archive_engine::MockEngine;
use archive_reader::Compression;

use e2e_tests::{index_record, single_file_archive, TestHarness};

#[tokio::test]
async fn test_unload_after_load_removes_indices() {
    let harness = TestHarness::with_engine(MockEngine::new().with_index("unrelated"));
    harness.write_file(
        "logs",
        "data.json",
        Compression::None,
        &single_file_archive(&["alpha", "beta"], 3),
    );
    let request = harness.request("logs");

    harness.load(&request).await.unwrap();
    assert_eq!(harness.engine.indices(), vec!["alpha", "beta", "unrelated"]);

    let result = harness.unload(&request).await.unwrap();

    assert_eq!(result.index_names(), vec!["alpha", "beta"]);
    assert!(result.iter().all(|(_, stats)| stats.deleted && !stats.created));
    assert_eq!(harness.engine.indices(), vec!["unrelated"]);
}

#[tokio::test]
async fn test_unload_only_touches_existing_indices() {
    let harness = TestHarness::with_engine(MockEngine::new().with_index("alpha"));
    harness.write_file(
        "logs",
        "mappings.json",
        Compression::None,
        &[index_record("alpha"), index_record("beta")],
    );

    let result = harness.unload(&harness.request("logs")).await.unwrap();

    assert_eq!(result.index_names(), vec!["alpha"]);
    assert!(harness.engine.indices().is_empty());
    assert_eq!(harness.engine.bulk_requests(), 0);
}
