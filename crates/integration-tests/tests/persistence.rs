//! File-backed stores: state survives reopen, concurrent writers stay isolated

mod common;

use common::{temp_db, Harness};
use corestore_core::application::SCHEMA_VERSION_KEY;
use corestore_core::domain::{Core, CoreName};
use corestore_core::error::AppError;
use corestore_core::port::KeyValueStore;
use corestore_infra_sqlite::StoreConfig;
use std::sync::Arc;

fn file_stores(name: &str) -> (StoreConfig, StoreConfig) {
    (
        StoreConfig::from_path(temp_db(&format!("{}-entities", name))),
        StoreConfig::from_path(temp_db(&format!("{}-settings", name))),
    )
}

#[tokio::test]
async fn test_version_and_rows_survive_reopen() {
    let (entity, settings) = file_stores("reopen");

    {
        let harness = Harness::open(entity.clone(), settings.clone()).await;
        assert_eq!(harness.engine().run_pending().await.unwrap(), 4);
        assert!(harness.repository.seed_defaults().await.unwrap());
        harness.pool.close().await;
    }

    let harness = Harness::open(entity, settings).await;
    assert_eq!(
        harness.kv.get_int(SCHEMA_VERSION_KEY).await.unwrap(),
        Some(4)
    );

    let columns_before = harness.columns("cores").await;
    assert_eq!(harness.engine().run_pending().await.unwrap(), 4);
    assert_eq!(harness.columns("cores").await, columns_before);

    assert!(!harness.repository.seed_defaults().await.unwrap());
    assert_eq!(harness.repository.get_all().await.unwrap().len(), 6);
}

#[tokio::test]
async fn test_concurrent_disjoint_batches_all_land() {
    let (entity, settings) = file_stores("concurrent");
    let harness = Harness::open(entity, settings).await;
    harness.engine().run_pending().await.unwrap();

    let repository = Arc::new(harness.repository);
    let mut handles = Vec::new();
    for writer in 0..4 {
        let repository = Arc::clone(&repository);
        handles.push(tokio::spawn(async move {
            let batch: Vec<Core> = CoreName::ALL
                .iter()
                .map(|name| {
                    let mut core = Core::canonical(*name);
                    core.id = format!("w{}-{}", writer, name.as_str());
                    core
                })
                .collect();
            repository.batch_insert(batch).await
        }));
    }

    for handle in handles {
        let ids = handle.await.unwrap().unwrap();
        assert_eq!(ids.len(), 6);
    }
    assert_eq!(repository.get_all().await.unwrap().len(), 24);
}

#[tokio::test]
async fn test_lost_entity_database_is_not_trusted() {
    let (entity, settings) = file_stores("lost");

    {
        let harness = Harness::open(entity, settings.clone()).await;
        harness.engine().run_pending().await.unwrap();
        harness.pool.close().await;
    }

    // Fresh entity database paired with settings that still record v4
    let fresh = StoreConfig::from_path(temp_db("lost-entities-fresh"));
    let harness = Harness::open(fresh, settings).await;

    let err = harness.engine().run_pending().await.unwrap_err();
    assert!(matches!(err, AppError::Config(_)), "got {:?}", err);
    assert_eq!(
        harness.kv.get_int(SCHEMA_VERSION_KEY).await.unwrap(),
        Some(4)
    );
    assert!(harness.columns("cores").await.is_empty());
}
