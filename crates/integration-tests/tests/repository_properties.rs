//! EntityRepository against a migrated SQLite store
//!
//! Validation before writes, all-or-nothing batches and not-found semantics.

mod common;

use common::Harness;
use corestore_core::application::{AdjustmentMap, LevelAdjustment};
use corestore_core::domain::{
    CombinationType, Core, CoreCombination, CoreName, Pattern, PatternType, Trend,
};
use corestore_core::error::AppError;

fn core(name: CoreName, id: &str) -> Core {
    let mut core = Core::canonical(name);
    core.id = id.to_string();
    core
}

#[tokio::test]
async fn test_out_of_range_level_never_reaches_storage() {
    let harness = Harness::migrated().await;

    for level in [-0.01, 1.01, f64::NAN] {
        let mut invalid = core(CoreName::Optimism, "o");
        invalid.current_level = level;
        let err = harness.repository.insert(invalid).await.unwrap_err();
        assert!(err.is_validation(), "level {} gave {:?}", level, err);
    }
    assert_eq!(harness.count("cores").await, 0);
}

#[tokio::test]
async fn test_unknown_enum_values_are_rejected() {
    let harness = Harness::migrated().await;
    harness.repository.seed_defaults().await.unwrap();
    let id = harness.repository.get_all().await.unwrap()[0].id.clone();

    let err = harness
        .repository
        .update_percentage(&id, 40.0, "skyrocketing")
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(harness
        .repository
        .get_by_trend("flat")
        .await
        .unwrap_err()
        .is_validation());
    assert!(harness
        .repository
        .get_by_name("Patience")
        .await
        .unwrap_err()
        .is_validation());

    let unchanged = harness.repository.get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(unchanged.current_level, 0.5);
}

#[tokio::test]
async fn test_seeding_is_idempotent() {
    let harness = Harness::migrated().await;

    assert!(harness.repository.seed_defaults().await.unwrap());
    assert!(!harness.repository.seed_defaults().await.unwrap());

    let cores = harness.repository.get_all().await.unwrap();
    assert_eq!(cores.len(), 6);
    for name in CoreName::ALL {
        let found = cores.iter().filter(|c| c.name == name).count();
        assert_eq!(found, 1, "{} seeded {} times", name, found);
    }
    assert!(cores
        .iter()
        .all(|c| c.current_level == 0.5 && c.trend == Trend::Stable));
}

#[tokio::test]
async fn test_batch_with_invalid_third_item_writes_nothing() {
    let harness = Harness::migrated().await;

    let mut third = core(CoreName::Creativity, "c");
    third.previous_level = 2.0;
    let err = harness
        .repository
        .batch_insert(vec![
            core(CoreName::Optimism, "a"),
            core(CoreName::Resilience, "b"),
            third,
        ])
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(harness.count("cores").await, 0);
}

#[tokio::test]
async fn test_batch_of_five_updates_with_invalid_third_changes_nothing() {
    let harness = Harness::migrated().await;
    let ids = ["a", "b", "c", "d", "e"];
    let originals: Vec<Core> = CoreName::ALL
        .iter()
        .zip(ids)
        .map(|(name, id)| core(*name, id))
        .collect();
    harness
        .repository
        .batch_insert(originals.clone())
        .await
        .unwrap();
    let before = harness.repository.get_all().await.unwrap();

    let updates: Vec<Core> = originals
        .into_iter()
        .enumerate()
        .map(|(i, mut core)| {
            core.current_level = if i == 2 { 1.5 } else { 0.9 };
            core
        })
        .collect();
    let err = harness.repository.batch_update(updates).await.unwrap_err();

    assert!(err.is_validation(), "got {:?}", err);
    assert_eq!(harness.repository.get_all().await.unwrap(), before);
}

#[tokio::test]
async fn test_batch_update_with_missing_third_item_changes_nothing() {
    let harness = Harness::migrated().await;
    harness
        .repository
        .batch_insert(vec![
            core(CoreName::Optimism, "a"),
            core(CoreName::Resilience, "b"),
        ])
        .await
        .unwrap();

    let mut a = core(CoreName::Optimism, "a");
    a.current_level = 0.9;
    let mut b = core(CoreName::Resilience, "b");
    b.current_level = 0.1;
    let err = harness
        .repository
        .batch_update(vec![a, b, core(CoreName::Creativity, "ghost")])
        .await
        .unwrap_err();

    assert!(err.is_not_found(), "got {:?}", err);
    for id in ["a", "b"] {
        let stored = harness.repository.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.current_level, 0.5);
    }
}

#[tokio::test]
async fn test_multiple_percentages_all_or_nothing() {
    let harness = Harness::migrated().await;
    harness.repository.seed_defaults().await.unwrap();
    let cores = harness.repository.get_all().await.unwrap();

    let mut adjustments = AdjustmentMap::new();
    adjustments.insert(cores[0].id.clone(), LevelAdjustment::new(80.0, "rising"));
    adjustments.insert(cores[1].id.clone(), LevelAdjustment::new(20.0, "declining"));
    adjustments.insert("missing".to_string(), LevelAdjustment::new(50.0, "stable"));

    let err = harness
        .repository
        .update_multiple_percentages(&adjustments)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(harness
        .repository
        .get_by_trend("rising")
        .await
        .unwrap()
        .is_empty());

    adjustments.remove("missing");
    assert_eq!(
        harness
            .repository
            .update_multiple_percentages(&adjustments)
            .await
            .unwrap(),
        2
    );
    let risen = harness.repository.get_by_trend("rising").await.unwrap();
    assert_eq!(risen.len(), 1);
    assert_eq!(risen[0].id, cores[0].id);
    assert_eq!(risen[0].previous_level, 0.5);
    assert!((risen[0].current_level - 0.8).abs() < 1e-9);
}

#[tokio::test]
async fn test_missing_ids_are_not_found() {
    let harness = Harness::migrated().await;

    let err = harness
        .repository
        .update(core(CoreName::Optimism, "ghost"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = harness.repository.delete("ghost").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = harness
        .repository
        .delete_pattern("ghost")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_top_by_level_is_deterministic() {
    let harness = Harness::migrated().await;
    let mut z = core(CoreName::Optimism, "z");
    z.current_level = 0.7;
    let mut m = core(CoreName::Resilience, "m");
    m.current_level = 0.7;
    let mut a = core(CoreName::Creativity, "a");
    a.current_level = 0.3;
    harness.repository.batch_insert(vec![z, m, a]).await.unwrap();

    let top: Vec<String> = harness
        .repository
        .get_top_by_level(2)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(top, vec!["m", "z"]);
}

#[tokio::test]
async fn test_reset_clears_every_entity_kind() {
    let harness = Harness::migrated().await;
    harness.repository.seed_defaults().await.unwrap();

    let mut combination = CoreCombination::new(
        "Steady Spark",
        "Creative work that survives setbacks",
        "growth",
        CombinationType::Balance,
    );
    combination.core_names = vec!["Creativity".to_string(), "Resilience".to_string()];
    harness
        .repository
        .insert_combination(combination)
        .await
        .unwrap();
    harness
        .repository
        .insert_pattern(Pattern::new(
            "Sunday slump",
            "Mood drops on Sunday evenings",
            "mood",
            PatternType::Recurring,
        ))
        .await
        .unwrap();

    harness.repository.reset_all().await.unwrap();

    assert_eq!(harness.count("cores").await, 6);
    assert_eq!(harness.count("core_combinations").await, 0);
    assert_eq!(harness.count("patterns").await, 0);
}

#[tokio::test]
async fn test_export_then_import_into_fresh_store() {
    let source = Harness::migrated().await;
    source.repository.seed_defaults().await.unwrap();
    source
        .repository
        .insert_pattern(Pattern::new(
            "Morning focus",
            "Deep work before 10am",
            "focus",
            PatternType::Emerging,
        ))
        .await
        .unwrap();
    let exported = serde_json::to_string(&source.repository.export_snapshot().await.unwrap())
        .unwrap();

    let target = Harness::migrated().await;
    let snapshot = serde_json::from_str(&exported).unwrap();
    assert_eq!(target.repository.import_snapshot(snapshot).await.unwrap(), 7);

    let source_cores = source.repository.get_all().await.unwrap();
    let target_cores = target.repository.get_all().await.unwrap();
    assert_eq!(
        source_cores.iter().map(|c| &c.id).collect::<Vec<_>>(),
        target_cores.iter().map(|c| &c.id).collect::<Vec<_>>()
    );
    assert_eq!(
        target.repository.get_patterns_by_category("focus").await.unwrap()[0].pattern_type,
        PatternType::Emerging
    );
}
