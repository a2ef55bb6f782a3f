//! Learner lifecycle through the registry, backed by a real file store
//!
//! Trains each learner kind through the registry surface, bounces the
//! registry (new registry, same file) and checks the learned state came
//! back, overrides parameters on rehydration, and verifies reset wipes
//! both the live learner and its snapshot on disk.

mod common;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use common::{alarm_signature, init_tracing, sprinkler_signature};
use periplus::learners::{LearnerInput, LearnerKind, LearnerParams, LearnerQuery};
use periplus::{JsonFileStore, KeyValueStore, LearnerRegistry};

async fn registry_at(path: &Path) -> LearnerRegistry {
    let store = JsonFileStore::open(path).await.expect("Failed to open store");
    LearnerRegistry::new(Arc::new(store))
}

fn visit(name: &str) -> LearnerInput {
    LearnerInput::Visit {
        name: name.to_string(),
    }
}

#[tokio::test]
async fn test_shortcut_state_survives_a_restart() {
    init_tracing();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("learners.json");

    let registry = registry_at(&path).await;
    registry
        .load_or_create("visits", LearnerKind::Shortcut, LearnerParams::default())
        .await
        .expect("Failed to register learner");
    for name in ["house/kitchen", "house/kitchen", "garden"] {
        registry
            .update("visits", visit(name))
            .await
            .expect("Failed to update learner");
    }
    registry.save("visits").await.expect("Failed to save learner");
    drop(registry);

    let reopened = registry_at(&path).await;
    reopened
        .load_or_create("visits", LearnerKind::Shortcut, LearnerParams::default())
        .await
        .expect("Failed to register learner");
    let shortcuts = reopened
        .predict("visits", LearnerQuery::Shortcuts { prefix: None })
        .await
        .expect("Failed to predict")
        .shortcuts()
        .expect("wrong prediction variant");
    assert_eq!(shortcuts[0].item, "house/kitchen");
}

#[tokio::test]
async fn test_auto_rpc_score_rises_with_rewards_and_persists() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("learners.json");
    let signature = alarm_signature();

    let registry = registry_at(&path).await;
    registry
        .load_or_create("auto-status", LearnerKind::AutoRpc, LearnerParams::default())
        .await
        .expect("Failed to register learner");

    let query = LearnerQuery::RpcScore {
        object_name: "house/alarm".to_string(),
        method_name: "Status".to_string(),
        signature: signature.clone(),
    };
    let untrained = registry
        .predict("auto-status", query.clone())
        .await
        .expect("Failed to predict")
        .score()
        .expect("wrong prediction variant");
    assert_eq!(untrained, 0.0);

    for _ in 0..20 {
        registry
            .update(
                "auto-status",
                LearnerInput::RpcOutcome {
                    object_name: "house/alarm".to_string(),
                    method_name: "Status".to_string(),
                    signature: signature.clone(),
                    reward: 1.0,
                },
            )
            .await
            .expect("Failed to update learner");
    }
    let trained = registry
        .predict("auto-status", query.clone())
        .await
        .expect("Failed to predict")
        .score()
        .expect("wrong prediction variant");
    assert!(trained > 0.9, "score after training was {}", trained);

    registry.save("auto-status").await.expect("Failed to save learner");
    drop(registry);

    let reopened = registry_at(&path).await;
    reopened
        .load_or_create("auto-status", LearnerKind::AutoRpc, LearnerParams::default())
        .await
        .expect("Failed to register learner");
    let recalled = reopened
        .predict("auto-status", query)
        .await
        .expect("Failed to predict")
        .score()
        .expect("wrong prediction variant");
    assert!((recalled - trained).abs() < 1e-9);
}

#[tokio::test]
async fn test_method_input_suggests_strongest_values_first() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let registry = registry_at(&dir.path().join("learners.json")).await;
    registry
        .load_or_create(
            "input-duration",
            LearnerKind::MethodInput,
            LearnerParams::default(),
        )
        .await
        .expect("Failed to register learner");

    let signature = sprinkler_signature();
    for value in ["30", "30", "90"] {
        registry
            .update(
                "input-duration",
                LearnerInput::MethodValue {
                    signature: signature.clone(),
                    method_name: "Start".to_string(),
                    arg_name: Some("durationSeconds".to_string()),
                    value: value.to_string(),
                    reset: false,
                },
            )
            .await
            .expect("Failed to update learner");
    }

    let values = registry
        .predict(
            "input-duration",
            LearnerQuery::MethodValues {
                signature: signature.clone(),
                method_name: "Start".to_string(),
                arg_name: Some("durationSeconds".to_string()),
            },
        )
        .await
        .expect("Failed to predict")
        .values()
        .expect("wrong prediction variant");
    assert_eq!(values, vec!["30".to_string(), "90".to_string()]);

    // Values learned for one argument do not leak into another.
    let other = registry
        .predict(
            "input-duration",
            LearnerQuery::MethodValues {
                signature,
                method_name: "Start".to_string(),
                arg_name: Some("zone".to_string()),
            },
        )
        .await
        .expect("Failed to predict")
        .values()
        .expect("wrong prediction variant");
    assert!(other.is_empty());
}

#[tokio::test]
async fn test_method_invocation_returns_only_the_top_candidate() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let registry = registry_at(&dir.path().join("learners.json")).await;
    registry
        .load_or_create(
            "invocations",
            LearnerKind::MethodInvocation,
            LearnerParams::default(),
        )
        .await
        .expect("Failed to register learner");

    let signature = sprinkler_signature();
    for value in [r#"["30"]"#, r#"["30"]"#, r#"["90"]"#] {
        registry
            .update(
                "invocations",
                LearnerInput::MethodValue {
                    signature: signature.clone(),
                    method_name: "Start".to_string(),
                    arg_name: None,
                    value: value.to_string(),
                    reset: false,
                },
            )
            .await
            .expect("Failed to update learner");
    }

    // The invocation learner caps its suggestions at one.
    let values = registry
        .predict(
            "invocations",
            LearnerQuery::MethodValues {
                signature,
                method_name: "Start".to_string(),
                arg_name: None,
            },
        )
        .await
        .expect("Failed to predict")
        .values()
        .expect("wrong prediction variant");
    assert_eq!(values, vec![r#"["30"]"#.to_string()]);
}

#[tokio::test]
async fn test_updates_are_persisted_without_an_explicit_save() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("learners.json");
    let store: Arc<dyn KeyValueStore> =
        Arc::new(JsonFileStore::open(&path).await.expect("Failed to open store"));

    let registry = LearnerRegistry::new(Arc::clone(&store));
    registry
        .load_or_create("visits", LearnerKind::Shortcut, LearnerParams::default())
        .await
        .expect("Failed to register learner");
    registry
        .update("visits", visit("house"))
        .await
        .expect("Failed to update learner");

    // Persistence runs in the background; give it a moment to land.
    let mut snapshot = None;
    for _ in 0..100 {
        snapshot = store.get_value("visits").await.expect("Failed to read store");
        if snapshot.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let snapshot = snapshot.expect("update was never persisted");
    assert_eq!(snapshot["type"], "shortcut");
}

#[tokio::test]
async fn test_wider_k_applies_over_a_stored_learner() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("learners.json");

    let registry = registry_at(&path).await;
    registry
        .load_or_create("visits", LearnerKind::Shortcut, LearnerParams::default())
        .await
        .expect("Failed to register learner");
    for name in ["alpha", "beta", "gamma"] {
        registry
            .update("visits", visit(name))
            .await
            .expect("Failed to update learner");
    }
    // The default learner recommends a single name.
    let narrow = registry
        .predict("visits", LearnerQuery::Shortcuts { prefix: None })
        .await
        .expect("Failed to predict")
        .shortcuts()
        .expect("wrong prediction variant");
    assert_eq!(narrow.len(), 1);
    registry.save("visits").await.expect("Failed to save learner");
    drop(registry);

    let reopened = registry_at(&path).await;
    reopened
        .load_or_create(
            "visits",
            LearnerKind::Shortcut,
            LearnerParams::default().with_k(3),
        )
        .await
        .expect("Failed to register learner");
    let wide = reopened
        .predict("visits", LearnerQuery::Shortcuts { prefix: None })
        .await
        .expect("Failed to predict")
        .shortcuts()
        .expect("wrong prediction variant");
    assert_eq!(wide.len(), 3);
}

#[tokio::test]
async fn test_reset_wipes_the_snapshot_on_disk() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("learners.json");

    let registry = registry_at(&path).await;
    registry
        .load_or_create("visits", LearnerKind::Shortcut, LearnerParams::default())
        .await
        .expect("Failed to register learner");
    registry
        .update("visits", visit("house"))
        .await
        .expect("Failed to update learner");
    registry.save("visits").await.expect("Failed to save learner");
    registry.reset("visits").await.expect("Failed to reset learner");
    drop(registry);

    let reopened = registry_at(&path).await;
    reopened
        .load_or_create("visits", LearnerKind::Shortcut, LearnerParams::default())
        .await
        .expect("Failed to register learner");
    let shortcuts = reopened
        .predict("visits", LearnerQuery::Shortcuts { prefix: None })
        .await
        .expect("Failed to predict")
        .shortcuts()
        .expect("wrong prediction variant");
    assert!(shortcuts.is_empty());
}
