//! Integration tests for the decision service
//!
//! Covers evaluation, table inspection, edits with rollback and
//! persistence, and hot reload under concurrent evaluation.

mod common;

use common::*;
use std::sync::Arc;
use std::time::Duration;
use tabula_sdk::{
    DecisionServiceBuilder, EditPolicy, ModelStore, PersistStatus, ReplaceStatus,
    RepositoryConfig, SdkError, Value,
};
use tempfile::TempDir;

// ============================================================================
// Evaluation
// ============================================================================

#[tokio::test]
async fn test_evaluate_loan() {
    let service = memory_service(loan_store(), EditPolicy::Queue).await;

    let result = service.evaluate(Some("loan"), facts!("score" => 750.0)).unwrap();
    result.assert_value("approve", Value::Bool(true));
    result.assert_value("risk", Value::from("LOW"));
    assert_eq!(result.artifact_version, 1);
    assert!(result.request_id.starts_with("eval_"));

    let result = service.evaluate(Some("loan"), facts!("score" => 580.0)).unwrap();
    result.assert_value("approve", Value::Bool(false));
    result.assert_value("risk", Value::from("HIGH"));
}

#[tokio::test]
async fn test_evaluate_by_namespace_hint() {
    let service = memory_service(loan_store(), EditPolicy::Queue).await;

    let customer = serde_json::json!({ "tier": "gold" });
    let result = service
        .evaluate(
            Some("https://example.com/pricing"),
            facts!("customer" => customer),
        )
        .unwrap();

    assert_eq!(result.model.name, "pricing");
    result.assert_value("discount", Value::Number(15.0));
}

#[tokio::test]
async fn test_unknown_hint_falls_back_to_first_model() {
    let service = memory_service(loan_store(), EditPolicy::Queue).await;

    let result = service.evaluate(Some("missing"), facts!("score" => 700.0)).unwrap();
    assert_eq!(result.model.name, "loan");
}

#[tokio::test]
async fn test_default_model_wins_over_hint() {
    let service = DecisionServiceBuilder::new()
        .with_store(loan_store())
        .with_default_model("pricing")
        .build()
        .await
        .unwrap();

    let result = service.evaluate(Some("loan"), facts!()).unwrap();
    assert_eq!(result.model.name, "pricing");
    result.assert_no_result("discount");
}

#[tokio::test]
async fn test_type_mismatch_fails_only_that_decision() {
    let service = memory_service(loan_store(), EditPolicy::Queue).await;

    let result = service.evaluate(Some("loan"), facts!("score" => "high")).unwrap();
    result.assert_failed("risk");
    result.assert_failed("approve");
    assert_eq!(result.failures().count(), 2);

    let result = service.evaluate(Some("loan"), facts!()).unwrap();
    result.assert_no_result("risk");
    result.assert_value("approve", Value::Bool(false));
}

#[tokio::test]
async fn test_no_models_available() {
    let service = memory_service(Arc::new(tabula_sdk::MemoryStore::new()), EditPolicy::Queue).await;

    let err = service.evaluate(None, facts!()).unwrap_err();
    assert!(matches!(err, SdkError::RuntimeError(_)));
    assert_eq!(err.to_string(), "Runtime error: No models available");
}

// ============================================================================
// Inspection
// ============================================================================

#[tokio::test]
async fn test_inspection() {
    let service = memory_service(loan_store(), EditPolicy::Queue).await;

    let models = service.list_models().await;
    let names: Vec<_> = models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["loan", "pricing"]);

    let tables = service.list_tables("LOAN").await.unwrap();
    assert_eq!(tables.len(), 2);
    assert!(tables.iter().all(|t| t.has_table));

    let view = service.get_table("Loan", "APPROVE").await.unwrap();
    assert_eq!(view.decision_name, "approve");
    assert_eq!(view.parsed.inputs, vec!["score"]);
    assert_eq!(view.parsed.rules[0].inputs, vec![">= 700"]);
    assert!(view
        .serialized_table
        .as_deref()
        .unwrap_or_default()
        .starts_with("<decisionTable"));

    let schema = service.get_schema("loan").await.unwrap();
    assert_eq!(schema.inputs[0].name, "score");
}

#[tokio::test]
async fn test_lookup_errors() {
    let service = memory_service(loan_store(), EditPolicy::Queue).await;

    assert!(service.get_table("missing", "approve").await.unwrap_err().is_not_found());
    assert!(service.get_table("loan", "missing").await.unwrap_err().is_not_found());
    assert!(service.list_tables("missing").await.unwrap_err().is_not_found());
}

// ============================================================================
// Editing
// ============================================================================

#[tokio::test]
async fn test_replace_table_hot_reloads() {
    let store = loan_store();
    let service = memory_service(store.clone(), EditPolicy::Queue).await;

    let before = service.evaluate(Some("loan"), facts!("score" => 680.0)).unwrap();
    before.assert_value("approve", Value::Bool(false));

    let response = service
        .replace_table("LOAN", "Approve", &approve_table(650), None)
        .await
        .unwrap();

    assert_eq!(response.status, ReplaceStatus::Ok);
    assert_eq!(response.model, "loan");
    assert_eq!(response.decision, "approve");
    assert_eq!(response.version, 2);
    assert!(response.errors.is_empty());
    assert!(matches!(
        response.persistence,
        Some(PersistStatus::Persisted { backup: Some(_) })
    ));

    let after = service.evaluate(Some("loan"), facts!("score" => 680.0)).unwrap();
    after.assert_value("approve", Value::Bool(true));
    assert_eq!(after.artifact_version, 2);

    let document = store.document("loan.dmn").await.unwrap();
    assert!(document.contains("650"));
    let backups = store
        .locations()
        .await
        .into_iter()
        .filter(|l| l.starts_with("loan.dmn.") && l.ends_with(".bak"))
        .count();
    assert_eq!(backups, 1);
}

#[tokio::test]
async fn test_malformed_table_rolls_back() {
    let store = loan_store();
    let service = memory_service(store.clone(), EditPolicy::Queue).await;
    let artifact = service.current_artifact();

    let response = service
        .replace_table("loan", "approve", MALFORMED_TABLE, None)
        .await
        .unwrap();

    assert_eq!(response.status, ReplaceStatus::BuildFailed);
    assert_eq!(response.version, 1);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].code(), "E001");
    assert!(response.persistence.is_none());

    // Nothing changed: artifact, in-memory table and stored document
    assert!(Arc::ptr_eq(&artifact, &service.current_artifact()));
    let view = service.get_table("loan", "approve").await.unwrap();
    assert_eq!(view.parsed.rules[0].inputs, vec![">= 700"]);
    assert_eq!(store.document("loan.dmn").await.unwrap(), LOAN_DMN);
    assert_eq!(store.locations().await.len(), 2);
}

#[tokio::test]
async fn test_malformed_table_still_keeps_test_cases() {
    let store = loan_store();
    let service = memory_service(store.clone(), EditPolicy::Queue).await;
    let cases = serde_json::json!([{ "score": 720, "expected": true }]);

    let response = service
        .replace_table("loan", "approve", MALFORMED_TABLE, Some(&cases))
        .await
        .unwrap();

    assert_eq!(response.status, ReplaceStatus::BuildFailed);
    assert_eq!(response.version, 1);
    assert_eq!(
        response.test_cases.as_deref(),
        Some("loan.dmn.approve.testcases.json")
    );

    let sidecar = store.document("loan.dmn.approve.testcases.json").await.unwrap();
    let stored: serde_json::Value = serde_json::from_str(&sidecar).unwrap();
    assert_eq!(stored, cases);

    // The model document itself is untouched
    assert_eq!(store.document("loan.dmn").await.unwrap(), LOAN_DMN);
}

#[tokio::test]
async fn test_replace_table_validation() {
    let service = memory_service(loan_store(), EditPolicy::Queue).await;

    let err = service.replace_table("loan", "approve", "   ", None).await.unwrap_err();
    assert!(matches!(err, SdkError::Repository(_)));

    let err = service
        .replace_table("loan", "approve", "<decisionTable", None)
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Repository(_)));

    let err = service
        .replace_table("loan", "missing", &approve_table(650), None)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(service.active_version(), 1);
}

#[tokio::test]
async fn test_read_only_document_degrades() {
    let store = loan_store();
    store.set_read_only("loan.dmn", true).await;
    let service = memory_service(store.clone(), EditPolicy::Queue).await;

    let test_cases = serde_json::json!([{ "score": 660, "expected": true }]);
    let response = service
        .replace_table("loan", "approve", &approve_table(650), Some(&test_cases))
        .await
        .unwrap();

    assert_eq!(response.status, ReplaceStatus::PersistDegraded);
    assert!(matches!(
        response.persistence,
        Some(PersistStatus::InMemoryOnly { .. })
    ));
    assert_eq!(response.version, 2);
    assert_eq!(
        response.test_cases.as_deref(),
        Some("loan.dmn.approve.testcases.json")
    );

    // Live in memory, unchanged in the store
    let result = service.evaluate(Some("loan"), facts!("score" => 660.0)).unwrap();
    result.assert_value("approve", Value::Bool(true));
    assert_eq!(store.document("loan.dmn").await.unwrap(), LOAN_DMN);
}

// ============================================================================
// Build lock
// ============================================================================

#[tokio::test]
async fn test_reject_policy_while_building() {
    let service = memory_service(loan_store(), EditPolicy::Reject).await;

    let guard = service.reload_manager().lock().await.unwrap();
    let err = service
        .replace_table("loan", "approve", &approve_table(650), None)
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::BuildInProgress));
    assert!(matches!(service.reload().await, Err(SdkError::BuildInProgress)));

    drop(guard);
    let response = service
        .replace_table("loan", "approve", &approve_table(650), None)
        .await
        .unwrap();
    assert!(response.is_ok());
}

#[tokio::test]
async fn test_queue_policy_waits_for_build() {
    let service = Arc::new(memory_service(loan_store(), EditPolicy::Queue).await);

    let guard = service.reload_manager().lock().await.unwrap();
    let mut edit = {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .replace_table("loan", "approve", &approve_table(650), None)
                .await
        })
    };

    assert!(tokio::time::timeout(Duration::from_millis(50), &mut edit)
        .await
        .is_err());
    assert_eq!(service.active_version(), 1);

    drop(guard);
    let response = edit.await.unwrap().unwrap();
    assert_eq!(response.version, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_evaluation_sees_whole_versions() {
    let service = Arc::new(memory_service(loan_store(), EditPolicy::Queue).await);

    let reader = {
        let service = service.clone();
        tokio::spawn(async move {
            let mut observed = Vec::new();
            for _ in 0..200 {
                let result = service
                    .evaluate(Some("loan"), facts!("score" => 680.0))
                    .unwrap();
                let approved = result.get("approve").and_then(|o| o.value()).cloned();
                observed.push((result.artifact_version, approved));
                tokio::task::yield_now().await;
            }
            observed
        })
    };

    // Odd edits lower the threshold below 680, even edits restore it
    for edit in 1..=6u32 {
        let threshold = if edit % 2 == 1 { 650 } else { 700 };
        let response = service
            .replace_table("loan", "approve", &approve_table(threshold), None)
            .await
            .unwrap();
        assert_eq!(response.version, 1 + edit as u64);
    }

    let observed = reader.await.unwrap();
    let mut last = 0;
    for (version, approved) in observed {
        assert!(version >= last, "version went back from {} to {}", last, version);
        last = version;
        let expected = (version - 1) % 2 == 1;
        assert_eq!(approved, Some(Value::Bool(expected)), "at version {}", version);
    }
    assert_eq!(service.active_version(), 7);
}

// ============================================================================
// Reload
// ============================================================================

#[tokio::test]
async fn test_reload_picks_up_store_changes() {
    let store = Arc::new(tabula_sdk::MemoryStore::new().with_document("loan.dmn", LOAN_DMN));
    let service = memory_service(store.clone(), EditPolicy::Queue).await;
    assert_eq!(service.list_models().await.len(), 1);

    store.write("pricing.dmn", PRICING_DMN).await.unwrap();
    let version = service.reload().await.unwrap();

    assert_eq!(version, 2);
    assert_eq!(service.list_models().await.len(), 2);
    let result = service
        .evaluate(Some("pricing"), facts!("customer" => serde_json::json!({ "tier": "silver" })))
        .unwrap();
    result.assert_value("discount", Value::Number(10.0));
}

#[tokio::test]
async fn test_failed_reload_keeps_current_state() {
    let store = loan_store();
    let service = memory_service(store.clone(), EditPolicy::Queue).await;

    let broken = LOAN_DMN
        .replace("name=\"loan\"", "name=\"broken\"")
        .replace(
            "<rule><inputEntry><text>-</text></inputEntry><outputEntry>",
            "<rule><inputEntry><text>-</text></inputEntry><inputEntry><text>-</text></inputEntry><outputEntry>",
        );
    store.write("broken.dmn", &broken).await.unwrap();

    let err = service.reload().await.unwrap_err();
    assert!(matches!(err, SdkError::Build(_)));
    assert!(err.to_string().starts_with("Build failed with 1 error(s)"));
    assert_eq!(service.active_version(), 1);
    assert_eq!(service.list_models().await.len(), 2);
}

#[tokio::test]
async fn test_reload_discards_unpersisted_edits() {
    let store = loan_store();
    store.set_read_only("loan.dmn", true).await;
    let service = memory_service(store.clone(), EditPolicy::Queue).await;

    service
        .replace_table("loan", "approve", &approve_table(650), None)
        .await
        .unwrap();
    service.reload().await.unwrap();

    let view = service.get_table("loan", "approve").await.unwrap();
    assert_eq!(view.parsed.rules[0].inputs, vec![">= 700"]);
    assert_eq!(service.active_version(), 3);
}

// ============================================================================
// File system
// ============================================================================

#[tokio::test]
async fn test_edit_survives_restart() {
    let dir = TempDir::new().unwrap();
    tokio::fs::write(dir.path().join("loan.dmn"), LOAN_DMN).await.unwrap();
    let config = RepositoryConfig::file_system(dir.path().to_string_lossy());

    let service = DecisionServiceBuilder::new()
        .with_repository(config.clone())
        .build()
        .await
        .unwrap();

    let test_cases = serde_json::json!([{ "score": 660, "expected": true }]);
    let response = service
        .replace_table("loan", "approve", &approve_table(650), Some(&test_cases))
        .await
        .unwrap();
    assert_eq!(response.status, ReplaceStatus::Ok);
    let sidecar = response.test_cases.unwrap();
    assert!(sidecar.ends_with("loan.dmn.approve.testcases.json"));

    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    assert_eq!(names.len(), 3);
    assert!(names.iter().any(|n| n.starts_with("loan.dmn.") && n.ends_with(".bak")));

    let restarted = DecisionServiceBuilder::new()
        .with_repository(config)
        .build()
        .await
        .unwrap();
    let result = restarted
        .evaluate(None, facts!("score" => 660.0))
        .unwrap();
    result.assert_value("approve", Value::Bool(true));
}
