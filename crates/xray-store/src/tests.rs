//! Tests for the repository

use super::*;
use serde_json::json;
use xray_core::trace::into_metadata;
use xray_core::{NewStep, NewTrace, StepId, TraceId, TraceStatus, TraceStore};

fn new_trace(name: &str) -> NewTrace {
    NewTrace {
        name: name.to_string(),
        metadata: into_metadata(json!({"user_id": "u1"})),
    }
}

fn new_step(trace_id: &TraceId, name: &str, order_index: i64) -> NewStep {
    NewStep {
        trace_id: trace_id.clone(),
        step_name: name.to_string(),
        status: "COMPLETED".to_string(),
        input: json!({"n": order_index}),
        output: json!({}),
        reasoning: None,
        parent_step_id: None,
        started_at: None,
        ended_at: None,
        order_index,
    }
}

#[test]
fn test_default_data_dir() {
    let dir = default_data_dir();
    assert!(dir.to_string_lossy().contains(".xray"));
    assert!(default_db_path().ends_with("xray.db"));
}

#[test]
fn test_error_status_codes() {
    assert_eq!(StoreError::NotFound("trace t1".into()).status().as_u16(), 404);
    assert_eq!(StoreError::InvalidInput("x".into()).status().as_u16(), 400);
    assert_eq!(StoreError::Database("x".into()).status().as_u16(), 500);

    let core: xray_core::Error = StoreError::NotFound("trace t1".into()).into();
    assert!(core.is_not_found());
    let core: xray_core::Error = StoreError::InvalidInput("bad".into()).into();
    assert!(matches!(core, xray_core::Error::Store { status: 400, .. }));
}

#[tokio::test]
async fn test_in_memory_repository() {
    let repo = TraceRepository::in_memory().await.unwrap();

    let trace = repo
        .create_trace(&new_trace("Content Recommendation"))
        .await
        .unwrap();
    assert_eq!(trace.status, TraceStatus::Running);

    let retrieved = repo.get_trace(&trace.id).await.unwrap();
    assert_eq!(retrieved.id, trace.id);
    assert_eq!(retrieved.name, "Content Recommendation");
    assert_eq!(retrieved.metadata["user_id"], "u1");
    assert_eq!(retrieved.completed_at, None);
}

#[tokio::test]
async fn test_trace_store_impl_maps_errors() {
    let repo = TraceRepository::in_memory().await.unwrap();
    let store: &dyn TraceStore = &repo;

    let id = store.create_trace(&new_trace("via trait")).await.unwrap();
    store.create_step(&new_step(&id, "only", 0)).await.unwrap();
    assert_eq!(store.get_trace_detail(&id).await.unwrap().steps.len(), 1);

    let missing = store
        .get_trace_detail(&TraceId::new("missing"))
        .await
        .unwrap_err();
    assert!(missing.is_not_found());

    let rejected = store.create_trace(&new_trace("")).await.unwrap_err();
    assert!(matches!(
        rejected,
        xray_core::Error::Store { status: 400, .. }
    ));
}

#[tokio::test]
async fn test_rejects_empty_names() {
    let repo = TraceRepository::in_memory().await.unwrap();

    let err = repo.create_trace(&new_trace("  ")).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput(_)));

    let trace = repo.create_trace(&new_trace("t")).await.unwrap();
    let err = repo.create_step(&new_step(&trace.id, "", 0)).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput(_)));
}

#[tokio::test]
async fn test_status_updates_last_write_wins() {
    let repo = TraceRepository::in_memory().await.unwrap();
    let trace = repo.create_trace(&new_trace("finish")).await.unwrap();

    repo.update_trace_status(&trace.id, &TraceStatus::Completed)
        .await
        .unwrap();
    let updated = repo
        .update_trace_status(&trace.id, &TraceStatus::Failed)
        .await
        .unwrap();

    assert_eq!(updated.status, TraceStatus::Failed);
    assert!(updated.completed_at.is_some());

    let err = repo
        .update_trace_status(&TraceId::new("missing"), &TraceStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_steps_ordered_by_index_then_arrival() {
    let repo = TraceRepository::in_memory().await.unwrap();
    let trace = repo.create_trace(&new_trace("order")).await.unwrap();

    for (name, index) in [("c", 2), ("first-1", 1), ("a", 0), ("second-1", 1)] {
        repo.create_step(&new_step(&trace.id, name, index))
            .await
            .unwrap();
    }

    let steps = repo.list_steps(&trace.id).await.unwrap();
    let names: Vec<&str> = steps.iter().map(|s| s.step_name.as_str()).collect();
    assert_eq!(names, vec!["a", "first-1", "second-1", "c"]);
    assert_eq!(steps[0].input, json!({"n": 0}));
}

#[tokio::test]
async fn test_step_requires_existing_trace_and_parent() {
    let repo = TraceRepository::in_memory().await.unwrap();

    let err = repo
        .create_step(&new_step(&TraceId::new("missing"), "orphan", 0))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    let first = repo.create_trace(&new_trace("first")).await.unwrap();
    let second = repo.create_trace(&new_trace("second")).await.unwrap();
    let root = repo
        .create_step(&new_step(&first.id, "root", 0))
        .await
        .unwrap();

    let mut cross = new_step(&second.id, "cross", 0);
    cross.parent_step_id = Some(root.id.clone());
    let err = repo.create_step(&cross).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput(_)));

    let mut dangling = new_step(&first.id, "dangling", 1);
    dangling.parent_step_id = Some(StepId::new("nope"));
    assert!(repo.create_step(&dangling).await.is_err());

    let mut child = new_step(&first.id, "child", 1);
    child.parent_step_id = Some(root.id.clone());
    let child = repo.create_step(&child).await.unwrap();
    assert_eq!(child.parent_step_id, Some(root.id));
}

#[tokio::test]
async fn test_reasoning_round_trips_distinctly() {
    let repo = TraceRepository::in_memory().await.unwrap();
    let trace = repo.create_trace(&new_trace("reasoning")).await.unwrap();

    let absent = new_step(&trace.id, "absent", 0);
    let mut empty = new_step(&trace.id, "empty", 1);
    empty.reasoning = Some(String::new());
    let mut explained = new_step(&trace.id, "explained", 2);
    explained.reasoning = Some("because".to_string());

    for step in [absent, empty, explained] {
        repo.create_step(&step).await.unwrap();
    }

    let detail = repo.get_trace_detail(&trace.id).await.unwrap();
    assert_eq!(detail.steps[0].reasoning, None);
    assert_eq!(detail.steps[1].reasoning, Some(String::new()));
    assert_eq!(detail.steps[2].reasoning.as_deref(), Some("because"));
}

#[tokio::test]
async fn test_list_traces_most_recent_first() {
    let repo = TraceRepository::in_memory().await.unwrap();
    let older = repo.create_trace(&new_trace("older")).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let newer = repo.create_trace(&new_trace("newer")).await.unwrap();

    let traces = repo.list_traces().await.unwrap();
    assert_eq!(traces.len(), 2);
    assert_eq!(traces[0].id, newer.id);
    assert_eq!(traces[1].id, older.id);
}

#[tokio::test]
async fn test_from_path_persists() {
    let dir = std::env::temp_dir().join(format!("xray-store-test-{}", uuid::Uuid::new_v4()));
    let path = dir.join("xray.db");

    let id = {
        let repo = TraceRepository::from_path(&path).await.unwrap();
        repo.create_trace(&new_trace("persisted")).await.unwrap().id
    };

    let reopened = TraceRepository::from_path(&path).await.unwrap();
    assert_eq!(reopened.get_trace(&id).await.unwrap().name, "persisted");

    let _ = std::fs::remove_dir_all(dir);
}
