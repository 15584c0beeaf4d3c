//! Integration tests for X-Ray
//!
//! These tests drive the whole system over HTTP:
//! - xray-store: reference store on an ephemeral port
//! - xray-sdk: Recorder writing through HttpStore
//! - xray-viewer: Reconstructor reading it back

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;
use serde_json::json;
use tokio::net::TcpListener;
use xray_core::{StoreConfig, TraceId, TraceStatus};
use xray_sdk::{Recorder, StepFields};
use xray_store::TraceRepository;
use xray_viewer::{Reconstructor, TraceLookup};

async fn start_store() -> StoreConfig {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let repo = TraceRepository::in_memory().await.unwrap();
    tokio::spawn(xray_store::serve(listener, repo));

    StoreConfig::default()
        .with_base_url(format!("http://{addr}/api"))
        .with_timeout(Duration::from_secs(2))
}

// ============================================================================
// End-to-end recording and reconstruction
// ============================================================================

#[tokio::test]
async fn test_content_recommendation_round_trip() {
    let config = start_store().await;
    let recorder = Recorder::http(config.clone()).unwrap();
    let viewer = Reconstructor::http(config).unwrap();

    let id = recorder
        .start_trace("Content Recommendation", json!({"user_id": "u1"}))
        .await
        .unwrap();

    let running = viewer.get_trace_detail(&id).await.loaded().unwrap();
    assert_eq!(running.trace().status, TraceStatus::Running);
    assert_eq!(running.trace().metadata["user_id"], "u1");

    // Sent concurrently and in reverse, so arrival order is not index order
    let steps = (0..4).rev().map(|index| {
        let mut fields = StepFields::new(format!("step_{index}")).order_index(index);
        if index == 3 {
            fields = fields.output(json!({
                "top_3": ["Interstellar", "The Martian", "Gone Girl"]
            }));
        }
        recorder.add_step(Some(&id), fields)
    });
    let step_ids = futures::future::join_all(steps).await;
    assert!(step_ids.iter().all(Option::is_some));

    recorder.complete_trace(Some(&id)).await;

    let listed: Vec<_> = viewer.list_traces().await.collect();
    let summary = listed.iter().find(|t| t.id == id).unwrap();
    assert_eq!(summary.status, TraceStatus::Completed);
    assert_eq!(summary.name, "Content Recommendation");

    let detail = viewer.get_trace_detail(&id).await.loaded().unwrap();
    let indices: Vec<i64> = detail.steps().iter().map(|s| s.order_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    assert_eq!(detail.cursor().index(), Some(0));
    assert_eq!(detail.selected().unwrap().step_name, "step_0");

    let last = &detail.steps()[3];
    assert_eq!(last.output["top_3"].as_array().unwrap().len(), 3);
    assert_eq!(last.status, "COMPLETED");
    assert_eq!(last.input, json!({}));
}

#[tokio::test]
async fn test_last_finish_wins() {
    let config = start_store().await;
    let recorder = Recorder::http(config.clone()).unwrap();
    let viewer = Reconstructor::http(config).unwrap();

    let id = recorder.start_trace("retry", json!(null)).await.unwrap();
    recorder.fail_trace(Some(&id)).await;
    recorder.complete_trace(Some(&id)).await;

    let detail = viewer.get_trace_detail(&id).await.loaded().unwrap();
    assert_eq!(detail.trace().status, TraceStatus::Completed);
    assert!(detail.trace().completed_at.is_some());
    assert!(detail.is_empty());
    assert!(detail.selected().is_none());
}

#[tokio::test]
async fn test_reasoning_presence_survives_the_wire() {
    let config = start_store().await;
    let recorder = Recorder::http(config.clone()).unwrap();
    let viewer = Reconstructor::http(config).unwrap();

    let id = recorder.start_trace("reasoning", json!({})).await.unwrap();
    recorder
        .add_step(Some(&id), StepFields::new("silent").order_index(0))
        .await
        .unwrap();
    recorder
        .add_step(
            Some(&id),
            StepFields::new("blank").reasoning("").order_index(1),
        )
        .await
        .unwrap();

    let mut detail = viewer.get_trace_detail(&id).await.loaded().unwrap();
    assert!(!detail.selected_detail().unwrap().shows_reasoning_panel());

    assert!(detail.select_index(1));
    let blank = detail.selected_detail().unwrap();
    assert!(blank.shows_reasoning_panel());
    assert_eq!(blank.reasoning.as_deref(), Some(""));
}

#[tokio::test]
async fn test_step_parent_chain() {
    let config = start_store().await;
    let recorder = Recorder::http(config.clone()).unwrap();
    let viewer = Reconstructor::http(config).unwrap();

    let id = recorder.start_trace("tree", json!({})).await.unwrap();
    let root = recorder
        .add_step(Some(&id), StepFields::new("root"))
        .await
        .unwrap();
    recorder
        .add_step(
            Some(&id),
            StepFields::new("child").parent(root.clone()).order_index(1),
        )
        .await
        .unwrap();

    // Unknown parent is rejected by the store and swallowed by the recorder
    let orphan = recorder
        .add_step(
            Some(&id),
            StepFields::new("orphan").parent("nowhere".into()).order_index(2),
        )
        .await;
    assert!(orphan.is_none());

    let detail = viewer.get_trace_detail(&id).await.loaded().unwrap();
    let timeline = detail.timeline();
    assert_eq!(timeline.len(), 2);
    assert!(timeline[0].has_children);
    assert_eq!(detail.steps()[1].parent_step_id.as_ref(), Some(&root));
}

#[tokio::test]
async fn test_unknown_trace_is_not_found_over_http() {
    let viewer = Reconstructor::http(start_store().await).unwrap();

    let lookup = viewer.get_trace_detail(&TraceId::new("missing")).await;
    assert!(matches!(lookup, TraceLookup::NotFound(_)));
}

// ============================================================================
// Store outages
// ============================================================================

#[tokio::test]
async fn test_store_down_makes_zero_follow_up_calls() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().fallback(move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            StatusCode::SERVICE_UNAVAILABLE
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    let recorder = Recorder::http(
        StoreConfig::default().with_base_url(format!("http://{addr}/api")),
    )
    .unwrap();

    let id = recorder
        .start_trace("Content Recommendation", json!({"user_id": "u1"}))
        .await;
    assert!(id.is_none());

    for index in 0..3 {
        let step = recorder
            .add_step(id.as_ref(), StepFields::new("skipped").order_index(index))
            .await;
        assert!(step.is_none());
    }
    recorder.finish_trace(id.as_ref(), "COMPLETED").await;

    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unreachable_store_fails_open() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = StoreConfig::default()
        .with_base_url(format!("http://{addr}/api"))
        .with_timeout(Duration::from_millis(500));
    let recorder = Recorder::http(config.clone()).unwrap();
    let viewer = Reconstructor::http(config).unwrap();

    assert!(recorder.start_trace("offline", json!({})).await.is_none());

    let listing = viewer.list_traces().await;
    assert!(listing.is_failed());
    assert_eq!(listing.len(), 0);

    let lookup = viewer.get_trace_detail(&TraceId::new("anything")).await;
    assert!(matches!(lookup, TraceLookup::Failed(_)));
}
