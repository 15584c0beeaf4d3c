//! Content Recommendation demo
//!
//! A small recommendation pipeline instrumented with the Recorder: profile
//! analysis, content fetch, filtering and ranking, one step each.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::json;
use xray_core::{MemoryStore, TraceId};
use xray_sdk::{Recorder, StepFields};
use xray_viewer::Reconstructor;

use super::inspect;
use crate::server::AppConfig;

const USER_ID: &str = "u_78234";

#[derive(Debug, Clone, Serialize)]
struct Content {
    id: &'static str,
    title: &'static str,
    genre: &'static str,
    rating: f64,
    release_year: u16,
}

#[derive(Debug, Serialize)]
struct UserProfile {
    user_id: &'static str,
    preferences: Vec<&'static str>,
    watch_history: Vec<&'static str>,
    age_group: &'static str,
}

#[derive(Debug, Serialize)]
struct Evaluation {
    id: &'static str,
    title: &'static str,
    qualified: bool,
    reject_reason: Option<String>,
}

/// Run the demo against the configured store, or offline
pub async fn run(config: &AppConfig, offline: bool) -> Result<()> {
    println!("\n🎬 Starting Content Recommendation demo...\n");

    if offline {
        let store = Arc::new(MemoryStore::new());
        let recorder = Recorder::new(store.clone());

        if let Some(id) = record(&recorder, &content_pool()).await {
            let reconstructor = Reconstructor::new(store);
            if let Some(detail) = reconstructor.get_trace_detail(&id).await.loaded() {
                inspect::render(&detail);
            }
        }
        return Ok(());
    }

    let recorder = Recorder::http(config.client.store_config())?;
    if let Some(id) = record(&recorder, &content_pool()).await {
        println!("\n  View it with: xray show {}\n", id);
    }

    Ok(())
}

/// Record one pipeline run, finishing the trace `FAILED` if the pipeline errors
async fn record(recorder: &Recorder, pool: &[Content]) -> Option<TraceId> {
    let trace_id = recorder
        .start_trace(
            "Content Recommendation",
            json!({"triggered_by": "homepage_load", "user_id": USER_ID}),
        )
        .await;

    match &trace_id {
        Some(id) => println!("  Trace started: {}", id),
        None => println!("  ⚠️  Tracing unavailable, running untraced"),
    }

    match recommend(recorder, trace_id.as_ref(), pool).await {
        Ok(recommendations) => {
            recorder.complete_trace(trace_id.as_ref()).await;
            let titles: Vec<&str> = recommendations.iter().map(|c| c.title).collect();
            println!("  ✅ Recommendations: {}", titles.join(", "));
        }
        Err(e) => {
            println!("  ❌ Demo failed: {}", e);
            recorder.fail_trace(trace_id.as_ref()).await;
        }
    }

    trace_id
}

async fn recommend(
    recorder: &Recorder,
    trace_id: Option<&TraceId>,
    pool: &[Content],
) -> Result<Vec<Content>> {
    let now = Utc::now();
    let ago = |secs: i64| now - Duration::seconds(secs);

    let profile = UserProfile {
        user_id: USER_ID,
        preferences: vec!["sci-fi", "thriller", "documentary"],
        watch_history: vec!["movie_101", "movie_205", "movie_312"],
        age_group: "adult",
    };
    let interests = ["space exploration", "mystery", "true crime"];

    recorder
        .add_step(
            trace_id,
            StepFields::new("profile_analysis")
                .input(json!(profile))
                .output(json!({"inferred_interests": interests, "confidence": 0.87}))
                .reasoning(concat!(
                    "Analyzed watch history and preferences to infer interest ",
                    "in space/mystery content."
                ))
                .order_index(0)
                .started_at(ago(5))
                .ended_at(ago(4)),
        )
        .await;

    recorder
        .add_step(
            trace_id,
            StepFields::new("content_fetch")
                .input(json!({"interests": interests, "limit": 20}))
                .output(json!({"count": pool.len(), "content": pool}))
                .reasoning(format!(
                    "Fetched {} content items matching inferred interests.",
                    pool.len()
                ))
                .order_index(1)
                .started_at(ago(4))
                .ended_at(ago(3)),
        )
        .await;

    let mut passed = Vec::new();
    let evaluations: Vec<Evaluation> = pool
        .iter()
        .map(|item| {
            let reject_reason = if item.genre == "kids" && profile.age_group == "adult" {
                Some("Kids content for adult user".to_string())
            } else if !profile.preferences.contains(&item.genre) {
                Some(format!("Genre \"{}\" not in user preferences", item.genre))
            } else {
                None
            };
            if reject_reason.is_none() {
                passed.push(item.clone());
            }
            Evaluation {
                id: item.id,
                title: item.title,
                qualified: reject_reason.is_none(),
                reject_reason,
            }
        })
        .collect();

    recorder
        .add_step(
            trace_id,
            StepFields::new("apply_filters")
                .input(json!({
                    "content_count": pool.len(),
                    "user_preferences": profile.preferences,
                }))
                .output(json!({
                    "passed": passed.len(),
                    "failed": pool.len() - passed.len(),
                    "evaluations": evaluations,
                }))
                .reasoning("Filtered out kids content and genres not in user preferences.")
                .order_index(2)
                .started_at(ago(3))
                .ended_at(ago(2)),
        )
        .await;

    passed.sort_by(|a, b| {
        b.rating
            .total_cmp(&a.rating)
            .then(b.release_year.cmp(&a.release_year))
    });
    let candidates: Vec<&str> = passed.iter().map(|c| c.title).collect();
    let top = passed
        .first()
        .ok_or_else(|| anyhow!("no content passed the filters"))?;
    let reasoning = format!(
        "Ranked by rating (primary) and recency (secondary). Top pick: \"{}\" with {}★.",
        top.title, top.rating
    );
    let recommendations: Vec<Content> = passed.iter().take(3).cloned().collect();

    recorder
        .add_step(
            trace_id,
            StepFields::new("ranking")
                .input(json!({"candidates": candidates}))
                .output(json!({"top_3": recommendations}))
                .reasoning(reasoning)
                .order_index(3)
                .started_at(ago(2))
                .ended_at(ago(1)),
        )
        .await;

    Ok(recommendations)
}

impl Content {
    fn new(
        id: &'static str,
        title: &'static str,
        genre: &'static str,
        rating: f64,
        release_year: u16,
    ) -> Self {
        Self {
            id,
            title,
            genre,
            rating,
            release_year,
        }
    }
}

fn content_pool() -> Vec<Content> {
    vec![
        Content::new("c_01", "Interstellar", "sci-fi", 4.8, 2014),
        Content::new("c_02", "The Crown", "drama", 4.5, 2016),
        Content::new("c_03", "Making a Murderer", "documentary", 4.3, 2015),
        Content::new("c_04", "Peppa Pig", "kids", 4.9, 2004),
        Content::new("c_05", "The Martian", "sci-fi", 4.6, 2015),
        Content::new("c_06", "Gone Girl", "thriller", 4.4, 2014),
    ]
}
