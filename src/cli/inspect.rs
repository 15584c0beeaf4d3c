//! Trace inspection commands
//!
//! `xray traces` and `xray show` read through the Reconstructor and always
//! end in a printed terminal state, including on failure.

use anyhow::Result;
use xray_core::TraceId;
use xray_viewer::{Reconstructor, TraceDetail, TraceLookup};

use crate::server::AppConfig;

/// List all traces
pub async fn list(config: &AppConfig) -> Result<()> {
    let reconstructor = Reconstructor::http(config.client.store_config())?;
    let listing = reconstructor.list_traces().await;

    println!("\n🔬 Traces\n");

    if let Some(err) = listing.fetch_error() {
        println!("  ❌ Failed to load traces: {}", err);
        println!("  Is the store running? Start it with: xray serve");
        println!();
        return Ok(());
    }

    if listing.len() == 0 {
        println!("  No traces recorded yet.");
        println!("  Record one with: xray demo");
        println!();
        return Ok(());
    }

    for summary in listing {
        println!(
            "  {} {:<10} {:<28} {}  {}",
            status_icon(summary.status.as_str()),
            summary.status.as_str(),
            summary.name,
            summary.started_at.format("%Y-%m-%d %H:%M:%S"),
            summary.short_id,
        );
    }
    println!();

    Ok(())
}

/// Show one trace, optionally selecting a step by position
pub async fn show(config: &AppConfig, trace_id: &TraceId, step: Option<usize>) -> Result<()> {
    let reconstructor = Reconstructor::http(config.client.store_config())?;

    match reconstructor.get_trace_detail(trace_id).await {
        TraceLookup::Loaded(mut detail) => {
            if let Some(index) = step {
                if !detail.select_index(index) {
                    println!(
                        "⚠️  Trace has {} steps; showing the first",
                        detail.steps().len()
                    );
                }
            }
            render(&detail);
        }
        TraceLookup::NotFound(id) => println!("❌ Trace not found: {}", id),
        TraceLookup::Failed(message) => println!("❌ Failed to load trace: {}", message),
    }

    Ok(())
}

/// Print a trace's header, timeline and selected step
pub fn render(detail: &TraceDetail) {
    let trace = detail.trace();

    println!("\n🔬 {} ({})\n", trace.name, trace.id.short());
    println!("  Status:   {} {}", status_icon(trace.status.as_str()), trace.status);
    println!("  Started:  {}", trace.started_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(completed_at) = trace.completed_at {
        println!("  Finished: {}", completed_at.format("%Y-%m-%d %H:%M:%S"));
    }
    if !trace.metadata.is_empty() {
        println!(
            "  Metadata: {}",
            serde_json::Value::Object(trace.metadata.clone())
        );
    }

    println!("\n  Timeline ({} steps)\n", detail.steps().len());
    if detail.is_empty() {
        println!("  No steps recorded.");
        println!();
        return;
    }

    for entry in detail.timeline() {
        let marker = if entry.selected { "▶" } else { " " };
        let duration = entry
            .duration_ms
            .map(|ms| format!("{}ms", ms))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {} {:>2}. {} {:<20} {:>8}  {}",
            marker,
            entry.order_index,
            status_icon(&entry.status),
            entry.step_name,
            duration,
            entry.reasoning_preview,
        );
    }

    if let Some(step) = detail.selected_detail() {
        println!("\n  Step: {} [{}]", step.step_name, step.status);
        if step.shows_reasoning_panel() {
            println!("\n  Reasoning:\n    {}", step.reasoning.unwrap_or_default());
        }
        println!("\n  Input:\n{}", indent(&step.input));
        println!("\n  Output:\n{}", indent(&step.output));
    }
    println!();
}

fn status_icon(status: &str) -> &'static str {
    match status {
        "COMPLETED" => "✅",
        "FAILED" => "❌",
        "RUNNING" => "⏳",
        _ => "•",
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
