//! Detection and read-only query handlers.

use airadar_core::{AppConfig, SourceType, Trend};
use sqlx::PgPool;

/// Longest title shown in table output, in characters.
const TITLE_WIDTH: usize = 60;

/// Run one detection cycle against the database and print the trends.
///
/// Alerts are not dispatched from the CLI; the server's scheduled job owns that.
/// This run does not take the server's detection lock.
///
/// # Errors
///
/// Returns an error if the engine cannot be built or detection fails at the
/// store level.
pub(crate) async fn run_detect(pool: PgPool, config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let engine = airadar_trend::Engine::from_app_config(pool, config)?;
    if !engine.llm_enabled() {
        tracing::info!("no LLM provider configured; detecting without pre-filter");
    }
    let trends = engine.detect().await?;
    print_trends(&trends, json)
}

/// Print stored trends.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_trends(
    pool: &PgPool,
    min_score: Option<f64>,
    limit: i64,
    json: bool,
) -> anyhow::Result<()> {
    let filter = airadar_db::TrendFilter {
        min_score,
        limit: Some(limit),
        unalerted: false,
    };
    let trends = airadar_db::list_trends(pool, &filter).await?;
    print_trends(&trends, json)
}

/// Print recently collected items, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_items(
    pool: &PgPool,
    source: Option<SourceType>,
    limit: i64,
) -> anyhow::Result<()> {
    let filter = airadar_db::ListItemsFilter {
        source,
        since: None,
        limit: Some(limit),
    };
    let items = airadar_db::list_items(pool, &filter).await?;

    if items.is_empty() {
        println!("no items found");
        return Ok(());
    }

    println!("{:<12}{:<18}{:>8}  TITLE", "SOURCE", "COLLECTED", "SCORE");
    for item in &items {
        println!(
            "{:<12}{:<18}{:>8}  {}",
            item.source,
            item.collected_at.format("%Y-%m-%d %H:%M"),
            item.score,
            truncate(&item.title, TITLE_WIDTH)
        );
    }
    Ok(())
}

fn print_trends(trends: &[Trend], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(trends)?);
        return Ok(());
    }

    if trends.is_empty() {
        println!("no trends found");
        return Ok(());
    }

    for line in trend_table(trends) {
        println!("{line}");
    }
    Ok(())
}

fn trend_table(trends: &[Trend]) -> Vec<String> {
    let mut lines = Vec::with_capacity(trends.len() + 1);
    lines.push(format!(
        "{:>4}  {:>7}  {:>7}  {:>5}  TOPIC",
        "#", "SCORE", "SOURCES", "ITEMS"
    ));
    for (rank, trend) in trends.iter().enumerate() {
        lines.push(format!(
            "{:>4}  {:>7.1}  {:>7}  {:>5}  {}{}",
            rank + 1,
            trend.score,
            trend.source_count,
            trend.item_ids.len(),
            truncate(&trend.topic, TITLE_WIDTH),
            if trend.alerted { " [alerted]" } else { "" }
        ));
    }
    lines
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => format!("{}\u{2026}", &s[..cut]),
        None => s.to_string(),
    }
}
