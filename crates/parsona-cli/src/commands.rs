//! Command handlers. Each one loads configuration itself so commands that do
//! not touch the database (`benchmarks`) run without `DATABASE_URL`.

use std::path::Path;

use anyhow::Context;
use parsona_core::{load_benchmarks, AppConfig, BenchmarkTable};
use parsona_db::PgStore;
use parsona_engine::SyncOptions;
use serde_json::Value;
use uuid::Uuid;

async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = parsona_db::PoolConfig::from_app_config(config);
    parsona_db::connect_pool(&config.database_url, pool_config)
        .await
        .context("failed to connect to database")
}

fn benchmark_table(path: Option<&Path>) -> anyhow::Result<BenchmarkTable> {
    match path {
        Some(path) => load_benchmarks(path)
            .with_context(|| format!("failed to load benchmarks from {}", path.display())),
        None => Ok(BenchmarkTable::builtin()),
    }
}

/// Accepts either a bare array of payloads or `{"activities": [...]}`.
pub(crate) fn parse_activities(raw: &str) -> anyhow::Result<Vec<Value>> {
    match serde_json::from_str::<Value>(raw).context("activity file is not valid JSON")? {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("activities") {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => anyhow::bail!("`activities` must be an array"),
            None => anyhow::bail!("expected an array or an object with an `activities` array"),
        },
        _ => anyhow::bail!("expected an array or an object with an `activities` array"),
    }
}

pub(crate) async fn run_migrate() -> anyhow::Result<()> {
    let config = parsona_core::load_app_config()?;
    let pool = connect(&config).await?;
    let applied = parsona_db::run_migrations(&pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}

pub(crate) async fn run_sync(user_id: Uuid, file: Option<&Path>) -> anyhow::Result<()> {
    let config = parsona_core::load_app_config()?;
    let activities = match file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            parse_activities(&raw)?
        }
        None => Vec::new(),
    };
    tracing::info!(user_id = %user_id, offered = activities.len(), "syncing activities");

    let store = PgStore::new(connect(&config).await?);
    let options = SyncOptions {
        simulate_on_empty: config.simulate_on_empty,
    };
    let outcome = parsona_engine::sync_activities(&store, &options, user_id, activities).await?;

    match &outcome.pipeline {
        Some(result) => println!(
            "synced {} new item(s); brand score {} (signal {}, score {})",
            outcome.new_items, result.score.brand_score, result.signal.id, result.score.id
        ),
        None => println!("synced {} new item(s); no data to score", outcome.new_items),
    }
    Ok(())
}

pub(crate) async fn run_dashboard(user_id: Uuid, persona: &str) -> anyhow::Result<()> {
    let config = parsona_core::load_app_config()?;
    let table = benchmark_table(config.benchmarks_path.as_deref())?;
    let store = PgStore::new(connect(&config).await?);

    let view = parsona_engine::dashboard(&store, &table, user_id, persona).await?;
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

pub(crate) fn run_benchmarks(path: Option<&Path>) -> anyhow::Result<()> {
    let table = benchmark_table(path)?;
    print!("{}", serde_yaml::to_string(&table.to_file())?);
    Ok(())
}
