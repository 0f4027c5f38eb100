mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use parsona_core::{load_benchmarks, BenchmarkTable, Environment};
use parsona_engine::{ExplanationGenerator, GeminiClient, SyncOptions};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::{AuthState, RateLimitState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = parsona_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(config = ?config, "starting parsona-server");

    let pool_config = parsona_db::PoolConfig::from_app_config(&config);
    let pool = parsona_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = parsona_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations complete");

    let benchmarks = match &config.benchmarks_path {
        Some(path) => load_benchmarks(path)?,
        None => BenchmarkTable::builtin(),
    };

    let explainer: Option<Arc<dyn ExplanationGenerator>> = match &config.gemini_api_key {
        Some(key) => Some(Arc::new(GeminiClient::new(key, config.explain_timeout_secs)?)),
        None => {
            tracing::info!("GEMINI_API_KEY not set; explanations use canned text");
            None
        }
    };

    let state = AppState {
        store: Arc::new(parsona_db::PgStore::new(pool.clone())),
        pool: Some(pool),
        benchmarks: Arc::new(benchmarks),
        sync_options: SyncOptions {
            simulate_on_empty: config.simulate_on_empty,
        },
        explainer,
    };

    let auth = AuthState::from_env(matches!(config.env, Environment::Development))?;
    let app = build_app(
        state,
        auth,
        RateLimitState::per_minute(config.rate_limit_per_minute),
        Duration::from_secs(config.request_timeout_secs),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
