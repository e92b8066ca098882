mod api;
mod detection;
mod middleware;
mod scheduler;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    detection::DetectionRunner,
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = airadar_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = airadar_db::PoolConfig::from_app_config(&config);
    let pool = airadar_db::connect_pool(&config.database_url, pool_config).await?;
    airadar_db::run_migrations(&pool).await?;

    let engine = airadar_trend::Engine::from_app_config(pool.clone(), &config)?;
    let runner = DetectionRunner::new(engine, config.trend_min_score);

    let _scheduler = scheduler::build_scheduler(runner.clone(), &config.trend_cron).await?;

    let auth = AuthState::from_app_config(&config);
    let app = build_app(AppState { pool, runner }, auth);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "airadar server listening");
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
