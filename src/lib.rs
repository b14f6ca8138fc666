pub(crate) mod api;
pub mod client;
pub(crate) mod core;
pub mod db;
pub(crate) mod repositories;
pub mod schemas;
pub mod services;
pub(crate) mod tasks;

#[cfg(test)]
mod test_support;

use crate::core::{config::Settings, state::AppState, telemetry};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings, "api")?;
    core::metrics::init(&settings)?;

    let db_pool = db::init_pool(&settings).await?;
    db::run_migrations(&db_pool).await?;

    let state = AppState::new(settings, db_pool);
    let app = api::router::router(state.clone());
    let server = state.settings().server();
    let listener = tokio::net::TcpListener::bind(server.addr()).await?;

    tracing::info!(
        host = %server.host,
        port = server.port,
        environment = %state.settings().runtime().environment.as_str(),
        "Classroom attempts API listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(core::shutdown::shutdown_signal("api")).await?;

    state.db().close().await;
    tracing::info!("Database pool closed");

    Ok(())
}

pub async fn run_worker() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings, "worker")?;
    core::metrics::init(&settings)?;

    let db_pool = db::init_pool(&settings).await?;
    db::run_migrations(&db_pool).await?;

    let state = AppState::new(settings, db_pool);
    let result = tasks::scheduler::run(state.clone()).await;

    state.db().close().await;
    tracing::info!("Database pool closed");

    result
}
