use dotenvy::dotenv;
use tracing::info;

mod app;
mod common;
mod config;
mod docs;
mod infrastructure;
mod modules;
mod routes;
mod state;
mod workers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting server...");

    let config = config::settings::AppConfig::new()?;
    let db = infrastructure::db::pool::connect_to_db(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let state = state::AppState::new(config, db);
    workers::expiry::spawn_expiry_sweeper(
        state.registry.clone(),
        std::time::Duration::from_secs(state.config.job_retention_secs),
    );

    let addr = format!("0.0.0.0:{}", state.config.server_port);
    let app = app::create_app(state).await;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
