use std::sync::Arc;

use dotenvy::dotenv;
use log::info;

use contactserver::api_router::configure_api_routes;
use contactserver::config::AppConfig;
use contactserver::shared::state::AppState;
use contactserver::shared::utils::{create_conn, run_migrations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();

    let pool = create_conn(&config.database_url())?;
    run_migrations(&pool)?;

    let state = Arc::new(AppState {
        conn: pool,
        auth: config.auth.clone(),
    });

    let app = configure_api_routes().with_state(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting HTTP server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
