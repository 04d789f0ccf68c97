mod api;
mod auth;
mod db;
mod error;
mod models;
mod review;
mod session;
mod stats;

use api::ApiState;
use db::Db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://flipdeck.db?mode=rwc".to_string());
    let db = Db::connect(&database_url).await?;

    let state = ApiState::new(db);
    let router = api::app_router(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("flipdeck listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}
