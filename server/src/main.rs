//! Restaurant manager server: reads settings from the environment (and `.env`), connects,
//! applies migrations and serves the category API.
//!
//! Run from repo root: `cargo run -p restaurant-server`

use restaurant_manager::{app, apply_migrations, connect, AppState, Settings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("restaurant_manager=info,restaurant_server=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let conn = connect(&settings.database_url, settings.db_max_connections).await?;
    apply_migrations(conn.as_ref(), &settings.table_prefix).await?;

    let state = AppState::new(conn, &settings.table_prefix)?;
    let router = app(state, &settings);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!(
        "listening on {} (api at {})",
        listener.local_addr()?,
        if settings.api_namespace.is_empty() { "/" } else { settings.api_namespace.as_str() }
    );
    axum::serve(listener, router).await?;
    Ok(())
}
