//! # Taskboard API Server
//!
//! This is the main API server for Taskboard, a small task-management
//! backend exposing Users and Tasks over HTTP.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - Task endpoints (list/get/create, status transitions, assignment, soft delete)
//! - User endpoints (list/get/create, assigned-task lookup)
//! - Shared filter/sort/paginate/search query building on list endpoints
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskboard-api
//! ```

use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    sqlx::migrate!("../migrations").run(&pool).await?;

    let addr = config.bind_address();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
