/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup (migrations) and cleanup
/// - Router construction with real application state
/// - A small JSON request helper returning status + parsed envelope

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use sqlx::PgPool;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use tower::ServiceExt as _;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
}

impl TestContext {
    /// Creates a new test context against the configured database
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../migrations").run(&db).await?;

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Ok(TestContext { db, app })
    }

    /// Cleans up test data
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM tasks").execute(&self.db).await?;
        sqlx::query("DELETE FROM users").execute(&self.db).await?;
        Ok(())
    }

    /// Sends a request, returning the status and the parsed body
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        let builder = Request::builder().method(method).uri(uri);

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.app.clone().oneshot(request).await?;
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok((status, json))
    }
}
