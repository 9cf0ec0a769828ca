//! Shared test plumbing: the real router wired to a lazily connected pool,
//! so the auth and validation gates can be exercised without a database.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use askboard::{AppState, config::Config, create_app};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tempfile::TempDir;
use tower::ServiceExt;

#[allow(dead_code)]
pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub db: sqlx::PgPool,
    upload_dir: TempDir,
}

#[allow(dead_code)]
impl TestApp {
    /// Requests rejected before their first query (missing or invalid
    /// tokens, malformed payloads) never touch the pool; anything that does
    /// reach it fails fast instead of waiting out the default timeout.
    pub fn new() -> Self {
        let upload_dir = tempfile::tempdir().expect("Failed to create upload directory");

        let config = Config {
            database_url: "postgres://127.0.0.1:1/askboard_test".to_string(),
            jwt_secret: TEST_JWT_SECRET.to_string(),
            port: 0,
            host: "127.0.0.1".to_string(),
            upload_dir: upload_dir.path().to_string_lossy().into_owned(),
            max_file_size: 1024 * 1024,
            allowed_origins: vec!["http://localhost:3000".to_string()],
        };

        let db = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(100))
            .connect_lazy(&config.database_url)
            .expect("Failed to create lazy pool");

        let state = AppState {
            db: db.clone(),
            config: Arc::new(config),
        };

        Self {
            router: create_app(state),
            db,
            upload_dir,
        }
    }

    /// A TestApp over a real database, migrated and ready. The pool is
    /// exposed so tests can assert directly on rows.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let upload_dir = tempfile::tempdir().expect("Failed to create upload directory");

        let config = Config {
            database_url: database_url.to_string(),
            jwt_secret: TEST_JWT_SECRET.to_string(),
            port: 0,
            host: "127.0.0.1".to_string(),
            upload_dir: upload_dir.path().to_string_lossy().into_owned(),
            max_file_size: 1024 * 1024,
            allowed_origins: vec!["http://localhost:3000".to_string()],
        };

        let db = PgPoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await?;

        askboard::database::run_migrations(&db)
            .await
            .expect("Migrations failed");

        let state = AppState {
            db: db.clone(),
            config: Arc::new(config),
        };

        Ok(Self {
            router: create_app(state),
            db,
            upload_dir,
        })
    }

    pub fn upload_path(&self) -> &Path {
        self.upload_dir.path()
    }
}

/// Helper to make JSON requests.
#[allow(dead_code)]
pub async fn json_request(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    auth_token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = auth_token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let body = match body {
        Some(v) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };

    let request = builder.body(body).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json: Value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
    };

    (status, json)
}
