#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tokio::sync::OnceCell;
use tower::ServiceExt;

use travel_log_api::config::AppConfig;
use travel_log_api::database::DatabaseManager;
use travel_log_api::{app, AppState};

/// Settings for a store nobody listens on: any query fails with an unavailable error
fn unreachable_store(key: &str) -> Option<String> {
    match key {
        "POSTGRES_HOST" => Some("127.0.0.1".to_string()),
        "POSTGRES_PORT" => Some("1".to_string()),
        "DATABASE_CONNECTION_TIMEOUT" => Some("1".to_string()),
        _ => None,
    }
}

/// In-process router whose pool can never connect
pub fn offline_app() -> Result<Router> {
    offline_app_with(&[])
}

/// Same as `offline_app`, with extra settings layered on top
pub fn offline_app_with(settings: &[(&'static str, &'static str)]) -> Result<Router> {
    let settings = settings.to_vec();
    let config = AppConfig::from_lookup(move |key| {
        settings
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
            .or_else(|| unreachable_store(key))
    })?;
    let db = DatabaseManager::connect(&config.database)?;
    Ok(app(AppState::new(db, config)))
}

/// Send a raw body with an explicit content type and decode the JSON response
pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    content_type: &str,
    body: impl Into<Body>,
) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", content_type)
        .body(body.into())?;

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json = serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body from {}", uri))?;
    Ok((status, json))
}

static SCHEMA: OnceCell<()> = OnceCell::const_new();

/// In-process router backed by TEST_DATABASE_URL
pub async fn database_app() -> Result<Router> {
    let url = std::env::var("TEST_DATABASE_URL")
        .context("TEST_DATABASE_URL must point at a scratch database for the ignored tests")?;

    let config = AppConfig::from_lookup(move |key| (key == "DATABASE_URL").then(|| url.clone()))?;
    let db = DatabaseManager::connect(&config.database)?;

    SCHEMA
        .get_or_try_init(|| async {
            for statement in include_str!("../../sql/schema.sql").split(';') {
                let has_sql = statement
                    .lines()
                    .any(|line| !line.trim().is_empty() && !line.trim_start().starts_with("--"));
                if has_sql {
                    sqlx::query(statement).execute(db.pool()).await?;
                }
            }
            Ok::<(), sqlx::Error>(())
        })
        .await
        .context("failed to apply sql/schema.sql")?;

    Ok(app(AppState::new(db, config)))
}

/// Send one request through the router and decode the JSON body (Null when empty)
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json)?)
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body)?).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body from {}", uri))?
    };
    Ok((status, json))
}

/// Unique suffix for values under a UNIQUE constraint
pub fn unique(prefix: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!(
        "{}-{}-{}-{}",
        prefix,
        std::process::id(),
        nanos,
        COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}

/// The server binary, started on a free port against an unreachable store.
/// Killed on drop.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = Command::new(env!("CARGO_BIN_EXE_travel-log-api"))
            .env("PORT", port.to_string())
            .env("APP_ENV", "development")
            .env_remove("DATABASE_URL")
            .env("POSTGRES_HOST", "127.0.0.1")
            .env("POSTGRES_PORT", "1")
            .env("DATABASE_CONNECTION_TIMEOUT", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        let server = Self { port, base_url, child };
        server.wait_ready(Duration::from_secs(15)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(format!("{}/", self.base_url)).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
