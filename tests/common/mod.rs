#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde_json::{json, Value};

use alert_feedback_api::app;
use alert_feedback_api::auth::MIN_HASH_COST;
use alert_feedback_api::config::AppConfig;
use alert_feedback_api::state::AppState;
use alert_feedback_api::store::{Document, DocumentId, StoreGateway};

/// Router served in-process on a free port, scoped to one test's runtime.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: StoreGateway,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// In-memory config with the cheapest bcrypt work factor.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::in_memory();
    config.security.password_hash_cost = MIN_HASH_COST;
    config
}

/// Server over a fresh in-memory store.
pub async fn spawn_server() -> Result<TestServer> {
    spawn_with(test_config(), StoreGateway::memory()).await
}

pub async fn spawn_with(config: AppConfig, store: StoreGateway) -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind {}", port))?;
    let router = app(AppState::new(config, store.clone()));
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let server = TestServer {
        port,
        base_url,
        store,
        client: reqwest::Client::new(),
    };
    wait_ready(&server, Duration::from_secs(5)).await?;
    Ok(server)
}

async fn wait_ready(server: &TestServer, timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if server.client.get(server.url("/")).send().await.is_ok() {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    anyhow::bail!("server did not become ready on {} within {:?}", server.base_url, timeout)
}

pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be an object, got {}", other),
    }
}

pub async fn insert_transaction(store: &StoreGateway, system_name: &str, growth: Value) -> Result<DocumentId> {
    let id = store
        .transactions()
        .insert_one(doc(json!({
            "system_name": system_name,
            "growth": growth,
            "file_path": format!("/data/{}.csv", system_name),
            "timestamp": "2024-03-02T08:00:00Z",
            "embedding": [0.1, 0.2, 0.3]
        })))
        .await?;
    Ok(id)
}

pub async fn insert_alert(store: &StoreGateway, message: &str, transaction_ids: Vec<String>) -> Result<DocumentId> {
    let id = store
        .alerts()
        .insert_one(doc(json!({
            "alert_message": message,
            "timestamp": "2024-03-02T08:30:00Z",
            "sid": "S-17",
            "code": "GR-02",
            "transaction_ids": transaction_ids,
            "embedding": [0.4, 0.5]
        })))
        .await?;
    Ok(id)
}
