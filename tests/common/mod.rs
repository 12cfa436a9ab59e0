#![allow(dead_code)]

use anyhow::{Context, Result};
use serde_json::Value;

use apple_api::config::{AppConfig, Environment};
use apple_api::database::seed::{sample_products, sample_stores};
use apple_api::database::MemoryRepository;
use apple_api::handlers::{build_router, Services};

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and return the status with the decoded JSON body.
    pub async fn get_json(&self, path: &str) -> Result<(reqwest::StatusCode, Value)> {
        let res = self.client.get(self.url(path)).send().await?;
        let status = res.status();
        let body = res.json::<Value>().await.context("response was not JSON")?;
        Ok((status, body))
    }
}

/// Serve the router on an ephemeral port from fresh in-memory repositories
/// holding the sample catalogue. Each call gets its own server, so tests
/// that write do not see each other's changes.
pub async fn spawn_server() -> Result<TestServer> {
    let config = AppConfig::for_environment(Environment::Development);
    let services = Services {
        products: MemoryRepository::with_records(sample_products()).boxed(),
        stores: MemoryRepository::with_records(sample_stores()).boxed(),
        pool: None,
    };
    let app = build_router(&config, services);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
    })
}

pub fn titles(records: &Value) -> Vec<String> {
    records
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|r| r["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
