#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};

use recipe_api::config::{self, AppConfig};
use recipe_api::database::MemoryStore;
use recipe_api::{app, AppState};

pub const PASSWORD: &str = "testpass123";

/// Server running inside the test's runtime, backed by a fresh in-memory store
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub store: Arc<MemoryStore>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register a user and return an access token for it
    pub async fn signup(&self, email: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/api/user/create"))
            .json(&json!({ "email": email, "password": PASSWORD, "name": "Test Name" }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "signup failed: {}", res.status());
        self.login(email, PASSWORD).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/api/user/token"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let body: Value = res.json().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("token missing from response")
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str, body: Value) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token).json(&body)
    }

    pub fn put(&self, path: &str, token: &str, body: Value) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token).json(&body)
    }

    pub fn patch(&self, path: &str, token: &str, body: Value) -> RequestBuilder {
        self.client.patch(self.url(path)).bearer_auth(token).json(&body)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    /// Create a recipe and return its JSON detail
    pub async fn create_recipe(&self, token: &str, body: Value) -> Result<Value> {
        let res = self.post("/api/recipe/recipes", token, body).send().await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create recipe failed: {}", res.status());
        data(res).await
    }
}

/// Bind the application on an ephemeral port and serve it in the background
pub async fn spawn_server() -> Result<TestServer> {
    spawn_server_with(config::config()).await
}

pub async fn spawn_server_with(config: &AppConfig) -> Result<TestServer> {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone());
    let router = app(state, config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
        client: Client::new(),
        store,
    })
}

/// Unwrap the success envelope
pub async fn data(res: Response) -> Result<Value> {
    let body: Value = res.json().await?;
    anyhow::ensure!(body["success"] == true, "expected success envelope, got {}", body);
    Ok(body["data"].clone())
}

pub fn sample_recipe(title: &str) -> Value {
    json!({
        "title": title,
        "time_minutes": 22,
        "price": "5.25",
        "description": "Sample description",
        "link": "http://example.com/recipe.pdf"
    })
}
