//! Async HTTP client wrapping the prwire admin API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use prwire_core::setting::{ItemOverridesInput, SeoSettingsInput};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;

/// Connection settings for the prwire API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Async HTTP client for the prwire JSON admin API.
///
/// Responses are returned as raw JSON; the CLI only pretty-prints them.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  /// `timeout` must cover a full plugin download on update.
  pub fn new(config: ApiConfig, timeout: Duration) -> Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    let req = self.client.request(method, self.url(path));
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  async fn send(&self, label: String, req: RequestBuilder) -> Result<Value> {
    let resp = req.send().await.with_context(|| format!("{label} failed"))?;
    read(label, resp).await
  }

  async fn get(&self, path: &str) -> Result<Value> {
    self.send(format!("GET {path}"), self.request(Method::GET, path)).await
  }

  async fn write<B: Serialize>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Value> {
    let label = format!("{method} {path}");
    let mut req = self.request(method, path);
    if let Some(body) = body {
      req = req.json(body);
    }
    self.send(label, req).await
  }

  // ── Settings ──────────────────────────────────────────────────────────────

  /// `GET /api/categories/search?q=<fragment>`
  pub async fn search_categories(&self, fragment: &str) -> Result<Value> {
    let req = self.request(Method::GET, "/categories/search").query(&[("q", fragment)]);
    self.send("GET /categories/search".into(), req).await
  }

  /// `POST /api/categories/press-release`
  pub async fn create_press_release_category(&self) -> Result<Value> {
    self.write::<Value>(Method::POST, "/categories/press-release", None).await
  }

  /// `GET /api/settings/seo`
  pub async fn settings(&self) -> Result<Value> { self.get("/settings/seo").await }

  /// `PUT /api/settings/seo`
  pub async fn save_settings(&self, input: &SeoSettingsInput) -> Result<Value> {
    self.write(Method::PUT, "/settings/seo", Some(input)).await
  }

  /// `GET /api/items/{id}/seo`
  pub async fn report(&self, item_id: i64) -> Result<Value> {
    self.get(&format!("/items/{item_id}/seo")).await
  }

  /// `PUT /api/items/{id}/seo`
  pub async fn set_overrides(&self, item_id: i64, input: &ItemOverridesInput) -> Result<Value> {
    self.write(Method::PUT, &format!("/items/{item_id}/seo"), Some(input)).await
  }

  // ── Snippets ──────────────────────────────────────────────────────────────

  /// `GET /api/snippets`
  pub async fn snippets(&self) -> Result<Value> { self.get("/snippets").await }

  /// `PUT /api/snippets/{id}`
  pub async fn toggle_snippet(&self, id: &str, enabled: bool) -> Result<Value> {
    let body = serde_json::json!({ "enabled": enabled });
    self.write(Method::PUT, &format!("/snippets/{id}"), Some(&body)).await
  }

  /// `GET /api/cache/exclusions`
  pub async fn cache_exclusions(&self) -> Result<Value> { self.get("/cache/exclusions").await }

  // ── Plugin ────────────────────────────────────────────────────────────────

  /// `GET /api/plugin/version[?force=true]`
  pub async fn version(&self, force: bool) -> Result<Value> {
    let req = self
      .request(Method::GET, "/plugin/version")
      .query(&[("force", force)]);
    self.send("GET /plugin/version".into(), req).await
  }

  /// `POST /api/plugin/update`
  pub async fn update(&self) -> Result<Value> {
    self.write::<Value>(Method::POST, "/plugin/update", None).await
  }

  /// `POST /api/plugin/export`
  pub async fn export(&self) -> Result<Value> {
    self.write::<Value>(Method::POST, "/plugin/export", None).await
  }

  /// `GET /api/plugin/tags`
  pub async fn tags(&self) -> Result<Value> { self.get("/plugin/tags").await }

  /// `POST /api/plugin/versions`
  pub async fn download(&self, version: &str, archive_url: &str) -> Result<Value> {
    let body = serde_json::json!({ "version": version, "archive_url": archive_url });
    self.write(Method::POST, "/plugin/versions", Some(&body)).await
  }
}

/// Decode a response body, turning the server's `{"error","kind"}` shape
/// into an error message.
async fn read(label: String, resp: Response) -> Result<Value> {
  let status = resp.status();
  let body: Value = resp
    .json()
    .await
    .with_context(|| format!("{label}: response is not JSON ({status})"))?;

  if status.is_success() {
    return Ok(body);
  }
  match (body["kind"].as_str(), body["error"].as_str()) {
    (Some(kind), Some(error)) => Err(anyhow!("{label} → {status} [{kind}]: {error}")),
    _ => Err(anyhow!("{label} → {status}")),
  }
}
