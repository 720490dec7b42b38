//! Async HTTP client wrapping the recall JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use recall_core::{Card, ItemMetadata, retention::CurvePoint, stats::Stats};
use reqwest::{Client, Response, Url};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use tracing::debug;

/// Connection settings for the recall API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// `GET /cards/{id}/retention` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Retention {
  pub hours_from_now: f64,
  pub retention:      f64,
}

/// One row of `GET /cards/{id}/preview`.
#[derive(Debug, Deserialize)]
pub struct PreviewEntry {
  pub quality: u8,
  pub label:   String,
}

/// Async HTTP client for the recall JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// `/api/cards/{id}[/{action}]`, with `id` percent-encoded as one segment.
  fn card_url(&self, id: &str, action: Option<&str>) -> Result<Url> {
    let mut url = Url::parse(&self.url("/cards"))
      .with_context(|| format!("invalid server URL {:?}", self.config.base_url))?;
    url
      .path_segments_mut()
      .map_err(|()| anyhow!("server URL {:?} cannot take a path", self.config.base_url))?
      .push(id)
      .extend(action);
    Ok(url)
  }

  /// Turn a non-2xx response into an error carrying the server's message.
  async fn check(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let message = resp
      .json::<serde_json::Value>()
      .await
      .ok()
      .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
      .unwrap_or_else(|| status.to_string());
    Err(anyhow!("{what} → {status}: {message}"))
  }

  async fn get_json<T: DeserializeOwned>(
    &self,
    url: impl AsRef<str>,
    query: &[(&str, String)],
  ) -> Result<T> {
    let url = url.as_ref();
    debug!(url, "GET");
    let resp = self
      .client
      .get(url)
      .query(query)
      .send()
      .await
      .with_context(|| format!("GET {url} failed"))?;
    Self::check(resp, &format!("GET {url}"))
      .await?
      .json()
      .await
      .with_context(|| format!("deserialising GET {url}"))
  }

  // ── Cards ─────────────────────────────────────────────────────────────────

  /// `GET /api/cards`
  pub async fn list_cards(&self) -> Result<Vec<Card>> { self.get_json(self.url("/cards"), &[]).await }

  /// `GET /api/cards/{id}`
  pub async fn get_card(&self, id: &str) -> Result<Card> {
    self.get_json(self.card_url(id, None)?, &[]).await
  }

  /// `POST /api/cards`
  pub async fn create_card(&self, id: &str, metadata: &ItemMetadata) -> Result<Card> {
    let resp = self
      .client
      .post(self.url("/cards"))
      .json(&json!({
        "id": id,
        "questionText": metadata.question_text,
        "questionType": metadata.question_type,
      }))
      .send()
      .await
      .context("POST /cards failed")?;
    Self::check(resp, "POST /cards")
      .await?
      .json()
      .await
      .context("deserialising card")
  }

  /// `DELETE /api/cards/{id}`
  pub async fn remove_card(&self, id: &str) -> Result<()> {
    let url = self.card_url(id, None)?;
    let resp = self
      .client
      .delete(url.clone())
      .send()
      .await
      .with_context(|| format!("DELETE {url} failed"))?;
    Self::check(resp, &format!("DELETE {url}")).await?;
    Ok(())
  }

  // ── Scheduling ────────────────────────────────────────────────────────────

  /// `POST /api/cards/{id}/review`
  pub async fn review(&self, id: &str, body: serde_json::Value) -> Result<Card> {
    let url = self.card_url(id, Some("review"))?;
    let resp = self
      .client
      .post(url.clone())
      .json(&body)
      .send()
      .await
      .with_context(|| format!("POST {url} failed"))?;
    Self::check(resp, &format!("POST {url}"))
      .await?
      .json()
      .await
      .context("deserialising reviewed card")
  }

  /// `GET /api/cards/{id}/preview`
  pub async fn preview(&self, id: &str) -> Result<Vec<PreviewEntry>> {
    self.get_json(self.card_url(id, Some("preview"))?, &[]).await
  }

  /// `GET /api/due[?limit=<n>]`
  pub async fn due(&self, limit: Option<usize>) -> Result<Vec<Card>> {
    let query: Vec<(&str, String)> = limit.map(|n| ("limit", n.to_string())).into_iter().collect();
    self.get_json(self.url("/due"), &query).await
  }

  // ── Analytics ─────────────────────────────────────────────────────────────

  /// `GET /api/cards/{id}/retention[?hours=<h>]`
  pub async fn retention(&self, id: &str, hours: Option<f64>) -> Result<Retention> {
    let query: Vec<(&str, String)> = hours.map(|h| ("hours", h.to_string())).into_iter().collect();
    self.get_json(self.card_url(id, Some("retention"))?, &query).await
  }

  /// `GET /api/cards/{id}/curve[?days=<d>]`
  pub async fn curve(&self, id: &str, days: Option<f64>) -> Result<Vec<CurvePoint>> {
    let query: Vec<(&str, String)> = days.map(|d| ("days", d.to_string())).into_iter().collect();
    self.get_json(self.card_url(id, Some("curve"))?, &query).await
  }

  /// `GET /api/stats`
  pub async fn stats(&self) -> Result<Stats> { self.get_json(self.url("/stats"), &[]).await }

  // ── Backup ────────────────────────────────────────────────────────────────

  /// `GET /api/export`, returned verbatim.
  pub async fn export(&self) -> Result<String> {
    let resp = self
      .client
      .get(self.url("/export"))
      .send()
      .await
      .context("GET /export failed")?;
    Self::check(resp, "GET /export")
      .await?
      .text()
      .await
      .context("reading export body")
  }

  /// `POST /api/import`
  pub async fn import(&self, blob: String) -> Result<()> {
    let resp = self
      .client
      .post(self.url("/import"))
      .header(reqwest::header::CONTENT_TYPE, "application/json")
      .body(blob)
      .send()
      .await
      .context("POST /import failed")?;
    Self::check(resp, "POST /import").await?;
    Ok(())
  }
}
