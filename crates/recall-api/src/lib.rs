//! JSON REST API for Recall.
//!
//! Exposes an axum [`Router`] over a shared [`Session`], so every mutating
//! request is persisted through the session's [`CardRepository`] before it
//! returns. Transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", recall_api::api_router(session.clone()))
//! ```

pub mod backup;
pub mod cards;
pub mod error;
pub mod queries;
pub mod review;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use recall_core::{Clock, Session, SystemClock, store::CardRepository};
use serde::Deserialize;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// The session shared by every handler. Requests are serialized on the lock.
pub type SharedSession<R, C = SystemClock> = Arc<Mutex<Session<R, C>>>;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Server settings, read from a TOML file and `RECALL_*` environment
/// variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       7878,
      store_path: PathBuf::from("~/.local/share/recall/cards.db"),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `session`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<R, C>(session: SharedSession<R, C>) -> Router<()>
where
  R: CardRepository + 'static,
  C: Clock + 'static,
{
  Router::new()
    // Cards
    .route("/cards", get(cards::list::<R, C>).post(cards::create::<R, C>))
    .route("/cards/{id}", get(cards::get_one::<R, C>).delete(cards::remove::<R, C>))
    // Scheduling
    .route("/cards/{id}/review", post(review::review::<R, C>))
    .route("/cards/{id}/preview", get(review::preview::<R, C>))
    // Forgetting curve
    .route("/cards/{id}/retention", get(queries::retention::<R, C>))
    .route("/cards/{id}/curve", get(queries::curve::<R, C>))
    // Queue and analytics
    .route("/due", get(queries::due::<R, C>))
    .route("/stats", get(queries::stats::<R, C>))
    // Backup
    .route("/export", get(backup::export::<R, C>))
    .route("/import", post(backup::import::<R, C>))
    .with_state(session)
}

/// The complete server application: the API under `/api` with request
/// tracing.
pub fn app<R, C>(session: SharedSession<R, C>) -> Router<()>
where
  R: CardRepository + 'static,
  C: Clock + 'static,
{
  Router::new()
    .nest("/api", api_router(session))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
pub(crate) mod test_support {
  use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
  };
  use chrono::{DateTime, TimeZone, Utc};
  use recall_core::ManualClock;
  use recall_store_sqlite::SqliteRepository;
  use tower::ServiceExt as _;

  use super::*;

  pub type TestSession = SharedSession<SqliteRepository, Arc<ManualClock>>;

  pub fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap() }

  pub async fn make_session() -> (TestSession, Arc<ManualClock>) {
    let repo = SqliteRepository::open_in_memory().await.unwrap();
    let clock = Arc::new(ManualClock::new(t0()));
    let session = Session::open(repo, clock.clone()).await.unwrap();
    (Arc::new(Mutex::new(session)), clock)
  }

  pub async fn oneshot(
    session: &TestSession,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
  ) -> (StatusCode, serde_json::Value) {
    let body = body.map(|b| b.to_string()).unwrap_or_default();
    oneshot_raw(session, method, uri, &body).await
  }

  pub async fn oneshot_raw(
    session: &TestSession,
    method: &str,
    uri: &str,
    body: &str,
  ) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
      .method(method)
      .uri(uri)
      .header("content-type", "application/json")
      .body(Body::from(body.to_string()))
      .unwrap();
    let resp = api_router(session.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
      serde_json::Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  pub async fn create(session: &TestSession, id: &str) {
    let (status, _) = oneshot(
      session,
      "POST",
      "/cards",
      Some(serde_json::json!({ "id": id, "questionText": format!("Q {id}") })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
  }

  pub async fn review(session: &TestSession, id: &str, quality: i64) -> serde_json::Value {
    let (status, body) = oneshot(
      session,
      "POST",
      &format!("/cards/{id}/review"),
      Some(serde_json::json!({ "quality": quality })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
  }

  #[tokio::test]
  async fn app_mounts_api_under_prefix() {
    let (session, _) = make_session().await;
    let req = Request::builder().uri("/api/stats").body(Body::empty()).unwrap();
    let resp = app(session.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder().uri("/stats").body(Body::empty()).unwrap();
    let resp = app(session).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[test]
  fn server_config_defaults_fill_missing_keys() {
    let cfg: ServerConfig = serde_json::from_str(r#"{ "port": 9000 }"#).unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.host, "127.0.0.1");
  }
}
