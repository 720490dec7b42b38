//! Whole-store export and import.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/export` | Snapshot blob as `application/json` |
//! | `POST` | `/import` | Body: a blob from `/export`; replaces every card; 204 |

use axum::{
  extract::State,
  http::{StatusCode, header},
  response::IntoResponse,
};
use recall_core::{Clock, store::CardRepository};
use tracing::info;

use crate::{SharedSession, error::ApiError};

/// `GET /export`
pub async fn export<R, C>(
  State(session): State<SharedSession<R, C>>,
) -> Result<impl IntoResponse, ApiError>
where
  R: CardRepository,
  C: Clock,
{
  let blob = session
    .lock()
    .await
    .export()
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(([(header::CONTENT_TYPE, "application/json")], blob))
}

/// `POST /import`
///
/// The body is taken as raw text so malformed JSON surfaces as a 400 from
/// the snapshot parser rather than an extractor rejection.
pub async fn import<R, C>(
  State(session): State<SharedSession<R, C>>,
  blob: String,
) -> Result<StatusCode, ApiError>
where
  R: CardRepository,
  C: Clock,
{
  let mut session = session.lock().await;
  session.import(&blob).await?;
  info!(cards = session.deck().len(), "store replaced from import");
  Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
  use axum::http::StatusCode;

  use crate::test_support::{create, make_session, oneshot, oneshot_raw, review};

  #[tokio::test]
  async fn export_then_import_round_trips() {
    let (source, _) = make_session().await;
    create(&source, "a").await;
    create(&source, "b").await;
    review(&source, "a", 4).await;
    review(&source, "a", 5).await;

    let (status, blob) = oneshot(&source, "GET", "/export", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(blob["version"], 1);

    let (target, _) = make_session().await;
    create(&target, "stale").await;
    let (status, _) = oneshot_raw(&target, "POST", "/import", &blob.to_string()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, exported_cards) = oneshot(&source, "GET", "/cards", None).await;
    let (_, imported_cards) = oneshot(&target, "GET", "/cards", None).await;
    assert_eq!(exported_cards, imported_cards);
  }

  #[tokio::test]
  async fn malformed_import_is_400_and_keeps_cards() {
    let (session, _) = make_session().await;
    create(&session, "keep").await;

    for blob in [
      "not json",
      r#"{"version":7,"exportedAt":"2024-01-01T00:00:00Z","cards":{}}"#,
      r#"{"version":1,"exportedAt":"2024-01-01T00:00:00Z","cards":{"x":{"id":"x"}}}"#,
    ] {
      let (status, body) = oneshot_raw(&session, "POST", "/import", blob).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{blob}: {body}");
    }

    let (status, _) = oneshot(&session, "GET", "/cards/keep", None).await;
    assert_eq!(status, StatusCode::OK);
  }
}
