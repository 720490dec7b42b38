//! Handlers for `/cards` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/cards` | Sorted by id |
//! | `POST`   | `/cards` | Body: `{"id":"..","questionText":"..","questionType":".."}`; 201 when created, 200 when it already existed |
//! | `GET`    | `/cards/{id}` | 404 if not found |
//! | `DELETE` | `/cards/{id}` | 204, or 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use recall_core::{Card, Clock, ItemMetadata, store::CardRepository};
use serde::Deserialize;

use crate::{SharedSession, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /cards`
pub async fn list<R, C>(State(session): State<SharedSession<R, C>>) -> Json<Vec<Card>>
where
  R: CardRepository,
  C: Clock,
{
  let session = session.lock().await;
  let mut cards: Vec<Card> = session.deck().cards().cloned().collect();
  cards.sort_by(|a, b| a.id.cmp(&b.id));
  Json(cards)
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub id:       String,
  #[serde(flatten)]
  pub metadata: ItemMetadata,
}

/// `POST /cards`
pub async fn create<R, C>(
  State(session): State<SharedSession<R, C>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  R: CardRepository,
  C: Clock,
{
  if body.id.trim().is_empty() {
    return Err(ApiError::BadRequest("card id must not be empty".to_string()));
  }

  let mut session = session.lock().await;
  let status = if session.deck().card(&body.id).is_some() {
    StatusCode::OK
  } else {
    StatusCode::CREATED
  };
  let card = session.get_or_create_card(&body.id, body.metadata).await?;
  Ok((status, Json(card)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /cards/{id}`
pub async fn get_one<R, C>(
  State(session): State<SharedSession<R, C>>,
  Path(id): Path<String>,
) -> Result<Json<Card>, ApiError>
where
  R: CardRepository,
  C: Clock,
{
  let session = session.lock().await;
  let card = session
    .deck()
    .card(&id)
    .cloned()
    .ok_or_else(|| ApiError::card_not_found(&id))?;
  Ok(Json(card))
}

// ─── Remove ───────────────────────────────────────────────────────────────────

/// `DELETE /cards/{id}`
pub async fn remove<R, C>(
  State(session): State<SharedSession<R, C>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  R: CardRepository,
  C: Clock,
{
  let mut session = session.lock().await;
  match session.remove_card(&id).await? {
    Some(_) => Ok(StatusCode::NO_CONTENT),
    None => Err(ApiError::card_not_found(&id)),
  }
}

#[cfg(test)]
mod tests {
  use axum::http::StatusCode;
  use serde_json::json;

  use crate::test_support::{create, make_session, oneshot, review};

  #[tokio::test]
  async fn create_then_get() {
    let (session, _) = make_session().await;
    let (status, card) = oneshot(
      &session,
      "POST",
      "/cards",
      Some(json!({ "id": "cap-fr", "questionText": "Capital of France?", "questionType": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(card["state"], "new");
    assert_eq!(card["easeFactor"], 2.5);
    assert_eq!(card["interval"], 0);

    let (status, fetched) = oneshot(&session, "GET", "/cards/cap-fr", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["questionText"], "Capital of France?");
  }

  #[tokio::test]
  async fn create_existing_returns_unchanged_card() {
    let (session, _) = make_session().await;
    create(&session, "a").await;
    review(&session, "a", 4).await;

    let (status, card) = oneshot(
      &session,
      "POST",
      "/cards",
      Some(json!({ "id": "a", "questionText": "replaced?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["questionText"], "Q a");
    assert_eq!(card["repetitions"], 1);
  }

  #[tokio::test]
  async fn create_rejects_blank_id() {
    let (session, _) = make_session().await;
    let (status, body) = oneshot(&session, "POST", "/cards", Some(json!({ "id": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn list_is_sorted_by_id() {
    let (session, _) = make_session().await;
    for id in ["b", "c", "a"] {
      create(&session, id).await;
    }
    let (status, cards) = oneshot(&session, "GET", "/cards", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = cards.as_array().unwrap().iter().map(|c| c["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
  }

  #[tokio::test]
  async fn get_unknown_is_404() {
    let (session, _) = make_session().await;
    let (status, body) = oneshot(&session, "GET", "/cards/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("missing"));
  }

  #[tokio::test]
  async fn delete_removes_card_from_store() {
    let (session, _) = make_session().await;
    create(&session, "a").await;

    let (status, _) = oneshot(&session, "DELETE", "/cards/a", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = oneshot(&session, "DELETE", "/cards/a", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let guard = session.lock().await;
    let stored = recall_core::store::CardRepository::load_cards(guard.repository()).await.unwrap();
    assert!(stored.is_empty());
  }
}
