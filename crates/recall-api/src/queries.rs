//! Read-only query handlers: due queue, retention model, and statistics.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/due` | Optional `?limit=<n>` |
//! | `GET`  | `/stats` | |
//! | `GET`  | `/cards/{id}/retention` | Optional `?hours=<f64>` (default 0) |
//! | `GET`  | `/cards/{id}/curve` | Optional `?days=<f64>` (default 30) |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use recall_core::{
  Card, Clock,
  retention::{CurvePoint, DEFAULT_CURVE_DAYS, DEFAULT_HOURS_FROM_NOW},
  stats::Stats,
  store::CardRepository,
};
use serde::{Deserialize, Serialize};

use crate::{SharedSession, error::ApiError};

// ─── Due ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DueParams {
  pub limit: Option<usize>,
}

/// `GET /due[?limit=<n>]`
pub async fn due<R, C>(
  State(session): State<SharedSession<R, C>>,
  Query(params): Query<DueParams>,
) -> Json<Vec<Card>>
where
  R: CardRepository,
  C: Clock,
{
  let session = session.lock().await;
  let cards = session.deck().due_cards(params.limit).into_iter().cloned().collect();
  Json(cards)
}

// ─── Stats ────────────────────────────────────────────────────────────────────

/// `GET /stats`
pub async fn stats<R, C>(State(session): State<SharedSession<R, C>>) -> Json<Stats>
where
  R: CardRepository,
  C: Clock,
{
  Json(session.lock().await.deck().stats())
}

// ─── Retention ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RetentionParams {
  pub hours: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionBody {
  pub card_id:        String,
  pub hours_from_now: f64,
  pub retention:      f64,
}

/// `GET /cards/{id}/retention[?hours=<h>]`
pub async fn retention<R, C>(
  State(session): State<SharedSession<R, C>>,
  Path(id): Path<String>,
  Query(params): Query<RetentionParams>,
) -> Result<Json<RetentionBody>, ApiError>
where
  R: CardRepository,
  C: Clock,
{
  let hours = params.hours.unwrap_or(DEFAULT_HOURS_FROM_NOW);
  if !hours.is_finite() {
    return Err(ApiError::BadRequest(format!("hours must be finite, got {hours}")));
  }

  let session = session.lock().await;
  let deck = session.deck();
  let card = deck.card(&id).ok_or_else(|| ApiError::card_not_found(&id))?;
  Ok(Json(RetentionBody {
    card_id:        id.clone(),
    hours_from_now: hours,
    retention:      deck.predict_retention(card, hours),
  }))
}

// ─── Curve ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CurveParams {
  pub days: Option<f64>,
}

/// `GET /cards/{id}/curve[?days=<d>]`
pub async fn curve<R, C>(
  State(session): State<SharedSession<R, C>>,
  Path(id): Path<String>,
  Query(params): Query<CurveParams>,
) -> Result<Json<Vec<CurvePoint>>, ApiError>
where
  R: CardRepository,
  C: Clock,
{
  let days = params.days.unwrap_or(DEFAULT_CURVE_DAYS);
  if !days.is_finite() || days < 0.0 {
    return Err(ApiError::BadRequest(format!(
      "days must be a non-negative number, got {days}"
    )));
  }

  let session = session.lock().await;
  let deck = session.deck();
  let card = deck.card(&id).ok_or_else(|| ApiError::card_not_found(&id))?;
  Ok(Json(deck.retention_curve(card, days).collect()))
}
