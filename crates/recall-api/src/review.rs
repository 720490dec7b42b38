//! Handlers for recording reviews and previewing their outcome.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/cards/{id}/review` | Body: `{"quality":4}` or `{"rating":"good"}`; 400 if out of range |
//! | `GET`  | `/cards/{id}/preview` | Interval each quality would produce |

use axum::{
  Json,
  extract::{Path, State},
};
use recall_core::{
  Card, Clock, Quality, Rating,
  scheduler::format_interval,
  store::CardRepository,
};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use tracing::info;

use crate::{SharedSession, error::ApiError};

// ─── Review ───────────────────────────────────────────────────────────────────

/// Either a raw 0–5 quality or a four-button rating.
///
/// `quality` is taken as any JSON number so fractional or huge values get the
/// same 400 as out-of-range integers.
#[derive(Debug, Deserialize)]
pub struct ReviewBody {
  pub quality: Option<Number>,
  pub rating:  Option<Rating>,
}

impl ReviewBody {
  fn quality(&self) -> Result<Quality, ApiError> {
    match (&self.quality, self.rating) {
      (Some(n), None) => {
        let q = n.as_i64().ok_or_else(|| {
          ApiError::BadRequest(format!("quality must be an integer from 0 to 5, got {n}"))
        })?;
        Ok(Quality::new(q)?)
      }
      (None, Some(r)) => Ok(r.into()),
      _ => Err(ApiError::BadRequest(
        "exactly one of `quality` or `rating` is required".to_string(),
      )),
    }
  }
}

/// `POST /cards/{id}/review`
pub async fn review<R, C>(
  State(session): State<SharedSession<R, C>>,
  Path(id): Path<String>,
  Json(body): Json<ReviewBody>,
) -> Result<Json<Card>, ApiError>
where
  R: CardRepository,
  C: Clock,
{
  let quality = body.quality()?;
  let mut session = session.lock().await;
  let card = session.review_card(&id, quality).await?;
  info!(
    card_id = %card.id,
    quality = quality.value(),
    interval = card.interval,
    state = %card.state,
    "review recorded"
  );
  Ok(Json(card))
}

// ─── Preview ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewEntry {
  pub quality:  u8,
  pub interval: u32,
  pub label:    String,
}

/// `GET /cards/{id}/preview`
pub async fn preview<R, C>(
  State(session): State<SharedSession<R, C>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<PreviewEntry>>, ApiError>
where
  R: CardRepository,
  C: Clock,
{
  let session = session.lock().await;
  let intervals = session.deck().preview_intervals(&id)?;
  let entries = Quality::all()
    .zip(intervals)
    .map(|(q, interval)| PreviewEntry {
      quality: q.value(),
      interval,
      label: format_interval(interval),
    })
    .collect();
  Ok(Json(entries))
}
