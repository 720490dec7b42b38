//! [`SqliteRepository`] — the SQLite implementation of [`CardRepository`].

use std::{collections::HashMap, path::Path};

use recall_core::{card::Card, store::CardRepository};
use tracing::debug;

use crate::{
  Error, Result,
  encode::{EncodedCard, RawCard, RawReview, encode_card},
  schema::SCHEMA,
};

const UPSERT_CARD: &str = "
  INSERT INTO cards (
    card_id, question_text, question_type, ease_factor, interval_days,
    repetitions, next_review_at, last_review_at, state, lapses, created_at
  )
  VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
  ON CONFLICT (card_id) DO UPDATE SET
    question_text  = excluded.question_text,
    question_type  = excluded.question_type,
    ease_factor    = excluded.ease_factor,
    interval_days  = excluded.interval_days,
    repetitions    = excluded.repetitions,
    next_review_at = excluded.next_review_at,
    last_review_at = excluded.last_review_at,
    state          = excluded.state,
    lapses         = excluded.lapses,
    created_at     = excluded.created_at
";

const UPSERT_REVIEW: &str = "
  INSERT OR REPLACE INTO reviews (
    card_id, seq, reviewed_at, quality, interval_days, ease_factor, state
  )
  VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A card repository backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteRepository {
  conn: tokio_rusqlite::Connection,
}

impl SqliteRepository {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Write one card row and its full history inside an open transaction.
fn write_card(tx: &rusqlite::Transaction<'_>, card: &EncodedCard) -> rusqlite::Result<()> {
  tx.execute(
    UPSERT_CARD,
    rusqlite::params![
      card.card_id,
      card.question_text,
      card.question_type,
      card.ease_factor,
      card.interval_days,
      card.repetitions,
      card.next_review_at,
      card.last_review_at,
      card.state,
      card.lapses,
      card.created_at,
    ],
  )?;

  tx.execute(
    "DELETE FROM reviews WHERE card_id = ?1 AND seq >= ?2",
    rusqlite::params![card.card_id, card.reviews.len() as i64],
  )?;

  let mut stmt = tx.prepare_cached(UPSERT_REVIEW)?;
  for r in &card.reviews {
    stmt.execute(rusqlite::params![
      card.card_id,
      r.seq,
      r.reviewed_at,
      r.quality,
      r.interval_days,
      r.ease_factor,
      r.state,
    ])?;
  }
  Ok(())
}

impl CardRepository for SqliteRepository {
  type Error = Error;

  async fn load_cards(&self) -> Result<Vec<Card>> {
    let (raw_cards, raw_reviews): (Vec<RawCard>, Vec<RawReview>) = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT card_id, question_text, question_type, ease_factor,
                  interval_days, repetitions, next_review_at, last_review_at,
                  state, lapses, created_at
           FROM cards
           ORDER BY card_id",
        )?;
        let cards = stmt
          .query_map([], |row| {
            Ok(RawCard {
              card_id:        row.get(0)?,
              question_text:  row.get(1)?,
              question_type:  row.get(2)?,
              ease_factor:    row.get(3)?,
              interval_days:  row.get(4)?,
              repetitions:    row.get(5)?,
              next_review_at: row.get(6)?,
              last_review_at: row.get(7)?,
              state:          row.get(8)?,
              lapses:         row.get(9)?,
              created_at:     row.get(10)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
          "SELECT card_id, reviewed_at, quality, interval_days, ease_factor, state
           FROM reviews
           ORDER BY card_id, seq",
        )?;
        let reviews = stmt
          .query_map([], |row| {
            Ok(RawReview {
              card_id:       row.get(0)?,
              reviewed_at:   row.get(1)?,
              quality:       row.get(2)?,
              interval_days: row.get(3)?,
              ease_factor:   row.get(4)?,
              state:         row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((cards, reviews))
      })
      .await?;

    let mut histories: HashMap<String, Vec<RawReview>> = HashMap::new();
    for review in raw_reviews {
      histories.entry(review.card_id.clone()).or_default().push(review);
    }

    let cards = raw_cards
      .into_iter()
      .map(|raw| {
        let history = histories.remove(&raw.card_id).unwrap_or_default();
        raw.into_card(history)
      })
      .collect::<Result<Vec<_>>>()?;

    debug!(cards = cards.len(), "loaded cards");
    Ok(cards)
  }

  async fn save_card(&self, card: &Card) -> Result<()> {
    let encoded = encode_card(card);
    let history = encoded.reviews.len();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        write_card(&tx, &encoded)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    debug!(card_id = %card.id, history, "saved card");
    Ok(())
  }

  async fn replace_all(&self, cards: &[Card]) -> Result<()> {
    let encoded: Vec<EncodedCard> = cards.iter().map(encode_card).collect();
    let count = encoded.len();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM reviews", [])?;
        tx.execute("DELETE FROM cards", [])?;
        for card in &encoded {
          write_card(&tx, card)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    debug!(cards = count, "replaced all cards");
    Ok(())
  }

  async fn delete_card(&self, id: &str) -> Result<bool> {
    let id_owned = id.to_owned();
    let affected = self
      .conn
      .call(move |conn| {
        let n = conn.execute("DELETE FROM cards WHERE card_id = ?1", rusqlite::params![id_owned])?;
        Ok(n)
      })
      .await?;

    debug!(card_id = id, deleted = affected > 0, "delete card");
    Ok(affected > 0)
  }
}
