//! SQL schema for the Recall SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS cards (
    card_id         TEXT PRIMARY KEY,
    question_text   TEXT NOT NULL DEFAULT '',
    question_type   TEXT NOT NULL DEFAULT '',
    ease_factor     REAL NOT NULL CHECK (ease_factor >= 1.3),
    interval_days   INTEGER NOT NULL CHECK (interval_days >= 0),
    repetitions     INTEGER NOT NULL CHECK (repetitions >= 0),
    next_review_at  TEXT NOT NULL,   -- RFC 3339 UTC
    last_review_at  TEXT,            -- NULL until the first review
    state           TEXT NOT NULL,   -- 'new' | 'learning' | 'review' | 'relearning'
    lapses          INTEGER NOT NULL CHECK (lapses >= 0),
    created_at      TEXT NOT NULL
);

-- Review history is append-only per card; seq is the position in history.
CREATE TABLE IF NOT EXISTS reviews (
    card_id       TEXT NOT NULL REFERENCES cards(card_id) ON DELETE CASCADE,
    seq           INTEGER NOT NULL,
    reviewed_at   TEXT NOT NULL,
    quality       INTEGER NOT NULL CHECK (quality BETWEEN 0 AND 5),
    interval_days INTEGER NOT NULL,  -- before the review
    ease_factor   REAL NOT NULL,     -- before the review
    state         TEXT NOT NULL,     -- before the review
    PRIMARY KEY (card_id, seq)
);

CREATE INDEX IF NOT EXISTS cards_next_review_idx ON cards(next_review_at);

PRAGMA user_version = 1;
";
