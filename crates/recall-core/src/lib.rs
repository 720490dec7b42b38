//! Core types and scheduling logic for the Recall spaced-repetition engine.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the card model, the SM-2 update rule, due-card selection, the forgetting
//! curve, and statistics. Durable storage plugs in through
//! [`store::CardRepository`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod card;
pub mod clock;
pub mod deck;
pub mod due;
pub mod error;
pub mod retention;
pub mod scheduler;
pub mod session;
pub mod snapshot;
pub mod stats;
pub mod store;

pub use card::{Card, CardState, ItemMetadata, Quality, Rating, ReviewRecord};
pub use clock::{Clock, ManualClock, SystemClock};
pub use deck::Deck;
pub use error::{Error, Result};
pub use session::{Session, SessionError};
