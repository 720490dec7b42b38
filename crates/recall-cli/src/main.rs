//! `recall` — command-line client for the Recall server.
//!
//! # Usage
//!
//! ```
//! recall --url http://localhost:7878 due --limit 20
//! recall add capital-fr --question "Capital of France?"
//! recall review capital-fr good
//! recall --config ~/.config/recall/config.toml stats
//! ```

mod client;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use recall_core::{Card, ItemMetadata, Rating, scheduler::format_interval};
use serde::Deserialize;
use serde_json::json;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:7878";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "recall", about = "Command-line client for the Recall server")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the recall server (default: http://localhost:7878).
  #[arg(long, env = "RECALL_URL")]
  url: Option<String>,

  /// Print raw JSON instead of formatted text.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List every card.
  List,
  /// List cards due now, in review order.
  Due {
    #[arg(short, long)]
    limit: Option<usize>,
  },
  /// Register an item, or show it if it already exists.
  Add {
    id:            String,
    #[arg(short, long, default_value = "")]
    question:      String,
    #[arg(short = 't', long = "type", default_value = "")]
    question_type: String,
  },
  /// Show one card with a preview of each possible answer.
  Show { id: String },
  /// Record a review: a quality 0-5 or one of again/hard/good/easy.
  Review { id: String, grade: String },
  /// Predicted retention now, or `--hours` from now.
  Retention {
    id:    String,
    #[arg(long)]
    hours: Option<f64>,
  },
  /// Forgetting curve from the last review.
  Curve {
    id:   String,
    #[arg(long)]
    days: Option<f64>,
  },
  /// Store-wide statistics.
  Stats,
  /// Write a backup of every card to stdout or `--output`.
  Export {
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
  },
  /// Replace every card with the contents of a backup file.
  Import { file: PathBuf },
  /// Delete a card and its history.
  Remove { id: String },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags and env override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
  };

  let client = ApiClient::new(api_config)?;
  run(&client, args.command, args.json).await
}

async fn run(client: &ApiClient, command: Command, raw: bool) -> Result<()> {
  match command {
    Command::List => {
      let cards = client.list_cards().await?;
      if raw {
        return print_json(&cards);
      }
      for card in &cards {
        println!("{}", card_line(card));
      }
    }
    Command::Due { limit } => {
      let cards = client.due(limit).await?;
      if raw {
        return print_json(&cards);
      }
      if cards.is_empty() {
        println!("nothing due");
      }
      for card in &cards {
        println!("{}", card_line(card));
      }
    }
    Command::Add { id, question, question_type } => {
      let metadata = ItemMetadata { question_text: question, question_type };
      let card = client.create_card(&id, &metadata).await?;
      if raw {
        return print_json(&card);
      }
      println!("{}", card_line(&card));
    }
    Command::Show { id } => {
      let card = client.get_card(&id).await?;
      let preview = client.preview(&id).await?;
      if raw {
        return print_json(&card);
      }
      print_card(&card);
      let row: Vec<String> = preview.iter().map(|p| format!("{}:{}", p.quality, p.label)).collect();
      println!("  next:        {}", row.join("  "));
    }
    Command::Review { id, grade } => {
      let card = client.review(&id, review_body(&grade)?).await?;
      if raw {
        return print_json(&card);
      }
      println!(
        "{} → {} (next {}, ease {:.2})",
        card.id,
        card.state,
        format_interval(card.interval),
        card.ease_factor
      );
    }
    Command::Retention { id, hours } => {
      let r = client.retention(&id, hours).await?;
      if raw {
        return print_json(&json!({ "hoursFromNow": r.hours_from_now, "retention": r.retention }));
      }
      println!("{:.1}% in {}h", r.retention * 100.0, r.hours_from_now);
    }
    Command::Curve { id, days } => {
      let points = client.curve(&id, days).await?;
      if raw {
        return print_json(&points);
      }
      for p in &points {
        let bar = "#".repeat((p.retention * 40.0).round() as usize);
        println!("{:>7.2}d {:>6.1}% {bar}", p.days_from_review, p.retention * 100.0);
      }
    }
    Command::Stats => {
      let stats = client.stats().await?;
      if raw {
        return print_json(&stats);
      }
      println!("cards:          {}", stats.total_cards);
      println!("due today:      {}", stats.due_today);
      println!("due tomorrow:   {}", stats.due_tomorrow);
      println!("avg retention:  {:.1}%", stats.average_retention * 100.0);
      println!("reviews:        {}", stats.total_reviews);
      println!("recent correct: {:.1}%", stats.recent_accuracy * 100.0);
      for (state, count) in &stats.cards_by_state {
        println!("  {state:<12} {count}");
      }
    }
    Command::Export { output } => {
      let blob = client.export().await?;
      match output {
        Some(path) => std::fs::write(&path, blob)
          .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{blob}"),
      }
    }
    Command::Import { file } => {
      let blob = std::fs::read_to_string(&file)
        .with_context(|| format!("reading {}", file.display()))?;
      client.import(blob).await?;
      println!("imported {}", file.display());
    }
    Command::Remove { id } => {
      client.remove_card(&id).await?;
      println!("removed {id}");
    }
  }
  Ok(())
}

// ─── Formatting ───────────────────────────────────────────────────────────────

/// Accept either a numeric quality or a rating name.
fn review_body(grade: &str) -> Result<serde_json::Value> {
  if let Ok(quality) = grade.parse::<i64>() {
    return Ok(json!({ "quality": quality }));
  }
  let rating: Rating = grade
    .to_lowercase()
    .parse()
    .map_err(|_| anyhow!("expected 0-5 or again/hard/good/easy, got {grade:?}"))?;
  Ok(json!({ "rating": rating }))
}

fn short_date(dt: DateTime<Utc>) -> String { dt.format("%Y-%m-%d %H:%M").to_string() }

fn card_line(card: &Card) -> String {
  format!(
    "{:<24} {:<10} due {}  ivl {}",
    card.id,
    card.state,
    short_date(card.next_review_date),
    format_interval(card.interval)
  )
}

fn print_card(card: &Card) {
  println!("{}", card.id);
  if !card.question_text.is_empty() {
    println!("  question:    {}", card.question_text);
  }
  println!("  state:       {}", card.state);
  println!("  interval:    {}", format_interval(card.interval));
  println!("  ease:        {:.2}", card.ease_factor);
  println!("  repetitions: {}", card.repetitions);
  println!("  lapses:      {}", card.lapses);
  println!("  due:         {}", short_date(card.next_review_date));
  if let Some(last) = card.last_review_date {
    println!("  last review: {}", short_date(last));
  }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn review_body_accepts_numbers_and_ratings() {
    assert_eq!(review_body("4").unwrap(), json!({ "quality": 4 }));
    assert_eq!(review_body("Good").unwrap(), json!({ "rating": "good" }));
    assert!(review_body("perfect").is_err());
  }

  #[test]
  fn out_of_range_numbers_are_left_to_the_server() {
    assert_eq!(review_body("9").unwrap(), json!({ "quality": 9 }));
  }

  #[test]
  fn args_parse_subcommands() {
    let args = Args::try_parse_from(["recall", "--url", "http://x", "review", "c1", "good"]).unwrap();
    assert_eq!(args.url.as_deref(), Some("http://x"));
    assert!(matches!(args.command, Command::Review { ref id, ref grade } if id == "c1" && grade == "good"));
  }
}
