//! # Realms Rankings
//!
//! Tournament pairing ingest and Elo ranking engine:
//! - Parsers for pasted Best Coast Pairings, Stats and Ladders and Milarki round text
//! - Faction catalog with canonicalization and fuzzy suggestions
//! - Chronological Elo replay with tiered K-factors
//! - Competition ranking, leaderboards and player profiles
//! - SQLite persistence behind async store traits
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use realms_rankings::{RankingsConfig, RankingsService, Source};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = RankingsService::open(RankingsConfig::default())?;
//!
//!     let round_1 = std::fs::read_to_string("round1.txt")?;
//!     let start_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//!     service.ingest(Source::Bcp, "Test Cup", start_date, &[round_1]).await?;
//!
//!     for rating in service.recalculate().await? {
//!         println!("{}. {} {}", rating.rank, rating.player_name, rating.display_rating());
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod elo;
pub mod error;
pub mod factions;
pub mod health;
pub mod parsers;
pub mod service;
pub mod stats;
pub mod store;

// Re-export primary types
pub use config::{EloConfig, RankingsConfig};
pub use core::{Match, Outcome, Rating, Source, StoredMatch};
pub use elo::EloEngine;
pub use error::{ParseError, ParseErrorKind, RankingsError, Result};
pub use factions::FactionCatalog;
pub use health::{DataQualityIssue, IssueKind};
pub use service::{IngestReport, RankingsService};
pub use store::{MatchFilter, MatchStore, RatingStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
