pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::core::{Match, Rating, StoredMatch};
use crate::error::Result;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Append-only table of parsed matches
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Store one match, returning its id
    async fn insert_match(&self, m: &Match) -> Result<i64>;

    /// Store a whole submission; either every match is stored or none is
    async fn insert_matches(&self, matches: &[Match]) -> Result<Vec<i64>>;

    /// Matches ordered by start date, round, then insertion order
    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<StoredMatch>>;

    /// Delete every match of a tournament, returning how many were removed
    async fn delete_tournament(&self, tournament_name: &str) -> Result<u64>;

    /// Delete one match; `false` if the id did not exist
    async fn delete_match(&self, id: i64) -> Result<bool>;
}

/// Published ratings, replaced wholesale on every recalculation
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Swap in a new rating set; readers never see a partial one
    async fn clear_and_replace_ratings(&self, ratings: &[Rating]) -> Result<()>;

    /// Ratings ordered by rank, then the order they were stored in
    async fn list_ratings(&self) -> Result<Vec<Rating>>;

    async fn get_rating(&self, player_name: &str) -> Result<Option<Rating>>;
}

/// Narrow a match listing; `None` fields match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchFilter {
    /// Player in either seat (exact, case-sensitive)
    pub player: Option<String>,
    /// Faction in either seat (exact)
    pub faction: Option<String>,
    pub tournament: Option<String>,
}

impl MatchFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn player(name: impl Into<String>) -> Self {
        Self {
            player: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn faction(faction: impl Into<String>) -> Self {
        Self {
            faction: Some(faction.into()),
            ..Self::default()
        }
    }

    pub fn tournament(name: impl Into<String>) -> Self {
        Self {
            tournament: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn accepts(&self, m: &Match) -> bool {
        self.player.as_deref().map_or(true, |p| m.involves(p))
            && self.faction.as_deref().map_or(true, |f| m.involves_faction(f))
            && self
                .tournament
                .as_deref()
                .map_or(true, |t| m.tournament_name == t)
    }
}
