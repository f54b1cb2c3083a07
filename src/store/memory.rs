use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use crate::core::{Match, Rating, StoredMatch};
use crate::error::{RankingsError, Result};
use crate::store::{MatchFilter, MatchStore, RatingStore};

#[derive(Default)]
struct Matches {
    rows: Vec<StoredMatch>,
    next_id: i64,
}

/// In-process store, for tests and dry runs
#[derive(Default)]
pub struct MemoryStore {
    matches: Mutex<Matches>,
    ratings: Mutex<Vec<Rating>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| RankingsError::Other("memory store lock poisoned".to_string()))
}

impl Matches {
    fn push(&mut self, m: &Match) -> i64 {
        self.next_id += 1;
        self.rows.push(StoredMatch {
            id: self.next_id,
            record: m.clone(),
        });
        self.next_id
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn insert_match(&self, m: &Match) -> Result<i64> {
        Ok(lock(&self.matches)?.push(m))
    }

    async fn insert_matches(&self, matches: &[Match]) -> Result<Vec<i64>> {
        // One lock for the whole batch, so nothing else interleaves
        let mut guard = lock(&self.matches)?;
        Ok(matches.iter().map(|m| guard.push(m)).collect())
    }

    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<StoredMatch>> {
        let guard = lock(&self.matches)?;
        let mut rows: Vec<StoredMatch> = guard
            .rows
            .iter()
            .filter(|m| filter.accepts(m))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then(a.round.cmp(&b.round))
                .then(a.id.cmp(&b.id))
        });
        Ok(rows)
    }

    async fn delete_tournament(&self, tournament_name: &str) -> Result<u64> {
        let mut guard = lock(&self.matches)?;
        let before = guard.rows.len();
        guard.rows.retain(|m| m.tournament_name != tournament_name);
        Ok((before - guard.rows.len()) as u64)
    }

    async fn delete_match(&self, id: i64) -> Result<bool> {
        let mut guard = lock(&self.matches)?;
        let before = guard.rows.len();
        guard.rows.retain(|m| m.id != id);
        Ok(guard.rows.len() < before)
    }
}

#[async_trait]
impl RatingStore for MemoryStore {
    async fn clear_and_replace_ratings(&self, ratings: &[Rating]) -> Result<()> {
        let mut replacement = ratings.to_vec();
        // Stable, keeps stored order within a rank
        replacement.sort_by_key(|r| r.rank);
        *lock(&self.ratings)? = replacement;
        Ok(())
    }

    async fn list_ratings(&self) -> Result<Vec<Rating>> {
        Ok(lock(&self.ratings)?.clone())
    }

    async fn get_rating(&self, player_name: &str) -> Result<Option<Rating>> {
        Ok(lock(&self.ratings)?
            .iter()
            .find(|r| r.player_name == player_name)
            .cloned())
    }
}
