//! Elo replay over the full match history.
//!
//! Ratings are never updated incrementally: every recalculation starts all
//! players from the initial rating and replays every stored match in
//! chronological order.

pub mod ranking;

use std::collections::HashMap;

use crate::config::EloConfig;
use crate::core::{Outcome, PlayerEloState, Rating, StoredMatch};
use crate::error::{RankingsError, Result};

pub use ranking::assign_ranks;

/// Probability that a player rated `rating` beats one rated `opponent`
pub fn expected_score(rating: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent - rating) / 400.0))
}

/// Replays matches into ratings
#[derive(Debug, Clone, Default)]
pub struct EloEngine {
    config: EloConfig,
}

impl EloEngine {
    pub fn new(config: EloConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EloConfig {
        &self.config
    }

    /// Recompute every player's rating from scratch.
    ///
    /// Matches are replayed by start date, then round; matches sharing both
    /// keep the order they were given in (store insertion order). Ratings come
    /// back in the order players first appeared, unranked.
    ///
    /// Pairings with no recorded result on either side are skipped entirely:
    /// no player state, faction history or match count. Any other match with
    /// a blank player name fails the whole run without producing anything.
    pub fn recompute_ratings(&self, matches: &[StoredMatch]) -> Result<Vec<Rating>> {
        let mut ordered: Vec<&StoredMatch> = matches.iter().collect();
        ordered.sort_by_key(|m| (m.start_date, m.round));

        let mut players: Vec<PlayerEloState> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut skipped = 0;

        for m in ordered {
            if is_unresolved(m) {
                skipped += 1;
                continue;
            }

            let name_1 = player_name(m, &m.player_1_name)?;
            let name_2 = player_name(m, &m.player_2_name)?;

            let p1 = self.player_index(&mut players, &mut index, name_1);
            let p2 = self.player_index(&mut players, &mut index, name_2);

            players[p1].faction_history.push(m.player_1_faction.trim().to_string());
            players[p2].faction_history.push(m.player_2_faction.trim().to_string());

            self.apply(&mut players, p1, p2, m.player_1_outcome, m.player_2_outcome);

            players[p1].matches_played += 1;
            players[p2].matches_played += 1;
        }

        if skipped > 0 {
            tracing::warn!("Skipped {} pairings with no recorded result", skipped);
        }
        tracing::debug!(
            "Replayed {} matches for {} players",
            matches.len() - skipped,
            players.len()
        );

        Ok(players
            .into_iter()
            .map(|state| Rating {
                preferred_faction: preferred_faction(&state.faction_history),
                player_name: state.player_name,
                rating: state.rating,
                matches_played: state.matches_played,
                rank: 0,
            })
            .collect())
    }

    fn player_index(
        &self,
        players: &mut Vec<PlayerEloState>,
        index: &mut HashMap<String, usize>,
        name: &str,
    ) -> usize {
        if let Some(&idx) = index.get(name) {
            return idx;
        }
        players.push(PlayerEloState::new(name, self.config.initial_rating));
        index.insert(name.to_string(), players.len() - 1);
        players.len() - 1
    }

    /// Apply one match's rating change; K and expectations use pre-match state
    fn apply(
        &self,
        players: &mut [PlayerEloState],
        p1: usize,
        p2: usize,
        outcome_1: Outcome,
        outcome_2: Outcome,
    ) {
        let rating_1 = players[p1].rating;
        let rating_2 = players[p2].rating;
        let k_1 = self.config.k_factor(&players[p1]);
        let k_2 = self.config.k_factor(&players[p2]);

        match (outcome_1, outcome_2) {
            // Both sides move by the winner's shortfall, each scaled by its own K
            (Outcome::Win, Outcome::Loss) => {
                let shortfall = 1.0 - expected_score(rating_1, rating_2);
                players[p1].rating += k_1 * shortfall;
                players[p2].rating -= k_2 * shortfall;
            }
            (Outcome::Loss, Outcome::Win) => {
                let shortfall = 1.0 - expected_score(rating_2, rating_1);
                players[p1].rating -= k_1 * shortfall;
                players[p2].rating += k_2 * shortfall;
            }
            (Outcome::Draw, Outcome::Draw) => {
                players[p1].rating += k_1 * (0.5 - expected_score(rating_1, rating_2));
                players[p2].rating += k_2 * (0.5 - expected_score(rating_2, rating_1));
            }
            // Byes and inconsistent pairs count as played but move nothing
            _ => {}
        }
    }
}

fn is_unresolved(m: &StoredMatch) -> bool {
    m.player_1_outcome == Outcome::Unresolved && m.player_2_outcome == Outcome::Unresolved
}

fn player_name<'a>(m: &StoredMatch, name: &'a str) -> Result<&'a str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RankingsError::MalformedMatch {
            id: m.id,
            reason: format!(
                "blank player name ({} round {} table {})",
                m.tournament_name, m.round, m.table_number
            ),
        });
    }
    Ok(name)
}

/// Most-played faction; ties go to whichever tied faction was played last
pub fn preferred_faction(history: &[String]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for faction in history {
        *counts.entry(faction.as_str()).or_insert(0) += 1;
    }

    let Some(&max) = counts.values().max() else {
        return String::new();
    };

    history
        .iter()
        .rev()
        .find(|faction| counts.get(faction.as_str()) == Some(&max))
        .cloned()
        .unwrap_or_default()
}
