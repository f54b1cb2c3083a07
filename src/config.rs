//! Engine configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! overrides:
//!
//! ```yaml
//! database_path: /var/lib/rankings/rankings.db
//! elo:
//!   master_threshold: 2200
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::PlayerEloState;
use crate::error::{RankingsError, Result};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingsConfig {
    /// SQLite database file (`:memory:` for a throwaway store)
    pub database_path: String,

    /// Upper bound on round blocks per ingest submission
    pub max_rounds: usize,

    pub elo: EloConfig,
}

impl Default for RankingsConfig {
    fn default() -> Self {
        Self {
            database_path: "rankings.db".to_string(),
            max_rounds: 5,
            elo: EloConfig::default(),
        }
    }
}

impl RankingsConfig {
    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| RankingsError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| RankingsError::Config(e.to_string()))
    }
}

/// Elo parameters.
///
/// K is 50 for a player's first 25 matches, then 25 below a 2400 rating and
/// 10 at or above it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EloConfig {
    pub initial_rating: f64,
    /// Matches before a player counts as established
    pub provisional_matches: u32,
    pub provisional_k: f64,
    pub established_k: f64,
    pub master_threshold: f64,
    pub master_k: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            initial_rating: 1000.0,
            provisional_matches: 25,
            provisional_k: 50.0,
            established_k: 25.0,
            master_threshold: 2400.0,
            master_k: 10.0,
        }
    }
}

impl EloConfig {
    /// K-factor from a player's state before the current match is applied
    pub fn k_factor(&self, state: &PlayerEloState) -> f64 {
        if state.matches_played < self.provisional_matches {
            self.provisional_k
        } else if state.rating < self.master_threshold {
            self.established_k
        } else {
            self.master_k
        }
    }

    pub fn is_provisional(&self, matches_played: u32) -> bool {
        matches_played < self.provisional_matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RankingsConfig::default();
        assert_eq!(config.max_rounds, 5);
        assert_eq!(config.elo.initial_rating, 1000.0);
        assert_eq!(config.elo.provisional_matches, 25);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = RankingsConfig::from_yaml("elo:\n  master_threshold: 2200\n").unwrap();
        assert_eq!(config.elo.master_threshold, 2200.0);
        assert_eq!(config.elo.master_k, 10.0);
        assert_eq!(config.database_path, "rankings.db");
    }

    #[test]
    fn test_invalid_yaml() {
        let result = RankingsConfig::from_yaml("max_rounds: [1, 2");
        assert!(matches!(result, Err(RankingsError::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database_path: \":memory:\"\nmax_rounds: 3").unwrap();

        let config = RankingsConfig::from_file(file.path()).unwrap();
        assert_eq!(config.database_path, ":memory:");
        assert_eq!(config.max_rounds, 3);

        assert!(RankingsConfig::from_file("/nonexistent/rankings.yaml").is_err());
    }

    #[test]
    fn test_k_factor_tiers() {
        let elo = EloConfig::default();
        let mut state = PlayerEloState::new("A", 1000.0);
        assert_eq!(elo.k_factor(&state), 50.0);

        state.matches_played = 25;
        assert_eq!(elo.k_factor(&state), 25.0);

        state.rating = 2400.0;
        assert_eq!(elo.k_factor(&state), 10.0);

        state.matches_played = 24;
        assert_eq!(elo.k_factor(&state), 50.0);
    }
}
