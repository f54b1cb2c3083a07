use serde::{Deserialize, Serialize};

/// Published rating row for one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub player_name: String,

    /// Full-precision Elo rating
    pub rating: f64,

    pub matches_played: u32,

    /// Faction fielded most often (most recent wins ties)
    pub preferred_faction: String,

    /// Competition rank, ties share a rank; 0 until ranks are assigned
    #[serde(default)]
    pub rank: u32,
}

impl Rating {
    pub fn new(player_name: impl Into<String>, rating: f64, matches_played: u32) -> Self {
        Self {
            player_name: player_name.into(),
            rating,
            matches_played,
            preferred_faction: String::new(),
            rank: 0,
        }
    }

    /// Rating rounded for display
    pub fn display_rating(&self) -> i64 {
        self.rating.round() as i64
    }
}

/// Running state of one player during an Elo replay
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerEloState {
    pub player_name: String,
    pub rating: f64,
    pub matches_played: u32,
    /// Factions fielded, oldest first
    pub faction_history: Vec<String>,
}

impl PlayerEloState {
    pub fn new(player_name: impl Into<String>, initial_rating: f64) -> Self {
        Self {
            player_name: player_name.into(),
            rating: initial_rating,
            matches_played: 0,
            faction_history: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rating_rounds() {
        assert_eq!(Rating::new("A", 1024.5, 1).display_rating(), 1025);
        assert_eq!(Rating::new("A", 975.49, 1).display_rating(), 975);
    }
}
