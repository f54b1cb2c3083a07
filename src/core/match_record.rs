use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a match from one player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
    Bye,
    /// No recognizable result in the source text (stored as an empty string)
    #[serde(rename = "")]
    Unresolved,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "Win",
            Outcome::Loss => "Loss",
            Outcome::Draw => "Draw",
            Outcome::Bye => "Bye",
            Outcome::Unresolved => "",
        }
    }

    /// Parse stored or pasted outcome text, case-insensitive.
    ///
    /// Blank text is `Unresolved`; anything else unrecognized is `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Some(Outcome::Unresolved);
        }
        [Outcome::Win, Outcome::Loss, Outcome::Draw, Outcome::Bye]
            .into_iter()
            .find(|o| o.as_str().eq_ignore_ascii_case(text))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pairing website the match was pasted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Best Coast Pairings
    Bcp,
    /// Stats and Ladders
    Snl,
    Milarki,
}

impl Source {
    /// Label stored in the `source` column
    pub fn label(&self) -> &'static str {
        match self {
            Source::Bcp => "Best Coast Pairings",
            Source::Snl => "Stats and Ladders",
            Source::Milarki => "Milarki",
        }
    }

    /// Accepts either the stored label or the short code (`bcp`, `snl`, `milarki`)
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        [Source::Bcp, Source::Snl, Source::Milarki]
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(text) || s.code().eq_ignore_ascii_case(text))
    }

    pub fn code(&self) -> &'static str {
        match self {
            Source::Bcp => "bcp",
            Source::Snl => "snl",
            Source::Milarki => "milarki",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One pairing at one table in one round of a tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub tournament_name: String,
    pub start_date: NaiveDate,
    /// 1-based round number
    pub round: u32,
    pub table_number: u32,
    pub player_1_name: String,
    pub player_1_faction: String,
    pub player_1_outcome: Outcome,
    pub player_2_name: String,
    pub player_2_faction: String,
    pub player_2_outcome: Outcome,
    pub source: Source,
}

/// Which seat a player occupied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    First,
    Second,
}

/// A match seen from one participant's side
#[derive(Debug, Clone, PartialEq)]
pub struct MatchView<'a> {
    pub seat: Seat,
    pub faction: &'a str,
    pub outcome: Outcome,
    pub opponent: &'a str,
    pub opponent_faction: &'a str,
}

impl Match {
    /// Both outcomes form a legal pair (Win/Loss, Loss/Win, Draw/Draw, Bye/Bye)
    pub fn outcomes_consistent(&self) -> bool {
        matches!(
            (self.player_1_outcome, self.player_2_outcome),
            (Outcome::Win, Outcome::Loss)
                | (Outcome::Loss, Outcome::Win)
                | (Outcome::Draw, Outcome::Draw)
                | (Outcome::Bye, Outcome::Bye)
        )
    }

    pub fn involves(&self, player: &str) -> bool {
        self.player_1_name == player || self.player_2_name == player
    }

    pub fn involves_faction(&self, faction: &str) -> bool {
        self.player_1_faction == faction || self.player_2_faction == faction
    }

    /// View the match from `player`'s seat; player 1 wins if both seats match
    pub fn view_for(&self, player: &str) -> Option<MatchView<'_>> {
        if self.player_1_name == player {
            Some(MatchView {
                seat: Seat::First,
                faction: &self.player_1_faction,
                outcome: self.player_1_outcome,
                opponent: &self.player_2_name,
                opponent_faction: &self.player_2_faction,
            })
        } else if self.player_2_name == player {
            Some(MatchView {
                seat: Seat::Second,
                faction: &self.player_2_faction,
                outcome: self.player_2_outcome,
                opponent: &self.player_1_name,
                opponent_faction: &self.player_1_faction,
            })
        } else {
            None
        }
    }
}

/// A match together with its store row id (insertion order)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMatch {
    pub id: i64,
    #[serde(flatten)]
    pub record: Match,
}

impl std::ops::Deref for StoredMatch {
    type Target = Match;

    fn deref(&self) -> &Match {
        &self.record
    }
}

#[cfg(test)]
pub(crate) fn sample_match(p1: &str, o1: Outcome, p2: &str, o2: Outcome) -> Match {
    Match {
        tournament_name: "Test Cup".to_string(),
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        round: 1,
        table_number: 1,
        player_1_name: p1.to_string(),
        player_1_faction: "Stormcast Eternals".to_string(),
        player_1_outcome: o1,
        player_2_name: p2.to_string(),
        player_2_faction: "Nighthaunt".to_string(),
        player_2_outcome: o2,
        source: Source::Bcp,
    }
}
