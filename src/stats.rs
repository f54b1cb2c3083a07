//! Read models built from stored matches and published ratings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::config::EloConfig;
use crate::core::{Outcome, Rating, Source, StoredMatch};

/// A published rating plus its display flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    #[serde(flatten)]
    pub rating: Rating,
    /// Too few matches for the rating to have settled
    pub provisional: bool,
}

impl Standing {
    pub fn new(rating: Rating, elo: &EloConfig) -> Self {
        let provisional = elo.is_provisional(rating.matches_played);
        Self { rating, provisional }
    }
}

/// Overall leaderboard in published (rank) order
pub fn standings(ratings: Vec<Rating>, elo: &EloConfig) -> Vec<Standing> {
    ratings.into_iter().map(|r| Standing::new(r, elo)).collect()
}

/// Row of a per-faction leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionStanding {
    /// 1-based position among players preferring this faction
    pub faction_rank: u32,
    #[serde(flatten)]
    pub standing: Standing,
}

/// Players whose preferred faction is `faction`, highest rating first
pub fn faction_rankings(
    ratings: &[Rating],
    faction: &str,
    elo: &EloConfig,
) -> Vec<FactionStanding> {
    let mut players: Vec<&Rating> = ratings
        .iter()
        .filter(|r| r.preferred_faction == faction)
        .collect();
    players.sort_by(|a, b| b.rating.total_cmp(&a.rating));

    players
        .into_iter()
        .enumerate()
        .map(|(i, r)| FactionStanding {
            faction_rank: i as u32 + 1,
            standing: Standing::new(r.clone(), elo),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventSummary {
    pub tournament_name: String,
    pub start_date: NaiveDate,
}

/// Distinct events, newest first
pub fn events(matches: &[StoredMatch]) -> Vec<EventSummary> {
    let mut seen = HashSet::new();
    let mut events: Vec<EventSummary> = matches
        .iter()
        .map(|m| EventSummary {
            tournament_name: m.tournament_name.clone(),
            start_date: m.start_date,
        })
        .filter(|e| seen.insert(e.clone()))
        .collect();
    events.sort_by(|a, b| b.start_date.cmp(&a.start_date));
    events
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TournamentSummary {
    pub tournament_name: String,
    pub start_date: NaiveDate,
    pub source: Source,
}

/// Distinct (name, date, source) submissions, in stored order
pub fn tournaments(matches: &[StoredMatch]) -> Vec<TournamentSummary> {
    let mut seen = HashSet::new();
    matches
        .iter()
        .map(|m| TournamentSummary {
            tournament_name: m.tournament_name.clone(),
            start_date: m.start_date,
            source: m.source,
        })
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Wins, draws and losses; anything not a win or draw is a loss
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl Record {
    pub fn add(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Draw => self.draws += 1,
            _ => self.losses += 1,
        }
    }

    /// Wins plus half a point per draw
    pub fn score(&self) -> f64 {
        self.wins as f64 + 0.5 * self.draws as f64
    }

    pub fn played(&self) -> u32 {
        self.wins + self.draws + self.losses
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} - {}", self.wins, self.draws, self.losses)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub tournament_name: String,
    pub record: Record,
}

/// Everything shown on a player's page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub player_name: String,
    /// `None` until the player appears in a published recalculation
    pub standing: Option<Standing>,
    pub record: Record,
    /// Per-event records, most recent event first
    pub events: Vec<EventRecord>,
    pub best_event: Option<EventRecord>,
    /// Every faction tied for the highest play count
    pub most_played_factions: Vec<String>,
    /// Opponent faction beaten most often
    pub best_matchup: Option<String>,
    /// Opponent faced most often, at least twice
    pub nemesis: Option<String>,
    /// Newest first
    pub history: Vec<StoredMatch>,
}

/// Insertion-ordered tally keyed by string
struct Tally<T> {
    entries: Vec<(String, T)>,
}

impl<T: Default> Tally<T> {
    fn new() -> Self {
        Self { entries: Vec::new() }
    }

    fn entry(&mut self, key: &str) -> &mut T {
        let pos = match self.entries.iter().position(|(k, _)| k == key) {
            Some(pos) => pos,
            None => {
                self.entries.push((key.to_string(), T::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos].1
    }
}

#[derive(Default)]
struct Matchup {
    wins: u32,
    last_win: Option<NaiveDate>,
}

#[derive(Default)]
struct Meetings {
    count: u32,
    first_met: Option<NaiveDate>,
}

impl PlayerProfile {
    /// Build from every stored match involving `player_name`
    pub fn build(
        player_name: &str,
        rating: Option<Rating>,
        matches: Vec<StoredMatch>,
        elo: &EloConfig,
    ) -> Self {
        let mut history: Vec<StoredMatch> = matches
            .into_iter()
            .filter(|m| m.involves(player_name))
            .collect();
        history.sort_by(|a, b| {
            b.start_date
                .cmp(&a.start_date)
                .then(b.round.cmp(&a.round))
        });

        let mut record = Record::default();
        let mut events: Tally<Record> = Tally::new();
        let mut factions: Tally<u32> = Tally::new();
        let mut matchups: Tally<Matchup> = Tally::new();
        let mut opponents: Tally<Meetings> = Tally::new();

        for m in &history {
            let Some(view) = m.view_for(player_name) else {
                continue;
            };

            record.add(view.outcome);
            events.entry(&m.tournament_name).add(view.outcome);
            *factions.entry(view.faction) += 1;

            if view.outcome == Outcome::Win {
                let matchup = matchups.entry(view.opponent_faction);
                matchup.wins += 1;
                matchup.last_win = matchup.last_win.max(Some(m.start_date));
            }

            if !view.opponent.trim().is_empty() {
                let meetings = opponents.entry(view.opponent);
                meetings.count += 1;
                meetings.first_met = Some(match meetings.first_met {
                    Some(date) => date.min(m.start_date),
                    None => m.start_date,
                });
            }
        }

        let events: Vec<EventRecord> = events
            .entries
            .into_iter()
            .map(|(tournament_name, record)| EventRecord { tournament_name, record })
            .collect();

        let mut best_event: Option<&EventRecord> = None;
        for event in &events {
            if best_event.map_or(true, |best| event.record.score() > best.record.score()) {
                best_event = Some(event);
            }
        }
        let best_event = best_event.cloned();

        let max_count = factions.entries.iter().map(|(_, n)| *n).max().unwrap_or(0);
        let most_played_factions = factions
            .entries
            .into_iter()
            .filter(|(_, n)| *n == max_count)
            .map(|(faction, _)| faction)
            .collect();

        let mut best_matchup: Option<&(String, Matchup)> = None;
        for candidate in &matchups.entries {
            let better = match best_matchup {
                None => true,
                Some((_, best)) => {
                    candidate.1.wins > best.wins
                        || (candidate.1.wins == best.wins && candidate.1.last_win > best.last_win)
                }
            };
            if better {
                best_matchup = Some(candidate);
            }
        }

        let mut nemesis: Option<&(String, Meetings)> = None;
        for candidate in opponents.entries.iter().filter(|(_, m)| m.count >= 2) {
            let better = match nemesis {
                None => true,
                Some((_, best)) => {
                    let (count, first_met) = (candidate.1.count, candidate.1.first_met);
                    count > best.count || (count == best.count && first_met < best.first_met)
                }
            };
            if better {
                nemesis = Some(candidate);
            }
        }

        Self {
            player_name: player_name.to_string(),
            standing: rating.map(|r| Standing::new(r, elo)),
            record,
            events,
            best_event,
            most_played_factions,
            best_matchup: best_matchup.map(|(faction, _)| faction.clone()),
            nemesis: nemesis.map(|(opponent, _)| opponent.clone()),
            history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::match_record::sample_match;
    use crate::core::Match;
    use crate::core::Outcome::{Draw, Loss, Win};

    fn stored(id: i64, m: Match) -> StoredMatch {
        StoredMatch { id, record: m }
    }

    fn on(date: (i32, u32, u32), round: u32, mut m: Match) -> Match {
        m.start_date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        m.round = round;
        m
    }

    fn rated(name: &str, rating: f64, matches: u32, faction: &str) -> Rating {
        let mut r = Rating::new(name, rating, matches);
        r.preferred_faction = faction.to_string();
        r
    }

    #[test]
    fn test_standings_flag_provisional() {
        let elo = EloConfig::default();
        let rows = standings(
            vec![rated("Alice", 1100.0, 30, "Skaven"), rated("Bob", 1000.0, 3, "Skaven")],
            &elo,
        );
        assert!(!rows[0].provisional);
        assert!(rows[1].provisional);
    }

    #[test]
    fn test_faction_rankings() {
        let elo = EloConfig::default();
        let mut ratings = vec![
            rated("Alice", 1200.0, 30, "Skaven"),
            rated("Bob", 1150.0, 30, "Nighthaunt"),
            rated("Carol", 1100.0, 30, "Skaven"),
        ];
        for (i, r) in ratings.iter_mut().enumerate() {
            r.rank = i as u32 + 1;
        }

        let rows = faction_rankings(&ratings, "Skaven", &elo);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].faction_rank, 2);
        assert_eq!(rows[1].standing.rating.player_name, "Carol");
        assert_eq!(rows[1].standing.rating.rank, 3);

        assert!(faction_rankings(&ratings, "Seraphon", &elo).is_empty());
    }

    #[test]
    fn test_events_newest_first_and_distinct() {
        let matches = vec![
            stored(1, on((2024, 1, 1), 1, sample_match("A", Win, "B", Loss))),
            stored(2, on((2024, 1, 1), 2, sample_match("A", Win, "B", Loss))),
            stored(3, {
                let m = sample_match("C", Win, "D", Loss);
                let mut m = on((2024, 2, 1), 1, m);
                m.tournament_name = "Spring Open".to_string();
                m
            }),
        ];

        let names: Vec<String> =
            events(&matches).into_iter().map(|e| e.tournament_name).collect();
        assert_eq!(names, vec!["Spring Open", "Test Cup"]);
    }

    #[test]
    fn test_tournaments_split_by_source() {
        let mut snl = sample_match("C", Win, "D", Loss);
        snl.source = Source::Snl;
        let matches = vec![
            stored(1, sample_match("A", Win, "B", Loss)),
            stored(2, sample_match("A", Win, "B", Loss)),
            stored(3, snl),
        ];

        let listed = tournaments(&matches);
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].source, Source::Bcp);
        assert_eq!(listed[1].source, Source::Snl);
    }

    #[test]
    fn test_record_counts_everything_else_as_loss() {
        let mut record = Record::default();
        for outcome in [Win, Draw, Outcome::Bye, Outcome::Unresolved, Loss] {
            record.add(outcome);
        }
        assert_eq!(record, Record { wins: 1, draws: 1, losses: 3 });
        assert_eq!(record.to_string(), "1 - 1 - 3");
        assert_eq!(record.score(), 1.5);
    }

    fn alice_history() -> Vec<StoredMatch> {
        // Alice plays Stormcast unless seated second against Bob's Stormcast
        let mut spring = on((2024, 3, 1), 1, sample_match("Alice", Win, "Bob", Loss));
        spring.tournament_name = "Spring Open".to_string();
        let mut spring_r2 = on((2024, 3, 1), 2, sample_match("Carol", Win, "Alice", Loss));
        spring_r2.tournament_name = "Spring Open".to_string();
        spring_r2.player_1_faction = "Skaven".to_string();
        spring_r2.player_2_faction = "Nighthaunt".to_string();

        vec![
            stored(1, on((2024, 1, 1), 1, sample_match("Alice", Win, "Bob", Loss))),
            stored(2, on((2024, 1, 1), 2, sample_match("Alice", Draw, "Carol", Draw))),
            stored(3, on((2024, 1, 1), 3, sample_match("Alice", Win, "Dan", Loss))),
            stored(4, spring),
            stored(5, spring_r2),
            stored(6, on((2024, 3, 1), 3, sample_match("Erin", Win, "Finn", Loss))),
        ]
    }

    #[test]
    fn test_profile_history_and_record() {
        let elo = EloConfig::default();
        let profile = PlayerProfile::build("Alice", None, alice_history(), &elo);

        let ids: Vec<i64> = profile.history.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![5, 4, 3, 2, 1]);
        assert_eq!(profile.record, Record { wins: 3, draws: 1, losses: 1 });
        assert!(profile.standing.is_none());

        let event_names: Vec<&str> =
            profile.events.iter().map(|e| e.tournament_name.as_str()).collect();
        assert_eq!(event_names, vec!["Spring Open", "Test Cup"]);
    }

    #[test]
    fn test_profile_highlights() {
        let elo = EloConfig::default();
        let rating = rated("Alice", 1040.0, 5, "Stormcast Eternals");
        let profile = PlayerProfile::build("Alice", Some(rating), alice_history(), &elo);

        // Test Cup scores 2.5 against Spring Open's 1.0
        let best = profile.best_event.unwrap();
        assert_eq!(best.tournament_name, "Test Cup");
        assert_eq!(best.record.to_string(), "2 - 1 - 0");

        assert_eq!(profile.most_played_factions, vec!["Stormcast Eternals"]);
        assert_eq!(profile.best_matchup.as_deref(), Some("Nighthaunt"));
        // Bob and Carol both met twice, first on 2024-01-01; Carol is seen first
        assert_eq!(profile.nemesis.as_deref(), Some("Carol"));
        assert!(profile.standing.unwrap().provisional);
    }

    #[test]
    fn test_nemesis_prefers_earliest_first_meeting() {
        let elo = EloConfig::default();
        let matches = vec![
            stored(1, on((2023, 6, 1), 1, sample_match("Alice", Loss, "Bob", Win))),
            stored(2, on((2024, 1, 1), 1, sample_match("Alice", Loss, "Carol", Win))),
            stored(3, on((2024, 2, 1), 1, sample_match("Alice", Loss, "Bob", Win))),
            stored(4, on((2024, 3, 1), 1, sample_match("Alice", Loss, "Carol", Win))),
            stored(5, on((2024, 3, 1), 2, sample_match("Alice", Win, "Dan", Loss))),
        ];

        let profile = PlayerProfile::build("Alice", None, matches, &elo);
        assert_eq!(profile.nemesis.as_deref(), Some("Bob"));
    }

    #[test]
    fn test_single_meetings_have_no_nemesis() {
        let elo = EloConfig::default();
        let matches = vec![
            stored(1, sample_match("Alice", Win, "Bob", Loss)),
            stored(2, sample_match("Alice", Loss, "Carol", Win)),
        ];
        let profile = PlayerProfile::build("Alice", None, matches, &elo);
        assert!(profile.nemesis.is_none());
    }

    #[test]
    fn test_matchup_tie_goes_to_later_win() {
        let elo = EloConfig::default();
        let mut skaven = on((2024, 5, 1), 1, sample_match("Alice", Win, "Bob", Loss));
        skaven.player_2_faction = "Skaven".to_string();
        let matches = vec![
            stored(1, on((2024, 1, 1), 1, sample_match("Alice", Win, "Carol", Loss))),
            stored(2, skaven),
        ];

        let profile = PlayerProfile::build("Alice", None, matches, &elo);
        assert_eq!(profile.best_matchup.as_deref(), Some("Skaven"));
    }

    #[test]
    fn test_most_played_keeps_all_tied_factions() {
        let elo = EloConfig::default();
        let mut skaven = sample_match("Alice", Win, "Bob", Loss);
        skaven.player_1_faction = "Skaven".to_string();
        let matches = vec![
            stored(1, sample_match("Alice", Win, "Bob", Loss)),
            stored(2, skaven),
        ];

        let profile = PlayerProfile::build("Alice", None, matches, &elo);
        assert_eq!(profile.most_played_factions.len(), 2);
    }

    #[test]
    fn test_empty_profile() {
        let profile = PlayerProfile::build("Nobody", None, Vec::new(), &EloConfig::default());
        assert_eq!(profile.record.played(), 0);
        assert!(profile.best_event.is_none());
        assert!(profile.most_played_factions.is_empty());
        assert!(profile.best_matchup.is_none());
    }
}
