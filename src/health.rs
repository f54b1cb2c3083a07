//! Data-quality checks over stored matches.
//!
//! None of these are fatal; they tell an operator which rows to fix or
//! delete before trusting a recalculation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{Match, Outcome, StoredMatch};
use crate::factions::FactionCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// No result could be read for the pairing
    UnresolvedOutcome,
    /// Outcomes that cannot both be true, e.g. Win/Win
    MismatchedOutcomes,
    /// Blank player name
    MissingPlayer,
    /// Same player in both seats
    SelfMatch,
    /// Faction not in the catalog
    UnknownFaction,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IssueKind::UnresolvedOutcome => "unresolved outcome",
            IssueKind::MismatchedOutcomes => "mismatched outcomes",
            IssueKind::MissingPlayer => "missing player",
            IssueKind::SelfMatch => "self match",
            IssueKind::UnknownFaction => "unknown faction",
        };
        f.write_str(label)
    }
}

/// A suspicious match row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityIssue {
    pub kind: IssueKind,
    /// Store id, when the match has been stored
    pub match_id: Option<i64>,
    pub tournament_name: String,
    pub round: u32,
    pub table_number: u32,
    pub detail: String,
}

impl DataQualityIssue {
    pub fn for_match(
        kind: IssueKind,
        match_id: Option<i64>,
        m: &Match,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            match_id,
            tournament_name: m.tournament_name.clone(),
            round: m.round,
            table_number: m.table_number,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for DataQualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(id) = self.match_id {
            write!(f, "#{} ", id)?;
        }
        write!(
            f,
            "{} round {} table {}: {} ({})",
            self.tournament_name, self.round, self.table_number, self.kind, self.detail
        )
    }
}

/// Check one match; a row may have several issues
pub fn check_match(
    m: &Match,
    match_id: Option<i64>,
    catalog: &FactionCatalog,
) -> Vec<DataQualityIssue> {
    let mut issues = Vec::new();
    let mut push = |kind, detail: String| {
        issues.push(DataQualityIssue::for_match(kind, match_id, m, detail))
    };

    for name in [&m.player_1_name, &m.player_2_name] {
        if name.trim().is_empty() {
            push(IssueKind::MissingPlayer, "blank player name".to_string());
        }
    }

    if !m.player_1_name.trim().is_empty() && m.player_1_name == m.player_2_name {
        push(IssueKind::SelfMatch, format!("{} is in both seats", m.player_1_name));
    }

    let unresolved =
        m.player_1_outcome == Outcome::Unresolved || m.player_2_outcome == Outcome::Unresolved;
    if unresolved {
        push(
            IssueKind::UnresolvedOutcome,
            format!("outcomes {:?}/{:?}", m.player_1_outcome.as_str(), m.player_2_outcome.as_str()),
        );
    } else if !m.outcomes_consistent() {
        push(
            IssueKind::MismatchedOutcomes,
            format!("{}/{}", m.player_1_outcome, m.player_2_outcome),
        );
    }

    for faction in [&m.player_1_faction, &m.player_2_faction] {
        if !faction.trim().is_empty() && !catalog.is_known(&catalog.canonicalize(faction)) {
            push(IssueKind::UnknownFaction, format!("{:?}", faction));
        }
    }

    issues
}

/// Check every stored match
pub fn check(matches: &[StoredMatch], catalog: &FactionCatalog) -> Vec<DataQualityIssue> {
    matches
        .iter()
        .flat_map(|m| check_match(m, Some(m.id), catalog))
        .collect()
}
