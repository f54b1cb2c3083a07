use crate::core::{Outcome, Source};
use crate::error::ParseErrorKind;
use crate::health::{DataQualityIssue, IssueKind};
use crate::parsers::{PairingParser, PlayerLine, RoundContext, RoundOutput};

/// Stats and Ladders parser.
///
/// Each pairing reads:
///
/// ```text
/// 4
/// Alice
/// Stormcast Eternals
/// 18 VP
/// DEF
/// Bob
/// Nighthaunt
/// ```
///
/// Anything between the header and the result keyword is ignored. Lines
/// that do not start a pairing are skipped. A pairing with no result
/// keyword is kept with unresolved outcomes and reported as an issue.
#[derive(Debug, Default, Clone, Copy)]
pub struct SnlParser;

impl SnlParser {
    pub fn new() -> Self {
        Self
    }
}

/// Result keyword -> (player 1, player 2)
fn sentinel_outcomes(line: &str) -> Option<(Outcome, Outcome)> {
    match line {
        "DEF" => Some((Outcome::Win, Outcome::Loss)),
        "LOST TO" => Some((Outcome::Loss, Outcome::Win)),
        "DREW WITH" => Some((Outcome::Draw, Outcome::Draw)),
        _ => None,
    }
}

/// Digits-only header line. Stored tables are numbered from 1, so a bare
/// "0" (usually a zero score) is treated as noise rather than a pairing.
fn table_number(line: &str) -> Option<u32> {
    if line.is_empty() || !line.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    line.parse::<u32>().ok().filter(|&n| n > 0)
}

impl PairingParser for SnlParser {
    fn source(&self) -> Source {
        Source::Snl
    }

    fn parse_round(
        &self,
        ctx: &RoundContext<'_>,
        lines: &[&str],
        out: &mut RoundOutput,
    ) -> Result<(), ParseErrorKind> {
        let mut i = 0;

        // A header needs the table line, two player lines and one more after
        while i + 3 < lines.len() {
            let Some(table) = table_number(lines[i]) else {
                i += 1;
                continue;
            };

            let player_1_name = lines[i + 1];
            let player_1_faction = lines[i + 2];

            let mut j = i + 3;
            while j < lines.len() && sentinel_outcomes(lines[j]).is_none() {
                j += 1;
            }

            let (outcome_1, outcome_2) = lines
                .get(j)
                .and_then(|line| sentinel_outcomes(line))
                .unwrap_or((Outcome::Unresolved, Outcome::Unresolved));
            let player_2_name = lines.get(j + 1).copied().unwrap_or("");
            let player_2_faction = lines.get(j + 2).copied().unwrap_or("");

            let m = ctx.build(
                table,
                PlayerLine::new(player_1_name, player_1_faction, outcome_1),
                PlayerLine::new(player_2_name, player_2_faction, outcome_2),
            );

            if outcome_1 == Outcome::Unresolved {
                out.issues.push(DataQualityIssue::for_match(
                    IssueKind::UnresolvedOutcome,
                    None,
                    &m,
                    "no DEF / LOST TO / DREW WITH found after this pairing",
                ));
            } else if player_2_name.is_empty() {
                out.issues.push(DataQualityIssue::for_match(
                    IssueKind::MissingPlayer,
                    None,
                    &m,
                    "round text ends before player 2",
                ));
            }

            out.matches.push(m);
            i = j + 3;
        }

        Ok(())
    }
}
