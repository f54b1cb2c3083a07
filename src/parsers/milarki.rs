use regex::Regex;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::core::{Outcome, Source};
use crate::error::ParseErrorKind;
use crate::factions::FactionCatalog;
use crate::parsers::{PairingParser, PlayerLine, RoundContext, RoundOutput};

/// Trailing boilerplate after player 2 ("To the Battle", "Finished")
const TRAILING_LINES: usize = 2;

/// Milarki parser.
///
/// Pairings are keyed on a `Table N` header; player lines combine the name
/// and faction, and the result is a bare score:
///
/// ```text
/// Table 3
/// AS
/// Alice Smith Stormcast Eternals (Host of the Everchosen)
/// 14-9
/// BJ
/// Bob Jones Nighthaunt [Emerald Host]
/// Dropped
/// To the Battle
/// Finished
/// ```
///
/// Initials rows and "Dropped" / "Victory Points" lines are skipped. The
/// outcome comes only from the score.
pub struct MilarkiParser {
    catalog: Arc<FactionCatalog>,
    table_header: Regex,
    score: Regex,
    annotations: Regex,
}

impl MilarkiParser {
    pub fn new(catalog: Arc<FactionCatalog>) -> Self {
        Self {
            catalog,
            table_header: Regex::new(r"(?i)^Table\s*(\d+)").expect("table header pattern"),
            score: Regex::new(r"^([0-9]+)-([0-9]+)$").expect("score pattern"),
            annotations: Regex::new(r"\s*\(.*?\)|\s*\[.*?\]").expect("annotation pattern"),
        }
    }

    fn header_table(&self, line: &str) -> Option<Result<u32, ParseErrorKind>> {
        let caps = self.table_header.captures(line)?;
        let digits = &caps[1];
        Some(match digits.parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ParseErrorKind::InvalidTableNumber {
                token: line.to_string(),
            }),
        })
    }

    /// How player 1's score compares to player 2's
    fn parse_score(&self, line: &str) -> Result<Ordering, ParseErrorKind> {
        let caps = self
            .score
            .captures(line)
            .ok_or_else(|| ParseErrorKind::InvalidScoreFormat {
                line: line.to_string(),
            })?;
        Ok(compare_digits(&caps[1], &caps[2]))
    }

    /// Split a combined player line into (name, display faction)
    fn player(&self, raw: &str) -> Result<(String, String), ParseErrorKind> {
        let stripped = self.annotations.replace_all(raw, "");
        let (name, faction) = self.catalog.split_name_and_faction(&stripped)?;
        Ok((name, self.catalog.canonicalize(&faction)))
    }
}

/// Lines the Milarki UI interleaves with pairings
fn is_noise(line: &str) -> bool {
    let is_initials = line.len() == 2 && line.bytes().all(|b| b.is_ascii_uppercase());
    let lower = line.to_ascii_lowercase();
    is_initials || lower.contains("dropped") || lower.contains("victory points")
}

/// Index of the next line at or after `from` that is not noise
fn next_substantive(lines: &[&str], mut from: usize) -> usize {
    while from < lines.len() && is_noise(lines[from]) {
        from += 1;
    }
    from
}

/// Numeric comparison of two ASCII digit strings of any length
fn compare_digits(first: &str, second: &str) -> Ordering {
    let first = first.trim_start_matches('0');
    let second = second.trim_start_matches('0');
    first.len().cmp(&second.len()).then_with(|| first.cmp(second))
}

fn outcomes(score: Ordering) -> (Outcome, Outcome) {
    match score {
        Ordering::Greater => (Outcome::Win, Outcome::Loss),
        Ordering::Less => (Outcome::Loss, Outcome::Win),
        Ordering::Equal => (Outcome::Draw, Outcome::Draw),
    }
}

impl PairingParser for MilarkiParser {
    fn source(&self) -> Source {
        Source::Milarki
    }

    fn parse_round(
        &self,
        ctx: &RoundContext<'_>,
        lines: &[&str],
        out: &mut RoundOutput,
    ) -> Result<(), ParseErrorKind> {
        let mut i = 0;

        while i < lines.len() {
            let table = match self.header_table(lines[i]) {
                Some(table) => table?,
                None => {
                    i += 1;
                    continue;
                }
            };

            i = next_substantive(lines, i + 1);
            let player_1_raw = lines.get(i).copied().unwrap_or("");

            i = next_substantive(lines, i + 1);
            let score_line = lines.get(i).copied().unwrap_or("");
            let score = self.parse_score(score_line)?;

            i = next_substantive(lines, i + 1);
            let player_2_raw = lines.get(i).copied().unwrap_or("");
            i += 1;

            // Boilerplate, but never swallow the next header
            for _ in 0..TRAILING_LINES {
                match lines.get(i) {
                    Some(line) if self.header_table(line).is_none() => i += 1,
                    _ => break,
                }
            }

            let (player_1_name, player_1_faction) = self.player(player_1_raw)?;
            let (player_2_name, player_2_faction) = self.player(player_2_raw)?;
            let (outcome_1, outcome_2) = outcomes(score);

            out.matches.push(ctx.build(
                table,
                PlayerLine::new(player_1_name, player_1_faction, outcome_1),
                PlayerLine::new(player_2_name, player_2_faction, outcome_2),
            ));
        }

        Ok(())
    }
}
