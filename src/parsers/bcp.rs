use crate::core::{Outcome, Source};
use crate::error::ParseErrorKind;
use crate::parsers::{PairingParser, PlayerLine, RoundContext, RoundOutput};

/// Tokens per pairing: table, then name/faction/outcome for each player
const TOKENS_PER_MATCH: usize = 7;

/// Link text copied along with each pairing from the BCP site
const SENTINELS: &[&str] = &["View List", "No List"];

/// Best Coast Pairings parser.
///
/// A round block is a flat run of 7-line groups:
///
/// ```text
/// 1
/// Alice
/// Stormcast Eternals: Thunderstrike Stormhost
/// Win: 3-0
/// View List
/// Bob
/// Nighthaunt: Emerald Host
/// Loss: 0-3
/// View List
/// ```
///
/// Faction and outcome lines keep only the text before the first colon.
#[derive(Debug, Default, Clone, Copy)]
pub struct BcpParser;

impl BcpParser {
    pub fn new() -> Self {
        Self
    }

    fn build_match(
        ctx: &RoundContext<'_>,
        tokens: &[&str],
    ) -> Result<crate::core::Match, ParseErrorKind> {
        let table_number = match tokens[0].parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => {
                return Err(ParseErrorKind::InvalidTableNumber {
                    token: tokens[0].to_string(),
                })
            }
        };

        let player_1 =
            PlayerLine::new(tokens[1], before_colon(tokens[2]), parse_outcome(tokens[3])?);
        let player_2 =
            PlayerLine::new(tokens[4], before_colon(tokens[5]), parse_outcome(tokens[6])?);

        Ok(ctx.build(table_number, player_1, player_2))
    }
}

impl PairingParser for BcpParser {
    fn source(&self) -> Source {
        Source::Bcp
    }

    fn parse_round(
        &self,
        ctx: &RoundContext<'_>,
        lines: &[&str],
        out: &mut RoundOutput,
    ) -> Result<(), ParseErrorKind> {
        let mut tokens: Vec<&str> = Vec::with_capacity(TOKENS_PER_MATCH);

        for &line in lines {
            if SENTINELS.contains(&line) {
                continue;
            }
            tokens.push(line);

            if tokens.len() == TOKENS_PER_MATCH {
                out.matches.push(Self::build_match(ctx, &tokens)?);
                tokens.clear();
            }
        }

        if !tokens.is_empty() {
            return Err(ParseErrorKind::IncompleteMatch {
                tokens: tokens.iter().map(|t| t.to_string()).collect(),
            });
        }

        Ok(())
    }
}

fn before_colon(token: &str) -> &str {
    match token.find(':') {
        Some(idx) => token[..idx].trim(),
        None => token,
    }
}

fn parse_outcome(token: &str) -> Result<Outcome, ParseErrorKind> {
    match Outcome::parse(before_colon(token)) {
        Some(outcome) if outcome != Outcome::Unresolved => Ok(outcome),
        _ => Err(ParseErrorKind::UnknownOutcome {
            token: token.to_string(),
        }),
    }
}
