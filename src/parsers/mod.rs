//! Parsers for pairing text pasted from third-party tournament sites.
//!
//! Each submission is one tournament with 1-5 round blocks. A parser turns
//! one block into matches; [`parse_submission`] drives it over every block
//! and either returns all matches or the first fatal error.

pub mod bcp;
pub mod milarki;
pub mod snl;

use chrono::NaiveDate;
use std::sync::Arc;

use crate::core::{Match, Outcome, Source};
use crate::error::{ParseError, ParseErrorKind};
use crate::factions::FactionCatalog;
use crate::health::DataQualityIssue;

pub use bcp::BcpParser;
pub use milarki::MilarkiParser;
pub use snl::SnlParser;

/// Split raw text into trimmed, non-empty lines (CRLF, CR and LF all count)
pub fn tokenize(raw_text: &str) -> Vec<&str> {
    raw_text
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Trait for source-specific pairing parsers
pub trait PairingParser: Send + Sync {
    /// Site this parser understands
    fn source(&self) -> Source;

    /// Parse one tokenized round block, appending matches to `out.matches`
    fn parse_round(&self, ctx: &RoundContext<'_>, lines: &[&str], out: &mut RoundOutput)
        -> Result<(), ParseErrorKind>;
}

/// Parser for `source`
pub fn parser_for(source: Source, catalog: Arc<FactionCatalog>) -> Box<dyn PairingParser> {
    match source {
        Source::Bcp => Box::new(BcpParser::new()),
        Source::Snl => Box::new(SnlParser::new()),
        Source::Milarki => Box::new(MilarkiParser::new(catalog)),
    }
}

/// Fields shared by every match in a round block
#[derive(Debug, Clone, Copy)]
pub struct RoundContext<'a> {
    pub tournament_name: &'a str,
    pub start_date: NaiveDate,
    /// 1-based position of the block in the submission
    pub round: u32,
    pub source: Source,
}

/// One player's line of a pairing
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerLine {
    pub name: String,
    pub faction: String,
    pub outcome: Outcome,
}

impl PlayerLine {
    pub fn new(name: impl Into<String>, faction: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            name: name.into(),
            faction: faction.into(),
            outcome,
        }
    }
}

impl RoundContext<'_> {
    pub fn build(&self, table_number: u32, player_1: PlayerLine, player_2: PlayerLine) -> Match {
        Match {
            tournament_name: self.tournament_name.to_string(),
            start_date: self.start_date,
            round: self.round,
            table_number,
            player_1_name: player_1.name,
            player_1_faction: player_1.faction,
            player_1_outcome: player_1.outcome,
            player_2_name: player_2.name,
            player_2_faction: player_2.faction,
            player_2_outcome: player_2.outcome,
            source: self.source,
        }
    }
}

/// Matches and non-fatal issues collected from one round block
#[derive(Debug, Default)]
pub struct RoundOutput {
    pub matches: Vec<Match>,
    pub issues: Vec<DataQualityIssue>,
}

/// Everything parsed from a submission
#[derive(Debug, Default, Clone)]
pub struct ParseReport {
    pub matches: Vec<Match>,
    pub issues: Vec<DataQualityIssue>,
}

/// Parse every round block of a submission.
///
/// All-or-nothing: the first fatal error discards everything parsed so far.
pub fn parse_submission<S: AsRef<str>>(
    parser: &dyn PairingParser,
    tournament_name: &str,
    start_date: NaiveDate,
    rounds: &[S],
) -> Result<ParseReport, ParseError> {
    let mut report = ParseReport::default();

    for (index, raw) in rounds.iter().enumerate() {
        let ctx = RoundContext {
            tournament_name,
            start_date,
            round: index as u32 + 1,
            source: parser.source(),
        };
        let lines = tokenize(raw.as_ref());
        let mut out = RoundOutput::default();

        if let Err(kind) = parser.parse_round(&ctx, &lines, &mut out) {
            return Err(ParseError::new(
                ctx.round,
                report.matches.len() + out.matches.len(),
                kind,
            ));
        }

        tracing::debug!(
            "{} round {}: {} matches from {} lines",
            parser.source(),
            ctx.round,
            out.matches.len(),
            lines.len()
        );
        for issue in &out.issues {
            tracing::warn!("{}", issue);
        }

        report.matches.append(&mut out.matches);
        report.issues.append(&mut out.issues);
    }

    Ok(report)
}
