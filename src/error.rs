use thiserror::Error;

/// Main error type for the rankings engine
#[derive(Error, Debug)]
pub enum RankingsError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading errors
    #[error("Config error: {0}")]
    Config(String),

    /// Pasted pairing text could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A stored match cannot be replayed by the Elo engine
    #[error("Malformed match #{id}: {reason}")]
    MalformedMatch { id: i64, reason: String },

    /// Wrong number of round blocks submitted
    #[error("Expected between 1 and {max} rounds, got {count}")]
    InvalidRoundCount { count: usize, max: usize },

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<String> for RankingsError {
    fn from(s: String) -> Self {
        RankingsError::Other(s)
    }
}

impl From<&str> for RankingsError {
    fn from(s: &str) -> Self {
        RankingsError::Other(s.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, RankingsError>;

/// Fatal parse failure for one ingest submission.
///
/// Carries the round it happened in and how many matches had already been
/// parsed, so an operator can locate the offending block. Nothing parsed
/// before the failure is ever stored.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Round {round}: {kind} ({matches_parsed} matches parsed before failure)")]
pub struct ParseError {
    pub round: u32,
    pub matches_parsed: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(round: u32, matches_parsed: usize, kind: ParseErrorKind) -> Self {
        Self {
            round,
            matches_parsed,
            kind,
        }
    }
}

/// What went wrong while parsing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// No catalog faction is a suffix of the combined name string
    #[error("Could not parse name/faction from {raw:?}{}", did_you_mean(.suggestion))]
    UnknownFaction {
        raw: String,
        suggestion: Option<String>,
    },

    /// A faction suffix matched but nothing was left for the player name
    #[error("Missing player name in {raw:?}")]
    MissingPlayerName { raw: String },

    /// BCP tokens left over that do not form a whole match
    #[error("Incomplete match data: {tokens:?}")]
    IncompleteMatch { tokens: Vec<String> },

    /// Milarki score line is not `<digits>-<digits>`
    #[error("Invalid score format: {line:?}")]
    InvalidScoreFormat { line: String },

    /// Table number is not a positive integer
    #[error("Invalid table number: {token:?}")]
    InvalidTableNumber { token: String },

    /// Outcome text is not Win/Loss/Draw/Bye
    #[error("Unknown outcome: {token:?}")]
    UnknownOutcome { token: String },
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean {s}?)"),
        None => String::new(),
    }
}
