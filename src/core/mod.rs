pub mod match_record;
pub mod rating;

pub use match_record::{Match, MatchView, Outcome, Seat, Source, StoredMatch};
pub use rating::{PlayerEloState, Rating};
