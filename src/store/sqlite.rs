use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::{Match, Outcome, Rating, Source, StoredMatch};
use crate::error::{RankingsError, Result};
use crate::store::{MatchFilter, MatchStore, RatingStore};

const DATE_FORMAT: &str = "%Y-%m-%d";

const MATCH_COLUMNS: &str = "id, tournament_name, start_date, round, table_number,
    player_1_name, player_1_faction, player_1_outcome,
    player_2_name, player_2_faction, player_2_outcome, source";

/// SQLite-backed match and rating store
///
/// Schema:
/// ```sql
/// CREATE TABLE match_data (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     tournament_name TEXT NOT NULL,
///     start_date TEXT NOT NULL,          -- YYYY-MM-DD
///     round INTEGER NOT NULL,
///     table_number INTEGER NOT NULL,
///     player_1_name TEXT NOT NULL,
///     player_1_faction TEXT NOT NULL,
///     player_1_outcome TEXT NOT NULL,    -- Win/Loss/Draw/Bye or ''
///     player_2_name TEXT NOT NULL,
///     player_2_faction TEXT NOT NULL,
///     player_2_outcome TEXT NOT NULL,
///     source TEXT NOT NULL
/// );
/// CREATE TABLE elo_ratings (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     player_name TEXT NOT NULL,
///     rating REAL NOT NULL DEFAULT 1000,
///     matches_played INTEGER NOT NULL DEFAULT 0,
///     preferred_faction TEXT NOT NULL,
///     rank INTEGER NOT NULL DEFAULT 0
/// );
/// ```
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path`; `:memory:` for tests
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS match_data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tournament_name TEXT NOT NULL,
                start_date TEXT NOT NULL,
                round INTEGER NOT NULL,
                table_number INTEGER NOT NULL,
                player_1_name TEXT NOT NULL,
                player_1_faction TEXT NOT NULL,
                player_1_outcome TEXT NOT NULL,
                player_2_name TEXT NOT NULL,
                player_2_faction TEXT NOT NULL,
                player_2_outcome TEXT NOT NULL,
                source TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_match_chronology
                ON match_data(start_date, round);
            CREATE TABLE IF NOT EXISTS elo_ratings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                player_name TEXT NOT NULL,
                rating REAL NOT NULL DEFAULT 1000,
                matches_played INTEGER NOT NULL DEFAULT 0,
                preferred_faction TEXT NOT NULL,
                rank INTEGER NOT NULL DEFAULT 0
            );",
        )?;

        tracing::debug!("Opened rankings database at {}", db_path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RankingsError::Other("database connection lock poisoned".to_string()))
    }
}

fn insert(conn: &Connection, m: &Match) -> Result<i64> {
    conn.execute(
        "INSERT INTO match_data (tournament_name, start_date, round, table_number,
            player_1_name, player_1_faction, player_1_outcome,
            player_2_name, player_2_faction, player_2_outcome, source)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            m.tournament_name,
            m.start_date.format(DATE_FORMAT).to_string(),
            m.round,
            m.table_number,
            m.player_1_name,
            m.player_1_faction,
            m.player_1_outcome.as_str(),
            m.player_2_name,
            m.player_2_faction,
            m.player_2_outcome.as_str(),
            m.source.label(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Row as stored, before validation
struct MatchRow {
    id: i64,
    tournament_name: String,
    start_date: String,
    round: i64,
    table_number: i64,
    player_1_name: String,
    player_1_faction: String,
    player_1_outcome: String,
    player_2_name: String,
    player_2_faction: String,
    player_2_outcome: String,
    source: String,
}

impl MatchRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            tournament_name: row.get(1)?,
            start_date: row.get(2)?,
            round: row.get(3)?,
            table_number: row.get(4)?,
            player_1_name: row.get(5)?,
            player_1_faction: row.get(6)?,
            player_1_outcome: row.get(7)?,
            player_2_name: row.get(8)?,
            player_2_faction: row.get(9)?,
            player_2_outcome: row.get(10)?,
            source: row.get(11)?,
        })
    }

    fn into_stored(self) -> Result<StoredMatch> {
        let id = self.id;
        let malformed = |reason: String| RankingsError::MalformedMatch { id, reason };

        let start_date = NaiveDate::parse_from_str(&self.start_date, DATE_FORMAT)
            .map_err(|e| malformed(format!("start_date {:?}: {}", self.start_date, e)))?;
        let round =
            u32::try_from(self.round).map_err(|_| malformed(format!("round {}", self.round)))?;
        let table_number = u32::try_from(self.table_number)
            .map_err(|_| malformed(format!("table_number {}", self.table_number)))?;
        let player_1_outcome = Outcome::parse(&self.player_1_outcome)
            .ok_or_else(|| malformed(format!("player_1_outcome {:?}", self.player_1_outcome)))?;
        let player_2_outcome = Outcome::parse(&self.player_2_outcome)
            .ok_or_else(|| malformed(format!("player_2_outcome {:?}", self.player_2_outcome)))?;
        let source = Source::parse(&self.source)
            .ok_or_else(|| malformed(format!("source {:?}", self.source)))?;

        Ok(StoredMatch {
            id,
            record: Match {
                tournament_name: self.tournament_name,
                start_date,
                round,
                table_number,
                player_1_name: self.player_1_name,
                player_1_faction: self.player_1_faction,
                player_1_outcome,
                player_2_name: self.player_2_name,
                player_2_faction: self.player_2_faction,
                player_2_outcome,
                source,
            },
        })
    }
}

fn rating_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Rating> {
    Ok(Rating {
        player_name: row.get(0)?,
        rating: row.get(1)?,
        matches_played: row.get(2)?,
        preferred_faction: row.get(3)?,
        rank: row.get(4)?,
    })
}

#[async_trait]
impl MatchStore for SqliteStore {
    async fn insert_match(&self, m: &Match) -> Result<i64> {
        let conn = self.conn()?;
        insert(&conn, m)
    }

    async fn insert_matches(&self, matches: &[Match]) -> Result<Vec<i64>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut ids = Vec::with_capacity(matches.len());
        for m in matches {
            ids.push(insert(&tx, m)?);
        }

        tx.commit()?;
        Ok(ids)
    }

    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<StoredMatch>> {
        let conn = self.conn()?;

        let sql = format!(
            "SELECT {MATCH_COLUMNS} FROM match_data
             WHERE (?1 IS NULL OR player_1_name = ?1 OR player_2_name = ?1)
               AND (?2 IS NULL OR player_1_faction = ?2 OR player_2_faction = ?2)
               AND (?3 IS NULL OR tournament_name = ?3)
             ORDER BY start_date ASC, round ASC, id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                params![filter.player, filter.faction, filter.tournament],
                MatchRow::from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(MatchRow::into_stored).collect()
    }

    async fn delete_tournament(&self, tournament_name: &str) -> Result<u64> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM match_data WHERE tournament_name = ?",
            params![tournament_name],
        )?;
        Ok(deleted as u64)
    }

    async fn delete_match(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM match_data WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}

#[async_trait]
impl RatingStore for SqliteStore {
    async fn clear_and_replace_ratings(&self, ratings: &[Rating]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM elo_ratings", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO elo_ratings
                    (player_name, rating, matches_played, preferred_faction, rank)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for r in ratings {
                stmt.execute(params![
                    r.player_name,
                    r.rating,
                    r.matches_played,
                    r.preferred_faction,
                    r.rank
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    async fn list_ratings(&self) -> Result<Vec<Rating>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT player_name, rating, matches_played, preferred_faction, rank
             FROM elo_ratings ORDER BY rank ASC, id ASC",
        )?;
        let ratings = stmt
            .query_map([], rating_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ratings)
    }

    async fn get_rating(&self, player_name: &str) -> Result<Option<Rating>> {
        let conn = self.conn()?;
        let rating = conn
            .query_row(
                "SELECT player_name, rating, matches_played, preferred_faction, rank
                 FROM elo_ratings WHERE player_name = ?",
                params![player_name],
                rating_from_row,
            )
            .optional()?;
        Ok(rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::match_record::sample_match;

    fn store() -> SqliteStore {
        SqliteStore::new(":memory:").unwrap()
    }

    #[tokio::test]
    async fn test_store_create() {
        let store = store();
        assert!(store.list_matches(&MatchFilter::all()).await.unwrap().is_empty());
        assert!(store.list_ratings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_and_list_round_trip() {
        let store = store();
        let mut m = sample_match("Alice", Outcome::Win, "Bob", Outcome::Loss);
        m.source = Source::Milarki;

        let id = store.insert_match(&m).await.unwrap();
        let listed = store.list_matches(&MatchFilter::all()).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].record, m);
    }

    #[tokio::test]
    async fn test_unresolved_outcome_stored_as_blank() {
        let store = store();
        let m = sample_match("Alice", Outcome::Unresolved, "", Outcome::Unresolved);
        store.insert_match(&m).await.unwrap();

        let outcome: String = store
            .conn()
            .unwrap()
            .query_row("SELECT player_1_outcome FROM match_data", [], |row| row.get(0))
            .unwrap();
        assert_eq!(outcome, "");

        let listed = store.list_matches(&MatchFilter::all()).await.unwrap();
        assert_eq!(listed[0].player_1_outcome, Outcome::Unresolved);
    }

    #[tokio::test]
    async fn test_list_orders_by_date_round_then_id() {
        let store = store();

        let mut later = sample_match("Alice", Outcome::Win, "Bob", Outcome::Loss);
        later.start_date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let mut round_2 = sample_match("Carol", Outcome::Win, "Dan", Outcome::Loss);
        round_2.round = 2;
        let first = sample_match("Erin", Outcome::Win, "Finn", Outcome::Loss);
        let second = sample_match("Gail", Outcome::Win, "Hugo", Outcome::Loss);

        store
            .insert_matches(&[later, round_2, first, second])
            .await
            .unwrap();

        let names: Vec<String> = store
            .list_matches(&MatchFilter::all())
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.record.player_1_name)
            .collect();
        assert_eq!(names, vec!["Erin", "Gail", "Carol", "Alice"]);
    }

    #[tokio::test]
    async fn test_filters() {
        let store = store();
        let mut other = sample_match("Carol", Outcome::Win, "Alice", Outcome::Loss);
        other.tournament_name = "Other Open".to_string();
        other.player_1_faction = "Skaven".to_string();
        store
            .insert_matches(&[sample_match("Alice", Outcome::Win, "Bob", Outcome::Loss), other])
            .await
            .unwrap();

        assert_eq!(store.list_matches(&MatchFilter::player("Alice")).await.unwrap().len(), 2);
        assert_eq!(store.list_matches(&MatchFilter::player("Bob")).await.unwrap().len(), 1);
        assert_eq!(store.list_matches(&MatchFilter::faction("Skaven")).await.unwrap().len(), 1);
        assert_eq!(
            store.list_matches(&MatchFilter::tournament("Other Open")).await.unwrap()[0]
                .player_1_name,
            "Carol"
        );
    }

    #[tokio::test]
    async fn test_delete_tournament_and_match() {
        let store = store();
        let ids = store
            .insert_matches(&[
                sample_match("Alice", Outcome::Win, "Bob", Outcome::Loss),
                sample_match("Carol", Outcome::Win, "Dan", Outcome::Loss),
            ])
            .await
            .unwrap();

        assert!(store.delete_match(ids[0]).await.unwrap());
        assert!(!store.delete_match(ids[0]).await.unwrap());
        assert_eq!(store.delete_tournament("Test Cup").await.unwrap(), 1);
        assert_eq!(store.delete_tournament("Test Cup").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_malformed_row_fails_listing() {
        let store = store();
        store
            .insert_match(&sample_match("Alice", Outcome::Win, "Bob", Outcome::Loss))
            .await
            .unwrap();
        store
            .conn()
            .unwrap()
            .execute("UPDATE match_data SET player_2_outcome = 'Forfeit'", [])
            .unwrap();

        let result = store.list_matches(&MatchFilter::all()).await;
        assert!(matches!(result, Err(RankingsError::MalformedMatch { id: 1, .. })));
    }

    #[tokio::test]
    async fn test_replace_ratings() {
        let store = store();
        let mut first = Rating::new("Alice", 1025.0, 1);
        first.rank = 1;
        let mut second = Rating::new("Bob", 975.0, 1);
        second.rank = 2;

        store
            .clear_and_replace_ratings(&[first.clone(), second.clone()])
            .await
            .unwrap();
        assert_eq!(store.list_ratings().await.unwrap(), vec![first.clone(), second]);

        store.clear_and_replace_ratings(&[first.clone()]).await.unwrap();
        assert_eq!(store.list_ratings().await.unwrap(), vec![first]);

        assert_eq!(store.get_rating("Alice").await.unwrap().unwrap().rating, 1025.0);
        assert!(store.get_rating("Bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ratings_keep_sub_integer_precision() {
        let store = store();
        let rating = Rating::new("Alice", 1012.3456789, 3);
        store.clear_and_replace_ratings(&[rating]).await.unwrap();
        assert_eq!(store.get_rating("Alice").await.unwrap().unwrap().rating, 1012.3456789);
    }

    #[tokio::test]
    async fn test_failed_batch_inserts_nothing() {
        let store = store();
        store
            .conn()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_bob BEFORE INSERT ON match_data
                 WHEN NEW.player_1_name = 'Bob'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let result = store
            .insert_matches(&[
                sample_match("Alice", Outcome::Win, "Carol", Outcome::Loss),
                sample_match("Bob", Outcome::Win, "Carol", Outcome::Loss),
            ])
            .await;

        assert!(matches!(result, Err(RankingsError::Database(_))));
        assert!(store.list_matches(&MatchFilter::all()).await.unwrap().is_empty());
    }
}
