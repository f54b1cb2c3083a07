use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Instant;

use crate::config::RankingsConfig;
use crate::core::{Match, Rating, Source, StoredMatch};
use crate::elo::{assign_ranks, EloEngine};
use crate::error::{RankingsError, Result};
use crate::factions::FactionCatalog;
use crate::health::{self, DataQualityIssue};
use crate::parsers::{parse_submission, parser_for};
use crate::stats::{self, EventSummary, FactionStanding, PlayerProfile, Standing, TournamentSummary};
use crate::store::{MatchFilter, MatchStore, MemoryStore, RatingStore, SqliteStore};

/// Outcome of a stored submission
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// Store ids, in the same order as `matches`
    pub ids: Vec<i64>,
    pub matches: Vec<Match>,
    /// Non-fatal problems found while parsing
    pub issues: Vec<DataQualityIssue>,
}

/// Ingest, rating and read-side orchestrator
pub struct RankingsService {
    matches: Arc<dyn MatchStore>,
    ratings: Arc<dyn RatingStore>,
    catalog: Arc<FactionCatalog>,
    engine: EloEngine,
    config: RankingsConfig,
}

impl RankingsService {
    /// Open the SQLite database named in `config`
    pub fn open(config: RankingsConfig) -> Result<Self> {
        let store = Arc::new(SqliteStore::new(&config.database_path)?);
        Ok(Self::with_stores(
            config,
            store.clone(),
            store,
            Arc::new(FactionCatalog::default()),
        ))
    }

    /// Throwaway service backed by [`MemoryStore`]
    pub fn in_memory(config: RankingsConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::with_stores(config, store.clone(), store, Arc::new(FactionCatalog::default()))
    }

    pub fn with_stores(
        config: RankingsConfig,
        matches: Arc<dyn MatchStore>,
        ratings: Arc<dyn RatingStore>,
        catalog: Arc<FactionCatalog>,
    ) -> Self {
        Self {
            matches,
            ratings,
            catalog,
            engine: EloEngine::new(config.elo),
            config,
        }
    }

    pub fn config(&self) -> &RankingsConfig {
        &self.config
    }

    pub fn catalog(&self) -> &FactionCatalog {
        &self.catalog
    }

    /// Parse a pasted submission and store every match it contains.
    ///
    /// Blank round blocks are dropped and the rest numbered from 1. The whole
    /// submission is parsed before anything is written, so a parse failure
    /// leaves the store untouched.
    pub async fn ingest<S: AsRef<str>>(
        &self,
        source: Source,
        tournament_name: &str,
        start_date: NaiveDate,
        rounds: &[S],
    ) -> Result<IngestReport> {
        let start = Instant::now();

        let rounds: Vec<&str> = rounds
            .iter()
            .map(|r| r.as_ref())
            .filter(|r| !r.trim().is_empty())
            .collect();
        if rounds.is_empty() || rounds.len() > self.config.max_rounds {
            return Err(RankingsError::InvalidRoundCount {
                count: rounds.len(),
                max: self.config.max_rounds,
            });
        }

        let parser = parser_for(source, self.catalog.clone());
        let report =
            parse_submission(parser.as_ref(), tournament_name.trim(), start_date, &rounds)?;
        let ids = self.matches.insert_matches(&report.matches).await?;

        tracing::info!(
            "Ingested {} matches from {} ({} rounds) for {} in {:.1}ms",
            ids.len(),
            source,
            rounds.len(),
            tournament_name,
            start.elapsed().as_secs_f64() * 1000.0
        );
        if !report.issues.is_empty() {
            tracing::warn!("{} data-quality issues in {}", report.issues.len(), tournament_name);
        }

        Ok(IngestReport {
            ids,
            matches: report.matches,
            issues: report.issues,
        })
    }

    /// Replay every stored match and publish the resulting ranked ratings.
    ///
    /// On failure the previously published ratings stay in place.
    pub async fn recalculate(&self) -> Result<Vec<Rating>> {
        let start = Instant::now();

        let matches = self.matches.list_matches(&MatchFilter::all()).await?;
        let ratings = assign_ranks(self.engine.recompute_ratings(&matches)?);
        self.ratings.clear_and_replace_ratings(&ratings).await?;

        tracing::info!(
            "Recalculated {} ratings from {} matches in {:.1}ms",
            ratings.len(),
            matches.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(ratings)
    }

    pub async fn rankings(&self) -> Result<Vec<Standing>> {
        let ratings = self.ratings.list_ratings().await?;
        Ok(stats::standings(ratings, &self.config.elo))
    }

    pub async fn faction_rankings(&self, faction: &str) -> Result<Vec<FactionStanding>> {
        let ratings = self.ratings.list_ratings().await?;
        Ok(stats::faction_rankings(&ratings, faction, &self.config.elo))
    }

    pub async fn events(&self) -> Result<Vec<EventSummary>> {
        let matches = self.matches.list_matches(&MatchFilter::all()).await?;
        Ok(stats::events(&matches))
    }

    pub async fn tournaments(&self) -> Result<Vec<TournamentSummary>> {
        let matches = self.matches.list_matches(&MatchFilter::all()).await?;
        Ok(stats::tournaments(&matches))
    }

    pub async fn tournament_matches(&self, tournament_name: &str) -> Result<Vec<StoredMatch>> {
        self.matches
            .list_matches(&MatchFilter::tournament(tournament_name))
            .await
    }

    pub async fn player_matches(&self, player_name: &str) -> Result<Vec<StoredMatch>> {
        self.matches.list_matches(&MatchFilter::player(player_name)).await
    }

    pub async fn faction_matches(&self, faction: &str) -> Result<Vec<StoredMatch>> {
        self.matches.list_matches(&MatchFilter::faction(faction)).await
    }

    pub async fn player_profile(&self, player_name: &str) -> Result<PlayerProfile> {
        let matches = self.player_matches(player_name).await?;
        let rating = self.ratings.get_rating(player_name).await?;

        if matches.is_empty() && rating.is_none() {
            return Err(RankingsError::NotFound(format!("player {}", player_name)));
        }
        Ok(PlayerProfile::build(player_name, rating, matches, &self.config.elo))
    }

    /// Remove a tournament's matches; ratings change on the next recalculation
    pub async fn delete_tournament(&self, tournament_name: &str) -> Result<u64> {
        let deleted = self.matches.delete_tournament(tournament_name).await?;
        if deleted == 0 {
            return Err(RankingsError::NotFound(format!("tournament {}", tournament_name)));
        }
        tracing::info!("Deleted {} matches of {}", deleted, tournament_name);
        Ok(deleted)
    }

    pub async fn delete_match(&self, id: i64) -> Result<()> {
        if !self.matches.delete_match(id).await? {
            return Err(RankingsError::NotFound(format!("match #{}", id)));
        }
        tracing::info!("Deleted match #{}", id);
        Ok(())
    }

    /// Data-quality report over every stored match
    pub async fn health(&self) -> Result<Vec<DataQualityIssue>> {
        let matches = self.matches.list_matches(&MatchFilter::all()).await?;
        Ok(health::check(&matches, &self.catalog))
    }
}
