use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use realms_rankings::{RankingsConfig, RankingsService, Source};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rankings-cli")]
#[command(about = "Tournament ingest and Elo rankings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database path (overrides the config file)
    #[arg(short, long)]
    db: Option<String>,

    /// Print JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse pasted round text and store the matches
    Ingest {
        /// bcp, snl or milarki
        #[arg(short, long, value_parser = parse_source)]
        source: Source,

        /// Tournament name
        #[arg(short, long)]
        tournament: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,

        /// One text file per round, in round order
        #[arg(required = true)]
        rounds: Vec<PathBuf>,
    },

    /// Replay every match and publish new ratings
    Recalculate,

    /// Show the leaderboard
    Rankings {
        /// Only players preferring this faction
        #[arg(short, long)]
        faction: Option<String>,
    },

    /// List events, newest first
    Events,

    /// List stored tournaments
    Tournaments,

    /// Show a player's profile
    Player { name: String },

    /// List matches
    Matches {
        #[arg(short, long)]
        player: Option<String>,

        #[arg(short, long)]
        faction: Option<String>,

        #[arg(short, long)]
        tournament: Option<String>,
    },

    /// Delete every match of a tournament
    DeleteTournament { name: String },

    /// Delete one match by id
    DeleteMatch { id: i64 },

    /// Report suspicious match rows
    Health,
}

fn parse_source(s: &str) -> Result<Source, String> {
    Source::parse(s).ok_or_else(|| format!("unknown source {:?} (expected bcp, snl or milarki)", s))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("{}: {}", s, e))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RankingsConfig::from_file(path)?,
        None => RankingsConfig::default(),
    };
    if let Some(db) = cli.db {
        config.database_path = db;
    }

    let service = RankingsService::open(config)?;
    tracing::debug!("Using database {}", service.config().database_path);

    match cli.command {
        Commands::Ingest {
            source,
            tournament,
            date,
            rounds,
        } => {
            let mut texts = Vec::with_capacity(rounds.len());
            for path in &rounds {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                texts.push(text);
            }

            let report = service.ingest(source, &tournament, date, &texts).await?;

            if cli.json {
                print_json(&report.matches)?;
            } else {
                println!("✅ Stored {} matches for {}", report.ids.len(), tournament);
                for m in &report.matches {
                    println!(
                        "   R{} T{}: {} ({}) {} vs {} ({}) {}",
                        m.round,
                        m.table_number,
                        m.player_1_name,
                        m.player_1_faction,
                        m.player_1_outcome,
                        m.player_2_name,
                        m.player_2_faction,
                        m.player_2_outcome
                    );
                }
            }
            if !report.issues.is_empty() {
                println!("\n⚠️ Data-quality issues:");
                for issue in &report.issues {
                    println!("   {}", issue);
                }
            }
        }

        Commands::Recalculate => {
            let ratings = service.recalculate().await?;
            println!("✅ Published {} ratings", ratings.len());
        }

        Commands::Rankings { faction } => match faction {
            Some(faction) => {
                let catalog = service.catalog();
                let faction = catalog.canonicalize(&faction);
                if !catalog.is_known(&faction) {
                    match catalog.suggest(&faction) {
                        Some(close) => {
                            println!("⚠️ Unknown faction {faction:?}, did you mean {close}?")
                        }
                        None => println!("⚠️ Unknown faction {faction:?}"),
                    }
                }
                let rows = service.faction_rankings(&faction).await?;
                if cli.json {
                    print_json(&rows)?;
                } else {
                    println!("🏆 {} Rankings", faction);
                    for row in &rows {
                        let r = &row.standing.rating;
                        println!(
                            "   {:>3} ({:>4} overall)  {:<30} {:>5}  {:>3} matches{}",
                            row.faction_rank,
                            r.rank,
                            r.player_name,
                            r.display_rating(),
                            r.matches_played,
                            if row.standing.provisional { "  *" } else { "" }
                        );
                    }
                }
            }
            None => {
                let rows = service.rankings().await?;
                if cli.json {
                    print_json(&rows)?;
                } else {
                    println!("🏆 Rankings");
                    for row in &rows {
                        let r = &row.rating;
                        println!(
                            "   {:>4}  {:<30} {:<28} {:>5}  {:>3} matches{}",
                            r.rank,
                            r.player_name,
                            r.preferred_faction,
                            r.display_rating(),
                            r.matches_played,
                            if row.provisional { "  *" } else { "" }
                        );
                    }
                }
            }
        },

        Commands::Events => {
            let events = service.events().await?;
            if cli.json {
                print_json(&events)?;
            } else {
                for e in &events {
                    println!("   {}  {}", e.start_date, e.tournament_name);
                }
            }
        }

        Commands::Tournaments => {
            let tournaments = service.tournaments().await?;
            if cli.json {
                print_json(&tournaments)?;
            } else {
                for t in &tournaments {
                    println!("   {}  {:<40} {}", t.start_date, t.tournament_name, t.source);
                }
            }
        }

        Commands::Player { name } => {
            let profile = service.player_profile(&name).await?;
            if cli.json {
                print_json(&profile)?;
            } else {
                println!("👤 {}", profile.player_name);
                if let Some(standing) = &profile.standing {
                    println!(
                        "   Rank: {}  Rating: {}{}",
                        standing.rating.rank,
                        standing.rating.display_rating(),
                        if standing.provisional { " (provisional)" } else { "" }
                    );
                }
                println!("   Record: {}", profile.record);
                if let Some(best) = &profile.best_event {
                    println!("   Best event: {} ({})", best.tournament_name, best.record);
                }
                println!("   Most played: {}", profile.most_played_factions.join(", "));
                println!("   Best matchup: {}", profile.best_matchup.as_deref().unwrap_or("-"));
                println!("   Nemesis: {}", profile.nemesis.as_deref().unwrap_or("-"));

                println!("\n📋 History:");
                for m in &profile.history {
                    if let Some(view) = m.view_for(&profile.player_name) {
                        println!(
                            "   {} {} R{}: {} vs {} ({})",
                            m.start_date,
                            m.tournament_name,
                            m.round,
                            view.outcome,
                            view.opponent,
                            view.opponent_faction
                        );
                    }
                }
            }
        }

        Commands::Matches {
            player,
            faction,
            tournament,
        } => {
            let matches = match (player, faction, tournament) {
                (Some(player), _, _) => service.player_matches(&player).await?,
                (None, Some(faction), _) => service.faction_matches(&faction).await?,
                (None, None, Some(tournament)) => service.tournament_matches(&tournament).await?,
                (None, None, None) => anyhow::bail!("pass --player, --faction or --tournament"),
            };
            if cli.json {
                print_json(&matches)?;
            } else {
                for m in &matches {
                    println!(
                        "   #{:<6} {} {} R{} T{}: {} {} vs {} {}",
                        m.id,
                        m.start_date,
                        m.tournament_name,
                        m.round,
                        m.table_number,
                        m.player_1_name,
                        m.player_1_outcome,
                        m.player_2_name,
                        m.player_2_outcome
                    );
                }
            }
        }

        Commands::DeleteTournament { name } => {
            let deleted = service.delete_tournament(&name).await?;
            println!("🧹 Deleted {} matches of {}", deleted, name);
        }

        Commands::DeleteMatch { id } => {
            service.delete_match(id).await?;
            println!("🧹 Deleted match #{}", id);
        }

        Commands::Health => {
            let issues = service.health().await?;
            if cli.json {
                print_json(&issues)?;
            } else if issues.is_empty() {
                println!("✅ No data-quality issues");
            } else {
                println!("⚠️ {} data-quality issues:", issues.len());
                for issue in &issues {
                    println!("   {}", issue);
                }
            }
        }
    }

    Ok(())
}
