use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use realms_rankings::{
    elo::assign_ranks, EloEngine, Match, MatchStore, Outcome, RankingsConfig, RankingsService,
    Source, StoredMatch,
};
use realms_rankings::store::SqliteStore;
use std::sync::Arc;

const FACTIONS: [&str; 4] = ["Stormcast Eternals", "Nighthaunt", "Skaven", "Seraphon"];

fn create_test_matches(count: usize, players: usize) -> Vec<StoredMatch> {
    (0..count)
        .map(|i| {
            let outcomes = match i % 3 {
                0 => (Outcome::Win, Outcome::Loss),
                1 => (Outcome::Loss, Outcome::Win),
                _ => (Outcome::Draw, Outcome::Draw),
            };
            StoredMatch {
                id: i as i64 + 1,
                record: Match {
                    tournament_name: format!("Event {}", i / 100),
                    start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                        + chrono::Duration::days((i / 100) as i64),
                    round: (i % 100 / 20) as u32 + 1,
                    table_number: (i % 20) as u32 + 1,
                    player_1_name: format!("Player {}", i % players),
                    player_1_faction: FACTIONS[i % 4].to_string(),
                    player_1_outcome: outcomes.0,
                    player_2_name: format!("Player {}", (i * 7 + 1) % players),
                    player_2_faction: FACTIONS[(i + 1) % 4].to_string(),
                    player_2_outcome: outcomes.1,
                    source: Source::Bcp,
                },
            }
        })
        .collect()
}

fn bench_recompute(c: &mut Criterion) {
    let engine = EloEngine::default();
    let mut group = c.benchmark_group("recompute_ratings");

    for count in [100, 1_000, 10_000] {
        let matches = create_test_matches(count, count / 4);
        group.bench_with_input(BenchmarkId::from_parameter(count), &matches, |b, matches| {
            b.iter(|| black_box(assign_ranks(engine.recompute_ratings(matches).unwrap())));
        });
    }

    group.finish();
}

fn bench_recalculate_sqlite(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let store = Arc::new(SqliteStore::new(":memory:").unwrap());
    let matches: Vec<Match> = create_test_matches(1_000, 250)
        .into_iter()
        .map(|m| m.record)
        .collect();
    runtime.block_on(store.insert_matches(&matches)).unwrap();

    let service = RankingsService::with_stores(
        RankingsConfig::default(),
        store.clone(),
        store,
        Arc::new(Default::default()),
    );

    c.bench_function("recalculate_sqlite_1000", |b| {
        b.to_async(&runtime)
            .iter(|| async { black_box(service.recalculate().await.unwrap()) });
    });
}

criterion_group!(benches, bench_recompute, bench_recalculate_sqlite);
criterion_main!(benches);
