// Ranking benchmarks: raw scoring, filter + sort, and full model recomputes
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use serde_json::{json, Value};
use siftx::{compute_scores, rank, token_sort_ratio, Generation, Scorer, SearchConfig, SearchModel};
use std::sync::Arc;
use std::time::Duration;

const WORDS: &[&str] = &[
    "firefox", "files", "terminal", "settings", "browser", "editor", "music", "player", "video",
    "calendar", "mail", "notes", "system", "monitor", "image", "viewer", "text", "code",
];

fn generate_random_name(rng: &mut impl Rng) -> String {
    let words = rng.random_range(1..4);
    (0..words)
        .map(|_| WORDS[rng.random_range(0..WORDS.len())])
        .collect::<Vec<_>>()
        .join(" ")
}

fn generate_records(count: usize) -> Vec<Arc<Value>> {
    let mut rng = rand::rng();
    (0..count)
        .map(|i| {
            Arc::new(json!({
                "name": generate_random_name(&mut rng),
                "desc": format!("{} {}", generate_random_name(&mut rng), i),
            }))
        })
        .collect()
}

fn benchmark_ratio(c: &mut Criterion) {
    c.bench_function("token_sort_ratio", |b| {
        b.iter(|| token_sort_ratio(black_box("web browser firefox"), black_box("fire fox")));
    });
}

fn benchmark_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_scores");

    for size in [100, 1000, 10000].iter() {
        let records: Arc<[Arc<Value>]> = Arc::from(generate_records(*size));
        let config = SearchConfig {
            query: "music player".into(),
            keys: vec!["name".into(), "desc".into()],
            weights: vec![2.0, 1.0],
            ..Default::default()
        };
        let scorer = Scorer::from_config(&config);

        group.bench_with_input(BenchmarkId::new("weighted", size), size, |b, _| {
            b.iter(|| black_box(compute_scores(&scorer, Generation::ZERO, records.clone())));
        });
    }

    group.finish();
}

fn benchmark_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");

    let records = generate_records(10000);
    let config = SearchConfig {
        query: "code editor".into(),
        cutoff: 0.1,
        ..Default::default()
    };
    let scores = compute_scores(
        &Scorer::from_config(&config),
        Generation::ZERO,
        Arc::from(records.clone()),
    );

    group.bench_function("filter_sort_10k", |b| {
        b.iter(|| black_box(rank(&records, &scores, &config)));
    });

    group.finish();
}

fn benchmark_model_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("model");

    let model = SearchModel::builder()
        .items(generate_records(5000))
        .build()
        .unwrap();
    let queries = ["f", "fi", "fir", "fire", "firef", "firefo", "firefox"];

    // One keystroke at a time, waiting for each ranking.
    group.bench_function("typing_settled", |b| {
        b.iter(|| {
            for query in queries {
                model.set_query(query);
                model.wait_until_current(Duration::from_secs(10));
            }
            model.set_query("");
            model.wait_until_current(Duration::from_secs(10));
        });
    });

    // Keystrokes faster than scoring; only the last one has to land.
    group.bench_function("typing_burst", |b| {
        b.iter(|| {
            for query in queries {
                model.set_query(query);
            }
            model.wait_until_current(Duration::from_secs(10));
            model.set_query("");
            model.wait_until_current(Duration::from_secs(10));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_ratio,
    benchmark_scoring,
    benchmark_rank,
    benchmark_model_recompute
);
criterion_main!(benches);
