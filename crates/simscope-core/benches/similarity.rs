//! Benchmarks for similarity scoring, ranking and scene projection.
//!
//! Performance budgets:
//! - top-K over a 1024-item pool (eager): **< 100μs**
//! - Scene projection with a selection on 1024 items: **< 500μs**

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use simscope_core::{
    Corpus, CorpusRow, SceneOptions, SessionState, SimilarityIndex, SimilarityStrategy,
    cosine_similarity, project,
};

/// Pseudo-random vector from an iterated LCG.
fn pseudo_random_vector(dim: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    (0..dim)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 33) as f64 / f64::from(u32::MAX) * 10.0 - 5.0
        })
        .collect()
}

fn synthetic_corpus(n: usize, dim: usize) -> Corpus {
    let rows = (0..n).map(|i| {
        CorpusRow::new(
            format!("synthetic text {i}"),
            pseudo_random_vector(dim, i as u64 + 1),
            (i % 8) as i64,
        )
    });
    Corpus::load(rows).unwrap()
}

// =============================================================================
// Cosine
// =============================================================================

fn bench_cosine(c: &mut Criterion) {
    let mut group = c.benchmark_group("cosine");

    for dim in [3, 64, 384, 1536] {
        let a = pseudo_random_vector(dim, 7);
        let b = pseudo_random_vector(dim, 11);
        group.bench_with_input(BenchmarkId::new("dim", dim), &(a, b), |bench, (a, b)| {
            bench.iter(|| cosine_similarity(black_box(a), black_box(b)));
        });
    }

    group.finish();
}

// =============================================================================
// Index build and top-K
// =============================================================================

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");

    for n in [64, 256, 1024] {
        let corpus = synthetic_corpus(n, 64);
        group.bench_with_input(BenchmarkId::new("eager", n), &corpus, |b, corpus| {
            b.iter(|| SimilarityIndex::build(corpus, SimilarityStrategy::Eager));
        });
    }

    group.finish();
}

fn bench_top_k(c: &mut Criterion) {
    let mut group = c.benchmark_group("top_k");

    for n in [64, 256, 1024] {
        let corpus = synthetic_corpus(n, 64);
        let pool = corpus.pool(None);
        for strategy in [SimilarityStrategy::Eager, SimilarityStrategy::Lazy] {
            let index = SimilarityIndex::build(&corpus, strategy);
            group.bench_with_input(
                BenchmarkId::new(strategy.to_string(), n),
                &pool,
                |b, pool| {
                    b.iter(|| index.top_k_in_pool(pool, black_box(0), 20));
                },
            );
        }
    }

    group.finish();
}

// =============================================================================
// Projection
// =============================================================================

fn bench_project(c: &mut Criterion) {
    let mut group = c.benchmark_group("project");

    for n in [64, 1024] {
        let corpus = synthetic_corpus(n, 64);
        let index = SimilarityIndex::build(&corpus, SimilarityStrategy::Eager);
        let mut state = SessionState::for_corpus(n, 20);
        state.selected_index = Some(0);
        state.hovered_index = Some(1);

        group.bench_with_input(BenchmarkId::new("selected", n), &state, |b, state| {
            b.iter(|| project(&corpus, &index, state, SceneOptions::default()));
        });
    }

    group.finish();
}

// =============================================================================
// Criterion groups and main
// =============================================================================

criterion_group!(
    benches,
    bench_cosine,
    bench_index_build,
    bench_top_k,
    bench_project
);
criterion_main!(benches);
