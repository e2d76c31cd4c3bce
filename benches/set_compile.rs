#![allow(dead_code, unused)]
//! Benchmarks for set compilation.

use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;
use setra_filter::{Filter, Set, SetCompiler};

fn compiler() -> SetCompiler {
    // Pinned clock so time-window clauses do not hit the OS per leaf.
    SetCompiler::new().with_now(Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap())
}

/// A disjunction of `n` single-condition sets.
fn wide_or(n: usize) -> Set {
    Set::new().any((0..n).map(|i| {
        if i % 2 == 0 {
            Set::new().condition("publics")
        } else {
            Set::new().condition("pendings")
        }
    }))
}

/// `depth` alternating and/or wrappers around one actives leaf.
fn nested(depth: usize) -> Set {
    let mut set = Set::new().condition("actives");
    for level in 0..depth {
        set = if level % 2 == 0 {
            Set::new().all([set])
        } else {
            Set::new().any([set])
        };
    }
    set
}

fn bench_clause_compilation(c: &mut Criterion) {
    let mut group = c.benchmark_group("clause_compilation");
    let compiler = compiler();

    let publics = Set::new().condition("publics");
    group.bench_function("publics", |b| {
        b.iter(|| black_box(compiler.compile_where(&publics)))
    });

    let actives = Set::new().condition("actives");
    group.bench_function("actives", |b| {
        b.iter(|| black_box(compiler.compile_where(&actives)))
    });

    let owners = Set::new().condition_with("owners", "[u1,u2,u3][g1,g2]");
    group.bench_function("owners_parsed", |b| {
        b.iter(|| black_box(compiler.compile_where(&owners)))
    });

    let malformed = Set::new().condition_with("owners", "no brackets");
    group.bench_function("owners_malformed", |b| {
        b.iter(|| black_box(compiler.compile_where(&malformed)))
    });

    let prod = Set::new().condition_with("prod", "[u1][g1]");
    group.bench_function("prod", |b| {
        b.iter(|| black_box(compiler.compile_where(&prod)))
    });

    group.finish();
}

fn bench_set_compilation(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_compilation");
    let compiler = compiler();

    let empty = Set::new();
    let base = Filter::from_json(json!({"where": {"name": "foo"}, "limit": 10}));
    group.bench_function("empty_set_no_op", |b| {
        b.iter(|| black_box(compiler.compile(&empty, base.clone())))
    });

    let siblings = Set::new()
        .condition("publics")
        .condition("pendings")
        .condition("actives");
    group.bench_function("three_siblings", |b| {
        b.iter(|| black_box(compiler.compile_where(&siblings)))
    });

    group.bench_function("merge_with_existing_where", |b| {
        b.iter(|| black_box(compiler.compile(&siblings, base.clone())))
    });

    for n in [4usize, 16, 64] {
        let set = wide_or(n);
        group.bench_with_input(BenchmarkId::new("wide_or", n), &set, |b, set| {
            b.iter(|| black_box(compiler.compile_where(set)))
        });
    }

    for depth in [4usize, 16, 48] {
        let set = nested(depth);
        group.bench_with_input(BenchmarkId::new("nested_depth", depth), &set, |b, set| {
            b.iter(|| black_box(compiler.compile_where(set)))
        });
    }

    group.finish();
}

fn bench_set_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_decoding");

    let flat = json!({"publics": "", "owners": "[u1][g1]"});
    group.bench_function("from_json_flat", |b| {
        b.iter(|| black_box(Set::from_json(flat.clone())))
    });

    let tree = json!({
        "or": [{"publics": ""}, {"and": [{"actives": ""}, {"owners": "[u1][]"}]}]
    });
    group.bench_function("from_json_tree", |b| {
        b.iter(|| black_box(Set::from_json(tree.clone())))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_clause_compilation,
    bench_set_compilation,
    bench_set_decoding,
);

criterion_main!(benches);
