//! Query engine benchmarks over a 10k document store.
//!
//! Run with: cargo bench -p dbj

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dbj::{FindOptions, Store, TextMatch};
use serde_json::json;

const NAMES: [&str; 8] = [
    "André", "Bia", "John", "Baby", "Ana", "bob silva", "Ângela", "Lee",
];

fn seeded_store(size: usize) -> Store {
    let mut store = Store::in_memory();
    for i in 0..size {
        let name = NAMES[i % NAMES.len()];
        let age = if i % 2 == 0 {
            json!(i % 90)
        } else {
            json!((i % 90).to_string())
        };
        store
            .insert_value(json!({ "name": format!("{name} {i}"), "age": age }), None)
            .expect("insert");
    }
    store
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("insert_10k", |b| {
        b.iter(|| black_box(seeded_store(10_000)))
    });
}

fn bench_find_num(c: &mut Criterion) {
    let store = seeded_store(10_000);
    c.bench_function("find_num", |b| {
        b.iter(|| store.find_num(black_box("age >= 18")).expect("expression"))
    });
}

fn bench_find_text(c: &mut Criterion) {
    let store = seeded_store(10_000);
    let mut group = c.benchmark_group("find_text");

    for (label, opts) in [
        ("default", TextMatch::default()),
        ("no_fold", TextMatch::default().fold_diacritics(false)),
        ("exact_sensitive", TextMatch::default().exact(true).case_sensitive(true)),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(label), &opts, |b, opts| {
            b.iter(|| store.find_text("name", black_box("andre"), *opts))
        });
    }

    group.finish();
}

fn bench_find(c: &mut Criterion) {
    let store = seeded_store(10_000);
    let mut group = c.benchmark_group("find");

    let queries = [
        "age >= 18",
        "name ?= \"andre\" and age < 30",
        "name == \"ana\" or name ?= \"silva\" and age > 18",
    ];

    for query in queries {
        group.bench_with_input(BenchmarkId::from_parameter(query), &query, |b, query| {
            b.iter(|| store.find(black_box(query), &FindOptions::default()).expect("query"))
        });
    }

    group.bench_function("sorted", |b| {
        let opts = FindOptions::default().sort_by("age", false);
        b.iter(|| store.find(black_box("age >= 18"), &opts).expect("query"))
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_find_num, bench_find_text, bench_find);
criterion_main!(benches);
