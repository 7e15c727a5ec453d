use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use time::{Date, Duration, macros::date};

use finboard_server::models::{Category, CategoryKind};
use finboard_server::reports::{
    CategoryAmount, DatedAmount, category_distribution, daily_overview, monthly_overview,
};

// Benchmark constants
const BENCH_ANCHOR: Date = date!(2025 - 11 - 22);
const BENCH_RECORD_COUNT: usize = 1000;

fn dated_records(count: usize) -> Vec<DatedAmount> {
    (0..count)
        .map(|i| DatedAmount {
            date: BENCH_ANCHOR - Duration::days((i % 400) as i64),
            amount: 10.0 + (i % 100) as f64,
        })
        .collect()
}

fn category_records(count: usize) -> Vec<CategoryAmount> {
    (0..count)
        .map(|i| CategoryAmount {
            category: format!("category_{}", i % 10),
            amount: 10.0 + (i % 100) as f64,
        })
        .collect()
}

fn bench_categories() -> Vec<Category> {
    (0..10)
        .map(|i| Category {
            id: format!("cat-{}", i),
            name: format!("category_{}", i),
            color: format!("#0000{:02x}", i * 20),
            kind: CategoryKind::All,
            user_id: None,
        })
        .collect()
}

fn bench_daily_overview(c: &mut Criterion) {
    let records = dated_records(BENCH_RECORD_COUNT);

    c.bench_function("daily_overview_7_days", |b| {
        b.iter(|| daily_overview(black_box(&records), 7, BENCH_ANCHOR))
    });

    c.bench_function("daily_overview_28_days", |b| {
        b.iter(|| daily_overview(black_box(&records), 28, BENCH_ANCHOR))
    });
}

fn bench_monthly_overview(c: &mut Criterion) {
    let records = dated_records(BENCH_RECORD_COUNT);

    c.bench_function("monthly_overview_12_months", |b| {
        b.iter(|| monthly_overview(black_box(&records), BENCH_ANCHOR))
    });
}

fn bench_category_distribution(c: &mut Criterion) {
    let records = category_records(BENCH_RECORD_COUNT);
    let categories = bench_categories();

    c.bench_function("category_distribution_1000_records", |b| {
        b.iter(|| category_distribution(black_box(&records), black_box(&categories)))
    });
}

criterion_group!(
    benches,
    bench_daily_overview,
    bench_monthly_overview,
    bench_category_distribution
);
criterion_main!(benches);
