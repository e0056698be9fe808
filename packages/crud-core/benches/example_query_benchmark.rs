//! Criterion benchmarks for example queries.
//!
//! Measures find/count by example and range counts over a 10k-row car table.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use crud_core::{
    Car, CarService, Comparator, CrudConfig, Entity, Example, InMemoryRecordStore,
};

const ROWS: usize = 10_000;
const MODELS: [&str; 8] = [
    "Ferrari", "Mustang", "Porche", "Fiat", "Lada", "Volvo", "Saab", "Skoda",
];

/// Creates a car service with `ROWS` cars spread over the models.
fn create_benchmark_service() -> CarService<InMemoryRecordStore> {
    let store = Arc::new(InMemoryRecordStore::new());
    store
        .create_table(Car::schema())
        .expect("Failed to create benchmark table");
    let service = CarService::new(store, CrudConfig::default());

    for i in 0..ROWS {
        let car = Car::new()
            .model(MODELS[i % MODELS.len()])
            .name(format!("car {i}"))
            .price((i % 20_000) as f64 * 1.5);
        service.insert(&car).expect("Failed to insert car");
    }
    service
}

fn benchmark_find_by_example(c: &mut Criterion) {
    let service = create_benchmark_service();
    let unique = Car::new().name("car 4242");

    c.bench_function("find_by_example_unique", |b| {
        b.iter(|| black_box(service.find_by_example(black_box(&unique))))
    });
}

fn benchmark_count(c: &mut Criterion) {
    let service = create_benchmark_service();
    let by_model = Car::new().model("Ferrari");

    let mut group = c.benchmark_group("count");
    group.bench_function("count_by_example", |b| {
        b.iter(|| black_box(service.count(black_box(&by_model))))
    });
    group.bench_function("count_by_range_le", |b| {
        b.iter(|| black_box(service.count_by_range("price", Comparator::Le, black_box(7500.0))))
    });
    group.bench_function("count_ignore_case_prefix", |b| {
        let example = Example::new()
            .set("name", "CAR 1")
            .match_mode(crud_core::MatchMode::Start)
            .ignore_case();
        b.iter(|| black_box(service.crud().count(black_box(&example))))
    });
    group.finish();
}

fn benchmark_update(c: &mut Criterion) {
    let service = create_benchmark_service();
    let mut car = service
        .find_by_example(&Car::new().name("car 17"))
        .expect("Failed to find car");

    c.bench_function("update_by_example_result", |b| {
        b.iter(|| {
            car.set_price(black_box(99.0));
            black_box(service.update(&car))
        })
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default()
        .sample_size(50)
        .warm_up_time(std::time::Duration::from_secs(2))
        .measurement_time(std::time::Duration::from_secs(5));
    targets = benchmark_find_by_example, benchmark_count, benchmark_update
);
criterion_main!(benches);
