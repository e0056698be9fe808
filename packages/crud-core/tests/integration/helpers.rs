//! Shared fixtures for the integration suite.

use std::path::PathBuf;
use std::sync::Arc;

use crud_core::dataset::{Dataset, SeedStrategy};
use crud_core::{CarService, CrudConfig, Entity, InMemoryRecordStore, Car};

/// Directory holding the dataset files.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn config() -> CrudConfig {
    CrudConfig {
        dataset_dir: fixtures_dir(),
        ..Default::default()
    }
}

/// Store with an empty car table.
pub fn car_store(config: &CrudConfig) -> Arc<InMemoryRecordStore> {
    let store = Arc::new(InMemoryRecordStore::from_config(config));
    store.create_table(Car::schema()).unwrap();
    store
}

/// Car service over a store seeded from `car.yml`.
pub fn seeded_car_service(config: CrudConfig) -> CarService<InMemoryRecordStore> {
    let store = car_store(&config);
    Dataset::load_named(&config, "car.yml")
        .unwrap()
        .seed(store.as_ref(), SeedStrategy::CleanInsert)
        .unwrap();
    CarService::new(store, config)
}
