//! Full CRUD lifecycle: seed, insert, read, update, delete, reseed.

use std::sync::Arc;
use std::thread;

use crud_core::dataset::{Dataset, SeedStrategy};
use crud_core::{
    Car, CarService, Comparator, CrudConfig, CrudError, Example, ExampleQueryEngine,
    MultipleMatchPolicy, RecordId, RecordStore, StoreError,
};
use ntest::timeout;

use super::helpers;

#[timeout(1000)]
#[test]
fn test_full_crud_lifecycle() {
    let service = helpers::seeded_car_service(helpers::config());

    let fiat = service
        .insert(&Car::new().model("Fiat").name("fiat 500").price(9500.0))
        .unwrap();
    assert_eq!(fiat.id, Some(RecordId(5)));
    assert_eq!(service.count(&Car::new()).unwrap(), 5);

    let mut found = service.find_by_id(RecordId(5)).unwrap();
    assert_eq!(found, fiat);
    found.set_price(8999.0);
    service.update(&found).unwrap();
    assert_eq!(
        service.count_by_range("price", Comparator::Le, 9000.0).unwrap(),
        3
    );

    service.delete(&found).unwrap();
    assert!(service
        .find_by_example(&Car::new().model("Fiat"))
        .unwrap_err()
        .is_not_found());
    assert_eq!(service.count(&Car::new()).unwrap(), 4);
}

#[timeout(1000)]
#[test]
fn test_reseeding_restores_dataset() {
    let config = helpers::config();
    let service = helpers::seeded_car_service(config.clone());
    service.insert(&Car::new().model("Fiat")).unwrap();
    let ferrari = service.find_by_example(&Car::new().model("Ferrari")).unwrap();
    service.delete(&ferrari).unwrap();

    let dataset = Dataset::load_named(&config, "car.yml").unwrap();
    dataset
        .seed(service.crud().store().as_ref(), SeedStrategy::CleanInsert)
        .unwrap();

    assert_eq!(service.count(&Car::new()).unwrap(), 4);
    assert_eq!(service.count(&Car::new().model("Ferrari")).unwrap(), 1);
    assert_eq!(service.count(&Car::new().model("Fiat")).unwrap(), 0);
}

#[timeout(1000)]
#[test]
fn test_optimistic_locking_rejects_stale_update() {
    let config = CrudConfig {
        optimistic_locking: true,
        ..helpers::config()
    };
    let service = helpers::seeded_car_service(config);

    let first = service.find_by_example(&Car::new().model("Mustang")).unwrap();
    let mut stale = first.clone();

    let mut fresh = first;
    fresh.set_price(13500.0);
    service.update(&fresh).unwrap();

    stale.set_price(11000.0);
    let err = service.update(&stale).unwrap_err();
    assert!(matches!(
        err,
        CrudError::Store(StoreError::Conflict {
            expected: 0,
            found: 1,
            ..
        })
    ));
    let stored = service.find_by_id(RecordId(2)).unwrap();
    assert_eq!(stored.price, Some(13500.0));
}

#[timeout(1000)]
#[test]
fn test_first_by_key_policy() {
    let config = CrudConfig {
        multiple_match_policy: MultipleMatchPolicy::FirstByKey,
        ..helpers::config()
    };
    let store = helpers::car_store(&config);
    Dataset::load_named(&config, "car.yml")
        .unwrap()
        .seed(store.as_ref(), SeedStrategy::Insert)
        .unwrap();
    let engine = ExampleQueryEngine::new(Arc::clone(&store), "car", config);

    let found = engine
        .criteria()
        .ge("price", 2000.0)
        .find_one()
        .unwrap();
    assert_eq!(found.id, RecordId(1));

    let everything = engine.find_by_example(&Example::new()).unwrap();
    assert_eq!(everything.id, RecordId(1));
}

#[timeout(1000)]
#[test]
fn test_default_policy_rejects_empty_example() {
    let service = helpers::seeded_car_service(helpers::config());
    assert_eq!(
        service.find_by_example(&Car::new()).unwrap_err(),
        CrudError::Ambiguous {
            table: "car".into(),
            count: 4
        }
    );
}

#[timeout(5000)]
#[test]
fn test_concurrent_readers_and_writer() {
    let service: Arc<CarService<_>> = Arc::new(helpers::seeded_car_service(helpers::config()));

    let writer = {
        let service = Arc::clone(&service);
        thread::spawn(move || {
            for i in 0..200 {
                service
                    .insert(&Car::new().model("Clone").price(f64::from(i)))
                    .unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for _ in 0..200 {
                    let store = service.crud().store();
                    let seeded = store
                        .count("car", &Example::new().set("model", "Ferrari").to_predicates())
                        .unwrap();
                    assert_eq!(seeded, 1);
                    let total = service.count(&Car::new()).unwrap();
                    assert!((4..=204).contains(&total));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(service.count(&Car::new().model("Clone")).unwrap(), 200);
}
