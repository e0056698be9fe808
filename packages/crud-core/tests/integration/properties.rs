//! Property tests for example queries over generated car tables.

use std::sync::Arc;

use crud_core::{
    Car, CarService, Comparator, CrudConfig, CrudError, Entity, Example, ExampleQueryEngine,
    InMemoryRecordStore, Value,
};
use ntest::timeout;
use proptest::prelude::*;

const MODELS: [&str; 4] = ["Ferrari", "Mustang", "Porche", "Fiat"];

fn arb_car() -> impl Strategy<Value = Car> {
    (
        prop::sample::select(MODELS.to_vec()),
        prop::option::of(0u32..50),
    )
        .prop_map(|(model, price)| {
            let car = Car::new().model(model);
            match price {
                Some(p) => car.price(f64::from(p) * 10.0),
                None => car,
            }
        })
}

fn service_with(cars: &[Car]) -> CarService<InMemoryRecordStore> {
    let store = Arc::new(InMemoryRecordStore::new());
    store.create_table(Car::schema()).unwrap();
    let service = CarService::new(store, CrudConfig::default());
    for car in cars {
        service.insert(car).unwrap();
    }
    service
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn one_field_example_returns_only_equal_records(
        cars in prop::collection::vec(arb_car(), 0..30),
        model in prop::sample::select(MODELS.to_vec()),
    ) {
        let service = service_with(&cars);
        let found = service.find_all_by_example(&Car::new().model(model)).unwrap();
        let expected = cars.iter().filter(|c| c.model.as_deref() == Some(model)).count();
        prop_assert_eq!(found.len(), expected);
        prop_assert!(found.iter().all(|c| c.model.as_deref() == Some(model)));
    }

    #[test]
    fn empty_example_matches_everything(cars in prop::collection::vec(arb_car(), 0..30)) {
        let service = service_with(&cars);
        prop_assert_eq!(service.count(&Car::new()).unwrap(), cars.len());
        prop_assert_eq!(service.find_all_by_example(&Car::new()).unwrap().len(), cars.len());
    }

    #[test]
    fn count_agrees_with_find_all(
        cars in prop::collection::vec(arb_car(), 0..30),
        probe in arb_car(),
    ) {
        let service = service_with(&cars);
        prop_assert_eq!(
            service.count(&probe).unwrap(),
            service.find_all_by_example(&probe).unwrap().len()
        );
    }

    #[test]
    fn le_range_is_inclusive(
        cars in prop::collection::vec(arb_car(), 0..30),
        bound in 0u32..50,
    ) {
        let bound = f64::from(bound) * 10.0;
        let service = service_with(&cars);
        let expected = cars
            .iter()
            .filter(|c| c.price.is_some_and(|p| p <= bound))
            .count();
        prop_assert_eq!(
            service.count_by_range("price", Comparator::Le, bound).unwrap(),
            expected
        );
    }

    #[test]
    fn find_by_example_is_unique_or_reports_count(
        cars in prop::collection::vec(arb_car(), 0..12),
        model in prop::sample::select(MODELS.to_vec()),
    ) {
        let service = service_with(&cars);
        let matching = cars.iter().filter(|c| c.model.as_deref() == Some(model)).count();
        let result = service.find_by_example(&Car::new().model(model));
        match matching {
            0 => prop_assert!(result.unwrap_err().is_not_found()),
            1 => {
                let car = result.unwrap();
                prop_assert_eq!(car.model.as_deref(), Some(model));
            }
            n => prop_assert_eq!(
                result.unwrap_err(),
                CrudError::Ambiguous { table: "car".into(), count: n }
            ),
        }
    }
}

#[timeout(1000)]
#[test]
fn test_update_round_trip() {
    let service = service_with(&[Car::new().model("Ferrari").price(2450.8)]);
    let mut car = service.find_by_example(&Car::new().model("Ferrari")).unwrap();
    car.set_model("Lamborghini");
    service.update(&car).unwrap();

    let found = service
        .find_by_example(&Car::new().model("Lamborghini"))
        .unwrap();
    assert_eq!(found.id, car.id);
    assert_eq!(found.price, Some(2450.8));
    assert!(service
        .find_by_example(&Car::new().model("Ferrari"))
        .unwrap_err()
        .is_not_found());
}

#[timeout(1000)]
#[test]
fn test_price_range_scenario() {
    let cars: Vec<Car> = [10.0, 20.0, 30.0]
        .into_iter()
        .map(|p| Car::new().model("m").price(p))
        .collect();
    let service = service_with(&cars);
    assert_eq!(service.count_by_range("price", Comparator::Le, 20.0).unwrap(), 2);
    assert_eq!(service.count_by_range("price", Comparator::Lt, 20.0).unwrap(), 1);
    assert_eq!(service.count_by_range("price", Comparator::Ge, 20.0).unwrap(), 2);
}

#[timeout(1000)]
#[test]
fn test_zero_valued_fields_constrain() {
    let service = service_with(&[
        Car::new().model("free").price(0.0),
        Car::new().model("paid").price(5.0),
    ]);
    let engine: &ExampleQueryEngine<_> = service.crud();
    let free = engine
        .find_by_example(&Example::new().set("price", 0.0))
        .unwrap();
    assert_eq!(free.get("model"), Some(&Value::from("free")));
    assert_eq!(engine.count(&Example::new().set("model", "")).unwrap(), 0);
}
