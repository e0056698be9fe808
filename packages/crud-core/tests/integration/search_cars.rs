//! Car search scenarios, written as given/when/then steps over a small world.

use crud_core::{Car, CarService, Comparator, CrudConfig, CrudError, InMemoryRecordStore};
use ntest::timeout;

use super::helpers;

/// State carried between scenario steps.
struct CarWorld {
    service: CarService<InMemoryRecordStore>,
    found: Option<Result<Car, CrudError>>,
    count: Option<usize>,
}

impl CarWorld {
    fn given_the_car_dataset() -> Self {
        Self::given_the_car_dataset_with(helpers::config())
    }

    fn given_the_car_dataset_with(config: CrudConfig) -> Self {
        Self {
            service: helpers::seeded_car_service(config),
            found: None,
            count: None,
        }
    }

    fn when_searching_by_model(&mut self, model: &str) -> &mut Self {
        self.found = Some(self.service.find_by_example(&Car::new().model(model)));
        self
    }

    fn when_updating_model_to(&mut self, model: &str) -> &mut Self {
        let mut car = self.found_car().clone();
        car.set_model(model);
        self.service.update(&car).unwrap();
        self
    }

    fn when_counting_by_model(&mut self, model: &str) -> &mut Self {
        self.count = Some(self.service.count(&Car::new().model(model)).unwrap());
        self
    }

    fn when_counting_price_le(&mut self, price: f64) -> &mut Self {
        self.count = Some(
            self.service
                .count_by_range("price", Comparator::Le, price)
                .unwrap(),
        );
        self
    }

    fn then_count_is(&mut self, expected: usize) -> &mut Self {
        assert_eq!(self.count, Some(expected));
        self
    }

    fn found_car(&self) -> &Car {
        match &self.found {
            Some(Ok(car)) => car,
            other => panic!("expected a car, got {other:?}"),
        }
    }

    fn then_error_is(&mut self, expected: CrudError) -> &mut Self {
        match &self.found {
            Some(Err(err)) => assert_eq!(err, &expected),
            other => panic!("expected {expected}, got {other:?}"),
        }
        self
    }
}

#[timeout(1000)]
#[test]
fn test_update_car_model() {
    CarWorld::given_the_car_dataset()
        .when_searching_by_model("Ferrari")
        .when_updating_model_to("Lamborghini")
        .when_counting_by_model("Lamborghini")
        .then_count_is(1)
        .when_counting_by_model("Ferrari")
        .then_count_is(0);
}

#[timeout(1000)]
#[test]
fn test_count_cars_by_price() {
    CarWorld::given_the_car_dataset()
        .when_counting_price_le(12999.0)
        .then_count_is(3);
}

#[timeout(1000)]
#[test]
fn test_search_returns_the_stored_car() {
    let mut world = CarWorld::given_the_car_dataset();
    world.when_searching_by_model("Porche274");
    let car = world.found_car();
    assert_eq!(car.price, Some(18990.23));
    assert_eq!(car.name.as_deref(), Some("porche 274"));
}

#[timeout(1000)]
#[test]
fn test_search_unknown_model() {
    CarWorld::given_the_car_dataset()
        .when_searching_by_model("Trabant")
        .then_error_is(CrudError::NotFound {
            table: "car".into(),
        });
}

#[timeout(1000)]
#[test]
fn test_search_ambiguous_price_range() {
    let mut world = CarWorld::given_the_car_dataset();
    let cheap = world
        .service
        .crud()
        .criteria()
        .lt("price", 15000.0)
        .find_one();
    assert_eq!(
        cheap,
        Err(CrudError::Ambiguous {
            table: "car".into(),
            count: 3
        })
    );
    world
        .when_searching_by_model("Mustang")
        .when_counting_price_le(1390.3)
        .then_count_is(1);
}
