//! Integration test suite.
//!
//! 1. Car search scenarios against the seeded car dataset
//! 2. Full CRUD lifecycle through the typed service
//! 3. Property tests over generated tables

pub mod crud_lifecycle;
pub mod helpers;
pub mod properties;
pub mod search_cars;
