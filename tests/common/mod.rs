#![allow(dead_code)]

pub mod executor;
pub mod schema;

pub use executor::MemoryExecutor;
pub use schema::{Customer, Order, Product, TagLink};

use tabula::core::Row;
use tabula::prelude::*;

/// Two customers with known keys, the second without a region.
pub fn customers() -> Collection<Customer> {
    let mut customers = Collection::new().unwrap();
    customers
        .push(&Customer {
            id: 7,
            name: "Ada".into(),
            region: Some("north".into()),
        })
        .unwrap();
    customers
        .push(&Customer {
            id: 8,
            name: "Grace".into(),
            region: None,
        })
        .unwrap();
    customers
}

pub fn rows<T: Entity>(collection: &Collection<T>) -> Vec<&Row> {
    collection.store().rows().iter().collect()
}

pub fn texts(commands: &[Command]) -> Vec<&str> {
    commands.iter().map(Command::text).collect()
}
