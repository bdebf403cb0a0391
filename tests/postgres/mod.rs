use crate::common::{Customer, Order, Product, customers, rows, texts};
use tabula::prelude::*;
use tabula::postgres::compiler;

#[test]
fn insert_returns_the_identifier() {
    let customers = customers();
    let command = compiler()
        .insert(customers.store(), &customers.store().rows()[0])
        .unwrap();
    assert_eq!(
        command.text(),
        "INSERT INTO Customers (Name, Region) VALUES (:p0, :p1) RETURNING Id"
    );
    assert!(command.follow_up().is_none());
    assert_eq!(command.parameters().len(), 3);
    assert!(command.parameters()[2].is_output());
}

#[test]
fn sequence_key_draws_nextval() {
    let mut products = Collection::<Product>::new().unwrap();
    products
        .push(&Product {
            id: 0,
            name: "desk".into(),
            price: 120.0,
        })
        .unwrap();
    let command = compiler()
        .insert(products.store(), &products.store().rows()[0])
        .unwrap();
    assert_eq!(
        command.text(),
        "INSERT INTO Products (Id, Name, Price) VALUES (nextval('product_seq'), :p0, :p1) RETURNING Id"
    );
}

#[test]
fn batch_insert_numbers_parameters_across_statements() {
    let customers = customers();
    let commands = compiler()
        .insert_batch(customers.store(), &rows(&customers), 2)
        .unwrap();
    assert_eq!(
        texts(&commands),
        ["INSERT INTO Customers (Name, Region) VALUES (:p0, :p1);\nINSERT INTO Customers (Name, Region) VALUES (:p2, :p3)"]
    );
    assert_eq!(commands[0].parameters().len(), 4);
}

#[test]
fn batch_size_splits_commands() {
    let customers = customers();
    let commands = compiler()
        .delete_batch(customers.store(), &rows(&customers), 1)
        .unwrap();
    assert_eq!(
        texts(&commands),
        [
            "DELETE FROM Customers WHERE (Id = :p0)",
            "DELETE FROM Customers WHERE (Id = :p0)",
        ]
    );
    assert_eq!(commands[1].parameters()[0].value, Value::Integer(8));
}

#[test]
fn zero_batch_size_is_rejected() {
    let customers = customers();
    let err = compiler()
        .update_batch(customers.store(), &rows(&customers), 0, None)
        .unwrap_err();
    assert!(matches!(err, TabulaError::InvalidArgument(_)));
}

#[test]
fn update_limited_to_changed_properties() {
    let customers = customers();
    let store = customers.store();
    let compiler = compiler();
    let command = compiler
        .update(store, &store.rows()[0], Some(&["name"][..]))
        .unwrap();
    assert_eq!(
        command.text(),
        "UPDATE Customers SET Name = :p0 WHERE (Id = :p1)"
    );

    let nothing = compiler
        .update(store, &store.rows()[0], Some(&["Nope"][..]))
        .unwrap();
    assert!(!nothing.is_initialized());
    let skipped = compiler
        .update_batch(store, &rows(&customers), 5, Some(&["Nope"][..]))
        .unwrap();
    assert!(skipped.is_empty());
}

#[test]
fn update_never_sets_computed_columns() {
    let mut orders = Collection::<Order>::new().unwrap();
    orders.push(&Order::new(7, 9.5)).unwrap();
    let command = compiler()
        .update(orders.store(), &orders.store().rows()[0], None)
        .unwrap();
    assert_eq!(
        command.text(),
        "UPDATE Orders SET CustomerId = :p0, Total = :p1, Status = :p2 WHERE (Id = :p3)"
    );
}

#[test]
fn union_all_of_two_selects() {
    let command = Query::new()
        .select([col("Name")])
        .from(table::<Customer>())
        .r#where(is_null(col("Region")))
        .union_all()
        .select([col("Name")])
        .from("Suppliers")
        .compile_with(&compiler())
        .unwrap();
    assert_eq!(
        command.text(),
        "SELECT Name FROM Customers WHERE (Region IS NULL) UNION ALL SELECT Name FROM Suppliers"
    );
}
