use crate::common::{Customer, Product, customers, rows};
use tabula::prelude::*;
use tabula::oracle::compiler;

#[test]
fn insert_returns_into_an_output_parameter() {
    let customers = customers();
    let command = compiler()
        .insert(customers.store(), &customers.store().rows()[0])
        .unwrap();
    assert_eq!(
        command.text(),
        "INSERT INTO Customers (Name, Region) VALUES (:p0, :p1) RETURNING Id INTO :p2"
    );
    let output = command.output_parameter().unwrap();
    assert_eq!(output.name, ":p2");
    assert_eq!(output.db_type, DbType::BigInt);
}

#[test]
fn sequence_key_draws_nextval() {
    let mut products = Collection::<Product>::new().unwrap();
    products
        .push(&Product {
            id: 0,
            name: "shelf".into(),
            price: 45.0,
        })
        .unwrap();
    let command = compiler()
        .insert(products.store(), &products.store().rows()[0])
        .unwrap();
    assert_eq!(
        command.text(),
        "INSERT INTO Products (Id, Name, Price) VALUES (product_seq.NEXTVAL, :p0, :p1) RETURNING Id INTO :p2"
    );
}

#[test]
fn limit_joins_the_predicate() {
    let command = Query::new()
        .select_all::<Customer>()
        .r#where(eq(col("Region"), "north"))
        .limit(3)
        .compile_with(&compiler())
        .unwrap();
    assert_eq!(
        command.text(),
        "SELECT Id, Name, Region FROM Customers WHERE (Region = :p0 AND ROWNUM <= 3)"
    );
}

#[test]
fn limit_stays_outside_a_raw_or() {
    let command = Query::new()
        .select([col("Id")])
        .from("Customers")
        .r#where(raw_condition("Region = 'a' OR Region = 'b'"))
        .limit(3)
        .compile_with(&compiler())
        .unwrap();
    assert_eq!(
        command.text(),
        "SELECT Id FROM Customers WHERE ((Region = 'a' OR Region = 'b') AND ROWNUM <= 3)"
    );
}

#[test]
fn batches_and_paging_are_unsupported() {
    let customers = customers();
    let err = compiler()
        .delete_batch(customers.store(), &rows(&customers), 2)
        .unwrap_err();
    assert!(matches!(
        err,
        TabulaError::Unsupported {
            dialect: Dialect::Oracle,
            operation: "batch delete"
        }
    ));

    let err = Query::new()
        .select([col("Id")])
        .from("Customers")
        .page(0, 10)
        .compile_with(&compiler())
        .unwrap_err();
    assert_eq!(err.to_string(), "paging is not supported by the oracle dialect");
}
