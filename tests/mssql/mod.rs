use crate::common::{Customer, Order, customers, rows, texts};
use tabula::prelude::*;
use tabula::mssql::compiler;

#[test]
fn entity_tables_are_bracketed() {
    let command = Query::new()
        .select([col("Customers.Name"), col("Orders.Total")])
        .from(table::<Customer>())
        .inner_join(
            table::<Order>(),
            eq(col("Orders.CustomerId"), col("Customers.Id")),
        )
        .compile_with(&compiler())
        .unwrap();
    assert_eq!(
        command.text(),
        "SELECT [Customers].Name, [Orders].Total FROM [Customers] INNER JOIN [Orders] ON [Orders].CustomerId = [Customers].Id"
    );
}

#[test]
fn entity_projection_with_top() {
    let command = Query::new()
        .select_all::<Customer>()
        .limit(1)
        .compile_with(&compiler())
        .unwrap();
    assert_eq!(
        command.text(),
        "SELECT TOP (1) Id, Name, Region FROM [Customers]"
    );
}

#[test]
fn ordered_page() {
    let command = Query::new()
        .select([col("Id")])
        .from("Orders")
        .order_by(col("Id"))
        .page(10, 10)
        .compile_with(&compiler())
        .unwrap();
    assert_eq!(
        command.text(),
        "SELECT Id FROM [Orders] ORDER BY Id ASC OFFSET 10 ROWS FETCH NEXT 10 ROWS ONLY"
    );
}

#[test]
fn limit_and_page_conflict() {
    let err = Query::new()
        .select([col("Id")])
        .from("Orders")
        .limit(5)
        .page(0, 5)
        .compile_with(&compiler())
        .unwrap_err();
    assert!(matches!(err, TabulaError::Compilation(_)));
}

#[test]
fn row_commands() {
    let customers = customers();
    let store = customers.store();
    let compiler = compiler();
    let insert = compiler.insert(store, &store.rows()[0]).unwrap();
    assert_eq!(
        insert.text(),
        "INSERT INTO [Customers] (Name, Region) VALUES (@p0, @p1)"
    );
    assert_eq!(
        insert.follow_up().map(Command::text),
        Some("SELECT SCOPE_IDENTITY()")
    );

    let deletes = compiler.delete_batch(store, &rows(&customers), 2).unwrap();
    assert_eq!(
        texts(&deletes),
        ["DELETE FROM [Customers] WHERE (Id = @p0);\nDELETE FROM [Customers] WHERE (Id = @p1)"]
    );
}
