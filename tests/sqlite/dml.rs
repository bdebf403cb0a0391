use crate::common::{Order, Product, TagLink, customers, rows, texts};
use tabula::prelude::*;
use tabula::sqlite::compiler;

#[test]
fn insert_reads_rowid_with_follow_up() {
    let customers = customers();
    let command = compiler()
        .insert(customers.store(), &customers.store().rows()[0])
        .unwrap();
    assert_eq!(
        command.text(),
        "INSERT INTO Customers (Name, Region) VALUES (@p0, @p1)"
    );
    assert_eq!(
        command.follow_up().map(Command::text),
        Some("SELECT last_insert_rowid()")
    );
    let output = command.output_parameter().unwrap();
    assert_eq!(output.name, "@p2");
    assert_eq!(output.column.as_deref(), Some("Id"));
}

#[test]
fn insert_leaves_out_defaults_and_computed() {
    let mut orders = Collection::<Order>::new().unwrap();
    orders.push(&Order::new(7, 12.5)).unwrap();
    let command = compiler()
        .insert(orders.store(), &orders.store().rows()[0])
        .unwrap();
    assert_eq!(
        command.text(),
        "INSERT INTO Orders (CustomerId, Total) VALUES (@p0, @p1)"
    );
}

#[test]
fn sequence_key_without_sequences_is_generated() {
    let mut products = Collection::<Product>::new().unwrap();
    products
        .push(&Product {
            id: 0,
            name: "lamp".into(),
            price: 30.0,
        })
        .unwrap();
    let command = compiler()
        .insert(products.store(), &products.store().rows()[0])
        .unwrap();
    assert_eq!(
        command.text(),
        "INSERT INTO Products (Name, Price) VALUES (@p0, @p1)"
    );
}

#[test]
fn update_delete_reload() {
    let customers = customers();
    let store = customers.store();
    let row = &store.rows()[1];
    let compiler = compiler();
    assert_eq!(
        compiler.update(store, row, None).unwrap().text(),
        "UPDATE Customers SET Name = @p0, Region = @p1 WHERE (Id = @p2)"
    );
    assert_eq!(
        compiler.delete(store, row).unwrap().text(),
        "DELETE FROM Customers WHERE (Id = @p0)"
    );
    assert_eq!(
        compiler.reload(store, row).unwrap().text(),
        "SELECT Id, Name, Region FROM Customers WHERE (Id = @p0)"
    );
}

#[test]
fn composite_keys_are_anded() {
    let mut links = Collection::<TagLink>::new().unwrap();
    links
        .push(&TagLink {
            post_id: 3,
            tag: "rust".into(),
            weight: 1,
        })
        .unwrap();
    let command = compiler()
        .delete(links.store(), &links.store().rows()[0])
        .unwrap();
    assert_eq!(
        command.text(),
        "DELETE FROM TagLinks WHERE (PostId = @p0 AND Tag = @p1)"
    );
}

#[test]
fn batches_are_not_supported() {
    let customers = customers();
    let err = compiler()
        .insert_batch(customers.store(), &rows(&customers), 10)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "batch insert is not supported by the sqlite dialect"
    );
}

#[test]
fn truncate_and_update_from() {
    let compiler = compiler();
    let truncate = Query::new().truncate(table::<Order>()).compile_with(&compiler).unwrap();
    let update = Query::new()
        .update("Orders")
        .set("Status", "late")
        .from("Customers")
        .r#where(eq(col("Orders.CustomerId"), col("Customers.Id")))
        .and(eq(col("Customers.Region"), "north"))
        .compile_with(&compiler)
        .unwrap();
    assert_eq!(
        texts(&[truncate, update]),
        [
            "DELETE FROM Orders",
            "UPDATE Orders SET Status = @p0 FROM Customers WHERE (Orders.CustomerId = Customers.Id AND Customers.Region = @p1)",
        ]
    );
}
