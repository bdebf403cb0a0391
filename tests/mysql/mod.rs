use crate::common::{customers, rows};
use tabula::prelude::*;
use tabula::mysql::compiler;

/// Nothing but a generated key.
struct Counter {
    id: i64,
}

impl Entity for Counter {
    const TABLE: &'static str = "Counters";

    fn columns() -> Vec<Column> {
        vec![
            Column::new("Id", DbType::BigInt)
                .identifier()
                .auto_generated()
                .field("id"),
        ]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Self {
            id: record.get("id")?,
        })
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![("id", self.id.into())]
    }
}

#[test]
fn insert_without_values_uses_empty_lists() {
    let mut counters = Collection::<Counter>::new().unwrap();
    counters.push(&Counter { id: 0 }).unwrap();
    let command = compiler()
        .insert(counters.store(), &counters.store().rows()[0])
        .unwrap();
    assert_eq!(command.text(), "INSERT INTO Counters () VALUES ()");
    assert_eq!(command.output_parameter().unwrap().name, "?p0");
    assert_eq!(
        command.follow_up().map(Command::text),
        Some("SELECT LAST_INSERT_ID()")
    );
}

#[test]
fn update_joins_before_set() {
    let command = Query::new()
        .update(TableRef::named("Orders").alias("o"))
        .inner_join(
            TableRef::named("Customers").alias("c"),
            eq(col("o.CustomerId"), col("c.Id")),
        )
        .set("o.Status", "held")
        .r#where(eq(col("c.Region"), "north"))
        .compile_with(&compiler())
        .unwrap();
    assert_eq!(
        command.text(),
        "UPDATE Orders o INNER JOIN Customers c ON o.CustomerId = c.Id SET o.Status = ?p0 WHERE (c.Region = ?p1)"
    );
}

#[test]
fn batch_update_of_every_row() {
    let customers = customers();
    let commands = compiler()
        .update_batch(customers.store(), &rows(&customers), 10, None)
        .unwrap();
    assert_eq!(commands.len(), 1);
    assert_eq!(
        commands[0].text(),
        "UPDATE Customers SET Name = ?p0, Region = ?p1 WHERE (Id = ?p2);\nUPDATE Customers SET Name = ?p3, Region = ?p4 WHERE (Id = ?p5)"
    );
    assert_eq!(commands[0].parameters()[4].value, Value::Null);
}

#[test]
fn multi_row_values_insert() {
    let command = Query::new()
        .insert("Tags")
        .values([("Name", "a"), ("Slug", "a")])
        .values([("Name", "b"), ("Slug", "b")])
        .compile_with(&compiler())
        .unwrap();
    assert_eq!(
        command.text(),
        "INSERT INTO Tags (Name, Slug) VALUES (?p0, ?p1), (?p2, ?p3)"
    );
}
