use crate::common::{Customer, Order};
use tabula::prelude::*;
use tabula::sqlite::compiler;

#[test]
fn filtered_page() {
    let command = Query::new()
        .select([col("Id"), col("Name")])
        .from("Customers")
        .r#where(eq(col("Region"), "north"))
        .or(eq(col("Region"), "south"))
        .order_by_desc(col("Name"))
        .page(10, 5)
        .compile_with(&compiler())
        .unwrap();
    assert_eq!(
        command.text(),
        "SELECT Id, Name FROM Customers WHERE (Region = @p0 OR Region = @p1) ORDER BY Name DESC LIMIT 5 OFFSET 10"
    );
    let values: Vec<_> = command.parameters().iter().map(|p| p.value.clone()).collect();
    assert_eq!(values, [Value::from("north"), Value::from("south")]);
}

#[test]
fn entity_projection_reads_its_own_table() {
    let command = Query::new()
        .select_all::<Customer>()
        .limit(1)
        .compile_with(&compiler())
        .unwrap();
    assert_eq!(command.text(), "SELECT Id, Name, Region FROM Customers LIMIT 1");
}

#[test]
fn grouped_join() {
    let command = Query::new()
        .select([col("c.Name"), count(col("o.Id")).alias("orders")])
        .from(table::<Customer>().alias("c"))
        .left_join(
            table::<Order>().alias("o"),
            eq(col("o.CustomerId"), col("c.Id")),
        )
        .group_by([col("c.Name")])
        .having(gt(count(col("o.Id")), 2))
        .compile_with(&compiler())
        .unwrap();
    assert_eq!(
        command.text(),
        "SELECT c.Name, COUNT(o.Id) AS orders FROM Customers c LEFT JOIN Orders o ON o.CustomerId = c.Id GROUP BY c.Name HAVING COUNT(o.Id) > @p0"
    );
}

#[test]
fn compound_predicates() {
    let command = Query::new()
        .select([star()])
        .from("Orders")
        .r#where(and([
            in_list(col("Status"), ["new", "paid"]),
            between(col("Total"), 10.0, 20.0),
            is_not_null(col("CustomerId")),
        ]))
        .and(not(like(col("Status"), "x%")))
        .compile_with(&compiler())
        .unwrap();
    assert_eq!(
        command.text(),
        "SELECT * FROM Orders WHERE ((Status IN (@p0, @p1) AND Total BETWEEN @p2 AND @p3 AND CustomerId IS NOT NULL) AND NOT (Status LIKE @p4))"
    );
    assert_eq!(command.parameters().len(), 5);
}

#[test]
fn distinct_cross_join() {
    let command = Query::new()
        .select_distinct([col("a.Region")])
        .from(TableRef::named("Customers").alias("a"))
        .cross_join(TableRef::named("Customers").alias("b"))
        .compile_with(&compiler())
        .unwrap();
    assert_eq!(
        command.text(),
        "SELECT DISTINCT a.Region FROM Customers a CROSS JOIN Customers b"
    );
}

#[test]
fn empty_in_list_fails_to_compile() {
    let err = Query::new()
        .select([col("Id")])
        .from("Orders")
        .r#where(in_list(col("Id"), Vec::<i64>::new()))
        .compile_with(&compiler())
        .unwrap_err();
    assert!(matches!(err, TabulaError::Compilation(_)));
}

#[test]
fn same_recording_compiles_twice() {
    let query = Query::new()
        .select([col("Id")])
        .from("Orders")
        .r#where(gte(col("Total"), 100));
    let first = query.compile_with(&compiler()).unwrap();
    let second = query.using(compiler()).build().unwrap();
    assert_eq!(first, second);
}
