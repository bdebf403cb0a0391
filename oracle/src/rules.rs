use tabula_core::dialect::{Dialect, DialectRules, Identity, RowLimit, UpdateJoin};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OracleRules;

impl DialectRules for OracleRules {
    fn dialect(&self) -> Dialect {
        Dialect::Oracle
    }

    fn parameter_prefix(&self) -> &'static str {
        ":p"
    }

    fn row_limit(&self) -> RowLimit {
        RowLimit::RowNumber("ROWNUM")
    }

    fn identity(&self) -> Identity {
        Identity::ReturningInto
    }

    fn update_join(&self) -> UpdateJoin {
        UpdateJoin::InlineView
    }

    fn sequence_next(&self, sequence: &str) -> Option<String> {
        Some(format!("{sequence}.NEXTVAL"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::prelude::*;

    #[test]
    fn limit_without_predicate_adds_rownum_where() {
        let command = crate::compiler()
            .compile(&Query::new().select([col("Id")]).from("Users").limit(5))
            .unwrap();
        assert_eq!(command.text(), "SELECT Id FROM Users WHERE ROWNUM <= 5");
    }

    #[test]
    fn rownum_joins_an_or_predicate_outside_it() {
        let command = crate::compiler()
            .compile(
                &Query::new()
                    .select([col("Id")])
                    .from("Users")
                    .r#where(eq(col("A"), 1))
                    .or(eq(col("B"), 2))
                    .limit(3),
            )
            .unwrap();
        assert_eq!(
            command.text(),
            "SELECT Id FROM Users WHERE ((A = :p0 OR B = :p1) AND ROWNUM <= 3)"
        );
    }

    #[test]
    fn paging_is_unsupported() {
        let err = crate::compiler()
            .compile(&Query::new().select([col("Id")]).from("Users").page(0, 10))
            .unwrap_err();
        assert!(matches!(
            err,
            TabulaError::Unsupported {
                dialect: Dialect::Oracle,
                operation: "paging",
            }
        ));
    }

    #[test]
    fn update_join_uses_an_inline_view() {
        let command = crate::compiler()
            .compile(
                &Query::new()
                    .update(TableRef::named("Orders").alias("o"))
                    .inner_join(
                        TableRef::named("Customers").alias("c"),
                        eq(col("o.CustomerId"), col("c.Id")),
                    )
                    .set("o.Status", "late")
                    .r#where(eq(col("c.Region"), "north")),
            )
            .unwrap();
        assert_eq!(
            command.text(),
            "UPDATE (SELECT o.Status FROM Orders o INNER JOIN Customers c ON o.CustomerId = c.Id \
             WHERE (c.Region = :p0)) SET Status = :p1"
        );
    }

    #[test]
    fn inline_view_selects_the_columns_set_values_read() {
        let command = crate::compiler()
            .compile(
                &Query::new()
                    .update(TableRef::named("Orders").alias("o"))
                    .inner_join(
                        TableRef::named("Customers").alias("c"),
                        eq(col("o.CustomerId"), col("c.Id")),
                    )
                    .set("o.ShipRegion", col("c.Region"))
                    .set("o.Status", func("UPPER", [col("c.Status")]))
                    .r#where(eq(col("c.Region"), "north")),
            )
            .unwrap();
        assert_eq!(
            command.text(),
            "UPDATE (SELECT o.ShipRegion, o.Status, c.Region, c.Status AS c_Status \
             FROM Orders o INNER JOIN Customers c ON o.CustomerId = c.Id \
             WHERE (c.Region = :p0)) SET ShipRegion = Region, Status = UPPER(c_Status)"
        );
    }

    #[test]
    fn batches_are_refused() {
        assert!(!OracleRules.supports_batch());
    }
}
