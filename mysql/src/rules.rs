use tabula_core::dialect::{Dialect, DialectRules, Identity, UpdateJoin};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MySQLRules;

impl DialectRules for MySQLRules {
    fn dialect(&self) -> Dialect {
        Dialect::MySQL
    }

    fn parameter_prefix(&self) -> &'static str {
        "?p"
    }

    fn supports_batch(&self) -> bool {
        true
    }

    fn identity(&self) -> Identity {
        Identity::FollowUp("SELECT LAST_INSERT_ID()")
    }

    fn update_join(&self) -> UpdateJoin {
        UpdateJoin::JoinInUpdate
    }

    fn default_values_insert(&self, table: &str) -> String {
        format!("INSERT INTO {table} () VALUES ()")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::prelude::*;

    #[test]
    fn update_lists_joins_before_set() {
        let command = crate::compiler()
            .compile(
                &Query::new()
                    .update(TableRef::named("Orders").alias("o"))
                    .inner_join(TableRef::named("Customers").alias("c"), eq(col("o.CustomerId"), col("c.Id")))
                    .set("o.Status", "late")
                    .r#where(eq(col("c.Region"), "north")),
            )
            .unwrap();
        assert_eq!(
            command.text(),
            "UPDATE Orders o INNER JOIN Customers c ON o.CustomerId = c.Id \
             SET o.Status = ?p0 WHERE (c.Region = ?p1)"
        );
    }

    #[test]
    fn empty_insert_lists_no_columns() {
        assert_eq!(
            MySQLRules.default_values_insert("Counters"),
            "INSERT INTO Counters () VALUES ()"
        );
    }
}
