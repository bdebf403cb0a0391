use tabula_core::dialect::{Dialect, DialectRules, Identity};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SQLiteRules;

impl DialectRules for SQLiteRules {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
    }

    fn parameter_prefix(&self) -> &'static str {
        "@p"
    }

    fn identity(&self) -> Identity {
        Identity::FollowUp("SELECT last_insert_rowid()")
    }

    fn truncate(&self, table: &str) -> String {
        format!("DELETE FROM {table}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::prelude::*;

    #[test]
    fn truncate_is_an_unfiltered_delete() {
        let command = crate::compiler()
            .compile(&Query::new().truncate("Logs"))
            .unwrap();
        assert_eq!(command.text(), "DELETE FROM Logs");
    }

    #[test]
    fn paging_uses_limit_offset() {
        let command = crate::compiler()
            .compile(
                &Query::new()
                    .select([col("Id")])
                    .from("Users")
                    .r#where(eq(col("Active"), true))
                    .page(20, 10),
            )
            .unwrap();
        assert_eq!(
            command.text(),
            "SELECT Id FROM Users WHERE (Active = @p0) LIMIT 10 OFFSET 20"
        );
        assert_eq!(command.parameters()[0].name, "@p0");
    }

    #[test]
    fn batches_are_refused() {
        assert!(!SQLiteRules.supports_batch());
    }
}
