use tabula_core::dialect::{Dialect, DialectRules, Identity};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostgresRules;

impl DialectRules for PostgresRules {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSQL
    }

    fn parameter_prefix(&self) -> &'static str {
        ":p"
    }

    fn supports_batch(&self) -> bool {
        true
    }

    fn identity(&self) -> Identity {
        Identity::Returning
    }

    fn sequence_next(&self, sequence: &str) -> Option<String> {
        Some(format!("nextval('{sequence}')"))
    }
}
