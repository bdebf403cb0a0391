use crate::quote::bracket_entities;
use tabula_core::dialect::{Dialect, DialectRules, Identity, RowLimit, UpdateJoin};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlServerRules;

impl DialectRules for SqlServerRules {
    fn dialect(&self) -> Dialect {
        Dialect::SqlServer
    }

    fn parameter_prefix(&self) -> &'static str {
        "@p"
    }

    fn quote_entities(&self, text: String, entities: &[&str]) -> String {
        bracket_entities(text, entities)
    }

    fn row_limit(&self) -> RowLimit {
        RowLimit::Top
    }

    fn supports_batch(&self) -> bool {
        true
    }

    fn identity(&self) -> Identity {
        Identity::FollowUp("SELECT SCOPE_IDENTITY()")
    }

    fn update_join(&self) -> UpdateJoin {
        UpdateJoin::FromJoin
    }
}
