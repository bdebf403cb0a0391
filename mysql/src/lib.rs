//! MySQL dialect for tabula
//!
//! Parameters are named `?p0, ?p1, …`. The generated key is read with
//! `SELECT LAST_INSERT_ID()` after the INSERT, joined tables are listed
//! directly in the UPDATE target, and batch DML is supported.

mod rules;

pub use rules::MySQLRules;

use tabula_core::Compiler;

/// A compiler emitting MySQL text.
pub fn compiler() -> Compiler {
    Compiler::new(MySQLRules)
}
