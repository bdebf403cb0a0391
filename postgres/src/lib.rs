//! PostgreSQL dialect for tabula
//!
//! Parameters are named `:p0, :p1, …`. Generated keys come back through a
//! `RETURNING` clause, sequences are drawn with `nextval('seq')`, and batch
//! DML is supported.

mod rules;

pub use rules::PostgresRules;

use tabula_core::Compiler;

/// A compiler emitting PostgreSQL text.
pub fn compiler() -> Compiler {
    Compiler::new(PostgresRules)
}
