//! SQLite dialect for tabula
//!
//! Parameters are named `@p0, @p1, …`, rows are capped with `LIMIT`, and a
//! generated rowid is read back with `SELECT last_insert_rowid()` on the same
//! connection right after the INSERT. SQLite has no TRUNCATE, so it is
//! emitted as an unfiltered DELETE. Batch DML is not supported.

mod rules;

pub use rules::SQLiteRules;

use tabula_core::Compiler;

/// A compiler emitting SQLite text.
pub fn compiler() -> Compiler {
    Compiler::new(SQLiteRules)
}
