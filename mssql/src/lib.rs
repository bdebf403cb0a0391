//! SQL Server dialect for tabula
//!
//! Parameters are named `@p0, @p1, …` and every table name the compiler
//! emitted is wrapped in brackets by a post-pass over the finished text. Row
//! caps become `SELECT TOP (n)`, paging uses `OFFSET … FETCH NEXT`, and the
//! generated key is read with `SELECT SCOPE_IDENTITY()`. An UPDATE reaching
//! other tables names its target again in a `FROM … JOIN` list.

mod quote;
mod rules;

pub use quote::bracket_entities;
pub use rules::SqlServerRules;

use tabula_core::Compiler;

/// A compiler emitting SQL Server text.
pub fn compiler() -> Compiler {
    Compiler::new(SqlServerRules)
}
