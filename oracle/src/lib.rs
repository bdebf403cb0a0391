//! Oracle dialect for tabula
//!
//! Parameters are named `:p0, :p1, …`. Oracle has no row-limiting clause
//! here: a limit is rewritten into a `ROWNUM <= n` term of the predicate and
//! paging is refused. Generated keys are returned through
//! `RETURNING … INTO :pN` bound to an output parameter, sequences are drawn
//! with `SEQ.NEXTVAL`, and an UPDATE reaching other tables is rewritten as
//! an update of an inline view. Batch DML is not supported.

mod rules;

pub use rules::OracleRules;

use tabula_core::Compiler;

/// A compiler emitting Oracle text.
pub fn compiler() -> Compiler {
    Compiler::new(OracleRules)
}
