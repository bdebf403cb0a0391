//! Per-backend capability set consumed by the shared compiler.

pub use tabula_types::Dialect;

/// How a dialect caps the number of returned rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLimit {
    /// Trailing `LIMIT n` / `LIMIT n OFFSET m`
    Limit,
    /// `SELECT TOP (n)`, paging through `OFFSET … FETCH NEXT`
    Top,
    /// No limit clause: a bound on the named row-number pseudo column is
    /// injected into the predicate. Paging is unsupported.
    RowNumber(&'static str),
}

/// How the value of a generated identifier is read back after an INSERT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    None,
    /// `RETURNING col`; the executor returns it as a one-row result
    Returning,
    /// `RETURNING col INTO :out`; the executor fills the output parameter
    ReturningInto,
    /// A scalar query run right after the INSERT on the same connection
    FollowUp(&'static str),
}

/// How an UPDATE reaches rows of other tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateJoin {
    /// `UPDATE t SET … FROM u WHERE …`; join conditions move to the predicate
    FromList,
    /// `UPDATE t SET … FROM t JOIN u ON … WHERE …`
    FromJoin,
    /// `UPDATE t JOIN u ON … SET … WHERE …`
    JoinInUpdate,
    /// `UPDATE (SELECT … FROM t JOIN u ON … WHERE …) SET …`
    InlineView,
}

/// The points where SQL backends diverge.
///
/// Implementations are stateless descriptions; a single
/// [`Compiler`](crate::compiler::Compiler) walks a recorded query and asks
/// its rules at every divergence point.
pub trait DialectRules: Send + Sync + core::fmt::Debug {
    fn dialect(&self) -> Dialect;

    /// Prefix of generated parameter names, such as `@p` or `:p`.
    fn parameter_prefix(&self) -> &'static str;

    /// Name of the `index`-th parameter; used both in the text and in the
    /// parameter list.
    fn parameter_name(&self, index: usize) -> String {
        format!("{}{index}", self.parameter_prefix())
    }

    /// Post-pass over the finished text, given the table names it
    /// references. Most dialects leave the text alone.
    fn quote_entities(&self, text: String, _entities: &[&str]) -> String {
        text
    }

    fn row_limit(&self) -> RowLimit {
        RowLimit::Limit
    }

    fn supports_batch(&self) -> bool {
        false
    }

    /// Joins the statements of a batch.
    fn statement_separator(&self) -> &'static str {
        ";\n"
    }

    fn identity(&self) -> Identity {
        Identity::None
    }

    fn update_join(&self) -> UpdateJoin {
        UpdateJoin::FromList
    }

    fn truncate(&self, table: &str) -> String {
        format!("TRUNCATE TABLE {table}")
    }

    /// Expression producing the next value of a sequence, for dialects that
    /// use sequences to generate keys.
    fn sequence_next(&self, _sequence: &str) -> Option<String> {
        None
    }

    /// INSERT for a row that carries no explicit values.
    fn default_values_insert(&self, table: &str) -> String {
        format!("INSERT INTO {table} DEFAULT VALUES")
    }
}
