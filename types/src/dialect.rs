//! Unified database dialect enum
//!
//! Every compiler, command and configuration file names its backend through this enum.

/// SQL dialect for database-specific behavior
///
/// Each dialect differs in parameter prefix, identifier quoting, row limiting,
/// generated-key retrieval and batch support. The rules themselves live in the
/// dialect crates; this enum only identifies them.
///
/// # Examples
///
/// ```
/// use tabula_types::Dialect;
///
/// let dialect = Dialect::Oracle;
/// assert!(!dialect.has_limit_clause());
///
/// let pg = Dialect::PostgreSQL;
/// assert!(pg.has_limit_clause());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Dialect {
    /// SQLite - `@p` parameters, `LIMIT`, `last_insert_rowid()`
    #[default]
    SQLite,

    /// PostgreSQL - `:p` parameters, `LIMIT/OFFSET`, `RETURNING`
    #[cfg_attr(feature = "serde", serde(alias = "postgres", alias = "pg"))]
    PostgreSQL,

    /// MySQL - `?p` parameters, `LIMIT/OFFSET`, `LAST_INSERT_ID()`
    MySQL,

    /// SQL Server - `@p` parameters, bracket quoting, `TOP`, `SCOPE_IDENTITY()`
    #[cfg_attr(feature = "serde", serde(alias = "mssql"))]
    SqlServer,

    /// Oracle - `:p` parameters, `ROWNUM` predicates, `RETURNING ... INTO`
    Oracle,
}

impl Dialect {
    /// All dialects, in declaration order.
    pub const ALL: [Dialect; 5] = [
        Dialect::SQLite,
        Dialect::PostgreSQL,
        Dialect::MySQL,
        Dialect::SqlServer,
        Dialect::Oracle,
    ];

    /// Returns `true` if this dialect accepts a `LIMIT`-style clause
    /// (`LIMIT n` or `TOP (n)`).
    ///
    /// Oracle has neither and row limits are rewritten into a `ROWNUM` predicate.
    #[inline]
    #[must_use]
    pub const fn has_limit_clause(&self) -> bool {
        !matches!(self, Dialect::Oracle)
    }

    /// Parse a dialect from a string (case-insensitive)
    ///
    /// Supports various common aliases:
    /// - SQLite: `"sqlite"`
    /// - PostgreSQL: `"postgresql"`, `"postgres"`, `"pg"`
    /// - MySQL: `"mysql"`
    /// - SQL Server: `"sqlserver"`, `"mssql"`
    /// - Oracle: `"oracle"`
    ///
    /// # Examples
    ///
    /// ```
    /// use tabula_types::Dialect;
    ///
    /// assert_eq!(Dialect::parse("sqlite"), Some(Dialect::SQLite));
    /// assert_eq!(Dialect::parse("pg"), Some(Dialect::PostgreSQL));
    /// assert_eq!(Dialect::parse("MSSQL"), Some(Dialect::SqlServer));
    /// assert_eq!(Dialect::parse("unknown"), None);
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("sqlite") {
            Some(Dialect::SQLite)
        } else if s.eq_ignore_ascii_case("postgresql")
            || s.eq_ignore_ascii_case("postgres")
            || s.eq_ignore_ascii_case("pg")
        {
            Some(Dialect::PostgreSQL)
        } else if s.eq_ignore_ascii_case("mysql") {
            Some(Dialect::MySQL)
        } else if s.eq_ignore_ascii_case("sqlserver") || s.eq_ignore_ascii_case("mssql") {
            Some(Dialect::SqlServer)
        } else if s.eq_ignore_ascii_case("oracle") {
            Some(Dialect::Oracle)
        } else {
            None
        }
    }

    /// Get the dialect name as a lowercase string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Dialect::SQLite => "sqlite",
            Dialect::PostgreSQL => "postgresql",
            Dialect::MySQL => "mysql",
            Dialect::SqlServer => "sqlserver",
            Dialect::Oracle => "oracle",
        }
    }
}

impl core::fmt::Display for Dialect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Dialect {
    type Err = DialectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::parse(s).ok_or(DialectParseError)
    }
}

/// Error returned when parsing an unknown dialect string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectParseError;

impl core::fmt::Display for DialectParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("unknown dialect")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DialectParseError {}
