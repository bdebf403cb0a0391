//! # tabula
//!
//! A data-access layer that persists typed objects through change-tracked
//! tables, compiling the same recorded query for several SQL dialects.
//!
//! ## Quick Start
//!
//! ```rust
//! use tabula::prelude::*;
//!
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl Entity for User {
//!     const TABLE: &'static str = "Users";
//!
//!     fn columns() -> Vec<Column> {
//!         vec![
//!             Column::new("Id", DbType::BigInt).identifier().auto_generated().field("id"),
//!             Column::new("Name", DbType::Text).field("name"),
//!         ]
//!     }
//!
//!     fn from_record(record: &Record<'_>) -> Result<Self> {
//!         Ok(Self {
//!             id: record.get("id")?,
//!             name: record.get("name")?,
//!         })
//!     }
//!
//!     fn values(&self) -> Vec<(&'static str, Value)> {
//!         vec![("id", self.id.into()), ("name", self.name.as_str().into())]
//!     }
//! }
//!
//! # #[cfg(all(feature = "postgres", feature = "oracle"))]
//! # fn main() -> tabula::Result<()> {
//! let query = Query::new()
//!     .select_all::<User>()
//!     .r#where(like(col("Name"), "A%"))
//!     .limit(10);
//!
//! let pg = query.compile_with(&tabula::postgres::compiler())?;
//! assert_eq!(pg.text(), "SELECT Id, Name FROM Users WHERE (Name LIKE :p0) LIMIT 10");
//!
//! let oracle = query.compile_with(&tabula::oracle::compiler())?;
//! assert_eq!(oracle.text(), "SELECT Id, Name FROM Users WHERE (Name LIKE :p0 AND ROWNUM <= 10)");
//! # Ok(())
//! # }
//! # #[cfg(not(all(feature = "postgres", feature = "oracle")))]
//! # fn main() {}
//! ```
//!
//! ## Database Support
//!
//! | Database   | Crate             | Feature Flag |
//! |------------|-------------------|--------------|
//! | SQLite     | `tabula-sqlite`   | `sqlite`     |
//! | PostgreSQL | `tabula-postgres` | `postgres`   |
//! | MySQL      | `tabula-mysql`    | `mysql`      |
//! | SQL Server | `tabula-mssql`    | `mssql`      |
//! | Oracle     | `tabula-oracle`   | `oracle`     |

pub mod config;

// =============================================================================
// Root-level exports
// =============================================================================

/// Result type for tabula operations
pub use tabula_core::error::Result;

/// Database dialect enum
pub use tabula_types::Dialect;

pub use config::{ConfigError, TabulaConfig};

/// Error types
pub mod error {
    pub use tabula_core::error::{ErrorKind, TabulaError};
}

/// Core types shared by every dialect: store, projections, recorder,
/// compiler and session.
pub mod core {
    pub use tabula_core::*;
}

// =============================================================================
// Dialects
// =============================================================================

#[cfg(feature = "sqlite")]
pub use tabula_sqlite as sqlite;

#[cfg(feature = "postgres")]
pub use tabula_postgres as postgres;

#[cfg(feature = "mysql")]
pub use tabula_mysql as mysql;

#[cfg(feature = "mssql")]
pub use tabula_mssql as mssql;

#[cfg(feature = "oracle")]
pub use tabula_oracle as oracle;

/// Everything needed to declare entities, record queries and persist
/// changes.
pub mod prelude {
    pub use crate::config::TabulaConfig;
    pub use tabula_core::prelude::*;
}
