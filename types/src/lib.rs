//! Shared type definitions for tabula
//!
//! This crate provides the small vocabulary shared by every tabula crate:
//!
//! - [`Dialect`] - Database dialect enum (SQLite, PostgreSQL, MySQL, SQL Server, Oracle)
//! - [`DbType`] - Declared value type of a column or parameter
//!
//! # Features
//!
//! - `std` - Standard library support (enabled by default)
//! - `serde` - Enable serde serialization/deserialization

#![cfg_attr(not(feature = "std"), no_std)]

mod db_type;
mod dialect;

pub use db_type::DbType;
pub use dialect::{Dialect, DialectParseError};

/// Prelude module for commonly used types
pub mod prelude {
    pub use crate::{DbType, Dialect};
}
