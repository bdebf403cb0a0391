//! Command parameters

use crate::schema::Column;
use crate::values::Value;
use compact_str::CompactString;
use tabula_types::DbType;

/// Which way a parameter's value flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    In,
    /// Written by the executor after the command runs
    Out,
    InOut,
}

impl Direction {
    /// Whether the executor writes a value back.
    pub const fn is_output(self) -> bool {
        matches!(self, Direction::Out | Direction::InOut)
    }
}

/// A named, typed value bound into a [`Command`](crate::command::Command).
///
/// Parameters generated for entity columns remember that column so that
/// values produced by the database can be written back into the row.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: CompactString,
    pub value: Value,
    pub direction: Direction,
    pub db_type: DbType,
    pub size: Option<u32>,
    pub column: Option<CompactString>,
}

impl Parameter {
    /// An input parameter typed after its value.
    pub fn input(name: impl Into<CompactString>, value: Value) -> Self {
        Self {
            name: name.into(),
            db_type: value.db_type(),
            value,
            direction: Direction::In,
            size: None,
            column: None,
        }
    }

    /// An input parameter carrying a column's value.
    pub fn for_column(name: impl Into<CompactString>, value: Value, column: &Column) -> Self {
        Self {
            name: name.into(),
            value,
            direction: Direction::In,
            db_type: column.db_type(),
            size: column.max_size(),
            column: Some(CompactString::from(column.name())),
        }
    }

    /// An output parameter receiving a value generated for `column`.
    pub fn output(name: impl Into<CompactString>, column: &Column) -> Self {
        Self {
            name: name.into(),
            value: Value::Null,
            direction: Direction::Out,
            db_type: column.db_type(),
            size: column.max_size(),
            column: Some(CompactString::from(column.name())),
        }
    }

    #[inline]
    pub fn is_output(&self) -> bool {
        self.direction.is_output()
    }
}
