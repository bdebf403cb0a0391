use crate::values::Value;
use compact_str::CompactString;
use std::collections::VecDeque;
use tabula_types::DbType;

/// Name and declared type of one column of a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: CompactString,
    pub db_type: DbType,
}

impl Field {
    pub fn new(name: impl Into<CompactString>, db_type: DbType) -> Self {
        Self {
            name: name.into(),
            db_type,
        }
    }
}

/// Forward-only source of tabular data, as produced by an executor.
pub trait DataReader {
    /// A closed reader has been exhausted (or was never opened) and yields no
    /// more rows.
    fn is_closed(&self) -> bool;

    fn fields(&self) -> &[Field];

    /// The next row's values in field order; `None` closes the reader.
    fn next_row(&mut self) -> Option<Vec<Value>>;
}

/// A fully buffered result, the reader type executors hand back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    fields: Vec<Field>,
    rows: VecDeque<Vec<Value>>,
    closed: bool,
}

impl ResultSet {
    pub fn new(fields: Vec<Field>, rows: impl IntoIterator<Item = Vec<Value>>) -> Self {
        Self {
            fields,
            rows: rows.into_iter().collect(),
            closed: false,
        }
    }

    /// Result of a statement that returns no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Remaining buffered rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First cell of the first remaining row; used to read scalar results such
    /// as a generated identity.
    pub fn first_value(&self) -> Option<&Value> {
        self.rows.front().and_then(|row| row.first())
    }

    pub fn close(&mut self) {
        self.rows.clear();
        self.closed = true;
    }
}

impl DataReader for ResultSet {
    fn is_closed(&self) -> bool {
        self.closed
    }

    fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn next_row(&mut self) -> Option<Vec<Value>> {
        if self.closed {
            return None;
        }
        let row = self.rows.pop_front();
        if row.is_none() {
            self.closed = true;
        }
        row
    }
}
