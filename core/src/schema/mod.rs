//! Entity metadata
//!
//! An [`Entity`] declares its table and columns once; [`schema_of`] resolves that
//! declaration into an immutable, process-wide cached [`Schema`]. Every store built
//! for the same entity afterwards sees the same column order and flags.

mod column;

pub use column::{Column, ColumnFlags, Relation};

use crate::error::{Result, TabulaError};
use crate::record::Record;
use crate::values::Value;
use compact_str::CompactString;
use core::any::TypeId;
use hashbrown::HashMap;
use std::sync::{Arc, LazyLock, RwLock};

/// A typed domain object persisted through a tabular store.
///
/// This is the metadata provider contract: implementations are normally
/// generated, but writing one by hand is straightforward.
///
/// ```
/// use tabula_core::prelude::*;
///
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl Entity for User {
///     const TABLE: &'static str = "Users";
///
///     fn columns() -> Vec<Column> {
///         vec![
///             Column::new("Id", DbType::BigInt).identifier().auto_generated().field("id"),
///             Column::new("Name", DbType::Text).field("name"),
///         ]
///     }
///
///     fn from_record(record: &Record<'_>) -> Result<Self> {
///         Ok(Self {
///             id: record.get("id")?,
///             name: record.get("name")?,
///         })
///     }
///
///     fn values(&self) -> Vec<(&'static str, Value)> {
///         vec![("id", self.id.into()), ("name", self.name.as_str().into())]
///     }
/// }
///
/// assert_eq!(table_name_of::<User>().unwrap(), "Users");
/// ```
pub trait Entity: Sized + 'static {
    /// Table the entity is persisted to
    const TABLE: &'static str;

    /// Persisted and relation columns, in storage order
    fn columns() -> Vec<Column>;

    /// Materialize an instance from a projected row
    fn from_record(record: &Record<'_>) -> Result<Self>;

    /// Property values to write into a row, keyed by property or column name
    fn values(&self) -> Vec<(&'static str, Value)>;
}

/// Resolved, immutable metadata of one entity type.
#[derive(Debug)]
pub struct Schema {
    type_id: TypeId,
    type_name: &'static str,
    table: CompactString,
    columns: Vec<Column>,
    identifiers: Vec<usize>,
    fields: HashMap<CompactString, usize>,
}

impl Schema {
    fn resolve<T: Entity>() -> Result<Self> {
        let type_name = core::any::type_name::<T>();
        let mut columns = Vec::new();
        let mut identifiers = Vec::new();
        let mut fields = HashMap::new();

        for (ordinal, column) in T::columns().into_iter().enumerate() {
            if columns.iter().any(|c: &Column| c.name() == column.name()) {
                return Err(TabulaError::schema(
                    type_name,
                    format!("column `{}` is declared twice", column.name()),
                ));
            }
            if column.is_identifier() {
                identifiers.push(ordinal);
            }
            if fields
                .insert(CompactString::from(column.field_name()), ordinal)
                .is_some()
            {
                return Err(TabulaError::schema(
                    type_name,
                    format!("field `{}` maps to more than one column", column.field_name()),
                ));
            }
            columns.push(column.with_ordinal(ordinal));
        }

        Ok(Self {
            type_id: TypeId::of::<T>(),
            type_name,
            table: CompactString::from(T::TABLE),
            columns,
            identifiers,
            fields,
        })
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust type name of the entity, used in error messages.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Column backing a property.
    pub fn column_for_field(&self, field: &str) -> Option<&Column> {
        self.fields.get(field).map(|&i| &self.columns[i])
    }

    /// Identifier columns; a usage error when the entity declares none.
    pub fn identifier_columns(&self) -> Result<Vec<&Column>> {
        if self.identifiers.is_empty() {
            return Err(TabulaError::schema(
                self.type_name,
                "no identifier columns declared",
            ));
        }
        Ok(self.identifiers.iter().map(|&i| &self.columns[i]).collect())
    }

    /// The first auto-generated identifier column, if any.
    pub fn generated_identifier(&self) -> Option<&Column> {
        self.identifiers
            .iter()
            .map(|&i| &self.columns[i])
            .find(|c| c.is_auto_generated())
    }
}

//------------------------------------------------------------------------------
// Process-wide cache
//------------------------------------------------------------------------------

static SCHEMAS: LazyLock<RwLock<HashMap<TypeId, Arc<Schema>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Resolve and cache the schema of `T`.
///
/// The first call for a type resolves under the write lock (re-checking after
/// acquiring it); entries are never replaced, so later calls only take the read
/// lock.
pub fn schema_of<T: Entity>() -> Result<Arc<Schema>> {
    let key = TypeId::of::<T>();

    if let Some(schema) = SCHEMAS
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get(&key)
    {
        return Ok(Arc::clone(schema));
    }

    let mut cache = SCHEMAS
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(schema) = cache.get(&key) {
        return Ok(Arc::clone(schema));
    }
    let schema = Arc::new(Schema::resolve::<T>()?);
    cache.insert(key, Arc::clone(&schema));
    Ok(schema)
}

/// Table name of `T`.
pub fn table_name_of<T: Entity>() -> Result<CompactString> {
    Ok(schema_of::<T>()?.table.clone())
}

/// Ordered columns of `T`.
pub fn columns_of<T: Entity>() -> Result<Vec<Column>> {
    Ok(schema_of::<T>()?.columns.clone())
}

/// Identifier columns of `T`; fails with a schema error when there are none.
pub fn identifier_columns_of<T: Entity>() -> Result<Vec<Column>> {
    let schema = schema_of::<T>()?;
    Ok(schema.identifier_columns()?.into_iter().cloned().collect())
}
