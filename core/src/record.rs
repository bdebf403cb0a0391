//! Property projection over store rows
//!
//! A [`Record`] is a `(store, row)` handle that reads cells by property name,
//! converting them to the requested Rust type, and materializes to-many
//! relations on first access through the ambient [`DataContext`].
//! [`RecordMut`] adds tracked writes.
//!
//! [`DataContext`]: crate::context::DataContext

use crate::context::lookup_context;
use crate::error::{Result, TabulaError};
use crate::schema::{Column, Entity};
use crate::store::{Row, RowId, RowState, Store};
use crate::values::{FromValue, Value};
use std::cell::OnceCell;
use tabula_types::DbType;

/// Read-only projection of one row.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    store: &'a Store,
    row: usize,
}

impl<'a> Record<'a> {
    pub fn new(store: &'a Store, row: usize) -> Result<Self> {
        store.row(row)?;
        Ok(Self { store, row })
    }

    /// Point this projection at another row of the same store.
    pub fn repoint(&mut self, row: usize) -> Result<()> {
        self.store.row(row)?;
        self.row = row;
        Ok(())
    }

    #[inline]
    pub fn store(&self) -> &'a Store {
        self.store
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.row
    }

    #[inline]
    pub fn row(&self) -> &'a Row {
        &self.store.rows()[self.row]
    }

    #[inline]
    pub fn id(&self) -> RowId {
        self.row().id()
    }

    #[inline]
    pub fn state(&self) -> RowState {
        self.row().state()
    }

    /// The raw cell backing `property`.
    pub fn value(&self, property: &str) -> Result<&'a Value> {
        let column = self.store.resolve(property)?;
        self.row().get(column)
    }

    /// Read `property` as `T`. The stored value is coerced only when its type
    /// differs from the one `T` reads.
    pub fn get<T: FromValue>(&self, property: &str) -> Result<T> {
        let value = self.value(property)?;
        if value.is_null() || T::DB_TYPE == DbType::Unknown || value.db_type() == T::DB_TYPE {
            T::from_value(value.clone())
        } else {
            T::from_value(value.coerce(T::DB_TYPE)?)
        }
    }

    /// Materialize the whole row as an entity.
    pub fn to_entity<T: Entity>(&self) -> Result<T> {
        T::from_record(self)
    }

    /// Child rows of a to-many relation. The first read loads them through
    /// the context registered for the owning entity; later reads return the
    /// same collection until it is invalidated.
    pub fn relation(&self, property: &str) -> Result<&'a Store> {
        let index = self.store.resolve(property)?;
        let column = &self.store.columns()[index];
        let slot = self.slot(index, column)?;
        if let Some(loaded) = slot.get() {
            return Ok(loaded);
        }

        let schema = self.store.entity().ok_or_else(|| {
            TabulaError::InvalidOperation(format!(
                "relation `{property}` belongs to a store without an entity type"
            ))
        })?;
        let context = lookup_context(schema.type_id()).ok_or_else(|| {
            TabulaError::InvalidOperation(format!(
                "no data context registered for `{}`",
                schema.type_name()
            ))
        })?;
        let children = context.load_relation(self, column)?;
        // A context that read the relation itself may have filled the slot already.
        let _ = slot.set(children);
        slot.get().ok_or_else(|| {
            TabulaError::InvalidOperation(format!("relation `{property}` failed to load"))
        })
    }

    /// Whether a relation has been loaded or assigned.
    pub fn is_relation_loaded(&self, property: &str) -> Result<bool> {
        let index = self.store.resolve(property)?;
        let column = &self.store.columns()[index];
        Ok(self.slot(index, column)?.get().is_some())
    }

    fn slot(&self, index: usize, column: &Column) -> Result<&'a OnceCell<Store>> {
        if !column.is_to_many() {
            return Err(TabulaError::InvalidOperation(format!(
                "`{}` is not a to-many relation",
                column.name()
            )));
        }
        self.row()
            .relation(index)
            .map(|slot| &slot.loaded)
            .ok_or_else(|| TabulaError::InvalidOperation(format!("`{}` has no relation slot", column.name())))
    }
}

/// Writable projection of one row.
#[derive(Debug)]
pub struct RecordMut<'a> {
    store: &'a mut Store,
    row: usize,
}

impl<'a> RecordMut<'a> {
    pub fn new(store: &'a mut Store, row: usize) -> Result<Self> {
        store.row(row)?;
        Ok(Self { store, row })
    }

    pub fn as_record(&self) -> Record<'_> {
        Record {
            store: self.store,
            row: self.row,
        }
    }

    pub fn get<T: FromValue>(&self, property: &str) -> Result<T> {
        self.as_record().get(property)
    }

    /// Tracked write of `property`, raising change notifications.
    pub fn set(&mut self, property: &str, value: impl Into<Value>) -> Result<()> {
        let column = self.store.resolve(property)?;
        self.store.set_value(self.row, column, value)
    }

    /// Write every value of `entity` that differs from the stored cell.
    pub fn assign<T: Entity>(&mut self, entity: &T) -> Result<()> {
        for (property, value) in entity.values() {
            let column = self.store.resolve(property)?;
            if self.store.value(self.row, column)? != &value {
                self.store.set_value(self.row, column, value)?;
            }
        }
        Ok(())
    }

    /// Assign a relation collection; it is returned by later reads without a
    /// load.
    pub fn set_relation(&mut self, property: &str, children: Store) -> Result<()> {
        let slot = self.slot_mut(property)?;
        *slot = OnceCell::from(children);
        Ok(())
    }

    /// Drop a loaded relation so the next read loads it again.
    pub fn invalidate_relation(&mut self, property: &str) -> Result<()> {
        self.slot_mut(property)?.take();
        Ok(())
    }

    fn slot_mut(&mut self, property: &str) -> Result<&mut OnceCell<Store>> {
        let index = self.store.resolve(property)?;
        let name = self.store.columns()[index].name().to_owned();
        if !self.store.columns()[index].is_to_many() {
            return Err(TabulaError::InvalidOperation(format!(
                "`{name}` is not a to-many relation"
            )));
        }
        self.store
            .row_mut(self.row)?
            .relation_mut(index)
            .map(|slot| &mut slot.loaded)
            .ok_or_else(|| TabulaError::InvalidOperation(format!("`{name}` has no relation slot")))
    }
}
