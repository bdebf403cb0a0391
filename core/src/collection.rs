//! Typed list façade over a [`Store`]

use crate::error::{Result, TabulaError};
use crate::record::{Record, RecordMut};
use crate::schema::Entity;
use crate::store::{Row, RowId, Store};
use core::any::TypeId;
use core::fmt;
use core::marker::PhantomData;

/// An ordered, indexable collection of `T` backed by a change-tracked store.
///
/// Indexing hands out a [`Record`] projection pointing at the requested row;
/// no entity is materialized unless asked for with [`Collection::entity`].
pub struct Collection<T: Entity> {
    store: Store,
    snapshot: Option<Store>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> Collection<T> {
    /// An empty collection laid out like `T`'s schema.
    pub fn new() -> Result<Self> {
        Ok(Self {
            store: Store::for_entity::<T>()?,
            snapshot: None,
            _marker: PhantomData,
        })
    }

    /// Wrap a store built for `T`.
    pub fn from_store(store: Store) -> Result<Self> {
        match store.entity() {
            Some(schema) if schema.type_id() == TypeId::of::<T>() => Ok(Self {
                store,
                snapshot: None,
                _marker: PhantomData,
            }),
            _ => Err(TabulaError::InvalidArgument(format!(
                "store was not built for `{}`",
                core::any::type_name::<T>()
            ))),
        }
    }

    #[inline]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[inline]
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn into_store(self) -> Store {
        self.store
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    // ==================== reads ====================

    /// Transient projection of the item at `index`. Use [`Record::repoint`]
    /// to walk the collection with a single projection.
    pub fn get(&self, index: usize) -> Result<Record<'_>> {
        Record::new(&self.store, index)
    }

    /// Materialize the item at `index`.
    pub fn entity(&self, index: usize) -> Result<T> {
        self.get(index)?.to_entity()
    }

    pub fn entities(&self) -> Result<Vec<T>> {
        self.iter().map(|record| record.to_entity()).collect()
    }

    pub fn get_mut(&mut self, index: usize) -> Result<RecordMut<'_>> {
        RecordMut::new(&mut self.store, index)
    }

    /// A handle bound to the row at `index` for as long as it stays in the
    /// collection, regardless of later inserts and removals.
    pub fn detach(&self, index: usize) -> Result<Detached<T>> {
        Ok(Detached {
            row: self.store.row(index)?.id(),
            _marker: PhantomData,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Record<'_>> + '_ {
        (0..self.store.len()).map(move |row| Record::new(&self.store, row))
            .filter_map(Result::ok)
    }

    // ==================== writes ====================

    fn stage(&mut self, item: &T) -> Result<Row> {
        let mut row = self.store.new_row();
        for (property, value) in item.values() {
            let column = self.store.resolve(property)?;
            row.set(column, value)?;
        }
        Ok(row)
    }

    /// Append `item` as an added row.
    pub fn push(&mut self, item: &T) -> Result<usize> {
        let row = self.stage(item)?;
        self.store.add_row(row)
    }

    /// Insert `item` at `index` (`0..=len`).
    pub fn insert(&mut self, index: usize, item: &T) -> Result<()> {
        if index > self.len() {
            return Err(TabulaError::out_of_range(index, self.len()));
        }
        let row = self.stage(item)?;
        self.store.insert_row(index, row)
    }

    /// Overwrite the item at `index`; only differing cells are written.
    pub fn set(&mut self, index: usize, item: &T) -> Result<()> {
        self.get_mut(index)?.assign(item)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<()> {
        self.store.remove_at(index)
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    // ==================== change tracking ====================

    /// True iff a row is added or modified, or a row has been removed.
    pub fn has_changes(&self) -> bool {
        self.store.has_changes()
    }

    /// A new collection holding only the delta.
    pub fn change_set(&self) -> Collection<T> {
        Collection {
            store: self.store.change_set(),
            snapshot: None,
            _marker: PhantomData,
        }
    }

    /// Snapshot the current state so that [`Collection::reject_changes`] can
    /// restore it. Must be enabled before the first mutation.
    pub fn track_for_rejection(&mut self) -> Result<()> {
        if self.store.has_changes() {
            return Err(TabulaError::InvalidOperation(
                "tracking for rejection must be enabled before any change".into(),
            ));
        }
        self.snapshot = Some(self.store.copy());
        Ok(())
    }

    #[inline]
    pub fn is_tracking_for_rejection(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Restore the snapshot taken by [`Collection::track_for_rejection`] and
    /// clear the deleted rows.
    pub fn reject_changes(&mut self) -> Result<()> {
        let snapshot = self.snapshot.as_ref().ok_or_else(|| {
            TabulaError::InvalidOperation("changes are not tracked for rejection".into())
        })?;
        self.store.restore(snapshot);
        Ok(())
    }

    /// Make the current state the new baseline, refreshing the rejection
    /// snapshot when tracking is on.
    pub fn accept_changes(&mut self) {
        self.store.accept_changes();
        if self.snapshot.is_some() {
            self.snapshot = Some(self.store.copy());
        }
    }
}

impl<T: Entity> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("entity", &core::any::type_name::<T>())
            .field("store", &self.store)
            .field("tracking", &self.snapshot.is_some())
            .finish()
    }
}

/// Handle to one row of a [`Collection`], stable across reordering.
pub struct Detached<T> {
    row: RowId,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> Detached<T> {
    #[inline]
    pub fn row_id(&self) -> RowId {
        self.row
    }

    /// Project the bound row; fails once the row has left the collection.
    pub fn resolve<'a>(&self, collection: &'a Collection<T>) -> Result<Record<'a>> {
        let index = collection.store.position(self.row).ok_or_else(|| {
            TabulaError::InvalidOperation("detached item is no longer in the collection".into())
        })?;
        collection.get(index)
    }

    pub fn resolve_mut<'a>(&self, collection: &'a mut Collection<T>) -> Result<RecordMut<'a>> {
        let index = collection.store.position(self.row).ok_or_else(|| {
            TabulaError::InvalidOperation("detached item is no longer in the collection".into())
        })?;
        collection.get_mut(index)
    }
}

impl<T> Clone for Detached<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Detached<T> {}

impl<T> fmt::Debug for Detached<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Detached").field(&self.row).finish()
    }
}
