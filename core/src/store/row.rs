use super::Store;
use crate::error::{Result, TabulaError};
use crate::values::Value;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{BitOr, BitOrAssign};
use smallvec::SmallVec;
use std::cell::OnceCell;
use std::hash::DefaultHasher;

/// Change-tracking state of a row.
///
/// `UNCHANGED` is the empty set; the other states are combinable bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RowState(u8);

impl RowState {
    pub const UNCHANGED: Self = Self(0);
    pub const DETACHED: Self = Self(1 << 0);
    pub const ADDED: Self = Self(1 << 1);
    pub const MODIFIED: Self = Self(1 << 2);
    pub const DELETED: Self = Self(1 << 3);

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub const fn is_unchanged(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for RowState {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for RowState {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for RowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unchanged() {
            return f.write_str("Unchanged");
        }
        let names = [
            (RowState::DETACHED, "Detached"),
            (RowState::ADDED, "Added"),
            (RowState::MODIFIED, "Modified"),
            (RowState::DELETED, "Deleted"),
        ];
        let mut first = true;
        for (state, name) in names {
            if self.contains(state) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Stable identity of a row within its store, independent of its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub(crate) u64);

/// Lazily materialized child collection of a to-many column.
#[derive(Debug)]
pub(crate) struct RelationSlot {
    pub(crate) column: usize,
    pub(crate) loaded: OnceCell<Store>,
}

impl RelationSlot {
    pub(crate) fn new(column: usize) -> Self {
        Self {
            column,
            loaded: OnceCell::new(),
        }
    }

    fn copy(&self) -> Self {
        let loaded = OnceCell::new();
        if let Some(store) = self.loaded.get() {
            let _ = loaded.set(store.copy());
        }
        Self {
            column: self.column,
            loaded,
        }
    }
}

/// A positional array of cells plus its change state.
///
/// Rows are created by [`Store::new_row`] so that the cell count always
/// matches the owning store's column count.
#[derive(Debug)]
pub struct Row {
    pub(crate) id: RowId,
    pub(crate) cells: Vec<Value>,
    pub(crate) state: RowState,
    pub(crate) relations: SmallVec<[RelationSlot; 1]>,
    pub(crate) checksum: Option<u64>,
}

impl Row {
    pub(crate) fn new(id: RowId, width: usize, relation_columns: impl Iterator<Item = usize>) -> Self {
        Self {
            id,
            cells: vec![Value::Null; width],
            state: RowState::DETACHED,
            relations: relation_columns.map(RelationSlot::new).collect(),
            checksum: None,
        }
    }

    #[inline]
    pub fn id(&self) -> RowId {
        self.id
    }

    #[inline]
    pub fn state(&self) -> RowState {
        self.state
    }

    #[inline]
    pub fn cells(&self) -> &[Value] {
        &self.cells
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Value> {
        self.cells
            .get(index)
            .ok_or_else(|| TabulaError::out_of_range(index, self.cells.len()))
    }

    /// Write a cell of a detached row. Attached rows are written through
    /// [`Store::set_value`] so that tracking and notifications apply.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        if !self.state.contains(RowState::DETACHED) {
            return Err(TabulaError::InvalidOperation(
                "row belongs to a store; write it through the store".into(),
            ));
        }
        let len = self.cells.len();
        let cell = self
            .cells
            .get_mut(index)
            .ok_or_else(|| TabulaError::out_of_range(index, len))?;
        *cell = value.into();
        Ok(())
    }

    pub(crate) fn relation(&self, column: usize) -> Option<&RelationSlot> {
        self.relations.iter().find(|slot| slot.column == column)
    }

    pub(crate) fn relation_mut(&mut self, column: usize) -> Option<&mut RelationSlot> {
        self.relations.iter_mut().find(|slot| slot.column == column)
    }

    /// Hash of every cell, used by opt-in checksum change detection.
    pub(crate) fn compute_checksum(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.cells.hash(&mut hasher);
        hasher.finish()
    }

    /// Deep copy, including loaded relation collections.
    pub(crate) fn copy(&self) -> Self {
        Self {
            id: self.id,
            cells: self.cells.clone(),
            state: self.state,
            relations: self.relations.iter().map(RelationSlot::copy).collect(),
            checksum: self.checksum,
        }
    }

    pub(crate) fn widen(&mut self, width: usize, relation_columns: impl Iterator<Item = usize>) {
        self.cells.resize(width, Value::Null);
        self.relations.extend(relation_columns.map(RelationSlot::new));
    }
}
