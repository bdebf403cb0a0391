//! Change-tracked tabular store
//!
//! A [`Store`] owns an ordered column set and the rows fetched or staged
//! against it. Every cell write goes through the store so that row state and
//! observer notifications stay consistent; removed rows move to a deleted
//! side-list until the changes are accepted.

mod events;
mod reader;
mod row;

pub use events::StoreEvent;
pub use reader::{DataReader, Field, ResultSet};
pub use row::{Row, RowId, RowState};

use crate::error::{Result, TabulaError};
use crate::schema::{Column, Entity, Schema, schema_of};
use crate::values::Value;
use compact_str::CompactString;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use hashbrown::{HashMap, HashSet};
use std::sync::Arc;

static NEXT_SCHEMA_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a store's column layout. Copies and structural clones keep the
/// id of their source; every other store gets a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(u64);

impl SchemaId {
    fn fresh() -> Self {
        Self(NEXT_SCHEMA_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// How a store decides that an attached row needs persisting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ChangeDetection {
    /// The `MODIFIED` bit maintained on every tracked write
    #[default]
    RowState,
    /// A hash of all cells captured at load/accept time, compared on demand
    Checksum,
}

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// Schema-backed, change-tracked buffer of rows.
pub struct Store {
    schema_id: SchemaId,
    entity: Option<Arc<Schema>>,
    columns: Vec<Column>,
    names: HashMap<CompactString, usize>,
    rows: Vec<Row>,
    deleted: Vec<Row>,
    merged: HashSet<SchemaId>,
    listeners: Vec<Listener>,
    suspended: bool,
    next_row: u64,
    detection: ChangeDetection,
}

impl Store {
    /// An empty store over an explicit column list.
    pub fn new(columns: impl IntoIterator<Item = Column>) -> Result<Self> {
        let mut store = Self::empty(None);
        for column in columns {
            store.add_column(column)?;
        }
        Ok(store)
    }

    /// An empty store laid out like the cached schema of `T`.
    pub fn for_entity<T: Entity>() -> Result<Self> {
        Ok(Self::from_schema(schema_of::<T>()?))
    }

    /// An empty store over a resolved schema. The columns are cloned so that
    /// no two stores share column objects.
    pub fn from_schema(schema: Arc<Schema>) -> Self {
        let columns = schema.columns().to_vec();
        let mut store = Self::empty(Some(schema));
        store.names = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (CompactString::from(c.name()), i))
            .collect();
        store.columns = columns;
        store
    }

    /// Build the column set from a reader's fields and load every row.
    pub fn from_reader(reader: &mut dyn DataReader) -> Result<Self> {
        if reader.is_closed() {
            return Err(TabulaError::InvalidArgument(
                "cannot build a store from a closed reader".into(),
            ));
        }
        let columns: Vec<Column> = reader
            .fields()
            .iter()
            .map(|f| Column::new(f.name.clone(), f.db_type))
            .collect();
        let mut store = Self::new(columns)?;
        store.load(reader)?;
        Ok(store)
    }

    fn empty(entity: Option<Arc<Schema>>) -> Self {
        Self {
            schema_id: SchemaId::fresh(),
            entity,
            columns: Vec::new(),
            names: HashMap::new(),
            rows: Vec::new(),
            deleted: Vec::new(),
            merged: HashSet::new(),
            listeners: Vec::new(),
            suspended: false,
            next_row: 0,
            detection: ChangeDetection::default(),
        }
    }

    // ==================== layout ====================

    #[inline]
    pub fn schema_id(&self) -> SchemaId {
        self.schema_id
    }

    /// Entity metadata this store was built from, if any.
    #[inline]
    pub fn entity(&self) -> Option<&Arc<Schema>> {
        self.entity.as_ref()
    }

    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.column_index(name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| TabulaError::KeyNotFound(name.into()))
    }

    pub fn column_at(&self, index: usize) -> Result<&Column> {
        self.columns
            .get(index)
            .ok_or_else(|| TabulaError::out_of_range(index, self.columns.len()))
    }

    /// Append a column. Only an empty store can grow this way; stores with
    /// rows grow through [`Store::merge`].
    pub fn add_column(&mut self, column: Column) -> Result<usize> {
        if self.names.contains_key(column.name()) {
            return Err(TabulaError::InvalidOperation(format!(
                "column `{}` already exists",
                column.name()
            )));
        }
        if !self.rows.is_empty() || !self.deleted.is_empty() {
            return Err(TabulaError::InvalidOperation(
                "columns cannot be added while the store holds rows".into(),
            ));
        }
        Ok(self.push_column(column))
    }

    fn push_column(&mut self, column: Column) -> usize {
        let ordinal = self.columns.len();
        self.names.insert(CompactString::from(column.name()), ordinal);
        self.columns.push(column.with_ordinal(ordinal));
        ordinal
    }

    /// Resolve a property name to a column position: the literal column name
    /// first, then the entity's declared field mapping.
    pub fn resolve(&self, property: &str) -> Result<usize> {
        if let Some(index) = self.column_index(property) {
            return Ok(index);
        }
        self.entity
            .as_ref()
            .and_then(|schema| schema.column_for_field(property))
            .and_then(|column| self.column_index(column.name()))
            .ok_or_else(|| {
                let owner = self.entity.as_ref().map_or("store", |s| s.type_name());
                TabulaError::schema(owner, format!("unknown property `{property}`"))
            })
    }

    fn relation_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_to_many())
            .map(|(i, _)| i)
    }

    // ==================== rows ====================

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows removed since the last accept, kept for DELETE generation.
    #[inline]
    pub fn deleted_rows(&self) -> &[Row] {
        &self.deleted
    }

    pub fn row(&self, index: usize) -> Result<&Row> {
        self.rows
            .get(index)
            .ok_or_else(|| TabulaError::out_of_range(index, self.rows.len()))
    }

    pub(crate) fn row_mut(&mut self, index: usize) -> Result<&mut Row> {
        let len = self.rows.len();
        self.rows
            .get_mut(index)
            .ok_or_else(|| TabulaError::out_of_range(index, len))
    }

    /// Current position of a row, if it is still live.
    pub fn position(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|row| row.id == id)
    }

    /// A detached, null-filled row sized to the current column set.
    pub fn new_row(&mut self) -> Row {
        let id = RowId(self.next_row);
        self.next_row += 1;
        Row::new(id, self.columns.len(), self.relation_columns())
    }

    /// Attach a detached row at the end. Returns its position.
    pub fn add_row(&mut self, row: Row) -> Result<usize> {
        let index = self.rows.len();
        self.insert_row(index, row)?;
        Ok(index)
    }

    /// Attach a detached row at `index` (`0..=len`).
    pub fn insert_row(&mut self, index: usize, mut row: Row) -> Result<()> {
        if index > self.rows.len() {
            return Err(TabulaError::out_of_range(index, self.rows.len()));
        }
        if row.cells.len() != self.columns.len() {
            return Err(TabulaError::InvalidArgument(format!(
                "row has {} cells but the store has {} columns",
                row.cells.len(),
                self.columns.len()
            )));
        }
        if !row.state.contains(RowState::DETACHED) {
            return Err(TabulaError::InvalidOperation(
                "row is already attached to a store".into(),
            ));
        }
        row.state = RowState::ADDED;
        let id = row.id;
        self.rows.insert(index, row);
        self.emit(StoreEvent::Added { row: id, index });
        Ok(())
    }

    /// Remove the row at `index`. A row that was never persisted is dropped;
    /// any other row moves to the deleted side-list.
    pub fn remove_at(&mut self, index: usize) -> Result<()> {
        if index >= self.rows.len() {
            return Err(TabulaError::out_of_range(index, self.rows.len()));
        }
        let mut row = self.rows.remove(index);
        let id = row.id;
        if !row.state.contains(RowState::ADDED) {
            row.state = RowState::DELETED;
            self.deleted.push(row);
        }
        self.emit(StoreEvent::Deleted { row: id });
        Ok(())
    }

    /// Remove every live row.
    pub fn clear(&mut self) {
        for mut row in self.rows.drain(..) {
            if !row.state.contains(RowState::ADDED) {
                row.state = RowState::DELETED;
                self.deleted.push(row);
            }
        }
        self.emit(StoreEvent::Cleared);
    }

    // ==================== cells ====================

    pub fn value(&self, row: usize, column: usize) -> Result<&Value> {
        self.row(row)?.get(column)
    }

    /// Write a cell of an attached row, raising `Changing`/`Updated` and
    /// marking the row modified unless the column is untracked.
    pub fn set_value(&mut self, row: usize, column: usize, value: impl Into<Value>) -> Result<()> {
        let tracked = self.column_at(column)?.is_tracked();
        let id = self.row(row)?.id;

        self.emit(StoreEvent::Changing { row: id, column });
        let target = self.row_mut(row)?;
        target.cells[column] = value.into();
        if tracked {
            target.state |= RowState::MODIFIED;
        }
        self.emit(StoreEvent::Updated { row: id, column });
        Ok(())
    }

    /// Store a database-produced value (generated key, reload) without
    /// touching row state or notifying observers.
    pub(crate) fn write_back(&mut self, row: usize, column: usize, value: Value) -> Result<()> {
        let db_type = self.column_at(column)?.db_type();
        let value = value.coerce(db_type)?;
        let checksum = self.detection == ChangeDetection::Checksum;
        let target = self.row_mut(row)?;
        target.cells[column] = value;
        if checksum && target.state.is_unchanged() {
            target.checksum = Some(target.compute_checksum());
        }
        Ok(())
    }

    /// Replace every cell of a row with freshly read values and mark it
    /// unchanged.
    pub(crate) fn overwrite_row(&mut self, row: usize, cells: Vec<Value>) -> Result<()> {
        let width = self.columns.len();
        let checksum = self.detection == ChangeDetection::Checksum;
        let target = self.row_mut(row)?;
        if cells.len() != width {
            return Err(TabulaError::InvalidArgument(format!(
                "expected {width} values, got {}",
                cells.len()
            )));
        }
        target.cells = cells;
        target.state = RowState::UNCHANGED;
        target.checksum = checksum.then(|| target.compute_checksum());
        Ok(())
    }

    // ==================== loading and merging ====================

    /// Append every row of `reader` as an unchanged row, mapping fields onto
    /// columns by name. Fields without a matching column are ignored.
    /// Notifications are suspended for the duration of the load.
    pub fn load(&mut self, reader: &mut dyn DataReader) -> Result<usize> {
        if reader.is_closed() {
            return Err(TabulaError::InvalidArgument(
                "cannot load from a closed reader".into(),
            ));
        }
        let mapping: Vec<Option<usize>> = reader
            .fields()
            .iter()
            .map(|f| {
                self.column_index(&f.name)
                    .filter(|&i| self.columns[i].is_persisted())
            })
            .collect();

        let was_suspended = core::mem::replace(&mut self.suspended, true);
        let mut loaded = 0;
        let result = (|| {
            while let Some(values) = reader.next_row() {
                let mut row = self.new_row();
                for (value, target) in values.into_iter().zip(&mapping) {
                    if let Some(index) = *target {
                        row.cells[index] = value.coerce(self.columns[index].db_type())?;
                    }
                }
                row.state = RowState::UNCHANGED;
                if self.detection == ChangeDetection::Checksum {
                    row.checksum = Some(row.compute_checksum());
                }
                self.rows.push(row);
                loaded += 1;
            }
            Ok(())
        })();
        self.suspended = was_suspended;
        result?;

        tabula_trace_store!("load", rows = loaded);
        Ok(loaded)
    }

    /// Merge another store into this one.
    ///
    /// Columns of `other` whose names are new are appended, but only the first
    /// time a given source schema is merged. Rows of `other` are appended with
    /// their cells mapped by column name and their state preserved.
    pub fn merge(&mut self, other: &Store) -> Result<()> {
        let mut added_columns = 0usize;
        if other.schema_id != self.schema_id && self.merged.insert(other.schema_id) {
            let first_new = self.columns.len();
            for column in &other.columns {
                if !self.names.contains_key(column.name()) {
                    self.push_column(column.clone());
                    added_columns += 1;
                }
            }
            if added_columns > 0 {
                let width = self.columns.len();
                let new_relations: Vec<usize> = (first_new..width)
                    .filter(|&i| self.columns[i].is_to_many())
                    .collect();
                for row in self.rows.iter_mut().chain(self.deleted.iter_mut()) {
                    row.widen(width, new_relations.iter().copied());
                }
            }
        }

        let mapping: Vec<Option<usize>> = other
            .columns
            .iter()
            .map(|c| self.column_index(c.name()))
            .collect();
        for source in &other.rows {
            let mut row = self.new_row();
            for (value, target) in source.cells.iter().zip(&mapping) {
                if let Some(index) = *target {
                    row.cells[index] = value.clone();
                }
            }
            row.state = source.state;
            if self.detection == ChangeDetection::Checksum && row.state.is_unchanged() {
                row.checksum = Some(row.compute_checksum());
            }
            self.rows.push(row);
        }

        tabula_trace_store!("merge", columns = added_columns, rows = other.rows.len());
        Ok(())
    }

    // ==================== change tracking ====================

    #[inline]
    pub fn change_detection(&self) -> ChangeDetection {
        self.detection
    }

    /// Switch the dirty-detection mechanism. Enabling checksums captures a
    /// baseline for every unchanged row.
    pub fn set_change_detection(&mut self, detection: ChangeDetection) {
        self.detection = detection;
        for row in &mut self.rows {
            row.checksum = match detection {
                ChangeDetection::Checksum if !row.state.contains(RowState::ADDED) => {
                    Some(row.compute_checksum())
                }
                _ => None,
            };
        }
    }

    /// Whether `row` must be written back to storage.
    pub fn is_row_dirty(&self, row: &Row) -> bool {
        if row.state.intersects(RowState::ADDED | RowState::DELETED) {
            return true;
        }
        match self.detection {
            ChangeDetection::RowState => row.state.contains(RowState::MODIFIED),
            ChangeDetection::Checksum => row.checksum != Some(row.compute_checksum()),
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.deleted.is_empty() || self.rows.iter().any(|row| self.is_row_dirty(row))
    }

    /// A store with the same layout holding copies of the added and modified
    /// rows and of the deleted side-list.
    pub fn change_set(&self) -> Store {
        let mut delta = self.clone_structure();
        delta.rows = self
            .rows
            .iter()
            .filter(|row| self.is_row_dirty(row))
            .map(Row::copy)
            .collect();
        delta.deleted = self.deleted.iter().map(Row::copy).collect();
        delta.next_row = self.next_row;

        tabula_trace_store!(
            "change_set",
            rows = delta.rows.len(),
            deleted = delta.deleted.len()
        );
        delta
    }

    /// Mark every row unchanged and discard the deleted side-list.
    pub fn accept_changes(&mut self) {
        self.deleted.clear();
        let checksum = self.detection == ChangeDetection::Checksum;
        for row in &mut self.rows {
            row.state = RowState::UNCHANGED;
            row.checksum = checksum.then(|| row.compute_checksum());
        }
        tabula_trace_store!("accept", rows = self.rows.len());
    }

    /// Mark one row as persisted.
    pub(crate) fn accept_row(&mut self, row: usize) -> Result<()> {
        let checksum = self.detection == ChangeDetection::Checksum;
        let target = self.row_mut(row)?;
        target.state = RowState::UNCHANGED;
        target.checksum = checksum.then(|| target.compute_checksum());
        Ok(())
    }

    /// Drop the first `count` rows of the deleted side-list once their
    /// DELETEs have run.
    pub(crate) fn forget_deleted(&mut self, count: usize) {
        let count = count.min(self.deleted.len());
        self.deleted.drain(..count);
    }

    /// Put the columns and rows of `snapshot` back in place, keeping this
    /// store's observers.
    pub(crate) fn restore(&mut self, snapshot: &Store) {
        self.schema_id = snapshot.schema_id;
        self.entity = snapshot.entity.clone();
        self.columns = snapshot.columns.clone();
        self.names = snapshot.names.clone();
        self.merged = snapshot.merged.clone();
        self.rows = snapshot.rows.iter().map(Row::copy).collect();
        self.deleted.clear();
        self.next_row = self.next_row.max(snapshot.next_row);
        self.detection = snapshot.detection;
        tabula_trace_store!("reject", rows = self.rows.len());
    }

    // ==================== copies ====================

    /// Deep copy of columns, rows and the deleted side-list. Observers are
    /// not copied.
    pub fn copy(&self) -> Store {
        let mut copy = self.clone_structure();
        copy.rows = self.rows.iter().map(Row::copy).collect();
        copy.deleted = self.deleted.iter().map(Row::copy).collect();
        copy.next_row = self.next_row;
        copy
    }

    /// Same columns and schema identity, no rows.
    pub fn clone_structure(&self) -> Store {
        Store {
            schema_id: self.schema_id,
            entity: self.entity.clone(),
            columns: self.columns.clone(),
            names: self.names.clone(),
            rows: Vec::new(),
            deleted: Vec::new(),
            merged: self.merged.clone(),
            listeners: Vec::new(),
            suspended: false,
            next_row: 0,
            detection: self.detection,
        }
    }

    // ==================== notifications ====================

    /// Register an observer called for every event while notifications are
    /// not suspended.
    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn suspend_events(&mut self) {
        self.suspended = true;
    }

    pub fn resume_events(&mut self) {
        self.suspended = false;
    }

    #[inline]
    pub fn events_suspended(&self) -> bool {
        self.suspended
    }

    fn emit(&mut self, event: StoreEvent) {
        if self.suspended {
            return;
        }
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("schema_id", &self.schema_id)
            .field("entity", &self.entity.as_ref().map(|s| s.type_name()))
            .field("columns", &self.columns)
            .field("rows", &self.rows)
            .field("deleted", &self.deleted)
            .field("listeners", &self.listeners.len())
            .field("suspended", &self.suspended)
            .finish()
    }
}
