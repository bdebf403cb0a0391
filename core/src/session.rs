//! Persistence of tracked changes through an external executor
//!
//! A [`Session`] pairs a [`Compiler`] with an [`Executor`]. It runs recorded
//! queries into stores and collections, and turns the rows a collection has
//! added, modified or removed back into INSERT, UPDATE and DELETE commands.
//! Nothing here owns a connection or a transaction; the executor does.

use crate::collection::Collection;
use crate::command::Command;
use crate::compiler::Compiler;
use crate::dialect::Identity;
use crate::error::{Result, TabulaError};
use crate::query::Query;
use crate::schema::Entity;
use crate::store::{ChangeDetection, ResultSet, RowState, Store};
use crate::values::Value;

/// The execution collaborator.
///
/// Implementations run command text against a real database. Output and
/// in-out parameter values are written back into the command's parameters.
pub trait Executor {
    /// Run a command that returns rows.
    fn query(&mut self, command: &mut Command) -> Result<ResultSet>;

    /// Run a command for its side effects, returning the affected row count.
    fn execute(&mut self, command: &mut Command) -> Result<u64>;
}

impl<E: Executor + ?Sized> Executor for &mut E {
    fn query(&mut self, command: &mut Command) -> Result<ResultSet> {
        (**self).query(command)
    }

    fn execute(&mut self, command: &mut Command) -> Result<u64> {
        (**self).execute(command)
    }
}

/// A compiled command and the row positions it persists. An absent
/// command (nothing left to set) still commits its rows.
struct Staged {
    command: Command,
    rows: Vec<usize>,
}

impl Staged {
    fn new(command: Option<Command>, rows: &[usize]) -> Self {
        Self {
            command: command.unwrap_or_default(),
            rows: rows.to_vec(),
        }
    }
}

/// Persistence defaults applied by a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Rows per command for [`Session::save_changes`]; 1 is row-by-row
    pub batch_size: usize,
    /// Change detection for stores the session fetches
    pub change_detection: ChangeDetection,
    /// Whether fetched collections snapshot themselves for rejection
    pub track_for_rejection: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            batch_size: 1,
            change_detection: ChangeDetection::RowState,
            track_for_rejection: false,
        }
    }
}

#[derive(Debug)]
pub struct Session<E> {
    compiler: Compiler,
    executor: E,
    options: SessionOptions,
}

impl<E: Executor> Session<E> {
    pub fn new(compiler: Compiler, executor: E) -> Self {
        Self::with_options(compiler, executor, SessionOptions::default())
    }

    pub fn with_options(compiler: Compiler, executor: E, options: SessionOptions) -> Self {
        Self {
            compiler,
            executor,
            options,
        }
    }

    #[inline]
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    #[inline]
    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    #[inline]
    pub fn executor(&self) -> &E {
        &self.executor
    }

    #[inline]
    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    pub fn into_executor(self) -> E {
        self.executor
    }

    // ==================== reading ====================

    /// Compile and run `query`, shaping the store after the returned fields.
    pub fn query(&mut self, query: &Query) -> Result<Store> {
        let mut command = self.compiler.compile(query)?;
        let mut result = self.run_query(&mut command)?;
        let mut store = Store::from_reader(&mut result)?;
        store.set_change_detection(self.options.change_detection);
        Ok(store)
    }

    /// Compile and run `query` into a collection of `T`. Fields that are not
    /// columns of `T` are ignored.
    pub fn fetch<T: Entity>(&mut self, query: &Query) -> Result<Collection<T>> {
        let mut command = self.compiler.compile(query)?;
        let mut result = self.run_query(&mut command)?;
        let mut store = Store::for_entity::<T>()?;
        store.set_change_detection(self.options.change_detection);
        let _loaded = store.load(&mut result)?;
        tabula_trace_session!("fetch", rows = _loaded);

        let mut collection = Collection::from_store(store)?;
        if self.options.track_for_rejection {
            collection.track_for_rejection()?;
        }
        Ok(collection)
    }

    /// Run a command for its side effects. Uninitialized commands are refused.
    pub fn execute(&mut self, command: &mut Command) -> Result<u64> {
        command.ensure_initialized()?;
        self.executor.execute(command)
    }

    fn run_query(&mut self, command: &mut Command) -> Result<ResultSet> {
        command.ensure_initialized()?;
        self.executor.query(command)
    }

    // ==================== writing ====================

    /// INSERT one row and write any generated identifier back into it.
    ///
    /// The generated value lands on the command's output parameter first and
    /// is then copied into the linked column without marking the row
    /// modified.
    pub fn insert_row(&mut self, store: &mut Store, index: usize) -> Result<u64> {
        let mut command = self.compiler.insert(store, store.row(index)?)?;
        if command.output_parameter().is_none() {
            return self.execute(&mut command);
        }

        let (affected, generated) = match self.compiler.rules().identity() {
            Identity::Returning => {
                let result = self.run_query(&mut command)?;
                (result.len() as u64, result.first_value().cloned())
            }
            Identity::ReturningInto => {
                let affected = self.execute(&mut command)?;
                let value = command.output_parameter().map(|p| p.value.clone());
                (affected, value)
            }
            Identity::FollowUp(_) => {
                let affected = self.execute(&mut command)?;
                let value = match command.follow_up_mut() {
                    Some(follow_up) => self.run_query(follow_up)?.first_value().cloned(),
                    None => None,
                };
                (affected, value)
            }
            Identity::None => (self.execute(&mut command)?, None),
        };

        if let Some(value) = generated.filter(|v| !v.is_null()) {
            self.write_generated(store, index, &mut command, value)?;
        }
        Ok(affected)
    }

    fn write_generated(
        &self,
        store: &mut Store,
        index: usize,
        command: &mut Command,
        value: Value,
    ) -> Result<()> {
        let Some(parameter) = command.output_parameter_mut() else {
            return Ok(());
        };
        parameter.value = value.clone();
        let Some(column) = parameter.column.as_deref() else {
            return Ok(());
        };
        let column = store
            .column_index(column)
            .ok_or_else(|| TabulaError::KeyNotFound(column.to_owned()))?;
        store.write_back(index, column, value)
    }

    /// INSERT every added row of `collection`.
    ///
    /// A `batch_size` of 1 or less inserts row by row. Larger sizes need a
    /// dialect with batch support and fail before anything runs otherwise.
    /// Rows whose identifier the database generates are still inserted one
    /// per command so the identity can be read back into them. Each row is
    /// accepted as soon as its command has run.
    pub fn process_insert<T: Entity>(
        &mut self,
        collection: &mut Collection<T>,
        batch_size: usize,
    ) -> Result<u64> {
        if batch_size > 1 {
            self.compiler.ensure_batch(batch_size, "batch insert")?;
        }
        let store = collection.store_mut();
        let positions: Vec<usize> = store
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| row.state().contains(RowState::ADDED))
            .map(|(i, _)| i)
            .collect();

        let mut affected = 0;
        if batch_size <= 1 || self.reads_identity(store) {
            for &index in &positions {
                affected += self.insert_row(store, index)?;
                store.accept_row(index)?;
            }
        } else {
            let mut staged = Vec::new();
            for chunk in positions.chunks(batch_size) {
                let rows: Vec<_> = chunk.iter().map(|&i| &store.rows()[i]).collect();
                let command = self.compiler.insert_batch(store, &rows, batch_size)?.pop();
                staged.push(Staged::new(command, chunk));
            }
            affected = self.run_staged(staged, |rows| {
                rows.iter().try_for_each(|&i| store.accept_row(i))
            })?;
        }
        tabula_trace_session!("insert", rows = positions.len(), affected = affected);
        Ok(affected)
    }

    /// Whether inserts into `store` read a generated identifier back.
    fn reads_identity(&self, store: &Store) -> bool {
        self.compiler.rules().identity() != Identity::None
            && store
                .entity()
                .and_then(|schema| schema.generated_identifier())
                .is_some_and(|column| store.column_index(column.name()).is_some())
    }

    /// UPDATE every modified row of `collection`, optionally narrowed to the
    /// `changed` properties. Each row is accepted as soon as its command has
    /// run.
    pub fn process_update<T: Entity>(
        &mut self,
        collection: &mut Collection<T>,
        batch_size: usize,
        changed: Option<&[&str]>,
    ) -> Result<u64> {
        if batch_size > 1 {
            self.compiler.ensure_batch(batch_size, "batch update")?;
        }
        let store = collection.store_mut();
        let positions: Vec<usize> = store
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                !row.state().intersects(RowState::ADDED | RowState::DELETED)
                    && store.is_row_dirty(row)
            })
            .map(|(i, _)| i)
            .collect();

        let mut staged = Vec::new();
        for chunk in positions.chunks(batch_size.max(1)) {
            let command = if batch_size <= 1 {
                Some(self.compiler.update(store, &store.rows()[chunk[0]], changed)?)
            } else {
                let rows: Vec<_> = chunk.iter().map(|&i| &store.rows()[i]).collect();
                self.compiler.update_batch(store, &rows, batch_size, changed)?.pop()
            };
            staged.push(Staged::new(command, chunk));
        }
        let affected = self.run_staged(staged, |rows| {
            rows.iter().try_for_each(|&i| store.accept_row(i))
        })?;
        tabula_trace_session!("update", rows = positions.len(), affected = affected);
        Ok(affected)
    }

    /// DELETE every row removed from `collection`. Rows leave the deleted
    /// side-list as soon as their command has run.
    pub fn process_delete<T: Entity>(
        &mut self,
        collection: &mut Collection<T>,
        batch_size: usize,
    ) -> Result<u64> {
        if batch_size > 1 {
            self.compiler.ensure_batch(batch_size, "batch delete")?;
        }
        let store = collection.store_mut();
        let positions: Vec<usize> = (0..store.deleted_rows().len()).collect();

        let mut staged = Vec::new();
        for chunk in positions.chunks(batch_size.max(1)) {
            let rows: Vec<_> = chunk.iter().map(|&i| &store.deleted_rows()[i]).collect();
            let command = if batch_size <= 1 {
                Some(self.compiler.delete(store, rows[0])?)
            } else {
                self.compiler.delete_batch(store, &rows, batch_size)?.pop()
            };
            staged.push(Staged::new(command, chunk));
        }
        let affected = self.run_staged(staged, |rows| {
            store.forget_deleted(rows.len());
            Ok(())
        })?;
        tabula_trace_session!("delete", rows = positions.len(), affected = affected);
        Ok(affected)
    }

    /// Run every staged command in order, committing its rows right after it
    /// succeeds. All commands are compiled before the first one runs, so a
    /// compile failure leaves the database untouched; an execution failure
    /// leaves the rows of earlier commands committed and the rest pending.
    fn run_staged(
        &mut self,
        staged: Vec<Staged>,
        mut commit: impl FnMut(&[usize]) -> Result<()>,
    ) -> Result<u64> {
        let mut affected = 0;
        for Staged { mut command, rows } in staged {
            if command.is_initialized() {
                affected += self.execute(&mut command)?;
            }
            commit(&rows)?;
        }
        Ok(affected)
    }

    /// Re-read one row from the database, leaving it unchanged.
    pub fn reload<T: Entity>(&mut self, collection: &mut Collection<T>, index: usize) -> Result<()> {
        let store = collection.store_mut();
        let mut command = self.compiler.reload(store, store.row(index)?)?;
        let mut result = self.run_query(&mut command)?;

        let mut fresh = store.clone_structure();
        fresh.load(&mut result)?;
        let cells = fresh
            .rows()
            .first()
            .map(|row| row.cells().to_vec())
            .ok_or_else(|| {
                TabulaError::InvalidOperation(format!("row {index} no longer exists in storage"))
            })?;
        store.overwrite_row(index, cells)
    }

    /// Persist every change of `collection` (deletes, then updates, then
    /// inserts) and accept them. Returns the affected row count.
    ///
    /// Rows are committed command by command, so after a failure a retry
    /// only sends what has not run yet.
    pub fn save_changes<T: Entity>(&mut self, collection: &mut Collection<T>) -> Result<u64> {
        let batch_size = self.options.batch_size;
        let mut affected = self.process_delete(collection, batch_size)?;
        affected += self.process_update(collection, batch_size, None)?;
        affected += self.process_insert(collection, batch_size)?;
        collection.accept_changes();
        tabula_trace_session!("save", affected = affected);
        Ok(affected)
    }
}
