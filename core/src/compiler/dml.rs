//! Row-change commands: INSERT, UPDATE, DELETE and RELOAD of store rows.

use super::Compiler;
use super::emit::Emitter;
use crate::command::Command;
use crate::dialect::Identity;
use crate::error::{Result, TabulaError};
use crate::schema::Schema;
use crate::store::{Row, Store};
use std::sync::Arc;

/// Entity metadata of a store and the positions of its identifier columns.
struct Target<'s> {
    schema: &'s Arc<Schema>,
    keys: Vec<usize>,
}

impl<'s> Target<'s> {
    fn of(store: &'s Store) -> Result<Self> {
        let schema = store.entity().ok_or_else(|| {
            TabulaError::InvalidOperation("row commands need a store built for an entity".into())
        })?;
        let keys: Vec<usize> = store
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_identifier())
            .map(|(i, _)| i)
            .collect();
        if keys.is_empty() {
            return Err(TabulaError::schema(
                schema.type_name(),
                "no identifier columns declared",
            ));
        }
        Ok(Self { schema, keys })
    }

    fn table(&self) -> &str {
        self.schema.table()
    }

    /// `A = p0 AND B = p1` over the identifier columns.
    fn key_predicate(&self, emitter: &mut Emitter<'_>, store: &Store, row: &Row) -> String {
        let mut text = String::new();
        for (i, &index) in self.keys.iter().enumerate() {
            if i > 0 {
                text.push_str(" AND ");
            }
            let column = &store.columns()[index];
            text.push_str(column.name());
            text.push_str(" = ");
            text.push_str(&emitter.bind_column(row.cells()[index].clone(), column));
        }
        text
    }
}

fn check_batch_size(batch_size: usize) -> Result<()> {
    if batch_size == 0 {
        return Err(TabulaError::InvalidArgument(
            "batch size must be at least 1".into(),
        ));
    }
    Ok(())
}

impl Compiler {
    /// INSERT for one row, reading back a generated identifier the way the
    /// dialect does.
    ///
    /// Whenever an identifier is read back the command carries an output
    /// parameter linked to its column. Only `RETURNING … INTO` names it in
    /// the text; for `RETURNING` and follow-up queries it is the slot the
    /// returned value is copied into before it reaches the row.
    pub fn insert(&self, store: &Store, row: &Row) -> Result<Command> {
        let target = Target::of(store)?;
        let mut emitter = Emitter::new(self.rules());
        let mut text = self.insert_text(&mut emitter, &target, store, row);

        let generated = target
            .schema
            .generated_identifier()
            .and_then(|c| store.column_index(c.name()))
            .map(|i| &store.columns()[i]);
        let mut follow_up = None;
        if let Some(column) = generated {
            match self.rules().identity() {
                Identity::None => {}
                Identity::Returning => {
                    emitter.output(column);
                    text.push_str(&format!(" RETURNING {}", column.name()));
                }
                Identity::ReturningInto => {
                    let name = emitter.output(column);
                    text.push_str(&format!(" RETURNING {} INTO {name}", column.name()));
                }
                Identity::FollowUp(query) => {
                    emitter.output(column);
                    follow_up = Some(Command::new(query));
                }
            }
        }

        let command = self.finish(text, emitter);
        Ok(match follow_up {
            Some(next) => command.with_follow_up(next),
            None => command,
        })
    }

    /// UPDATE for one row. When `changed` is given, only columns whose name or
    /// property is listed are set. Yields an uninitialized command when no
    /// column is left to set.
    pub fn update(&self, store: &Store, row: &Row, changed: Option<&[&str]>) -> Result<Command> {
        let target = Target::of(store)?;
        let mut emitter = Emitter::new(self.rules());
        match self.update_text(&mut emitter, &target, store, row, changed) {
            Some(text) => Ok(self.finish(text, emitter)),
            None => Ok(Command::default()),
        }
    }

    pub fn delete(&self, store: &Store, row: &Row) -> Result<Command> {
        let target = Target::of(store)?;
        let mut emitter = Emitter::new(self.rules());
        let text = self.delete_text(&mut emitter, &target, store, row);
        Ok(self.finish(text, emitter))
    }

    /// SELECT of every persisted column of one row, keyed by its identifiers.
    pub fn reload(&self, store: &Store, row: &Row) -> Result<Command> {
        let target = Target::of(store)?;
        let mut emitter = Emitter::new(self.rules());
        emitter.entity(target.table());
        let columns: Vec<&str> = store
            .columns()
            .iter()
            .filter(|c| c.is_persisted())
            .map(|c| c.name())
            .collect();
        let predicate = target.key_predicate(&mut emitter, store, row);
        let text = format!(
            "SELECT {} FROM {} WHERE ({predicate})",
            columns.join(", "),
            target.table()
        );
        Ok(self.finish(text, emitter))
    }

    /// INSERTs for `rows`, `batch_size` statements per command. These carry
    /// no way to read generated identifiers back; sessions insert rows with
    /// a generated identifier one by one instead.
    pub fn insert_batch(&self, store: &Store, rows: &[&Row], batch_size: usize) -> Result<Vec<Command>> {
        let target = self.batch_target(store, batch_size, "batch insert")?;
        self.batch(rows, batch_size, |emitter, row| {
            Some(self.insert_text(emitter, &target, store, row))
        })
    }

    /// UPDATEs for `rows`; rows left with nothing to set are skipped.
    pub fn update_batch(
        &self,
        store: &Store,
        rows: &[&Row],
        batch_size: usize,
        changed: Option<&[&str]>,
    ) -> Result<Vec<Command>> {
        let target = self.batch_target(store, batch_size, "batch update")?;
        self.batch(rows, batch_size, |emitter, row| {
            self.update_text(emitter, &target, store, row, changed)
        })
    }

    pub fn delete_batch(&self, store: &Store, rows: &[&Row], batch_size: usize) -> Result<Vec<Command>> {
        let target = self.batch_target(store, batch_size, "batch delete")?;
        self.batch(rows, batch_size, |emitter, row| {
            Some(self.delete_text(emitter, &target, store, row))
        })
    }

    /// Fails unless `batch_size` is positive and the dialect can run
    /// several statements in one command.
    pub fn ensure_batch(&self, batch_size: usize, operation: &'static str) -> Result<()> {
        check_batch_size(batch_size)?;
        if !self.rules().supports_batch() {
            return Err(TabulaError::Unsupported {
                dialect: self.dialect(),
                operation,
            });
        }
        Ok(())
    }

    fn batch_target<'s>(
        &self,
        store: &'s Store,
        batch_size: usize,
        operation: &'static str,
    ) -> Result<Target<'s>> {
        self.ensure_batch(batch_size, operation)?;
        Target::of(store)
    }

    fn batch(
        &self,
        rows: &[&Row],
        batch_size: usize,
        mut statement: impl FnMut(&mut Emitter<'_>, &Row) -> Option<String>,
    ) -> Result<Vec<Command>> {
        let separator = self.rules().statement_separator();
        let mut commands = Vec::with_capacity(rows.len().div_ceil(batch_size));
        for chunk in rows.chunks(batch_size) {
            let mut emitter = Emitter::new(self.rules());
            let statements: Vec<String> = chunk
                .iter()
                .filter_map(|row| statement(&mut emitter, *row))
                .collect();
            if statements.is_empty() {
                continue;
            }
            commands.push(self.finish(statements.join(separator), emitter));
        }
        Ok(commands)
    }

    fn insert_text(
        &self,
        emitter: &mut Emitter<'_>,
        target: &Target<'_>,
        store: &Store,
        row: &Row,
    ) -> String {
        emitter.entity(target.table());
        let mut names = Vec::new();
        let mut values = Vec::new();
        for (index, column) in store.columns().iter().enumerate() {
            if !column.is_persisted() {
                continue;
            }
            let next = column
                .sequence_name()
                .and_then(|sequence| self.rules().sequence_next(sequence));
            if let Some(next) = next {
                names.push(column.name());
                values.push(next);
            } else if column.is_insertable() && column.carries_value(&row.cells()[index]) {
                names.push(column.name());
                values.push(emitter.bind_column(row.cells()[index].clone(), column));
            }
        }
        if names.is_empty() {
            return self.rules().default_values_insert(target.table());
        }
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            target.table(),
            names.join(", "),
            values.join(", ")
        )
    }

    fn update_text(
        &self,
        emitter: &mut Emitter<'_>,
        target: &Target<'_>,
        store: &Store,
        row: &Row,
        changed: Option<&[&str]>,
    ) -> Option<String> {
        let listed = |name: &str, field: &str| {
            changed.is_none_or(|names| names.iter().any(|n| *n == name || *n == field))
        };
        let settable: Vec<usize> = store
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_persisted() && c.is_updatable() && listed(c.name(), c.field_name()))
            .map(|(i, _)| i)
            .collect();
        if settable.is_empty() {
            return None;
        }

        emitter.entity(target.table());
        let mut text = format!("UPDATE {} SET ", target.table());
        for (i, &index) in settable.iter().enumerate() {
            if i > 0 {
                text.push_str(", ");
            }
            let column = &store.columns()[index];
            text.push_str(column.name());
            text.push_str(" = ");
            text.push_str(&emitter.bind_column(row.cells()[index].clone(), column));
        }
        let predicate = target.key_predicate(emitter, store, row);
        text.push_str(&format!(" WHERE ({predicate})"));
        Some(text)
    }

    fn delete_text(
        &self,
        emitter: &mut Emitter<'_>,
        target: &Target<'_>,
        store: &Store,
        row: &Row,
    ) -> String {
        emitter.entity(target.table());
        let predicate = target.key_predicate(emitter, store, row);
        format!("DELETE FROM {} WHERE ({predicate})", target.table())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Dialect, DialectRules};
    use crate::record::Record;
    use crate::schema::{Column, Entity};
    use crate::values::Value;
    use tabula_types::DbType;

    #[derive(Debug)]
    struct Returning;

    impl DialectRules for Returning {
        fn dialect(&self) -> Dialect {
            Dialect::PostgreSQL
        }

        fn parameter_prefix(&self) -> &'static str {
            ":p"
        }

        fn supports_batch(&self) -> bool {
            true
        }

        fn identity(&self) -> Identity {
            Identity::Returning
        }
    }

    #[derive(Debug)]
    struct NoBatch;

    impl DialectRules for NoBatch {
        fn dialect(&self) -> Dialect {
            Dialect::SQLite
        }

        fn parameter_prefix(&self) -> &'static str {
            "@p"
        }
    }

    struct Item;

    impl Entity for Item {
        const TABLE: &'static str = "Items";

        fn columns() -> Vec<Column> {
            vec![
                Column::new("Id", DbType::BigInt).identifier().auto_generated(),
                Column::new("Name", DbType::Text).field("name"),
                Column::new("Stock", DbType::Integer).default_value(0i64),
                Column::new("Total", DbType::Integer).computed(),
            ]
        }

        fn from_record(_: &Record<'_>) -> Result<Self> {
            Ok(Item)
        }

        fn values(&self) -> Vec<(&'static str, Value)> {
            Vec::new()
        }
    }

    struct Loose;

    impl Entity for Loose {
        const TABLE: &'static str = "Loose";

        fn columns() -> Vec<Column> {
            vec![Column::new("Payload", DbType::Text)]
        }

        fn from_record(_: &Record<'_>) -> Result<Self> {
            Ok(Loose)
        }

        fn values(&self) -> Vec<(&'static str, Value)> {
            Vec::new()
        }
    }

    fn items() -> Store {
        let mut store = Store::for_entity::<Item>().unwrap();
        for (id, name, stock) in [(1i64, "bolt", 0i64), (2, "nut", 12)] {
            let mut row = store.new_row();
            row.set(0, id).unwrap();
            row.set(1, name).unwrap();
            row.set(2, stock).unwrap();
            store.add_row(row).unwrap();
        }
        store
    }

    #[test]
    fn insert_skips_defaults_and_generated_columns() {
        let store = items();
        let compiler = Compiler::new(Returning);
        let first = compiler.insert(&store, &store.rows()[0]).unwrap();
        assert_eq!(
            first.text(),
            "INSERT INTO Items (Name) VALUES (:p0) RETURNING Id"
        );
        let output = first.output_parameter().unwrap();
        assert_eq!(output.name, ":p1");
        assert_eq!(output.column.as_deref(), Some("Id"));

        let second = compiler.insert(&store, &store.rows()[1]).unwrap();
        assert_eq!(
            second.text(),
            "INSERT INTO Items (Name, Stock) VALUES (:p0, :p1) RETURNING Id"
        );
    }

    #[test]
    fn update_honours_changed_properties() {
        let store = items();
        let compiler = Compiler::new(Returning);
        let all = compiler.update(&store, &store.rows()[0], None).unwrap();
        assert_eq!(
            all.text(),
            "UPDATE Items SET Name = :p0, Stock = :p1 WHERE (Id = :p2)"
        );
        let narrowed = compiler
            .update(&store, &store.rows()[0], Some(&["name"][..]))
            .unwrap();
        assert_eq!(narrowed.text(), "UPDATE Items SET Name = :p0 WHERE (Id = :p1)");
        let nothing = compiler
            .update(&store, &store.rows()[0], Some(&["Total"][..]))
            .unwrap();
        assert!(!nothing.is_initialized());
    }

    #[test]
    fn delete_and_reload_key_on_identifiers() {
        let store = items();
        let compiler = Compiler::new(Returning);
        let delete = compiler.delete(&store, &store.rows()[1]).unwrap();
        assert_eq!(delete.text(), "DELETE FROM Items WHERE (Id = :p0)");
        assert_eq!(delete.parameters()[0].value, Value::Integer(2));
        let reload = compiler.reload(&store, &store.rows()[1]).unwrap();
        assert_eq!(
            reload.text(),
            "SELECT Id, Name, Stock, Total FROM Items WHERE (Id = :p0)"
        );
    }

    #[test]
    fn keyless_entities_cannot_be_updated() {
        let mut store = Store::for_entity::<Loose>().unwrap();
        let row = store.new_row();
        store.add_row(row).unwrap();
        let err = Compiler::new(Returning)
            .delete(&store, &store.rows()[0])
            .unwrap_err();
        assert!(matches!(err, TabulaError::Schema { .. }));
    }

    #[test]
    fn batches_chunk_and_number_per_command() {
        let store = items();
        let rows: Vec<&Row> = store.rows().iter().collect();
        let commands = Compiler::new(Returning).delete_batch(&store, &rows, 1).unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[1].text(), "DELETE FROM Items WHERE (Id = :p0)");

        let joined = Compiler::new(Returning).delete_batch(&store, &rows, 10).unwrap();
        assert_eq!(
            joined[0].text(),
            "DELETE FROM Items WHERE (Id = :p0);\nDELETE FROM Items WHERE (Id = :p1)"
        );
    }

    #[test]
    fn batch_requires_dialect_support() {
        let store = items();
        let rows: Vec<&Row> = store.rows().iter().collect();
        let err = Compiler::new(NoBatch).insert_batch(&store, &rows, 50).unwrap_err();
        assert!(matches!(
            err,
            TabulaError::Unsupported {
                operation: "batch insert",
                ..
            }
        ));
        let zero = Compiler::new(Returning).insert_batch(&store, &rows, 0).unwrap_err();
        assert!(matches!(zero, TabulaError::InvalidArgument(_)));
    }
}
