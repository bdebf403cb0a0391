//! An executor that plays a tiny in-memory database and records every
//! command it receives.
//!
//! It understands exactly the shapes the compiler emits for row changes and
//! simple filtered selects: filters are `Column = param` terms after
//! `WHERE`, assignments are `Column = param` terms before it.

use std::collections::{HashMap, VecDeque};
use tabula::core::{Command, Field, ResultSet, TransactionKind};
use tabula::prelude::*;

type StoredRow = Vec<(String, Value)>;

#[derive(Debug, Default)]
pub struct MemoryExecutor {
    log: Vec<Command>,
    tables: HashMap<String, Vec<StoredRow>>,
    queued: VecDeque<ResultSet>,
    last_id: i64,
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command received, in order.
    pub fn commands(&self) -> &[Command] {
        &self.log
    }

    pub fn texts(&self) -> Vec<&str> {
        self.log.iter().map(Command::text).collect()
    }

    pub fn rows(&self, table: &str) -> &[StoredRow] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Put a row straight into a table.
    pub fn seed(&mut self, table: &str, row: &[(&str, Value)]) {
        self.tables
            .entry(table.to_owned())
            .or_default()
            .push(row.iter().map(|(c, v)| ((*c).to_owned(), v.clone())).collect());
    }

    /// Answer the next query with `result` instead of reading the tables.
    pub fn queue(&mut self, result: ResultSet) {
        self.queued.push_back(result);
    }

    fn insert(&mut self, command: &mut Command) -> i64 {
        let table = table_of(command.text());
        let mut row: StoredRow = command
            .parameters()
            .iter()
            .filter(|p| !p.is_output())
            .filter_map(|p| Some((p.column.as_deref()?.to_owned(), p.value.clone())))
            .collect();
        self.last_id += 1;
        if let Some(output) = command.output_parameter_mut() {
            output.value = Value::Integer(self.last_id);
            if let Some(column) = output.column.as_deref() {
                row.push((column.to_owned(), Value::Integer(self.last_id)));
            }
        }
        self.tables.entry(table).or_default().push(row);
        self.last_id
    }

    fn matching(&self, command: &Command) -> (String, Vec<usize>) {
        let table = table_of(command.text());
        let filters = terms(command, Side::Filter);
        let hits = self
            .rows(&table)
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                filters.iter().all(|(column, value)| {
                    row.iter().any(|(c, v)| c == column && v == value)
                })
            })
            .map(|(i, _)| i)
            .collect();
        (table, hits)
    }
}

impl Executor for MemoryExecutor {
    fn query(&mut self, command: &mut Command) -> Result<ResultSet> {
        let result = if let Some(result) = self.queued.pop_front() {
            result
        } else if command.transaction_kind() == TransactionKind::Insert {
            let id = self.insert(command);
            ResultSet::new(
                vec![Field::new("Id", DbType::BigInt)],
                [vec![Value::Integer(id)]],
            )
        } else if !command.text().contains(" FROM ") {
            ResultSet::new(
                vec![Field::new("Id", DbType::BigInt)],
                [vec![Value::Integer(self.last_id)]],
            )
        } else {
            self.select(command)
        };
        self.log.push(command.clone());
        Ok(result)
    }

    fn execute(&mut self, command: &mut Command) -> Result<u64> {
        let affected = if command.text().contains(";\n") {
            command.text().split(";\n").count()
        } else {
            match command.transaction_kind() {
                TransactionKind::Insert => {
                    self.insert(command);
                    1
                }
                TransactionKind::Update => self.update(command),
                TransactionKind::Delete => self.delete(command),
                _ => 0,
            }
        };
        self.log.push(command.clone());
        Ok(affected as u64)
    }
}

impl MemoryExecutor {
    fn select(&self, command: &Command) -> ResultSet {
        let (table, hits) = self.matching(command);
        let rows = self.rows(&table);
        let Some(first) = hits.first().map(|&i| &rows[i]) else {
            return ResultSet::empty();
        };
        let fields: Vec<Field> = first
            .iter()
            .map(|(c, v)| Field::new(c.as_str(), v.db_type()))
            .collect();
        let values: Vec<Vec<Value>> = hits
            .iter()
            .map(|&i| {
                fields
                    .iter()
                    .map(|f| {
                        rows[i]
                            .iter()
                            .find(|(c, _)| c.as_str() == f.name.as_str())
                            .map_or(Value::Null, |(_, v)| v.clone())
                    })
                    .collect()
            })
            .collect();
        ResultSet::new(fields, values)
    }

    fn update(&mut self, command: &Command) -> usize {
        let (table, hits) = self.matching(command);
        let assignments = terms(command, Side::Assignment);
        if let Some(rows) = self.tables.get_mut(&table) {
            for &i in &hits {
                for (column, value) in &assignments {
                    match rows[i].iter_mut().find(|(c, _)| c == column) {
                        Some(cell) => cell.1 = value.clone(),
                        None => rows[i].push((column.clone(), value.clone())),
                    }
                }
            }
        }
        hits.len()
    }

    fn delete(&mut self, command: &Command) -> usize {
        let (table, hits) = self.matching(command);
        if let Some(rows) = self.tables.get_mut(&table) {
            for &i in hits.iter().rev() {
                rows.remove(i);
            }
        }
        hits.len()
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Side {
    Assignment,
    Filter,
}

/// `Column = param` pairs on one side of the WHERE keyword.
fn terms(command: &Command, side: Side) -> Vec<(String, Value)> {
    let text = command.text();
    let split = text.find(" WHERE ").unwrap_or(text.len());
    command
        .parameters()
        .iter()
        .filter(|p| !p.is_output())
        .filter_map(|p| {
            let at = position(text, &p.name)?;
            let wanted = match side {
                Side::Assignment => at < split,
                Side::Filter => at > split,
            };
            if !wanted {
                return None;
            }
            let column = text[..at].strip_suffix(" = ")?;
            let column = column
                .rsplit([' ', '(', ','])
                .next()?
                .rsplit('.')
                .next()?
                .trim_matches(['[', ']']);
            Some((column.to_owned(), p.value.clone()))
        })
        .collect()
}

/// Offset of a parameter name that is not the prefix of a longer one.
fn position(text: &str, name: &str) -> Option<usize> {
    text.match_indices(name)
        .map(|(at, _)| at)
        .find(|&at| {
            !text[at + name.len()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit())
        })
}

fn table_of(text: &str) -> String {
    let after = ["INSERT INTO ", "DELETE FROM ", "UPDATE ", " FROM "]
        .iter()
        .find_map(|keyword| text.find(keyword).map(|at| &text[at + keyword.len()..]))
        .unwrap_or_default();
    after
        .split([' ', '(', ';'])
        .next()
        .unwrap_or_default()
        .trim_matches(['[', ']'])
        .to_owned()
}
