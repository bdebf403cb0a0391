use crate::error::Result;
use crate::expressions::{Condition, Expr};
use crate::join::JoinKind;
use crate::schema::{Entity, Schema, schema_of};
use compact_str::CompactString;
use std::sync::Arc;

/// Where a table name comes from.
#[derive(Debug, Clone)]
pub enum Source {
    Named(CompactString),
    /// Resolved through the schema cache when the query is compiled
    Entity {
        type_name: &'static str,
        schema: fn() -> Result<Arc<Schema>>,
    },
}

/// A table reference recorded in a query, optionally aliased.
#[derive(Debug, Clone)]
pub struct TableRef {
    source: Source,
    alias: Option<CompactString>,
}

impl TableRef {
    pub fn named(name: impl Into<CompactString>) -> Self {
        Self {
            source: Source::Named(name.into()),
            alias: None,
        }
    }

    pub fn entity<T: Entity>() -> Self {
        Self {
            source: Source::Entity {
                type_name: core::any::type_name::<T>(),
                schema: schema_of::<T>,
            },
            alias: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<CompactString>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[inline]
    pub fn source(&self) -> &Source {
        &self.source
    }

    #[inline]
    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Rust type recorded as a generic argument, if any.
    pub fn type_name(&self) -> Option<&'static str> {
        match self.source {
            Source::Entity { type_name, .. } => Some(type_name),
            Source::Named(_) => None,
        }
    }

    pub fn schema(&self) -> Result<Option<Arc<Schema>>> {
        match &self.source {
            Source::Entity { schema, .. } => schema().map(Some),
            Source::Named(_) => Ok(None),
        }
    }

    pub fn table_name(&self) -> Result<CompactString> {
        match &self.source {
            Source::Named(name) => Ok(name.clone()),
            Source::Entity { schema, .. } => Ok(CompactString::from(schema()?.table())),
        }
    }

    /// The name other clauses use to qualify this table's columns.
    pub fn qualifier(&self) -> Result<CompactString> {
        match &self.alias {
            Some(alias) => Ok(alias.clone()),
            None => self.table_name(),
        }
    }
}

impl From<&str> for TableRef {
    fn from(name: &str) -> Self {
        TableRef::named(name)
    }
}

impl From<String> for TableRef {
    fn from(name: String) -> Self {
        TableRef::named(name)
    }
}

/// Reference the table of entity `T`.
pub fn table<T: Entity>() -> TableRef {
    TableRef::entity::<T>()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    pub const fn keyword(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// One ORDER BY term.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTerm {
    pub expr: Expr,
    pub order: Order,
}

/// One recorded builder operation.
#[derive(Debug, Clone)]
pub enum QueryCall {
    Select { columns: Vec<Expr>, distinct: bool },
    /// `Select<T>()`: every persisted column of `T`, with an implicit FROM
    SelectAll { table: TableRef, distinct: bool },
    Insert(TableRef),
    Update(TableRef),
    Delete(TableRef),
    Truncate(TableRef),
    From(TableRef),
    Join {
        kind: JoinKind,
        table: TableRef,
        on: Option<Condition>,
    },
    Where(Condition),
    And(Condition),
    Or(Condition),
    GroupBy(Vec<Expr>),
    Having(Condition),
    OrderBy(Vec<OrderTerm>),
    Union { all: bool },
    Set(Vec<(CompactString, Expr)>),
    /// One row of an INSERT
    Values(Vec<(CompactString, Expr)>),
    Limit(u64),
    Page { offset: u64, count: u64 },
}

impl QueryCall {
    /// Name of the recorded operation.
    pub const fn name(&self) -> &'static str {
        match self {
            QueryCall::Select { .. } | QueryCall::SelectAll { .. } => "Select",
            QueryCall::Insert(_) => "Insert",
            QueryCall::Update(_) => "Update",
            QueryCall::Delete(_) => "Delete",
            QueryCall::Truncate(_) => "Truncate",
            QueryCall::From(_) => "From",
            QueryCall::Join { kind, .. } => match kind {
                JoinKind::Inner => "InnerJoin",
                JoinKind::Left => "LeftJoin",
                JoinKind::Right => "RightJoin",
                JoinKind::Full => "FullJoin",
                JoinKind::Cross => "CrossJoin",
            },
            QueryCall::Where(_) => "Where",
            QueryCall::And(_) => "And",
            QueryCall::Or(_) => "Or",
            QueryCall::GroupBy(_) => "GroupBy",
            QueryCall::Having(_) => "Having",
            QueryCall::OrderBy(_) => "OrderBy",
            QueryCall::Union { all: false } => "Union",
            QueryCall::Union { all: true } => "UnionAll",
            QueryCall::Set(_) => "Set",
            QueryCall::Values(_) => "Values",
            QueryCall::Limit(_) => "Limit",
            QueryCall::Page { .. } => "Page",
        }
    }

    /// Generic type argument the operation was recorded with.
    pub fn type_argument(&self) -> Option<&'static str> {
        match self {
            QueryCall::SelectAll { table, .. }
            | QueryCall::Insert(table)
            | QueryCall::Update(table)
            | QueryCall::Delete(table)
            | QueryCall::Truncate(table)
            | QueryCall::From(table)
            | QueryCall::Join { table, .. } => table.type_name(),
            _ => None,
        }
    }
}
