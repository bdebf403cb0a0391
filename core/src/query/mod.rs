//! Fluent query recorder
//!
//! [`Query`] records builder calls in order without compiling anything. The
//! recorded intent is compiled later against any dialect, either through the
//! compiler supplied with [`Query::using`] or directly with
//! [`Query::compile_with`].
//!
//! ```
//! use tabula_core::prelude::*;
//!
//! let query = Query::new()
//!     .select([col("Id"), col("Name")])
//!     .from("Users")
//!     .r#where(gt(col("Age"), 21))
//!     .order_by(col("Name"));
//!
//! assert_eq!(query.len(), 4);
//! assert!(query.build().is_err());
//! ```

mod call;

pub use call::{Order, OrderTerm, QueryCall, Source, TableRef, table};

use crate::command::Command;
use crate::compiler::Compiler;
use crate::error::{Result, TabulaError};
use crate::expressions::{Condition, Expr};
use crate::join::JoinKind;
use crate::schema::Entity;
use compact_str::CompactString;
use std::collections::VecDeque;

/// An ordered record of query-building calls.
#[derive(Debug, Clone, Default)]
pub struct Query {
    calls: VecDeque<QueryCall>,
    compiler: Option<Compiler>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(mut self, call: QueryCall) -> Self {
        self.calls.push_back(call);
        self
    }

    /// Recorded calls in construction order.
    pub fn calls(&self) -> impl ExactSizeIterator<Item = &QueryCall> {
        self.calls.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    // ==================== statements ====================

    /// `SELECT cols`; an empty list selects `*`.
    pub fn select<E: Into<Expr>>(self, columns: impl IntoIterator<Item = E>) -> Self {
        self.record(QueryCall::Select {
            columns: columns.into_iter().map(Into::into).collect(),
            distinct: false,
        })
    }

    pub fn select_distinct<E: Into<Expr>>(self, columns: impl IntoIterator<Item = E>) -> Self {
        self.record(QueryCall::Select {
            columns: columns.into_iter().map(Into::into).collect(),
            distinct: true,
        })
    }

    /// Every persisted column of `T`, reading from `T`'s table unless a FROM
    /// is recorded.
    pub fn select_all<T: Entity>(self) -> Self {
        self.record(QueryCall::SelectAll {
            table: TableRef::entity::<T>(),
            distinct: false,
        })
    }

    pub fn insert(self, table: impl Into<TableRef>) -> Self {
        self.record(QueryCall::Insert(table.into()))
    }

    pub fn update(self, table: impl Into<TableRef>) -> Self {
        self.record(QueryCall::Update(table.into()))
    }

    pub fn delete(self, table: impl Into<TableRef>) -> Self {
        self.record(QueryCall::Delete(table.into()))
    }

    pub fn truncate(self, table: impl Into<TableRef>) -> Self {
        self.record(QueryCall::Truncate(table.into()))
    }

    // ==================== clauses ====================

    pub fn from(self, table: impl Into<TableRef>) -> Self {
        self.record(QueryCall::From(table.into()))
    }

    pub fn join(self, kind: JoinKind, table: impl Into<TableRef>, on: Condition) -> Self {
        self.record(QueryCall::Join {
            kind,
            table: table.into(),
            on: Some(on),
        })
    }

    pub fn inner_join(self, table: impl Into<TableRef>, on: Condition) -> Self {
        self.join(JoinKind::Inner, table, on)
    }

    pub fn left_join(self, table: impl Into<TableRef>, on: Condition) -> Self {
        self.join(JoinKind::Left, table, on)
    }

    pub fn right_join(self, table: impl Into<TableRef>, on: Condition) -> Self {
        self.join(JoinKind::Right, table, on)
    }

    pub fn full_join(self, table: impl Into<TableRef>, on: Condition) -> Self {
        self.join(JoinKind::Full, table, on)
    }

    pub fn cross_join(self, table: impl Into<TableRef>) -> Self {
        self.record(QueryCall::Join {
            kind: JoinKind::Cross,
            table: table.into(),
            on: None,
        })
    }

    pub fn r#where(self, condition: Condition) -> Self {
        self.record(QueryCall::Where(condition))
    }

    /// Append `condition` to the predicate with AND.
    pub fn and(self, condition: Condition) -> Self {
        self.record(QueryCall::And(condition))
    }

    /// Append `condition` to the predicate with OR.
    pub fn or(self, condition: Condition) -> Self {
        self.record(QueryCall::Or(condition))
    }

    pub fn group_by<E: Into<Expr>>(self, exprs: impl IntoIterator<Item = E>) -> Self {
        self.record(QueryCall::GroupBy(exprs.into_iter().map(Into::into).collect()))
    }

    pub fn having(self, condition: Condition) -> Self {
        self.record(QueryCall::Having(condition))
    }

    pub fn order_by(self, expr: impl Into<Expr>) -> Self {
        self.order_by_terms([OrderTerm {
            expr: expr.into(),
            order: Order::Asc,
        }])
    }

    pub fn order_by_desc(self, expr: impl Into<Expr>) -> Self {
        self.order_by_terms([OrderTerm {
            expr: expr.into(),
            order: Order::Desc,
        }])
    }

    pub fn order_by_terms(self, terms: impl IntoIterator<Item = OrderTerm>) -> Self {
        self.record(QueryCall::OrderBy(terms.into_iter().collect()))
    }

    /// Start the next SELECT of a `UNION`.
    pub fn union(self) -> Self {
        self.record(QueryCall::Union { all: false })
    }

    pub fn union_all(self) -> Self {
        self.record(QueryCall::Union { all: true })
    }

    /// `SET column = value` of an UPDATE; repeated calls accumulate.
    pub fn set(self, column: impl Into<CompactString>, value: impl Into<Expr>) -> Self {
        self.record(QueryCall::Set(vec![(column.into(), value.into())]))
    }

    /// One row of an INSERT; every row must name the same columns.
    pub fn values<C, E>(self, row: impl IntoIterator<Item = (C, E)>) -> Self
    where
        C: Into<CompactString>,
        E: Into<Expr>,
    {
        self.record(QueryCall::Values(
            row.into_iter().map(|(c, e)| (c.into(), e.into())).collect(),
        ))
    }

    /// Cap the number of rows returned by the current SELECT.
    pub fn limit(self, count: u64) -> Self {
        self.record(QueryCall::Limit(count))
    }

    /// Skip `offset` rows and return at most `count`.
    pub fn page(self, offset: u64, count: u64) -> Self {
        self.record(QueryCall::Page { offset, count })
    }

    // ==================== compilation ====================

    /// Attach the compiler used by [`Query::build`].
    pub fn using(mut self, compiler: Compiler) -> Self {
        self.compiler = Some(compiler);
        self
    }

    /// Compile with the compiler supplied through [`Query::using`].
    pub fn build(&self) -> Result<Command> {
        let compiler = self.compiler.as_ref().ok_or_else(|| {
            TabulaError::InvalidOperation("no compiler supplied for this query".into())
        })?;
        compiler.compile(self)
    }

    pub fn compile_with(&self, compiler: &Compiler) -> Result<Command> {
        compiler.compile(self)
    }
}
