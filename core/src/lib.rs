//! Core of the tabula data-access layer: the change-tracked tabular store, the
//! projection and collection layers above it, the query recorder and the
//! shared dialect compiler.

#[macro_use]
mod trace;

pub mod collection;
pub mod command;
pub mod compiler;
pub mod context;
pub mod dialect;
pub mod error;
pub mod expressions;
pub mod join;
pub mod param;
pub mod query;
pub mod record;
pub mod schema;
pub mod session;
pub mod store;
pub mod values;

// Re-export key types and traits
pub use collection::{Collection, Detached};
pub use command::{Command, CommandKind, TransactionKind};
pub use compiler::Compiler;
pub use context::{ContextGuard, DataContext, lookup_context, register_context};
pub use dialect::{DialectRules, Identity, RowLimit, UpdateJoin};
pub use error::{ErrorKind, Result, TabulaError};
pub use param::{Direction, Parameter};
pub use query::{Query, QueryCall, TableRef, table};
pub use record::{Record, RecordMut};
pub use schema::{Column, ColumnFlags, Entity, Relation, Schema, schema_of, table_name_of};
pub use session::{Executor, Session, SessionOptions};
pub use store::{ChangeDetection, DataReader, Field, ResultSet, Row, RowId, RowState, Store, StoreEvent};
pub use tabula_types::{DbType, Dialect};
pub use values::{FromValue, Value};

/// Everything needed to declare entities, record queries and persist
/// changes.
pub mod prelude {
    pub use crate::collection::{Collection, Detached};
    pub use crate::command::Command;
    pub use crate::compiler::Compiler;
    pub use crate::context::{DataContext, register_context};
    pub use crate::error::{Result, TabulaError};
    pub use crate::expressions::*;
    pub use crate::join::JoinKind;
    pub use crate::query::{Order, OrderTerm, Query, TableRef, table};
    pub use crate::record::{Record, RecordMut};
    pub use crate::schema::{Column, Entity, Relation, table_name_of};
    pub use crate::session::{Executor, Session, SessionOptions};
    pub use crate::store::{ChangeDetection, ResultSet, Store};
    pub use crate::values::{FromValue, Value};
    pub use tabula_types::{DbType, Dialect};
}
