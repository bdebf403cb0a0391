//! Shared dialect compiler
//!
//! One algorithm serves every backend: a recorded [`Query`] or a store row is
//! walked once, clause text is emitted with dialect-correct parameter names,
//! and the [`DialectRules`] of the target backend are consulted wherever
//! syntax diverges (row limiting, generated keys, batch support, UPDATE with
//! joins, identifier quoting).
//!
//! [`Query`]: crate::query::Query

mod dml;
mod emit;
mod statement;

use crate::command::Command;
use crate::dialect::{Dialect, DialectRules};
use core::fmt;
use std::sync::Arc;

pub(crate) use emit::Emitter;

/// Compiles recorded queries and row changes for one dialect.
///
/// Cloning is cheap; the rules are shared.
#[derive(Clone)]
pub struct Compiler {
    rules: Arc<dyn DialectRules>,
}

impl Compiler {
    pub fn new(rules: impl DialectRules + 'static) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    pub fn from_rules(rules: Arc<dyn DialectRules>) -> Self {
        Self { rules }
    }

    #[inline]
    pub fn rules(&self) -> &dyn DialectRules {
        &*self.rules
    }

    #[inline]
    pub fn dialect(&self) -> Dialect {
        self.rules.dialect()
    }

    /// Apply the quoting post-pass and package text and parameters.
    fn finish(&self, text: String, emitter: Emitter<'_>) -> Command {
        let entities: Vec<&str> = emitter.entities.iter().map(|e| e.as_str()).collect();
        let text = self.rules.quote_entities(text, &entities);
        tabula_trace_compile!(self.dialect(), &text, emitter.params.len());
        Command::new(text).with_parameters(emitter.params)
    }
}

impl fmt::Debug for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler").field("rules", &self.rules).finish()
    }
}
