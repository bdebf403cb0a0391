//! Tracing utilities for compiler, store and session observability.
//!
//! Enable the `tracing` feature to emit spans and events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event with the compiled text and parameter count.
///
/// ```ignore
/// tabula_trace_compile!(self.dialect(), &command.text, command.parameters.len());
/// ```
#[macro_export]
macro_rules! tabula_trace_compile {
    ($dialect:expr, $text:expr, $param_count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(dialect = %$dialect, sql = %$text, params = $param_count, "tabula.compile");
    };
}

/// Emit a trace-level event for store bookkeeping (merge, change-set, reject).
///
/// ```ignore
/// tabula_trace_store!("merge", columns = added, rows = other.len());
/// ```
#[macro_export]
macro_rules! tabula_trace_store {
    ($event:literal $(, $key:ident = $value:expr)* $(,)?) => {
        #[cfg(feature = "tracing")]
        tracing::trace!(event = $event $(, $key = $value)*, "tabula.store");
    };
}

/// Emit an info-level event for persistence work done by a session.
///
/// ```ignore
/// tabula_trace_session!("process_insert", rows = 3);
/// ```
#[macro_export]
macro_rules! tabula_trace_session {
    ($event:literal $(, $key:ident = $value:expr)* $(,)?) => {
        #[cfg(feature = "tracing")]
        tracing::info!(event = $event $(, $key = $value)*, "tabula.session");
    };
}
