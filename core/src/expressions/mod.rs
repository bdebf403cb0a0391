//! Expressions and conditions
//!
//! Dialect-neutral building blocks recorded by [`Query`](crate::query::Query).
//! Column references are written with [`col`]; every other Rust value becomes
//! a bound parameter when compiled.

pub mod conditions;

pub use conditions::*;

use crate::values::Value;
use compact_str::CompactString;

/// A scalar expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference, optionally qualified (`T.C`)
    Column(CompactString),
    /// Bound parameter value
    Value(Value),
    /// Text emitted verbatim
    Raw(String),
    Func {
        name: &'static str,
        args: Vec<Expr>,
    },
    Alias(Box<Expr>, CompactString),
    /// `*`
    Star,
}

impl Expr {
    /// `expr AS alias`
    pub fn alias(self, alias: impl Into<CompactString>) -> Expr {
        Expr::Alias(Box::new(self), alias.into())
    }
}

/// Reference a column by name, qualified or not.
pub fn col(name: impl Into<CompactString>) -> Expr {
    Expr::Column(name.into())
}

/// Bind a value as a parameter.
pub fn val(value: impl Into<Value>) -> Expr {
    Expr::Value(value.into())
}

/// Text passed through to the compiled statement unchanged.
pub fn raw(text: impl Into<String>) -> Expr {
    Expr::Raw(text.into())
}

pub fn star() -> Expr {
    Expr::Star
}

pub fn func(name: &'static str, args: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Func {
        name,
        args: args.into_iter().collect(),
    }
}

// =============================================================================
// Aggregate Functions
// =============================================================================

pub fn count(expr: impl Into<Expr>) -> Expr {
    func("COUNT", [expr.into()])
}

pub fn sum(expr: impl Into<Expr>) -> Expr {
    func("SUM", [expr.into()])
}

pub fn avg(expr: impl Into<Expr>) -> Expr {
    func("AVG", [expr.into()])
}

pub fn min(expr: impl Into<Expr>) -> Expr {
    func("MIN", [expr.into()])
}

pub fn max(expr: impl Into<Expr>) -> Expr {
    func("MAX", [expr.into()])
}

pub fn coalesce(expr: impl Into<Expr>, default: impl Into<Expr>) -> Expr {
    func("COALESCE", [expr.into(), default.into()])
}

pub fn lower(expr: impl Into<Expr>) -> Expr {
    func("LOWER", [expr.into()])
}

pub fn upper(expr: impl Into<Expr>) -> Expr {
    func("UPPER", [expr.into()])
}

// =============================================================================
// Conversions
// =============================================================================

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Value(value)
    }
}

macro_rules! bound_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Expr {
                fn from(value: $ty) -> Self {
                    Expr::Value(value.into())
                }
            }
        )*
    };
}

bound_value!(bool, i16, i32, i64, u8, u16, u32, f32, f64, &str, String, Vec<u8>);

#[cfg(feature = "uuid")]
bound_value!(uuid::Uuid);

#[cfg(feature = "chrono")]
bound_value!(chrono::NaiveDateTime);
