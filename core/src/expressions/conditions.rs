use super::Expr;

/// Binary comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
}

impl CompareOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "<>",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
        }
    }
}

/// A boolean predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        left: Expr,
        op: CompareOp,
        right: Expr,
    },
    IsNull {
        expr: Expr,
        negated: bool,
    },
    In {
        expr: Expr,
        list: Vec<Expr>,
        negated: bool,
    },
    Like {
        expr: Expr,
        pattern: Expr,
        negated: bool,
    },
    Between {
        expr: Expr,
        low: Expr,
        high: Expr,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
    Raw(String),
}

impl Condition {
    pub fn and(self, other: Condition) -> Condition {
        and([self, other])
    }

    pub fn or(self, other: Condition) -> Condition {
        or([self, other])
    }
}

fn compare(left: impl Into<Expr>, op: CompareOp, right: impl Into<Expr>) -> Condition {
    Condition::Compare {
        left: left.into(),
        op,
        right: right.into(),
    }
}

/// Create an equality condition (=)
///
/// ```
/// # use tabula_core::expressions::{col, eq, Condition, CompareOp};
/// let condition = eq(col("Name"), "Item A");
/// assert!(matches!(condition, Condition::Compare { op: CompareOp::Eq, .. }));
/// ```
pub fn eq(left: impl Into<Expr>, right: impl Into<Expr>) -> Condition {
    compare(left, CompareOp::Eq, right)
}

/// Create a not-equal condition (<>)
pub fn neq(left: impl Into<Expr>, right: impl Into<Expr>) -> Condition {
    compare(left, CompareOp::NotEq, right)
}

/// Create a greater-than condition (>)
pub fn gt(left: impl Into<Expr>, right: impl Into<Expr>) -> Condition {
    compare(left, CompareOp::Gt, right)
}

/// Create a greater-than-or-equal condition (>=)
pub fn gte(left: impl Into<Expr>, right: impl Into<Expr>) -> Condition {
    compare(left, CompareOp::GtEq, right)
}

/// Create a less-than condition (<)
pub fn lt(left: impl Into<Expr>, right: impl Into<Expr>) -> Condition {
    compare(left, CompareOp::Lt, right)
}

/// Create a less-than-or-equal condition (<=)
pub fn lte(left: impl Into<Expr>, right: impl Into<Expr>) -> Condition {
    compare(left, CompareOp::LtEq, right)
}

pub fn is_null(expr: impl Into<Expr>) -> Condition {
    Condition::IsNull {
        expr: expr.into(),
        negated: false,
    }
}

pub fn is_not_null(expr: impl Into<Expr>) -> Condition {
    Condition::IsNull {
        expr: expr.into(),
        negated: true,
    }
}

/// `expr IN (...)`; an empty list fails to compile.
pub fn in_list<E: Into<Expr>>(expr: impl Into<Expr>, list: impl IntoIterator<Item = E>) -> Condition {
    Condition::In {
        expr: expr.into(),
        list: list.into_iter().map(Into::into).collect(),
        negated: false,
    }
}

pub fn not_in_list<E: Into<Expr>>(
    expr: impl Into<Expr>,
    list: impl IntoIterator<Item = E>,
) -> Condition {
    Condition::In {
        expr: expr.into(),
        list: list.into_iter().map(Into::into).collect(),
        negated: true,
    }
}

pub fn like(expr: impl Into<Expr>, pattern: impl Into<Expr>) -> Condition {
    Condition::Like {
        expr: expr.into(),
        pattern: pattern.into(),
        negated: false,
    }
}

pub fn not_like(expr: impl Into<Expr>, pattern: impl Into<Expr>) -> Condition {
    Condition::Like {
        expr: expr.into(),
        pattern: pattern.into(),
        negated: true,
    }
}

pub fn between(expr: impl Into<Expr>, low: impl Into<Expr>, high: impl Into<Expr>) -> Condition {
    Condition::Between {
        expr: expr.into(),
        low: low.into(),
        high: high.into(),
    }
}

/// Conjunction; nested conjunctions are flattened.
pub fn and(conditions: impl IntoIterator<Item = Condition>) -> Condition {
    let mut flat = Vec::new();
    for condition in conditions {
        match condition {
            Condition::And(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }
    Condition::And(flat)
}

/// Disjunction; nested disjunctions are flattened.
pub fn or(conditions: impl IntoIterator<Item = Condition>) -> Condition {
    let mut flat = Vec::new();
    for condition in conditions {
        match condition {
            Condition::Or(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }
    Condition::Or(flat)
}

pub fn not(condition: Condition) -> Condition {
    Condition::Not(Box::new(condition))
}

/// Predicate text passed through unchanged.
pub fn raw_condition(text: impl Into<String>) -> Condition {
    Condition::Raw(text.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expressions::col;

    #[test]
    fn nested_conjunctions_flatten() {
        let c = and([eq(col("A"), 1), and([eq(col("B"), 2), eq(col("C"), 3)])]);
        match c {
            Condition::And(parts) => assert_eq!(parts.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn or_keeps_conjunctions_grouped() {
        let c = eq(col("A"), 1).or(eq(col("B"), 2).and(eq(col("C"), 3)));
        match c {
            Condition::Or(parts) => assert!(matches!(parts[1], Condition::And(_))),
            other => panic!("unexpected {other:?}"),
        }
    }
}
