use crate::dialect::DialectRules;
use crate::error::{Result, TabulaError};
use crate::expressions::{Condition, Expr};
use crate::param::Parameter;
use crate::query::TableRef;
use crate::schema::Column;
use crate::values::Value;
use compact_str::CompactString;

/// Text-emission state shared by one compiled command: parameter numbering
/// and the table names the quoting post-pass must see.
pub(crate) struct Emitter<'r> {
    rules: &'r dyn DialectRules,
    pub(crate) params: Vec<Parameter>,
    pub(crate) entities: Vec<CompactString>,
}

impl<'r> Emitter<'r> {
    pub(crate) fn new(rules: &'r dyn DialectRules) -> Self {
        Self {
            rules,
            params: Vec::new(),
            entities: Vec::new(),
        }
    }

    fn next_name(&self) -> String {
        self.rules.parameter_name(self.params.len())
    }

    pub(crate) fn bind(&mut self, value: Value) -> String {
        let name = self.next_name();
        self.params.push(Parameter::input(name.as_str(), value));
        name
    }

    pub(crate) fn bind_column(&mut self, value: Value, column: &Column) -> String {
        let name = self.next_name();
        self.params
            .push(Parameter::for_column(name.as_str(), value, column));
        name
    }

    pub(crate) fn output(&mut self, column: &Column) -> String {
        let name = self.next_name();
        self.params.push(Parameter::output(name.as_str(), column));
        name
    }

    /// Remember a table name for the quoting post-pass.
    pub(crate) fn entity(&mut self, table: &str) {
        if !self.entities.iter().any(|e| e.as_str() == table) {
            self.entities.push(CompactString::from(table));
        }
    }

    /// `table` or `table alias`.
    pub(crate) fn table(&mut self, table: &TableRef) -> Result<String> {
        let name = table.table_name()?;
        self.entity(&name);
        Ok(match table.alias_name() {
            Some(alias) => format!("{name} {alias}"),
            None => name.into_string(),
        })
    }

    pub(crate) fn expr(&mut self, out: &mut String, expr: &Expr) {
        match expr {
            Expr::Column(name) => out.push_str(name),
            Expr::Value(value) => {
                let name = self.bind(value.clone());
                out.push_str(&name);
            }
            Expr::Raw(text) => out.push_str(text),
            Expr::Func { name, args } => {
                out.push_str(name);
                out.push('(');
                self.list(out, args);
                out.push(')');
            }
            Expr::Alias(inner, alias) => {
                self.expr(out, inner);
                out.push_str(" AS ");
                out.push_str(alias);
            }
            Expr::Star => out.push('*'),
        }
    }

    /// Comma-separated expressions.
    pub(crate) fn list<'e>(&mut self, out: &mut String, exprs: impl IntoIterator<Item = &'e Expr>) {
        for (i, expr) in exprs.into_iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.expr(out, expr);
        }
    }

    pub(crate) fn condition(&mut self, out: &mut String, condition: &Condition) -> Result<()> {
        match condition {
            Condition::Compare { left, op, right } => {
                self.expr(out, left);
                out.push(' ');
                out.push_str(op.as_str());
                out.push(' ');
                self.expr(out, right);
            }
            Condition::IsNull { expr, negated } => {
                self.expr(out, expr);
                out.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Condition::In {
                expr,
                list,
                negated,
            } => {
                if list.is_empty() {
                    return Err(TabulaError::Compilation("IN list is empty".into()));
                }
                self.expr(out, expr);
                out.push_str(if *negated { " NOT IN (" } else { " IN (" });
                self.list(out, list);
                out.push(')');
            }
            Condition::Like {
                expr,
                pattern,
                negated,
            } => {
                self.expr(out, expr);
                out.push_str(if *negated { " NOT LIKE " } else { " LIKE " });
                self.expr(out, pattern);
            }
            Condition::Between { expr, low, high } => {
                self.expr(out, expr);
                out.push_str(" BETWEEN ");
                self.expr(out, low);
                out.push_str(" AND ");
                self.expr(out, high);
            }
            Condition::And(parts) => self.group(out, parts, " AND ")?,
            Condition::Or(parts) => self.group(out, parts, " OR ")?,
            Condition::Not(inner) => {
                out.push_str("NOT (");
                self.condition(out, inner)?;
                out.push(')');
            }
            Condition::Raw(text) => out.push_str(text),
        }
        Ok(())
    }

    fn group(&mut self, out: &mut String, parts: &[Condition], connector: &str) -> Result<()> {
        match parts {
            [] => Err(TabulaError::Compilation(format!(
                "empty{}group",
                connector
            ))),
            [single] => self.condition(out, single),
            _ => {
                out.push('(');
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        out.push_str(connector);
                    }
                    self.condition(out, part)?;
                }
                out.push(')');
                Ok(())
            }
        }
    }
}

/// How a recorded predicate fragment joins the previous ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Connector {
    And,
    Or,
}

/// A rendered predicate, without the surrounding `WHERE (…)`.
pub(crate) struct Predicate {
    pub(crate) text: String,
    /// An OR sits outside every parenthesis (from a connector or inside raw
    /// text), so appending a further AND term needs the text wrapped first.
    pub(crate) has_top_level_or: bool,
}

/// Whether `text` has an `OR` outside parentheses and string literals.
fn or_at_top_level(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut quoted = false;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'\'' => quoted = !quoted,
            b'(' if !quoted => depth += 1,
            b')' if !quoted => depth -= 1,
            b'O' | b'o' if !quoted && depth == 0 && i > 0 => {
                let word = bytes[i - 1].is_ascii_whitespace()
                    && bytes.get(i + 1).is_some_and(|c| c.eq_ignore_ascii_case(&b'r'))
                    && bytes.get(i + 2).is_some_and(u8::is_ascii_whitespace);
                if word {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

impl Predicate {
    pub(crate) fn render(
        emitter: &mut Emitter<'_>,
        fragments: &[(Connector, &Condition)],
    ) -> Result<Option<Predicate>> {
        if fragments.is_empty() {
            return Ok(None);
        }
        let mut text = String::new();
        for (i, (connector, condition)) in fragments.iter().enumerate() {
            if i > 0 {
                match connector {
                    Connector::And => text.push_str(" AND "),
                    Connector::Or => text.push_str(" OR "),
                }
            }
            emitter.condition(&mut text, condition)?;
        }
        let has_top_level_or = or_at_top_level(&text);
        Ok(Some(Predicate {
            text,
            has_top_level_or,
        }))
    }

    /// `self AND term`, keeping OR precedence intact.
    pub(crate) fn and(self, term: &str) -> Predicate {
        let text = if self.has_top_level_or {
            format!("({}) AND {term}", self.text)
        } else {
            format!("{} AND {term}", self.text)
        };
        Predicate {
            text,
            has_top_level_or: false,
        }
    }

    /// `term AND self`, keeping OR precedence intact.
    pub(crate) fn after(self, term: &str) -> Predicate {
        let text = if self.has_top_level_or {
            format!("{term} AND ({})", self.text)
        } else {
            format!("{term} AND {}", self.text)
        };
        Predicate {
            text,
            has_top_level_or: false,
        }
    }

    /// ` WHERE (…)`
    pub(crate) fn clause(&self) -> String {
        format!(" WHERE ({})", self.text)
    }
}
