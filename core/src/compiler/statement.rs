//! Compilation of recorded queries.

use super::Compiler;
use super::emit::{Connector, Emitter, Predicate};
use crate::command::Command;
use crate::dialect::{RowLimit, UpdateJoin};
use crate::error::{Result, TabulaError};
use crate::expressions::{Condition, Expr};
use crate::join::JoinKind;
use crate::query::{OrderTerm, Query, QueryCall, TableRef};
use compact_str::CompactString;

enum Projection<'q> {
    Columns(&'q [Expr]),
    Entity(&'q TableRef),
}

enum Kind<'q> {
    Select {
        projection: Projection<'q>,
        distinct: bool,
    },
    Insert(&'q TableRef),
    Update(&'q TableRef),
    Delete(&'q TableRef),
    Truncate(&'q TableRef),
}

impl Kind<'_> {
    const fn keyword(&self) -> &'static str {
        match self {
            Kind::Select { .. } => "SELECT",
            Kind::Insert(_) => "INSERT",
            Kind::Update(_) => "UPDATE",
            Kind::Delete(_) => "DELETE",
            Kind::Truncate(_) => "TRUNCATE",
        }
    }
}

struct Join<'q> {
    kind: JoinKind,
    table: &'q TableRef,
    on: Option<&'q Condition>,
}

/// Clauses of one statement (one SELECT of a union), in recorded order.
#[derive(Default)]
struct Part<'q> {
    kind: Option<Kind<'q>>,
    from: Vec<&'q TableRef>,
    joins: Vec<Join<'q>>,
    predicate: Vec<(Connector, &'q Condition)>,
    group_by: Vec<&'q Expr>,
    having: Vec<&'q Condition>,
    order_by: Vec<&'q OrderTerm>,
    set: Vec<&'q (CompactString, Expr)>,
    values: Vec<&'q [(CompactString, Expr)]>,
    limit: Option<u64>,
    page: Option<(u64, u64)>,
}

impl<'q> Part<'q> {
    fn start(&mut self, kind: Kind<'q>) -> Result<()> {
        if self.kind.is_some() {
            return Err(TabulaError::Compilation(
                "query records more than one statement".into(),
            ));
        }
        self.kind = Some(kind);
        Ok(())
    }

    /// Reject clauses the statement kind cannot carry.
    fn validate(&self) -> Result<&Kind<'q>> {
        let kind = self
            .kind
            .as_ref()
            .ok_or_else(|| TabulaError::Compilation("query records no statement".into()))?;
        let keyword = kind.keyword();
        let present = |clause: &str, found: bool, allowed: bool| {
            if found && !allowed {
                Err(TabulaError::Compilation(format!(
                    "{clause} is not valid in a {keyword} statement"
                )))
            } else {
                Ok(())
            }
        };
        let (select, insert, update, delete) = (
            matches!(kind, Kind::Select { .. }),
            matches!(kind, Kind::Insert(_)),
            matches!(kind, Kind::Update(_)),
            matches!(kind, Kind::Delete(_)),
        );
        present("FROM", !self.from.is_empty(), select || update)?;
        present("JOIN", !self.joins.is_empty(), select || update)?;
        present("WHERE", !self.predicate.is_empty(), select || update || delete)?;
        present("GROUP BY", !self.group_by.is_empty(), select)?;
        present("HAVING", !self.having.is_empty(), select)?;
        present("ORDER BY", !self.order_by.is_empty(), select)?;
        present("LIMIT", self.limit.is_some(), select)?;
        present("paging", self.page.is_some(), select)?;
        present("SET", !self.set.is_empty(), update)?;
        present("VALUES", !self.values.is_empty(), insert)?;
        Ok(kind)
    }
}

impl Compiler {
    /// Compile a recorded query into a command for this dialect.
    pub fn compile(&self, query: &Query) -> Result<Command> {
        let mut parts = Vec::new();
        let mut unions = Vec::new();
        let mut part = Part::default();

        for call in query.calls() {
            match call {
                QueryCall::Select { columns, distinct } => part.start(Kind::Select {
                    projection: Projection::Columns(columns),
                    distinct: *distinct,
                })?,
                QueryCall::SelectAll { table, distinct } => part.start(Kind::Select {
                    projection: Projection::Entity(table),
                    distinct: *distinct,
                })?,
                QueryCall::Insert(table) => part.start(Kind::Insert(table))?,
                QueryCall::Update(table) => part.start(Kind::Update(table))?,
                QueryCall::Delete(table) => part.start(Kind::Delete(table))?,
                QueryCall::Truncate(table) => part.start(Kind::Truncate(table))?,
                QueryCall::From(table) => part.from.push(table),
                QueryCall::Join { kind, table, on } => part.joins.push(Join {
                    kind: *kind,
                    table,
                    on: on.as_ref(),
                }),
                QueryCall::Where(condition) | QueryCall::And(condition) => {
                    part.predicate.push((Connector::And, condition))
                }
                QueryCall::Or(condition) => part.predicate.push((Connector::Or, condition)),
                QueryCall::GroupBy(exprs) => part.group_by.extend(exprs),
                QueryCall::Having(condition) => part.having.push(condition),
                QueryCall::OrderBy(terms) => part.order_by.extend(terms),
                QueryCall::Union { all } => {
                    if !matches!(part.kind, Some(Kind::Select { .. })) {
                        return Err(TabulaError::Compilation(
                            "UNION must follow a SELECT".into(),
                        ));
                    }
                    unions.push(*all);
                    parts.push(core::mem::take(&mut part));
                }
                QueryCall::Set(pairs) => part.set.extend(pairs),
                QueryCall::Values(row) => part.values.push(row),
                QueryCall::Limit(count) => part.limit = Some(*count),
                QueryCall::Page { offset, count } => part.page = Some((*offset, *count)),
            }
        }
        parts.push(part);

        let mut emitter = Emitter::new(self.rules());
        let mut text = String::new();
        for (i, part) in parts.iter().enumerate() {
            let kind = part.validate()?;
            if i > 0 {
                if !matches!(kind, Kind::Select { .. }) {
                    return Err(TabulaError::Compilation(
                        "every part of a UNION must be a SELECT".into(),
                    ));
                }
                text.push_str(if unions[i - 1] { " UNION ALL " } else { " UNION " });
            }
            let statement = match kind {
                Kind::Select {
                    projection,
                    distinct,
                } => self.select(&mut emitter, part, projection, *distinct)?,
                Kind::Insert(table) => self.insert_values(&mut emitter, part, table)?,
                Kind::Update(table) => self.update_set(&mut emitter, part, table)?,
                Kind::Delete(table) => {
                    let mut sql = format!("DELETE FROM {}", emitter.table(table)?);
                    if let Some(predicate) = Predicate::render(&mut emitter, &part.predicate)? {
                        sql.push_str(&predicate.clause());
                    }
                    sql
                }
                Kind::Truncate(table) => {
                    let name = table.table_name()?;
                    emitter.entity(&name);
                    self.rules().truncate(&name)
                }
            };
            text.push_str(&statement);
        }

        Ok(self.finish(text, emitter))
    }

    fn select(
        &self,
        emitter: &mut Emitter<'_>,
        part: &Part<'_>,
        projection: &Projection<'_>,
        distinct: bool,
    ) -> Result<String> {
        let row_limit = self.rules().row_limit();
        if part.page.is_some() {
            if let RowLimit::RowNumber(_) = row_limit {
                return Err(TabulaError::Unsupported {
                    dialect: self.dialect(),
                    operation: "paging",
                });
            }
            if part.limit.is_some() {
                return Err(TabulaError::Compilation(
                    "LIMIT and paging cannot be combined".into(),
                ));
            }
        }

        let mut sql = String::from("SELECT ");
        if distinct {
            sql.push_str("DISTINCT ");
        }
        if let (RowLimit::Top, Some(count)) = (row_limit, part.limit) {
            sql.push_str(&format!("TOP ({count}) "));
        }

        let mut from = part.from.clone();
        match projection {
            Projection::Columns([]) => sql.push('*'),
            Projection::Columns(columns) => emitter.list(&mut sql, columns.iter()),
            Projection::Entity(table) => {
                let schema = table.schema()?.ok_or_else(|| {
                    TabulaError::Compilation("SELECT of an entity needs an entity table".into())
                })?;
                let names: Vec<&str> = schema
                    .columns()
                    .iter()
                    .filter(|c| c.is_persisted())
                    .map(|c| c.name())
                    .collect();
                sql.push_str(&names.join(", "));
                if from.is_empty() {
                    from.push(table);
                }
            }
        }

        if !from.is_empty() {
            sql.push_str(" FROM ");
            self.table_list(emitter, &mut sql, &from)?;
        }
        self.joins(emitter, &mut sql, &part.joins)?;

        let predicate = Predicate::render(emitter, &part.predicate)?;
        match (row_limit, part.limit, predicate) {
            (RowLimit::RowNumber(pseudo), Some(count), Some(predicate)) => {
                sql.push_str(&predicate.and(&format!("{pseudo} <= {count}")).clause());
            }
            (RowLimit::RowNumber(pseudo), Some(count), None) => {
                sql.push_str(&format!(" WHERE {pseudo} <= {count}"));
            }
            (_, _, Some(predicate)) => sql.push_str(&predicate.clause()),
            (_, _, None) => {}
        }

        if !part.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            emitter.list(&mut sql, part.group_by.iter().copied());
        }
        if !part.having.is_empty() {
            sql.push_str(" HAVING ");
            let having: Vec<(Connector, &Condition)> =
                part.having.iter().map(|c| (Connector::And, *c)).collect();
            if let Some(predicate) = Predicate::render(emitter, &having)? {
                sql.push_str(&predicate.text);
            }
        }
        if !part.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            for (i, term) in part.order_by.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                emitter.expr(&mut sql, &term.expr);
                sql.push(' ');
                sql.push_str(term.order.keyword());
            }
        }

        match (row_limit, part.limit, part.page) {
            (RowLimit::Limit, Some(count), _) => sql.push_str(&format!(" LIMIT {count}")),
            (RowLimit::Limit, None, Some((offset, count))) => {
                sql.push_str(&format!(" LIMIT {count} OFFSET {offset}"))
            }
            (RowLimit::Top, None, Some((offset, count))) => {
                if part.order_by.is_empty() {
                    sql.push_str(" ORDER BY (SELECT NULL)");
                }
                sql.push_str(&format!(" OFFSET {offset} ROWS FETCH NEXT {count} ROWS ONLY"));
            }
            _ => {}
        }
        Ok(sql)
    }

    fn table_list(
        &self,
        emitter: &mut Emitter<'_>,
        sql: &mut String,
        tables: &[&TableRef],
    ) -> Result<()> {
        for (i, table) in tables.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&emitter.table(table)?);
        }
        Ok(())
    }

    fn joins(&self, emitter: &mut Emitter<'_>, sql: &mut String, joins: &[Join<'_>]) -> Result<()> {
        for join in joins {
            sql.push(' ');
            sql.push_str(join.kind.keyword());
            sql.push(' ');
            sql.push_str(&emitter.table(join.table)?);
            match (join.kind.takes_condition(), join.on) {
                (true, Some(on)) => {
                    sql.push_str(" ON ");
                    emitter.condition(sql, on)?;
                }
                (true, None) => {
                    return Err(TabulaError::Compilation(format!(
                        "{} needs an ON condition",
                        join.kind.keyword()
                    )));
                }
                (false, _) => {}
            }
        }
        Ok(())
    }

    fn insert_values(
        &self,
        emitter: &mut Emitter<'_>,
        part: &Part<'_>,
        table: &TableRef,
    ) -> Result<String> {
        let Some(first) = part.values.first() else {
            return Err(TabulaError::Compilation("INSERT records no VALUES".into()));
        };
        let names: Vec<&str> = first.iter().map(|(name, _)| name.as_str()).collect();
        if names.is_empty() {
            return Ok(self.rules().default_values_insert(&emitter.table(table)?));
        }

        let mut sql = format!("INSERT INTO {} ({}) VALUES ", emitter.table(table)?, names.join(", "));
        for (i, row) in part.values.iter().enumerate() {
            let same_columns = row.len() == names.len()
                && row.iter().zip(&names).all(|((name, _), expected)| name == expected);
            if !same_columns {
                return Err(TabulaError::Compilation(
                    "VALUES rows list different columns".into(),
                ));
            }
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push('(');
            emitter.list(&mut sql, row.iter().map(|(_, expr)| expr));
            sql.push(')');
        }
        Ok(sql)
    }

    fn update_set(
        &self,
        emitter: &mut Emitter<'_>,
        part: &Part<'_>,
        table: &TableRef,
    ) -> Result<String> {
        if part.set.is_empty() {
            return Err(TabulaError::Compilation("UPDATE records no SET".into()));
        }
        let target = emitter.table(table)?;
        let qualifier = table.qualifier()?;

        if part.from.is_empty() && part.joins.is_empty() {
            let mut sql = format!("UPDATE {target} SET ");
            self.assignments(emitter, &mut sql, part);
            if let Some(predicate) = Predicate::render(emitter, &part.predicate)? {
                sql.push_str(&predicate.clause());
            }
            return Ok(sql);
        }

        match self.rules().update_join() {
            UpdateJoin::FromList => {
                let mut sql = format!("UPDATE {target} SET ");
                self.assignments(emitter, &mut sql, part);
                sql.push_str(" FROM ");
                let mut rest = &part.joins[..];
                let mut leading = None;
                match (part.from.is_empty(), part.joins.split_first()) {
                    // The first joined table becomes the FROM list and its ON
                    // condition moves into the predicate.
                    (true, Some((first, others))) => {
                        if !matches!(first.kind, JoinKind::Inner | JoinKind::Cross) {
                            return Err(TabulaError::Compilation(format!(
                                "UPDATE … FROM cannot keep the {} of its first joined table",
                                first.kind.keyword()
                            )));
                        }
                        sql.push_str(&emitter.table(first.table)?);
                        leading = first.on;
                        rest = others;
                    }
                    _ => self.table_list(emitter, &mut sql, &part.from)?,
                }
                self.joins(emitter, &mut sql, rest)?;

                let mut on_text = String::new();
                if let Some(on) = leading {
                    emitter.condition(&mut on_text, on)?;
                }
                let predicate = Predicate::render(emitter, &part.predicate)?;
                match (on_text.is_empty(), predicate) {
                    (true, Some(predicate)) => sql.push_str(&predicate.clause()),
                    (false, Some(predicate)) => sql.push_str(&predicate.after(&on_text).clause()),
                    (false, None) => sql.push_str(&format!(" WHERE ({on_text})")),
                    (true, None) => {}
                }
                Ok(sql)
            }
            UpdateJoin::FromJoin => {
                let mut sql = format!("UPDATE {qualifier} SET ");
                self.assignments(emitter, &mut sql, part);
                sql.push_str(" FROM ");
                sql.push_str(&target);
                for table in &part.from {
                    sql.push_str(", ");
                    sql.push_str(&emitter.table(table)?);
                }
                self.joins(emitter, &mut sql, &part.joins)?;
                if let Some(predicate) = Predicate::render(emitter, &part.predicate)? {
                    sql.push_str(&predicate.clause());
                }
                Ok(sql)
            }
            UpdateJoin::JoinInUpdate => {
                let mut sql = format!("UPDATE {target}");
                for table in &part.from {
                    sql.push_str(", ");
                    sql.push_str(&emitter.table(table)?);
                }
                self.joins(emitter, &mut sql, &part.joins)?;
                sql.push_str(" SET ");
                self.assignments(emitter, &mut sql, part);
                if let Some(predicate) = Predicate::render(emitter, &part.predicate)? {
                    sql.push_str(&predicate.clause());
                }
                Ok(sql)
            }
            UpdateJoin::InlineView => {
                let view = InlineView::new(&qualifier, &part.set);
                let mut sql = String::from("UPDATE (SELECT ");
                sql.push_str(&view.select_list());
                sql.push_str(" FROM ");
                sql.push_str(&target);
                for table in &part.from {
                    sql.push_str(", ");
                    sql.push_str(&emitter.table(table)?);
                }
                self.joins(emitter, &mut sql, &part.joins)?;
                if let Some(predicate) = Predicate::render(emitter, &part.predicate)? {
                    sql.push_str(&predicate.clause());
                }
                sql.push_str(") SET ");
                for (i, (column, value)) in part.set.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(", ");
                    }
                    sql.push_str(view.exposed(column));
                    sql.push_str(" = ");
                    emitter.expr(&mut sql, &view.rewrite(value));
                }
                Ok(sql)
            }
        }
    }

    /// `A = p0, B = p1`
    fn assignments(&self, emitter: &mut Emitter<'_>, sql: &mut String, part: &Part<'_>) {
        for (i, (column, value)) in part.set.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(column);
            sql.push_str(" = ");
            emitter.expr(sql, value);
        }
    }
}

/// Columns an inline-view UPDATE selects: every SET target plus every column
/// the SET values read. The view exposes each under its bare name, or under
/// `qualifier_name` when two tables share that name.
struct InlineView {
    /// (qualified column, exposed name)
    columns: Vec<(String, String)>,
}

impl InlineView {
    fn new(qualifier: &str, set: &[&(CompactString, Expr)]) -> Self {
        let mut view = Self {
            columns: Vec::new(),
        };
        for (column, _) in set {
            view.add(qualifier, column);
        }
        let mut read = Vec::new();
        for (_, value) in set {
            referenced_columns(value, &mut read);
        }
        for column in read {
            view.add(qualifier, column);
        }
        view
    }

    fn add(&mut self, qualifier: &str, column: &str) {
        let qualified = if column.contains('.') {
            column.to_owned()
        } else {
            format!("{qualifier}.{column}")
        };
        if self.columns.iter().any(|(q, _)| *q == qualified) {
            return;
        }
        let bare = bare_name(column);
        let exposed = if self.columns.iter().any(|(_, e)| e == bare) {
            qualified.replace('.', "_")
        } else {
            bare.to_owned()
        };
        self.columns.push((qualified, exposed));
    }

    fn select_list(&self) -> String {
        self.columns
            .iter()
            .map(|(qualified, exposed)| {
                if bare_name(qualified) == exposed {
                    qualified.clone()
                } else {
                    format!("{qualified} AS {exposed}")
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Name the view exposes for a column as written in the query.
    fn exposed<'a>(&'a self, column: &'a str) -> &'a str {
        let matches = |qualified: &str| {
            qualified == column || (!column.contains('.') && bare_name(qualified) == column)
        };
        self.columns
            .iter()
            .find(|(qualified, _)| matches(qualified))
            .map_or(bare_name(column), |(_, exposed)| exposed.as_str())
    }

    /// `value` with its column references renamed to what the view exposes.
    fn rewrite(&self, value: &Expr) -> Expr {
        match value {
            Expr::Column(name) => Expr::Column(CompactString::from(self.exposed(name))),
            Expr::Func { name, args } => Expr::Func {
                name: *name,
                args: args.iter().map(|arg| self.rewrite(arg)).collect(),
            },
            Expr::Alias(inner, alias) => Expr::Alias(Box::new(self.rewrite(inner)), alias.clone()),
            other => other.clone(),
        }
    }
}

fn bare_name(column: &str) -> &str {
    column.rsplit('.').next().unwrap_or(column)
}

fn referenced_columns<'e>(expr: &'e Expr, out: &mut Vec<&'e str>) {
    match expr {
        Expr::Column(name) => out.push(name),
        Expr::Func { args, .. } => args.iter().for_each(|arg| referenced_columns(arg, out)),
        Expr::Alias(inner, _) => referenced_columns(inner, out),
        Expr::Value(_) | Expr::Raw(_) | Expr::Star => {}
    }
}
