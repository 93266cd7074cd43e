//! Condition normalizer.
//!
//! Turns caller terms into fragments plus the ordered arguments that go with
//! them. The argument order always matches the left-to-right order of the
//! placeholders in the compiled SQL.
//!
//! ```
//! use sqlfrag::normalize::{Arg, Term, to_where};
//! use sqlfrag::fragment::Fragment;
//! use sqlfrag::{Param, Template};
//!
//! let term = Term::and(vec![
//!     Term::constraint("status", "active"),
//!     Term::or(vec![
//!         Term::constraint("role", Arg::list(["admin", "owner"])),
//!         Term::constraint("deleted_at", Param::Null),
//!     ]),
//! ]);
//! let (w, args) = to_where(term).unwrap();
//!
//! let t = Template::postgres();
//! assert_eq!(
//!     w.compile(&t).render(t.placeholder_style()),
//!     r#"WHERE ("status" = $1 AND ("role" IN ($2, $3) OR "deleted_at" IS NULL))"#
//! );
//! assert_eq!(args.len(), 3);
//! ```

mod arg;
mod expand;
mod term;

#[cfg(test)]
mod tests;

pub use arg::{Arg, Comparison, FuncExpr, RawValue};
pub use expand::expand_placeholders;
pub use term::{ColumnTerm, Constraint, ConstraintKey, Term};

use crate::error::{Error, Result};
use crate::fragment::{
    And, Column, ColumnValue, ColumnValues, Columns, Condition, Operator, Or, Raw, Value,
    ValueGroup, ValueGroups, Values, Where,
};
use crate::operator::ComparisonOperator;
use crate::param::{Param, ParamList};
use arg::Operand;
use expand::{placeholder_group, render_func};
use regex::Regex;
use std::sync::OnceLock;

/// Normalize a condition term into a `WHERE` clause.
pub fn to_where(term: Term) -> Result<(Where, ParamList)> {
    let mut params = ParamList::new();
    let conditions = conditions(term, &mut params)?;
    Ok((Where::new(conditions), params))
}

/// Normalize several terms, joined by an implicit `AND`.
pub fn to_where_all(terms: Vec<Term>) -> Result<(Where, ParamList)> {
    to_where(Term::All(terms))
}

/// Normalize `SET` list entries.
///
/// Constraints become assignments (`{"count": 1}` → `count = ?`). Raw
/// entries must read `column = expression` (`"count = count + ?"`).
pub fn to_column_values(terms: Vec<Term>) -> Result<(ColumnValues, ParamList)> {
    let mut params = ParamList::new();
    let mut items = Vec::with_capacity(terms.len());
    for term in terms {
        assignments(term, &mut params, &mut items)?;
    }
    Ok((ColumnValues::new(items), params))
}

/// Normalize a select list.
pub fn to_columns(terms: Vec<ColumnTerm>) -> Result<(Columns, ParamList)> {
    let mut params = ParamList::new();
    let mut columns = Vec::with_capacity(terms.len());
    for term in terms {
        match term {
            ColumnTerm::Name(list) => columns.extend(
                list.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(Column::new),
            ),
            ColumnTerm::Raw(raw) => {
                let sql = expand_placeholders(&raw, &mut params)?;
                columns.push(Column::raw(Raw::new(sql)));
            }
            ColumnTerm::Func(f) => {
                let sql = render_func(&f, &mut params)?;
                columns.push(Column::raw(Raw::new(sql)));
            }
        }
    }
    Ok((Columns::new(columns), params))
}

/// Normalize `INSERT` rows.
///
/// Every row must have one value per column. Plain values (`NULL` included)
/// are bound; functions and raw values are spliced in.
pub fn to_values<C, S>(columns: C, rows: Vec<Vec<Arg>>) -> Result<(Columns, ValueGroups, ParamList)>
where
    C: IntoIterator<Item = S>,
    S: Into<String>,
{
    let columns: Columns = columns.into_iter().map(Column::new).collect();
    let mut params = ParamList::new();
    let mut groups = Vec::with_capacity(rows.len());

    for (i, row) in rows.into_iter().enumerate() {
        if !columns.is_empty() && row.len() != columns.len() {
            return Err(Error::UnsupportedArgument(format!(
                "row {i} has {} value(s) for {} column(s)",
                row.len(),
                columns.len()
            )));
        }
        let mut values = Vec::with_capacity(row.len());
        for arg in row {
            let value = match arg {
                Arg::Value(p) => {
                    params.push(p);
                    Value::placeholder()
                }
                Arg::Func(f) => Value::raw(render_func(&f, &mut params)?),
                Arg::Raw(r) => Value::raw(expand_placeholders(&r, &mut params)?),
                Arg::List(_) => {
                    return Err(Error::UnsupportedArgument(
                        "a list cannot be inserted into a single column".to_string(),
                    ));
                }
                Arg::Cmp(_) => {
                    return Err(Error::UnsupportedArgument(
                        "a comparison cannot be inserted".to_string(),
                    ));
                }
            };
            values.push(value);
        }
        groups.push(ValueGroup::new(Values::new(values)));
    }

    Ok((columns, ValueGroups::new(groups), params))
}

fn conditions(term: Term, params: &mut ParamList) -> Result<Vec<Condition>> {
    match term {
        Term::Raw(raw) => {
            if raw.sql.trim().is_empty() && raw.args.is_empty() {
                return Ok(Vec::new());
            }
            let sql = expand_placeholders(&raw, params)?;
            Ok(vec![Raw::new(sql).into()])
        }
        Term::Constraint(c) => Ok(vec![constraint(c, params, false)?.into()]),
        Term::All(terms) => {
            let mut out = Vec::with_capacity(terms.len());
            for t in terms {
                out.extend(conditions(t, params)?);
            }
            Ok(out)
        }
        Term::And(terms) => {
            let mut children = Vec::with_capacity(terms.len());
            for t in terms {
                children.extend(conditions(t, params)?);
            }
            if children.is_empty() {
                return Ok(Vec::new());
            }
            Ok(vec![And::new(children).into()])
        }
        Term::Or(terms) => {
            let mut children = Vec::with_capacity(terms.len());
            for t in terms {
                let mut cs = conditions(t, params)?;
                match cs.len() {
                    0 => {}
                    1 => children.append(&mut cs),
                    _ => children.push(And::new(cs).into()),
                }
            }
            if children.is_empty() {
                return Ok(Vec::new());
            }
            Ok(vec![Or::new(children).into()])
        }
    }
}

fn assignments(term: Term, params: &mut ParamList, out: &mut Vec<ColumnValue>) -> Result<()> {
    match term {
        Term::Constraint(c) => out.push(constraint(c, params, true)?),
        Term::Raw(raw) => {
            let sql = expand_placeholders(&raw, params)?;
            let (column, value) = split_assignment(&sql).ok_or_else(|| {
                Error::UnsupportedArgument(format!(
                    "expected 'column = expression' in SET list, got '{}'",
                    raw.sql
                ))
            })?;
            if !is_set_target(column) {
                return Err(Error::UnsupportedArgument(format!(
                    "invalid SET target in '{}'",
                    raw.sql
                )));
            }
            out.push(ColumnValue::assign(column, Value::raw(value)));
        }
        Term::All(terms) => {
            for t in terms {
                assignments(t, params, out)?;
            }
        }
        Term::And(_) | Term::Or(_) => {
            return Err(Error::UnsupportedArgument(
                "AND/OR groups are not valid in a SET list".to_string(),
            ));
        }
    }
    Ok(())
}

/// Split `"col = expr"` at its assignment `=`.
///
/// `>=`, `<=`, `!=`, `:=` and `==` are comparisons, not assignments.
fn split_assignment(sql: &str) -> Option<(&str, &str)> {
    let (column, value) = sql.split_once('=')?;
    if column.ends_with(['<', '>', '!', ':']) || value.starts_with('=') {
        return None;
    }
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some((column.trim(), value))
}

/// A plain, optionally dotted identifier (`count`, `t.count`).
fn is_set_target(column: &str) -> bool {
    static TARGET_RE: OnceLock<Regex> = OnceLock::new();
    TARGET_RE
        .get_or_init(|| {
            Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
                .expect("invalid built-in SET target regex")
        })
        .is_match(column)
}

/// Split `"id >"` into `("id", Some(Gt))`.
fn split_key(key: &str) -> (&str, Option<Operator>) {
    let key = key.trim();
    match key.split_once(char::is_whitespace) {
        Some((column, op)) if !op.trim().is_empty() => (column, Some(Operator::parse(op))),
        _ => (key, None),
    }
}

fn constraint(c: Constraint, params: &mut ParamList, assign: bool) -> Result<ColumnValue> {
    let (column, explicit) = match c.key {
        ConstraintKey::Name(ref name) => {
            let (column, op) = split_key(name);
            if column.is_empty() {
                return Err(Error::UnsupportedArgument("empty constraint key".to_string()));
            }
            (Column::new(column), op)
        }
        ConstraintKey::Raw(ref raw) => {
            let sql = expand_placeholders(raw, params)?;
            (Column::raw(Raw::new(sql)), None)
        }
    };

    if assign && explicit.is_some() {
        return Err(Error::InvalidOperator(format!(
            "SET list keys can't carry an operator: {:?}",
            c.key
        )));
    }

    let (operator, value) = constraint_value(c.value, explicit, params, assign)?;
    Ok(ColumnValue::new(column, operator, value))
}

/// Infer the operator and render the value of a constraint.
fn constraint_value(
    arg: Arg,
    explicit: Option<Operator>,
    params: &mut ParamList,
    assign: bool,
) -> Result<(Operator, Value)> {
    let fallback = if assign { Operator::Assign } else { Operator::Default };

    Ok(match arg {
        Arg::Value(Param::Null) => {
            let op = match explicit {
                Some(op) => op,
                None if assign => Operator::Assign,
                None => Operator::Cmp(ComparisonOperator::Is),
            };
            (op, Value::null())
        }
        Arg::Value(p) => {
            params.push(p);
            match explicit {
                Some(Operator::Cmp(op)) if op.takes_list() => {
                    (Operator::Cmp(op), Value::raw(placeholder_group(1)))
                }
                op => (op.unwrap_or(fallback), Value::placeholder()),
            }
        }
        Arg::List(values) => {
            if assign {
                return Err(Error::UnsupportedArgument(
                    "a list cannot be assigned to a column".to_string(),
                ));
            }
            let n = values.len();
            params.extend_params(values);
            (
                explicit.unwrap_or(Operator::Cmp(ComparisonOperator::In)),
                Value::raw(placeholder_group(n)),
            )
        }
        Arg::Func(f) => (explicit.unwrap_or(fallback), Value::raw(render_func(&f, params)?)),
        Arg::Raw(r) => (
            explicit.unwrap_or(fallback),
            Value::raw(expand_placeholders(&r, params)?),
        ),
        Arg::Cmp(cmp) => {
            if assign {
                return Err(Error::UnsupportedArgument(
                    "a comparison cannot be assigned to a column".to_string(),
                ));
            }
            if let Some(op) = explicit {
                return Err(Error::InvalidOperator(format!(
                    "operator {op:?} given both in the key and as a comparison"
                )));
            }
            match cmp.operand {
                Operand::Null => (cmp.operator, Value::null()),
                Operand::Range(from, to) => {
                    params.push(from);
                    params.push(to);
                    (cmp.operator, Value::raw("? AND ?"))
                }
                Operand::Arg(inner) => {
                    let (_, value) = constraint_value(*inner, Some(cmp.operator.clone()), params, false)?;
                    (cmp.operator, value)
                }
            }
        }
    })
}
