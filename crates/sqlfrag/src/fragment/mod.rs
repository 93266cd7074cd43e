//! The fragment AST.
//!
//! Every node is immutable once built. Composite nodes that grow (`Columns`,
//! `ColumnValues`, `Joins`, ...) do so through consuming `with` builders that
//! return a new value with a fresh hash cell, so a memoized hash always
//! describes the content it sits next to.
//!
//! ```
//! use sqlfrag::fragment::{Column, ColumnValue, Condition, Fragment, Statement, StatementType, Table, Where};
//! use sqlfrag::Template;
//!
//! let stmt = Statement::new(StatementType::Select)
//!     .table(Table::new("users"))
//!     .where_(Where::new(vec![Condition::from(ColumnValue::placeholder(Column::new("id")))]));
//!
//! let t = Template::postgres();
//! assert_eq!(stmt.compile(&t).to_string(), r#"SELECT * FROM "users" WHERE ("id" = ?)"#);
//! ```

mod column;
mod column_value;
mod condition;
mod join;
mod order;
mod raw;
mod statement;
mod table;
mod value;

#[cfg(test)]
mod tests;

pub use column::{Column, Columns, Returning};
pub use column_value::{ColumnValue, ColumnValues, Operator};
pub use condition::{And, Condition, Or, Where};
pub use join::{Join, JoinConstraint, JoinKind, Joins, On, Using};
pub use order::{GroupBy, Order, OrderBy, SortColumn, SortColumns};
pub use raw::Raw;
pub use statement::{Statement, StatementType};
pub use table::{Database, Table};
pub use value::{Value, ValueGroup, ValueGroups, Values};

use crate::compiled::Compiled;
use crate::hash::FragmentHash;
use crate::template::Template;
use regex::Regex;
use std::sync::{Arc, OnceLock};

/// A node of the SQL AST.
pub trait Fragment {
    /// Structural identity of this node, computed once.
    fn hash(&self) -> &FragmentHash;

    /// Compile for a dialect. Results are cached in the template by hash.
    fn compile(&self, template: &Template) -> Arc<Compiled>;
}

/// Join compiled pieces with `sep`, skipping empty ones.
fn join_compiled<I>(pieces: I, sep: &str) -> Compiled
where
    I: IntoIterator<Item = Arc<Compiled>>,
{
    let mut out = Compiled::new();
    for piece in pieces {
        if piece.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push_str(sep);
        }
        out.append(&piece);
    }
    out
}

/// Split `"name AS alias"` or `"name alias"` into its parts.
fn split_alias(input: &str) -> (&str, Option<&str>) {
    static AS_RE: OnceLock<Regex> = OnceLock::new();
    let re = AS_RE.get_or_init(|| Regex::new(r"(?i)\s+as\s+").expect("invalid built-in alias regex"));

    let input = input.trim();
    if let Some(m) = re.find(input) {
        return (input[..m.start()].trim(), Some(input[m.end()..].trim()));
    }
    match input.split_once(char::is_whitespace) {
        Some((name, alias)) if !alias.trim().is_empty() => (name, Some(alias.trim())),
        _ => (input, None),
    }
}

/// Quote a possibly aliased name and render it through an alias layout.
fn quote_aliased(t: &Template, input: &str, alias_layout: &crate::template::Layout) -> Compiled {
    let (name, alias) = split_alias(input);
    let name = Compiled::text(t.quote_name(name));
    match alias {
        Some(alias) => {
            let alias = Compiled::text(t.quote_identifier(alias));
            alias_layout.render(&[("name", &name), ("alias", &alias)])
        }
        None => name,
    }
}
