use super::{Column, Fragment, Value, join_compiled};
use crate::compiled::Compiled;
use crate::hash::{FragmentHash, HashCell};
use crate::operator::ComparisonOperator;
use crate::template::Template;
use std::sync::Arc;

/// The operator of a [`ColumnValue`].
///
/// Operators are spelled by the template at compile time, so a normalized
/// tree is dialect-independent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    /// The template's default comparison operator.
    Default,
    /// The template's assignment operator (SET lists).
    Assign,
    Cmp(ComparisonOperator),
    /// Any other operator, emitted verbatim (`@>`, `&&`, ...).
    Custom(String),
}

impl Operator {
    /// Interpret hand-written operator text.
    pub fn parse(op: &str) -> Self {
        match ComparisonOperator::parse(op) {
            Some(op) => Operator::Cmp(op),
            None => Operator::Custom(op.trim().to_string()),
        }
    }

    fn sql<'t>(&'t self, t: &'t Template) -> &'t str {
        match self {
            Operator::Default => &t.default_operator,
            Operator::Assign => &t.assignment_operator,
            Operator::Cmp(op) => t.operator_sql(*op),
            Operator::Custom(op) => op,
        }
    }

    fn hash_into(&self, h: &mut crate::hash::HashBuilder) {
        match self {
            Operator::Default => {
                h.tag(0);
            }
            Operator::Assign => {
                h.tag(1);
            }
            Operator::Cmp(op) => {
                h.tag(2).str(op.name());
            }
            Operator::Custom(op) => {
                h.tag(3).str(op);
            }
        }
    }
}

impl From<ComparisonOperator> for Operator {
    fn from(op: ComparisonOperator) -> Self {
        Operator::Cmp(op)
    }
}

/// A `(column, operator, value)` triple: one condition or one assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValue {
    column: Column,
    operator: Operator,
    value: Value,
    hash: HashCell,
}

impl ColumnValue {
    pub fn new(column: impl Into<Column>, operator: Operator, value: Value) -> Self {
        Self {
            column: column.into(),
            operator,
            value,
            hash: HashCell::new(),
        }
    }

    /// `column <default operator> ?`
    pub fn placeholder(column: impl Into<Column>) -> Self {
        Self::new(column, Operator::Default, Value::placeholder())
    }

    /// `column = value` in a SET list.
    pub fn assign(column: impl Into<Column>, value: Value) -> Self {
        Self::new(column, Operator::Assign, value)
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Fragment for ColumnValue {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| {
            let mut h = FragmentHash::builder("ColumnValue");
            h.child(self.column.hash());
            self.operator.hash_into(&mut h);
            h.child(self.value.hash());
            h.finish()
        })
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        t.cached(self.hash(), || {
            let column = self.column.compile(t);
            let operator = Compiled::text(self.operator.sql(t));
            let value = self.value.compile(t);
            t.layouts.column_value.render(&[
                ("column", &*column),
                ("operator", &operator),
                ("value", &*value),
            ])
        })
    }
}

/// A list of assignments (`SET a = ?, b = ?`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnValues {
    items: Vec<ColumnValue>,
    hash: HashCell,
}

impl ColumnValues {
    pub fn new(items: Vec<ColumnValue>) -> Self {
        Self {
            items,
            hash: HashCell::new(),
        }
    }

    /// A new list with `item` appended.
    pub fn with(mut self, item: ColumnValue) -> Self {
        self.items.push(item);
        self.hash = HashCell::new();
        self
    }

    pub fn items(&self) -> &[ColumnValue] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Fragment for ColumnValues {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| {
            FragmentHash::builder("ColumnValues")
                .children(self.items.iter().map(Fragment::hash))
                .finish()
        })
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        t.cached(self.hash(), || {
            join_compiled(self.items.iter().map(|cv| cv.compile(t)), &t.identifier_separator)
        })
    }
}
