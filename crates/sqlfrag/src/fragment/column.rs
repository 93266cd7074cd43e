use super::{Fragment, Raw, join_compiled, quote_aliased};
use crate::compiled::Compiled;
use crate::hash::{FragmentHash, HashCell};
use crate::template::Template;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
enum ColumnKind {
    Name(String),
    Raw(Raw),
}

/// A column reference or expression.
///
/// Names may be qualified (`u.id`), use `*`, and carry an alias
/// (`id AS user_id`). Raw expressions are emitted verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    kind: ColumnKind,
    hash: HashCell,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            kind: ColumnKind::Name(name.into()),
            hash: HashCell::new(),
        }
    }

    pub fn raw(raw: Raw) -> Self {
        Self {
            kind: ColumnKind::Raw(raw),
            hash: HashCell::new(),
        }
    }

    /// The column name, or `None` for raw expressions.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            ColumnKind::Name(name) => Some(name),
            ColumnKind::Raw(_) => None,
        }
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column::new(name)
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Column::new(name)
    }
}

impl Fragment for Column {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| {
            let mut h = FragmentHash::builder("Column");
            match &self.kind {
                ColumnKind::Name(name) => h.tag(0).str(name),
                ColumnKind::Raw(raw) => h.tag(1).child(raw.hash()),
            };
            h.finish()
        })
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        match &self.kind {
            ColumnKind::Raw(raw) => raw.compile(t),
            ColumnKind::Name(name) => t.cached(self.hash(), || {
                quote_aliased(t, name, &t.layouts.column_alias)
            }),
        }
    }
}

/// A list of columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Columns {
    columns: Vec<Column>,
    hash: HashCell,
}

impl Columns {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            hash: HashCell::new(),
        }
    }

    /// Parse a comma-separated list of column names.
    pub fn parse(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(Column::new)
                .collect(),
        )
    }

    /// A new list with `column` appended.
    pub fn with(mut self, column: Column) -> Self {
        self.columns.push(column);
        self.hash = HashCell::new();
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<C: Into<Column>> FromIterator<C> for Columns {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

impl Fragment for Columns {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| {
            FragmentHash::builder("Columns")
                .children(self.columns.iter().map(Fragment::hash))
                .finish()
        })
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        t.cached(self.hash(), || {
            join_compiled(self.columns.iter().map(|c| c.compile(t)), &t.identifier_separator)
        })
    }
}

/// Columns of a `RETURNING` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Returning {
    columns: Columns,
    hash: HashCell,
}

impl Returning {
    pub fn new(columns: Columns) -> Self {
        Self {
            columns,
            hash: HashCell::new(),
        }
    }
}

impl Fragment for Returning {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| {
            FragmentHash::builder("Returning")
                .child(self.columns.hash())
                .finish()
        })
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        t.cached(self.hash(), || (*self.columns.compile(t)).clone())
    }
}
