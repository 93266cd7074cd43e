use super::{Column, Columns, Fragment, join_compiled};
use crate::compiled::Compiled;
use crate::hash::{FragmentHash, HashCell};
use crate::template::Template;
use std::sync::Arc;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Order {
    /// No explicit direction.
    #[default]
    Default,
    Asc,
    Desc,
}

/// A column in an `ORDER BY` list.
#[derive(Debug, Clone, PartialEq)]
pub struct SortColumn {
    column: Column,
    order: Order,
    hash: HashCell,
}

impl SortColumn {
    pub fn new(column: impl Into<Column>, order: Order) -> Self {
        Self {
            column: column.into(),
            order,
            hash: HashCell::new(),
        }
    }

    /// Parse `"-created_at"` (descending), `"name ASC"` or `"name DESC"`.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if let Some(name) = input.strip_prefix('-') {
            return Self::new(name.trim(), Order::Desc);
        }
        if let Some((name, dir)) = input.rsplit_once(char::is_whitespace) {
            if dir.eq_ignore_ascii_case("desc") {
                return Self::new(name.trim(), Order::Desc);
            }
            if dir.eq_ignore_ascii_case("asc") {
                return Self::new(name.trim(), Order::Asc);
            }
        }
        Self::new(input, Order::Default)
    }

    pub fn order(&self) -> Order {
        self.order
    }
}

impl Fragment for SortColumn {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| {
            FragmentHash::builder("SortColumn")
                .child(self.column.hash())
                .tag(self.order as u8)
                .finish()
        })
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        t.cached(self.hash(), || {
            let column = self.column.compile(t);
            let order = Compiled::text(match self.order {
                Order::Default => "",
                Order::Asc => t.keywords().asc.as_str(),
                Order::Desc => t.keywords().desc.as_str(),
            });
            t.layouts
                .sort_column
                .render(&[("column", &*column), ("order", &order)])
        })
    }
}

/// A list of sort columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SortColumns {
    columns: Vec<SortColumn>,
    hash: HashCell,
}

impl SortColumns {
    pub fn new(columns: Vec<SortColumn>) -> Self {
        Self {
            columns,
            hash: HashCell::new(),
        }
    }

    /// Parse a comma-separated list (`"-created_at, name"`).
    pub fn parse(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(SortColumn::parse)
                .collect(),
        )
    }

    pub fn with(mut self, column: SortColumn) -> Self {
        self.columns.push(column);
        self.hash = HashCell::new();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Fragment for SortColumns {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| {
            FragmentHash::builder("SortColumns")
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

/// An `ORDER BY` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    columns: SortColumns,
    hash: HashCell,
}

impl OrderBy {
    pub fn new(columns: SortColumns) -> Self {
        Self {
            columns,
            hash: HashCell::new(),
        }
    }
}

impl Fragment for OrderBy {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| {
            FragmentHash::builder("OrderBy")
                .child(self.columns.hash())
                .finish()
        })
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        t.cached(self.hash(), || {
            let columns = self.columns.compile(t);
            if columns.is_empty() {
                return Compiled::new();
            }
            t.layouts.order_by.render(&[("columns", &*columns)])
        })
    }
}

/// A `GROUP BY` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBy {
    columns: Columns,
    hash: HashCell,
}

impl GroupBy {
    pub fn new(columns: Columns) -> Self {
        Self {
            columns,
            hash: HashCell::new(),
        }
    }
}

impl Fragment for GroupBy {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| {
            FragmentHash::builder("GroupBy")
                .child(self.columns.hash())
                .finish()
        })
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        t.cached(self.hash(), || {
            let columns = self.columns.compile(t);
            if columns.is_empty() {
                return Compiled::new();
            }
            t.layouts.group_by.render(&[("columns", &*columns)])
        })
    }
}
