use super::condition::group_conditions;
use super::{Columns, Condition, Fragment, Table};
use crate::compiled::Compiled;
use crate::hash::{FragmentHash, HashCell};
use crate::template::Template;
use std::sync::Arc;

const NATURAL: &str = "NATURAL";

/// Kind of join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JoinKind {
    /// Plain `JOIN`.
    #[default]
    Default,
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    fn keyword(self) -> &'static str {
        match self {
            JoinKind::Default => "",
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
            JoinKind::Full => "FULL",
            JoinKind::Cross => "CROSS",
        }
    }
}

/// An `ON` clause.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct On {
    conditions: Vec<Condition>,
    hash: HashCell,
}

impl On {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            hash: HashCell::new(),
        }
    }
}

impl Fragment for On {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| {
            FragmentHash::builder("On")
                .children(self.conditions.iter().map(Fragment::hash))
                .finish()
        })
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        t.cached(self.hash(), || {
            let conds = group_conditions(t, &self.conditions, &t.and_joiner, true);
            if conds.is_empty() {
                return conds;
            }
            t.layouts.on.render(&[("conds", &conds)])
        })
    }
}

/// A `USING (...)` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Using {
    columns: Columns,
    hash: HashCell,
}

impl Using {
    pub fn new(columns: Columns) -> Self {
        Self {
            columns,
            hash: HashCell::new(),
        }
    }
}

impl Fragment for Using {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| {
            FragmentHash::builder("Using")
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
            t.layouts.using.render(&[("columns", &*columns)])
        })
    }
}

/// How a join matches rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JoinConstraint {
    /// Neither `ON` nor `USING`: a natural join (unless `CROSS`).
    #[default]
    None,
    On(On),
    Using(Using),
}

/// A single join.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    kind: JoinKind,
    table: Table,
    constraint: JoinConstraint,
    hash: HashCell,
}

impl Join {
    pub fn new(kind: JoinKind, table: Table, constraint: JoinConstraint) -> Self {
        Self {
            kind,
            table,
            constraint,
            hash: HashCell::new(),
        }
    }

    pub fn on(kind: JoinKind, table: Table, on: On) -> Self {
        Self::new(kind, table, JoinConstraint::On(on))
    }

    pub fn using(kind: JoinKind, table: Table, using: Using) -> Self {
        Self::new(kind, table, JoinConstraint::Using(using))
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }
}

impl Fragment for Join {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| {
            let mut h = FragmentHash::builder("Join");
            h.tag(self.kind as u8).child(self.table.hash());
            match &self.constraint {
                JoinConstraint::None => h.tag(0),
                JoinConstraint::On(on) => h.tag(1).child(on.hash()),
                JoinConstraint::Using(using) => h.tag(2).child(using.hash()),
            };
            h.finish()
        })
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        t.cached(self.hash(), || {
            let natural = match (&self.constraint, self.kind) {
                (JoinConstraint::None, kind) if kind != JoinKind::Cross => Compiled::text(NATURAL),
                _ => Compiled::new(),
            };
            let kind = Compiled::text(self.kind.keyword());
            let table = self.table.compile(t);
            let (on, using) = match &self.constraint {
                JoinConstraint::None => (Arc::default(), Arc::default()),
                JoinConstraint::On(on) => (on.compile(t), Arc::default()),
                JoinConstraint::Using(using) => (Arc::default(), using.compile(t)),
            };
            t.layouts.join.render(&[
                ("natural", &natural),
                ("type", &kind),
                ("table", &*table),
                ("on", &*on),
                ("using", &*using),
            ])
        })
    }
}

/// A list of joins, separated by spaces.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Joins {
    joins: Vec<Join>,
    hash: HashCell,
}

impl Joins {
    pub fn new(joins: Vec<Join>) -> Self {
        Self {
            joins,
            hash: HashCell::new(),
        }
    }

    /// A new list with `join` appended.
    pub fn with(mut self, join: Join) -> Self {
        self.joins.push(join);
        self.hash = HashCell::new();
        self
    }

    pub fn len(&self) -> usize {
        self.joins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }
}

impl Fragment for Joins {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| {
            FragmentHash::builder("Joins")
                .children(self.joins.iter().map(Fragment::hash))
                .finish()
        })
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        t.cached(self.hash(), || {
            super::join_compiled(self.joins.iter().map(|j| j.compile(t)), " ")
        })
    }
}
