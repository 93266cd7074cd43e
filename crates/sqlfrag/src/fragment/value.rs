use super::{Fragment, Raw, join_compiled};
use crate::compiled::Compiled;
use crate::hash::{FragmentHash, HashCell};
use crate::param::Param;
use crate::template::Template;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
enum ValueKind {
    Placeholder,
    Raw(Raw),
    Literal(Param),
}

/// A single value position.
///
/// Caller data should go through [`Value::placeholder`]; literals are
/// rendered inline and end up in the compiled text (and the cache).
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    kind: ValueKind,
    hash: HashCell,
}

impl Value {
    fn from_kind(kind: ValueKind) -> Self {
        Self {
            kind,
            hash: HashCell::new(),
        }
    }

    /// One bound placeholder.
    pub fn placeholder() -> Self {
        Self::from_kind(ValueKind::Placeholder)
    }

    /// Raw SQL (`NOW()`, `? + 1`, `(?, ?)`).
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::from_kind(ValueKind::Raw(Raw::new(sql)))
    }

    /// An inline literal, quoted by the template.
    pub fn literal(value: impl Into<Param>) -> Self {
        Self::from_kind(ValueKind::Literal(value.into()))
    }

    /// The `NULL` literal.
    pub fn null() -> Self {
        Self::literal(Param::Null)
    }

    /// Number of placeholders this value contributes.
    pub fn placeholder_count(&self) -> usize {
        match &self.kind {
            ValueKind::Placeholder => 1,
            ValueKind::Raw(raw) => raw.placeholder_count(),
            ValueKind::Literal(_) => 0,
        }
    }
}

impl Fragment for Value {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| {
            let mut h = FragmentHash::builder("Value");
            match &self.kind {
                ValueKind::Placeholder => {
                    h.tag(0);
                }
                ValueKind::Raw(raw) => {
                    h.tag(1).child(raw.hash());
                }
                ValueKind::Literal(p) => {
                    h.tag(2);
                    p.hash_into(&mut h);
                }
            }
            h.finish()
        })
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        match &self.kind {
            ValueKind::Raw(raw) => raw.compile(t),
            ValueKind::Placeholder => t.cached(self.hash(), || {
                let mut c = Compiled::new();
                c.push_param();
                c
            }),
            ValueKind::Literal(p) => t.cached(self.hash(), || Compiled::text(t.render_literal(p))),
        }
    }
}

/// A comma-separated list of values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Values {
    values: Vec<Value>,
    hash: HashCell,
}

impl Values {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values,
            hash: HashCell::new(),
        }
    }

    /// `n` placeholders.
    pub fn placeholders(n: usize) -> Self {
        Self::new((0..n).map(|_| Value::placeholder()).collect())
    }

    pub fn with(mut self, value: Value) -> Self {
        self.values.push(value);
        self.hash = HashCell::new();
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Fragment for Values {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| {
            FragmentHash::builder("Values")
                .children(self.values.iter().map(Fragment::hash))
                .finish()
        })
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        t.cached(self.hash(), || {
            join_compiled(self.values.iter().map(|v| v.compile(t)), &t.value_separator)
        })
    }
}

/// A parenthesized list of values: one row of a multi-row `INSERT`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueGroup {
    values: Values,
    hash: HashCell,
}

impl ValueGroup {
    pub fn new(values: Values) -> Self {
        Self {
            values,
            hash: HashCell::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Fragment for ValueGroup {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| {
            FragmentHash::builder("ValueGroup")
                .child(self.values.hash())
                .finish()
        })
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        t.cached(self.hash(), || {
            let inner = self.values.compile(t);
            t.layouts.clause_group.render(&[("clause", &*inner)])
        })
    }
}

/// Several value groups (`(?, ?), (?, ?)`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueGroups {
    groups: Vec<ValueGroup>,
    hash: HashCell,
}

impl ValueGroups {
    pub fn new(groups: Vec<ValueGroup>) -> Self {
        Self {
            groups,
            hash: HashCell::new(),
        }
    }

    pub fn with(mut self, group: ValueGroup) -> Self {
        self.groups.push(group);
        self.hash = HashCell::new();
        self
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Fragment for ValueGroups {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| {
            FragmentHash::builder("ValueGroups")
                .children(self.groups.iter().map(Fragment::hash))
                .finish()
        })
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        t.cached(self.hash(), || {
            join_compiled(self.groups.iter().map(|g| g.compile(t)), &t.value_separator)
        })
    }
}
