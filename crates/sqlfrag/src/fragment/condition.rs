use super::{ColumnValue, Fragment, Raw};
use crate::compiled::Compiled;
use crate::hash::{FragmentHash, HashCell};
use crate::template::Template;
use regex::Regex;
use std::sync::{Arc, OnceLock};

/// One entry of a condition list.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    ColumnValue(ColumnValue),
    Raw(Raw),
    And(And),
    Or(Or),
}

impl Condition {
    fn is_group(&self) -> bool {
        matches!(self, Condition::And(_) | Condition::Or(_))
    }
}

impl From<ColumnValue> for Condition {
    fn from(cv: ColumnValue) -> Self {
        Condition::ColumnValue(cv)
    }
}

impl From<Raw> for Condition {
    fn from(raw: Raw) -> Self {
        Condition::Raw(raw)
    }
}

impl From<And> for Condition {
    fn from(and: And) -> Self {
        Condition::And(and)
    }
}

impl From<Or> for Condition {
    fn from(or: Or) -> Self {
        Condition::Or(or)
    }
}

impl Fragment for Condition {
    fn hash(&self) -> &FragmentHash {
        match self {
            Condition::ColumnValue(f) => f.hash(),
            Condition::Raw(f) => f.hash(),
            Condition::And(f) => f.hash(),
            Condition::Or(f) => f.hash(),
        }
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        match self {
            Condition::ColumnValue(f) => f.compile(t),
            Condition::Raw(f) => f.compile(t),
            Condition::And(f) => f.compile(t),
            Condition::Or(f) => f.compile(t),
        }
    }
}

/// Whether raw SQL has an `OR` that would bind looser than a joining `AND`.
fn has_or(raw: &Raw) -> bool {
    static OR_RE: OnceLock<Regex> = OnceLock::new();
    OR_RE
        .get_or_init(|| Regex::new(r"(?i)\bor\b").expect("invalid built-in OR regex"))
        .is_match(raw.sql())
}

/// Join conditions and wrap them in the clause group.
///
/// Empty children are skipped. A lone child that is already a group is
/// returned as is. When several children are joined with `AND`, raw children
/// containing `OR` get their own group so the `OR` keeps its meaning.
pub(crate) fn group_conditions(
    t: &Template,
    conditions: &[Condition],
    joiner: &str,
    joins_with_and: bool,
) -> Compiled {
    let compiled: Vec<(&Condition, Arc<Compiled>)> = conditions
        .iter()
        .map(|c| (c, c.compile(t)))
        .filter(|(_, c)| !c.is_empty())
        .collect();

    match compiled.as_slice() {
        [] => Compiled::new(),
        [(cond, single)] if cond.is_group() => (**single).clone(),
        [(_, single)] => t.layouts.clause_group.render(&[("clause", &**single)]),
        many => {
            let mut joined = Compiled::new();
            for (i, (cond, c)) in many.iter().enumerate() {
                if i > 0 {
                    joined.push_str(joiner);
                }
                if let Condition::Raw(raw) = cond
                    && joins_with_and
                    && has_or(raw)
                {
                    joined.append(&t.layouts.clause_group.render(&[("clause", &**c)]));
                } else {
                    joined.append(c);
                }
            }
            t.layouts.clause_group.render(&[("clause", &joined)])
        }
    }
}

fn hash_conditions(type_name: &'static str, conditions: &[Condition]) -> FragmentHash {
    FragmentHash::builder(type_name)
        .children(conditions.iter().map(Fragment::hash))
        .finish()
}

macro_rules! condition_list {
    ($(#[$doc:meta])* $name:ident, $joiner:ident, $and:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct $name {
            conditions: Vec<Condition>,
            hash: HashCell,
        }

        impl $name {
            pub fn new(conditions: Vec<Condition>) -> Self {
                Self {
                    conditions,
                    hash: HashCell::new(),
                }
            }

            /// A new list with `condition` appended.
            pub fn with(mut self, condition: impl Into<Condition>) -> Self {
                self.conditions.push(condition.into());
                self.hash = HashCell::new();
                self
            }

            pub fn conditions(&self) -> &[Condition] {
                &self.conditions
            }

            pub fn is_empty(&self) -> bool {
                self.conditions.is_empty()
            }

            fn grouped(&self, t: &Template) -> Compiled {
                group_conditions(t, &self.conditions, &t.$joiner, $and)
            }
        }

        impl FromIterator<Condition> for $name {
            fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
                Self::new(iter.into_iter().collect())
            }
        }
    };
}

condition_list!(
    /// Conditions joined by `AND`, in parentheses.
    And,
    and_joiner,
    true
);

condition_list!(
    /// Conditions joined by `OR`, in parentheses.
    Or,
    or_joiner,
    false
);

condition_list!(
    /// A `WHERE` clause: conditions joined by `AND`.
    ///
    /// A clause with no non-empty conditions compiles to nothing, keyword
    /// included.
    Where,
    and_joiner,
    true
);

impl Fragment for And {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| hash_conditions("And", &self.conditions))
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        t.cached(self.hash(), || self.grouped(t))
    }
}

impl Fragment for Or {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| hash_conditions("Or", &self.conditions))
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        t.cached(self.hash(), || self.grouped(t))
    }
}

impl Fragment for Where {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| hash_conditions("Where", &self.conditions))
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        t.cached(self.hash(), || {
            let conds = self.grouped(t);
            if conds.is_empty() {
                return conds;
            }
            t.layouts.where_.render(&[("conds", &conds)])
        })
    }
}
