use super::arg::{Arg, FuncExpr, RawValue};
use crate::error::{Error, Result};
use crate::param::Param;

/// The key of a [`Constraint`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintKey {
    /// `"column"` or `"column operator"`.
    Name(String),
    /// A raw left-hand side, such as `LOWER(email)`; its arguments bind
    /// before the value's.
    Raw(RawValue),
}

/// A key/value condition: `{"id >": 5}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub(crate) key: ConstraintKey,
    pub(crate) value: Arg,
}

impl Constraint {
    pub fn new(key: impl Into<String>, value: impl Into<Arg>) -> Self {
        Self {
            key: ConstraintKey::Name(key.into()),
            value: value.into(),
        }
    }

    pub fn with_raw_key(key: RawValue, value: impl Into<Arg>) -> Self {
        Self {
            key: ConstraintKey::Raw(key),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &ConstraintKey {
        &self.key
    }

    pub fn value(&self) -> &Arg {
        &self.value
    }
}

/// A condition term, as handed over by a query builder.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// Raw SQL with `?` placeholders.
    Raw(RawValue),
    /// A key/value constraint.
    Constraint(Constraint),
    /// Implicit `AND`: the children's conditions join the parent list.
    All(Vec<Term>),
    /// An explicit, grouped `AND`.
    And(Vec<Term>),
    /// An explicit, grouped `OR`.
    Or(Vec<Term>),
}

impl Term {
    /// Interpret `first` followed by `args`.
    ///
    /// `first` containing `?`, or no arguments at all, makes a raw term.
    /// Otherwise `first` is a key (`"col"`, `"col op"`) whose value is the
    /// single argument, or the list of all arguments when there are several.
    pub fn expr(first: impl Into<String>, args: Vec<Arg>) -> Result<Self> {
        let first = first.into();
        if first.contains('?') || args.is_empty() {
            return Ok(Term::Raw(RawValue::new(first, args)));
        }
        let args = match <[Arg; 1]>::try_from(args) {
            Ok([value]) => return Ok(Term::Constraint(Constraint::new(first, value))),
            Err(args) => args,
        };

        let values = args
            .into_iter()
            .map(|a| match a {
                Arg::Value(p) => Ok(p),
                other => Err(Error::UnsupportedArgument(format!(
                    "only plain values can be listed for '{first}', got {other:?}"
                ))),
            })
            .collect::<Result<Vec<Param>>>()?;
        Ok(Term::Constraint(Constraint::new(first, Arg::List(values))))
    }

    pub fn raw(sql: impl Into<String>, args: Vec<Arg>) -> Self {
        Term::Raw(RawValue::new(sql, args))
    }

    pub fn constraint(key: impl Into<String>, value: impl Into<Arg>) -> Self {
        Term::Constraint(Constraint::new(key, value))
    }

    /// Key/value pairs joined by an implicit `AND`, in order.
    pub fn map<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Arg>,
    {
        Term::All(
            pairs
                .into_iter()
                .map(|(k, v)| Term::constraint(k, v))
                .collect(),
        )
    }

    pub fn all(terms: Vec<Term>) -> Self {
        Term::All(terms)
    }

    pub fn and(terms: Vec<Term>) -> Self {
        Term::And(terms)
    }

    pub fn or(terms: Vec<Term>) -> Self {
        Term::Or(terms)
    }
}

impl From<Constraint> for Term {
    fn from(c: Constraint) -> Self {
        Term::Constraint(c)
    }
}

impl From<RawValue> for Term {
    fn from(r: RawValue) -> Self {
        Term::Raw(r)
    }
}

/// An entry of a select list.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnTerm {
    /// One name or a comma-separated list of names.
    Name(String),
    Raw(RawValue),
    Func(FuncExpr),
}

impl From<&str> for ColumnTerm {
    fn from(name: &str) -> Self {
        ColumnTerm::Name(name.to_string())
    }
}

impl From<String> for ColumnTerm {
    fn from(name: String) -> Self {
        ColumnTerm::Name(name)
    }
}

impl From<RawValue> for ColumnTerm {
    fn from(raw: RawValue) -> Self {
        ColumnTerm::Raw(raw)
    }
}

impl From<FuncExpr> for ColumnTerm {
    fn from(f: FuncExpr) -> Self {
        ColumnTerm::Func(f)
    }
}
