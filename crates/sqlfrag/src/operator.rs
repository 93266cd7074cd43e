//! Comparison operators.
//!
//! The operator *kind* is dialect-neutral; its SQL spelling comes from the
//! template, which lets a dialect map e.g. `ILIKE` to `LIKE` or a regular
//! expression match to `REGEXP`.

use std::fmt;

/// A comparison operator kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComparisonOperator {
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    NotLike,
    ILike,
    NotILike,
    RegExp,
    NotRegExp,
    In,
    NotIn,
    Between,
    NotBetween,
    Is,
    IsNot,
}

impl ComparisonOperator {
    pub const ALL: [ComparisonOperator; 18] = [
        Self::Eq,
        Self::NotEq,
        Self::Lt,
        Self::Lte,
        Self::Gt,
        Self::Gte,
        Self::Like,
        Self::NotLike,
        Self::ILike,
        Self::NotILike,
        Self::RegExp,
        Self::NotRegExp,
        Self::In,
        Self::NotIn,
        Self::Between,
        Self::NotBetween,
        Self::Is,
        Self::IsNot,
    ];

    /// Stable name used as the key of dialect operator overrides.
    pub fn name(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::NotEq => "not_eq",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Like => "like",
            Self::NotLike => "not_like",
            Self::ILike => "ilike",
            Self::NotILike => "not_ilike",
            Self::RegExp => "regexp",
            Self::NotRegExp => "not_regexp",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Between => "between",
            Self::NotBetween => "not_between",
            Self::Is => "is",
            Self::IsNot => "is_not",
        }
    }

    /// Inverse of [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Spelling used when a template does not override it.
    pub fn default_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::ILike => "ILIKE",
            Self::NotILike => "NOT ILIKE",
            Self::RegExp => "~",
            Self::NotRegExp => "!~",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Between => "BETWEEN",
            Self::NotBetween => "NOT BETWEEN",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
        }
    }

    /// Recognize an operator typed by hand (`"id >"`, `"name NOT LIKE"`).
    ///
    /// Matching is case-insensitive and whitespace-tolerant. Anything else is
    /// passed through verbatim by callers as a custom operator.
    pub fn parse(op: &str) -> Option<Self> {
        let normalized = op.split_whitespace().collect::<Vec<_>>().join(" ");
        let op = match normalized.to_ascii_uppercase().as_str() {
            "=" | "==" => Self::Eq,
            "!=" | "<>" => Self::NotEq,
            "<" => Self::Lt,
            "<=" => Self::Lte,
            ">" => Self::Gt,
            ">=" => Self::Gte,
            "LIKE" => Self::Like,
            "NOT LIKE" => Self::NotLike,
            "ILIKE" => Self::ILike,
            "NOT ILIKE" => Self::NotILike,
            "~" | "REGEXP" => Self::RegExp,
            "!~" | "NOT REGEXP" => Self::NotRegExp,
            "IN" => Self::In,
            "NOT IN" => Self::NotIn,
            "BETWEEN" => Self::Between,
            "NOT BETWEEN" => Self::NotBetween,
            "IS" => Self::Is,
            "IS NOT" => Self::IsNot,
            _ => return None,
        };
        Some(op)
    }

    /// Whether the right-hand side is a parenthesized list.
    pub fn takes_list(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_sql())
    }
}
