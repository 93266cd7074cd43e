use crate::fragment::Operator;
use crate::operator::ComparisonOperator;
use crate::param::Param;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A caller-supplied value.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// A single bound value.
    Value(Param),
    /// Several bound values: `IN (?, ?, ...)`.
    List(Vec<Param>),
    /// A function call: `NAME(...)`.
    Func(FuncExpr),
    /// Raw SQL with its own `?` arguments.
    Raw(RawValue),
    /// A value with a typed operator.
    Cmp(Comparison),
}

impl Arg {
    pub fn value(v: impl Into<Param>) -> Self {
        Arg::Value(v.into())
    }

    pub fn list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Param>,
    {
        Arg::List(values.into_iter().map(Into::into).collect())
    }
}

macro_rules! impl_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Arg {
                fn from(v: $ty) -> Self {
                    Arg::Value(v.into())
                }
            }
        )*
    };
}

impl_from_value!(
    Param,
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    String,
    &str,
    &String,
    serde_json::Value,
    Uuid,
    DateTime<Utc>,
);

impl From<Vec<Param>> for Arg {
    fn from(values: Vec<Param>) -> Self {
        Arg::List(values)
    }
}

impl From<FuncExpr> for Arg {
    fn from(f: FuncExpr) -> Self {
        Arg::Func(f)
    }
}

impl From<RawValue> for Arg {
    fn from(r: RawValue) -> Self {
        Arg::Raw(r)
    }
}

impl From<Comparison> for Arg {
    fn from(c: Comparison) -> Self {
        Arg::Cmp(c)
    }
}

/// Raw SQL whose `?` markers bind the given arguments in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawValue {
    pub(crate) sql: String,
    pub(crate) args: Vec<Arg>,
}

impl RawValue {
    pub fn new(sql: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    /// Raw SQL without arguments.
    pub fn sql_only(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }
}

/// A function call such as `NOW()` or `COALESCE(?, ?)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncExpr {
    pub(crate) name: String,
    pub(crate) args: Vec<Arg>,
}

impl FuncExpr {
    pub fn new(name: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand {
    /// `IS NULL` / `IS NOT NULL`
    Null,
    Arg(Box<Arg>),
    /// `BETWEEN ? AND ?`
    Range(Param, Param),
}

/// A value paired with an explicit operator.
///
/// ```
/// use sqlfrag::normalize::{Comparison, Constraint, Term, to_where};
/// use sqlfrag::fragment::Fragment;
/// use sqlfrag::Template;
///
/// let (w, args) = to_where(Term::from(Constraint::new("age", Comparison::between(18, 30)))).unwrap();
/// let t = Template::postgres();
/// assert_eq!(w.compile(&t).render(t.placeholder_style()), r#"WHERE ("age" BETWEEN $1 AND $2)"#);
/// assert_eq!(args.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub(crate) operator: Operator,
    pub(crate) operand: Operand,
}

macro_rules! comparison_ctors {
    ($($(#[$doc:meta])* $fn:ident => $op:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $fn(value: impl Into<Param>) -> Self {
                Self::with_arg(ComparisonOperator::$op, Arg::Value(value.into()))
            }
        )*
    };
}

impl Comparison {
    fn with_arg(op: ComparisonOperator, arg: Arg) -> Self {
        Self {
            operator: Operator::Cmp(op),
            operand: Operand::Arg(Box::new(arg)),
        }
    }

    comparison_ctors! {
        eq => Eq,
        not_eq => NotEq,
        lt => Lt,
        lte => Lte,
        gt => Gt,
        gte => Gte,
        like => Like,
        not_like => NotLike,
        /// Case-insensitive `LIKE` (`LIKE` where the dialect has no `ILIKE`).
        ilike => ILike,
        not_ilike => NotILike,
        /// Regular expression match (`~` or `REGEXP`).
        regexp => RegExp,
        not_regexp => NotRegExp,
        is => Is,
        is_not => IsNot,
    }

    pub fn in_list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Param>,
    {
        Self::with_arg(ComparisonOperator::In, Arg::list(values))
    }

    pub fn not_in_list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Param>,
    {
        Self::with_arg(ComparisonOperator::NotIn, Arg::list(values))
    }

    pub fn between(from: impl Into<Param>, to: impl Into<Param>) -> Self {
        Self {
            operator: Operator::Cmp(ComparisonOperator::Between),
            operand: Operand::Range(from.into(), to.into()),
        }
    }

    pub fn not_between(from: impl Into<Param>, to: impl Into<Param>) -> Self {
        Self {
            operator: Operator::Cmp(ComparisonOperator::NotBetween),
            operand: Operand::Range(from.into(), to.into()),
        }
    }

    pub fn is_null() -> Self {
        Self {
            operator: Operator::Cmp(ComparisonOperator::Is),
            operand: Operand::Null,
        }
    }

    pub fn is_not_null() -> Self {
        Self {
            operator: Operator::Cmp(ComparisonOperator::IsNot),
            operand: Operand::Null,
        }
    }

    /// Any operator, emitted verbatim unless it names a known one.
    pub fn custom(op: &str, value: impl Into<Arg>) -> Self {
        Self {
            operator: Operator::parse(op),
            operand: Operand::Arg(Box::new(value.into())),
        }
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }
}
