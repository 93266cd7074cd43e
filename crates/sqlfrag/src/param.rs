//! Argument values bound to placeholders.
//!
//! [`Param`] is a dialect-neutral scalar. The compiler never renders a `Param`
//! passed as an argument into SQL text; it only ever emits a placeholder for
//! it and appends it to a [`ParamList`] in placeholder order.

use crate::hash::HashBuilder;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A scalar argument value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Param {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl Param {
    /// Check if this value is SQL `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, Param::Null)
    }

    /// Feed a canonical representation of this value into a structural hash.
    pub(crate) fn hash_into(&self, h: &mut HashBuilder) {
        match self {
            Param::Null => {
                h.tag(0);
            }
            Param::Bool(v) => {
                h.tag(1);
                h.bool(*v);
            }
            Param::Int(v) => {
                h.tag(2);
                h.u64(*v as u64);
            }
            Param::Float(v) => {
                h.tag(3);
                h.u64(v.to_bits());
            }
            Param::Text(v) => {
                h.tag(4);
                h.str(v);
            }
            Param::Bytes(v) => {
                h.tag(5);
                h.bytes(v);
            }
            Param::Json(v) => {
                h.tag(6);
                h.str(&v.to_string());
            }
            Param::Uuid(v) => {
                h.tag(7);
                h.bytes(v.as_bytes());
            }
            Param::Timestamp(v) => {
                h.tag(8);
                h.u64(v.timestamp() as u64);
                h.u64(u64::from(v.timestamp_subsec_nanos()));
            }
        }
    }
}

macro_rules! impl_from_param {
    ($($ty:ty => $variant:ident $(as $cast:ty)?),* $(,)?) => {
        $(
            impl From<$ty> for Param {
                fn from(v: $ty) -> Self {
                    Param::$variant(v $(as $cast)?)
                }
            }
        )*
    };
}

impl_from_param! {
    bool => Bool,
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int,
    u8 => Int as i64,
    u16 => Int as i64,
    u32 => Int as i64,
    f32 => Float as f64,
    f64 => Float,
    String => Text,
    Vec<u8> => Bytes,
    serde_json::Value => Json,
    Uuid => Uuid,
    DateTime<Utc> => Timestamp,
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(v.to_string())
    }
}

impl From<&String> for Param {
    fn from(v: &String) -> Self {
        Param::Text(v.clone())
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Param::Null,
        }
    }
}

/// An ordered collection of arguments.
///
/// The order of a `ParamList` is the order of the placeholders in the SQL it
/// was built alongside.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamList {
    params: Vec<Param>,
}

impl ParamList {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a parameter and return its 1-based index.
    pub fn push(&mut self, value: impl Into<Param>) -> usize {
        self.params.push(value.into());
        self.params.len()
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Borrow the parameters in placeholder order.
    pub fn as_slice(&self) -> &[Param] {
        &self.params
    }

    /// Move another list's parameters to the end of this one.
    pub fn append(&mut self, other: ParamList) {
        self.params.extend(other.params);
    }

    /// Extend this list with parameters from an iterator.
    pub fn extend_params(&mut self, params: impl IntoIterator<Item = Param>) {
        self.params.extend(params);
    }

    /// Take the parameters out of the list.
    pub fn into_vec(self) -> Vec<Param> {
        self.params
    }
}

impl From<Vec<Param>> for ParamList {
    fn from(params: Vec<Param>) -> Self {
        Self { params }
    }
}

impl FromIterator<Param> for ParamList {
    fn from_iter<I: IntoIterator<Item = Param>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ParamList {
    type Item = Param;
    type IntoIter = std::vec::IntoIter<Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.into_iter()
    }
}

#[cfg(feature = "postgres")]
mod postgres {
    use super::Param;
    use bytes::BytesMut;
    use std::error::Error;
    use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

    impl ToSql for Param {
        fn to_sql(
            &self,
            ty: &Type,
            out: &mut BytesMut,
        ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
            match self {
                Param::Null => Ok(IsNull::Yes),
                Param::Bool(v) => v.to_sql_checked(ty, out),
                // Narrow integers to the column width Postgres asks for.
                Param::Int(v) => match *ty {
                    Type::INT2 => i16::try_from(*v)?.to_sql_checked(ty, out),
                    Type::INT4 => i32::try_from(*v)?.to_sql_checked(ty, out),
                    _ => v.to_sql_checked(ty, out),
                },
                Param::Float(v) => match *ty {
                    Type::FLOAT4 => (*v as f32).to_sql_checked(ty, out),
                    _ => v.to_sql_checked(ty, out),
                },
                Param::Text(v) => v.to_sql_checked(ty, out),
                Param::Bytes(v) => v.to_sql_checked(ty, out),
                Param::Json(v) => v.to_sql_checked(ty, out),
                Param::Uuid(v) => v.to_sql_checked(ty, out),
                Param::Timestamp(v) => match *ty {
                    Type::TIMESTAMP => v.naive_utc().to_sql_checked(ty, out),
                    _ => v.to_sql_checked(ty, out),
                },
            }
        }

        fn accepts(_ty: &Type) -> bool {
            // The concrete check happens per variant in `to_sql`.
            true
        }

        to_sql_checked!();
    }
}
