use super::{Fragment, quote_aliased};
use crate::compiled::Compiled;
use crate::hash::{FragmentHash, HashCell};
use crate::template::Template;
use std::sync::Arc;

/// One or more comma-separated table names.
///
/// Each name may be qualified (`schema.users`) and aliased (`users AS u` or
/// `users u`).
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    hash: HashCell,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hash: HashCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
    }
}

impl Fragment for Table {
    fn hash(&self) -> &FragmentHash {
        self.hash
            .get_or_init(|| FragmentHash::builder("Table").str(&self.name).finish())
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        t.cached(self.hash(), || {
            let mut out = Compiled::new();
            for (i, part) in self
                .name
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .enumerate()
            {
                if i > 0 {
                    out.push_str(&t.identifier_separator);
                }
                out.append(&quote_aliased(t, part, &t.layouts.table_alias));
            }
            out
        })
    }
}

/// A database name.
#[derive(Debug, Clone, PartialEq)]
pub struct Database {
    name: String,
    hash: HashCell,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hash: HashCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Fragment for Database {
    fn hash(&self) -> &FragmentHash {
        self.hash
            .get_or_init(|| FragmentHash::builder("Database").str(&self.name).finish())
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        t.cached(self.hash(), || {
            Compiled::text(t.quote_identifier(self.name.trim()))
        })
    }
}
