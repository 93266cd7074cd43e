use super::Fragment;
use crate::compiled::Compiled;
use crate::hash::{FragmentHash, HashCell};
use crate::template::Template;
use std::sync::Arc;

/// Unescaped SQL text.
///
/// Every `?` in the text is a bound placeholder.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Raw {
    sql: String,
    hash: HashCell,
}

impl Raw {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            hash: HashCell::new(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of `?` placeholders in the text.
    pub fn placeholder_count(&self) -> usize {
        self.sql.matches('?').count()
    }

    pub fn is_empty(&self) -> bool {
        self.sql.trim().is_empty()
    }
}

impl Fragment for Raw {
    fn hash(&self) -> &FragmentHash {
        self.hash
            .get_or_init(|| FragmentHash::builder("Raw").str(&self.sql).finish())
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        t.cached(self.hash(), || Compiled::from_sql(self.sql.trim()))
    }
}
