//! Statement compilation for adapters.
//!
//! A [`Compiler`] pairs a shared [`Template`] with a cache of fully rendered
//! statements, and turns a [`Statement`] plus its normalized arguments into a
//! [`Query`] a driver can execute.

use crate::cache::{CacheConfig, CacheStats, LruCache};
use crate::error::{Error, Result};
use crate::fragment::{Fragment, Statement};
use crate::hash::FragmentHash;
use crate::param::{Param, ParamList};
use crate::template::Template;
use std::sync::Arc;

/// Configuration for [`Compiler`].
#[derive(Debug, Clone, Copy)]
pub struct CompilerConfig {
    /// Cache of rendered statements, keyed by statement hash.
    pub statement_cache: CacheConfig,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            statement_cache: CacheConfig::new().capacity(CacheConfig::DEFAULT_STATEMENT_CAPACITY),
        }
    }
}

impl CompilerConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the statement cache configuration.
    pub fn statement_cache(mut self, cache: CacheConfig) -> Self {
        self.statement_cache = cache;
        self
    }
}

/// SQL text and the arguments for its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub sql: String,
    pub args: Vec<Param>,
}

impl Query {
    /// Arguments as driver parameters.
    #[cfg(feature = "postgres")]
    pub fn params_ref(&self) -> Vec<&(dyn tokio_postgres::types::ToSql + Sync)> {
        self.args
            .iter()
            .map(|p| p as &(dyn tokio_postgres::types::ToSql + Sync))
            .collect()
    }
}

#[derive(Debug, Clone)]
struct Rendered {
    sql: Arc<str>,
    placeholders: usize,
}

/// Compiles statements for one dialect.
#[derive(Debug)]
pub struct Compiler {
    template: Arc<Template>,
    statements: LruCache<FragmentHash, Rendered>,
}

impl Compiler {
    pub fn new(template: Arc<Template>) -> Self {
        Self::with_config(template, CompilerConfig::default())
    }

    pub fn with_config(template: Arc<Template>, config: CompilerConfig) -> Self {
        Self {
            template,
            statements: LruCache::new(config.statement_cache),
        }
    }

    pub fn template(&self) -> &Arc<Template> {
        &self.template
    }

    /// Render a statement's SQL in the dialect's placeholder style.
    pub fn sql(&self, stmt: &Statement) -> Result<Arc<str>> {
        Ok(self.render(stmt)?.sql)
    }

    /// Render a statement and pair it with its arguments.
    ///
    /// Fails when the number of placeholders in the SQL differs from the
    /// number of arguments.
    pub fn compile(&self, stmt: &Statement, args: ParamList) -> Result<Query> {
        let rendered = self.render(stmt)?;
        if rendered.placeholders != args.len() {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                target: "sqlfrag",
                statement = %stmt.kind(),
                placeholders = rendered.placeholders,
                args = args.len(),
                sql = %rendered.sql,
                "placeholder/argument count mismatch"
            );
            return Err(Error::PlaceholderMismatch {
                placeholders: rendered.placeholders,
                args: args.len(),
            });
        }
        Ok(Query {
            sql: rendered.sql.to_string(),
            args: args.into_vec(),
        })
    }

    fn render(&self, stmt: &Statement) -> Result<Rendered> {
        stmt.validate()?;
        let hash = stmt.hash();

        if let Some(hit) = self.statements.get(hash) {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target: "sqlfrag",
                statement = %stmt.kind(),
                hash = %hash,
                placeholders = hit.placeholders,
                cache_hit = true,
                "compiled statement"
            );
            return Ok(hit);
        }

        let compiled = stmt.compile(&self.template);
        let rendered = Rendered {
            sql: Arc::from(compiled.render(self.template.placeholder_style())),
            placeholders: compiled.param_count(),
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "sqlfrag",
            statement = %stmt.kind(),
            hash = %hash,
            placeholders = rendered.placeholders,
            cache_hit = false,
            "compiled statement"
        );
        Ok(self.statements.insert_if_absent(hash.clone(), rendered))
    }

    /// Statement cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.statements.stats()
    }

    /// Drop cached statements and the template's cached fragments.
    pub fn clear_cache(&self) {
        self.statements.clear();
        self.template.clear_cache();
    }
}
