//! Per-dialect templates.
//!
//! A [`Template`] is built once from a [`TemplateConfig`] and then shared by
//! every compilation for that dialect. All layouts are parsed and validated up
//! front, so compiling a fragment can't fail on a bad layout.

mod config;
mod layout;


pub use config::{BaseDialect, LayoutConfig, TemplateConfig};
pub use layout::{Layout, Slots};

use crate::cache::{CacheStats, LruCache};
use crate::compiled::{Compiled, PlaceholderStyle};
use crate::error::{Error, Result};
use crate::hash::FragmentHash;
use crate::operator::ComparisonOperator;
use crate::param::Param;
use chrono::format::{Item, StrftimeItems};
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;

/// Opening and closing text around a quoted item.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Quote {
    open: String,
    close: String,
}

impl Quote {
    fn parse(field: &'static str, source: &str, slot: &str) -> Result<Self> {
        let marker = format!("{{{slot}}}");
        let Some((open, close)) = source.split_once(&marker) else {
            return Err(Error::layout(field, format!("missing '{marker}'")));
        };
        if close.contains(&marker) {
            return Err(Error::layout(field, format!("'{marker}' appears more than once")));
        }
        Ok(Self {
            open: open.to_string(),
            close: close.to_string(),
        })
    }

    /// Wrap `s`, doubling any occurrence of the closing quote.
    fn wrap(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len() + self.open.len() + self.close.len());
        out.push_str(&self.open);
        if self.close.is_empty() {
            out.push_str(s);
        } else {
            let doubled = self.close.repeat(2);
            out.push_str(&s.replace(&self.close, &doubled));
        }
        out.push_str(&self.close);
        out
    }
}

/// Dialect keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keywords {
    pub and: String,
    pub or: String,
    pub not: String,
    pub asc: String,
    pub desc: String,
    pub distinct: String,
    pub null: String,
    pub true_: String,
    pub false_: String,
}

/// Parsed layouts, one per clause and statement type.
#[derive(Debug, Clone)]
pub(crate) struct Layouts {
    pub clause_group: Layout,
    pub column_value: Layout,
    pub table_alias: Layout,
    pub column_alias: Layout,
    pub sort_column: Layout,
    pub where_: Layout,
    pub on: Layout,
    pub using: Layout,
    pub join: Layout,
    pub order_by: Layout,
    pub group_by: Layout,
    pub select: Layout,
    pub count: Layout,
    pub insert: Layout,
    pub update: Layout,
    pub delete: Layout,
    pub truncate: Layout,
    pub drop_table: Layout,
    pub drop_database: Layout,
}

const SELECT_SLOTS: &[&str] = &[
    "distinct", "columns", "table", "joins", "where", "group_by", "order_by", "limit", "offset",
];

impl Layouts {
    fn parse(c: &LayoutConfig) -> Result<Self> {
        Ok(Self {
            clause_group: Layout::parse("clause_group", &c.clause_group, &["clause"])?,
            column_value: Layout::parse(
                "column_value",
                &c.column_value,
                &["column", "operator", "value"],
            )?,
            table_alias: Layout::parse("table_alias", &c.table_alias, &["name", "alias"])?,
            column_alias: Layout::parse("column_alias", &c.column_alias, &["name", "alias"])?,
            sort_column: Layout::parse("sort_column", &c.sort_column, &["column", "order"])?,
            where_: Layout::parse("where", &c.where_, &["conds"])?,
            on: Layout::parse("on", &c.on, &["conds"])?,
            using: Layout::parse("using", &c.using, &["columns"])?,
            join: Layout::parse(
                "join",
                &c.join,
                &["natural", "type", "table", "on", "using"],
            )?,
            order_by: Layout::parse("order_by", &c.order_by, &["columns"])?,
            group_by: Layout::parse("group_by", &c.group_by, &["columns"])?,
            select: Layout::parse("select", &c.select, SELECT_SLOTS)?,
            count: Layout::parse("count", &c.count, SELECT_SLOTS)?,
            insert: Layout::parse(
                "insert",
                &c.insert,
                &["table", "columns", "values", "returning"],
            )?,
            update: Layout::parse(
                "update",
                &c.update,
                &["table", "column_values", "where", "order_by", "limit", "returning"],
            )?,
            delete: Layout::parse(
                "delete",
                &c.delete,
                &["table", "where", "order_by", "limit", "returning"],
            )?,
            truncate: Layout::parse("truncate", &c.truncate, &["table"])?,
            drop_table: Layout::parse("drop_table", &c.drop_table, &["table"])?,
            drop_database: Layout::parse("drop_database", &c.drop_database, &["database"])?,
        })
    }
}

/// A SQL dialect: quoting, keywords, layouts and a compiled-fragment cache.
///
/// `Template` is `Send + Sync`; share one instance per dialect behind an
/// [`Arc`].
#[derive(Debug)]
pub struct Template {
    name: String,
    identifier_quote: Quote,
    value_quote: Quote,
    value_escapes: Vec<(String, String)>,
    bytes_quote: Quote,
    pub(crate) column_separator: String,
    pub(crate) identifier_separator: String,
    pub(crate) value_separator: String,
    keywords: Keywords,
    pub(crate) default_operator: String,
    pub(crate) assignment_operator: String,
    operators: HashMap<ComparisonOperator, String>,
    placeholder_style: PlaceholderStyle,
    pub(crate) limit_all: Option<String>,
    timestamp_format: String,
    pub(crate) and_joiner: String,
    pub(crate) or_joiner: String,
    pub(crate) layouts: Layouts,
    cache: LruCache<FragmentHash, Arc<Compiled>>,
}

impl Template {
    /// Build a template, validating every layout and override.
    pub fn new(config: TemplateConfig) -> Result<Self> {
        let mut operators: HashMap<ComparisonOperator, String> = ComparisonOperator::ALL
            .into_iter()
            .map(|op| (op, op.default_sql().to_string()))
            .collect();
        for (name, sql) in &config.operators {
            let op = ComparisonOperator::from_name(name)
                .ok_or_else(|| Error::config(format!("unknown comparison operator '{name}'")))?;
            if sql.trim().is_empty() {
                return Err(Error::config(format!("operator '{name}' has an empty spelling")));
            }
            operators.insert(op, sql.clone());
        }

        if config.value_escapes.iter().any(|(from, _)| from.is_empty()) {
            return Err(Error::config("value_escapes entries need a non-empty pattern"));
        }

        if StrftimeItems::new(&config.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::config(format!(
                "invalid timestamp_format '{}'",
                config.timestamp_format
            )));
        }

        let joiner = |keyword: &str| -> Result<String> {
            let op = &config.layouts.clause_operator;
            if op.matches("{op}").count() != 1 {
                return Err(Error::layout("clause_operator", "expected exactly one '{op}'"));
            }
            Ok(op.replace("{op}", keyword))
        };
        let and_joiner = joiner(&config.and_keyword)?;
        let or_joiner = joiner(&config.or_keyword)?;

        let layouts = Layouts::parse(&config.layouts)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "sqlfrag",
            dialect = %config.name,
            cache_capacity = config.cache.capacity,
            "template built"
        );

        Ok(Self {
            identifier_quote: Quote::parse("identifier_quote", &config.identifier_quote, "ident")?,
            value_quote: Quote::parse("value_quote", &config.value_quote, "value")?,
            value_escapes: config.value_escapes,
            bytes_quote: Quote::parse("bytes_quote", &config.bytes_quote, "hex")?,
            keywords: Keywords {
                and: config.and_keyword,
                or: config.or_keyword,
                not: config.not_keyword,
                asc: config.asc_keyword,
                desc: config.desc_keyword,
                distinct: config.distinct_keyword,
                null: config.null_keyword,
                true_: config.true_keyword,
                false_: config.false_keyword,
            },
            name: config.name,
            column_separator: config.column_separator,
            identifier_separator: config.identifier_separator,
            value_separator: config.value_separator,
            default_operator: config.default_operator,
            assignment_operator: config.assignment_operator,
            operators,
            placeholder_style: config.placeholder_style,
            limit_all: config.limit_all,
            timestamp_format: config.timestamp_format,
            and_joiner,
            or_joiner,
            layouts,
            cache: LruCache::new(config.cache),
        })
    }

    /// The built-in PostgreSQL dialect.
    pub fn postgres() -> Self {
        Self::new(TemplateConfig::postgres()).expect("invalid built-in postgres template")
    }

    /// The built-in SQLite dialect.
    pub fn sqlite() -> Self {
        Self::new(TemplateConfig::sqlite()).expect("invalid built-in sqlite template")
    }

    /// The built-in MySQL dialect.
    pub fn mysql() -> Self {
        Self::new(TemplateConfig::mysql()).expect("invalid built-in mysql template")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn placeholder_style(&self) -> PlaceholderStyle {
        self.placeholder_style
    }

    pub fn keywords(&self) -> &Keywords {
        &self.keywords
    }

    /// SQL spelling of a comparison operator in this dialect.
    pub fn operator_sql(&self, op: ComparisonOperator) -> &str {
        self.operators
            .get(&op)
            .map_or_else(|| op.default_sql(), String::as_str)
    }

    /// Quote a single identifier.
    pub fn quote_identifier(&self, ident: &str) -> String {
        self.identifier_quote.wrap(ident)
    }

    /// Quote a possibly qualified name (`schema.table`, `t.*`).
    ///
    /// Each dot-separated part is quoted on its own; `*` is left bare.
    pub fn quote_name(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 4);
        for (i, part) in name.split('.').enumerate() {
            if i > 0 {
                out.push_str(&self.column_separator);
            }
            let part = part.trim();
            if part == "*" {
                out.push('*');
            } else {
                out.push_str(&self.identifier_quote.wrap(part));
            }
        }
        out
    }

    /// Quote a string literal, applying the dialect's escapes first.
    pub fn quote_value(&self, value: &str) -> String {
        if self.value_escapes.is_empty() {
            return self.value_quote.wrap(value);
        }
        let mut escaped = String::with_capacity(value.len());
        let mut rest = value;
        'scan: while let Some(ch) = rest.chars().next() {
            for (from, to) in &self.value_escapes {
                if let Some(tail) = rest.strip_prefix(from.as_str()) {
                    escaped.push_str(to);
                    rest = tail;
                    continue 'scan;
                }
            }
            escaped.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
        self.value_quote.wrap(&escaped)
    }

    /// Render a value inline as a SQL literal.
    pub fn render_literal(&self, value: &Param) -> String {
        match value {
            Param::Null => self.keywords.null.clone(),
            Param::Bool(true) => self.keywords.true_.clone(),
            Param::Bool(false) => self.keywords.false_.clone(),
            Param::Int(v) => v.to_string(),
            Param::Float(v) if v.is_finite() => v.to_string(),
            Param::Float(v) => self.quote_value(&v.to_string()),
            Param::Text(v) => self.quote_value(v),
            Param::Bytes(v) => {
                let mut hex = String::with_capacity(v.len() * 2);
                for b in v {
                    let _ = write!(hex, "{b:02x}");
                }
                // Hex digits never contain a quote character.
                format!("{}{}{}", self.bytes_quote.open, hex, self.bytes_quote.close)
            }
            Param::Json(v) => self.quote_value(&v.to_string()),
            Param::Uuid(v) => self.quote_value(&v.to_string()),
            Param::Timestamp(v) => {
                self.quote_value(&v.format(&self.timestamp_format).to_string())
            }
        }
    }

    /// Return the cached compilation for `hash`, building it on a miss.
    pub fn cached(&self, hash: &FragmentHash, build: impl FnOnce() -> Compiled) -> Arc<Compiled> {
        if let Some(hit) = self.cache.get(hash) {
            #[cfg(feature = "tracing")]
            tracing::trace!(target: "sqlfrag", hash = %hash, "fragment cache hit");
            return hit;
        }
        let compiled = Arc::new(build());
        self.cache.insert_if_absent(hash.clone(), compiled)
    }

    /// Drop every cached compilation.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
