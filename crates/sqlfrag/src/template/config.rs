//! Dialect configuration.
//!
//! A [`TemplateConfig`] is everything a dialect needs: quoting, keywords,
//! operators and one layout per clause and statement type. It is plain data,
//! so new dialects can be shipped as TOML files:
//!
//! ```toml
//! base = "sqlite"            # start from a built-in dialect
//! name = "duckdb"
//! placeholder_style = "dollar"
//!
//! [operators]
//! ilike = "ILIKE"
//!
//! [layouts]
//! truncate = "TRUNCATE {table}"
//! ```
//!
//! Fields that are not present inherit from `base` (PostgreSQL when omitted).

use crate::cache::CacheConfig;
use crate::compiled::PlaceholderStyle;
use crate::error::{Error, Result};
use crate::operator::ComparisonOperator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Layout strings, one per clause and statement type.
///
/// See [`crate::template::Layout`] for the layout syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Grouping of a condition list: slot `clause`.
    pub clause_group: String,
    /// Joiner between conditions: slot `op` (the AND/OR keyword).
    pub clause_operator: String,
    /// Slots `column`, `operator`, `value`.
    pub column_value: String,
    /// Slots `name`, `alias`. Used only when an alias is given.
    pub table_alias: String,
    /// Slots `name`, `alias`. Used only when an alias is given.
    pub column_alias: String,
    /// Slots `column`, `order`.
    pub sort_column: String,
    /// Slot `conds`.
    #[serde(rename = "where")]
    pub where_: String,
    /// Slot `conds`.
    pub on: String,
    /// Slot `columns`.
    pub using: String,
    /// Slots `natural`, `type`, `table`, `on`, `using`.
    pub join: String,
    /// Slot `columns`.
    pub order_by: String,
    /// Slot `columns`.
    pub group_by: String,
    pub select: String,
    pub count: String,
    pub insert: String,
    pub update: String,
    pub delete: String,
    pub truncate: String,
    pub drop_table: String,
    pub drop_database: String,
}

/// Full dialect configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub name: String,

    /// Identifier quoting, slot `ident` (e.g. `"{ident}"`).
    pub identifier_quote: String,
    /// String literal quoting, slot `value` (e.g. `'{value}'`).
    pub value_quote: String,
    /// Replacements applied inside string literals before quoting, for
    /// dialects where a character other than the quote is special
    /// (MySQL: `\` → `\\`).
    #[serde(default)]
    pub value_escapes: Vec<(String, String)>,
    /// Binary literal quoting around hex digits, slot `hex`.
    pub bytes_quote: String,
    /// Separates qualified name parts (`schema.table`).
    pub column_separator: String,
    /// Separates identifiers in lists.
    pub identifier_separator: String,
    /// Separates values in lists.
    pub value_separator: String,

    pub and_keyword: String,
    pub or_keyword: String,
    pub not_keyword: String,
    pub asc_keyword: String,
    pub desc_keyword: String,
    pub distinct_keyword: String,
    pub null_keyword: String,
    pub true_keyword: String,
    pub false_keyword: String,

    /// Operator used in conditions when none is given.
    pub default_operator: String,
    /// Operator used in SET lists.
    pub assignment_operator: String,

    /// Spelling overrides for comparison operators, keyed by
    /// [`ComparisonOperator::name`].
    #[serde(default)]
    pub operators: BTreeMap<String, String>,

    #[serde(default)]
    pub placeholder_style: PlaceholderStyle,

    /// `LIMIT` value meaning "no limit", used when only an offset is given.
    #[serde(default)]
    pub limit_all: Option<String>,

    /// `strftime` format for inline timestamp literals.
    pub timestamp_format: String,

    pub layouts: LayoutConfig,

    /// Compiled-fragment cache sizing.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Built-in dialects usable as a TOML `base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseDialect {
    #[default]
    Postgres,
    Sqlite,
    Mysql,
}

impl BaseDialect {
    pub fn config(self) -> TemplateConfig {
        match self {
            BaseDialect::Postgres => TemplateConfig::postgres(),
            BaseDialect::Sqlite => TemplateConfig::sqlite(),
            BaseDialect::Mysql => TemplateConfig::mysql(),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self::postgres()
    }
}

impl TemplateConfig {
    /// PostgreSQL: `"ident"` quoting and `$n` placeholders.
    pub fn postgres() -> Self {
        Self {
            name: "postgres".to_string(),
            identifier_quote: r#""{ident}""#.to_string(),
            value_quote: "'{value}'".to_string(),
            value_escapes: Vec::new(),
            bytes_quote: r"'\x{hex}'".to_string(),
            column_separator: ".".to_string(),
            identifier_separator: ", ".to_string(),
            value_separator: ", ".to_string(),
            and_keyword: "AND".to_string(),
            or_keyword: "OR".to_string(),
            not_keyword: "NOT".to_string(),
            asc_keyword: "ASC".to_string(),
            desc_keyword: "DESC".to_string(),
            distinct_keyword: "DISTINCT".to_string(),
            null_keyword: "NULL".to_string(),
            true_keyword: "TRUE".to_string(),
            false_keyword: "FALSE".to_string(),
            default_operator: "=".to_string(),
            assignment_operator: "=".to_string(),
            operators: BTreeMap::new(),
            placeholder_style: PlaceholderStyle::Dollar,
            limit_all: None,
            timestamp_format: "%Y-%m-%d %H:%M:%S%.6f%:z".to_string(),
            layouts: LayoutConfig {
                clause_group: "({clause})".to_string(),
                clause_operator: " {op} ".to_string(),
                column_value: "{column} {operator} {value}".to_string(),
                table_alias: "{name} AS {alias}".to_string(),
                column_alias: "{name} AS {alias}".to_string(),
                sort_column: "{column} {order}".to_string(),
                where_: "WHERE {conds}".to_string(),
                on: "ON {conds}".to_string(),
                using: "USING ({columns})".to_string(),
                join: "{natural} {type} JOIN {table} {on} {using}".to_string(),
                order_by: "ORDER BY {columns}".to_string(),
                group_by: "GROUP BY {columns}".to_string(),
                select: "SELECT {distinct} [{columns}|*] [FROM {table}] {joins} {where} \
                         {group_by} {order_by} [LIMIT {limit}] [OFFSET {offset}]"
                    .to_string(),
                count: "SELECT COUNT(1) AS _t FROM {table} {joins} {where} {group_by} \
                        [LIMIT {limit}] [OFFSET {offset}]"
                    .to_string(),
                insert: "INSERT INTO {table} [({columns})] [VALUES {values}|DEFAULT VALUES] \
                         [RETURNING {returning}]"
                    .to_string(),
                update: "UPDATE {table} SET {column_values} {where} [RETURNING {returning}]"
                    .to_string(),
                delete: "DELETE FROM {table} {where} [RETURNING {returning}]".to_string(),
                truncate: "TRUNCATE TABLE {table} RESTART IDENTITY".to_string(),
                drop_table: "DROP TABLE {table}".to_string(),
                drop_database: "DROP DATABASE {database}".to_string(),
            },
            cache: CacheConfig::default(),
        }
    }

    /// SQLite: `"ident"` quoting and `?` placeholders.
    pub fn sqlite() -> Self {
        let mut c = Self::postgres();
        c.name = "sqlite".to_string();
        c.bytes_quote = "X'{hex}'".to_string();
        c.true_keyword = "1".to_string();
        c.false_keyword = "0".to_string();
        c.placeholder_style = PlaceholderStyle::Question;
        c.limit_all = Some("-1".to_string());
        c.timestamp_format = "%Y-%m-%d %H:%M:%S%.f".to_string();
        c.operators = without_ilike_and_tilde();
        c.layouts.truncate = "DELETE FROM {table}".to_string();
        c
    }

    /// MySQL: `` `ident` `` quoting and `?` placeholders.
    pub fn mysql() -> Self {
        let mut c = Self::postgres();
        c.name = "mysql".to_string();
        c.identifier_quote = "`{ident}`".to_string();
        c.value_escapes = vec![("\\".to_string(), "\\\\".to_string())];
        c.bytes_quote = "X'{hex}'".to_string();
        c.placeholder_style = PlaceholderStyle::Question;
        c.limit_all = Some("18446744073709551615".to_string());
        c.timestamp_format = "%Y-%m-%d %H:%M:%S%.6f".to_string();
        c.operators = without_ilike_and_tilde();
        c.layouts.insert = "INSERT INTO {table} [({columns})] [VALUES {values}|VALUES ()]".to_string();
        c.layouts.update =
            "UPDATE {table} SET {column_values} {where} {order_by} [LIMIT {limit}]".to_string();
        c.layouts.delete = "DELETE FROM {table} {where} {order_by} [LIMIT {limit}]".to_string();
        c.layouts.truncate = "TRUNCATE TABLE {table}".to_string();
        c
    }

    /// Parse a TOML dialect description.
    ///
    /// The optional `base` key selects the built-in dialect that provides
    /// every field not present in the document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let mut doc: toml::Table = toml::from_str(source)?;
        let base = match doc.remove("base") {
            Some(v) => BaseDialect::deserialize(v)?,
            None => BaseDialect::default(),
        };

        let encoded = toml::Value::try_from(base.config())
            .map_err(|e| Error::config(format!("failed to encode base dialect: {e}")))?;
        let toml::Value::Table(mut merged) = encoded else {
            return Err(Error::config("base dialect did not encode to a table"));
        };
        merge_tables(&mut merged, doc);

        Ok(toml::Value::Table(merged).try_into()?)
    }

    /// Load a TOML dialect description from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            Error::Config(msg) => {
                Error::config(format!("failed to parse dialect file {}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Set the compiled-fragment cache configuration.
    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Set the placeholder style.
    pub fn placeholder_style(mut self, style: PlaceholderStyle) -> Self {
        self.placeholder_style = style;
        self
    }

    /// Override the spelling of one comparison operator.
    pub fn operator(mut self, op: ComparisonOperator, sql: impl Into<String>) -> Self {
        self.operators.insert(op.name().to_string(), sql.into());
        self
    }
}

/// Dialects without `ILIKE` or the `~` regular expression operators.
fn without_ilike_and_tilde() -> BTreeMap<String, String> {
    [
        (ComparisonOperator::ILike, "LIKE"),
        (ComparisonOperator::NotILike, "NOT LIKE"),
        (ComparisonOperator::RegExp, "REGEXP"),
        (ComparisonOperator::NotRegExp, "NOT REGEXP"),
    ]
    .into_iter()
    .map(|(op, sql)| (op.name().to_string(), sql.to_string()))
    .collect()
}

/// Overlay `patch` onto `base`, recursing into nested tables.
fn merge_tables(base: &mut toml::Table, patch: toml::Table) {
    for (key, value) in patch {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
