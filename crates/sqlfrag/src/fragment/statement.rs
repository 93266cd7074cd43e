use super::{
    ColumnValues, Columns, Database, Fragment, GroupBy, Joins, OrderBy, Raw, Returning, Table,
    ValueGroups, Where,
};
use crate::compiled::Compiled;
use crate::error::{Error, Result};
use crate::hash::{FragmentHash, HashCell};
use crate::template::{Layout, Template};
use std::fmt;
use std::sync::Arc;

/// What a [`Statement`] compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementType {
    Select,
    Insert,
    Update,
    Delete,
    Truncate,
    DropTable,
    DropDatabase,
    Count,
    /// The statement's raw SQL, verbatim.
    SqlRaw,
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatementType::Select => "SELECT",
            StatementType::Insert => "INSERT",
            StatementType::Update => "UPDATE",
            StatementType::Delete => "DELETE",
            StatementType::Truncate => "TRUNCATE",
            StatementType::DropTable => "DROP TABLE",
            StatementType::DropDatabase => "DROP DATABASE",
            StatementType::Count => "COUNT",
            StatementType::SqlRaw => "SQL",
        })
    }
}

/// The root fragment.
///
/// Build it with the consuming setters; parts a statement type doesn't use
/// are ignored by its layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    kind: StatementType,
    table: Option<Table>,
    database: Option<Database>,
    columns: Option<Columns>,
    values: Option<ValueGroups>,
    column_values: Option<ColumnValues>,
    where_: Option<Where>,
    order_by: Option<OrderBy>,
    group_by: Option<GroupBy>,
    joins: Option<Joins>,
    returning: Option<Returning>,
    limit: Option<u64>,
    offset: Option<u64>,
    distinct: bool,
    sql: Option<Raw>,
    hash: HashCell,
}

impl Statement {
    pub fn new(kind: StatementType) -> Self {
        Self {
            kind,
            table: None,
            database: None,
            columns: None,
            values: None,
            column_values: None,
            where_: None,
            order_by: None,
            group_by: None,
            joins: None,
            returning: None,
            limit: None,
            offset: None,
            distinct: false,
            sql: None,
            hash: HashCell::new(),
        }
    }

    /// A statement that compiles to `sql` verbatim.
    pub fn raw(sql: Raw) -> Self {
        Self::new(StatementType::SqlRaw).sql(sql)
    }

    pub fn kind(&self) -> StatementType {
        self.kind
    }

    pub fn table(mut self, table: Table) -> Self {
        self.table = Some(table);
        self.reset()
    }

    pub fn database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self.reset()
    }

    pub fn columns(mut self, columns: Columns) -> Self {
        self.columns = Some(columns);
        self.reset()
    }

    pub fn values(mut self, values: ValueGroups) -> Self {
        self.values = Some(values);
        self.reset()
    }

    pub fn column_values(mut self, column_values: ColumnValues) -> Self {
        self.column_values = Some(column_values);
        self.reset()
    }

    pub fn where_(mut self, where_: Where) -> Self {
        self.where_ = Some(where_);
        self.reset()
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self.reset()
    }

    pub fn group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = Some(group_by);
        self.reset()
    }

    pub fn joins(mut self, joins: Joins) -> Self {
        self.joins = Some(joins);
        self.reset()
    }

    pub fn returning(mut self, returning: Returning) -> Self {
        self.returning = Some(returning);
        self.reset()
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self.reset()
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self.reset()
    }

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self.reset()
    }

    pub fn sql(mut self, sql: Raw) -> Self {
        self.sql = Some(sql);
        self.reset()
    }

    fn reset(mut self) -> Self {
        self.hash = HashCell::new();
        self
    }

    /// Check that the parts this statement type needs are present.
    pub fn validate(&self) -> Result<()> {
        let has_table = self.table.as_ref().is_some_and(|t| !t.is_empty());
        let missing = |what: &str| Err(Error::EmptyStatement(format!("{} requires {what}", self.kind)));

        match self.kind {
            StatementType::Select => {
                let has_columns = self.columns.as_ref().is_some_and(|c| !c.is_empty());
                if !has_table && !has_columns {
                    return missing("a table or columns");
                }
            }
            StatementType::Insert => {
                if !has_table {
                    return missing("a table");
                }
                let has_columns = self.columns.as_ref().is_some_and(|c| !c.is_empty());
                if has_columns && self.values.as_ref().is_none_or(ValueGroups::is_empty) {
                    return missing("values for its columns");
                }
            }
            StatementType::Delete
            | StatementType::Truncate
            | StatementType::DropTable
            | StatementType::Count => {
                if !has_table {
                    return missing("a table");
                }
            }
            StatementType::Update => {
                if !has_table {
                    return missing("a table");
                }
                if self.column_values.as_ref().is_none_or(|cv| cv.is_empty()) {
                    return missing("column values");
                }
            }
            StatementType::DropDatabase => {
                if self.database.as_ref().is_none_or(|d| d.name().trim().is_empty()) {
                    return missing("a database");
                }
            }
            StatementType::SqlRaw => {
                if self.sql.as_ref().is_none_or(Raw::is_empty) {
                    return missing("SQL text");
                }
            }
        }
        Ok(())
    }

    fn layout<'t>(&self, t: &'t Template) -> Option<&'t Layout> {
        let l = &t.layouts;
        Some(match self.kind {
            StatementType::Select => &l.select,
            StatementType::Count => &l.count,
            StatementType::Insert => &l.insert,
            StatementType::Update => &l.update,
            StatementType::Delete => &l.delete,
            StatementType::Truncate => &l.truncate,
            StatementType::DropTable => &l.drop_table,
            StatementType::DropDatabase => &l.drop_database,
            StatementType::SqlRaw => return None,
        })
    }

    fn build(&self, t: &Template) -> Compiled {
        let Some(layout) = self.layout(t) else {
            return self
                .sql
                .as_ref()
                .map(|sql| (*sql.compile(t)).clone())
                .unwrap_or_default();
        };

        // Parts the layout never renders are not compiled.
        let child = |slot: &str, f: Option<&dyn Fragment>| match f {
            Some(f) if layout.uses(slot) => f.compile(t),
            _ => Arc::default(),
        };
        fn part<F: Fragment>(f: &Option<F>) -> Option<&dyn Fragment> {
            f.as_ref().map(|f| f as &dyn Fragment)
        }

        let limit = match (self.limit, self.offset, &t.limit_all) {
            (Some(n), _, _) => Compiled::text(n.to_string()),
            (None, Some(_), Some(all)) => Compiled::text(all.as_str()),
            _ => Compiled::new(),
        };
        let offset = self
            .offset
            .map(|n| Compiled::text(n.to_string()))
            .unwrap_or_default();
        let distinct = if self.distinct {
            Compiled::text(t.keywords().distinct.as_str())
        } else {
            Compiled::new()
        };

        let table = child("table", part(&self.table));
        let database = child("database", part(&self.database));
        let columns = child("columns", part(&self.columns));
        let values = child("values", part(&self.values));
        let column_values = child("column_values", part(&self.column_values));
        let where_ = child("where", part(&self.where_));
        let order_by = child("order_by", part(&self.order_by));
        let group_by = child("group_by", part(&self.group_by));
        let joins = child("joins", part(&self.joins));
        let returning = child("returning", part(&self.returning));

        layout.render(&[
            ("distinct", &distinct),
            ("table", &*table),
            ("database", &*database),
            ("columns", &*columns),
            ("values", &*values),
            ("column_values", &*column_values),
            ("where", &*where_),
            ("order_by", &*order_by),
            ("group_by", &*group_by),
            ("joins", &*joins),
            ("returning", &*returning),
            ("limit", &limit),
            ("offset", &offset),
        ])
    }
}

impl Fragment for Statement {
    fn hash(&self) -> &FragmentHash {
        self.hash.get_or_init(|| {
            let mut h = FragmentHash::builder("Statement");
            h.tag(self.kind as u8)
                .opt_child(self.table.as_ref().map(Fragment::hash))
                .opt_child(self.database.as_ref().map(Fragment::hash))
                .opt_child(self.columns.as_ref().map(Fragment::hash))
                .opt_child(self.values.as_ref().map(Fragment::hash))
                .opt_child(self.column_values.as_ref().map(Fragment::hash))
                .opt_child(self.where_.as_ref().map(Fragment::hash))
                .opt_child(self.order_by.as_ref().map(Fragment::hash))
                .opt_child(self.group_by.as_ref().map(Fragment::hash))
                .opt_child(self.joins.as_ref().map(Fragment::hash))
                .opt_child(self.returning.as_ref().map(Fragment::hash))
                .opt_child(self.sql.as_ref().map(Fragment::hash))
                .bool(self.distinct);
            for n in [self.limit, self.offset] {
                match n {
                    Some(n) => h.tag(1).u64(n),
                    None => h.tag(0),
                };
            }
            h.finish()
        })
    }

    fn compile(&self, t: &Template) -> Arc<Compiled> {
        t.cached(self.hash(), || self.build(t))
    }
}
