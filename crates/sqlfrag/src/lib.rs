//! # sqlfrag
//!
//! A dialect-agnostic SQL statement compiler.
//!
//! ## Features
//!
//! - **Fragment AST**: immutable nodes with a memoized structural hash
//! - **Templates**: one [`Template`] per dialect, built from layouts and quoting rules
//!   (Postgres, SQLite and MySQL are built in, custom ones load from TOML)
//! - **Normalizer**: maps, lists, `NULL`, functions and raw SQL become fragments plus
//!   arguments in placeholder order
//! - **Caching**: compiled fragments and statements live in bounded LRU caches
//!
//! ```
//! use sqlfrag::fragment::{Statement, StatementType, Table};
//! use sqlfrag::normalize::{Arg, Term, to_where};
//! use sqlfrag::{Compiler, Param, Template};
//! use std::sync::Arc;
//!
//! let (w, args) = to_where(Term::map([
//!     ("status", Arg::value("active")),
//!     ("deleted_at", Arg::Value(Param::Null)),
//! ]))
//! .unwrap();
//! let stmt = Statement::new(StatementType::Select)
//!     .table(Table::new("users u"))
//!     .where_(w)
//!     .limit(10);
//!
//! let compiler = Compiler::new(Arc::new(Template::postgres()));
//! let query = compiler.compile(&stmt, args).unwrap();
//! assert_eq!(
//!     query.sql,
//!     r#"SELECT * FROM "users" AS "u" WHERE ("status" = $1 AND "deleted_at" IS NULL) LIMIT 10"#
//! );
//! assert_eq!(query.args, vec![Param::Text("active".into())]);
//! ```

pub mod cache;
pub mod compiled;
pub mod compiler;
pub mod error;
pub mod fragment;
pub mod hash;
pub mod normalize;
pub mod operator;
pub mod param;
pub mod template;

pub use cache::{CacheConfig, CacheStats};
pub use compiled::{Compiled, PlaceholderStyle};
pub use compiler::{Compiler, CompilerConfig, Query};
pub use error::{Error, Result};
pub use fragment::Fragment;
pub use hash::FragmentHash;
pub use operator::ComparisonOperator;
pub use param::{Param, ParamList};
pub use template::{BaseDialect, Template, TemplateConfig};
