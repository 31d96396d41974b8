//! # dbtools
//!
//! Safe SQL statement construction and generic result materialization.
//!
//! ## Features
//!
//! - **Validated identifiers**: table and column names are checked before they reach SQL text
//! - **Never embeds values**: every value travels as a named placeholder (`@param0`,
//!   `@setParam0`, `@whereParam0`)
//! - **Record reflection**: `#[derive(Reflect)]` turns a struct into column bindings
//! - **Safe defaults**: DELETE requires a condition
//! - **Driver-independent results**: rows come back as [`GenericRecord`]s
//! - **Pluggable drivers**: implement [`Connector`]; a PostgreSQL adapter ships behind the
//!   `postgres` feature
//!
//! ## Example
//!
//! ```ignore
//! use dbtools::prelude::*;
//!
//! #[derive(Reflect)]
//! #[dbtools(table = "users")]
//! struct User {
//!     #[dbtools(id)]
//!     id: i64,
//!     name: String,
//!     email: Option<String>,
//! }
//!
//! let db = Executor::new(PgConnector::new(), ConnectionDescriptor::from_url(&url)?);
//!
//! // INSERT from a record
//! let stmt = reflect(&user, "id", true).insert_into("users")?;
//! db.execute(stmt)?;
//!
//! // SELECT with a bound condition
//! let rows = db.query(
//!     build_select("id,name", "users", "email = @whereParam0")?
//!         .bind("@whereParam0", "j@x.com"),
//! )?;
//!
//! // Export
//! let csv = to_csv(&rows, &CsvOptions::default().show_types(true));
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod exec;
pub mod export;
pub mod ident;
pub mod prelude;
pub mod record;
pub mod reflect;
pub mod stmt;
pub mod value;

#[cfg(feature = "postgres")]
pub mod pg_client;

pub use client::{Connection, Connector, ScopedConnection};
pub use config::ConnectionDescriptor;
pub use error::{DbError, DbResult};
pub use exec::{Executor, execute, query, query_column, query_rowset};
pub use export::{CsvOptions, to_csv};
pub use ident::{Ident, IdentKind, InvalidReason, validate_field_list, validate_identifier};
pub use record::{ColumnMeta, GenericRecord, Rowset, materialize};
pub use reflect::{
    ColumnBinding, FieldDescriptor, Reflect, Reflection, SkippedField, insert_record, reflect,
    reflect_record, reflect_with, update_record,
};
pub use stmt::{
    Parameter, ParameterizedStatement, StatementKind, build_delete, build_insert, build_select,
    build_update,
};
pub use value::{ToValue, Value, ValueError};

#[cfg(feature = "postgres")]
pub use pg_client::{PgConnection, PgConnector};

#[cfg(feature = "derive")]
pub use dbtools_derive::Reflect;
