//! Convenient imports for typical `dbtools` usage.
//!
//! ```ignore
//! use dbtools::prelude::*;
//! ```

pub use crate::{
    ConnectionDescriptor, CsvOptions, DbError, DbResult, Executor, GenericRecord,
    ParameterizedStatement, Reflect, Value, build_delete, build_insert, build_select,
    build_update, insert_record, materialize, reflect, reflect_record, to_csv, update_record,
};

#[cfg(feature = "postgres")]
pub use crate::PgConnector;
