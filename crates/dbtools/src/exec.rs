//! Execution façade.
//!
//! Each call verifies the statement, opens one connection, runs the statement with its
//! parameters bound by name, and closes the connection on every exit path. Driver errors are
//! returned unchanged: nothing is retried and a failure never becomes an empty result.

use crate::client::{Connection, Connector, ScopedConnection};
use crate::config::ConnectionDescriptor;
use crate::error::DbResult;
use crate::record::{GenericRecord, Rowset, materialize};
use crate::stmt::{Parameter, ParameterizedStatement};
use std::time::Instant;

/// Run a data-changing statement and return the affected row count.
pub fn execute<K>(
    connector: &K,
    descriptor: &ConnectionDescriptor,
    statement: ParameterizedStatement,
) -> DbResult<u64>
where
    K: Connector + ?Sized,
{
    run(connector, descriptor, statement, |conn, sql, params| {
        conn.execute(sql, params)
    })
}

/// Run a row-returning statement and return the driver's rowset.
pub fn query_rowset<K>(
    connector: &K,
    descriptor: &ConnectionDescriptor,
    statement: ParameterizedStatement,
) -> DbResult<Rowset>
where
    K: Connector + ?Sized,
{
    run(connector, descriptor, statement, |conn, sql, params| {
        conn.query(sql, params)
    })
}

/// Run a row-returning statement and materialize every row.
pub fn query<K>(
    connector: &K,
    descriptor: &ConnectionDescriptor,
    statement: ParameterizedStatement,
) -> DbResult<Vec<GenericRecord>>
where
    K: Connector + ?Sized,
{
    query_rowset(connector, descriptor, statement).map(materialize)
}

/// Run a row-returning statement and return the first column of every row as text.
///
/// NULL becomes an empty string; use [`query`] when the distinction matters.
pub fn query_column<K>(
    connector: &K,
    descriptor: &ConnectionDescriptor,
    statement: ParameterizedStatement,
) -> DbResult<Vec<String>>
where
    K: Connector + ?Sized,
{
    let rowset = query_rowset(connector, descriptor, statement)?;
    Ok(rowset
        .into_rows()
        .into_iter()
        .filter_map(|row| row.into_iter().next())
        .map(|v| v.to_string())
        .collect())
}

fn run<K, T>(
    connector: &K,
    descriptor: &ConnectionDescriptor,
    statement: ParameterizedStatement,
    op: impl FnOnce(&mut K::Connection, &str, &[Parameter]) -> DbResult<T>,
) -> DbResult<T>
where
    K: Connector + ?Sized,
{
    statement.verify()?;

    let kind = statement.kind();
    let (sql, params) = statement.into_parts();
    let start = Instant::now();

    let result = ScopedConnection::open(connector, descriptor)
        .and_then(|mut conn| op(&mut *conn, &sql, &params));

    let elapsed_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => tracing::debug!(
            target: "dbtools.sql",
            kind = %kind,
            param_count = params.len(),
            elapsed_ms,
            sql = %sql,
            "statement executed"
        ),
        Err(e) => tracing::debug!(
            target: "dbtools.sql",
            kind = %kind,
            param_count = params.len(),
            elapsed_ms,
            sql = %sql,
            error = %e,
            "statement failed"
        ),
    }

    result
}

/// A connector bound to one descriptor, for repeated calls.
///
/// Holds no mutable state: every call opens and closes its own connection.
///
/// ```ignore
/// let db = Executor::new(PgConnector, ConnectionDescriptor::from_url(&url)?);
/// let rows = db.query(build_select("id,name", "users", "")?)?;
/// ```
#[derive(Debug, Clone)]
pub struct Executor<K> {
    connector: K,
    descriptor: ConnectionDescriptor,
}

impl<K: Connector> Executor<K> {
    pub fn new(connector: K, descriptor: ConnectionDescriptor) -> Self {
        Self {
            connector,
            descriptor,
        }
    }

    pub fn connector(&self) -> &K {
        &self.connector
    }

    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    pub fn execute(&self, statement: ParameterizedStatement) -> DbResult<u64> {
        execute(&self.connector, &self.descriptor, statement)
    }

    pub fn query(&self, statement: ParameterizedStatement) -> DbResult<Vec<GenericRecord>> {
        query(&self.connector, &self.descriptor, statement)
    }

    pub fn query_rowset(&self, statement: ParameterizedStatement) -> DbResult<Rowset> {
        query_rowset(&self.connector, &self.descriptor, statement)
    }

    pub fn query_column(&self, statement: ParameterizedStatement) -> DbResult<Vec<String>> {
        query_column(&self.connector, &self.descriptor, statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::record::ColumnMeta;
    use crate::stmt::{build_delete, build_insert, build_select};
    use crate::value::Value;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Log {
        opened: u32,
        closed: u32,
        calls: Vec<(String, Vec<Parameter>)>,
    }

    struct FakeConnector {
        log: Rc<RefCell<Log>>,
        fail_with: Option<&'static str>,
        refuse: bool,
    }

    impl FakeConnector {
        fn new() -> Self {
            Self {
                log: Rc::default(),
                fail_with: None,
                refuse: false,
            }
        }
    }

    struct FakeConnection {
        log: Rc<RefCell<Log>>,
        fail_with: Option<&'static str>,
    }

    impl Connector for FakeConnector {
        type Connection = FakeConnection;

        fn open(&self, _: &ConnectionDescriptor) -> DbResult<FakeConnection> {
            if self.refuse {
                return Err(DbError::Connection("refused".into()));
            }
            self.log.borrow_mut().opened += 1;
            Ok(FakeConnection {
                log: Rc::clone(&self.log),
                fail_with: self.fail_with,
            })
        }
    }

    impl FakeConnection {
        fn record(&self, sql: &str, params: &[Parameter]) -> DbResult<()> {
            self.log
                .borrow_mut()
                .calls
                .push((sql.to_string(), params.to_vec()));
            match self.fail_with {
                Some(code) => Err(DbError::driver_with_code(code, "rejected")),
                None => Ok(()),
            }
        }
    }

    impl Connection for FakeConnection {
        fn execute(&mut self, sql: &str, params: &[Parameter]) -> DbResult<u64> {
            self.record(sql, params)?;
            Ok(1)
        }

        fn query(&mut self, sql: &str, params: &[Parameter]) -> DbResult<Rowset> {
            self.record(sql, params)?;
            let mut rs = Rowset::new(vec![
                ColumnMeta::new("id", "Int32"),
                ColumnMeta::new("name", "String"),
            ]);
            rs.push_row(vec![Value::Int(1), Value::from("a")])?;
            rs.push_row(vec![Value::Null, Value::from("b")])?;
            Ok(rs)
        }

        fn close(&mut self) -> DbResult<()> {
            self.log.borrow_mut().closed += 1;
            Ok(())
        }
    }

    fn descriptor() -> ConnectionDescriptor {
        ConnectionDescriptor::new("localhost", "test")
    }

    #[test]
    fn execute_passes_params_by_name_and_closes() {
        let connector = FakeConnector::new();
        let stmt = build_insert(&["name", "email"], "users", ["John", "j@x.com"]).unwrap();

        let affected = execute(&connector, &descriptor(), stmt).unwrap();
        assert_eq!(affected, 1);

        let log = connector.log.borrow();
        assert_eq!((log.opened, log.closed), (1, 1));
        let (sql, params) = &log.calls[0];
        assert_eq!(sql, "INSERT INTO users(name,email) VALUES(@param0,@param1)");
        assert_eq!(params[0], Parameter::new("@param0", "John"));
        assert_eq!(params[1].name, "@param1");
    }

    #[test]
    fn driver_error_is_returned_once_and_connection_closed() {
        let connector = FakeConnector {
            fail_with: Some("23505"),
            ..FakeConnector::new()
        };
        let stmt = build_delete("users", "id = @whereParam0")
            .unwrap()
            .bind("@whereParam0", 1);

        let err = execute(&connector, &descriptor(), stmt).unwrap_err();
        assert!(matches!(err, DbError::Driver { code: Some(ref c), .. } if c == "23505"));

        let log = connector.log.borrow();
        assert_eq!(log.calls.len(), 1);
        assert_eq!((log.opened, log.closed), (1, 1));
    }

    #[test]
    fn unbound_placeholder_fails_before_connecting() {
        let connector = FakeConnector::new();
        let stmt = build_select("id", "users", "id = @whereParam0").unwrap();

        let err = query(&connector, &descriptor(), stmt).unwrap_err();
        assert!(matches!(err, DbError::UnboundPlaceholder(_)));
        assert_eq!(connector.log.borrow().opened, 0);
    }

    #[test]
    fn connection_failure_is_reported() {
        let connector = FakeConnector {
            refuse: true,
            ..FakeConnector::new()
        };
        let stmt = build_select("*", "users", "").unwrap();
        let err = query(&connector, &descriptor(), stmt).unwrap_err();
        assert!(matches!(err, DbError::Connection(_)));
    }

    #[test]
    fn query_materializes_rows() {
        let connector = FakeConnector::new();
        let records = query(&connector, &descriptor(), build_select("id,name", "users", "").unwrap())
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].columns(), &["id", "name"]);
        assert!(records[1].get(0).unwrap().is_null());
        assert_eq!(connector.log.borrow().closed, 1);
    }

    #[test]
    fn query_column_renders_first_column() {
        let connector = FakeConnector::new();
        let ids = query_column(&connector, &descriptor(), build_select("id,name", "users", "").unwrap())
            .unwrap();
        assert_eq!(ids, vec!["1".to_string(), String::new()]);
    }

    #[test]
    fn executor_reuses_descriptor_per_call() {
        let db = Executor::new(FakeConnector::new(), descriptor());
        db.query(build_select("id", "users", "").unwrap()).unwrap();
        db.execute(
            build_delete("users", "id = @whereParam0")
                .unwrap()
                .bind("whereParam0", 3),
        )
        .unwrap();

        let log = db.connector().log.borrow();
        assert_eq!((log.opened, log.closed), (2, 2));
        assert_eq!(log.calls[1].1, vec![Parameter::new("@whereParam0", 3)]);
        assert_eq!(db.descriptor().database, "test");
    }
}
