//! PostgreSQL connections over `tokio-postgres`.
//!
//! The library API is synchronous. Each [`PgConnection`] owns a current-thread tokio runtime
//! and blocks on it for every call; the runtime is dropped with the connection. Do not use
//! these connections from inside another tokio runtime.
//!
//! # Example
//!
//! ```ignore
//! use dbtools::pg_client::PgConnector;
//! use dbtools::{ConnectionDescriptor, Executor, build_select};
//!
//! let descriptor = ConnectionDescriptor::from_url(&std::env::var("DATABASE_URL")?)?;
//! let db = Executor::new(PgConnector::new(), descriptor);
//!
//! let users = db.query(
//!     build_select("id,name", "users", "status = @whereParam0")?.bind("@whereParam0", "active"),
//! )?;
//! ```

mod types;


pub use types::decode_row;

use crate::client::{Connection, Connector};
use crate::config::ConnectionDescriptor;
use crate::error::{DbError, DbResult};
use crate::record::{ColumnMeta, Rowset};
use crate::stmt::{Parameter, rewrite_positional};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};

/// Opens [`PgConnection`]s without TLS.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnector;

impl PgConnector {
    pub fn new() -> Self {
        Self
    }
}

/// Build a `tokio_postgres::Config` from a descriptor. Empty user/password are left unset.
pub fn pg_config(descriptor: &ConnectionDescriptor) -> tokio_postgres::Config {
    let mut config = tokio_postgres::Config::new();
    config
        .host(&descriptor.host)
        .port(descriptor.port)
        .dbname(&descriptor.database);
    if !descriptor.user.is_empty() {
        config.user(&descriptor.user);
    }
    if !descriptor.password.is_empty() {
        config.password(&descriptor.password);
    }
    config
}

impl Connector for PgConnector {
    type Connection = PgConnection;

    fn open(&self, descriptor: &ConnectionDescriptor) -> DbResult<PgConnection> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DbError::Connection(format!("failed to start runtime: {e}")))?;

        let config = pg_config(descriptor);
        let (client, connection) = runtime
            .block_on(config.connect(NoTls))
            .map_err(|e| DbError::Connection(e.to_string()))?;

        let driver = runtime.spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(target: "dbtools.sql", error = %e, "postgres connection error");
            }
        });

        tracing::trace!(
            target: "dbtools.sql",
            host = %descriptor.host,
            port = descriptor.port,
            database = %descriptor.database,
            "opened postgres connection"
        );

        Ok(PgConnection {
            runtime,
            client: Some(client),
            driver: Some(driver),
        })
    }
}

/// One PostgreSQL session.
pub struct PgConnection {
    runtime: Runtime,
    client: Option<Client>,
    driver: Option<JoinHandle<()>>,
}

impl PgConnection {
    fn client(&self) -> DbResult<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| DbError::Connection("connection is closed".to_string()))
    }
}

/// Rewrite to `$n` placeholders and collect the driver parameter list.
fn positional<'p>(
    sql: &str,
    params: &'p [Parameter],
) -> DbResult<(String, Vec<&'p (dyn ToSql + Sync)>)> {
    let (sql, values) = rewrite_positional(sql, params, |i| format!("${i}"))?;
    let values = values
        .into_iter()
        .map(|v| v as &(dyn ToSql + Sync))
        .collect();
    Ok((sql, values))
}

impl Connection for PgConnection {
    fn execute(&mut self, sql: &str, params: &[Parameter]) -> DbResult<u64> {
        let (sql, values) = positional(sql, params)?;
        let client = self.client()?;
        self.runtime
            .block_on(client.execute(sql.as_str(), &values))
            .map_err(DbError::from_pg_error)
    }

    fn query(&mut self, sql: &str, params: &[Parameter]) -> DbResult<Rowset> {
        let (sql, values) = positional(sql, params)?;
        let client = self.client()?;

        let (columns, rows) = self
            .runtime
            .block_on(async {
                let statement = client.prepare(&sql).await?;
                let rows = client.query(&statement, &values).await?;
                let columns: Vec<ColumnMeta> = statement
                    .columns()
                    .iter()
                    .map(|c| ColumnMeta::new(c.name(), c.type_().name()))
                    .collect();
                Ok::<_, tokio_postgres::Error>((columns, rows))
            })
            .map_err(DbError::from_pg_error)?;

        let mut rowset = Rowset::new(columns);
        for row in &rows {
            rowset.push_row(decode_row(row)?)?;
        }
        Ok(rowset)
    }

    fn close(&mut self) -> DbResult<()> {
        // Dropping the client ends the connection task.
        drop(self.client.take());
        match self.driver.take() {
            Some(handle) => self
                .runtime
                .block_on(handle)
                .map_err(|e| DbError::Connection(format!("connection task failed: {e}"))),
            None => Ok(()),
        }
    }
}
