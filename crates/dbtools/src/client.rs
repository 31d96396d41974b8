//! Connection capability traits.
//!
//! The execution façade never talks to a driver directly. A [`Connector`] opens a
//! [`Connection`] for a [`ConnectionDescriptor`]; the connection executes statements whose
//! values are passed by placeholder name.

use crate::config::ConnectionDescriptor;
use crate::error::DbResult;
use crate::record::Rowset;
use crate::stmt::Parameter;
use std::ops::{Deref, DerefMut};

/// Opens connections to one kind of database.
pub trait Connector {
    type Connection: Connection;

    fn open(&self, descriptor: &ConnectionDescriptor) -> DbResult<Self::Connection>;
}

/// An open connection.
///
/// Drivers that only understand positional placeholders can rewrite the statement with
/// [`ParameterizedStatement::to_positional`](crate::ParameterizedStatement::to_positional)
/// semantics; `sql` uses `@name` placeholders and every name appears in `params`.
pub trait Connection {
    /// Execute a data-changing statement, returning the affected row count.
    fn execute(&mut self, sql: &str, params: &[Parameter]) -> DbResult<u64>;

    /// Execute a row-returning statement.
    fn query(&mut self, sql: &str, params: &[Parameter]) -> DbResult<Rowset>;

    /// Release the connection. Called exactly once by [`ScopedConnection`].
    fn close(&mut self) -> DbResult<()>;
}

impl<C: Connector + ?Sized> Connector for &C {
    type Connection = C::Connection;

    fn open(&self, descriptor: &ConnectionDescriptor) -> DbResult<Self::Connection> {
        (**self).open(descriptor)
    }
}

/// Owns a connection for the duration of one call and closes it on drop.
///
/// A close failure is logged on target `dbtools.sql` and otherwise ignored, so it never
/// replaces the result (or error) of the statement itself.
pub struct ScopedConnection<C: Connection> {
    inner: Option<C>,
}

impl<C: Connection> ScopedConnection<C> {
    pub fn new(conn: C) -> Self {
        Self { inner: Some(conn) }
    }

    /// Open a connection and wrap it.
    pub fn open<K>(connector: &K, descriptor: &ConnectionDescriptor) -> DbResult<Self>
    where
        K: Connector<Connection = C> + ?Sized,
    {
        connector.open(descriptor).map(Self::new)
    }

    /// Close now and report the outcome.
    pub fn close(mut self) -> DbResult<()> {
        match self.inner.take() {
            Some(mut conn) => conn.close(),
            None => Ok(()),
        }
    }
}

impl<C: Connection> Deref for ScopedConnection<C> {
    type Target = C;

    fn deref(&self) -> &C {
        // `inner` is only taken by `close(self)` and `drop`.
        self.inner.as_ref().unwrap_or_else(|| unreachable!("connection already closed"))
    }
}

impl<C: Connection> DerefMut for ScopedConnection<C> {
    fn deref_mut(&mut self) -> &mut C {
        self.inner.as_mut().unwrap_or_else(|| unreachable!("connection already closed"))
    }
}

impl<C: Connection> Drop for ScopedConnection<C> {
    fn drop(&mut self) {
        if let Some(mut conn) = self.inner.take()
            && let Err(e) = conn.close()
        {
            tracing::warn!(target: "dbtools.sql", error = %e, "failed to close connection");
        }
    }
}
