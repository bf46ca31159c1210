//! Traced connection wrapper.

use super::{TracedRows, TracedStatement, annotate_statement, record_values, span_names};
use crate::driver::{Connection, Value, statement_type};
use crate::trace::attribute_keys;
use crate::tracking::{Instrumenter, Phase};

/// A [`Connection`] that tracks every call on the wrapped connection.
///
/// Statements and cursors it returns are traced as well.
#[derive(Debug)]
pub struct TracedConnection<C> {
    inner: C,
    instrumenter: Instrumenter,
}

impl<C> TracedConnection<C> {
    /// Wraps `inner`.
    pub fn new(inner: C, instrumenter: Instrumenter) -> Self {
        Self { inner, instrumenter }
    }

    /// Returns the wrapped connection.
    pub fn get_ref(&self) -> &C {
        &self.inner
    }

    /// Returns the wrapped connection mutably. Calls made through it are
    /// not tracked.
    pub fn get_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Unwraps the connection.
    pub fn into_inner(self) -> C {
        self.inner
    }

    /// Returns the instrumenter.
    pub fn instrumenter(&self) -> &Instrumenter {
        &self.instrumenter
    }
}

impl<C: Connection> TracedConnection<C> {
    fn call<T>(
        &mut self,
        span_name: &'static str,
        method: &'static str,
        f: impl FnOnce(&mut C) -> Result<T, C::Error>,
    ) -> Result<T, C::Error> {
        let inner = &mut self.inner;
        self.instrumenter.instrument(span_name, method, || f(inner))
    }
}

impl<C: Connection> Connection for TracedConnection<C> {
    type Error = C::Error;
    type Statement = TracedStatement<C::Statement>;
    type Rows = TracedRows<C::Rows>;

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, Self::Error> {
        let instrumenter = &self.instrumenter;
        let inner = &mut self.inner;
        let kind = statement_type(sql);
        instrumenter.instrument_with(span_names::CONNECTION_EXECUTE, "execute", |op| {
            annotate_statement(instrumenter, op, sql, kind);
            record_values(op, params, kind, Phase::Execute);
            let affected = inner.execute(sql, params)?;
            op.set_attribute(attribute_keys::DB_ROWS_AFFECTED, affected);
            Ok(affected)
        })
    }

    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Self::Rows, Self::Error> {
        let instrumenter = &self.instrumenter;
        let inner = &mut self.inner;
        let kind = statement_type(sql);
        instrumenter.instrument_with(span_names::CONNECTION_QUERY, "query", |op| {
            annotate_statement(instrumenter, op, sql, kind);
            record_values(op, params, kind, Phase::Execute);
            let rows = inner.query(sql, params)?;
            Ok(TracedRows::new(rows, instrumenter.clone(), kind))
        })
    }

    fn prepare(&mut self, sql: &str) -> Result<Self::Statement, Self::Error> {
        let instrumenter = &self.instrumenter;
        let inner = &mut self.inner;
        let kind = statement_type(sql);
        instrumenter.instrument_with(span_names::CONNECTION_PREPARE, "prepare", |op| {
            annotate_statement(instrumenter, op, sql, kind);
            let statement = inner.prepare(sql)?;
            Ok(TracedStatement::new(statement, instrumenter.clone()))
        })
    }

    fn begin(&mut self) -> Result<(), Self::Error> {
        self.call(span_names::CONNECTION_BEGIN, "begin", C::begin)
    }

    fn commit(&mut self) -> Result<(), Self::Error> {
        self.call(span_names::CONNECTION_COMMIT, "commit", C::commit)
    }

    fn rollback(&mut self) -> Result<(), Self::Error> {
        self.call(span_names::CONNECTION_ROLLBACK, "rollback", C::rollback)
    }

    fn ping(&mut self) -> Result<(), Self::Error> {
        self.call(span_names::CONNECTION_PING, "ping", C::ping)
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        self.call(span_names::CONNECTION_CLOSE, "close", C::close)
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    fn autocommit(&self) -> bool {
        self.inner.autocommit()
    }
}
