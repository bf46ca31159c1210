//! Traced prepared statement wrapper.

use super::{TracedRows, annotate_statement, span_names};
use crate::driver::{Statement, Value, statement_type};
use crate::trace::attribute_keys;
use crate::tracking::{Instrumenter, Phase};

/// A [`Statement`] that tracks every call on the wrapped statement.
#[derive(Debug)]
pub struct TracedStatement<S> {
    inner: S,
    instrumenter: Instrumenter,
    statement_type: &'static str,
}

impl<S: Statement> TracedStatement<S> {
    /// Wraps `inner`, classifying its text once.
    pub fn new(inner: S, instrumenter: Instrumenter) -> Self {
        let statement_type = statement_type(inner.sql());
        Self { inner, instrumenter, statement_type }
    }

    /// Returns the statement verb used for the `type` tag.
    pub fn statement_type(&self) -> &'static str {
        self.statement_type
    }

    /// Unwraps the statement.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Statement> Statement for TracedStatement<S> {
    type Error = S::Error;
    type Rows = TracedRows<S::Rows>;

    fn sql(&self) -> &str {
        self.inner.sql()
    }

    fn parameter_count(&self) -> usize {
        self.inner.parameter_count()
    }

    fn bind(&mut self, index: usize, value: Value) -> Result<(), Self::Error> {
        let inner = &mut self.inner;
        let kind = self.statement_type;
        self.instrumenter.instrument_with(span_names::STATEMENT_BIND, "bind", |op| {
            op.record_value_length(value.byte_len(), kind, Phase::Execute);
            inner.bind(index, value)
        })
    }

    fn clear_bindings(&mut self) -> Result<(), Self::Error> {
        let inner = &mut self.inner;
        self.instrumenter
            .instrument(span_names::STATEMENT_CLEAR_BINDINGS, "clear_bindings", || {
                inner.clear_bindings()
            })
    }

    fn execute(&mut self) -> Result<u64, Self::Error> {
        let instrumenter = &self.instrumenter;
        let inner = &mut self.inner;
        let kind = self.statement_type;
        instrumenter.instrument_with(span_names::STATEMENT_EXECUTE, "execute", |op| {
            annotate_statement(instrumenter, op, inner.sql(), kind);
            let affected = inner.execute()?;
            op.set_attribute(attribute_keys::DB_ROWS_AFFECTED, affected);
            Ok(affected)
        })
    }

    fn query(&mut self) -> Result<Self::Rows, Self::Error> {
        let instrumenter = &self.instrumenter;
        let inner = &mut self.inner;
        let kind = self.statement_type;
        instrumenter.instrument_with(span_names::STATEMENT_QUERY, "query", |op| {
            annotate_statement(instrumenter, op, inner.sql(), kind);
            let rows = inner.query()?;
            Ok(TracedRows::new(rows, instrumenter.clone(), kind))
        })
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        let inner = &mut self.inner;
        self.instrumenter.instrument(span_names::STATEMENT_CLOSE, "close", || inner.close())
    }
}
