//! Traced result cursor wrapper.

use super::{record_values, span_names};
use crate::driver::{Row, Rows};
use crate::tracking::{Instrumenter, Phase};

/// A [`Rows`] cursor that tracks every fetch on the wrapped cursor.
///
/// Fetched values are recorded under `phase = fetch`.
#[derive(Debug)]
pub struct TracedRows<R> {
    inner: R,
    instrumenter: Instrumenter,
    statement_type: &'static str,
}

impl<R> TracedRows<R> {
    /// Wraps `inner`; `statement_type` tags fetched value sizes.
    pub fn new(inner: R, instrumenter: Instrumenter, statement_type: &'static str) -> Self {
        Self { inner, instrumenter, statement_type }
    }

    /// Unwraps the cursor.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Rows> Rows for TracedRows<R> {
    type Error = R::Error;

    fn columns(&self) -> &[String] {
        self.inner.columns()
    }

    fn next_row(&mut self) -> Result<Option<Row>, Self::Error> {
        let inner = &mut self.inner;
        let kind = self.statement_type;
        self.instrumenter.instrument_with(span_names::ROWS_NEXT, "next", |op| {
            let row = inner.next_row()?;
            if let Some(row) = &row {
                record_values(op, row, kind, Phase::Fetch);
            }
            Ok(row)
        })
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        let inner = &mut self.inner;
        self.instrumenter.instrument(span_names::ROWS_CLOSE, "close", || inner.close())
    }
}
