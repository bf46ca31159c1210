//! Instrumented decorators over the [`driver`](crate::driver) traits.
//!
//! Each wrapper implements the same trait as the value it wraps, so it can
//! be dropped in wherever the plain driver was used. Every fallible call
//! runs through [`Instrumenter::instrument_with`]; results and errors pass
//! through unchanged. Accessors with no failure mode (`is_closed`,
//! `autocommit`, `sql`, `parameter_count`, `columns`) call the delegate
//! directly.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use dbcensus::driver::{Connection, Value};
//! use dbcensus::stats::InMemoryStats;
//! use dbcensus::testing::MockConnection;
//! use dbcensus::{Instrumenter, traced::TracedConnection};
//!
//! let stats = InMemoryStats::new();
//! let instrumenter = Instrumenter::builder().recorder(Arc::new(stats.clone())).build()?;
//! instrumenter.registry().register_all_views(&stats)?;
//!
//! let mut conn = TracedConnection::new(MockConnection::new(), instrumenter);
//! conn.execute("UPDATE t SET a = ?", &[Value::Integer(1)]).unwrap();
//!
//! let calls = stats.samples_for("sql/client/calls");
//! assert_eq!(calls[0].tag("method"), Some("execute"));
//! # Ok::<(), dbcensus::Error>(())
//! ```

mod connection;
mod rows;
mod statement;

pub use connection::TracedConnection;
pub use rows::TracedRows;
pub use statement::TracedStatement;

use crate::driver::Value;
use crate::tracking::{Instrumenter, Phase, TrackingOperation};
use crate::trace::attribute_keys;

/// Span names used by the traced wrappers.
pub mod span_names {
    /// [`Connection::execute`](crate::driver::Connection::execute)
    pub const CONNECTION_EXECUTE: &str = "Connection.execute";
    /// [`Connection::query`](crate::driver::Connection::query)
    pub const CONNECTION_QUERY: &str = "Connection.query";
    /// [`Connection::prepare`](crate::driver::Connection::prepare)
    pub const CONNECTION_PREPARE: &str = "Connection.prepare";
    /// [`Connection::begin`](crate::driver::Connection::begin)
    pub const CONNECTION_BEGIN: &str = "Connection.begin";
    /// [`Connection::commit`](crate::driver::Connection::commit)
    pub const CONNECTION_COMMIT: &str = "Connection.commit";
    /// [`Connection::rollback`](crate::driver::Connection::rollback)
    pub const CONNECTION_ROLLBACK: &str = "Connection.rollback";
    /// [`Connection::ping`](crate::driver::Connection::ping)
    pub const CONNECTION_PING: &str = "Connection.ping";
    /// [`Connection::close`](crate::driver::Connection::close)
    pub const CONNECTION_CLOSE: &str = "Connection.close";
    /// [`Statement::bind`](crate::driver::Statement::bind)
    pub const STATEMENT_BIND: &str = "Statement.bind";
    /// [`Statement::clear_bindings`](crate::driver::Statement::clear_bindings)
    pub const STATEMENT_CLEAR_BINDINGS: &str = "Statement.clear_bindings";
    /// [`Statement::execute`](crate::driver::Statement::execute)
    pub const STATEMENT_EXECUTE: &str = "Statement.execute";
    /// [`Statement::query`](crate::driver::Statement::query)
    pub const STATEMENT_QUERY: &str = "Statement.query";
    /// [`Statement::close`](crate::driver::Statement::close)
    pub const STATEMENT_CLOSE: &str = "Statement.close";
    /// [`Rows::next_row`](crate::driver::Rows::next_row)
    pub const ROWS_NEXT: &str = "Rows.next";
    /// [`Rows::close`](crate::driver::Rows::close)
    pub const ROWS_CLOSE: &str = "Rows.close";
}

/// Tags the span with the statement verb, optionally its text, and records
/// the text length.
fn annotate_statement(
    instrumenter: &Instrumenter,
    op: &mut TrackingOperation,
    sql: &str,
    statement_type: &'static str,
) {
    op.set_attribute(attribute_keys::DB_OPERATION, statement_type);
    if instrumenter.config().trace_statement_text {
        op.set_attribute(attribute_keys::DB_STATEMENT, sql);
    }
    op.record_key_length(sql.len(), statement_type, Phase::Execute);
}

fn record_values<'a>(
    op: &TrackingOperation,
    values: impl IntoIterator<Item = &'a Value>,
    statement_type: &'static str,
    phase: Phase,
) {
    for value in values {
        op.record_value_length(value.byte_len(), statement_type, phase);
    }
}
