//! The database driver interface that traced wrappers decorate.
//!
//! [`Connection`], [`Statement`] and [`Rows`] are the seams: any driver
//! implementing them can be wrapped by [`traced`](crate::traced) without
//! changing its behavior.

mod classify;
mod value;

pub use classify::{STATEMENT_TYPES, statement_type};
pub use value::{Row, Value};

/// A database session.
pub trait Connection {
    /// The driver's error type; returned unchanged through wrappers.
    type Error: std::error::Error;
    /// Prepared statement type.
    type Statement: Statement<Error = Self::Error, Rows = Self::Rows>;
    /// Result cursor type.
    type Rows: Rows<Error = Self::Error>;

    /// Executes `sql` with positional parameters, returning rows affected.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, Self::Error>;

    /// Runs a query, returning a cursor over its rows.
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Self::Rows, Self::Error>;

    /// Prepares a statement for repeated execution.
    fn prepare(&mut self, sql: &str) -> Result<Self::Statement, Self::Error>;

    /// Starts a transaction.
    fn begin(&mut self) -> Result<(), Self::Error>;

    /// Commits the current transaction.
    fn commit(&mut self) -> Result<(), Self::Error>;

    /// Rolls back the current transaction.
    fn rollback(&mut self) -> Result<(), Self::Error>;

    /// Checks the session is alive.
    fn ping(&mut self) -> Result<(), Self::Error>;

    /// Closes the session.
    fn close(&mut self) -> Result<(), Self::Error>;

    /// Returns `true` once the session is closed.
    fn is_closed(&self) -> bool;

    /// Returns `true` when each statement commits on its own.
    fn autocommit(&self) -> bool;
}

/// A prepared statement.
pub trait Statement {
    /// The driver's error type.
    type Error: std::error::Error;
    /// Result cursor type.
    type Rows: Rows<Error = Self::Error>;

    /// Returns the statement text.
    fn sql(&self) -> &str;

    /// Returns the number of positional parameters.
    fn parameter_count(&self) -> usize;

    /// Binds `value` to the zero-based parameter `index`.
    fn bind(&mut self, index: usize, value: Value) -> Result<(), Self::Error>;

    /// Clears all bound parameters.
    fn clear_bindings(&mut self) -> Result<(), Self::Error>;

    /// Executes with the current bindings, returning rows affected.
    fn execute(&mut self) -> Result<u64, Self::Error>;

    /// Queries with the current bindings.
    fn query(&mut self) -> Result<Self::Rows, Self::Error>;

    /// Releases the statement.
    fn close(&mut self) -> Result<(), Self::Error>;
}

/// A forward-only cursor over result rows.
pub trait Rows {
    /// The driver's error type.
    type Error: std::error::Error;

    /// Returns the column names.
    fn columns(&self) -> &[String];

    /// Advances to the next row; `None` once exhausted.
    fn next_row(&mut self) -> Result<Option<Row>, Self::Error>;

    /// Releases the cursor.
    fn close(&mut self) -> Result<(), Self::Error>;
}
