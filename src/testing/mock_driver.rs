//! A scriptable in-process driver.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::driver::{Connection, Row, Rows, Statement, Value};

/// Error returned by the mock driver.
///
/// Displays as `MockError: <message>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("MockError: {0}")]
pub struct MockError(pub String);

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<String>,
    failures: HashMap<String, String>,
    columns: Vec<String>,
    rows: Vec<Row>,
    rows_affected: u64,
    in_transaction: bool,
    closed: bool,
}

impl MockState {
    fn enter(&mut self, method: &str) -> Result<(), MockError> {
        self.calls.push(method.to_string());
        match self.failures.get(method) {
            Some(message) => Err(MockError(message.clone())),
            None => Ok(()),
        }
    }
}

/// A [`Connection`] whose results and failures are scripted up front.
///
/// Statements and cursors it returns share its script and call log.
/// Failures are keyed by method name (`execute`, `query`, `prepare`,
/// `begin`, `commit`, `rollback`, `ping`, `close`, `bind`,
/// `clear_bindings`, `next`) and apply to every object of the connection.
///
/// ## Example
///
/// ```rust
/// use dbcensus::driver::{Connection, Rows, Value};
/// use dbcensus::testing::MockConnection;
///
/// let mut conn = MockConnection::new()
///     .with_rows(["id"], vec![vec![Value::Integer(1)], vec![Value::Integer(2)]]);
/// let mut rows = conn.query("SELECT id FROM t", &[]).unwrap();
/// assert_eq!(rows.next_row().unwrap(), Some(vec![Value::Integer(1)]));
/// assert_eq!(conn.calls(), vec!["query", "next"]);
/// ```
#[derive(Debug, Clone)]
pub struct MockConnection {
    state: Arc<Mutex<MockState>>,
}

impl MockConnection {
    /// Creates a connection that succeeds at everything and returns no rows.
    pub fn new() -> Self {
        Self { state: Arc::new(Mutex::new(MockState::default())) }
    }

    /// Sets the columns and rows every query returns.
    #[must_use]
    pub fn with_rows<I, S>(self, columns: I, rows: Vec<Row>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut state = self.state.lock();
            state.columns = columns.into_iter().map(Into::into).collect();
            state.rows = rows;
        }
        self
    }

    /// Sets the rows-affected count every execute returns.
    #[must_use]
    pub fn with_rows_affected(self, rows_affected: u64) -> Self {
        self.state.lock().rows_affected = rows_affected;
        self
    }

    /// Makes every call to `method` fail with `message`.
    #[must_use]
    pub fn fail_on(self, method: impl Into<String>, message: impl Into<String>) -> Self {
        self.set_failure(method, message);
        self
    }

    /// Makes every later call to `method` fail with `message`.
    pub fn set_failure(&self, method: impl Into<String>, message: impl Into<String>) {
        self.state.lock().failures.insert(method.into(), message.into());
    }

    /// Removes all scripted failures.
    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }

    /// Returns the methods called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    /// Returns `true` while a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.state.lock().in_transaction
    }

    fn rows(&self) -> MockRows {
        let state = self.state.lock();
        MockRows {
            state: Arc::clone(&self.state),
            columns: state.columns.clone(),
            pending: state.rows.iter().cloned().collect(),
        }
    }
}

impl Default for MockConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection for MockConnection {
    type Error = MockError;
    type Statement = MockStatement;
    type Rows = MockRows;

    fn execute(&mut self, _sql: &str, _params: &[Value]) -> Result<u64, MockError> {
        let mut state = self.state.lock();
        state.enter("execute")?;
        Ok(state.rows_affected)
    }

    fn query(&mut self, _sql: &str, _params: &[Value]) -> Result<MockRows, MockError> {
        self.state.lock().enter("query")?;
        Ok(self.rows())
    }

    fn prepare(&mut self, sql: &str) -> Result<MockStatement, MockError> {
        self.state.lock().enter("prepare")?;
        let parameter_count = sql.matches('?').count();
        Ok(MockStatement {
            connection: self.clone(),
            sql: sql.to_string(),
            bindings: vec![None; parameter_count],
        })
    }

    fn begin(&mut self) -> Result<(), MockError> {
        let mut state = self.state.lock();
        state.enter("begin")?;
        if state.in_transaction {
            return Err(MockError("transaction already open".into()));
        }
        state.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), MockError> {
        let mut state = self.state.lock();
        state.enter("commit")?;
        state.in_transaction = false;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), MockError> {
        let mut state = self.state.lock();
        state.enter("rollback")?;
        state.in_transaction = false;
        Ok(())
    }

    fn ping(&mut self) -> Result<(), MockError> {
        let mut state = self.state.lock();
        state.enter("ping")?;
        if state.closed {
            return Err(MockError("connection closed".into()));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), MockError> {
        let mut state = self.state.lock();
        state.enter("close")?;
        state.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    fn autocommit(&self) -> bool {
        !self.state.lock().in_transaction
    }
}

/// A statement prepared by [`MockConnection`].
///
/// Counts `?` placeholders as parameters.
#[derive(Debug, Clone)]
pub struct MockStatement {
    connection: MockConnection,
    sql: String,
    bindings: Vec<Option<Value>>,
}

impl MockStatement {
    /// Returns the value bound at `index`, if any.
    pub fn binding(&self, index: usize) -> Option<&Value> {
        self.bindings.get(index).and_then(Option::as_ref)
    }
}

impl Statement for MockStatement {
    type Error = MockError;
    type Rows = MockRows;

    fn sql(&self) -> &str {
        &self.sql
    }

    fn parameter_count(&self) -> usize {
        self.bindings.len()
    }

    fn bind(&mut self, index: usize, value: Value) -> Result<(), MockError> {
        self.connection.state.lock().enter("bind")?;
        let count = self.bindings.len();
        let slot = self
            .bindings
            .get_mut(index)
            .ok_or_else(|| MockError(format!("parameter index {index} out of range 0..{count}")))?;
        *slot = Some(value);
        Ok(())
    }

    fn clear_bindings(&mut self) -> Result<(), MockError> {
        self.connection.state.lock().enter("clear_bindings")?;
        self.bindings.iter_mut().for_each(|b| *b = None);
        Ok(())
    }

    fn execute(&mut self) -> Result<u64, MockError> {
        let mut state = self.connection.state.lock();
        state.enter("execute")?;
        Ok(state.rows_affected)
    }

    fn query(&mut self) -> Result<MockRows, MockError> {
        self.connection.state.lock().enter("query")?;
        Ok(self.connection.rows())
    }

    fn close(&mut self) -> Result<(), MockError> {
        self.connection.state.lock().enter("close")
    }
}

/// A cursor returned by [`MockConnection`] or [`MockStatement`].
#[derive(Debug)]
pub struct MockRows {
    state: Arc<Mutex<MockState>>,
    columns: Vec<String>,
    pending: VecDeque<Row>,
}

impl Rows for MockRows {
    type Error = MockError;

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Row>, MockError> {
        self.state.lock().enter("next")?;
        Ok(self.pending.pop_front())
    }

    fn close(&mut self) -> Result<(), MockError> {
        self.state.lock().enter("close")?;
        self.pending.clear();
        Ok(())
    }
}
