//! Traced connection, statement and cursor wrappers end to end.

use dbcensus::InstrumentationConfig;
use dbcensus::driver::{Connection, Rows, Statement, Value};
use dbcensus::stats::count_by_tag;
use dbcensus::testing::{MockConnection, MockError};
use dbcensus::trace::{SpanStatus, SpanValue, attribute_keys};
use dbcensus::traced::span_names;

use crate::common::Harness;

#[test]
fn test_results_pass_through_unchanged() {
    let h = Harness::new().unwrap();
    let mut conn = h.connect(MockConnection::new().with_rows_affected(4));

    assert_eq!(conn.execute("UPDATE accounts SET balance = 0", &[]).unwrap(), 4);
    conn.ping().unwrap();

    let span = h.tracer.span(span_names::CONNECTION_EXECUTE).unwrap();
    assert_eq!(span.status, SpanStatus::Ok);
    assert_eq!(span.attribute(attribute_keys::DB_OPERATION), Some(&SpanValue::from("UPDATE")));
    assert_eq!(span.attribute(attribute_keys::DB_ROWS_AFFECTED), Some(&SpanValue::Int(4)));
    assert_eq!(span.attribute(attribute_keys::DB_STATEMENT), None);

    let methods = count_by_tag(&h.calls(), "method");
    assert_eq!(methods["execute"], 1);
    assert_eq!(methods["ping"], 1);
}

#[test]
fn test_errors_pass_through_unchanged_and_are_recorded() {
    let h = Harness::new().unwrap();
    let mut conn = h.connect(MockConnection::new().fail_on("commit", "deadlock detected"));

    conn.begin().unwrap();
    let err = conn.commit().unwrap_err();
    assert_eq!(err, MockError("deadlock detected".to_string()));

    let errors = h.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].tag("method"), Some("commit"));
    assert_eq!(errors[0].tag("reason"), Some("MockError: deadlock detected"));

    let span = h.tracer.span(span_names::CONNECTION_COMMIT).unwrap();
    assert_eq!(span.status.error_message(), Some("MockError: deadlock detected"));
    assert_eq!(span.end_count, 1);

    let statuses = count_by_tag(&h.calls(), "status");
    assert_eq!(statuses["ok"], 1);
    assert_eq!(statuses["error"], 1);
}

#[test]
fn test_prepared_statement_lifecycle() {
    let h = Harness::new().unwrap();
    let mut conn = h.connect(MockConnection::new().with_rows_affected(1));

    let sql = "INSERT INTO users (name, avatar) VALUES (?, ?)";
    let mut stmt = conn.prepare(sql).unwrap();
    assert_eq!(stmt.sql(), sql);
    assert_eq!(stmt.parameter_count(), 2);
    assert_eq!(stmt.statement_type(), "INSERT");

    stmt.bind(0, Value::from("alice")).unwrap();
    stmt.bind(1, Value::Bytes(vec![0; 2048])).unwrap();
    assert_eq!(stmt.execute().unwrap(), 1);
    stmt.close().unwrap();

    let keys = h.samples(|m| &m.key_length);
    assert_eq!(keys.len(), 2);
    assert!(keys.iter().all(|s| s.value == sql.len() as f64));
    assert!(keys.iter().all(|s| s.tag("type") == Some("INSERT")));
    assert_eq!(count_by_tag(&keys, "method")["prepare"], 1);

    let values = h.samples(|m| &m.value_length);
    let sizes: Vec<f64> = values.iter().map(|s| s.value).collect();
    assert_eq!(sizes, vec![5.0, 2048.0]);
    assert!(values.iter().all(|s| s.tag("phase") == Some("execute")));

    let spans: Vec<String> = h.tracer.spans().into_iter().map(|s| s.name).collect();
    assert_eq!(spans, vec![
        span_names::CONNECTION_PREPARE,
        span_names::STATEMENT_BIND,
        span_names::STATEMENT_BIND,
        span_names::STATEMENT_EXECUTE,
        span_names::STATEMENT_CLOSE,
    ]);
}

#[test]
fn test_cursor_fetches_are_tagged_fetch() {
    let h = Harness::new().unwrap();
    let mut conn = h.connect(MockConnection::new().with_rows(["id", "name"], vec![
        vec![Value::Integer(1), Value::from("ada")],
        vec![Value::Integer(2), Value::Null],
    ]));

    let mut rows = conn.query("select id, name from users", &[]).unwrap();
    assert_eq!(rows.columns(), &["id".to_string(), "name".to_string()][..]);

    let mut fetched = Vec::new();
    while let Some(row) = rows.next_row().unwrap() {
        fetched.push(row);
    }
    rows.close().unwrap();
    assert_eq!(fetched.len(), 2);

    let fetch_sizes: Vec<f64> = h
        .samples(|m| &m.value_length)
        .into_iter()
        .filter(|s| s.tag("phase") == Some("fetch"))
        .map(|s| s.value)
        .collect();
    assert_eq!(fetch_sizes, vec![8.0, 3.0, 8.0, 0.0]);

    let next_calls = count_by_tag(&h.calls(), "method")["next"];
    assert_eq!(next_calls, 3);
}

#[test]
fn test_failing_cursor_records_fetch_error() {
    let h = Harness::new().unwrap();
    let mock = MockConnection::new().with_rows(["id"], vec![vec![Value::Integer(1)]]);
    let mut conn = h.connect(mock.clone());

    let mut rows = conn.query("SELECT id FROM t", &[]).unwrap();
    mock.set_failure("next", "connection reset");
    assert!(rows.next_row().is_err());

    let errors = h.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].tag("method"), Some("next"));
    assert!(h.tracer.span(span_names::ROWS_NEXT).unwrap().status.is_error());
}

#[test]
fn test_accessors_bypass_instrumentation() {
    let h = Harness::new().unwrap();
    let conn = h.connect(MockConnection::new());

    assert!(!conn.is_closed());
    assert!(conn.autocommit());

    assert!(h.tracer.spans().is_empty());
    assert!(h.stats.samples().is_empty());
}

#[test]
fn test_statement_text_is_traced_when_enabled() {
    let config = InstrumentationConfig::builder().trace_statement_text(true).build();
    let h = Harness::with_config(config).unwrap();
    let mut conn = h.connect(MockConnection::new());

    conn.execute("DELETE FROM sessions", &[]).unwrap();

    let span = h.tracer.span(span_names::CONNECTION_EXECUTE).unwrap();
    assert_eq!(
        span.attribute(attribute_keys::DB_STATEMENT).and_then(SpanValue::as_str),
        Some("DELETE FROM sessions")
    );
}

#[test]
fn test_size_recording_can_be_disabled() {
    let config = InstrumentationConfig::builder().record_sizes(false).build();
    let h = Harness::with_config(config).unwrap();
    let mut conn = h.connect(MockConnection::new());

    conn.execute("INSERT INTO t VALUES (?)", &[Value::from("payload")]).unwrap();

    assert!(h.samples(|m| &m.key_length).is_empty());
    assert!(h.samples(|m| &m.value_length).is_empty());
    assert_eq!(h.calls().len(), 1);
}
