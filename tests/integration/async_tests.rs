//! Async instrumentation.

use std::time::Duration;

use dbcensus::stats::count_by_tag;
use dbcensus::testing::MockError;

use crate::common::Harness;

#[tokio::test]
async fn test_async_calls_record_like_sync_calls() {
    let h = Harness::new().unwrap();

    let ok = h
        .instrumenter
        .instrument_async("Pool.acquire", "acquire", async { Ok::<_, MockError>(1u32) })
        .await;
    assert_eq!(ok, Ok(1));

    let err = h
        .instrumenter
        .instrument_async("Pool.acquire", "acquire", async {
            Err::<u32, _>(MockError("pool exhausted".into()))
        })
        .await;
    assert_eq!(err, Err(MockError("pool exhausted".into())));

    assert_eq!(h.latency().len(), 2);
    let errors = h.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].tag("reason"), Some("MockError: pool exhausted"));
    assert_eq!(h.tracer.ended_count(), 2);
}

#[tokio::test]
async fn test_concurrent_tasks() {
    let h = Harness::new().unwrap();

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let instrumenter = h.instrumenter.clone();
            tokio::spawn(async move {
                instrumenter
                    .instrument_async("Pool.query", "query", async move {
                        tokio::task::yield_now().await;
                        if i % 4 == 0 { Err(MockError("timeout".into())) } else { Ok(i) }
                    })
                    .await
            })
        })
        .collect();

    for task in tasks {
        let _ = task.await.unwrap();
    }

    let statuses = count_by_tag(&h.calls(), "status");
    assert_eq!(statuses["ok"], 12);
    assert_eq!(statuses["error"], 4);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_future_still_closes() {
    let h = Harness::new().unwrap();

    let slow = h.instrumenter.instrument_async("Pool.query", "query", async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok::<_, MockError>(())
    });
    let timed_out = tokio::time::timeout(Duration::from_secs(1), slow).await;
    assert!(timed_out.is_err());

    assert_eq!(h.latency().len(), 1);
    assert!(h.errors().is_empty());
    assert_eq!(h.tracer.span("Pool.query").unwrap().end_count, 1);
}
