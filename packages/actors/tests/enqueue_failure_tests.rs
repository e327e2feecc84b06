//! Store-unavailability behavior, run without initializing the database.
//!
//! This file is its own test binary so the global connection stays
//! uninitialized for its whole lifetime.

use std::error::Error;
use std::time::Duration;

use serde_json::json;

use actors::{FnTask, QueueOptions, SubmitError, TaskRegistry, start_queue};
use mailer_core::JobId;

#[tokio::test]
async fn enqueue_fails_loudly_when_the_store_is_down() -> Result<(), Box<dyn Error>> {
    let mut tasks = TaskRegistry::new();
    tasks.register(FnTask::new("send_email", |_payload, _progress| {
        Box::pin(async move { Ok(()) })
    }));

    let queue = start_queue(
        QueueOptions::default().with_poll_interval(Duration::from_millis(10)),
        tasks,
    )
    .await?;

    let result = queue.submit("send_email", json!({"to": "a@x.com"})).await;
    match result {
        Err(SubmitError::Store(reason)) => {
            assert!(reason.contains("not initialized"), "unexpected reason: {reason}");
        }
        other => panic!("expected a store error, got {other:?}"),
    }

    queue.shutdown();
    Ok(())
}

#[tokio::test]
async fn fetch_distinguishes_store_failure_from_unknown_id() -> Result<(), Box<dyn Error>> {
    let queue = start_queue(
        QueueOptions::default().with_poll_interval(Duration::from_millis(10)),
        TaskRegistry::new(),
    )
    .await?;

    // the id is unknown, but with the store down the poller must see a
    // retryable error, not "invalid"
    let result = queue.fetch(JobId::new()).await;
    assert!(matches!(result, Err(actors::FetchError::Store(_))));

    let status = queue.status(&JobId::new().to_string()).await;
    assert!(matches!(status, Err(actors::FetchError::Store(_))));

    queue.shutdown();
    Ok(())
}
