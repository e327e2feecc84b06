mod common;

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tokio::time::timeout;
use tower::ServiceExt;

use actors::{JobQueue, QueueOptions, TaskRegistry, start_queue};
use api::AppState;
use mailer_core::JobEvent;
use notify::{ConsoleSender, SendEmailTask};

const WAIT: Duration = Duration::from_secs(5);

async fn start_test_queue() -> JobQueue {
    let mut tasks = TaskRegistry::new();
    tasks.register(
        SendEmailTask::new(Arc::new(ConsoleSender))
            .with_steps(2)
            .with_pacing(Duration::ZERO),
    );

    start_queue(
        QueueOptions::default()
            .with_workers(1)
            .with_poll_interval(Duration::from_millis(10)),
        tasks,
    )
    .await
    .expect("queue should start")
}

fn app(queue: JobQueue) -> Router {
    api::router(AppState { queue })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn get_status(app: &Router, job_id: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/status/{job_id}"))
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("request should run");
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn unknown_job_id_polls_as_invalid() -> Result<(), Box<dyn Error>> {
    let _guard = common::setup_db().await?;

    let queue = start_test_queue().await;
    let app = app(queue.clone());

    let (status, body) = get_status(&app, "abc123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "invalid", "progress": ""}));

    queue.shutdown();
    Ok(())
}

#[tokio::test]
async fn contact_submission_round_trip() -> Result<(), Box<dyn Error>> {
    let _guard = common::setup_db().await?;

    let queue = start_test_queue().await;
    let mut events = queue.subscribe();
    let app = app(queue.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/contact")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"to": "a@x.com", "subject": "Hi", "message": "Body"}).to_string(),
                ))
                .expect("request should build"),
        )
        .await
        .expect("request should run");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let job_id = body["job_id"].as_str().expect("job_id in response").to_string();
    assert!(!job_id.is_empty());

    // an immediate poll sees the job before completion or right after;
    // never an error, never a surprise status
    let (status, body) = get_status(&app, &job_id).await;
    assert_eq!(status, StatusCode::OK);
    let observed = body["status"].as_str().expect("status in body");
    assert!(
        ["queued", "running", "finished"].contains(&observed),
        "unexpected status: {observed}"
    );

    // wait for the worker, then the poll must settle on finished/100
    timeout(WAIT, async {
        loop {
            match events.recv().await.expect("event channel closed") {
                JobEvent::JobFinished { .. } => break,
                JobEvent::JobFailed { error, .. } => panic!("job failed: {error}"),
                _ => {}
            }
        }
    })
    .await
    .expect("timed out waiting for the job");

    let (status, body) = get_status(&app, &job_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "finished", "progress": "100"}));

    queue.shutdown();
    Ok(())
}
