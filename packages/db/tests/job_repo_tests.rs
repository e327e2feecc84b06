mod common;

use std::error::Error;

use chrono::{Duration, Utc};
use mailer_core::{Job, JobId, JobStatus};
use serde_json::json;

use db::repositories::JobRepository;

fn email_payload(to: &str) -> serde_json::Value {
    json!({
        "to": to,
        "subject": "Hi",
        "body": "Body",
    })
}

#[tokio::test]
async fn test_job_repository() -> Result<(), Box<dyn Error>> {
    let _guard = common::setup_db().await?;

    // create / get round-trip
    let job = Job::new("send_email", email_payload("a@x.com"));
    JobRepository::create(&job).await?;

    let loaded = JobRepository::get(job.id)
        .await?
        .expect("job should exist after create");
    assert_eq!(loaded.id, job.id);
    assert_eq!(loaded.job_type, "send_email");
    assert_eq!(loaded.payload["to"], "a@x.com");
    assert_eq!(loaded.status, JobStatus::Queued);
    assert_eq!(loaded.progress, 0);

    // unknown id is None, not an error
    let missing = JobRepository::get(JobId::new()).await?;
    assert!(missing.is_none());

    // running transition with progress
    let mut job = loaded;
    job.mark_running("worker-1");
    JobRepository::update_status(job.id, &job.status, job.progress).await?;

    JobRepository::set_progress(job.id, 30).await?;
    let loaded = JobRepository::get(job.id).await?.expect("job still exists");
    assert_eq!(loaded.status.as_str(), "running");
    assert_eq!(loaded.progress, 30);

    // finished transition commits status and progress together
    job.mark_finished();
    JobRepository::update_status(job.id, &job.status, job.progress).await?;
    let loaded = JobRepository::get(job.id).await?.expect("job still exists");
    assert_eq!(loaded.status.as_str(), "finished");
    assert_eq!(loaded.progress, 100);

    Ok(())
}

#[tokio::test]
async fn test_failed_status_keeps_error() -> Result<(), Box<dyn Error>> {
    let _guard = common::setup_db().await?;

    let mut job = Job::new("send_email", email_payload("b@x.com"));
    JobRepository::create(&job).await?;

    job.mark_running("worker-2");
    job.progress = 60;
    JobRepository::update_status(job.id, &job.status, job.progress).await?;

    job.mark_failed("connection refused");
    JobRepository::update_status(job.id, &job.status, job.progress).await?;

    let loaded = JobRepository::get(job.id).await?.expect("job still exists");
    assert_eq!(loaded.progress, 60);
    match loaded.status {
        JobStatus::Failed { error, .. } => assert_eq!(error, "connection refused"),
        other => panic!("unexpected status: {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_purge_removes_only_old_terminal_jobs() -> Result<(), Box<dyn Error>> {
    let _guard = common::setup_db().await?;

    let mut finished = Job::new("send_email", email_payload("c@x.com"));
    JobRepository::create(&finished).await?;
    finished.mark_running("worker-1");
    finished.mark_finished();
    JobRepository::update_status(finished.id, &finished.status, finished.progress).await?;

    let queued = Job::new("send_email", email_payload("d@x.com"));
    JobRepository::create(&queued).await?;

    // cutoff in the future catches the terminal record; the queued one stays
    JobRepository::purge_older_than(Utc::now() + Duration::seconds(5)).await?;

    assert!(JobRepository::get(finished.id).await?.is_none());
    assert!(JobRepository::get(queued.id).await?.is_some());

    // cutoff in the past removes nothing
    JobRepository::purge_older_than(Utc::now() - Duration::hours(1)).await?;
    assert!(JobRepository::get(queued.id).await?.is_some());

    Ok(())
}
