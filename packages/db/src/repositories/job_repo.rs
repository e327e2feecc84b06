//! Job repository for persistence operations.

use chrono::{DateTime, Utc};
use mailer_core::{Job, JobId, JobStatus};
use serde::{Deserialize, Serialize};
use surrealdb::sql::{Datetime, Thing};

use crate::{DbError, get_db};

/// Repository for job record persistence.
pub struct JobRepository;

/// Internal record type for SurrealDB.
///
/// The record key carries the job id; timestamps cross the boundary as
/// SurrealDB datetimes so the schema-typed fields accept them.
#[derive(Debug, Serialize, Deserialize)]
struct JobRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Thing>,
    job_type: String,
    payload: serde_json::Value,
    status: JobStatus,
    progress: u8,
    created_at: Datetime,
    updated_at: Datetime,
}

impl JobRecord {
    fn from_job(job: &Job) -> Self {
        Self {
            id: None,
            job_type: job.job_type.clone(),
            payload: job.payload.clone(),
            status: job.status.clone(),
            progress: job.progress,
            created_at: job.created_at.into(),
            updated_at: job.updated_at.into(),
        }
    }

    fn into_job(self) -> Result<Job, DbError> {
        let id = self
            .id
            .ok_or_else(|| DbError::Serialization("job record missing id".into()))?;
        let id = JobId::parse(&id.id.to_raw())
            .map_err(|e| DbError::Serialization(format!("bad job record key: {e}")))?;

        Ok(Job {
            id,
            job_type: self.job_type,
            payload: self.payload,
            status: self.status,
            progress: self.progress,
            created_at: self.created_at.0,
            updated_at: self.updated_at.0,
        })
    }
}

/// Merge shape for a status transition. Typed so the driver serializes
/// `updated_at` as a native datetime rather than a string.
#[derive(Serialize)]
struct StatusMerge {
    status: JobStatus,
    progress: u8,
    updated_at: Datetime,
}

/// Merge shape for a progress update.
#[derive(Serialize)]
struct ProgressMerge {
    progress: u8,
    updated_at: Datetime,
}

impl JobRepository {
    /// Persist a new job record.
    pub async fn create(job: &Job) -> Result<(), DbError> {
        let db = get_db()?;

        let record: Option<JobRecord> = db
            .create(("job", job.id.to_string()))
            .content(JobRecord::from_job(job))
            .await?;

        record
            .map(|_| ())
            .ok_or_else(|| DbError::Query("failed to create job record".into()))
    }

    /// Get a job by ID. A missing record is `Ok(None)`, not an error.
    pub async fn get(id: JobId) -> Result<Option<Job>, DbError> {
        let db = get_db()?;

        let record: Option<JobRecord> = db.select(("job", id.to_string())).await?;

        record.map(JobRecord::into_job).transpose()
    }

    /// Commit a status transition together with its progress value.
    ///
    /// Status, progress and the failure cause (inside the status object)
    /// land in a single merge so pollers never observe a half-written
    /// field group.
    pub async fn update_status(id: JobId, status: &JobStatus, progress: u8) -> Result<(), DbError> {
        let db = get_db()?;

        let record: Option<JobRecord> = db
            .update(("job", id.to_string()))
            .merge(StatusMerge {
                status: status.clone(),
                progress,
                updated_at: Utc::now().into(),
            })
            .await?;

        record
            .map(|_| ())
            .ok_or_else(|| DbError::Query(format!("job not found: {id}")))
    }

    /// Update the progress counter of a running job.
    pub async fn set_progress(id: JobId, progress: u8) -> Result<(), DbError> {
        let db = get_db()?;

        let record: Option<JobRecord> = db
            .update(("job", id.to_string()))
            .merge(ProgressMerge {
                progress,
                updated_at: Utc::now().into(),
            })
            .await?;

        record
            .map(|_| ())
            .ok_or_else(|| DbError::Query(format!("job not found: {id}")))
    }

    /// Delete terminal records last updated before the cutoff.
    pub async fn purge_older_than(cutoff: DateTime<Utc>) -> Result<(), DbError> {
        let db = get_db()?;

        db.query(
            r#"
            DELETE job
            WHERE status.status IN ["finished", "failed"]
              AND updated_at < $cutoff
            "#,
        )
        .bind(("cutoff", Datetime::from(cutoff)))
        .await?;

        Ok(())
    }
}
