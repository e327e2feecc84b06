//! Database schema definitions using SurrealQL.

use crate::{DbError, get_db};

/// Initialize the database schema.
///
/// This creates the job table, its fields, and indexes.
pub async fn init_schema() -> Result<(), DbError> {
    let db = get_db()?;

    tracing::info!("Initializing database schema...");

    db.query(JOB_SCHEMA).await?;

    tracing::info!("Database schema initialized");

    Ok(())
}

/// Job table schema.
const JOB_SCHEMA: &str = r#"
-- Job table for background work records
DEFINE TABLE IF NOT EXISTS job SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS job_type ON job TYPE string;
DEFINE FIELD IF NOT EXISTS payload ON job FLEXIBLE TYPE object;
DEFINE FIELD IF NOT EXISTS status ON job FLEXIBLE TYPE object;
DEFINE FIELD IF NOT EXISTS progress ON job TYPE int DEFAULT 0
    ASSERT $value >= 0 AND $value <= 100;
DEFINE FIELD IF NOT EXISTS created_at ON job TYPE datetime DEFAULT time::now();
DEFINE FIELD IF NOT EXISTS updated_at ON job TYPE datetime DEFAULT time::now();

-- Indexes for status lookups and retention sweeps
DEFINE INDEX IF NOT EXISTS job_status ON job FIELDS status.status;
DEFINE INDEX IF NOT EXISTS job_updated ON job FIELDS updated_at;
"#;
