use std::sync::LazyLock;

use tokio::sync::{Mutex, MutexGuard};

use db::{DbConfig, DbError};

static TEST_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Dedicated long-lived runtime for the database connection.
///
/// The crate stores the SurrealDB handle in a process-global `OnceCell`, and
/// the embedded in-memory engine spawns its background task onto whatever
/// runtime first calls `connect()`. Each `#[tokio::test]` gets its own runtime
/// that is torn down when the test returns, which would kill that engine task
/// and make every later test fail with "sending into a closed channel". Running
/// the one-time connection init on this runtime — whose worker thread lives for
/// the whole test binary — keeps the engine alive across all tests.
static DB_RT: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("failed to build dedicated db runtime")
});

pub async fn setup_db() -> Result<MutexGuard<'static, ()>, DbError> {
    let guard = TEST_LOCK.lock().await;
    DB_RT
        .spawn(async { db::init(DbConfig::memory()).await })
        .await
        .expect("db init task panicked")?;
    let db_conn = db::get_db()?;
    db_conn.query("DELETE job;").await?;
    Ok(guard)
}
