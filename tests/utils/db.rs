/// Database test utilities
///
/// Every test gets its own migrated in-memory SQLite database, so tests
/// can run in parallel without a shared lock.
use diesel::prelude::*;
use showsync::modules::jobs::JobStoreImpl;
use showsync::modules::library::LibraryRepositoryImpl;
use showsync::shared::Database;
use std::sync::Arc;

pub fn fresh_database() -> Database {
    let database = Database::in_memory().expect("Failed to open in-memory database");
    database
        .run_migrations()
        .expect("Failed to run migrations");
    database
}

pub fn job_store(database: &Database) -> Arc<JobStoreImpl> {
    Arc::new(JobStoreImpl::new(database.pool().clone()))
}

pub fn library(database: &Database) -> Arc<LibraryRepositoryImpl> {
    Arc::new(LibraryRepositoryImpl::new(database.pool().clone()))
}

/// Insert a raw job row, bypassing the payload codec.
pub fn insert_raw_job(database: &Database, created_at_ms: i64, type_id: i32, payload: &[u8]) {
    let mut conn = database.get_connection().expect("Failed to get DB connection");
    diesel::sql_query("INSERT INTO jobs (created_at_ms, type_id, payload) VALUES (?, ?, ?)")
        .bind::<diesel::sql_types::BigInt, _>(created_at_ms)
        .bind::<diesel::sql_types::Integer, _>(type_id)
        .bind::<diesel::sql_types::Binary, _>(payload.to_vec())
        .execute(&mut conn)
        .expect("Failed to insert raw job");
}

/// Make every insert into the job queue fail, as a full disk would.
pub fn reject_job_inserts(database: &Database) {
    let mut conn = database.get_connection().expect("Failed to get DB connection");
    diesel::sql_query(
        "CREATE TRIGGER reject_job_inserts BEFORE INSERT ON jobs \
         BEGIN SELECT RAISE(ABORT, 'disk full'); END",
    )
    .execute(&mut conn)
    .expect("Failed to install trigger");
}
