/// Diesel models for the jobs table
use crate::modules::jobs::domain::entities::JobQueueEntry;
use crate::schema::jobs;
use diesel::prelude::*;

/// Diesel model for inserting new jobs
#[derive(Insertable, Debug)]
#[diesel(table_name = jobs)]
pub struct NewJob<'a> {
    pub created_at_ms: i64,
    pub type_id: i32,
    pub payload: &'a [u8],
}

/// Diesel model for querying existing jobs
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = jobs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct JobModel {
    pub id: i64,
    pub created_at_ms: i64,
    pub type_id: i32,
    pub payload: Vec<u8>,
}

impl JobModel {
    /// Convert to domain JobQueueEntry
    pub fn to_entry(self) -> JobQueueEntry {
        JobQueueEntry {
            id: self.id,
            created_at_ms: self.created_at_ms,
            type_id: self.type_id,
            payload: self.payload,
        }
    }
}
