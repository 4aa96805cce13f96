use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::database::{DatabaseError, EntityStore};
use crate::entity::Row;
use crate::filter::SqlResult;

/// In-memory store that records every statement and answers from queues.
///
/// Row and count queues are consumed in call order; an empty queue answers
/// with no rows, a zero count, or one affected row.
#[derive(Default)]
pub struct RecordingStore {
    statements: Mutex<Vec<SqlResult>>,
    rows: Mutex<VecDeque<Vec<Row>>>,
    counts: Mutex<VecDeque<i64>>,
    affected: Mutex<VecDeque<u64>>,
}

impl RecordingStore {
    pub fn push_rows(&self, rows: Vec<Row>) {
        self.rows.lock().unwrap().push_back(rows);
    }

    pub fn push_count(&self, count: i64) {
        self.counts.lock().unwrap().push_back(count);
    }

    pub fn push_affected(&self, affected: u64) {
        self.affected.lock().unwrap().push_back(affected);
    }

    pub fn statements(&self) -> Vec<SqlResult> {
        self.statements.lock().unwrap().clone()
    }

    fn record(&self, sql: &SqlResult) {
        self.statements.lock().unwrap().push(sql.clone());
    }
}

#[async_trait]
impl EntityStore for RecordingStore {
    async fn fetch_rows(&self, sql: &SqlResult) -> Result<Vec<Row>, DatabaseError> {
        self.record(sql);
        Ok(self.rows.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn fetch_count(&self, sql: &SqlResult) -> Result<i64, DatabaseError> {
        self.record(sql);
        Ok(self.counts.lock().unwrap().pop_front().unwrap_or(0))
    }

    async fn execute(&self, sql: &SqlResult) -> Result<u64, DatabaseError> {
        self.record(sql);
        Ok(self.affected.lock().unwrap().pop_front().unwrap_or(1))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
