//! A reference `Engine` implementation backed by an in-process table store.
//! Exists to exercise the protocol layer end to end (spec 8's scenarios);
//! its interpreter understands only the handful of statement shapes those
//! scenarios need, not SQL in general.
mod exec;
mod session;
mod sql;
mod statement;
mod table;
#[cfg(test)]
mod tests;

use engine::{Engine, EngineResult, EngineSession};
use session::MemorySession;
use std::sync::atomic::AtomicU32;
use std::sync::Arc;
use table::Catalog;

pub(crate) struct SessionState {
    pub status: u16,
    pub last_insert_id: u64,
    pub affected_rows: u64,
    pub warning_count: u16,
    pub current_db: String,
}

pub struct MemoryEngine {
    catalog: Arc<Catalog>,
    next_stmt_id: Arc<AtomicU32>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        MemoryEngine {
            catalog: Arc::new(Catalog::new()),
            next_stmt_id: Arc::new(AtomicU32::new(1)),
        }
    }
}

impl Engine for MemoryEngine {
    fn open_session(
        &self,
        _capabilities: u32,
        _collation: u8,
        dbname: &str,
    ) -> EngineResult<Box<dyn EngineSession>> {
        Ok(Box::new(MemorySession::new(
            Arc::clone(&self.catalog),
            dbname,
            Arc::clone(&self.next_stmt_id),
        )))
    }
}
