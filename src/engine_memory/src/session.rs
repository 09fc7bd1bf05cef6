use crate::statement::MemoryStatement;
use crate::table::Catalog;
use crate::{sql, SessionState};
use engine::{EngineError, EngineResult, EngineSession, PreparedMeta, ResultSet};
use protocol::constants::STATUS_FLAG_AUTOCOMMIT;
use protocol::ColumnInfo;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

pub struct MemorySession {
    catalog: Arc<Catalog>,
    state: Arc<Mutex<SessionState>>,
    next_stmt_id: Arc<AtomicU32>,
}

impl MemorySession {
    pub fn new(catalog: Arc<Catalog>, dbname: &str, next_stmt_id: Arc<AtomicU32>) -> Self {
        catalog.ensure_database(dbname);
        MemorySession {
            catalog,
            state: Arc::new(Mutex::new(SessionState {
                status: STATUS_FLAG_AUTOCOMMIT,
                last_insert_id: 0,
                affected_rows: 0,
                warning_count: 0,
                current_db: dbname.to_string(),
            })),
            next_stmt_id,
        }
    }

    fn current_db(&self) -> String {
        self.state.lock().unwrap().current_db.clone()
    }
}

impl EngineSession for MemorySession {
    fn status(&self) -> u16 {
        self.state.lock().unwrap().status
    }

    fn last_insert_id(&self) -> u64 {
        self.state.lock().unwrap().last_insert_id
    }

    fn affected_rows(&self) -> u64 {
        self.state.lock().unwrap().affected_rows
    }

    fn warning_count(&self) -> u16 {
        self.state.lock().unwrap().warning_count
    }

    fn current_db(&self) -> String {
        self.state.lock().unwrap().current_db.clone()
    }

    fn execute(&mut self, text: &str) -> EngineResult<Option<ResultSet>> {
        let stmt = sql::parse(text)?;
        let db = self.current_db();
        let outcome = crate::exec::execute(&stmt, &self.catalog, &db, &[])?;
        {
            let mut state = self.state.lock().unwrap();
            state.affected_rows = outcome.affected_rows;
            state.last_insert_id = outcome.last_insert_id;
            if let crate::sql::Statement::Use { db: new_db } = &stmt {
                state.current_db = new_db.clone();
            }
        }
        Ok(outcome.result_set)
    }

    fn prepare(&mut self, text: &str) -> EngineResult<PreparedMeta> {
        let parsed = sql::parse(text)?;
        let id = self.next_stmt_id.fetch_add(1, Ordering::SeqCst);
        let db = self.current_db();
        let stmt = MemoryStatement::new(id, parsed, Arc::clone(&self.catalog), Arc::clone(&self.state), db);
        let columns = stmt.result_columns()?;
        let params = stmt.param_columns();
        Ok(PreparedMeta {
            statement: Box::new(stmt),
            params,
            columns,
        })
    }

    fn field_list(&mut self, table: &str, _wildcard: &str) -> EngineResult<Vec<ColumnInfo>> {
        let db = self.current_db();
        let cols = self
            .catalog
            .table_columns(&db, table)
            .ok_or_else(|| EngineError::unknown(format!("unknown table: {}", table)))?;
        Ok(cols.iter().map(|c| c.to_column_info(table)).collect())
    }

    fn close(self: Box<Self>) {}
}
