use crate::error::CommandError;
use engine::EngineStatement;
use std::collections::HashMap;

/// Owns prepared statements between `COM_STMT_PREPARE` and `COM_STMT_CLOSE`,
/// plus the long-data buffers accumulated by `COM_STMT_SEND_LONG_DATA`.
/// Keyed by the id the engine itself assigned via `EngineStatement::id`, per
/// spec 4.8 (there is no separate id minted by the core).
#[derive(Default)]
pub struct PreparedStatementManager {
    statements: HashMap<u32, Box<dyn EngineStatement>>,
    long_data: HashMap<(u32, u16), Vec<u8>>,
    cached_types: HashMap<u32, Vec<(u8, bool)>>,
}

impl PreparedStatementManager {
    pub fn new() -> Self {
        PreparedStatementManager {
            statements: HashMap::new(),
            long_data: HashMap::new(),
            cached_types: HashMap::new(),
        }
    }

    /// Remembers the `(type, unsigned)` pairs bound on an `EXECUTE` that set
    /// `new_params_bound_flag`, so a later `EXECUTE` with the flag clear can
    /// reuse them (spec 9, resolved Open Question: reuse, not "no params").
    pub fn set_cached_types(&mut self, stmt_id: u32, types: Vec<(u8, bool)>) {
        self.cached_types.insert(stmt_id, types);
    }

    pub fn cached_types(&self, stmt_id: u32) -> Option<&[(u8, bool)]> {
        self.cached_types.get(&stmt_id).map(|v| v.as_slice())
    }

    pub fn insert(&mut self, statement: Box<dyn EngineStatement>) -> u32 {
        let id = statement.id();
        self.statements.insert(id, statement);
        id
    }

    pub fn get_mut(&mut self, id: u32) -> Result<&mut Box<dyn EngineStatement>, CommandError> {
        self.statements
            .get_mut(&id)
            .ok_or(CommandError::UnknownStatement(id))
    }

    /// Appends a chunk sent via COM_STMT_SEND_LONG_DATA for one parameter.
    /// Silently dropped if the statement id is unknown, per spec 4.4 (the
    /// command carries no response, so there is nothing to report back on).
    pub fn append_long_data(&mut self, stmt_id: u32, param_id: u16, chunk: &[u8]) {
        if !self.statements.contains_key(&stmt_id) {
            return;
        }
        self.long_data
            .entry((stmt_id, param_id))
            .or_insert_with(Vec::new)
            .extend_from_slice(chunk);
    }

    /// Takes and clears any long-data buffer accumulated for this (stmt, param).
    pub fn take_long_data(&mut self, stmt_id: u32, param_id: u16) -> Option<Vec<u8>> {
        self.long_data.remove(&(stmt_id, param_id))
    }

    pub fn clear_long_data_for(&mut self, stmt_id: u32) {
        self.long_data.retain(|(sid, _), _| *sid != stmt_id);
    }

    pub fn reset(&mut self, stmt_id: u32) -> Result<(), CommandError> {
        self.get_mut(stmt_id)?.reset();
        self.clear_long_data_for(stmt_id);
        Ok(())
    }

    pub fn close(&mut self, stmt_id: u32) {
        if let Some(stmt) = self.statements.remove(&stmt_id) {
            stmt.close();
        }
        self.clear_long_data_for(stmt_id);
        self.cached_types.remove(&stmt_id);
    }
}
