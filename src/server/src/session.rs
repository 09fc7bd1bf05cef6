use crate::error::CommandError;
use crate::prepared::PreparedStatementManager;
use engine::EngineSession;
use protocol::constants::STATUS_FLAG_AUTOCOMMIT;

/// Per-connection state, per spec 3 DATA MODEL. One `Session` lives for the
/// lifetime of a TCP connection, owned exclusively by its dispatcher loop.
pub struct Session {
    pub capabilities: u32,
    pub collation: u8,
    pub current_db: String,
    pub status: u16,
    pub last_insert_id: u64,
    pub affected_rows: u64,
    pub warning_count: u16,
    pub engine_session: Box<dyn EngineSession>,
    pub prepared: PreparedStatementManager,
}

impl Session {
    pub fn new(capabilities: u32, collation: u8, engine_session: Box<dyn EngineSession>) -> Self {
        let current_db = engine_session.current_db();
        Session {
            capabilities,
            collation,
            current_db,
            status: STATUS_FLAG_AUTOCOMMIT,
            last_insert_id: 0,
            affected_rows: 0,
            warning_count: 0,
            engine_session,
            prepared: PreparedStatementManager::new(),
        }
    }

    /// Pulls the engine's post-call bookkeeping into the cached session
    /// fields the OK packet is built from. Called after every command that
    /// touches the engine.
    pub fn refresh_from_engine(&mut self) {
        self.status = self.engine_session.status();
        self.last_insert_id = self.engine_session.last_insert_id();
        self.affected_rows = self.engine_session.affected_rows();
        self.warning_count = self.engine_session.warning_count();
        self.current_db = self.engine_session.current_db();
    }

    pub fn init_db(&mut self, dbname: &str) -> Result<(), CommandError> {
        self.engine_session
            .execute(&format!("USE {}", dbname))
            .map_err(CommandError::Engine)?;
        self.refresh_from_engine();
        Ok(())
    }
}
