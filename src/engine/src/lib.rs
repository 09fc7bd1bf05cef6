//! The boundary the protocol core consumes (spec 4.8): open session, execute
//! text, prepare, execute prepared, field-list, close. SQL parsing, planning,
//! storage and transaction management live entirely on the other side of
//! this boundary and are not this crate's concern.
use protocol::constants::MYSQL_ER_UNKNOWN_ERROR;
use protocol::{ColumnInfo, Value};
use std::fmt::{Display, Formatter};

/// An error surfaced by an engine. Carries its own MySQL error code/SQLSTATE
/// so the server can pass it through verbatim; engines that don't know their
/// own MySQL-shaped error construct one with `EngineError::unknown`, which the
/// server then reports as `ER_UNKNOWN_ERROR`.
#[derive(Debug, Clone)]
pub struct EngineError {
    pub message: String,
    pub code: u16,
    pub sql_state: &'static str,
}

impl EngineError {
    pub fn unknown(message: impl Into<String>) -> Self {
        EngineError {
            message: message.into(),
            code: MYSQL_ER_UNKNOWN_ERROR.code,
            sql_state: MYSQL_ER_UNKNOWN_ERROR.sql_state,
        }
    }

    pub fn with_code(message: impl Into<String>, code: u16, sql_state: &'static str) -> Self {
        EngineError {
            message: message.into(),
            code,
            sql_state,
        }
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EngineError {}

pub type EngineResult<T> = Result<T, EngineError>;

/// An ordered list of columns and an ordered list of rows, per spec 3.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<ColumnInfo>, rows: Vec<Vec<Value>>) -> Self {
        ResultSet { columns, rows }
    }
}

/// What `EngineSession::prepare` hands back: the statement handle plus the
/// column metadata for the parameter placeholders and the result columns.
pub struct PreparedMeta {
    pub statement: Box<dyn EngineStatement>,
    pub params: Vec<ColumnInfo>,
    pub columns: Vec<ColumnInfo>,
}

/// Opens per-connection sessions against a concrete backend.
pub trait Engine: Send + Sync {
    fn open_session(
        &self,
        capabilities: u32,
        collation: u8,
        dbname: &str,
    ) -> EngineResult<Box<dyn EngineSession>>;
}

/// A single logical connection to the backend. Not `Sync`: owned exclusively
/// by one dispatcher loop for the lifetime of the TCP connection.
pub trait EngineSession: Send {
    fn status(&self) -> u16;
    fn last_insert_id(&self) -> u64;
    fn affected_rows(&self) -> u64;
    fn warning_count(&self) -> u16;
    fn current_db(&self) -> String;

    fn execute(&mut self, sql: &str) -> EngineResult<Option<ResultSet>>;

    fn prepare(&mut self, sql: &str) -> EngineResult<PreparedMeta>;

    fn field_list(&mut self, table: &str, wildcard: &str) -> EngineResult<Vec<ColumnInfo>>;

    fn close(self: Box<Self>);
}

/// A single prepared statement, owned by the core's prepared-statement
/// manager for the lifetime between `COM_STMT_PREPARE` and `COM_STMT_CLOSE`.
pub trait EngineStatement: Send {
    fn id(&self) -> u32;
    fn num_params(&self) -> u16;
    fn execute(&mut self, args: &[Value]) -> EngineResult<Option<ResultSet>>;
    fn reset(&mut self);
    fn close(self: Box<Self>);
}
