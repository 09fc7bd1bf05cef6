use engine::EngineError;
use protocol::constants::*;
use protocol::ProtocolError;
use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// The full error taxonomy surfaced by the dispatcher, per spec 7. Every
/// variant maps to a MySQL error code + SQLSTATE + message via `mysql_error`.
#[derive(Debug)]
pub enum CommandError {
    Protocol(ProtocolError),
    AuthFailed(String),
    UnknownStatement(u32),
    WrongArguments(&'static str),
    UnsupportedCommand(u8),
    UnsupportedFlag(&'static str),
    Engine(EngineError),
}

impl CommandError {
    /// Whether the connection must be closed without attempting a reply.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CommandError::Protocol(p) if p.is_fatal())
    }

    pub fn mysql_error(&self) -> MyError<'_> {
        match self {
            CommandError::Protocol(p) => p.mysql_error(),
            CommandError::AuthFailed(msg) => MyError {
                code: MYSQL_ER_ACCESS_DENIED_ERROR.code,
                msg: Cow::Owned(msg.clone()),
                sql_state: MYSQL_ER_ACCESS_DENIED_ERROR.sql_state,
            },
            CommandError::UnknownStatement(_) => MYSQL_ER_UNKNOWN_STMT_HANDLER,
            CommandError::WrongArguments(msg) => MyError {
                code: MYSQL_ER_WRONG_ARGUMENTS.code,
                msg: Cow::Borrowed(msg),
                sql_state: MYSQL_ER_WRONG_ARGUMENTS.sql_state,
            },
            CommandError::UnsupportedCommand(cmd) => MyError {
                code: MYSQL_ER_UNKNOWN_ERROR.code,
                msg: Cow::Owned(format!("command {} not supported now", cmd)),
                sql_state: MYSQL_ER_UNKNOWN_ERROR.sql_state,
            },
            CommandError::UnsupportedFlag(msg) => MyError {
                code: MYSQL_ER_UNKNOWN_ERROR.code,
                msg: Cow::Borrowed(msg),
                sql_state: MYSQL_ER_UNKNOWN_ERROR.sql_state,
            },
            CommandError::Engine(e) => MyError {
                code: e.code,
                msg: Cow::Borrowed(&e.message),
                sql_state: e.sql_state,
            },
        }
    }
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Protocol(p) => Display::fmt(p, f),
            CommandError::AuthFailed(msg) => write!(f, "access denied: {}", msg),
            CommandError::UnknownStatement(id) => write!(f, "unknown prepared statement {}", id),
            CommandError::WrongArguments(msg) => write!(f, "wrong arguments: {}", msg),
            CommandError::UnsupportedCommand(cmd) => {
                write!(f, "command {} not supported now", cmd)
            }
            CommandError::UnsupportedFlag(msg) => write!(f, "unsupported flag: {}", msg),
            CommandError::Engine(e) => Display::fmt(e, f),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<ProtocolError> for CommandError {
    fn from(err: ProtocolError) -> Self {
        CommandError::Protocol(err)
    }
}

impl From<EngineError> for CommandError {
    fn from(err: EngineError) -> Self {
        CommandError::Engine(err)
    }
}
