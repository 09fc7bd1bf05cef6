//! An `Engine` that proxies a real MySQL server over the wire instead of
//! answering queries itself. Its wire code mirrors the server crate's --
//! same packet framing, same handshake, same result-set formats -- read
//! from the client's end instead of written from the server's.
mod client_session;
mod client_statement;
mod handshake;
mod wire;

pub use client_session::MysqlClientSession;
pub use client_statement::MysqlClientStatement;

use engine::{Engine, EngineError, EngineResult, EngineSession};
use protocol::Codec;
use std::io::{BufReader, BufWriter};
use std::net::TcpStream;
use std::sync::{Arc, Mutex};

pub(crate) type SharedCodec = Arc<Mutex<Codec<TcpStream>>>;

pub(crate) struct ClientState {
    pub status: u16,
    pub last_insert_id: u64,
    pub affected_rows: u64,
    pub warning_count: u16,
    pub current_db: String,
}

/// Dials a real MySQL-compatible server and authenticates once per session.
pub struct MysqlClientEngine {
    address: String,
    user: String,
    password: String,
}

impl MysqlClientEngine {
    pub fn new(address: impl Into<String>, user: impl Into<String>, password: impl Into<String>) -> Self {
        MysqlClientEngine {
            address: address.into(),
            user: user.into(),
            password: password.into(),
        }
    }
}

impl Engine for MysqlClientEngine {
    fn open_session(
        &self,
        _capabilities: u32,
        _collation: u8,
        dbname: &str,
    ) -> EngineResult<Box<dyn EngineSession>> {
        let stream = TcpStream::connect(&self.address)
            .map_err(|e| EngineError::unknown(format!("connect to {} failed: {}", self.address, e)))?;
        let write_half = stream
            .try_clone()
            .map_err(|e| EngineError::unknown(format!("clone stream failed: {}", e)))?;
        let mut codec = Codec::from_parts(BufReader::new(stream), BufWriter::new(write_half));

        handshake::perform_client_handshake(&mut codec, &self.user, &self.password)
            .map_err(|e| EngineError::unknown(e.to_string()))?;

        let codec: SharedCodec = Arc::new(Mutex::new(codec));
        let mut session = MysqlClientSession::new(codec);
        if !dbname.is_empty() {
            client_session::init_db(&mut session, dbname)?;
        }
        Ok(Box::new(session))
    }
}
