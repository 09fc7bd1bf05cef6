use crate::client_statement::MysqlClientStatement;
use crate::wire::{self, CommandReply};
use crate::{ClientState, SharedCodec};
use engine::{EngineError, EngineResult, EngineSession, PreparedMeta, ResultSet};
use protocol::constants::{
    COM_FIELD_LIST, COM_INIT_DB, COM_QUERY, COM_QUIT, COM_STMT_PREPARE, STATUS_FLAG_AUTOCOMMIT,
};
use protocol::primitives::read_null_string;
use protocol::ColumnInfo;
use std::sync::{Arc, Mutex};

pub struct MysqlClientSession {
    codec: SharedCodec,
    state: Arc<Mutex<ClientState>>,
}

impl MysqlClientSession {
    pub fn new(codec: SharedCodec) -> Self {
        MysqlClientSession {
            codec,
            state: Arc::new(Mutex::new(ClientState {
                status: STATUS_FLAG_AUTOCOMMIT,
                last_insert_id: 0,
                affected_rows: 0,
                warning_count: 0,
                current_db: String::new(),
            })),
        }
    }

    fn send_command(&mut self, command: u8, body: &[u8]) -> EngineResult<()> {
        let mut codec = self.codec.lock().unwrap();
        codec.reset_sequence();
        let mut packet = vec![command];
        packet.extend_from_slice(body);
        codec
            .write_packet(&packet)
            .map_err(|e| EngineError::unknown(e.to_string()))?;
        codec.flush().map_err(|e| EngineError::unknown(e.to_string()))
    }
}

impl EngineSession for MysqlClientSession {
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

    fn execute(&mut self, sql: &str) -> EngineResult<Option<ResultSet>> {
        self.send_command(COM_QUERY, sql.as_bytes())?;
        let mut codec = self.codec.lock().unwrap();
        let reply = wire::read_text_reply(&mut codec)?;
        drop(codec);
        match reply {
            CommandReply::Ok {
                affected_rows,
                last_insert_id,
                status,
                warnings,
            } => {
                let mut state = self.state.lock().unwrap();
                state.status = status;
                state.affected_rows = affected_rows;
                state.last_insert_id = last_insert_id;
                state.warning_count = warnings;
                Ok(None)
            }
            CommandReply::Rows { columns, rows } => Ok(Some(ResultSet::new(columns, rows))),
        }
    }

    fn prepare(&mut self, sql: &str) -> EngineResult<PreparedMeta> {
        self.send_command(COM_STMT_PREPARE, sql.as_bytes())?;
        let mut codec = self.codec.lock().unwrap();
        let reply = wire::read_prepare_reply(&mut codec)?;
        drop(codec);
        let statement = MysqlClientStatement::new(
            reply.statement_id,
            reply.num_params,
            reply.columns.clone(),
            Arc::clone(&self.codec),
            Arc::clone(&self.state),
        );
        Ok(PreparedMeta {
            statement: Box::new(statement),
            params: reply.params,
            columns: reply.columns,
        })
    }

    fn field_list(&mut self, table: &str, wildcard: &str) -> EngineResult<Vec<ColumnInfo>> {
        let mut body = Vec::new();
        body.extend_from_slice(table.as_bytes());
        body.push(0);
        body.extend_from_slice(wildcard.as_bytes());
        self.send_command(COM_FIELD_LIST, &body)?;

        let mut codec = self.codec.lock().unwrap();
        let mut columns = Vec::new();
        loop {
            let packet = codec
                .read_packet()
                .map_err(|e| EngineError::unknown(e.to_string()))?;
            if packet.first() == Some(&0xfe) && packet.len() < 9 {
                break;
            }
            if packet.first() == Some(&0xff) {
                return Err(EngineError::unknown(format!(
                    "field list failed: {}",
                    read_null_string(&packet[1..]).map(|(s, _)| s).unwrap_or_default()
                )));
            }
            columns.push(crate::wire::parse_standalone_column(&packet).map_err(|e| EngineError::unknown(e.to_string()))?);
        }
        Ok(columns)
    }

    fn close(self: Box<Self>) {
        let mut codec = self.codec.lock().unwrap();
        codec.reset_sequence();
        let _ = codec.write_packet(&[COM_QUIT]);
        let _ = codec.flush();
    }
}

pub fn init_db(session: &mut MysqlClientSession, dbname: &str) -> EngineResult<()> {
    session.send_command(COM_INIT_DB, dbname.as_bytes())?;
    let mut codec = session.codec.lock().unwrap();
    let reply = wire::read_text_reply(&mut codec)?;
    if let CommandReply::Ok { .. } = reply {
        session.state.lock().unwrap().current_db = dbname.to_string();
    }
    Ok(())
}
