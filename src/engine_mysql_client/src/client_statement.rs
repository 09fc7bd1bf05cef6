use crate::wire::{self, CommandReply};
use crate::{ClientState, SharedCodec};
use engine::{EngineResult, EngineStatement, ResultSet};
use protocol::constants::{COM_STMT_CLOSE, COM_STMT_EXECUTE, COM_STMT_RESET};
use protocol::primitives::write_int_4;
use protocol::{ColumnInfo, Value};
use std::sync::{Arc, Mutex};

pub struct MysqlClientStatement {
    id: u32,
    num_params: u16,
    columns: Vec<ColumnInfo>,
    codec: SharedCodec,
    state: Arc<Mutex<ClientState>>,
}

impl MysqlClientStatement {
    pub fn new(
        id: u32,
        num_params: u16,
        columns: Vec<ColumnInfo>,
        codec: SharedCodec,
        state: Arc<Mutex<ClientState>>,
    ) -> Self {
        MysqlClientStatement {
            id,
            num_params,
            columns,
            codec,
            state,
        }
    }
}

impl EngineStatement for MysqlClientStatement {
    fn id(&self) -> u32 {
        self.id
    }

    fn num_params(&self) -> u16 {
        self.num_params
    }

    fn execute(&mut self, args: &[Value]) -> EngineResult<Option<ResultSet>> {
        let mut codec = self.codec.lock().unwrap();
        codec.reset_sequence();
        let mut body = vec![COM_STMT_EXECUTE];
        body.extend_from_slice(&wire::write_execute_body(self.id, args));
        codec.write_packet(&body).map_err(|e| engine::EngineError::unknown(e.to_string()))?;
        codec.flush().map_err(|e| engine::EngineError::unknown(e.to_string()))?;

        let reply = wire::read_execute_reply(&mut codec, &self.columns)?;
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

    fn reset(&mut self) {
        let mut codec = self.codec.lock().unwrap();
        codec.reset_sequence();
        let mut body = vec![COM_STMT_RESET];
        write_int_4(self.id, &mut body);
        let _ = codec.write_packet(&body);
        let _ = codec.flush();
        let _ = codec.read_packet();
    }

    fn close(self: Box<Self>) {
        let mut codec = self.codec.lock().unwrap();
        codec.reset_sequence();
        let mut body = vec![COM_STMT_CLOSE];
        write_int_4(self.id, &mut body);
        // COM_STMT_CLOSE has no response per spec 4.4.
        let _ = codec.write_packet(&body);
        let _ = codec.flush();
    }
}
