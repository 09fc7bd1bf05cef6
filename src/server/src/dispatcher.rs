use crate::error::CommandError;
use crate::handshake::perform_handshake;
use crate::listener::AdmissionBucket;
use crate::packets::{read_command_packet, write_err_packet, write_ok_packet, CommandPacket};
use crate::result_streamer::{write_binary_resultset, write_field_list, write_text_resultset};
use crate::session::Session;
use engine::Engine;
use protocol::constants::*;
use protocol::primitives::{read_int_1, read_int_4};
use protocol::value::{decode_binary_param, Value};
use protocol::{Codec, ProtocolError};
use std::io::{Read, Write};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::RwLock;

/// Runs one connection end to end: handshake, then the command loop, until
/// `QUIT`, EOF, or a fatal protocol error. Mirrors the state machine of
/// spec 4.4 (`AwaitingHandshake` → `Ready` → `Closed`; `Streaming` is folded
/// into the result-streamer calls made from within `Ready`).
///
/// `last_cmd` is updated with the most recent command byte as it is
/// dispatched, so a caller on the other side of a `catch_unwind` boundary can
/// still report it if this function panics partway through a command.
#[allow(clippy::too_many_arguments)]
pub fn run_connection<S: Read + Write>(
    mut codec: Codec<S>,
    connection_id: u32,
    peer_addr: &str,
    engine: &dyn Engine,
    user: &str,
    password: &str,
    skip_auth: bool,
    admission: &AdmissionBucket,
    shutdown_lock: &RwLock<()>,
    last_cmd: &AtomicU8,
) {
    let outcome = match perform_handshake(&mut codec, connection_id, peer_addr, user, password, skip_auth) {
        Ok(outcome) => outcome,
        Err(e) => {
            log::warn!("conn {} handshake failed: {}", connection_id, e);
            return;
        }
    };

    let engine_session = match engine.open_session(
        outcome.capabilities,
        outcome.collation,
        outcome.database.as_deref().unwrap_or(""),
    ) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("conn {} engine session open failed: {}", connection_id, e);
            return;
        }
    };

    let mut session = Session::new(outcome.capabilities, outcome.collation, engine_session);
    let mut last_cmd_byte: u8 = 0;

    loop {
        // Step 1/4.1: the sequence counter restarts at 0 for each new
        // client command; the reply that follows continues incrementing
        // from wherever the read left off.
        codec.reset_sequence();

        let packet = match codec.read_packet() {
            Ok(p) => p,
            Err(ProtocolError::BadConnection(_)) => break,
            Err(e) => {
                log::warn!("conn {} read error: {}", connection_id, e);
                break;
            }
        };

        if packet.is_empty() {
            continue;
        }
        last_cmd_byte = packet[0];
        last_cmd.store(last_cmd_byte, Ordering::Relaxed);

        // Step 3: one admission token and the shutdown lock's reader side
        // are held for the duration of dispatch, across the whole process.
        let _token = admission.acquire();
        let _shutdown_guard = shutdown_lock.read().unwrap();

        match dispatch_one(&mut codec, &mut session, &packet) {
            Ok(should_close) => {
                if should_close {
                    break;
                }
            }
            Err(e) => {
                if e.is_fatal() {
                    log::warn!(
                        "conn {} fatal error on cmd {}: {}",
                        connection_id,
                        last_cmd_byte,
                        e
                    );
                    break;
                }
                log::warn!("conn {} error on cmd {}: {}", connection_id, last_cmd_byte, e);
                let mut buf = Vec::new();
                write_err_packet(&e, session.capabilities, &mut buf);
                if codec.write_packet(&buf).and_then(|_| codec.flush()).is_err() {
                    break;
                }
            }
        }
    }

    session.engine_session.close();
}

/// Dispatches a single command. Returns `Ok(true)` when the connection
/// should close (QUIT or an unrecoverable condition already handled).
fn dispatch_one<S: Read + Write>(
    codec: &mut Codec<S>,
    session: &mut Session,
    packet: &[u8],
) -> Result<bool, CommandError> {
    let command = read_command_packet(packet)?;
    log::debug!("cmd={:?}", command);

    match command {
        CommandPacket::Quit => {
            return Ok(true);
        }
        CommandPacket::InitDb(db) => {
            session.init_db(&db)?;
            reply_ok(codec, session)?;
        }
        CommandPacket::Query(sql) => {
            let result = session
                .engine_session
                .execute(&sql)
                .map_err(CommandError::Engine)?;
            session.refresh_from_engine();
            match result {
                Some(rs) => write_text_resultset(
                    codec,
                    &rs,
                    session.warning_count,
                    session.status,
                    session.capabilities,
                )?,
                None => reply_ok(codec, session)?,
            }
        }
        CommandPacket::Ping => {
            reply_ok(codec, session)?;
        }
        CommandPacket::FieldList { table, wildcard } => {
            let columns = session
                .engine_session
                .field_list(&table, &wildcard)
                .map_err(CommandError::Engine)?;
            write_field_list(
                codec,
                &columns,
                session.warning_count,
                session.status,
                session.capabilities,
            )?;
        }
        CommandPacket::StmtPrepare(sql) => {
            let meta = session
                .engine_session
                .prepare(&sql)
                .map_err(CommandError::Engine)?;
            let stmt_id = session.prepared.insert(meta.statement);
            write_prepare_response(codec, session, stmt_id, &meta.params, &meta.columns)?;
        }
        CommandPacket::StmtExecute(body) => {
            execute_prepared(codec, session, &body)?;
        }
        CommandPacket::StmtSendLongData(body) => {
            if body.len() < 6 {
                return Err(ProtocolError::Truncated.into());
            }
            let (stmt_id, rest) = read_int_4(&body);
            let (param_id, rest) = protocol::primitives::read_int_2(rest);
            session
                .prepared
                .get_mut(stmt_id)
                .map(|stmt| stmt.num_params())
                .and_then(|num_params| {
                    if param_id >= num_params {
                        None
                    } else {
                        Some(())
                    }
                })
                .ok_or(CommandError::WrongArguments("paramId out of range"))?;
            session.prepared.append_long_data(stmt_id, param_id, rest);
            // no response, per spec 4.4
        }
        CommandPacket::StmtClose(stmt_id) => {
            session.prepared.close(stmt_id);
            // no response, per spec 4.4
        }
        CommandPacket::StmtReset(stmt_id) => {
            session.prepared.reset(stmt_id)?;
            reply_ok(codec, session)?;
        }
        CommandPacket::Unknown(cmd) => {
            return Err(CommandError::UnsupportedCommand(cmd));
        }
    }
    Ok(false)
}

fn reply_ok<S: Read + Write>(codec: &mut Codec<S>, session: &Session) -> Result<(), CommandError> {
    let mut buf = Vec::new();
    write_ok_packet(
        session.affected_rows,
        session.last_insert_id,
        session.status,
        session.warning_count,
        session.capabilities,
        &mut buf,
    );
    codec.write_packet(&buf)?;
    codec.flush()?;
    Ok(())
}

fn write_prepare_response<S: Read + Write>(
    codec: &mut Codec<S>,
    session: &Session,
    stmt_id: u32,
    params: &[protocol::ColumnInfo],
    columns: &[protocol::ColumnInfo],
) -> Result<(), CommandError> {
    let mut header = Vec::new();
    protocol::primitives::write_int_1(0x00, &mut header);
    protocol::primitives::write_int_4(stmt_id, &mut header);
    protocol::primitives::write_int_2(columns.len() as u16, &mut header);
    protocol::primitives::write_int_2(params.len() as u16, &mut header);
    protocol::primitives::write_int_1(0, &mut header);
    protocol::primitives::write_int_2(session.warning_count, &mut header);
    codec.write_packet(&header)?;

    for p in params {
        let mut buf = Vec::new();
        protocol::column::write_column_packet(p, &mut buf);
        codec.write_packet(&buf)?;
    }
    if !params.is_empty() {
        let mut eof = Vec::new();
        crate::packets::write_eof_packet(
            session.warning_count,
            session.status,
            session.capabilities,
            &mut eof,
        );
        codec.write_packet(&eof)?;
    }

    for c in columns {
        let mut buf = Vec::new();
        protocol::column::write_column_packet(c, &mut buf);
        codec.write_packet(&buf)?;
    }
    if !columns.is_empty() {
        let mut eof = Vec::new();
        crate::packets::write_eof_packet(
            session.warning_count,
            session.status,
            session.capabilities,
            &mut eof,
        );
        codec.write_packet(&eof)?;
    }
    codec.flush()?;
    Ok(())
}

/// Decodes a `COM_STMT_EXECUTE` payload and drives the execute, per spec 4.5.
fn execute_prepared<S: Read + Write>(
    codec: &mut Codec<S>,
    session: &mut Session,
    body: &[u8],
) -> Result<(), CommandError> {
    if body.len() < 9 {
        return Err(ProtocolError::Truncated.into());
    }
    let (stmt_id, rest) = read_int_4(body);
    let (cursor_flag, rest) = read_int_1(rest);
    if cursor_flag != 0 {
        return Err(CommandError::UnsupportedFlag("cursor_flag"));
    }
    let rest = &rest[4..]; // iteration_count, ignored

    let num_params = session.prepared.get_mut(stmt_id)?.num_params();

    let args = decode_execute_params(session, stmt_id, num_params, rest)?;

    // Clear only after the long-data buffers have been consumed into `args`;
    // clearing earlier would make every long-data parameter read back empty.
    session.prepared.clear_long_data_for(stmt_id);

    let stmt = session.prepared.get_mut(stmt_id)?;
    let result = stmt.execute(&args).map_err(CommandError::Engine)?;
    session.refresh_from_engine();

    match result {
        Some(rs) => write_binary_resultset(
            codec,
            &rs,
            session.warning_count,
            session.status,
            session.capabilities,
        )?,
        None => reply_ok(codec, session)?,
    }
    Ok(())
}

fn decode_execute_params(
    session: &mut Session,
    stmt_id: u32,
    num_params: u16,
    rest: &[u8],
) -> Result<Vec<Value>, CommandError> {
    if num_params == 0 {
        return Ok(Vec::new());
    }
    let bitmap_len = (num_params as usize + 7) / 8;
    if rest.len() < bitmap_len + 1 {
        return Err(ProtocolError::Truncated.into());
    }
    let null_bitmap = &rest[..bitmap_len];
    let (new_params_bound_flag, mut rest) = read_int_1(&rest[bitmap_len..]);

    let types: Vec<(u8, bool)> = if new_params_bound_flag == 1 {
        if rest.len() < num_params as usize * 2 {
            return Err(ProtocolError::Truncated.into());
        }
        let mut types = Vec::with_capacity(num_params as usize);
        for _ in 0..num_params {
            let (type_byte, r) = read_int_1(rest);
            let (unsigned_flag, r) = read_int_1(r);
            types.push((type_byte, unsigned_flag & 0x80 != 0));
            rest = r;
        }
        session.prepared.set_cached_types(stmt_id, types.clone());
        types
    } else {
        session
            .prepared
            .cached_types(stmt_id)
            .ok_or_else(|| {
                CommandError::Protocol(ProtocolError::MalformedPacket(
                    "no cached parameter types for this statement".into(),
                ))
            })?
            .to_vec()
    };

    let mut args = Vec::with_capacity(num_params as usize);
    for (i, (mysql_type, unsigned)) in types.iter().enumerate() {
        let bit_set = (null_bitmap[i / 8] >> (i % 8)) & 1 != 0;
        if bit_set {
            args.push(Value::Null);
            continue;
        }
        if let Some(long_data) = session.prepared.take_long_data(stmt_id, i as u16) {
            args.push(Value::Bytes(long_data));
            continue;
        }
        let (value, r) = decode_binary_param(rest, *mysql_type, *unsigned)?;
        rest = r;
        args.push(value);
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::primitives::{
        read_int_3, write_int_1, write_int_2, write_int_3, write_int_4, write_null_string,
    };
    use std::io::{BufReader, BufWriter, Cursor};

    fn framed(seq: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        write_int_3(payload.len() as u32, &mut out);
        out.push(seq);
        out.extend_from_slice(payload);
        out
    }

    fn handshake_response() -> Vec<u8> {
        let mut buf = Vec::new();
        write_int_4(0, &mut buf); // capabilities: none negotiated, keeps replies minimal
        write_int_4(0, &mut buf); // max packet size, ignored
        write_int_1(0, &mut buf); // collation
        buf.extend_from_slice(&[0_u8; 23]); // reserved
        write_null_string("root", &mut buf);
        write_int_1(0, &mut buf); // auth response length: skip_auth means it's never checked
        buf
    }

    fn split_packets(mut data: &[u8]) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        while data.len() >= 4 {
            let (len, rest) = read_int_3(data);
            let rest = &rest[1..]; // skip the sequence byte
            let len = len as usize;
            out.push(rest[..len].to_vec());
            data = &rest[len..];
        }
        out
    }

    /// Regression test for the long-data clear-ordering bug: a value sent via
    /// two `COM_STMT_SEND_LONG_DATA` chunks must still be visible to
    /// `COM_STMT_EXECUTE`, i.e. `clear_long_data_for` must run after the
    /// chunks are consumed into the bound arguments, not before.
    #[test]
    fn test_send_long_data_survives_execute() {
        let stmt_prepare = {
            let mut p = vec![COM_STMT_PREPARE];
            p.extend_from_slice(b"SELECT ?");
            p
        };
        let send_long_data = |param_id: u16, data: &[u8]| {
            let mut p = vec![COM_STMT_SEND_LONG_DATA];
            write_int_4(1, &mut p); // stmt_id: the engine's first prepared statement is always id 1
            write_int_2(param_id, &mut p);
            p.extend_from_slice(data);
            p
        };
        let stmt_execute = {
            let mut p = vec![COM_STMT_EXECUTE];
            write_int_4(1, &mut p); // stmt_id
            write_int_1(0, &mut p); // cursor_flag
            write_int_4(1, &mut p); // iteration_count, ignored
            write_int_1(0, &mut p); // null bitmap: param 0 not null
            write_int_1(1, &mut p); // new_params_bound_flag
            write_int_1(MYSQL_TYPE_VAR_STRING, &mut p);
            write_int_1(0, &mut p); // unsigned_flag
            p
        };

        let mut input = Vec::new();
        input.extend(framed(1, &handshake_response()));
        input.extend(framed(0, &stmt_prepare));
        input.extend(framed(0, &send_long_data(0, b"abc")));
        input.extend(framed(0, &send_long_data(0, b"def")));
        input.extend(framed(0, &stmt_execute));
        input.extend(framed(0, &[COM_QUIT]));

        let mut output = Vec::new();
        let codec = Codec::from_parts(
            BufReader::new(Cursor::new(&mut input)),
            BufWriter::new(Cursor::new(&mut output)),
        );

        let engine = engine_memory::MemoryEngine::new();
        let admission = AdmissionBucket::new(1);
        let shutdown_lock = RwLock::new(());
        let last_cmd = AtomicU8::new(0);

        run_connection(
            codec,
            1,
            "127.0.0.1:1",
            &engine,
            "root",
            "",
            true,
            &admission,
            &shutdown_lock,
            &last_cmd,
        );

        let payloads = split_packets(&output);
        // greeting, handshake OK, 5 prepare-reply packets, 5 execute-reply packets
        assert_eq!(payloads.len(), 12);
        let row = &payloads[payloads.len() - 2];
        let expected = [&[0x00_u8, 0x00, 0x06][..], &b"abcdef"[..]].concat();
        assert_eq!(row, &expected, "long-data chunks did not survive to execute");
    }
}
