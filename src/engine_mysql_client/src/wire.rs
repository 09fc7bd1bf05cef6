//! Response decoding shared by the session and its prepared statements: OK/ERR
//! dispatch, column-definition packets (the read side of `column::write_column_packet`),
//! and the text/binary row formats (spec 4.6), read here instead of written.
use engine::{EngineError, EngineResult};
use protocol::constants::*;
use protocol::primitives::*;
use protocol::value::{decode_binary_result, encode_binary_result, parse_text};
use protocol::{Codec, ColumnInfo, ProtocolError, Value};
use std::io::{Read, Write};

pub enum CommandReply {
    Ok {
        affected_rows: u64,
        last_insert_id: u64,
        status: u16,
        warnings: u16,
    },
    Rows {
        columns: Vec<ColumnInfo>,
        rows: Vec<Vec<Value>>,
    },
}

fn engine_err(err: ProtocolError) -> EngineError {
    EngineError::unknown(err.to_string())
}

/// COM_FIELD_LIST replies with bare column-definition packets, no leading
/// count and no trailing EOF capability gating; exposed for the session to
/// use directly.
pub fn parse_standalone_column(buf: &[u8]) -> Result<ColumnInfo, ProtocolError> {
    read_column_packet(buf)
}

fn read_column_packet(buf: &[u8]) -> Result<ColumnInfo, ProtocolError> {
    let (_catalog, rest) = read_enc_string(buf)?;
    let (schema, rest) = read_enc_string(rest)?;
    let (table, rest) = read_enc_string(rest)?;
    let (org_table, rest) = read_enc_string(rest)?;
    let (name, rest) = read_enc_string(rest)?;
    let (org_name, rest) = read_enc_string(rest)?;
    let (_fixed_len, rest) = read_enc_int(rest)?;
    let (charset, rest) = read_int_2(rest);
    let (column_length, rest) = read_int_4(rest);
    let (column_type, rest) = read_int_1(rest);
    let (flag, rest) = read_int_2(rest);
    let (decimal, rest) = read_int_1(rest);
    let rest = &rest[2..]; // filler
    let column = ColumnInfo::new(
        schema,
        table,
        org_table,
        name,
        org_name,
        column_length,
        column_type,
        flag,
        decimal,
    )
    .with_charset(charset);
    let column = if !rest.is_empty() {
        let (default, _is_null, _rest) = read_enc_bytestring(rest)?;
        column.with_default_value(default)
    } else {
        column
    };
    Ok(column)
}

fn parse_err_packet(buf: &[u8]) -> EngineError {
    let rest = &buf[1..];
    let (code, rest) = read_int_2(rest);
    let (sql_state, rest) = if rest.first() == Some(&b'#') {
        let (state, rest) = read_fixed_length_bytestring(&rest[1..], 5).unwrap_or((Vec::new(), rest));
        (String::from_utf8_lossy(&state).into_owned(), rest)
    } else {
        (String::new(), rest)
    };
    let message = read_eof_string(rest).unwrap_or_default();
    EngineError::with_code(format!("{} {}", sql_state, message), code, "HY000")
}

fn parse_ok_packet(buf: &[u8]) -> Result<CommandReply, ProtocolError> {
    let rest = &buf[1..];
    let (affected_rows, rest) = read_enc_int(rest)?;
    let (last_insert_id, rest) = read_enc_int(rest)?;
    let (status, rest) = if rest.len() >= 2 { read_int_2(rest) } else { (0, rest) };
    let (warnings, _rest) = if rest.len() >= 2 { read_int_2(rest) } else { (0, rest) };
    Ok(CommandReply::Ok {
        affected_rows: affected_rows.unwrap_or(0),
        last_insert_id: last_insert_id.unwrap_or(0),
        status,
        warnings,
    })
}

/// Reads a COM_QUERY/COM_STMT_PREPARE-style response that is either OK, ERR,
/// or a text result-set header followed by columns, an EOF, and rows.
pub fn read_text_reply<S: Read + Write>(codec: &mut Codec<S>) -> EngineResult<CommandReply> {
    let header = codec.read_packet().map_err(engine_err)?;
    if header.first() == Some(&0x00) {
        return parse_ok_packet(&header).map_err(engine_err);
    }
    if header.first() == Some(&0xff) {
        return Err(parse_err_packet(&header));
    }
    let (column_count, _) = read_enc_int(&header).map_err(engine_err)?;
    let column_count = column_count.unwrap_or(0) as usize;

    let mut columns = Vec::with_capacity(column_count);
    for _ in 0..column_count {
        let packet = codec.read_packet().map_err(engine_err)?;
        columns.push(read_column_packet(&packet).map_err(engine_err)?);
    }
    let _eof = codec.read_packet().map_err(engine_err)?;

    let mut rows = Vec::new();
    loop {
        let packet = codec.read_packet().map_err(engine_err)?;
        if packet.first() == Some(&0xfe) && packet.len() < 9 {
            break;
        }
        let mut row = Vec::with_capacity(columns.len());
        let mut rest = packet.as_slice();
        for column in &columns {
            let (bytes, is_null, next) = read_enc_bytestring(rest).map_err(engine_err)?;
            rest = next;
            if is_null {
                row.push(Value::Null);
            } else {
                row.push(parse_text(&bytes, column.column_type(), column.is_unsigned()).map_err(engine_err)?);
            }
        }
        rows.push(row);
    }
    Ok(CommandReply::Rows { columns, rows })
}

/// STMT_PREPARE_OK plus its parameter and result column definitions (spec
/// 4.5). Each non-empty group is followed by an EOF, as this client declares
/// no `CLIENT_DEPRECATE_EOF` capability.
pub struct PrepareReply {
    pub statement_id: u32,
    pub num_params: u16,
    pub num_columns: u16,
    pub params: Vec<ColumnInfo>,
    pub columns: Vec<ColumnInfo>,
}

pub fn read_prepare_reply<S: Read + Write>(codec: &mut Codec<S>) -> EngineResult<PrepareReply> {
    let header = codec.read_packet().map_err(engine_err)?;
    if header.first() == Some(&0xff) {
        return Err(parse_err_packet(&header));
    }
    let rest = &header[1..];
    let (statement_id, rest) = read_int_4(rest);
    let (num_columns, rest) = read_int_2(rest);
    let (num_params, _rest) = read_int_2(rest);

    let mut params = Vec::with_capacity(num_params as usize);
    for _ in 0..num_params {
        let packet = codec.read_packet().map_err(engine_err)?;
        params.push(read_column_packet(&packet).map_err(engine_err)?);
    }
    if num_params > 0 {
        codec.read_packet().map_err(engine_err)?;
    }

    let mut columns = Vec::with_capacity(num_columns as usize);
    for _ in 0..num_columns {
        let packet = codec.read_packet().map_err(engine_err)?;
        columns.push(read_column_packet(&packet).map_err(engine_err)?);
    }
    if num_columns > 0 {
        codec.read_packet().map_err(engine_err)?;
    }

    Ok(PrepareReply {
        statement_id,
        num_params,
        num_columns,
        params,
        columns,
    })
}

/// A conservative type guess for a bound parameter; real MySQL clients pick
/// this the same way since the wire protocol carries no richer type system
/// than the one spec 3 already defines.
fn infer_param_type(value: &Value) -> (u8, bool) {
    match value {
        Value::Null => (MYSQL_TYPE_NULL, false),
        Value::SignedInt(_) => (MYSQL_TYPE_LONGLONG, false),
        Value::UnsignedInt(_) => (MYSQL_TYPE_LONGLONG, true),
        Value::Double(_) => (MYSQL_TYPE_DOUBLE, false),
        Value::Decimal(_) => (MYSQL_TYPE_NEWDECIMAL, false),
        Value::Date(_) => (MYSQL_TYPE_DATE, false),
        Value::DateTime(_, _) => (MYSQL_TYPE_DATETIME, false),
        Value::Time(_) => (MYSQL_TYPE_TIME, false),
        Value::Year(_) => (MYSQL_TYPE_YEAR, false),
        Value::Bytes(_) | Value::Text(_) => (MYSQL_TYPE_VAR_STRING, false),
    }
}

/// Builds a COM_STMT_EXECUTE body: statement id, cursor flag, iteration
/// count, NULL bitmap, new-params-bound flag and types, then the values
/// (spec 4.5). Always sends types, i.e. always behaves as though
/// `new_params_bound_flag == 1`; there is no cached-type state to reuse on
/// this side of the wire.
pub fn write_execute_body(statement_id: u32, params: &[Value]) -> Vec<u8> {
    let mut buf = Vec::new();
    write_int_4(statement_id, &mut buf);
    write_int_1(0, &mut buf); // cursor type: no cursor
    write_int_4(1, &mut buf); // iteration count

    if !params.is_empty() {
        let bitmap_len = (params.len() + 7) / 8;
        let mut bitmap = vec![0_u8; bitmap_len];
        for (i, value) in params.iter().enumerate() {
            if value.is_null() {
                bitmap[i / 8] |= 1 << (i % 8);
            }
        }
        buf.extend_from_slice(&bitmap);
        write_int_1(1, &mut buf); // new-params-bound flag
        for value in params {
            let (mysql_type, unsigned) = infer_param_type(value);
            write_int_1(mysql_type, &mut buf);
            write_int_1(if unsigned { 0x80 } else { 0 }, &mut buf);
        }
        for value in params {
            if !value.is_null() {
                let (mysql_type, _) = infer_param_type(value);
                encode_binary_result(value, mysql_type, &mut buf);
            }
        }
    }
    buf
}

/// Reads a COM_STMT_EXECUTE reply: OK/ERR or a binary result-set (spec 4.6).
pub fn read_execute_reply<S: Read + Write>(
    codec: &mut Codec<S>,
    columns: &[ColumnInfo],
) -> EngineResult<CommandReply> {
    let header = codec.read_packet().map_err(engine_err)?;
    if header.first() == Some(&0x00) {
        return parse_ok_packet(&header).map_err(engine_err);
    }
    if header.first() == Some(&0xff) {
        return Err(parse_err_packet(&header));
    }
    // Result-set header repeats the column definitions; the prepare reply
    // already gave us typed `ColumnInfo`s, so just drain and discard these.
    let (column_count, _) = read_enc_int(&header).map_err(engine_err)?;
    let column_count = column_count.unwrap_or(0) as usize;
    for _ in 0..column_count {
        codec.read_packet().map_err(engine_err)?;
    }
    let _eof = codec.read_packet().map_err(engine_err)?;

    let bitmap_len = (columns.len() + 7 + 2) / 8;
    let mut rows = Vec::new();
    loop {
        let packet = codec.read_packet().map_err(engine_err)?;
        if packet.first() == Some(&0xfe) && packet.len() < 9 {
            break;
        }
        let bitmap = &packet[1..1 + bitmap_len];
        let mut rest = &packet[1 + bitmap_len..];
        let mut row = Vec::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            let is_null = bitmap[(i + 2) / 8] & (1 << ((i + 2) % 8)) != 0;
            if is_null {
                row.push(Value::Null);
            } else {
                let (value, next) =
                    decode_binary_result(rest, column.column_type(), column.is_unsigned()).map_err(engine_err)?;
                rest = next;
                row.push(value);
            }
        }
        rows.push(row);
    }
    Ok(CommandReply::Rows { columns: columns.to_vec(), rows })
}
