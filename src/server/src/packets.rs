use crate::error::CommandError;
use protocol::constants::*;
use protocol::primitives::*;
use protocol::ProtocolError;
use std::collections::HashMap;

const SERVER_VERSION: &str = "8.0.0-mysqld";
const AUTH_PLUGIN_NAME: &str = "mysql_native_password";

/// Writes the initial handshake packet (Protocol::HandshakeV10), per spec 4.3.
pub fn write_handshake_packet(connection_id: u32, salt: &[u8; 20], buffer: &mut Vec<u8>) {
    write_int_1(10, buffer); // protocol version
    write_null_string(SERVER_VERSION, buffer);
    write_int_4(connection_id, buffer);
    buffer.extend_from_slice(&salt[..8]);
    write_int_1(0, buffer); // filler
    write_int_2(SERVER_SUPPORTED_CAPABILITIES as u16, buffer);
    write_int_1(CHARSET_UTF8_GENERAL_CI as u8, buffer);
    write_int_2(STATUS_FLAG_AUTOCOMMIT, buffer);
    write_int_2((SERVER_SUPPORTED_CAPABILITIES >> 16) as u16, buffer);
    write_int_1(0x15, buffer); // auth-data length, for Wireshark compatibility
    buffer.extend_from_slice(&[0_u8; 10]); // reserved
    buffer.extend_from_slice(&salt[8..20]);
    write_int_1(0, buffer);
    write_null_string(AUTH_PLUGIN_NAME, buffer);
}

#[derive(Debug, Default, PartialEq)]
pub struct HandshakeResponse {
    pub capabilities: u32,
    pub collation: u8,
    pub username: String,
    pub auth_response: Vec<u8>,
    pub database: Option<String>,
}

/// Parses the client's handshake response, per spec 4.3.
pub fn read_handshake_response(buffer: &[u8]) -> Result<HandshakeResponse, ProtocolError> {
    if buffer.len() < 4 + 4 + 1 + 23 {
        return Err(ProtocolError::Truncated);
    }
    let (capabilities, rest) = read_int_4(buffer);
    let rest = &rest[4..]; // max packet size, ignored
    let (collation, rest) = read_int_1(rest);
    let rest = &rest[23..]; // reserved
    let (username, rest) = read_null_string(rest)?;

    let (auth_len, rest) = read_int_1(rest);
    let (auth_response, rest) = read_fixed_length_bytestring(rest, auth_len as usize)?;

    let (database, rest) = if capabilities & CAPABILITY_CLIENT_CONNECT_WITH_DB != 0 {
        let (db, rest) = read_null_string(rest)?;
        (Some(db), rest)
    } else {
        (None, rest)
    };
    let _ = rest; // plugin name / connect attrs, not consumed by the core

    Ok(HandshakeResponse {
        capabilities,
        collation,
        username,
        auth_response,
        database,
    })
}

pub fn write_ok_packet(
    affected_rows: u64,
    last_insert_id: u64,
    status: u16,
    warnings: u16,
    capabilities: u32,
    buffer: &mut Vec<u8>,
) {
    write_int_1(0x00, buffer);
    write_enc_int(affected_rows, buffer);
    write_enc_int(last_insert_id, buffer);
    if capabilities & CAPABILITY_CLIENT_PROTOCOL_41 != 0 {
        write_int_2(status, buffer);
        write_int_2(warnings, buffer);
    } else if capabilities & CAPABILITY_CLIENT_TRANSACTIONS != 0 {
        write_int_2(status, buffer);
    }
}

pub fn write_eof_packet(warnings: u16, status: u16, capabilities: u32, buffer: &mut Vec<u8>) {
    write_int_1(0xfe, buffer);
    if capabilities & CAPABILITY_CLIENT_PROTOCOL_41 != 0 {
        write_int_2(warnings, buffer);
        write_int_2(status, buffer);
    }
}

pub fn write_err_packet(err: &CommandError, capabilities: u32, buffer: &mut Vec<u8>) {
    let my_err = err.mysql_error();
    write_int_1(0xff, buffer);
    write_int_2(my_err.code, buffer);
    if capabilities & CAPABILITY_CLIENT_PROTOCOL_41 != 0 {
        write_int_1(b'#', buffer);
        buffer.extend_from_slice(my_err.sql_state.as_bytes());
    }
    write_eof_string(&my_err.msg, buffer);
}

pub fn write_resultset_header_packet(column_count: usize, buffer: &mut Vec<u8>) {
    write_enc_int(column_count as u64, buffer);
}

/// Client-command packets, classified by the COM_* byte (spec 4.4).
#[derive(Debug, PartialEq)]
pub enum CommandPacket {
    Quit,
    InitDb(String),
    Query(String),
    Ping,
    FieldList { table: String, wildcard: String },
    StmtPrepare(String),
    StmtExecute(Vec<u8>),
    StmtSendLongData(Vec<u8>),
    StmtClose(u32),
    StmtReset(u32),
    Unknown(u8),
}

pub fn read_command_packet(buffer: &[u8]) -> Result<CommandPacket, ProtocolError> {
    if buffer.is_empty() {
        return Err(ProtocolError::Truncated);
    }
    if buffer[0] == LOCAL_INFILE_HEADER {
        return Err(ProtocolError::MalformedPacket(
            "LOCAL INFILE is not supported".into(),
        ));
    }
    let body = &buffer[1..];
    let packet = match buffer[0] {
        COM_QUIT => CommandPacket::Quit,
        COM_INIT_DB => CommandPacket::InitDb(read_eof_string(body)?),
        COM_QUERY => CommandPacket::Query(read_eof_string(body)?),
        COM_PING => CommandPacket::Ping,
        COM_FIELD_LIST => {
            let (table, rest) = read_null_string(body)?;
            let wildcard = read_eof_string(rest)?;
            CommandPacket::FieldList { table, wildcard }
        }
        COM_STMT_PREPARE => CommandPacket::StmtPrepare(read_eof_string(body)?),
        COM_STMT_EXECUTE => CommandPacket::StmtExecute(body.to_vec()),
        COM_STMT_SEND_LONG_DATA => CommandPacket::StmtSendLongData(body.to_vec()),
        COM_STMT_CLOSE => {
            if body.len() < 4 {
                return Err(ProtocolError::Truncated);
            }
            let (id, _) = read_int_4(body);
            CommandPacket::StmtClose(id)
        }
        COM_STMT_RESET => {
            if body.len() < 4 {
                return Err(ProtocolError::Truncated);
            }
            let (id, _) = read_int_4(body);
            CommandPacket::StmtReset(id)
        }
        other => CommandPacket::Unknown(other),
    };
    Ok(packet)
}

/// Parses the client connection-attribute blob present on plugin-auth
/// handshake responses. Unused by the core dispatch path; kept for the
/// wire-compatibility tests that assert real client handshakes parse.
pub fn read_connection_attrs(mut buffer: &[u8]) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    while !buffer.is_empty() {
        let (key, rest) = match read_enc_string(buffer) {
            Ok(v) => v,
            Err(_) => break,
        };
        let (value, rest) = match read_enc_string(rest) {
            Ok(v) => v,
            Err(_) => break,
        };
        attrs.insert(key, value);
        buffer = rest;
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_packet_layout() {
        let mut buf = vec![];
        let salt = [1_u8; 20];
        write_handshake_packet(42, &salt, &mut buf);
        assert_eq!(buf[0], 10);
        assert!(buf.windows(SERVER_VERSION.len()).any(|w| w == SERVER_VERSION.as_bytes()));
    }

    #[test]
    fn test_command_packet_init_db() {
        let buf = [0x02, b't', b'e', b's', b't'];
        let packet = read_command_packet(&buf).unwrap();
        assert_eq!(packet, CommandPacket::InitDb("test".to_string()));
    }

    #[test]
    fn test_command_packet_query() {
        let buf = [0x03, b'S', b'E', b'L', b'E', b'C', b'T', b' ', b'1'];
        let packet = read_command_packet(&buf).unwrap();
        assert_eq!(packet, CommandPacket::Query("SELECT 1".to_string()));
    }

    #[test]
    fn test_local_infile_rejected() {
        let buf = [LOCAL_INFILE_HEADER, 1, 2, 3];
        assert!(read_command_packet(&buf).is_err());
    }

    #[test]
    fn test_ok_packet_layout() {
        let mut buf = vec![];
        write_ok_packet(0, 0, STATUS_FLAG_AUTOCOMMIT, 0, SERVER_SUPPORTED_CAPABILITIES, &mut buf);
        assert_eq!(buf[0], 0x00);
    }

    #[test]
    fn test_eof_packet_layout() {
        let mut buf = vec![];
        write_eof_packet(0, STATUS_FLAG_AUTOCOMMIT, SERVER_SUPPORTED_CAPABILITIES, &mut buf);
        assert_eq!(buf.as_slice(), [0xfe, 0x00, 0x00, 0x02, 0x00].as_ref());
    }
}
