#![allow(dead_code)]

use std::borrow::Cow;

/// Use the improved version of Old Password Authentication.
pub const CAPABILITY_CLIENT_LONG_PASSWORD: u32 = 0x0000_0001;

/// Send found rows instead of affected rows in EOF_Packet.
pub const CAPABILITY_CLIENT_FOUND_ROWS: u32 = 0x0000_0002;

/// Longer flags in Protocol::ColumnDefinition320.
pub const CAPABILITY_CLIENT_LONG_FLAG: u32 = 0x0000_0004;

/// Database (schema) name can be specified on connect in Handshake Response Packet.
pub const CAPABILITY_CLIENT_CONNECT_WITH_DB: u32 = 0x0000_0008;

/// Supports the 4.1 protocol.
pub const CAPABILITY_CLIENT_PROTOCOL_41: u32 = 0x0000_0200;

/// Can send status flags in EOF_Packet.
pub const CAPABILITY_CLIENT_TRANSACTIONS: u32 = 0x0000_2000;

/// Supports Authentication::Native41.
pub const CAPABILITY_CLIENT_SECURE_CONNECTION: u32 = 0x0000_8000;

/// Can send multiple resultsets for COM_QUERY.
pub const CAPABILITY_CLIENT_MULTI_RESULTS: u32 = 0x0002_0000;

/// Capabilities this server actually honours, per spec 4.3.
pub const SERVER_SUPPORTED_CAPABILITIES: u32 = CAPABILITY_CLIENT_LONG_PASSWORD
    | CAPABILITY_CLIENT_LONG_FLAG
    | CAPABILITY_CLIENT_CONNECT_WITH_DB
    | CAPABILITY_CLIENT_PROTOCOL_41
    | CAPABILITY_CLIENT_TRANSACTIONS
    | CAPABILITY_CLIENT_SECURE_CONNECTION
    | CAPABILITY_CLIENT_FOUND_ROWS;

pub const CHARSET_UTF8_GENERAL_CI: u16 = 33;

pub const STATUS_FLAG_AUTOCOMMIT: u16 = 0x0002;

// Column flag bits (Protocol::ColumnDefinition, subset honoured by spec 3).
pub const COLUMN_FLAG_NOT_NULL: u16 = 0x0001;
pub const COLUMN_FLAG_PRI_KEY: u16 = 0x0002;
pub const COLUMN_FLAG_UNIQUE_KEY: u16 = 0x0004;
pub const COLUMN_FLAG_BINARY: u16 = 0x0080;
pub const COLUMN_FLAG_UNSIGNED: u16 = 0x0020;
pub const COLUMN_FLAG_ZEROFILL: u16 = 0x0040;
pub const COLUMN_FLAG_AUTO_INCREMENT: u16 = 0x0200;

// Command bytes (COM_*).
pub const COM_QUIT: u8 = 0x01;
pub const COM_INIT_DB: u8 = 0x02;
pub const COM_QUERY: u8 = 0x03;
pub const COM_FIELD_LIST: u8 = 0x04;
pub const COM_PING: u8 = 0x0e;
pub const COM_STMT_PREPARE: u8 = 0x16;
pub const COM_STMT_EXECUTE: u8 = 0x17;
pub const COM_STMT_SEND_LONG_DATA: u8 = 0x18;
pub const COM_STMT_CLOSE: u8 = 0x19;
pub const COM_STMT_RESET: u8 = 0x1a;

/// Rejected outright per spec 4.4/9 (no LOAD DATA LOCAL INFILE support).
pub const LOCAL_INFILE_HEADER: u8 = 0xfb;

// https://dev.mysql.com/doc/internals/en/com-query-response.html#packet-ProtocolText::Resultset
pub const MYSQL_TYPE_DECIMAL: u8 = 0x00;
pub const MYSQL_TYPE_TINY: u8 = 0x01;
pub const MYSQL_TYPE_SHORT: u8 = 0x02;
pub const MYSQL_TYPE_LONG: u8 = 0x03;
pub const MYSQL_TYPE_FLOAT: u8 = 0x04;
pub const MYSQL_TYPE_DOUBLE: u8 = 0x05;
pub const MYSQL_TYPE_NULL: u8 = 0x06;
pub const MYSQL_TYPE_TIMESTAMP: u8 = 0x07;
pub const MYSQL_TYPE_LONGLONG: u8 = 0x08;
pub const MYSQL_TYPE_INT24: u8 = 0x09;
pub const MYSQL_TYPE_DATE: u8 = 0x0a;
pub const MYSQL_TYPE_TIME: u8 = 0x0b;
pub const MYSQL_TYPE_DATETIME: u8 = 0x0c;
pub const MYSQL_TYPE_YEAR: u8 = 0x0d;
pub const MYSQL_TYPE_NEWDATE: u8 = 0x0e;
pub const MYSQL_TYPE_VARCHAR: u8 = 0x0f;
pub const MYSQL_TYPE_BIT: u8 = 0x10;
pub const MYSQL_TYPE_NEWDECIMAL: u8 = 0xf6;
pub const MYSQL_TYPE_ENUM: u8 = 0xf7;
pub const MYSQL_TYPE_SET: u8 = 0xf8;
pub const MYSQL_TYPE_TINY_BLOB: u8 = 0xf9;
pub const MYSQL_TYPE_MEDIUM_BLOB: u8 = 0xfa;
pub const MYSQL_TYPE_LONG_BLOB: u8 = 0xfb;
pub const MYSQL_TYPE_BLOB: u8 = 0xfc;
pub const MYSQL_TYPE_VAR_STRING: u8 = 0xfd;
pub const MYSQL_TYPE_STRING: u8 = 0xfe;
pub const MYSQL_TYPE_GEOMETRY: u8 = 0xff;

/// A canned MySQL error: code + SQLSTATE + message, as surfaced on the wire.
/// `msg` is a `Cow` rather than a bare `&str` so call sites that need a
/// formatted, per-instance message (e.g. naming the offending user or
/// command byte) can supply one without a separate error-reporting path.
#[derive(Debug, Clone)]
pub struct MyError<'a> {
    pub code: u16,
    pub msg: Cow<'a, str>,
    pub sql_state: &'a str,
}

// https://dev.mysql.com/doc/mysql-errors/8.0/en/server-error-reference.html
pub const MYSQL_ER_ACCESS_DENIED_ERROR: MyError<'static> = MyError {
    code: 1045,
    msg: Cow::Borrowed("Access denied"),
    sql_state: "28000",
};

pub const MYSQL_ER_BAD_DB_ERROR: MyError<'static> = MyError {
    code: 1049,
    msg: Cow::Borrowed("Unknown database"),
    sql_state: "42000",
};

pub const MYSQL_ER_PARSE_ERROR: MyError<'static> = MyError {
    code: 1064,
    msg: Cow::Borrowed("Parse Error"),
    sql_state: "42000",
};

pub const MYSQL_ER_UNKNOWN_COM_ERROR: MyError<'static> = MyError {
    code: 1047,
    msg: Cow::Borrowed("Unknown command"),
    sql_state: "08S01",
};

pub const MYSQL_ER_UNKNOWN_ERROR: MyError<'static> = MyError {
    code: 1105,
    msg: Cow::Borrowed("Unknown error"),
    sql_state: "HY000",
};

pub const MYSQL_ER_UNKNOWN_STMT_HANDLER: MyError<'static> = MyError {
    code: 1243,
    msg: Cow::Borrowed("Unknown prepared statement handler"),
    sql_state: "HY000",
};

pub const MYSQL_ER_WRONG_ARGUMENTS: MyError<'static> = MyError {
    code: 1210,
    msg: Cow::Borrowed("Incorrect arguments"),
    sql_state: "HY000",
};
