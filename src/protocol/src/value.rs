//! The per-column type codec (spec component 3): text and binary encoders/decoders
//! for every MySQL column type the server understands.
use crate::constants::*;
use crate::error::ProtocolError;
use crate::primitives::*;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A signed duration with microseconds, as MySQL's TIME column type represents it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MysqlTime {
    pub negative: bool,
    pub days: u32,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub micros: u32,
}

impl Display for MysqlTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        let hours = self.days * 24 + self.hours as u32;
        write!(f, "{:02}:{:02}:{:02}", hours, self.minutes, self.seconds)?;
        if self.micros != 0 {
            write!(f, ".{:06}", self.micros)?;
        }
        Ok(())
    }
}

/// The tagged union every row cell's value admits, per spec's DATA MODEL.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    SignedInt(i64),
    UnsignedInt(u64),
    Double(f64),
    Bytes(Vec<u8>),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime, u32),
    Time(MysqlTime),
    Year(u16),
    Decimal(Decimal),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders a value in the text protocol's canonical string form (spec 4.6).
/// Integers/floats use base-10 ASCII; floats use the shortest round-trip form.
pub fn dump_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::SignedInt(i) => i.to_string(),
        Value::UnsignedInt(u) => u.to_string(),
        Value::Double(d) => format_float(*d),
        Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        Value::Text(s) => s.clone(),
        Value::Date(d) => d.format(DATE_FORMAT).to_string(),
        Value::DateTime(dt, micros) => {
            if *micros == 0 {
                dt.format(DATETIME_FORMAT).to_string()
            } else {
                format!("{}.{:06}", dt.format(DATETIME_FORMAT), micros)
            }
        }
        Value::Time(t) => t.to_string(),
        Value::Year(y) => y.to_string(),
        Value::Decimal(d) => d.to_string(),
    }
}

/// Rust's `{}` for f64/f32 already produces the shortest round-trip decimal form.
fn format_float(d: f64) -> String {
    if d.fract() == 0.0 && d.abs() < 1e15 {
        format!("{:.0}", d)
    } else {
        format!("{}", d)
    }
}

/// Parses a text-protocol cell back into a typed `Value`, per the column's declared type.
pub fn parse_text(bytes: &[u8], column_type: u8, unsigned: bool) -> Result<Value, ProtocolError> {
    let s = std::str::from_utf8(bytes)
        .map_err(|_| ProtocolError::MalformedPacket("non-utf8 text value".into()))?;
    match column_type {
        MYSQL_TYPE_TINY | MYSQL_TYPE_SHORT | MYSQL_TYPE_INT24 | MYSQL_TYPE_LONG
        | MYSQL_TYPE_LONGLONG => {
            if unsigned {
                Ok(Value::UnsignedInt(s.parse().map_err(|_| {
                    ProtocolError::MalformedPacket(format!("bad integer {}", s))
                })?))
            } else {
                Ok(Value::SignedInt(s.parse().map_err(|_| {
                    ProtocolError::MalformedPacket(format!("bad integer {}", s))
                })?))
            }
        }
        MYSQL_TYPE_YEAR => Ok(Value::Year(s.parse().map_err(|_| {
            ProtocolError::MalformedPacket(format!("bad year {}", s))
        })?)),
        MYSQL_TYPE_FLOAT | MYSQL_TYPE_DOUBLE => Ok(Value::Double(s.parse().map_err(|_| {
            ProtocolError::MalformedPacket(format!("bad float {}", s))
        })?)),
        MYSQL_TYPE_DECIMAL | MYSQL_TYPE_NEWDECIMAL => Ok(Value::Decimal(
            Decimal::from_str(s)
                .map_err(|_| ProtocolError::MalformedPacket(format!("bad decimal {}", s)))?,
        )),
        MYSQL_TYPE_DATE | MYSQL_TYPE_NEWDATE => Ok(Value::Date(
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map_err(|_| ProtocolError::MalformedPacket(format!("bad date {}", s)))?,
        )),
        MYSQL_TYPE_DATETIME | MYSQL_TYPE_TIMESTAMP => parse_datetime_text(s),
        MYSQL_TYPE_TIME => Ok(Value::Time(parse_time_text(s)?)),
        _ => Ok(Value::Bytes(bytes.to_vec())),
    }
}

fn parse_datetime_text(s: &str) -> Result<Value, ProtocolError> {
    let (main, micros) = match s.split_once('.') {
        Some((main, frac)) => {
            let mut frac = frac.to_string();
            while frac.len() < 6 {
                frac.push('0');
            }
            (
                main,
                frac[..6]
                    .parse()
                    .map_err(|_| ProtocolError::MalformedPacket(format!("bad datetime {}", s)))?,
            )
        }
        None => (s, 0),
    };
    let dt = NaiveDateTime::parse_from_str(main, DATETIME_FORMAT)
        .map_err(|_| ProtocolError::MalformedPacket(format!("bad datetime {}", s)))?;
    Ok(Value::DateTime(dt, micros))
}

fn parse_time_text(s: &str) -> Result<MysqlTime, ProtocolError> {
    let bad = || ProtocolError::MalformedPacket(format!("bad time {}", s));
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (rest, micros) = match rest.split_once('.') {
        Some((main, frac)) => {
            let mut frac = frac.to_string();
            while frac.len() < 6 {
                frac.push('0');
            }
            (main, frac[..6].parse().map_err(|_| bad())?)
        }
        None => (rest, 0),
    };
    let parts: Vec<&str> = rest.split(':').collect();
    if parts.len() != 3 {
        return Err(bad());
    }
    let total_hours: u32 = parts[0].parse().map_err(|_| bad())?;
    Ok(MysqlTime {
        negative,
        days: total_hours / 24,
        hours: (total_hours % 24) as u8,
        minutes: parts[1].parse().map_err(|_| bad())?,
        seconds: parts[2].parse().map_err(|_| bad())?,
        micros,
    })
}

/// Decodes a COM_STMT_EXECUTE binary parameter value, per spec 4.5.
/// Temporal and decimal types arrive as length-encoded strings there, not the
/// packed binary form the result streamer uses for outgoing rows.
pub fn decode_binary_param(
    buffer: &[u8],
    mysql_type: u8,
    unsigned: bool,
) -> Result<(Value, &[u8]), ProtocolError> {
    match mysql_type {
        MYSQL_TYPE_TINY => {
            if buffer.is_empty() {
                return Err(ProtocolError::Truncated);
            }
            let (b, rem) = read_int_1(buffer);
            Ok((
                if unsigned {
                    Value::UnsignedInt(b as u64)
                } else {
                    Value::SignedInt(b as i8 as i64)
                },
                rem,
            ))
        }
        MYSQL_TYPE_SHORT | MYSQL_TYPE_YEAR => {
            if buffer.len() < 2 {
                return Err(ProtocolError::Truncated);
            }
            let (v, rem) = read_int_2(buffer);
            if mysql_type == MYSQL_TYPE_YEAR {
                Ok((Value::Year(v), rem))
            } else if unsigned {
                Ok((Value::UnsignedInt(v as u64), rem))
            } else {
                Ok((Value::SignedInt(v as i16 as i64), rem))
            }
        }
        MYSQL_TYPE_INT24 | MYSQL_TYPE_LONG => {
            if buffer.len() < 4 {
                return Err(ProtocolError::Truncated);
            }
            let (v, rem) = read_int_4(buffer);
            Ok((
                if unsigned {
                    Value::UnsignedInt(v as u64)
                } else {
                    Value::SignedInt(v as i32 as i64)
                },
                rem,
            ))
        }
        MYSQL_TYPE_LONGLONG => {
            if buffer.len() < 8 {
                return Err(ProtocolError::Truncated);
            }
            let (v, rem) = read_int_8(buffer);
            Ok((
                if unsigned {
                    Value::UnsignedInt(v)
                } else {
                    Value::SignedInt(v as i64)
                },
                rem,
            ))
        }
        MYSQL_TYPE_FLOAT => {
            if buffer.len() < 4 {
                return Err(ProtocolError::Truncated);
            }
            let (v, rem) = read_int_4(buffer);
            Ok((Value::Double(f32::from_bits(v) as f64), rem))
        }
        MYSQL_TYPE_DOUBLE => {
            if buffer.len() < 8 {
                return Err(ProtocolError::Truncated);
            }
            let (v, rem) = read_int_8(buffer);
            Ok((Value::Double(f64::from_bits(v)), rem))
        }
        MYSQL_TYPE_NULL => Ok((Value::Null, buffer)),
        MYSQL_TYPE_DECIMAL
        | MYSQL_TYPE_NEWDECIMAL
        | MYSQL_TYPE_VARCHAR
        | MYSQL_TYPE_BIT
        | MYSQL_TYPE_ENUM
        | MYSQL_TYPE_SET
        | MYSQL_TYPE_TINY_BLOB
        | MYSQL_TYPE_MEDIUM_BLOB
        | MYSQL_TYPE_LONG_BLOB
        | MYSQL_TYPE_BLOB
        | MYSQL_TYPE_VAR_STRING
        | MYSQL_TYPE_STRING
        | MYSQL_TYPE_GEOMETRY
        | MYSQL_TYPE_DATE
        | MYSQL_TYPE_NEWDATE
        | MYSQL_TYPE_TIMESTAMP
        | MYSQL_TYPE_DATETIME
        | MYSQL_TYPE_TIME => {
            let (bytes, is_null, rem) = read_enc_bytestring(buffer)?;
            if is_null {
                return Ok((Value::Null, rem));
            }
            let value = parse_text(&bytes, mysql_type, unsigned)?;
            Ok((value, rem))
        }
        other => Err(ProtocolError::MalformedPacket(format!(
            "unknown parameter type {:#x}",
            other
        ))),
    }
}

/// Encodes a value into the binary result-row wire form (spec 4.6). The caller
/// is responsible for the per-row NULL bitmap; this is only called for non-null cells.
pub fn encode_binary_result(value: &Value, mysql_type: u8, buffer: &mut Vec<u8>) {
    match mysql_type {
        MYSQL_TYPE_TINY => write_int_1(as_i64(value) as u8, buffer),
        MYSQL_TYPE_SHORT => write_int_2(as_i64(value) as u16, buffer),
        MYSQL_TYPE_YEAR => write_int_2(
            match value {
                Value::Year(y) => *y,
                _ => as_i64(value) as u16,
            },
            buffer,
        ),
        MYSQL_TYPE_INT24 | MYSQL_TYPE_LONG => write_int_4(as_i64(value) as u32, buffer),
        MYSQL_TYPE_LONGLONG => write_int_8(as_i64(value) as u64, buffer),
        MYSQL_TYPE_FLOAT => {
            let f = as_f64(value) as f32;
            write_int_4(f.to_bits(), buffer)
        }
        MYSQL_TYPE_DOUBLE => write_int_8(as_f64(value).to_bits(), buffer),
        MYSQL_TYPE_DATE | MYSQL_TYPE_NEWDATE => encode_binary_date(value, buffer),
        MYSQL_TYPE_DATETIME | MYSQL_TYPE_TIMESTAMP => encode_binary_datetime(value, buffer),
        MYSQL_TYPE_TIME => encode_binary_time(value, buffer),
        _ => write_enc_string(&dump_text(value), buffer),
    }
}

fn as_i64(value: &Value) -> i64 {
    match value {
        Value::SignedInt(i) => *i,
        Value::UnsignedInt(u) => *u as i64,
        Value::Year(y) => *y as i64,
        _ => 0,
    }
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Double(d) => *d,
        Value::SignedInt(i) => *i as f64,
        Value::UnsignedInt(u) => *u as f64,
        _ => 0.0,
    }
}

fn encode_binary_date(value: &Value, buffer: &mut Vec<u8>) {
    match value {
        Value::Date(d) => {
            write_int_1(4, buffer);
            write_int_2(d.year() as u16, buffer);
            write_int_1(d.month() as u8, buffer);
            write_int_1(d.day() as u8, buffer);
        }
        _ => write_int_1(0, buffer),
    }
}

fn encode_binary_datetime(value: &Value, buffer: &mut Vec<u8>) {
    match value {
        Value::DateTime(dt, micros) => {
            write_int_1(11, buffer);
            write_int_2(dt.year() as u16, buffer);
            write_int_1(dt.month() as u8, buffer);
            write_int_1(dt.day() as u8, buffer);
            write_int_1(dt.hour() as u8, buffer);
            write_int_1(dt.minute() as u8, buffer);
            write_int_1(dt.second() as u8, buffer);
            write_int_4(*micros, buffer);
        }
        Value::Date(d) => {
            write_int_1(4, buffer);
            write_int_2(d.year() as u16, buffer);
            write_int_1(d.month() as u8, buffer);
            write_int_1(d.day() as u8, buffer);
        }
        _ => write_int_1(0, buffer),
    }
}

fn encode_binary_time(value: &Value, buffer: &mut Vec<u8>) {
    match value {
        Value::Time(t) => {
            if t.micros != 0 {
                write_int_1(12, buffer);
            } else {
                write_int_1(8, buffer);
            }
            write_int_1(t.negative as u8, buffer);
            write_int_4(t.days, buffer);
            write_int_1(t.hours, buffer);
            write_int_1(t.minutes, buffer);
            write_int_1(t.seconds, buffer);
            if t.micros != 0 {
                write_int_4(t.micros, buffer);
            }
        }
        _ => write_int_1(0, buffer),
    }
}

/// Decodes a value previously written by `encode_binary_result`, for round-trip testing.
pub fn decode_binary_result(
    buffer: &[u8],
    mysql_type: u8,
    unsigned: bool,
) -> Result<(Value, &[u8]), ProtocolError> {
    match mysql_type {
        MYSQL_TYPE_TINY => {
            if buffer.is_empty() {
                return Err(ProtocolError::Truncated);
            }
            let (b, rem) = read_int_1(buffer);
            Ok((
                if unsigned {
                    Value::UnsignedInt(b as u64)
                } else {
                    Value::SignedInt(b as i8 as i64)
                },
                rem,
            ))
        }
        MYSQL_TYPE_SHORT | MYSQL_TYPE_YEAR => {
            if buffer.len() < 2 {
                return Err(ProtocolError::Truncated);
            }
            let (v, rem) = read_int_2(buffer);
            if mysql_type == MYSQL_TYPE_YEAR {
                Ok((Value::Year(v), rem))
            } else if unsigned {
                Ok((Value::UnsignedInt(v as u64), rem))
            } else {
                Ok((Value::SignedInt(v as i16 as i64), rem))
            }
        }
        MYSQL_TYPE_INT24 | MYSQL_TYPE_LONG => {
            if buffer.len() < 4 {
                return Err(ProtocolError::Truncated);
            }
            let (v, rem) = read_int_4(buffer);
            Ok((
                if unsigned {
                    Value::UnsignedInt(v as u64)
                } else {
                    Value::SignedInt(v as i32 as i64)
                },
                rem,
            ))
        }
        MYSQL_TYPE_LONGLONG => {
            if buffer.len() < 8 {
                return Err(ProtocolError::Truncated);
            }
            let (v, rem) = read_int_8(buffer);
            Ok((
                if unsigned {
                    Value::UnsignedInt(v)
                } else {
                    Value::SignedInt(v as i64)
                },
                rem,
            ))
        }
        MYSQL_TYPE_FLOAT => {
            if buffer.len() < 4 {
                return Err(ProtocolError::Truncated);
            }
            let (v, rem) = read_int_4(buffer);
            Ok((Value::Double(f32::from_bits(v) as f64), rem))
        }
        MYSQL_TYPE_DOUBLE => {
            if buffer.len() < 8 {
                return Err(ProtocolError::Truncated);
            }
            let (v, rem) = read_int_8(buffer);
            Ok((Value::Double(f64::from_bits(v)), rem))
        }
        MYSQL_TYPE_DATE | MYSQL_TYPE_NEWDATE => decode_binary_date(buffer),
        MYSQL_TYPE_DATETIME | MYSQL_TYPE_TIMESTAMP => decode_binary_datetime(buffer),
        MYSQL_TYPE_TIME => decode_binary_time(buffer),
        _ => {
            let (bytes, is_null, rem) = read_enc_bytestring(buffer)?;
            if is_null {
                return Ok((Value::Null, rem));
            }
            Ok((parse_text(&bytes, mysql_type, unsigned)?, rem))
        }
    }
}

fn decode_binary_date(buffer: &[u8]) -> Result<(Value, &[u8]), ProtocolError> {
    if buffer.is_empty() {
        return Err(ProtocolError::Truncated);
    }
    let (len, rem) = read_int_1(buffer);
    if len == 0 {
        return Ok((Value::Date(NaiveDate::from_ymd(0, 1, 1)), rem));
    }
    if rem.len() < 4 {
        return Err(ProtocolError::Truncated);
    }
    let (year, rem) = read_int_2(rem);
    let (month, rem) = read_int_1(rem);
    let (day, rem) = read_int_1(rem);
    Ok((
        Value::Date(
            NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
                .ok_or_else(|| ProtocolError::MalformedPacket("bad date".into()))?,
        ),
        rem,
    ))
}

fn decode_binary_datetime(buffer: &[u8]) -> Result<(Value, &[u8]), ProtocolError> {
    if buffer.is_empty() {
        return Err(ProtocolError::Truncated);
    }
    let (len, mut rem) = read_int_1(buffer);
    if len == 0 {
        return Ok((
            Value::DateTime(NaiveDate::from_ymd(0, 1, 1).and_hms(0, 0, 0), 0),
            rem,
        ));
    }
    if rem.len() < 4 {
        return Err(ProtocolError::Truncated);
    }
    let (year, r) = read_int_2(rem);
    let (month, r) = read_int_1(r);
    let (day, r) = read_int_1(r);
    rem = r;
    let (mut hour, mut minute, mut second, mut micros) = (0u8, 0u8, 0u8, 0u32);
    if len >= 7 {
        if rem.len() < 3 {
            return Err(ProtocolError::Truncated);
        }
        let (h, r) = read_int_1(rem);
        let (mi, r) = read_int_1(r);
        let (s, r) = read_int_1(r);
        hour = h;
        minute = mi;
        second = s;
        rem = r;
    }
    if len >= 11 {
        if rem.len() < 4 {
            return Err(ProtocolError::Truncated);
        }
        let (m, r) = read_int_4(rem);
        micros = m;
        rem = r;
    }
    let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .ok_or_else(|| ProtocolError::MalformedPacket("bad datetime".into()))?;
    let time = date
        .and_hms_opt(hour as u32, minute as u32, second as u32)
        .ok_or_else(|| ProtocolError::MalformedPacket("bad datetime".into()))?;
    Ok((Value::DateTime(time, micros), rem))
}

fn decode_binary_time(buffer: &[u8]) -> Result<(Value, &[u8]), ProtocolError> {
    if buffer.is_empty() {
        return Err(ProtocolError::Truncated);
    }
    let (len, rem) = read_int_1(buffer);
    if len == 0 {
        return Ok((Value::Time(MysqlTime::default()), rem));
    }
    if rem.len() < 8 {
        return Err(ProtocolError::Truncated);
    }
    let (negative, rem) = read_int_1(rem);
    let (days, rem) = read_int_4(rem);
    let (hours, rem) = read_int_1(rem);
    let (minutes, rem) = read_int_1(rem);
    let (seconds, mut rem) = read_int_1(rem);
    let mut micros = 0;
    if len >= 12 {
        if rem.len() < 4 {
            return Err(ProtocolError::Truncated);
        }
        let (m, r) = read_int_4(rem);
        micros = m;
        rem = r;
    }
    Ok((
        Value::Time(MysqlTime {
            negative: negative != 0,
            days,
            hours,
            minutes,
            seconds,
            micros,
        }),
        rem,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enc_int_roundtrip_via_binary_longlong() {
        let v = Value::SignedInt(-5);
        let mut buf = vec![];
        encode_binary_result(&v, MYSQL_TYPE_LONGLONG, &mut buf);
        let (decoded, rem) = decode_binary_result(&buf, MYSQL_TYPE_LONGLONG, false).unwrap();
        assert_eq!(decoded, v);
        assert!(rem.is_empty());
    }

    #[test]
    fn test_unsigned_longlong_roundtrip() {
        let v = Value::UnsignedInt(u64::MAX);
        let mut buf = vec![];
        encode_binary_result(&v, MYSQL_TYPE_LONGLONG, &mut buf);
        let (decoded, _) = decode_binary_result(&buf, MYSQL_TYPE_LONGLONG, true).unwrap();
        assert_eq!(decoded, v);
    }

    #[test]
    fn test_double_roundtrip() {
        let v = Value::Double(3.14159);
        let mut buf = vec![];
        encode_binary_result(&v, MYSQL_TYPE_DOUBLE, &mut buf);
        let (decoded, _) = decode_binary_result(&buf, MYSQL_TYPE_DOUBLE, false).unwrap();
        assert_eq!(decoded, v);
    }

    #[test]
    fn test_date_roundtrip() {
        let v = Value::Date(NaiveDate::from_ymd(2021, 6, 15));
        let mut buf = vec![];
        encode_binary_result(&v, MYSQL_TYPE_DATE, &mut buf);
        assert_eq!(buf.len(), 5);
        let (decoded, rem) = decode_binary_result(&buf, MYSQL_TYPE_DATE, false).unwrap();
        assert_eq!(decoded, v);
        assert!(rem.is_empty());
    }

    #[test]
    fn test_datetime_with_micros_roundtrip() {
        let v = Value::DateTime(
            NaiveDate::from_ymd(2021, 6, 15).and_hms(13, 45, 9),
            123_456,
        );
        let mut buf = vec![];
        encode_binary_result(&v, MYSQL_TYPE_DATETIME, &mut buf);
        assert_eq!(buf.len(), 12);
        let (decoded, _) = decode_binary_result(&buf, MYSQL_TYPE_DATETIME, false).unwrap();
        assert_eq!(decoded, v);
    }

    #[test]
    fn test_time_roundtrip() {
        let t = MysqlTime {
            negative: true,
            days: 2,
            hours: 3,
            minutes: 4,
            seconds: 5,
            micros: 6,
        };
        let v = Value::Time(t);
        let mut buf = vec![];
        encode_binary_result(&v, MYSQL_TYPE_TIME, &mut buf);
        assert_eq!(buf.len(), 13);
        let (decoded, _) = decode_binary_result(&buf, MYSQL_TYPE_TIME, false).unwrap();
        assert_eq!(decoded, v);
    }

    #[test]
    fn test_text_roundtrip_integer() {
        let v = Value::SignedInt(-42);
        let text = dump_text(&v);
        assert_eq!(text, "-42");
        let decoded = parse_text(text.as_bytes(), MYSQL_TYPE_LONG, false).unwrap();
        assert_eq!(decoded, v);
    }

    #[test]
    fn test_text_roundtrip_decimal() {
        let v = Value::Decimal(Decimal::from_str("12.340").unwrap());
        let text = dump_text(&v);
        let decoded = parse_text(text.as_bytes(), MYSQL_TYPE_NEWDECIMAL, false).unwrap();
        assert_eq!(decoded, v);
    }

    #[test]
    fn test_binary_param_string_param() {
        let mut buf = vec![];
        write_enc_string("hello", &mut buf);
        let (value, rem) = decode_binary_param(&buf, MYSQL_TYPE_VAR_STRING, false).unwrap();
        assert_eq!(value, Value::Bytes(b"hello".to_vec()));
        assert!(rem.is_empty());
    }

    #[test]
    fn test_binary_param_null_string() {
        let buf = [0xFB];
        let (value, rem) = decode_binary_param(&buf, MYSQL_TYPE_VAR_STRING, false).unwrap();
        assert_eq!(value, Value::Null);
        assert!(rem.is_empty());
    }
}
