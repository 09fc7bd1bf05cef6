use crate::error::CommandError;
use engine::ResultSet;
use protocol::column::write_column_packet;
use protocol::primitives::{write_enc_bytestring, write_enc_int};
use protocol::value::{dump_text, encode_binary_result};
use protocol::Codec;
use std::io::{Read, Write};

/// Streams a `ResultSet` in the text protocol (spec 4.6): column-count,
/// columns, EOF, rows (each cell length-encoded text or `0xFB` for NULL), EOF.
pub fn write_text_resultset<S: Read + Write>(
    codec: &mut Codec<S>,
    result: &ResultSet,
    warnings: u16,
    status: u16,
    capabilities: u32,
) -> Result<(), CommandError> {
    write_header_and_columns(codec, result, warnings, status, capabilities)?;

    for row in &result.rows {
        let mut buf = Vec::new();
        for value in row.iter() {
            if value.is_null() {
                buf.push(0xFB);
            } else {
                write_enc_bytestring(dump_text(value).as_bytes(), &mut buf);
            }
        }
        codec.write_packet(&buf)?;
    }

    write_eof_packet_only(codec, warnings, status, capabilities)?;
    codec.flush()?;
    Ok(())
}

/// Streams a `ResultSet` in the binary protocol (spec 4.6), used for
/// `COM_STMT_EXECUTE` replies: same header/column/EOF prefix, but each row
/// starts with `0x00`, a NULL bitmap offset by 2 bits, then packed values.
pub fn write_binary_resultset<S: Read + Write>(
    codec: &mut Codec<S>,
    result: &ResultSet,
    warnings: u16,
    status: u16,
    capabilities: u32,
) -> Result<(), CommandError> {
    write_header_and_columns(codec, result, warnings, status, capabilities)?;

    let bitmap_len = (result.columns.len() + 2 + 7) / 8;
    for row in &result.rows {
        let mut buf = vec![0x00_u8];
        let bitmap_start = buf.len();
        buf.extend(std::iter::repeat(0_u8).take(bitmap_len));
        for (i, (value, column)) in row.iter().zip(result.columns.iter()).enumerate() {
            if value.is_null() {
                let bit = i + 2;
                buf[bitmap_start + bit / 8] |= 1 << (bit % 8);
            } else {
                encode_binary_result(value, column.column_type(), &mut buf);
            }
        }
        codec.write_packet(&buf)?;
    }

    write_eof_packet_only(codec, warnings, status, capabilities)?;
    codec.flush()?;
    Ok(())
}

fn write_header_and_columns<S: Read + Write>(
    codec: &mut Codec<S>,
    result: &ResultSet,
    warnings: u16,
    status: u16,
    capabilities: u32,
) -> Result<(), CommandError> {
    let mut header = Vec::new();
    write_enc_int(result.columns.len() as u64, &mut header);
    codec.write_packet(&header)?;

    for column in &result.columns {
        let mut buf = Vec::new();
        write_column_packet(column, &mut buf);
        codec.write_packet(&buf)?;
    }

    write_eof_packet_only(codec, warnings, status, capabilities)?;
    Ok(())
}

fn write_eof_packet_only<S: Read + Write>(
    codec: &mut Codec<S>,
    warnings: u16,
    status: u16,
    capabilities: u32,
) -> Result<(), CommandError> {
    let mut buf = Vec::new();
    crate::packets::write_eof_packet(warnings, status, capabilities, &mut buf);
    codec.write_packet(&buf)?;
    Ok(())
}

/// Streams just the column-definitions for `COM_FIELD_LIST`: one packet per
/// column, then a trailing EOF, no header/row packets.
pub fn write_field_list<S: Read + Write>(
    codec: &mut Codec<S>,
    columns: &[protocol::ColumnInfo],
    warnings: u16,
    status: u16,
    capabilities: u32,
) -> Result<(), CommandError> {
    for column in columns {
        let mut buf = Vec::new();
        write_column_packet(column, &mut buf);
        codec.write_packet(&buf)?;
    }
    write_eof_packet_only(codec, warnings, status, capabilities)?;
    codec.flush()?;
    Ok(())
}
