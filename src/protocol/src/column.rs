use crate::constants::CHARSET_UTF8_GENERAL_CI;
use crate::primitives::*;

/// Column metadata, immutable after construction. See spec 3 DATA MODEL.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    schema: String,
    table: String,
    org_table: String,
    name: String,
    org_name: String,
    column_length: u32,
    charset: u16,
    flag: u16,
    decimal: u8,
    column_type: u8,
    default_value: Option<Vec<u8>>,
}

impl ColumnInfo {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        schema: impl Into<String>,
        table: impl Into<String>,
        org_table: impl Into<String>,
        name: impl Into<String>,
        org_name: impl Into<String>,
        column_length: u32,
        column_type: u8,
        flag: u16,
        decimal: u8,
    ) -> Self {
        ColumnInfo {
            schema: schema.into(),
            table: table.into(),
            org_table: org_table.into(),
            name: name.into(),
            org_name: org_name.into(),
            column_length,
            charset: CHARSET_UTF8_GENERAL_CI,
            flag,
            decimal,
            column_type,
            default_value: None,
        }
    }

    pub fn with_default_value(mut self, default: Vec<u8>) -> Self {
        self.default_value = Some(default);
        self
    }

    pub fn with_charset(mut self, charset: u16) -> Self {
        self.charset = charset;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column_type(&self) -> u8 {
        self.column_type
    }

    pub fn flag(&self) -> u16 {
        self.flag
    }

    pub fn is_unsigned(&self) -> bool {
        self.flag & crate::constants::COLUMN_FLAG_UNSIGNED != 0
    }

    pub fn column_length(&self) -> u32 {
        self.column_length
    }

    pub fn charset(&self) -> u16 {
        self.charset
    }

    pub fn decimal(&self) -> u8 {
        self.decimal
    }

    pub fn default_value(&self) -> Option<&[u8]> {
        self.default_value.as_deref()
    }
}

/// Writes a column-definition packet body, per spec 4.7.
pub fn write_column_packet(column: &ColumnInfo, buffer: &mut Vec<u8>) {
    write_enc_string("def", buffer);
    write_enc_string(&column.schema, buffer);
    write_enc_string(&column.table, buffer);
    write_enc_string(&column.org_table, buffer);
    write_enc_string(&column.name, buffer);
    write_enc_string(&column.org_name, buffer);
    write_int_1(0x0c, buffer);
    write_int_2(column.charset, buffer);
    write_int_4(column.column_length, buffer);
    write_int_1(column.column_type, buffer);
    write_int_2(column.flag, buffer);
    write_int_1(column.decimal, buffer);
    write_int_2(0, buffer);
    if let Some(default) = &column.default_value {
        write_enc_int(default.len() as u64, buffer);
        buffer.extend_from_slice(default);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MYSQL_TYPE_LONG;

    #[test]
    fn test_column_packet() {
        let column = ColumnInfo::new("", "foo", "", "bar", "", 11, MYSQL_TYPE_LONG, 0, 0);
        let mut buf = vec![];
        write_column_packet(&column, &mut buf);
        assert_eq!(
            buf.as_slice(),
            [
                3, 100, 101, 102, 0, 3, 102, 111, 111, 0, 3, 98, 97, 114, 0, 12, 33, 0, 11, 0, 0,
                0, 3, 0, 0, 0, 0, 0
            ]
            .as_ref()
        );
    }

    #[test]
    fn test_column_packet_with_default() {
        let column =
            ColumnInfo::new("s", "t", "ot", "n", "on", 4, MYSQL_TYPE_LONG, 0, 0).with_default_value(b"0".to_vec());
        let mut buf = vec![];
        write_column_packet(&column, &mut buf);
        assert!(buf.ends_with(&[1, b'0']));
    }
}
