//! Length-encoded integers/strings and fixed-width little-endian integers, per spec 4.2.
use std::convert::TryInto;

pub fn write_int_1(i: u8, buffer: &mut Vec<u8>) {
    buffer.push(i);
}

pub fn read_int_1(buffer: &[u8]) -> (u8, &[u8]) {
    (buffer[0], &buffer[1..])
}

pub fn write_int_2(i: u16, buffer: &mut Vec<u8>) {
    buffer.extend_from_slice(&i.to_le_bytes());
}

pub fn read_int_2(buffer: &[u8]) -> (u16, &[u8]) {
    (
        u16::from_le_bytes(buffer[..2].try_into().unwrap()),
        &buffer[2..],
    )
}

pub fn write_int_3(i: u32, buffer: &mut Vec<u8>) {
    buffer.extend_from_slice(&i.to_le_bytes()[..3]);
}

pub fn read_int_3(buffer: &[u8]) -> (u32, &[u8]) {
    let mut buf = [0_u8; 4];
    buf[..3].copy_from_slice(&buffer[..3]);
    (u32::from_le_bytes(buf), &buffer[3..])
}

pub fn write_int_4(i: u32, buffer: &mut Vec<u8>) {
    buffer.extend_from_slice(&i.to_le_bytes());
}

pub fn read_int_4(buffer: &[u8]) -> (u32, &[u8]) {
    (
        u32::from_le_bytes(buffer[..4].try_into().unwrap()),
        &buffer[4..],
    )
}

pub fn write_int_8(i: u64, buffer: &mut Vec<u8>) {
    buffer.extend_from_slice(&i.to_le_bytes());
}

pub fn read_int_8(buffer: &[u8]) -> (u64, &[u8]) {
    (
        u64::from_le_bytes(buffer[..8].try_into().unwrap()),
        &buffer[8..],
    )
}

/// Length-encoded integer. Encoder always picks the minimal form.
pub fn write_enc_int(i: u64, buffer: &mut Vec<u8>) {
    if i <= 250 {
        buffer.push(i as u8);
    } else if i <= 0xFFFF {
        buffer.push(0xFC);
        write_int_2(i as u16, buffer);
    } else if i <= 0xFF_FFFF {
        buffer.push(0xFD);
        write_int_3(i as u32, buffer);
    } else {
        buffer.push(0xFE);
        write_int_8(i, buffer);
    }
}

/// Returns `None` for the NULL marker (0xFB), matching `read_enc_string`'s `is_null`.
pub fn read_enc_int(buffer: &[u8]) -> Result<(Option<u64>, &[u8]), crate::error::ProtocolError> {
    if buffer.is_empty() {
        return Err(crate::error::ProtocolError::Truncated);
    }
    match buffer[0] {
        0xfb => Ok((None, &buffer[1..])),
        0xfc => {
            if buffer.len() < 3 {
                return Err(crate::error::ProtocolError::Truncated);
            }
            let (i, rem) = read_int_2(&buffer[1..]);
            Ok((Some(i as u64), rem))
        }
        0xfd => {
            if buffer.len() < 4 {
                return Err(crate::error::ProtocolError::Truncated);
            }
            let (i, rem) = read_int_3(&buffer[1..]);
            Ok((Some(i as u64), rem))
        }
        0xfe => {
            if buffer.len() < 9 {
                return Err(crate::error::ProtocolError::Truncated);
            }
            let (i, rem) = read_int_8(&buffer[1..]);
            Ok((Some(i), rem))
        }
        b => Ok((Some(b as u64), &buffer[1..])),
    }
}

/// Length-encoded string: LEI prefix then that many bytes.
/// Returns `(bytes, is_null, remainder)`.
pub fn read_enc_bytestring(
    buffer: &[u8],
) -> Result<(Vec<u8>, bool, &[u8]), crate::error::ProtocolError> {
    let (len, rem) = read_enc_int(buffer)?;
    match len {
        None => Ok((Vec::new(), true, rem)),
        Some(len) => {
            let len = len as usize;
            if rem.len() < len {
                return Err(crate::error::ProtocolError::Truncated);
            }
            Ok((rem[..len].to_vec(), false, &rem[len..]))
        }
    }
}

pub fn read_enc_string(buffer: &[u8]) -> Result<(String, &[u8]), crate::error::ProtocolError> {
    let (bytes, _is_null, rem) = read_enc_bytestring(buffer)?;
    Ok((
        String::from_utf8(bytes).map_err(|_| crate::error::ProtocolError::Truncated)?,
        rem,
    ))
}

pub fn write_enc_bytestring(s: &[u8], buffer: &mut Vec<u8>) {
    write_enc_int(s.len() as u64, buffer);
    buffer.extend_from_slice(s);
}

pub fn write_enc_string(s: &str, buffer: &mut Vec<u8>) {
    write_enc_bytestring(s.as_bytes(), buffer);
}

/// A "null-terminated string" as used in handshake fields: bytes up to the first 0x00.
pub fn read_null_string(buffer: &[u8]) -> Result<(String, &[u8]), crate::error::ProtocolError> {
    let (bytes, rem) = read_null_bytestring(buffer)?;
    Ok((
        String::from_utf8(bytes).map_err(|_| crate::error::ProtocolError::Truncated)?,
        rem,
    ))
}

pub fn read_null_bytestring(buffer: &[u8]) -> Result<(Vec<u8>, &[u8]), crate::error::ProtocolError> {
    let nul = buffer
        .iter()
        .position(|&b| b == 0)
        .ok_or(crate::error::ProtocolError::Truncated)?;
    Ok((buffer[..nul].to_vec(), &buffer[nul + 1..]))
}

pub fn write_null_string(s: &str, buffer: &mut Vec<u8>) {
    buffer.extend_from_slice(s.as_bytes());
    buffer.push(0);
}

/// The rest of the packet, as a string (used for the final field of several commands).
pub fn read_eof_string(buffer: &[u8]) -> Result<String, crate::error::ProtocolError> {
    String::from_utf8(buffer.to_vec()).map_err(|_| crate::error::ProtocolError::Truncated)
}

pub fn write_eof_string(s: &str, buffer: &mut Vec<u8>) {
    buffer.extend_from_slice(s.as_bytes());
}

pub fn read_fixed_length_bytestring(
    buffer: &[u8],
    len: usize,
) -> Result<(Vec<u8>, &[u8]), crate::error::ProtocolError> {
    if buffer.len() < len {
        return Err(crate::error::ProtocolError::Truncated);
    }
    Ok((buffer[..len].to_vec(), &buffer[len..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_1() {
        let mut buf = vec![];
        write_int_1(234, &mut buf);
        let (i, rem) = read_int_1(&buf);
        assert_eq!(i, 234);
        assert!(rem.is_empty());
    }

    #[test]
    fn test_int_2() {
        let mut buf = vec![];
        write_int_2(9123, &mut buf);
        let (i, rem) = read_int_2(&buf);
        assert_eq!(i, 9123);
        assert!(rem.is_empty());
    }

    #[test]
    fn test_int_3() {
        let mut buf = vec![];
        write_int_3(7_832_432, &mut buf);
        let (i, rem) = read_int_3(&buf);
        assert_eq!(i, 7_832_432);
        assert!(rem.is_empty());
    }

    #[test]
    fn test_int_4() {
        let mut buf = vec![];
        write_int_4(3_123_456_789, &mut buf);
        let (i, rem) = read_int_4(&buf);
        assert_eq!(i, 3_123_456_789);
        assert!(rem.is_empty());
    }

    #[test]
    fn test_enc_int_minimal_form() {
        for (v, expected_len) in [
            (0_u64, 1),
            (250, 1),
            (251, 3),
            (0xFFFF, 3),
            (0x1_0000, 4),
            (0xFF_FFFF, 4),
            (0x100_0000, 9),
            (u64::MAX, 9),
        ] {
            let mut buf = vec![];
            write_enc_int(v, &mut buf);
            assert_eq!(buf.len(), expected_len, "value {}", v);
            let (decoded, rem) = read_enc_int(&buf).unwrap();
            assert_eq!(decoded, Some(v));
            assert!(rem.is_empty());
        }
    }

    #[test]
    fn test_enc_int_null() {
        let (v, rem) = read_enc_int(&[0xFB, 1, 2]).unwrap();
        assert_eq!(v, None);
        assert_eq!(rem, &[1, 2]);
    }

    #[test]
    fn test_enc_string_roundtrip() {
        let mut buf = vec![];
        write_enc_string("hello", &mut buf);
        let (s, rem) = read_enc_string(&buf).unwrap();
        assert_eq!(s, "hello");
        assert!(rem.is_empty());
    }

    #[test]
    fn test_enc_string_truncated() {
        let mut buf = vec![];
        write_enc_string("hello", &mut buf);
        buf.truncate(buf.len() - 1);
        assert!(read_enc_string(&buf).is_err());
    }

    #[test]
    fn test_null_string_roundtrip() {
        let mut buf = vec![];
        write_null_string("root", &mut buf);
        buf.extend_from_slice(b"trailer");
        let (s, rem) = read_null_string(&buf).unwrap();
        assert_eq!(s, "root");
        assert_eq!(rem, b"trailer");
    }
}
