use crate::error::ProtocolError;
use crate::primitives::{read_int_1, read_int_3, write_int_3};
use std::io::{BufReader, BufWriter, Read, Write};

/// Payloads are split into chunks no larger than this; the terminator is any
/// chunk shorter than it (spec 3/4.1).
pub const MAX_PAYLOAD_LEN: u32 = 0xFF_FFFF;

/// Length-prefixed frame reader/writer over a duplex byte stream (spec 4.1).
/// Tracks the per-connection sequence counter and reassembles/splits packets
/// that straddle the 16 MiB boundary.
pub struct Codec<S> {
    reader: BufReader<S>,
    writer: BufWriter<S>,
    sequence: u8,
}

impl<S: Read + Write + Clone> Codec<S> {
    pub fn new(stream: S) -> Self {
        Codec {
            reader: BufReader::with_capacity(2048, stream.clone()),
            writer: BufWriter::with_capacity(2048, stream),
            sequence: 0,
        }
    }
}

impl<S> Codec<S> {
    pub fn from_parts(reader: BufReader<S>, writer: BufWriter<S>) -> Self {
        Codec {
            reader,
            writer,
            sequence: 0,
        }
    }

    /// Resets the sequence counter to 0, as done by the dispatcher at the
    /// start of each command reply and by the handshake after the initial OK.
    pub fn reset_sequence(&mut self) {
        self.sequence = 0;
    }

    pub fn sequence(&self) -> u8 {
        self.sequence
    }
}

impl<S: Read> Codec<S> {
    /// Reads one logical packet, reassembling oversize payloads.
    pub fn read_packet(&mut self) -> Result<Vec<u8>, ProtocolError> {
        let mut out = Vec::new();
        loop {
            let mut header = [0_u8; 4];
            self.reader.read_exact(&mut header)?;
            let (length, rest) = read_int_3(&header);
            let (sequence, _) = read_int_1(rest);

            if sequence != self.sequence {
                return Err(ProtocolError::InvalidSequence {
                    expected: self.sequence,
                    got: sequence,
                });
            }
            self.sequence = self.sequence.wrapping_add(1);

            if out.is_empty() && length < 1 {
                return Err(ProtocolError::InvalidPayloadLength(length));
            }

            let mut chunk = vec![0_u8; length as usize];
            self.reader.read_exact(&mut chunk)?;
            let is_final = length < crate::codec::MAX_PAYLOAD_LEN;
            out.extend_from_slice(&chunk);
            if is_final {
                return Ok(out);
            }
        }
    }
}

impl<S: Write> Codec<S> {
    /// Writes one logical packet, splitting into MAX_PAYLOAD_LEN-sized chunks.
    /// `payload` must NOT include the 4-byte header; this fills it in per chunk.
    pub fn write_packet(&mut self, payload: &[u8]) -> Result<(), ProtocolError> {
        let mut remaining = payload;
        loop {
            let chunk_len = remaining.len().min(MAX_PAYLOAD_LEN as usize);
            let mut header = Vec::with_capacity(4);
            write_int_3(chunk_len as u32, &mut header);
            header.push(self.sequence);
            self.writer.write_all(&header)?;
            self.writer.write_all(&remaining[..chunk_len])?;
            self.sequence = self.sequence.wrapping_add(1);
            remaining = &remaining[chunk_len..];

            if chunk_len < MAX_PAYLOAD_LEN as usize {
                return Ok(());
            }
            if remaining.is_empty() {
                // Exact multiple of MAX_PAYLOAD_LEN: terminate with an empty chunk.
                let mut header = Vec::with_capacity(4);
                write_int_3(0, &mut header);
                header.push(self.sequence);
                self.writer.write_all(&header)?;
                self.sequence = self.sequence.wrapping_add(1);
                return Ok(());
            }
        }
    }

    pub fn flush(&mut self) -> Result<(), ProtocolError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(payload: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut scratch = Vec::new();
        {
            let mut codec = Codec::from_parts(
                BufReader::new(Cursor::new(&mut scratch)),
                BufWriter::new(Cursor::new(&mut buf)),
            );
            codec.write_packet(payload).unwrap();
            codec.flush().unwrap();
        }
        let mut sink = Vec::new();
        let mut codec = Codec::from_parts(
            BufReader::new(Cursor::new(&mut buf)),
            BufWriter::new(Cursor::new(&mut sink)),
        );
        codec.read_packet().unwrap()
    }

    #[test]
    fn test_small_packet_roundtrip() {
        let payload = b"select 1".to_vec();
        assert_eq!(roundtrip(&payload), payload);
    }

    #[test]
    fn test_oversize_packet_roundtrip() {
        let payload = vec![0x42_u8; (MAX_PAYLOAD_LEN as usize) + 5000];
        assert_eq!(roundtrip(&payload), payload);
    }

    #[test]
    fn test_exact_boundary_packet_roundtrip() {
        let payload = vec![0x7_u8; MAX_PAYLOAD_LEN as usize];
        assert_eq!(roundtrip(&payload), payload);
    }

    #[test]
    fn test_sequence_mismatch_detected() {
        let mut buf = Vec::new();
        let mut scratch = Vec::new();
        {
            let mut codec = Codec::from_parts(
                BufReader::new(Cursor::new(&mut scratch)),
                BufWriter::new(Cursor::new(&mut buf)),
            );
            codec.write_packet(b"hi").unwrap();
            codec.flush().unwrap();
        }
        // Corrupt the sequence byte.
        buf[3] = 7;
        let mut sink = Vec::new();
        let mut codec = Codec::from_parts(
            BufReader::new(Cursor::new(&mut buf)),
            BufWriter::new(Cursor::new(&mut sink)),
        );
        match codec.read_packet() {
            Err(ProtocolError::InvalidSequence { expected: 0, got: 7 }) => {}
            other => panic!("expected InvalidSequence, got {:?}", other),
        }
    }

    #[test]
    fn test_sequence_resets() {
        let mut buf = Vec::new();
        let mut scratch = Vec::new();
        {
            let mut codec = Codec::from_parts(
                BufReader::new(Cursor::new(&mut scratch)),
                BufWriter::new(Cursor::new(&mut buf)),
            );
            codec.write_packet(b"one").unwrap();
            codec.reset_sequence();
            codec.write_packet(b"two").unwrap();
            codec.flush().unwrap();
        }
        assert_eq!(buf[3], 0);
        // second packet header begins after 4-byte header + 3-byte payload
        assert_eq!(buf[4 + 3 + 3], 0);
    }
}
