//! The client side of the handshake the server crate's `handshake.rs` drives
//! from the other end. Same wire layout (spec 4.3), read instead of written.
use protocol::constants::*;
use protocol::primitives::*;
use protocol::{Codec, ProtocolError};
use sha1::{Digest, Sha1};
use std::io::{Read, Write};

const MAX_PACKET_SIZE: u32 = 16 * 1024 * 1024;

/// `SHA1(password) XOR SHA1(salt || SHA1(SHA1(password)))`, mirroring the
/// server's own `scramble` from the client's side of the same computation.
fn scramble(password: &[u8], salt: &[u8]) -> Vec<u8> {
    if password.is_empty() {
        return Vec::new();
    }
    let stage1 = Sha1::digest(password);
    let stage2 = Sha1::digest(stage1);
    let mut hasher = Sha1::new();
    hasher.update(salt);
    hasher.update(stage2);
    let salted = hasher.finalize();
    stage1.iter().zip(salted.iter()).map(|(a, b)| a ^ b).collect()
}

struct ServerGreeting {
    salt: Vec<u8>,
}

fn parse_greeting(buf: &[u8]) -> Result<ServerGreeting, ProtocolError> {
    let (_protocol_version, rest) = read_int_1(buf);
    let (_server_version, rest) = read_null_string(rest)?;
    let (_connection_id, rest) = read_int_4(rest);
    let (salt_part1, rest) = read_fixed_length_bytestring(rest, 8)?;
    let rest = &rest[1..]; // filler
    let (_cap_low, rest) = read_int_2(rest);
    let (_charset, rest) = read_int_1(rest);
    let (_status, rest) = read_int_2(rest);
    let (_cap_high, rest) = read_int_2(rest);
    let (_auth_len, rest) = read_int_1(rest);
    let rest = &rest[10..]; // reserved
    let (salt_part2, _rest) = read_fixed_length_bytestring(rest, 12)?;

    let mut salt = salt_part1;
    salt.extend_from_slice(&salt_part2);
    Ok(ServerGreeting { salt })
}

/// Reads the server's greeting, replies with a HandshakeResponse41, and
/// confirms the server accepted it. The database is not sent here; the
/// session issues its own `USE` once the connection is ready, the same way
/// `COM_INIT_DB` would be used after the fact.
pub fn perform_client_handshake<S: Read + Write>(
    codec: &mut Codec<S>,
    user: &str,
    password: &str,
) -> Result<(), ProtocolError> {
    let greeting_bytes = codec.read_packet()?;
    let greeting = parse_greeting(&greeting_bytes)?;
    let auth_response = scramble(password.as_bytes(), &greeting.salt);

    let capabilities = SERVER_SUPPORTED_CAPABILITIES & !CAPABILITY_CLIENT_CONNECT_WITH_DB;
    let mut buf = Vec::new();
    write_int_4(capabilities, &mut buf);
    write_int_4(MAX_PACKET_SIZE, &mut buf);
    write_int_1(CHARSET_UTF8_GENERAL_CI as u8, &mut buf);
    buf.extend_from_slice(&[0_u8; 23]);
    write_null_string(user, &mut buf);
    write_int_1(auth_response.len() as u8, &mut buf);
    buf.extend_from_slice(&auth_response);
    codec.write_packet(&buf)?;
    codec.flush()?;

    let reply = codec.read_packet()?;
    if reply.first() == Some(&0xff) {
        return Err(ProtocolError::MalformedPacket(
            "server rejected authentication".into(),
        ));
    }
    codec.reset_sequence();
    Ok(())
}
