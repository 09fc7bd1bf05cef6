use crate::error::CommandError;
use crate::packets::{read_handshake_response, write_handshake_packet, HandshakeResponse};
use protocol::constants::SERVER_SUPPORTED_CAPABILITIES;
use protocol::Codec;
use rand::RngCore;
use sha1::{Digest, Sha1};
use std::io::{Read, Write};

/// Generates the 20-byte scramble, replacing any zero byte with `'0'` so the
/// salt is safe to embed as a NUL-terminated C string on the wire (spec 4.3).
pub fn generate_salt() -> [u8; 20] {
    let mut salt = [0_u8; 20];
    rand::thread_rng().fill_bytes(&mut salt);
    for b in salt.iter_mut() {
        if *b == 0 {
            *b = b'0';
        }
    }
    salt
}

/// `SHA1(password) XOR SHA1(salt || SHA1(SHA1(password)))`, per spec 4.3.
/// An empty password produces an empty scramble.
pub fn scramble(password: &[u8], salt: &[u8; 20]) -> Vec<u8> {
    if password.is_empty() {
        return Vec::new();
    }
    let stage1 = Sha1::digest(password);
    let stage2 = Sha1::digest(stage1);
    let mut hasher = Sha1::new();
    hasher.update(salt);
    hasher.update(stage2);
    let salted = hasher.finalize();
    stage1
        .iter()
        .zip(salted.iter())
        .map(|(a, b)| a ^ b)
        .collect()
}

pub struct HandshakeOutcome {
    pub capabilities: u32,
    pub collation: u8,
    pub database: Option<String>,
}

/// Drives the initial handshake to completion: writes the greeting, reads
/// the client's response, verifies the scramble (unless `skip_auth`), and
/// writes the OK or error packet. Resets the codec sequence to 0 after a
/// successful auth, per spec 4.3.
pub fn perform_handshake<S: Read + Write>(
    codec: &mut Codec<S>,
    connection_id: u32,
    peer_addr: &str,
    user: &str,
    password: &str,
    skip_auth: bool,
) -> Result<HandshakeOutcome, CommandError> {
    let salt = generate_salt();
    let mut greeting = Vec::new();
    write_handshake_packet(connection_id, &salt, &mut greeting);
    codec.write_packet(&greeting)?;
    codec.flush()?;

    let response_bytes = codec.read_packet()?;
    let HandshakeResponse {
        capabilities,
        collation,
        username,
        auth_response,
        database,
    } = read_handshake_response(&response_bytes)?;

    if !skip_auth {
        let expected = scramble(password.as_bytes(), &salt);
        if username != user || auth_response != expected {
            let message = format!("Access denied for user '{}'@'{}'", username, peer_addr);
            let mut buf = Vec::new();
            crate::packets::write_err_packet(
                &CommandError::AuthFailed(message.clone()),
                capabilities & SERVER_SUPPORTED_CAPABILITIES,
                &mut buf,
            );
            codec.write_packet(&buf)?;
            codec.flush()?;
            return Err(CommandError::AuthFailed(message));
        }
    }

    let negotiated = capabilities & SERVER_SUPPORTED_CAPABILITIES;
    let mut ok = Vec::new();
    crate::packets::write_ok_packet(
        0,
        0,
        protocol::constants::STATUS_FLAG_AUTOCOMMIT,
        0,
        negotiated,
        &mut ok,
    );
    codec.write_packet(&ok)?;
    codec.flush()?;
    codec.reset_sequence();

    Ok(HandshakeOutcome {
        capabilities: negotiated,
        collation,
        database,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_password_yields_empty_scramble() {
        let salt = [1_u8; 20];
        assert!(scramble(b"", &salt).is_empty());
    }

    #[test]
    fn test_scramble_is_deterministic() {
        let salt = generate_salt();
        assert_eq!(scramble(b"secret", &salt), scramble(b"secret", &salt));
    }

    #[test]
    fn test_scramble_is_20_bytes() {
        let salt = generate_salt();
        assert_eq!(scramble(b"secret", &salt).len(), 20);
    }

    #[test]
    fn test_salt_has_no_zero_bytes() {
        for _ in 0..50 {
            assert!(!generate_salt().contains(&0));
        }
    }
}
