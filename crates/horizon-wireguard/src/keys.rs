//! WireGuard key handling.
//!
//! Keys are Curve25519, 32 bytes, exchanged as standard base64 (44 characters
//! with padding).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand_core::OsRng;
use x25519_dalek::{PublicKey, StaticSecret};

use crate::error::{Result, WireGuardError};

/// WireGuard key size in bytes.
pub const KEY_SIZE: usize = 32;

/// Length of a base64-encoded key, padding included.
pub const ENCODED_KEY_LEN: usize = 44;

/// A freshly generated key pair, base64-encoded.
#[derive(Clone)]
pub struct KeyPair {
    /// Private key, for the `[Interface]` section of the new peer.
    pub private_key: String,
    /// Public key, for the gateway's `[Peer]` entry.
    pub public_key: String,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("private_key", &"[REDACTED]")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// Checks the format of a public key.
///
/// Accepts exactly 44 characters with no whitespace that decode as standard
/// base64 to 32 bytes. Whether the bytes form a valid curve point is not
/// checked.
#[must_use]
pub fn validate_public_key(key: &str) -> bool {
    if key.len() != ENCODED_KEY_LEN || key.chars().any(char::is_whitespace) {
        return false;
    }
    STANDARD.decode(key).is_ok_and(|bytes| bytes.len() == KEY_SIZE)
}

/// Generates a new random key pair.
#[must_use]
pub fn generate_keypair() -> KeyPair {
    let secret = StaticSecret::random_from_rng(OsRng);
    let public = PublicKey::from(&secret);
    KeyPair {
        private_key: STANDARD.encode(secret.to_bytes()),
        public_key: STANDARD.encode(public.as_bytes()),
    }
}

/// Derives the base64 public key for a base64 private key.
pub fn public_key_from_private(private_key: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(private_key.trim())
        .map_err(|e| WireGuardError::InvalidKey(format!("private key is not base64: {e}")))?;
    let bytes: [u8; KEY_SIZE] = bytes.try_into().map_err(|b: Vec<u8>| {
        WireGuardError::InvalidKey(format!("private key must be {KEY_SIZE} bytes, got {}", b.len()))
    })?;
    let secret = StaticSecret::from(bytes);
    Ok(STANDARD.encode(PublicKey::from(&secret).as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("YWJjZGVmZ2hpamtsbW5vcHFyc3R1dnd4eXoxMjM0NTY=", true ; "valid 32 byte key")]
    #[test_case("", false ; "empty")]
    #[test_case("short", false ; "too short")]
    #[test_case("has spaces in it", false ; "whitespace")]
    #[test_case("YWJjZGVmZ2hpamtsbW5vcHFyc3R1dnd4eXoxMjM0 NTY", false ; "44 chars with a space")]
    #[test_case("!!!!ZGVmZ2hpamtsbW5vcHFyc3R1dnd4eXoxMjM0NTY=", false ; "not base64")]
    #[test_case("YWJjZGVmZ2hpamtsbW5vcHFyc3R1dnd4eXoxMjM0NTY=A", false ; "too long")]
    fn public_key_format(key: &str, expected: bool) {
        assert_eq!(validate_public_key(key), expected);
    }

    #[test]
    fn generated_keys_validate() {
        let pair = generate_keypair();
        assert!(validate_public_key(&pair.public_key));
        assert!(validate_public_key(&pair.private_key));
        assert_ne!(pair.private_key, pair.public_key);
    }

    #[test]
    fn public_key_derivation_matches_generation() {
        let pair = generate_keypair();
        let derived = public_key_from_private(&pair.private_key).expect("derive");
        assert_eq!(derived, pair.public_key);
    }

    #[test]
    fn derivation_rejects_bad_input() {
        assert!(public_key_from_private("not base64!").is_err());
        assert!(public_key_from_private("cGFzc3dvcmQ=").is_err());
    }

    #[test]
    fn debug_redacts_private_key() {
        let pair = generate_keypair();
        let debug = format!("{pair:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(&pair.private_key));
    }
}
