//! Key handling: secret key parsing, bech32 (`npub`/`nsec`/`note`) encoding

use bech32::{Bech32, Hrp};
use secp256k1::{Keypair, Message, Secp256k1, SecretKey};

use crate::error::{Result, TenexError};

const NPUB: &str = "npub";
const NSEC: &str = "nsec";
const NOTE: &str = "note";

/// A secp256k1 keypair used to sign events
#[derive(Clone)]
pub struct Keys {
    keypair: Keypair,
}

impl std::fmt::Debug for Keys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keys")
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

impl Keys {
    /// Parse a secret key given as `nsec1...` or 64 hex characters.
    pub fn parse(secret: &str) -> Result<Self> {
        let secret = secret.trim();
        let bytes = if secret.starts_with(NSEC) {
            decode_bech32(NSEC, secret)?
        } else {
            hex::decode(secret).map_err(|_| TenexError::InvalidKey(redact(secret)))?
        };
        Self::from_secret_bytes(&bytes)
    }

    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        let secp = Secp256k1::new();
        let keypair = Keypair::from_seckey_slice(&secp, bytes)
            .map_err(|e| TenexError::InvalidKey(e.to_string()))?;
        Ok(Self { keypair })
    }

    /// Generate a fresh random keypair.
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        loop {
            let bytes: [u8; 32] = rand::random();
            if let Ok(secret) = SecretKey::from_slice(&bytes) {
                return Self {
                    keypair: Keypair::from_secret_key(&secp, &secret),
                };
            }
        }
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.keypair.x_only_public_key().0.serialize())
    }

    pub fn npub(&self) -> Result<String> {
        encode_npub(&self.public_key_hex())
    }

    pub fn nsec(&self) -> Result<String> {
        encode_bech32(NSEC, &self.keypair.secret_bytes())
    }

    /// BIP-340 signature over a 32-byte digest, hex encoded.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<String> {
        let secp = Secp256k1::new();
        let msg = Message::from_digest_slice(digest)
            .map_err(|e| TenexError::invalid_value("digest", e))?;
        let sig = secp.sign_schnorr_no_aux_rand(&msg, &self.keypair);
        Ok(hex::encode(sig.serialize()))
    }
}

/// True for 64 hex characters (a raw public key or event id).
pub fn looks_like_hex_pubkey(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// Decode an `npub1...` into a lowercase hex public key.
pub fn decode_npub(npub: &str) -> Result<String> {
    decode_bech32(NPUB, npub).map(hex::encode)
}

pub fn encode_npub(pubkey_hex: &str) -> Result<String> {
    let bytes = hex::decode(pubkey_hex).map_err(|_| TenexError::InvalidKey(pubkey_hex.into()))?;
    encode_bech32(NPUB, &bytes)
}

/// `note1...` form of an event id.
pub fn encode_note(event_id: &str) -> Result<String> {
    let bytes = hex::decode(event_id).map_err(|e| TenexError::invalid_value("event id", e))?;
    encode_bech32(NOTE, &bytes)
}

/// Accept a hex public key or `npub`, return hex.
pub fn normalize_pubkey(value: &str) -> Result<String> {
    if value.starts_with(NPUB) {
        decode_npub(value)
    } else if looks_like_hex_pubkey(value) {
        Ok(value.to_lowercase())
    } else {
        Err(TenexError::InvalidKey(format!(
            "{} (expected a hex pubkey or npub)",
            value
        )))
    }
}

fn encode_bech32(prefix: &str, data: &[u8]) -> Result<String> {
    let hrp = Hrp::parse(prefix).map_err(|e| TenexError::invalid_value("bech32 prefix", e))?;
    bech32::encode::<Bech32>(hrp, data).map_err(|e| TenexError::invalid_value("bech32 data", e))
}

fn decode_bech32(expected: &str, value: &str) -> Result<Vec<u8>> {
    let (hrp, data) =
        bech32::decode(value).map_err(|e| TenexError::InvalidKey(format!("{}: {}", redact(value), e)))?;
    if hrp.to_lowercase() != expected {
        return Err(TenexError::InvalidKey(format!(
            "expected {} prefix, got {}",
            expected,
            hrp.to_lowercase()
        )));
    }
    if data.len() != 32 {
        return Err(TenexError::InvalidKey(format!(
            "{} payload must be 32 bytes, got {}",
            expected,
            data.len()
        )));
    }
    Ok(data)
}

/// Keep secrets out of error messages.
fn redact(value: &str) -> String {
    let prefix: String = value.chars().take(8).collect();
    format!("{}...", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_and_nsec_parse_to_same_key() {
        let keys = Keys::from_secret_bytes(&[3u8; 32]).unwrap();
        let nsec = keys.nsec().unwrap();
        assert!(nsec.starts_with("nsec1"));

        let from_nsec = Keys::parse(&nsec).unwrap();
        let from_hex = Keys::parse(&hex::encode([3u8; 32])).unwrap();
        assert_eq!(from_nsec.public_key_hex(), keys.public_key_hex());
        assert_eq!(from_hex.public_key_hex(), keys.public_key_hex());
    }

    #[test]
    fn test_npub_round_trip() {
        let keys = Keys::generate();
        let npub = keys.npub().unwrap();
        assert!(npub.starts_with("npub1"));
        assert_eq!(decode_npub(&npub).unwrap(), keys.public_key_hex());
    }

    #[test]
    fn test_wrong_prefix_rejected() {
        let keys = Keys::generate();
        let npub = keys.npub().unwrap();
        assert!(Keys::parse(&npub).is_err());
        assert!(decode_npub(&keys.nsec().unwrap()).is_err());
    }

    #[test]
    fn test_invalid_secret_rejected() {
        assert!(Keys::parse("not-a-key").is_err());
        assert!(Keys::from_secret_bytes(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_looks_like_hex_pubkey() {
        assert!(looks_like_hex_pubkey(&"ab".repeat(32)));
        assert!(!looks_like_hex_pubkey("abc"));
        assert!(!looks_like_hex_pubkey(&"zz".repeat(32)));
    }

    #[test]
    fn test_normalize_pubkey() {
        let keys = Keys::generate();
        let hex = keys.public_key_hex();
        assert_eq!(normalize_pubkey(&hex.to_uppercase()).unwrap(), hex);
        assert_eq!(normalize_pubkey(&keys.npub().unwrap()).unwrap(), hex);
        assert!(normalize_pubkey("alice").is_err());
    }

    #[test]
    fn test_encode_note() {
        let note = encode_note(&"11".repeat(32)).unwrap();
        assert!(note.starts_with("note1"));
    }

    #[test]
    fn test_debug_hides_secret() {
        let keys = Keys::from_secret_bytes(&[9u8; 32]).unwrap();
        let debug = format!("{:?}", keys);
        assert!(debug.contains(&keys.public_key_hex()));
        assert!(!debug.contains(&hex::encode([9u8; 32])));
    }
}
