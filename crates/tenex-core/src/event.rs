//! Nostr event model.
//!
//! ```json
//! {
//!   "id": "aa11...",
//!   "pubkey": "b0c1...",
//!   "created_at": 1700000000,
//!   "kind": 1337,
//!   "tags": [["name", "hello"], ["l", "rust"], ["t", "cli"]],
//!   "content": "fn main() {}",
//!   "sig": "deadbeef..."
//! }
//! ```

use secp256k1::{schnorr::Signature, Message, Secp256k1, XOnlyPublicKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Result, TenexError};
use crate::keys::Keys;
use crate::rank::Tagged;

/// Event kinds used by tenex-tools
pub mod kind {
    pub const METADATA: u32 = 0;
    pub const TEXT_NOTE: u32 = 1;
    pub const CONTACTS: u32 = 3;
    pub const SNIPPET: u32 = 1337;
    pub const AGENT: u32 = 1338;
    pub const INSTRUCTION: u32 = 1339;
}

/// A signed Nostr event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    /// Event identifier (hex of SHA-256 hash).
    pub id: String,
    /// Author public key (hex).
    pub pubkey: String,
    /// Unix timestamp of creation.
    pub created_at: u64,
    pub kind: u32,
    /// Tags as string arrays, first element is the tag name.
    pub tags: Vec<Vec<String>>,
    pub content: String,
    /// Schnorr signature over the event hash.
    pub sig: String,
}

impl Event {
    /// First value of the first tag named `name`.
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.first().map(String::as_str) == Some(name))
            .and_then(|tag| tag.get(1))
            .map(String::as_str)
    }

    /// First values of every tag named `name`, in order.
    pub fn tag_values(&self, name: &str) -> Vec<&str> {
        self.tags
            .iter()
            .filter(|tag| tag.first().map(String::as_str) == Some(name))
            .filter_map(|tag| tag.get(1))
            .map(String::as_str)
            .collect()
    }

    /// Check the id against the content hash and the signature against the id.
    pub fn verify(&self) -> Result<()> {
        let hash = event_hash(&self.pubkey, self.created_at, self.kind, &self.tags, &self.content)?;
        if hex::encode(hash) != self.id {
            return Err(TenexError::invalid_value("event id", &self.id));
        }

        let sig_bytes =
            hex::decode(&self.sig).map_err(|e| TenexError::invalid_value("event signature", e))?;
        let pk_bytes =
            hex::decode(&self.pubkey).map_err(|e| TenexError::invalid_value("event pubkey", e))?;
        let sig = Signature::from_slice(&sig_bytes)
            .map_err(|e| TenexError::invalid_value("event signature", e))?;
        let pk = XOnlyPublicKey::from_slice(&pk_bytes)
            .map_err(|e| TenexError::invalid_value("event pubkey", e))?;
        let msg = Message::from_digest_slice(&hash)
            .map_err(|e| TenexError::invalid_value("event id", e))?;

        Secp256k1::verification_only()
            .verify_schnorr(&sig, &msg, &pk)
            .map_err(|e| TenexError::invalid_value("event signature", e))
    }
}

impl Tagged for Event {
    fn topic_tags(&self) -> Vec<&str> {
        self.tag_values("t")
    }
}

/// An event that has not been signed yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedEvent {
    pub created_at: u64,
    pub kind: u32,
    pub tags: Vec<Vec<String>>,
    pub content: String,
}

impl UnsignedEvent {
    pub fn new(kind: u32, content: impl Into<String>, tags: Vec<Vec<String>>) -> Self {
        Self {
            created_at: now_secs(),
            kind,
            tags,
            content: content.into(),
        }
    }

    /// Compute the id and sign it with `keys`.
    pub fn sign(self, keys: &Keys) -> Result<Event> {
        let pubkey = keys.public_key_hex();
        let hash = event_hash(&pubkey, self.created_at, self.kind, &self.tags, &self.content)?;
        let sig = keys.sign_digest(&hash)?;

        Ok(Event {
            id: hex::encode(hash),
            pubkey,
            created_at: self.created_at,
            kind: self.kind,
            tags: self.tags,
            content: self.content,
            sig,
        })
    }
}

/// Build a `[name, value]` tag.
pub fn tag(name: &str, value: impl Into<String>) -> Vec<String> {
    vec![name.to_string(), value.into()]
}

/// NIP-01 event hash of the serialized `[0, pubkey, created_at, kind, tags, content]`.
pub fn event_hash(
    pubkey: &str,
    created_at: u64,
    kind: u32,
    tags: &[Vec<String>],
    content: &str,
) -> Result<[u8; 32]> {
    let data = serde_json::to_vec(&serde_json::json!([0, pubkey, created_at, kind, tags, content]))?;
    let digest = Sha256::digest(&data);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(digest.as_slice());
    Ok(hash)
}

pub fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
