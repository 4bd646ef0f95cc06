//! Entry hashing
//!
//! Wire format (any change invalidates every historical hash):
//!
//! ```text
//! current_hash = hex(sha256(
//!     loan_id | sequence_num | previous_hash | event_type
//!     | canonical_json(event_data) | amount_or_"null"
//!     | performed_by | rfc3339(timestamp)
//! ))
//! ```
//!
//! `|` is a literal separator. The event payload is canonicalized (sorted
//! keys, compact) so that semantically identical data always hashes
//! identically. The `event_type` tag is removed from the payload before
//! canonicalization since it is hashed as its own field.

use sha2::{Digest, Sha256};

use crate::canonical::canonical_json;
use crate::entry::LedgerEntry;
use crate::error::LedgerResult;

/// Previous-hash constant for the first entry in a chain.
pub const GENESIS_HASH: &str = "GENESIS";

/// Compute the hash of an entry from its own fields and `previous_hash`.
/// The stored `current_hash` field is not an input.
pub fn entry_hash(entry: &LedgerEntry) -> LedgerResult<String> {
    let mut payload = serde_json::to_value(&entry.event)?;
    if let Some(map) = payload.as_object_mut() {
        map.remove("event_type");
    }

    let amount = entry
        .amount
        .map(|a| a.to_string())
        .unwrap_or_else(|| "null".to_string());

    let mut hasher = Sha256::new();
    hasher.update(entry.loan_id.as_bytes());
    hasher.update(b"|");
    hasher.update(entry.sequence_num.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(entry.previous_hash.as_bytes());
    hasher.update(b"|");
    hasher.update(entry.event.type_name().as_bytes());
    hasher.update(b"|");
    hasher.update(canonical_json(&payload).as_bytes());
    hasher.update(b"|");
    hasher.update(amount.as_bytes());
    hasher.update(b"|");
    hasher.update(entry.performed_by.as_bytes());
    hasher.update(b"|");
    hasher.update(entry.timestamp.to_rfc3339().as_bytes());

    Ok(hex::encode(hasher.finalize()))
}
