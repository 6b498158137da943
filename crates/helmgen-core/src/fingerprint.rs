//! Structural fingerprints of manifest values
//!
//! A fingerprint is a SHA-256 digest over a canonical encoding of a YAML
//! value. Mapping entries are digested individually and sorted before being
//! combined, so two mappings holding the same entries produce the same
//! fingerprint whatever their insertion order. Sequences keep their order.

use serde_yaml::{Mapping, Value};
use sha2::{Digest, Sha256};
use std::fmt;

/// Fixed-width content fingerprint
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprint an arbitrary YAML value
    pub fn of(value: &Value) -> Self {
        Self(digest_value(value))
    }

    /// Fingerprint a mapping (a whole manifest)
    pub fn of_mapping(mapping: &Mapping) -> Self {
        Self(digest_mapping(mapping))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex representation
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..12])
    }
}

// Type tags keep values of different kinds with equal payloads apart
const TAG_NULL: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_INT: u8 = 2;
const TAG_UINT: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_STRING: u8 = 5;
const TAG_SEQUENCE: u8 = 6;
const TAG_MAPPING: u8 = 7;
const TAG_TAGGED: u8 = 8;

fn digest_value(value: &Value) -> [u8; 32] {
    let mut hasher = Sha256::new();

    match value {
        Value::Null => hasher.update([TAG_NULL]),
        Value::Bool(b) => {
            hasher.update([TAG_BOOL, u8::from(*b)]);
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                hasher.update([TAG_INT]);
                hasher.update(i.to_le_bytes());
            } else if let Some(u) = n.as_u64() {
                hasher.update([TAG_UINT]);
                hasher.update(u.to_le_bytes());
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                // -0.0 and 0.0 compare equal, hash them the same way
                let f = if f == 0.0 { 0.0 } else { f };
                hasher.update([TAG_FLOAT]);
                hasher.update(f.to_bits().to_le_bytes());
            }
        }
        Value::String(s) => {
            hasher.update([TAG_STRING]);
            update_len(&mut hasher, s.len());
            hasher.update(s.as_bytes());
        }
        Value::Sequence(items) => {
            hasher.update([TAG_SEQUENCE]);
            update_len(&mut hasher, items.len());
            for item in items {
                hasher.update(digest_value(item));
            }
        }
        Value::Mapping(mapping) => return digest_mapping(mapping),
        Value::Tagged(tagged) => {
            hasher.update([TAG_TAGGED]);
            let tag = tagged.tag.to_string();
            update_len(&mut hasher, tag.len());
            hasher.update(tag.as_bytes());
            hasher.update(digest_value(&tagged.value));
        }
    }

    hasher.finalize().into()
}

fn digest_mapping(mapping: &Mapping) -> [u8; 32] {
    let mut entries: Vec<([u8; 32], [u8; 32])> = mapping
        .iter()
        .map(|(key, value)| (digest_value(key), digest_value(value)))
        .collect();
    entries.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update([TAG_MAPPING]);
    update_len(&mut hasher, entries.len());
    for (key, value) in &entries {
        hasher.update(key);
        hasher.update(value);
    }
    hasher.finalize().into()
}

fn update_len(hasher: &mut Sha256, len: usize) {
    hasher.update((len as u64).to_le_bytes());
}
