//! Secure memory handling with automatic zeroization

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Message used for every malformed secret key element. Never includes the value itself.
const INVALID_BYTE: &str = "secret key bytes must be integers in 0..=255";

/// Caller-supplied secret key bytes - automatically zeroed when dropped
///
/// Deserializes from a JSON array of integers. Error messages produced while
/// decoding never echo the offending values, and `Debug` output is redacted.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKeyBytes {
    bytes: Vec<u8>,
}

impl SecretKeyBytes {
    /// Create from raw bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Get the secret bytes (use carefully - avoid copying)
    pub fn expose(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes supplied
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether no bytes were supplied
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for SecretKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKeyBytes")
            .field("len", &self.bytes.len())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

struct SecretKeyVisitor;

impl<'de> Visitor<'de> for SecretKeyVisitor {
    type Value = SecretKeyBytes;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an array of integers in 0..=255")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(64));

        loop {
            let next = seq
                .next_element::<u64>()
                .map_err(|_| de::Error::custom(INVALID_BYTE));

            let value = match next {
                Ok(Some(value)) => value,
                Ok(None) => break,
                Err(e) => {
                    bytes.zeroize();
                    return Err(e);
                }
            };

            match u8::try_from(value) {
                Ok(b) => bytes.push(b),
                Err(_) => {
                    bytes.zeroize();
                    return Err(de::Error::custom(INVALID_BYTE));
                }
            }
        }

        Ok(SecretKeyBytes { bytes })
    }
}

impl<'de> Deserialize<'de> for SecretKeyBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(SecretKeyVisitor)
    }
}
