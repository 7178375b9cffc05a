//! Base58 account addresses

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, WalletError};

/// Length of an account address in bytes
pub const PUBKEY_BYTES: usize = 32;

/// Longest base58 rendering of a 32-byte value
const MAX_BASE58_LEN: usize = 44;

/// A 32-byte Solana account address
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pubkey([u8; PUBKEY_BYTES]);

impl Pubkey {
    /// Wrap raw address bytes
    pub const fn new_from_array(bytes: [u8; PUBKEY_BYTES]) -> Self {
        Self(bytes)
    }

    /// Build from a slice (must be exactly 32 bytes)
    pub fn try_from_slice(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; PUBKEY_BYTES] = slice.try_into().map_err(|_| {
            WalletError::InvalidPublicKey(format!(
                "expected {} bytes, got {}",
                PUBKEY_BYTES,
                slice.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Get the address bytes
    pub fn as_bytes(&self) -> &[u8; PUBKEY_BYTES] {
        &self.0
    }

    /// Encode as base58
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

impl FromStr for Pubkey {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || s.len() > MAX_BASE58_LEN {
            return Err(WalletError::InvalidPublicKey(format!(
                "'{}' is not a valid base58 address",
                s
            )));
        }

        let decoded = bs58::decode(s)
            .into_vec()
            .map_err(|e| WalletError::InvalidPublicKey(format!("'{}': {}", s, e)))?;

        Self::try_from_slice(&decoded)
            .map_err(|_| WalletError::InvalidPublicKey(format!("'{}' does not decode to 32 bytes", s)))
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({})", self.to_base58())
    }
}

impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_program_round_trip() {
        let key: Pubkey = "11111111111111111111111111111111".parse().unwrap();
        assert_eq!(key.as_bytes(), &[0u8; 32]);
        assert_eq!(key.to_string(), "11111111111111111111111111111111");
    }

    #[test]
    fn test_rejects_wrong_length() {
        // Valid base58 but only a few bytes long
        let err = "abc".parse::<Pubkey>().unwrap_err();
        assert!(err.to_string().contains("does not decode to 32 bytes"));
    }

    #[test]
    fn test_rejects_invalid_alphabet() {
        // '0', 'O', 'I' and 'l' are not in the base58 alphabet
        assert!("0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OIl".parse::<Pubkey>().is_err());
        assert!("".parse::<Pubkey>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let key = Pubkey::new_from_array([7u8; 32]);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{}\"", key.to_base58()));

        let back: Pubkey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
