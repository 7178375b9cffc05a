//! Ed25519 keypairs for signing transactions

use ed25519_dalek::{Signer, SigningKey, KEYPAIR_LENGTH};
use rand::rngs::OsRng;
use std::fmt;

use super::SecretKeyBytes;
use crate::error::{Result, WalletError};
use crate::pubkey::Pubkey;

/// Length of a transaction signature in bytes
pub const SIGNATURE_BYTES: usize = 64;

/// A signing keypair - the secret half is zeroed when dropped
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a fresh random keypair
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Build from a 64-byte secret key (32-byte seed followed by the public key)
    ///
    /// Fails if the length is wrong or the embedded public key does not belong
    /// to the seed. Error messages never include the key material.
    pub fn from_secret_key(secret: &SecretKeyBytes) -> Result<Self> {
        let bytes: &[u8; KEYPAIR_LENGTH] = secret.expose().try_into().map_err(|_| {
            WalletError::InvalidSecretKey(format!(
                "expected {} bytes, got {}",
                KEYPAIR_LENGTH,
                secret.len()
            ))
        })?;

        let signing_key = SigningKey::from_keypair_bytes(bytes).map_err(|_| {
            WalletError::InvalidSecretKey(
                "public key half does not match the secret seed".to_string(),
            )
        })?;

        Ok(Self { signing_key })
    }

    /// The public key (account address) of this keypair
    pub fn pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message, returning the raw 64-byte signature
    pub fn sign_message(&self, message: &[u8]) -> [u8; SIGNATURE_BYTES] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Export the 64-byte secret key (seed + public key)
    pub fn to_secret_key(&self) -> SecretKeyBytes {
        SecretKeyBytes::new(self.signing_key.to_keypair_bytes().to_vec())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.pubkey())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, Verifier};

    #[test]
    fn test_pubkey_derivation_is_deterministic() {
        let original = Keypair::generate();
        let secret = original.to_secret_key();

        let first = Keypair::from_secret_key(&secret).unwrap();
        let second = Keypair::from_secret_key(&secret).unwrap();

        assert_eq!(first.pubkey().to_string(), second.pubkey().to_string());
        assert_eq!(first.pubkey(), original.pubkey());
    }

    #[test]
    fn test_rejects_wrong_length() {
        let err = Keypair::from_secret_key(&SecretKeyBytes::new(vec![1u8; 32])).unwrap_err();
        assert!(err.to_string().contains("expected 64 bytes, got 32"));
    }

    #[test]
    fn test_rejects_mismatched_public_half() {
        let mut bytes = Keypair::generate().to_secret_key().expose().to_vec();
        bytes[40] ^= 0xff;

        let err = Keypair::from_secret_key(&SecretKeyBytes::new(bytes)).unwrap_err();
        assert!(matches!(err, WalletError::InvalidSecretKey(_)));
    }

    #[test]
    fn test_signature_verifies() {
        let keypair = Keypair::generate();
        let sig = keypair.sign_message(b"hello solana");

        let verifying = keypair.signing_key.verifying_key();
        assert!(verifying
            .verify(b"hello solana", &Signature::from_bytes(&sig))
            .is_ok());
    }

    #[test]
    fn test_debug_redacted() {
        let keypair = Keypair::generate();
        let debug = format!("{:?}", keypair);
        assert!(debug.contains("REDACTED"));
        assert!(debug.contains(&keypair.pubkey().to_string()));
    }
}
