//! Transaction building and the legacy wire format
//!
//! Transactions are compiled and serialized by hand; signing uses the
//! ed25519 keypairs from [`crate::crypto`].

mod instruction;
mod message;
pub mod short_vec;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub use instruction::{AccountMeta, CompiledInstruction, Instruction};
pub use message::{Hash, Message, MessageHeader};

use crate::crypto::{Keypair, SIGNATURE_BYTES};
use crate::error::{Result, WalletError};

/// A signed (or partially signed) legacy transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub signatures: Vec<[u8; SIGNATURE_BYTES]>,
    pub message: Message,
}

impl Transaction {
    /// Wrap a message with zeroed signature slots for each required signer
    pub fn new_unsigned(message: Message) -> Self {
        let slots = message.header.num_required_signatures as usize;
        Self {
            signatures: vec![[0u8; SIGNATURE_BYTES]; slots],
            message,
        }
    }

    /// Sign with the given keypairs; every required signer must be present
    pub fn sign(&mut self, signers: &[&Keypair]) -> Result<()> {
        let message_bytes = self.message.serialize();

        for (slot, required) in self.message.signer_keys().iter().enumerate() {
            let keypair = signers
                .iter()
                .find(|kp| kp.pubkey() == *required)
                .ok_or_else(|| {
                    WalletError::MessageError(format!("missing signer for {}", required))
                })?;
            self.signatures[slot] = keypair.sign_message(&message_bytes);
        }

        for kp in signers {
            if !self.message.signer_keys().contains(&kp.pubkey()) {
                return Err(WalletError::MessageError(format!(
                    "keypair {} is not a signer of this message",
                    kp.pubkey()
                )));
            }
        }

        Ok(())
    }

    /// Base58 of the first signature, which identifies the transaction
    pub fn signature(&self) -> Option<String> {
        self.signatures
            .first()
            .map(|sig| bs58::encode(sig).into_string())
    }

    /// Serialize signatures followed by the message
    pub fn serialize(&self) -> Vec<u8> {
        let message_bytes = self.message.serialize();
        let mut out = Vec::with_capacity(1 + self.signatures.len() * SIGNATURE_BYTES + message_bytes.len());

        short_vec::encode_len(self.signatures.len() as u16, &mut out);
        for sig in &self.signatures {
            out.extend_from_slice(sig);
        }
        out.extend_from_slice(&message_bytes);

        out
    }

    /// Base64 of the serialized transaction, as accepted by `sendTransaction`
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.serialize())
    }
}
