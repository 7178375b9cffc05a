//! Key handling for caller-supplied wallets
//!
//! This module provides:
//! - Ed25519 keypairs built from 64-byte secret keys
//! - Secret key bytes with zeroize and redacted debug output

mod keypair;
mod secure_memory;

pub use keypair::{Keypair, SIGNATURE_BYTES};
pub use secure_memory::SecretKeyBytes;
