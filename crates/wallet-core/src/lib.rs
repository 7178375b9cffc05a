//! # wallet-core
//!
//! Core Solana wallet functionality for walletmcp including:
//! - Base58 addresses and ed25519 keypairs with zeroize-on-drop secrets
//! - Legacy transaction compilation, signing, and wire serialization
//! - System transfer and upgradeable-loader instruction builders
//! - Cluster selection and server settings

pub mod crypto;
pub mod error;
pub mod network;
pub mod programs;
pub mod pubkey;
pub mod settings;
pub mod transaction;

pub use crypto::{Keypair, SecretKeyBytes};
pub use error::{Result, WalletError};
pub use network::{Commitment, Network};
pub use pubkey::Pubkey;
pub use settings::Settings;
pub use transaction::{AccountMeta, Hash, Instruction, Message, Transaction};
