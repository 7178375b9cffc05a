//! Builders for the native programs the wallet talks to

use crate::error::{Result, WalletError};
use crate::pubkey::Pubkey;
use crate::transaction::{AccountMeta, Instruction};

/// System program id (`11111111111111111111111111111111`)
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new_from_array([0u8; 32]);

/// BPF upgradeable loader id (`BPFLoaderUpgradeab1e11111111111111111111111`)
pub const BPF_LOADER_UPGRADEABLE_ID: Pubkey = Pubkey::new_from_array([
    2, 168, 246, 145, 78, 136, 161, 176, 226, 16, 21, 62, 247, 99, 174, 43, 0, 194, 185, 61, 22,
    193, 36, 210, 192, 83, 122, 16, 4, 128, 0, 0,
]);

/// Data length used to select buffer accounts in `getProgramAccounts`
pub const BUFFER_ACCOUNT_SIZE: u64 = 165;

/// Byte offset of the authority field matched in `getProgramAccounts`
pub const BUFFER_AUTHORITY_OFFSET: usize = 1;

/// Loader instruction discriminator for closing a buffer
pub const CLOSE_DISCRIMINATOR: u8 = 4;

/// System program `Transfer` instruction index
const SYSTEM_TRANSFER_INDEX: u32 = 2;

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: f64 = 1e9;

/// Transfer `lamports` from `from` to `to`
pub fn system_transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> Instruction {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    Instruction::new(
        SYSTEM_PROGRAM_ID,
        vec![AccountMeta::new(*from, true), AccountMeta::new(*to, false)],
        data,
    )
}

/// Close a program buffer and send its lamports to `recipient`
///
/// Accounts are buffer (writable), recipient (writable), authority (signer).
/// When the recipient is also the authority, message compilation folds both
/// references into a single writable signer key.
pub fn close_buffer(buffer: &Pubkey, recipient: &Pubkey, authority: &Pubkey) -> Instruction {
    Instruction::new(
        BPF_LOADER_UPGRADEABLE_ID,
        vec![
            AccountMeta::new(*buffer, false),
            AccountMeta::new(*recipient, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        vec![CLOSE_DISCRIMINATOR],
    )
}

/// Convert a SOL amount into lamports
///
/// Rounds to the nearest lamport. Non-finite, non-positive, sub-lamport
/// and out-of-range amounts are rejected.
pub fn sol_to_lamports(amount_sol: f64) -> Result<u64> {
    if !amount_sol.is_finite() || amount_sol <= 0.0 {
        return Err(WalletError::InvalidAmount(format!(
            "amount must be a positive number of SOL, got {}",
            amount_sol
        )));
    }

    let lamports = (amount_sol * LAMPORTS_PER_SOL).round();
    if lamports < 1.0 {
        return Err(WalletError::InvalidAmount(format!(
            "{} SOL is less than one lamport",
            amount_sol
        )));
    }
    if lamports >= u64::MAX as f64 {
        return Err(WalletError::InvalidAmount(format!("{} SOL is too large", amount_sol)));
    }

    Ok(lamports as u64)
}

/// Convert lamports to SOL
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL
}
