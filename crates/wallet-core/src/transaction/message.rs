//! Legacy message compilation and serialization

use std::fmt;
use std::str::FromStr;

use super::instruction::{CompiledInstruction, Instruction};
use super::short_vec;
use crate::error::{Result, WalletError};
use crate::pubkey::Pubkey;

/// Recent blockhash referenced by a message
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Hash([u8; 32]);

impl Hash {
    pub const fn new_from_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for Hash {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self> {
        let decoded = bs58::decode(s)
            .into_vec()
            .map_err(|e| WalletError::InvalidBlockhash(format!("'{}': {}", s, e)))?;
        let bytes: [u8; 32] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| WalletError::InvalidBlockhash(format!("'{}' is not 32 bytes", s)))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self)
    }
}

/// Signature and read-only counts for the account key list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

/// A compiled legacy message ready to be signed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: Hash,
    pub instructions: Vec<CompiledInstruction>,
}

#[derive(Debug, Clone, Copy)]
struct KeyFlags {
    pubkey: Pubkey,
    is_signer: bool,
    is_writable: bool,
}

impl Message {
    /// Compile instructions into a message paid for by `payer`
    ///
    /// Account metas that reference the same key are merged into one entry
    /// whose signer/writable flags are the union of every reference. Keys
    /// are ordered payer, writable signers, read-only signers, writable
    /// non-signers, read-only non-signers, keeping first-seen order inside
    /// each group.
    pub fn new(instructions: &[Instruction], payer: &Pubkey, recent_blockhash: Hash) -> Result<Self> {
        let mut keys: Vec<KeyFlags> = vec![KeyFlags {
            pubkey: *payer,
            is_signer: true,
            is_writable: true,
        }];

        let mut upsert = |pubkey: Pubkey, is_signer: bool, is_writable: bool| {
            match keys.iter_mut().find(|k| k.pubkey == pubkey) {
                Some(existing) => {
                    existing.is_signer |= is_signer;
                    existing.is_writable |= is_writable;
                }
                None => keys.push(KeyFlags {
                    pubkey,
                    is_signer,
                    is_writable,
                }),
            }
        };

        for ix in instructions {
            for meta in &ix.accounts {
                upsert(meta.pubkey, meta.is_signer, meta.is_writable);
            }
            upsert(ix.program_id, false, false);
        }

        let (payer_entry, rest) = keys.split_at(1);
        let group = move |signer: bool, writable: bool| {
            rest.iter()
                .filter(move |k| k.is_signer == signer && k.is_writable == writable)
                .copied()
        };

        let ordered: Vec<KeyFlags> = payer_entry
            .iter()
            .copied()
            .chain(group(true, true))
            .chain(group(true, false))
            .chain(group(false, true))
            .chain(group(false, false))
            .collect();

        if ordered.len() > u8::MAX as usize {
            return Err(WalletError::MessageError(format!(
                "too many account keys: {}",
                ordered.len()
            )));
        }

        let count = |f: &dyn Fn(&KeyFlags) -> bool| ordered.iter().filter(|k| f(k)).count() as u8;
        let header = MessageHeader {
            num_required_signatures: count(&|k: &KeyFlags| k.is_signer),
            num_readonly_signed_accounts: count(&|k: &KeyFlags| k.is_signer && !k.is_writable),
            num_readonly_unsigned_accounts: count(&|k: &KeyFlags| !k.is_signer && !k.is_writable),
        };

        let account_keys: Vec<Pubkey> = ordered.iter().map(|k| k.pubkey).collect();
        let index_of = |key: &Pubkey| -> Result<u8> {
            account_keys
                .iter()
                .position(|k| k == key)
                .map(|i| i as u8)
                .ok_or_else(|| WalletError::MessageError(format!("account {} missing from keys", key)))
        };

        let compiled = instructions
            .iter()
            .map(|ix| {
                Ok(CompiledInstruction {
                    program_id_index: index_of(&ix.program_id)?,
                    accounts: ix
                        .accounts
                        .iter()
                        .map(|meta| index_of(&meta.pubkey))
                        .collect::<Result<Vec<_>>>()?,
                    data: ix.data.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions: compiled,
        })
    }

    /// Signer keys, in the order their signatures must appear
    pub fn signer_keys(&self) -> &[Pubkey] {
        &self.account_keys[..self.header.num_required_signatures as usize]
    }

    /// Serialize to the legacy wire format (the bytes that get signed)
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(3 + 1 + self.account_keys.len() * 32 + 32 + 64);

        out.push(self.header.num_required_signatures);
        out.push(self.header.num_readonly_signed_accounts);
        out.push(self.header.num_readonly_unsigned_accounts);

        short_vec::encode_len(self.account_keys.len() as u16, &mut out);
        for key in &self.account_keys {
            out.extend_from_slice(key.as_bytes());
        }

        out.extend_from_slice(self.recent_blockhash.as_bytes());

        short_vec::encode_len(self.instructions.len() as u16, &mut out);
        for ix in &self.instructions {
            out.push(ix.program_id_index);
            short_vec::encode_len(ix.accounts.len() as u16, &mut out);
            out.extend_from_slice(&ix.accounts);
            short_vec::encode_len(ix.data.len() as u16, &mut out);
            out.extend_from_slice(&ix.data);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::AccountMeta;

    fn key(n: u8) -> Pubkey {
        Pubkey::new_from_array([n; 32])
    }

    fn wide_key(n: usize) -> Pubkey {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&(n as u64).to_le_bytes());
        Pubkey::new_from_array(bytes)
    }

    /// Payer, `metas` read-only accounts and one program
    fn wide_instruction(metas: usize) -> Instruction {
        Instruction::new(
            wide_key(10_000),
            (1..=metas)
                .map(|n| AccountMeta::new_readonly(wide_key(n), false))
                .collect(),
            vec![],
        )
    }

    #[test]
    fn test_account_ordering_and_header() {
        let payer = key(1);
        let program = key(9);
        let ix = Instruction::new(
            program,
            vec![
                AccountMeta::new_readonly(key(4), false),
                AccountMeta::new(key(3), false),
                AccountMeta::new_readonly(key(2), true),
            ],
            vec![],
        );

        let message = Message::new(&[ix], &payer, Hash::default()).unwrap();

        assert_eq!(
            message.account_keys,
            vec![payer, key(2), key(3), key(4), program]
        );
        assert_eq!(
            message.header,
            MessageHeader {
                num_required_signatures: 2,
                num_readonly_signed_accounts: 1,
                num_readonly_unsigned_accounts: 2,
            }
        );
        assert_eq!(message.instructions[0].program_id_index, 4);
        assert_eq!(message.instructions[0].accounts, vec![3, 2, 1]);
        assert_eq!(message.signer_keys(), &[payer, key(2)]);
    }

    #[test]
    fn test_duplicate_metas_merge_flags() {
        let payer = key(1);
        let ix = Instruction::new(
            key(9),
            vec![
                AccountMeta::new(key(5), false),
                AccountMeta::new(payer, false),
                AccountMeta::new_readonly(payer, true),
            ],
            vec![4],
        );

        let message = Message::new(&[ix], &payer, Hash::default()).unwrap();

        assert_eq!(message.account_keys, vec![payer, key(5), key(9)]);
        assert_eq!(message.header.num_required_signatures, 1);
        assert_eq!(message.header.num_readonly_signed_accounts, 0);
        assert_eq!(message.instructions[0].accounts, vec![1, 0, 0]);
        assert_eq!(message.header.num_readonly_unsigned_accounts, 1);
    }

    #[test]
    fn test_key_limit_fits_header() {
        let payer = wide_key(0);

        let full = Message::new(&[wide_instruction(253)], &payer, Hash::default()).unwrap();
        assert_eq!(full.account_keys.len(), 255);
        assert_eq!(full.header.num_readonly_unsigned_accounts, 254);

        let err = Message::new(&[wide_instruction(254)], &payer, Hash::default()).unwrap_err();
        assert!(matches!(err, WalletError::MessageError(_)));
    }

    #[test]
    fn test_serialize_layout() {
        let payer = key(1);
        let ix = Instruction::new(key(9), vec![AccountMeta::new(key(5), false)], vec![7, 8]);
        let blockhash = Hash::new_from_array([3u8; 32]);

        let bytes = Message::new(&[ix], &payer, blockhash).unwrap().serialize();

        assert_eq!(&bytes[..3], &[1, 0, 1]);
        assert_eq!(bytes[3], 3);
        assert_eq!(&bytes[4..36], &[1u8; 32]);
        assert_eq!(&bytes[100..132], &[3u8; 32]);
        assert_eq!(&bytes[132..], &[1, 2, 1, 1, 2, 7, 8]);
    }

    #[test]
    fn test_hash_parse() {
        let hash: Hash = "11111111111111111111111111111111".parse().unwrap();
        assert_eq!(hash, Hash::default());
        assert!("not-a-hash".parse::<Hash>().is_err());
    }
}
