//! Flatten transaction instructions into [`InstructionView`]s

use crate::error::{RpcError, RpcResult};
use crate::types::{
    InstructionView, LoadedAddresses, TransactionRecord, UiInstruction, UiMessage, UiRawMessage,
};

/// Instructions of a fetched transaction, in message order
///
/// A parsed message already carries program ids, so its instructions are
/// used as-is. A raw message is decompiled: indices resolve against the
/// static account keys followed by the loaded writable and read-only
/// lookup-table addresses.
pub fn extract_instructions(record: &TransactionRecord) -> RpcResult<Vec<InstructionView>> {
    match &record.transaction.message {
        UiMessage::Parsed(message) => Ok(message.instructions.iter().map(view_of).collect()),
        UiMessage::Raw(message) => {
            let loaded = record
                .meta
                .as_ref()
                .and_then(|meta| meta.loaded_addresses.as_ref());
            decompile(message, loaded)
        }
    }
}

fn view_of(ix: &UiInstruction) -> InstructionView {
    match ix {
        UiInstruction::Parsed(parsed) => InstructionView::Parsed {
            program: parsed.program.clone(),
            program_id: parsed.program_id.clone(),
            parsed: parsed.parsed.clone(),
        },
        UiInstruction::PartiallyDecoded(raw) => InstructionView::Raw {
            program_id: raw.program_id.clone(),
            data: raw.data.clone(),
        },
    }
}

fn decompile(
    message: &UiRawMessage,
    loaded: Option<&LoadedAddresses>,
) -> RpcResult<Vec<InstructionView>> {
    let keys: Vec<&String> = message
        .account_keys
        .iter()
        .chain(loaded.into_iter().flat_map(|l| l.writable.iter()))
        .chain(loaded.into_iter().flat_map(|l| l.readonly.iter()))
        .collect();

    message
        .instructions
        .iter()
        .map(|ix| {
            let program_id = keys.get(ix.program_id_index as usize).ok_or_else(|| {
                RpcError::UnexpectedResponse(format!(
                    "program id index {} out of range ({} keys)",
                    ix.program_id_index,
                    keys.len()
                ))
            })?;
            Ok(InstructionView::Raw {
                program_id: (*program_id).clone(),
                data: ix.data.clone(),
            })
        })
        .collect()
}
