use spl_token::instruction::TokenInstruction;

use crate::core::constants::{spl_token_tags, token_programs};
use crate::core::error::DecodeError;
use crate::core::transaction_context::AccountKeyTable;
use crate::core::utils::get_instruction_data;
use crate::types::CompiledInstruction;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferKind {
    Transfer,
    TransferChecked,
}

/// SPL token movement with every account resolved to an address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenTransfer {
    pub kind: TransferKind,
    pub source: String,
    pub destination: String,
    pub authority: String,
    pub amount: u64,
    /// Only `TransferChecked` names its mint and decimals.
    pub mint: Option<String>,
    pub decimals: Option<u8>,
}

/// Decode `ix` as an SPL `Transfer`/`TransferChecked`.
///
/// Returns `Ok(None)` for anything that is not one: other programs, other
/// token instructions, or data/account lists shorter than the layout needs.
pub fn parse_transfer(
    keys: &AccountKeyTable,
    ix: &CompiledInstruction,
) -> Result<Option<TokenTransfer>, DecodeError> {
    let program_id = keys.get(ix.program_id_index as usize)?;
    if !token_programs::is_token_program(program_id) {
        return Ok(None);
    }

    let data = get_instruction_data(ix)?;
    let (kind, min_accounts, min_data) = match data.first() {
        Some(&spl_token_tags::TRANSFER) => (TransferKind::Transfer, 3, 9),
        Some(&spl_token_tags::TRANSFER_CHECKED) => (TransferKind::TransferChecked, 4, 10),
        _ => return Ok(None),
    };
    if ix.accounts.len() < min_accounts || data.len() < min_data {
        return Ok(None);
    }

    let account = |position: usize| keys.get(ix.accounts[position] as usize).map(str::to_string);

    match TokenInstruction::unpack(&data) {
        Ok(TokenInstruction::Transfer { amount }) => Ok(Some(TokenTransfer {
            kind,
            source: account(0)?,
            destination: account(1)?,
            authority: account(2)?,
            amount,
            mint: None,
            decimals: None,
        })),
        Ok(TokenInstruction::TransferChecked { amount, decimals }) => Ok(Some(TokenTransfer {
            kind,
            source: account(0)?,
            mint: Some(account(1)?),
            destination: account(2)?,
            authority: account(3)?,
            amount,
            decimals: Some(decimals),
        })),
        Ok(_) => Ok(None),
        Err(err) => Err(DecodeError::InvalidInstructionData(format!(
            "spl token instruction: {err}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction_context::AccountKeyTable;

    fn keys() -> AccountKeyTable {
        AccountKeyTable::from_keys(vec![
            "src".to_string(),
            "mint".to_string(),
            "dst".to_string(),
            "auth".to_string(),
            token_programs::TOKEN.to_string(),
            token_programs::TOKEN_2022.to_string(),
            "other".to_string(),
        ])
    }

    fn instruction(program: u8, accounts: Vec<u8>, data: &[u8]) -> CompiledInstruction {
        CompiledInstruction {
            program_id_index: program,
            accounts,
            data: bs58::encode(data).into_string(),
            stack_height: None,
        }
    }

    fn transfer_data(amount: u64) -> Vec<u8> {
        let mut data = vec![spl_token_tags::TRANSFER];
        data.extend_from_slice(&amount.to_le_bytes());
        data
    }

    #[test]
    fn decodes_plain_transfer() {
        let ix = instruction(4, vec![0, 2, 3], &transfer_data(1_500));
        let transfer = parse_transfer(&keys(), &ix).unwrap().unwrap();
        assert_eq!(transfer.kind, TransferKind::Transfer);
        assert_eq!(transfer.source, "src");
        assert_eq!(transfer.destination, "dst");
        assert_eq!(transfer.authority, "auth");
        assert_eq!(transfer.amount, 1_500);
        assert!(transfer.mint.is_none());
    }

    #[test]
    fn decodes_transfer_checked_on_token_2022() {
        let mut data = vec![spl_token_tags::TRANSFER_CHECKED];
        data.extend_from_slice(&77u64.to_le_bytes());
        data.push(6);
        let ix = instruction(5, vec![0, 1, 2, 3], &data);
        let transfer = parse_transfer(&keys(), &ix).unwrap().unwrap();
        assert_eq!(transfer.kind, TransferKind::TransferChecked);
        assert_eq!(transfer.mint.as_deref(), Some("mint"));
        assert_eq!(transfer.destination, "dst");
        assert_eq!(transfer.decimals, Some(6));
        assert_eq!(transfer.amount, 77);
    }

    #[test]
    fn short_layouts_and_foreign_programs_are_skipped() {
        let short = instruction(4, vec![0, 2], &transfer_data(1));
        assert_eq!(parse_transfer(&keys(), &short).unwrap(), None);

        let truncated = instruction(4, vec![0, 2, 3], &[spl_token_tags::TRANSFER, 1, 2]);
        assert_eq!(parse_transfer(&keys(), &truncated).unwrap(), None);

        let foreign = instruction(6, vec![0, 2, 3], &transfer_data(1));
        assert_eq!(parse_transfer(&keys(), &foreign).unwrap(), None);

        // CloseAccount
        let close = instruction(4, vec![0, 2, 3], &[9]);
        assert_eq!(parse_transfer(&keys(), &close).unwrap(), None);
    }

    #[test]
    fn account_index_past_table_is_an_error() {
        let ix = instruction(4, vec![0, 42, 3], &transfer_data(1));
        assert!(matches!(
            parse_transfer(&keys(), &ix),
            Err(DecodeError::IndexOutOfRange { index: 42, .. })
        ));
    }
}
