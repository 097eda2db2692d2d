use crate::core::error::DecodeError;
use crate::types::CompiledInstruction;

/// Decode the base58 payload of a compiled instruction.
#[inline]
pub fn get_instruction_data(instruction: &CompiledInstruction) -> Result<Vec<u8>, DecodeError> {
    if instruction.data.is_empty() {
        return Ok(Vec::new());
    }
    Ok(bs58::decode(&instruction.data).into_vec()?)
}

/// Parse a raw integer amount as reported in token balances ("12345").
pub fn parse_raw_amount(amount: &str) -> Result<i128, DecodeError> {
    amount
        .parse::<i128>()
        .map_err(|_| DecodeError::malformed(format!("invalid token amount {amount:?}")))
}
