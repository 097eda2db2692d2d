use arrayref::array_ref;
use tracing::debug;

use crate::core::balance::{BalanceDiffEngine, BalanceHolder};
use crate::core::constants::{discriminators, NATIVE_SOL_DECIMALS, TOKENS};
use crate::core::error::{DecodeError, Diagnostics};
use crate::core::transaction_context::TransactionContext;
use crate::core::utils::get_instruction_data;
use crate::protocols::binary_reader::BinaryReader;
use crate::protocols::SwapDecoder;
use crate::types::{FragmentKind, Protocol, SwapFragment, TokenLeg};

const INSTRUCTION_LEN: usize = 33;
const ACCOUNT_COUNT: usize = 11;
const MINT_POSITION: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TradeDirection {
    Buy,
    Sell,
}

/// Limits passed to a buy/sell. The executed amounts differ.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TradeParams {
    pub token_amount: u64,
    pub collateral_amount: u64,
    pub fixed_side: u8,
    pub slippage_bps: u64,
}

impl TradeParams {
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = BinaryReader::after(data, 8)?;
        Ok(Self {
            token_amount: reader.read_u64()?,
            collateral_amount: reader.read_u64()?,
            fixed_side: reader.read_u8()?,
            slippage_bps: reader.read_u64()?,
        })
    }
}

/// Fixed-price bonding curve called directly; magnitudes come from balance diffs.
pub struct MoonshotDecoder;

impl MoonshotDecoder {
    fn decode_instruction(
        &self,
        ctx: &TransactionContext<'_>,
        outer_index: usize,
    ) -> Result<Option<SwapFragment>, DecodeError> {
        let ix = ctx.instructions().outer_at(outer_index)?;
        let data = get_instruction_data(ix)?;
        if data.len() < 8 {
            return Ok(None);
        }
        // token creation and curve migration share the program
        let direction = match *array_ref![data, 0, 8] {
            discriminators::moonshot_instructions::BUY => TradeDirection::Buy,
            discriminators::moonshot_instructions::SELL => TradeDirection::Sell,
            _ => return Ok(None),
        };
        if data.len() != INSTRUCTION_LEN || ix.accounts.len() != ACCOUNT_COUNT {
            return Err(DecodeError::InvalidInstructionData(format!(
                "moonshot trade expects {INSTRUCTION_LEN} data bytes and {ACCOUNT_COUNT} accounts, got {} and {}",
                data.len(),
                ix.accounts.len()
            )));
        }
        let params = TradeParams::decode(&data)?;
        let mint = ctx.account(ix, MINT_POSITION)?;
        let trader = ctx.primary_signer()?;

        let engine = BalanceDiffEngine::new(ctx);
        let token_change = engine.token_change(mint, BalanceHolder::Owner(trader))?;
        let sol_change = engine.native_change(0)?;
        debug!(
            ?direction,
            limit_tokens = params.token_amount,
            limit_collateral = params.collateral_amount,
            token_change = %token_change,
            sol_change = %sol_change,
            "moonshot trade"
        );

        let token = TokenLeg::new(mint, magnitude(token_change)?, ctx.decimals_or_zero(mint));
        let sol = TokenLeg::new(TOKENS.SOL, magnitude(sol_change)?, NATIVE_SOL_DECIMALS);
        let (input, output) = match direction {
            TradeDirection::Buy => (sol, token),
            TradeDirection::Sell => (token, sol),
        };
        Ok(Some(SwapFragment::paired(
            Protocol::Moonshot,
            FragmentKind::Instruction,
            input,
            output,
        )))
    }
}

fn magnitude(change: i128) -> Result<u64, DecodeError> {
    u64::try_from(change.unsigned_abs())
        .map_err(|_| DecodeError::InvalidInstructionData(format!("balance change {change} exceeds u64")))
}

impl SwapDecoder for MoonshotDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::Moonshot
    }

    fn decode(
        &self,
        ctx: &TransactionContext<'_>,
        outer_index: usize,
        diagnostics: &mut Diagnostics,
    ) -> Vec<SwapFragment> {
        match self.decode_instruction(ctx, outer_index) {
            Ok(fragment) => fragment.into_iter().collect(),
            Err(err) => {
                diagnostics.record(Protocol::Moonshot, err);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecodeConfig;
    use crate::core::constants::dex_programs;
    use crate::core::registry::default_registry;
    use crate::test_support::TxBuilder;

    fn trade_data(discriminator: [u8; 8]) -> Vec<u8> {
        let mut data = discriminator.to_vec();
        data.extend_from_slice(&1_000_000u64.to_le_bytes());
        data.extend_from_slice(&2_000_000_000u64.to_le_bytes());
        data.push(1);
        data.extend_from_slice(&100u64.to_le_bytes());
        data
    }

    fn builder(discriminator: [u8; 8]) -> (TxBuilder, usize) {
        let mut builder = TxBuilder::new("trader");
        let accounts = ["trader", "a1", "a2", "a3", "a4", "a5", "MOON_MINT", "a7", "a8", "a9", "a10"];
        let outer = builder.outer(dex_programs::MOONSHOT, &accounts, &trade_data(discriminator));
        (builder, outer)
    }

    fn decode(builder: &TxBuilder, outer: usize) -> (Vec<SwapFragment>, Diagnostics) {
        let tx = builder.build();
        let config = DecodeConfig::default();
        let ctx = TransactionContext::new(&tx, default_registry(), &config).unwrap();
        let mut diagnostics = Diagnostics::default();
        let fragments = MoonshotDecoder.decode(&ctx, outer, &mut diagnostics);
        (fragments, diagnostics)
    }

    #[test]
    fn params_layout() {
        let params = TradeParams::decode(&trade_data(discriminators::moonshot_instructions::BUY)).unwrap();
        assert_eq!(params.token_amount, 1_000_000);
        assert_eq!(params.collateral_amount, 2_000_000_000);
        assert_eq!(params.fixed_side, 1);
        assert_eq!(params.slippage_bps, 100);
    }

    #[test]
    fn buy_uses_measured_changes_not_limits() {
        let (mut builder, outer) = builder(discriminators::moonshot_instructions::BUY);
        builder
            .lamports("trader", 3_000_000_000, 1_499_000_000)
            .token_balance("ata", "MOON_MINT", "trader", Some(0), Some(987_654), 9);

        let (fragments, diagnostics) = decode(&builder, outer);
        assert!(diagnostics.is_empty());
        assert_eq!(fragments[0].input, TokenLeg::new(TOKENS.SOL, 1_501_000_000, 9));
        assert_eq!(fragments[0].output, TokenLeg::new("MOON_MINT", 987_654, 9));
        assert_eq!(fragments[0].kind, FragmentKind::Instruction);
    }

    #[test]
    fn sell_reverses_legs() {
        let (mut builder, outer) = builder(discriminators::moonshot_instructions::SELL);
        builder
            .lamports("trader", 1_000_000_000, 1_400_000_000)
            .token_balance("ata", "MOON_MINT", "trader", Some(500), Some(0), 9);

        let (fragments, _) = decode(&builder, outer);
        assert_eq!(fragments[0].input, TokenLeg::new("MOON_MINT", 500, 9));
        assert_eq!(fragments[0].output.amount, 400_000_000);
    }

    #[test]
    fn missing_token_balance_is_recorded() {
        let (builder, outer) = builder(discriminators::moonshot_instructions::BUY);
        let (fragments, diagnostics) = decode(&builder, outer);
        assert!(fragments.is_empty());
        assert!(matches!(
            diagnostics.entries()[0].1,
            DecodeError::BalanceNotFound { .. }
        ));
    }

    #[test]
    fn non_trade_instruction_is_skipped_silently() {
        let (builder, outer) = builder([3u8; 8]);
        let (fragments, diagnostics) = decode(&builder, outer);
        assert!(fragments.is_empty());
        assert!(diagnostics.is_empty());

        let mut short = TxBuilder::new("trader");
        let outer = short.outer(dex_programs::MOONSHOT, &["trader"], &[1, 2]);
        let (fragments, diagnostics) = decode(&short, outer);
        assert!(fragments.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn truncated_trade_is_recorded() {
        let mut builder = TxBuilder::new("trader");
        let mut data = discriminators::moonshot_instructions::SELL.to_vec();
        data.push(0);
        let outer = builder.outer(dex_programs::MOONSHOT, &["trader"], &data);
        let (fragments, diagnostics) = decode(&builder, outer);
        assert!(fragments.is_empty());
        assert!(matches!(
            diagnostics.entries()[0].1,
            DecodeError::InvalidInstructionData(_)
        ));
    }
}
