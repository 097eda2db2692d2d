use arrayref::array_ref;
use tracing::debug;

use crate::core::constants::{dex_programs, discriminators, NATIVE_SOL_DECIMALS, TOKENS};
use crate::core::error::{DecodeError, Diagnostics};
use crate::core::transaction_context::TransactionContext;
use crate::core::utils::get_instruction_data;
use crate::protocols::binary_reader::BinaryReader;
use crate::protocols::SwapDecoder;
use crate::types::{CompiledInstruction, FragmentKind, Protocol, SwapFragment, TokenLeg};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PumpfunTradeEvent {
    pub mint: String,
    pub sol_amount: u64,
    pub token_amount: u64,
    pub is_buy: bool,
    pub user: String,
    pub timestamp: i64,
    pub virtual_sol_reserves: u64,
    pub virtual_token_reserves: u64,
}

impl PumpfunTradeEvent {
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = BinaryReader::after(data, 16)?;
        let event = Self {
            mint: reader.read_pubkey()?,
            sol_amount: reader.read_u64()?,
            token_amount: reader.read_u64()?,
            is_buy: reader.read_bool()?,
            user: reader.read_pubkey()?,
            timestamp: reader.read_i64()?,
            virtual_sol_reserves: reader.read_u64()?,
            virtual_token_reserves: reader.read_u64()?,
        };
        // later program versions append fee and reserve fields
        if reader.remaining() > 0 {
            debug!(trailing = reader.remaining(), "pumpfun trade event has extra fields");
        }
        Ok(event)
    }

    /// Buys pay SOL for the token; sells the reverse.
    fn into_fragment(self, ctx: &TransactionContext<'_>) -> SwapFragment {
        let sol = TokenLeg::new(TOKENS.SOL, self.sol_amount, NATIVE_SOL_DECIMALS);
        let token = TokenLeg::new(
            self.mint.as_str(),
            self.token_amount,
            ctx.decimals_or_zero(&self.mint),
        );
        let (input, output) = if self.is_buy { (sol, token) } else { (token, sol) };
        SwapFragment::paired(Protocol::PumpFun, FragmentKind::Event, input, output)
            .with_timestamp(Some(self.timestamp))
    }
}

/// Bonding-curve program; swaps are read from its self-CPI trade events.
pub struct PumpfunDecoder;

/// Events the program emits that are not trades.
const NON_TRADE_EVENTS: [[u8; 16]; 3] = [
    discriminators::pumpfun_events::CREATE,
    discriminators::pumpfun_events::COMPLETE,
    discriminators::pumpfun_events::MIGRATE,
];

impl PumpfunDecoder {
    fn decode_event(
        &self,
        ctx: &TransactionContext<'_>,
        ix: &CompiledInstruction,
    ) -> Result<Option<SwapFragment>, DecodeError> {
        if ctx.program_id(ix)? != dex_programs::PUMP_FUN {
            return Ok(None);
        }
        let data = get_instruction_data(ix)?;
        // buy/sell invocations from routers share the program but carry no event tag
        if data.len() < 16 || *array_ref![data, 0, 8] != discriminators::EVENT_IX_TAG {
            return Ok(None);
        }
        let discriminator = array_ref![data, 0, 16];
        if *discriminator == discriminators::pumpfun_events::TRADE {
            let event = PumpfunTradeEvent::decode(&data)?;
            debug!(mint = %event.mint, is_buy = event.is_buy, user = %event.user, "pumpfun trade event");
            return Ok(Some(event.into_fragment(ctx)));
        }
        if NON_TRADE_EVENTS.contains(discriminator) {
            return Ok(None);
        }
        Err(DecodeError::unknown_discriminator(
            dex_programs::PUMP_FUN,
            discriminator,
        ))
    }
}

impl SwapDecoder for PumpfunDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::PumpFun
    }

    fn decode(
        &self,
        ctx: &TransactionContext<'_>,
        outer_index: usize,
        diagnostics: &mut Diagnostics,
    ) -> Vec<SwapFragment> {
        ctx.instructions()
            .inner(outer_index)
            .iter()
            .filter_map(|ix| match self.decode_event(ctx, ix) {
                Ok(fragment) => fragment,
                Err(err) => {
                    diagnostics.record(Protocol::PumpFun, err);
                    None
                }
            })
            .collect()
    }
}
