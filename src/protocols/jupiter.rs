use arrayref::array_ref;
use tracing::debug;

use crate::core::constants::{dex_programs, discriminators};
use crate::core::error::{DecodeError, Diagnostics};
use crate::core::transaction_context::TransactionContext;
use crate::core::utils::get_instruction_data;
use crate::protocols::binary_reader::BinaryReader;
use crate::protocols::SwapDecoder;
use crate::types::{CompiledInstruction, FragmentKind, Protocol, SwapFragment, TokenLeg};

/// One hop of an aggregator route as logged by the program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JupiterRouteEvent {
    pub amm: String,
    pub input_mint: String,
    pub input_amount: u64,
    pub output_mint: String,
    pub output_amount: u64,
}

impl JupiterRouteEvent {
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = BinaryReader::after(data, 16)?;
        Ok(Self {
            amm: reader.read_pubkey()?,
            input_mint: reader.read_pubkey()?,
            input_amount: reader.read_u64()?,
            output_mint: reader.read_pubkey()?,
            output_amount: reader.read_u64()?,
        })
    }
}

pub struct JupiterDecoder;

impl JupiterDecoder {
    fn decode_event(
        &self,
        ctx: &TransactionContext<'_>,
        ix: &CompiledInstruction,
    ) -> Result<Option<SwapFragment>, DecodeError> {
        if ctx.program_id(ix)? != dex_programs::JUPITER {
            return Ok(None);
        }
        let data = get_instruction_data(ix)?;
        if data.len() < 16 || *array_ref![data, 0, 8] != discriminators::EVENT_IX_TAG {
            return Ok(None);
        }
        if *array_ref![data, 0, 16] != discriminators::jupiter_events::ROUTE {
            return Err(DecodeError::unknown_discriminator(
                dex_programs::JUPITER,
                &data[..16],
            ));
        }

        let event = JupiterRouteEvent::decode(&data)?;
        debug!(
            amm = %event.amm,
            input_mint = %event.input_mint,
            output_mint = %event.output_mint,
            "jupiter route event"
        );
        let input = TokenLeg::new(
            event.input_mint.as_str(),
            event.input_amount,
            ctx.decimals_or_zero(&event.input_mint),
        );
        let output = TokenLeg::new(
            event.output_mint.as_str(),
            event.output_amount,
            ctx.decimals_or_zero(&event.output_mint),
        );
        Ok(Some(SwapFragment::paired(
            Protocol::Jupiter,
            FragmentKind::Event,
            input,
            output,
        )))
    }
}

impl SwapDecoder for JupiterDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::Jupiter
    }

    fn decode(
        &self,
        ctx: &TransactionContext<'_>,
        outer_index: usize,
        diagnostics: &mut Diagnostics,
    ) -> Vec<SwapFragment> {
        let mut fragments = Vec::new();
        for ix in ctx.instructions().inner(outer_index) {
            match self.decode_event(ctx, ix) {
                Ok(Some(fragment)) => fragments.push(fragment),
                Ok(None) => {}
                Err(err) => diagnostics.record(Protocol::Jupiter, err),
            }
        }
        fragments
    }
}
