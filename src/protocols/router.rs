use std::collections::HashSet;

use arrayref::array_ref;
use tracing::debug;

use crate::core::constants::discriminators;
use crate::core::error::Diagnostics;
use crate::core::transaction_context::TransactionContext;
use crate::core::utils::get_instruction_data;
use crate::protocols::{decoder_for, SwapDecoder};
use crate::types::{Protocol, SwapFragment};

/// Umbrella programs (aggregator routers, trading bots) that hold no swap
/// evidence of their own and delegate to the DEX programs they invoke.
pub struct RouterDecoder {
    protocol: Protocol,
    /// Known entry points; empty when the router is accepted on program id alone.
    entry_points: &'static [[u8; 8]],
}

impl RouterDecoder {
    pub const fn okx() -> Self {
        Self {
            protocol: Protocol::Okx,
            entry_points: discriminators::okx_instructions::ALL,
        }
    }

    pub const fn trading_bot() -> Self {
        Self {
            protocol: Protocol::TradingBot,
            entry_points: &[],
        }
    }

    fn log_entry_point(&self, ctx: &TransactionContext<'_>, outer_index: usize) {
        if self.entry_points.is_empty() {
            return;
        }
        let Ok(ix) = ctx.instructions().outer_at(outer_index) else {
            return;
        };
        match get_instruction_data(ix) {
            Ok(data) if data.len() >= 8 && self.entry_points.contains(array_ref![data, 0, 8]) => {
                debug!(protocol = %self.protocol, entry = %hex::encode(&data[..8]), "router entry point");
            }
            // unknown entry points are still scanned for nested swaps
            Ok(data) => debug!(
                protocol = %self.protocol,
                prefix = %hex::encode(&data[..data.len().min(8)]),
                "unrecognised router entry point"
            ),
            Err(err) => debug!(protocol = %self.protocol, error = %err, "router data undecodable"),
        }
    }
}

impl SwapDecoder for RouterDecoder {
    fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Each nested protocol runs once per router instruction. Fragments seen
    /// twice under the same (protocol, mint, amount) key are kept once; two
    /// genuinely distinct hops of identical size are merged too.
    fn decode(
        &self,
        ctx: &TransactionContext<'_>,
        outer_index: usize,
        diagnostics: &mut Diagnostics,
    ) -> Vec<SwapFragment> {
        self.log_entry_point(ctx, outer_index);

        let mut processed: Vec<Protocol> = Vec::new();
        let mut seen: HashSet<(Protocol, String, u64)> = HashSet::new();
        let mut fragments = Vec::new();

        for ix in ctx.instructions().inner(outer_index) {
            let program_id = match ctx.program_id(ix) {
                Ok(program_id) => program_id,
                Err(err) => {
                    diagnostics.record(self.protocol, err);
                    continue;
                }
            };
            let Some(entry) = ctx.registry().lookup(program_id) else {
                continue;
            };
            if !entry.protocol.is_nestable() || processed.contains(&entry.protocol) {
                continue;
            }
            processed.push(entry.protocol);

            for fragment in decoder_for(entry.protocol).decode(ctx, outer_index, diagnostics) {
                let key = (
                    fragment.protocol,
                    fragment.input.mint.clone(),
                    fragment.input.amount,
                );
                if seen.insert(key) {
                    fragments.push(fragment);
                }
            }
        }
        debug!(
            protocol = %self.protocol,
            nested = ?processed,
            fragments = fragments.len(),
            "router decoded"
        );
        fragments
    }
}
