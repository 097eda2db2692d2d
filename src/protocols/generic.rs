use tracing::debug;

use crate::core::error::Diagnostics;
use crate::core::transaction_context::TransactionContext;
use crate::protocols::token_transfer::{parse_transfer, TokenTransfer};
use crate::protocols::transfer_amm::TransferAmmDecoder;
use crate::protocols::SwapDecoder;
use crate::types::{FragmentKind, Protocol, SwapFragment, TokenLeg};

/// Fallback for unknown programs: pairs the signer's first outgoing transfer
/// with the first incoming transfer of a different mint.
pub struct GenericDecoder;

struct SignerTransfer {
    leg: TokenLeg,
    outgoing: bool,
    incoming: bool,
}

impl GenericDecoder {
    /// Owner of the source account; the transfer authority stands in when no balance names one.
    fn source_owner<'c>(ctx: &'c TransactionContext<'_>, transfer: &'c TokenTransfer) -> &'c str {
        ctx.token_owner(&transfer.source)
            .unwrap_or(transfer.authority.as_str())
    }
}

impl SwapDecoder for GenericDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::Generic
    }

    fn decode(
        &self,
        ctx: &TransactionContext<'_>,
        outer_index: usize,
        diagnostics: &mut Diagnostics,
    ) -> Vec<SwapFragment> {
        let signer = match ctx.primary_signer() {
            Ok(signer) => signer,
            Err(err) => {
                diagnostics.record(Protocol::Generic, err);
                return Vec::new();
            }
        };

        let mut transfers = Vec::new();
        for ix in ctx.instructions().inner(outer_index) {
            let transfer = match parse_transfer(ctx.account_keys(), ix) {
                Ok(Some(transfer)) if transfer.amount > 0 => transfer,
                Ok(_) => continue,
                Err(err) => {
                    diagnostics.record(Protocol::Generic, err);
                    continue;
                }
            };
            let Some(leg) = TransferAmmDecoder::resolve_leg(ctx, &transfer) else {
                continue;
            };
            let outgoing = Self::source_owner(ctx, &transfer) == signer;
            let incoming = ctx.token_owner(&transfer.destination) == Some(signer);
            if outgoing || incoming {
                transfers.push(SignerTransfer {
                    leg,
                    outgoing,
                    incoming,
                });
            }
        }

        if transfers.len() < 2 {
            return Vec::new();
        }
        let Some(out_leg) = transfers.iter().find(|t| t.outgoing).map(|t| &t.leg) else {
            return Vec::new();
        };
        let Some(in_leg) = transfers
            .iter()
            .find(|t| t.incoming && t.leg.mint != out_leg.mint)
            .map(|t| &t.leg)
        else {
            return Vec::new();
        };

        debug!(
            outer_index,
            mint_in = %out_leg.mint,
            mint_out = %in_leg.mint,
            "generic transfer pairing"
        );
        let input = TokenLeg::new(
            out_leg.mint.as_str(),
            out_leg.amount,
            ctx.mint_decimals(&out_leg.mint).unwrap_or(out_leg.decimals),
        );
        let output = TokenLeg::new(
            in_leg.mint.as_str(),
            in_leg.amount,
            ctx.mint_decimals(&in_leg.mint).unwrap_or(in_leg.decimals),
        );
        vec![SwapFragment::paired(
            Protocol::Generic,
            FragmentKind::Generic,
            input,
            output,
        )]
    }
}
