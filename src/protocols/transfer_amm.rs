use tracing::debug;

use crate::core::error::Diagnostics;
use crate::core::transaction_context::TransactionContext;
use crate::protocols::token_transfer::{parse_transfer, TokenTransfer};
use crate::protocols::SwapDecoder;
use crate::types::{Protocol, SwapFragment, TokenLeg};

/// Pools that emit no swap event; every inner SPL transfer is one fragment.
pub struct TransferAmmDecoder {
    protocol: Protocol,
}

impl TransferAmmDecoder {
    pub const fn new(protocol: Protocol) -> Self {
        Self { protocol }
    }

    /// Mint and decimals of a transfer: named by `TransferChecked`, else looked up by account.
    pub(crate) fn resolve_leg(ctx: &TransactionContext<'_>, transfer: &TokenTransfer) -> Option<TokenLeg> {
        if let (Some(mint), Some(decimals)) = (&transfer.mint, transfer.decimals) {
            return Some(TokenLeg::new(mint.as_str(), transfer.amount, decimals));
        }
        let account = ctx
            .token_account(&transfer.destination)
            .or_else(|| ctx.token_account(&transfer.source))?;
        Some(TokenLeg::new(
            account.mint.as_str(),
            transfer.amount,
            account.decimals,
        ))
    }
}

impl SwapDecoder for TransferAmmDecoder {
    fn protocol(&self) -> Protocol {
        self.protocol
    }

    fn decode(
        &self,
        ctx: &TransactionContext<'_>,
        outer_index: usize,
        diagnostics: &mut Diagnostics,
    ) -> Vec<SwapFragment> {
        let mut fragments = Vec::new();
        for ix in ctx.instructions().inner(outer_index) {
            let transfer = match parse_transfer(ctx.account_keys(), ix) {
                Ok(Some(transfer)) => transfer,
                Ok(None) => continue,
                Err(err) => {
                    diagnostics.record(self.protocol, err);
                    continue;
                }
            };
            match Self::resolve_leg(ctx, &transfer) {
                Some(leg) => fragments.push(SwapFragment::transfer(self.protocol, leg)),
                None => debug!(
                    protocol = %self.protocol,
                    destination = %transfer.destination,
                    "transfer with unresolved mint skipped"
                ),
            }
        }
        fragments
    }
}
