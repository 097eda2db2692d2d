use tracing::{debug, info};

use crate::config::DecodeConfig;
use crate::core::dispatcher::{DispatchOutcome, Dispatcher};
use crate::core::error::DecodeError;
use crate::core::normalizer::SwapNormalizer;
use crate::core::registry::{default_registry, ProtocolRegistry};
use crate::core::transaction_context::TransactionContext;
use crate::types::{SolanaTransaction, SwapSummary};

/// Entry point: turns one fetched transaction into a [`SwapSummary`].
///
/// The parser holds no per-transaction state, so one instance can be shared
/// across threads and reused for any number of decodes.
#[derive(Clone, Copy, Debug)]
pub struct SwapParser<'r> {
    registry: &'r ProtocolRegistry,
}

impl Default for SwapParser<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl SwapParser<'static> {
    pub fn new() -> Self {
        Self {
            registry: default_registry(),
        }
    }
}

impl<'r> SwapParser<'r> {
    pub fn with_registry(registry: &'r ProtocolRegistry) -> Self {
        Self { registry }
    }

    pub fn parse_swap(
        &self,
        tx: &SolanaTransaction,
        config: Option<&DecodeConfig>,
    ) -> Result<SwapSummary, DecodeError> {
        let default_config = DecodeConfig::default();
        let config = config.unwrap_or(&default_config);
        config.validate()?;

        let ctx = TransactionContext::new(tx, self.registry, config)?;
        let outcome = Dispatcher::new(&ctx).run()?;
        if !outcome.diagnostics.is_empty() {
            debug!(
                signature = tx.signatures.first().map(String::as_str).unwrap_or_default(),
                recovered = outcome.diagnostics.len(),
                "decode finished with recovered errors"
            );
        }
        let summary = SwapNormalizer::new(&ctx).normalize(&outcome.fragments)?;
        info!(
            signature = summary.signatures.first().map(String::as_str).unwrap_or_default(),
            amms = ?summary.amms,
            token_in = %summary.token_in.mint,
            token_out = %summary.token_out.mint,
            "swap decoded"
        );
        Ok(summary)
    }

    /// Runs the dispatcher only, exposing raw fragments and recovered errors.
    pub fn dispatch(
        &self,
        tx: &SolanaTransaction,
        config: Option<&DecodeConfig>,
    ) -> Result<DispatchOutcome, DecodeError> {
        let default_config = DecodeConfig::default();
        let config = config.unwrap_or(&default_config);
        config.validate()?;

        let ctx = TransactionContext::new(tx, self.registry, config)?;
        Dispatcher::new(&ctx).run()
    }
}
