pub mod binary_reader;
pub mod generic;
pub mod jupiter;
pub mod moonshot;
pub mod pumpfun;
pub mod router;
pub mod token_transfer;
pub mod transfer_amm;

use crate::core::error::Diagnostics;
use crate::core::transaction_context::TransactionContext;
use crate::types::{Protocol, SwapFragment};

pub use generic::GenericDecoder;
pub use jupiter::JupiterDecoder;
pub use moonshot::MoonshotDecoder;
pub use pumpfun::PumpfunDecoder;
pub use router::RouterDecoder;
pub use transfer_amm::TransferAmmDecoder;

/// Turns the evidence of one outer instruction into swap fragments.
///
/// Anything a decoder cannot interpret is pushed into `diagnostics` and
/// yields no fragment. Structural errors pushed there end the dispatch.
pub trait SwapDecoder: Send + Sync {
    fn protocol(&self) -> Protocol;

    fn decode(
        &self,
        ctx: &TransactionContext<'_>,
        outer_index: usize,
        diagnostics: &mut Diagnostics,
    ) -> Vec<SwapFragment>;
}

static RAYDIUM: TransferAmmDecoder = TransferAmmDecoder::new(Protocol::Raydium);
static RAYDIUM_LAUNCHPAD: TransferAmmDecoder = TransferAmmDecoder::new(Protocol::RaydiumLaunchpad);
static ORCA: TransferAmmDecoder = TransferAmmDecoder::new(Protocol::Orca);
static METEORA: TransferAmmDecoder = TransferAmmDecoder::new(Protocol::Meteora);
static PUMP_SWAP: TransferAmmDecoder = TransferAmmDecoder::new(Protocol::PumpSwap);
static OKX: RouterDecoder = RouterDecoder::okx();
static TRADING_BOT: RouterDecoder = RouterDecoder::trading_bot();

/// Decoder for a protocol tag.
pub fn decoder_for(protocol: Protocol) -> &'static dyn SwapDecoder {
    match protocol {
        Protocol::Jupiter => &JupiterDecoder,
        Protocol::PumpFun => &PumpfunDecoder,
        Protocol::Moonshot => &MoonshotDecoder,
        Protocol::Raydium => &RAYDIUM,
        Protocol::RaydiumLaunchpad => &RAYDIUM_LAUNCHPAD,
        Protocol::Orca => &ORCA,
        Protocol::Meteora => &METEORA,
        Protocol::PumpSwap => &PUMP_SWAP,
        Protocol::Okx => &OKX,
        Protocol::TradingBot => &TRADING_BOT,
        Protocol::Generic => &GenericDecoder,
    }
}
