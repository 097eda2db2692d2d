//! Decodes fetched Solana transactions into one protocol-agnostic swap summary.
//!
//! [`SwapParser`] builds a [`TransactionContext`](core::transaction_context::TransactionContext),
//! dispatches outer instructions to protocol decoders and normalizes the
//! resulting fragments into a [`SwapSummary`].

pub mod config;
pub mod core;
pub mod protocols;
#[cfg(feature = "rpc")]
pub mod rpc;
pub mod types;

#[cfg(test)]
mod test_support;

pub use crate::config::DecodeConfig;
pub use crate::core::dispatcher::{DispatchOutcome, DispatchState};
pub use crate::core::error::{DecodeError, Diagnostics};
pub use crate::core::registry::{default_registry, ProtocolRegistry, Stage};
pub use crate::core::swap_parser::SwapParser;
pub use crate::types::{
    CompiledInstruction, FragmentKind, InnerInstructions, Protocol, SolanaTransaction,
    SwapFragment, SwapSummary, TokenBalance, TokenLeg, TransactionMessage, TransactionMeta,
};
