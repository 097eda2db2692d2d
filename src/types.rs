use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw token amount as reported by the node.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
    pub amount: String,
    pub decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_amount: Option<f64>,
}

impl TokenAmount {
    pub fn new(amount: impl Into<String>, decimals: u8) -> Self {
        Self {
            amount: amount.into(),
            decimals,
            ui_amount: None,
        }
    }
}

/// Snapshot of a token account balance from transaction meta.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub account_index: u8,
    pub mint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub ui_token_amount: TokenAmount,
}

/// Instruction as compiled into the message: indices into the account key table.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    /// Base58-encoded instruction data.
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_height: Option<u32>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InnerInstructions {
    /// Index of the outer instruction that triggered this group.
    pub index: u8,
    pub instructions: Vec<CompiledInstruction>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoadedAddresses {
    #[serde(default)]
    pub writable: Vec<String>,
    #[serde(default)]
    pub readonly: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageHeader {
    pub num_required_signatures: u8,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMessage {
    pub header: MessageHeader,
    pub account_keys: Vec<String>,
    pub instructions: Vec<CompiledInstruction>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    /// Present when the transaction failed on chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<serde_json::Value>,
    #[serde(default)]
    pub fee: u64,
    #[serde(default)]
    pub pre_balances: Vec<u64>,
    #[serde(default)]
    pub post_balances: Vec<u64>,
    #[serde(default)]
    pub inner_instructions: Option<Vec<InnerInstructions>>,
    #[serde(default)]
    pub pre_token_balances: Vec<TokenBalance>,
    #[serde(default)]
    pub post_token_balances: Vec<TokenBalance>,
    #[serde(default)]
    pub loaded_addresses: LoadedAddresses,
}

/// Fully materialized transaction handed over by a transaction source.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SolanaTransaction {
    #[serde(default)]
    pub slot: u64,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub signatures: Vec<String>,
    pub message: Option<TransactionMessage>,
    pub meta: Option<TransactionMeta>,
}

/// Supported protocol families.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Protocol {
    Jupiter,
    PumpFun,
    Moonshot,
    Raydium,
    RaydiumLaunchpad,
    Orca,
    Meteora,
    PumpSwap,
    #[serde(rename = "OKX")]
    Okx,
    TradingBot,
    Generic,
}

impl Protocol {
    pub fn name(self) -> &'static str {
        match self {
            Protocol::Jupiter => "Jupiter",
            Protocol::PumpFun => "PumpFun",
            Protocol::Moonshot => "Moonshot",
            Protocol::Raydium => "Raydium",
            Protocol::RaydiumLaunchpad => "RaydiumLaunchpad",
            Protocol::Orca => "Orca",
            Protocol::Meteora => "Meteora",
            Protocol::PumpSwap => "PumpSwap",
            Protocol::Okx => "OKX",
            Protocol::TradingBot => "TradingBot",
            Protocol::Generic => "Generic",
        }
    }

    /// Families a router may invoke on its own inner instructions.
    pub fn is_nestable(self) -> bool {
        matches!(
            self,
            Protocol::Raydium
                | Protocol::RaydiumLaunchpad
                | Protocol::Orca
                | Protocol::Meteora
                | Protocol::PumpSwap
                | Protocol::PumpFun
        )
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenLeg {
    pub mint: String,
    pub amount: u64,
    pub decimals: u8,
}

impl TokenLeg {
    pub fn new(mint: impl Into<String>, amount: u64, decimals: u8) -> Self {
        Self {
            mint: mint.into(),
            amount,
            decimals,
        }
    }
}

/// How a fragment was observed.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FragmentKind {
    /// Structured event carrying both sides of a hop.
    Event,
    /// Direct instruction measured through balance diffs.
    Instruction,
    /// One SPL token movement; input and output hold the same leg.
    Transfer,
    /// Outgoing/incoming pairing made by the generic fallback.
    Generic,
}

impl FragmentKind {
    pub fn is_paired(self) -> bool {
        !matches!(self, FragmentKind::Transfer)
    }
}

/// One observed token movement attributable to one hop of a route.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SwapFragment {
    pub protocol: Protocol,
    pub kind: FragmentKind,
    pub input: TokenLeg,
    pub output: TokenLeg,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Discovery order within one decode; assigned by the dispatcher.
    pub sequence_index: usize,
}

impl SwapFragment {
    pub fn paired(protocol: Protocol, kind: FragmentKind, input: TokenLeg, output: TokenLeg) -> Self {
        Self {
            protocol,
            kind,
            input,
            output,
            timestamp: None,
            sequence_index: 0,
        }
    }

    pub fn transfer(protocol: Protocol, leg: TokenLeg) -> Self {
        Self {
            protocol,
            kind: FragmentKind::Transfer,
            input: leg.clone(),
            output: leg,
            timestamp: None,
            sequence_index: 0,
        }
    }

    pub fn with_timestamp(mut self, timestamp: Option<i64>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Canonical in/out description of one transaction's swap.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SwapSummary {
    pub signers: Vec<String>,
    pub signatures: Vec<String>,
    pub amms: Vec<Protocol>,
    pub token_in: TokenLeg,
    pub token_out: TokenLeg,
    pub timestamp: Option<i64>,
}
