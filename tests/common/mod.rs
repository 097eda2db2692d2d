#![allow(dead_code)]

use std::fs;

use anyhow::{Context, Result};
use solana_swap_decoder::core::constants::{discriminators, spl_token_tags};
use solana_swap_decoder::types::{
    CompiledInstruction, InnerInstructions, MessageHeader, SolanaTransaction, TokenAmount,
    TokenBalance, TransactionMessage, TransactionMeta,
};

pub const TRADER: &str = "5Pk716N113awdSaUDZEPZVi9Zs6hJmG5KCJtp5qQK3LB";

pub fn load_fixture(name: &str) -> Result<SolanaTransaction> {
    let path = format!("tests/fixtures/{name}");
    let data = fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?;
    serde_json::from_str(&data).with_context(|| format!("failed to parse {path}"))
}

/// Deterministic address for synthetic mints and pools.
pub fn address(seed: u8) -> String {
    bs58::encode([seed; 32]).into_string()
}

fn key_bytes(address: &str) -> [u8; 32] {
    let bytes = bs58::decode(address).into_vec().expect("valid base58 address");
    bytes.try_into().expect("32-byte address")
}

pub fn spl_transfer(amount: u64) -> Vec<u8> {
    let mut data = vec![spl_token_tags::TRANSFER];
    data.extend_from_slice(&amount.to_le_bytes());
    data
}

pub fn spl_transfer_checked(amount: u64, decimals: u8) -> Vec<u8> {
    let mut data = spl_transfer(amount);
    data[0] = spl_token_tags::TRANSFER_CHECKED;
    data.push(decimals);
    data
}

pub fn route_event(input_mint: &str, input_amount: u64, output_mint: &str, output_amount: u64) -> Vec<u8> {
    let mut data = discriminators::jupiter_events::ROUTE.to_vec();
    data.extend_from_slice(&[9u8; 32]);
    data.extend_from_slice(&key_bytes(input_mint));
    data.extend_from_slice(&input_amount.to_le_bytes());
    data.extend_from_slice(&key_bytes(output_mint));
    data.extend_from_slice(&output_amount.to_le_bytes());
    data
}

pub fn trade_event(mint: &str, sol_amount: u64, token_amount: u64, is_buy: bool, timestamp: i64) -> Vec<u8> {
    let mut data = discriminators::pumpfun_events::TRADE.to_vec();
    data.extend_from_slice(&key_bytes(mint));
    data.extend_from_slice(&sol_amount.to_le_bytes());
    data.extend_from_slice(&token_amount.to_le_bytes());
    data.push(u8::from(is_buy));
    data.extend_from_slice(&key_bytes(TRADER));
    data.extend_from_slice(&timestamp.to_le_bytes());
    data.extend_from_slice(&0u64.to_le_bytes());
    data.extend_from_slice(&0u64.to_le_bytes());
    data
}

pub fn moonshot_trade(discriminator: [u8; 8], token_limit: u64, collateral_limit: u64) -> Vec<u8> {
    let mut data = discriminator.to_vec();
    data.extend_from_slice(&token_limit.to_le_bytes());
    data.extend_from_slice(&collateral_limit.to_le_bytes());
    data.push(0);
    data.extend_from_slice(&50u64.to_le_bytes());
    data
}

/// Assembles an RPC-shaped transaction; the first key is the fee payer.
pub struct TransactionBuilder {
    keys: Vec<String>,
    required_signatures: u8,
    outer: Vec<CompiledInstruction>,
    inner: Vec<InnerInstructions>,
    pre_token_balances: Vec<TokenBalance>,
    post_token_balances: Vec<TokenBalance>,
    lamports: Vec<(String, u64, u64)>,
    block_time: Option<i64>,
    err: Option<serde_json::Value>,
}

impl TransactionBuilder {
    pub fn new(signers: &[&str]) -> Self {
        let mut builder = Self {
            keys: Vec::new(),
            required_signatures: signers.len() as u8,
            outer: Vec::new(),
            inner: Vec::new(),
            pre_token_balances: Vec::new(),
            post_token_balances: Vec::new(),
            lamports: Vec::new(),
            block_time: None,
            err: None,
        };
        for signer in signers {
            builder.key(signer);
        }
        builder
    }

    fn key(&mut self, key: &str) -> u8 {
        match self.keys.iter().position(|k| k == key) {
            Some(index) => index as u8,
            None => {
                self.keys.push(key.to_string());
                (self.keys.len() - 1) as u8
            }
        }
    }

    fn compile(&mut self, program: &str, accounts: &[&str], data: &[u8]) -> CompiledInstruction {
        let accounts = accounts.iter().map(|account| self.key(account)).collect();
        CompiledInstruction {
            program_id_index: self.key(program),
            accounts,
            data: bs58::encode(data).into_string(),
            stack_height: None,
        }
    }

    pub fn instruction(&mut self, program: &str, accounts: &[&str], data: &[u8]) -> usize {
        let ix = self.compile(program, accounts, data);
        self.outer.push(ix);
        self.outer.len() - 1
    }

    pub fn inner_instruction(&mut self, outer: usize, program: &str, accounts: &[&str], data: &[u8]) -> &mut Self {
        let mut ix = self.compile(program, accounts, data);
        ix.stack_height = Some(2);
        match self.inner.iter_mut().find(|group| group.index as usize == outer) {
            Some(group) => group.instructions.push(ix),
            None => self.inner.push(InnerInstructions {
                index: outer as u8,
                instructions: vec![ix],
            }),
        }
        self
    }

    pub fn token_account(
        &mut self,
        account: &str,
        mint: &str,
        owner: &str,
        decimals: u8,
        pre: Option<u64>,
        post: Option<u64>,
    ) -> &mut Self {
        let account_index = self.key(account);
        let balance = |amount: u64| TokenBalance {
            account_index,
            mint: mint.to_string(),
            owner: Some(owner.to_string()),
            ui_token_amount: TokenAmount::new(amount.to_string(), decimals),
        };
        self.pre_token_balances.extend(pre.map(balance));
        self.post_token_balances.extend(post.map(balance));
        self
    }

    pub fn sol(&mut self, account: &str, pre: u64, post: u64) -> &mut Self {
        self.key(account);
        self.lamports.push((account.to_string(), pre, post));
        self
    }

    pub fn block_time(&mut self, block_time: i64) -> &mut Self {
        self.block_time = Some(block_time);
        self
    }

    pub fn failed(&mut self) -> &mut Self {
        self.err = Some(serde_json::json!({"InstructionError": [0, {"Custom": 6001}]}));
        self
    }

    pub fn build(&self) -> SolanaTransaction {
        let balances = |pick: fn(&(String, u64, u64)) -> u64| -> Vec<u64> {
            self.keys
                .iter()
                .map(|key| {
                    self.lamports
                        .iter()
                        .find(|entry| &entry.0 == key)
                        .map(pick)
                        .unwrap_or(1_000_000)
                })
                .collect()
        };
        SolanaTransaction {
            slot: 280_000_000,
            block_time: self.block_time,
            signatures: vec!["integration-signature".to_string()],
            message: Some(TransactionMessage {
                header: MessageHeader {
                    num_required_signatures: self.required_signatures,
                },
                account_keys: self.keys.clone(),
                instructions: self.outer.clone(),
            }),
            meta: Some(TransactionMeta {
                err: self.err.clone(),
                fee: 5_000,
                pre_balances: balances(|entry| entry.1),
                post_balances: balances(|entry| entry.2),
                inner_instructions: Some(self.inner.clone()),
                pre_token_balances: self.pre_token_balances.clone(),
                post_token_balances: self.post_token_balances.clone(),
                ..TransactionMeta::default()
            }),
        }
    }
}

#[cfg(feature = "rpc")]
pub fn fetch_transaction_with_fallback(rpc_url: &str, explicit_signature: Option<&str>) -> Result<SolanaTransaction> {
    use std::str::FromStr;

    use solana_client::rpc_client::RpcClient;
    use solana_sdk::pubkey::Pubkey;
    use solana_swap_decoder::core::constants::dex_programs;
    use solana_swap_decoder::rpc;

    if let Some(signature) = explicit_signature {
        return rpc::fetch_transaction(rpc_url, signature);
    }

    let client = RpcClient::new(rpc_url.to_string());
    let address = Pubkey::from_str(dex_programs::PUMP_FUN)?;
    let signature = client
        .get_signatures_for_address(&address)?
        .into_iter()
        .find(|status| status.err.is_none())
        .context("no successful signatures returned for the bonding-curve program")?;
    rpc::fetch_transaction(rpc_url, &signature.signature)
}
