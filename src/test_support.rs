//! Synthetic transaction builder shared by the unit tests.

use crate::core::constants::{discriminators, spl_token_tags};
use crate::types::{
    CompiledInstruction, InnerInstructions, MessageHeader, SolanaTransaction, TokenAmount,
    TokenBalance, TransactionMessage, TransactionMeta,
};

pub fn pubkey(seed: u8) -> String {
    bs58::encode([seed; 32]).into_string()
}

pub fn transfer_data(amount: u64) -> Vec<u8> {
    let mut data = vec![spl_token_tags::TRANSFER];
    data.extend_from_slice(&amount.to_le_bytes());
    data
}

pub fn transfer_checked_data(amount: u64, decimals: u8) -> Vec<u8> {
    let mut data = vec![spl_token_tags::TRANSFER_CHECKED];
    data.extend_from_slice(&amount.to_le_bytes());
    data.push(decimals);
    data
}

pub fn jupiter_route_event(
    input_mint: u8,
    input_amount: u64,
    output_mint: u8,
    output_amount: u64,
) -> Vec<u8> {
    let mut data = discriminators::jupiter_events::ROUTE.to_vec();
    data.extend_from_slice(&[200u8; 32]);
    data.extend_from_slice(&[input_mint; 32]);
    data.extend_from_slice(&input_amount.to_le_bytes());
    data.extend_from_slice(&[output_mint; 32]);
    data.extend_from_slice(&output_amount.to_le_bytes());
    data
}

pub fn pumpfun_trade_event(
    mint: u8,
    sol_amount: u64,
    token_amount: u64,
    is_buy: bool,
    timestamp: i64,
) -> Vec<u8> {
    let mut data = discriminators::pumpfun_events::TRADE.to_vec();
    data.extend_from_slice(&[mint; 32]);
    data.extend_from_slice(&sol_amount.to_le_bytes());
    data.extend_from_slice(&token_amount.to_le_bytes());
    data.push(is_buy as u8);
    data.extend_from_slice(&[7u8; 32]);
    data.extend_from_slice(&timestamp.to_le_bytes());
    data.extend_from_slice(&30_000_000_000u64.to_le_bytes());
    data.extend_from_slice(&1_073_000_000_000_000u64.to_le_bytes());
    data
}

#[derive(Default)]
pub struct TxBuilder {
    keys: Vec<String>,
    outer: Vec<CompiledInstruction>,
    inner: Vec<InnerInstructions>,
    pre_token_balances: Vec<TokenBalance>,
    post_token_balances: Vec<TokenBalance>,
    lamports: Vec<(String, u64, u64)>,
    block_time: Option<i64>,
}

impl TxBuilder {
    pub fn new(signer: &str) -> Self {
        let mut builder = Self::default();
        builder.key(signer);
        builder
    }

    pub fn key(&mut self, key: &str) -> u8 {
        if let Some(index) = self.keys.iter().position(|k| k == key) {
            return index as u8;
        }
        self.keys.push(key.to_string());
        (self.keys.len() - 1) as u8
    }

    fn compile(&mut self, program: &str, accounts: &[&str], data: &[u8]) -> CompiledInstruction {
        let accounts = accounts.iter().map(|a| self.key(a)).collect();
        CompiledInstruction {
            program_id_index: self.key(program),
            accounts,
            data: bs58::encode(data).into_string(),
            stack_height: None,
        }
    }

    pub fn outer(&mut self, program: &str, accounts: &[&str], data: &[u8]) -> usize {
        let ix = self.compile(program, accounts, data);
        self.outer.push(ix);
        self.outer.len() - 1
    }

    pub fn inner(&mut self, outer: usize, program: &str, accounts: &[&str], data: &[u8]) -> &mut Self {
        let ix = self.compile(program, accounts, data);
        match self.inner.iter_mut().find(|group| group.index as usize == outer) {
            Some(group) => group.instructions.push(ix),
            None => self.inner.push(InnerInstructions {
                index: outer as u8,
                instructions: vec![ix],
            }),
        }
        self
    }

    pub fn token_balance(
        &mut self,
        account: &str,
        mint: &str,
        owner: &str,
        pre: Option<u64>,
        post: Option<u64>,
        decimals: u8,
    ) -> &mut Self {
        let index = self.key(account);
        let entry = |amount: u64| TokenBalance {
            account_index: index,
            mint: mint.to_string(),
            owner: Some(owner.to_string()),
            ui_token_amount: TokenAmount::new(amount.to_string(), decimals),
        };
        if let Some(amount) = pre {
            self.pre_token_balances.push(entry(amount));
        }
        if let Some(amount) = post {
            self.post_token_balances.push(entry(amount));
        }
        self
    }

    pub fn lamports(&mut self, account: &str, pre: u64, post: u64) -> &mut Self {
        self.key(account);
        self.lamports.push((account.to_string(), pre, post));
        self
    }

    pub fn block_time(&mut self, block_time: i64) -> &mut Self {
        self.block_time = Some(block_time);
        self
    }

    pub fn build(&self) -> SolanaTransaction {
        let mut pre_balances = vec![0; self.keys.len()];
        let mut post_balances = vec![0; self.keys.len()];
        for (account, pre, post) in &self.lamports {
            if let Some(index) = self.keys.iter().position(|k| k == account) {
                pre_balances[index] = *pre;
                post_balances[index] = *post;
            }
        }
        SolanaTransaction {
            slot: 1,
            block_time: self.block_time,
            signatures: vec!["test-signature".to_string()],
            message: Some(TransactionMessage {
                header: MessageHeader {
                    num_required_signatures: 1,
                },
                account_keys: self.keys.clone(),
                instructions: self.outer.clone(),
            }),
            meta: Some(TransactionMeta {
                pre_balances,
                post_balances,
                inner_instructions: Some(self.inner.clone()),
                pre_token_balances: self.pre_token_balances.clone(),
                post_token_balances: self.post_token_balances.clone(),
                ..TransactionMeta::default()
            }),
        }
    }
}
