use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::config::DecodeConfig;
use crate::core::constants::{NATIVE_SOL_DECIMALS, TOKENS};
use crate::core::error::DecodeError;
use crate::core::registry::ProtocolRegistry;
use crate::protocols::token_transfer::{parse_transfer, TokenTransfer, TransferKind};
use crate::types::{
    CompiledInstruction, SolanaTransaction, TokenBalance, TransactionMessage, TransactionMeta,
};

/// Static message keys, then loaded writable, then loaded readonly addresses.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountKeyTable {
    keys: Vec<String>,
}

impl AccountKeyTable {
    pub fn build(message: &TransactionMessage, meta: &TransactionMeta) -> Self {
        let loaded = &meta.loaded_addresses;
        let mut keys =
            Vec::with_capacity(message.account_keys.len() + loaded.writable.len() + loaded.readonly.len());
        keys.extend(message.account_keys.iter().cloned());
        keys.extend(loaded.writable.iter().cloned());
        keys.extend(loaded.readonly.iter().cloned());
        Self { keys }
    }

    pub fn from_keys(keys: Vec<String>) -> Self {
        Self { keys }
    }

    pub fn get(&self, index: usize) -> Result<&str, DecodeError> {
        self.keys
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| DecodeError::out_of_range("account key", index, self.keys.len()))
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Outer instructions plus the inner instructions each one triggered, in execution order.
#[derive(Clone, Debug, Default)]
pub struct InstructionTree<'a> {
    outer: &'a [CompiledInstruction],
    inner: Vec<Vec<&'a CompiledInstruction>>,
}

impl<'a> InstructionTree<'a> {
    pub fn build(message: &'a TransactionMessage, meta: &'a TransactionMeta) -> Result<Self, DecodeError> {
        let outer = message.instructions.as_slice();
        let mut inner: Vec<Vec<&'a CompiledInstruction>> = vec![Vec::new(); outer.len()];
        for group in meta.inner_instructions.iter().flatten() {
            let slot = inner.get_mut(group.index as usize).ok_or_else(|| {
                DecodeError::malformed(format!(
                    "inner instruction group for outer index {} but only {} outer instructions",
                    group.index,
                    outer.len()
                ))
            })?;
            slot.extend(group.instructions.iter());
        }
        Ok(Self { outer, inner })
    }

    pub fn outer(&self) -> &'a [CompiledInstruction] {
        self.outer
    }

    pub fn outer_at(&self, index: usize) -> Result<&'a CompiledInstruction, DecodeError> {
        self.outer
            .get(index)
            .ok_or_else(|| DecodeError::out_of_range("outer instruction", index, self.outer.len()))
    }

    /// Inner instructions of outer instruction `index`; empty when none ran.
    pub fn inner(&self, index: usize) -> &[&'a CompiledInstruction] {
        self.inner.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every instruction, each outer one followed by its inner group.
    pub fn iter_all(&self) -> impl Iterator<Item = &'a CompiledInstruction> + '_ {
        self.outer
            .iter()
            .enumerate()
            .flat_map(move |(index, ix)| std::iter::once(ix).chain(self.inner(index).iter().copied()))
    }
}

/// Where a token account's mint came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MintSource {
    Balance,
    TransferChecked,
    Linkage,
    /// Nothing identified the mint; assumed wrapped SOL.
    AssumedNative,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenAccount {
    pub mint: String,
    pub decimals: u8,
    pub owner: Option<String>,
    pub source: MintSource,
}

/// Read-only indexed view of one transaction.
pub struct TransactionContext<'a> {
    tx: &'a SolanaTransaction,
    message: &'a TransactionMessage,
    meta: &'a TransactionMeta,
    registry: &'a ProtocolRegistry,
    config: &'a DecodeConfig,
    account_keys: AccountKeyTable,
    instructions: InstructionTree<'a>,
    token_accounts: FxHashMap<String, TokenAccount>,
    mint_decimals: FxHashMap<String, u8>,
    assumed_native: Vec<String>,
}

impl<'a> TransactionContext<'a> {
    pub fn new(
        tx: &'a SolanaTransaction,
        registry: &'a ProtocolRegistry,
        config: &'a DecodeConfig,
    ) -> Result<Self, DecodeError> {
        let message = tx
            .message
            .as_ref()
            .ok_or_else(|| DecodeError::malformed("transaction message missing"))?;
        let meta = tx
            .meta
            .as_ref()
            .ok_or_else(|| DecodeError::malformed("transaction meta missing"))?;
        if let Some(err) = meta.err.as_ref().filter(|err| !err.is_null()) {
            return Err(DecodeError::malformed(format!(
                "transaction failed on chain: {err}"
            )));
        }

        let account_keys = AccountKeyTable::build(message, meta);
        let instructions = InstructionTree::build(message, meta)?;

        let mut context = Self {
            tx,
            message,
            meta,
            registry,
            config,
            account_keys,
            instructions,
            token_accounts: FxHashMap::default(),
            mint_decimals: FxHashMap::default(),
            assumed_native: Vec::new(),
        };
        context.index_token_accounts();
        Ok(context)
    }

    fn index_token_accounts(&mut self) {
        let meta = self.meta;
        self.mint_decimals
            .insert(TOKENS.SOL.to_string(), NATIVE_SOL_DECIMALS);

        for balance in meta.post_token_balances.iter().chain(&meta.pre_token_balances) {
            self.mint_decimals
                .entry(balance.mint.clone())
                .or_insert(balance.ui_token_amount.decimals);
            let account = match self.account_keys.get(balance.account_index as usize) {
                Ok(account) => account.to_string(),
                Err(err) => {
                    warn!("skipping token balance: {}", err);
                    continue;
                }
            };
            // post balances come first, so pre only fills gaps
            self.token_accounts.entry(account).or_insert_with(|| TokenAccount {
                mint: balance.mint.clone(),
                decimals: balance.ui_token_amount.decimals,
                owner: balance.owner.clone(),
                source: MintSource::Balance,
            });
        }

        let transfers: Vec<TokenTransfer> = self
            .instructions
            .iter_all()
            .filter_map(|ix| match parse_transfer(&self.account_keys, ix) {
                Ok(transfer) => transfer,
                Err(err) => {
                    debug!("ignoring undecodable token instruction: {}", err);
                    None
                }
            })
            .collect();

        for transfer in &transfers {
            if let (Some(mint), Some(decimals)) = (&transfer.mint, transfer.decimals) {
                self.mint_decimals.entry(mint.clone()).or_insert(decimals);
                for account in [&transfer.source, &transfer.destination] {
                    self.token_accounts
                        .entry(account.clone())
                        .or_insert_with(|| TokenAccount {
                            mint: mint.clone(),
                            decimals,
                            owner: None,
                            source: MintSource::TransferChecked,
                        });
                }
            }
        }

        self.propagate_transfer_linkage(&transfers);

        for transfer in &transfers {
            for account in [&transfer.source, &transfer.destination] {
                if self.token_accounts.contains_key(account) {
                    continue;
                }
                if self.config.assume_native_mint {
                    debug!(
                        account = %account,
                        "token account mint unresolved; assuming wrapped SOL"
                    );
                    self.assumed_native.push(account.clone());
                    self.token_accounts.insert(
                        account.clone(),
                        TokenAccount {
                            mint: TOKENS.SOL.to_string(),
                            decimals: NATIVE_SOL_DECIMALS,
                            owner: None,
                            source: MintSource::AssumedNative,
                        },
                    );
                } else {
                    debug!(account = %account, "token account mint unresolved");
                }
            }
        }
    }

    /// Both ends of a transfer share a mint; push known mints across until nothing changes.
    fn propagate_transfer_linkage(&mut self, transfers: &[TokenTransfer]) {
        let plain: Vec<&TokenTransfer> = transfers
            .iter()
            .filter(|t| t.kind == TransferKind::Transfer)
            .collect();
        for _ in 0..=plain.len() {
            let mut changed = false;
            for transfer in &plain {
                let known = self
                    .token_accounts
                    .get(&transfer.source)
                    .or_else(|| self.token_accounts.get(&transfer.destination))
                    .map(|account| (account.mint.clone(), account.decimals));
                let Some((mint, decimals)) = known else {
                    continue;
                };
                for account in [&transfer.source, &transfer.destination] {
                    if !self.token_accounts.contains_key(account) {
                        self.token_accounts.insert(
                            account.clone(),
                            TokenAccount {
                                mint: mint.clone(),
                                decimals,
                                owner: None,
                                source: MintSource::Linkage,
                            },
                        );
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
    }

    pub fn tx(&self) -> &'a SolanaTransaction {
        self.tx
    }

    pub fn meta(&self) -> &'a TransactionMeta {
        self.meta
    }

    pub fn registry(&self) -> &'a ProtocolRegistry {
        self.registry
    }

    pub fn config(&self) -> &'a DecodeConfig {
        self.config
    }

    pub fn account_keys(&self) -> &AccountKeyTable {
        &self.account_keys
    }

    pub fn instructions(&self) -> &InstructionTree<'a> {
        &self.instructions
    }

    pub fn program_id(&self, ix: &CompiledInstruction) -> Result<&str, DecodeError> {
        self.account_keys.get(ix.program_id_index as usize)
    }

    /// Address of the account at `position` in the instruction's account list.
    pub fn account(&self, ix: &CompiledInstruction, position: usize) -> Result<&str, DecodeError> {
        let index = ix
            .accounts
            .get(position)
            .ok_or_else(|| DecodeError::out_of_range("instruction account", position, ix.accounts.len()))?;
        self.account_keys.get(*index as usize)
    }

    pub fn token_account(&self, address: &str) -> Option<&TokenAccount> {
        self.token_accounts.get(address)
    }

    pub fn token_owner(&self, address: &str) -> Option<&str> {
        self.token_accounts
            .get(address)
            .and_then(|account| account.owner.as_deref())
    }

    /// Token accounts whose mint nothing identified, in the order they were assumed wrapped SOL.
    pub fn assumed_native_accounts(&self) -> &[String] {
        &self.assumed_native
    }

    pub fn mint_decimals(&self, mint: &str) -> Option<u8> {
        self.mint_decimals.get(mint).copied()
    }

    pub fn decimals_or_zero(&self, mint: &str) -> u8 {
        self.mint_decimals(mint).unwrap_or(0)
    }

    pub fn pre_token_balances(&self) -> &'a [TokenBalance] {
        &self.meta.pre_token_balances
    }

    pub fn post_token_balances(&self) -> &'a [TokenBalance] {
        &self.meta.post_token_balances
    }

    /// Fee payer; the account whose flows the fallback heuristics follow.
    pub fn primary_signer(&self) -> Result<&str, DecodeError> {
        self.account_keys.get(0)
    }

    /// Required signers in message order, or the relayed trader when a relay program is present.
    pub fn signers(&self) -> Vec<String> {
        if let Some(position) = self.registry.relay_signer_position(self.account_keys.iter()) {
            if let Ok(trader) = self.account_keys.get(position) {
                return vec![trader.to_string()];
            }
            warn!(position, "relay signer position outside account keys");
        }
        let required = self.message.header.num_required_signatures.max(1) as usize;
        self.account_keys
            .iter()
            .take(required)
            .map(str::to_string)
            .collect()
    }
}
