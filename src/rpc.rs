use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use solana_client::rpc_client::RpcClient;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::Signature;
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, UiCompiledInstruction,
    UiInnerInstructions, UiInstruction, UiLoadedAddresses, UiMessage, UiTransactionEncoding,
    UiTransactionStatusMeta, UiTransactionTokenBalance,
};
use tracing::debug;

use crate::types::{
    CompiledInstruction, InnerInstructions, LoadedAddresses, MessageHeader, SolanaTransaction,
    TokenAmount, TokenBalance, TransactionMessage, TransactionMeta,
};

/// Fetch a confirmed transaction and convert it into the decoder's input model.
pub fn fetch_transaction(rpc_url: &str, signature: &str) -> Result<SolanaTransaction> {
    let client = RpcClient::new(rpc_url.to_string());
    let signature = Signature::from_str(signature).context("invalid signature")?;
    let config = RpcTransactionConfig {
        // raw message: compiled indices with base58 data
        encoding: Some(UiTransactionEncoding::Json),
        commitment: Some(CommitmentConfig::confirmed()),
        max_supported_transaction_version: Some(0),
    };

    let encoded = client
        .get_transaction_with_config(&signature, config)
        .with_context(|| format!("failed to fetch transaction {signature}"))?;
    convert_transaction(encoded)
}

pub fn convert_transaction(tx: EncodedConfirmedTransactionWithStatusMeta) -> Result<SolanaTransaction> {
    let meta = tx
        .transaction
        .meta
        .as_ref()
        .context("transaction missing status meta")?;
    let (message, signatures) = extract_message(&tx.transaction.transaction)?;

    Ok(SolanaTransaction {
        slot: tx.slot,
        block_time: tx.block_time,
        signatures,
        message: Some(message),
        meta: Some(convert_meta(meta)),
    })
}

fn extract_message(encoded: &EncodedTransaction) -> Result<(TransactionMessage, Vec<String>)> {
    let ui_tx = match encoded {
        EncodedTransaction::Json(tx) => tx,
        _ => return Err(anyhow!("expected JSON encoded transaction")),
    };
    let raw = match &ui_tx.message {
        UiMessage::Raw(raw) => raw,
        UiMessage::Parsed(_) => {
            return Err(anyhow!("expected raw message; request `json` rather than `jsonParsed`"))
        }
    };
    let message = TransactionMessage {
        header: MessageHeader {
            num_required_signatures: raw.header.num_required_signatures,
        },
        account_keys: raw.account_keys.clone(),
        instructions: raw.instructions.iter().map(convert_compiled_instruction).collect(),
    };
    Ok((message, ui_tx.signatures.clone()))
}

fn convert_meta(meta: &UiTransactionStatusMeta) -> TransactionMeta {
    let loaded = Option::<&UiLoadedAddresses>::from(meta.loaded_addresses.as_ref())
        .map(|loaded| LoadedAddresses {
            writable: loaded.writable.clone(),
            readonly: loaded.readonly.clone(),
        })
        .unwrap_or_default();

    TransactionMeta {
        err: meta.err.as_ref().map(|err| Value::String(err.to_string())),
        fee: meta.fee,
        pre_balances: meta.pre_balances.clone(),
        post_balances: meta.post_balances.clone(),
        inner_instructions: convert_inner_instructions(meta.inner_instructions.as_ref().into()),
        pre_token_balances: convert_token_balances(meta.pre_token_balances.as_ref().into()),
        post_token_balances: convert_token_balances(meta.post_token_balances.as_ref().into()),
        loaded_addresses: loaded,
    }
}

fn convert_inner_instructions(sets: Option<&Vec<UiInnerInstructions>>) -> Option<Vec<InnerInstructions>> {
    sets.map(|inner_sets| {
        inner_sets
            .iter()
            .map(|set| InnerInstructions {
                index: set.index,
                instructions: set
                    .instructions
                    .iter()
                    .filter_map(|ix| match ix {
                        UiInstruction::Compiled(compiled) => Some(convert_compiled_instruction(compiled)),
                        UiInstruction::Parsed(_) => {
                            debug!(outer = set.index, "parsed inner instruction skipped");
                            None
                        }
                    })
                    .collect(),
            })
            .collect()
    })
}

fn convert_token_balances(balances: Option<&Vec<UiTransactionTokenBalance>>) -> Vec<TokenBalance> {
    balances
        .map(|items| {
            items
                .iter()
                .map(|balance| TokenBalance {
                    account_index: balance.account_index,
                    mint: balance.mint.clone(),
                    owner: balance.owner.clone().into(),
                    ui_token_amount: TokenAmount {
                        amount: balance.ui_token_amount.amount.clone(),
                        decimals: balance.ui_token_amount.decimals,
                        ui_amount: balance.ui_token_amount.ui_amount,
                    },
                })
                .collect()
        })
        .unwrap_or_default()
}

fn convert_compiled_instruction(instruction: &UiCompiledInstruction) -> CompiledInstruction {
    CompiledInstruction {
        program_id_index: instruction.program_id_index,
        accounts: instruction.accounts.clone(),
        data: instruction.data.clone(),
        stack_height: instruction.stack_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENCODED: &str = r#"{
        "slot": 250000000,
        "blockTime": 1710000000,
        "transaction": {
            "signatures": ["sig-one"],
            "message": {
                "header": {
                    "numRequiredSignatures": 1,
                    "numReadonlySignedAccounts": 0,
                    "numReadonlyUnsignedAccounts": 1
                },
                "accountKeys": ["payer", "ata", "program"],
                "recentBlockhash": "11111111111111111111111111111111",
                "instructions": [
                    {"programIdIndex": 2, "accounts": [0, 1], "data": "3Bxs", "stackHeight": null}
                ]
            }
        },
        "meta": {
            "err": null,
            "status": {"Ok": null},
            "fee": 5000,
            "preBalances": [10, 0, 1],
            "postBalances": [5, 0, 1],
            "innerInstructions": [
                {"index": 0, "instructions": [
                    {"programIdIndex": 2, "accounts": [1], "data": "3Bxs", "stackHeight": 2}
                ]}
            ],
            "logMessages": [],
            "preTokenBalances": [],
            "postTokenBalances": [{
                "accountIndex": 1,
                "mint": "mint",
                "uiTokenAmount": {"uiAmount": 1.0, "decimals": 6, "amount": "1000000", "uiAmountString": "1"},
                "owner": "payer",
                "programId": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"
            }],
            "rewards": [],
            "loadedAddresses": {"writable": ["lookup_w"], "readonly": []},
            "returnData": null,
            "computeUnitsConsumed": 1000
        }
    }"#;

    #[test]
    fn converts_raw_json_transaction() -> Result<()> {
        let encoded: EncodedConfirmedTransactionWithStatusMeta = serde_json::from_str(ENCODED)?;
        let tx = convert_transaction(encoded)?;

        assert_eq!(tx.block_time, Some(1_710_000_000));
        assert_eq!(tx.signatures, vec!["sig-one".to_string()]);
        let message = tx.message.context("message")?;
        assert_eq!(message.header.num_required_signatures, 1);
        assert_eq!(message.instructions[0].accounts, vec![0, 1]);

        let meta = tx.meta.context("meta")?;
        assert!(meta.err.is_none());
        assert_eq!(meta.loaded_addresses.writable, vec!["lookup_w".to_string()]);
        let inner = meta.inner_instructions.context("inner instructions")?;
        assert_eq!(inner[0].instructions[0].stack_height, Some(2));
        assert_eq!(meta.post_token_balances[0].owner.as_deref(), Some("payer"));
        assert_eq!(meta.post_token_balances[0].ui_token_amount.amount, "1000000");
        Ok(())
    }
}
