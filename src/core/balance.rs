use crate::core::constants::TOKENS;
use crate::core::error::DecodeError;
use crate::core::transaction_context::TransactionContext;
use crate::core::utils::parse_raw_amount;
use crate::types::TokenBalance;

/// Whose balance to measure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalanceHolder<'h> {
    /// Position in the account key table.
    AccountIndex(usize),
    /// Every token account owned by this address.
    Owner(&'h str),
}

impl BalanceHolder<'_> {
    fn describe(&self) -> String {
        match self {
            BalanceHolder::AccountIndex(index) => format!("account #{index}"),
            BalanceHolder::Owner(owner) => format!("owner {owner}"),
        }
    }
}

/// Net pre/post balance changes for one transaction.
pub struct BalanceDiffEngine<'c, 'a> {
    ctx: &'c TransactionContext<'a>,
}

impl<'c, 'a> BalanceDiffEngine<'c, 'a> {
    pub fn new(ctx: &'c TransactionContext<'a>) -> Self {
        Self { ctx }
    }

    /// `post - pre` for `mint` held by `holder`. The SOL mint measures lamports.
    pub fn net_change(&self, mint: &str, holder: BalanceHolder<'_>) -> Result<i128, DecodeError> {
        if mint == TOKENS.SOL {
            let index = match holder {
                BalanceHolder::AccountIndex(index) => index,
                BalanceHolder::Owner(owner) => {
                    self.ctx.account_keys().position(owner).ok_or_else(|| {
                        DecodeError::BalanceNotFound {
                            mint: mint.to_string(),
                            holder: holder.describe(),
                        }
                    })?
                }
            };
            return self.native_change(index);
        }
        self.token_change(mint, holder)
    }

    /// Lamport change of the account at `index`.
    pub fn native_change(&self, index: usize) -> Result<i128, DecodeError> {
        let meta = self.ctx.meta();
        let pre = meta.pre_balances.get(index).copied();
        let post = meta.post_balances.get(index).copied();
        if pre.is_none() && post.is_none() {
            return Err(DecodeError::BalanceNotFound {
                mint: TOKENS.SOL.to_string(),
                holder: BalanceHolder::AccountIndex(index).describe(),
            });
        }
        Ok(post.unwrap_or(0) as i128 - pre.unwrap_or(0) as i128)
    }

    /// SPL balance change; a side without an entry counts as zero, both sides missing is an error.
    pub fn token_change(&self, mint: &str, holder: BalanceHolder<'_>) -> Result<i128, DecodeError> {
        let pre = sum_matching(self.ctx.pre_token_balances(), mint, holder)?;
        let post = sum_matching(self.ctx.post_token_balances(), mint, holder)?;
        match (pre, post) {
            (None, None) => Err(DecodeError::BalanceNotFound {
                mint: mint.to_string(),
                holder: holder.describe(),
            }),
            (pre, post) => Ok(post.unwrap_or(0) - pre.unwrap_or(0)),
        }
    }
}

fn sum_matching(
    balances: &[TokenBalance],
    mint: &str,
    holder: BalanceHolder<'_>,
) -> Result<Option<i128>, DecodeError> {
    let mut total: Option<i128> = None;
    for balance in balances.iter().filter(|b| b.mint == mint) {
        let matches = match holder {
            BalanceHolder::AccountIndex(index) => balance.account_index as usize == index,
            BalanceHolder::Owner(owner) => balance.owner.as_deref() == Some(owner),
        };
        if matches {
            let amount = parse_raw_amount(&balance.ui_token_amount.amount)?;
            total = Some(total.unwrap_or(0) + amount);
        }
    }
    Ok(total)
}
