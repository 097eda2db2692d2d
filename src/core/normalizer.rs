use std::collections::{BTreeMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::core::error::DecodeError;
use crate::core::transaction_context::TransactionContext;
use crate::types::{FragmentKind, Protocol, SwapFragment, SwapSummary, TokenLeg};

/// How a fragment set is reduced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Strategy {
    /// One fragment carrying both legs.
    Single,
    /// Several events of one protocol, netted by mint.
    Route,
    /// Mixed direct-DEX or transfer fragments.
    Heterogeneous,
}

/// Mint bucket: accumulated raw amount and the first decimals seen.
type Buckets = BTreeMap<String, (u128, u8)>;

pub struct SwapNormalizer<'c, 'a> {
    ctx: &'c TransactionContext<'a>,
}

impl<'c, 'a> SwapNormalizer<'c, 'a> {
    pub fn new(ctx: &'c TransactionContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn normalize(&self, fragments: &[SwapFragment]) -> Result<SwapSummary, DecodeError> {
        if fragments.is_empty() {
            return Err(DecodeError::NoSwapDetected);
        }

        let events: Vec<&SwapFragment> = match fragments.iter().find(|f| f.kind == FragmentKind::Event) {
            Some(first) => fragments
                .iter()
                .filter(|f| f.kind == FragmentKind::Event && f.protocol == first.protocol)
                .collect(),
            None => Vec::new(),
        };
        let selected: Vec<&SwapFragment> = if events.is_empty() {
            fragments.iter().collect()
        } else {
            events
        };
        let strategy = match selected.as_slice() {
            [only] if only.kind.is_paired() => Strategy::Single,
            _ if selected[0].kind == FragmentKind::Event => Strategy::Route,
            _ => Strategy::Heterogeneous,
        };
        debug!(?strategy, fragments = fragments.len(), selected = selected.len(), "normalizing");

        let (token_in, token_out) = match strategy {
            Strategy::Single => (selected[0].input.clone(), selected[0].output.clone()),
            Strategy::Route => net_route(&selected)?,
            Strategy::Heterogeneous => first_to_last(&selected)?,
        };

        Ok(SwapSummary {
            signers: self.ctx.signers(),
            signatures: self.ctx.tx().signatures.clone(),
            amms: distinct_protocols(fragments),
            token_in,
            token_out,
            timestamp: self.timestamp(&selected),
        })
    }

    fn timestamp(&self, selected: &[&SwapFragment]) -> Option<i64> {
        selected
            .iter()
            .find_map(|f| f.timestamp)
            .or(self.ctx.tx().block_time)
            .or_else(|| {
                if !self.ctx.config().clock_fallback {
                    return None;
                }
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .ok()
                    .and_then(|elapsed| i64::try_from(elapsed.as_secs()).ok())
            })
    }
}

fn distinct_protocols(fragments: &[SwapFragment]) -> Vec<Protocol> {
    let mut amms = Vec::new();
    for fragment in fragments {
        if !amms.contains(&fragment.protocol) {
            amms.push(fragment.protocol);
        }
    }
    amms
}

fn add(buckets: &mut Buckets, leg: &TokenLeg) {
    let entry = buckets.entry(leg.mint.clone()).or_insert((0, leg.decimals));
    entry.0 += u128::from(leg.amount);
}

fn to_leg(mint: String, amount: u128, decimals: u8) -> Result<TokenLeg, DecodeError> {
    let amount = u64::try_from(amount)
        .map_err(|_| DecodeError::malformed(format!("accumulated amount of {mint} exceeds u64")))?;
    Ok(TokenLeg::new(mint, amount, decimals))
}

/// Sums every hop per mint and cancels intermediates whose totals match on both sides.
fn net_route(events: &[&SwapFragment]) -> Result<(TokenLeg, TokenLeg), DecodeError> {
    let mut inputs = Buckets::new();
    let mut outputs = Buckets::new();
    for event in events {
        add(&mut inputs, &event.input);
        add(&mut outputs, &event.output);
    }

    let pass_through: Vec<String> = inputs
        .iter()
        .filter(|(mint, (amount, _))| outputs.get(*mint).is_some_and(|(out, _)| out == amount))
        .map(|(mint, _)| mint.clone())
        .collect();
    for mint in &pass_through {
        inputs.remove(mint);
        outputs.remove(mint);
    }
    debug!(hops = events.len(), netted = ?pass_through, "route netted");

    if inputs.len() != 1 || outputs.len() != 1 {
        return Err(DecodeError::AmbiguousRoute {
            inputs: inputs.len(),
            outputs: outputs.len(),
        });
    }
    let mut inputs = inputs.into_iter();
    let mut outputs = outputs.into_iter();
    match (inputs.next(), outputs.next()) {
        (Some((in_mint, (in_amount, in_decimals))), Some((out_mint, (out_amount, out_decimals)))) => Ok((
            to_leg(in_mint, in_amount, in_decimals)?,
            to_leg(out_mint, out_amount, out_decimals)?,
        )),
        _ => Err(DecodeError::AmbiguousRoute { inputs: 0, outputs: 0 }),
    }
}

/// First distinct mint in, last distinct mint out. Identical (amount, mint)
/// observations count once per side.
fn first_to_last(fragments: &[&SwapFragment]) -> Result<(TokenLeg, TokenLeg), DecodeError> {
    let mut mints: Vec<&str> = Vec::new();
    for fragment in fragments {
        for leg in [&fragment.input, &fragment.output] {
            if !mints.contains(&leg.mint.as_str()) {
                mints.push(leg.mint.as_str());
            }
        }
    }
    let (Some(&in_mint), Some(&out_mint)) = (mints.first(), mints.last()) else {
        return Err(DecodeError::NoSwapDetected);
    };
    if mints.len() < 2 {
        return Err(DecodeError::NoSwapDetected);
    }

    let token_in = sum_side(fragments.iter().map(|f| &f.input), in_mint)?;
    let token_out = sum_side(fragments.iter().map(|f| &f.output), out_mint)?;
    Ok((token_in, token_out))
}

fn sum_side<'f>(legs: impl Iterator<Item = &'f TokenLeg>, mint: &str) -> Result<TokenLeg, DecodeError> {
    let mut seen: HashSet<u64> = HashSet::new();
    let mut total: u128 = 0;
    let mut decimals = None;
    for leg in legs.filter(|leg| leg.mint == mint) {
        decimals.get_or_insert(leg.decimals);
        if seen.insert(leg.amount) {
            total += u128::from(leg.amount);
        }
    }
    to_leg(mint.to_string(), total, decimals.unwrap_or(0))
}
