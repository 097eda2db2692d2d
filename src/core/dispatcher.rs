use std::time::Instant;

use tracing::{debug, info};

use crate::core::constants::TOKENS;
use crate::core::error::{DecodeError, Diagnostics};
use crate::core::registry::Stage;
use crate::core::transaction_context::TransactionContext;
use crate::protocols::{decoder_for, GenericDecoder, SwapDecoder};
use crate::types::{Protocol, SwapFragment};

/// Dispatch progress. Every run ends in `Done`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchState {
    NotStarted,
    ScanningPriorityProtocols,
    PriorityFound,
    ScanningDirectProtocols,
    DirectFound,
    GenericFallback,
    Done,
}

#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// Fragments in discovery order; `sequence_index` matches the position.
    pub fragments: Vec<SwapFragment>,
    /// Last state before `Done`: which stage produced the fragments.
    pub resolved: DispatchState,
    pub trace: Vec<DispatchState>,
    pub diagnostics: Diagnostics,
}

/// Routes outer instructions to decoders: priority programs first, then
/// direct DEX programs, then the generic heuristic.
pub struct Dispatcher<'c, 'a> {
    ctx: &'c TransactionContext<'a>,
    fragments: Vec<SwapFragment>,
    diagnostics: Diagnostics,
}

impl<'c, 'a> Dispatcher<'c, 'a> {
    pub fn new(ctx: &'c TransactionContext<'a>) -> Self {
        let mut diagnostics = Diagnostics::default();
        for account in ctx.assumed_native_accounts() {
            diagnostics.record(
                Protocol::Generic,
                DecodeError::BalanceNotFound {
                    mint: TOKENS.SOL.to_string(),
                    holder: format!("token account {account} (mint assumed)"),
                },
            );
        }
        Self {
            ctx,
            fragments: Vec::new(),
            diagnostics,
        }
    }

    /// Runs every stage to `Done`. A structural error raised by any decoder
    /// aborts the run; recoverable ones end up in the outcome's diagnostics.
    pub fn run(mut self) -> Result<DispatchOutcome, DecodeError> {
        let started = Instant::now();
        let mut state = DispatchState::NotStarted;
        let mut trace = vec![state];
        let mut resolved = state;

        while state != DispatchState::Done {
            let next = self.step(state)?;
            debug!(from = ?state, to = ?next, "dispatch transition");
            if next == DispatchState::Done {
                resolved = state;
            }
            state = next;
            trace.push(state);
        }

        info!(
            resolved = ?resolved,
            fragments = self.fragments.len(),
            diagnostics = self.diagnostics.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "dispatch finished"
        );
        Ok(DispatchOutcome {
            fragments: self.fragments,
            resolved,
            trace,
            diagnostics: self.diagnostics,
        })
    }

    fn step(&mut self, state: DispatchState) -> Result<DispatchState, DecodeError> {
        let next = match state {
            DispatchState::NotStarted => DispatchState::ScanningPriorityProtocols,
            DispatchState::ScanningPriorityProtocols => {
                self.scan_stage(Stage::Priority)?;
                if self.fragments.is_empty() {
                    DispatchState::ScanningDirectProtocols
                } else {
                    DispatchState::PriorityFound
                }
            }
            DispatchState::ScanningDirectProtocols => {
                self.scan_stage(Stage::Direct)?;
                if self.fragments.is_empty() {
                    DispatchState::GenericFallback
                } else {
                    DispatchState::DirectFound
                }
            }
            DispatchState::GenericFallback => {
                if self.ctx.config().generic_fallback {
                    self.scan_generic()?;
                } else {
                    debug!("generic fallback disabled");
                }
                DispatchState::Done
            }
            DispatchState::PriorityFound | DispatchState::DirectFound | DispatchState::Done => {
                DispatchState::Done
            }
        };
        Ok(next)
    }

    /// Visits each outer instruction once, decoding those whose program belongs to `stage`.
    fn scan_stage(&mut self, stage: Stage) -> Result<(), DecodeError> {
        let ctx = self.ctx;
        for (index, ix) in ctx.instructions().outer().iter().enumerate() {
            let program_id = match ctx.program_id(ix) {
                Ok(program_id) => program_id,
                Err(err) => {
                    if stage == Stage::Priority {
                        self.diagnostics.record(Protocol::Generic, err);
                    }
                    continue;
                }
            };
            if ctx.config().is_ignored(program_id) {
                continue;
            }
            let Some(entry) = ctx.registry().lookup(program_id) else {
                continue;
            };
            if entry.stage != stage {
                continue;
            }
            let decoder = decoder_for(entry.protocol);
            self.collect(decoder, index)?;
        }
        Ok(())
    }

    fn scan_generic(&mut self) -> Result<(), DecodeError> {
        let ctx = self.ctx;
        for (index, ix) in ctx.instructions().outer().iter().enumerate() {
            let ignored = ctx
                .program_id(ix)
                .map(|program_id| ctx.config().is_ignored(program_id))
                .unwrap_or(false);
            if !ignored {
                self.collect(&GenericDecoder, index)?;
            }
        }
        Ok(())
    }

    fn collect(&mut self, decoder: &dyn SwapDecoder, index: usize) -> Result<(), DecodeError> {
        let decoded = decoder.decode(self.ctx, index, &mut self.diagnostics);
        if let Some(err) = self.diagnostics.take_fatal() {
            return Err(err);
        }
        debug!(
            protocol = %decoder.protocol(),
            outer_index = index,
            fragments = decoded.len(),
            "decoder finished"
        );
        for mut fragment in decoded {
            fragment.sequence_index = self.fragments.len();
            self.fragments.push(fragment);
        }
        Ok(())
    }
}
