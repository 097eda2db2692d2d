use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::core::constants::{bot_programs, dex_programs};
use crate::types::Protocol;

/// Dispatch stage a program is scanned in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Aggregators and routers; their inner instructions cover every hop.
    Priority,
    /// Individual DEX programs, each contributing its own hop.
    Direct,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramEntry {
    pub protocol: Protocol,
    pub stage: Stage,
}

/// Program that signs on behalf of a trader whose key sits at a fixed position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayProgram {
    pub program_id: String,
    pub signer_position: usize,
}

/// Program address to protocol table. Built once and only read afterwards.
#[derive(Clone, Debug)]
pub struct ProtocolRegistry {
    programs: FxHashMap<String, ProgramEntry>,
    relays: Vec<RelayProgram>,
}

static DEFAULT_REGISTRY: Lazy<ProtocolRegistry> = Lazy::new(ProtocolRegistry::default);

pub fn default_registry() -> &'static ProtocolRegistry {
    &DEFAULT_REGISTRY
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();

        registry.register(dex_programs::JUPITER, Protocol::Jupiter, Stage::Priority);
        registry.register(dex_programs::OKX_DEX_ROUTER, Protocol::Okx, Stage::Priority);
        for bot in bot_programs::ALL {
            registry.register(bot, Protocol::TradingBot, Stage::Priority);
        }

        for program in [
            dex_programs::RAYDIUM,
            dex_programs::RAYDIUM_ROUTE,
            dex_programs::RAYDIUM_CPMM,
            dex_programs::RAYDIUM_CLMM,
            dex_programs::RAYDIUM_LEGACY_SWAP,
        ] {
            registry.register(program, Protocol::Raydium, Stage::Direct);
        }
        registry.register(
            dex_programs::RAYDIUM_LAUNCHPAD,
            Protocol::RaydiumLaunchpad,
            Stage::Direct,
        );
        registry.register(dex_programs::ORCA, Protocol::Orca, Stage::Direct);
        for program in [
            dex_programs::METEORA,
            dex_programs::METEORA_DAMM,
            dex_programs::METEORA_DAMM_V2,
        ] {
            registry.register(program, Protocol::Meteora, Stage::Direct);
        }
        registry.register(dex_programs::PUMP_SWAP, Protocol::PumpSwap, Stage::Direct);
        for program in [dex_programs::PUMP_FUN, dex_programs::PUMP_FUN_COMPANION] {
            registry.register(program, Protocol::PumpFun, Stage::Direct);
        }
        registry.register(dex_programs::MOONSHOT, Protocol::Moonshot, Stage::Direct);

        registry.register_relay(dex_programs::JUPITER_DCA, 2);
        registry
    }
}

impl ProtocolRegistry {
    pub fn empty() -> Self {
        Self {
            programs: FxHashMap::default(),
            relays: Vec::new(),
        }
    }

    pub fn register(&mut self, program_id: &str, protocol: Protocol, stage: Stage) -> &mut Self {
        self.programs
            .insert(program_id.to_string(), ProgramEntry { protocol, stage });
        self
    }

    pub fn register_relay(&mut self, program_id: &str, signer_position: usize) -> &mut Self {
        self.relays.push(RelayProgram {
            program_id: program_id.to_string(),
            signer_position,
        });
        self
    }

    pub fn lookup(&self, program_id: &str) -> Option<ProgramEntry> {
        self.programs.get(program_id).copied()
    }

    /// Position of the real trader when any relay program appears among `account_keys`.
    pub fn relay_signer_position<'k>(
        &self,
        mut account_keys: impl Iterator<Item = &'k str>,
    ) -> Option<usize> {
        account_keys.find_map(|key| {
            self.relays
                .iter()
                .find(|relay| relay.program_id == key)
                .map(|relay| relay.signer_position)
        })
    }

    pub fn programs_for(&self, protocol: Protocol) -> impl Iterator<Item = &str> {
        self.programs
            .iter()
            .filter(move |(_, entry)| entry.protocol == protocol)
            .map(|(program, _)| program.as_str())
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}
