use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::DecodeError;

/// Per-call knobs for the decode pipeline.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DecodeConfig {
    /// Run the generic transfer-pairing heuristic when no known protocol yields fragments.
    #[serde(default = "DecodeConfig::default_generic_fallback")]
    pub generic_fallback: bool,
    /// Outer-instruction programs skipped by every dispatch stage.
    #[serde(default)]
    pub ignore_program_ids: Option<Vec<String>>,
    /// Treat token accounts whose mint cannot be resolved as wrapped SOL.
    #[serde(default = "DecodeConfig::default_assume_native_mint")]
    pub assume_native_mint: bool,
    /// Stamp summaries with the wall clock when neither an event nor the block carries a time.
    #[serde(default = "DecodeConfig::default_clock_fallback")]
    pub clock_fallback: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            generic_fallback: Self::default_generic_fallback(),
            ignore_program_ids: None,
            assume_native_mint: Self::default_assume_native_mint(),
            clock_fallback: Self::default_clock_fallback(),
        }
    }
}

impl DecodeConfig {
    const fn default_generic_fallback() -> bool {
        true
    }

    const fn default_assume_native_mint() -> bool {
        true
    }

    const fn default_clock_fallback() -> bool {
        false
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let path = path.as_ref();
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_slice(&data)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn is_ignored(&self, program_id: &str) -> bool {
        self.ignore_program_ids
            .as_ref()
            .is_some_and(|ids| ids.iter().any(|id| id == program_id))
    }

    /// Rejects configurations that would make every decode fail the same way.
    pub fn validate(&self) -> Result<(), DecodeError> {
        if let Some(ids) = &self.ignore_program_ids {
            if ids.iter().any(|id| id.is_empty()) {
                return Err(DecodeError::malformed("ignoreProgramIds contains an empty id"));
            }
        }
        Ok(())
    }
}
