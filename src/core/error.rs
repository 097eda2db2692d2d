use thiserror::Error;
use tracing::warn;

use crate::protocols::binary_reader::BinaryReaderError;
use crate::types::Protocol;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed transaction: {0}")]
    MalformedTransaction(String),
    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
    #[error("unknown discriminator {discriminator} for program {program}")]
    UnknownDiscriminator {
        program: String,
        discriminator: String,
    },
    #[error("no pre/post balance for mint {mint} held by {holder}")]
    BalanceNotFound { mint: String, holder: String },
    #[error("ambiguous route: {inputs} input mint(s) and {outputs} output mint(s) remain after netting")]
    AmbiguousRoute { inputs: usize, outputs: usize },
    #[error("no swap detected")]
    NoSwapDetected,
    #[error("invalid instruction data: {0}")]
    InvalidInstructionData(String),
}

impl DecodeError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedTransaction(message.into())
    }

    pub fn out_of_range(what: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { what, index, len }
    }

    pub fn unknown_discriminator(program: &str, bytes: &[u8]) -> Self {
        Self::UnknownDiscriminator {
            program: program.to_string(),
            discriminator: hex::encode(bytes),
        }
    }

    /// Decode-local failures. A decoder hitting one of these yields no
    /// fragments and the pipeline keeps going.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::IndexOutOfRange { .. }
                | Self::UnknownDiscriminator { .. }
                | Self::BalanceNotFound { .. }
                | Self::InvalidInstructionData(_)
        )
    }
}

impl From<BinaryReaderError> for DecodeError {
    fn from(err: BinaryReaderError) -> Self {
        Self::InvalidInstructionData(err.to_string())
    }
}

impl From<bs58::decode::Error> for DecodeError {
    fn from(err: bs58::decode::Error) -> Self {
        Self::InvalidInstructionData(format!("base58: {err}"))
    }
}

/// Recoverable failures collected while decoding one transaction.
///
/// A structural error handed to [`Diagnostics::record`] is not listed; the
/// first one is held back until the dispatcher takes it and aborts.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<(Protocol, DecodeError)>,
    fatal: Option<DecodeError>,
}

impl Diagnostics {
    pub fn record(&mut self, protocol: Protocol, err: DecodeError) {
        if !err.is_recoverable() {
            warn!(protocol = %protocol, error = %err, "structural error while decoding");
            self.fatal.get_or_insert(err);
            return;
        }
        warn!(protocol = %protocol, error = %err, "decoder skipped instruction");
        self.entries.push((protocol, err));
    }

    pub fn entries(&self) -> &[(Protocol, DecodeError)] {
        &self.entries
    }

    pub(crate) fn take_fatal(&mut self) -> Option<DecodeError> {
        self.fatal.take()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
