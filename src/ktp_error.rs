// Error types. Two kinds reach the caller: a campaign that cannot be set up
// (InvalidConfiguration) and a key/plaintext value that fails validation
// (InvalidInput).

use thiserror::Error;

/// Reason a pattern could not be configured or initialized.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unsupported key length: {0} bytes (expected 16, 24 or 32)")]
    UnsupportedKeyLength(usize),

    #[error("{pattern}: no constant for key length {len}")]
    NoConstantForKeyLength { pattern: &'static str, len: usize },

    #[error("{0}: init() must be called before next_pair()")]
    NotInitialized(&'static str),

    #[error("malformed hex in {field}: {source}")]
    Hex {
        field: &'static str,
        #[source]
        source: hex::FromHexError,
    },

    #[error("plaintext override must be 16 bytes, got {0}")]
    TextLength(usize),

    #[error("group split {random}:{fixed} is empty")]
    EmptySplit { random: u32, fixed: u32 },

    #[error("invalid unmask cadence: {0}")]
    InvalidCadence(String),

    #[error("entropy source: {0}")]
    Entropy(String),

    #[error("{pattern} does not use a {field} override")]
    UnusedOverride { pattern: &'static str, field: &'static str },

    #[error("unknown pattern kind: {0:?}")]
    UnknownKind(String),
}

/// Reason a single key or plaintext was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid key length: {0} bytes (expected 16, 24 or 32)")]
    KeyLength(usize),

    #[error("key is {actual} bytes but the pattern key length is {expected}")]
    KeyTargetMismatch { expected: usize, actual: usize },

    #[error("invalid plaintext length: {0} bytes (expected 16)")]
    TextLength(usize),

    #[error("invalid base3 string: forbidden character '{ch}' at nibble {position}")]
    ForbiddenChar { ch: char, position: usize },

    #[error("malformed hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("trit {digit} at position {position} is not in 0..=2")]
    TritRange { digit: u8, position: usize },

    #[error("{0} trits do not pack into whole bytes")]
    TritCount(usize),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KtpError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),
}

impl KtpError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, KtpError::InvalidConfiguration(_))
    }

    pub fn is_input(&self) -> bool {
        matches!(self, KtpError::InvalidInput(_))
    }
}
