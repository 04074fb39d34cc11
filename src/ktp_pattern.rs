// Common contract of all key/text patterns.
//
// Lifecycle: construct with an entropy source -> bind_target (optional) ->
// init(max_traces) once -> next_pair() once per trace. A pattern is driven by
// a single acquisition loop; `&mut self` is the only serialization it offers.

use std::fmt;

use crate::ktp_entropy::{Entropy, EntropySource};
use crate::ktp_error::{ConfigError, KtpError, ValidationError};
use crate::ktp_params::{
    is_supported_key_len, Block, AES128_KEY_LEN, AES192_KEY_LEN, AES256_KEY_LEN, BLOCK_LEN,
    DEFAULT_KEY_LEN,
};
use crate::ktp_schedule::Group;
use crate::ktp_target::SharedTarget;
use crate::ktp_validate;

/// One trace's worth of input.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct KeyTextPair {
    pub key: Vec<u8>,
    pub text: Block,
}

impl KeyTextPair {
    pub fn key_hex(&self) -> String {
        hex::encode(&self.key)
    }

    pub fn text_hex(&self) -> String {
        hex::encode(self.text)
    }
}

impl fmt::Debug for KeyTextPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyTextPair")
            .field("key", &self.key_hex())
            .field("text", &self.text_hex())
            .finish()
    }
}

pub trait KeyTextPattern {
    fn name(&self) -> &'static str;

    fn core(&self) -> &PatternCore;

    fn core_mut(&mut self) -> &mut PatternCore;

    /// Remember the target; it is only ever asked for its key length.
    fn bind_target(&mut self, target: SharedTarget) {
        self.core_mut().bind_target(target);
    }

    fn key_len(&self) -> usize {
        self.core().key_len()
    }

    fn validate_key(&self, key: &[u8]) -> Result<(), ValidationError> {
        self.core().validate_key(key)
    }

    /// Prepare key/template material and budgets for `max_traces` traces.
    fn init(&mut self, max_traces: usize) -> Result<(), KtpError>;

    /// Produce the next validated pair.
    fn next_pair(&mut self) -> Result<KeyTextPair, KtpError>;

    /// Group of the pair returned last, for fixed-vs-random patterns.
    fn last_group(&self) -> Option<Group> {
        None
    }
}

/// State every pattern carries: the optional target and its entropy source.
pub struct PatternCore {
    target: Option<SharedTarget>,
    default_key_len: usize,
    entropy: Entropy,
}

impl PatternCore {
    pub fn new(entropy: Entropy) -> Self {
        Self { target: None, default_key_len: DEFAULT_KEY_LEN, entropy }
    }

    pub fn with_default_key_len(mut self, len: usize) -> Self {
        self.default_key_len = len;
        self
    }

    pub fn bind_target(&mut self, target: SharedTarget) {
        self.target = Some(target);
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    pub fn key_len(&self) -> usize {
        match &self.target {
            Some(t) => t.key_len(),
            None => self.default_key_len,
        }
    }

    /// Key length, rejected unless it is an AES key size.
    pub fn checked_key_len(&self) -> Result<usize, ConfigError> {
        let len = self.key_len();
        if !is_supported_key_len(len) {
            return Err(ConfigError::UnsupportedKeyLength(len));
        }
        Ok(len)
    }

    /// Key must be an AES key size and exactly `key_len()` bytes long.
    pub fn validate_key(&self, key: &[u8]) -> Result<(), ValidationError> {
        ktp_validate::validate_key(key, Some(self.key_len()))
    }

    pub fn entropy(&mut self) -> &mut (dyn EntropySource + Send) {
        self.entropy.as_mut()
    }

    pub fn random_block(&mut self) -> Block {
        let mut block = [0u8; BLOCK_LEN];
        self.entropy.fill(&mut block);
        block
    }

    pub fn random_bytes(&mut self, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        self.entropy.fill(&mut out);
        out
    }
}

/// Pick the per-key-length constant of `pattern`.
pub fn by_key_len<T: Copy>(
    pattern: &'static str,
    len: usize,
    k128: T,
    k192: T,
    k256: T,
) -> Result<T, ConfigError> {
    match len {
        AES128_KEY_LEN => Ok(k128),
        AES192_KEY_LEN => Ok(k192),
        AES256_KEY_LEN => Ok(k256),
        _ => Err(ConfigError::NoConstantForKeyLength { pattern, len }),
    }
}
