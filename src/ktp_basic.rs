// Basic pattern: fixed or random key, fixed or random plaintext.
// Default is the reference setup: fixed FIPS-197 key, random plaintext.

use tracing::{debug, trace};

use crate::ktp_entropy::Entropy;
use crate::ktp_error::{ConfigError, KtpError};
use crate::ktp_params::{Block, BASIC_KEY_128, BASIC_KEY_192, BASIC_KEY_256, BASIC_TEXT};
use crate::ktp_pattern::{by_key_len, KeyTextPair, KeyTextPattern, PatternCore};

pub struct Basic {
    core: PatternCore,
    fixed_key: bool,
    fixed_text: bool,
    key_override: Option<Vec<u8>>,
    text_override: Option<Block>,
    key: Vec<u8>,
    text: Block,
    ready: bool,
}

impl Basic {
    pub const NAME: &'static str = "basic";

    pub fn new(entropy: Entropy, fixed_key: bool, fixed_text: bool) -> Self {
        Self::from_core(PatternCore::new(entropy), fixed_key, fixed_text)
    }

    pub fn from_core(core: PatternCore, fixed_key: bool, fixed_text: bool) -> Self {
        Self {
            core,
            fixed_key,
            fixed_text,
            key_override: None,
            text_override: None,
            key: Vec::new(),
            text: BASIC_TEXT,
            ready: false,
        }
    }

    /// Campaign key. Takes precedence over both the default key and the
    /// per-trace random key.
    pub fn set_key(&mut self, key: Vec<u8>) {
        self.key_override = Some(key);
    }

    /// Campaign plaintext, kept for every trace like the key override.
    pub fn set_text(&mut self, text: Block) {
        self.text_override = Some(text);
    }

    pub fn fixed_key(&self) -> bool {
        self.fixed_key
    }

    pub fn fixed_text(&self) -> bool {
        self.fixed_text
    }
}

impl KeyTextPattern for Basic {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn core(&self) -> &PatternCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PatternCore {
        &mut self.core
    }

    fn init(&mut self, max_traces: usize) -> Result<(), KtpError> {
        let len = self.core.checked_key_len()?;

        self.key = match &self.key_override {
            Some(k) => {
                self.core.validate_key(k)?;
                k.clone()
            }
            None if self.fixed_key => {
                let key = by_key_len(
                    Self::NAME,
                    len,
                    &BASIC_KEY_128[..],
                    &BASIC_KEY_192[..],
                    &BASIC_KEY_256[..],
                )?;
                key.to_vec()
            }
            None => self.core.random_bytes(len),
        };
        self.text = self.text_override.unwrap_or(BASIC_TEXT);
        self.ready = true;

        debug!(
            pattern = Self::NAME,
            key_len = len,
            max_traces,
            fixed_key = self.fixed_key,
            fixed_text = self.fixed_text,
            "pattern initialized"
        );
        Ok(())
    }

    fn next_pair(&mut self) -> Result<KeyTextPair, KtpError> {
        if !self.ready {
            return Err(ConfigError::NotInitialized(Self::NAME).into());
        }

        if !self.fixed_key && self.key_override.is_none() {
            let len = self.core.checked_key_len()?;
            self.key = self.core.random_bytes(len);
        }
        if !self.fixed_text && self.text_override.is_none() {
            self.text = self.core.random_block();
        }

        self.core.validate_key(&self.key)?;

        let pair = KeyTextPair { key: self.key.clone(), text: self.text };
        trace!(pattern = Self::NAME, key = %pair.key_hex(), text = %pair.text_hex(), "pair");
        Ok(pair)
    }
}
