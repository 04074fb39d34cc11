// TVLA fixed-vs-random plaintext pattern (Welch's t-test).
//
// Key and fixed plaintext are the TVLA test vectors for the key size. The
// random group draws from the entropy source, or walks the AES chain
// pt_0 = 0, pt_{i+1} = AES-128(K_gen, pt_i) from Goodwin et al. 2011.

use aes::Aes128;
use cipher::generic_array::GenericArray;
use cipher::{BlockEncrypt, KeyInit};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::ktp_entropy::Entropy;
use crate::ktp_error::{ConfigError, KtpError};
use crate::ktp_params::{
    Block, TVLA_FIXED_TEXT_128, TVLA_FIXED_TEXT_192, TVLA_FIXED_TEXT_256, TVLA_GEN_KEY,
    TVLA_KEY_128, TVLA_KEY_192, TVLA_KEY_256, ZERO_BLOCK,
};
use crate::ktp_pattern::{by_key_len, KeyTextPair, KeyTextPattern, PatternCore};
use crate::ktp_schedule::{Group, GroupScheduler, GroupSplit};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RandomTextSource {
    #[default]
    Entropy,
    AesChain,
}

pub(crate) fn aes128_encrypt_block(key: &[u8; 16], block16: &Block) -> Block {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut block = GenericArray::clone_from_slice(block16);
    cipher.encrypt_block(&mut block);
    let mut out = [0u8; 16];
    out.copy_from_slice(&block);
    out
}

pub struct TvlaTTest {
    core: PatternCore,
    split: GroupSplit,
    source: RandomTextSource,
    key_override: Option<Vec<u8>>,
    key: Vec<u8>,
    fixed_text: Block,
    chain: Block,
    scheduler: Option<GroupScheduler>,
    last_group: Option<Group>,
    warned_exhausted: bool,
}

impl TvlaTTest {
    pub const NAME: &'static str = "tvla_ttest";

    pub fn new(entropy: Entropy) -> Self {
        Self::from_core(PatternCore::new(entropy), GroupSplit::default(), RandomTextSource::Entropy)
    }

    pub fn from_core(core: PatternCore, split: GroupSplit, source: RandomTextSource) -> Self {
        Self {
            core,
            split,
            source,
            key_override: None,
            key: Vec::new(),
            fixed_text: ZERO_BLOCK,
            chain: ZERO_BLOCK,
            scheduler: None,
            last_group: None,
            warned_exhausted: false,
        }
    }

    /// Campaign key instead of the TVLA vector. Must be `key_len()` bytes.
    pub fn set_key(&mut self, key: Vec<u8>) {
        self.key_override = Some(key);
    }

    pub fn fixed_text(&self) -> Block {
        self.fixed_text
    }

    /// (group 1, group 2) budgets left.
    pub fn budgets(&self) -> (usize, usize) {
        self.scheduler.map(|s| s.remaining()).unwrap_or((0, 0))
    }

    fn random_text(&mut self) -> Block {
        match self.source {
            RandomTextSource::Entropy => self.core.random_block(),
            RandomTextSource::AesChain => {
                let text = self.chain;
                self.chain = aes128_encrypt_block(&TVLA_GEN_KEY, &self.chain);
                text
            }
        }
    }
}

impl KeyTextPattern for TvlaTTest {
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
            None => {
                let key = by_key_len(
                    Self::NAME,
                    len,
                    &TVLA_KEY_128[..],
                    &TVLA_KEY_192[..],
                    &TVLA_KEY_256[..],
                )?;
                key.to_vec()
            }
        };
        self.fixed_text = by_key_len(
            Self::NAME,
            len,
            TVLA_FIXED_TEXT_128,
            TVLA_FIXED_TEXT_192,
            TVLA_FIXED_TEXT_256,
        )?;
        self.chain = ZERO_BLOCK;

        let scheduler = GroupScheduler::new(max_traces, self.split)?;
        let (group1, group2) = scheduler.remaining();
        self.scheduler = Some(scheduler);
        self.last_group = None;
        self.warned_exhausted = false;

        debug!(
            pattern = Self::NAME,
            key_len = len,
            group1,
            group2,
            source = ?self.source,
            "pattern initialized"
        );
        Ok(())
    }

    fn next_pair(&mut self) -> Result<KeyTextPair, KtpError> {
        let scheduler = self.scheduler.as_mut().ok_or(ConfigError::NotInitialized(Self::NAME))?;
        let exhausted = scheduler.is_exhausted();
        let group = scheduler.select(self.core.entropy().next_unit());

        let text = match group {
            Group::Random => self.random_text(),
            Group::Fixed => self.fixed_text,
        };

        if exhausted && !self.warned_exhausted {
            warn!(pattern = Self::NAME, "trace budget exhausted, groups now drawn by coin flip");
            self.warned_exhausted = true;
        }

        self.core.validate_key(&self.key)?;
        self.last_group = Some(group);

        let pair = KeyTextPair { key: self.key.clone(), text };
        trace!(pattern = Self::NAME, group = ?group, text = %pair.text_hex(), "pair");
        Ok(pair)
    }

    fn last_group(&self) -> Option<Group> {
        self.last_group
    }
}
