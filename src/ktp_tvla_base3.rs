// TVLA fixed-vs-random pattern restricted to base-3-safe plaintexts.
//
// Every plaintext nibble is one of 0,1,2,4,5,6,8,9,a, i.e. a pair of ternary
// digits (n >> 2, n & 3), so the decoded value is a valid base-3 string.
//
// Group 1 returns the current template and then replaces it with a fresh
// base-3 block, so group 1 is a rolling value (the previous group-1 draw),
// not a constant. Group 2 returns the interleaved constant for the key size.

use tracing::{debug, trace, warn};

use crate::ktp_entropy::{Entropy, EntropySource};
use crate::ktp_error::{ConfigError, KtpError, ValidationError};
use crate::ktp_params::{
    Block, BASE3_ALPHABET, BASE3_INTERLEAVED_128, BASE3_INTERLEAVED_192, BASE3_INTERLEAVED_256,
    BASE3_KEY, BLOCK_LEN, ZERO_BLOCK,
};
use crate::ktp_pattern::{by_key_len, KeyTextPair, KeyTextPattern, PatternCore};
use crate::ktp_schedule::{Group, GroupScheduler, GroupSplit};
use crate::ktp_validate::validate_base3_text;

/// Draw 32 symbols from the base-3 hex alphabet and decode them.
pub fn random_base3_block(entropy: &mut dyn EntropySource) -> Result<Block, ValidationError> {
    let mut chars = [0u8; 2 * BLOCK_LEN];
    for c in chars.iter_mut() {
        *c = BASE3_ALPHABET[entropy.below(BASE3_ALPHABET.len())];
    }
    let mut block = ZERO_BLOCK;
    hex::decode_to_slice(chars, &mut block)?;
    Ok(block)
}

pub struct TvlaTTestBase3 {
    core: PatternCore,
    split: GroupSplit,
    key: Vec<u8>,
    template: Block,
    interleaved: Block,
    scheduler: Option<GroupScheduler>,
    last_group: Option<Group>,
    warned_exhausted: bool,
}

impl TvlaTTestBase3 {
    pub const NAME: &'static str = "tvla_ttest_base3";

    pub fn new(entropy: Entropy) -> Self {
        Self::from_core(PatternCore::new(entropy), GroupSplit::default())
    }

    pub fn from_core(core: PatternCore, split: GroupSplit) -> Self {
        Self {
            core,
            split,
            key: Vec::new(),
            template: ZERO_BLOCK,
            interleaved: ZERO_BLOCK,
            scheduler: None,
            last_group: None,
            warned_exhausted: false,
        }
    }

    /// Plaintext the next group-1 draw will return.
    pub fn template(&self) -> Block {
        self.template
    }

    pub fn interleaved(&self) -> Block {
        self.interleaved
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// (group 1, group 2) budgets left.
    pub fn budgets(&self) -> (usize, usize) {
        self.scheduler.map(|s| s.remaining()).unwrap_or((0, 0))
    }
}

impl KeyTextPattern for TvlaTTestBase3 {
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

        self.key = BASE3_KEY[..len].to_vec();
        self.template = ZERO_BLOCK;
        self.interleaved = by_key_len(
            Self::NAME,
            len,
            BASE3_INTERLEAVED_128,
            BASE3_INTERLEAVED_192,
            BASE3_INTERLEAVED_256,
        )?;

        let scheduler = GroupScheduler::new(max_traces, self.split)?;
        let (group1, group2) = scheduler.remaining();
        self.scheduler = Some(scheduler);
        self.last_group = None;
        self.warned_exhausted = false;

        debug!(pattern = Self::NAME, key_len = len, group1, group2, "pattern initialized");
        Ok(())
    }

    fn next_pair(&mut self) -> Result<KeyTextPair, KtpError> {
        let scheduler = self.scheduler.as_mut().ok_or(ConfigError::NotInitialized(Self::NAME))?;
        let exhausted = scheduler.is_exhausted();
        let group = scheduler.select(self.core.entropy().next_unit());

        let text = match group {
            Group::Random => {
                let text = self.template;
                self.template = random_base3_block(self.core.entropy())?;
                text
            }
            Group::Fixed => self.interleaved,
        };

        if exhausted && !self.warned_exhausted {
            warn!(pattern = Self::NAME, "trace budget exhausted, groups now drawn by coin flip");
            self.warned_exhausted = true;
        }

        self.core.validate_key(&self.key)?;
        validate_base3_text(&text)?;
        self.last_group = Some(group);

        let pair = KeyTextPair { key: self.key.clone(), text };
        trace!(pattern = Self::NAME, group = ?group, text = %pair.text_hex(), "pair");
        Ok(pair)
    }

    fn last_group(&self) -> Option<Group> {
        self.last_group
    }
}
