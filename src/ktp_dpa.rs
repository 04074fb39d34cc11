// DPA helper pattern.
//
// A masked trace sends `p ^ m` for a fresh random plaintext `p` and mask `m`.
// According to the cadence, the following trace sends `m` itself under the
// same key, so the analysis stage can combine both traces and recover the
// leakage of the unmasked value.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::ktp_entropy::Entropy;
use crate::ktp_error::{ConfigError, KtpError};
use crate::ktp_params::{Block, BASIC_KEY_128, BASIC_KEY_192, BASIC_KEY_256, ZERO_BLOCK};
use crate::ktp_pattern::{by_key_len, KeyTextPair, KeyTextPattern, PatternCore};

/// When a masked trace is followed by its unmask trace.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmaskCadence {
    /// After every n-th masked trace.
    Every(u32),
    /// After each masked trace with probability p.
    Probability(f64),
}

impl Default for UnmaskCadence {
    fn default() -> Self {
        UnmaskCadence::Every(1)
    }
}

impl UnmaskCadence {
    pub fn check(&self) -> Result<(), ConfigError> {
        match *self {
            UnmaskCadence::Every(0) => Err(ConfigError::InvalidCadence("every 0 traces".into())),
            UnmaskCadence::Probability(p) if !(0.0..=1.0).contains(&p) => {
                Err(ConfigError::InvalidCadence(format!("probability {p} outside [0, 1]")))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DpaPhase {
    Masked,
    Unmask,
}

pub struct Dpa {
    core: PatternCore,
    fixed_key: bool,
    cadence: UnmaskCadence,
    key_override: Option<Vec<u8>>,
    key: Vec<u8>,
    masked_count: u64,
    pending_mask: Option<Block>,
    last_unmasked: Block,
    last_mask: Block,
    last_phase: Option<DpaPhase>,
    ready: bool,
}

impl Dpa {
    pub const NAME: &'static str = "dpa";

    pub fn new(
        entropy: Entropy,
        fixed_key: bool,
        cadence: UnmaskCadence,
    ) -> Result<Self, ConfigError> {
        Self::from_core(PatternCore::new(entropy), fixed_key, cadence)
    }

    pub fn from_core(
        core: PatternCore,
        fixed_key: bool,
        cadence: UnmaskCadence,
    ) -> Result<Self, ConfigError> {
        cadence.check()?;
        Ok(Self {
            core,
            fixed_key,
            cadence,
            key_override: None,
            key: Vec::new(),
            masked_count: 0,
            pending_mask: None,
            last_unmasked: ZERO_BLOCK,
            last_mask: ZERO_BLOCK,
            last_phase: None,
            ready: false,
        })
    }

    /// Campaign key, also kept when `fixed_key` is off.
    pub fn set_key(&mut self, key: Vec<u8>) {
        self.key_override = Some(key);
    }

    pub fn cadence(&self) -> UnmaskCadence {
        self.cadence
    }

    /// Plaintext before masking, of the latest masked trace.
    pub fn last_unmasked(&self) -> Block {
        self.last_unmasked
    }

    pub fn last_mask(&self) -> Block {
        self.last_mask
    }

    pub fn last_phase(&self) -> Option<DpaPhase> {
        self.last_phase
    }

    fn unmask_follows(&mut self) -> bool {
        match self.cadence {
            UnmaskCadence::Every(n) => self.masked_count % n as u64 == 0,
            UnmaskCadence::Probability(p) => self.core.entropy().next_unit() < p,
        }
    }
}

impl KeyTextPattern for Dpa {
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
                    &BASIC_KEY_128[..],
                    &BASIC_KEY_192[..],
                    &BASIC_KEY_256[..],
                )?;
                key.to_vec()
            }
        };
        self.masked_count = 0;
        self.pending_mask = None;
        self.last_phase = None;
        self.ready = true;

        debug!(
            pattern = Self::NAME,
            key_len = len,
            max_traces,
            cadence = ?self.cadence,
            "pattern initialized"
        );
        Ok(())
    }

    fn next_pair(&mut self) -> Result<KeyTextPair, KtpError> {
        if !self.ready {
            return Err(ConfigError::NotInitialized(Self::NAME).into());
        }

        let (text, phase) = match self.pending_mask.take() {
            Some(mask) => (mask, DpaPhase::Unmask),
            None => {
                if !self.fixed_key && self.key_override.is_none() {
                    let len = self.core.checked_key_len()?;
                    self.key = self.core.random_bytes(len);
                }

                let plain = self.core.random_block();
                let mask = self.core.random_block();
                let mut masked = plain;
                for (c, m) in masked.iter_mut().zip(mask.iter()) {
                    *c ^= m;
                }

                self.last_unmasked = plain;
                self.last_mask = mask;
                self.masked_count += 1;
                if self.unmask_follows() {
                    self.pending_mask = Some(mask);
                }
                (masked, DpaPhase::Masked)
            }
        };

        self.core.validate_key(&self.key)?;
        self.last_phase = Some(phase);

        let pair = KeyTextPair { key: self.key.clone(), text };
        trace!(pattern = Self::NAME, phase = ?phase, text = %pair.text_hex(), "pair");
        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ktp_entropy::seeded;
    use crate::ktp_error::ValidationError;
    use crate::ktp_target::fixed_key_len;

    fn xor(a: &Block, b: &Block) -> Block {
        let mut out = *a;
        for (o, x) in out.iter_mut().zip(b.iter()) {
            *o ^= x;
        }
        out
    }

    #[test]
    fn masked_then_unmask() {
        let mut p = Dpa::new(seeded(3), true, UnmaskCadence::Every(1)).unwrap();
        p.init(4).unwrap();

        let masked = p.next_pair().unwrap();
        assert_eq!(p.last_phase(), Some(DpaPhase::Masked));
        assert_eq!(masked.text, xor(&p.last_unmasked(), &p.last_mask()));
        let mask = p.last_mask();

        let unmask = p.next_pair().unwrap();
        assert_eq!(p.last_phase(), Some(DpaPhase::Unmask));
        assert_eq!(unmask.text, mask);
        assert_eq!(unmask.key, masked.key);
        assert_eq!(xor(&masked.text, &unmask.text), p.last_unmasked());

        p.next_pair().unwrap();
        assert_eq!(p.last_phase(), Some(DpaPhase::Masked));
    }

    #[test]
    fn every_third_masked_trace_is_unmasked() {
        let mut p = Dpa::new(seeded(3), true, UnmaskCadence::Every(3)).unwrap();
        p.init(8).unwrap();

        let mut phases = Vec::new();
        for _ in 0..8 {
            p.next_pair().unwrap();
            phases.push(p.last_phase().unwrap());
        }
        use DpaPhase::*;
        assert_eq!(phases, vec![Masked, Masked, Masked, Unmask, Masked, Masked, Masked, Unmask]);
    }

    #[test]
    fn probability_extremes() {
        let mut never = Dpa::new(seeded(1), true, UnmaskCadence::Probability(0.0)).unwrap();
        never.init(5).unwrap();
        for _ in 0..5 {
            never.next_pair().unwrap();
            assert_eq!(never.last_phase(), Some(DpaPhase::Masked));
        }

        let mut always = Dpa::new(seeded(1), true, UnmaskCadence::Probability(1.0)).unwrap();
        always.init(4).unwrap();
        let phases: Vec<_> = (0..4)
            .map(|_| {
                always.next_pair().unwrap();
                always.last_phase().unwrap()
            })
            .collect();
        use DpaPhase::*;
        assert_eq!(phases, vec![Masked, Unmask, Masked, Unmask]);
    }

    #[test]
    fn random_key_kept_for_unmask() {
        let mut p = Dpa::new(seeded(11), false, UnmaskCadence::Every(1)).unwrap();
        p.bind_target(fixed_key_len(32));
        p.init(4).unwrap();

        let a = p.next_pair().unwrap();
        let b = p.next_pair().unwrap();
        let c = p.next_pair().unwrap();
        assert_eq!(a.key.len(), 32);
        assert_eq!(a.key, b.key);
        assert_ne!(a.key, c.key);
    }

    #[test]
    fn key_override_kept_with_random_key() {
        let mut p = Dpa::new(seeded(6), false, UnmaskCadence::Every(1)).unwrap();
        p.bind_target(fixed_key_len(24));
        p.set_key(vec![0x5a; 24]);
        p.init(6).unwrap();
        for _ in 0..6 {
            assert_eq!(p.next_pair().unwrap().key, vec![0x5a; 24]);
        }
    }

    #[test]
    fn key_override_must_match_key_len() {
        let mut p = Dpa::new(seeded(6), true, UnmaskCadence::Every(1)).unwrap();
        p.set_key(vec![0x5a; 32]);
        assert_eq!(
            p.init(2),
            Err(KtpError::InvalidInput(ValidationError::KeyTargetMismatch {
                expected: 16,
                actual: 32,
            }))
        );
    }

    #[test]
    fn bad_cadence() {
        assert!(matches!(
            Dpa::new(seeded(0), true, UnmaskCadence::Every(0)),
            Err(ConfigError::InvalidCadence(_))
        ));
        assert!(matches!(
            Dpa::new(seeded(0), true, UnmaskCadence::Probability(1.5)),
            Err(ConfigError::InvalidCadence(_))
        ));
    }
}
