// Pattern selection and configuration.
//
// The set of patterns is closed: `PatternKind` names every variant and
// `build_pattern` is the only place that maps a kind to an implementation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ktp_basic::Basic;
use crate::ktp_dpa::{Dpa, UnmaskCadence};
use crate::ktp_entropy::{self, Entropy};
use crate::ktp_error::{ConfigError, KtpError};
use crate::ktp_params::{Block, DEFAULT_KEY_LEN};
use crate::ktp_pattern::{KeyTextPattern, PatternCore};
use crate::ktp_schedule::GroupSplit;
use crate::ktp_tvla::{RandomTextSource, TvlaTTest};
use crate::ktp_tvla_base3::TvlaTTestBase3;
use crate::nist_drbg::SEED_LEN;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    #[default]
    Basic,
    Dpa,
    #[serde(rename = "tvla_ttest")]
    TvlaTTest,
    #[serde(rename = "tvla_ttest_base3")]
    TvlaTTestBase3,
}

impl PatternKind {
    pub const ALL: [PatternKind; 4] =
        [PatternKind::Basic, PatternKind::Dpa, PatternKind::TvlaTTest, PatternKind::TvlaTTestBase3];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Basic => Basic::NAME,
            PatternKind::Dpa => Dpa::NAME,
            PatternKind::TvlaTTest => TvlaTTest::NAME,
            PatternKind::TvlaTTestBase3 => TvlaTTestBase3::NAME,
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace('-', "_");
        match norm.as_str() {
            "basic" => Ok(PatternKind::Basic),
            "dpa" => Ok(PatternKind::Dpa),
            "tvla" | "tvla_ttest" | "tvlattest" => Ok(PatternKind::TvlaTTest),
            "tvla_base3" | "tvla_ttest_base3" | "tvlattest_base3" => {
                Ok(PatternKind::TvlaTTestBase3)
            }
            _ => Err(ConfigError::UnknownKind(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntropyConfig {
    /// CTR-DRBG seeded from the OS.
    #[default]
    Os,
    /// ChaCha20 from a 64-bit seed.
    Seed(u64),
    /// CTR-DRBG from a 48-byte hex seed.
    Drbg(String),
}

impl EntropyConfig {
    pub fn build(&self) -> Result<Entropy, ConfigError> {
        match self {
            EntropyConfig::Os => ktp_entropy::os(),
            EntropyConfig::Seed(seed) => Ok(ktp_entropy::seeded(*seed)),
            EntropyConfig::Drbg(seed_hex) => {
                let mut seed = [0u8; SEED_LEN];
                hex::decode_to_slice(seed_hex.trim(), &mut seed)
                    .map_err(|source| ConfigError::Hex { field: "entropy.drbg", source })?;
                Ok(ktp_entropy::from_drbg_seed(&seed))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    pub kind: PatternKind,
    /// Key length when no target is bound.
    pub default_key_len: usize,
    /// Basic, DPA: keep one key for the whole campaign.
    pub fixed_key: bool,
    /// Basic: keep one plaintext for the whole campaign.
    pub fixed_text: bool,
    /// Basic, DPA, TVLATTest: hex key replacing the default one.
    /// Rejected for TVLATTest_base3.
    pub key: Option<String>,
    /// Basic: hex plaintext replacing the default one. Rejected elsewhere.
    pub text: Option<String>,
    pub split: GroupSplit,
    pub random_text: RandomTextSource,
    pub unmask: UnmaskCadence,
    pub entropy: EntropyConfig,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            kind: PatternKind::Basic,
            default_key_len: DEFAULT_KEY_LEN,
            fixed_key: true,
            fixed_text: false,
            key: None,
            text: None,
            split: GroupSplit::default(),
            random_text: RandomTextSource::default(),
            unmask: UnmaskCadence::default(),
            entropy: EntropyConfig::default(),
        }
    }
}

impl PatternConfig {
    pub fn for_kind(kind: PatternKind) -> Self {
        Self { kind, ..Self::default() }
    }

    fn key_bytes(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        self.key.as_deref().map(|k| parse_hex("key", k)).transpose()
    }

    fn text_block(&self) -> Result<Option<Block>, ConfigError> {
        match self.text.as_deref() {
            None => Ok(None),
            Some(t) => {
                let bytes = parse_hex("text", t)?;
                let len = bytes.len();
                let block: Block = bytes.try_into().map_err(|_| ConfigError::TextLength(len))?;
                Ok(Some(block))
            }
        }
    }
}

/// Hex with optional whitespace between bytes ("2b 7e 15 ...").
pub fn parse_hex(field: &'static str, s: &str) -> Result<Vec<u8>, ConfigError> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(compact).map_err(|source| ConfigError::Hex { field, source })
}

pub type BoxedPattern = Box<dyn KeyTextPattern + Send>;

/// Build the configured pattern with the configured entropy source.
pub fn build_pattern(cfg: &PatternConfig) -> Result<BoxedPattern, KtpError> {
    let entropy = cfg.entropy.build()?;
    build_pattern_with(cfg, entropy)
}

/// Build the configured pattern around a caller-supplied entropy source.
pub fn build_pattern_with(cfg: &PatternConfig, entropy: Entropy) -> Result<BoxedPattern, KtpError> {
    let core = PatternCore::new(entropy).with_default_key_len(cfg.default_key_len);
    let key = cfg.key_bytes()?;
    let text = cfg.text_block()?;

    if text.is_some() && cfg.kind != PatternKind::Basic {
        let pattern = cfg.kind.as_str();
        return Err(ConfigError::UnusedOverride { pattern, field: "text" }.into());
    }
    if key.is_some() && cfg.kind == PatternKind::TvlaTTestBase3 {
        let pattern = cfg.kind.as_str();
        return Err(ConfigError::UnusedOverride { pattern, field: "key" }.into());
    }

    let pattern: BoxedPattern = match cfg.kind {
        PatternKind::Basic => {
            let mut p = Basic::from_core(core, cfg.fixed_key, cfg.fixed_text);
            if let Some(k) = key {
                p.set_key(k);
            }
            if let Some(t) = text {
                p.set_text(t);
            }
            Box::new(p)
        }
        PatternKind::Dpa => {
            let mut p = Dpa::from_core(core, cfg.fixed_key, cfg.unmask)?;
            if let Some(k) = key {
                p.set_key(k);
            }
            Box::new(p)
        }
        PatternKind::TvlaTTest => {
            let mut p = TvlaTTest::from_core(core, cfg.split, cfg.random_text);
            if let Some(k) = key {
                p.set_key(k);
            }
            Box::new(p)
        }
        PatternKind::TvlaTTestBase3 => Box::new(TvlaTTestBase3::from_core(core, cfg.split)),
    };

    debug!(kind = %cfg.kind, "pattern built");
    Ok(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ktp_params::{BASE3_INTERLEAVED_128, BASIC_KEY_128};
    use crate::ktp_schedule::Group;

    #[test]
    fn kind_names_round_trip() {
        for kind in PatternKind::ALL {
            assert_eq!(kind.to_string().parse::<PatternKind>().unwrap(), kind);
        }
        assert_eq!("TVLATTest_base3".parse::<PatternKind>().unwrap(), PatternKind::TvlaTTestBase3);
        assert_eq!("tvla-ttest".parse::<PatternKind>().unwrap(), PatternKind::TvlaTTest);
        assert_eq!(
            "cpa".parse::<PatternKind>(),
            Err(ConfigError::UnknownKind("cpa".to_string()))
        );
    }

    #[test]
    fn defaults_from_empty_json() {
        let cfg: PatternConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, PatternConfig::default());
        assert!(cfg.fixed_key);
        assert!(!cfg.fixed_text);
        assert_eq!(cfg.default_key_len, 16);
    }

    #[test]
    fn parse_full_json() {
        let cfg: PatternConfig = serde_json::from_str(
            r#"{
                "kind": "tvla_ttest_base3",
                "default_key_len": 24,
                "split": { "random": 1, "fixed": 3 },
                "unmask": { "probability": 0.25 },
                "random_text": "aes_chain",
                "entropy": { "seed": 7 }
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.kind, PatternKind::TvlaTTestBase3);
        assert_eq!(cfg.default_key_len, 24);
        assert_eq!(cfg.split, GroupSplit { random: 1, fixed: 3 });
        assert_eq!(cfg.unmask, UnmaskCadence::Probability(0.25));
        assert_eq!(cfg.random_text, RandomTextSource::AesChain);
        assert_eq!(cfg.entropy, EntropyConfig::Seed(7));
    }

    #[test]
    fn builds_every_kind() {
        for kind in PatternKind::ALL {
            let cfg =
                PatternConfig { entropy: EntropyConfig::Seed(1), ..PatternConfig::for_kind(kind) };
            let mut p = build_pattern(&cfg).unwrap();
            assert_eq!(p.name(), kind.as_str());
            p.init(8).unwrap();
            for _ in 0..8 {
                let pair = p.next_pair().unwrap();
                assert_eq!(pair.key.len(), 16);
            }
        }
    }

    #[test]
    fn base3_from_config() {
        let cfg = PatternConfig {
            entropy: EntropyConfig::Seed(3),
            ..PatternConfig::for_kind(PatternKind::TvlaTTestBase3)
        };
        let mut p = build_pattern(&cfg).unwrap();
        p.init(1).unwrap();
        assert_eq!(p.next_pair().unwrap().text, BASE3_INTERLEAVED_128);
        assert_eq!(p.last_group(), Some(Group::Fixed));
    }

    #[test]
    fn hex_overrides() {
        let cfg = PatternConfig {
            key: Some("2b 7e 15 16 28 ae d2 a6 ab f7 15 88 09 cf 4f 3c".into()),
            text: Some("00000000000000000000000000000001".into()),
            fixed_text: true,
            entropy: EntropyConfig::Seed(0),
            ..PatternConfig::default()
        };
        let mut p = build_pattern(&cfg).unwrap();
        p.init(1).unwrap();
        let pair = p.next_pair().unwrap();
        assert_eq!(pair.key, BASIC_KEY_128.to_vec());
        assert_eq!(pair.text[15], 1);
    }

    #[test]
    fn bad_overrides() {
        let seeded = PatternConfig { entropy: EntropyConfig::Seed(0), ..PatternConfig::default() };

        let cfg = PatternConfig { key: Some("zz".into()), ..seeded.clone() };
        assert!(matches!(
            build_pattern(&cfg),
            Err(KtpError::InvalidConfiguration(ConfigError::Hex { field: "key", .. }))
        ));

        let cfg = PatternConfig { text: Some("0011".into()), ..seeded.clone() };
        assert!(matches!(
            build_pattern(&cfg),
            Err(KtpError::InvalidConfiguration(ConfigError::TextLength(2)))
        ));

        let cfg =
            PatternConfig { kind: PatternKind::Dpa, unmask: UnmaskCadence::Every(0), ..seeded };
        assert!(matches!(
            build_pattern(&cfg),
            Err(KtpError::InvalidConfiguration(ConfigError::InvalidCadence(_)))
        ));
    }

    #[test]
    fn ignored_overrides_are_rejected() {
        let seeded = PatternConfig { entropy: EntropyConfig::Seed(0), ..PatternConfig::default() };
        let text = Some("00".repeat(16));

        for kind in [PatternKind::Dpa, PatternKind::TvlaTTest, PatternKind::TvlaTTestBase3] {
            let cfg = PatternConfig { kind, text: text.clone(), ..seeded.clone() };
            assert_eq!(
                build_pattern(&cfg).err(),
                Some(KtpError::InvalidConfiguration(ConfigError::UnusedOverride {
                    pattern: kind.as_str(),
                    field: "text",
                }))
            );
        }

        let cfg = PatternConfig {
            kind: PatternKind::TvlaTTestBase3,
            key: Some("00".repeat(16)),
            ..seeded.clone()
        };
        assert_eq!(
            build_pattern(&cfg).err(),
            Some(KtpError::InvalidConfiguration(ConfigError::UnusedOverride {
                pattern: "tvla_ttest_base3",
                field: "key",
            }))
        );

        let cfg =
            PatternConfig { kind: PatternKind::TvlaTTest, key: Some("11".repeat(16)), ..seeded };
        assert!(build_pattern(&cfg).is_ok());
    }

    #[test]
    fn config_key_checked_at_init() {
        let cfg = PatternConfig {
            kind: PatternKind::Dpa,
            key: Some("11".repeat(24)),
            entropy: EntropyConfig::Seed(0),
            ..PatternConfig::default()
        };
        let mut p = build_pattern(&cfg).unwrap();
        assert!(p.init(2).unwrap_err().is_input());
    }

    #[test]
    fn drbg_entropy_config() {
        let seed_hex = "00".repeat(SEED_LEN);
        assert!(EntropyConfig::Drbg(seed_hex).build().is_ok());
        assert!(matches!(
            EntropyConfig::Drbg("0011".into()).build(),
            Err(ConfigError::Hex { field: "entropy.drbg", .. })
        ));
    }

    #[test]
    fn empty_split_fails_at_init() {
        let cfg = PatternConfig {
            kind: PatternKind::TvlaTTest,
            split: GroupSplit { random: 0, fixed: 0 },
            entropy: EntropyConfig::Seed(0),
            ..PatternConfig::default()
        };
        let mut p = build_pattern(&cfg).unwrap();
        assert!(p.init(10).unwrap_err().is_configuration());
    }
}
