pub mod ktp_params;
pub mod ktp_error;
pub mod ktp_validate;
pub mod nist_drbg;
pub mod ktp_entropy;
pub mod ktp_target;

pub mod ktp_schedule;
pub mod ktp_pattern;
pub mod ktp_basic;
pub mod ktp_dpa;
pub mod ktp_tvla;
pub mod ktp_tvla_base3;
pub mod ktp_config;

pub use ktp_config::{build_pattern, build_pattern_with, PatternConfig, PatternKind};
pub use ktp_error::{ConfigError, KtpError, ValidationError};
pub use ktp_pattern::{KeyTextPair, KeyTextPattern};
