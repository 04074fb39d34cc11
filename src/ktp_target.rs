// The device under test as seen by a pattern: only its key length matters.
// Loading keys, triggering and capturing stay on the caller's side.

use std::sync::Arc;

pub trait Target {
    /// Key length in bytes the target's cipher expects.
    fn key_len(&self) -> usize;
}

pub type SharedTarget = Arc<dyn Target + Send + Sync>;

/// Stand-in target with a fixed key length (CLI, tests, offline generation).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedKeyLen(pub usize);

impl Target for FixedKeyLen {
    fn key_len(&self) -> usize {
        self.0
    }
}

pub fn fixed_key_len(len: usize) -> SharedTarget {
    Arc::new(FixedKeyLen(len))
}
