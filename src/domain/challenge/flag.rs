//! Flag hashing and comparison

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const HASH_PREFIX: &str = "sha256:";

/// A flag as persisted: `sha256:<hex digest>`
///
/// Plain flags are hashed on construction; values that already carry the
/// prefix are kept so stored records can be re-saved without double hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashedFlag(String);

impl HashedFlag {
    pub fn from_plain(flag: &str) -> Self {
        if flag.starts_with(HASH_PREFIX) {
            return Self(flag.to_string());
        }

        Self(digest(flag))
    }

    /// Compares a submitted flag by re-hashing it
    pub fn matches(&self, submitted: &str) -> bool {
        constant_time_eq(self.0.as_bytes(), digest(submitted).as_bytes())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn digest(flag: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(flag.as_bytes());
    format!("{}{}", HASH_PREFIX, hex::encode(hasher.finalize()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_flag_is_hashed() {
        let flag = HashedFlag::from_plain("CTF{hello}");

        assert!(flag.as_str().starts_with("sha256:"));
        assert_eq!(flag.as_str().len(), "sha256:".len() + 64);
        assert_ne!(flag.as_str(), "CTF{hello}");
    }

    #[test]
    fn test_known_digest() {
        let flag = HashedFlag::from_plain("abc");
        assert_eq!(
            flag.as_str(),
            "sha256:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_prehashed_flag_is_kept() {
        let first = HashedFlag::from_plain("CTF{hello}");
        let second = HashedFlag::from_plain(first.as_str());

        assert_eq!(first, second);
    }

    #[test]
    fn test_matches() {
        let flag = HashedFlag::from_plain("CTF{hello}");

        assert!(flag.matches("CTF{hello}"));
        assert!(!flag.matches("CTF{Hello}"));
        assert!(!flag.matches(""));
    }
}
