use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Truncated SHA-256 content hash of a block: the first 16 bytes (32 hex
/// characters) of the full digest. Collision resistance of the full digest
/// is not needed here (see spec Non-goals); truncation keeps log lines and
/// CSV rows short the way the original Python `hash[:7]` convention does.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockHash([u8; 16]);

impl BlockHash {
    /// The sentinel parent hash of the genesis block. Distinguishable from
    /// every content hash produced by `from_canonical_string` in practice.
    pub const GENESIS_PARENT: BlockHash = BlockHash([0xff; 16]);

    pub fn from_canonical_string(s: &str) -> Self {
        let digest = Sha256::digest(s.as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        BlockHash(bytes)
    }

    /// First 7 hex characters, matching the original implementation's
    /// `hash[:7]` log truncation.
    pub fn short(&self) -> String {
        hex::encode(self.0)[..7].to_string()
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_equal_input() {
        let a = BlockHash::from_canonical_string("height=1|parent=ff|t=0|txns=[]");
        let b = BlockHash::from_canonical_string("height=1|parent=ff|t=0|txns=[]");
        assert_eq!(a, b);
    }

    #[test]
    fn differs_for_different_input() {
        let a = BlockHash::from_canonical_string("a");
        let b = BlockHash::from_canonical_string("b");
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_32_hex_chars() {
        let h = BlockHash::from_canonical_string("whatever");
        assert_eq!(h.to_string().len(), 32);
        assert!(h.to_string().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn short_is_7_chars() {
        let h = BlockHash::from_canonical_string("whatever");
        assert_eq!(h.short().len(), 7);
    }

    #[test]
    fn genesis_parent_is_not_a_plausible_content_hash() {
        let h = BlockHash::from_canonical_string("height=1|parent=ff|t=0|txns=[]");
        assert_ne!(h, BlockHash::GENESIS_PARENT);
    }
}
