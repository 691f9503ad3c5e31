use crate::transaction::Transaction;
use common::{BlockHash, VirtualTime};
use itertools::Itertools;

/// A height-stamped, parent-linked container of transactions. `txns[0]` is
/// always the block's coinbase (spec invariant 4). `hash` is the truncated
/// SHA-256 of a canonical encoding of `(height, prev_hash, creation_time,
/// txns)`; `mine_time` is set once the block is actually mined, `release_time`
/// only ever gets set on blocks an adversary withheld and later released.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub hash: BlockHash,
    pub prev_hash: BlockHash,
    pub height: u64,
    pub creation_time: VirtualTime,
    pub txns: Vec<Transaction>,
    pub mine_time: Option<VirtualTime>,
    pub release_time: Option<VirtualTime>,
}

impl Block {
    /// Builds a block and computes its content hash. `txns[0]` must already
    /// be the coinbase; callers (block assembly, genesis construction) are
    /// responsible for that ordering.
    pub fn new(
        prev_hash: BlockHash,
        height: u64,
        creation_time: VirtualTime,
        txns: Vec<Transaction>,
    ) -> Self {
        let hash = Self::content_hash(prev_hash, height, creation_time, &txns);
        Block { hash, prev_hash, height, creation_time, txns, mine_time: None, release_time: None }
    }

    pub fn content_hash(
        prev_hash: BlockHash,
        height: u64,
        creation_time: VirtualTime,
        txns: &[Transaction],
    ) -> BlockHash {
        let txns_fragment = txns.iter().map(Transaction::canonical_fragment).join(";");
        let canonical = format!(
            "height={height}|parent={prev_hash}|t={}|txns=[{txns_fragment}]",
            creation_time.seconds()
        );
        BlockHash::from_canonical_string(&canonical)
    }

    /// Recomputes the hash from the block's current fields and compares it
    /// against the stored one (spec §4.7 step 2).
    pub fn recomputed_hash_matches(&self) -> bool {
        Self::content_hash(self.prev_hash, self.height, self.creation_time, &self.txns) == self.hash
    }

    pub fn coinbase(&self) -> &Transaction {
        &self.txns[0]
    }

    /// Genesis carries one coinbase-shaped credit per node, seeding the
    /// starting balance every honest `get_balances` traversal builds on.
    /// The distilled spec is silent on a starting balance; this supplements
    /// it from the original implementation's `Block.balance = [1000]*n`.
    pub fn genesis(initial_credits: Vec<Transaction>) -> Self {
        Block::new(BlockHash::GENESIS_PARENT, 0, VirtualTime::ZERO, initial_credits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TxnId;
    use common::NodeId;

    fn coinbase(node: usize) -> Transaction {
        Transaction::new(TxnId(NodeId(node), 0), VirtualTime::ZERO, None, NodeId(node), 50.0)
    }

    #[test]
    fn hash_is_deterministic() {
        let a = Block::new(BlockHash::GENESIS_PARENT, 1, VirtualTime(1.0), vec![coinbase(0)]);
        let b = Block::new(BlockHash::GENESIS_PARENT, 1, VirtualTime(1.0), vec![coinbase(0)]);
        assert_eq!(a.hash, b.hash);
        assert!(a.recomputed_hash_matches());
    }

    #[test]
    fn different_height_changes_hash() {
        let a = Block::new(BlockHash::GENESIS_PARENT, 1, VirtualTime(1.0), vec![coinbase(0)]);
        let b = Block::new(BlockHash::GENESIS_PARENT, 2, VirtualTime(1.0), vec![coinbase(0)]);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn tampering_with_txns_is_detected() {
        let mut b = Block::new(BlockHash::GENESIS_PARENT, 1, VirtualTime(1.0), vec![coinbase(0)]);
        b.txns[0].amount = 999.0;
        assert!(!b.recomputed_hash_matches());
    }
}
