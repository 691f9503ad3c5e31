use crate::block::Block;
use common::{round4, NodeId};
use std::collections::HashMap;

/// Spec §4.7 `is_block_valid`. `parent_height` and `balances_at_parent` are
/// computed by the caller (from its own registry) since validation itself
/// must not reach back into node state beyond what it is handed.
pub fn is_block_valid(
    block: &Block,
    parent_height: u64,
    mut balances_at_parent: HashMap<NodeId, f64>,
    mining_reward: f64,
    max_txn_in_block: usize,
) -> bool {
    if parent_height + 1 != block.height {
        return false;
    }
    if !block.recomputed_hash_matches() {
        return false;
    }
    if block.txns.is_empty() || block.txns.len() > max_txn_in_block {
        return false;
    }
    if block.coinbase().amount > mining_reward {
        return false;
    }
    for txn in block.txns.iter().skip(1) {
        let sender = match txn.sender {
            Some(s) => s,
            None => return false, // only txns[0] may be a coinbase
        };
        let sender_balance = round4(balances_at_parent.get(&sender).copied().unwrap_or(0.0));
        if sender_balance < round4(txn.amount) {
            return false;
        }
        *balances_at_parent.entry(sender).or_insert(0.0) -= txn.amount;
        *balances_at_parent.entry(txn.receiver).or_insert(0.0) += txn.amount;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{Transaction, TxnId};
    use common::{BlockHash, VirtualTime};

    fn coinbase(node: usize, amount: f64) -> Transaction {
        Transaction::new(TxnId(NodeId(node), 0), VirtualTime::ZERO, None, NodeId(node), amount)
    }

    fn transfer(from: usize, to: usize, amount: f64, n: u64) -> Transaction {
        Transaction::new(TxnId(NodeId(from), n), VirtualTime::ZERO, Some(NodeId(from)), NodeId(to), amount)
    }

    #[test]
    fn rejects_height_mismatch() {
        let block = Block::new(BlockHash::GENESIS_PARENT, 5, VirtualTime(1.0), vec![coinbase(0, 10.0)]);
        assert!(!is_block_valid(&block, 0, HashMap::new(), 50.0, 10));
    }

    #[test]
    fn rejects_coinbase_over_reward() {
        let block = Block::new(BlockHash::GENESIS_PARENT, 1, VirtualTime(1.0), vec![coinbase(0, 100.0)]);
        assert!(!is_block_valid(&block, 0, HashMap::new(), 50.0, 10));
    }

    #[test]
    fn rejects_insufficient_balance() {
        let block = Block::new(
            BlockHash::GENESIS_PARENT,
            1,
            VirtualTime(1.0),
            vec![coinbase(0, 10.0), transfer(1, 2, 100.0, 0)],
        );
        let mut balances = HashMap::new();
        balances.insert(NodeId(1), 5.0);
        assert!(!is_block_valid(&block, 0, balances, 50.0, 10));
    }

    #[test]
    fn accepts_well_formed_block() {
        let block = Block::new(
            BlockHash::GENESIS_PARENT,
            1,
            VirtualTime(1.0),
            vec![coinbase(0, 10.0), transfer(1, 2, 5.0, 0)],
        );
        let mut balances = HashMap::new();
        balances.insert(NodeId(1), 5.0);
        assert!(is_block_valid(&block, 0, balances, 50.0, 10));
    }

    #[test]
    fn rejects_tampered_hash() {
        let mut block =
            Block::new(BlockHash::GENESIS_PARENT, 1, VirtualTime(1.0), vec![coinbase(0, 10.0)]);
        block.height = 2;
        assert!(!is_block_valid(&block, 0, HashMap::new(), 50.0, 10));
    }
}
