use crate::block::Block;
use crate::error::Error;
use crate::transaction::{Transaction, TxnId};
use common::{round4, BlockHash, NodeId};
use indexmap::IndexMap;
use logging::log;
use std::collections::{HashMap, HashSet};

/// State shared by every node regardless of whether it behaves honestly or
/// selfishly: spec §3 "Per-node state", minus the two adversary-only
/// fields (`private_chain`, `last_adversary_block_mined_hash`), which live
/// on `AdversaryNode` instead.
#[derive(Debug, Clone)]
pub struct NodeCore {
    pub id: NodeId,
    pub is_slow: bool,
    pub is_low_cpu: bool,
    pub hashing_power: f64,
    pub neighbors: Vec<NodeId>,
    pub block_registry: HashMap<BlockHash, Block>,
    /// Iteration order matters: block assembly scans the pool in the order
    /// transactions were inserted (spec §4.4 step 4).
    pub txn_pool: IndexMap<TxnId, Transaction>,
    pub txn_registry: HashSet<TxnId>,
    pub pending_blocks: HashMap<BlockHash, Block>,
    pub block_hash_being_mined: Option<BlockHash>,
    /// `longest_leaf_hash` for an honest node, `l_v_c_hash` for an
    /// adversary — same field, named generically since the bookkeeping is
    /// identical (spec §4.6: "tracking l_v_c_hash in place of
    /// longest_leaf_hash").
    pub tip_hash: BlockHash,
    txn_counter: u64,
}

impl NodeCore {
    pub fn new(id: NodeId, is_slow: bool, is_low_cpu: bool, genesis: Block) -> Self {
        let tip_hash = genesis.hash;
        let mut block_registry = HashMap::new();
        block_registry.insert(tip_hash, genesis);
        NodeCore {
            id,
            is_slow,
            is_low_cpu,
            hashing_power: 0.0,
            neighbors: Vec::new(),
            block_registry,
            txn_pool: IndexMap::new(),
            txn_registry: HashSet::new(),
            pending_blocks: HashMap::new(),
            block_hash_being_mined: None,
            tip_hash,
            txn_counter: 0,
        }
    }

    pub fn next_txn_id(&mut self) -> TxnId {
        let id = TxnId(self.id, self.txn_counter);
        self.txn_counter += 1;
        id
    }

    pub fn height_of(&self, hash: BlockHash) -> Result<u64, Error> {
        self.block_registry.get(&hash).map(|b| b.height).ok_or(Error::MissingParent(hash))
    }

    pub fn tip(&self) -> Result<&Block, Error> {
        self.block_registry.get(&self.tip_hash).ok_or(Error::MissingParent(self.tip_hash))
    }

    /// Balances over the branch from `tip` back to genesis, inclusive of
    /// every transaction (coinbase credits included) — spec §4.3
    /// `get_balances`.
    pub fn get_balances(&self, tip: BlockHash) -> Result<HashMap<NodeId, f64>, Error> {
        let mut balances: HashMap<NodeId, f64> = HashMap::new();
        let mut cursor = tip;
        loop {
            let block = self.block_registry.get(&cursor).ok_or(Error::MissingParent(cursor))?;
            for txn in &block.txns {
                if let Some(sender) = txn.sender {
                    *balances.entry(sender).or_insert(0.0) -= txn.amount;
                }
                *balances.entry(txn.receiver).or_insert(0.0) += txn.amount;
            }
            if block.height == 0 {
                break;
            }
            cursor = block.prev_hash;
        }
        Ok(balances)
    }

    /// The balance visible to the transaction generator: chain balance at
    /// the current tip, plus unconfirmed pool transactions, clamped at
    /// zero (spec §4.3 `get_amount`). `tip_hash` is always registered by
    /// construction; a missing tip is logged and treated as an empty
    /// ledger rather than propagated (spec §7: handlers never abort).
    pub fn get_amount(&self) -> f64 {
        let mut balances = match self.get_balances(self.tip_hash) {
            Ok(balances) => balances,
            Err(e) => {
                log::error!("node {}: {e}", self.id);
                HashMap::new()
            }
        };
        for txn in self.txn_pool.values() {
            if let Some(sender) = txn.sender {
                *balances.entry(sender).or_insert(0.0) -= txn.amount;
            }
            *balances.entry(txn.receiver).or_insert(0.0) += txn.amount;
        }
        round4(balances.get(&self.id).copied().unwrap_or(0.0)).max(0.0)
    }

    /// Walks both branches back from `old_tip` and `new_parent` in
    /// lock-step until they meet, restoring the abandoned branch's
    /// transactions to the pool and removing the adopted branch's from it
    /// (spec §4.5 step 6 / §4.6 re-org bookkeeping — identical for both
    /// node variants).
    pub fn reorg_pool(&mut self, old_tip: BlockHash, new_parent: BlockHash) {
        let mut old_branch = old_tip;
        let mut new_branch = new_parent;
        let mut old_height = self.block_registry[&old_branch].height;
        let mut new_height = self.block_registry[&new_branch].height;

        // Equalise heights first, walking only the longer branch.
        while old_height > new_height {
            let old_block = &self.block_registry[&old_branch];
            for txn in old_block.txns.iter().skip(1) {
                self.txn_pool.insert(txn.id, txn.clone());
            }
            old_branch = old_block.prev_hash;
            old_height -= 1;
        }
        while new_height > old_height {
            let new_block = &self.block_registry[&new_branch];
            for txn in new_block.txns.iter().skip(1) {
                self.txn_pool.shift_remove(&txn.id);
            }
            new_branch = new_block.prev_hash;
            new_height -= 1;
        }

        // Now walk both in lock-step until the ancestor coincides.
        while old_branch != new_branch {
            let old_block = &self.block_registry[&old_branch];
            let new_block = &self.block_registry[&new_branch];
            for txn in old_block.txns.iter().skip(1) {
                self.txn_pool.insert(txn.id, txn.clone());
            }
            for txn in new_block.txns.iter().skip(1) {
                self.txn_pool.shift_remove(&txn.id);
            }
            old_branch = old_block.prev_hash;
            new_branch = new_block.prev_hash;
        }
    }

    pub fn remove_included_txns(&mut self, block: &Block) {
        for txn in block.txns.iter().skip(1) {
            self.txn_pool.shift_remove(&txn.id);
        }
    }
}
