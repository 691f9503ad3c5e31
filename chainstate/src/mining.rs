use crate::block::Block;
use crate::context::Ctx;
use crate::gossip::sample_exp;
use crate::node::core::NodeCore;
use crate::payload::EventPayload;
use crate::transaction::Transaction;
use common::round4;
use logging::log;
use scheduler::EventKind;
use std::collections::HashMap;

/// Assembles a block on top of `parent` from `core.txn_pool`, per spec
/// §4.4 steps 2-5. Shared by both node variants — only the choice of
/// `parent` differs between honest mining (always the public tip) and the
/// adversary (its own private tip when one exists). `parent` is always a
/// hash the caller has already mined or accepted onto `core`, so the
/// lookups below are expected to succeed; a miss is logged rather than
/// panicking (spec §7).
pub fn assemble_block(core: &mut NodeCore, ctx: &Ctx, parent: common::BlockHash, mining_reward: f64) -> Block {
    let coinbase = Transaction::new(core.next_txn_id(), ctx.now, None, core.id, mining_reward);
    let mut balances = core.get_balances(parent).unwrap_or_else(|e| {
        log::error!("node {}: {e}", core.id);
        HashMap::new()
    });

    let mut included = Vec::new();
    for txn in core.txn_pool.values() {
        if included.len() + 1 >= ctx.params.max_txn_in_block {
            break;
        }
        let sender = match txn.sender {
            Some(s) => s,
            None => continue,
        };
        let sender_balance = round4(balances.get(&sender).copied().unwrap_or(0.0));
        if sender_balance >= round4(txn.amount) {
            *balances.entry(sender).or_insert(0.0) -= txn.amount;
            *balances.entry(txn.receiver).or_insert(0.0) += txn.amount;
            included.push(txn.clone());
        }
    }

    let mut txns = Vec::with_capacity(included.len() + 1);
    txns.push(coinbase);
    txns.extend(included);

    let height = core.height_of(parent).unwrap_or_else(|e| {
        log::error!("node {}: {e}", core.id);
        0
    }) + 1;
    Block::new(parent, height, ctx.now, txns)
}

/// Schedules the `blk_mine` self-event for a freshly assembled block and
/// records `block_hash_being_mined` so a later stale attempt can be
/// recognised and dropped (spec §4.4 steps 6-7).
pub fn schedule_mining(core: &mut NodeCore, ctx: &mut Ctx, block: Block) {
    core.block_hash_being_mined = Some(block.hash);
    let mining_delay = sample_exp(ctx.rng, ctx.params.mean_mining_time_sec / core.hashing_power);
    let time = ctx.now + mining_delay;
    ctx.schedule(time, core.id, core.id, EventKind::BlkMine, Some(EventPayload::Block(block)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::NodeParams;
    use crate::transaction::{Transaction, TxnId};
    use common::{NodeId, VirtualTime};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use scheduler::EventQueue as GenericEventQueue;

    struct Harness {
        params: NodeParams,
        delay_model: common::DelayModel,
        queue: GenericEventQueue<EventPayload>,
        rng: StdRng,
        neighbors: Vec<NodeId>,
        is_slow: Vec<bool>,
    }

    impl Harness {
        fn new(mining_reward: f64) -> Self {
            Harness {
                params: NodeParams {
                    mean_interarrival_time_sec: 5.0,
                    mean_mining_time_sec: 10.0,
                    mining_reward,
                    max_txn_in_block: 5,
                    transaction_size: 500,
                },
                delay_model: common::DelayModel::new(0.1, 100.0, 1000.0, 96.0),
                queue: GenericEventQueue::new(),
                rng: StdRng::seed_from_u64(1),
                neighbors: vec![NodeId(1)],
                is_slow: vec![false, false],
            }
        }

        fn ctx(&mut self, now: VirtualTime) -> Ctx<'_> {
            Ctx {
                now,
                neighbors: &self.neighbors,
                is_slow: &self.is_slow,
                params: &self.params,
                delay_model: &self.delay_model,
                queue: &mut self.queue,
                rng: &mut self.rng,
            }
        }
    }

    /// Spec §8 S6: with `mining_reward = 0` and every starting balance 0,
    /// no pool transaction can validate, so assembly includes only the
    /// coinbase regardless of how large the pool is.
    #[test]
    fn s6_zero_reward_and_zero_balances_yields_coinbase_only_block() {
        let genesis = Block::genesis(vec![]); // no credits: every balance starts at 0
        let mut core = NodeCore::new(NodeId(0), false, false, genesis);
        core.neighbors = vec![NodeId(1)];
        core.hashing_power = 0.5;
        for n in 0..3u64 {
            let txn = Transaction::new(TxnId(NodeId(1), n), VirtualTime::ZERO, Some(NodeId(1)), NodeId(2), 10.0);
            core.txn_pool.insert(txn.id, txn);
        }

        let mut h = Harness::new(0.0);
        let parent = core.tip_hash;
        let ctx = h.ctx(VirtualTime::ZERO);
        let block = assemble_block(&mut core, &ctx, parent, 0.0);
        assert_eq!(block.txns.len(), 1);
        assert!(block.txns[0].is_coinbase());
        assert_eq!(block.txns[0].amount, 0.0);
    }

    #[test]
    fn block_hash_being_mined_is_recorded_after_scheduling() {
        let genesis = Block::genesis(vec![Transaction::new(TxnId(NodeId(0), 0), VirtualTime::ZERO, None, NodeId(0), 0.0)]);
        let mut core = NodeCore::new(NodeId(0), false, false, genesis);
        core.hashing_power = 1.0;
        core.neighbors = vec![NodeId(1)];

        let mut h = Harness::new(50.0);
        let parent = core.tip_hash;
        let block = {
            let ctx = h.ctx(VirtualTime::ZERO);
            assemble_block(&mut core, &ctx, parent, 50.0)
        };
        let hash = block.hash;
        let mut ctx = h.ctx(VirtualTime::ZERO);
        schedule_mining(&mut core, &mut ctx, block);
        assert_eq!(core.block_hash_being_mined, Some(hash));
        assert_eq!(ctx.queue.len(), 1);
    }
}
