pub mod adversary;
pub mod core;
pub mod honest;

use crate::block::Block;
use crate::context::Ctx;
use crate::gossip;
use crate::transaction::Transaction;
use adversary::AdversaryNode;
use common::NodeId;
use core::NodeCore;
use honest::HonestNode;

/// Sum-type node representation (spec Design Notes §9): the simulator
/// dispatches on this tag instead of relying on inheritance or dynamic
/// dispatch between the honest and adversary behaviours.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Honest(HonestNode),
    Adversary(AdversaryNode),
}

impl NodeKind {
    pub fn id(&self) -> NodeId {
        self.core().id
    }

    pub fn core(&self) -> &NodeCore {
        match self {
            NodeKind::Honest(n) => &n.core,
            NodeKind::Adversary(n) => &n.core,
        }
    }

    pub fn core_mut(&mut self) -> &mut NodeCore {
        match self {
            NodeKind::Honest(n) => &mut n.core,
            NodeKind::Adversary(n) => &mut n.core,
        }
    }

    pub fn start_mining(&mut self, ctx: &mut Ctx, mining_reward: f64) {
        match self {
            NodeKind::Honest(n) => n.block_create(ctx, mining_reward),
            NodeKind::Adversary(n) => n.block_create(ctx, mining_reward),
        }
    }

    pub fn on_blk_mine(&mut self, ctx: &mut Ctx, block: Block, mining_reward: f64) {
        match self {
            NodeKind::Honest(n) => n.on_blk_mine(ctx, block, mining_reward),
            NodeKind::Adversary(n) => n.on_blk_mine(ctx, block, mining_reward),
        }
    }

    pub fn on_blk_recv(
        &mut self,
        ctx: &mut Ctx,
        block: Block,
        from: NodeId,
        mining_reward: f64,
        max_txn_in_block: usize,
    ) {
        match self {
            NodeKind::Honest(n) => n.on_blk_recv(ctx, block, from, mining_reward, max_txn_in_block),
            NodeKind::Adversary(n) => n.on_blk_recv(ctx, block, from, mining_reward, max_txn_in_block),
        }
    }

    /// Transaction gossip is identical for both node variants (spec §4.3),
    /// so it is implemented once against the shared `NodeCore` rather than
    /// duplicated per variant.
    pub fn on_txn_create(&mut self, ctx: &mut Ctx) {
        gossip::on_txn_create(self.core_mut(), ctx);
    }

    pub fn on_txn_recv(&mut self, ctx: &mut Ctx, txn: Transaction, from: NodeId) {
        gossip::on_txn_recv(self.core_mut(), ctx, txn, from);
    }

    pub fn schedule_first_txn_create(&mut self, ctx: &mut Ctx) {
        gossip::schedule_next_txn_create(self.core(), ctx);
    }
}
