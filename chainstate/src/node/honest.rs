use crate::block::Block;
use crate::context::Ctx;
use crate::mining;
use crate::node::core::NodeCore;
use crate::payload::EventPayload;
use crate::reception::{self, AcceptOutcome};
use crate::transaction::Transaction;
use common::NodeId;
use logging::log;
use scheduler::EventKind;

/// A node that always mines on the longest chain it has seen and
/// re-broadcasts everything it accepts (spec §4.4-§4.5).
#[derive(Debug, Clone)]
pub struct HonestNode {
    pub core: NodeCore,
}

impl HonestNode {
    pub fn new(core: NodeCore) -> Self {
        HonestNode { core }
    }

    pub fn block_create(&mut self, ctx: &mut Ctx, mining_reward: f64) {
        let parent = self.core.tip_hash;
        let block = mining::assemble_block(&mut self.core, ctx, parent, mining_reward);
        mining::schedule_mining(&mut self.core, ctx, block);
    }

    /// Spec §4.4: cancellation rule, then registration and retargeting.
    pub fn on_blk_mine(&mut self, ctx: &mut Ctx, block: Block, mining_reward: f64) {
        let current_tip_height = match self.core.height_of(self.core.tip_hash) {
            Ok(height) => height,
            Err(e) => {
                log::error!("node {}: {e}", self.core.id);
                return;
            }
        };
        let is_stale = self.core.block_hash_being_mined != Some(block.hash) || block.height <= current_tip_height;
        if is_stale {
            log::debug!("node {} dropping stale mined block {}", self.core.id, block.hash.short());
            return;
        }

        let mut block = block;
        block.mine_time = Some(ctx.now);
        let hash = block.hash;
        log::info!(
            "node {} mined block {} at height {}",
            self.core.id,
            hash.short(),
            block.height
        );
        self.core.remove_included_txns(&block);
        self.core.block_registry.insert(hash, block.clone());
        self.core.tip_hash = hash;
        self.core.block_hash_being_mined = None;

        self.broadcast(ctx, &block, None);
        self.block_create(ctx, mining_reward);
    }

    /// Spec §4.5: the full honest block-reception pipeline for a block
    /// genuinely delivered by a neighbor.
    pub fn on_blk_recv(
        &mut self,
        ctx: &mut Ctx,
        block: Block,
        from: NodeId,
        mining_reward: f64,
        max_txn_in_block: usize,
    ) {
        let outcome = reception::try_accept(&mut self.core, block.clone(), from, mining_reward, max_txn_in_block);
        if let AcceptOutcome::Accepted { .. } = outcome {
            self.finish_accept(ctx, block, Some(from), mining_reward, max_txn_in_block);
        }
    }

    /// Re-processes a buffered pending block once its parent has arrived
    /// (spec §4.5 step 7). Bypasses the loop check and re-broadcasts to
    /// every neighbor, matching `blk_recv(pending, self)` in the spec.
    fn reprocess(&mut self, ctx: &mut Ctx, block: Block, mining_reward: f64, max_txn_in_block: usize) {
        let outcome =
            reception::try_accept_reprocessed(&mut self.core, block.clone(), mining_reward, max_txn_in_block);
        if let AcceptOutcome::Accepted { .. } = outcome {
            self.finish_accept(ctx, block, None, mining_reward, max_txn_in_block);
        }
    }

    fn finish_accept(
        &mut self,
        ctx: &mut Ctx,
        block: Block,
        from: Option<NodeId>,
        mining_reward: f64,
        max_txn_in_block: usize,
    ) {
        let hash = block.hash;
        for pending in reception::take_pending_children(&mut self.core, hash) {
            self.reprocess(ctx, pending, mining_reward, max_txn_in_block);
        }

        self.core.block_hash_being_mined = None;
        self.block_create(ctx, mining_reward);
        self.broadcast(ctx, &block, from);
    }

    fn broadcast(&self, ctx: &mut Ctx, block: &Block, from: Option<NodeId>) {
        for &neighbor in &self.core.neighbors {
            if Some(neighbor) == from {
                continue;
            }
            let size = block.txns.len() * ctx.params.transaction_size;
            let delay = ctx.delay_to(size, self.core.is_slow, neighbor);
            let time = ctx.now + delay;
            ctx.schedule(
                time,
                self.core.id,
                neighbor,
                EventKind::BlkRecv,
                Some(EventPayload::Block(block.clone())),
            );
        }
    }
}
