use crate::block::Block;
use crate::context::Ctx;
use crate::error::Error;
use crate::mining;
use crate::node::core::NodeCore;
use crate::payload::EventPayload;
use crate::reception::{self, AcceptOutcome};
use common::{BlockHash, NodeId};
use logging::log;
use scheduler::EventKind;
use std::collections::VecDeque;

/// Selfish-mining variant (spec §4.6). Withholds mined blocks in
/// `private_chain` and releases them as a function of its lead over the
/// public tip (`core.tip_hash` doubles as `l_v_c_hash` here).
#[derive(Debug, Clone)]
pub struct AdversaryNode {
    pub core: NodeCore,
    pub private_chain: VecDeque<BlockHash>,
    pub last_adversary_block_mined_hash: Option<BlockHash>,
}

impl AdversaryNode {
    pub fn new(core: NodeCore) -> Self {
        AdversaryNode { core, private_chain: VecDeque::new(), last_adversary_block_mined_hash: None }
    }

    pub fn block_create(&mut self, ctx: &mut Ctx, mining_reward: f64) {
        let parent = self.last_adversary_block_mined_hash.unwrap_or(self.core.tip_hash);
        let block = mining::assemble_block(&mut self.core, ctx, parent, mining_reward);
        mining::schedule_mining(&mut self.core, ctx, block);
    }

    /// Spec §4.6 `blk_mine`: stale check identical to the honest node's,
    /// then either immediate publication (the 0'→1' transition) or
    /// withholding.
    pub fn on_blk_mine(&mut self, ctx: &mut Ctx, block: Block, mining_reward: f64) {
        if self.core.block_hash_being_mined != Some(block.hash) {
            log::debug!("adversary {} dropping stale mined block {}", self.core.id, block.hash.short());
            return;
        }

        let mut block = block;
        block.mine_time = Some(ctx.now);
        let hash = block.hash;
        let height = block.height;
        self.core.remove_included_txns(&block);
        self.core.block_registry.insert(hash, block.clone());
        self.core.block_hash_being_mined = None;

        let had_private_block = self.last_adversary_block_mined_hash.is_some();
        let public_height = match self.core.height_of(self.core.tip_hash) {
            Ok(height) => height,
            Err(e) => {
                log::error!("adversary {}: {e}", self.core.id);
                self.last_adversary_block_mined_hash = Some(hash);
                self.block_create(ctx, mining_reward);
                return;
            }
        };
        let lead_prime = height as i64 - public_height as i64;

        if lead_prime == 1 && had_private_block {
            log::info!("adversary {} publishing block {} immediately", self.core.id, hash.short());
            self.release_block(ctx, hash);
        } else {
            log::debug!("adversary {} withholding block {}", self.core.id, hash.short());
            self.private_chain.push_back(hash);
        }

        self.last_adversary_block_mined_hash = Some(hash);
        self.block_create(ctx, mining_reward);
    }

    /// Spec §4.6 `blk_recv`: shared acceptance logic, then lead-based
    /// release policy instead of the honest node's unconditional
    /// rebroadcast.
    pub fn on_blk_recv(
        &mut self,
        ctx: &mut Ctx,
        block: Block,
        from: NodeId,
        mining_reward: f64,
        max_txn_in_block: usize,
    ) {
        let outcome = reception::try_accept(&mut self.core, block.clone(), from, mining_reward, max_txn_in_block);
        if let AcceptOutcome::Accepted { tip_changed } = outcome {
            self.finish_accept(ctx, block.hash, tip_changed, mining_reward, max_txn_in_block);
        }
    }

    fn reprocess(&mut self, ctx: &mut Ctx, block: Block, mining_reward: f64, max_txn_in_block: usize) {
        let outcome =
            reception::try_accept_reprocessed(&mut self.core, block.clone(), mining_reward, max_txn_in_block);
        if let AcceptOutcome::Accepted { tip_changed } = outcome {
            self.finish_accept(ctx, block.hash, tip_changed, mining_reward, max_txn_in_block);
        }
    }

    /// Spec §4.6 "after updating l_v_c_hash, evaluate lead": the lead
    /// recomputation, release policy and mining retarget only apply when
    /// this block actually moved the tip. A same-or-lower-height fork block
    /// still gets buffered children reprocessed, but must not spuriously
    /// re-release a private block or restart mining (original source:
    /// `node_adversary.py` returns immediately when `block.height <=
    /// last_block.height`).
    fn finish_accept(
        &mut self,
        ctx: &mut Ctx,
        hash: BlockHash,
        tip_changed: bool,
        mining_reward: f64,
        max_txn_in_block: usize,
    ) {
        for pending in reception::take_pending_children(&mut self.core, hash) {
            self.reprocess(ctx, pending, mining_reward, max_txn_in_block);
        }

        if !tip_changed {
            return;
        }

        let lead = match self.last_adversary_block_mined_hash {
            Some(tip) => match (self.core.height_of(tip), self.core.height_of(self.core.tip_hash)) {
                (Ok(private_height), Ok(public_height)) => private_height as i64 - public_height as i64,
                (Err(e), _) | (_, Err(e)) => {
                    log::error!("adversary {}: {e}", self.core.id);
                    0
                }
            },
            None => 0,
        };

        if lead <= 0 {
            self.last_adversary_block_mined_hash = None;
            self.private_chain.clear();
        } else if lead == 1 || lead == 2 {
            self.release_all(ctx);
        } else {
            self.release_one(ctx);
        }

        self.core.block_hash_being_mined = None;
        self.block_create(ctx, mining_reward);
    }

    fn release_one(&mut self, ctx: &mut Ctx) {
        if let Some(hash) = self.private_chain.pop_front() {
            self.release_block(ctx, hash);
        }
    }

    fn release_all(&mut self, ctx: &mut Ctx) {
        while let Some(hash) = self.private_chain.pop_front() {
            self.release_block(ctx, hash);
        }
    }

    fn release_block(&mut self, ctx: &mut Ctx, hash: BlockHash) {
        let block = match self.core.block_registry.get_mut(&hash) {
            Some(block) => {
                block.release_time = Some(ctx.now);
                block.clone()
            }
            None => {
                log::error!("adversary {}: {}", self.core.id, Error::MissingParent(hash));
                return;
            }
        };
        self.core.tip_hash = hash;
        self.broadcast(ctx, &block);
    }

    fn broadcast(&self, ctx: &mut Ctx, block: &Block) {
        for &neighbor in &self.core.neighbors {
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
