use crate::context::Ctx;
use crate::error::Error;
use crate::node::core::NodeCore;
use crate::payload::EventPayload;
use crate::transaction::Transaction;
use common::{round4, NodeId};
use logging::log;
use rand::Rng;
use scheduler::EventKind;

/// Schedules this node's next `txn_create` self-event (spec §4.3).
/// Identical for honest and adversary nodes.
pub fn schedule_next_txn_create(core: &NodeCore, ctx: &mut Ctx) {
    let interarrival = sample_exp(ctx.rng, ctx.params.mean_interarrival_time_sec);
    let time = ctx.now + interarrival;
    ctx.schedule(time, core.id, core.id, EventKind::TxnCreate, None);
}

/// Handles a `txn_create` self-event: pick a neighbor, mint a transaction
/// stamped with `now`, add it to the pool, broadcast it, and reschedule.
pub fn on_txn_create(core: &mut NodeCore, ctx: &mut Ctx) {
    if core.neighbors.is_empty() {
        log::warn!("node {}: {}, dropping generated transaction", core.id, Error::NoNeighbors);
        schedule_next_txn_create(core, ctx);
        return;
    }
    let receiver = loop {
        let candidate = core.neighbors[ctx.rng.gen_range(0..core.neighbors.len())];
        if candidate != core.id {
            break candidate;
        }
    };

    let self_balance = core.get_amount().max(0.0);
    let amount = round4(ctx.rng.gen_range(0.0..=self_balance.max(0.0)));
    let txn = Transaction::new(core.next_txn_id(), ctx.now, Some(core.id), receiver, amount);

    core.txn_pool.insert(txn.id, txn.clone());
    core.txn_registry.insert(txn.id);

    broadcast_txn(core, ctx, &txn, None);
    schedule_next_txn_create(core, ctx);
}

/// Handles a `txn_recv` event: de-duplicate against `txn_registry`, then
/// add and forward to every neighbor except the sender (spec §4.3).
pub fn on_txn_recv(core: &mut NodeCore, ctx: &mut Ctx, txn: Transaction, from: NodeId) {
    if core.txn_registry.contains(&txn.id) {
        return; // duplicate: dropped silently, spec §7
    }
    core.txn_pool.insert(txn.id, txn.clone());
    core.txn_registry.insert(txn.id);
    broadcast_txn(core, ctx, &txn, Some(from));
}

fn broadcast_txn(core: &NodeCore, ctx: &mut Ctx, txn: &Transaction, from: Option<NodeId>) {
    for &neighbor in &core.neighbors {
        if Some(neighbor) == from {
            continue;
        }
        let delay = ctx.delay_to(ctx.params.transaction_size, core.is_slow, neighbor);
        let time = txn.timestamp + delay;
        ctx.schedule(
            time,
            core.id,
            neighbor,
            EventKind::TxnRecv,
            Some(EventPayload::Txn(txn.clone())),
        );
    }
}

pub fn sample_exp(rng: &mut impl Rng, mean: f64) -> f64 {
    use rand_distr::{Distribution, Exp};
    Exp::new(1.0 / mean).expect("mean is always strictly positive").sample(rng)
}
