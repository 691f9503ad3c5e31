use crate::block::Block;
use crate::transaction::Transaction;

/// The data a scheduled event carries: either a transaction or a block.
/// `txn_create`/`blk_mine` self-events carry no payload (`None`).
#[derive(Debug, Clone)]
pub enum EventPayload {
    Txn(Transaction),
    Block(Block),
}

pub type SimEvent = scheduler::Event<EventPayload>;
pub type EventQueue = scheduler::EventQueue<EventPayload>;
