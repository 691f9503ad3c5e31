use common::{NodeId, VirtualTime};
use std::cmp::Ordering;

/// The four kinds of event a node handler can receive, per spec §4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    TxnCreate,
    TxnRecv,
    BlkMine,
    BlkRecv,
}

/// A scheduled event. `seq` is the queue's monotonically increasing
/// insertion counter, used to break ties between events with an identical
/// timestamp so that runs are reproducible given a fixed seed (spec §4.1:
/// "ties are broken by insertion order").
#[derive(Debug, Clone)]
pub struct Event<P> {
    pub time: VirtualTime,
    pub seq: u64,
    pub sender: NodeId,
    pub receiver: NodeId,
    pub kind: EventKind,
    pub payload: Option<P>,
}

impl<P> Event<P> {
    pub fn new(
        time: VirtualTime,
        seq: u64,
        sender: NodeId,
        receiver: NodeId,
        kind: EventKind,
        payload: Option<P>,
    ) -> Self {
        Event { time, seq, sender, receiver, kind, payload }
    }
}

/// Ordering compares only `(time, seq)`; the payload carries no order of
/// its own and the comparison must not depend on it.
impl<P> PartialEq for Event<P> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}

impl<P> Eq for Event<P> {}

impl<P> PartialOrd for Event<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P> Ord for Event<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time.cmp(&other.time).then_with(|| self.seq.cmp(&other.seq))
    }
}
