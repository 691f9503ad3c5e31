use common::{NodeId, VirtualTime};

/// Uniquely identifies a transaction by the node that created it and a
/// per-node monotonic counter; unlike a coordinated global counter this
/// needs no synchronisation between the independently-minting nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxnId(pub NodeId, pub u64);

/// An immutable payment record. A coinbase transaction has `sender == None`
/// and encodes a mining reward rather than a transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TxnId,
    pub timestamp: VirtualTime,
    pub sender: Option<NodeId>,
    pub receiver: NodeId,
    pub amount: f64,
}

impl Transaction {
    pub fn new(
        id: TxnId,
        timestamp: VirtualTime,
        sender: Option<NodeId>,
        receiver: NodeId,
        amount: f64,
    ) -> Self {
        Transaction { id, timestamp, sender, receiver, amount }
    }

    pub fn is_coinbase(&self) -> bool {
        self.sender.is_none()
    }

    /// Canonical string fragment folded into a block's content hash. Stable
    /// given the fields above; transactions are never re-serialised once
    /// hashed into a block.
    pub fn canonical_fragment(&self) -> String {
        format!(
            "{:?}:{:?}->{}:{}:{}",
            self.id,
            self.sender,
            self.receiver,
            self.amount,
            self.timestamp.seconds()
        )
    }
}
