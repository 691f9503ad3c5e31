//! Transactions, blocks and the per-node blockchain state machine: the
//! gossip, mining, validation and fork-choice logic shared by honest and
//! adversary nodes (components C1, C2, C5, C6).

mod block;
mod context;
mod error;
mod gossip;
mod mining;
mod node;
mod params;
mod payload;
mod reception;
mod transaction;
mod validation;

pub use block::Block;
pub use context::Ctx;
pub use error::Error;
pub use node::adversary::AdversaryNode;
pub use node::core::NodeCore;
pub use node::honest::HonestNode;
pub use node::NodeKind;
pub use params::NodeParams;
pub use payload::{EventPayload, EventQueue, SimEvent};
pub use transaction::{Transaction, TxnId};
pub use validation::is_block_valid;
