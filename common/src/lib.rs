//! Primitives shared by every crate in the simulator: node identifiers,
//! block content hashes and the virtual-time value type.

mod block_hash;
mod delay;
mod node_id;
mod rounding;
mod time;

pub use block_hash::BlockHash;
pub use delay::DelayModel;
pub use node_id::NodeId;
pub use rounding::round4;
pub use time::VirtualTime;
