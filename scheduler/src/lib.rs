//! The discrete-event scheduler: a generic min-heap of timestamped events.
//!
//! `scheduler` knows nothing about transactions or blocks — the payload
//! type is a parameter, kept here purely generic so that `chainstate`
//! (which defines the payload) does not need to depend back on whatever
//! drives the event loop. This mirrors the "opaque handle, not a cyclic
//! reference" guidance for the node/simulator relationship.

mod event;
mod queue;

pub use event::{Event, EventKind};
pub use queue::{EventQueue, QueueError};
