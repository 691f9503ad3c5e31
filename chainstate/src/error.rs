/// Programmer-error conditions inside the chain/validation logic. Per
/// spec §7 these never propagate out of an event handler at runtime — a
/// `Result`-returning helper that can hit one of these is only ever called
/// in a context the caller has already checked, so in a correct run these
/// are unreachable and only matter to `debug_assert!`-style callers and
/// tests that deliberately exercise malformed input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("block {0} references a parent not present in the registry")]
    MissingParent(common::BlockHash),
    #[error("node has no neighbors to broadcast to")]
    NoNeighbors,
}
