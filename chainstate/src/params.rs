/// The subset of the run's configuration a node handler needs to assemble
/// and schedule blocks/transactions. Owned by `network::Simulator` and
/// handed to handlers by reference through `Ctx`, never by the node itself
/// (spec Design Notes: pass an explicit context rather than a cyclic
/// back-reference to the simulator).
#[derive(Debug, Clone, Copy)]
pub struct NodeParams {
    pub mean_interarrival_time_sec: f64,
    pub mean_mining_time_sec: f64,
    pub mining_reward: f64,
    pub max_txn_in_block: usize,
    pub transaction_size: usize,
}
