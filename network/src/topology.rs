use common::NodeId;
use rand::Rng;
use std::collections::{HashSet, VecDeque};

/// A degenerate configuration (e.g. `min_neighbors` too close to
/// `total_nodes`) can make the degree/connectivity constraints of
/// [`build`] unsatisfiable by construction. The original implementation
/// retries unconditionally in that case and hangs; this crate caps the
/// retry budget and reports the failure instead (REDESIGN, see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    #[error("could not build a connected topology satisfying the degree bounds after {0} attempts")]
    TopologyUnreachable(u32),
}

const MAX_TOPOLOGY_ATTEMPTS: u32 = 10_000;

/// Spec §4.8.1: draw a target degree per node in `[min_neighbors,
/// max_neighbors]`, attach random available partners, and retry from
/// scratch until every node reaches its target and the graph is connected.
pub fn build(
    rng: &mut impl Rng,
    total_nodes: usize,
    min_neighbors: usize,
    max_neighbors: usize,
) -> Result<Vec<Vec<NodeId>>, SimError> {
    for _attempt in 0..MAX_TOPOLOGY_ATTEMPTS {
        if let Some(adjacency) = try_build_once(rng, total_nodes, min_neighbors, max_neighbors) {
            return Ok(adjacency);
        }
    }
    Err(SimError::TopologyUnreachable(MAX_TOPOLOGY_ATTEMPTS))
}

fn try_build_once(
    rng: &mut impl Rng,
    total_nodes: usize,
    min_neighbors: usize,
    max_neighbors: usize,
) -> Option<Vec<Vec<NodeId>>> {
    let targets: Vec<usize> = (0..total_nodes).map(|_| rng.gen_range(min_neighbors..=max_neighbors)).collect();
    let mut adjacency: Vec<HashSet<NodeId>> = vec![HashSet::new(); total_nodes];

    for i in 0..total_nodes {
        while adjacency[i].len() < targets[i] {
            let candidates: Vec<usize> = (0..total_nodes)
                .filter(|&j| j != i && !adjacency[i].contains(&NodeId(j)) && adjacency[j].len() < targets[j])
                .collect();
            if candidates.is_empty() {
                break;
            }
            let j = candidates[rng.gen_range(0..candidates.len())];
            adjacency[i].insert(NodeId(j));
            adjacency[j].insert(NodeId(i));
        }
    }

    if (0..total_nodes).any(|i| adjacency[i].len() < targets[i]) {
        return None;
    }
    if !is_connected(&adjacency) {
        return None;
    }

    Some(adjacency.into_iter().map(|set| set.into_iter().collect()).collect())
}

fn is_connected(adjacency: &[HashSet<NodeId>]) -> bool {
    if adjacency.is_empty() {
        return true;
    }
    let mut visited = vec![false; adjacency.len()];
    let mut queue = VecDeque::new();
    queue.push_back(0usize);
    visited[0] = true;
    let mut count = 1;
    while let Some(node) = queue.pop_front() {
        for neighbor in &adjacency[node] {
            if !visited[neighbor.index()] {
                visited[neighbor.index()] = true;
                count += 1;
                queue.push_back(neighbor.index());
            }
        }
    }
    count == adjacency.len()
}

/// Per-node slow/low-cpu flags, assigned independently per spec §4.8.2. The
/// last two node ids are always the two adversaries (fast, high-cpu).
pub struct Roles {
    pub is_slow: Vec<bool>,
    pub is_low_cpu: Vec<bool>,
    pub adversary_ids: (NodeId, NodeId),
}

pub fn assign_roles(
    rng: &mut impl Rng,
    total_nodes: usize,
    percent_slow_nodes: f64,
    percent_low_cpu_nodes: f64,
) -> Roles {
    let adversary_ids = (NodeId(total_nodes - 2), NodeId(total_nodes - 1));
    let mut is_slow = vec![false; total_nodes];
    let mut is_low_cpu = vec![false; total_nodes];
    for i in 0..total_nodes - 2 {
        is_slow[i] = rng.gen_range(0.0..=1.0) <= percent_slow_nodes / 100.0;
        is_low_cpu[i] = rng.gen_range(0.0..=1.0) <= percent_low_cpu_nodes / 100.0;
    }
    Roles { is_slow, is_low_cpu, adversary_ids }
}

/// Spec §4.8.3 hashing-power allocation. Returns one power per node,
/// indexed by `NodeId`.
pub fn allocate_hashing_power(
    total_nodes: usize,
    is_low_cpu: &[bool],
    adversary_ids: (NodeId, NodeId),
    adversary_one_power: f64,
    adversary_two_power: f64,
) -> Vec<f64> {
    let honest_power_total = 1.0 - (adversary_one_power + adversary_two_power) / 100.0;
    let honest_count = total_nodes - 2;
    let high_count = (0..honest_count).filter(|&i| !is_low_cpu[i]).count();
    let low_count = honest_count - high_count;

    let denom = (10 * high_count + low_count) as f64;
    let low = if denom > 0.0 { honest_power_total / denom } else { 0.0 };
    let high = 10.0 * low;

    let mut power = vec![0.0; total_nodes];
    for i in 0..honest_count {
        power[i] = if is_low_cpu[i] { low } else { high };
    }
    power[adversary_ids.0.index()] = adversary_one_power / 100.0;
    power[adversary_ids.1.index()] = adversary_two_power / 100.0;
    power
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn builds_a_connected_graph_respecting_degree_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let adjacency = build(&mut rng, 12, 3, 6).unwrap();
        assert_eq!(adjacency.len(), 12);
        for (i, neighbors) in adjacency.iter().enumerate() {
            assert!(neighbors.len() >= 3 && neighbors.len() <= 6, "node {i} has {} neighbors", neighbors.len());
            assert!(!neighbors.contains(&NodeId(i)));
        }
        let sets: Vec<HashSet<NodeId>> = adjacency.iter().map(|v| v.iter().copied().collect()).collect();
        assert!(is_connected(&sets));
    }

    #[test]
    fn degenerate_configuration_reports_unreachable() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = build(&mut rng, 3, 5, 5).unwrap_err();
        assert_eq!(err, SimError::TopologyUnreachable(MAX_TOPOLOGY_ATTEMPTS));
    }

    #[test]
    fn last_two_ids_are_always_the_adversaries() {
        let mut rng = StdRng::seed_from_u64(3);
        let roles = assign_roles(&mut rng, 10, 0.0, 0.0);
        assert_eq!(roles.adversary_ids, (NodeId(8), NodeId(9)));
    }

    #[test]
    fn hashing_power_sums_close_to_one() {
        let is_low_cpu = vec![false, true, false, true, false, false, false, false];
        let adversary_ids = (NodeId(6), NodeId(7));
        let power = allocate_hashing_power(8, &is_low_cpu, adversary_ids, 10.0, 10.0);
        let total: f64 = power.iter().sum();
        assert!((total - 1.0).abs() < 1e-9, "total was {total}");
    }

    #[test]
    fn high_cpu_power_is_ten_times_low_cpu() {
        let is_low_cpu = vec![false, true, false, true];
        let power = allocate_hashing_power(6, &is_low_cpu, (NodeId(4), NodeId(5)), 0.0, 0.0);
        assert!((power[0] - 10.0 * power[1]).abs() < 1e-9);
    }
}
