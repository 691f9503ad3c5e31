use chainstate::NodeKind;
use network::config::{MiningConfig, NetworkConfig, NodeConfig, SimConfig, SimulationConfig, TransactionConfig};
use network::Simulator;

fn config_with_strong_adversary() -> SimConfig {
    SimConfig {
        simulation: SimulationConfig {
            total_nodes: 5,
            execution_time: 800,
            percent_slow_nodes: 0.0,
            percent_low_cpu_nodes: 0.0,
            output_dir: "out".into(),
            debug: false,
            initial_balance: 1000.0,
        },
        node: NodeConfig {
            min_neighbors: 2,
            max_neighbors: 3,
            adversary_one_mining_power: 90.0,
            adversary_two_mining_power: 0.0,
        },
        transaction: TransactionConfig { size: 500, mean_interarrival_time_sec: 5 },
        network: NetworkConfig {
            min_light_prop_delay: 0.01,
            max_light_prop_delay: 0.1,
            slow_node_link_speed: 100.0,
            fast_node_link_speed: 1000.0,
            queuing_delay_constant: 96.0,
        },
        mining: MiningConfig { mean_mining_time_sec: 10, mining_reward: 50.0, max_txn_in_block: 5 },
    }
}

/// Spec §8 S5: a dominant adversary withholds blocks and releases them
/// later than they were mined, and ends up with a disproportionate share
/// of the final longest chain.
#[test]
fn s5_dominant_adversary_withholds_and_releases_blocks() {
    let config = config_with_strong_adversary();
    let mut sim = Simulator::new(&config, 11).unwrap();
    sim.run();

    let mut saw_delayed_release = false;
    let mut adversary_blocks_on_chain = 0usize;
    let mut total_blocks_on_chain = 0usize;

    for node in sim.nodes() {
        if let NodeKind::Adversary(adv) = node {
            for block in adv.core.block_registry.values() {
                if let (Some(mine), Some(release)) = (block.mine_time, block.release_time) {
                    if release.seconds() > mine.seconds() {
                        saw_delayed_release = true;
                    }
                }
            }

            // Walk the adversary's own final chain back to genesis, tallying
            // how many blocks on it were mined by this adversary (coinbase
            // receiver == adversary id) versus the chain length overall.
            let mut cursor = adv.core.tip_hash;
            loop {
                let block = &adv.core.block_registry[&cursor];
                total_blocks_on_chain += 1;
                if block.coinbase().receiver == adv.core.id {
                    adversary_blocks_on_chain += 1;
                }
                if block.height == 0 {
                    break;
                }
                cursor = block.prev_hash;
            }
            break; // one dominant adversary is enough to check this property
        }
    }

    assert!(saw_delayed_release, "expected at least one block released after it was mined");
    assert!(total_blocks_on_chain > 1, "expected the run to have produced more than just genesis");
    // With 90% hashing power the adversary should dominate its own final
    // chain, though not necessarily every single block on it.
    let adversary_share = adversary_blocks_on_chain as f64 / total_blocks_on_chain as f64;
    assert!(adversary_share > 0.4, "adversary share was only {adversary_share}");
}
