use chainstate::NodeKind;
use petgraph::dot::{Config, Dot};
use petgraph::graph::DiGraph;
use std::collections::HashMap;
use std::path::Path;

/// Spec §7: one CSV and one DOT file per node, written under
/// `[simulation].output_dir`. Mirrors the teacher's pattern of small,
/// single-purpose writer functions rather than a generic "reporter" trait.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("could not create output directory {0}: {1}")]
    CreateDir(String, std::io::Error),
    #[error("could not write {0}: {1}")]
    Csv(String, csv::Error),
    #[error("could not write {0}: {1}")]
    Dot(String, std::io::Error),
}

pub fn write_all(output_dir: &str, nodes: &[NodeKind]) -> Result<(), OutputError> {
    let dir = Path::new(output_dir);
    std::fs::create_dir_all(dir).map_err(|e| OutputError::CreateDir(output_dir.to_string(), e))?;
    for node in nodes {
        write_csv(dir, node)?;
        write_dot(dir, node)?;
    }
    Ok(())
}

fn write_csv(dir: &Path, node: &NodeKind) -> Result<(), OutputError> {
    let path = dir.join(format!("node_{}.csv", node.id().index()));
    let mut writer =
        csv::Writer::from_path(&path).map_err(|e| OutputError::Csv(path.display().to_string(), e))?;
    writer
        .write_record(["block_hash", "height", "mine_time", "included_transactions", "prev_hash"])
        .map_err(|e| OutputError::Csv(path.display().to_string(), e))?;
    for block in node.core().block_registry.values() {
        let mine_time = block.mine_time.map(|t| t.seconds().to_string()).unwrap_or_default();
        writer
            .write_record([
                block.hash.to_string(),
                block.height.to_string(),
                mine_time,
                block.txns.len().to_string(),
                block.prev_hash.to_string(),
            ])
            .map_err(|e| OutputError::Csv(path.display().to_string(), e))?;
    }
    writer.flush().map_err(|e| OutputError::Csv(path.display().to_string(), csv::Error::from(e)))
}

fn write_dot(dir: &Path, node: &NodeKind) -> Result<(), OutputError> {
    let path = dir.join(format!("node_{}.dot", node.id().index()));
    let core = node.core();

    let mut graph = DiGraph::<String, ()>::new();
    let mut indices = HashMap::new();
    for block in core.block_registry.values() {
        let label = format!("{}:{}", block.height, block.hash.short());
        indices.insert(block.hash, graph.add_node(label));
    }
    for block in core.block_registry.values() {
        if let Some(&parent) = indices.get(&block.prev_hash) {
            graph.add_edge(parent, indices[&block.hash], ());
        }
    }

    let dot = Dot::with_config(&graph, &[Config::EdgeNoLabel]);
    std::fs::write(&path, format!("{dot:?}")).map_err(|e| OutputError::Dot(path.display().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainstate::{Block, HonestNode, NodeCore, NodeKind};
    use common::NodeId;

    #[test]
    fn writes_a_csv_and_dot_file_per_node() {
        let genesis = Block::genesis(vec![]);
        let core = NodeCore::new(NodeId(0), false, false, genesis);
        let nodes = vec![NodeKind::Honest(HonestNode::new(core))];

        let dir = tempfile::tempdir().unwrap();
        write_all(dir.path().to_str().unwrap(), &nodes).unwrap();

        assert!(dir.path().join("node_0.csv").exists());
        assert!(dir.path().join("node_0.dot").exists());
        let csv_contents = std::fs::read_to_string(dir.path().join("node_0.csv")).unwrap();
        assert!(csv_contents.starts_with("block_hash,height,mine_time,included_transactions,prev_hash"));
        let dot_contents = std::fs::read_to_string(dir.path().join("node_0.dot")).unwrap();
        assert!(dot_contents.contains("digraph"));
    }
}
