use crate::iloc::Opcode;
use crate::scheduling::graph::{DepGraph, EdgeKind, NodeId};
use crate::scheduling::machine;
use crate::utils::NodeSet;
use std::cmp::Reverse;

/// Weight of the edge from `consumer` to one of its children. Ordering edges cost one cycle, a
/// data edge costs the consumer's own latency.
pub fn edge_weight(consumer: Opcode, kind: EdgeKind) -> usize {
    match kind {
        EdgeKind::Serial | EdgeKind::Conflict => 1,
        EdgeKind::Data(_) => machine::latency(consumer),
    }
}

/// Longest weighted path from each node up to the farthest sink depending on it.
///
/// Relies on the arena being in program order: every edge points from a later node to an earlier
/// one, so walking the arena backwards settles every parent before its children. Reordering the
/// arena breaks this.
pub fn compute_latencies(graph: &mut DepGraph) {
    for id in (0..graph.len()).rev() {
        let node = &graph.nodes[id];
        let latency = node
            .parents
            .iter()
            .map(|parent| {
                let parent = &graph.nodes[*parent];
                let kind = parent.edge_to(id).unwrap_or(EdgeKind::Serial);
                parent.latency + edge_weight(parent.op.opcode, kind)
            })
            .max()
            .unwrap_or(0);
        graph.nodes[id].latency = latency;
    }
}

/// Number of distinct nodes each node transitively depends on, itself excluded.
///
/// Keeps one reachability bitset per node, so memory grows with the square of the block length
/// (about 600 MB for a 100k operation chain). Like the latency pass it relies on children
/// preceding their parents in the arena.
pub fn count_descendants(graph: &DepGraph) -> Vec<usize> {
    let mut reach: Vec<NodeSet> = Vec::with_capacity(graph.len());

    for node in graph.nodes.iter() {
        let mut below = NodeSet::new();
        for edge in node.children.iter() {
            below.insert(edge.target);
            below.union_with(&reach[edge.target]);
        }
        reach.push(below);
    }

    reach.iter().map(NodeSet::len).collect()
}

/// Assigns latency and priority to every node and re-sorts the node, source and sink lists by
/// descending priority. Equal priorities keep program order.
pub fn calculate_priorities(graph: &mut DepGraph) {
    compute_latencies(graph);
    let descendants = count_descendants(graph);

    for (node, descendants) in graph.nodes.iter_mut().zip(descendants) {
        node.priority = 10 * node.latency + descendants;
    }

    let nodes = &graph.nodes;
    let rank = |id: &NodeId| (Reverse(nodes[*id].priority), nodes[*id].op.line);
    graph.order.sort_by_key(rank);
    graph.sources.sort_by_key(rank);
    graph.sinks.sort_by_key(rank);

    if let (Some(first), Some(last)) = (graph.order.first(), graph.order.last()) {
        log::debug!(
            "priorities range from {} (line {}) down to {} (line {})",
            nodes[*first].priority,
            nodes[*first].op.line,
            nodes[*last].priority,
            nodes[*last].op.line
        );
    }
}
