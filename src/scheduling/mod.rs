pub mod builder;
pub mod dot;
pub mod graph;
pub mod list;
pub mod machine;
pub mod priority;

pub use builder::{build_graph, GraphBuilder};
pub use graph::{DepGraph, DepNode, Edge, EdgeKind, NodeId, NodeState};
pub use list::{schedule, Schedule};
pub use machine::{Bundle, Slot};
pub use priority::calculate_priorities;

use crate::iloc::Operation;

/// Builds, prioritizes and schedules one renamed block.
pub fn schedule_block(block: &[Operation]) -> (DepGraph<'_>, Schedule<'_>) {
    let mut graph = build_graph(block);
    calculate_priorities(&mut graph);
    let schedule = schedule(&mut graph);
    (graph, schedule)
}

#[cfg(test)]
pub(crate) fn renamed_block(src: &str) -> Vec<Operation> {
    let mut ops = crate::parser::parse_source(src, "test.i").unwrap();
    crate::rename::rename(&mut ops);
    ops
}
