use crate::iloc::{Opcode, Operation, VirtualReg};
use crate::scheduling::graph::{DepGraph, DepNode, Edge, EdgeKind, NodeId};
use ahash::AHashMap;

/// Forward pass over one block collecting dependency edges. The memory trackers only live as long
/// as the builder.
#[derive(Debug, Default)]
pub struct GraphBuilder<'a> {
    nodes: Vec<DepNode<'a>>,
    definers: AHashMap<VirtualReg, NodeId>,
    last_store: Option<NodeId>,
    last_output: Option<NodeId>,
    prior_loads_and_outputs: Vec<NodeId>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an edge unless `from` already depends on `to` through any kind of edge.
    fn add_edge(&mut self, from: NodeId, to: NodeId, kind: EdgeKind) -> bool {
        debug_assert!(to < from, "Edge {} -> {} points forward", from, to);
        if self.nodes[from].has_child(to) {
            return false;
        }
        log::trace!(
            "edge {} -> {} ({:?})",
            self.nodes[from].op.line,
            self.nodes[to].op.line,
            kind
        );
        self.nodes[from].children.push(Edge { target: to, kind });
        self.nodes[to].parents.push(from);
        true
    }

    pub fn push(&mut self, op: &'a Operation) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(DepNode::new(op));

        for vr in op.defined_vrs() {
            self.definers.insert(vr, id);
        }

        for vr in op.used_vrs() {
            // Values without a definer come from outside the block.
            if let Some(definer) = self.definers.get(&vr).copied() {
                if definer != id {
                    self.add_edge(id, definer, EdgeKind::Data(vr));
                }
            }
        }

        let opcode = op.opcode;

        if matches!(opcode, Opcode::Load | Opcode::Output) {
            if let Some(store) = self.last_store {
                self.add_edge(id, store, EdgeKind::Conflict);
            }
        }

        if opcode == Opcode::Output {
            if let Some(output) = self.last_output {
                self.add_edge(id, output, EdgeKind::Serial);
            }
        }

        if opcode == Opcode::Store {
            if let Some(store) = self.last_store {
                self.add_edge(id, store, EdgeKind::Serial);
            }
            for idx in 0..self.prior_loads_and_outputs.len() {
                let prior = self.prior_loads_and_outputs[idx];
                self.add_edge(id, prior, EdgeKind::Serial);
            }
        }

        match opcode {
            Opcode::Store => self.last_store = Some(id),
            Opcode::Output => {
                self.last_output = Some(id);
                self.prior_loads_and_outputs.push(id);
            }
            Opcode::Load => self.prior_loads_and_outputs.push(id),
            _ => {}
        }

        id
    }

    pub fn finish(self) -> DepGraph<'a> {
        let nodes = self.nodes;
        let order = (0..nodes.len()).collect();
        let sources: Vec<_> = (0..nodes.len())
            .filter(|id| nodes[*id].children.is_empty())
            .collect();
        let sinks: Vec<_> = (0..nodes.len())
            .filter(|id| nodes[*id].parents.is_empty())
            .collect();

        log::debug!(
            "dependency graph: {} nodes, {} edges, {} sources, {} sinks",
            nodes.len(),
            nodes.iter().map(|n| n.children.len()).sum::<usize>(),
            sources.len(),
            sinks.len()
        );

        DepGraph {
            nodes,
            order,
            sources,
            sinks,
        }
    }
}

pub fn build_graph(block: &[Operation]) -> DepGraph<'_> {
    let mut builder = GraphBuilder::new();
    for op in block {
        builder.push(op);
    }
    builder.finish()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scheduling::renamed_block as block;

    fn kinds(graph: &DepGraph, id: NodeId) -> Vec<(NodeId, EdgeKind)> {
        graph
            .node(id)
            .children()
            .iter()
            .map(|edge| (edge.target, edge.kind))
            .collect()
    }

    fn reaches_itself(graph: &DepGraph, start: NodeId) -> bool {
        let mut stack: Vec<NodeId> = graph.node(start).children().iter().map(|e| e.target).collect();
        let mut seen = vec![false; graph.len()];
        while let Some(id) = stack.pop() {
            if id == start {
                return true;
            }
            if !std::mem::replace(&mut seen[id], true) {
                stack.extend(graph.node(id).children().iter().map(|e| e.target));
            }
        }
        false
    }

    #[test]
    fn test_empty() {
        let graph = build_graph(&[]);

        assert!(graph.is_empty());
        assert!(graph.sources().is_empty());
        assert!(graph.sinks().is_empty());
    }

    #[test]
    fn test_single_operation() {
        let ops = block("loadI 5 => r1\n");
        let graph = build_graph(&ops);

        assert_eq!(graph.sources(), &[0]);
        assert_eq!(graph.sinks(), &[0]);
    }

    #[test]
    fn test_data_edges() {
        let ops = block("loadI 5 => r1\nloadI 10 => r2\nadd r1, r2 => r3\n");
        let graph = build_graph(&ops);

        let add = kinds(&graph, 2);
        assert_eq!(add.len(), 2);
        assert!(add.iter().all(|(_, kind)| matches!(kind, EdgeKind::Data(_))));
        assert_eq!(graph.sources(), &[0, 1]);
        assert_eq!(graph.sinks(), &[2]);
        assert_eq!(graph.node(0).parents(), &[2]);
    }

    #[test]
    fn test_data_edge_labels_register() {
        let ops = block("loadI 5 => r1\nadd r1, r1 => r2\n");
        let graph = build_graph(&ops);

        let vr = ops[0].operands[2].vr.unwrap();
        // Both reads of r1 collapse into one edge.
        assert_eq!(kinds(&graph, 1), vec![(0, EdgeKind::Data(vr))]);
    }

    #[test]
    fn test_store_store_serial() {
        let ops = block("store r1 => r2\nstore r3 => r4\n");
        let graph = build_graph(&ops);

        assert_eq!(kinds(&graph, 1), vec![(0, EdgeKind::Serial)]);
    }

    #[test]
    fn test_load_after_store_conflict() {
        let ops = block("store r1 => r2\nload r3 => r4\n");
        let graph = build_graph(&ops);

        assert_eq!(kinds(&graph, 1), vec![(0, EdgeKind::Conflict)]);
        assert_eq!(graph.sources(), &[0]);
        assert_eq!(graph.sinks(), &[1]);
    }

    #[test]
    fn test_output_output_serial() {
        let ops = block("output 100\noutput 200\n");
        let graph = build_graph(&ops);

        assert_eq!(kinds(&graph, 1), vec![(0, EdgeKind::Serial)]);
    }

    #[test]
    fn test_output_after_store() {
        let ops = block("output 1\nstore r1 => r2\noutput 2\n");
        let graph = build_graph(&ops);

        assert_eq!(kinds(&graph, 1), vec![(0, EdgeKind::Serial)]);
        assert_eq!(
            kinds(&graph, 2),
            vec![(1, EdgeKind::Conflict), (0, EdgeKind::Serial)]
        );
    }

    #[test]
    fn test_store_orders_after_every_prior_load() {
        let ops = block("load r1 => r2\nstore r3 => r4\nload r5 => r6\noutput 0\nstore r7 => r8\n");
        let graph = build_graph(&ops);

        let last_store = kinds(&graph, 4);
        assert_eq!(last_store[0], (1, EdgeKind::Serial));
        let targets: Vec<_> = last_store.iter().map(|(target, _)| *target).collect();
        assert_eq!(targets, vec![1, 0, 2, 3]);
        assert!(last_store.iter().all(|(_, kind)| *kind == EdgeKind::Serial));
    }

    #[test]
    fn test_load_reading_store_address() {
        // Both read r2 but nothing in the block defines it, so only the conflict orders them.
        let ops = block("loadI 5 => r1\nstore r1 => r2\nload r2 => r3\n");
        let graph = build_graph(&ops);

        let load = kinds(&graph, 2);
        assert_eq!(load, vec![(1, EdgeKind::Conflict)]);
        assert_eq!(graph.sinks(), &[2]);
    }

    #[test]
    fn test_no_duplicate_edges() {
        let ops = block("loadI 0 => r1\nload r1 => r2\nstore r2 => r1\n");
        let graph = build_graph(&ops);

        // The store reads r2 (defined by the load) and must follow the load; one edge covers both.
        let store = kinds(&graph, 2);
        let to_load = store.iter().filter(|(target, _)| *target == 1).count();
        assert_eq!(to_load, 1);
        assert!(matches!(graph.node(2).edge_to(1), Some(EdgeKind::Data(_))));
    }

    #[test]
    fn test_independent_loads() {
        let ops = block("loadI 1 => r1\nloadI 2 => r2\nloadI 3 => r3\n");
        let graph = build_graph(&ops);

        assert_eq!(graph.sources().len(), 3);
        assert_eq!(graph.sinks().len(), 3);
    }

    #[test]
    fn test_diamond() {
        let ops = block("loadI 5 => r1\nadd r1, r1 => r2\nadd r1, r1 => r3\nadd r2, r3 => r4\n");
        let graph = build_graph(&ops);

        assert_eq!(graph.sources(), &[0]);
        assert_eq!(graph.sinks(), &[3]);
        assert_eq!(graph.node(0).parents(), &[1, 2]);
    }

    #[test]
    fn test_structural_invariants() {
        let ops = block(
            "loadI 4 => r1\nload r1 => r2\nmult r2, r2 => r3\nstore r3 => r1\noutput 4\nload r1 => r4\nadd r4, r3 => r5\nstore r5 => r1\noutput 4\nnop\n",
        );
        let graph = build_graph(&ops);

        for id in graph.sources() {
            assert!(graph.node(*id).children().is_empty());
        }
        for id in graph.sinks() {
            assert!(graph.node(*id).parents().is_empty());
        }
        for (from, edge) in graph.edges() {
            assert!(edge.target < from);
            assert!(graph.node(edge.target).parents().contains(&from));
        }
        for id in 0..graph.len() {
            assert!(!reaches_itself(&graph, id));
        }
    }
}
