use crate::scheduling::graph::{DepGraph, EdgeKind};

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Renders the graph in Graphviz DOT. Nodes are keyed by arena index since identical operations
/// may appear more than once in a block.
pub fn to_dot(graph: &DepGraph) -> String {
    let mut out = String::new();
    out.push_str("digraph G {\n");
    out.push_str("    node [shape=box];\n");

    for (id, node) in graph.nodes().iter().enumerate() {
        let label = format!("{}: {}", node.op.line, node.op);
        out.push_str(&format!("    n{} [label=\"{}\"];\n", id, escape(&label)));
    }

    for (from, edge) in graph.edges() {
        let label = match edge.kind {
            EdgeKind::Data(vr) => format!("Data, r{}", vr),
            EdgeKind::Serial => "Serial".to_string(),
            EdgeKind::Conflict => "Conflict".to_string(),
        };
        out.push_str(&format!(
            "    n{} -> n{} [label=\"{}\"];\n",
            from, edge.target, label
        ));
    }

    out.push_str("}\n");
    out
}
