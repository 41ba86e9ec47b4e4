use crate::iloc::{Operation, VirtualReg};

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// True dependency through the given virtual register.
    Data(VirtualReg),
    /// Program order between side effects.
    Serial,
    /// A load or output that may observe an earlier store.
    Conflict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub target: NodeId,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeState {
    Waiting,
    Ready,
    Active,
    Finished,
}

#[derive(Debug, Clone)]
pub struct DepNode<'a> {
    pub op: &'a Operation,
    /// Nodes that must be satisfied before this one issues.
    pub(crate) children: Vec<Edge>,
    /// Nodes depending on this one.
    pub(crate) parents: Vec<NodeId>,
    pub latency: usize,
    pub priority: usize,
    pub state: NodeState,
}

impl<'a> DepNode<'a> {
    pub fn new(op: &'a Operation) -> Self {
        Self {
            op,
            children: vec![],
            parents: vec![],
            latency: 0,
            priority: 0,
            state: NodeState::Waiting,
        }
    }

    pub fn children(&self) -> &[Edge] {
        &self.children
    }

    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    pub fn edge_to(&self, child: NodeId) -> Option<EdgeKind> {
        self.children
            .iter()
            .find(|edge| edge.target == child)
            .map(|edge| edge.kind)
    }

    pub fn has_child(&self, child: NodeId) -> bool {
        self.edge_to(child).is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.state == NodeState::Finished
    }
}

/// Dependency graph of one block. Nodes live in an arena indexed by program position; edges only
/// ever point from a later operation to an earlier one.
#[derive(Debug, Clone, Default)]
pub struct DepGraph<'a> {
    pub(crate) nodes: Vec<DepNode<'a>>,
    /// All node ids; program order until priorities are assigned, descending priority after.
    pub(crate) order: Vec<NodeId>,
    /// Nodes without children.
    pub(crate) sources: Vec<NodeId>,
    /// Nodes without parents.
    pub(crate) sinks: Vec<NodeId>,
}

impl<'a> DepGraph<'a> {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &DepNode<'a> {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[DepNode<'a>] {
        &self.nodes
    }

    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn sources(&self) -> &[NodeId] {
        &self.sources
    }

    pub fn sinks(&self) -> &[NodeId] {
        &self.sinks
    }

    pub fn edges(&self) -> impl Iterator<Item = (NodeId, Edge)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .flat_map(|(id, node)| node.children.iter().map(move |edge| (id, *edge)))
    }

    /// Ready/finished flags are the only scheduling state that survives a run, clear them so the
    /// graph can be scheduled again.
    pub fn reset_states(&mut self) {
        for node in self.nodes.iter_mut() {
            node.state = NodeState::Waiting;
        }
    }
}
