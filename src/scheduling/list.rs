use crate::iloc::Opcode;
use crate::scheduling::graph::{DepGraph, EdgeKind, NodeId, NodeState};
use crate::scheduling::machine::{self, Bundle};
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReadyEntry {
    priority: usize,
    line: usize,
    node: NodeId,
}

impl Ord for ReadyEntry {
    /// Greater means issued first: highest priority, then earliest source line.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority
            .cmp(&other.priority)
            .then(other.line.cmp(&self.line))
            .then(other.node.cmp(&self.node))
    }
}

impl PartialOrd for ReadyEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Schedule<'a> {
    pub bundles: Vec<Bundle<'a>>,
    /// 1-based cycle each node issued in, indexed by node id.
    pub issue_cycle: Vec<Option<usize>>,
}

impl<'a> Schedule<'a> {
    pub fn cycles(&self) -> usize {
        self.bundles.len()
    }
}

struct ListScheduler<'g, 'a> {
    graph: &'g mut DepGraph<'a>,
    ready: BinaryHeap<ReadyEntry>,
    /// Ready `nop`s. They never compete for a slot, so they stay out of the heap.
    ready_nops: Vec<NodeId>,
    /// Issued nodes with the cycle their result becomes available.
    active: Vec<(NodeId, usize)>,
    cycle: usize,
    schedule: Schedule<'a>,
}

impl<'g, 'a> ListScheduler<'g, 'a> {
    fn new(graph: &'g mut DepGraph<'a>) -> Self {
        graph.reset_states();
        let issue_cycle = vec![None; graph.len()];
        let mut scheduler = Self {
            graph,
            ready: BinaryHeap::new(),
            ready_nops: vec![],
            active: vec![],
            cycle: 1,
            schedule: Schedule {
                bundles: vec![],
                issue_cycle,
            },
        };
        let sources = scheduler.graph.sources.clone();
        for id in sources {
            scheduler.make_ready(id);
        }
        scheduler
    }

    fn make_ready(&mut self, id: NodeId) {
        let node = &mut self.graph.nodes[id];
        node.state = NodeState::Ready;
        if node.op.opcode == Opcode::Nop {
            self.ready_nops.push(id);
            return;
        }
        self.ready.push(ReadyEntry {
            priority: node.priority,
            line: node.op.line,
            node: id,
        });
    }

    fn dependencies_satisfied(&self, id: NodeId) -> bool {
        self.graph.nodes[id].children.iter().all(|edge| {
            let child = &self.graph.nodes[edge.target];
            child.is_finished() || (edge.kind == EdgeKind::Serial && child.state == NodeState::Active)
        })
    }

    fn issue(&mut self, id: NodeId, finish: usize) {
        assert!(
            self.dependencies_satisfied(id),
            "Line {} issued before its dependencies",
            self.graph.nodes[id].op.line
        );
        self.graph.nodes[id].state = NodeState::Active;
        self.active.push((id, finish));
        self.schedule.issue_cycle[id] = Some(self.cycle);
    }

    fn fill_bundle(&mut self) -> Bundle<'a> {
        let mut bundle = Bundle::default();
        let mut deferred = vec![];

        // Takes a cycle but no issue slot.
        for id in std::mem::take(&mut self.ready_nops) {
            self.issue(id, self.cycle + 1);
        }

        while !bundle.is_full() {
            let Some(entry) = self.ready.pop() else {
                break;
            };
            let op = self.graph.nodes[entry.node].op;
            match bundle.place(op) {
                Some(slot) => {
                    log::trace!("cycle {}: line {} on {}", self.cycle, op.line, slot);
                    self.issue(entry.node, self.cycle + machine::latency(op.opcode));
                }
                None => deferred.push(entry),
            }
        }

        self.ready.extend(deferred);
        bundle
    }

    fn retire(&mut self) {
        let next = self.cycle + 1;
        let (done, active): (Vec<_>, Vec<_>) = std::mem::take(&mut self.active)
            .into_iter()
            .partition(|(_, finish)| *finish <= next);
        self.active = active;

        for (id, _) in done.iter() {
            self.graph.nodes[*id].state = NodeState::Finished;
        }
        for (id, _) in done.iter() {
            let parents = self.graph.nodes[*id].parents.clone();
            for parent in parents {
                if self.graph.nodes[parent].state == NodeState::Waiting
                    && self.graph.nodes[parent]
                        .children
                        .iter()
                        .all(|edge| self.graph.nodes[edge.target].is_finished())
                {
                    self.make_ready(parent);
                }
            }
        }
    }

    /// A store only has to follow an earlier memory operation in issue order, so it may start
    /// while that operation is still in flight.
    fn release_early(&mut self) {
        let in_flight: Vec<NodeId> = self
            .active
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| self.graph.nodes[*id].op.opcode.is_memory())
            .collect();

        for id in in_flight {
            let parents = self.graph.nodes[id].parents.clone();
            for parent in parents {
                let node = &self.graph.nodes[parent];
                if node.state != NodeState::Waiting || node.edge_to(id) != Some(EdgeKind::Serial) {
                    continue;
                }
                let rest_finished = node
                    .children
                    .iter()
                    .filter(|edge| edge.target != id)
                    .all(|edge| self.graph.nodes[edge.target].is_finished());
                if rest_finished {
                    log::trace!(
                        "cycle {}: line {} released early behind line {}",
                        self.cycle,
                        node.op.line,
                        self.graph.nodes[id].op.line
                    );
                    self.make_ready(parent);
                }
            }
        }
    }

    fn run(mut self) -> Schedule<'a> {
        while !self.ready.is_empty() || !self.ready_nops.is_empty() || !self.active.is_empty() {
            let bundle = self.fill_bundle();
            log::debug!("cycle {}: {}", self.cycle, bundle);
            self.schedule.bundles.push(bundle);

            self.retire();
            self.release_early();
            self.cycle += 1;
        }

        assert!(
            self.graph.nodes.iter().all(|node| node.is_finished()),
            "Scheduling ended with unfinished operations"
        );
        self.schedule
    }
}

/// Greedy cycle-by-cycle list scheduling of a prioritized graph. Node states are reset first, so a
/// graph may be scheduled repeatedly.
pub fn schedule<'a>(graph: &mut DepGraph<'a>) -> Schedule<'a> {
    let total = graph.len();
    let schedule = ListScheduler::new(graph).run();
    log::info!(
        "scheduled {} operations in {} cycles",
        total,
        schedule.cycles()
    );
    schedule
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scheduling::machine::Slot;
    use crate::scheduling::{renamed_block, schedule_block};

    fn entry(priority: usize, line: usize) -> ReadyEntry {
        ReadyEntry {
            priority,
            line,
            node: line,
        }
    }

    #[test]
    fn test_ready_order() {
        let mut heap = BinaryHeap::new();
        heap.extend([entry(3, 4), entry(7, 9), entry(7, 2), entry(1, 1)]);

        let lines: Vec<_> = std::iter::from_fn(|| heap.pop()).map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 9, 4, 1]);
    }

    #[test]
    fn test_dependent_add() {
        let ops = renamed_block("loadI 5 => r1\nloadI 10 => r2\nadd r1, r2 => r3\n");
        let (_, schedule) = schedule_block(&ops);

        assert_eq!(schedule.cycles(), 2);
        assert!(schedule.bundles[0].is_full());
        assert_eq!(schedule.issue_cycle, vec![Some(1), Some(1), Some(2)]);
        assert_eq!(schedule.bundles[1].get(Slot::F1).map(|op| op.line), Some(3));
    }

    #[test]
    fn test_load_waits_for_store() {
        let ops = renamed_block("store r1 => r2\nload r3 => r4\n");
        let (_, schedule) = schedule_block(&ops);

        assert_eq!(schedule.issue_cycle, vec![Some(1), Some(6)]);
        assert_eq!(schedule.cycles(), 10);
    }

    #[test]
    fn test_store_released_behind_load() {
        let ops = renamed_block("load r1 => r2\nstore r3 => r4\n");
        let (_, schedule) = schedule_block(&ops);

        assert_eq!(schedule.issue_cycle, vec![Some(1), Some(2)]);
        assert_eq!(schedule.cycles(), 6);
    }

    #[test]
    fn test_store_waits_for_load_data() {
        // The store reads the loaded value, so it has to wait the full latency.
        let ops = renamed_block("load r1 => r2\nstore r2 => r3\n");
        let (_, schedule) = schedule_block(&ops);

        assert_eq!(schedule.issue_cycle, vec![Some(1), Some(6)]);
    }

    #[test]
    fn test_mult_latency() {
        let ops = renamed_block("loadI 3 => r1\nmult r1, r1 => r2\nadd r2, r1 => r3\n");
        let (_, schedule) = schedule_block(&ops);

        assert_eq!(schedule.issue_cycle, vec![Some(1), Some(2), Some(5)]);
        assert_eq!(schedule.cycles(), 5);
    }

    #[test]
    fn test_outputs_one_per_cycle() {
        let ops = renamed_block("output 1\noutput 2\noutput 3\n");
        let (_, schedule) = schedule_block(&ops);

        assert_eq!(schedule.issue_cycle, vec![Some(1), Some(2), Some(3)]);
        assert!(schedule
            .bundles
            .iter()
            .all(|b| b.issued().filter(|op| op.opcode == Opcode::Output).count() <= 1));
    }

    #[test]
    fn test_nop_takes_no_slot() {
        let ops = renamed_block("nop\n");
        let (graph, schedule) = schedule_block(&ops);

        assert_eq!(schedule.cycles(), 1);
        assert!(schedule.bundles[0].is_empty());
        assert!(graph.node(0).is_finished());
    }

    #[test]
    fn test_nop_beside_two_operations() {
        let ops = renamed_block("loadI 1 => r1\nnop\nloadI 2 => r2\n");
        let (_, schedule) = schedule_block(&ops);

        assert_eq!(schedule.cycles(), 1);
        assert!(schedule.bundles[0].is_full());
    }

    #[test]
    fn test_trailing_nop_adds_no_cycle() {
        let ops = renamed_block("loadI 1 => r1\nloadI 2 => r2\nloadI 3 => r3\nloadI 4 => r4\nnop\n");
        let (graph, schedule) = schedule_block(&ops);

        assert_eq!(schedule.cycles(), 2);
        assert!(schedule.bundles.iter().all(|b| b.is_full()));
        assert_eq!(schedule.issue_cycle[4], Some(1));
        assert!(graph.node(4).is_finished());
    }

    #[test]
    fn test_reschedule_is_identical() {
        let ops = renamed_block(
            "loadI 8 => r1\nload r1 => r2\nmult r2, r2 => r3\nstore r3 => r1\noutput 8\nadd r2, r3 => r4\n",
        );
        let (mut graph, first) = schedule_block(&ops);
        let second = schedule(&mut graph);

        assert_eq!(first.bundles, second.bundles);
        assert_eq!(first.issue_cycle, second.issue_cycle);
    }
}
