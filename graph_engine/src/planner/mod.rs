//! Learning Path Planner - recommended orderings of knowledge nodes.
//!
//! Two plans are offered:
//! 1. **Basic path**: every node, easiest first, earlier units breaking ties
//! 2. **Path from a start node**: nodes reachable from the start in order of
//!    cheapest learning cost, followed by everything unreachable
//!
//! Both return node ids; the subgraph engine renders them as a chain.

mod costs;

pub use costs::*;

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use course_model::{KnowledgeNode, NodeHandle, Relationship};
use tracing::{debug, warn};

use crate::store::GraphStore;

/// Heap entry ordered so that `BinaryHeap` pops the lowest cost first,
/// then the lowest handle.
#[derive(Debug, PartialEq, Eq)]
struct QueueEntry {
    cost: u64,
    node: NodeHandle,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Plans learning paths over a loaded store.
pub struct LearningPathPlanner<'a> {
    store: &'a GraphStore,
}

impl<'a> LearningPathPlanner<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    /// All node ids ordered by difficulty, then chapter rank.
    /// Ties keep store order.
    pub fn basic_path(&self) -> Vec<String> {
        let mut nodes: Vec<&KnowledgeNode> = self.store.nodes().collect();
        nodes.sort_by_key(|node| self.basic_key(node));

        debug!(nodes = nodes.len(), "basic learning path planned");
        nodes.into_iter().map(|node| node.id.clone()).collect()
    }

    /// Cost of learning `target` after its source along `relationship`.
    ///
    /// A prerequisite edge costs 1; any other edge costs the target's difficulty.
    pub fn edge_cost(relationship: &Relationship, target: &KnowledgeNode) -> u64 {
        if relationship.is_prerequisite() {
            1
        } else {
            u64::from(target.difficulty)
        }
    }

    /// Cheapest learning cost from `start` to every node.
    ///
    /// # Algorithm
    ///
    /// 1. All costs start unreached except `start` at 0
    /// 2. Pop the cheapest unvisited node and mark it visited
    /// 3. For each outgoing edge to a known, unvisited target, relax the
    ///    target with `cost + edge_cost`
    /// 4. Repeat until the queue is empty
    pub fn shortest_costs(&self, start: NodeHandle) -> PathCosts {
        let mut costs = PathCosts::new(self.store.node_count());
        let mut queue = BinaryHeap::new();

        costs.set_start(start);
        queue.push(QueueEntry { cost: 0, node: start });

        while let Some(QueueEntry { cost, node }) = queue.pop() {
            if costs.is_visited(node) {
                continue;
            }
            costs.mark_visited(node);

            for relationship in &self.store.node_at(node).relationships {
                let Some(target) = self.store.node_handle(&relationship.target_id) else {
                    continue;
                };
                if costs.is_visited(target) {
                    continue;
                }

                let next = cost + Self::edge_cost(relationship, self.store.node_at(target));
                if costs.relax(target, next, node) {
                    queue.push(QueueEntry { cost: next, node: target });
                }
            }
        }

        costs
    }

    /// Learning path starting at `start_id`.
    ///
    /// The start comes first. Every other reachable node follows in order of
    /// ascending cost, then ascending id; each contributes its predecessor
    /// chain, skipping ids already placed. Unreachable nodes come last in
    /// basic-path order. Every node id appears exactly once.
    ///
    /// An unknown start yields an empty path.
    pub fn path_from_node(&self, start_id: &str) -> Vec<String> {
        let Some(start) = self.store.node_handle(start_id) else {
            warn!(start_id, "learning path start node not found");
            return Vec::new();
        };

        let costs = self.shortest_costs(start);
        let mut placed = HashSet::new();
        let mut path = Vec::with_capacity(self.store.node_count());

        placed.insert(start);
        path.push(start);

        let mut reached: Vec<(NodeHandle, u64)> =
            costs.reached().filter(|(node, _)| *node != start).collect();
        reached.sort_by(|(a, a_cost), (b, b_cost)| {
            a_cost
                .cmp(b_cost)
                .then_with(|| self.store.node_at(*a).id.cmp(&self.store.node_at(*b).id))
        });

        for (node, _) in reached {
            for step in costs.chain(node) {
                if placed.insert(step) {
                    path.push(step);
                }
            }
        }

        let mut unreachable: Vec<(NodeHandle, &KnowledgeNode)> = self
            .store
            .node_entries()
            .filter(|(handle, _)| costs.cost(*handle).is_none())
            .collect();
        unreachable.sort_by_key(|(_, node)| self.basic_key(node));
        path.extend(unreachable.into_iter().map(|(handle, _)| handle));

        debug!(
            start_id,
            reachable = costs.reached_count(),
            nodes = path.len(),
            "learning path planned"
        );

        path.into_iter()
            .map(|handle| self.store.node_at(handle).id.clone())
            .collect()
    }

    fn basic_key(&self, node: &KnowledgeNode) -> (u32, u32) {
        (node.difficulty, self.store.chapter_rank(node))
    }
}
