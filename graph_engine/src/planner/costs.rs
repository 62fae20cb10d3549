//! Per-node state of a shortest-path run.

use course_model::NodeHandle;

/// Tentative costs, predecessors and visited flags, indexed by node handle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathCosts {
    /// `None` means unreached (infinite cost).
    costs: Vec<Option<u64>>,
    previous: Vec<Option<NodeHandle>>,
    visited: Vec<bool>,
}

impl PathCosts {
    /// Create state for `node_count` nodes, all unreached.
    pub fn new(node_count: usize) -> Self {
        Self {
            costs: vec![None; node_count],
            previous: vec![None; node_count],
            visited: vec![false; node_count],
        }
    }

    /// Mark `start` as the source (cost 0).
    pub fn set_start(&mut self, start: NodeHandle) {
        self.costs[start.index()] = Some(0);
    }

    /// Best known cost of a node, `None` when unreached.
    pub fn cost(&self, node: NodeHandle) -> Option<u64> {
        self.costs.get(node.index()).copied().flatten()
    }

    /// Predecessor of a node on its cheapest known path.
    pub fn previous(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.previous.get(node.index()).copied().flatten()
    }

    pub fn is_visited(&self, node: NodeHandle) -> bool {
        self.visited.get(node.index()).copied().unwrap_or(false)
    }

    pub fn mark_visited(&mut self, node: NodeHandle) {
        self.visited[node.index()] = true;
    }

    /// Record `cost` for `target` via `via` if it beats the current cost.
    /// Returns whether the cost improved.
    pub fn relax(&mut self, target: NodeHandle, cost: u64, via: NodeHandle) -> bool {
        let slot = &mut self.costs[target.index()];
        if slot.map_or(true, |current| cost < current) {
            *slot = Some(cost);
            self.previous[target.index()] = Some(via);
            true
        } else {
            false
        }
    }

    /// Nodes with a finite cost, in handle order.
    pub fn reached(&self) -> impl Iterator<Item = (NodeHandle, u64)> + '_ {
        self.costs
            .iter()
            .enumerate()
            .filter_map(|(i, cost)| cost.map(|cost| (NodeHandle(i), cost)))
    }

    /// Get the number of nodes with a finite cost.
    pub fn reached_count(&self) -> usize {
        self.costs.iter().filter(|cost| cost.is_some()).count()
    }

    /// Predecessor chain of `node`, from the start to `node` inclusive.
    pub fn chain(&self, node: NodeHandle) -> Vec<NodeHandle> {
        let mut chain = vec![node];
        let mut current = node;
        while let Some(previous) = self.previous(current) {
            // Predecessors form a tree; the bound only guards corrupt state.
            if chain.len() > self.costs.len() {
                break;
            }
            chain.push(previous);
            current = previous;
        }
        chain.reverse();
        chain
    }
}
