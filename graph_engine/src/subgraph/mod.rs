//! Subgraph Engine - visualization views derived from the store.
//!
//! Four views are produced:
//! 1. **Full graph**: every node and every edge, dangling targets included
//! 2. **Unit graph**: the nodes of one unit and the edges between them
//! 3. **Node graph**: a depth-bounded ego-network following edges both ways
//! 4. **Learning path**: an ordered id sequence rendered as a chain

mod payload;

pub use payload::*;

use payload::UniqueView;

use std::collections::HashSet;

use course_model::{NodeHandle, RelationType};
use tracing::{debug, warn};

use crate::store::{EdgeRef, GraphStore};

/// Description carried by every learning-path link.
pub const LEARNING_PATH_DESCRIPTION: &str = "Recommended learning path";

/// Builds visualization payloads from a loaded store.
pub struct SubgraphEngine<'a> {
    store: &'a GraphStore,
}

/// One pending expansion of the node-graph traversal.
struct Frame {
    node: NodeHandle,
    depth: i32,
    next_outgoing: usize,
    next_incoming: usize,
}

enum Step {
    Outgoing { edge: EdgeRef, target: NodeHandle, depth: i32 },
    Incoming { edge: EdgeRef, depth: i32 },
    Done,
}

impl<'a> SubgraphEngine<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    /// Every knowledge node and every relationship.
    ///
    /// Links whose target is not a known node are still emitted.
    pub fn full_graph(&self) -> GraphData {
        let markers = self.store.markers();
        let mut data = GraphData::new();

        for node in self.store.nodes() {
            data.add_node(Node::from_knowledge(node, markers));
            for relationship in &node.relationships {
                data.add_link(Link::from_relationship(&node.id, relationship));
            }
        }

        debug!(nodes = data.nodes.len(), links = data.links.len(), "full graph built");
        data
    }

    /// Nodes of one unit and the edges that stay inside it.
    pub fn unit_graph(&self, unit_id: &str) -> GraphData {
        let Some(unit) = self.store.unit(unit_id) else {
            warn!(unit_id, "unit not found");
            return GraphData::new();
        };

        let markers = self.store.markers();
        let mut data = GraphData::new();
        let mut seen = HashSet::new();
        let members: Vec<_> = unit
            .knowledge_nodes
            .iter()
            .filter(|handle| seen.insert(**handle))
            .map(|&handle| self.store.node_at(handle))
            .collect();
        let member_ids: HashSet<&str> = members.iter().map(|node| node.id.as_str()).collect();

        for node in &members {
            data.add_node(Node::from_knowledge(node, markers));
        }

        for node in &members {
            for relationship in &node.relationships {
                if member_ids.contains(relationship.target_id.as_str()) {
                    data.add_link(Link::from_relationship(&node.id, relationship));
                }
            }
        }

        debug!(unit_id, nodes = data.nodes.len(), links = data.links.len(), "unit graph built");
        data
    }

    /// Ego-network around `node_id`, following outgoing and incoming edges.
    ///
    /// # Algorithm
    ///
    /// `expand(node, depth)` returns at once when `depth <= 0` or the node was
    /// already visited. Otherwise it marks the node visited and emits it, then:
    /// 1. for each outgoing edge with a known target: emit the edge and the
    ///    target, then `expand(target, depth - 1)`
    /// 2. for each edge of another node into this one: emit the edge; if the
    ///    source is unvisited, emit it and `expand(source, depth - 1)`
    ///
    /// The recursion runs on an explicit stack of frames, visiting in the same
    /// order a recursive implementation would. Each node and edge is emitted
    /// once. A depth of zero or less yields an empty payload.
    ///
    /// Incoming edges come from the store's reverse index. Without it, step 2
    /// is a scan of every node's edge list, O(nodes × avg-edges) per expansion.
    pub fn node_graph(&self, node_id: &str, depth: i32) -> GraphData {
        let Some(start) = self.store.node_handle(node_id) else {
            warn!(node_id, "knowledge node not found");
            return GraphData::new();
        };

        let mut view = UniqueView::new(self.store);
        let mut visited = HashSet::new();
        let mut stack = Vec::new();

        Self::enter(start, depth, &mut visited, &mut view, &mut stack);

        loop {
            match self.next_step(&mut stack) {
                Step::Outgoing { edge, target, depth } => {
                    view.edge(edge);
                    view.node(target);
                    Self::enter(target, depth - 1, &mut visited, &mut view, &mut stack);
                }
                Step::Incoming { edge, depth } => {
                    view.edge(edge);
                    if !visited.contains(&edge.source) {
                        view.node(edge.source);
                        Self::enter(edge.source, depth - 1, &mut visited, &mut view, &mut stack);
                    }
                }
                Step::Done => break,
            }
        }

        let data = view.finish();
        debug!(node_id, depth, nodes = data.nodes.len(), links = data.links.len(), "node graph built");
        data
    }

    /// Start expanding `node` unless the depth is spent or it was visited.
    fn enter(
        node: NodeHandle,
        depth: i32,
        visited: &mut HashSet<NodeHandle>,
        view: &mut UniqueView<'_>,
        stack: &mut Vec<Frame>,
    ) {
        if depth <= 0 || !visited.insert(node) {
            return;
        }
        view.node(node);
        stack.push(Frame {
            node,
            depth,
            next_outgoing: 0,
            next_incoming: 0,
        });
    }

    /// Advance the top frame to its next edge, popping finished frames.
    fn next_step(&self, stack: &mut Vec<Frame>) -> Step {
        while let Some(frame) = stack.last_mut() {
            let node = self.store.node_at(frame.node);

            while frame.next_outgoing < node.relationships.len() {
                let index = frame.next_outgoing;
                frame.next_outgoing += 1;
                if let Some(target) = self.store.node_handle(&node.relationships[index].target_id) {
                    return Step::Outgoing {
                        edge: EdgeRef {
                            source: frame.node,
                            index,
                        },
                        target,
                        depth: frame.depth,
                    };
                }
            }

            if let Some(&edge) = self.store.incoming(frame.node).get(frame.next_incoming) {
                frame.next_incoming += 1;
                return Step::Incoming {
                    edge,
                    depth: frame.depth,
                };
            }

            stack.pop();
        }
        Step::Done
    }

    /// Render an ordered id sequence as a chain of `LEARNING_PATH` links.
    ///
    /// Unknown ids are skipped. A link joins positions `i` and `i + 1` only
    /// when both ids are known; a gap is not bridged.
    pub fn learning_path_graph(&self, node_ids: &[String]) -> GraphData {
        let markers = self.store.markers();
        let mut data = GraphData::new();

        for (i, node_id) in node_ids.iter().enumerate() {
            let Some(node) = self.store.node(node_id) else {
                continue;
            };
            data.add_node(Node::from_knowledge(node, markers));

            if let Some(next_id) = node_ids.get(i + 1) {
                if self.store.node(next_id).is_some() {
                    data.add_link(Link::new(
                        node_id.clone(),
                        next_id.clone(),
                        RelationType::LearningPath,
                        LEARNING_PATH_DESCRIPTION,
                    ));
                }
            }
        }

        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// a -> b -> c -> d and e -> a. Unit u1 holds a, b, e; u2 holds c, d.
    fn chain_store() -> GraphStore {
        GraphStore::from_source(
            r#"
CREATE (u:Unit {id: "u1", name: "U1", description: "d", order: 1})
CREATE (u:Unit {id: "u2", name: "U2", description: "d", order: 2})
CREATE (a:KnowledgeNode {id: "a", name: "A", type: "t", description: "d", difficulty: 1, chapter: "Unit 1"})
CREATE (b:KnowledgeNode {id: "b", name: "B", type: "t", description: "d", difficulty: 2, chapter: "Unit 1"})
CREATE (c:KnowledgeNode {id: "c", name: "C", type: "t", description: "d", difficulty: 3, chapter: "Unit 2"})
CREATE (d:KnowledgeNode {id: "d", name: "D", type: "t", description: "d", difficulty: 4, chapter: "Unit 2"})
CREATE (e:KnowledgeNode {id: "e", name: "E", type: "t", description: "d", difficulty: 1, chapter: "Unit 1"})
CREATE (x {id:'u1'})-[:CONTAINS]->(y {id:'a'})
CREATE (x {id:'u1'})-[:CONTAINS]->(y {id:'b'})
CREATE (x {id:'u1'})-[:CONTAINS]->(y {id:'e'})
CREATE (x {id:'u2'})-[:CONTAINS]->(y {id:'c'})
CREATE (x {id:'u2'})-[:CONTAINS]->(y {id:'d'})
CREATE (x {id:'a'})-[:PREREQUISITE]->(y {id:'b'})
CREATE (x {id:'b'})-[:PREREQUISITE]->(y {id:'c'})
CREATE (x {id:'c'})-[:RELATED]->(y {id:'d'})
CREATE (x {id:'e'})-[:RELATED]->(y {id:'a'})
"#,
        )
    }

    fn ids(data: &GraphData) -> Vec<&str> {
        data.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    fn pairs(data: &GraphData) -> Vec<(&str, &str)> {
        data.links
            .iter()
            .map(|l| (l.source.as_str(), l.target.as_str()))
            .collect()
    }

    #[test]
    fn test_full_graph_counts() {
        let store = chain_store();
        let data = SubgraphEngine::new(&store).full_graph();

        assert_eq!(data.nodes.len(), store.node_count());
        assert_eq!(data.links.len(), store.relationship_count());
    }

    #[test]
    fn test_unit_graph_keeps_internal_edges() {
        let store = chain_store();
        let data = SubgraphEngine::new(&store).unit_graph("u1");

        assert_eq!(ids(&data), vec!["a", "b", "e"]);
        // b -> c leaves the unit and is dropped.
        assert_eq!(pairs(&data), vec![("a", "b"), ("e", "a")]);
        for link in &data.links {
            assert!(data.has_node(&link.source) && data.has_node(&link.target));
        }
    }

    #[test]
    fn test_unknown_unit_is_empty() {
        let store = chain_store();
        assert!(SubgraphEngine::new(&store).unit_graph("nope").is_empty());
    }

    #[test]
    fn test_node_graph_depth_zero_is_empty() {
        let store = chain_store();
        let engine = SubgraphEngine::new(&store);

        assert!(engine.node_graph("a", 0).is_empty());
        assert!(engine.node_graph("a", -3).is_empty());
        assert!(engine.node_graph("missing", 0).is_empty());
    }

    #[test]
    fn test_node_graph_depth_one() {
        let store = chain_store();
        let data = SubgraphEngine::new(&store).node_graph("c", 1);

        // Outgoing c -> d, incoming b -> c.
        assert_eq!(ids(&data), vec!["c", "d", "b"]);
        assert_eq!(pairs(&data), vec![("c", "d"), ("b", "c")]);
    }

    #[test]
    fn test_node_graph_depth_two_follows_both_directions() {
        let store = chain_store();
        let data = SubgraphEngine::new(&store).node_graph("b", 2);

        // b expands c (-> d) and a (<- e).
        assert_eq!(ids(&data), vec!["b", "c", "d", "a", "e"]);
        assert_eq!(
            pairs(&data),
            vec![("b", "c"), ("c", "d"), ("a", "b"), ("e", "a")]
        );
    }

    #[test]
    fn test_node_graph_terminates_on_cycles() {
        let store = GraphStore::from_source(
            r#"
CREATE (a:KnowledgeNode {id: "a", name: "A", type: "t", description: "d", difficulty: 1, chapter: "Unit 1"})
CREATE (b:KnowledgeNode {id: "b", name: "B", type: "t", description: "d", difficulty: 1, chapter: "Unit 1"})
CREATE (x {id:'a'})-[:RELATED]->(y {id:'b'})
CREATE (x {id:'b'})-[:RELATED]->(y {id:'a'})
CREATE (x {id:'a'})-[:RELATED]->(y {id:'a'})
"#,
        );
        let data = SubgraphEngine::new(&store).node_graph("a", i32::MAX);

        assert_eq!(ids(&data), vec!["a", "b"]);
        assert_eq!(data.links.len(), 3);
    }

    #[test]
    fn test_node_graph_skips_dangling_targets() {
        let mut store = GraphStore::from_source(
            r#"CREATE (a:KnowledgeNode {id: "a", name: "A", type: "t", description: "d", difficulty: 1, chapter: "Unit 1"})"#,
        );
        if let Some(node) = store.node_mut("a") {
            node.add_relationship(course_model::Relationship::new("ghost", "RELATED", ""));
        }
        store.index_incoming();

        let engine = SubgraphEngine::new(&store);
        let data = engine.node_graph("a", 2);
        assert_eq!(ids(&data), vec!["a"]);
        assert!(data.links.is_empty());

        // The full graph still shows the dangling edge.
        assert_eq!(pairs(&engine.full_graph()), vec![("a", "ghost")]);
    }

    #[test]
    fn test_learning_path_graph_chain() {
        let store = chain_store();
        let path: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let data = SubgraphEngine::new(&store).learning_path_graph(&path);

        assert_eq!(ids(&data), vec!["a", "b", "c"]);
        assert_eq!(pairs(&data), vec![("a", "b"), ("b", "c")]);
        assert!(data
            .links
            .iter()
            .all(|l| l.link_type == RelationType::LearningPath
                && l.description == LEARNING_PATH_DESCRIPTION));
    }

    #[test]
    fn test_learning_path_graph_does_not_bridge_gaps() {
        let store = chain_store();
        let path: Vec<String> = ["a", "ghost", "b", "c"].iter().map(|s| s.to_string()).collect();
        let data = SubgraphEngine::new(&store).learning_path_graph(&path);

        assert_eq!(ids(&data), vec!["a", "b", "c"]);
        assert_eq!(pairs(&data), vec![("b", "c")]);
    }

    #[test]
    fn test_learning_path_graph_empty() {
        let store = chain_store();
        assert!(SubgraphEngine::new(&store).learning_path_graph(&[]).is_empty());
    }
}
