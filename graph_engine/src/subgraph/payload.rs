//! Visualization payload: the nodes and links handed to the presentation layer.

use std::collections::HashSet;

use course_model::{ChapterMarkers, KnowledgeNode, NodeHandle, RelationType, Relationship};
use serde::{Deserialize, Serialize};

use crate::store::{EdgeRef, GraphStore};

/// Projection of a knowledge node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub description: String,
    pub difficulty: u32,
    pub chapter: String,
    /// Cluster used for colouring; 0 when the chapter has no unit marker.
    pub group: u32,
}

impl Node {
    pub fn from_knowledge(node: &KnowledgeNode, markers: &ChapterMarkers) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            node_type: node.node_type.clone(),
            description: node.description.clone(),
            difficulty: node.difficulty,
            chapter: node.chapter.clone(),
            group: markers.group(&node.chapter),
        }
    }
}

/// Projection of a relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub link_type: RelationType,
    pub description: String,
    /// Edge weight placeholder.
    pub value: u32,
}

impl Link {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        link_type: RelationType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            link_type,
            description: description.into(),
            value: 1,
        }
    }

    /// Link for an edge owned by `source_id`.
    pub fn from_relationship(source_id: &str, relationship: &Relationship) -> Self {
        Self::new(
            source_id,
            relationship.target_id.clone(),
            relationship.relation_type.clone(),
            relationship.description.clone(),
        )
    }
}

/// Nodes and links of one view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl GraphData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    /// Check whether a node with `id` is present.
    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == id)
    }

    /// Serialize to the JSON shape the presentation layer expects.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "nodes": self.nodes,
            "links": self.links,
        })
    }
}

/// Builds a [`GraphData`] in which every node and every edge appears once.
pub(crate) struct UniqueView<'a> {
    store: &'a GraphStore,
    data: GraphData,
    nodes: HashSet<NodeHandle>,
    edges: HashSet<EdgeRef>,
}

impl<'a> UniqueView<'a> {
    pub(crate) fn new(store: &'a GraphStore) -> Self {
        Self {
            store,
            data: GraphData::new(),
            nodes: HashSet::new(),
            edges: HashSet::new(),
        }
    }

    pub(crate) fn node(&mut self, handle: NodeHandle) {
        if self.nodes.insert(handle) {
            let node = self.store.node_at(handle);
            self.data
                .add_node(Node::from_knowledge(node, self.store.markers()));
        }
    }

    pub(crate) fn edge(&mut self, edge: EdgeRef) {
        if self.edges.insert(edge) {
            let source = self.store.node_at(edge.source);
            let relationship = self.store.relationship(edge);
            self.data
                .add_link(Link::from_relationship(&source.id, relationship));
        }
    }

    pub(crate) fn finish(self) -> GraphData {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_group_from_chapter() {
        let markers = ChapterMarkers::default();
        let knowledge = KnowledgeNode::new("k1", "CNN", "model", "Convolutions", 4, "第六单元 计算机视觉");

        let node = Node::from_knowledge(&knowledge, &markers);
        assert_eq!(node.group, 6);
        assert_eq!(node.difficulty, 4);

        let plain = KnowledgeNode::new("k2", "Misc", "note", "", 0, "Appendix");
        assert_eq!(Node::from_knowledge(&plain, &markers).group, 0);
    }

    #[test]
    fn test_link_defaults() {
        let link = Link::new("a", "b", RelationType::Prerequisite, "first a");
        assert_eq!(link.value, 1);
    }

    #[test]
    fn test_json_shape() {
        let markers = ChapterMarkers::default();
        let mut data = GraphData::new();
        data.add_node(Node::from_knowledge(
            &KnowledgeNode::new("k1", "Search", "concept", "desc", 1, "Unit 1 Intro"),
            &markers,
        ));
        data.add_link(Link::new("k1", "k2", RelationType::from("RELATED"), ""));

        let json = data.to_json();
        assert_eq!(json["nodes"][0]["id"], "k1");
        assert_eq!(json["nodes"][0]["type"], "concept");
        assert_eq!(json["nodes"][0]["group"], 1);
        assert_eq!(json["links"][0]["source"], "k1");
        assert_eq!(json["links"][0]["type"], "RELATED");
        assert_eq!(json["links"][0]["value"], 1);
    }

    #[test]
    fn test_unique_view_deduplicates() {
        let store = GraphStore::from_source(
            r#"
CREATE (a:KnowledgeNode {id: "a", name: "A", type: "t", description: "d", difficulty: 1, chapter: "Unit 1"})
CREATE (b:KnowledgeNode {id: "b", name: "B", type: "t", description: "d", difficulty: 1, chapter: "Unit 1"})
CREATE (x {id:'a'})-[:RELATED]->(y {id:'b'})
"#,
        );
        let a = store.node_handle("a").unwrap();
        let edge = EdgeRef { source: a, index: 0 };

        let mut view = UniqueView::new(&store);
        view.node(a);
        view.node(a);
        view.edge(edge);
        view.edge(edge);
        let data = view.finish();

        assert_eq!(data.nodes.len(), 1);
        assert_eq!(data.links.len(), 1);
    }
}
