//! Unit and lecture definitions.

use serde::{Deserialize, Serialize};

use super::NodeHandle;

/// A unit of a course, owning a set of knowledge nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Position of the unit inside its course, as declared in the source.
    pub order: u32,

    /// Lectures are part of the curriculum but the graph never reads them.
    #[serde(default)]
    pub lectures: Vec<Lecture>,

    /// Knowledge nodes in the order their CONTAINS edges were declared.
    #[serde(default)]
    pub knowledge_nodes: Vec<NodeHandle>,
}

impl Unit {
    /// Create a unit with no lectures and no knowledge nodes.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        order: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            order,
            lectures: Vec::new(),
            knowledge_nodes: Vec::new(),
        }
    }

    /// Attach a knowledge node to the unit.
    pub fn add_knowledge_node(&mut self, node: NodeHandle) {
        self.knowledge_nodes.push(node);
    }

    pub fn add_lecture(&mut self, lecture: Lecture) {
        self.lectures.push(lecture);
    }
}

/// A lecture inside a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecture {
    pub id: String,
    pub name: String,
    pub content: String,
    pub order: u32,
    #[serde(default)]
    pub related_knowledge_node_ids: Vec<String>,
}

impl Lecture {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
        order: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: content.into(),
            order,
            related_knowledge_node_ids: Vec::new(),
        }
    }

    /// Reference a knowledge node covered by this lecture.
    pub fn with_related_node(mut self, node_id: impl Into<String>) -> Self {
        self.related_knowledge_node_ids.push(node_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_membership() {
        let mut unit = Unit::new("u1", "Search", "Search algorithms", 1);
        unit.add_knowledge_node(NodeHandle(0));
        unit.add_knowledge_node(NodeHandle(2));

        assert_eq!(unit.knowledge_nodes, vec![NodeHandle(0), NodeHandle(2)]);
        assert_eq!(unit.order, 1);
    }

    #[test]
    fn test_lecture_builder() {
        let lecture = Lecture::new("l1", "BFS", "Breadth-first search", 1)
            .with_related_node("k1")
            .with_related_node("k2");

        let mut unit = Unit::new("u1", "Search", "", 1);
        unit.add_lecture(lecture);

        assert_eq!(unit.lectures.len(), 1);
        assert_eq!(unit.lectures[0].related_knowledge_node_ids, vec!["k1", "k2"]);
    }
}
