//! Knowledge nodes and the typed edges between them.

use serde::{Deserialize, Serialize};

/// Type tag of an edge. Tags the graph gives meaning to have their own
/// variant; everything else is carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationType {
    /// Course -> Unit or Unit -> KnowledgeNode ownership.
    Contains,
    /// Source must be learned before target.
    Prerequisite,
    /// Synthetic edge between consecutive steps of a learning path.
    LearningPath,
    /// Any other tag from the source text (e.g. "RELATED").
    Custom(String),
}

impl RelationType {
    pub fn as_str(&self) -> &str {
        match self {
            RelationType::Contains => "CONTAINS",
            RelationType::Prerequisite => "PREREQUISITE",
            RelationType::LearningPath => "LEARNING_PATH",
            RelationType::Custom(tag) => tag,
        }
    }
}

impl From<&str> for RelationType {
    fn from(tag: &str) -> Self {
        match tag {
            "CONTAINS" => RelationType::Contains,
            "PREREQUISITE" => RelationType::Prerequisite,
            "LEARNING_PATH" => RelationType::LearningPath,
            other => RelationType::Custom(other.to_string()),
        }
    }
}

impl From<String> for RelationType {
    fn from(tag: String) -> Self {
        RelationType::from(tag.as_str())
    }
}

impl From<RelationType> for String {
    fn from(relation: RelationType) -> Self {
        relation.as_str().to_string()
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed edge owned by its source node.
///
/// The target is kept as an id rather than a handle: it is not required to
/// exist and simply fails to resolve when it doesn't.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub target_id: String,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    pub description: String,
}

impl Relationship {
    pub fn new(
        target_id: impl Into<String>,
        relation_type: impl Into<RelationType>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            target_id: target_id.into(),
            relation_type: relation_type.into(),
            description: description.into(),
        }
    }

    pub fn is_prerequisite(&self) -> bool {
        self.relation_type == RelationType::Prerequisite
    }
}

/// A single piece of knowledge to be learned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub description: String,

    /// Lower is easier.
    pub difficulty: u32,

    /// Chapter label, conventionally starting with a unit marker.
    pub chapter: String,

    #[serde(default)]
    pub keywords: Vec<String>,

    /// Outgoing edges in declaration order.
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl KnowledgeNode {
    /// Create a node without keywords or relationships.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        node_type: impl Into<String>,
        description: impl Into<String>,
        difficulty: u32,
        chapter: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: node_type.into(),
            description: description.into(),
            difficulty,
            chapter: chapter.into(),
            keywords: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// Set the keyword list.
    pub fn with_keywords(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Append an outgoing edge.
    pub fn add_relationship(&mut self, relationship: Relationship) {
        self.relationships.push(relationship);
    }

    /// Case-insensitive match of `needle` against the name and keywords.
    /// `needle` must already be lowercase.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .keywords
                .iter()
                .any(|keyword| keyword.to_lowercase().contains(needle))
    }
}
