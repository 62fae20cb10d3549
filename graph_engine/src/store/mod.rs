//! Graph Store - the parsed curriculum, built once and read afterwards.
//!
//! The store is an arena:
//! - **Tables**: courses, units and knowledge nodes in declaration order
//! - **Indexes**: id -> handle for each entity kind
//! - **Incoming edges**: for each node, the edges of *other* nodes that target it
//!
//! Entities are only added during the load pass (see [`parser`]). Once
//! [`GraphStore::from_source`] returns, nothing mutates the store, so it can
//! be shared between threads behind an `Arc` without locking.

pub mod parser;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use course_model::{
    ChapterMarkers, Course, KnowledgeNode, NodeHandle, Relationship, Unit, UnitHandle,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
pub use parser::{parse_source, LoadReport};

/// Reference to one relationship: the `index`-th edge of `source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeRef {
    pub source: NodeHandle,
    pub index: usize,
}

/// Entity counts shown on dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphStats {
    pub courses: usize,
    pub units: usize,
    pub knowledge_nodes: usize,
    pub relationships: usize,
}

/// The loaded knowledge graph.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphStore {
    courses: Vec<Course>,
    course_index: HashMap<String, usize>,

    units: Vec<Unit>,
    unit_index: HashMap<String, UnitHandle>,

    nodes: Vec<KnowledgeNode>,
    node_index: HashMap<String, NodeHandle>,

    /// Reverse adjacency: `incoming[t]` lists edges from other nodes into `t`,
    /// ordered by source handle, then edge index.
    incoming: Vec<Vec<EdgeRef>>,

    markers: ChapterMarkers,
}

impl GraphStore {
    /// Create an empty store using the given chapter markers.
    pub fn new(markers: ChapterMarkers) -> Self {
        Self {
            markers,
            ..Self::default()
        }
    }

    /// Parse source text with the default chapter markers.
    pub fn from_source(source: &str) -> Self {
        Self::from_source_with_markers(source, ChapterMarkers::default())
    }

    /// Parse source text with custom chapter markers.
    pub fn from_source_with_markers(source: &str, markers: ChapterMarkers) -> Self {
        parse_source(source, markers).0
    }

    /// Read and parse a source file. Only I/O can fail; malformed
    /// statements are skipped and logged.
    pub fn load(path: &Path, markers: ChapterMarkers) -> Result<(Self, LoadReport)> {
        let source = fs::read_to_string(path).map_err(|source| Error::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(parse_source(&source, markers))
    }

    // ------------------------------------------------------------------
    // Load-time construction (crate-private)
    // ------------------------------------------------------------------

    /// Insert a course. A repeated id replaces the earlier definition in place.
    pub(crate) fn insert_course(&mut self, course: Course) {
        match self.course_index.get(&course.id) {
            Some(&slot) => {
                warn!(course_id = %course.id, "duplicate course id, keeping the later definition");
                let units = std::mem::take(&mut self.courses[slot].units);
                self.courses[slot] = Course { units, ..course };
            }
            None => {
                self.course_index.insert(course.id.clone(), self.courses.len());
                self.courses.push(course);
            }
        }
    }

    pub(crate) fn insert_unit(&mut self, unit: Unit) {
        match self.unit_index.get(&unit.id) {
            Some(&handle) => {
                warn!(unit_id = %unit.id, "duplicate unit id, keeping the later definition");
                let slot = &mut self.units[handle.index()];
                let knowledge_nodes = std::mem::take(&mut slot.knowledge_nodes);
                *slot = Unit {
                    knowledge_nodes,
                    ..unit
                };
            }
            None => {
                let handle = UnitHandle(self.units.len());
                self.unit_index.insert(unit.id.clone(), handle);
                self.units.push(unit);
            }
        }
    }

    pub(crate) fn insert_node(&mut self, node: KnowledgeNode) {
        match self.node_index.get(&node.id) {
            Some(&handle) => {
                warn!(node_id = %node.id, "duplicate knowledge node id, keeping the later definition");
                let slot = &mut self.nodes[handle.index()];
                let relationships = std::mem::take(&mut slot.relationships);
                *slot = KnowledgeNode {
                    relationships,
                    ..node
                };
            }
            None => {
                let handle = NodeHandle(self.nodes.len());
                self.node_index.insert(node.id.clone(), handle);
                self.nodes.push(node);
            }
        }
    }

    pub(crate) fn course_mut(&mut self, id: &str) -> Option<&mut Course> {
        let slot = *self.course_index.get(id)?;
        self.courses.get_mut(slot)
    }

    pub(crate) fn unit_mut(&mut self, id: &str) -> Option<&mut Unit> {
        let handle = *self.unit_index.get(id)?;
        self.units.get_mut(handle.index())
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut KnowledgeNode> {
        let handle = *self.node_index.get(id)?;
        self.nodes.get_mut(handle.index())
    }

    /// Rebuild the reverse adjacency. Called once at the end of the load pass.
    pub(crate) fn index_incoming(&mut self) {
        let mut incoming = vec![Vec::new(); self.nodes.len()];

        for (source, node) in self.nodes.iter().enumerate() {
            for (index, relationship) in node.relationships.iter().enumerate() {
                if let Some(&target) = self.node_index.get(&relationship.target_id) {
                    if target.index() != source {
                        incoming[target.index()].push(EdgeRef {
                            source: NodeHandle(source),
                            index,
                        });
                    }
                }
            }
        }

        self.incoming = incoming;
    }

    // ------------------------------------------------------------------
    // Read-only accessors
    // ------------------------------------------------------------------

    pub fn markers(&self) -> &ChapterMarkers {
        &self.markers
    }

    /// Get a course by id.
    pub fn course(&self, id: &str) -> Option<&Course> {
        self.course_index.get(id).map(|&slot| &self.courses[slot])
    }

    /// All courses in declaration order.
    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.iter()
    }

    /// Get a unit by id.
    pub fn unit(&self, id: &str) -> Option<&Unit> {
        self.unit_index.get(id).map(|&handle| &self.units[handle.index()])
    }

    /// Resolve a unit id to its handle.
    pub fn unit_handle(&self, id: &str) -> Option<UnitHandle> {
        self.unit_index.get(id).copied()
    }

    /// Get a unit by handle. Handles come from this store's own entities.
    pub(crate) fn unit_at(&self, handle: UnitHandle) -> &Unit {
        &self.units[handle.index()]
    }

    /// All units in declaration order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    /// Get a knowledge node by id.
    pub fn node(&self, id: &str) -> Option<&KnowledgeNode> {
        self.node_index.get(id).map(|&handle| &self.nodes[handle.index()])
    }

    /// Resolve a node id to its handle.
    pub fn node_handle(&self, id: &str) -> Option<NodeHandle> {
        self.node_index.get(id).copied()
    }

    /// Get a knowledge node by handle. Handles come from this store's own entities.
    pub(crate) fn node_at(&self, handle: NodeHandle) -> &KnowledgeNode {
        &self.nodes[handle.index()]
    }

    /// All knowledge nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &KnowledgeNode> {
        self.nodes.iter()
    }

    /// All knowledge nodes with their handles, in declaration order.
    pub fn node_entries(&self) -> impl Iterator<Item = (NodeHandle, &KnowledgeNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeHandle(i), node))
    }

    pub fn course_count(&self) -> usize {
        self.courses.len()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Sum of the outgoing edge counts of all knowledge nodes.
    pub fn relationship_count(&self) -> usize {
        self.nodes.iter().map(|node| node.relationships.len()).sum()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            courses: self.course_count(),
            units: self.unit_count(),
            knowledge_nodes: self.node_count(),
            relationships: self.relationship_count(),
        }
    }

    /// Edges of other nodes that point at `target`.
    pub fn incoming(&self, target: NodeHandle) -> &[EdgeRef] {
        self.incoming
            .get(target.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Look up the relationship an [`EdgeRef`] points to.
    pub(crate) fn relationship(&self, edge: EdgeRef) -> &Relationship {
        &self.nodes[edge.source.index()].relationships[edge.index]
    }

    /// Chapter rank of a node (secondary learning-path key).
    pub fn chapter_rank(&self, node: &KnowledgeNode) -> u32 {
        self.markers.rank(&node.chapter)
    }

    /// Case-insensitive search over node names and keywords, in store order.
    pub fn search(&self, query: &str) -> Vec<&KnowledgeNode> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.nodes
            .iter()
            .filter(|node| node.matches_lowercase(&needle))
            .collect()
    }
}
