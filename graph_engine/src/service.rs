//! Query surface over a loaded store, and the shared handle used for reloads.
//!
//! - [`KnowledgeGraphService`] answers queries against one store snapshot
//! - [`SharedGraph`] holds the live snapshot and swaps it on reload

use std::sync::{Arc, PoisonError, RwLock};

use course_model::KnowledgeNode;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::planner::LearningPathPlanner;
use crate::store::{GraphStats, GraphStore, LoadReport};
use crate::subgraph::{GraphData, SubgraphEngine};

/// A course with its units in teaching order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOutline {
    pub id: String,
    pub name: String,
    pub description: String,
    pub level: String,
    pub units: Vec<UnitOutline>,
}

/// A unit and the ids of the knowledge nodes it contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOutline {
    pub id: String,
    pub name: String,
    pub description: String,
    pub order: u32,
    pub knowledge_nodes: Vec<String>,
}

/// Answers graph queries against one store snapshot.
#[derive(Debug, Clone)]
pub struct KnowledgeGraphService {
    store: Arc<GraphStore>,
    default_depth: i32,
}

impl KnowledgeGraphService {
    pub fn new(store: Arc<GraphStore>) -> Self {
        Self {
            store,
            default_depth: crate::config::DEFAULT_NODE_DEPTH,
        }
    }

    /// Use `depth` for node graphs requested without one.
    pub fn with_default_depth(mut self, depth: i32) -> Self {
        self.default_depth = depth;
        self
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn full_graph(&self) -> GraphData {
        SubgraphEngine::new(&self.store).full_graph()
    }

    /// Ego-network around a node; `None` uses the configured default depth.
    pub fn node_graph(&self, node_id: &str, depth: Option<i32>) -> GraphData {
        let depth = depth.unwrap_or(self.default_depth);
        SubgraphEngine::new(&self.store).node_graph(node_id, depth)
    }

    pub fn unit_graph(&self, unit_id: &str) -> GraphData {
        SubgraphEngine::new(&self.store).unit_graph(unit_id)
    }

    /// Ordered node ids. A missing or blank start gives the basic path.
    pub fn learning_path(&self, start_node_id: Option<&str>) -> Vec<String> {
        let planner = LearningPathPlanner::new(&self.store);
        match start_node_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(start) => planner.path_from_node(start),
            None => planner.basic_path(),
        }
    }

    /// The learning path rendered as a chain of nodes and links.
    pub fn learning_path_graph(&self, start_node_id: Option<&str>) -> GraphData {
        let path = self.learning_path(start_node_id);
        SubgraphEngine::new(&self.store).learning_path_graph(&path)
    }

    /// A knowledge node with its keywords and relationships.
    pub fn node_details(&self, node_id: &str) -> Option<KnowledgeNode> {
        self.store.node(node_id).cloned()
    }

    pub fn stats(&self) -> GraphStats {
        self.store.stats()
    }

    /// Nodes whose name or keywords contain `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<KnowledgeNode> {
        self.store.search(query).into_iter().cloned().collect()
    }

    /// Units of a course sorted by their declared order. Units with the same
    /// order keep the order their CONTAINS edges were declared in.
    pub fn course_outline(&self, course_id: &str) -> Option<CourseOutline> {
        let Some(course) = self.store.course(course_id) else {
            warn!(course_id, "course not found");
            return None;
        };

        let mut units: Vec<UnitOutline> = course
            .units
            .iter()
            .map(|&handle| {
                let unit = self.store.unit_at(handle);
                UnitOutline {
                    id: unit.id.clone(),
                    name: unit.name.clone(),
                    description: unit.description.clone(),
                    order: unit.order,
                    knowledge_nodes: unit
                        .knowledge_nodes
                        .iter()
                        .map(|&node| self.store.node_at(node).id.clone())
                        .collect(),
                }
            })
            .collect();
        units.sort_by_key(|unit| unit.order);

        Some(CourseOutline {
            id: course.id.clone(),
            name: course.name.clone(),
            description: course.description.clone(),
            level: course.level.clone(),
            units,
        })
    }
}

/// The live store, shared between readers and swapped whole on reload.
///
/// Readers take a snapshot (`Arc<GraphStore>`) and keep using it even if a
/// reload happens meanwhile. The lock is only held to clone or swap the `Arc`.
#[derive(Debug, Clone)]
pub struct SharedGraph {
    current: Arc<RwLock<Arc<GraphStore>>>,
    config: EngineConfig,
}

impl SharedGraph {
    pub fn new(store: GraphStore, config: EngineConfig) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(store))),
            config,
        }
    }

    /// Load the configured source file.
    pub fn load(config: EngineConfig) -> Result<Self> {
        let (store, _) = GraphStore::load(&config.data.file, config.chapters.markers.clone())?;
        Ok(Self::new(store, config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The store readers should use right now.
    pub fn snapshot(&self) -> Arc<GraphStore> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*current)
    }

    /// A query service over the current snapshot.
    pub fn service(&self) -> KnowledgeGraphService {
        KnowledgeGraphService::new(self.snapshot()).with_default_depth(self.config.graph.default_depth)
    }

    /// Swap in a new store. Existing snapshots are unaffected.
    pub fn replace(&self, store: GraphStore) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Arc::new(store);
    }

    /// Rebuild the store from the configured file and swap it in.
    /// On failure the current store stays live.
    pub fn reload(&self) -> Result<LoadReport> {
        let (store, report) =
            GraphStore::load(&self.config.data.file, self.config.chapters.markers.clone())?;
        self.replace(store);
        info!(
            file = %self.config.data.file.display(),
            knowledge_nodes = report.knowledge_nodes,
            relationships = report.relationships,
            "knowledge graph reloaded"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SOURCE: &str = r#"
CREATE (c:Course {id: "c1", name: "AI", description: "Intro", level: "beginner"})
CREATE (u:Unit {id: "u2", name: "Search", description: "Search", order: 2})
CREATE (u:Unit {id: "u1", name: "Agents", description: "Agents", order: 1})
CREATE (u:Unit {id: "u3", name: "Also first", description: "Tied", order: 1})
CREATE (k:KnowledgeNode {id: "k1", name: "Agents", type: "concept", description: "d", difficulty: 1, chapter: "Unit 1 Intro", keywords: ["rational"]})
CREATE (k:KnowledgeNode {id: "k2", name: "BFS", type: "algorithm", description: "d", difficulty: 2, chapter: "Unit 2 Search", keywords: ["queue"]})
CREATE (x {id:'c1'})-[:CONTAINS]->(y {id:'u2'})
CREATE (x {id:'c1'})-[:CONTAINS]->(y {id:'u1'})
CREATE (x {id:'c1'})-[:CONTAINS]->(y {id:'u3'})
CREATE (x {id:'u1'})-[:CONTAINS]->(y {id:'k1'})
CREATE (x {id:'u2'})-[:CONTAINS]->(y {id:'k2'})
CREATE (x {id:'k1'})-[:PREREQUISITE]->(y {id:'k2'})
"#;

    fn service() -> KnowledgeGraphService {
        KnowledgeGraphService::new(Arc::new(GraphStore::from_source(SOURCE)))
    }

    #[test]
    fn test_node_graph_default_depth() {
        let service = service().with_default_depth(0);
        assert!(service.node_graph("k1", None).is_empty());
        assert_eq!(service.node_graph("k1", Some(1)).nodes.len(), 2);
    }

    #[test]
    fn test_learning_path_start_handling() {
        let service = service();

        assert_eq!(service.learning_path(None), vec!["k1", "k2"]);
        assert_eq!(service.learning_path(Some("  ")), vec!["k1", "k2"]);
        assert_eq!(service.learning_path(Some("k2")), vec!["k2", "k1"]);
        assert!(service.learning_path(Some("missing")).is_empty());

        let graph = service.learning_path_graph(Some("k1"));
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.links.len(), 1);
    }

    #[test]
    fn test_course_outline_sorted_by_order() {
        let outline = service().course_outline("c1").unwrap();

        let ids: Vec<_> = outline.units.iter().map(|unit| unit.id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u3", "u2"]);
        assert_eq!(outline.units[0].knowledge_nodes, vec!["k1"]);
        assert!(outline.units[1].knowledge_nodes.is_empty());

        assert!(service().course_outline("u1").is_none());
    }

    #[test]
    fn test_details_search_stats() {
        let service = service();

        let details = service.node_details("k1").unwrap();
        assert_eq!(details.keywords, vec!["rational"]);
        assert_eq!(details.relationships.len(), 1);
        assert!(service.node_details("zzz").is_none());

        let hits: Vec<_> = service.search("QUEUE").into_iter().map(|n| n.id).collect();
        assert_eq!(hits, vec!["k2"]);

        let stats = service.stats();
        assert_eq!(stats.courses, 1);
        assert_eq!(stats.units, 3);
        assert_eq!(stats.knowledge_nodes, 2);
        assert_eq!(stats.relationships, 1);
    }

    #[test]
    fn test_shared_graph_reload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", SOURCE).unwrap();

        let mut config = EngineConfig::default();
        config.data.file = file.path().to_path_buf();

        let shared = SharedGraph::load(config).unwrap();
        let before = shared.snapshot();
        assert_eq!(before.node_count(), 2);

        let extra = r#"
CREATE (k:KnowledgeNode {id: "k3", name: "DFS", type: "algorithm", description: "d", difficulty: 2, chapter: "Unit 2"})
"#;
        write!(file, "{}", extra).unwrap();
        file.flush().unwrap();

        let report = shared.reload().unwrap();
        assert_eq!(report.knowledge_nodes, 3);
        assert_eq!(shared.snapshot().node_count(), 3);
        // Snapshots taken before the reload still see the old store.
        assert_eq!(before.node_count(), 2);
        assert_eq!(shared.service().stats().knowledge_nodes, 3);
    }

    #[test]
    fn test_failed_reload_keeps_store() {
        let mut config = EngineConfig::default();
        config.data.file = "/nonexistent/graph.cypher".into();

        let shared = SharedGraph::new(GraphStore::from_source(SOURCE), config);
        assert!(shared.reload().is_err());
        assert_eq!(shared.snapshot().node_count(), 2);
    }

    #[test]
    fn test_shared_graph_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedGraph>();
        assert_send_sync::<KnowledgeGraphService>();
    }
}
