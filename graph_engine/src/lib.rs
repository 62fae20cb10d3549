//! # Graph Engine
//!
//! Turns a declarative curriculum source into a queryable knowledge graph.
//!
//! ## Architecture
//!
//! - **Store**: parses the source once into an immutable arena of courses,
//!   units and knowledge nodes
//! - **Subgraph**: derives visualization payloads (full, unit, node and
//!   learning-path views)
//! - **Planner**: orders knowledge nodes into recommended learning paths
//! - **Service**: the query surface, plus a shared handle for hot reload
//!
//! ```
//! use graph_engine::{GraphStore, KnowledgeGraphService};
//! use std::sync::Arc;
//!
//! let store = GraphStore::from_source(r#"
//! CREATE (k:KnowledgeNode {id: "k1", name: "Agents", type: "concept", description: "", difficulty: 1, chapter: "Unit 1"})
//! "#);
//! let service = KnowledgeGraphService::new(Arc::new(store));
//! assert_eq!(service.learning_path(None), vec!["k1"]);
//! ```

pub mod config;
pub mod error;
pub mod planner;
pub mod service;
pub mod store;
pub mod subgraph;

pub use config::{EngineConfig, DATA_FILE_ENV, DEFAULT_NODE_DEPTH};
pub use error::{Error, Result};
pub use planner::{LearningPathPlanner, PathCosts};
pub use service::{CourseOutline, KnowledgeGraphService, SharedGraph, UnitOutline};
pub use store::{EdgeRef, GraphStats, GraphStore, LoadReport};
pub use subgraph::{GraphData, Link, Node, SubgraphEngine, LEARNING_PATH_DESCRIPTION};
