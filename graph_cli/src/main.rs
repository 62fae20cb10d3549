//! course-graph - query a course knowledge graph from the command line

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use graph_engine::{EngineConfig, KnowledgeGraphService, SharedGraph};
use serde::Serialize;
use tracing::debug;

#[derive(Parser)]
#[command(name = "course-graph")]
#[command(author, version, about = "Query a course knowledge graph", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Source file, overriding the configured one
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Every node and relationship
    Full,

    /// Neighbourhood of one knowledge node
    Node {
        /// Knowledge node ID
        id: String,
        /// Expansion depth (defaults to graph.default_depth)
        #[arg(long)]
        depth: Option<i32>,
    },

    /// Nodes of one unit and the edges between them
    Unit {
        /// Unit ID
        id: String,
    },

    /// Recommended learning path
    Path {
        /// Start from this knowledge node
        #[arg(short, long)]
        start: Option<String>,
    },

    /// Entity counts
    Stats,

    /// Search node names and keywords
    Search { query: String },

    /// A knowledge node with keywords and relationships
    Details { id: String },

    /// Units of a course in teaching order
    Outline {
        /// Course ID
        course_id: String,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("graph_engine=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = EngineConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(data) = cli.data {
        config.data.file = data;
    }
    debug!(file = %config.data.file.display(), "loading knowledge graph");

    let shared = SharedGraph::load(config).context("Failed to load knowledge graph")?;
    run(cli.command, &shared.service())
}

fn run(command: Commands, service: &KnowledgeGraphService) -> anyhow::Result<()> {
    match command {
        Commands::Full => print_json(&service.full_graph()),
        Commands::Node { id, depth } => print_json(&service.node_graph(&id, depth)),
        Commands::Unit { id } => print_json(&service.unit_graph(&id)),
        Commands::Path { start } => print_json(&service.learning_path_graph(start.as_deref())),
        Commands::Stats => print_json(&service.stats()),
        Commands::Search { query } => print_json(&service.search(&query)),
        Commands::Details { id } => {
            let node = service
                .node_details(&id)
                .with_context(|| format!("Knowledge node '{}' not found", id))?;
            print_json(&node)
        }
        Commands::Outline { course_id } => {
            let outline = service
                .course_outline(&course_id)
                .with_context(|| format!("Course '{}' not found", course_id))?;
            print_json(&outline)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use graph_engine::GraphStore;
    use std::sync::Arc;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_node_command() {
        let cli = Cli::parse_from(["course-graph", "--data", "g.cypher", "node", "k1", "--depth", "3"]);

        assert_eq!(cli.data, Some(PathBuf::from("g.cypher")));
        assert!(matches!(
            cli.command,
            Commands::Node { ref id, depth: Some(3) } if id == "k1"
        ));
    }

    #[test]
    fn test_parse_path_without_start() {
        let cli = Cli::parse_from(["course-graph", "path"]);
        assert!(matches!(cli.command, Commands::Path { start: None }));
    }

    #[test]
    fn test_missing_details_is_error() {
        let service = KnowledgeGraphService::new(Arc::new(GraphStore::default()));

        assert!(run(Commands::Details { id: "k1".to_string() }, &service).is_err());
        assert!(run(Commands::Stats, &service).is_ok());
    }
}
