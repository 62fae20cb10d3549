//! Statement parser for the declarative graph source.
//!
//! The source is line oriented:
//! - **Entity statements** start with `CREATE (` and may span several lines
//!   until a line ends with `)` or `);`
//! - **Relationship statements** are single lines of the form
//!   `(a {id:'A'})-[:TYPE {description:"..."}]->(b {id:'B'})`
//! - `//` comment lines and blank lines are ignored
//!
//! Nothing in here fails: malformed statements are logged and skipped.

use std::sync::LazyLock;

use course_model::{ChapterMarkers, Course, KnowledgeNode, RelationType, Relationship, Unit};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::GraphStore;

/// `CREATE (` at the start of a line.
static ENTITY_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CREATE\s*\(").unwrap());

/// Label of an entity statement: `CREATE (alias:Label`.
static ENTITY_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CREATE\s*\(\s*\w*\s*:\s*(\w+)").unwrap());

/// Arrow with its type tag: `)-[:TYPE ...]->(`.
static RELATIONSHIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\)\s*-\s*\[\s*:\s*([^\s{\]]+).*?\]\s*->\s*\(").unwrap()
});

/// Inline endpoint filter: `{id:'A'}`.
static ID_FILTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\s*id\s*:\s*(?:'([^']*)'|"([^"]*)")\s*\}"#).unwrap()
});

/// Description attached to a relationship.
static EDGE_DESCRIPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bdescription\s*:\s*"([^"]*)""#).unwrap());

static ID_FIELD: LazyLock<Regex> = LazyLock::new(|| string_field("id"));
static NAME_FIELD: LazyLock<Regex> = LazyLock::new(|| string_field("name"));
static DESCRIPTION_FIELD: LazyLock<Regex> = LazyLock::new(|| string_field("description"));
static LEVEL_FIELD: LazyLock<Regex> = LazyLock::new(|| string_field("level"));
static TYPE_FIELD: LazyLock<Regex> = LazyLock::new(|| string_field("type"));
static CHAPTER_FIELD: LazyLock<Regex> = LazyLock::new(|| string_field("chapter"));
static ORDER_FIELD: LazyLock<Regex> = LazyLock::new(|| integer_field("order"));
static DIFFICULTY_FIELD: LazyLock<Regex> = LazyLock::new(|| integer_field("difficulty"));
static KEYWORDS_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[{,])\s*keywords\s*:\s*\[([^\]]*)\]").unwrap()
});

/// `key: "value"` or `key: 'value'` at a property position.
fn string_field(key: &str) -> Regex {
    Regex::new(&format!(
        r#"(?:^|[{{,])\s*{}\s*:\s*(?:"([^"]*)"|'([^']*)')"#,
        key
    ))
    .unwrap()
}

/// `key: 123` at a property position.
fn integer_field(key: &str) -> Regex {
    Regex::new(&format!(r"(?:^|[{{,])\s*{}\s*:\s*(\d+)", key)).unwrap()
}

/// Summary of one load pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadReport {
    pub courses: usize,
    pub units: usize,
    pub knowledge_nodes: usize,
    /// Course -> Unit and Unit -> KnowledgeNode edges applied.
    pub containments: usize,
    /// KnowledgeNode -> KnowledgeNode edges applied.
    pub relationships: usize,
    /// Entity statements missing required fields, and unparseable lines.
    pub discarded_statements: usize,
    /// Well-formed relationships whose endpoints matched no rule.
    pub dropped_relationships: usize,
}

/// Parse a complete source text into a new store.
pub fn parse_source(source: &str, markers: ChapterMarkers) -> (GraphStore, LoadReport) {
    let mut parser = StatementParser::new(GraphStore::new(markers));
    for line in source.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}

/// Entity kinds a statement can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityKind {
    Course,
    Unit,
    KnowledgeNode,
}

impl EntityKind {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "Course" => Some(EntityKind::Course),
            "Unit" => Some(EntityKind::Unit),
            "KnowledgeNode" => Some(EntityKind::KnowledgeNode),
            _ => None,
        }
    }
}

/// Line-by-line parser populating a store.
struct StatementParser {
    store: GraphStore,
    report: LoadReport,
    /// Entity statement still waiting for its closing line.
    pending: Option<String>,
    line_number: usize,
}

impl StatementParser {
    fn new(store: GraphStore) -> Self {
        Self {
            store,
            report: LoadReport::default(),
            pending: None,
            line_number: 0,
        }
    }

    fn feed_line(&mut self, raw: &str) {
        self.line_number += 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") {
            return;
        }

        let is_relationship = RELATIONSHIP.is_match(line);

        if ENTITY_START.is_match(line) && !is_relationship {
            self.flush_unterminated();
            if ends_statement(line) {
                self.entity_statement(line);
            } else {
                self.pending = Some(line.to_string());
            }
        } else if is_relationship {
            self.flush_unterminated();
            self.relationship_statement(line);
        } else if let Some(mut statement) = self.pending.take() {
            statement.push(' ');
            statement.push_str(line);
            if ends_statement(line) {
                self.entity_statement(&statement);
            } else {
                self.pending = Some(statement);
            }
        } else {
            warn!(line = self.line_number, "skipping unrecognised line");
            self.report.discarded_statements += 1;
        }
    }

    fn finish(mut self) -> (GraphStore, LoadReport) {
        self.flush_unterminated();
        self.store.index_incoming();

        let report = self.report;
        info!(
            courses = report.courses,
            units = report.units,
            knowledge_nodes = report.knowledge_nodes,
            containments = report.containments,
            relationships = report.relationships,
            discarded = report.discarded_statements,
            dropped = report.dropped_relationships,
            "knowledge graph loaded"
        );
        (self.store, report)
    }

    /// Parse a multi-line statement that never saw its closing line.
    fn flush_unterminated(&mut self) {
        if let Some(statement) = self.pending.take() {
            warn!(line = self.line_number, "entity statement not terminated before next statement");
            self.entity_statement(&statement);
        }
    }

    fn entity_statement(&mut self, statement: &str) {
        let kind = ENTITY_LABEL
            .captures(statement)
            .and_then(|caps| EntityKind::from_label(&caps[1]));

        let parsed = match kind {
            Some(EntityKind::Course) => parse_course(statement).map(|course| {
                self.store.insert_course(course);
                self.report.courses += 1;
            }),
            Some(EntityKind::Unit) => parse_unit(statement).map(|unit| {
                self.store.insert_unit(unit);
                self.report.units += 1;
            }),
            Some(EntityKind::KnowledgeNode) => parse_knowledge_node(statement).map(|node| {
                self.store.insert_node(node);
                self.report.knowledge_nodes += 1;
            }),
            None => Err("unknown entity label"),
        };

        if let Err(reason) = parsed {
            warn!(line = self.line_number, reason, "discarding entity statement");
            self.report.discarded_statements += 1;
        }
    }

    fn relationship_statement(&mut self, line: &str) {
        let Some(tag) = RELATIONSHIP.captures(line).map(|caps| caps[1].to_string()) else {
            return;
        };

        let mut endpoints = ID_FILTER.captures_iter(line).map(|caps| first_group(&caps));
        let (Some(source_id), Some(target_id)) = (endpoints.next(), endpoints.next()) else {
            warn!(line = self.line_number, "relationship without two {{id:'...'}} endpoints");
            self.report.discarded_statements += 1;
            return;
        };

        let relation_type = RelationType::from(tag);
        let is_contains = relation_type == RelationType::Contains;

        if is_contains && self.store.course(&source_id).is_some() {
            if let Some(unit) = self.store.unit_handle(&target_id) {
                if let Some(course) = self.store.course_mut(&source_id) {
                    course.add_unit(unit);
                }
                self.report.containments += 1;
                return;
            }
        }

        if is_contains && self.store.unit(&source_id).is_some() {
            if let Some(node) = self.store.node_handle(&target_id) {
                if let Some(unit) = self.store.unit_mut(&source_id) {
                    unit.add_knowledge_node(node);
                }
                self.report.containments += 1;
                return;
            }
        }

        if self.store.node(&target_id).is_some() {
            if let Some(source) = self.store.node_mut(&source_id) {
                let description = EDGE_DESCRIPTION
                    .captures(line)
                    .map(|caps| caps[1].to_string())
                    .unwrap_or_default();
                source.add_relationship(Relationship::new(target_id, relation_type, description));
                self.report.relationships += 1;
                return;
            }
        }

        debug!(
            line = self.line_number,
            source = %source_id,
            target = %target_id,
            relation = %relation_type,
            "dropping relationship with unresolved endpoints"
        );
        self.report.dropped_relationships += 1;
    }
}

/// A statement closes on `)` optionally followed by `;`.
fn ends_statement(line: &str) -> bool {
    line.trim_end_matches(';').trim_end().ends_with(')')
}

/// Value of whichever alternative of a quoted pattern matched.
fn first_group(caps: &Captures<'_>) -> String {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn string_value(pattern: &Regex, statement: &str, field: &'static str) -> Result<String, &'static str> {
    pattern
        .captures(statement)
        .map(|caps| first_group(&caps))
        .ok_or(field)
}

fn integer_value(pattern: &Regex, statement: &str, field: &'static str) -> Result<u32, &'static str> {
    pattern
        .captures(statement)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or(field)
}

fn keyword_list(statement: &str) -> Vec<String> {
    KEYWORDS_FIELD
        .captures(statement)
        .map(|caps| {
            caps[1]
                .split(',')
                .map(|keyword| keyword.trim().trim_matches(|c| c == '"' || c == '\'').trim())
                .filter(|keyword| !keyword.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_course(statement: &str) -> Result<Course, &'static str> {
    Ok(Course::new(
        string_value(&ID_FIELD, statement, "missing id")?,
        string_value(&NAME_FIELD, statement, "missing name")?,
        string_value(&DESCRIPTION_FIELD, statement, "missing description")?,
        string_value(&LEVEL_FIELD, statement, "missing level")?,
    ))
}

fn parse_unit(statement: &str) -> Result<Unit, &'static str> {
    Ok(Unit::new(
        string_value(&ID_FIELD, statement, "missing id")?,
        string_value(&NAME_FIELD, statement, "missing name")?,
        string_value(&DESCRIPTION_FIELD, statement, "missing description")?,
        integer_value(&ORDER_FIELD, statement, "missing or invalid order")?,
    ))
}

fn parse_knowledge_node(statement: &str) -> Result<KnowledgeNode, &'static str> {
    let node = KnowledgeNode::new(
        string_value(&ID_FIELD, statement, "missing id")?,
        string_value(&NAME_FIELD, statement, "missing name")?,
        string_value(&TYPE_FIELD, statement, "missing type")?,
        string_value(&DESCRIPTION_FIELD, statement, "missing description")?,
        integer_value(&DIFFICULTY_FIELD, statement, "missing or invalid difficulty")?,
        string_value(&CHAPTER_FIELD, statement, "missing chapter")?,
    );
    Ok(node.with_keywords(keyword_list(statement)))
}
