//! Records fetched from the graph store

use serde::Serialize;
use serde_json::Value;

/// Store-assigned identifier, unique within its collection kind.
pub type EntityId = i64;

/// The two entity collections of a graph.
///
/// Node and relationship identifier spaces are independent of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Nodes,
    Relationships,
}

impl CollectionKind {
    /// Label used on progress lines
    pub fn label(&self) -> &'static str {
        match self {
            CollectionKind::Nodes => "Nodes",
            CollectionKind::Relationships => "Relations",
        }
    }

    /// Lowercase plural used in log messages
    pub fn noun(&self) -> &'static str {
        match self {
            CollectionKind::Nodes => "nodes",
            CollectionKind::Relationships => "relations",
        }
    }
}

/// A graph node with its property map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    pub id: EntityId,
    pub data: Value,
}

/// A directed, typed relationship between two nodes
///
/// `start_id`/`end_id` reference node identifiers; they are passed through
/// as the store returned them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipRecord {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub start_id: EntityId,
    pub end_id: EntityId,
    pub data: Value,
}

/// A fetched entity ready for serialization
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Node(NodeRecord),
    Relationship(RelationshipRecord),
}

impl From<NodeRecord> for Record {
    fn from(node: NodeRecord) -> Self {
        Record::Node(node)
    }
}

impl From<RelationshipRecord> for Record {
    fn from(rel: RelationshipRecord) -> Self {
        Record::Relationship(rel)
    }
}
