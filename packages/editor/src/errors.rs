//! Error types for the editor
//!
//! Only caller bugs surface here: unknown ids, properties dispatched to the wrong node
//! kind, missing templates. Interaction edge cases (stale gesture targets, refused
//! moves, name collisions) are silent no-ops and never produce an error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Scene not found: {0}")]
    SceneNotFound(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Node {id} belongs to template {template_id}; edit it with an override")]
    TemplateNodeReadOnly { template_id: String, id: String },

    #[error("Template {template_id} has no node {sub_id}")]
    UnknownOverrideTarget { template_id: String, sub_id: String },

    #[error("Property {property} is not valid on {kind} node {id}")]
    WrongNodeKind {
        id: String,
        property: &'static str,
        kind: &'static str,
    },

    #[error("Node id already in use: {0}")]
    DuplicateNodeId(String),

    #[error("Template id already in use: {0}")]
    DuplicateTemplate(String),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Not editing a path")]
    NotEditingPath,

    #[error("Vertex or segment index out of range: {0}")]
    IndexOutOfRange(usize),

    #[error("Action {0} must be handled by the editor, not the reducer")]
    UnsupportedAction(&'static str),

    #[error("Hierarchy walk from {id} exceeded {limit} steps or revisited a node")]
    HierarchyCorrupted { id: String, limit: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Common(#[from] canvas_common::CommonError),
}

impl EditorError {
    pub(crate) fn wrong_kind(node: &crate::node::Node, property: &'static str) -> Self {
        EditorError::WrongNodeKind {
            id: node.id.clone(),
            property,
            kind: node.kind_name(),
        }
    }
}
