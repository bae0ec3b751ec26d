//! # Editor State
//!
//! The immutable value the reducer maps to a new value. Large pieces (document,
//! hierarchy, clipboard) sit behind `Arc`; cloning a state to derive the next one is
//! cheap and unchanged parts stay shared with the previous state and with history.

use std::sync::Arc;

use canvas_common::{IdGenerator, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::document::{Document, Scene, SceneId};
use crate::gesture::Gesture;
use crate::geometry::Transform;
use crate::hierarchy::HierarchyContext;
use crate::node::{Node, NodeId};
use crate::reducer::clipboard::NodePrototype;
use crate::EditorError;

/// Shapes the insert tool and the draw gesture can create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Text,
    Container,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Tool {
    #[default]
    Select,
    Insert {
        shape: ShapeKind,
    },
    Brush,
    Path,
}

/// What the user is editing inside a single node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ContentEditMode {
    #[default]
    None,
    Text {
        node_id: NodeId,
    },
    Path {
        node_id: NodeId,
        #[serde(default)]
        selected_vertices: Vec<usize>,
        /// Outgoing tangent for the next segment, set by a pending-curve drag
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pending_tangent: Option<Vec2>,
    },
}

impl ContentEditMode {
    pub fn node_id(&self) -> Option<&str> {
        match self {
            ContentEditMode::None => None,
            ContentEditMode::Text { node_id } | ContentEditMode::Path { node_id, .. } => {
                Some(node_id)
            }
        }
    }

    pub fn path_node(&self) -> Option<&str> {
        match self {
            ContentEditMode::Path { node_id, .. } => Some(node_id),
            _ => None,
        }
    }
}

/// Where a sort drag would drop
#[derive(Debug, Clone, PartialEq)]
pub enum Dropzone {
    /// Between siblings: insertion index in the parent (moved node excluded) and the
    /// indicator rectangle in screen space
    Index {
        parent_id: NodeId,
        index: usize,
        rect: Rect,
    },
    /// Into another node
    Target { node_id: NodeId },
}

/// Transient feedback for external rendering
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Indicators {
    pub dropzone: Option<Dropzone>,
    pub marquee: Option<Rect>,
}

impl Indicators {
    pub fn is_empty(&self) -> bool {
        self.dropzone.is_none() && self.marquee.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub show_rulers: bool,
    pub snap_rotation: bool,
}

#[derive(Debug, Clone)]
pub struct EditorState {
    pub document: Arc<Document>,
    pub hierarchy: Arc<HierarchyContext>,
    pub selection: Vec<NodeId>,
    pub hover: Option<NodeId>,
    pub scene_id: SceneId,
    pub tool: Tool,
    pub gesture: Gesture,
    /// Bumped on every gesture start; tells consecutive updates of one drag apart
    pub gesture_generation: u64,
    pub content_edit_mode: ContentEditMode,
    pub transform: Transform,
    pub indicators: Indicators,
    pub settings: Settings,
    /// Bumped when another document is loaded; undo and redo restore it with the snapshot
    pub document_key: u64,
    pub clipboard: Option<Arc<Vec<NodePrototype>>>,
    pub id_generator: IdGenerator,
}

impl EditorState {
    /// Start editing `document`, showing its first scene
    pub fn new(document: Document) -> Result<Self, EditorError> {
        let scene_id = document
            .scene_order
            .first()
            .cloned()
            .ok_or_else(|| EditorError::SceneNotFound("<none>".to_string()))?;
        let hierarchy = HierarchyContext::build(&document);

        Ok(Self {
            document: Arc::new(document),
            hierarchy: Arc::new(hierarchy),
            selection: Vec::new(),
            hover: None,
            scene_id,
            tool: Tool::Select,
            gesture: Gesture::Idle,
            gesture_generation: 0,
            content_edit_mode: ContentEditMode::None,
            transform: Transform::IDENTITY,
            indicators: Indicators::default(),
            settings: Settings::default(),
            document_key: 0,
            clipboard: None,
            id_generator: IdGenerator::default(),
        })
    }

    /// A blank document with one multi-child scene
    pub fn empty() -> Self {
        let scene = Scene::new("scene-1", "Page 1");
        let document = Document::with_scene(scene);
        let hierarchy = HierarchyContext::build(&document);
        Self {
            document: Arc::new(document),
            hierarchy: Arc::new(hierarchy),
            selection: Vec::new(),
            hover: None,
            scene_id: "scene-1".to_string(),
            tool: Tool::Select,
            gesture: Gesture::Idle,
            gesture_generation: 0,
            content_edit_mode: ContentEditMode::None,
            transform: Transform::IDENTITY,
            indicators: Indicators::default(),
            settings: Settings::default(),
            document_key: 0,
            clipboard: None,
            id_generator: IdGenerator::default(),
        }
    }

    pub fn with_id_generator(mut self, id_generator: IdGenerator) -> Self {
        self.id_generator = id_generator;
        self
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.document.node(id)
    }

    pub fn current_scene(&self) -> Option<&Scene> {
        self.document.scene(&self.scene_id)
    }

    /// Copy-on-write access to the document
    pub fn doc_mut(&mut self) -> &mut Document {
        Arc::make_mut(&mut self.document)
    }

    /// Re-derive the hierarchy from the document after a structural edit
    pub fn rebuild_hierarchy(&mut self) {
        self.hierarchy = Arc::new(HierarchyContext::build(&self.document));
    }

    /// Whether `id` is the mandatory root of a single-child scene
    pub fn is_constrained_root(&self, id: &str) -> bool {
        self.document
            .scenes
            .values()
            .any(|scene| scene.constrained_root() == Some(id))
    }

    pub fn is_editing_path(&self) -> bool {
        self.content_edit_mode.path_node().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_a_scene() {
        assert!(matches!(
            EditorState::new(Document::default()),
            Err(EditorError::SceneNotFound(_))
        ));
    }

    #[test]
    fn test_empty_state_shows_first_scene() {
        let state = EditorState::empty();
        assert_eq!(state.current_scene().unwrap().name, "Page 1");
        assert!(state.gesture.is_idle());
        assert!(state.indicators.is_empty());
    }

    #[test]
    fn test_content_edit_mode_serializes_tagged() {
        let mode = ContentEditMode::Path {
            node_id: "p1".into(),
            selected_vertices: vec![0],
            pending_tangent: None,
        };
        let json = serde_json::to_value(&mode).unwrap();
        assert_eq!(json["type"], "path");
        assert_eq!(json["nodeId"], "p1");
    }
}
