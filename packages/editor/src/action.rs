//! # Actions
//!
//! The closed set of inputs the editor accepts. Every edit of the document, the
//! selection, the camera or the active gesture is one of these records.
//!
//! Actions serialize with an internal `"type"` tag; unknown kinds fail to
//! deserialize.

use canvas_common::{Point, Vec2};
use serde::{Deserialize, Serialize};

use crate::document::{SceneConstraint, SceneId};
use crate::geometry::Transform;
use crate::gesture::{GestureIntent, Modifiers};
use crate::node::{
    Color, Dimension, FlexLayout, Node, NodeId, NodePatch, Paint, PositionMode,
    PropertyDefinition, PropertyKind, Stroke, TextAlign, VectorNetwork,
};
use crate::reducer::clipboard::NodePrototype;
use crate::state::{ContentEditMode, Tool};
use crate::template::Template;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionMode {
    #[default]
    Replace,
    Add,
    Toggle,
}

/// Destination of a z-order change among siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReorderTarget {
    Front,
    Back,
    Forward,
    Backward,
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "camelCase",
    rename_all_fields = "camelCase",
    deny_unknown_fields
)]
pub enum Action {
    // Node properties
    SetName {
        id: NodeId,
        name: String,
    },
    SetActive {
        ids: Vec<NodeId>,
        active: bool,
    },
    SetLocked {
        ids: Vec<NodeId>,
        locked: bool,
    },
    SetPosition {
        id: NodeId,
        #[serde(default)]
        left: Option<f64>,
        #[serde(default)]
        top: Option<f64>,
    },
    /// Nudge by a canvas-space offset
    MoveBy {
        ids: Vec<NodeId>,
        delta: Vec2,
    },
    SetPositionMode {
        ids: Vec<NodeId>,
        mode: PositionMode,
    },
    SetSize {
        ids: Vec<NodeId>,
        #[serde(default)]
        width: Option<Dimension>,
        #[serde(default)]
        height: Option<Dimension>,
    },
    SetRotation {
        ids: Vec<NodeId>,
        rotation: f64,
    },
    SetOpacity {
        ids: Vec<NodeId>,
        opacity: f64,
    },
    SetFills {
        ids: Vec<NodeId>,
        fills: Vec<Paint>,
    },
    SetStrokes {
        ids: Vec<NodeId>,
        strokes: Vec<Stroke>,
    },
    SetTextContent {
        id: NodeId,
        content: String,
    },
    SetFontFamily {
        ids: Vec<NodeId>,
        family: String,
    },
    SetFontSize {
        ids: Vec<NodeId>,
        size: f64,
    },
    SetTextAlign {
        ids: Vec<NodeId>,
        align: TextAlign,
    },
    /// Corners left as `None` keep their current value
    SetCornerRadius {
        ids: Vec<NodeId>,
        #[serde(default)]
        top_left_radius: Option<f64>,
        #[serde(default)]
        top_right_radius: Option<f64>,
        #[serde(default)]
        bottom_right_radius: Option<f64>,
        #[serde(default)]
        bottom_left_radius: Option<f64>,
    },
    SetFlexLayout {
        ids: Vec<NodeId>,
        flex: Option<FlexLayout>,
    },
    SetGap {
        ids: Vec<NodeId>,
        #[serde(default)]
        main_axis_gap: Option<f64>,
        #[serde(default)]
        cross_axis_gap: Option<f64>,
    },
    SetImageSource {
        ids: Vec<NodeId>,
        src: String,
    },
    SetVectorNetwork {
        id: NodeId,
        network: VectorNetwork,
    },

    // Structure
    /// Insert a single childless node under `parent_id` (scene top level when `None`)
    InsertNode {
        #[serde(default)]
        parent_id: Option<NodeId>,
        #[serde(default)]
        index: Option<usize>,
        node: Node,
    },
    /// Insert subtrees with freshly generated ids and select them
    InsertPrototypes {
        #[serde(default)]
        parent_id: Option<NodeId>,
        #[serde(default)]
        index: Option<usize>,
        prototypes: Vec<NodePrototype>,
    },
    DeleteNodes {
        ids: Vec<NodeId>,
    },
    MoveNodes {
        ids: Vec<NodeId>,
        #[serde(default)]
        parent_id: Option<NodeId>,
        #[serde(default)]
        index: Option<usize>,
    },
    Reorder {
        ids: Vec<NodeId>,
        target: ReorderTarget,
    },
    GroupNodes {
        ids: Vec<NodeId>,
        #[serde(default)]
        name: Option<String>,
    },
    UngroupNodes {
        ids: Vec<NodeId>,
    },

    // Scenes
    CreateScene {
        name: String,
        #[serde(default)]
        constraint: SceneConstraint,
    },
    DeleteScene {
        id: SceneId,
    },
    DuplicateScene {
        id: SceneId,
    },
    RenameScene {
        id: SceneId,
        name: String,
    },
    SetSceneBackground {
        id: SceneId,
        background: Option<Color>,
    },
    SelectScene {
        id: SceneId,
    },

    // Selection and focus
    SelectNodes {
        ids: Vec<NodeId>,
        #[serde(default)]
        mode: SelectionMode,
    },
    SelectAll,
    ClearSelection,
    SetHover {
        id: Option<NodeId>,
    },
    SetTool {
        tool: Tool,
    },
    SetContentEditMode {
        mode: ContentEditMode,
    },
    SelectVertices {
        indices: Vec<usize>,
        #[serde(default)]
        mode: SelectionMode,
    },
    /// Add a vertex to the path being edited, optionally linked from an existing vertex
    InsertPathVertex {
        point: Point,
        #[serde(default)]
        connect_from: Option<usize>,
    },
    DeletePathVertices {
        indices: Vec<usize>,
    },

    // Clipboard
    Copy {
        ids: Vec<NodeId>,
    },
    Cut {
        ids: Vec<NodeId>,
    },
    Paste {
        #[serde(default)]
        parent_id: Option<NodeId>,
    },
    Duplicate {
        ids: Vec<NodeId>,
    },

    // Component property schema
    DefineProperty {
        id: NodeId,
        definition: PropertyDefinition,
    },
    RenameProperty {
        id: NodeId,
        from: String,
        to: String,
    },
    UpdateProperty {
        id: NodeId,
        name: String,
        #[serde(default)]
        kind: Option<PropertyKind>,
        #[serde(default)]
        default: Option<serde_json::Value>,
    },
    DeleteProperty {
        id: NodeId,
        name: String,
    },

    // Templates
    DefineTemplate {
        template: Template,
    },
    /// Move a subtree into a new template and leave an instance in its place
    CreateTemplateFromNode {
        id: NodeId,
        name: String,
    },
    SetOverride {
        id: NodeId,
        sub_id: NodeId,
        patch: NodePatch,
    },
    ClearOverride {
        id: NodeId,
        sub_id: NodeId,
    },
    /// Expand an instance into live nodes with fresh ids
    DetachInstance {
        id: NodeId,
    },

    // Gestures
    StartGesture {
        intent: GestureIntent,
        point: Point,
    },
    UpdateGesture {
        point: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    EndGesture,
    CancelGesture,

    // Camera
    SetTransform {
        transform: Transform,
    },
    Pan {
        delta: Vec2,
    },
    ZoomAt {
        factor: f64,
        origin: Point,
    },
    /// Animated; handled by the editor
    ZoomToFit {
        #[serde(default)]
        ids: Vec<NodeId>,
    },

    // Settings
    SetSnapRotation {
        enabled: bool,
    },
    SetShowRulers {
        enabled: bool,
    },

    // History; handled by the editor
    Undo,
    Redo,
}

impl Action {
    /// Stable name used for logging and history entries
    pub fn kind(&self) -> &'static str {
        match self {
            Action::SetName { .. } => "setName",
            Action::SetActive { .. } => "setActive",
            Action::SetLocked { .. } => "setLocked",
            Action::SetPosition { .. } => "setPosition",
            Action::MoveBy { .. } => "moveBy",
            Action::SetPositionMode { .. } => "setPositionMode",
            Action::SetSize { .. } => "setSize",
            Action::SetRotation { .. } => "setRotation",
            Action::SetOpacity { .. } => "setOpacity",
            Action::SetFills { .. } => "setFills",
            Action::SetStrokes { .. } => "setStrokes",
            Action::SetTextContent { .. } => "setTextContent",
            Action::SetFontFamily { .. } => "setFontFamily",
            Action::SetFontSize { .. } => "setFontSize",
            Action::SetTextAlign { .. } => "setTextAlign",
            Action::SetCornerRadius { .. } => "setCornerRadius",
            Action::SetFlexLayout { .. } => "setFlexLayout",
            Action::SetGap { .. } => "setGap",
            Action::SetImageSource { .. } => "setImageSource",
            Action::SetVectorNetwork { .. } => "setVectorNetwork",
            Action::InsertNode { .. } => "insertNode",
            Action::InsertPrototypes { .. } => "insertPrototypes",
            Action::DeleteNodes { .. } => "deleteNodes",
            Action::MoveNodes { .. } => "moveNodes",
            Action::Reorder { .. } => "reorder",
            Action::GroupNodes { .. } => "groupNodes",
            Action::UngroupNodes { .. } => "ungroupNodes",
            Action::CreateScene { .. } => "createScene",
            Action::DeleteScene { .. } => "deleteScene",
            Action::DuplicateScene { .. } => "duplicateScene",
            Action::RenameScene { .. } => "renameScene",
            Action::SetSceneBackground { .. } => "setSceneBackground",
            Action::SelectScene { .. } => "selectScene",
            Action::SelectNodes { .. } => "selectNodes",
            Action::SelectAll => "selectAll",
            Action::ClearSelection => "clearSelection",
            Action::SetHover { .. } => "setHover",
            Action::SetTool { .. } => "setTool",
            Action::SetContentEditMode { .. } => "setContentEditMode",
            Action::SelectVertices { .. } => "selectVertices",
            Action::InsertPathVertex { .. } => "insertPathVertex",
            Action::DeletePathVertices { .. } => "deletePathVertices",
            Action::Copy { .. } => "copy",
            Action::Cut { .. } => "cut",
            Action::Paste { .. } => "paste",
            Action::Duplicate { .. } => "duplicate",
            Action::DefineProperty { .. } => "defineProperty",
            Action::RenameProperty { .. } => "renameProperty",
            Action::UpdateProperty { .. } => "updateProperty",
            Action::DeleteProperty { .. } => "deleteProperty",
            Action::DefineTemplate { .. } => "defineTemplate",
            Action::CreateTemplateFromNode { .. } => "createTemplateFromNode",
            Action::SetOverride { .. } => "setOverride",
            Action::ClearOverride { .. } => "clearOverride",
            Action::DetachInstance { .. } => "detachInstance",
            Action::StartGesture { .. } => "startGesture",
            Action::UpdateGesture { .. } => "updateGesture",
            Action::EndGesture => "endGesture",
            Action::CancelGesture => "cancelGesture",
            Action::SetTransform { .. } => "setTransform",
            Action::Pan { .. } => "pan",
            Action::ZoomAt { .. } => "zoomAt",
            Action::ZoomToFit { .. } => "zoomToFit",
            Action::SetSnapRotation { .. } => "setSnapRotation",
            Action::SetShowRulers { .. } => "setShowRulers",
            Action::Undo => "undo",
            Action::Redo => "redo",
        }
    }

    /// Whether this action belongs to an in-progress pointer gesture
    pub fn is_gesture(&self) -> bool {
        matches!(
            self,
            Action::StartGesture { .. }
                | Action::UpdateGesture { .. }
                | Action::EndGesture
                | Action::CancelGesture
        )
    }
}
