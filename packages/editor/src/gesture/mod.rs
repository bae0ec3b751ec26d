//! # Gesture State Machine
//!
//! One pointer interaction at a time: [`Gesture::Idle`] or exactly one active variant.
//!
//! ## Lifecycle
//!
//! ```text
//!   idle ──start(intent)──▶ active ──update(point)*──▶ active ──end()──▶ idle
//!                               │                                  ▲
//!                               └────────────cancel()──────────────┘ (restores the
//!                                                                    start document)
//! ```
//!
//! `start` captures a [`GestureOrigin`] (pointer, camera, document, hierarchy, selection)
//! plus whatever rectangles the variant needs from the geometry provider. Every
//! `update` recomputes its edit from that snapshot and the *cumulative* pointer
//! movement, never from the previous update, so replaying the same inputs always lands
//! on the same document.
//!
//! An update whose target vanished (deleted out of band) is a silent no-op.

pub mod corner_radius;
pub mod draw;
pub mod gap;
pub mod guide;
pub mod marquee;
pub mod rotate;
pub mod scale;
pub mod sort;
pub mod translate;
pub mod vertex;

use std::sync::Arc;

use canvas_common::{Axis, Point, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::document::Document;
use crate::geometry::{GeometryProvider, Transform};
use crate::hierarchy::HierarchyContext;
use crate::node::{Corner, Dimension, Handle, Node, NodeId};
use crate::reducer::ReduceContext;
use crate::state::{ContentEditMode, EditorState, Indicators, ShapeKind};
use crate::EditorError;

pub use corner_radius::CornerRadiusGesture;
pub use draw::{BrushGesture, DrawGesture};
pub use gap::{GapGesture, GapMember, GapMode};
pub use guide::GuideGesture;
pub use marquee::MarqueeGesture;
pub use rotate::RotateGesture;
pub use scale::{resize_frame, ScaleGesture};
pub use sort::{LayoutItem, LayoutSnapshot, SortGesture};
pub use translate::TranslateGesture;
pub use vertex::{CurveGesture, CurvePendingGesture, TranslateVertexGesture};

/// Keyboard modifiers held during an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Modifiers {
    /// Constrain: axis lock, aspect ratio, rotation snap, additive marquee
    pub shift: bool,
    /// Resize from center
    pub alt: bool,
    pub meta: bool,
}

/// Handle of the selection box being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeDirection {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl ResizeDirection {
    /// Which edges move: `-1` the left/top edge, `1` the right/bottom edge, `0` neither
    pub fn signs(self) -> (f64, f64) {
        match self {
            ResizeDirection::N => (0.0, -1.0),
            ResizeDirection::NE => (1.0, -1.0),
            ResizeDirection::E => (1.0, 0.0),
            ResizeDirection::SE => (1.0, 1.0),
            ResizeDirection::S => (0.0, 1.0),
            ResizeDirection::SW => (-1.0, 1.0),
            ResizeDirection::W => (-1.0, 0.0),
            ResizeDirection::NW => (-1.0, -1.0),
        }
    }
}

/// What the user pressed on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GestureIntent {
    /// Drag nodes; defaults to the selection
    Translate {
        #[serde(default)]
        ids: Option<Vec<NodeId>>,
    },
    Scale {
        direction: ResizeDirection,
        #[serde(default)]
        ids: Option<Vec<NodeId>>,
    },
    Rotate {
        #[serde(default)]
        ids: Option<Vec<NodeId>>,
    },
    /// Drag a corner-radius handle; `None` edits all corners
    CornerRadius {
        id: NodeId,
        #[serde(default)]
        corner: Option<Corner>,
    },
    /// Drag a node to a new place among its siblings
    Sort { id: NodeId },
    Gap {
        axis: Axis,
        #[serde(default)]
        ids: Option<Vec<NodeId>>,
    },
    /// Drag a ruler guide; `-1` creates a new one
    Guide { axis: Axis, index: i64 },
    Draw {
        shape: ShapeKind,
        #[serde(default)]
        parent_id: Option<NodeId>,
    },
    Brush {
        #[serde(default)]
        parent_id: Option<NodeId>,
    },
    TranslateVertex {
        #[serde(default)]
        indices: Option<Vec<usize>>,
    },
    Curve {
        segment: usize,
        handle: Handle,
        #[serde(default)]
        invert: bool,
    },
    /// Shape the outgoing tangent of a freshly placed vertex
    CurvePending { vertex: usize },
    Marquee,
}

/// Everything a gesture needs from the moment it started
#[derive(Debug, Clone)]
pub struct GestureOrigin {
    /// Screen position of the press
    pub pointer: Point,
    pub transform: Transform,
    pub document: Arc<Document>,
    pub hierarchy: Arc<HierarchyContext>,
    pub selection: Vec<NodeId>,
    pub content_edit_mode: ContentEditMode,
}

impl GestureOrigin {
    pub fn capture(state: &EditorState, pointer: Point) -> Self {
        Self {
            pointer,
            transform: state.transform,
            document: Arc::clone(&state.document),
            hierarchy: Arc::clone(&state.hierarchy),
            selection: state.selection.clone(),
            content_edit_mode: state.content_edit_mode.clone(),
        }
    }

    /// Pointer movement since the press, in canvas units
    pub fn canvas_delta(&self, point: Point) -> Vec2 {
        self.transform.screen_delta_to_canvas(point - self.pointer)
    }

    pub fn to_canvas(&self, point: Point) -> Point {
        self.transform.screen_to_canvas(point)
    }
}

/// One update's input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub point: Point,
    pub modifiers: Modifiers,
}

/// Position and size of a node in its parent's coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Store as an absolute frame with fixed size
    pub fn write_to(&self, node: &mut Node) {
        node.layout.left = Some(self.left);
        node.layout.top = Some(self.top);
        node.layout.right = None;
        node.layout.bottom = None;
        node.layout.width = Dimension::Fixed(self.width);
        node.layout.height = Dimension::Fixed(self.height);
    }
}

/// Canvas-space origin of `id`'s parent, `(0, 0)` for top-level nodes
pub(crate) fn parent_origin(state: &EditorState, geometry: &dyn GeometryProvider, id: &str) -> Point {
    state
        .hierarchy
        .parent_of(id)
        .and_then(|parent| geometry.node_bounding_rect(parent))
        .map(|r| state.transform.screen_to_canvas(r.origin()))
        .unwrap_or(Point::ORIGIN)
}

/// Current frame of a node: stored values where fixed, measured ones otherwise
pub(crate) fn measured_frame(state: &EditorState, geometry: &dyn GeometryProvider, id: &str) -> Option<Frame> {
    let node = state.node(id)?;
    let canvas = geometry
        .node_bounding_rect(id)
        .map(|r| state.transform.screen_rect_to_canvas(r));

    let width = node.layout.width.fixed().or_else(|| canvas.map(|r| r.width()))?;
    let height = node.layout.height.fixed().or_else(|| canvas.map(|r| r.height()))?;
    let (left, top) = match (node.layout.left, node.layout.top) {
        (Some(left), Some(top)) => (left, top),
        (left, top) => {
            let rect = canvas?;
            let origin = parent_origin(state, geometry, id);
            (
                left.unwrap_or(rect.x0 - origin.x),
                top.unwrap_or(rect.y0 - origin.y),
            )
        }
    };
    Some(Frame::new(left, top, width, height))
}

/// Explicit ids, or the selection, pruned and stripped of locked nodes and scene roots
pub(crate) fn gesture_targets(state: &EditorState, ids: Option<&[NodeId]>) -> Vec<NodeId> {
    let ids = ids.map(<[NodeId]>::to_vec).unwrap_or_else(|| state.selection.clone());
    crate::raycast::prune_nested_nodes(&state.hierarchy, &ids)
        .into_iter()
        .filter(|id| state.node(id).is_some_and(|n| !n.locked))
        .filter(|id| !state.is_constrained_root(id))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Translate(TranslateGesture),
    Scale(ScaleGesture),
    Rotate(RotateGesture),
    CornerRadius(CornerRadiusGesture),
    Sort(SortGesture),
    Gap(GapGesture),
    Guide(GuideGesture),
    Draw(DrawGesture),
    Brush(BrushGesture),
    TranslateVertex(TranslateVertexGesture),
    Curve(CurveGesture),
    CurvePending(CurvePendingGesture),
    Marquee(MarqueeGesture),
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::Translate(_) => "translate",
            Gesture::Scale(_) => "scale",
            Gesture::Rotate(_) => "rotate",
            Gesture::CornerRadius(_) => "cornerRadius",
            Gesture::Sort(_) => "sort",
            Gesture::Gap(_) => "gap",
            Gesture::Guide(_) => "guide",
            Gesture::Draw(_) => "draw",
            Gesture::Brush(_) => "brush",
            Gesture::TranslateVertex(_) => "translateVertex",
            Gesture::Curve(_) => "curve",
            Gesture::CurvePending(_) => "curvePending",
            Gesture::Marquee(_) => "marquee",
        }
    }

    pub fn origin(&self) -> Option<&GestureOrigin> {
        match self {
            Gesture::Idle => None,
            Gesture::Translate(g) => Some(&g.origin),
            Gesture::Scale(g) => Some(&g.origin),
            Gesture::Rotate(g) => Some(&g.origin),
            Gesture::CornerRadius(g) => Some(&g.origin),
            Gesture::Sort(g) => Some(&g.origin),
            Gesture::Gap(g) => Some(&g.origin),
            Gesture::Guide(g) => Some(&g.origin),
            Gesture::Draw(g) => Some(&g.origin),
            Gesture::Brush(g) => Some(&g.origin),
            Gesture::TranslateVertex(g) => Some(&g.origin),
            Gesture::Curve(g) => Some(&g.origin),
            Gesture::CurvePending(g) => Some(&g.origin),
            Gesture::Marquee(g) => Some(&g.origin),
        }
    }
}

/// Enter the gesture described by `intent`. Unmet preconditions leave the state as is.
pub(crate) fn start(
    state: &mut EditorState,
    intent: &GestureIntent,
    point: Point,
    ctx: &ReduceContext<'_>,
) -> Result<bool, EditorError> {
    if !state.gesture.is_idle() {
        warn!(active = state.gesture.name(), "Gesture started while another was active");
    }
    let origin = GestureOrigin::capture(state, point);

    let gesture = match intent {
        GestureIntent::Translate { ids } => {
            translate::TranslateGesture::start(state, origin, ids.as_deref(), ctx).map(Gesture::Translate)
        }
        GestureIntent::Scale { direction, ids } => {
            scale::ScaleGesture::start(state, origin, *direction, ids.as_deref(), ctx).map(Gesture::Scale)
        }
        GestureIntent::Rotate { ids } => {
            rotate::RotateGesture::start(state, origin, ids.as_deref(), ctx).map(Gesture::Rotate)
        }
        GestureIntent::CornerRadius { id, corner } => {
            corner_radius::CornerRadiusGesture::start(state, origin, id, *corner)?.map(Gesture::CornerRadius)
        }
        GestureIntent::Sort { id } => sort::SortGesture::start(state, origin, id, ctx).map(Gesture::Sort),
        GestureIntent::Gap { axis, ids } => {
            gap::GapGesture::start(state, origin, *axis, ids.as_deref(), ctx).map(Gesture::Gap)
        }
        GestureIntent::Guide { axis, index } => {
            guide::GuideGesture::start(state, origin, *axis, *index).map(Gesture::Guide)
        }
        GestureIntent::Draw { shape, parent_id } => {
            draw::DrawGesture::start(state, origin, *shape, parent_id.as_deref(), ctx)?.map(Gesture::Draw)
        }
        GestureIntent::Brush { parent_id } => {
            draw::BrushGesture::start(state, origin, parent_id.as_deref(), ctx)?.map(Gesture::Brush)
        }
        GestureIntent::TranslateVertex { indices } => {
            vertex::TranslateVertexGesture::start(state, origin, indices.as_deref())?.map(Gesture::TranslateVertex)
        }
        GestureIntent::Curve {
            segment,
            handle,
            invert,
        } => vertex::CurveGesture::start(state, origin, *segment, *handle, *invert)?.map(Gesture::Curve),
        GestureIntent::CurvePending { vertex } => {
            vertex::CurvePendingGesture::start(state, origin, *vertex)?.map(Gesture::CurvePending)
        }
        GestureIntent::Marquee => Some(Gesture::Marquee(marquee::MarqueeGesture { origin })),
    };

    let Some(gesture) = gesture else {
        debug!("Gesture preconditions not met");
        return Ok(false);
    };
    debug!(gesture = gesture.name(), "Gesture started");
    state.gesture = gesture;
    state.gesture_generation += 1;
    state.indicators = Indicators::default();
    Ok(true)
}

pub(crate) fn update(
    state: &mut EditorState,
    point: Point,
    modifiers: Modifiers,
    ctx: &ReduceContext<'_>,
) -> Result<bool, EditorError> {
    let input = PointerInput { point, modifiers };
    let mut gesture = std::mem::take(&mut state.gesture);

    let changed = match &mut gesture {
        Gesture::Idle => {
            debug!("Update without an active gesture");
            false
        }
        Gesture::Translate(g) => g.update(state, &input)?,
        Gesture::Scale(g) => g.update(state, &input)?,
        Gesture::Rotate(g) => g.update(state, &input, ctx)?,
        Gesture::CornerRadius(g) => g.update(state, &input)?,
        Gesture::Sort(g) => g.update(state, &input),
        Gesture::Gap(g) => g.update(state, &input)?,
        Gesture::Guide(g) => g.update(state, &input),
        Gesture::Draw(g) => g.update(state, &input)?,
        Gesture::Brush(g) => g.update(state, &input),
        Gesture::TranslateVertex(g) => g.update(state, &input)?,
        Gesture::Curve(g) => g.update(state, &input)?,
        Gesture::CurvePending(g) => g.update(state, &input),
        Gesture::Marquee(g) => g.update(state, &input, ctx),
    };

    state.gesture = gesture;
    Ok(changed)
}

/// Finish the active gesture and return to idle
pub(crate) fn end(state: &mut EditorState, ctx: &ReduceContext<'_>) -> Result<bool, EditorError> {
    let gesture = std::mem::take(&mut state.gesture);
    if gesture.is_idle() {
        return Ok(false);
    }
    debug!(gesture = gesture.name(), "Gesture ended");

    match gesture {
        Gesture::Sort(g) => {
            g.end(state)?;
        }
        Gesture::Guide(g) => g.end(state, ctx),
        Gesture::Draw(g) => g.end(state),
        Gesture::Brush(g) => {
            g.end(state)?;
        }
        _ => {}
    }
    state.indicators = Indicators::default();
    Ok(true)
}

/// Abort the active gesture, restoring the document it started from
pub(crate) fn cancel(state: &mut EditorState) -> Result<bool, EditorError> {
    let gesture = std::mem::take(&mut state.gesture);
    let Some(origin) = gesture.origin() else {
        return Ok(false);
    };
    debug!(gesture = gesture.name(), "Gesture cancelled");

    if !Arc::ptr_eq(&state.document, &origin.document) {
        state.document = Arc::clone(&origin.document);
        state.hierarchy = Arc::clone(&origin.hierarchy);
    }
    state.selection = origin.selection.clone();
    state.content_edit_mode = origin.content_edit_mode.clone();
    state.indicators = Indicators::default();
    Ok(true)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::action::Action;
    use crate::geometry::StaticGeometry;
    use crate::reducer::test_support::run;

    pub(crate) fn start_gesture(
        state: &Arc<EditorState>,
        geometry: &StaticGeometry,
        intent: GestureIntent,
        point: Point,
    ) -> Arc<EditorState> {
        run(state, geometry, Action::StartGesture { intent, point }).unwrap()
    }

    pub(crate) fn drag(state: &Arc<EditorState>, geometry: &StaticGeometry, point: Point) -> Arc<EditorState> {
        drag_with(state, geometry, point, Modifiers::default())
    }

    pub(crate) fn drag_with(
        state: &Arc<EditorState>,
        geometry: &StaticGeometry,
        point: Point,
        modifiers: Modifiers,
    ) -> Arc<EditorState> {
        run(state, geometry, Action::UpdateGesture { point, modifiers }).unwrap()
    }

    pub(crate) fn finish(state: &Arc<EditorState>, geometry: &StaticGeometry) -> Arc<EditorState> {
        run(state, geometry, Action::EndGesture).unwrap()
    }
}
