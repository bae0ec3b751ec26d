//! Create nodes by dragging: shapes from the insert tool, freehand paths from the brush

use canvas_common::{Point, Rect};
use tracing::debug;

use super::{Frame, GestureOrigin, PointerInput};
use crate::geometry::GeometryProvider;
use crate::node::{Color, Node, NodeId, Paint, Segment, Stroke, VectorNetwork};
use crate::reducer::structure::{default_parent, insert_node, resolve_target};
use crate::reducer::{update_node, ReduceContext};
use crate::state::{ContentEditMode, EditorState, ShapeKind, Tool};
use crate::EditorError;

const BRUSH_STROKE_WIDTH: f64 = 2.0;

/// Explicit parent or the scene root; `None` inside means the scene's top level.
/// The outer `None` refuses the gesture.
fn draw_parent(
    state: &EditorState,
    parent_id: Option<&str>,
) -> Result<Option<Option<NodeId>>, EditorError> {
    let parent = parent_id.map(str::to_string).or_else(|| default_parent(state));
    Ok(resolve_target(state, parent.as_deref())?.map(|target| target.parent_id().map(str::to_string)))
}

/// Canvas position of the parent's top-left corner
fn parent_canvas_origin(state: &EditorState, geometry: &dyn GeometryProvider, parent_id: Option<&str>) -> Point {
    parent_id
        .and_then(|id| geometry.node_bounding_rect(id))
        .map(|r| state.transform.screen_to_canvas(r.origin()))
        .unwrap_or(Point::ORIGIN)
}

fn shape_node(shape: ShapeKind, id: NodeId) -> Node {
    match shape {
        ShapeKind::Rectangle => Node::rectangle(id),
        ShapeKind::Ellipse => Node::ellipse(id),
        ShapeKind::Text => Node::text(id, ""),
        ShapeKind::Container => Node::container(id),
    }
}

fn parent_is_gone(state: &EditorState, parent_id: Option<&str>) -> bool {
    parent_id.is_some_and(|id| !state.document.contains(id))
}

#[derive(Debug, Clone)]
pub struct DrawGesture {
    pub origin: GestureOrigin,
    pub shape: ShapeKind,
    pub parent_id: Option<NodeId>,
    pub parent_origin: Point,
    /// Created on the first update with a non-empty size
    pub node_id: Option<NodeId>,
}

impl DrawGesture {
    pub(super) fn start(
        state: &EditorState,
        origin: GestureOrigin,
        shape: ShapeKind,
        parent_id: Option<&str>,
        ctx: &ReduceContext<'_>,
    ) -> Result<Option<Self>, EditorError> {
        let Some(parent_id) = draw_parent(state, parent_id)? else {
            return Ok(None);
        };
        let parent_origin = parent_canvas_origin(state, ctx.geometry, parent_id.as_deref());
        Ok(Some(Self {
            origin,
            shape,
            parent_id,
            parent_origin,
            node_id: None,
        }))
    }

    /// Frame spanned by the press and `point`, in the parent's coordinates
    fn frame(&self, point: Point, square: bool) -> Frame {
        let from = self.origin.to_canvas(self.origin.pointer);
        let mut delta = self.origin.canvas_delta(point);
        if square {
            let side = delta.x.abs().max(delta.y.abs());
            delta.x = side.copysign(delta.x);
            delta.y = side.copysign(delta.y);
        }
        let rect = Rect::from_points(from, from + delta) - self.parent_origin.to_vec2();
        Frame::new(rect.x0, rect.y0, rect.width(), rect.height())
    }

    pub(super) fn update(&mut self, state: &mut EditorState, input: &PointerInput) -> Result<bool, EditorError> {
        let frame = self.frame(input.point, input.modifiers.shift);

        match &self.node_id {
            Some(id) => {
                if state.node(id).is_none() {
                    return Ok(false);
                }
                update_node(state, id, |node| {
                    frame.write_to(node);
                    Ok(())
                })
            }
            None => {
                if frame.width == 0.0 && frame.height == 0.0 {
                    return Ok(false);
                }
                if parent_is_gone(state, self.parent_id.as_deref()) {
                    debug!("Draw parent is gone");
                    return Ok(false);
                }
                let id = state.id_generator.new_id();
                let mut node = shape_node(self.shape, id.clone());
                frame.write_to(&mut node);
                let inserted = insert_node(state, node, self.parent_id.as_deref(), None)?;
                if inserted {
                    self.node_id = Some(id);
                }
                Ok(inserted)
            }
        }
    }

    pub(super) fn end(self, state: &mut EditorState) {
        let Some(id) = self.node_id.filter(|id| state.document.contains(id)) else {
            return;
        };
        if self.shape == ShapeKind::Text {
            state.content_edit_mode = ContentEditMode::Text { node_id: id.clone() };
        }
        state.selection = vec![id];
        state.tool = Tool::Select;
    }
}

#[derive(Debug, Clone)]
pub struct BrushGesture {
    pub origin: GestureOrigin,
    pub parent_id: Option<NodeId>,
    pub parent_origin: Point,
    /// Canvas points of the stroke so far
    pub points: Vec<Point>,
}

impl BrushGesture {
    pub(super) fn start(
        state: &EditorState,
        origin: GestureOrigin,
        parent_id: Option<&str>,
        ctx: &ReduceContext<'_>,
    ) -> Result<Option<Self>, EditorError> {
        let Some(parent_id) = draw_parent(state, parent_id)? else {
            return Ok(None);
        };
        let parent_origin = parent_canvas_origin(state, ctx.geometry, parent_id.as_deref());
        let first = origin.to_canvas(origin.pointer);
        Ok(Some(Self {
            origin,
            parent_id,
            parent_origin,
            points: vec![first],
        }))
    }

    /// Record a point; the path node is only built on end
    pub(super) fn update(&mut self, _state: &mut EditorState, input: &PointerInput) -> bool {
        let point = self.origin.to_canvas(input.point);
        if self.points.last() == Some(&point) {
            return false;
        }
        self.points.push(point);
        true
    }

    /// Path node for the recorded stroke, framed by its bounding box
    pub fn build_path(&self, id: NodeId) -> Option<Node> {
        if self.points.len() < 2 {
            return None;
        }
        let bounds = self
            .points
            .iter()
            .skip(1)
            .fold(Rect::from_points(self.points[0], self.points[0]), |r, p| r.union_pt(*p));
        let corner = bounds.origin().to_vec2();

        let network = VectorNetwork {
            vertices: self.points.iter().map(|p| *p - corner).collect(),
            segments: (1..self.points.len()).map(|i| Segment::line(i - 1, i)).collect(),
        };
        let mut node = Node::path(id, network);
        node.style.strokes = vec![Stroke {
            paint: Paint::solid(Color::BLACK),
            width: BRUSH_STROKE_WIDTH,
        }];
        Frame::new(
            bounds.x0 - self.parent_origin.x,
            bounds.y0 - self.parent_origin.y,
            bounds.width(),
            bounds.height(),
        )
        .write_to(&mut node);
        Some(node)
    }

    pub(super) fn end(self, state: &mut EditorState) -> Result<bool, EditorError> {
        if self.points.len() < 2 || parent_is_gone(state, self.parent_id.as_deref()) {
            debug!(points = self.points.len(), "Brush stroke discarded");
            return Ok(false);
        }
        let id = state.id_generator.new_id();
        let Some(node) = self.build_path(id.clone()) else {
            return Ok(false);
        };
        if !insert_node(state, node, self.parent_id.as_deref(), None)? {
            return Ok(false);
        }
        state.selection = vec![id];
        Ok(true)
    }
}
