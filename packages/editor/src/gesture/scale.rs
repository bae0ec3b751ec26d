//! Resize nodes from one of the eight selection handles
//!
//! Every node is resized independently against its own start frame. The first update
//! writes fixed sizes, which pins nodes that were auto-sized.

use canvas_common::Vec2;
use tracing::debug;

use super::{gesture_targets, measured_frame, Frame, GestureOrigin, PointerInput, ResizeDirection};
use crate::node::NodeId;
use crate::reducer::{update_node, ReduceContext};
use crate::state::EditorState;
use crate::EditorError;

#[derive(Debug, Clone)]
pub struct ScaleGesture {
    pub origin: GestureOrigin,
    pub direction: ResizeDirection,
    pub frames: Vec<(NodeId, Frame)>,
}

impl ScaleGesture {
    pub(super) fn start(
        state: &EditorState,
        origin: GestureOrigin,
        direction: ResizeDirection,
        ids: Option<&[NodeId]>,
        ctx: &ReduceContext<'_>,
    ) -> Option<Self> {
        let frames: Vec<(NodeId, Frame)> = gesture_targets(state, ids)
            .into_iter()
            .filter_map(|id| measured_frame(state, ctx.geometry, &id).map(|f| (id, f)))
            .collect();
        if frames.is_empty() {
            return None;
        }
        Some(Self {
            origin,
            direction,
            frames,
        })
    }

    pub(super) fn update(&self, state: &mut EditorState, input: &PointerInput) -> Result<bool, EditorError> {
        let delta = self.origin.canvas_delta(input.point);
        let mut changed = false;
        for (id, frame) in &self.frames {
            if state.node(id).is_none() {
                debug!(node_id = %id, "Scaled node is gone");
                continue;
            }
            let next = resize_frame(*frame, self.direction, delta, input.modifiers.shift, input.modifiers.alt);
            changed |= update_node(state, id, |node| {
                next.write_to(node);
                Ok(())
            })?;
        }
        Ok(changed)
    }
}

/// Resize `frame` by dragging the `direction` handle by `delta`.
///
/// The opposite edge stays put unless `from_center`, in which case both edges move and
/// the center stays put. Sizes never go below zero.
pub fn resize_frame(
    frame: Frame,
    direction: ResizeDirection,
    delta: Vec2,
    keep_aspect: bool,
    from_center: bool,
) -> Frame {
    let (sx, sy) = direction.signs();
    let factor = if from_center { 2.0 } else { 1.0 };

    let mut width = (frame.width + sx * delta.x * factor).max(0.0);
    let mut height = (frame.height + sy * delta.y * factor).max(0.0);

    if keep_aspect && frame.width > 0.0 && frame.height > 0.0 {
        let ratio = frame.width / frame.height;
        if sx != 0.0 && sy != 0.0 {
            let rx = (width - frame.width) / frame.width;
            let ry = (height - frame.height) / frame.height;
            if rx.abs() >= ry.abs() {
                height = width / ratio;
            } else {
                width = height * ratio;
            }
        } else if sx != 0.0 {
            height = width / ratio;
        } else {
            width = height * ratio;
        }
    }

    let place = |start: f64, initial: f64, size: f64, sign: f64| {
        if from_center || sign == 0.0 {
            start - (size - initial) / 2.0
        } else if sign < 0.0 {
            start + initial - size
        } else {
            start
        }
    };

    Frame::new(
        place(frame.left, frame.width, width, sx),
        place(frame.top, frame.height, height, sy),
        width,
        height,
    )
}
