//! Drag nodes by the pointer delta

use canvas_common::Vec2;
use tracing::debug;

use super::{gesture_targets, measured_frame, Frame, GestureOrigin, PointerInput};
use crate::node::{Dimension, NodeId};
use crate::reducer::{update_node, ReduceContext};
use crate::state::EditorState;
use crate::EditorError;

#[derive(Debug, Clone)]
pub struct TranslateGesture {
    pub origin: GestureOrigin,
    /// Frame of every dragged node at start
    pub frames: Vec<(NodeId, Frame)>,
}

impl TranslateGesture {
    pub(super) fn start(
        state: &EditorState,
        origin: GestureOrigin,
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
        Some(Self { origin, frames })
    }

    pub(super) fn update(&self, state: &mut EditorState, input: &PointerInput) -> Result<bool, EditorError> {
        let mut delta = self.origin.canvas_delta(input.point);
        if input.modifiers.shift {
            delta = lock_axis(delta);
        }

        let mut changed = false;
        for (id, frame) in &self.frames {
            if state.node(id).is_none() {
                debug!(node_id = %id, "Translated node is gone");
                continue;
            }
            changed |= update_node(state, id, |node| {
                // an edge anchored frame is pinned to its size before it moves
                if node.layout.right.is_some() || node.layout.bottom.is_some() {
                    node.layout.width = Dimension::Fixed(frame.width);
                    node.layout.height = Dimension::Fixed(frame.height);
                    node.layout.right = None;
                    node.layout.bottom = None;
                }
                node.layout.left = Some(frame.left + delta.x);
                node.layout.top = Some(frame.top + delta.y);
                Ok(())
            })?;
        }
        Ok(changed)
    }
}

/// Keep only the dominant component
fn lock_axis(delta: Vec2) -> Vec2 {
    if delta.x.abs() >= delta.y.abs() {
        Vec2::new(delta.x, 0.0)
    } else {
        Vec2::new(0.0, delta.y)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use canvas_common::Point;

    use super::super::test_support::*;
    use super::super::{GestureIntent, Modifiers};
    use super::*;
    use crate::geometry::Transform;
    use crate::reducer::test_support::{geometry, sample_state};

    fn start(state: &Arc<EditorState>, ids: &[&str]) -> Arc<EditorState> {
        start_gesture(
            state,
            &geometry(),
            GestureIntent::Translate {
                ids: Some(ids.iter().map(|s| s.to_string()).collect()),
            },
            Point::new(0.0, 0.0),
        )
    }

    #[test]
    fn test_shift_locks_dominant_axis() {
        let state = start(&sample_state(), &["t1"]);
        let moved = drag_with(
            &state,
            &geometry(),
            Point::new(30.0, 8.0),
            Modifiers {
                shift: true,
                ..Modifiers::default()
            },
        );
        let layout = &moved.node("t1").unwrap().layout;
        assert_eq!((layout.left, layout.top), (Some(530.0), Some(0.0)));
    }

    #[test]
    fn test_delta_is_scaled_by_zoom() {
        let mut state = (*sample_state()).clone();
        state.transform = Transform::new(Vec2::ZERO, 2.0);
        let state = start(&Arc::new(state), &["t1"]);
        let moved = drag(&state, &geometry(), Point::new(40.0, 20.0));
        let layout = &moved.node("t1").unwrap().layout;
        assert_eq!((layout.left, layout.top), (Some(520.0), Some(10.0)));
    }

    #[test]
    fn test_nested_selection_moves_once() {
        let state = start(&sample_state(), &["c1", "r1"]);
        let moved = drag(&state, &geometry(), Point::new(5.0, 5.0));
        assert_eq!(moved.node("c1").unwrap().layout.left, Some(5.0));
        assert_eq!(moved.node("r1").unwrap().layout.left, Some(10.0));
    }

    #[test]
    fn test_lock_axis() {
        assert_eq!(lock_axis(Vec2::new(3.0, -4.0)), Vec2::new(0.0, -4.0));
        assert_eq!(lock_axis(Vec2::new(-5.0, 4.0)), Vec2::new(-5.0, 0.0));
    }
}
