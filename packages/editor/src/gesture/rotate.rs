//! Rotate nodes around the center of the selection
//!
//! The angle is measured in screen space between the press point and the current
//! pointer, around the center of the selection's bounding box at start. Each node keeps
//! its own position and gets the same angle added to its start rotation.

use canvas_common::{union_rects, Point, Rect};
use tracing::debug;

use super::{gesture_targets, GestureOrigin, PointerInput};
use crate::node::NodeId;
use crate::reducer::{update_node, ReduceContext};
use crate::state::EditorState;
use crate::EditorError;

#[derive(Debug, Clone)]
pub struct RotateGesture {
    pub origin: GestureOrigin,
    /// Screen-space pivot
    pub center: Point,
    pub start_angle: f64,
    pub rotations: Vec<(NodeId, f64)>,
}

/// Map any angle onto `[0, 360)`
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Round to the nearest multiple of `step`
pub fn quantize(degrees: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return degrees;
    }
    normalize_degrees((degrees / step).round() * step)
}

fn angle_of(center: Point, point: Point) -> f64 {
    let v = point - center;
    v.y.atan2(v.x).to_degrees()
}

impl RotateGesture {
    pub(super) fn start(
        state: &EditorState,
        origin: GestureOrigin,
        ids: Option<&[NodeId]>,
        ctx: &ReduceContext<'_>,
    ) -> Option<Self> {
        let targets = gesture_targets(state, ids);
        let rects: Vec<Rect> = targets
            .iter()
            .filter_map(|id| ctx.geometry.node_bounding_rect(id))
            .collect();
        let center = union_rects(&rects)?.center();

        let rotations: Vec<(NodeId, f64)> = targets
            .into_iter()
            .filter_map(|id| state.node(&id).map(|n| n.layout.rotation).map(|r| (id, r)))
            .collect();
        let start_angle = angle_of(center, origin.pointer);
        Some(Self {
            origin,
            center,
            start_angle,
            rotations,
        })
    }

    pub(super) fn update(
        &self,
        state: &mut EditorState,
        input: &PointerInput,
        ctx: &ReduceContext<'_>,
    ) -> Result<bool, EditorError> {
        if input.point == self.center {
            return Ok(false);
        }
        let delta = angle_of(self.center, input.point) - self.start_angle;
        let snap = input.modifiers.shift || state.settings.snap_rotation || ctx.config.snap_rotation;

        let mut changed = false;
        for (id, initial) in &self.rotations {
            if state.node(id).is_none() {
                debug!(node_id = %id, "Rotated node is gone");
                continue;
            }
            let mut rotation = normalize_degrees(initial + delta);
            if snap {
                rotation = quantize(rotation, ctx.config.rotation_snap_degrees);
            }
            changed |= update_node(state, id, |node| {
                node.layout.rotation = rotation;
                Ok(())
            })?;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::test_support::*;
    use super::super::{GestureIntent, Modifiers};
    use super::*;
    use crate::reducer::test_support::{geometry, sample_state};

    fn rotating() -> Arc<EditorState> {
        // t1 spans (500, 0)..(700, 40), so the pivot is (600, 20)
        start_gesture(
            &sample_state(),
            &geometry(),
            GestureIntent::Rotate {
                ids: Some(vec!["t1".into()]),
            },
            Point::new(700.0, 20.0),
        )
    }

    fn rotation(state: &EditorState) -> f64 {
        state.node("t1").unwrap().layout.rotation
    }

    #[test]
    fn test_quarter_turn() {
        let state = drag(&rotating(), &geometry(), Point::new(600.0, 120.0));
        assert!((rotation(&state) - 90.0).abs() < 1e-9);

        let state = drag(&rotating(), &geometry(), Point::new(600.0, -80.0));
        assert!((rotation(&state) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_snap_with_modifier() {
        let twenty = Point::new(700.0, 20.0 + 100.0 * 20f64.to_radians().tan());
        let free = drag(&rotating(), &geometry(), twenty);
        assert!((rotation(&free) - 20.0).abs() < 1e-9);

        let snapped = drag_with(
            &rotating(),
            &geometry(),
            twenty,
            Modifiers {
                shift: true,
                ..Modifiers::default()
            },
        );
        assert_eq!(rotation(&snapped), 15.0);
    }

    #[test]
    fn test_normalize_and_quantize() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
        assert_eq!(quantize(352.0, 15.0), 0.0);
        assert_eq!(quantize(23.0, 15.0), 30.0);
        assert_eq!(quantize(23.0, 0.0), 23.0);
    }

    #[test]
    fn test_no_rendered_target_no_gesture() {
        let state = start_gesture(
            &sample_state(),
            &crate::geometry::StaticGeometry::default(),
            GestureIntent::Rotate {
                ids: Some(vec!["t1".into()]),
            },
            Point::new(0.0, 0.0),
        );
        assert!(state.gesture.is_idle());
    }
}
