//! Drag a corner-radius handle
//!
//! Horizontal movement towards the inside of the shape grows the radius. For a left
//! corner that is rightwards, for a right corner leftwards.

use tracing::debug;

use super::{GestureOrigin, PointerInput};
use crate::node::{Corner, CornerRadius, Corners, NodeId};
use crate::reducer::update_node;
use crate::state::EditorState;
use crate::EditorError;

#[derive(Debug, Clone)]
pub struct CornerRadiusGesture {
    pub origin: GestureOrigin,
    pub id: NodeId,
    /// `None` drags all four corners together
    pub corner: Option<Corner>,
    pub initial: Corners,
}

impl CornerRadiusGesture {
    pub(super) fn start(
        state: &EditorState,
        origin: GestureOrigin,
        id: &str,
        corner: Option<Corner>,
    ) -> Result<Option<Self>, EditorError> {
        let Some(node) = state.node(id) else {
            debug!(node_id = %id, "Corner radius target is gone");
            return Ok(None);
        };
        let radius = node
            .corner_radius()
            .ok_or_else(|| EditorError::wrong_kind(node, "cornerRadius"))?;
        Ok(Some(Self {
            origin,
            id: id.to_string(),
            corner,
            initial: radius.corners(),
        }))
    }

    fn sign(&self) -> f64 {
        match self.corner {
            Some(corner) if !corner.is_left() => -1.0,
            _ => 1.0,
        }
    }

    pub(super) fn update(&self, state: &mut EditorState, input: &PointerInput) -> Result<bool, EditorError> {
        if state.node(&self.id).is_none() {
            return Ok(false);
        }
        let amount = self.origin.canvas_delta(input.point).x * self.sign();

        let mut corners = self.initial;
        let edited: &[Corner] = match &self.corner {
            Some(corner) => std::slice::from_ref(corner),
            None => &Corner::ALL,
        };
        for corner in edited {
            corners.set(*corner, self.initial.get(*corner) + amount);
        }
        let next = CornerRadius::normalized(corners);

        update_node(state, &self.id, |node| {
            if let Some(slot) = node.corner_radius_mut() {
                *slot = next;
            }
            Ok(())
        })
    }
}
