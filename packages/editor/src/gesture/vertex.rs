//! Vertex and tangent drags on the path in content edit mode
//!
//! All three only touch the vector network of the edited path node. Starting one
//! outside path edit mode, or with an index the network does not have, is a caller bug.

use canvas_common::{Point, Vec2};

use super::{GestureOrigin, PointerInput};
use crate::node::{Handle, NodeId, VectorNetwork};
use crate::reducer::{replace, update_node};
use crate::state::{ContentEditMode, EditorState};
use crate::EditorError;

/// Edited path and its network; `Ok(None)` when the node has vanished
fn edited_network(state: &EditorState) -> Result<Option<(NodeId, &VectorNetwork)>, EditorError> {
    let id = state
        .content_edit_mode
        .path_node()
        .ok_or(EditorError::NotEditingPath)?;
    let Some(node) = state.node(id) else {
        return Ok(None);
    };
    let network = node
        .network()
        .ok_or_else(|| EditorError::wrong_kind(node, "vectorNetwork"))?;
    Ok(Some((id.to_string(), network)))
}

fn in_range(index: usize, len: usize) -> Result<usize, EditorError> {
    if index < len {
        Ok(index)
    } else {
        Err(EditorError::IndexOutOfRange(index))
    }
}

#[derive(Debug, Clone)]
pub struct TranslateVertexGesture {
    pub origin: GestureOrigin,
    pub node_id: NodeId,
    /// Dragged vertices and where they started
    pub initial: Vec<(usize, Point)>,
}

impl TranslateVertexGesture {
    pub(super) fn start(
        state: &EditorState,
        origin: GestureOrigin,
        indices: Option<&[usize]>,
    ) -> Result<Option<Self>, EditorError> {
        let Some((node_id, network)) = edited_network(state)? else {
            return Ok(None);
        };
        let indices = match (indices, &state.content_edit_mode) {
            (Some(indices), _) => indices.to_vec(),
            (None, ContentEditMode::Path { selected_vertices, .. }) => selected_vertices.clone(),
            (None, _) => Vec::new(),
        };
        let initial = indices
            .into_iter()
            .map(|i| in_range(i, network.vertices.len()).map(|i| (i, network.vertices[i])))
            .collect::<Result<Vec<_>, _>>()?;
        if initial.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self {
            origin,
            node_id,
            initial,
        }))
    }

    pub(super) fn update(&self, state: &mut EditorState, input: &PointerInput) -> Result<bool, EditorError> {
        if state.node(&self.node_id).is_none() {
            return Ok(false);
        }
        let delta = self.origin.canvas_delta(input.point);
        update_node(state, &self.node_id, |node| {
            if let Some(network) = node.network_mut() {
                for (i, start) in &self.initial {
                    if let Some(vertex) = network.vertices.get_mut(*i) {
                        *vertex = *start + delta;
                    }
                }
            }
            Ok(())
        })
    }
}

#[derive(Debug, Clone)]
pub struct CurveGesture {
    pub origin: GestureOrigin,
    pub node_id: NodeId,
    pub segment: usize,
    pub handle: Handle,
    /// Drag the handle in the opposite direction of the pointer
    pub invert: bool,
    pub initial: Vec2,
}

impl CurveGesture {
    pub(super) fn start(
        state: &EditorState,
        origin: GestureOrigin,
        segment: usize,
        handle: Handle,
        invert: bool,
    ) -> Result<Option<Self>, EditorError> {
        let Some((node_id, network)) = edited_network(state)? else {
            return Ok(None);
        };
        let segment = in_range(segment, network.segments.len())?;
        let initial = network.segments[segment].handle(handle);
        Ok(Some(Self {
            origin,
            node_id,
            segment,
            handle,
            invert,
            initial,
        }))
    }

    pub(super) fn update(&self, state: &mut EditorState, input: &PointerInput) -> Result<bool, EditorError> {
        if state.node(&self.node_id).is_none() {
            return Ok(false);
        }
        let delta = self.origin.canvas_delta(input.point);
        let value = if self.invert {
            self.initial - delta
        } else {
            self.initial + delta
        };
        update_node(state, &self.node_id, |node| {
            if let Some(segment) = node.network_mut().and_then(|n| n.segments.get_mut(self.segment)) {
                *segment.handle_mut(self.handle) = value;
            }
            Ok(())
        })
    }
}

/// Shapes the outgoing tangent of a vertex that is not linked yet; the tangent is
/// used by the segment created next
#[derive(Debug, Clone)]
pub struct CurvePendingGesture {
    pub origin: GestureOrigin,
    pub node_id: NodeId,
    pub vertex: usize,
}

impl CurvePendingGesture {
    pub(super) fn start(state: &EditorState, origin: GestureOrigin, vertex: usize) -> Result<Option<Self>, EditorError> {
        let Some((node_id, network)) = edited_network(state)? else {
            return Ok(None);
        };
        let vertex = in_range(vertex, network.vertices.len())?;
        Ok(Some(Self {
            origin,
            node_id,
            vertex,
        }))
    }

    pub(super) fn update(&self, state: &mut EditorState, input: &PointerInput) -> bool {
        if state.node(&self.node_id).is_none() {
            return false;
        }
        let tangent = self.origin.canvas_delta(input.point);
        match &mut state.content_edit_mode {
            ContentEditMode::Path {
                node_id,
                pending_tangent,
                ..
            } if *node_id == self.node_id => replace(pending_tangent, Some(tangent)),
            _ => false,
        }
    }
}
