//! Vertex editing on the path in content edit mode

use canvas_common::{Point, Vec2};

use super::{replace, update_node};
use crate::action::SelectionMode;
use crate::node::Segment;
use crate::state::{ContentEditMode, EditorState};
use crate::EditorError;

/// Id of the path being edited and its vertex count
fn editing(state: &EditorState) -> Result<(String, usize), EditorError> {
    let id = state
        .content_edit_mode
        .path_node()
        .ok_or(EditorError::NotEditingPath)?;
    let node = state
        .node(id)
        .ok_or_else(|| EditorError::NodeNotFound(id.to_string()))?;
    let network = node
        .network()
        .ok_or_else(|| EditorError::wrong_kind(node, "vectorNetwork"))?;
    Ok((id.to_string(), network.vertices.len()))
}

fn check_indices(indices: &[usize], len: usize) -> Result<(), EditorError> {
    match indices.iter().find(|i| **i >= len) {
        Some(bad) => Err(EditorError::IndexOutOfRange(*bad)),
        None => Ok(()),
    }
}

pub(super) fn select_vertices(state: &mut EditorState, indices: &[usize], mode: SelectionMode) -> Result<bool, EditorError> {
    let (_, len) = editing(state)?;
    check_indices(indices, len)?;

    let ContentEditMode::Path { selected_vertices, .. } = &mut state.content_edit_mode else {
        return Err(EditorError::NotEditingPath);
    };
    let mut next = match mode {
        SelectionMode::Replace => indices.to_vec(),
        SelectionMode::Add => selected_vertices.iter().chain(indices).copied().collect(),
        SelectionMode::Toggle => {
            let mut next = selected_vertices.clone();
            for i in indices {
                match next.iter().position(|v| v == i) {
                    Some(at) => {
                        next.remove(at);
                    }
                    None => next.push(*i),
                }
            }
            next
        }
    };
    next.sort_unstable();
    next.dedup();
    Ok(replace(selected_vertices, next))
}

/// Append a vertex at `point` (node-local); when `connect_from` is set, link it with a
/// segment whose outgoing tangent is the pending one
pub(super) fn insert_vertex(state: &mut EditorState, point: Point, connect_from: Option<usize>) -> Result<bool, EditorError> {
    let (id, len) = editing(state)?;
    if let Some(from) = connect_from {
        check_indices(&[from], len)?;
    }
    let tangent = match &state.content_edit_mode {
        ContentEditMode::Path { pending_tangent, .. } => pending_tangent.unwrap_or(Vec2::ZERO),
        _ => Vec2::ZERO,
    };

    update_node(state, &id, |node| {
        if let Some(network) = node.network_mut() {
            network.vertices.push(point);
            if let Some(from) = connect_from {
                network.segments.push(Segment {
                    ta: tangent,
                    ..Segment::line(from, len)
                });
            }
        }
        Ok(())
    })?;

    state.content_edit_mode = ContentEditMode::Path {
        node_id: id,
        selected_vertices: vec![len],
        pending_tangent: None,
    };
    Ok(true)
}

pub(super) fn delete_vertices(state: &mut EditorState, indices: &[usize]) -> Result<bool, EditorError> {
    let (id, len) = editing(state)?;
    check_indices(indices, len)?;
    if indices.is_empty() {
        return Ok(false);
    }
    update_node(state, &id, |node| {
        if let Some(network) = node.network_mut() {
            network.remove_vertices(indices);
        }
        Ok(())
    })?;
    if let ContentEditMode::Path { selected_vertices, .. } = &mut state.content_edit_mode {
        selected_vertices.clear();
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::test_support::*;
    use super::*;
    use crate::action::Action;
    use crate::node::{Node, VectorNetwork};

    fn editing_state() -> Arc<EditorState> {
        let state = apply_ok(
            &sample_state(),
            Action::InsertNode {
                parent_id: None,
                index: None,
                node: Node::path(
                    "p1",
                    VectorNetwork {
                        vertices: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
                        segments: vec![Segment::line(0, 1)],
                    },
                ),
            },
        );
        apply_ok(
            &state,
            Action::SetContentEditMode {
                mode: ContentEditMode::Path {
                    node_id: "p1".into(),
                    selected_vertices: Vec::new(),
                    pending_tangent: Some(Vec2::new(3.0, 4.0)),
                },
            },
        )
    }

    #[test]
    fn test_requires_path_edit_mode() {
        let state = sample_state();
        assert!(matches!(
            run(&state, &geometry(), Action::DeletePathVertices { indices: vec![0] }),
            Err(EditorError::NotEditingPath)
        ));
    }

    #[test]
    fn test_insert_uses_pending_tangent() {
        let state = editing_state();
        let next = apply_ok(
            &state,
            Action::InsertPathVertex {
                point: Point::new(10.0, 10.0),
                connect_from: Some(1),
            },
        );
        let network = next.node("p1").unwrap().network().unwrap();
        assert_eq!(network.vertices.len(), 3);
        assert_eq!(network.segments[1].start, 1);
        assert_eq!(network.segments[1].end, 2);
        assert_eq!(network.segments[1].ta, Vec2::new(3.0, 4.0));
        assert!(matches!(
            &next.content_edit_mode,
            ContentEditMode::Path { pending_tangent: None, selected_vertices, .. } if selected_vertices == &vec![2]
        ));
    }

    #[test]
    fn test_out_of_range_vertex_is_an_error() {
        let state = editing_state();
        assert!(matches!(
            run(&state, &geometry(), Action::SelectVertices { indices: vec![9], mode: SelectionMode::Replace }),
            Err(EditorError::IndexOutOfRange(9))
        ));
    }

    #[test]
    fn test_delete_vertex_drops_segment() {
        let state = editing_state();
        let next = apply_ok(&state, Action::DeletePathVertices { indices: vec![0] });
        let network = next.node("p1").unwrap().network().unwrap();
        assert_eq!(network.vertices, vec![Point::new(10.0, 0.0)]);
        assert!(network.segments.is_empty());
    }
}
