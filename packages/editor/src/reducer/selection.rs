//! Selection, hover, tools and content edit mode

use tracing::debug;

use super::replace;
use crate::action::SelectionMode;
use crate::node::{NodeId, NodeKind};
use crate::raycast::prune_nested_nodes;
use crate::state::{ContentEditMode, EditorState, Tool};
use crate::EditorError;

pub(super) fn select_nodes(state: &mut EditorState, ids: &[NodeId], mode: SelectionMode) -> Result<bool, EditorError> {
    let known: Vec<NodeId> = ids
        .iter()
        .filter(|id| {
            let exists = state.document.contains(id);
            if !exists {
                debug!(node_id = %id, "Ignoring unknown id in selection");
            }
            exists
        })
        .cloned()
        .collect();

    let combined = match mode {
        SelectionMode::Replace => known,
        SelectionMode::Add => state.selection.iter().cloned().chain(known).collect(),
        SelectionMode::Toggle => {
            let mut next = state.selection.clone();
            for id in known {
                match next.iter().position(|s| *s == id) {
                    Some(i) => {
                        next.remove(i);
                    }
                    None => next.push(id),
                }
            }
            next
        }
    };
    let mut next = prune_nested_nodes(&state.hierarchy, &combined);
    dedup_keep_order(&mut next);
    Ok(replace(&mut state.selection, next))
}

fn dedup_keep_order(ids: &mut Vec<NodeId>) {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(id.clone()));
}

/// Select every unlocked node of the current scene's top level (the root's children in
/// a single-root scene)
pub(super) fn select_all(state: &mut EditorState) -> Result<bool, EditorError> {
    let Some(scene) = state.current_scene() else {
        return Err(EditorError::SceneNotFound(state.scene_id.clone()));
    };
    let candidates: Vec<NodeId> = match scene.constrained_root() {
        Some(root) => state.hierarchy.direct_children(Some(root)).to_vec(),
        None => scene.children.clone(),
    };
    let next: Vec<NodeId> = candidates
        .into_iter()
        .filter(|id| state.node(id).is_some_and(|n| !n.locked))
        .collect();
    Ok(replace(&mut state.selection, next))
}

pub(super) fn clear(state: &mut EditorState) -> Result<bool, EditorError> {
    Ok(replace(&mut state.selection, Vec::new()))
}

/// Hover is transient: a stale id clears hover instead of failing
pub(super) fn set_hover(state: &mut EditorState, id: Option<&str>) -> Result<bool, EditorError> {
    let next = id
        .filter(|id| state.document.contains(id))
        .map(str::to_string);
    Ok(replace(&mut state.hover, next))
}

pub(super) fn set_tool(state: &mut EditorState, tool: Tool) -> Result<bool, EditorError> {
    Ok(replace(&mut state.tool, tool))
}

/// Enter or leave text/path editing; the edited node becomes the selection
pub(super) fn set_content_edit_mode(state: &mut EditorState, mode: &ContentEditMode) -> Result<bool, EditorError> {
    if let Some(id) = mode.node_id() {
        let node = state
            .node(id)
            .ok_or_else(|| EditorError::NodeNotFound(id.to_string()))?;
        match (mode, &node.kind) {
            (ContentEditMode::Text { .. }, NodeKind::Text(_)) => {}
            (ContentEditMode::Path { selected_vertices, .. }, NodeKind::Path(path)) => {
                if let Some(bad) = selected_vertices
                    .iter()
                    .find(|i| **i >= path.network.vertices.len())
                {
                    return Err(EditorError::IndexOutOfRange(*bad));
                }
            }
            (ContentEditMode::Text { .. }, _) => return Err(EditorError::wrong_kind(node, "textContent")),
            _ => return Err(EditorError::wrong_kind(node, "vectorNetwork")),
        }
    }

    let mut changed = replace(&mut state.content_edit_mode, mode.clone());
    if let Some(id) = mode.node_id() {
        changed |= replace(&mut state.selection, vec![id.to_string()]);
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::action::Action;
    use std::sync::Arc;

    fn select(state: &Arc<EditorState>, ids: &[&str], mode: SelectionMode) -> Arc<EditorState> {
        apply_ok(
            state,
            Action::SelectNodes {
                ids: ids.iter().map(|s| s.to_string()).collect(),
                mode,
            },
        )
    }

    #[test]
    fn test_selection_is_pruned() {
        let state = sample_state();
        let next = select(&state, &["r1", "c1"], SelectionMode::Replace);
        assert_eq!(next.selection, vec!["c1"]);
    }

    #[test]
    fn test_toggle_and_add() {
        let state = sample_state();
        let next = select(&state, &["r1"], SelectionMode::Replace);
        let next = select(&next, &["t1"], SelectionMode::Add);
        assert_eq!(next.selection, vec!["r1", "t1"]);
        let next = select(&next, &["r1"], SelectionMode::Toggle);
        assert_eq!(next.selection, vec!["t1"]);
    }

    #[test]
    fn test_select_all_skips_locked() {
        let state = sample_state();
        let locked = apply_ok(
            &state,
            Action::SetLocked {
                ids: vec!["t1".into()],
                locked: true,
            },
        );
        let next = apply_ok(&locked, Action::SelectAll);
        assert_eq!(next.selection, vec!["c1"]);
    }

    #[test]
    fn test_stale_hover_clears() {
        let state = sample_state();
        let hovered = apply_ok(&state, Action::SetHover { id: Some("r1".into()) });
        assert_eq!(hovered.hover.as_deref(), Some("r1"));
        let next = apply_ok(&hovered, Action::SetHover { id: Some("ghost".into()) });
        assert_eq!(next.hover, None);
    }

    #[test]
    fn test_text_edit_mode_requires_text_node() {
        let state = sample_state();
        let result = run(
            &state,
            &geometry(),
            Action::SetContentEditMode {
                mode: ContentEditMode::Text { node_id: "r1".into() },
            },
        );
        assert!(matches!(result, Err(EditorError::WrongNodeKind { .. })));

        let next = apply_ok(
            &state,
            Action::SetContentEditMode {
                mode: ContentEditMode::Text { node_id: "t1".into() },
            },
        );
        assert_eq!(next.selection, vec!["t1"]);
    }
}
