//! # Document Reducer
//!
//! `reduce(state, action) → state'`, the single mutation entry point.
//!
//! ## Contract
//!
//! 1. **Never in place**: the input state is untouched; edits happen on a cheap clone
//!    whose unchanged parts stay shared through `Arc`.
//! 2. **Identity on no-op**: when nothing changed the very same `Arc` comes back, so
//!    `Arc::ptr_eq` tells callers whether to re-render or record history.
//! 3. **Two failure tiers**: caller bugs (unknown node, property on the wrong kind)
//!    return `Err`; interaction edge cases (cycle, constrained root, stale gesture
//!    target, name collision) return the input unchanged.
//! 4. **One transaction**: structural edits rebuild the hierarchy context before
//!    returning, so document and hierarchy never disagree.

pub mod clipboard;
mod path;
mod properties;
pub(crate) mod scene;
mod schema;
mod selection;
pub(crate) mod structure;
mod templates;

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::action::Action;
use crate::config::EditorConfig;
use crate::geometry::GeometryProvider;
use crate::gesture;
use crate::node::Node;
use crate::state::EditorState;
use crate::template::{self, NodeLookup};
use crate::EditorError;

/// Collaborators the reducer reads from but never owns
pub struct ReduceContext<'a> {
    pub geometry: &'a dyn GeometryProvider,
    pub config: &'a EditorConfig,
}

impl std::fmt::Debug for ReduceContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReduceContext")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

/// Apply one action, returning the next state (or `state` itself when nothing changed)
#[instrument(skip_all, fields(action = action.kind()))]
pub fn reduce(
    state: &Arc<EditorState>,
    action: &Action,
    ctx: &ReduceContext<'_>,
) -> Result<Arc<EditorState>, EditorError> {
    let mut next = EditorState::clone(state);
    if apply(&mut next, action, ctx)? {
        Ok(Arc::new(next))
    } else {
        debug!("Action had no effect");
        Ok(Arc::clone(state))
    }
}

fn apply(state: &mut EditorState, action: &Action, ctx: &ReduceContext<'_>) -> Result<bool, EditorError> {
    match action {
        Action::SetName { .. }
        | Action::SetActive { .. }
        | Action::SetLocked { .. }
        | Action::SetPosition { .. }
        | Action::MoveBy { .. }
        | Action::SetPositionMode { .. }
        | Action::SetSize { .. }
        | Action::SetRotation { .. }
        | Action::SetOpacity { .. }
        | Action::SetFills { .. }
        | Action::SetStrokes { .. }
        | Action::SetTextContent { .. }
        | Action::SetFontFamily { .. }
        | Action::SetFontSize { .. }
        | Action::SetTextAlign { .. }
        | Action::SetCornerRadius { .. }
        | Action::SetFlexLayout { .. }
        | Action::SetGap { .. }
        | Action::SetImageSource { .. }
        | Action::SetVectorNetwork { .. } => properties::apply(state, action),

        Action::InsertNode {
            parent_id,
            index,
            node,
        } => structure::insert_node(state, node.clone(), parent_id.as_deref(), *index),
        Action::InsertPrototypes {
            parent_id,
            index,
            prototypes,
        } => structure::insert_prototypes(state, prototypes, parent_id.as_deref(), *index),
        Action::DeleteNodes { ids } => structure::delete_nodes(state, ids),
        Action::MoveNodes {
            ids,
            parent_id,
            index,
        } => structure::move_nodes(state, ids, parent_id.as_deref(), *index),
        Action::Reorder { ids, target } => structure::reorder(state, ids, *target),
        Action::GroupNodes { ids, name } => structure::group_nodes(state, ids, name.as_deref()),
        Action::UngroupNodes { ids } => structure::ungroup_nodes(state, ids),

        Action::CreateScene { name, constraint } => scene::create(state, name, *constraint),
        Action::DeleteScene { id } => scene::delete(state, id),
        Action::DuplicateScene { id } => scene::duplicate(state, id),
        Action::RenameScene { id, name } => scene::rename(state, id, name),
        Action::SetSceneBackground { id, background } => {
            scene::set_background(state, id, *background)
        }
        Action::SelectScene { id } => scene::select(state, id),

        Action::SelectNodes { ids, mode } => selection::select_nodes(state, ids, *mode),
        Action::SelectAll => selection::select_all(state),
        Action::ClearSelection => selection::clear(state),
        Action::SetHover { id } => selection::set_hover(state, id.as_deref()),
        Action::SetTool { tool } => selection::set_tool(state, *tool),
        Action::SetContentEditMode { mode } => selection::set_content_edit_mode(state, mode),
        Action::SelectVertices { indices, mode } => path::select_vertices(state, indices, *mode),
        Action::InsertPathVertex {
            point,
            connect_from,
        } => path::insert_vertex(state, *point, *connect_from),
        Action::DeletePathVertices { indices } => path::delete_vertices(state, indices),

        Action::Copy { ids } => clipboard::copy(state, ids),
        Action::Cut { ids } => clipboard::cut(state, ids),
        Action::Paste { parent_id } => clipboard::paste(state, parent_id.as_deref()),
        Action::Duplicate { ids } => clipboard::duplicate(state, ids),

        Action::DefineProperty { id, definition } => schema::define(state, id, definition),
        Action::RenameProperty { id, from, to } => schema::rename(state, id, from, to),
        Action::UpdateProperty {
            id,
            name,
            kind,
            default,
        } => schema::update(state, id, name, *kind, default.as_ref()),
        Action::DeleteProperty { id, name } => schema::delete(state, id, name),

        Action::DefineTemplate { template } => templates::define(state, template),
        Action::CreateTemplateFromNode { id, name } => templates::create_from_node(state, id, name),
        Action::SetOverride { id, sub_id, patch } => templates::set_override(state, id, sub_id, patch),
        Action::ClearOverride { id, sub_id } => templates::clear_override(state, id, sub_id),
        Action::DetachInstance { id } => templates::detach(state, id),

        Action::StartGesture { intent, point } => gesture::start(state, intent, *point, ctx),
        Action::UpdateGesture { point, modifiers } => gesture::update(state, *point, *modifiers, ctx),
        Action::EndGesture => gesture::end(state, ctx),
        Action::CancelGesture => gesture::cancel(state),

        Action::SetTransform { transform } => {
            let mut transform = *transform;
            transform.zoom = transform.zoom.clamp(ctx.config.min_zoom, ctx.config.max_zoom);
            Ok(replace(&mut state.transform, transform))
        }
        Action::Pan { delta } => {
            let mut transform = state.transform;
            transform.pan += *delta;
            Ok(replace(&mut state.transform, transform))
        }
        Action::ZoomAt { factor, origin } => {
            let transform = state.transform.zoomed_at(
                *factor,
                *origin,
                ctx.config.min_zoom,
                ctx.config.max_zoom,
            );
            Ok(replace(&mut state.transform, transform))
        }

        Action::SetSnapRotation { enabled } => {
            Ok(replace(&mut state.settings.snap_rotation, *enabled))
        }
        Action::SetShowRulers { enabled } => Ok(replace(&mut state.settings.show_rulers, *enabled)),

        Action::ZoomToFit { .. } | Action::Undo | Action::Redo => {
            Err(EditorError::UnsupportedAction(action.kind()))
        }
    }
}

/// Assign when different; report whether anything changed
pub(crate) fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// Edit one node through a scratch copy; the document is only touched when the copy
/// ends up different
pub(crate) fn update_node<F>(state: &mut EditorState, id: &str, f: F) -> Result<bool, EditorError>
where
    F: FnOnce(&mut Node) -> Result<(), EditorError>,
{
    let current = match template::get_node_by_id(&state.document, id)? {
        NodeLookup::Live(node) => node,
        NodeLookup::Template { template_id, .. } => {
            return Err(EditorError::TemplateNodeReadOnly {
                template_id: template_id.to_string(),
                id: id.to_string(),
            })
        }
    };
    let mut next = current.clone();
    f(&mut next)?;
    if next == *current {
        return Ok(false);
    }
    state.doc_mut().nodes.insert(id.to_string(), Arc::new(next));
    Ok(true)
}

/// [`update_node`] over several ids; every id is validated even after a change
pub(crate) fn update_nodes<F>(state: &mut EditorState, ids: &[String], mut f: F) -> Result<bool, EditorError>
where
    F: FnMut(&mut Node) -> Result<(), EditorError>,
{
    let mut changed = false;
    for id in ids {
        changed |= update_node(state, id, &mut f)?;
    }
    Ok(changed)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use canvas_common::{Point, Vec2};

    #[test]
    fn test_noop_returns_same_reference() {
        let state = sample_state();
        let next = apply_ok(
            &state,
            Action::SetName {
                id: "r1".into(),
                name: "Rectangle".into(),
            },
        );
        assert!(Arc::ptr_eq(&state, &next));
    }

    #[test]
    fn test_change_leaves_input_untouched() {
        let state = sample_state();
        let next = apply_ok(
            &state,
            Action::SetName {
                id: "r1".into(),
                name: "Hero".into(),
            },
        );
        assert_eq!(state.node("r1").unwrap().name, "Rectangle");
        assert_eq!(next.node("r1").unwrap().name, "Hero");
        // untouched nodes stay shared
        assert!(Arc::ptr_eq(&state.document.nodes["r2"], &next.document.nodes["r2"]));
    }

    #[test]
    fn test_unknown_node_is_an_error() {
        let state = sample_state();
        let result = run(
            &state,
            &geometry(),
            Action::SetName {
                id: "ghost".into(),
                name: "x".into(),
            },
        );
        assert!(matches!(result, Err(EditorError::NodeNotFound(_))));
    }

    #[test]
    fn test_history_actions_are_not_reducer_actions() {
        let state = sample_state();
        assert!(matches!(
            run(&state, &geometry(), Action::Undo),
            Err(EditorError::UnsupportedAction("undo"))
        ));
    }

    #[test]
    fn test_camera_actions() {
        let state = sample_state();
        let panned = apply_ok(
            &state,
            Action::Pan {
                delta: Vec2::new(10.0, 5.0),
            },
        );
        assert_eq!(panned.transform.pan, Vec2::new(10.0, 5.0));

        let zoomed = apply_ok(
            &panned,
            Action::ZoomAt {
                factor: 1e9,
                origin: Point::ORIGIN,
            },
        );
        assert_eq!(zoomed.transform.zoom, EditorConfig::default().max_zoom);
    }
}
