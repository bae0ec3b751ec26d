//! Scene lifecycle and navigation

use std::sync::Arc;

use tracing::debug;

use super::clipboard::{instantiate, NodePrototype};
use super::replace;
use crate::document::{Scene, SceneConstraint, SceneId};
use crate::node::Color;
use crate::post_effects;
use crate::state::{ContentEditMode, EditorState};
use crate::EditorError;

fn require_scene<'a>(state: &'a EditorState, id: &str) -> Result<&'a Scene, EditorError> {
    state
        .document
        .scene(id)
        .ok_or_else(|| EditorError::SceneNotFound(id.to_string()))
}

/// Switch the visible scene, dropping per-scene interaction state
fn show(state: &mut EditorState, id: SceneId) {
    state.scene_id = id;
    state.selection.clear();
    state.hover = None;
    state.content_edit_mode = ContentEditMode::None;
}

pub(super) fn create(state: &mut EditorState, name: &str, constraint: SceneConstraint) -> Result<bool, EditorError> {
    let id = state.id_generator.new_id();
    let scene = Scene::new(id.clone(), name).with_constraint(constraint);
    state.doc_mut().add_scene(scene);
    show(state, id);
    Ok(true)
}

/// Remove a scene and everything in it; the last scene stays
pub(super) fn delete(state: &mut EditorState, id: &str) -> Result<bool, EditorError> {
    let scene = require_scene(state, id)?;
    if state.document.scenes.len() <= 1 {
        debug!(scene_id = %id, "Last scene cannot be deleted");
        return Ok(false);
    }
    let top_level = scene.children.clone();
    let position = state.document.scene_order.iter().position(|s| s == id);

    let doc = state.doc_mut();
    let mut removed = Vec::new();
    for child in &top_level {
        removed.extend(doc.remove_subtree(child));
    }
    doc.scenes.remove(id);
    doc.scene_order.retain(|s| s != id);

    if state.scene_id == id {
        let order = &state.document.scene_order;
        let next = position
            .map(|p| p.min(order.len().saturating_sub(1)))
            .and_then(|p| order.get(p))
            .cloned()
            .unwrap_or_default();
        show(state, next);
    }
    state.rebuild_hierarchy();
    post_effects::after_removal(state, &removed);
    Ok(true)
}

/// Deep copy a scene with fresh node ids and show the copy
pub(super) fn duplicate(state: &mut EditorState, id: &str) -> Result<bool, EditorError> {
    let source = require_scene(state, id)?.clone();
    let prototypes: Vec<NodePrototype> = source
        .children
        .iter()
        .filter_map(|child| NodePrototype::capture(&state.document, child))
        .collect();

    let mut nodes = Vec::new();
    let roots = prototypes
        .iter()
        .map(|p| instantiate(p, &mut state.id_generator, &mut nodes))
        .collect();
    let scene_id = state.id_generator.new_id();
    let scene = Scene {
        id: scene_id.clone(),
        name: format!("{} copy", source.name),
        children: roots,
        ..source
    };

    let doc = state.doc_mut();
    for node in nodes {
        doc.nodes.insert(node.id.clone(), Arc::new(node));
    }
    // the copy sits right after its source
    let at = doc
        .scene_order
        .iter()
        .position(|s| s == id)
        .map_or(doc.scene_order.len(), |i| i + 1);
    doc.scene_order.insert(at, scene_id.clone());
    doc.scenes.insert(scene_id.clone(), Arc::new(scene));

    state.rebuild_hierarchy();
    show(state, scene_id);
    Ok(true)
}

pub(super) fn rename(state: &mut EditorState, id: &str, name: &str) -> Result<bool, EditorError> {
    if require_scene(state, id)?.name == name {
        return Ok(false);
    }
    if let Some(scene) = state.doc_mut().scene_mut(id) {
        scene.name = name.to_string();
    }
    Ok(true)
}

pub(super) fn set_background(state: &mut EditorState, id: &str, background: Option<Color>) -> Result<bool, EditorError> {
    if require_scene(state, id)?.background == background {
        return Ok(false);
    }
    if let Some(scene) = state.doc_mut().scene_mut(id) {
        scene.background = background;
    }
    Ok(true)
}

pub(super) fn select(state: &mut EditorState, id: &str) -> Result<bool, EditorError> {
    require_scene(state, id)?;
    if state.scene_id == id {
        return Ok(false);
    }
    show(state, id.to_string());
    Ok(true)
}

/// Change the visible scene's guides in place
pub(crate) fn with_guides<F>(state: &mut EditorState, f: F) -> bool
where
    F: FnOnce(&mut Vec<crate::document::Guide>),
{
    let Some(current) = state.current_scene() else {
        return false;
    };
    let mut guides = current.guides.clone();
    f(&mut guides);
    if guides == current.guides {
        return false;
    }
    let scene_id = state.scene_id.clone();
    match state.doc_mut().scene_mut(&scene_id) {
        Some(scene) => replace(&mut scene.guides, guides),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::action::Action;

    #[test]
    fn test_create_and_select_scene() {
        let state = sample_state();
        let next = apply_ok(
            &state,
            Action::CreateScene {
                name: "Second".into(),
                constraint: SceneConstraint::Multiple,
            },
        );
        assert_eq!(next.document.scene_order.len(), 2);
        assert_eq!(next.current_scene().unwrap().name, "Second");

        let back = apply_ok(&next, Action::SelectScene { id: "s1".into() });
        assert_eq!(back.scene_id, "s1");
    }

    #[test]
    fn test_last_scene_survives_delete() {
        let state = sample_state();
        let next = apply_ok(&state, Action::DeleteScene { id: "s1".into() });
        assert!(Arc::ptr_eq(&state, &next));
    }

    #[test]
    fn test_delete_scene_removes_its_nodes() {
        let state = sample_state();
        let copied = apply_ok(&state, Action::DuplicateScene { id: "s1".into() });
        assert_eq!(copied.document.nodes.len(), 8);
        let copy_id = copied.scene_id.clone();

        let next = apply_ok(&copied, Action::DeleteScene { id: copy_id });
        assert_eq!(next.document.nodes.len(), 4);
        assert_eq!(next.scene_id, "s1");
        assert!(next.hierarchy.is_consistent());
    }

    #[test]
    fn test_select_unknown_scene_is_an_error() {
        let state = sample_state();
        assert!(matches!(
            run(&state, &geometry(), Action::SelectScene { id: "nope".into() }),
            Err(EditorError::SceneNotFound(_))
        ));
    }
}
