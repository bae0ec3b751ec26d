//! Tree edits: insert, delete, move, reorder, group
//!
//! Every edit here changes child id lists and finishes by rebuilding the hierarchy
//! context.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use super::clipboard::{self, NodePrototype};
use crate::action::ReorderTarget;
use crate::document::{Document, SceneConstraint};
use crate::node::{Node, NodeId, NodeKind};
use crate::post_effects;
use crate::raycast::prune_nested_nodes;
use crate::state::EditorState;
use crate::EditorError;

/// Where new children go
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum InsertTarget {
    Node(NodeId),
    Scene(String),
}

impl InsertTarget {
    pub(crate) fn parent_id(&self) -> Option<&str> {
        match self {
            InsertTarget::Node(id) => Some(id),
            InsertTarget::Scene(_) => None,
        }
    }

    fn children<'a>(&self, doc: &'a Document) -> Option<&'a Vec<NodeId>> {
        match self {
            InsertTarget::Node(id) => match &doc.node(id)?.kind {
                NodeKind::Container(c) => Some(&c.children),
                NodeKind::Group(g) => Some(&g.children),
                NodeKind::Component(c) => Some(&c.children),
                _ => None,
            },
            InsertTarget::Scene(id) => Some(&doc.scene(id)?.children),
        }
    }

    fn children_mut<'a>(&self, doc: &'a mut Document) -> Option<&'a mut Vec<NodeId>> {
        match self {
            InsertTarget::Node(id) => doc.node_mut(id)?.children_mut(),
            InsertTarget::Scene(id) => Some(&mut doc.scene_mut(id)?.children),
        }
    }
}

/// Validate an explicit parent, or pick the current scene's top level.
///
/// `Ok(None)` means the edit must be refused: the scene only allows one root and
/// already has it.
pub(crate) fn resolve_target(
    state: &EditorState,
    parent_id: Option<&str>,
) -> Result<Option<InsertTarget>, EditorError> {
    match parent_id {
        Some(id) => {
            let parent = state
                .node(id)
                .ok_or_else(|| EditorError::NodeNotFound(id.to_string()))?;
            if !parent.accepts_children() {
                return Err(EditorError::wrong_kind(parent, "children"));
            }
            Ok(Some(InsertTarget::Node(id.to_string())))
        }
        None => {
            let scene = state
                .current_scene()
                .ok_or_else(|| EditorError::SceneNotFound(state.scene_id.clone()))?;
            if scene.constraint == SceneConstraint::Single && !scene.children.is_empty() {
                debug!(scene_id = %scene.id, "Scene already has its single root");
                return Ok(None);
            }
            Ok(Some(InsertTarget::Scene(scene.id.clone())))
        }
    }
}

/// Default parent for newly created content: the scene root of a single-root scene,
/// otherwise the scene's top level
pub(crate) fn default_parent(state: &EditorState) -> Option<NodeId> {
    let root = state.current_scene()?.constrained_root()?;
    state
        .node(root)
        .filter(|n| n.accepts_children())
        .map(|n| n.id.clone())
}

fn splice(list: &mut Vec<NodeId>, index: Option<usize>, ids: &[NodeId]) {
    let at = index.unwrap_or(list.len()).min(list.len());
    list.splice(at..at, ids.iter().cloned());
}

pub(crate) fn insert_node(
    state: &mut EditorState,
    node: Node,
    parent_id: Option<&str>,
    index: Option<usize>,
) -> Result<bool, EditorError> {
    if state.document.contains(&node.id) {
        return Err(EditorError::DuplicateNodeId(node.id));
    }
    if node.has_children() {
        return Err(EditorError::InvalidStructure(format!(
            "inserted node {} must not list children",
            node.id
        )));
    }
    let Some(target) = resolve_target(state, parent_id)? else {
        return Ok(false);
    };

    let id = node.id.clone();
    let font = node.text_data().map(|t| t.font_family.clone());
    let doc = state.doc_mut();
    doc.nodes.insert(id.clone(), Arc::new(node));
    if let Some(children) = target.children_mut(doc) {
        splice(children, index, std::slice::from_ref(&id));
    }
    if let Some(font) = font {
        doc.register_font(&font);
        doc.fonts.sort();
    }
    state.rebuild_hierarchy();
    debug!(node_id = %id, parent = ?target.parent_id(), "Inserted node");
    Ok(true)
}

/// Instantiate prototypes with fresh ids under one parent and select the new roots
pub(crate) fn insert_prototypes(
    state: &mut EditorState,
    prototypes: &[NodePrototype],
    parent_id: Option<&str>,
    index: Option<usize>,
) -> Result<bool, EditorError> {
    if prototypes.is_empty() {
        return Ok(false);
    }
    let Some(target) = resolve_target(state, parent_id)? else {
        return Ok(false);
    };
    if matches!(target, InsertTarget::Scene(_))
        && state.current_scene().map(|s| s.constraint) == Some(SceneConstraint::Single)
        && prototypes.len() > 1
    {
        debug!("Refusing to add several roots to a single-root scene");
        return Ok(false);
    }

    let mut nodes = Vec::new();
    let roots: Vec<NodeId> = prototypes
        .iter()
        .map(|p| clipboard::instantiate(p, &mut state.id_generator, &mut nodes))
        .collect();

    let doc = state.doc_mut();
    for node in nodes {
        doc.nodes.insert(node.id.clone(), Arc::new(node));
    }
    if let Some(children) = target.children_mut(doc) {
        splice(children, index, &roots);
    }
    doc.recompute_fonts();
    state.rebuild_hierarchy();
    state.selection = roots;
    Ok(true)
}

/// Remove nodes and their subtrees. Missing ids and constrained scene roots are
/// skipped.
pub(crate) fn delete_nodes(state: &mut EditorState, ids: &[NodeId]) -> Result<bool, EditorError> {
    let targets: Vec<NodeId> = prune_nested_nodes(&state.hierarchy, ids)
        .into_iter()
        .filter(|id| {
            if !state.document.contains(id) {
                debug!(node_id = %id, "Delete of missing node ignored");
                return false;
            }
            if state.is_constrained_root(id) {
                debug!(node_id = %id, "Scene root cannot be deleted");
                return false;
            }
            true
        })
        .collect();
    if targets.is_empty() {
        return Ok(false);
    }

    let hierarchy = Arc::clone(&state.hierarchy);
    let doc = state.doc_mut();
    let mut removed = Vec::new();
    for id in &targets {
        doc.detach(id, hierarchy.parent_of(id));
        removed.extend(doc.remove_subtree(id));
    }
    state.rebuild_hierarchy();
    post_effects::after_removal(state, &removed);
    debug!(count = removed.len(), "Deleted nodes");
    Ok(true)
}

/// Move nodes under `parent_id` (current scene top level when `None`) at `index`,
/// counted after the moved nodes left their old places.
///
/// Refused when it would create a cycle or move a constrained scene root.
pub(crate) fn move_nodes(
    state: &mut EditorState,
    ids: &[NodeId],
    parent_id: Option<&str>,
    index: Option<usize>,
) -> Result<bool, EditorError> {
    let ids = prune_nested_nodes(&state.hierarchy, ids);
    if ids.is_empty() {
        return Ok(false);
    }
    for id in &ids {
        if !state.document.contains(id) {
            return Err(EditorError::NodeNotFound(id.clone()));
        }
    }
    let Some(target) = resolve_target(state, parent_id)? else {
        return Ok(false);
    };
    for id in &ids {
        if state.is_constrained_root(id) {
            debug!(node_id = %id, "Scene root cannot be moved");
            return Ok(false);
        }
        if let InsertTarget::Node(parent) = &target {
            if parent == id || state.hierarchy.is_ancestor(id, parent) {
                debug!(node_id = %id, parent = %parent, "Move would create a cycle");
                return Ok(false);
            }
        }
    }

    // Work on a shallow copy so an order-preserving move leaves the state untouched
    let mut doc = (*state.document).clone();
    for id in &ids {
        doc.detach(id, state.hierarchy.parent_of(id));
    }
    let Some(children) = target.children_mut(&mut doc) else {
        return Ok(false);
    };
    splice(children, index, &ids);

    if doc == *state.document {
        return Ok(false);
    }
    state.document = Arc::new(doc);
    state.rebuild_hierarchy();
    debug!(count = ids.len(), parent = ?target.parent_id(), "Moved nodes");
    Ok(true)
}

/// Compute a new sibling order for `list`; `selected` holds the ids to move
pub(crate) fn reordered(list: &[NodeId], selected: &HashSet<&str>, target: ReorderTarget) -> Vec<NodeId> {
    let is_selected = |id: &NodeId| selected.contains(id.as_str());
    let (moving, rest): (Vec<NodeId>, Vec<NodeId>) = list.iter().cloned().partition(is_selected);

    match target {
        ReorderTarget::Front => rest.into_iter().chain(moving).collect(),
        ReorderTarget::Back => moving.into_iter().chain(rest).collect(),
        ReorderTarget::Index(i) => {
            let mut out = rest;
            let at = i.min(out.len());
            out.splice(at..at, moving);
            out
        }
        ReorderTarget::Forward => {
            let mut out = list.to_vec();
            for i in (0..out.len().saturating_sub(1)).rev() {
                if is_selected(&out[i]) && !is_selected(&out[i + 1]) {
                    out.swap(i, i + 1);
                }
            }
            out
        }
        ReorderTarget::Backward => {
            let mut out = list.to_vec();
            for i in 1..out.len() {
                if is_selected(&out[i]) && !is_selected(&out[i - 1]) {
                    out.swap(i, i - 1);
                }
            }
            out
        }
    }
}

/// Change z-order among siblings; ids are grouped by parent
pub(crate) fn reorder(state: &mut EditorState, ids: &[NodeId], target: ReorderTarget) -> Result<bool, EditorError> {
    let mut parents: Vec<InsertTarget> = Vec::new();
    for id in ids {
        if !state.hierarchy.contains(id) {
            return Err(EditorError::NodeNotFound(id.clone()));
        }
        let parent = match state.hierarchy.parent_of(id) {
            Some(p) => InsertTarget::Node(p.to_string()),
            None => match state.hierarchy.scene_of(id) {
                Some(scene) => InsertTarget::Scene(scene.to_string()),
                None => continue,
            },
        };
        if !parents.contains(&parent) {
            parents.push(parent);
        }
    }

    let selected: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let mut changed = false;
    for parent in parents {
        let Some(current) = parent.children(&state.document) else {
            continue;
        };
        let next = reordered(current, &selected, target);
        if next == *current {
            continue;
        }
        if let Some(children) = parent.children_mut(state.doc_mut()) {
            *children = next;
            changed = true;
        }
    }
    if changed {
        state.rebuild_hierarchy();
    }
    Ok(changed)
}

/// Wrap siblings into a new group placed at the first member's position
pub(crate) fn group_nodes(state: &mut EditorState, ids: &[NodeId], name: Option<&str>) -> Result<bool, EditorError> {
    let ids = prune_nested_nodes(&state.hierarchy, ids);
    let Some(first) = ids.first() else {
        return Ok(false);
    };
    for id in &ids {
        if !state.document.contains(id) {
            return Err(EditorError::NodeNotFound(id.clone()));
        }
        if state.is_constrained_root(id) {
            debug!(node_id = %id, "Scene root cannot be grouped");
            return Ok(false);
        }
    }
    let parent = state.hierarchy.parent_of(first).map(str::to_string);
    let scene = state.hierarchy.scene_of(first).map(str::to_string);
    if ids.iter().any(|id| {
        state.hierarchy.parent_of(id).map(str::to_string) != parent
            || state.hierarchy.scene_of(id).map(str::to_string) != scene
    }) {
        debug!("Grouped nodes must share a parent");
        return Ok(false);
    }
    let target = match (&parent, &scene) {
        (Some(p), _) => InsertTarget::Node(p.clone()),
        (None, Some(s)) => InsertTarget::Scene(s.clone()),
        (None, None) => return Ok(false),
    };
    let Some(siblings) = target.children(&state.document) else {
        return Ok(false);
    };
    // members keep their stacking order inside the group
    let members: Vec<NodeId> = siblings.iter().filter(|s| ids.contains(s)).cloned().collect();
    let index = siblings.iter().position(|s| ids.contains(s));

    let group_id = state.id_generator.new_id();
    let mut group = Node::group(group_id.clone()).with_children(members.clone());
    if let Some(name) = name {
        group.name = name.to_string();
    }

    let doc = state.doc_mut();
    if let Some(children) = target.children_mut(doc) {
        children.retain(|c| !members.contains(c));
        splice(children, index, std::slice::from_ref(&group_id));
    }
    doc.nodes.insert(group_id.clone(), Arc::new(group));
    state.rebuild_hierarchy();
    state.selection = vec![group_id];
    Ok(true)
}

/// Replace groups by their children; other node kinds are ignored
pub(crate) fn ungroup_nodes(state: &mut EditorState, ids: &[NodeId]) -> Result<bool, EditorError> {
    let mut released = Vec::new();
    let mut removed = Vec::new();
    for id in ids {
        let node = state
            .node(id)
            .ok_or_else(|| EditorError::NodeNotFound(id.clone()))?;
        let NodeKind::Group(group) = &node.kind else {
            debug!(node_id = %id, "Not a group");
            continue;
        };
        // a single-root scene may only hand its root over to one child
        if state.is_constrained_root(id) && group.children.len() != 1 {
            debug!(node_id = %id, "Scene root cannot be ungrouped");
            continue;
        }
        let children = group.children.clone();
        let parent = state.hierarchy.parent_of(id).map(str::to_string);
        let target = match &parent {
            Some(p) => InsertTarget::Node(p.clone()),
            None => match state.document.scene_of_top_level(id) {
                Some(scene) => InsertTarget::Scene(scene.id.clone()),
                None => continue,
            },
        };

        let doc = state.doc_mut();
        let index = doc.detach(id, parent.as_deref());
        doc.nodes.remove(id);
        if let Some(list) = target.children_mut(doc) {
            splice(list, index, &children);
        }
        removed.push(id.clone());
        released.extend(children);
    }
    if removed.is_empty() {
        return Ok(false);
    }
    state.rebuild_hierarchy();
    post_effects::after_removal(state, &removed);
    state.selection = released;
    Ok(true)
}
