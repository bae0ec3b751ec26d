//! Template definition, instance overrides and detaching

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::clipboard::{instantiate, NodePrototype};
use super::update_node;
use crate::node::{InstanceData, Node, NodeId, NodeKind, NodePatch};
use crate::post_effects;
use crate::state::EditorState;
use crate::template::{instance_data, resolve_all, Template};
use crate::EditorError;

pub(super) fn define(state: &mut EditorState, template: &Template) -> Result<bool, EditorError> {
    if state.document.templates.contains_key(&template.id) {
        return Err(EditorError::DuplicateTemplate(template.id.clone()));
    }
    if template.root().is_none() {
        return Err(EditorError::InvalidStructure(format!(
            "template {} has no root node {}",
            template.id, template.root_id
        )));
    }
    state
        .doc_mut()
        .templates
        .insert(template.id.clone(), Arc::new(template.clone()));
    Ok(true)
}

/// Move `id` and its subtree into a new template, leaving an instance at its place
pub(super) fn create_from_node(state: &mut EditorState, id: &str, name: &str) -> Result<bool, EditorError> {
    let root = state
        .node(id)
        .ok_or_else(|| EditorError::NodeNotFound(id.to_string()))?;
    if state.is_constrained_root(id) {
        debug!(node_id = %id, "Scene root cannot become a template");
        return Ok(false);
    }
    let layout = root.layout.clone();

    let subtree = state.document.collect_subtree(id);
    let mut nodes: BTreeMap<NodeId, Arc<Node>> = subtree
        .iter()
        .filter_map(|n| state.document.nodes.get(n).map(|node| (n.clone(), Arc::clone(node))))
        .collect();
    // the instance carries the position now
    if let Some(template_root) = nodes.get_mut(id).map(Arc::make_mut) {
        template_root.layout.left = Some(0.0);
        template_root.layout.top = Some(0.0);
    }

    let template_id = state.id_generator.new_id();
    let instance_id = state.id_generator.new_id();
    let mut instance = Node::new(
        instance_id.clone(),
        name,
        NodeKind::TemplateInstance(InstanceData {
            template_id: template_id.clone(),
            overrides: BTreeMap::new(),
        }),
    );
    instance.layout = layout;

    let parent = state.hierarchy.parent_of(id).map(str::to_string);
    let scene_id = state.document.scene_of_top_level(id).map(|s| s.id.clone());
    let doc = state.doc_mut();
    let index = doc.detach(id, parent.as_deref());
    let removed = doc.remove_subtree(id);
    doc.nodes.insert(instance_id.clone(), Arc::new(instance));
    let list = match (&parent, &scene_id) {
        (Some(p), _) => doc.node_mut(p).and_then(Node::children_mut),
        (None, Some(s)) => doc.scene_mut(s).map(|scene| &mut scene.children),
        (None, None) => None,
    };
    if let Some(list) = list {
        let at = index.unwrap_or(list.len()).min(list.len());
        list.insert(at, instance_id.clone());
    }
    doc.templates.insert(
        template_id.clone(),
        Arc::new(Template {
            id: template_id,
            name: name.to_string(),
            root_id: id.to_string(),
            nodes,
        }),
    );

    state.rebuild_hierarchy();
    post_effects::after_removal(state, &removed);
    state.selection = vec![instance_id];
    Ok(true)
}

fn check_sub_id(state: &EditorState, instance_id: &str, sub_id: &str) -> Result<(), EditorError> {
    let instance = state
        .node(instance_id)
        .ok_or_else(|| EditorError::NodeNotFound(instance_id.to_string()))?;
    let data = instance_data(instance)?;
    let template = state
        .document
        .template(&data.template_id)
        .ok_or_else(|| EditorError::TemplateNotFound(data.template_id.clone()))?;
    if template.node(sub_id).is_none() {
        return Err(EditorError::UnknownOverrideTarget {
            template_id: template.id.clone(),
            sub_id: sub_id.to_string(),
        });
    }
    Ok(())
}

/// Store a per-field patch for one template node; an empty patch removes the override
pub(super) fn set_override(state: &mut EditorState, id: &str, sub_id: &str, patch: &NodePatch) -> Result<bool, EditorError> {
    check_sub_id(state, id, sub_id)?;
    update_node(state, id, |node| {
        if let NodeKind::TemplateInstance(data) = &mut node.kind {
            if patch.is_empty() {
                data.overrides.remove(sub_id);
            } else {
                data.overrides.insert(sub_id.to_string(), patch.clone());
            }
        }
        Ok(())
    })
}

pub(super) fn clear_override(state: &mut EditorState, id: &str, sub_id: &str) -> Result<bool, EditorError> {
    check_sub_id(state, id, sub_id)?;
    update_node(state, id, |node| {
        if let NodeKind::TemplateInstance(data) = &mut node.kind {
            data.overrides.remove(sub_id);
        }
        Ok(())
    })
}

/// Replace an instance by live copies of its resolved template nodes
pub(super) fn detach(state: &mut EditorState, id: &str) -> Result<bool, EditorError> {
    let instance = state
        .node(id)
        .ok_or_else(|| EditorError::NodeNotFound(id.to_string()))?;
    let data = instance_data(instance)?;
    let template = state
        .document
        .template(&data.template_id)
        .ok_or_else(|| EditorError::TemplateNotFound(data.template_id.clone()))?;
    let root_id = template.root_id.clone();

    let resolved: BTreeMap<NodeId, Node> = resolve_all(&state.document, instance)?
        .into_iter()
        .map(|n| (n.id.clone(), n))
        .collect();
    let Some(mut proto) = NodePrototype::capture_with(&|sub: &str| resolved.get(sub), &root_id) else {
        return Ok(false);
    };
    proto.node.name = instance.name.clone();
    proto.node.layout = instance.layout.clone();

    let mut nodes = Vec::new();
    let new_root = instantiate(&proto, &mut state.id_generator, &mut nodes);

    let parent = state.hierarchy.parent_of(id).map(str::to_string);
    let scene_id = state.document.scene_of_top_level(id).map(|s| s.id.clone());
    let doc = state.doc_mut();
    let index = doc.detach(id, parent.as_deref());
    doc.nodes.remove(id);
    for node in nodes {
        doc.nodes.insert(node.id.clone(), Arc::new(node));
    }
    let list = match (&parent, &scene_id) {
        (Some(p), _) => doc.node_mut(p).and_then(Node::children_mut),
        (None, Some(s)) => doc.scene_mut(s).map(|scene| &mut scene.children),
        (None, None) => None,
    };
    if let Some(list) = list {
        let at = index.unwrap_or(list.len()).min(list.len());
        list.insert(at, new_root.clone());
    }
    doc.recompute_fonts();

    state.rebuild_hierarchy();
    post_effects::after_removal(state, &[id.to_string()]);
    state.selection = vec![new_root];
    Ok(true)
}
