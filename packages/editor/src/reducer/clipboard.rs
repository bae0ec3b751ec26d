//! Copy, cut, paste, duplicate
//!
//! The clipboard holds [`NodePrototype`]s: detached subtrees that keep their original
//! ids only as a shape. Every instantiation draws fresh ids from the state's
//! [`IdGenerator`], so one prototype can be pasted any number of times.

use std::sync::Arc;

use canvas_common::IdGenerator;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::structure::{self, InsertTarget};
use crate::document::Document;
use crate::node::{Node, NodeId};
use crate::raycast::prune_nested_nodes;
use crate::state::EditorState;
use crate::EditorError;

/// A node together with its subtree, detached from any document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePrototype {
    pub node: Node,
    #[serde(default)]
    pub children: Vec<NodePrototype>,
}

impl NodePrototype {
    /// Capture `id` and its descendants from `doc`
    pub fn capture(doc: &Document, id: &str) -> Option<Self> {
        Self::capture_with(&|child| doc.node(child), id)
    }

    pub(crate) fn capture_with<'a, F>(lookup: &F, id: &str) -> Option<Self>
    where
        F: Fn(&str) -> Option<&'a Node>,
    {
        let node = lookup(id)?.clone();
        let children = node
            .children()
            .unwrap_or(&[])
            .iter()
            .filter_map(|child| Self::capture_with(lookup, child))
            .collect();
        Some(Self { node, children })
    }

    /// Number of nodes in this subtree
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(NodePrototype::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Emit the prototype's nodes under fresh ids into `out`, parents first. Returns the
/// new root id.
pub fn instantiate(proto: &NodePrototype, ids: &mut IdGenerator, out: &mut Vec<Node>) -> NodeId {
    let id = ids.new_id();
    let mut node = proto.node.clone();
    node.id = id.clone();
    let slot = out.len();
    out.push(node);

    let child_ids: Vec<NodeId> = proto
        .children
        .iter()
        .map(|child| instantiate(child, ids, out))
        .collect();
    if let Some(children) = out[slot].children_mut() {
        *children = child_ids;
    }
    id
}

fn capture_all(state: &EditorState, ids: &[NodeId]) -> Vec<NodePrototype> {
    prune_nested_nodes(&state.hierarchy, ids)
        .iter()
        .filter_map(|id| NodePrototype::capture(&state.document, id))
        .collect()
}

pub(super) fn copy(state: &mut EditorState, ids: &[NodeId]) -> Result<bool, EditorError> {
    let prototypes = capture_all(state, ids);
    if prototypes.is_empty() {
        return Ok(false);
    }
    debug!(count = prototypes.len(), "Copied to clipboard");
    state.clipboard = Some(Arc::new(prototypes));
    Ok(true)
}

pub(super) fn cut(state: &mut EditorState, ids: &[NodeId]) -> Result<bool, EditorError> {
    let copied = copy(state, ids)?;
    let deleted = structure::delete_nodes(state, ids)?;
    Ok(copied || deleted)
}

pub(super) fn paste(state: &mut EditorState, parent_id: Option<&str>) -> Result<bool, EditorError> {
    let Some(prototypes) = state.clipboard.clone() else {
        return Ok(false);
    };
    let parent = parent_id
        .map(str::to_string)
        .or_else(|| structure::default_parent(state));
    structure::insert_prototypes(state, &prototypes, parent.as_deref(), None)
}

/// Copy each node next to itself, above the original
pub(super) fn duplicate(state: &mut EditorState, ids: &[NodeId]) -> Result<bool, EditorError> {
    let ids = prune_nested_nodes(&state.hierarchy, ids);
    let mut created = Vec::new();
    for id in &ids {
        if state.is_constrained_root(id) {
            debug!(node_id = %id, "Scene root cannot be duplicated");
            continue;
        }
        let proto = NodePrototype::capture(&state.document, id)
            .ok_or_else(|| EditorError::NodeNotFound(id.clone()))?;
        let target = match state.hierarchy.parent_of(id) {
            Some(parent) => InsertTarget::Node(parent.to_string()),
            None => match state.document.scene_of_top_level(id) {
                Some(scene) => InsertTarget::Scene(scene.id.clone()),
                None => continue,
            },
        };

        let mut nodes = Vec::new();
        let root = instantiate(&proto, &mut state.id_generator, &mut nodes);
        let doc = state.doc_mut();
        for node in nodes {
            doc.nodes.insert(node.id.clone(), Arc::new(node));
        }
        let list = match &target {
            InsertTarget::Node(parent) => doc.node_mut(parent).and_then(Node::children_mut),
            InsertTarget::Scene(scene) => doc.scene_mut(scene).map(|s| &mut s.children),
        };
        if let Some(list) = list {
            let at = list.iter().position(|c| c == id).map_or(list.len(), |i| i + 1);
            list.insert(at, root.clone());
        }
        created.push(root);
    }
    if created.is_empty() {
        return Ok(false);
    }
    state.rebuild_hierarchy();
    state.selection = created;
    Ok(true)
}
