//! # Hierarchy Context
//!
//! Derived parent/child index over a [`Document`]:
//!
//! - `parent_id`: node id → parent id (`None` for scene top-level nodes)
//! - `children_ids`: parent id → ordered child ids (`None` key holds top-level nodes)
//! - `ids`: every node id
//!
//! The context is rebuilt wholesale from the document after structural edits, inside the
//! same reducer step, so the two never drift. Walks are bounded: a corrupted (cyclic)
//! graph reports an error and yields a partial result instead of hanging.

use std::collections::{HashMap, HashSet};

use tracing::{error, warn};

use crate::document::{Document, SceneId};
use crate::node::NodeId;
use crate::EditorError;

/// Hard cap on any single walk through the hierarchy
pub const MAX_ITERATIONS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HierarchyContext {
    parent_id: HashMap<NodeId, Option<NodeId>>,
    children_ids: HashMap<Option<NodeId>, Vec<NodeId>>,
    ids: HashSet<NodeId>,
    /// Scene owning each top-level node
    scene_of: HashMap<NodeId, SceneId>,
}

impl HierarchyContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the context for every scene of `doc`.
    ///
    /// Nodes no scene reaches are indexed as top-level so that every document id
    /// appears exactly once.
    pub fn build(doc: &Document) -> Self {
        let mut ctx = Self::new();

        for scene_id in &doc.scene_order {
            let Some(scene) = doc.scene(scene_id) else {
                warn!(scene_id = %scene_id, "Scene listed in order but missing");
                continue;
            };
            for top in &scene.children {
                if !doc.contains(top) || ctx.contains(top) {
                    warn!(node_id = %top, "Skipping missing or repeated top-level node");
                    continue;
                }
                ctx.insert(top, None);
                ctx.scene_of.insert(top.clone(), scene.id.clone());
                ctx.index_descendants(doc, top);
            }
        }

        for id in doc.nodes.keys() {
            if !ctx.contains(id) {
                warn!(node_id = %id, "Orphan node indexed as top-level");
                ctx.insert(id, None);
            }
        }

        ctx
    }

    fn index_descendants(&mut self, doc: &Document, root: &str) {
        let mut stack = vec![root.to_string()];
        let mut iterations = 0;
        while let Some(parent) = stack.pop() {
            iterations += 1;
            if iterations > MAX_ITERATIONS {
                error!(root = %root, "Iteration cap reached while indexing hierarchy");
                return;
            }
            let Some(children) = doc.node(&parent).and_then(|n| n.children()) else {
                continue;
            };
            for child in children {
                if !doc.contains(child) {
                    warn!(parent = %parent, child = %child, "Child id references missing node");
                    continue;
                }
                if self.contains(child) {
                    error!(parent = %parent, child = %child, "Node has more than one parent");
                    continue;
                }
                self.insert(child, Some(parent.as_str()));
                stack.push(child.clone());
            }
        }
    }

    /// Index `node_id` as the last child of `parent_id`
    pub fn insert(&mut self, node_id: &str, parent_id: Option<&str>) {
        let parent = parent_id.map(str::to_string);
        self.ids.insert(node_id.to_string());
        self.parent_id.insert(node_id.to_string(), parent.clone());
        self.children_ids
            .entry(parent)
            .or_default()
            .push(node_id.to_string());
    }

    /// Reparent without touching the old parent's child list.
    ///
    /// The caller keeps the document and the old parent's list consistent.
    pub fn blindly_move(&mut self, node_id: &str, new_parent_id: Option<&str>) {
        let parent = new_parent_id.map(str::to_string);
        self.parent_id.insert(node_id.to_string(), parent.clone());
        self.children_ids
            .entry(parent)
            .or_default()
            .push(node_id.to_string());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.ids.iter()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Parent of `id`; `None` for top-level or unknown ids
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parent_id.get(id).and_then(|p| p.as_deref())
    }

    pub fn is_top_level(&self, id: &str) -> bool {
        matches!(self.parent_id.get(id), Some(None))
    }

    pub fn scene_of(&self, id: &str) -> Option<&str> {
        let top = self.top_id(id);
        self.scene_of.get(&top).map(String::as_str)
    }

    /// Direct children of `parent` (`None` = top-level)
    pub fn direct_children(&self, parent: Option<&str>) -> &[NodeId] {
        self.children_ids
            .get(&parent.map(str::to_string))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Ancestors of `id`, root first, excluding `id` itself.
    ///
    /// Stops at [`MAX_ITERATIONS`] or on a repeated id and returns what it found.
    pub fn ancestors(&self, id: &str) -> Vec<NodeId> {
        match self.try_ancestors(id) {
            Ok(ancestors) => ancestors,
            Err((partial, err)) => {
                error!(error = %err, "Ancestor walk aborted");
                partial
            }
        }
    }

    /// Like [`ancestors`](Self::ancestors) but surfaces a corrupted graph as an error
    /// alongside the partial result.
    pub fn try_ancestors(&self, id: &str) -> Result<Vec<NodeId>, (Vec<NodeId>, EditorError)> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.parent_of(id);

        while let Some(parent) = current {
            if out.len() >= MAX_ITERATIONS || parent == id || !seen.insert(parent) {
                out.reverse();
                return Err((
                    out,
                    EditorError::HierarchyCorrupted {
                        id: id.to_string(),
                        limit: MAX_ITERATIONS,
                    },
                ));
            }
            out.push(parent.to_string());
            current = self.parent_of(parent);
        }

        out.reverse();
        Ok(out)
    }

    pub fn is_ancestor(&self, ancestor: &str, of: &str) -> bool {
        self.ancestors(of).iter().any(|a| a == ancestor)
    }

    /// Other children of the same parent; top-level nodes see their scene's top level
    pub fn siblings(&self, id: &str) -> Vec<NodeId> {
        let Some(parent) = self.parent_id.get(id) else {
            return Vec::new();
        };
        let scene = self.scene_of.get(id);
        self.direct_children(parent.as_deref())
            .iter()
            .filter(|s| s.as_str() != id)
            .filter(|s| parent.is_some() || self.scene_of.get(*s) == scene)
            .cloned()
            .collect()
    }

    /// Children of `id`, depth-first pre-order when `recursive`
    pub fn children(&self, id: Option<&str>, recursive: bool) -> Vec<NodeId> {
        if !recursive {
            return self.direct_children(id).to_vec();
        }

        let mut out = Vec::new();
        let mut stack: Vec<&NodeId> = self.direct_children(id).iter().rev().collect();
        while let Some(next) = stack.pop() {
            if out.len() >= MAX_ITERATIONS {
                error!(root = ?id, "Iteration cap reached while collecting children");
                break;
            }
            out.push(next.clone());
            stack.extend(self.direct_children(Some(next.as_str())).iter().rev());
        }
        out
    }

    pub fn depth(&self, id: &str) -> usize {
        self.ancestors(id).len()
    }

    /// Outermost ancestor of `id`, or `id` itself when top-level
    pub fn top_id(&self, id: &str) -> NodeId {
        self.ancestors(id)
            .into_iter()
            .next()
            .unwrap_or_else(|| id.to_string())
    }

    /// Check that `children_ids` and `parent_id` mirror each other
    pub fn is_consistent(&self) -> bool {
        let forward = self.parent_id.iter().all(|(child, parent)| {
            self.children_ids
                .get(parent)
                .is_some_and(|c| c.iter().filter(|x| *x == child).count() == 1)
        });
        let backward = self.children_ids.iter().all(|(parent, children)| {
            children
                .iter()
                .all(|c| self.parent_id.get(c) == Some(parent))
        });
        forward && backward && self.parent_id.len() == self.ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Scene;
    use crate::node::Node;
    use std::sync::Arc;

    fn doc() -> Document {
        let mut doc = Document::with_scene(Scene::new("s1", "Page"));
        let nodes = [
            Node::container("a").with_children(vec!["b".into(), "c".into()]),
            Node::container("b").with_children(vec!["d".into()]),
            Node::rectangle("c"),
            Node::rectangle("d"),
            Node::rectangle("e"),
        ];
        for n in nodes {
            doc.nodes.insert(n.id.clone(), Arc::new(n));
        }
        doc.scene_mut("s1").unwrap().children = vec!["a".into(), "e".into()];
        doc
    }

    #[test]
    fn test_build_indexes_every_node() {
        let ctx = HierarchyContext::build(&doc());
        assert_eq!(ctx.len(), 5);
        assert_eq!(ctx.parent_of("d"), Some("b"));
        assert!(ctx.is_top_level("a"));
        assert!(ctx.is_consistent());
    }

    #[test]
    fn test_ancestors_are_root_first() {
        let ctx = HierarchyContext::build(&doc());
        assert_eq!(ctx.ancestors("d"), vec!["a", "b"]);
        assert_eq!(ctx.depth("d"), 2);
        assert_eq!(ctx.top_id("d"), "a");
        assert_eq!(ctx.top_id("e"), "e");
        assert!(ctx.ancestors("a").is_empty());
    }

    #[test]
    fn test_siblings_and_children() {
        let ctx = HierarchyContext::build(&doc());
        assert_eq!(ctx.siblings("b"), vec!["c"]);
        assert_eq!(ctx.siblings("a"), vec!["e"]);
        assert_eq!(ctx.children(Some("a"), false), vec!["b", "c"]);
        assert_eq!(ctx.children(Some("a"), true), vec!["b", "d", "c"]);
        assert_eq!(ctx.scene_of("d"), Some("s1"));
    }

    #[test]
    fn test_cycle_is_reported_not_looped() {
        let mut ctx = HierarchyContext::new();
        ctx.insert("x", None);
        ctx.insert("y", Some("x"));
        ctx.blindly_move("x", Some("y"));

        let result = ctx.try_ancestors("y");
        assert!(matches!(result, Err((_, EditorError::HierarchyCorrupted { .. }))));
        // infallible variant still terminates
        assert!(!ctx.ancestors("y").contains(&"y".to_string()));
    }

    #[test]
    fn test_blindly_move_leaves_old_parent_list() {
        let mut ctx = HierarchyContext::build(&doc());
        ctx.blindly_move("d", Some("a"));
        assert_eq!(ctx.parent_of("d"), Some("a"));
        // stale entry remains until the caller rebuilds
        assert!(ctx.direct_children(Some("b")).contains(&"d".to_string()));
        assert!(!ctx.is_consistent());
    }
}
