//! # Document
//!
//! Flat node repository plus scenes and templates.
//!
//! A Document is an arena: `id → Node`. Scenes list their top-level node ids, and
//! container-like nodes list child ids. Every value sits behind an `Arc`, so cloning a
//! document copies pointers only and editing one node clones just that node
//! (`Arc::make_mut`). History snapshots lean on this.
//!
//! ## Persisted shape
//!
//! ```text
//! { nodes: { id → Node }, scenes: { id → Scene }, sceneOrder, templates, fonts }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::node::{Color, Node, NodeId, NodeKind};
use crate::template::Template;
use crate::EditorError;

pub type SceneId = String;

/// How many top-level children a scene allows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SceneConstraint {
    /// Exactly one root node, which cannot be deleted or moved out
    Single,
    #[default]
    Multiple,
}

/// Ruler guide: a line at `offset` canvas units along `axis`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guide {
    pub axis: canvas_common::Axis,
    pub offset: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: SceneId,
    pub name: String,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub constraint: SceneConstraint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    #[serde(default)]
    pub guides: Vec<Guide>,
}

impl Scene {
    pub fn new(id: impl Into<SceneId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            children: Vec::new(),
            constraint: SceneConstraint::Multiple,
            background: None,
            guides: Vec::new(),
        }
    }

    pub fn with_constraint(mut self, constraint: SceneConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// The mandatory root of a single-child scene
    pub fn constrained_root(&self) -> Option<&str> {
        match self.constraint {
            SceneConstraint::Single => self.children.first().map(String::as_str),
            SceneConstraint::Multiple => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub nodes: BTreeMap<NodeId, Arc<Node>>,
    #[serde(default)]
    pub scenes: BTreeMap<SceneId, Arc<Scene>>,
    /// Display order of scenes
    #[serde(default)]
    pub scene_order: Vec<SceneId>,
    #[serde(default)]
    pub templates: BTreeMap<String, Arc<Template>>,
    /// Deduplicated font families used by text nodes
    #[serde(default)]
    pub fonts: Vec<String>,
}

impl Document {
    /// Create a document with a single empty scene
    pub fn with_scene(scene: Scene) -> Self {
        let mut doc = Self::default();
        doc.add_scene(scene);
        doc
    }

    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        let mut doc: Document = serde_json::from_str(json)?;
        // Older files carry no explicit order
        if doc.scene_order.is_empty() {
            doc.scene_order = doc.scenes.keys().cloned().collect();
        }
        doc.recompute_fonts();
        Ok(doc)
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn add_scene(&mut self, scene: Scene) {
        if !self.scene_order.contains(&scene.id) {
            self.scene_order.push(scene.id.clone());
        }
        self.scenes.insert(scene.id.clone(), Arc::new(scene));
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id).map(Arc::as_ref)
    }

    /// Copy-on-write access to a node
    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id).map(Arc::make_mut)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.get(id).map(Arc::as_ref)
    }

    pub fn scene_mut(&mut self, id: &str) -> Option<&mut Scene> {
        self.scenes.get_mut(id).map(Arc::make_mut)
    }

    pub fn template(&self, id: &str) -> Option<&Template> {
        self.templates.get(id).map(Arc::as_ref)
    }

    /// Scene whose top-level list holds `id`
    pub fn scene_of_top_level(&self, id: &str) -> Option<&Scene> {
        self.scene_order
            .iter()
            .filter_map(|sid| self.scene(sid))
            .find(|scene| scene.children.iter().any(|c| c == id))
    }

    /// Ids of `id` and all of its descendants, parents before children
    pub fn collect_subtree(&self, id: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if out.contains(&current) {
                warn!(node_id = %current, "Node reachable twice while collecting subtree");
                continue;
            }
            if let Some(node) = self.node(&current) {
                if let Some(children) = node.children() {
                    stack.extend(children.iter().rev().cloned());
                }
            }
            out.push(current);
        }
        out
    }

    /// Remove `id` and its whole subtree from the repository.
    ///
    /// The parent's child list is left alone; the caller detaches first.
    pub fn remove_subtree(&mut self, id: &str) -> Vec<NodeId> {
        let ids = self.collect_subtree(id);
        for removed in &ids {
            self.nodes.remove(removed);
        }
        ids
    }

    /// Remove `id` from whichever child list holds it (parent node or scene)
    pub fn detach(&mut self, id: &str, parent: Option<&str>) -> Option<usize> {
        match parent {
            Some(parent_id) => {
                let children = self.node_mut(parent_id)?.children_mut()?;
                let index = children.iter().position(|c| c == id)?;
                children.remove(index);
                Some(index)
            }
            None => {
                let scene_id = self.scene_of_top_level(id)?.id.clone();
                let scene = self.scene_mut(&scene_id)?;
                let index = scene.children.iter().position(|c| c == id)?;
                scene.children.remove(index);
                Some(index)
            }
        }
    }

    /// Rebuild the font registry from every text node
    pub fn recompute_fonts(&mut self) {
        self.fonts = self.used_fonts();
    }

    /// Sorted, deduplicated font families of all text nodes
    pub fn used_fonts(&self) -> Vec<String> {
        let mut fonts: Vec<String> = Vec::new();
        for node in self.nodes.values() {
            if let NodeKind::Text(text) = &node.kind {
                if !text.font_family.is_empty() && !fonts.contains(&text.font_family) {
                    fonts.push(text.font_family.clone());
                }
            }
        }
        fonts.sort();
        fonts
    }

    /// Append a family to the font registry if new
    pub fn register_font(&mut self, family: &str) {
        if !family.is_empty() && !self.fonts.iter().any(|f| f == family) {
            self.fonts.push(family.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::with_scene(Scene::new("s1", "Page"));
        doc.nodes.insert(
            "c1".into(),
            Arc::new(Node::container("c1").with_children(vec!["r1".into(), "t1".into()])),
        );
        doc.nodes.insert("r1".into(), Arc::new(Node::rectangle("r1")));
        let mut text = Node::text("t1", "Hi");
        if let NodeKind::Text(t) = &mut text.kind {
            t.font_family = "Inter".into();
        }
        doc.nodes.insert("t1".into(), Arc::new(text));
        doc.scene_mut("s1").unwrap().children.push("c1".into());
        doc
    }

    #[test]
    fn test_collect_subtree_is_parent_first() {
        let doc = sample();
        assert_eq!(doc.collect_subtree("c1"), vec!["c1", "r1", "t1"]);
    }

    #[test]
    fn test_remove_subtree_removes_descendants() {
        let mut doc = sample();
        doc.detach("c1", None);
        let removed = doc.remove_subtree("c1");
        assert_eq!(removed.len(), 3);
        assert!(doc.nodes.is_empty());
        assert!(doc.scene("s1").unwrap().children.is_empty());
    }

    #[test]
    fn test_clone_shares_unchanged_nodes() {
        let doc = sample();
        let mut copy = doc.clone();
        copy.node_mut("r1").unwrap().name = "Renamed".into();

        assert!(Arc::ptr_eq(&doc.nodes["c1"], &copy.nodes["c1"]));
        assert!(!Arc::ptr_eq(&doc.nodes["r1"], &copy.nodes["r1"]));
        assert_eq!(doc.node("r1").unwrap().name, "Rectangle");
    }

    #[test]
    fn test_json_round_trip_recomputes_fonts() {
        let doc = sample();
        let json = doc.to_json().unwrap();
        let back = Document::from_json(&json).unwrap();
        assert_eq!(back.nodes, doc.nodes);
        assert_eq!(back.fonts, vec!["Inter"]);
    }

    #[test]
    fn test_constrained_root() {
        let mut scene = Scene::new("s", "Artboard").with_constraint(SceneConstraint::Single);
        assert_eq!(scene.constrained_root(), None);
        scene.children.push("root".into());
        assert_eq!(scene.constrained_root(), Some("root"));
    }
}
