//! Template Resolution
//!
//! A [`Template`] is an immutable named subtree with its own node repository. A
//! template-instance node points at a template and carries per-node override patches;
//! resolving an embedded node merges the template definition with the instance's patch.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::node::{InstanceData, Node, NodeId, NodeKind};
use crate::EditorError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub root_id: NodeId,
    #[serde(default)]
    pub nodes: BTreeMap<NodeId, Arc<Node>>,
}

impl Template {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id).map(Arc::as_ref)
    }

    pub fn root(&self) -> Option<&Node> {
        self.node(&self.root_id)
    }
}

/// Result of looking a node up by id
#[derive(Debug, Clone, PartialEq)]
pub enum NodeLookup<'a> {
    /// Node lives in the document repository
    Live(&'a Node),
    /// Node only exists inside a template definition
    Template {
        template_id: &'a str,
        node: &'a Node,
    },
}

impl<'a> NodeLookup<'a> {
    pub fn node(&self) -> &'a Node {
        match self {
            NodeLookup::Live(node) => node,
            NodeLookup::Template { node, .. } => node,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, NodeLookup::Live(_))
    }
}

/// Find a node in the live document, falling back to template repositories
pub fn get_node_by_id<'a>(doc: &'a Document, id: &str) -> Result<NodeLookup<'a>, EditorError> {
    if let Some(node) = doc.node(id) {
        return Ok(NodeLookup::Live(node));
    }

    doc.templates
        .values()
        .find_map(|template| {
            template.node(id).map(|node| NodeLookup::Template {
                template_id: template.id.as_str(),
                node,
            })
        })
        .ok_or_else(|| EditorError::NodeNotFound(id.to_string()))
}

/// Resolve `sub_id` as seen through a template instance: template definition with the
/// instance's override applied per field. Never touches the template.
pub fn resolve(doc: &Document, instance: &Node, sub_id: &str) -> Result<Node, EditorError> {
    let data = instance_data(instance)?;
    let template = doc
        .template(&data.template_id)
        .ok_or_else(|| EditorError::TemplateNotFound(data.template_id.clone()))?;
    let base = template
        .node(sub_id)
        .ok_or_else(|| EditorError::UnknownOverrideTarget {
            template_id: template.id.clone(),
            sub_id: sub_id.to_string(),
        })?;

    Ok(match data.overrides.get(sub_id) {
        Some(patch) => patch.apply_to(base),
        None => base.clone(),
    })
}

/// Resolve every node of an instance's template, in template order
pub fn resolve_all(doc: &Document, instance: &Node) -> Result<Vec<Node>, EditorError> {
    let data = instance_data(instance)?;
    let template = doc
        .template(&data.template_id)
        .ok_or_else(|| EditorError::TemplateNotFound(data.template_id.clone()))?;
    template
        .nodes
        .keys()
        .map(|id| resolve(doc, instance, id))
        .collect()
}

pub(crate) fn instance_data(node: &Node) -> Result<&InstanceData, EditorError> {
    match &node.kind {
        NodeKind::TemplateInstance(data) => Ok(data),
        _ => Err(EditorError::wrong_kind(node, "templateId")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Scene;
    use crate::node::NodePatch;

    fn doc_with_template() -> Document {
        let mut doc = Document::with_scene(Scene::new("s1", "Page"));
        let button = Node::container("btn").with_children(vec!["label".into()]);
        let label = Node::text("label", "Click");
        let template = Template {
            id: "tpl".into(),
            name: "Button".into(),
            root_id: "btn".into(),
            nodes: [button, label]
                .into_iter()
                .map(|n| (n.id.clone(), Arc::new(n)))
                .collect(),
        };
        doc.templates.insert("tpl".into(), Arc::new(template));

        let mut overrides = BTreeMap::new();
        overrides.insert(
            "label".to_string(),
            NodePatch {
                text_content: Some("Buy".into()),
                ..NodePatch::default()
            },
        );
        let instance = Node::new(
            "inst",
            "Button",
            NodeKind::TemplateInstance(InstanceData {
                template_id: "tpl".into(),
                overrides,
            }),
        );
        doc.nodes.insert("inst".into(), Arc::new(instance));
        doc
    }

    #[test]
    fn test_lookup_prefers_live_document() {
        let doc = doc_with_template();
        assert!(get_node_by_id(&doc, "inst").unwrap().is_live());

        let lookup = get_node_by_id(&doc, "label").unwrap();
        assert!(matches!(lookup, NodeLookup::Template { template_id: "tpl", .. }));
        assert!(matches!(
            get_node_by_id(&doc, "nope"),
            Err(EditorError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_resolve_applies_override_without_mutating_template() {
        let doc = doc_with_template();
        let instance = doc.node("inst").unwrap();

        let resolved = resolve(&doc, instance, "label").unwrap();
        assert_eq!(resolved.text_data().unwrap().content, "Buy");

        let template_label = doc.template("tpl").unwrap().node("label").unwrap();
        assert_eq!(template_label.text_data().unwrap().content, "Click");

        let root = resolve(&doc, instance, "btn").unwrap();
        assert_eq!(&root, doc.template("tpl").unwrap().root().unwrap());
    }

    #[test]
    fn test_resolve_rejects_unknown_sub_id() {
        let doc = doc_with_template();
        let instance = doc.node("inst").unwrap();
        assert!(matches!(
            resolve(&doc, instance, "missing"),
            Err(EditorError::UnknownOverrideTarget { .. })
        ));
        assert_eq!(resolve_all(&doc, instance).unwrap().len(), 2);
    }
}
