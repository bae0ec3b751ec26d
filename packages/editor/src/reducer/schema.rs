//! Property schema of component roots
//!
//! Name collisions and unknown names are refused quietly; only a non-component target
//! is an error.

use tracing::debug;

use super::update_node;
use crate::node::{Node, NodeKind, PropertyDefinition, PropertyKind};
use crate::state::EditorState;
use crate::EditorError;

fn properties(node: &mut Node) -> Result<&mut Vec<PropertyDefinition>, EditorError> {
    let err = EditorError::wrong_kind(node, "properties");
    match &mut node.kind {
        NodeKind::Component(component) => Ok(&mut component.properties),
        _ => Err(err),
    }
}

pub(super) fn define(state: &mut EditorState, id: &str, definition: &PropertyDefinition) -> Result<bool, EditorError> {
    update_node(state, id, |node| {
        let props = properties(node)?;
        if props.iter().any(|p| p.name == definition.name) {
            debug!(name = %definition.name, "Property already defined");
            return Ok(());
        }
        props.push(definition.clone());
        Ok(())
    })
}

pub(super) fn rename(state: &mut EditorState, id: &str, from: &str, to: &str) -> Result<bool, EditorError> {
    update_node(state, id, |node| {
        let props = properties(node)?;
        if props.iter().any(|p| p.name == to) {
            debug!(name = %to, "Target property name taken");
            return Ok(());
        }
        match props.iter_mut().find(|p| p.name == from) {
            Some(prop) => prop.name = to.to_string(),
            None => debug!(name = %from, "No such property"),
        }
        Ok(())
    })
}

pub(super) fn update(
    state: &mut EditorState,
    id: &str,
    name: &str,
    kind: Option<PropertyKind>,
    default: Option<&serde_json::Value>,
) -> Result<bool, EditorError> {
    update_node(state, id, |node| {
        let props = properties(node)?;
        let Some(prop) = props.iter_mut().find(|p| p.name == name) else {
            debug!(name = %name, "No such property");
            return Ok(());
        };
        if let Some(kind) = kind {
            prop.kind = kind;
        }
        if let Some(default) = default {
            prop.default = default.clone();
        }
        Ok(())
    })
}

pub(super) fn delete(state: &mut EditorState, id: &str, name: &str) -> Result<bool, EditorError> {
    update_node(state, id, |node| {
        properties(node)?.retain(|p| p.name != name);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::test_support::*;
    use super::*;
    use crate::action::Action;
    use crate::node::ComponentData;

    fn with_component() -> Arc<EditorState> {
        apply_ok(
            &sample_state(),
            Action::InsertNode {
                parent_id: None,
                index: None,
                node: Node::new("cmp", "Card", NodeKind::Component(ComponentData::default())),
            },
        )
    }

    fn definition(name: &str) -> PropertyDefinition {
        PropertyDefinition {
            name: name.into(),
            kind: PropertyKind::String,
            default: serde_json::json!(""),
        }
    }

    fn names(state: &EditorState) -> Vec<String> {
        match &state.node("cmp").unwrap().kind {
            NodeKind::Component(c) => c.properties.iter().map(|p| p.name.clone()).collect(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_define_rename_delete() {
        let state = with_component();
        let state = apply_ok(
            &state,
            Action::DefineProperty {
                id: "cmp".into(),
                definition: definition("title"),
            },
        );
        let state = apply_ok(
            &state,
            Action::RenameProperty {
                id: "cmp".into(),
                from: "title".into(),
                to: "heading".into(),
            },
        );
        assert_eq!(names(&state), vec!["heading"]);

        let state = apply_ok(
            &state,
            Action::DeleteProperty {
                id: "cmp".into(),
                name: "heading".into(),
            },
        );
        assert!(names(&state).is_empty());
    }

    #[test]
    fn test_duplicate_name_is_noop() {
        let state = with_component();
        let once = apply_ok(
            &state,
            Action::DefineProperty {
                id: "cmp".into(),
                definition: definition("title"),
            },
        );
        let twice = apply_ok(
            &once,
            Action::DefineProperty {
                id: "cmp".into(),
                definition: definition("title"),
            },
        );
        assert!(Arc::ptr_eq(&once, &twice));
    }

    #[test]
    fn test_schema_on_non_component_is_an_error() {
        let state = sample_state();
        let result = run(
            &state,
            &geometry(),
            Action::DefineProperty {
                id: "r1".into(),
                definition: definition("title"),
            },
        );
        assert!(matches!(result, Err(EditorError::WrongNodeKind { property: "properties", .. })));
    }
}
