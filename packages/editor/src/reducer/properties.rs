//! Property edits on existing nodes

use tracing::debug;

use super::{update_node, update_nodes};
use crate::action::Action;
use crate::node::{CornerRadius, Dimension, NodeKind};
use crate::state::EditorState;
use crate::EditorError;

pub(super) fn apply(state: &mut EditorState, action: &Action) -> Result<bool, EditorError> {
    match action {
        Action::SetName { id, name } => update_node(state, id, |node| {
            node.name = name.clone();
            Ok(())
        }),
        Action::SetActive { ids, active } => update_nodes(state, ids, |node| {
            node.active = *active;
            Ok(())
        }),
        Action::SetLocked { ids, locked } => update_nodes(state, ids, |node| {
            node.locked = *locked;
            Ok(())
        }),
        Action::SetPosition { id, left, top } => update_node(state, id, |node| {
            if let Some(left) = left {
                node.layout.left = Some(*left);
                node.layout.right = None;
            }
            if let Some(top) = top {
                node.layout.top = Some(*top);
                node.layout.bottom = None;
            }
            Ok(())
        }),
        Action::MoveBy { ids, delta } => {
            if delta.x == 0.0 && delta.y == 0.0 {
                return Ok(false);
            }
            let movable: Vec<String> = ids
                .iter()
                .filter(|id| !state.is_constrained_root(id))
                .cloned()
                .collect();
            update_nodes(state, &movable, |node| {
                node.layout.left = Some(node.layout.left.unwrap_or(0.0) + delta.x);
                node.layout.top = Some(node.layout.top.unwrap_or(0.0) + delta.y);
                Ok(())
            })
        }
        Action::SetPositionMode { ids, mode } => update_nodes(state, ids, |node| {
            node.layout.position = *mode;
            Ok(())
        }),
        Action::SetSize { ids, width, height } => update_nodes(state, ids, |node| {
            if let Some(width) = width {
                node.layout.width = clamp_dimension(*width);
            }
            if let Some(height) = height {
                node.layout.height = clamp_dimension(*height);
            }
            Ok(())
        }),
        Action::SetRotation { ids, rotation } => update_nodes(state, ids, |node| {
            node.layout.rotation = rotation.rem_euclid(360.0);
            Ok(())
        }),
        Action::SetOpacity { ids, opacity } => update_nodes(state, ids, |node| {
            node.style.opacity = opacity.clamp(0.0, 1.0);
            Ok(())
        }),
        Action::SetFills { ids, fills } => update_nodes(state, ids, |node| {
            node.style.fills = fills.clone();
            Ok(())
        }),
        Action::SetStrokes { ids, strokes } => update_nodes(state, ids, |node| {
            node.style.strokes = strokes.clone();
            Ok(())
        }),
        Action::SetTextContent { id, content } => update_node(state, id, |node| {
            match &mut node.kind {
                NodeKind::Text(text) => text.content = content.clone(),
                _ => return Err(EditorError::wrong_kind(node, "textContent")),
            }
            Ok(())
        }),
        Action::SetFontFamily { ids, family } => {
            let changed = update_nodes(state, ids, |node| {
                match &mut node.kind {
                    NodeKind::Text(text) => text.font_family = family.clone(),
                    _ => return Err(EditorError::wrong_kind(node, "fontFamily")),
                }
                Ok(())
            })?;
            if changed && !family.is_empty() {
                let doc = state.doc_mut();
                doc.register_font(family);
                doc.fonts.sort();
            }
            Ok(changed)
        }
        Action::SetFontSize { ids, size } => update_nodes(state, ids, |node| {
            match &mut node.kind {
                NodeKind::Text(text) => text.font_size = size.max(1.0),
                _ => return Err(EditorError::wrong_kind(node, "fontSize")),
            }
            Ok(())
        }),
        Action::SetTextAlign { ids, align } => update_nodes(state, ids, |node| {
            match &mut node.kind {
                NodeKind::Text(text) => text.align = *align,
                _ => return Err(EditorError::wrong_kind(node, "textAlign")),
            }
            Ok(())
        }),
        Action::SetCornerRadius {
            ids,
            top_left_radius,
            top_right_radius,
            bottom_right_radius,
            bottom_left_radius,
        } => update_nodes(state, ids, |node| {
            let Some(slot) = node.corner_radius_mut() else {
                return Err(EditorError::wrong_kind(node, "cornerRadius"));
            };
            let mut corners = slot.corners();
            corners.top_left = top_left_radius.unwrap_or(corners.top_left);
            corners.top_right = top_right_radius.unwrap_or(corners.top_right);
            corners.bottom_right = bottom_right_radius.unwrap_or(corners.bottom_right);
            corners.bottom_left = bottom_left_radius.unwrap_or(corners.bottom_left);
            *slot = CornerRadius::normalized(corners);
            Ok(())
        }),
        Action::SetFlexLayout { ids, flex } => update_nodes(state, ids, |node| {
            match &mut node.kind {
                NodeKind::Container(container) => container.flex = flex.clone(),
                _ => return Err(EditorError::wrong_kind(node, "flex")),
            }
            Ok(())
        }),
        Action::SetGap {
            ids,
            main_axis_gap,
            cross_axis_gap,
        } => update_nodes(state, ids, |node| {
            let flex = match &mut node.kind {
                NodeKind::Container(container) => container.flex.as_mut(),
                _ => return Err(EditorError::wrong_kind(node, "gap")),
            };
            match flex {
                Some(flex) => {
                    flex.main_axis_gap = main_axis_gap.unwrap_or(flex.main_axis_gap);
                    flex.cross_axis_gap = cross_axis_gap.unwrap_or(flex.cross_axis_gap);
                }
                None => debug!("Gap ignored on container without flex layout"),
            }
            Ok(())
        }),
        Action::SetImageSource { ids, src } => update_nodes(state, ids, |node| {
            match &mut node.kind {
                NodeKind::Image(image) => image.src = src.clone(),
                _ => return Err(EditorError::wrong_kind(node, "src")),
            }
            Ok(())
        }),
        Action::SetVectorNetwork { id, network } => update_node(state, id, |node| {
            let Some(slot) = node.network_mut() else {
                return Err(EditorError::wrong_kind(node, "vectorNetwork"));
            };
            *slot = network.clone();
            Ok(())
        }),
        other => Err(EditorError::UnsupportedAction(other.kind())),
    }
}

fn clamp_dimension(dimension: Dimension) -> Dimension {
    match dimension {
        Dimension::Fixed(v) => Dimension::Fixed(v.max(0.0)),
        Dimension::Auto => Dimension::Auto,
    }
}
