//! Drag a node to another place among its siblings
//!
//! At start the parent and every sibling are measured once into a [`LayoutSnapshot`].
//! Updates only compare the pointer against that snapshot and publish a
//! [`Dropzone`]; the document is edited once, on end.

use canvas_common::{union_rects, Axis, Point, Rect};
use tracing::debug;

use super::{GestureOrigin, PointerInput};
use crate::node::{NodeId, NodeKind};
use crate::reducer::{structure, ReduceContext};
use crate::state::{Dropzone, EditorState};
use crate::EditorError;

/// Thickness of the insertion line, in screen pixels
const INDICATOR_SIZE: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutItem {
    pub id: NodeId,
    /// Screen rect relative to the parent's origin
    pub rect: Rect,
    pub accepts_children: bool,
}

/// Siblings of the dragged node as laid out at gesture start
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSnapshot {
    pub parent_id: NodeId,
    pub parent_rect: Rect,
    pub axis: Axis,
    pub items: Vec<LayoutItem>,
}

impl LayoutSnapshot {
    pub fn capture(state: &EditorState, ctx: &ReduceContext<'_>, parent_id: &str) -> Option<Self> {
        let parent = state.node(parent_id)?;
        let parent_rect = ctx.geometry.node_bounding_rect(parent_id)?;
        let offset = parent_rect.origin().to_vec2();

        let items: Vec<LayoutItem> = parent
            .children()?
            .iter()
            .filter_map(|id| {
                let rect = ctx.geometry.node_bounding_rect(id)?;
                let node = state.node(id)?;
                Some(LayoutItem {
                    id: id.clone(),
                    rect: rect - offset,
                    accepts_children: node.accepts_children(),
                })
            })
            .collect();

        let flex_axis = match &parent.kind {
            NodeKind::Container(c) => c.flex.as_ref().map(|f| f.direction.main_axis()),
            _ => None,
        };
        let axis = flex_axis.unwrap_or_else(|| infer_axis(&items));

        Some(Self {
            parent_id: parent_id.to_string(),
            parent_rect,
            axis,
            items,
        })
    }

    /// Where the pointer (relative to the parent) would drop `dragged`
    pub fn dropzone(&self, dragged: &str, pointer: Point) -> Dropzone {
        let others: Vec<&LayoutItem> = self.items.iter().filter(|i| i.id != dragged).collect();
        let along = self.axis.of_point(pointer);

        for item in &others {
            if !item.accepts_children || !item.rect.contains(pointer) {
                continue;
            }
            let start = self.axis.start(&item.rect);
            let extent = self.axis.extent(&item.rect);
            if along >= start + extent * 0.25 && along <= start + extent * 0.75 {
                return Dropzone::Target {
                    node_id: item.id.clone(),
                };
            }
        }

        let index = others
            .iter()
            .filter(|i| self.axis.center(&i.rect) < along)
            .count();
        Dropzone::Index {
            parent_id: self.parent_id.clone(),
            index,
            rect: self.indicator(&others, index),
        }
    }

    /// Line between the siblings around `index`, in screen space
    fn indicator(&self, others: &[&LayoutItem], index: usize) -> Rect {
        let axis = self.axis;
        let position = match (index.checked_sub(1).and_then(|i| others.get(i)), others.get(index)) {
            (Some(before), Some(after)) => (axis.end(&before.rect) + axis.start(&after.rect)) / 2.0,
            (Some(before), None) => axis.end(&before.rect),
            (None, Some(after)) => axis.start(&after.rect),
            (None, None) => 0.0,
        };
        let position = position + axis.start(&self.parent_rect);
        let half = INDICATOR_SIZE / 2.0;
        match axis {
            Axis::X => Rect::new(position - half, self.parent_rect.y0, position + half, self.parent_rect.y1),
            Axis::Y => Rect::new(self.parent_rect.x0, position - half, self.parent_rect.x1, position + half),
        }
    }
}

/// Lay-out axis guessed from where the siblings are: the one they spread along most
fn infer_axis(items: &[LayoutItem]) -> Axis {
    let centers: Vec<Rect> = items
        .iter()
        .map(|i| Rect::from_center_size(i.rect.center(), (0.0, 0.0)))
        .collect();
    match union_rects(&centers) {
        Some(spread) if spread.width() > spread.height() => Axis::X,
        _ => Axis::Y,
    }
}

#[derive(Debug, Clone)]
pub struct SortGesture {
    pub origin: GestureOrigin,
    pub id: NodeId,
    pub snapshot: LayoutSnapshot,
    pub dropzone: Option<Dropzone>,
}

impl SortGesture {
    pub(super) fn start(
        state: &EditorState,
        origin: GestureOrigin,
        id: &str,
        ctx: &ReduceContext<'_>,
    ) -> Option<Self> {
        if state.node(id).is_some_and(|n| n.locked) || state.is_constrained_root(id) {
            return None;
        }
        let parent_id = state.hierarchy.parent_of(id)?;
        let snapshot = LayoutSnapshot::capture(state, ctx, parent_id)?;
        Some(Self {
            origin,
            id: id.to_string(),
            snapshot,
            dropzone: None,
        })
    }

    pub(super) fn update(&mut self, state: &mut EditorState, input: &PointerInput) -> bool {
        if state.node(&self.id).is_none() {
            return false;
        }
        let relative = input.point - self.snapshot.parent_rect.origin().to_vec2();
        let dropzone = self.snapshot.dropzone(&self.id, relative);
        if self.dropzone.as_ref() == Some(&dropzone) {
            return false;
        }
        self.dropzone = Some(dropzone.clone());
        state.indicators.dropzone = Some(dropzone);
        true
    }

    pub(super) fn end(self, state: &mut EditorState) -> Result<bool, EditorError> {
        if !state.document.contains(&self.id) {
            debug!(node_id = %self.id, "Sorted node is gone");
            return Ok(false);
        }
        match self.dropzone {
            Some(Dropzone::Index { parent_id, index, .. }) if state.document.contains(&parent_id) => {
                structure::move_nodes(state, &[self.id], Some(&parent_id), Some(index))
            }
            Some(Dropzone::Target { node_id }) if state.document.contains(&node_id) => {
                structure::move_nodes(state, &[self.id], Some(&node_id), None)
            }
            _ => Ok(false),
        }
    }
}
