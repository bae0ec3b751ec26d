//! Drag the spacing between nodes
//!
//! Two modes:
//! - **Flex**: the selected container lays out its children itself, so only its stored
//!   gap changes.
//! - **Distribute**: free-floating siblings are sorted along the axis and re-spaced with
//!   one gap value. The first member stays put. When the spacing was uneven at start,
//!   the mean gap is the baseline.
//!
//! The gap never drops below `1 - smallest extent`, so members can overlap but never
//! swap places.

use canvas_common::Axis;
use tracing::debug;

use super::{gesture_targets, measured_frame, GestureOrigin, PointerInput};
use crate::node::{NodeId, NodeKind};
use crate::reducer::{update_node, ReduceContext};
use crate::state::EditorState;
use crate::EditorError;

#[derive(Debug, Clone, PartialEq)]
pub struct GapMember {
    pub id: NodeId,
    /// Offset along the axis in the parent's coordinates
    pub start: f64,
    pub extent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GapMode {
    Flex { container_id: NodeId, main_axis: bool },
    /// Members sorted along the axis
    Distribute { members: Vec<GapMember> },
}

#[derive(Debug, Clone)]
pub struct GapGesture {
    pub origin: GestureOrigin,
    pub axis: Axis,
    pub initial_gap: f64,
    pub min_gap: f64,
    /// Whether every gap agreed (within tolerance) at start
    pub uniform: bool,
    pub mode: GapMode,
}

/// Gaps between consecutive sorted members
fn gaps(members: &[GapMember]) -> Vec<f64> {
    members
        .windows(2)
        .map(|pair| pair[1].start - (pair[0].start + pair[0].extent))
        .collect()
}

fn min_gap(extents: impl Iterator<Item = f64>) -> f64 {
    extents
        .fold(None, |acc: Option<f64>, e| Some(acc.map_or(e, |a| a.min(e))))
        .map_or(0.0, |smallest| 1.0 - smallest)
}

impl GapGesture {
    pub(super) fn start(
        state: &EditorState,
        origin: GestureOrigin,
        axis: Axis,
        ids: Option<&[NodeId]>,
        ctx: &ReduceContext<'_>,
    ) -> Option<Self> {
        let targets = gesture_targets(state, ids);
        if let [single] = targets.as_slice() {
            return Self::start_flex(state, origin, axis, single, ctx);
        }
        Self::start_distribute(state, origin, axis, &targets, ctx)
    }

    fn start_flex(
        state: &EditorState,
        origin: GestureOrigin,
        axis: Axis,
        id: &str,
        ctx: &ReduceContext<'_>,
    ) -> Option<Self> {
        let node = state.node(id)?;
        let NodeKind::Container(container) = &node.kind else {
            return None;
        };
        let flex = container.flex.as_ref()?;
        let main_axis = flex.direction.main_axis() == axis;
        let initial_gap = if main_axis {
            flex.main_axis_gap
        } else {
            flex.cross_axis_gap
        };
        let extents = container
            .children
            .iter()
            .filter_map(|child| ctx.geometry.node_bounding_rect(child))
            .map(|r| axis.extent(&state.transform.screen_rect_to_canvas(r)));

        Some(Self {
            axis,
            initial_gap,
            min_gap: min_gap(extents),
            uniform: true,
            mode: GapMode::Flex {
                container_id: id.to_string(),
                main_axis,
            },
            origin,
        })
    }

    fn start_distribute(
        state: &EditorState,
        origin: GestureOrigin,
        axis: Axis,
        ids: &[NodeId],
        ctx: &ReduceContext<'_>,
    ) -> Option<Self> {
        if ids.len() < 2 {
            return None;
        }
        let parent = state.hierarchy.parent_of(&ids[0]);
        if ids.iter().any(|id| state.hierarchy.parent_of(id) != parent) {
            debug!("Gap members do not share a parent");
            return None;
        }

        let mut members: Vec<GapMember> = ids
            .iter()
            .map(|id| {
                let frame = measured_frame(state, ctx.geometry, id)?;
                let (start, extent) = match axis {
                    Axis::X => (frame.left, frame.width),
                    Axis::Y => (frame.top, frame.height),
                };
                Some(GapMember {
                    id: id.clone(),
                    start,
                    extent,
                })
            })
            .collect::<Option<_>>()?;
        members.sort_by(|a, b| a.start.total_cmp(&b.start));

        let gaps = gaps(&members);
        let (lowest, highest) = gaps
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), g| (lo.min(*g), hi.max(*g)));
        let uniform = highest - lowest <= ctx.config.gap_tolerance;
        let initial_gap = if uniform {
            gaps[0]
        } else {
            gaps.iter().sum::<f64>() / gaps.len() as f64
        };
        debug!(uniform, initial_gap, "Distributing gap");

        Some(Self {
            axis,
            initial_gap,
            min_gap: min_gap(members.iter().map(|m| m.extent)),
            uniform,
            mode: GapMode::Distribute { members },
            origin,
        })
    }

    /// Gap for the pointer at `input`
    pub fn gap_at(&self, input: &PointerInput) -> f64 {
        let moved = self.axis.of_vec(self.origin.canvas_delta(input.point));
        (self.initial_gap + moved).max(self.min_gap)
    }

    pub(super) fn update(&self, state: &mut EditorState, input: &PointerInput) -> Result<bool, EditorError> {
        let gap = self.gap_at(input);

        match &self.mode {
            GapMode::Flex {
                container_id,
                main_axis,
            } => {
                if state.node(container_id).is_none() {
                    return Ok(false);
                }
                update_node(state, container_id, |node| {
                    if let NodeKind::Container(c) = &mut node.kind {
                        if let Some(flex) = c.flex.as_mut() {
                            if *main_axis {
                                flex.main_axis_gap = gap;
                            } else {
                                flex.cross_axis_gap = gap;
                            }
                        }
                    }
                    Ok(())
                })
            }
            GapMode::Distribute { members } => {
                let Some(first) = members.first() else {
                    return Ok(false);
                };
                let mut position = first.start;
                let mut changed = false;
                for member in members {
                    let at = position;
                    position += member.extent + gap;
                    if state.node(&member.id).is_none() {
                        continue;
                    }
                    changed |= update_node(state, &member.id, |node| {
                        match self.axis {
                            Axis::X => {
                                node.layout.left = Some(at);
                                node.layout.right = None;
                            }
                            Axis::Y => {
                                node.layout.top = Some(at);
                                node.layout.bottom = None;
                            }
                        }
                        Ok(())
                    })?;
                }
                Ok(changed)
            }
        }
    }
}
