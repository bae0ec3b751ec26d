//! Drag a ruler guide of the visible scene
//!
//! Index `-1` pulls a fresh guide out of the ruler; it is created on the first update.
//! A guide released back over the ruler is removed.

use canvas_common::{Axis, Point};
use tracing::debug;

use super::{GestureOrigin, PointerInput};
use crate::document::Guide;
use crate::reducer::scene::with_guides;
use crate::reducer::ReduceContext;
use crate::state::EditorState;

#[derive(Debug, Clone)]
pub struct GuideGesture {
    pub origin: GestureOrigin,
    pub axis: Axis,
    /// Position in the scene's guide list, once the guide exists
    pub index: Option<usize>,
    /// Last pointer position, in screen space
    pub last: Point,
}

impl GuideGesture {
    pub(super) fn start(state: &EditorState, origin: GestureOrigin, axis: Axis, index: i64) -> Option<Self> {
        let guides = &state.current_scene()?.guides;
        let index = match index {
            -1 => None,
            i => {
                let i = usize::try_from(i).ok().filter(|i| *i < guides.len())?;
                if guides[i].axis != axis {
                    debug!(index = i, "Guide axis mismatch");
                    return None;
                }
                Some(i)
            }
        };
        Some(Self {
            last: origin.pointer,
            origin,
            axis,
            index,
        })
    }

    /// Also reports a change when only the pointer moved, so `last` survives
    pub(super) fn update(&mut self, state: &mut EditorState, input: &PointerInput) -> bool {
        let moved = self.last != input.point;
        self.last = input.point;
        let offset = self.axis.of_point(self.origin.to_canvas(input.point));
        let axis = self.axis;
        let index = self.index;

        let mut created = None;
        let changed = with_guides(state, |guides| match index {
            Some(i) => {
                if let Some(guide) = guides.get_mut(i) {
                    guide.offset = offset;
                }
            }
            None => {
                guides.push(Guide { axis, offset });
                created = Some(guides.len() - 1);
            }
        });
        if created.is_some() {
            self.index = created;
        }
        changed || moved
    }

    pub(super) fn end(self, state: &mut EditorState, ctx: &ReduceContext<'_>) {
        let Some(index) = self.index else {
            return;
        };
        if self.axis.of_point(self.last) >= ctx.config.ruler_size {
            return;
        }
        debug!(index, "Guide released over the ruler");
        with_guides(state, |guides| {
            if index < guides.len() {
                guides.remove(index);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use canvas_common::Vec2;

    use super::super::test_support::*;
    use super::super::GestureIntent;
    use super::*;
    use crate::geometry::Transform;
    use crate::reducer::test_support::{geometry, sample_state};

    fn guides(state: &EditorState) -> Vec<Guide> {
        state.current_scene().unwrap().guides.clone()
    }

    fn pull(state: &Arc<EditorState>) -> Arc<EditorState> {
        start_gesture(
            state,
            &geometry(),
            GestureIntent::Guide {
                axis: Axis::X,
                index: -1,
            },
            Point::new(5.0, 300.0),
        )
    }

    #[test]
    fn test_new_guide_lands_under_cursor() {
        let mut state = (*sample_state()).clone();
        state.transform = Transform::new(Vec2::new(100.0, 0.0), 2.0);
        let state = pull(&Arc::new(state));
        assert!(guides(&state).is_empty());

        let dragged = drag(&state, &geometry(), Point::new(300.0, 300.0));
        assert_eq!(guides(&dragged), vec![Guide { axis: Axis::X, offset: 100.0 }]);

        let moved = drag(&dragged, &geometry(), Point::new(340.0, 310.0));
        let kept = finish(&moved, &geometry());
        assert_eq!(guides(&kept), vec![Guide { axis: Axis::X, offset: 120.0 }]);
    }

    #[test]
    fn test_release_over_ruler_removes_guide() {
        let state = pull(&sample_state());
        let dragged = drag(&state, &geometry(), Point::new(200.0, 300.0));
        let back = drag(&dragged, &geometry(), Point::new(10.0, 300.0));
        let released = finish(&back, &geometry());
        assert!(guides(&released).is_empty());
    }

    #[test]
    fn test_existing_guide_moves_in_place() {
        let state = pull(&sample_state());
        let state = finish(&drag(&state, &geometry(), Point::new(200.0, 0.0)), &geometry());
        let state = start_gesture(
            &state,
            &geometry(),
            GestureIntent::Guide { axis: Axis::X, index: 0 },
            Point::new(200.0, 0.0),
        );
        let moved = finish(&drag(&state, &geometry(), Point::new(250.0, 0.0)), &geometry());
        assert_eq!(guides(&moved), vec![Guide { axis: Axis::X, offset: 250.0 }]);
    }

    #[test]
    fn test_invalid_index_is_refused() {
        let state = start_gesture(
            &sample_state(),
            &geometry(),
            GestureIntent::Guide { axis: Axis::Y, index: 3 },
            Point::ORIGIN,
        );
        assert!(state.gesture.is_idle());
    }
}
