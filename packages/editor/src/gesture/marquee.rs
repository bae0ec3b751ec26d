//! Rubber-band selection

use canvas_common::Rect;

use super::{GestureOrigin, PointerInput};
use crate::raycast::{get_marquee_selection, prune_nested_nodes};
use crate::reducer::{replace, ReduceContext};
use crate::state::EditorState;

#[derive(Debug, Clone)]
pub struct MarqueeGesture {
    pub origin: GestureOrigin,
}

impl MarqueeGesture {
    /// Select what the rectangle from the press to `input` touches; shift extends the
    /// selection the gesture started with
    pub(super) fn update(&self, state: &mut EditorState, input: &PointerInput, ctx: &ReduceContext<'_>) -> bool {
        let area = Rect::from_points(self.origin.pointer, input.point);
        let hits = ctx.geometry.nodes_intersecting_area(area);
        let mut selection = get_marquee_selection(state, &hits, &ctx.config.raycast);

        if input.modifiers.shift {
            let mut combined = self.origin.selection.clone();
            combined.extend(selection);
            selection = prune_nested_nodes(&state.hierarchy, &combined);
        }

        let marquee = replace(&mut state.indicators.marquee, Some(area));
        replace(&mut state.selection, selection) || marquee
    }
}

#[cfg(test)]
mod tests {
    use canvas_common::Point;

    use super::super::test_support::*;
    use super::super::{GestureIntent, Modifiers};
    use super::*;
    use crate::action::{Action, SelectionMode};
    use crate::reducer::test_support::{apply_ok, geometry, sample_state};

    #[test]
    fn test_marquee_selects_covered_children() {
        let state = start_gesture(&sample_state(), &geometry(), GestureIntent::Marquee, Point::new(5.0, 5.0));
        let dragged = drag(&state, &geometry(), Point::new(120.0, 70.0));
        // c1 is a root with children and is skipped; r1 is its child
        assert_eq!(dragged.selection, vec!["r1"]);
        assert_eq!(dragged.indicators.marquee, Some(Rect::new(5.0, 5.0, 120.0, 70.0)));

        let done = finish(&dragged, &geometry());
        assert_eq!(done.selection, vec!["r1"]);
        assert!(done.indicators.marquee.is_none());
    }

    #[test]
    fn test_shift_extends_start_selection() {
        let state = apply_ok(
            &sample_state(),
            Action::SelectNodes {
                ids: vec!["t1".into()],
                mode: SelectionMode::Replace,
            },
        );
        let state = start_gesture(&state, &geometry(), GestureIntent::Marquee, Point::new(5.0, 75.0));
        let dragged = drag_with(
            &state,
            &geometry(),
            Point::new(120.0, 140.0),
            Modifiers {
                shift: true,
                ..Modifiers::default()
            },
        );
        assert_eq!(dragged.selection, vec!["t1", "r2"]);
    }
}
