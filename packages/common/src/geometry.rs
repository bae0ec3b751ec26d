//! Small geometry vocabulary shared by the editor crates.
//!
//! Rectangles and points are `kurbo` types; this module only adds the axis-oriented
//! accessors the gesture math needs.

pub use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn cross(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    /// Component of a vector along this axis
    pub fn of_vec(self, v: Vec2) -> f64 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }

    pub fn of_point(self, p: Point) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }

    /// Vector of length `amount` pointing along this axis
    pub fn vec(self, amount: f64) -> Vec2 {
        match self {
            Axis::X => Vec2::new(amount, 0.0),
            Axis::Y => Vec2::new(0.0, amount),
        }
    }

    pub fn start(self, rect: &Rect) -> f64 {
        match self {
            Axis::X => rect.x0,
            Axis::Y => rect.y0,
        }
    }

    pub fn end(self, rect: &Rect) -> f64 {
        match self {
            Axis::X => rect.x1,
            Axis::Y => rect.y1,
        }
    }

    pub fn extent(self, rect: &Rect) -> f64 {
        self.end(rect) - self.start(rect)
    }

    pub fn center(self, rect: &Rect) -> f64 {
        (self.start(rect) + self.end(rect)) / 2.0
    }
}

/// Smallest rectangle containing every input, `None` for an empty input
pub fn union_rects<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
    rects
        .into_iter()
        .fold(None, |acc: Option<Rect>, r| Some(acc.map_or(*r, |a| a.union(*r))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_accessors() {
        let r = Rect::new(10.0, 20.0, 110.0, 70.0);
        assert_eq!(Axis::X.start(&r), 10.0);
        assert_eq!(Axis::Y.end(&r), 70.0);
        assert_eq!(Axis::X.extent(&r), 100.0);
        assert_eq!(Axis::Y.center(&r), 45.0);
        assert_eq!(Axis::X.cross(), Axis::Y);
    }

    #[test]
    fn test_union_rects() {
        let rects = [Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(5.0, -5.0, 20.0, 8.0)];
        assert_eq!(union_rects(&rects), Some(Rect::new(0.0, -5.0, 20.0, 10.0)));
        assert_eq!(union_rects(&[]), None);
    }

    #[test]
    fn test_axis_serializes_camel_case() {
        assert_eq!(serde_json::to_string(&Axis::X).unwrap(), "\"x\"");
    }
}
