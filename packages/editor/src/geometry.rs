//! Boundary to the platform: where nodes are on screen, and who paints them.
//!
//! The editor never measures anything itself. Gestures read rectangles from a
//! [`GeometryProvider`] once, at gesture start, and from then on only do arithmetic on
//! pointer movement.

use std::collections::BTreeMap;

use canvas_common::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::node::NodeId;
use crate::state::EditorState;

/// Screen-space geometry of the rendered document
pub trait GeometryProvider {
    /// Current on-screen bounding rectangle of a node, if it is rendered
    fn node_bounding_rect(&self, id: &str) -> Option<Rect>;

    fn viewport_rect(&self) -> Rect;

    /// Ids of every rendered node whose bounds intersect `area`
    fn nodes_intersecting_area(&self, area: Rect) -> Vec<NodeId>;
}

/// Paints a state; the editor calls it but never looks inside
pub trait Renderer {
    fn render(&mut self, state: &EditorState);
}

/// Geometry provider backed by a fixed table of rectangles.
///
/// Useful headless and in tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticGeometry {
    pub rects: BTreeMap<NodeId, Rect>,
    pub viewport: Rect,
}

impl StaticGeometry {
    pub fn new(viewport: Rect) -> Self {
        Self {
            rects: BTreeMap::new(),
            viewport,
        }
    }

    pub fn with_rect(mut self, id: impl Into<NodeId>, rect: Rect) -> Self {
        self.rects.insert(id.into(), rect);
        self
    }

    pub fn set_rect(&mut self, id: impl Into<NodeId>, rect: Rect) {
        self.rects.insert(id.into(), rect);
    }
}

impl GeometryProvider for StaticGeometry {
    fn node_bounding_rect(&self, id: &str) -> Option<Rect> {
        self.rects.get(id).copied()
    }

    fn viewport_rect(&self) -> Rect {
        self.viewport
    }

    fn nodes_intersecting_area(&self, area: Rect) -> Vec<NodeId> {
        self.rects
            .iter()
            .filter(|(_, r)| r.x0 <= area.x1 && area.x0 <= r.x1 && r.y0 <= area.y1 && area.y0 <= r.y1)
            .map(|(id, _)| id.clone())
            .collect()
    }
}

/// Camera: `screen = canvas * zoom + pan`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub pan: Vec2,
    pub zoom: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        pan: Vec2::ZERO,
        zoom: 1.0,
    };

    pub fn new(pan: Vec2, zoom: f64) -> Self {
        Self { pan, zoom }
    }

    pub fn screen_to_canvas(&self, p: Point) -> Point {
        ((p.to_vec2() - self.pan) / self.zoom).to_point()
    }

    pub fn canvas_to_screen(&self, p: Point) -> Point {
        (p.to_vec2() * self.zoom + self.pan).to_point()
    }

    /// Screen-space movement expressed in canvas units
    pub fn screen_delta_to_canvas(&self, delta: Vec2) -> Vec2 {
        delta / self.zoom
    }

    pub fn screen_rect_to_canvas(&self, r: Rect) -> Rect {
        Rect::from_points(
            self.screen_to_canvas(Point::new(r.x0, r.y0)),
            self.screen_to_canvas(Point::new(r.x1, r.y1)),
        )
    }

    /// Zoom by `factor` keeping the canvas point under `origin` fixed on screen
    pub fn zoomed_at(&self, factor: f64, origin: Point, min_zoom: f64, max_zoom: f64) -> Self {
        let zoom = (self.zoom * factor).clamp(min_zoom, max_zoom);
        let anchor = self.screen_to_canvas(origin);
        let pan = origin.to_vec2() - anchor.to_vec2() * zoom;
        Self { pan, zoom }
    }

    /// Linear interpolation towards `to`
    pub fn lerp(&self, to: &Transform, t: f64) -> Self {
        Self {
            pan: self.pan.lerp(to.pan, t),
            zoom: self.zoom + (to.zoom - self.zoom) * t,
        }
    }

    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }
}
