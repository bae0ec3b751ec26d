//! # Node Model
//!
//! Every visual element of a document is a [`Node`]. Nodes never embed their children;
//! container-like kinds hold an ordered list of child ids that point back into the
//! document repository. Moving a node is therefore an edit of two id lists, never a
//! subtree copy.

use std::collections::BTreeMap;

use canvas_common::{Point, Vec2};
use serde::{Deserialize, Serialize};

pub type NodeId = String;

fn default_true() -> bool {
    true
}

fn default_opacity() -> f64 {
    1.0
}

/// A single node of the document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub style: Style,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PositionMode {
    #[default]
    Absolute,
    Relative,
}

/// Width or height of a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Fixed(f64),
    /// Sized by content or layout; the real size is only known to the geometry provider
    Auto,
}

impl Dimension {
    pub fn fixed(self) -> Option<f64> {
        match self {
            Dimension::Fixed(v) => Some(v),
            Dimension::Auto => None,
        }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Dimension::Auto
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    #[serde(default)]
    pub position: PositionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(default)]
    pub width: Dimension,
    #[serde(default)]
    pub height: Dimension,
    /// Degrees, clockwise
    #[serde(default)]
    pub rotation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paint {
    pub color: Color,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl Paint {
    pub fn solid(color: Color) -> Self {
        Self {
            color,
            visible: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub paint: Paint,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(default)]
    pub fills: Vec<Paint>,
    #[serde(default)]
    pub strokes: Vec<Stroke>,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fills: Vec::new(),
            strokes: Vec::new(),
            opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    pub fn is_left(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Corners {
    pub top_left: f64,
    pub top_right: f64,
    pub bottom_right: f64,
    pub bottom_left: f64,
}

impl Corners {
    pub fn uniform(value: f64) -> Self {
        Self {
            top_left: value,
            top_right: value,
            bottom_right: value,
            bottom_left: value,
        }
    }

    pub fn get(&self, corner: Corner) -> f64 {
        match corner {
            Corner::TopLeft => self.top_left,
            Corner::TopRight => self.top_right,
            Corner::BottomRight => self.bottom_right,
            Corner::BottomLeft => self.bottom_left,
        }
    }

    pub fn set(&mut self, corner: Corner, value: f64) {
        match corner {
            Corner::TopLeft => self.top_left = value,
            Corner::TopRight => self.top_right = value,
            Corner::BottomRight => self.bottom_right = value,
            Corner::BottomLeft => self.bottom_left = value,
        }
    }
}

/// Stored corner radius: a single scalar when every corner agrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CornerRadius {
    Uniform(f64),
    Corners(Corners),
}

impl CornerRadius {
    /// Clamp every corner to zero or more and collapse to a scalar when all four match.
    ///
    /// Every write of a corner radius goes through here.
    pub fn normalized(corners: Corners) -> Self {
        let mut clamped = corners;
        for corner in Corner::ALL {
            clamped.set(corner, corners.get(corner).max(0.0));
        }

        let first = clamped.top_left;
        if Corner::ALL.iter().all(|c| clamped.get(*c) == first) {
            CornerRadius::Uniform(first)
        } else {
            CornerRadius::Corners(clamped)
        }
    }

    pub fn corners(&self) -> Corners {
        match self {
            CornerRadius::Uniform(v) => Corners::uniform(*v),
            CornerRadius::Corners(c) => *c,
        }
    }
}

impl Default for CornerRadius {
    fn default() -> Self {
        CornerRadius::Uniform(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextData {
    pub content: String,
    #[serde(default)]
    pub font_family: String,
    pub font_size: f64,
    #[serde(default)]
    pub align: TextAlign,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeData {
    #[serde(default)]
    pub corner_radius: CornerRadius,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageData {
    pub src: String,
    #[serde(default)]
    pub corner_radius: CornerRadius,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlexDirection {
    Row,
    #[default]
    Column,
}

impl FlexDirection {
    pub fn main_axis(self) -> canvas_common::Axis {
        match self {
            FlexDirection::Row => canvas_common::Axis::X,
            FlexDirection::Column => canvas_common::Axis::Y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexLayout {
    #[serde(default)]
    pub direction: FlexDirection,
    #[serde(default)]
    pub main_axis_gap: f64,
    #[serde(default)]
    pub cross_axis_gap: f64,
    #[serde(default)]
    pub wrap: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerData {
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub corner_radius: CornerRadius,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flex: Option<FlexLayout>,
    #[serde(default)]
    pub clips_content: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupData {
    #[serde(default)]
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    String,
    Number,
    Boolean,
    Color,
}

/// A named, typed input exposed by a component root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    pub name: String,
    pub kind: PropertyKind,
    #[serde(default)]
    pub default: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentData {
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Handle {
    /// Tangent leaving the segment's start vertex
    Ta,
    /// Tangent arriving at the segment's end vertex
    Tb,
}

/// Cubic segment between two vertices; tangents are relative to their vertex
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub ta: Vec2,
    #[serde(default)]
    pub tb: Vec2,
}

impl Segment {
    pub fn line(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            ta: Vec2::ZERO,
            tb: Vec2::ZERO,
        }
    }

    pub fn handle(&self, handle: Handle) -> Vec2 {
        match handle {
            Handle::Ta => self.ta,
            Handle::Tb => self.tb,
        }
    }

    pub fn handle_mut(&mut self, handle: Handle) -> &mut Vec2 {
        match handle {
            Handle::Ta => &mut self.ta,
            Handle::Tb => &mut self.tb,
        }
    }
}

/// Vertices and the segments linking them, in the node's local coordinates
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorNetwork {
    #[serde(default)]
    pub vertices: Vec<Point>,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl VectorNetwork {
    /// Remove vertices, dropping every segment that touched them and reindexing the rest
    pub fn remove_vertices(&mut self, indices: &[usize]) {
        let mut remap = Vec::with_capacity(self.vertices.len());
        let mut next = 0;
        for i in 0..self.vertices.len() {
            if indices.contains(&i) {
                remap.push(None);
            } else {
                remap.push(Some(next));
                next += 1;
            }
        }

        self.segments = self
            .segments
            .iter()
            .filter_map(|s| {
                let start = remap.get(s.start).copied().flatten()?;
                let end = remap.get(s.end).copied().flatten()?;
                Some(Segment { start, end, ..*s })
            })
            .collect();

        let mut i = 0;
        self.vertices.retain(|_| {
            let keep = !indices.contains(&i);
            i += 1;
            keep
        });
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathData {
    #[serde(default)]
    pub network: VectorNetwork,
    #[serde(default)]
    pub closed: bool,
}

/// Per-field patch applied on top of a template's node definition.
///
/// Fields left as `None` fall back to the template.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fills: Option<Vec<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strokes: Option<Vec<Stroke>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<CornerRadius>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
}

impl NodePatch {
    pub fn is_empty(&self) -> bool {
        *self == NodePatch::default()
    }

    /// Return a copy of `base` with every set field of this patch applied
    pub fn apply_to(&self, base: &Node) -> Node {
        let mut node = base.clone();
        if let Some(name) = &self.name {
            node.name = name.clone();
        }
        if let Some(active) = self.active {
            node.active = active;
        }
        if let Some(left) = self.left {
            node.layout.left = Some(left);
        }
        if let Some(top) = self.top {
            node.layout.top = Some(top);
        }
        if let Some(width) = self.width {
            node.layout.width = width;
        }
        if let Some(height) = self.height {
            node.layout.height = height;
        }
        if let Some(rotation) = self.rotation {
            node.layout.rotation = rotation;
        }
        if let Some(fills) = &self.fills {
            node.style.fills = fills.clone();
        }
        if let Some(strokes) = &self.strokes {
            node.style.strokes = strokes.clone();
        }
        if let Some(opacity) = self.opacity {
            node.style.opacity = opacity;
        }
        if let (Some(radius), Some(slot)) = (self.corner_radius, node.corner_radius_mut()) {
            *slot = CornerRadius::normalized(radius.corners());
        }
        if let NodeKind::Text(text) = &mut node.kind {
            if let Some(content) = &self.text_content {
                text.content = content.clone();
            }
            if let Some(family) = &self.font_family {
                text.font_family = family.clone();
            }
        }
        node
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceData {
    pub template_id: String,
    #[serde(default)]
    pub overrides: BTreeMap<NodeId, NodePatch>,
}

/// Kind-specific payload of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    Text(TextData),
    Rectangle(ShapeData),
    Ellipse,
    Image(ImageData),
    Container(ContainerData),
    Path(PathData),
    Group(GroupData),
    Component(ComponentData),
    TemplateInstance(InstanceData),
}

impl NodeKind {
    /// Stable kind name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Text(_) => "text",
            NodeKind::Rectangle(_) => "rectangle",
            NodeKind::Ellipse => "ellipse",
            NodeKind::Image(_) => "image",
            NodeKind::Container(_) => "container",
            NodeKind::Path(_) => "path",
            NodeKind::Group(_) => "group",
            NodeKind::Component(_) => "component",
            NodeKind::TemplateInstance(_) => "templateInstance",
        }
    }
}

impl Node {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            active: true,
            locked: false,
            layout: Layout::default(),
            style: Style::default(),
            kind,
        }
    }

    pub fn rectangle(id: impl Into<NodeId>) -> Self {
        Self::new(id, "Rectangle", NodeKind::Rectangle(ShapeData::default()))
    }

    pub fn ellipse(id: impl Into<NodeId>) -> Self {
        Self::new(id, "Ellipse", NodeKind::Ellipse)
    }

    pub fn container(id: impl Into<NodeId>) -> Self {
        Self::new(id, "Container", NodeKind::Container(ContainerData::default()))
    }

    pub fn group(id: impl Into<NodeId>) -> Self {
        Self::new(id, "Group", NodeKind::Group(GroupData::default()))
    }

    pub fn text(id: impl Into<NodeId>, content: impl Into<String>) -> Self {
        Self::new(
            id,
            "Text",
            NodeKind::Text(TextData {
                content: content.into(),
                font_family: String::new(),
                font_size: 16.0,
                align: TextAlign::Left,
            }),
        )
    }

    pub fn path(id: impl Into<NodeId>, network: VectorNetwork) -> Self {
        Self::new(
            id,
            "Path",
            NodeKind::Path(PathData {
                network,
                closed: false,
            }),
        )
    }

    /// Builder: absolute frame with fixed size
    pub fn with_frame(mut self, left: f64, top: f64, width: f64, height: f64) -> Self {
        self.layout.left = Some(left);
        self.layout.top = Some(top);
        self.layout.width = Dimension::Fixed(width);
        self.layout.height = Dimension::Fixed(height);
        self
    }

    pub fn with_children(mut self, children: Vec<NodeId>) -> Self {
        if let Some(slot) = self.children_mut() {
            *slot = children;
        }
        self
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Child ids for container-like kinds
    pub fn children(&self) -> Option<&[NodeId]> {
        match &self.kind {
            NodeKind::Container(c) => Some(&c.children),
            NodeKind::Group(g) => Some(&g.children),
            NodeKind::Component(c) => Some(&c.children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.kind {
            NodeKind::Container(c) => Some(&mut c.children),
            NodeKind::Group(g) => Some(&mut g.children),
            NodeKind::Component(c) => Some(&mut c.children),
            _ => None,
        }
    }

    pub fn accepts_children(&self) -> bool {
        self.children().is_some()
    }

    pub fn has_children(&self) -> bool {
        self.children().is_some_and(|c| !c.is_empty())
    }

    pub fn corner_radius(&self) -> Option<CornerRadius> {
        match &self.kind {
            NodeKind::Rectangle(s) => Some(s.corner_radius),
            NodeKind::Image(i) => Some(i.corner_radius),
            NodeKind::Container(c) => Some(c.corner_radius),
            _ => None,
        }
    }

    pub fn corner_radius_mut(&mut self) -> Option<&mut CornerRadius> {
        match &mut self.kind {
            NodeKind::Rectangle(s) => Some(&mut s.corner_radius),
            NodeKind::Image(i) => Some(&mut i.corner_radius),
            NodeKind::Container(c) => Some(&mut c.corner_radius),
            _ => None,
        }
    }

    pub fn text_data(&self) -> Option<&TextData> {
        match &self.kind {
            NodeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn network(&self) -> Option<&VectorNetwork> {
        match &self.kind {
            NodeKind::Path(p) => Some(&p.network),
            _ => None,
        }
    }

    pub fn network_mut(&mut self) -> Option<&mut VectorNetwork> {
        match &mut self.kind {
            NodeKind::Path(p) => Some(&mut p.network),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_radius_collapses_equal_corners() {
        let radius = CornerRadius::normalized(Corners::uniform(5.0));
        assert_eq!(radius, CornerRadius::Uniform(5.0));
    }

    #[test]
    fn test_corner_radius_clamps_negative_corners() {
        let radius = CornerRadius::normalized(Corners {
            top_left: -3.0,
            top_right: 4.0,
            bottom_right: 2.0,
            bottom_left: 1.0,
        });
        match radius {
            CornerRadius::Corners(c) => {
                assert_eq!(c.top_left, 0.0);
                assert_eq!(c.top_right, 4.0);
            }
            other => panic!("expected per-corner radius, got {:?}", other),
        }
    }

    #[test]
    fn test_all_negative_corners_collapse_to_zero() {
        let radius = CornerRadius::normalized(Corners::uniform(-1.0));
        assert_eq!(radius, CornerRadius::Uniform(0.0));
    }

    #[test]
    fn test_node_serialization_round_trip() {
        let node = Node::container("c1")
            .with_frame(0.0, 0.0, 200.0, 100.0)
            .with_children(vec!["r1".to_string()]);

        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
        assert!(json.contains("\"type\":\"container\""));
    }

    #[test]
    fn test_uniform_corner_radius_serializes_as_scalar() {
        let node = Node::rectangle("r1");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"]["cornerRadius"], serde_json::json!(0.0));
    }

    #[test]
    fn test_patch_falls_back_to_base() {
        let base = Node::text("t1", "Hello").with_frame(0.0, 0.0, 50.0, 20.0);
        let patch = NodePatch {
            text_content: Some("Bye".to_string()),
            ..NodePatch::default()
        };

        let merged = patch.apply_to(&base);
        assert_eq!(merged.text_data().unwrap().content, "Bye");
        assert_eq!(merged.layout, base.layout);
        // base untouched
        assert_eq!(base.text_data().unwrap().content, "Hello");
    }

    #[test]
    fn test_remove_vertices_reindexes_segments() {
        let mut network = VectorNetwork {
            vertices: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)],
            segments: vec![Segment::line(0, 1), Segment::line(1, 2)],
        };

        network.remove_vertices(&[0]);

        assert_eq!(network.vertices.len(), 2);
        assert_eq!(network.segments, vec![Segment::line(0, 1)]);
    }
}
