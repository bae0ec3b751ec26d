//! Integration tests for editor crate

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use canvas_editor::node::{CornerRadius, Corners};
use canvas_editor::{
    Action, Document, Editor, EditorConfig, EditorError, EditorState, GeometryProvider,
    GestureIntent, Modifiers, Node, NodeId, Point, Rect, Scene,
};

/// Geometry provider over a fixed table of screen rectangles
struct MockGeometry {
    rects: BTreeMap<NodeId, Rect>,
    viewport: Rect,
}

impl MockGeometry {
    fn new() -> Self {
        let rects = [
            ("frame", Rect::new(0.0, 0.0, 600.0, 400.0)),
            ("a", Rect::new(20.0, 20.0, 120.0, 70.0)),
            ("b", Rect::new(140.0, 20.0, 240.0, 70.0)),
            ("inner", Rect::new(20.0, 200.0, 320.0, 380.0)),
        ]
        .into_iter()
        .map(|(id, r)| (id.to_string(), r))
        .collect();
        Self {
            rects,
            viewport: Rect::new(0.0, 0.0, 1440.0, 900.0),
        }
    }
}

impl GeometryProvider for MockGeometry {
    fn node_bounding_rect(&self, id: &str) -> Option<Rect> {
        self.rects.get(id).copied()
    }

    fn viewport_rect(&self) -> Rect {
        self.viewport
    }

    fn nodes_intersecting_area(&self, area: Rect) -> Vec<NodeId> {
        self.rects
            .iter()
            .filter(|(_, r)| !r.intersect(area).is_zero_area() || r.contains(area.origin()))
            .map(|(id, _)| id.clone())
            .collect()
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Scene `s1` with container `frame` holding `a`, `b` and container `inner`
fn document() -> Document {
    let mut doc = Document::with_scene(Scene::new("s1", "Page"));
    let nodes = [
        Node::container("frame")
            .with_frame(0.0, 0.0, 600.0, 400.0)
            .with_children(vec!["a".into(), "b".into(), "inner".into()]),
        Node::rectangle("a").with_frame(20.0, 20.0, 100.0, 50.0),
        Node::rectangle("b").with_frame(140.0, 20.0, 100.0, 50.0),
        Node::container("inner").with_frame(20.0, 200.0, 300.0, 180.0),
    ];
    for node in nodes {
        doc.nodes.insert(node.id.clone(), Arc::new(node));
    }
    doc.scene_mut("s1").unwrap().children = vec!["frame".into()];
    doc
}

fn editor() -> Editor {
    init_tracing();
    let state = EditorState::new(document()).unwrap();
    Editor::with_state(EditorConfig::default(), Box::new(MockGeometry::new()), state).unwrap()
}

fn left(editor: &Editor, id: &str) -> Option<f64> {
    editor.state().node(id).and_then(|n| n.layout.left)
}

#[test]
fn test_delete_container_removes_subtree() {
    let mut editor = editor();
    editor
        .dispatch(Action::InsertNode {
            parent_id: Some("inner".into()),
            index: None,
            node: Node::rectangle("r"),
        })
        .unwrap();
    assert_eq!(editor.state().hierarchy.parent_of("r"), Some("inner"));

    editor
        .dispatch(Action::DeleteNodes {
            ids: vec!["frame".into()],
        })
        .unwrap();

    let state = editor.state();
    for id in ["frame", "a", "b", "inner", "r"] {
        assert!(state.node(id).is_none(), "{id} should be gone");
        assert!(!state.hierarchy.contains(id), "{id} should leave the hierarchy");
    }
    assert!(state.current_scene().unwrap().children.is_empty());
    assert!(state.hierarchy.is_consistent());
}

#[test]
fn test_move_into_descendant_is_rejected() {
    let mut editor = editor();
    let before = Arc::clone(editor.state());

    let changed = editor
        .dispatch(Action::MoveNodes {
            ids: vec!["frame".into()],
            parent_id: Some("inner".into()),
            index: None,
        })
        .unwrap();

    assert!(!changed);
    assert!(Arc::ptr_eq(editor.state(), &before));
    assert!(!editor.history().can_undo());
}

#[test]
fn test_gap_gesture_moves_second_sibling() {
    let mut editor = editor();
    editor
        .dispatch(Action::StartGesture {
            intent: GestureIntent::Gap {
                axis: canvas_editor::Axis::X,
                ids: Some(vec!["a".into(), "b".into()]),
            },
            point: Point::new(130.0, 45.0),
        })
        .unwrap();
    editor
        .dispatch(Action::UpdateGesture {
            point: Point::new(140.0, 45.0),
            modifiers: Modifiers::default(),
        })
        .unwrap();
    editor.dispatch(Action::EndGesture).unwrap();

    assert_eq!(left(&editor, "a"), Some(20.0));
    assert_eq!(left(&editor, "b"), Some(150.0));
    assert!(editor.state().gesture.is_idle());
}

#[test]
fn test_equal_corner_radii_store_a_scalar() {
    let mut editor = editor();
    editor
        .dispatch(Action::SetCornerRadius {
            ids: vec!["a".into()],
            top_left_radius: Some(5.0),
            top_right_radius: Some(5.0),
            bottom_right_radius: Some(5.0),
            bottom_left_radius: Some(5.0),
        })
        .unwrap();
    let radius = editor.state().node("a").unwrap().corner_radius();
    assert_eq!(radius, Some(CornerRadius::Uniform(5.0)));

    editor
        .dispatch(Action::SetCornerRadius {
            ids: vec!["a".into()],
            top_left_radius: Some(1.0),
            top_right_radius: Some(2.0),
            bottom_right_radius: Some(-3.0),
            bottom_left_radius: None,
        })
        .unwrap();
    let radius = editor.state().node("a").unwrap().corner_radius();
    assert_eq!(
        radius,
        Some(CornerRadius::Corners(Corners {
            top_left: 1.0,
            top_right: 2.0,
            bottom_right: 0.0,
            bottom_left: 5.0,
        }))
    );
}

#[test]
fn test_corner_radius_on_text_is_an_error() {
    let mut editor = editor();
    editor
        .dispatch(Action::InsertNode {
            parent_id: None,
            index: None,
            node: Node::text("label", "Hello"),
        })
        .unwrap();
    let before = Arc::clone(editor.state());
    let result = editor.dispatch(Action::SetCornerRadius {
        ids: vec!["label".into()],
        top_left_radius: Some(4.0),
        top_right_radius: None,
        bottom_right_radius: None,
        bottom_left_radius: None,
    });
    assert!(matches!(result, Err(EditorError::WrongNodeKind { .. })));
    assert!(Arc::ptr_eq(editor.state(), &before));
}

#[test]
fn test_undo_redo_inverse() {
    let mut editor = editor();
    let initial = Arc::clone(&editor.state().document);

    let actions = [
        Action::SetName {
            id: "a".into(),
            name: "Hero".into(),
        },
        Action::MoveBy {
            ids: vec!["b".into()],
            delta: canvas_editor::Vec2::new(5.0, 5.0),
        },
        Action::DeleteNodes {
            ids: vec!["inner".into()],
        },
    ];
    for action in actions {
        assert!(editor.dispatch(action).unwrap());
    }
    let last = Arc::clone(&editor.state().document);
    assert_eq!(editor.history().undo_levels(), 3);

    for _ in 0..3 {
        assert!(editor.dispatch(Action::Undo).unwrap());
    }
    assert!(Arc::ptr_eq(&editor.state().document, &initial));
    assert!(editor.state().hierarchy.contains("inner"));

    for _ in 0..3 {
        assert!(editor.dispatch(Action::Redo).unwrap());
    }
    assert!(Arc::ptr_eq(&editor.state().document, &last));
    assert!(!editor.state().hierarchy.contains("inner"));
}

#[test]
fn test_drag_is_one_undo_step() {
    let mut editor = editor();
    let start = Instant::now();

    editor
        .dispatch_at(
            Action::StartGesture {
                intent: GestureIntent::Translate {
                    ids: Some(vec!["a".into()]),
                },
                point: Point::new(50.0, 50.0),
            },
            start,
        )
        .unwrap();
    for step in 1..=10u64 {
        editor
            .dispatch_at(
                Action::UpdateGesture {
                    point: Point::new(50.0 + step as f64 * 3.0, 50.0),
                    modifiers: Modifiers::default(),
                },
                start + Duration::from_millis(step * 16),
            )
            .unwrap();
    }
    editor
        .dispatch_at(Action::EndGesture, start + Duration::from_millis(200))
        .unwrap();

    assert_eq!(left(&editor, "a"), Some(50.0));
    assert_eq!(editor.history().undo_levels(), 1);
    editor.dispatch(Action::Undo).unwrap();
    assert_eq!(left(&editor, "a"), Some(20.0));
}

#[test]
fn test_actions_from_json() -> anyhow::Result<()> {
    let mut editor = editor();

    let action: Action = serde_json::from_str(r#"{ "type": "setName", "id": "b", "name": "Card" }"#)?;
    editor.dispatch(action)?;
    assert_eq!(editor.state().node("b").map(|n| n.name.as_str()), Some("Card"));

    let unknown = serde_json::from_str::<Action>(r#"{ "type": "explode", "id": "b" }"#);
    assert!(unknown.is_err());
    let stray = serde_json::from_str::<Action>(r#"{ "type": "setName", "id": "b", "name": "Card", "color": "red" }"#);
    assert!(stray.is_err());
    Ok(())
}

#[test]
fn test_document_json_keeps_structure() -> anyhow::Result<()> {
    let json = document().to_json()?;
    let restored = Document::from_json(&json)?;
    let state = EditorState::new(restored)?;
    assert_eq!(state.hierarchy.direct_children(Some("frame")), ["a", "b", "inner"]);
    assert!(state.hierarchy.is_consistent());
    Ok(())
}

#[test]
fn test_click_targets_child_of_top_level_frame() {
    let editor = editor();
    assert_eq!(editor.ray_target(Point::new(60.0, 40.0)).as_deref(), Some("a"));
    assert_eq!(editor.ray_target(Point::new(500.0, 100.0)), None);
}
