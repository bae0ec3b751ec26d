use std::sync::Arc;
use std::time::Instant;

use canvas_editor::{
    reduce, Action, Document, Editor, EditorConfig, EditorState, GestureIntent, Modifiers, Node,
    Point, ReduceContext, Rect, Scene, StaticGeometry,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// One scene with `count` top-level rectangles laid out on a grid
fn grid(count: usize) -> (EditorState, StaticGeometry) {
    let mut doc = Document::with_scene(Scene::new("s1", "Page"));
    let mut geometry = StaticGeometry::new(Rect::new(0.0, 0.0, 1920.0, 1080.0));
    let mut children = Vec::with_capacity(count);

    for i in 0..count {
        let id = format!("r{i}");
        let (x, y) = ((i % 40) as f64 * 60.0, (i / 40) as f64 * 60.0);
        doc.nodes
            .insert(id.clone(), Arc::new(Node::rectangle(id.as_str()).with_frame(x, y, 50.0, 50.0)));
        geometry.set_rect(id.as_str(), Rect::new(x, y, x + 50.0, y + 50.0));
        children.push(id);
    }
    if let Some(scene) = doc.scene_mut("s1") {
        scene.children = children;
    }
    (EditorState::new(doc).unwrap(), geometry)
}

fn translate_update(c: &mut Criterion) {
    let (state, geometry) = grid(1_000);
    let config = EditorConfig::default();
    let ctx = ReduceContext {
        geometry: &geometry,
        config: &config,
    };
    let dragging = reduce(
        &Arc::new(state),
        &Action::StartGesture {
            intent: GestureIntent::Translate {
                ids: Some((0..50).map(|i| format!("r{i}")).collect()),
            },
            point: Point::ORIGIN,
        },
        &ctx,
    )
    .unwrap();

    c.bench_function("translate_update_50_of_1000", |b| {
        let mut x = 0.0;
        b.iter(|| {
            x += 1.0;
            let update = Action::UpdateGesture {
                point: Point::new(x, x),
                modifiers: Modifiers::default(),
            };
            reduce(black_box(&dragging), &update, &ctx).unwrap()
        })
    });
}

fn delete_and_undo(c: &mut Criterion) {
    let (state, geometry) = grid(1_000);

    c.bench_function("delete_then_undo_1000", |b| {
        b.iter(|| {
            let mut editor =
                Editor::with_state(EditorConfig::default(), Box::new(geometry.clone()), state.clone()).unwrap();
            let now = Instant::now();
            editor
                .dispatch_at(Action::DeleteNodes { ids: vec!["r500".into()] }, now)
                .unwrap();
            editor.dispatch_at(black_box(Action::Undo), now).unwrap()
        })
    });
}

criterion_group!(benches, translate_update, delete_and_undo);
criterion_main!(benches);
