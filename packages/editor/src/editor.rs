//! # Editor
//!
//! Owns the live [`EditorState`] and everything around the pure reducer that needs
//! memory or a clock: history, the hover throttle and the camera animation.
//!
//! Nothing here is global. The host constructs an `Editor`, injects a
//! [`GeometryProvider`], feeds it actions and pointer events, and hands it a
//! [`Renderer`] whenever it wants a frame painted.
//!
//! ```rust,ignore
//! let mut editor = Editor::new(EditorConfig::default(), Box::new(geometry))?;
//! editor.dispatch(Action::SelectAll)?;
//! editor.dispatch(Action::DeleteNodes { ids: editor.state().selection.clone() })?;
//! editor.dispatch(Action::Undo)?;
//! editor.render(&mut renderer);
//! ```

use std::sync::Arc;
use std::time::Instant;

use canvas_common::{Point, Rect};
use tracing::{debug, info};

use crate::action::Action;
use crate::config::EditorConfig;
use crate::document::Document;
use crate::geometry::{GeometryProvider, Renderer, Transform};
use crate::history::{HistoryEntry, HistoryManager};
use crate::node::NodeId;
use crate::raycast::get_ray_target;
use crate::reducer::{reduce, ReduceContext};
use crate::scheduling::{CameraAnimation, Throttle};
use crate::state::EditorState;
use crate::EditorError;

/// Screen pixels kept free around content framed by zoom-to-fit
const FIT_PADDING: f64 = 40.0;

pub struct Editor {
    state: Arc<EditorState>,
    config: EditorConfig,
    geometry: Box<dyn GeometryProvider>,
    history: HistoryManager,
    hover_throttle: Throttle,
    animation: Option<CameraAnimation>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("scene_id", &self.state.scene_id)
            .field("gesture", &self.state.gesture.name())
            .field("history", &self.history)
            .field("animating", &self.animation.is_some())
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Editor on a blank document
    pub fn new(config: EditorConfig, geometry: Box<dyn GeometryProvider>) -> Result<Self, EditorError> {
        Self::with_state(config, geometry, EditorState::empty())
    }

    pub fn with_state(
        config: EditorConfig,
        geometry: Box<dyn GeometryProvider>,
        state: EditorState,
    ) -> Result<Self, EditorError> {
        config.validate()?;
        Ok(Self {
            state: Arc::new(state),
            history: HistoryManager::from_config(&config),
            hover_throttle: Throttle::new(config.hover_throttle()),
            animation: None,
            config,
            geometry,
        })
    }

    pub fn state(&self) -> &Arc<EditorState> {
        &self.state
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn geometry(&self) -> &dyn GeometryProvider {
        self.geometry.as_ref()
    }

    /// Swap the geometry provider, e.g. after the host re-laid out the canvas
    pub fn set_geometry(&mut self, geometry: Box<dyn GeometryProvider>) {
        self.geometry = geometry;
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Apply `action` now; see [`Editor::dispatch_at`]
    pub fn dispatch(&mut self, action: Action) -> Result<bool, EditorError> {
        self.dispatch_at(action, Instant::now())
    }

    /// Apply `action` as if it happened at `now`. Returns whether the state changed.
    ///
    /// On `Err` the state is left exactly as it was.
    pub fn dispatch_at(&mut self, action: Action, now: Instant) -> Result<bool, EditorError> {
        match &action {
            Action::Undo => return Ok(self.undo()),
            Action::Redo => return Ok(self.redo()),
            Action::ZoomToFit { ids } => return self.zoom_to_fit(ids, now),
            Action::SetTransform { .. } | Action::Pan { .. } | Action::ZoomAt { .. } => {
                self.animation = None;
            }
            _ => {}
        }

        let ctx = ReduceContext {
            geometry: self.geometry.as_ref(),
            config: &self.config,
        };
        let next = reduce(&self.state, &action, &ctx)?;
        if Arc::ptr_eq(&next, &self.state) {
            return Ok(false);
        }

        if !Arc::ptr_eq(&next.document, &self.state.document) {
            match (&action, gesture_key(&self.state)) {
                (Action::CancelGesture, Some(key)) => {
                    self.history.discard(&key);
                }
                (Action::UpdateGesture { .. } | Action::EndGesture, Some(key)) => {
                    self.history
                        .record(HistoryEntry::new(action.kind(), Some(key), &self.state, now));
                }
                _ => {
                    self.history
                        .record(HistoryEntry::new(action.kind(), None, &self.state, now));
                }
            }
        }
        self.state = next;
        Ok(true)
    }

    fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo(&self.state) else {
            debug!("Nothing to undo");
            return false;
        };
        let mut next = EditorState::clone(&self.state);
        snapshot.restore(&mut next);
        self.state = Arc::new(next);
        true
    }

    fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo(&self.state) else {
            debug!("Nothing to redo");
            return false;
        };
        let mut next = EditorState::clone(&self.state);
        snapshot.restore(&mut next);
        self.state = Arc::new(next);
        true
    }

    /// Canvas-space bounds of `ids`, or of the visible scene's top level when empty
    fn content_bounds(&self, ids: &[NodeId]) -> Option<Rect> {
        let scene_children;
        let ids = if ids.is_empty() {
            scene_children = self
                .state
                .current_scene()
                .map(|scene| scene.children.clone())
                .unwrap_or_default();
            &scene_children
        } else {
            ids
        };
        ids.iter()
            .filter_map(|id| self.geometry.node_bounding_rect(id))
            .map(|r| self.state.transform.screen_rect_to_canvas(r))
            .reduce(|a, b| a.union(b))
    }

    /// Camera that centers `bounds` in the viewport with [`FIT_PADDING`] around it
    fn fit_transform(&self, bounds: Rect) -> Transform {
        let viewport = self.geometry.viewport_rect();
        let available_w = (viewport.width() - 2.0 * FIT_PADDING).max(1.0);
        let available_h = (viewport.height() - 2.0 * FIT_PADDING).max(1.0);

        let zoom = match (bounds.width() > 0.0, bounds.height() > 0.0) {
            (true, true) => (available_w / bounds.width()).min(available_h / bounds.height()),
            (true, false) => available_w / bounds.width(),
            (false, true) => available_h / bounds.height(),
            (false, false) => self.state.transform.zoom,
        }
        .clamp(self.config.min_zoom, self.config.max_zoom);

        let pan = viewport.center().to_vec2() - bounds.center().to_vec2() * zoom;
        Transform::new(pan, zoom)
    }

    fn zoom_to_fit(&mut self, ids: &[NodeId], now: Instant) -> Result<bool, EditorError> {
        let Some(bounds) = self.content_bounds(ids) else {
            debug!("Nothing to fit");
            return Ok(false);
        };
        let target = self.fit_transform(bounds);
        let duration = self.config.animation_duration();

        if duration.is_zero() {
            self.animation = None;
            return self.dispatch_at(Action::SetTransform { transform: target }, now);
        }
        debug!(zoom = target.zoom, "Animating camera");
        self.animation = Some(CameraAnimation::new(self.state.transform, target, now, duration));
        Ok(false)
    }

    /// Advance the camera animation to `now`; returns whether the state changed.
    /// Hosts call this on every animation frame while [`Editor::is_animating`].
    pub fn tick(&mut self, now: Instant) -> Result<bool, EditorError> {
        let Some(animation) = self.animation.take() else {
            return Ok(false);
        };
        let (transform, done) = animation.step(now);
        let changed = self.dispatch_at(Action::SetTransform { transform }, now)?;
        if !done {
            self.animation = Some(animation);
        }
        Ok(changed)
    }

    /// Hover follow-up for a pointer move; throttled and skipped while a gesture runs
    pub fn pointer_move(&mut self, point: Point, now: Instant) -> Result<bool, EditorError> {
        if !self.state.gesture.is_idle() || !self.hover_throttle.ready(now) {
            return Ok(false);
        }
        let hits = self
            .geometry
            .nodes_intersecting_area(Rect::from_points(point, point));
        let id = get_ray_target(&self.state, &hits, &self.config.raycast);
        self.dispatch_at(Action::SetHover { id }, now)
    }

    /// Node a click at `point` would act on
    pub fn ray_target(&self, point: Point) -> Option<NodeId> {
        let hits = self
            .geometry
            .nodes_intersecting_area(Rect::from_points(point, point));
        get_ray_target(&self.state, &hits, &self.config.raycast)
    }

    /// Replace the document; history is dropped and the document key bumped
    pub fn load(&mut self, document: Document) -> Result<(), EditorError> {
        let mut next = EditorState::new(document)?;
        next.document_key = self.state.document_key + 1;
        next.settings = self.state.settings;
        next.transform = self.state.transform;
        next.id_generator = self.state.id_generator.clone();

        info!(
            document_key = next.document_key,
            nodes = next.document.nodes.len(),
            "Loaded document"
        );
        self.state = Arc::new(next);
        self.history.clear();
        self.animation = None;
        self.hover_throttle.reset();
        Ok(())
    }

    pub fn render(&self, renderer: &mut dyn Renderer) {
        renderer.render(&self.state);
    }
}

/// Consecutive updates of one gesture share a key so a drag undoes in one step; the
/// end of the gesture joins them and a cancel discards them
fn gesture_key(before: &EditorState) -> Option<String> {
    if before.gesture.is_idle() {
        return None;
    }
    Some(format!(
        "gesture:{}#{}",
        before.gesture.name(),
        before.gesture_generation
    ))
}
