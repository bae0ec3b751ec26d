//! # Canvas Editor
//!
//! Document editing engine for a 2D design canvas.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host: pointer events, animation frames      │
//! └─────────────────────────────────────────────┘
//!                     ↓ Action
//! ┌─────────────────────────────────────────────┐
//! │ editor: Editor facade                       │
//! │  - History (undo/redo, merged drags)        │
//! │  - Hover throttle, camera animation         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ reducer: (state, action) → state'           │
//! │  - Properties, structure, scenes, templates │
//! │  - Gesture state machine                    │
//! │  - Raycast targeting, selection pruning     │
//! └─────────────────────────────────────────────┘
//!                     ↓ Arc<EditorState>
//! ┌─────────────────────────────────────────────┐
//! │ renderer: paints the state (host supplied)  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Document is source of truth**: the hierarchy context is derived from it in the
//!    same step that edits it
//! 2. **Immutable snapshots**: every change produces a new state sharing untouched parts
//!    through `Arc`, which makes history cheap
//! 3. **Geometry is injected**: the engine never measures, it asks a
//!    [`GeometryProvider`]
//! 4. **Two failure tiers**: caller bugs are errors, interaction races are no-ops
//!
//! ## Usage
//!
//! ### Driving the reducer directly
//!
//! ```rust,ignore
//! use canvas_editor::{reduce, Action, EditorConfig, EditorState, ReduceContext};
//!
//! let ctx = ReduceContext { geometry: &geometry, config: &EditorConfig::default() };
//! let next = reduce(&state, &Action::DeleteNodes { ids: vec!["r1".into()] }, &ctx)?;
//! ```
//!
//! ### Through the editor
//!
//! ```rust,ignore
//! use canvas_editor::{Action, Editor, EditorConfig};
//!
//! let mut editor = Editor::new(EditorConfig::load("canvas.config.json")?, Box::new(geometry))?;
//! editor.dispatch(Action::StartGesture { intent, point })?;
//! editor.dispatch(Action::UpdateGesture { point, modifiers })?;
//! editor.dispatch(Action::EndGesture)?;
//! editor.dispatch(Action::Undo)?;
//! ```

pub mod action;
pub mod config;
pub mod document;
pub mod editor;
mod errors;
pub mod geometry;
pub mod gesture;
pub mod hierarchy;
pub mod history;
pub mod node;
pub mod post_effects;
pub mod raycast;
pub mod reducer;
pub mod scheduling;
pub mod state;
pub mod template;

pub use action::{Action, ReorderTarget, SelectionMode};
pub use config::EditorConfig;
pub use document::{Document, Guide, Scene, SceneConstraint, SceneId};
pub use editor::Editor;
pub use errors::EditorError;
pub use geometry::{GeometryProvider, Renderer, StaticGeometry, Transform};
pub use gesture::{Gesture, GestureIntent, Modifiers, ResizeDirection};
pub use hierarchy::HierarchyContext;
pub use history::{HistoryEntry, HistoryManager, Snapshot};
pub use node::{Node, NodeId, NodeKind};
pub use post_effects::{PostEffect, PostEffectEngine};
pub use raycast::{get_marquee_selection, get_ray_target, prune_nested_nodes, RayTarget, RaycastConfig};
pub use reducer::{reduce, ReduceContext};
pub use scheduling::{CameraAnimation, Throttle};
pub use state::{ContentEditMode, EditorState, ShapeKind, Tool};

// Re-export common types for convenience
pub use canvas_common::{Axis, IdGenerator, Point, Rect, Vec2};
