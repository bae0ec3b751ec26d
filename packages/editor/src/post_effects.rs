//! # Post-Effect System
//!
//! Structural edits trigger cascading cleanup so the rest of the state never points at
//! nodes that are gone.
//!
//! When a reducer step removes nodes (delete, cut, scene deletion, ungroup, template
//! extraction), every registered effect gets a look at the new state and the removed
//! ids:
//! - Selection drops removed ids
//! - Hover clears when its node vanished
//! - Content edit mode exits when its node vanished
//! - The font registry is recomputed from the surviving text nodes
//!
//! Effects are deterministic and independent of each other's order.

use std::collections::HashSet;

use tracing::debug;

use crate::node::NodeId;
use crate::state::{ContentEditMode, EditorState};

/// Cleanup run after nodes were removed from the document
pub trait PostEffect: std::fmt::Debug {
    /// Repair `state`; return whether anything changed
    fn apply(&self, state: &mut EditorState, removed: &HashSet<NodeId>) -> bool;
}

#[derive(Debug)]
pub struct CleanupSelection;

impl PostEffect for CleanupSelection {
    fn apply(&self, state: &mut EditorState, removed: &HashSet<NodeId>) -> bool {
        let before = state.selection.len();
        state.selection.retain(|id| !removed.contains(id));
        before != state.selection.len()
    }
}

#[derive(Debug)]
pub struct CleanupHover;

impl PostEffect for CleanupHover {
    fn apply(&self, state: &mut EditorState, removed: &HashSet<NodeId>) -> bool {
        match &state.hover {
            Some(id) if removed.contains(id) => {
                state.hover = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct ExitStaleEditMode;

impl PostEffect for ExitStaleEditMode {
    fn apply(&self, state: &mut EditorState, removed: &HashSet<NodeId>) -> bool {
        match state.content_edit_mode.node_id() {
            Some(id) if removed.contains(id) => {
                debug!(node_id = %id, "Leaving edit mode of removed node");
                state.content_edit_mode = ContentEditMode::None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct RecomputeFonts;

impl PostEffect for RecomputeFonts {
    fn apply(&self, state: &mut EditorState, _removed: &HashSet<NodeId>) -> bool {
        let fonts = state.document.used_fonts();
        if fonts == state.document.fonts {
            return false;
        }
        state.doc_mut().fonts = fonts;
        true
    }
}

/// Runs every registered effect in order
#[derive(Debug)]
pub struct PostEffectEngine {
    effects: Vec<Box<dyn PostEffect + Send + Sync>>,
}

impl PostEffectEngine {
    /// Engine with the default effects
    pub fn new() -> Self {
        Self {
            effects: vec![
                Box::new(CleanupSelection),
                Box::new(CleanupHover),
                Box::new(ExitStaleEditMode),
                Box::new(RecomputeFonts),
            ],
        }
    }

    pub fn run(&self, state: &mut EditorState, removed: &HashSet<NodeId>) -> bool {
        let mut changed = false;
        for effect in &self.effects {
            changed |= effect.apply(state, removed);
        }
        changed
    }
}

impl Default for PostEffectEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the default effects after `removed` left the document
pub(crate) fn after_removal(state: &mut EditorState, removed: &[NodeId]) {
    if removed.is_empty() {
        return;
    }
    let removed: HashSet<NodeId> = removed.iter().cloned().collect();
    PostEffectEngine::new().run(state, &removed);
}
