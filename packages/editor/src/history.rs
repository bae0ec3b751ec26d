//! # History Manager
//!
//! Snapshot based undo/redo.
//!
//! ## Design
//!
//! - Before an action changes the document, the state it started from is snapshotted
//!   and pushed onto `past`
//! - A snapshot is only a handful of `Arc` clones; unchanged nodes are shared with the
//!   live document and with every other snapshot
//! - Undo swaps the current state onto `future` and restores the newest past entry;
//!   redo is the mirror
//! - Any new change clears `future`
//! - Entries sharing a merge key within the merge window collapse into one step, so a
//!   drag that fires an update every frame undoes in one go
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = HistoryManager::new(100, Duration::from_millis(300));
//!
//! history.record(HistoryEntry::new("setName", None, &before, Instant::now()));
//! if let Some(snapshot) = history.undo(&current) {
//!     snapshot.restore(&mut next);
//! }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, instrument};

use crate::config::EditorConfig;
use crate::document::{Document, SceneId};
use crate::gesture::Gesture;
use crate::hierarchy::HierarchyContext;
use crate::node::NodeId;
use crate::state::{ContentEditMode, EditorState, Indicators};

/// The undo-relevant slice of an [`EditorState`]
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub selection: Vec<NodeId>,
    pub scene_id: SceneId,
    pub document: Arc<Document>,
    pub hierarchy: Arc<HierarchyContext>,
    pub content_edit_mode: ContentEditMode,
    pub document_key: u64,
}

impl Snapshot {
    pub fn capture(state: &EditorState) -> Self {
        Self {
            selection: state.selection.clone(),
            scene_id: state.scene_id.clone(),
            document: Arc::clone(&state.document),
            hierarchy: Arc::clone(&state.hierarchy),
            content_edit_mode: state.content_edit_mode.clone(),
            document_key: state.document_key,
        }
    }

    /// Put the snapshot back into `state`; any gesture in flight is dropped
    pub fn restore(&self, state: &mut EditorState) {
        state.selection = self.selection.clone();
        state.scene_id = self.scene_id.clone();
        state.document = Arc::clone(&self.document);
        state.hierarchy = Arc::clone(&self.hierarchy);
        state.content_edit_mode = self.content_edit_mode.clone();
        state.document_key = self.document_key;
        state.gesture = Gesture::Idle;
        state.indicators = Indicators::default();
        if state.hover.as_deref().is_some_and(|id| !state.document.contains(id)) {
            state.hover = None;
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Action that produced the change
    pub kind: &'static str,
    /// Entries with equal keys may merge; `None` never merges
    pub merge_key: Option<String>,
    pub timestamp: Instant,
    /// State before the change
    pub snapshot: Snapshot,
}

impl HistoryEntry {
    pub fn new(kind: &'static str, merge_key: Option<String>, before: &EditorState, timestamp: Instant) -> Self {
        Self {
            kind,
            merge_key,
            timestamp,
            snapshot: Snapshot::capture(before),
        }
    }
}

/// Undo/redo stacks of state snapshots
#[derive(Debug)]
pub struct HistoryManager {
    /// Most recent last
    past: Vec<HistoryEntry>,

    /// Most recent last
    future: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    merge_timeout: Duration,
}

impl HistoryManager {
    pub fn new(max_levels: usize, merge_timeout: Duration) -> Self {
        Self {
            past: Vec::new(),
            future: Vec::new(),
            max_levels,
            merge_timeout,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.history_limit, config.merge_timeout())
    }

    /// Newest past entry if `merge_key` continues it within the merge window
    pub fn mergeable_entry(&self, merge_key: Option<&str>, now: Instant) -> Option<&HistoryEntry> {
        let key = merge_key?;
        self.past.last().filter(|last| {
            last.merge_key.as_deref() == Some(key)
                && now.saturating_duration_since(last.timestamp) <= self.merge_timeout
        })
    }

    /// Record a change. A continuation of the newest entry only refreshes its
    /// timestamp, keeping the snapshot from before the whole burst.
    #[instrument(skip_all, fields(kind = entry.kind))]
    pub fn record(&mut self, entry: HistoryEntry) {
        self.future.clear();

        if self.mergeable_entry(entry.merge_key.as_deref(), entry.timestamp).is_some() {
            if let Some(last) = self.past.last_mut() {
                last.timestamp = entry.timestamp;
                debug!("Merged into previous history entry");
                return;
            }
        }

        self.past.push(entry);
        if self.max_levels > 0 && self.past.len() > self.max_levels {
            self.past.remove(0);
        }
    }

    /// Drop the trailing past entries recorded under `merge_key`; used when a gesture is
    /// cancelled and its edits vanish with it. Returns how many were dropped.
    pub fn discard(&mut self, merge_key: &str) -> usize {
        let keep = self
            .past
            .iter()
            .rposition(|e| e.merge_key.as_deref() != Some(merge_key))
            .map_or(0, |i| i + 1);
        let dropped = self.past.len() - keep;
        self.past.truncate(keep);
        if dropped > 0 {
            debug!(merge_key, dropped, "Discarded history entries");
        }
        dropped
    }

    /// Pop the newest past entry, parking `current` on the redo stack.
    /// Returns the snapshot to restore.
    #[instrument(skip_all, fields(levels = self.past.len()))]
    pub fn undo(&mut self, current: &EditorState) -> Option<Snapshot> {
        let entry = self.past.pop()?;
        self.future.push(HistoryEntry {
            kind: entry.kind,
            merge_key: None,
            timestamp: entry.timestamp,
            snapshot: Snapshot::capture(current),
        });
        debug!(kind = entry.kind, "Undo");
        Some(entry.snapshot)
    }

    #[instrument(skip_all, fields(levels = self.future.len()))]
    pub fn redo(&mut self, current: &EditorState) -> Option<Snapshot> {
        let entry = self.future.pop()?;
        self.past.push(HistoryEntry {
            kind: entry.kind,
            merge_key: None,
            timestamp: entry.timestamp,
            snapshot: Snapshot::capture(current),
        });
        debug!(kind = entry.kind, "Redo");
        Some(entry.snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.past.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.future.len()
    }

    /// Kind of the action the next undo reverts
    pub fn undo_kind(&self) -> Option<&'static str> {
        self.past.last().map(|e| e.kind)
    }

    pub fn redo_kind(&self) -> Option<&'static str> {
        self.future.last().map(|e| e.kind)
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn renamed(state: &EditorState, name: &str) -> EditorState {
        let mut next = state.clone();
        next.doc_mut().nodes.insert("n".into(), Arc::new(Node::rectangle("n")));
        if let Some(node) = next.doc_mut().node_mut("n") {
            node.name = name.to_string();
        }
        next
    }

    #[test]
    fn test_history_creation() {
        let history = HistoryManager::default();
        assert_eq!(history.undo_levels(), 0);
        assert_eq!(history.redo_levels(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_swap_snapshots() {
        let mut history = HistoryManager::default();
        let before = EditorState::empty();
        let after = renamed(&before, "A");
        let now = Instant::now();

        history.record(HistoryEntry::new("setName", None, &before, now));
        assert_eq!(history.undo_kind(), Some("setName"));

        let restored = history.undo(&after).unwrap();
        assert!(Arc::ptr_eq(&restored.document, &before.document));
        assert_eq!(history.redo_levels(), 1);

        let mut state = after.clone();
        restored.restore(&mut state);
        let replayed = history.redo(&state).unwrap();
        assert!(Arc::ptr_eq(&replayed.document, &after.document));
        assert_eq!(history.undo_levels(), 1);
        assert_eq!(history.redo_levels(), 0);
    }

    #[test]
    fn test_merge_within_window() {
        let mut history = HistoryManager::new(100, Duration::from_millis(300));
        let state = EditorState::empty();
        let start = Instant::now();
        let key = || Some("gesture:translate#1".to_string());

        history.record(HistoryEntry::new("updateGesture", key(), &state, start));
        history.record(HistoryEntry::new("updateGesture", key(), &state, start + Duration::from_millis(200)));
        // the window slides with every merged update
        history.record(HistoryEntry::new("updateGesture", key(), &state, start + Duration::from_millis(450)));
        assert_eq!(history.undo_levels(), 1);

        history.record(HistoryEntry::new("updateGesture", key(), &state, start + Duration::from_millis(800)));
        assert_eq!(history.undo_levels(), 2);
    }

    #[test]
    fn test_different_keys_never_merge() {
        let mut history = HistoryManager::default();
        let state = EditorState::empty();
        let now = Instant::now();

        history.record(HistoryEntry::new("updateGesture", Some("gesture:translate#1".into()), &state, now));
        history.record(HistoryEntry::new("updateGesture", Some("gesture:translate#2".into()), &state, now));
        history.record(HistoryEntry::new("setName", None, &state, now));
        history.record(HistoryEntry::new("setName", None, &state, now));
        assert_eq!(history.undo_levels(), 4);
    }

    #[test]
    fn test_new_change_clears_future() {
        let mut history = HistoryManager::default();
        let state = EditorState::empty();
        let now = Instant::now();

        history.record(HistoryEntry::new("setName", None, &state, now));
        history.undo(&state);
        assert_eq!(history.redo_levels(), 1);

        history.record(HistoryEntry::new("setName", None, &state, now));
        assert_eq!(history.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut history = HistoryManager::new(2, Duration::ZERO);
        let state = EditorState::empty();
        for _ in 0..3 {
            history.record(HistoryEntry::new("setName", None, &state, Instant::now()));
        }
        assert_eq!(history.undo_levels(), 2);
    }

    #[test]
    fn test_discard_drops_only_trailing_burst() {
        let mut history = HistoryManager::new(100, Duration::ZERO);
        let state = EditorState::empty();
        let now = Instant::now();
        let key = "gesture:scale#3";

        history.record(HistoryEntry::new("setName", None, &state, now));
        history.record(HistoryEntry::new("updateGesture", Some(key.into()), &state, now));
        // zero window: the burst split into two entries
        history.record(HistoryEntry::new("updateGesture", Some(key.into()), &state, now + Duration::from_millis(1)));
        assert_eq!(history.undo_levels(), 3);

        assert_eq!(history.discard(key), 2);
        assert_eq!(history.undo_kind(), Some("setName"));
        assert_eq!(history.discard(key), 0);
    }

    #[test]
    fn test_restore_drops_stale_hover() {
        let before = EditorState::empty();
        let mut after = renamed(&before, "A");
        after.hover = Some("n".into());
        Snapshot::capture(&before).restore(&mut after);
        assert_eq!(after.hover, None);
        assert!(after.gesture.is_idle());
    }
}
