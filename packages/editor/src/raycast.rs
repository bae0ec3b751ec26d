//! # Raycast Targeting & Selection Pruning
//!
//! The geometry provider reports every node under the pointer (or inside a marquee).
//! This module turns that raw hit list into the single node a click should act on, or
//! into a valid selection.
//!
//! Candidate filtering, in order:
//! 1. stale ids (no longer in the document) and nodes of other scenes are dropped
//! 2. locked nodes, or nodes inside a locked ancestor, are dropped
//! 3. optionally, a top-level node that has children is dropped so clicks reach its
//!    content
//!
//! Survivors are ordered by depth (shallowest first, hit order breaks ties) and then
//! picked according to [`RayTarget`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::hierarchy::HierarchyContext;
use crate::node::NodeId;
use crate::state::EditorState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RayTarget {
    Deepest,
    Shallowest,
    /// Selection first, then its siblings, then shallowest
    #[default]
    Auto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RaycastConfig {
    pub target: RayTarget,
    pub exclude_root_with_children: bool,
    /// In auto mode, children of selected nodes win over the selected nodes themselves
    pub nested_first: bool,
}

impl Default for RaycastConfig {
    fn default() -> Self {
        Self {
            target: RayTarget::Auto,
            exclude_root_with_children: true,
            nested_first: false,
        }
    }
}

fn is_locked(state: &EditorState, id: &str) -> bool {
    let locked = |n: &str| state.node(n).is_some_and(|node| node.locked);
    locked(id) || state.hierarchy.ancestors(id).iter().any(|a| locked(a.as_str()))
}

/// Top-level node of the current scene that has children
fn is_root_with_children(state: &EditorState, id: &str) -> bool {
    state.hierarchy.is_top_level(id)
        && state.hierarchy.scene_of(id) == Some(state.scene_id.as_str())
        && state.node(id).is_some_and(|n| n.has_children())
}

/// Hits that may be targeted, ordered shallowest first
fn candidates(state: &EditorState, hits: &[NodeId], config: &RaycastConfig) -> Vec<(usize, NodeId)> {
    let mut seen = HashSet::new();
    let mut out: Vec<(usize, NodeId)> = hits
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .filter(|id| state.document.contains(id))
        .filter(|id| state.hierarchy.scene_of(id) == Some(state.scene_id.as_str()))
        .filter(|id| !is_locked(state, id))
        .filter(|id| !(config.exclude_root_with_children && is_root_with_children(state, id)))
        .map(|id| (state.hierarchy.depth(id), id.clone()))
        .collect();
    // stable: equal depths keep hit order
    out.sort_by_key(|(depth, _)| *depth);
    out
}

/// Pick the node a click on `hits` should act on
pub fn get_ray_target(state: &EditorState, hits: &[NodeId], config: &RaycastConfig) -> Option<NodeId> {
    let ranked = candidates(state, hits, config);

    match config.target {
        RayTarget::Shallowest => ranked.first().map(|(_, id)| id.clone()),
        RayTarget::Deepest => ranked
            .iter()
            .rev()
            .max_by_key(|(depth, _)| *depth)
            .map(|(_, id)| id.clone()),
        RayTarget::Auto => {
            let selected: HashSet<&str> = state.selection.iter().map(String::as_str).collect();
            let sibling_parents: HashSet<Option<&str>> = state
                .selection
                .iter()
                .map(|id| state.hierarchy.parent_of(id))
                .collect();

            let priority = |id: &str| -> u8 {
                let parent = state.hierarchy.parent_of(id);
                let under_selection = parent.is_some_and(|p| selected.contains(p));
                if config.nested_first && under_selection {
                    0
                } else if selected.contains(id) {
                    1
                } else if !selected.is_empty() && sibling_parents.contains(&parent) {
                    2
                } else {
                    3
                }
            };

            let mut prioritized = ranked;
            prioritized.sort_by_key(|(_, id)| priority(id.as_str()));
            prioritized.into_iter().next().map(|(_, id)| id)
        }
    }
}

/// Keep only the topmost ids: an id survives when none of its ancestors is in the
/// list. Order of the survivors follows their first appearance.
pub fn prune_nested_nodes(hierarchy: &HierarchyContext, ids: &[NodeId]) -> Vec<NodeId> {
    let mut out: Vec<NodeId> = Vec::with_capacity(ids.len());
    for id in ids {
        if out.contains(id) {
            continue;
        }
        let ancestors = hierarchy.ancestors(id);
        if out.iter().any(|kept| ancestors.contains(kept)) {
            continue;
        }
        out.retain(|kept| !hierarchy.is_ancestor(id, kept));
        out.push(id.clone());
    }
    out
}

/// Turn marquee hits into a selection.
///
/// A hit is kept when it is unlocked, not an excluded root, and its parent is either a
/// scene root (or the scene itself) or was hit too. An excluded root counts as hit for
/// its children. The result is pruned.
pub fn get_marquee_selection(state: &EditorState, hits: &[NodeId], config: &RaycastConfig) -> Vec<NodeId> {
    let hit_set: HashSet<&str> = hits.iter().map(String::as_str).collect();
    let scene_root = state.current_scene().and_then(|s| s.constrained_root());

    let kept: Vec<NodeId> = hits
        .iter()
        .filter(|id| state.document.contains(id))
        .filter(|id| state.hierarchy.scene_of(id) == Some(state.scene_id.as_str()))
        .filter(|id| !is_locked(state, id))
        .filter(|id| Some(id.as_str()) != scene_root)
        .filter(|id| !(config.exclude_root_with_children && is_root_with_children(state, id)))
        .filter(|id| match state.hierarchy.parent_of(id) {
            None => true,
            Some(parent) => {
                Some(parent) == scene_root
                    || hit_set.contains(parent)
                    || (config.exclude_root_with_children && is_root_with_children(state, parent))
            }
        })
        .cloned()
        .collect();

    prune_nested_nodes(&state.hierarchy, &kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::test_support::{sample_state, single_root_state};

    fn ids(list: &[&str]) -> Vec<NodeId> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_prune_keeps_topmost() {
        let state = sample_state();
        assert_eq!(prune_nested_nodes(&state.hierarchy, &ids(&["r1", "c1", "t1"])), vec!["c1", "t1"]);
        assert_eq!(prune_nested_nodes(&state.hierarchy, &ids(&["c1", "r1"])), vec!["c1"]);
        assert_eq!(prune_nested_nodes(&state.hierarchy, &ids(&["r1", "r1", "r2"])), vec!["r1", "r2"]);
    }

    #[test]
    fn test_targets_by_mode() {
        let state = sample_state();
        let hits = ids(&["c1", "r1"]);
        let mut config = RaycastConfig {
            exclude_root_with_children: false,
            ..RaycastConfig::default()
        };

        config.target = RayTarget::Deepest;
        assert_eq!(get_ray_target(&state, &hits, &config).as_deref(), Some("r1"));
        config.target = RayTarget::Shallowest;
        assert_eq!(get_ray_target(&state, &hits, &config).as_deref(), Some("c1"));
    }

    #[test]
    fn test_root_with_children_is_skipped() {
        let state = sample_state();
        let target = get_ray_target(&state, &ids(&["c1", "r1"]), &RaycastConfig::default());
        assert_eq!(target.as_deref(), Some("r1"));
    }

    #[test]
    fn test_stale_and_locked_hits_are_ignored() {
        let mut state = (*sample_state()).clone();
        state.doc_mut().node_mut("r1").unwrap().locked = true;
        let target = get_ray_target(&state, &ids(&["ghost", "r1", "r2"]), &RaycastConfig::default());
        assert_eq!(target.as_deref(), Some("r2"));
    }

    #[test]
    fn test_auto_prefers_selection_then_siblings() {
        let mut state = (*sample_state()).clone();
        state.selection = ids(&["r2"]);
        let config = RaycastConfig::default();
        assert_eq!(get_ray_target(&state, &ids(&["r1", "r2"]), &config).as_deref(), Some("r2"));

        state.selection = ids(&["r1"]);
        let hits = ids(&["t1", "r2"]);
        assert_eq!(get_ray_target(&state, &hits, &config).as_deref(), Some("r2"));
    }

    #[test]
    fn test_nested_first_goes_deeper() {
        let mut state = (*sample_state()).clone();
        state.selection = ids(&["c1"]);
        let config = RaycastConfig {
            exclude_root_with_children: false,
            nested_first: true,
            ..RaycastConfig::default()
        };
        assert_eq!(get_ray_target(&state, &ids(&["c1", "r1"]), &config).as_deref(), Some("r1"));
    }

    #[test]
    fn test_marquee_requires_covered_parent() {
        let state = sample_state();
        let config = RaycastConfig {
            exclude_root_with_children: false,
            ..RaycastConfig::default()
        };
        // c1 is covered, so r1 is folded into it
        assert_eq!(get_marquee_selection(&state, &ids(&["c1", "r1"]), &config), vec!["c1"]);
        // c1 was not covered, so r1 cannot be picked out of it
        assert_eq!(get_marquee_selection(&state, &ids(&["r1", "t1"]), &config), vec!["t1"]);
    }

    #[test]
    fn test_marquee_reaches_into_excluded_root() {
        let state = sample_state();
        let config = RaycastConfig::default();
        assert_eq!(get_marquee_selection(&state, &ids(&["c1", "r1"]), &config), vec!["r1"]);
        assert_eq!(get_marquee_selection(&state, &ids(&["r2", "t1"]), &config), vec!["r2", "t1"]);
    }

    #[test]
    fn test_marquee_skips_scene_root() {
        let state = single_root_state();
        let selected = get_marquee_selection(&state, &ids(&["root", "child"]), &RaycastConfig::default());
        assert_eq!(selected, vec!["child"]);
    }
}
