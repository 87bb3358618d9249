//! Keyed diff between the previous render's tiles and a fresh layout.
//!
//! Every tile is matched by [`LayoutLeaf::key`] and assigned one of three treatments:
//!
//! - **enter**: new key. Grows from a zero-area rectangle at its target centroid.
//! - **update**: key present before and now. Starts from exactly the rectangle it was
//!   rendered at last time, so it never jumps. An update whose rectangle did not change
//!   is reported as [`TilePhase::Steady`].
//! - **exit**: key gone. Shrinks to zero area at its last top-left corner and is then
//!   dropped.
//!
//! The previous state is a whole-pass snapshot. [`reconcile`] never mutates it; the
//! caller swaps in [`Reconciliation::next_state`] once the pass is complete. Exiting
//! tiles are not carried into the next snapshot, so a key that comes back while its
//! exit is still animating enters again from scratch.

use std::collections::HashMap;

use compact_str::CompactString;
use serde::Serialize;

use crate::layout::{LayoutLeaf, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TilePhase {
    Entering,
    Updating,
    /// Retained with identical geometry; nothing to animate.
    Steady,
    Exiting,
}

/// What the last completed pass drew for one key.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSnapshot {
    pub rect: Rect,
    pub name: CompactString,
    pub category: CompactString,
}

/// Key → last rendered rectangle, replaced wholesale after every pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutState {
    tiles: HashMap<CompactString, TileSnapshot>,
}

impl LayoutState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a finished layout.
    pub fn from_leaves(leaves: &[LayoutLeaf]) -> Self {
        let tiles = leaves
            .iter()
            .map(|leaf| {
                (
                    leaf.key.clone(),
                    TileSnapshot {
                        rect: leaf.rect,
                        name: leaf.name.clone(),
                        category: leaf.category.clone(),
                    },
                )
            })
            .collect();
        Self { tiles }
    }

    pub fn get(&self, key: &str) -> Option<&TileSnapshot> {
        self.tiles.get(key)
    }

    pub fn rect(&self, key: &str) -> Option<Rect> {
        self.tiles.get(key).map(|t| t.rect)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.tiles.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.tiles.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        keys
    }
}

/// One tile's planned motion.
#[derive(Debug, Clone, PartialEq)]
pub struct TileTransition {
    pub key: CompactString,
    pub name: CompactString,
    pub category: CompactString,
    pub phase: TilePhase,
    pub from: Rect,
    pub to: Rect,
    /// Share of total; zero for exiting tiles.
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Enter/update/steady tiles in layout order, followed by exits in key order.
    pub transitions: Vec<TileTransition>,
    /// Snapshot to commit once the pass completes.
    pub next_state: LayoutState,
}

impl Reconciliation {
    pub fn count(&self, phase: TilePhase) -> usize {
        self.transitions.iter().filter(|t| t.phase == phase).count()
    }
}

/// Diff `next` against the `previous` snapshot.
pub fn reconcile(previous: &LayoutState, next: &[LayoutLeaf]) -> Reconciliation {
    let mut transitions = Vec::with_capacity(next.len() + previous.len());

    for leaf in next {
        let (phase, from) = match previous.rect(&leaf.key) {
            Some(prev) if prev == leaf.rect => (TilePhase::Steady, prev),
            Some(prev) => (TilePhase::Updating, prev),
            None => (TilePhase::Entering, leaf.rect.collapsed_to_center()),
        };
        transitions.push(TileTransition {
            key: leaf.key.clone(),
            name: leaf.name.clone(),
            category: leaf.category.clone(),
            phase,
            from,
            to: leaf.rect,
            pct: leaf.pct,
        });
    }

    let next_state = LayoutState::from_leaves(next);

    for key in previous.keys() {
        if next_state.contains(key) {
            continue;
        }
        if let Some(snapshot) = previous.get(key) {
            transitions.push(TileTransition {
                key: CompactString::new(key),
                name: snapshot.name.clone(),
                category: snapshot.category.clone(),
                phase: TilePhase::Exiting,
                from: snapshot.rect,
                to: snapshot.rect.collapsed_to_origin(),
                pct: 0.0,
            });
        }
    }

    Reconciliation {
        transitions,
        next_state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(key: &str, rect: Rect) -> LayoutLeaf {
        LayoutLeaf {
            key: key.into(),
            name: key.into(),
            category: key.into(),
            value: 1.0,
            pct: 0.5,
            rect,
        }
    }

    #[test]
    fn first_pass_enters_from_center() {
        let r = Rect::new(0.0, 0.0, 100.0, 50.0);
        let rec = reconcile(&LayoutState::new(), &[leaf("a", r)]);
        let t = &rec.transitions[0];
        assert_eq!(t.phase, TilePhase::Entering);
        assert_eq!(t.from, Rect::new(50.0, 25.0, 50.0, 25.0));
        assert_eq!(t.to, r);
        assert_eq!(rec.next_state.rect("a"), Some(r));
    }

    #[test]
    fn retained_key_starts_from_previous_rect() {
        let old = Rect::new(0.0, 0.0, 100.0, 100.0);
        let new = Rect::new(0.0, 0.0, 60.0, 100.0);
        let prev = LayoutState::from_leaves(&[leaf("a", old)]);
        let rec = reconcile(&prev, &[leaf("a", new)]);
        assert_eq!(rec.transitions[0].phase, TilePhase::Updating);
        assert_eq!(rec.transitions[0].from, old);
        assert_eq!(rec.transitions[0].to, new);
    }

    #[test]
    fn unchanged_rect_is_steady() {
        let r = Rect::new(0.0, 0.0, 100.0, 100.0);
        let prev = LayoutState::from_leaves(&[leaf("a", r)]);
        let rec = reconcile(&prev, &[leaf("a", r)]);
        assert_eq!(rec.transitions[0].phase, TilePhase::Steady);
        assert_eq!(rec.next_state, prev);
    }

    #[test]
    fn removed_key_exits_and_is_dropped_from_state() {
        let prev = LayoutState::from_leaves(&[
            leaf("a", Rect::new(0.0, 0.0, 50.0, 100.0)),
            leaf("b", Rect::new(50.0, 0.0, 100.0, 100.0)),
        ]);
        let rec = reconcile(&prev, &[leaf("a", Rect::new(0.0, 0.0, 100.0, 100.0))]);
        assert_eq!(rec.count(TilePhase::Updating), 1);
        assert_eq!(rec.count(TilePhase::Exiting), 1);
        let exit = rec.transitions.last().unwrap();
        assert_eq!(exit.key, "b");
        assert_eq!(exit.from, Rect::new(50.0, 0.0, 100.0, 100.0));
        assert_eq!(exit.to, Rect::new(50.0, 0.0, 50.0, 0.0));
        assert!(!rec.next_state.contains("b"));
    }

    #[test]
    fn reentering_after_exit_is_a_fresh_enter() {
        let r = Rect::new(0.0, 0.0, 100.0, 100.0);
        let s0 = LayoutState::from_leaves(&[leaf("a", r)]);
        let s1 = reconcile(&s0, &[leaf("b", r)]).next_state;
        let rec = reconcile(&s1, &[leaf("a", r)]);
        let a = rec.transitions.iter().find(|t| t.key == "a").unwrap();
        assert_eq!(a.phase, TilePhase::Entering);
        assert_eq!(a.from, r.collapsed_to_center());
    }
}
