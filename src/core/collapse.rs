use std::collections::HashMap;

use crate::core::value_path::ValuePath;

/// List collapse heuristic: composite-item lists fold past 7 items, scalar
/// lists past 4. Empty lists never fold.
pub fn default_collapsed(len: usize, composite_items: bool) -> bool {
    let limit = if composite_items { 7 } else { 4 };
    len > limit
}

/// Per-node collapsed/expanded state, keyed by tree position.
///
/// A node's default is computed once, from the value present when the node
/// is first seen, and is not re-evaluated as the value underneath changes —
/// only the user's toggle moves it afterwards. Entries for nodes that left
/// the tree are dropped so a path that reappears starts fresh.
#[derive(Debug, Clone, Default)]
pub struct Disclosure {
    states: HashMap<ValuePath, bool>,
}

impl Disclosure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `path` with `initial` if unseen; returns the current state.
    pub fn sight(&mut self, path: &ValuePath, initial: bool) -> bool {
        *self.states.entry(path.clone()).or_insert(initial)
    }

    pub fn is_collapsed(&self, path: &ValuePath) -> bool {
        self.states.get(path).copied().unwrap_or(false)
    }

    pub fn toggle(&mut self, path: &ValuePath) {
        if let Some(state) = self.states.get_mut(path) {
            *state = !*state;
        }
    }

    pub fn set(&mut self, path: &ValuePath, collapsed: bool) {
        self.states.insert(path.clone(), collapsed);
    }

    /// Drops state for every path `keep` rejects (nodes that unmounted).
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&ValuePath) -> bool,
    {
        self.states.retain(|path, _| keep(path));
    }
}

#[cfg(test)]
mod tests {
    use super::{Disclosure, default_collapsed};
    use crate::core::value_path::ValuePath;

    #[test]
    fn heuristic_matches_threshold_table() {
        // 5 scalar items fold, 4 stay open
        assert!(default_collapsed(5, false));
        assert!(!default_collapsed(4, false));
        // composite items fold only past 7
        assert!(!default_collapsed(1, true));
        assert!(!default_collapsed(7, true));
        assert!(default_collapsed(8, true));
        assert!(!default_collapsed(0, false));
    }

    #[test]
    fn first_sight_wins_over_later_defaults() {
        let mut disclosure = Disclosure::new();
        let path = ValuePath::root().key("quests");
        assert!(disclosure.sight(&path, true));
        // the list shrank below the threshold; mount-time state sticks
        assert!(disclosure.sight(&path, false));
        assert!(disclosure.is_collapsed(&path));
    }

    #[test]
    fn toggle_is_symmetric() {
        let mut disclosure = Disclosure::new();
        let path = ValuePath::root().key("players");
        disclosure.sight(&path, false);
        disclosure.toggle(&path);
        assert!(disclosure.is_collapsed(&path));
        disclosure.toggle(&path);
        assert!(!disclosure.is_collapsed(&path));
    }

    #[test]
    fn retain_resets_unmounted_nodes() {
        let mut disclosure = Disclosure::new();
        let gone = ValuePath::root().key("old");
        let kept = ValuePath::root().key("new");
        disclosure.sight(&gone, true);
        disclosure.sight(&kept, true);
        disclosure.retain(|path| path == &kept);
        // re-mounting computes a fresh default
        assert!(!disclosure.sight(&gone, false));
        assert!(disclosure.is_collapsed(&kept));
    }
}
