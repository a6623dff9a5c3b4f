//! Active tab and expanded-game selection.

use std::collections::HashSet;

use crate::dates::DateTab;

/// User-driven view state, independent of fetched data.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    active_tab: DateTab,
    expanded: HashSet<String>,
}

impl Selection {
    /// Today tab, nothing expanded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently shown tab.
    pub fn active_tab(&self) -> DateTab {
        self.active_tab
    }

    /// Switch tabs. Returns `true` if the tab changed.
    pub fn select_tab(&mut self, tab: DateTab) -> bool {
        let changed = self.active_tab != tab;
        self.active_tab = tab;
        changed
    }

    /// Flip a game's expanded state, returning the new state.
    pub fn toggle(&mut self, game_id: &str) -> bool {
        if self.expanded.remove(game_id) {
            false
        } else {
            self.expanded.insert(game_id.to_string());
            true
        }
    }

    /// Whether the game's detail panel is open.
    pub fn is_expanded(&self, game_id: &str) -> bool {
        self.expanded.contains(game_id)
    }

    /// Ids currently marked expanded, including ones no longer on screen.
    pub fn expanded_ids(&self) -> impl Iterator<Item = &str> {
        self.expanded.iter().map(String::as_str)
    }
}
