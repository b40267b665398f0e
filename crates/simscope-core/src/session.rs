//! Per-session interaction state and its pure transitions.
//!
//! [`SessionState::apply`] implements the transition table and nothing more;
//! it does not know the corpus. Checking that an event's index is still inside
//! the visible pool is the engine's job (see [`crate::engine`]).

use serde::{Deserialize, Serialize};

use crate::similarity::default_neighbor_count;

/// Interaction events delivered by the presentation layer, one at a time.
///
/// Indices are corpus indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Restrict the pool to one group, or clear the restriction.
    SetGroupFilter { group: Option<i64> },
    /// Pointer entered an item, or left all items.
    Hover { index: Option<usize> },
    /// Select an item; clicking the selected item again deselects it.
    Click { index: usize },
    /// Free-form neighbor threshold; negative values clamp to zero.
    SetNeighborCount { count: i64 },
    /// Show or hide similarity links without touching the selection.
    ToggleLinksVisible,
}

impl Event {
    /// Short event name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SetGroupFilter { .. } => "set_group_filter",
            Self::Hover { .. } => "hover",
            Self::Click { .. } => "click",
            Self::SetNeighborCount { .. } => "set_neighbor_count",
            Self::ToggleLinksVisible => "toggle_links_visible",
        }
    }
}

/// Composite interaction state of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub group_filter: Option<i64>,
    pub selected_index: Option<usize>,
    pub hovered_index: Option<usize>,
    pub neighbor_count: usize,
    pub links_visible: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SessionState {
    /// Fresh state: nothing filtered, selected or hovered, links shown.
    #[must_use]
    pub fn new(neighbor_count: usize) -> Self {
        Self {
            group_filter: None,
            selected_index: None,
            hovered_index: None,
            neighbor_count,
            links_visible: true,
        }
    }

    /// Fresh state with the default threshold for a corpus of `n_items`.
    #[must_use]
    pub fn for_corpus(n_items: usize, neighbor_cap: usize) -> Self {
        Self::new(default_neighbor_count(n_items, neighbor_cap))
    }

    /// Apply one event, returning the next state.
    #[must_use]
    pub fn apply(mut self, event: Event) -> Self {
        match event {
            Event::SetGroupFilter { group } => {
                self.group_filter = group;
                self.selected_index = None;
                self.hovered_index = None;
            }
            Event::Hover { index } => {
                self.hovered_index = index;
            }
            Event::Click { index } => {
                if self.selected_index == Some(index) {
                    self.selected_index = None;
                } else {
                    self.selected_index = Some(index);
                    self.links_visible = true;
                }
            }
            Event::SetNeighborCount { count } => {
                self.neighbor_count = usize::try_from(count.max(0)).unwrap_or(usize::MAX);
            }
            Event::ToggleLinksVisible => {
                self.links_visible = !self.links_visible;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_filter_clears_selection_and_hover() {
        let state = SessionState::new(2)
            .apply(Event::Click { index: 1 })
            .apply(Event::Hover { index: Some(3) })
            .apply(Event::SetGroupFilter { group: Some(1) });
        assert_eq!(state.group_filter, Some(1));
        assert_eq!(state.selected_index, None);
        assert_eq!(state.hovered_index, None);
    }

    #[test]
    fn hover_leaves_selection() {
        let state = SessionState::new(2)
            .apply(Event::Click { index: 4 })
            .apply(Event::Hover { index: Some(0) });
        assert_eq!(state.selected_index, Some(4));
        assert_eq!(state.hovered_index, Some(0));
        let state = state.apply(Event::Hover { index: None });
        assert_eq!(state.hovered_index, None);
        assert_eq!(state.selected_index, Some(4));
    }

    #[test]
    fn click_same_index_toggles_off() {
        let state = SessionState::new(2)
            .apply(Event::Click { index: 0 })
            .apply(Event::Click { index: 0 });
        assert_eq!(state.selected_index, None);
    }

    #[test]
    fn click_new_index_reshows_links() {
        let state = SessionState::new(2)
            .apply(Event::Click { index: 0 })
            .apply(Event::ToggleLinksVisible);
        assert!(!state.links_visible);

        let state = state.apply(Event::Click { index: 2 });
        assert_eq!(state.selected_index, Some(2));
        assert!(state.links_visible);
    }

    #[test]
    fn deselect_keeps_links_flag() {
        let state = SessionState::new(2)
            .apply(Event::Click { index: 0 })
            .apply(Event::ToggleLinksVisible)
            .apply(Event::Click { index: 0 });
        assert_eq!(state.selected_index, None);
        assert!(!state.links_visible);
    }

    #[test]
    fn negative_neighbor_count_clamps() {
        let state = SessionState::new(5).apply(Event::SetNeighborCount { count: -3 });
        assert_eq!(state.neighbor_count, 0);
        let state = state.apply(Event::SetNeighborCount { count: 7 });
        assert_eq!(state.neighbor_count, 7);
    }

    #[test]
    fn toggle_twice_is_identity() {
        let start = SessionState::new(2).apply(Event::Click { index: 1 });
        let end = start
            .clone()
            .apply(Event::ToggleLinksVisible)
            .apply(Event::ToggleLinksVisible);
        assert_eq!(start, end);
    }

    #[test]
    fn for_corpus_uses_default_threshold() {
        assert_eq!(SessionState::for_corpus(5, 20).neighbor_count, 2);
        assert_eq!(SessionState::for_corpus(500, 20).neighbor_count, 20);
    }

    #[test]
    fn event_json_shape() {
        let event: Event = serde_json::from_str(r#"{"type": "click", "index": 3}"#).unwrap();
        assert_eq!(event, Event::Click { index: 3 });

        let event: Event =
            serde_json::from_str(r#"{"type": "set_group_filter", "group": null}"#).unwrap();
        assert_eq!(event, Event::SetGroupFilter { group: None });

        let event: Event = serde_json::from_str(r#"{"type": "toggle_links_visible"}"#).unwrap();
        assert_eq!(event.kind(), "toggle_links_visible");
    }
}
