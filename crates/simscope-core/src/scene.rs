//! Scene projection: the renderable description of one session state.
//!
//! [`project`] is a pure function of corpus, index, state and presentation
//! options. It reads nothing else and mutates nothing, so any number of
//! sessions can project concurrently over a shared corpus.
//!
//! # Scene layout
//!
//! | Field | Source |
//! |-------|--------|
//! | `markers` | one per pool item, corpus order |
//! | `links` | top-K of the selection within the pool, when links are visible |
//! | `hover_panel` | hovered item details, or a placeholder |
//! | `selection_panel` | top-K of the selection against the full corpus, or a placeholder |

use serde::{Deserialize, Serialize};

use crate::corpus::{Corpus, Item};
use crate::error::Result;
use crate::session::SessionState;
use crate::similarity::SimilarityIndex;

/// Placeholder shown when nothing is hovered.
pub const HOVER_PROMPT: &str = "Hover over a point to see its details.";
/// Placeholder shown when nothing is selected.
pub const SELECTION_PROMPT: &str = "Click on a point to see its most similar texts.";

// =============================================================================
// Presentation options
// =============================================================================

/// Which text labels a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMode {
    #[default]
    DisplayId,
    Text,
}

/// Presentation preferences forwarded unchanged into projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SceneOptions {
    pub label_mode: LabelMode,
}

// =============================================================================
// Scene
// =============================================================================

/// Visual emphasis of a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    #[default]
    None,
    Selected,
    Neighbor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub index: usize,
    pub display_id: String,
    pub position: [f64; 3],
    /// Group id; the presentation layer maps it to a color.
    pub color_key: i64,
    pub label: String,
    pub emphasis: Emphasis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub from_index: usize,
    pub to_index: usize,
    pub from: [f64; 3],
    pub to: [f64; 3],
    pub weight: f64,
    /// `"{display_id} - {score:.2}"`
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HoverPanel {
    Placeholder {
        prompt: String,
    },
    Item {
        index: usize,
        display_id: String,
        group: i64,
        label_text: String,
        position: [f64; 3],
    },
}

/// One entry in the selection panel's ranked list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedText {
    pub index: usize,
    pub display_id: String,
    pub label_text: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionPanel {
    Placeholder {
        prompt: String,
    },
    Ranked {
        index: usize,
        display_id: String,
        label_text: String,
        neighbors: Vec<RankedText>,
    },
}

/// Everything the presentation layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub markers: Vec<Marker>,
    pub links: Vec<Link>,
    pub hover_panel: HoverPanel,
    pub selection_panel: SelectionPanel,
}

// =============================================================================
// Projection
// =============================================================================

/// Project `state` into a scene.
///
/// A selection outside the current pool draws no links. Indices outside the
/// corpus are contract violations and surface as errors.
pub fn project(
    corpus: &Corpus,
    index: &SimilarityIndex,
    state: &SessionState,
    options: SceneOptions,
) -> Result<Scene> {
    let pool = corpus.pool(state.group_filter);
    let selected_pos = state
        .selected_index
        .and_then(|selected| pool.iter().position(|item| item.index == selected));

    let mut links = Vec::new();
    if let Some(anchor) = selected_pos {
        if state.links_visible && state.neighbor_count > 0 {
            let from_item = pool[anchor];
            for neighbor in index.top_k_in_pool(&pool, anchor, state.neighbor_count)? {
                let to_item = pool[neighbor.pool_index];
                links.push(Link {
                    from_index: from_item.index,
                    to_index: to_item.index,
                    from: from_item.position(),
                    to: to_item.position(),
                    weight: neighbor.score,
                    label: link_label(to_item, neighbor.score),
                });
            }
        }
    }

    let markers = pool
        .iter()
        .map(|item| Marker {
            index: item.index,
            display_id: item.display_id.clone(),
            position: item.position(),
            color_key: item.group,
            label: match options.label_mode {
                LabelMode::DisplayId => item.display_id.clone(),
                LabelMode::Text => item.label_text.clone(),
            },
            emphasis: if state.selected_index == Some(item.index) {
                Emphasis::Selected
            } else if links.iter().any(|link| link.to_index == item.index) {
                Emphasis::Neighbor
            } else {
                Emphasis::None
            },
        })
        .collect();

    let hover_panel = match state.hovered_index {
        None => HoverPanel::Placeholder {
            prompt: HOVER_PROMPT.to_string(),
        },
        Some(hovered) => {
            let item = corpus.by_index(hovered)?;
            HoverPanel::Item {
                index: item.index,
                display_id: item.display_id.clone(),
                group: item.group,
                label_text: item.label_text.clone(),
                position: item.position(),
            }
        }
    };

    let selection_panel = match state.selected_index {
        None => SelectionPanel::Placeholder {
            prompt: SELECTION_PROMPT.to_string(),
        },
        Some(selected) => {
            let item = corpus.by_index(selected)?;
            let everything = corpus.pool(None);
            let neighbors = index
                .top_k_in_pool(&everything, selected, state.neighbor_count)?
                .into_iter()
                .map(|neighbor| {
                    let other = everything[neighbor.pool_index];
                    RankedText {
                        index: other.index,
                        display_id: other.display_id.clone(),
                        label_text: other.label_text.clone(),
                        score: neighbor.score,
                    }
                })
                .collect();
            SelectionPanel::Ranked {
                index: item.index,
                display_id: item.display_id.clone(),
                label_text: item.label_text.clone(),
                neighbors,
            }
        }
    };

    Ok(Scene {
        markers,
        links,
        hover_panel,
        selection_panel,
    })
}

/// `"{display_id} - {score}"`; the score always prints two decimals (`0.90`,
/// not `0.9`).
fn link_label(item: &Item, score: f64) -> String {
    format!("{} - {:.2}", item.display_id, score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::sample_rows;
    use crate::error::Error;
    use crate::session::Event;
    use crate::similarity::SimilarityStrategy;

    fn fixture() -> (Corpus, SimilarityIndex) {
        let corpus = Corpus::load(sample_rows()).unwrap();
        let index = SimilarityIndex::build(&corpus, SimilarityStrategy::Eager);
        (corpus, index)
    }

    #[test]
    fn initial_scene_has_placeholders() {
        let (corpus, index) = fixture();
        let scene = project(
            &corpus,
            &index,
            &SessionState::new(2),
            SceneOptions::default(),
        )
        .unwrap();
        assert_eq!(scene.markers.len(), 5);
        assert!(scene.links.is_empty());
        assert_eq!(
            scene.hover_panel,
            HoverPanel::Placeholder {
                prompt: HOVER_PROMPT.to_string()
            }
        );
        assert_eq!(
            scene.selection_panel,
            SelectionPanel::Placeholder {
                prompt: SELECTION_PROMPT.to_string()
            }
        );
    }

    #[test]
    fn markers_follow_label_mode() {
        let (corpus, index) = fixture();
        let state = SessionState::new(2);
        let by_id = project(&corpus, &index, &state, SceneOptions::default()).unwrap();
        assert_eq!(by_id.markers[1].label, "2_1");

        let by_text = project(
            &corpus,
            &index,
            &state,
            SceneOptions {
                label_mode: LabelMode::Text,
            },
        )
        .unwrap();
        assert_eq!(by_text.markers[1].label, "Here's another sample text.");
        assert_eq!(by_text.markers[1].color_key, 2);
        assert_eq!(by_text.markers[1].position, [7.1, 2.3, 8.9]);
    }

    #[test]
    fn links_and_emphasis_for_selection() {
        let (corpus, index) = fixture();
        let state = SessionState::new(2).apply(Event::Click { index: 0 });
        let scene = project(&corpus, &index, &state, SceneOptions::default()).unwrap();
        assert_eq!(scene.links.len(), 2);
        for link in &scene.links {
            assert_eq!(link.from_index, 0);
            assert_eq!(link.from, [3.2, 4.5, 6.7]);
            let target = &scene.markers[link.to_index];
            assert_eq!(target.emphasis, Emphasis::Neighbor);
            assert!(link.label.starts_with(&format!("{} - ", target.display_id)));
        }
        assert_eq!(scene.markers[0].emphasis, Emphasis::Selected);
    }

    #[test]
    fn hidden_links_keep_selection_panel() {
        let (corpus, index) = fixture();
        let state = SessionState::new(2)
            .apply(Event::Click { index: 0 })
            .apply(Event::ToggleLinksVisible);
        let scene = project(&corpus, &index, &state, SceneOptions::default()).unwrap();
        assert!(scene.links.is_empty());
        assert!(scene.markers.iter().all(|m| m.emphasis != Emphasis::Neighbor));
        match scene.selection_panel {
            SelectionPanel::Ranked { neighbors, .. } => assert_eq!(neighbors.len(), 2),
            SelectionPanel::Placeholder { .. } => panic!("selection panel lost"),
        }
    }

    #[test]
    fn zero_neighbor_count_draws_no_links() {
        let (corpus, index) = fixture();
        let state = SessionState::new(0).apply(Event::Click { index: 0 });
        let scene = project(&corpus, &index, &state, SceneOptions::default()).unwrap();
        assert!(scene.links.is_empty());
        match scene.selection_panel {
            SelectionPanel::Ranked {
                neighbors,
                label_text,
                ..
            } => {
                assert!(neighbors.is_empty());
                assert_eq!(label_text, "This is the first sample text.");
            }
            SelectionPanel::Placeholder { .. } => panic!("expected ranked panel"),
        }
    }

    #[test]
    fn hover_panel_describes_item() {
        let (corpus, index) = fixture();
        let state = SessionState::new(2).apply(Event::Hover { index: Some(4) });
        let scene = project(&corpus, &index, &state, SceneOptions::default()).unwrap();
        assert_eq!(
            scene.hover_panel,
            HoverPanel::Item {
                index: 4,
                display_id: "2_2".to_string(),
                group: 2,
                label_text: "Last sample text.".to_string(),
                position: [4.8, 7.2, 9.5],
            }
        );
    }

    #[test]
    fn out_of_corpus_hover_is_an_error() {
        let (corpus, index) = fixture();
        let state = SessionState::new(2).apply(Event::Hover { index: Some(9) });
        let err = project(&corpus, &index, &state, SceneOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Index(_)));
    }

    #[test]
    fn selection_outside_pool_draws_no_links() {
        let (corpus, index) = fixture();
        let state = SessionState {
            group_filter: Some(1),
            selected_index: Some(1),
            ..SessionState::new(2)
        };
        let scene = project(&corpus, &index, &state, SceneOptions::default()).unwrap();
        assert!(scene.links.is_empty());
        assert_eq!(scene.markers.len(), 2);
    }

    #[test]
    fn scene_serializes_to_json() {
        let (corpus, index) = fixture();
        let state = SessionState::new(1).apply(Event::Click { index: 2 });
        let scene = project(&corpus, &index, &state, SceneOptions::default()).unwrap();
        let value = serde_json::to_value(&scene).unwrap();
        assert_eq!(value["selection_panel"]["kind"], "ranked");
        assert_eq!(value["hover_panel"]["kind"], "placeholder");
        assert_eq!(value["markers"][2]["emphasis"], "selected");
    }

    #[test]
    fn link_label_keeps_two_decimals() {
        let (corpus, _) = fixture();
        let item = corpus.by_index(4).unwrap();
        assert_eq!(link_label(item, 0.9), "2_2 - 0.90");
        assert_eq!(link_label(item, 0.996), "2_2 - 1.00");
        assert_eq!(link_label(item, -0.5), "2_2 - -0.50");
    }
}
