//! Interaction engine: validate, transition, project.
//!
//! One engine per session. `dispatch` takes `&mut self`, so events for a
//! session are processed strictly one at a time; the corpus and index are
//! shared read-only through `Arc` and can back many engines at once.

use std::sync::Arc;

use crate::config::ExplorerConfig;
use crate::corpus::Corpus;
use crate::error::Result;
use crate::scene::{LabelMode, Scene, SceneOptions, project};
use crate::session::{Event, SessionState};
use crate::similarity::SimilarityIndex;

/// Outcome of validating an event against the current pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Apply,
    /// The event references an item outside the visible pool.
    Stale,
}

#[derive(Debug, Clone)]
pub struct InteractionEngine {
    corpus: Arc<Corpus>,
    index: Arc<SimilarityIndex>,
    state: SessionState,
    options: SceneOptions,
}

impl InteractionEngine {
    /// Start a session with the default neighbor threshold for this corpus.
    pub fn new(corpus: Arc<Corpus>, index: Arc<SimilarityIndex>, config: &ExplorerConfig) -> Self {
        let state = SessionState::for_corpus(corpus.len(), config.neighbor_cap);
        let options = SceneOptions {
            label_mode: config.label_mode,
        };
        Self::with_state(corpus, index, state, options)
    }

    /// Start a session from an explicit state.
    pub fn with_state(
        corpus: Arc<Corpus>,
        index: Arc<SimilarityIndex>,
        state: SessionState,
        options: SceneOptions,
    ) -> Self {
        Self {
            corpus,
            index,
            state,
            options,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn options(&self) -> SceneOptions {
        self.options
    }

    /// Change the marker label preference. Session state is untouched.
    pub fn set_label_mode(&mut self, label_mode: LabelMode) {
        self.options.label_mode = label_mode;
    }

    /// Decide whether `event` still makes sense for the current pool.
    pub fn admit(&self, event: &Event) -> Admission {
        let target = match *event {
            Event::Click { index } | Event::Hover { index: Some(index) } => index,
            Event::Hover { index: None }
            | Event::SetGroupFilter { .. }
            | Event::SetNeighborCount { .. }
            | Event::ToggleLinksVisible => return Admission::Apply,
        };

        let in_pool = self.corpus.items().get(target).is_some_and(|item| {
            self.state
                .group_filter
                .is_none_or(|group| item.group == group)
        });
        if in_pool {
            Admission::Apply
        } else {
            Admission::Stale
        }
    }

    /// Process one event to completion and return the resulting scene.
    ///
    /// Stale events leave the state untouched; the returned scene is then the
    /// current one.
    pub fn dispatch(&mut self, event: Event) -> Result<Scene> {
        match self.admit(&event) {
            Admission::Apply => {
                self.state = std::mem::take(&mut self.state).apply(event);
                tracing::debug!(
                    event = event.kind(),
                    group_filter = ?self.state.group_filter,
                    selected_index = ?self.state.selected_index,
                    neighbor_count = self.state.neighbor_count,
                    links_visible = self.state.links_visible,
                    "Event applied"
                );
            }
            Admission::Stale => {
                tracing::debug!(
                    event = ?event,
                    group_filter = ?self.state.group_filter,
                    "Ignoring stale event"
                );
            }
        }
        self.scene()
    }

    /// Project the current state.
    pub fn scene(&self) -> Result<Scene> {
        project(&self.corpus, &self.index, &self.state, self.options)
    }
}
