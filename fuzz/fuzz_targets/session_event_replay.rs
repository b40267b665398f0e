#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use simscope_core::config::ExplorerConfig;
use simscope_core::scene::SelectionPanel;
use simscope_core::{
    Corpus, CorpusRow, Event, InteractionEngine, SimilarityIndex, SimilarityStrategy,
};

/// Decode one event from a 3-byte window. Indices may run past the corpus.
fn event_for(tag: u8, a: u8, b: u8) -> Event {
    match tag % 6 {
        0 => Event::SetGroupFilter {
            group: (a % 5 != 0).then_some(i64::from(a % 5)),
        },
        1 => Event::Hover {
            index: (a & 1 == 1).then_some(usize::from(b)),
        },
        2 | 3 => Event::Click {
            index: usize::from(a % 24),
        },
        4 => Event::SetNeighborCount {
            count: i64::from(i8::from_ne_bytes([a])) * i64::from(b % 4 + 1),
        },
        _ => Event::ToggleLinksVisible,
    }
}

fn corpus_from(bytes: &[u8]) -> Option<Corpus> {
    let (&n, rest) = bytes.split_first()?;
    let n = usize::from(n % 20) + 1;
    let rows = (0..n).map(|i| {
        let seed = rest.get(i).copied().unwrap_or(0);
        let vector = vec![
            f64::from(seed) - 128.0,
            f64::from(seed.rotate_left(3)) / 7.0,
            f64::from(i as u8),
        ];
        CorpusRow::new(format!("row {i}"), vector, i64::from(seed % 4))
    });
    Corpus::load(rows).ok()
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let (head, script) = data.split_at(data.len().min(21));
    let Some(corpus) = corpus_from(head) else {
        return;
    };
    let corpus = Arc::new(corpus);
    let strategy = if head[0] & 0x80 == 0 {
        SimilarityStrategy::Eager
    } else {
        SimilarityStrategy::Lazy
    };
    let index = Arc::new(SimilarityIndex::build(&corpus, strategy));
    let mut engine = InteractionEngine::new(Arc::clone(&corpus), index, &ExplorerConfig::default());

    for chunk in script.chunks_exact(3) {
        let event = event_for(chunk[0], chunk[1], chunk[2]);
        let scene = match engine.dispatch(event) {
            Ok(scene) => scene,
            Err(err) => panic!("dispatch failed on admitted event {event:?}: {err}"),
        };
        let state = engine.state();
        let pool: Vec<usize> = corpus
            .pool(state.group_filter)
            .iter()
            .map(|item| item.index)
            .collect();

        assert_eq!(scene.markers.len(), pool.len());
        if let Some(selected) = state.selected_index {
            assert!(pool.contains(&selected), "selection {selected} outside pool");
        }
        if let Some(hovered) = state.hovered_index {
            assert!(pool.contains(&hovered), "hover {hovered} outside pool");
        }
        assert!(scene.links.len() <= state.neighbor_count);
        assert!(scene.links.len() < pool.len().max(1));
        for link in &scene.links {
            assert!(link.weight.is_finite());
            assert!((-1.0..=1.0).contains(&link.weight));
            assert_ne!(link.from_index, link.to_index);
        }
        for pair in scene.links.windows(2) {
            assert!(pair[0].weight >= pair[1].weight);
        }
        if let SelectionPanel::Ranked { neighbors, .. } = &scene.selection_panel {
            assert_eq!(neighbors.len(), state.neighbor_count.min(corpus.len() - 1));
        }
    }
});
