//! Subcommand handlers.
//!
//! Machine-readable output goes to stdout; logs and errors go to stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::bail;
use clap::Args;
use serde::de::DeserializeOwned;
use serde_json::json;
use simscope_core::config::Config;
use simscope_core::scene::{HoverPanel, RankedText, SelectionPanel};
use simscope_core::similarity::default_neighbor_count;
use simscope_core::{
    Corpus, CorpusRow, Event, InteractionEngine, LabelMode, Scene, SimilarityIndex, sample_rows,
};

#[derive(Args)]
pub struct CorpusArgs {
    /// JSON array of `{label_text, vector, group}` rows (sample corpus when omitted)
    #[arg(long)]
    pub corpus: Option<PathBuf>,
}

#[derive(Args)]
pub struct NeighborsArgs {
    #[command(flatten)]
    pub source: CorpusArgs,

    /// Corpus index of the anchor item
    #[arg(long)]
    pub index: usize,

    /// Number of neighbors (defaults to half the corpus, capped by config)
    #[arg(short, long)]
    pub k: Option<usize>,

    /// Rank only within this group
    #[arg(long)]
    pub group: Option<i64>,
}

#[derive(Args)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub source: CorpusArgs,

    /// JSON array of interaction events
    #[arg(long)]
    pub events: PathBuf,

    /// Label markers with their text instead of display ids
    #[arg(long)]
    pub show_text: bool,

    /// Print one scene per event as JSON lines
    #[arg(long)]
    pub every: bool,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> simscope_core::Result<T> {
    tracing::debug!(path = %path.display(), "Reading input");
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn load_corpus(args: &CorpusArgs) -> simscope_core::Result<Corpus> {
    let rows: Vec<CorpusRow> = match &args.corpus {
        Some(path) => read_json(path)?,
        None => sample_rows(),
    };
    Ok(Corpus::load(rows)?)
}

fn build_index(config: &Config, corpus: &Corpus) -> SimilarityIndex {
    SimilarityIndex::build_with_limit(
        corpus,
        config.explorer.similarity,
        config.explorer.eager_item_limit,
    )
}

fn start_session(config: &Config, corpus: Corpus) -> InteractionEngine {
    let index = build_index(config, &corpus);
    InteractionEngine::new(Arc::new(corpus), Arc::new(index), &config.explorer)
}

pub fn inspect(config: &Config, args: &CorpusArgs) -> anyhow::Result<()> {
    let corpus = load_corpus(args)?;
    let index = build_index(config, &corpus);
    let groups: Vec<_> = corpus
        .groups()
        .into_iter()
        .map(|group| json!({ "group": group, "items": corpus.pool(Some(group)).len() }))
        .collect();

    let summary = json!({
        "items": corpus.len(),
        "dimension": corpus.dimension(),
        "groups": groups,
        "default_neighbor_count": default_neighbor_count(corpus.len(), config.explorer.neighbor_cap),
        "similarity": index.strategy(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

pub fn neighbors(config: &Config, args: &NeighborsArgs) -> anyhow::Result<()> {
    let corpus = load_corpus(&args.source)?;
    let anchor_item = corpus.by_index(args.index).map_err(simscope_core::Error::from)?;
    let index = build_index(config, &corpus);
    let k = args
        .k
        .unwrap_or_else(|| default_neighbor_count(corpus.len(), config.explorer.neighbor_cap));

    let pool = corpus.pool(args.group);
    let Some(anchor) = pool.iter().position(|item| item.index == args.index) else {
        bail!(
            "item {} ({}) is in group {}, not group {}",
            args.index,
            anchor_item.display_id,
            anchor_item.group,
            args.group.unwrap_or_default()
        );
    };

    let ranked: Vec<RankedText> = index
        .top_k_in_pool(&pool, anchor, k)
        .map_err(simscope_core::Error::from)?
        .into_iter()
        .map(|neighbor| {
            let item = pool[neighbor.pool_index];
            RankedText {
                index: item.index,
                display_id: item.display_id.clone(),
                label_text: item.label_text.clone(),
                score: neighbor.score,
            }
        })
        .collect();

    tracing::debug!(anchor = args.index, k, group = ?args.group, found = ranked.len(), "Neighbors ranked");
    println!("{}", serde_json::to_string_pretty(&ranked)?);
    Ok(())
}

pub fn replay(config: &Config, args: &ReplayArgs) -> anyhow::Result<()> {
    let corpus = load_corpus(&args.source)?;
    let events: Vec<Event> = read_json(&args.events)?;
    let mut engine = start_session(config, corpus);
    if args.show_text {
        engine.set_label_mode(LabelMode::Text);
    }

    let mut scene = engine.scene()?;
    for event in events {
        scene = engine.dispatch(event)?;
        if args.every {
            println!("{}", serde_json::to_string(&scene)?);
        }
    }
    if !args.every {
        println!("{}", serde_json::to_string_pretty(&scene)?);
    }
    Ok(())
}

/// Built-in walkthrough over the sample corpus.
const DEMO_SCRIPT: &[Event] = &[
    Event::Hover { index: Some(2) },
    Event::Hover { index: None },
    Event::Click { index: 0 },
    Event::SetNeighborCount { count: 3 },
    Event::ToggleLinksVisible,
    Event::ToggleLinksVisible,
    Event::SetGroupFilter { group: Some(2) },
    Event::Click { index: 0 },
    Event::Click { index: 4 },
    Event::SetGroupFilter { group: None },
    Event::Click { index: 1 },
    Event::Click { index: 1 },
];

pub fn demo(config: &Config) -> anyhow::Result<()> {
    let corpus = Corpus::load(sample_rows()).map_err(simscope_core::Error::from)?;
    let mut engine = start_session(config, corpus);

    println!("{:>3}  {:<20} {}", "#", "event", "scene");
    println!("{:>3}  {:<20} {}", 0, "(start)", describe(&engine.scene()?));
    for (step, event) in DEMO_SCRIPT.iter().enumerate() {
        let scene = engine.dispatch(*event)?;
        println!("{:>3}  {:<20} {}", step + 1, event.kind(), describe(&scene));
    }
    Ok(())
}

/// One-line human summary of a scene.
fn describe(scene: &Scene) -> String {
    let hover = match &scene.hover_panel {
        HoverPanel::Item { display_id, .. } => display_id.as_str(),
        HoverPanel::Placeholder { .. } => "-",
    };
    let selected = match &scene.selection_panel {
        SelectionPanel::Ranked { display_id, .. } => display_id.as_str(),
        SelectionPanel::Placeholder { .. } => "-",
    };
    let links: Vec<&str> = scene.links.iter().map(|link| link.label.as_str()).collect();
    format!(
        "pool={} hover={hover} selected={selected} links=[{}]",
        scene.markers.len(),
        links.join(", ")
    )
}
