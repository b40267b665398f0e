//! simscope-core: similarity exploration over small labeled vector corpora
//!
//! The core turns a stream of interaction events into renderable scenes. It
//! owns no file formats, network protocols or rendering; a presentation layer
//! supplies rows and events and draws the scenes it gets back.
//!
//! # Architecture
//!
//! ```text
//! rows ──► Corpus ──► SimilarityIndex
//!                         │
//! event ──► InteractionEngine ── validate ──► SessionState::apply
//!                         │
//!                         └──► project() ──► Scene ──► presentation layer
//! ```
//!
//! # Modules
//!
//! - `corpus`: immutable item store, display ids, group pools
//! - `similarity`: cosine similarity, top-K ranking, eager/lazy index
//! - `session`: session state and its pure transitions
//! - `scene`: scene types and the `project` function
//! - `engine`: per-session event dispatch
//! - `config`: `simscope.toml` loading and validation
//! - `logging`: tracing subscriber setup
//! - `error`: error types with remediation hints
//!
//! # Safety
//!
//! This crate forbids unsafe code.

#![forbid(unsafe_code)]

pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod logging;
pub mod scene;
pub mod session;
pub mod similarity;

pub use corpus::{Corpus, CorpusRow, Item, ItemId, sample_rows};
pub use engine::InteractionEngine;
pub use error::{DataError, Error, IndexError, RangeError, Result};
pub use scene::{LabelMode, Scene, SceneOptions, project};
pub use session::{Event, SessionState};
pub use similarity::{SimilarityIndex, SimilarityStrategy, cosine_similarity, top_k};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
