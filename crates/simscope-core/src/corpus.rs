//! Corpus store: the immutable, ordered set of labeled vector items.
//!
//! Rows are validated as a whole before any item is built, so a failed load
//! never exposes a partial corpus. Insertion order is preserved; it is what
//! gives each item its corpus index and its per-group ordinal.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{DataError, IndexError};

// =============================================================================
// Ingestion rows
// =============================================================================

/// One raw row supplied by the presentation layer at startup.
///
/// Every field is optional at the type level so that a missing field is
/// reported as [`DataError::MissingField`] with its row number rather than as
/// an opaque deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusRow {
    pub label_text: Option<String>,
    pub vector: Option<Vec<f64>>,
    pub group: Option<i64>,
}

impl CorpusRow {
    /// Build a complete row.
    #[must_use]
    pub fn new(label_text: impl Into<String>, vector: Vec<f64>, group: i64) -> Self {
        Self {
            label_text: Some(label_text.into()),
            vector: Some(vector),
            group: Some(group),
        }
    }
}

/// The five-row demonstration corpus (three-dimensional, groups `[1, 2, 3, 1, 2]`).
#[must_use]
pub fn sample_rows() -> Vec<CorpusRow> {
    vec![
        CorpusRow::new("This is the first sample text.", vec![3.2, 4.5, 6.7], 1),
        CorpusRow::new("Here's another sample text.", vec![7.1, 2.3, 8.9], 2),
        CorpusRow::new("A third sample text.", vec![9.4, 1.8, 5.2], 3),
        CorpusRow::new("One more sample text.", vec![6.6, 3.9, 2.1], 1),
        CorpusRow::new("Last sample text.", vec![4.8, 7.2, 9.5], 2),
    ]
}

// =============================================================================
// Items
// =============================================================================

/// Opaque, stable item identifier assigned at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// A validated corpus item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: ItemId,
    /// 0-based position in corpus order.
    pub index: usize,
    pub vector: Vec<f64>,
    pub label_text: String,
    pub group: i64,
    /// `"{group}_{ordinal}"`, ordinal being the 1-based position within the group.
    pub display_id: String,
    /// Fingerprint of the corpus this item was loaded into.
    #[serde(skip)]
    pub(crate) corpus_fingerprint: u64,
}

impl Item {
    /// First three vector coordinates, zero-padded when the corpus has fewer.
    #[must_use]
    pub fn position(&self) -> [f64; 3] {
        let mut pos = [0.0; 3];
        for (slot, value) in pos.iter_mut().zip(&self.vector) {
            *slot = *value;
        }
        pos
    }
}

// =============================================================================
// Corpus
// =============================================================================

/// Immutable ordered collection of items sharing one vector dimension.
#[derive(Debug, Clone, Serialize)]
pub struct Corpus {
    dimension: usize,
    #[serde(skip)]
    fingerprint: u64,
    items: Vec<Item>,
}

impl Corpus {
    /// Validate `rows` and build the corpus.
    ///
    /// The first row fixes the dimension; every later row must match it.
    pub fn load(rows: impl IntoIterator<Item = CorpusRow>) -> Result<Self, DataError> {
        let mut dimension = None;
        let mut validated = Vec::new();

        for (row, raw) in rows.into_iter().enumerate() {
            let label_text = raw.label_text.ok_or(DataError::MissingField {
                row,
                field: "label_text",
            })?;
            let vector = raw.vector.ok_or(DataError::MissingField {
                row,
                field: "vector",
            })?;
            let group = raw.group.ok_or(DataError::MissingField {
                row,
                field: "group",
            })?;

            if vector.is_empty() {
                return Err(DataError::EmptyVector { row });
            }
            let expected = *dimension.get_or_insert(vector.len());
            if vector.len() != expected {
                return Err(DataError::DimensionMismatch {
                    row,
                    expected,
                    got: vector.len(),
                });
            }
            if let Some(component) = vector.iter().position(|v| !v.is_finite()) {
                return Err(DataError::NonFinite { row, component });
            }

            validated.push((label_text, vector, group));
        }

        let Some(dimension) = dimension else {
            return Err(DataError::EmptyCorpus);
        };

        let fingerprint = content_fingerprint(dimension, &validated);
        let mut ordinals: HashMap<i64, usize> = HashMap::new();
        let items: Vec<Item> = validated
            .into_iter()
            .enumerate()
            .map(|(index, (label_text, vector, group))| {
                let ordinal = ordinals.entry(group).or_insert(0);
                *ordinal += 1;
                Item {
                    id: ItemId(index as u64),
                    index,
                    vector,
                    label_text,
                    group,
                    display_id: format!("{group}_{ordinal}"),
                    corpus_fingerprint: fingerprint,
                }
            })
            .collect();

        tracing::debug!(
            items = items.len(),
            dimension,
            groups = ordinals.len(),
            "Corpus loaded"
        );

        Ok(Self {
            dimension,
            fingerprint,
            items,
        })
    }

    /// Content hash shared by every item of this corpus.
    ///
    /// Corpora loaded from identical rows share a fingerprint.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Vector dimension shared by every item.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Item at corpus position `index`.
    pub fn by_index(&self, index: usize) -> Result<&Item, IndexError> {
        self.items.get(index).ok_or(IndexError {
            index,
            len: self.items.len(),
        })
    }

    pub fn by_display_id(&self, display_id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.display_id == display_id)
    }

    /// Items visible under `group_filter`, in corpus order.
    pub fn pool(&self, group_filter: Option<i64>) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| group_filter.is_none_or(|group| item.group == group))
            .collect()
    }

    /// Distinct group ids, ascending.
    pub fn groups(&self) -> Vec<i64> {
        self.items
            .iter()
            .map(|item| item.group)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn content_fingerprint(dimension: usize, rows: &[(String, Vec<f64>, i64)]) -> u64 {
    let mut hasher = DefaultHasher::new();
    dimension.hash(&mut hasher);
    for (label_text, vector, group) in rows {
        label_text.hash(&mut hasher);
        group.hash(&mut hasher);
        for component in vector {
            component.to_bits().hash(&mut hasher);
        }
    }
    hasher.finish()
}
