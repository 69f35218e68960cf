//! In-memory triplet dataset.
//!
//! Build from parallel lists, a [`TripletColumns`] table, a list of [`TripletRecord`]s,
//! or a JSON-lines file. [`TripletDataset::augment`] derives a larger, label-balanced
//! dataset; the original is never mutated.

pub mod augment;
pub mod error;
pub mod types;


pub use error::DatasetError;
pub use types::{Label, TripletColumns, TripletExample, TripletRecord};

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rand::Rng;
use tracing::{debug, info};

/// Ordered, immutable collection of [`TripletExample`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripletDataset {
    examples: Vec<TripletExample>,
}

impl TripletDataset {
    pub fn from_examples(examples: Vec<TripletExample>) -> Self {
        Self { examples }
    }

    /// Zips parallel text lists; `labels` of `None` (or empty) means every row is `B`.
    ///
    /// # Panics
    ///
    /// If the lists differ in length.
    pub fn from_lists(
        text_a: Vec<String>,
        text_b: Vec<String>,
        text_c: Vec<String>,
        labels: Option<Vec<Label>>,
    ) -> Self {
        let labels = labels
            .filter(|labels| !labels.is_empty())
            .unwrap_or_else(|| vec![Label::B; text_a.len()]);

        assert!(
            [text_a.len(), text_b.len(), text_c.len()]
                .iter()
                .all(|&len| len == labels.len()),
            "parallel lists must have equal length (A={}, B={}, C={}, label={})",
            text_a.len(),
            text_b.len(),
            text_c.len(),
            labels.len()
        );

        let examples = text_a
            .into_iter()
            .zip(text_b)
            .zip(text_c)
            .zip(labels)
            .map(|(((a, b), c), label)| TripletExample::new(a, b, c, label))
            .collect();

        Self { examples }
    }

    pub fn from_columns(columns: TripletColumns) -> Self {
        Self::from_lists(columns.a, columns.b, columns.c, columns.label)
    }

    /// Builds from records, optionally expanding them with [`augment`](Self::augment).
    pub fn from_records(records: Vec<TripletRecord>, use_augment: bool) -> Self {
        let dataset = Self::from_columns(TripletColumns::from(records));
        if use_augment {
            dataset.augment()
        } else {
            dataset
        }
    }

    /// Reads one [`TripletRecord`] per non-blank line of a JSON-lines file.
    pub fn from_jsonl<P: AsRef<Path>>(path: P, use_augment: bool) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let io_error = |source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        };

        let reader = BufReader::new(File::open(path).map_err(io_error)?);
        let mut records = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(io_error)?;
            if line.trim().is_empty() {
                continue;
            }

            let record: TripletRecord =
                serde_json::from_str(&line).map_err(|source| DatasetError::InvalidRecord {
                    line: idx + 1,
                    source,
                })?;
            records.push(record);
        }

        info!(
            path = %path.display(),
            records = records.len(),
            use_augment,
            "Loaded triplet records"
        );

        Ok(Self::from_records(records, use_augment))
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Returns `(text_a, text_b, text_c, label_index)` with `B → 0`, `C → 1`.
    pub fn get(&self, index: usize) -> Option<(&str, &str, &str, u32)> {
        self.examples.get(index).map(|example| {
            (
                example.text_a.as_str(),
                example.text_b.as_str(),
                example.text_c.as_str(),
                example.label.index(),
            )
        })
    }

    pub fn examples(&self) -> &[TripletExample] {
        &self.examples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TripletExample> {
        self.examples.iter()
    }

    /// Contiguous mini-batches; the last one may be shorter.
    ///
    /// # Panics
    ///
    /// If `batch_size` is zero.
    pub fn batches(&self, batch_size: usize) -> std::slice::Chunks<'_, TripletExample> {
        self.examples.chunks(batch_size)
    }

    /// Returns a new dataset with every permutation variant, deduplicated and shuffled.
    pub fn augment(&self) -> Self {
        self.augment_with_rng(&mut rand::rng())
    }

    pub fn augment_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let examples = augment::augment(&self.examples, rng);
        debug!(
            before = self.examples.len(),
            after = examples.len(),
            "Dataset augmented"
        );
        Self { examples }
    }
}

impl<'a> IntoIterator for &'a TripletDataset {
    type Item = &'a TripletExample;
    type IntoIter = std::slice::Iter<'a, TripletExample>;

    fn into_iter(self) -> Self::IntoIter {
        self.examples.iter()
    }
}
