//! Extraction service: runs the model and keeps the frequency table.

pub mod frequency;
pub mod snapshot;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::nlp::{color_for, ModelError, Ner, Span};

pub use frequency::{CategoryRanking, FrequencyTable, RankedEntity};

/// One recognised entity as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntity {
    /// Label exactly as the model emitted it.
    pub entity: String,
    pub text: String,
    pub color: String,
    /// Count for this (category, text) pair after this sighting was recorded.
    pub frequency: u64,
}

/// Shared service state owned by the server and handed to every handler.
///
/// The model runs outside the lock; each call's spans are recorded in one
/// critical section.
pub struct ExtractionService {
    model: Arc<dyn Ner>,
    frequencies: Mutex<FrequencyTable>,
}

impl ExtractionService {
    pub fn new(model: Arc<dyn Ner>) -> Self {
        Self::with_table(model, FrequencyTable::new())
    }

    /// Start from previously accumulated counts, e.g. a loaded snapshot.
    pub fn with_table(model: Arc<dyn Ner>, table: FrequencyTable) -> Self {
        Self {
            model,
            frequencies: Mutex::new(table),
        }
    }

    /// Recognise every entity in `text`, in the model's order.
    pub fn extract(&self, text: &str) -> Result<Vec<ExtractedEntity>, ModelError> {
        let spans = self.model.annotate(text)?;
        let mut table = self.table();
        Ok(record_all(&mut table, spans))
    }

    /// Extract each text in order against the shared table.
    ///
    /// Every text is annotated before anything is counted, so a model fault on
    /// any item leaves the table untouched.
    pub fn batch_extract<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> Result<Vec<Vec<ExtractedEntity>>, ModelError> {
        let annotated = texts
            .iter()
            .map(|text| self.model.annotate(text.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let mut table = self.table();
        Ok(annotated
            .into_iter()
            .map(|spans| record_all(&mut table, spans))
            .collect())
    }

    /// Like [`extract`](Self::extract), keeping only spans whose label matches
    /// `category` ignoring case.
    pub fn category_specific_extract(
        &self,
        category: &str,
        text: &str,
    ) -> Result<Vec<ExtractedEntity>, ModelError> {
        let wanted = category.to_lowercase();
        let spans: Vec<Span> = self
            .model
            .annotate(text)?
            .into_iter()
            .filter(|span| span.label.to_lowercase() == wanted)
            .collect();
        debug!(%category, matched = spans.len(), "filtered spans by category");
        let mut table = self.table();
        Ok(record_all(&mut table, spans))
    }

    pub fn top_entities(&self, n: usize) -> Vec<CategoryRanking> {
        self.table().top(n)
    }

    /// Copy of the whole table.
    pub fn trends(&self) -> FrequencyTable {
        self.table().clone()
    }

    // Counts are advisory; a poisoned lock still holds usable data.
    fn table(&self) -> MutexGuard<'_, FrequencyTable> {
        self.frequencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn record_all(table: &mut FrequencyTable, spans: Vec<Span>) -> Vec<ExtractedEntity> {
    spans
        .into_iter()
        .map(|span| {
            let frequency = table.record(&span.label.to_lowercase(), &span.text);
            ExtractedEntity {
                color: color_for(&span.label).to_string(),
                entity: span.label,
                text: span.text,
                frequency,
            }
        })
        .collect()
}
