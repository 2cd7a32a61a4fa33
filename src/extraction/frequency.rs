//! Per-category occurrence counts for extracted entity strings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Category → (entity text → count), both levels in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyTable {
    buckets: IndexMap<String, IndexMap<String, u64>>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more sighting of `text` under `category` and return the new total.
    pub fn record(&mut self, category: &str, text: &str) -> u64 {
        let count = self
            .buckets
            .entry(category.to_string())
            .or_default()
            .entry(text.to_string())
            .or_insert(0);
        *count += 1;
        *count
    }

    pub fn count(&self, category: &str, text: &str) -> u64 {
        self.buckets
            .get(category)
            .and_then(|bucket| bucket.get(text))
            .copied()
            .unwrap_or(0)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Sum of every count in the table.
    pub fn total(&self) -> u64 {
        self.buckets.values().flat_map(|bucket| bucket.values()).sum()
    }

    /// Up to `n` most frequent entries per category.
    ///
    /// Sorting is stable, so equal counts keep the order they were first seen in.
    pub fn top(&self, n: usize) -> Vec<CategoryRanking> {
        self.buckets
            .iter()
            .map(|(category, bucket)| {
                let mut ranked: Vec<(&String, &u64)> = bucket.iter().collect();
                ranked.sort_by(|a, b| b.1.cmp(a.1));
                CategoryRanking {
                    category: category.clone(),
                    entities: ranked
                        .into_iter()
                        .take(n)
                        .map(|(text, count)| RankedEntity::new(text.clone(), *count))
                        .collect(),
                }
            })
            .collect()
    }

    pub fn as_map(&self) -> &IndexMap<String, IndexMap<String, u64>> {
        &self.buckets
    }
}

/// Most frequent entities of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRanking {
    pub category: String,
    pub entities: Vec<RankedEntity>,
}

/// An entity text and its count, serialized as a one-entry object `{text: count}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "IndexMap<String, u64>",
    into = "IndexMap<String, u64>"
)]
pub struct RankedEntity {
    pub text: String,
    pub count: u64,
}

impl RankedEntity {
    pub fn new(text: impl Into<String>, count: u64) -> Self {
        Self {
            text: text.into(),
            count,
        }
    }
}

impl From<RankedEntity> for IndexMap<String, u64> {
    fn from(value: RankedEntity) -> Self {
        IndexMap::from([(value.text, value.count)])
    }
}

impl TryFrom<IndexMap<String, u64>> for RankedEntity {
    type Error = String;

    fn try_from(map: IndexMap<String, u64>) -> Result<Self, Self::Error> {
        if map.len() != 1 {
            return Err(format!(
                "expected a single {{entity: count}} pair, found {} entries",
                map.len()
            ));
        }
        let (text, count) = map.into_iter().next().ok_or("empty entity pair")?;
        Ok(Self { text, count })
    }
}
