//! View models turning service responses into renderable pieces.

use anyhow::Result;
use serde::Serialize;

use crate::extraction::{CategoryRanking, ExtractedEntity, FrequencyTable};

/// A run of input text, colored when it is an entity mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub color: Option<String>,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            color: None,
        }
    }
}

/// Split `text` into plain and highlighted segments.
///
/// Entities arrive in text order, so each one is searched for after the
/// previous match. An entity whose text cannot be found is skipped.
pub fn highlight(text: &str, entities: &[ExtractedEntity]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    for entity in entities.iter().filter(|e| !e.text.is_empty()) {
        let Some(offset) = text[cursor..].find(&entity.text) else {
            continue;
        };
        let start = cursor + offset;
        if start > cursor {
            segments.push(Segment::plain(&text[cursor..start]));
        }
        let end = start + entity.text.len();
        segments.push(Segment {
            text: text[start..end].to_string(),
            color: Some(entity.color.clone()),
        });
        cursor = end;
    }
    if cursor < text.len() {
        segments.push(Segment::plain(&text[cursor..]));
    }
    segments
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarRow {
    pub label: String,
    pub count: u64,
    /// Bar length relative to the chart's largest count, 0–100.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub rows: Vec<BarRow>,
}

impl BarChart {
    pub fn new<I>(title: impl Into<String>, counts: I) -> Self
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        let counts: Vec<(String, u64)> = counts.into_iter().collect();
        let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
        let rows = counts
            .into_iter()
            .map(|(label, count)| BarRow {
                percent: if max == 0 {
                    0.0
                } else {
                    count as f64 * 100.0 / max as f64
                },
                label,
                count,
            })
            .collect();
        Self {
            title: title.into(),
            rows,
        }
    }
}

pub fn ranking_charts(rankings: &[CategoryRanking]) -> Vec<BarChart> {
    rankings
        .iter()
        .map(|ranking| {
            BarChart::new(
                format!("{} Entities", capitalize(&ranking.category)),
                ranking.entities.iter().map(|e| (e.text.clone(), e.count)),
            )
        })
        .collect()
}

pub fn trend_charts(trends: &FrequencyTable) -> Vec<BarChart> {
    trends
        .as_map()
        .iter()
        .map(|(category, bucket)| {
            BarChart::new(
                format!("{} Trends", capitalize(category)),
                bucket.iter().map(|(text, count)| (text.clone(), *count)),
            )
        })
        .collect()
}

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Serialize)]
struct TrendRow<'a> {
    category: &'a str,
    entity: &'a str,
    frequency: u64,
}

/// Flatten the table into `category,entity,frequency` CSV.
pub fn trends_csv(trends: &FrequencyTable) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(["category", "entity", "frequency"])?;
    for (category, bucket) in trends.as_map() {
        for (entity, frequency) in bucket {
            writer.serialize(TrendRow {
                category,
                entity,
                frequency: *frequency,
            })?;
        }
    }
    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
