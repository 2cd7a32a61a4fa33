//! Gazetteer-backed entity recognition loaded from entity-ruler pattern files.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::Settings;

/// Patterns compiled into the binary, used when no model directory exists.
const SEED_LEXICON: &str = include_str!("../../model/patterns.jsonl");

/// Extracted entity span with byte offsets relative to the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub label: String,
    pub text: String,
}

/// Faults raised while running a model over text.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("text of length {len} exceeds maximum of {max} characters")]
    TextTooLong { len: usize, max: usize },

    #[error("model inference failed: {0}")]
    Inference(String),
}

/// Trait for NER implementations.
pub trait Ner: Send + Sync {
    /// Spans in text order.
    fn annotate(&self, text: &str) -> Result<Vec<Span>, ModelError>;
}

/// One line of an entity-ruler pattern file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Pattern {
    pub label: String,
    pub pattern: String,
}

impl Pattern {
    pub fn new(label: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            pattern: pattern.into(),
        }
    }
}

/// Case-insensitive, whole-word phrase matcher.
///
/// Every pattern becomes its own capture group, ordered longest first, so the
/// leftmost match always prefers the longest phrase starting there.
#[derive(Debug)]
pub struct GazetteerNer {
    matcher: Option<Regex>,
    labels: Vec<String>,
    max_chars: usize,
}

impl GazetteerNer {
    pub fn from_patterns<I>(patterns: I, max_chars: usize) -> Result<Self>
    where
        I: IntoIterator<Item = Pattern>,
    {
        let mut seen = HashSet::new();
        let mut unique: Vec<Pattern> = patterns
            .into_iter()
            .filter(|p| !p.pattern.trim().is_empty())
            .filter(|p| seen.insert(p.pattern.trim().to_lowercase()))
            .collect();
        unique.sort_by_key(|p| std::cmp::Reverse(p.pattern.trim().chars().count()));

        if unique.is_empty() {
            return Ok(Self {
                matcher: None,
                labels: Vec::new(),
                max_chars,
            });
        }

        let alternation = unique
            .iter()
            .map(|p| format!("({})", bounded(p.pattern.trim())))
            .collect::<Vec<_>>()
            .join("|");
        let matcher = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .size_limit(64 * (1 << 20))
            .build()
            .context("compiling gazetteer patterns")?;
        let labels = unique.into_iter().map(|p| p.label).collect();

        Ok(Self {
            matcher: Some(matcher),
            labels,
            max_chars,
        })
    }

    /// Gazetteer over the lexicon embedded at build time.
    pub fn seed(max_chars: usize) -> Result<Self> {
        let patterns = parse_patterns(SEED_LEXICON).context("parsing embedded seed lexicon")?;
        Self::from_patterns(patterns, max_chars)
    }

    /// Load every `*.jsonl` file under `dir`, in file-name order.
    pub fn from_dir(dir: &Path, max_chars: usize) -> Result<Self> {
        let mut patterns = Vec::new();
        for path in pattern_files(dir)? {
            let raw =
                fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            let parsed = parse_patterns(&raw).with_context(|| format!("parsing {}", path.display()))?;
            info!(path = %path.display(), patterns = parsed.len(), "loaded pattern file");
            patterns.extend(parsed);
        }
        if patterns.is_empty() {
            bail!("model directory {} holds no patterns", dir.display());
        }
        Self::from_patterns(patterns, max_chars)
    }

    pub fn pattern_count(&self) -> usize {
        self.labels.len()
    }
}

impl Ner for GazetteerNer {
    fn annotate(&self, text: &str) -> Result<Vec<Span>, ModelError> {
        let len = text.chars().count();
        if len > self.max_chars {
            return Err(ModelError::TextTooLong {
                len,
                max: self.max_chars,
            });
        }
        let Some(matcher) = &self.matcher else {
            return Ok(Vec::new());
        };

        let mut spans = Vec::new();
        for caps in matcher.captures_iter(text) {
            let Some((idx, found)) = caps
                .iter()
                .skip(1)
                .enumerate()
                .find_map(|(idx, m)| m.map(|m| (idx, m)))
            else {
                continue;
            };
            spans.push(Span {
                start: found.start(),
                end: found.end(),
                label: self.labels[idx].clone(),
                text: found.as_str().to_string(),
            });
        }
        Ok(spans)
    }
}

/// Escape a phrase and anchor it on word boundaries where its edges are word characters.
fn bounded(phrase: &str) -> String {
    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let mut out = String::new();
    if is_word(phrase.chars().next()) {
        out.push_str(r"\b");
    }
    out.push_str(&regex::escape(phrase));
    if is_word(phrase.chars().last()) {
        out.push_str(r"\b");
    }
    out
}

fn parse_patterns(raw: &str) -> Result<Vec<Pattern>> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<Pattern>(line)
                .with_context(|| format!("line {}: expected {{\"label\", \"pattern\"}}", idx + 1))
        })
        .collect()
}

fn pattern_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking {}", dir.display()))?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("jsonl")
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Load the model once at startup, falling back to the embedded lexicon.
pub fn load_model(settings: &Settings) -> Result<Arc<dyn Ner>> {
    let ner = if settings.model_dir.exists() {
        GazetteerNer::from_dir(&settings.model_dir, settings.max_text_chars)?
    } else {
        warn!(
            path = %settings.model_dir.display(),
            "model directory missing; using embedded seed lexicon"
        );
        GazetteerNer::seed(settings.max_text_chars)?
    };
    info!(patterns = ner.pattern_count(), "entity model ready");
    Ok(Arc::new(ner) as Arc<dyn Ner>)
}
