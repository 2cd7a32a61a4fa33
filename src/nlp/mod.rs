//! Entity model and category vocabulary.

pub mod ner;

pub use ner::{load_model, GazetteerNer, ModelError, Ner, Pattern, Span};

/// Entity classes the model is trained to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Disease,
    Symptom,
    Treatment,
    /// Any label outside the fixed set.
    Other,
}

impl Category {
    /// Categories offered for filtered extraction.
    pub const KNOWN: [Category; 3] = [Category::Disease, Category::Symptom, Category::Treatment];

    /// Classify a model label, ignoring case.
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_uppercase().as_str() {
            "DISEASE" => Self::Disease,
            "SYMPTOM" => Self::Symptom,
            "TREATMENT" => Self::Treatment,
            _ => Self::Other,
        }
    }

    /// Display color used to highlight spans of this category.
    pub fn color(self) -> &'static str {
        match self {
            Self::Disease => "red",
            Self::Symptom => "orange",
            Self::Treatment => "green",
            Self::Other => "grey",
        }
    }

    pub fn as_label(self) -> &'static str {
        match self {
            Self::Disease => "DISEASE",
            Self::Symptom => "SYMPTOM",
            Self::Treatment => "TREATMENT",
            Self::Other => "OTHER",
        }
    }
}

/// Color for a raw model label.
pub fn color_for(label: &str) -> &'static str {
    Category::from_label(label).color()
}
