//! Askama page templates.

use askama::Template;

use crate::{api::types::EntityResponse, extraction::ExtractedEntity};

use super::view::{BarChart, Segment};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub service_url: String,
}

#[derive(Template)]
#[template(path = "extract.html")]
pub struct ExtractPage {
    pub text: String,
    pub warning: Option<String>,
    pub result: Option<ExtractView>,
}

pub struct ExtractView {
    pub segments: Vec<Segment>,
    pub entities: Vec<ExtractedEntity>,
}

#[derive(Template)]
#[template(path = "common.html")]
pub struct CommonPage {
    pub top_n: usize,
    pub charts: Option<Vec<BarChart>>,
}

#[derive(Template)]
#[template(path = "batch.html")]
pub struct BatchPage {
    pub texts: String,
    pub warning: Option<String>,
    pub results: Option<Vec<EntityResponse>>,
}

pub struct CategoryOption {
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "category.html")]
pub struct CategoryPage {
    pub options: Vec<CategoryOption>,
    pub text: String,
    pub warning: Option<String>,
    pub heading: String,
    pub result: Option<EntityResponse>,
}

#[derive(Template)]
#[template(path = "trends.html")]
pub struct TrendsPage {
    pub charts: Vec<BarChart>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub message: String,
}
