//! Request and response bodies shared by the server and the dashboard client.

use serde::{Deserialize, Serialize};

use crate::extraction::{ExtractedEntity, FrequencyTable};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityResponse {
    pub text: String,
    pub entities: Vec<ExtractedEntity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendsResponse {
    pub trends: FrequencyTable,
}

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    5
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: String,
}
