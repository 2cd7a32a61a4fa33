//! HTTP client for the extraction service.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use urlencoding::encode;

use crate::{
    api::types::{EntityResponse, TextRequest, TrendsResponse},
    extraction::CategoryRanking,
};

#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: Client,
    base_url: String,
}

impl ServiceClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("health-ner-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn extract_entities(&self, text: &str) -> Result<EntityResponse> {
        let url = format!("{}/extract_entities", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&TextRequest { text: text.to_string() })
            .send()
            .await;
        decode(resp, &url).await
    }

    pub async fn get_common_entities(&self, top_n: usize) -> Result<Vec<CategoryRanking>> {
        let url = format!("{}/get_common_entities?top_n={top_n}", self.base_url);
        let resp = self.http.get(&url).send().await;
        decode(resp, &url).await
    }

    pub async fn batch_extract_entities(&self, texts: &[String]) -> Result<Vec<EntityResponse>> {
        let url = format!("{}/batch_extract_entities", self.base_url);
        let body: Vec<TextRequest> = texts
            .iter()
            .map(|text| TextRequest { text: text.clone() })
            .collect();
        let resp = self.http.post(&url).json(&body).send().await;
        decode(resp, &url).await
    }

    pub async fn category_specific_extraction(
        &self,
        category: &str,
        text: &str,
    ) -> Result<EntityResponse> {
        let url = format!(
            "{}/category_specific_extraction?category={}",
            self.base_url,
            encode(category)
        );
        let resp = self
            .http
            .post(&url)
            .json(&TextRequest { text: text.to_string() })
            .send()
            .await;
        decode(resp, &url).await
    }

    pub async fn entity_trends(&self) -> Result<TrendsResponse> {
        let url = format!("{}/entity_trends", self.base_url);
        let resp = self.http.get(&url).send().await;
        decode(resp, &url).await
    }
}

async fn decode<T: DeserializeOwned>(
    resp: reqwest::Result<reqwest::Response>,
    url: &str,
) -> Result<T> {
    let resp = resp
        .with_context(|| format!("calling {url}"))?
        .error_for_status()
        .with_context(|| format!("{url} returned an error"))?;
    resp.json()
        .await
        .with_context(|| format!("decoding response from {url}"))
}
