//! Dashboard: server-rendered pages driving the extraction API.

pub mod client;
pub mod pages;
pub mod view;

use std::net::SocketAddr;

use anyhow::Result;
use askama::Template;
use axum::{
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

use crate::nlp::Category;

use self::{
    client::ServiceClient,
    pages::{
        BatchPage, CategoryOption, CategoryPage, CommonPage, ErrorPage, ExtractPage, ExtractView,
        IndexPage, TrendsPage,
    },
};

const TOP_N_RANGE: (usize, usize) = (1, 20);
const DEFAULT_TOP_N: usize = 5;
const EMPTY_TEXT_WARNING: &str = "Please enter text to analyze.";

#[derive(Clone)]
pub struct DashboardState {
    pub client: ServiceClient,
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("extraction service call failed: {0:#}")]
    Service(#[from] anyhow::Error),

    #[error("failed to render page: {0}")]
    Render(#[from] askama::Error),

    #[error("could not read uploaded file: {0}")]
    Upload(String),
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match self {
            DashboardError::Service(_) => StatusCode::BAD_GATEWAY,
            DashboardError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DashboardError::Upload(_) => StatusCode::BAD_REQUEST,
        };
        error!(%status, error = %self, "dashboard request failed");
        let page = ErrorPage {
            message: self.to_string(),
        };
        match page.render() {
            Ok(body) => (status, Html(body)).into_response(),
            Err(_) => (status, self.to_string()).into_response(),
        }
    }
}

type PageResult = Result<Html<String>, DashboardError>;

fn render<T: Template>(page: T) -> PageResult {
    Ok(Html(page.render()?))
}

pub fn router(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/extract", get(extract_form).post(extract_submit))
        .route("/common", get(common))
        .route("/batch", get(batch_form).post(batch_submit))
        .route("/batch/upload", post(batch_upload))
        .route("/category", get(category_form).post(category_submit))
        .route("/trends", get(trends))
        .route("/trends.csv", get(trends_csv))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(service_url: String, host: String, port: u16) -> Result<()> {
    let state = DashboardState {
        client: ServiceClient::new(service_url)?,
    };
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!(%addr, service = %state.client.base_url(), "serving dashboard");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(crate::api::shutdown_signal())
        .await?;
    Ok(())
}

async fn index(State(state): State<DashboardState>) -> PageResult {
    render(IndexPage {
        service_url: state.client.base_url().to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct TextForm {
    pub text: String,
}

async fn extract_form() -> PageResult {
    render(ExtractPage {
        text: String::new(),
        warning: None,
        result: None,
    })
}

#[instrument(skip_all)]
async fn extract_submit(
    State(state): State<DashboardState>,
    Form(form): Form<TextForm>,
) -> PageResult {
    if form.text.trim().is_empty() {
        return render(ExtractPage {
            text: form.text,
            warning: Some(EMPTY_TEXT_WARNING.to_string()),
            result: None,
        });
    }
    let response = state.client.extract_entities(&form.text).await?;
    let segments = view::highlight(&response.text, &response.entities);
    render(ExtractPage {
        text: form.text,
        warning: None,
        result: Some(ExtractView {
            segments,
            entities: response.entities,
        }),
    })
}

#[derive(Debug, Deserialize)]
pub struct CommonQuery {
    pub top_n: Option<usize>,
}

#[instrument(skip(state))]
async fn common(
    State(state): State<DashboardState>,
    Query(query): Query<CommonQuery>,
) -> PageResult {
    let Some(requested) = query.top_n else {
        return render(CommonPage {
            top_n: DEFAULT_TOP_N,
            charts: None,
        });
    };
    let top_n = requested.clamp(TOP_N_RANGE.0, TOP_N_RANGE.1);
    let rankings = state.client.get_common_entities(top_n).await?;
    render(CommonPage {
        top_n,
        charts: Some(view::ranking_charts(&rankings)),
    })
}

#[derive(Debug, Deserialize)]
pub struct BatchForm {
    pub texts: String,
}

async fn batch_form() -> PageResult {
    render(BatchPage {
        texts: String::new(),
        warning: None,
        results: None,
    })
}

#[instrument(skip_all)]
async fn batch_submit(
    State(state): State<DashboardState>,
    Form(form): Form<BatchForm>,
) -> PageResult {
    run_batch(&state, form.texts).await
}

/// Field name of the file input on the batch page.
const UPLOAD_FIELD: &str = "file";

#[instrument(skip_all)]
async fn batch_upload(
    State(state): State<DashboardState>,
    mut multipart: Multipart,
) -> PageResult {
    let mut texts = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| DashboardError::Upload(err.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|err| DashboardError::Upload(err.body_text()))?;
        let decoded = String::from_utf8(bytes.to_vec())
            .map_err(|_| DashboardError::Upload("file is not valid UTF-8 text".to_string()))?;
        info!(bytes = decoded.len(), "received batch file");
        texts = Some(decoded);
    }
    let texts = texts.ok_or_else(|| DashboardError::Upload("no file was uploaded".to_string()))?;
    run_batch(&state, texts).await
}

async fn run_batch(state: &DashboardState, texts: String) -> PageResult {
    let lines = batch_lines(&texts);
    if lines.is_empty() {
        return render(BatchPage {
            texts,
            warning: Some(EMPTY_TEXT_WARNING.to_string()),
            results: None,
        });
    }
    let results = state.client.batch_extract_entities(&lines).await?;
    render(BatchPage {
        texts,
        warning: None,
        results: Some(results),
    })
}

/// One batch item per non-blank line, sent as typed.
pub fn batch_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub category: String,
    pub text: String,
}

fn category_options(selected: &str) -> Vec<CategoryOption> {
    Category::KNOWN
        .iter()
        .map(|category| CategoryOption {
            label: category.as_label(),
            selected: category.as_label().eq_ignore_ascii_case(selected),
        })
        .collect()
}

async fn category_form() -> PageResult {
    render(CategoryPage {
        options: category_options(Category::Disease.as_label()),
        text: String::new(),
        warning: None,
        heading: String::new(),
        result: None,
    })
}

#[instrument(skip_all, fields(category = %form.category))]
async fn category_submit(
    State(state): State<DashboardState>,
    Form(form): Form<CategoryForm>,
) -> PageResult {
    let options = category_options(&form.category);
    if form.text.trim().is_empty() {
        return render(CategoryPage {
            options,
            text: form.text,
            warning: Some(EMPTY_TEXT_WARNING.to_string()),
            heading: String::new(),
            result: None,
        });
    }
    let response = state
        .client
        .category_specific_extraction(&form.category, &form.text)
        .await?;
    render(CategoryPage {
        options,
        text: form.text,
        warning: None,
        heading: format!("Entities in Category: {}", view::capitalize(&form.category)),
        result: Some(response),
    })
}

#[instrument(skip_all)]
async fn trends(State(state): State<DashboardState>) -> PageResult {
    let response = state.client.entity_trends().await?;
    render(TrendsPage {
        charts: view::trend_charts(&response.trends),
    })
}

#[instrument(skip_all)]
async fn trends_csv(State(state): State<DashboardState>) -> Result<Response, DashboardError> {
    let response = state.client.entity_trends().await?;
    let body = view::trends_csv(&response.trends)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"entity_trends.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}
