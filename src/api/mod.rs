//! HTTP layer exposing the extraction service.

pub mod error;
pub mod routes;
pub mod types;

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    config::Settings,
    extraction::{snapshot, ExtractionService},
    nlp,
};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ExtractionService>,
}

impl AppState {
    pub fn new(service: ExtractionService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Routes of the extraction API, without a listener attached.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/extract_entities", post(routes::extract_entities))
        .route("/get_common_entities", get(routes::get_common_entities))
        .route("/batch_extract_entities", post(routes::batch_extract_entities))
        .route(
            "/category_specific_extraction",
            post(routes::category_specific_extraction),
        )
        .route("/entity_trends", get(routes::entity_trends))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(settings: Settings, host: String, port: u16) -> Result<()> {
    let model = nlp::load_model(&settings)?;
    let table = match &settings.frequency_snapshot {
        Some(path) => snapshot::load(path)
            .with_context(|| format!("loading snapshot {}", path.display()))?
            .unwrap_or_default(),
        None => Default::default(),
    };
    let state = AppState::new(ExtractionService::with_table(model, table));

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!(%addr, "serving health-ner API");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router(state.clone()).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(path) = &settings.frequency_snapshot {
        snapshot::save(&state.service.trends(), path)
            .with_context(|| format!("saving snapshot {}", path.display()))?;
    }
    info!("extraction service stopped");
    Ok(())
}

pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
