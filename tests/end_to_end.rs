#![cfg(feature = "dashboard")]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use health_ner::{
    api::{self, AppState},
    extraction::ExtractionService,
    nlp::{GazetteerNer, Pattern},
    ui::{self, client::ServiceClient, DashboardState},
};
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Start the extraction API on an ephemeral port and return its base URL.
async fn spawn_api() -> String {
    let model = GazetteerNer::from_patterns(
        [
            Pattern::new("DISEASE", "flu"),
            Pattern::new("SYMPTOM", "fever"),
            Pattern::new("TREATMENT", "rest"),
        ],
        10_000,
    )
    .unwrap();
    let app = api::router(AppState::new(ExtractionService::new(Arc::new(model))));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn dashboard(base_url: &str) -> Router {
    ui::router(DashboardState {
        client: ServiceClient::new(base_url).unwrap(),
    })
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const BOUNDARY: &str = "health-ner-boundary";

fn upload(field: &str, contents: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"notes.txt\"\r\nContent-Type: text/plain\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Request::builder()
        .method("POST")
        .uri("/batch/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn client_round_trips_every_endpoint() {
    let client = ServiceClient::new(spawn_api().await).unwrap();

    let single = client.extract_entities("flu and fever").await.unwrap();
    assert_eq!(single.entities.len(), 2);

    let batch = client
        .batch_extract_entities(&["fever".to_string(), "rest".to_string()])
        .await
        .unwrap();
    assert_eq!(batch[0].entities[0].frequency, 2);

    let filtered = client
        .category_specific_extraction("TREATMENT & more", "rest")
        .await
        .unwrap();
    assert!(filtered.entities.is_empty());

    let top = client.get_common_entities(1).await.unwrap();
    assert_eq!(top[1].category, "symptom");
    assert_eq!(top[1].entities[0].count, 2);

    let trends = client.entity_trends().await.unwrap().trends;
    assert_eq!(trends.count("treatment", "rest"), 1);
}

#[tokio::test]
async fn extract_page_highlights_entities() {
    let app = dashboard(&spawn_api().await);
    let response = app
        .oneshot(form("/extract", "text=Flu+with+fever"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"<span class="entity" style="background-color: red">Flu</span>"#));
    assert!(html.contains("<strong>Frequency</strong>: 1"));
}

#[tokio::test]
async fn empty_text_warns_without_calling_service() {
    let app = dashboard("http://127.0.0.1:9");
    let response = app.oneshot(form("/extract", "text=+++")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Please enter text to analyze."));
}

#[tokio::test]
async fn trends_csv_downloads_accumulated_counts() {
    let base = spawn_api().await;
    ServiceClient::new(base.as_str())
        .unwrap()
        .extract_entities("fever, fever")
        .await
        .unwrap();

    let response = dashboard(&base)
        .oneshot(Request::get("/trends.csv").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        body_text(response).await,
        "category,entity,frequency\nsymptom,fever,2\n"
    );
}

#[tokio::test]
async fn unreachable_service_renders_bad_gateway() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let response = dashboard(&format!("http://{addr}"))
        .oneshot(Request::get("/trends").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_text(response).await.contains("Something went wrong"));
}

#[tokio::test]
async fn uploaded_file_runs_one_batch_item_per_line() {
    let base = spawn_api().await;
    let response = dashboard(&base)
        .oneshot(upload("file", b"flu today\n\n  fever and rest\n"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<h3>Text: flu today</h3>"));
    assert!(html.contains("<h3>Text:   fever and rest</h3>"));
    assert_eq!(html.matches("<h3>Text:").count(), 2);

    let trends = ServiceClient::new(base.as_str())
        .unwrap()
        .entity_trends()
        .await
        .unwrap()
        .trends;
    assert_eq!(trends.count("disease", "flu"), 1);
    assert_eq!(trends.count("symptom", "fever"), 1);
    assert_eq!(trends.count("treatment", "rest"), 1);
}

#[tokio::test]
async fn non_utf8_upload_is_rejected_without_calling_service() {
    let app = dashboard("http://127.0.0.1:9");
    let response = app
        .oneshot(upload("file", &[b'f', b'l', 0xff, 0xfe, b'u']))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await;
    assert!(html.contains("Something went wrong"));
    assert!(html.contains("not valid UTF-8"));
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let response = dashboard("http://127.0.0.1:9")
        .oneshot(upload("texts", b"fever"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("no file was uploaded"));
}
