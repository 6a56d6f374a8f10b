//! End-to-end integration tests for the Sahayak server
//!
//! These tests drive the full router with a scripted model client: every
//! flow endpoint, the theme toggle, and the report download, plus the two
//! failure contracts (validation never reaches the model, generation
//! failures carry no partial result).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use base64::Engine;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use sahayak_flows::{create_router, AppState, Config};
use sahayak_model::{Media, ModelClient, ModelError, ModelRequest, ModelResponse};

/// A model client that returns a fixed response and counts its calls.
struct ScriptedModel {
    response: Mutex<Option<Result<ModelResponse, ModelError>>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    fn text(body: &Value) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Some(Ok(ModelResponse {
                text: Some(body.to_string()),
                media: None,
            }))),
            calls: AtomicUsize::new(0),
        })
    }

    fn media(mime_type: &str, data: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Some(Ok(ModelResponse {
                text: None,
                media: Some(Media {
                    mime_type: mime_type.to_string(),
                    data,
                }),
            }))),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(err: ModelError) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Some(Err(err))),
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ModelClient for ScriptedModel {
    async fn generate(&self, _request: ModelRequest) -> Result<ModelResponse, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response
            .lock()
            .expect("scripted response lock")
            .take()
            .unwrap_or_else(|| Ok(ModelResponse::default()))
    }
}

fn router_with(model: Arc<ScriptedModel>) -> axum::Router {
    create_router(AppState::new(Config::default(), model))
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn audio_uri(bytes: &[u8]) -> String {
    format!(
        "data:audio/webm;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[tokio::test]
async fn test_reading_assessment_end_to_end() {
    let model = ScriptedModel::text(&json!({
        "transcript": "The cat sat",
        "accuracy": 93.0,
        "feedback": "Clear and steady."
    }));
    let router = router_with(Arc::clone(&model));

    let response = router
        .oneshot(post_json(
            "/api/flows/reading-assessment",
            &json!({
                "passage": "The cat sat on the mat.",
                "audioDataUri": audio_uri(&[1, 2, 3]),
                "durationSeconds": 30.0
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    // Words per minute is computed locally: 3 words over 30s.
    assert_eq!(body["wordsPerMinute"], 6);
    assert_eq!(body["accuracy"], 93.0);
    assert_eq!(model.call_count(), 1);
}

#[tokio::test]
async fn test_invalid_input_never_reaches_the_model() {
    let model = ScriptedModel::text(&json!({"content": "unused"}));
    let router = router_with(Arc::clone(&model));

    let response = router
        .oneshot(post_json(
            "/api/flows/local-content",
            &json!({
                "contentType": "story",
                "topic": "",
                "language": "Hindi",
                "gradeLevel": 3
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["field"], "topic");
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_malformed_audio_uri_never_reaches_the_model() {
    let model = ScriptedModel::text(&json!({"transcript": "x", "accuracy": 1.0, "feedback": "y"}));
    let router = router_with(Arc::clone(&model));

    let response = router
        .oneshot(post_json(
            "/api/flows/reading-assessment",
            &json!({
                "passage": "Some passage",
                "audioDataUri": "audio/webm;base64,q80=",
                "durationSeconds": 10.0
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["field"], "audioDataUri");
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_model_failure_surfaces_as_502_without_partial_result() {
    let model = ScriptedModel::failing(ModelError::Server {
        status: 503,
        message: "overloaded".to_string(),
    });
    let router = router_with(Arc::clone(&model));

    let response = router
        .oneshot(post_json(
            "/api/flows/lesson-plan",
            &json!({
                "topic": "fractions",
                "gradeLevel": "5",
                "learningObjectives": "compare fractions",
                "gameType": "quiz"
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert!(!body["error"].as_str().expect("error string").is_empty());
    assert!(body.get("lessonPlan").is_none());
    assert_eq!(model.call_count(), 1);
}

#[tokio::test]
async fn test_worksheets_end_to_end() {
    let model = ScriptedModel::text(&json!({
        "worksheets": {"grade3": "Count the birds.", "grade5": "Graph the birds."}
    }));
    let router = router_with(Arc::clone(&model));

    let photo = format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode([0x89, 0x50])
    );
    let response = router
        .oneshot(post_json(
            "/api/flows/worksheets",
            &json!({"photoDataUri": photo, "gradeLevels": "3, 5"}),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["worksheets"]["grade3"], "Count the birds.");
    assert_eq!(body["worksheets"]["grade5"], "Graph the birds.");
}

#[tokio::test]
async fn test_visual_aid_end_to_end() {
    let model = ScriptedModel::media("image/png", vec![0x89, 0x50, 0x4E, 0x47]);
    let router = router_with(Arc::clone(&model));

    let response = router
        .oneshot(post_json(
            "/api/flows/visual-aid",
            &json!({"prompt": "the water cycle"}),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["imageUrl"]
        .as_str()
        .expect("image url")
        .starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn test_theme_round_trip_is_process_wide() {
    let model = ScriptedModel::text(&json!({}));
    let router = router_with(model);

    let put = Request::builder()
        .method(Method::PUT)
        .uri("/api/theme")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"theme": "dark"}).to_string()))
        .expect("request");
    let response = router.clone().oneshot(put).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    // A later page render on the same router sees the dark theme.
    let page = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/knowledge-base")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let bytes = axum::body::to_bytes(page.into_body(), usize::MAX)
        .await
        .expect("body");
    let html = String::from_utf8(bytes.to_vec()).expect("utf8");
    assert!(html.contains("data-theme=\"dark\""));

    let get = Request::builder()
        .uri("/api/theme")
        .body(Body::empty())
        .expect("request");
    let response = router.oneshot(get).await.expect("response");
    let body = body_json(response).await;
    assert_eq!(body["theme"], "dark");
}

#[tokio::test]
async fn test_report_download_is_pdf() {
    let model = ScriptedModel::text(&json!({}));
    let router = router_with(model);

    let response = router
        .oneshot(post_json(
            "/api/report",
            &json!({
                "title": "Class 5B - Term 1",
                "rows": [
                    {"name": "Asha", "marks": 92},
                    {"name": "Vikram", "marks": 61},
                    {"name": "Meera", "marks": 45}
                ]
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_every_feature_page_renders() {
    let model = ScriptedModel::text(&json!({}));
    let router = router_with(model);

    for path in [
        "/",
        "/reading-assessment",
        "/local-content",
        "/worksheets",
        "/visual-aid",
        "/knowledge-base",
        "/lesson-planner",
        "/teacher-report",
    ] {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(path)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK, "page {path} failed");
    }
}
