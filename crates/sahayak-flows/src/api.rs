//! HTTP API for the Sahayak server.
//!
//! Every flow is exposed as one `POST /api/flows/...` endpoint: JSON in,
//! JSON out, one model call in flight per request. Validation failures
//! come back as 422 with the offending field named and never reach the
//! model; generation failures come back as 502 with no partial result.
//! The theme endpoints read and write the single process-wide UI toggle,
//! and the report endpoint returns rendered PDF bytes by default, or the
//! graded rows as JSON when the request asks for it.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use sahayak_model::ModelClient;
use sahayak_report::{JsonGenerator, PdfGenerator, Report, ReportError, StudentRow};

use crate::config::Config;
use crate::error::FlowError;
use crate::flows::{
    knowledge_base, lesson_planner, local_content, reading_assessment, visual_aid, worksheets,
};
use crate::pages;
use crate::theme::ThemeMode;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response body for the theme endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeResponse {
    /// The current UI theme.
    pub theme: ThemeMode,
}

/// Request body for `PUT /api/theme`.
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeUpdateRequest {
    /// The theme to switch to.
    pub theme: ThemeMode,
}

/// Output format for the report endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Rendered PDF bytes.
    #[default]
    Pdf,
    /// The graded rows as a JSON document.
    Json,
}

/// Request body for the report endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    /// Report title; a generic one is used when absent.
    #[serde(default)]
    pub title: Option<String>,
    /// Student rows to grade.
    pub rows: Vec<StudentRow>,
    /// Output format; PDF when absent.
    #[serde(default)]
    pub format: ReportFormat,
}

/// Error response body returned on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Description of the error.
    pub error: String,
    /// The offending input field, for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Config,
    /// The model boundary; a mock in tests, `GeminiClient` in production.
    pub model: Arc<dyn ModelClient>,
    /// The process-wide UI theme. Explicitly initialized here; the theme
    /// handlers are the only writers.
    pub theme: Arc<RwLock<ThemeMode>>,
}

impl AppState {
    /// Creates a new `AppState` with the theme initialized to light.
    #[must_use]
    pub fn new(config: Config, model: Arc<dyn ModelClient>) -> Self {
        Self {
            config,
            model,
            theme: Arc::new(RwLock::new(ThemeMode::Light)),
        }
    }
}

// ============================================================================
// API Error Type
// ============================================================================

/// Internal error type for API handlers.
#[derive(Debug)]
enum ApiError {
    /// A flow rejected its input or its model call failed.
    Flow(FlowError),
    /// Report data was invalid or rendering failed.
    Report(ReportError),
}

impl From<FlowError> for ApiError {
    fn from(err: FlowError) -> Self {
        Self::Flow(err)
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        Self::Report(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, field) = match self {
            Self::Flow(err) if err.is_validation() => {
                let field = err.field().map(ToString::to_string);
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string(), field)
            }
            Self::Flow(err) if err.is_generation() => {
                warn!(error = %err, "generation failed");
                (StatusCode::BAD_GATEWAY, err.to_string(), None)
            }
            Self::Flow(err) => {
                warn!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), None)
            }
            Self::Report(err @ ReportError::InvalidData(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string(), None)
            }
            Self::Report(err) => {
                warn!(error = %err, "report rendering failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), None)
            }
        };

        let body = Json(ErrorResponse { error, field });
        (status, body).into_response()
    }
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the HTTP router with all API endpoints and feature pages.
///
/// # Arguments
///
/// * `state` - The shared application state
///
/// # Returns
///
/// An axum `Router` configured with:
/// - Flow, theme, and report routes under `/api`
/// - One page per feature at the root
/// - CORS middleware for development
/// - Tracing middleware for request logging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS for development (allow all origins)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let flow_routes = Router::new()
        .route("/reading-assessment", post(handle_reading_assessment))
        .route("/local-content", post(handle_local_content))
        .route("/worksheets", post(handle_worksheets))
        .route("/visual-aid", post(handle_visual_aid))
        .route("/knowledge-base", post(handle_knowledge_base))
        .route("/lesson-plan", post(handle_lesson_plan));

    let api_routes = Router::new()
        .nest("/flows", flow_routes)
        .route("/theme", get(handle_get_theme).put(handle_put_theme))
        .route("/report", post(handle_report));

    Router::new()
        .nest("/api", api_routes)
        .merge(pages::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

// ============================================================================
// Flow Handlers
// ============================================================================

/// Handler for `POST /api/flows/reading-assessment`.
async fn handle_reading_assessment(
    State(state): State<Arc<AppState>>,
    Json(input): Json<reading_assessment::ReadingAssessmentInput>,
) -> Result<Json<reading_assessment::ReadingAssessmentOutput>, ApiError> {
    let output = reading_assessment::run(state.model.as_ref(), &state.config, input).await?;
    info!(
        words_per_minute = output.words_per_minute,
        "reading assessment served"
    );
    Ok(Json(output))
}

/// Handler for `POST /api/flows/local-content`.
async fn handle_local_content(
    State(state): State<Arc<AppState>>,
    Json(input): Json<local_content::LocalContentInput>,
) -> Result<Json<local_content::LocalContentOutput>, ApiError> {
    let output = local_content::run(state.model.as_ref(), &state.config, input).await?;
    Ok(Json(output))
}

/// Handler for `POST /api/flows/worksheets`.
async fn handle_worksheets(
    State(state): State<Arc<AppState>>,
    Json(input): Json<worksheets::WorksheetsInput>,
) -> Result<Json<worksheets::WorksheetsOutput>, ApiError> {
    let output = worksheets::run(state.model.as_ref(), &state.config, input).await?;
    Ok(Json(output))
}

/// Handler for `POST /api/flows/visual-aid`.
async fn handle_visual_aid(
    State(state): State<Arc<AppState>>,
    Json(input): Json<visual_aid::VisualAidInput>,
) -> Result<Json<visual_aid::VisualAidOutput>, ApiError> {
    let output = visual_aid::run(state.model.as_ref(), &state.config, input).await?;
    Ok(Json(output))
}

/// Handler for `POST /api/flows/knowledge-base`.
async fn handle_knowledge_base(
    State(state): State<Arc<AppState>>,
    Json(input): Json<knowledge_base::KnowledgeBaseInput>,
) -> Result<Json<knowledge_base::KnowledgeBaseOutput>, ApiError> {
    let output = knowledge_base::run(state.model.as_ref(), &state.config, input).await?;
    Ok(Json(output))
}

/// Handler for `POST /api/flows/lesson-plan`.
async fn handle_lesson_plan(
    State(state): State<Arc<AppState>>,
    Json(input): Json<lesson_planner::LessonPlannerInput>,
) -> Result<Json<lesson_planner::LessonPlannerOutput>, ApiError> {
    let output = lesson_planner::run(state.model.as_ref(), &state.config, input).await?;
    Ok(Json(output))
}

// ============================================================================
// Theme Handlers
// ============================================================================

/// Handler for `GET /api/theme`.
async fn handle_get_theme(State(state): State<Arc<AppState>>) -> Json<ThemeResponse> {
    let theme = *state.theme.read().await;
    Json(ThemeResponse { theme })
}

/// Handler for `PUT /api/theme`.
async fn handle_put_theme(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ThemeUpdateRequest>,
) -> Json<ThemeResponse> {
    let mut theme = state.theme.write().await;
    *theme = request.theme;
    info!(theme = %request.theme, "theme updated");
    Json(ThemeResponse {
        theme: request.theme,
    })
}

// ============================================================================
// Report Handler
// ============================================================================

/// Handler for `POST /api/report`.
///
/// Grades the submitted rows and renders them in the requested format.
async fn handle_report(Json(request): Json<ReportRequest>) -> Result<Response, ApiError> {
    let title = request.title.unwrap_or_else(|| "Teacher Report".to_string());
    let report = Report::from_rows(title, request.rows)?;
    info!(rows = report.rows.len(), format = ?request.format, "report rendered");

    let response = match request.format {
        ReportFormat::Pdf => {
            let bytes = PdfGenerator::new(&report).generate()?;
            ([(header::CONTENT_TYPE, "application/pdf")], bytes).into_response()
        }
        ReportFormat::Json => {
            let body = JsonGenerator::new(&report).generate()?;
            ([(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
    };
    Ok(response)
}

/// Renders a page, reading the current theme for the page chrome.
pub(crate) async fn render_page(state: &AppState, body: impl FnOnce(ThemeMode) -> String) -> Html<String> {
    let theme = *state.theme.read().await;
    Html(body(theme))
}
