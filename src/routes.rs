use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::agent::input_types::{AgentRequest, ImageData, Language};
use crate::agent::output_types::Payload;
use crate::config::SystemConfig;
use crate::notifier::ContactSubmission;
use crate::state::AppState;

type ApiError = (StatusCode, Json<Value>);

#[derive(Debug, Deserialize)]
pub struct ResearchRequest {
    pub url: String,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Deserialize)]
pub struct VisionRequest {
    /// Base64 string, optionally a `data:` URL
    pub image: String,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Deserialize)]
pub struct CopywriterRequest {
    pub business_name: String,
    pub description: String,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Deserialize)]
pub struct ArchitectRequest {
    pub prompt: String,
    #[serde(default)]
    pub language: Language,
}

pub fn create_routes(system_config: &SystemConfig) -> Router<AppState> {
    Router::new()
        // Health check
        .route("/api/health", get(health_check))

        // Agents
        .route("/api/research", post(research_site))
        .route(
            "/api/vision",
            post(analyze_vision).layer(DefaultBodyLimit::max(system_config.max_upload_bytes)),
        )
        .route("/api/copywriter", post(run_copywriter))
        .route("/api/architect", post(run_architect))

        // Contact form
        .route("/api/contact", post(contact))
}

/// Full application with tracing and CORS, ready to serve
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(create_routes(&state.config.system_config))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        api_error(rejection.status(), rejection.body_text())
    })
}

fn respond(payload: Payload) -> Json<Value> {
    Json(Value::Object(payload))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let mode = if state.agents.is_live() { "live" } else { "mock" };
    Json(json!({
        "status": "ok",
        "mode": mode
    }))
}

async fn research_site(
    State(state): State<AppState>,
    payload: Result<Json<ResearchRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = parse_body(payload)?;
    let url = request.url.trim();
    if url.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "url is required"));
    }
    info!("Research request for: {} (lang: {})", url, request.language.tag());

    // Fetch failures surface to the caller; agent failures never do.
    let page = state.page_fetcher.fetch(url).await.map_err(|e| {
        (
            StatusCode::BAD_GATEWAY,
            Json(json!({
                "error": format!("Could not access {}. Please check the URL and try again.", url),
                "details": e.to_string()
            })),
        )
    })?;

    let request = AgentRequest::SiteAudit {
        page,
        language: request.language,
    };
    Ok(respond(state.agents.site_audit.invoke(&request).await))
}

async fn analyze_vision(
    State(state): State<AppState>,
    payload: Result<Json<VisionRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = parse_body(payload)?;
    info!("Vision request received");

    let image = ImageData::from_base64(&request.image).map_err(|e| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("image must be base64 encoded: {}", e),
        )
    })?;
    if image.bytes.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "image is empty"));
    }

    let request = AgentRequest::ImageAnalysis {
        image,
        language: request.language,
    };
    Ok(respond(state.agents.image_analysis.invoke(&request).await))
}

async fn run_copywriter(
    State(state): State<AppState>,
    payload: Result<Json<CopywriterRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = parse_body(payload)?;
    info!("Copywriter request: {}", request.business_name);

    let request = AgentRequest::CopyGeneration {
        business_name: request.business_name,
        description: request.description,
        language: request.language,
    };
    Ok(respond(state.agents.copywriter.invoke(&request).await))
}

async fn run_architect(
    State(state): State<AppState>,
    payload: Result<Json<ArchitectRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = parse_body(payload)?;
    if request.prompt.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "prompt is required"));
    }
    info!("Architect request received");

    let request = AgentRequest::UiGeneration {
        prompt: request.prompt,
        language: request.language,
    };
    Ok(respond(state.agents.architect.invoke(&request).await))
}

async fn contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactSubmission>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let submission = parse_body(payload)?;
    info!("Contact form submission: {} ({})", submission.name, submission.email);

    let notifier = state.notifier.clone();
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(&submission).await {
            error!("Failed to send contact notification: {}", e);
        }
    });

    Ok(Json(json!({
        "status": "success",
        "message": "Message received"
    })))
}
