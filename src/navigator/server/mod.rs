// SPDX-License-Identifier: MIT

//! HTTP surface over the [`Navigator`] facade

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::career::state::CareerFeatures;
use super::error::NavigatorError;
use super::supervisor::{route, Navigator};
use super::university::state::StudentProfile;
use crate::flow::FlowError;

type AppState = Arc<Navigator>;

pub fn router(navigator: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/pipelines", get(list_pipelines))
        .route("/api/route", post(route_request))
        .route("/api/sessions", get(list_sessions))
        .route(
            "/api/sessions/{id}",
            get(get_session).delete(abandon_session),
        )
        .route("/api/sessions/{id}/university", post(start_university))
        .route("/api/sessions/{id}/career", post(start_career))
        .route("/api/sessions/{id}/resume", post(resume_session))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(navigator)
}

pub async fn serve(navigator: AppState, port: u16) -> Result<(), NavigatorError> {
    let app = router(navigator);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Error body with the HTTP status it maps to
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<NavigatorError> for ApiError {
    fn from(err: NavigatorError) -> Self {
        let status = match &err {
            NavigatorError::Flow(FlowError::NoPendingInterrupt { .. }) => StatusCode::NOT_FOUND,
            NavigatorError::Flow(FlowError::PipelineMismatch { .. }) => StatusCode::CONFLICT,
            NavigatorError::UnknownPipeline(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            log::error!("Request failed: {}", err);
        }
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16()
            }
        });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_pipelines(State(navigator): State<AppState>) -> Json<Value> {
    let pipelines: Vec<Value> = navigator
        .describe()
        .into_iter()
        .map(|(kind, steps)| json!({ "id": kind, "steps": steps }))
        .collect();
    Json(json!(pipelines))
}

#[derive(Deserialize)]
struct RouteRequest {
    text: String,
}

async fn route_request(Json(payload): Json<RouteRequest>) -> Json<Value> {
    Json(json!({ "pipeline": route(&payload.text) }))
}

async fn list_sessions(State(navigator): State<AppState>) -> ApiResult {
    let sessions = navigator.sessions().await?;
    Ok(Json(json!({ "sessions": sessions })))
}

async fn get_session(State(navigator): State<AppState>, Path(id): Path<String>) -> ApiResult {
    match navigator.pending(&id).await? {
        Some(checkpoint) => Ok(Json(json!({
            "session_id": checkpoint.session_id,
            "pipeline": checkpoint.pipeline_id,
            "paused_at_step": checkpoint.paused_at_step,
            "prompt": checkpoint.pending_prompt,
            "created_at": checkpoint.created_at,
        }))),
        None => Err(ApiError::not_found(format!(
            "No pending interrupt for session '{}'",
            id
        ))),
    }
}

async fn abandon_session(State(navigator): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let abandoned = navigator.abandon(&id).await?;
    Ok(Json(json!({ "session_id": id, "abandoned": abandoned })))
}

async fn start_university(
    State(navigator): State<AppState>,
    Path(id): Path<String>,
    Json(profile): Json<StudentProfile>,
) -> ApiResult {
    let outcome = navigator.start_university(&id, profile).await?;
    Ok(Json(json!({ "session_id": id, "pipeline": "university", "outcome": outcome })))
}

async fn start_career(
    State(navigator): State<AppState>,
    Path(id): Path<String>,
    Json(features): Json<CareerFeatures>,
) -> ApiResult {
    let outcome = navigator.start_career(&id, features).await?;
    Ok(Json(json!({ "session_id": id, "pipeline": "career", "outcome": outcome })))
}

#[derive(Deserialize)]
struct ResumeRequest {
    answer: String,
}

async fn resume_session(
    State(navigator): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ResumeRequest>,
) -> ApiResult {
    let outcome = navigator.resume(&id, &payload.answer).await?;
    let mut body = serde_json::to_value(&outcome).map_err(NavigatorError::from)?;
    body["session_id"] = json!(id);
    Ok(Json(body))
}
